//! # LeadLens Dataset Store
//!
//! The boundary representation of a `Dataset` and the slot that owns the loaded one.
//!
//! - `DatasetStore`: Encodes a dataset as `{ city: { columns, rows, index } }` and decodes it
//!   back, rebuilding the period index.
//! - `DatasetHandle`: Atomic whole-dataset replacement for concurrent readers.

pub mod error;
pub mod handle;
pub mod serialized;
pub mod store;

pub use error::StoreError;
pub use handle::DatasetHandle;
pub use serialized::{SerializedDataset, SerializedTable};
pub use store::DatasetStore;
