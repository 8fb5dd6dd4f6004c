//! # LeadLens Query
//!
//! Selection of rows from a loaded dataset: one city, an inclusive period range and an
//! optional origin whitelist. Aggregate rows ("Total", "Geral", "Consolidado") are removed from
//! every result.

pub mod engine;
pub mod error;
pub mod selection;

pub use engine::{AGGREGATE_MARKERS, QueryEngine, is_aggregate_origin};
pub use error::QueryError;
pub use selection::{PeriodRange, Selection};
