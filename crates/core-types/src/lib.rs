//! # LeadLens Core Types
//!
//! The shared vocabulary of the workspace: periods, cells, city tables and the dataset
//! that groups them. This crate has no knowledge of workbooks, queries or metrics.

pub mod cell;
pub mod columns;
pub mod dataset;
pub mod error;
pub mod period;
pub mod table;

// Re-export the core types to provide a clean public API.
pub use cell::CellValue;
pub use dataset::Dataset;
pub use error::CoreError;
pub use period::{Period, PeriodOption};
pub use table::{CityTable, RowSet};
