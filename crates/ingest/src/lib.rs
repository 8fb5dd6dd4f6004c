//! # LeadLens Ingest
//!
//! Turns spreadsheet workbooks into a canonical `Dataset`.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** Depends on `core-types`, `periods` and `configuration`. The only I/O it
//!   performs is reading the workbook bytes.
//! - **Partial-Failure Isolation:** One bad sheet is logged and skipped. Ingestion fails as a
//!   whole only when nothing usable remains.
//!
//! ## Public API
//!
//! - `WorkbookIngestor`: Reads every non-excluded sheet and builds the dataset.
//! - `normalize_sheet`: Standardizes one raw sheet into a `CityTable`.
//! - `IngestError`, `SheetError`, `NormalizeError`: The crate's error types.

pub mod cells;
pub mod error;
pub mod normalizer;
pub mod workbook;

pub use error::{IngestError, NormalizeError, SheetError};
pub use normalizer::{normalize_column_name, normalize_sheet};
pub use workbook::{Ingestion, RawSheet, WorkbookIngestor};
