//! # LeadLens Analytics
//!
//! Funnel metrics over a selected row set: totals and conversion ratios, per-origin and
//! per-period breakdowns, threshold-gated rankings, and the contacts-to-sales correlation.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Logic:** A pure logic crate. It consumes row sets that the query layer has
//!   already filtered and never touches workbooks or the loaded-dataset slot.
//! - **Stateless Calculation:** `MetricsEngine` holds only its thresholds. Every metric is
//!   recomputed from the row set it is given.
//! - **No Fabricated Values:** Missing data and zero denominators produce `None`, and samples
//!   below a ranking's minimum are left out rather than reported as zero.
//!
//! ## Public API
//!
//! - `MetricsEngine`: The calculator, plus `render` for dispatching a `ViewKind`.
//! - `ViewKind` / `ViewReport`: The dashboard views and their outputs.
//! - `AnalyticsError`: Returned when a view's required columns are missing.

pub mod engine;
pub mod error;
pub mod report;
pub mod stats;
pub mod views;

pub use engine::{MetricsEngine, OTHERS_LABEL};
pub use error::AnalyticsError;
pub use report::{
    CorrelationRow, CorrelationTable, EfficiencyRow, FunnelSummary, FunnelTotals, LinearFit,
    OriginMetrics, PeriodMetrics, ScatterReport, ShareSlice, TopChannels, ViewReport,
};
pub use views::ViewKind;
