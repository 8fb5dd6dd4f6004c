//! # Leadlens Period Resolver
//!
//! Resolves the many ways operators write "January 2025" into a single sortable `Period`,
//! and renders periods back into the short `mon/yy` display form.
//!
//! Resolution never fails. Labels no rule recognizes collapse to `Period::SENTINEL`
//! (January 1900), which sits before every plausible period.

pub mod index;
pub mod months;
pub mod resolver;

pub use index::period_index;
pub use resolver::{PeriodResolver, format};
