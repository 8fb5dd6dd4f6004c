use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// The row set lacks canonical columns the requested view depends on.
    #[error("Required columns missing: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}
