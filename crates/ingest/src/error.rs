use thiserror::Error;

/// A sheet that could not be turned into a city table. Never fatal to an ingestion.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Sheet '{sheet}' skipped: {reason}")]
pub struct SheetError {
    pub sheet: String,
    pub reason: String,
}

/// Failures that leave nothing ingested.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("No data ingested: the workbook could not be opened: {0}")]
    Unreadable(#[from] calamine::Error),

    #[error("No data ingested: failed to read workbook file: {0}")]
    Io(#[from] std::io::Error),

    #[error("No data ingested: none of the {} candidate sheets could be normalized", skipped.len())]
    NoUsableSheets { skipped: Vec<SheetError> },
}

/// Why one sheet failed normalization.
#[derive(Error, Debug, PartialEq)]
pub enum NormalizeError {
    #[error("the sheet has no header row")]
    MissingHeader,

    #[error(transparent)]
    Table(#[from] core_types::CoreError),
}
