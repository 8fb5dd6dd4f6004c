use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("City '{city}': row {row} has {found} values but there are {expected} columns")]
    RaggedRow {
        city: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("City '{city}': index has {index} labels for {rows} rows")]
    IndexMismatch {
        city: String,
        rows: usize,
        index: usize,
    },

    #[error("Serialized dataset is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Table(#[from] core_types::CoreError),
}
