use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The city is not in the dataset. Distinct from a selection that matched no rows.
    #[error("No data for city '{0}'")]
    UnknownCity(String),
}
