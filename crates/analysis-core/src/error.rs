use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Index out of range: {0}")]
    IndexOutOfRange(String),

    #[error("Missing bar: {0}")]
    MissingBar(String),

    #[error("No instrument bound to the engine")]
    NotBound,

    #[error("Data source error: {0}")]
    DataSource(String),
}
