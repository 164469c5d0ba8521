use thiserror::Error;

#[derive(Debug, Error)]
pub enum AffinyxError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No records found: {0}")]
    NotFound(String),

    #[error("Index {index} out of range ({available} rows available)")]
    OutOfRange { index: usize, available: usize },

    #[error("Fetch for entry '{entry_id}' failed after {attempts} attempts: {message}")]
    RetryExhausted {
        entry_id: String,
        attempts: u32,
        message: String,
    },

    #[error("Sandbox policy violation: {0}")]
    Sandbox(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AffinyxError>;
