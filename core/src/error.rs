/// Error types for the gram client
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GramError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: session expired or missing")]
    Unauthorized,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl GramError {
    /// True for the resource-not-found family (explicit or HTTP 404)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GramError::NotFound(_) | GramError::Http { status: 404, .. }
        )
    }
}

impl From<sled::Error> for GramError {
    fn from(e: sled::Error) -> Self {
        GramError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GramError>;
