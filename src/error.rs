//! Error type shared by every corpus backend.

use thiserror::Error;

/// Failures while fetching or decoding corpus documents. None of these are
/// retried; callers degrade the view and log instead.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("request for {url} failed with status {status}")]
    Status { url: String, status: u16 },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

impl CorpusError {
    /// True when the resource simply does not exist, as opposed to a transport
    /// or decoding problem.
    pub fn is_not_found(&self) -> bool {
        match self {
            CorpusError::NotFound(_) => true,
            CorpusError::Status { status, .. } => *status == 404,
            _ => false,
        }
    }
}
