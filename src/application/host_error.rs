// Upstream failure type shared by both host contracts
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
    /// Upstream answered with a non-2xx status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(String),

    /// A 2xx response whose body did not have the expected shape
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl HostError {
    pub fn status(&self) -> Option<u16> {
        match self {
            HostError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
