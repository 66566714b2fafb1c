//! Producer errors
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProducerError {
    #[error("assistant unavailable: {0}")]
    Unavailable(String),

    #[error("invalid assistant response: {0}")]
    InvalidResponse(String),

    #[error("assistant call timed out after {0} ms")]
    Timeout(u64),
}

impl From<ProducerError> for mockup_core::MockupError {
    fn from(e: ProducerError) -> Self {
        mockup_core::MockupError::Producer(e.to_string())
    }
}
