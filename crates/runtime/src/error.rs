//! Runtime errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Storage(#[from] storage::StorageError),

    /// The payment collaborator failed or is unreachable
    #[error("payment provider error: {0}")]
    Payment(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
