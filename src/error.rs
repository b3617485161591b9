use crate::domain::workflow::{FinancingStatus, Role};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinancingError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Financing {0} not found")]
    NotFound(u32),
    #[error("Financing {0} already exists")]
    AlreadyExists(u32),
    #[error("Transition from {from} to {to} not allowed for role {}", .role.map_or("<none>", |r| r.as_str()))]
    TransitionNotAllowed {
        from: FinancingStatus,
        to: FinancingStatus,
        role: Option<Role>,
    },
    #[error("Version conflict on financing {id}: expected {expected}, found {found}")]
    VersionConflict { id: u32, expected: u64, found: u64 },
    #[error("Internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for FinancingError {
    fn from(err: rocksdb::Error) -> Self {
        FinancingError::Internal(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, FinancingError>;
