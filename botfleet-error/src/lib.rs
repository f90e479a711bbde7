pub mod storage;
pub mod sync;

use anyhow::Error as AnyhowError;
use config::ConfigError;
use sea_orm::{DbErr, TransactionError};
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use storage::StorageError;
use sync::SyncError;
use thiserror::Error;
use tokio::task::JoinError;

pub type FleetResult<T, E = FleetError> = anyhow::Result<T, E>;
pub type StorageResult<T, E = StorageError> = Result<T, E>;
pub type SyncResult<T, E = SyncError> = Result<T, E>;

/// Top-level process error, aggregating every subsystem's failure modes.
#[derive(Error, Debug)]
pub enum FleetError {
    #[error("{0}")]
    Msg(String),
    #[error("{0}")]
    Io(#[from] IoError),
    #[error("{0}")]
    Join(#[from] JoinError),
    #[error("{0}")]
    Anyhow(#[from] AnyhowError),
    #[error("{0}")]
    Json(#[from] SerdeJsonError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Sync(#[from] SyncError),
    #[error("initialization error: {0}")]
    Init(String),
    #[error("shutdown error: {0}")]
    Shutdown(String),
}

impl From<String> for FleetError {
    #[inline]
    fn from(e: String) -> Self {
        FleetError::Msg(e)
    }
}

impl From<&str> for FleetError {
    #[inline]
    fn from(e: &str) -> Self {
        FleetError::Msg(e.to_string())
    }
}

impl From<DbErr> for FleetError {
    #[inline]
    fn from(e: DbErr) -> Self {
        FleetError::Storage(StorageError::Db(e))
    }
}

impl From<TransactionError<FleetError>> for FleetError {
    #[inline]
    fn from(e: TransactionError<FleetError>) -> Self {
        FleetError::Msg(e.to_string())
    }
}
