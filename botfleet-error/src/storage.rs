use sea_orm::DbErr;
use thiserror::Error;

/// Errors raised by the persistence layer.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{0}")]
    Db(#[from] DbErr),
    #[error("migration failed: {0}")]
    Migration(String),
}
