use crate::storage::StorageError;
use thiserror::Error;

/// Stable rejection codes surfaced to operators.
pub mod codes {
    pub const DEVICE_NOT_ONLINE: &str = "device_not_online";
    pub const PUBLISH_FAILED: &str = "publish_failed";
    pub const COMPOSE_FILE_IN_USE: &str = "compose_file_in_use";
    pub const STREAM_ALREADY_EXISTS: &str = "stream_already_exists";
    pub const NO_DEPLOYMENT: &str = "no_deployment";
    pub const COMMAND_NOT_TERMINAL: &str = "command_not_terminal";
}

/// Errors raised by the device synchronization engine.
///
/// The four variants map onto the engine's error taxonomy: referenced
/// records that do not exist (or resolve into a foreign tenant), violated
/// preconditions on operator actions, malformed or spoofed device traffic,
/// and transport-level failures.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{what} not found")]
    NotFound { what: &'static str },
    #[error("precondition failed: {code}")]
    Precondition { code: &'static str },
    #[error("protocol violation: {reason}")]
    Protocol { reason: String },
    #[error("transport error: {reason}")]
    Transport { reason: String },
    #[error("{0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    pub fn precondition(code: &'static str) -> Self {
        SyncError::Precondition { code }
    }

    pub fn protocol(reason: impl Into<String>) -> Self {
        SyncError::Protocol {
            reason: reason.into(),
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        SyncError::Transport {
            reason: reason.into(),
        }
    }
}

impl From<sea_orm::DbErr> for SyncError {
    #[inline]
    fn from(e: sea_orm::DbErr) -> Self {
        SyncError::Storage(StorageError::Db(e))
    }
}
