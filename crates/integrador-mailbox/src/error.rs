use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionId;

/// Result type for mailbox exchanges.
pub type IntegradorResult<T> = Result<T, IntegradorError>;

/// Errors surfaced to callers of the mailbox protocol.
///
/// Read or move failures on individual response candidates never appear here:
/// the poller skips those files and retries them on the next cycle.
#[derive(Debug, Error)]
pub enum IntegradorError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("timed out after {waited_ms} ms waiting for the response to session {session_id}")]
    Timeout { session_id: SessionId, waited_ms: u64 },
    #[error("wait for the response to session {0} was cancelled")]
    Cancelled(SessionId),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("failed to write command {}: {source:#}", path.display())]
    CommandWrite {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to archive response {}: {source:#}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to load config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IntegradorError {
    /// Returns true for the deadline expiry outcome.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
