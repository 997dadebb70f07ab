use thiserror::Error;

/// Core error type for turnstream.
/// Internally, modules can use `anyhow::Result<T>` for convenience,
/// but public boundaries should expose `CoreResult<T>` with this error.
///
/// Only `Config` ever crosses `StreamDriver::run_turn`: stream-time
/// failures are absorbed into the turn outcome after the session
/// finalizes.
#[derive(Debug, Error)]
pub enum TurnStreamError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("transport failed: {status} {message}")]
    Transport { status: String, message: String },

    #[error("turn cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TurnStreamError {
    /// True for the expected, user-initiated termination path.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TurnStreamError::Cancelled)
    }

    /// Stable short tag for report records.
    pub fn kind(&self) -> &'static str {
        match self {
            TurnStreamError::Config(_) => "config",
            TurnStreamError::Transport { .. } => "transport",
            TurnStreamError::Cancelled => "cancelled",
            TurnStreamError::Io(_) => "io",
            TurnStreamError::Other(_) => "other",
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, TurnStreamError>;
