use thiserror::Error;

/// Reasons a native reply could not be matched to a pending callback.
///
/// These never reach application callbacks; the backend logs and discards the
/// offending reply.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Callback handle {0:#x} was never issued")]
    UnknownHandle(u64),

    #[error("Callback handle {0:#x} was already completed")]
    StaleHandle(u64),

    #[error("Callback handle {handle:#x} expects a {expected} reply, got {actual}")]
    ReplyKindMismatch {
        handle: u64,
        expected: &'static str,
        actual: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("Environment variable {name} is invalid: {reason}")]
    InvalidEnv { name: &'static str, reason: String },
}
