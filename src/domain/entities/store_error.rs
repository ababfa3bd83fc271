use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome carried by every store callback.
///
/// There is no separate success flag: an operation succeeded exactly when the
/// error `is_empty()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreError {
    pub code: i32,
    pub message: String,
}

impl StoreError {
    /// The empty error, reported on success.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.code == 0 && self.message.is_empty()
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}
