use serde::{Deserialize, Serialize};

/// Store providers a backend can be selected for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IapProvider {
    /// Not a backend: asks the selector to try every known provider in
    /// priority order.
    #[default]
    Auto,
    AppStore,
    GooglePlay,
    AmazonAppstore,
}
