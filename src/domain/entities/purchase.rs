use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed store transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// Unique per completed purchase. Pass it to `finish_purchase` when
    /// automatic finishing is disabled.
    pub transaction_id: String,
    pub product_id: String,
    /// Serialized as milliseconds since the Unix epoch.
    #[serde(with = "ts_milliseconds")]
    pub purchase_date: DateTime<Utc>,
    /// Always at least 1.
    pub quantity: i32,
}

impl Default for Purchase {
    fn default() -> Self {
        Self {
            transaction_id: String::new(),
            product_id: String::new(),
            purchase_date: DateTime::<Utc>::UNIX_EPOCH,
            quantity: 1,
        }
    }
}
