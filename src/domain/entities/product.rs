use serde::{Deserialize, Serialize};

/// A product as listed by the store.
///
/// Serializes to the flat key/value map handed to UI and plugin consumers
/// (`productId`, `title`, `description`, `localizedPrice`, `price`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stable identifier, unique within any cached product set.
    pub product_id: String,
    pub title: String,
    pub description: String,
    /// Price formatted for display in the user's currency.
    pub localized_price: String,
    pub price: f64,
}
