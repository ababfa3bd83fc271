use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::domain::entities::purchase::Purchase;

/// Purchase record as the store runtime hands it across the boundary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NativePurchaseModel {
    pub transaction_id: Option<String>,
    pub product_id: Option<String>,
    /// Milliseconds since the Unix epoch; 0 when the runtime has no date.
    pub purchase_date: Option<i64>,
    /// If not present, the quantity is 1.
    pub quantity: Option<i32>,
}

impl From<NativePurchaseModel> for Purchase {
    fn from(m: NativePurchaseModel) -> Self {
        Purchase {
            transaction_id: m.transaction_id.unwrap_or_default(),
            product_id: m.product_id.unwrap_or_default(),
            purchase_date: unix_millis_to_datetime(m.purchase_date.unwrap_or_default()),
            quantity: m.quantity.map(|q| q.max(1)).unwrap_or(1),
        }
    }
}

pub(crate) fn unix_millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
