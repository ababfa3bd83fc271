use super::{purchase::Purchase, store_error::StoreError};

/// Lifecycle events pushed unsolicited by a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseEvent {
    Started {
        product_id: String,
    },
    Failed {
        product_id: String,
        error: StoreError,
    },
    /// Also emitted for every transaction replayed by a restore.
    Completed(Purchase),
}
