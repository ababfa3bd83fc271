use crate::domain::entities::{purchase::Purchase, store_error::StoreError};

/// Listener for purchase lifecycle events.
///
/// Every method is optional; implement only the events you care about.
/// Observers are notified on the context that drives the `PurchaseService`.
pub trait PurchaseObserver {
    /// A purchase flow for `product_id` has started.
    fn on_purchase_started(&self, _product_id: &str) {}

    /// A purchase flow for `product_id` has failed.
    fn on_purchase_failed(&self, _product_id: &str, _error: &StoreError) {}

    /// A purchase completed, either live or replayed by a restore.
    fn on_purchase_completed(&self, _purchase: &Purchase) {}
}
