use async_trait::async_trait;

use crate::domain::entities::store_error::StoreError;

/// Receipt validation hook, run before a purchase is reported as completed.
///
/// Return the empty error to accept the receipt.
#[async_trait(?Send)]
pub trait ValidationHandler {
    async fn validate(&self, receipt: &str, product_id: &str) -> StoreError;
}

/// Accepts every receipt without inspecting it.
#[derive(Debug, Default)]
pub struct AcceptAllValidationHandler;

#[async_trait(?Send)]
impl ValidationHandler for AcceptAllValidationHandler {
    async fn validate(&self, _receipt: &str, _product_id: &str) -> StoreError {
        StoreError::none()
    }
}
