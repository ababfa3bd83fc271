use std::sync::Arc;

use async_trait::async_trait;
use tokio::runtime::Handle;

use crate::{
    config::ServerValidationConfig,
    constants::VALIDATION_RUNTIME_UNAVAILABLE_ERROR_CODE,
    data::{
        datasources::server_validation_datasource::{
            ServerValidationDatasource, ServerValidationDatasourceImpl,
        },
        models::server_validation::verify_purchases_model::VerifyPurchasesResponseModel,
    },
    domain::{entities::store_error::StoreError, handlers::validation_handler::ValidationHandler},
};

/// Validates receipts against a verify-purchases server.
///
/// Install with `PurchaseService::set_validation_handler`. The HTTP callout
/// runs as a task on a Tokio runtime: the one current when `validate` is
/// called, otherwise the one captured at construction. With neither, every
/// receipt is rejected in-band with `VALIDATION_RUNTIME_UNAVAILABLE_ERROR_CODE`.
pub struct ServerValidationHandler {
    datasource: Arc<dyn ServerValidationDatasource>,
    runtime: Option<Handle>,
}

impl ServerValidationHandler {
    /// Captures the current Tokio runtime, if any.
    pub fn new(config: ServerValidationConfig) -> Self {
        Self::with_datasource(
            Arc::new(ServerValidationDatasourceImpl::new(config)),
            Handle::try_current().ok(),
        )
    }

    /// For services driven with `dispatch_pending` outside any runtime.
    pub fn with_runtime(config: ServerValidationConfig, runtime: Handle) -> Self {
        Self::with_datasource(
            Arc::new(ServerValidationDatasourceImpl::new(config)),
            Some(runtime),
        )
    }

    pub(crate) fn with_datasource(
        datasource: Arc<dyn ServerValidationDatasource>,
        runtime: Option<Handle>,
    ) -> Self {
        Self {
            datasource,
            runtime,
        }
    }
}

#[async_trait(?Send)]
impl ValidationHandler for ServerValidationHandler {
    async fn validate(&self, receipt: &str, product_id: &str) -> StoreError {
        let Some(runtime) = Handle::try_current().ok().or_else(|| self.runtime.clone()) else {
            log::warn!("No Tokio runtime to validate the receipt for {product_id} with.");
            return StoreError::new(
                VALIDATION_RUNTIME_UNAVAILABLE_ERROR_CODE,
                "Server validation requires a Tokio runtime.",
            );
        };
        let datasource = self.datasource.clone();
        let receipt = receipt.to_string();
        let task = runtime.spawn(async move { datasource.verify_purchases(&receipt).await });
        let error = match task.await {
            Ok(Ok(response)) => check_orders(response, product_id),
            Ok(Err(error)) => error,
            Err(e) => StoreError::new(0, format!("Server validation task failed: {e}")),
        };
        if !error.is_empty() {
            log::warn!("Receipt for {product_id} rejected: {error}");
        }
        error
    }
}

fn check_orders(response: VerifyPurchasesResponseModel, product_id: &str) -> StoreError {
    let validation_status = response.status.unwrap_or(-1);
    if validation_status != 0 {
        return StoreError::new(
            validation_status,
            format!(
                "Server validation failed with message: {} (status: {validation_status})",
                response.error_message.unwrap_or_default()
            ),
        );
    }
    match response.orders.unwrap_or_default().into_iter().next() {
        None => StoreError::new(0, "Server validation failed with empty orders response"),
        Some(order) if order.product_id.as_deref() == Some(product_id) => {
            log::debug!(
                "Receipt for {product_id} accepted (transaction {}).",
                order.transaction_id.as_deref().unwrap_or("unknown")
            );
            StoreError::none()
        }
        Some(_) => StoreError::new(
            0,
            "Server validation failed because productId does not match",
        ),
    }
}
