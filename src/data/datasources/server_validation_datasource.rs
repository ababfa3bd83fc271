use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    config::ServerValidationConfig,
    data::models::server_validation::verify_purchases_model::{
        VerifyPurchasesRequestModel, VerifyPurchasesResponseModel,
    },
    domain::entities::store_error::StoreError,
};

#[async_trait]
pub(crate) trait ServerValidationDatasource: Send + Sync {
    /// Verify Purchases:
    /// POST {url} with the receipt as `data`.
    ///
    /// Fails in-band when the server cannot be reached, answers with a non-200
    /// status, or returns a body that is not a verify-purchases response.
    async fn verify_purchases(
        &self,
        receipt: &str,
    ) -> Result<VerifyPurchasesResponseModel, StoreError>;
}

pub(crate) struct ServerValidationDatasourceImpl {
    client: reqwest::Client,
    config: ServerValidationConfig,
}

#[async_trait]
impl ServerValidationDatasource for ServerValidationDatasourceImpl {
    async fn verify_purchases(
        &self,
        receipt: &str,
    ) -> Result<VerifyPurchasesResponseModel, StoreError> {
        let (status, body) = self.callout(receipt).await.map_err(|e| {
            StoreError::new(0, format!("Server validation failed with exception: {e}"))
        })?;
        decode_response(status, &body)
    }
}

impl ServerValidationDatasourceImpl {
    pub(crate) fn new(config: ServerValidationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn callout(&self, receipt: &str) -> Result<(StatusCode, String), reqwest::Error> {
        let response = self
            .client
            .post(&self.config.url)
            .json(&VerifyPurchasesRequestModel {
                os: self.config.platform_id,
                api_key: &self.config.api_key,
                debug: self.config.debug,
                bundle_id: &self.config.bundle_id,
                data: receipt,
            })
            .send()
            .await?;
        let status = response.status();
        Ok((status, response.text().await.unwrap_or_default()))
    }
}

fn decode_response(
    status: StatusCode,
    body: &str,
) -> Result<VerifyPurchasesResponseModel, StoreError> {
    if status != StatusCode::OK {
        return Err(StoreError::new(
            i32::from(status.as_u16()),
            format!(
                "Server validation failed with HTTP status code: {}",
                status.as_u16()
            ),
        ));
    }
    serde_json::from_str(body)
        .map_err(|e| StoreError::new(0, format!("Server validation returned invalid JSON: {e}")))
}
