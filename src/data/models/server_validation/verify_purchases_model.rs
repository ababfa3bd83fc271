#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// Request body for the verify-purchases endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct VerifyPurchasesRequestModel<'a> {
    /// Store platform code.
    pub(crate) os: i32,
    pub(crate) api_key: &'a str,
    pub(crate) debug: bool,
    #[serde(rename = "bundleId")]
    pub(crate) bundle_id: &'a str,
    /// The receipt exactly as the store runtime produced it.
    pub(crate) data: &'a str,
}

/// Response body of the verify-purchases endpoint.
///
/// The server omits fields freely, so everything is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct VerifyPurchasesResponseModel {
    /// 0 when the receipt is valid.
    pub(crate) status: Option<i32>,
    pub(crate) error_message: Option<String>,
    pub(crate) orders: Option<Vec<VerifiedOrderModel>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct VerifiedOrderModel {
    pub(crate) product_id: Option<String>,
    pub(crate) transaction_id: Option<String>,
}
