use std::collections::HashMap;

use serde::Deserialize;

use crate::{
    constants::DEFAULT_SERVER_VALIDATION_URL, domain::entities::iap_provider::IapProvider,
    errors::ConfigError,
};

const VALIDATION_URL_ENV: &str = "IAP_VALIDATION_URL";
const VALIDATION_API_KEY_ENV: &str = "IAP_VALIDATION_API_KEY";
const VALIDATION_PLATFORM_ID_ENV: &str = "IAP_VALIDATION_PLATFORM_ID";
const VALIDATION_BUNDLE_ID_ENV: &str = "IAP_VALIDATION_BUNDLE_ID";

/// Settings for assembling a `PurchaseService`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseServiceConfig {
    pub provider: IapProvider,
    /// Finish every completed transaction as soon as observers have seen it.
    pub auto_finish_purchases: bool,
    /// Alias → real product id.
    pub product_aliases: HashMap<String, String>,
    pub server_validation: Option<ServerValidationConfig>,
}

impl Default for PurchaseServiceConfig {
    fn default() -> Self {
        Self {
            provider: IapProvider::Auto,
            auto_finish_purchases: true,
            product_aliases: HashMap::new(),
            server_validation: None,
        }
    }
}

impl PurchaseServiceConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Where and how to verify receipts with a validation server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerValidationConfig {
    #[serde(default = "default_validation_url")]
    pub url: String,
    pub api_key: String,
    /// Store platform code the server expects in the `os` field.
    pub platform_id: i32,
    pub bundle_id: String,
    #[serde(default)]
    pub debug: bool,
}

fn default_validation_url() -> String {
    DEFAULT_SERVER_VALIDATION_URL.to_string()
}

impl ServerValidationConfig {
    /// Reads the config from `IAP_VALIDATION_*` environment variables. The URL
    /// is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let platform_id = required_env(VALIDATION_PLATFORM_ID_ENV)?;
        Ok(Self {
            url: std::env::var(VALIDATION_URL_ENV).unwrap_or_else(|_| default_validation_url()),
            api_key: required_env(VALIDATION_API_KEY_ENV)?,
            platform_id: platform_id.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    name: VALIDATION_PLATFORM_ID_ENV,
                    reason: e.to_string(),
                }
            })?,
            bundle_id: required_env(VALIDATION_BUNDLE_ID_ENV)?,
            debug: false,
        })
    }
}

fn required_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnv(name))
}
