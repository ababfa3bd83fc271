use once_cell::sync::Lazy;

use crate::domain::entities::iap_provider::IapProvider;

/// Backend identifiers understood by the stock native runtimes, in the order
/// `IapProvider::Auto` tries them.
pub(crate) static DEFAULT_PROVIDER_IDENTIFIERS: Lazy<Vec<(IapProvider, &'static str)>> =
    Lazy::new(|| {
        vec![
            (IapProvider::AppStore, "LDInAppService"),
            (
                IapProvider::GooglePlay,
                "com.ludei.inapps.googleplay.GooglePlayInAppService",
            ),
            (
                IapProvider::AmazonAppstore,
                "com.ludei.inapps.amazon.AmazonInAppService",
            ),
        ]
    });

pub(crate) const DEFAULT_SERVER_VALIDATION_URL: &str =
    "https://cloud.ludei.com/api/v2/verify-purchases/";

/// Reported to callbacks still pending when the store runtime goes away.
pub const RUNTIME_DISCONNECTED_ERROR_CODE: i32 = -1;

/// Reported when the runtime asks for local validation while its own server
/// validator is active.
pub const VALIDATION_NOT_LOCAL_ERROR_CODE: i32 = -2;

/// Reported when server validation is installed but no Tokio runtime is
/// available to run the callout on.
pub const VALIDATION_RUNTIME_UNAVAILABLE_ERROR_CODE: i32 = -3;
