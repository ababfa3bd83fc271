mod support;

use fractic_iap_bridge::{
    config::PurchaseServiceConfig,
    domain::{entities::iap_provider::IapProvider, repositories::store_backend::StoreBackend},
    provider_selector::{NativeBackendFactory, ProviderSelector},
};
use serde_json::json;
use support::{init_logging, native_product, FakeConnector, FakeStore};

const GOOGLE: &str = "com.ludei.inapps.googleplay.GooglePlayInAppService";
const AMAZON: &str = "com.ludei.inapps.amazon.AmazonInAppService";

fn selector(store: &FakeStore) -> ProviderSelector<NativeBackendFactory<FakeConnector>> {
    init_logging();
    ProviderSelector::with_default_providers(NativeBackendFactory::new(FakeConnector {
        store: store.clone(),
    }))
}

#[test]
fn auto_falls_through_to_the_first_store_that_initializes() {
    let store = FakeStore::available(&[AMAZON]);
    let mut backend = selector(&store)
        .create(IapProvider::Auto)
        .expect("amazon backend");

    assert_eq!(
        store.state.borrow().init_attempts,
        ["LDInAppService", GOOGLE, AMAZON]
    );

    // The surviving backend is wired to the runtime's live reply channel.
    backend.start();
    backend.fetch_products(vec!["p1".into()], Box::new(|_, _| {}));
    store
        .sink()
        .fetch_reply(store.last_fetch_handle(), vec![native_product("p1", 1.5)], 0, "");
    backend.dispatch_one();
    assert_eq!(backend.get_products()[0].product_id, "p1");
}

#[test]
fn nothing_available_is_absent() {
    let store = FakeStore::available(&[]);
    assert!(selector(&store).create(IapProvider::Auto).is_none());
    assert!(selector(&store).create(IapProvider::GooglePlay).is_none());
}

#[test]
fn explicit_provider_does_not_fall_back() {
    let store = FakeStore::available(&[AMAZON]);
    assert!(selector(&store).create(IapProvider::GooglePlay).is_none());
    assert_eq!(store.state.borrow().init_attempts, [GOOGLE]);
}

#[test]
fn warm_start_seeds_the_product_cache() {
    let store = FakeStore::available(&[GOOGLE]);
    store
        .state
        .borrow_mut()
        .persisted_products
        .push(native_product("saved", 2.0));

    let backend = selector(&store)
        .create(IapProvider::GooglePlay)
        .expect("google backend");
    assert_eq!(backend.get_products().len(), 1);
    assert_eq!(backend.product_for_id("saved").unwrap().price, 2.0);
}

#[test]
fn service_from_config_applies_aliases_and_auto_finish() {
    let store = FakeStore::available(&[GOOGLE, AMAZON]);
    let config = PurchaseServiceConfig::from_json(
        &json!({
            "provider": "AMAZON_APPSTORE",
            "autoFinishPurchases": false,
            "productAliases": { "coins": "com.app.coins" }
        })
        .to_string(),
    )
    .unwrap();

    let mut service = selector(&store).create_service(&config).expect("service");
    service.start();
    service.purchase("coins", |_, _| {});
    store.sink().purchase_completed("t1", "com.app.coins", 1, 0);
    service.dispatch_pending();

    let state = store.state.borrow();
    assert_eq!(state.init_attempts, [AMAZON]);
    assert_eq!(state.purchases[0].0, "com.app.coins");
    assert!(state.finished.is_empty());
    assert!(!service.auto_finish_purchases());
}

#[test]
fn service_from_config_enables_server_validation() {
    let store = FakeStore::available(&[GOOGLE]);
    let config = PurchaseServiceConfig::from_json(
        &json!({
            "serverValidation": {
                "apiKey": "key",
                "platformId": 1,
                "bundleId": "com.app"
            }
        })
        .to_string(),
    )
    .unwrap();

    selector(&store).create_service(&config).expect("service");
    assert_eq!(store.state.borrow().custom_validation, Some(true));
}
