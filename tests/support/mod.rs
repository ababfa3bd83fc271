#![allow(dead_code)]

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use fractic_iap_bridge::{
    data::{
        bridge::{callback_bridge::CallbackHandle, native_reply_sink::NativeReplySink},
        datasources::native_store_datasource::{NativeStoreConnector, NativeStoreDatasource},
        models::native_store::{
            native_product_model::NativeProductModel, native_purchase_model::NativePurchaseModel,
        },
        repositories::native_store_backend::NativeStoreBackend,
    },
    domain::{entities::store_error::StoreError, handlers::purchase_observer::PurchaseObserver},
    domain::entities::purchase::Purchase,
    purchase_service::PurchaseService,
};

pub const STORE_ID: &str = "test.store";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Everything the fake runtime was asked to do, plus the state it answers
/// synchronous reads from.
#[derive(Default)]
pub struct FakeState {
    pub sink: Option<NativeReplySink>,
    pub available: Vec<String>,
    pub init_attempts: Vec<String>,
    pub start_calls: usize,
    pub fetches: Vec<(Vec<String>, u64)>,
    pub restores: Vec<u64>,
    pub purchases: Vec<(String, i32, u64)>,
    pub consumes: Vec<(String, i32, u64)>,
    pub finished: Vec<String>,
    pub persisted_products: Vec<NativeProductModel>,
    pub stock: HashMap<String, i32>,
    pub can_purchase: bool,
    pub custom_validation: Option<bool>,
    pub server_validation: bool,
    pub validations: Vec<(u64, StoreError)>,
}

/// In-memory stand-in for a platform store runtime.
#[derive(Clone, Default)]
pub struct FakeStore {
    pub state: Rc<RefCell<FakeState>>,
}

impl FakeStore {
    pub fn available(identifiers: &[&str]) -> Self {
        let store = Self::default();
        store.state.borrow_mut().available = identifiers.iter().map(|s| s.to_string()).collect();
        store.state.borrow_mut().can_purchase = true;
        store
    }

    pub fn sink(&self) -> NativeReplySink {
        self.state
            .borrow()
            .sink
            .clone()
            .expect("fake store is not connected")
    }

    /// Drops the runtime's side of the reply channel.
    pub fn disconnect(&self) {
        self.state.borrow_mut().sink = None;
    }

    pub fn last_fetch_handle(&self) -> u64 {
        self.state.borrow().fetches.last().expect("no fetch").1
    }

    pub fn last_restore_handle(&self) -> u64 {
        *self.state.borrow().restores.last().expect("no restore")
    }

    pub fn last_purchase_handle(&self) -> u64 {
        self.state.borrow().purchases.last().expect("no purchase").2
    }

    pub fn last_consume_handle(&self) -> u64 {
        self.state.borrow().consumes.last().expect("no consume").2
    }
}

impl NativeStoreDatasource for FakeStore {
    fn init(&self, identifier: &str) -> bool {
        let mut state = self.state.borrow_mut();
        state.init_attempts.push(identifier.to_string());
        state.available.iter().any(|a| a == identifier)
    }

    fn start(&self) {
        self.state.borrow_mut().start_calls += 1;
    }

    fn fetch_products(&self, product_ids: &[String], callback: CallbackHandle) {
        self.state
            .borrow_mut()
            .fetches
            .push((product_ids.to_vec(), callback.to_raw()));
    }

    fn get_products(&self) -> Vec<NativeProductModel> {
        self.state.borrow().persisted_products.clone()
    }

    fn product_for_id(&self, product_id: &str) -> Option<NativeProductModel> {
        self.state
            .borrow()
            .persisted_products
            .iter()
            .find(|p| p.product_id.as_deref() == Some(product_id))
            .cloned()
    }

    fn is_purchased(&self, product_id: &str) -> bool {
        self.stock_of_product(product_id) > 0
    }

    fn stock_of_product(&self, product_id: &str) -> i32 {
        self.state
            .borrow()
            .stock
            .get(product_id)
            .copied()
            .unwrap_or_default()
    }

    fn can_purchase(&self) -> bool {
        self.state.borrow().can_purchase
    }

    fn restore_purchases(&self, callback: CallbackHandle) {
        self.state.borrow_mut().restores.push(callback.to_raw());
    }

    fn purchase(&self, product_id: &str, quantity: i32, callback: CallbackHandle) {
        self.state
            .borrow_mut()
            .purchases
            .push((product_id.to_string(), quantity, callback.to_raw()));
    }

    fn consume(&self, product_id: &str, quantity: i32, callback: CallbackHandle) {
        self.state
            .borrow_mut()
            .consumes
            .push((product_id.to_string(), quantity, callback.to_raw()));
    }

    fn finish_purchase(&self, transaction_id: &str) {
        self.state
            .borrow_mut()
            .finished
            .push(transaction_id.to_string());
    }

    fn set_custom_validation_enabled(&self, enabled: bool) {
        self.state.borrow_mut().custom_validation = Some(enabled);
    }

    fn set_ludei_server_validation_handler(&self) {
        self.state.borrow_mut().server_validation = true;
    }

    fn finish_validation(&self, completion_id: u64, error: &StoreError) {
        self.state
            .borrow_mut()
            .validations
            .push((completion_id, error.clone()));
    }
}

pub struct FakeConnector {
    pub store: FakeStore,
}

impl NativeStoreConnector for FakeConnector {
    type Datasource = FakeStore;

    fn connect(&self, replies: NativeReplySink) -> FakeStore {
        self.store.state.borrow_mut().sink = Some(replies);
        self.store.clone()
    }
}

/// A started service over a fake runtime that provides `STORE_ID`.
pub fn started_service() -> (PurchaseService, FakeStore) {
    init_logging();
    let store = FakeStore::available(&[STORE_ID]);
    let backend = NativeStoreBackend::connect(
        &FakeConnector {
            store: store.clone(),
        },
        STORE_ID,
    )
    .expect("fake store initializes");
    let mut service = PurchaseService::new(Box::new(backend));
    service.start();
    (service, store)
}

pub fn native_product(id: &str, price: f64) -> NativeProductModel {
    NativeProductModel {
        product_id: Some(id.to_string()),
        title: Some(format!("{id} title")),
        description: Some(format!("{id} description")),
        localized_price: Some(format!("${price}")),
        price: Some(price),
    }
}

pub fn native_purchase(transaction_id: &str, product_id: &str, quantity: i32) -> NativePurchaseModel {
    NativePurchaseModel {
        transaction_id: Some(transaction_id.to_string()),
        product_id: Some(product_id.to_string()),
        purchase_date: Some(1_700_000_000_000),
        quantity: Some(quantity),
    }
}

/// Observer that writes every event it sees to a shared log.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: RefCell<Vec<String>>,
    pub completed: RefCell<Vec<Purchase>>,
}

impl PurchaseObserver for RecordingObserver {
    fn on_purchase_started(&self, product_id: &str) {
        self.events.borrow_mut().push(format!("started:{product_id}"));
    }

    fn on_purchase_failed(&self, product_id: &str, error: &StoreError) {
        self.events
            .borrow_mut()
            .push(format!("failed:{product_id}:{}", error.code));
    }

    fn on_purchase_completed(&self, purchase: &Purchase) {
        self.events
            .borrow_mut()
            .push(format!("completed:{}", purchase.transaction_id));
        self.completed.borrow_mut().push(purchase.clone());
    }
}
