use std::rc::Rc;

use async_trait::async_trait;

use crate::domain::{
    entities::{
        product::Product, purchase::Purchase, purchase_event::PurchaseEvent,
        store_error::StoreError,
    },
    handlers::validation_handler::ValidationHandler,
};

pub type FetchCallback = Box<dyn FnOnce(Vec<Product>, StoreError)>;
pub type RestoreCallback = Box<dyn FnOnce(StoreError)>;
pub type PurchaseCallback = Box<dyn FnOnce(Purchase, StoreError)>;
/// Receives the quantity actually consumed, never more than requested.
pub type ConsumeCallback = Box<dyn FnOnce(i32, StoreError)>;

/// Result of handing one marshalled message to a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// Nothing was waiting.
    Idle,
    /// A pending callback was completed, or a message was discarded.
    Reply,
    /// A lifecycle event the facade must fan out.
    Event(PurchaseEvent),
    /// The store runtime is gone; no further messages will arrive.
    Disconnected,
}

/// One concrete store implementation.
///
/// Product ids passed here are already resolved from aliases. Asynchronous
/// operations complete their callback exactly once, from within
/// `dispatch_one` or `dispatch_next`.
#[async_trait(?Send)]
pub trait StoreBackend {
    /// Begins delivering lifecycle events. Idempotent; events that arrive
    /// before the first call are dropped.
    fn start(&mut self);

    fn fetch_products(&mut self, product_ids: Vec<String>, callback: FetchCallback);

    /// Cached products only; never reaches the store.
    fn get_products(&self) -> Vec<Product>;

    fn product_for_id(&self, product_id: &str) -> Option<Product>;

    fn is_purchased(&self, product_id: &str) -> bool;

    fn stock_of_product(&self, product_id: &str) -> i32;

    /// `false` means purchasing is unavailable right now, not that something
    /// went wrong.
    fn can_purchase(&self) -> bool;

    fn restore_purchases(&mut self, callback: RestoreCallback);

    fn purchase(&mut self, product_id: &str, quantity: i32, callback: PurchaseCallback);

    fn consume(&mut self, product_id: &str, quantity: i32, callback: ConsumeCallback);

    fn finish_purchase(&mut self, transaction_id: &str);

    /// Replaces the active validator. `None` restores the accept-all default.
    fn set_validation_handler(&mut self, handler: Option<Rc<dyn ValidationHandler>>);

    /// Hands validation to the store runtime's server validator, replacing
    /// any local handler.
    fn set_ludei_server_validation_handler(&mut self);

    /// Number of callbacks still waiting for a reply.
    fn pending_callbacks(&self) -> usize;

    /// Handles at most one message without waiting.
    fn dispatch_one(&mut self) -> Dispatched;

    /// Waits for the next message and handles it. Never returns `Idle`.
    async fn dispatch_next(&mut self) -> Dispatched;
}
