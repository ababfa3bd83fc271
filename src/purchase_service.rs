use std::{collections::HashMap, future::Future, pin::pin, rc::Rc};

use futures::{
    channel::oneshot,
    future::{select, Either},
};

use crate::{
    config::PurchaseServiceConfig,
    data::repositories::server_validation_handler::ServerValidationHandler,
    domain::{
        entities::{
            product::Product, purchase::Purchase, purchase_event::PurchaseEvent,
            store_error::StoreError,
        },
        handlers::{purchase_observer::PurchaseObserver, validation_handler::ValidationHandler},
        repositories::store_backend::{Dispatched, StoreBackend},
    },
    observer_registry::ObserverRegistry,
    product_id_mapper::ProductIdMapper,
};

/// Resolves once with the result of an asynchronous store operation, or with
/// `Canceled` if the service is dropped first.
pub type Completion<T> = oneshot::Receiver<T>;

/// The single entry point applications use to talk to a store.
///
/// Drive it from one context: store replies and lifecycle events are only
/// delivered from `dispatch_pending`, `dispatch_next` or `run_until`.
pub struct PurchaseService {
    backend: Box<dyn StoreBackend>,
    observers: ObserverRegistry,
    product_ids: ProductIdMapper,
    auto_finish_purchases: bool,
}

impl PurchaseService {
    pub fn new(backend: Box<dyn StoreBackend>) -> Self {
        Self {
            backend,
            observers: ObserverRegistry::default(),
            product_ids: ProductIdMapper::default(),
            auto_finish_purchases: true,
        }
    }

    pub fn with_config(backend: Box<dyn StoreBackend>, config: &PurchaseServiceConfig) -> Self {
        let mut service = Self::new(backend);
        service.auto_finish_purchases = config.auto_finish_purchases;
        service.map_product_ids(config.product_aliases.clone());
        if let Some(validation) = &config.server_validation {
            service.set_validation_handler(Some(Rc::new(ServerValidationHandler::new(
                validation.clone(),
            ))));
        }
        service
    }

    // Observers.
    // ------------------------------------------------------------------------

    pub fn add_purchase_observer<O: PurchaseObserver + 'static>(&self, observer: &Rc<O>) {
        self.observers.add(observer);
    }

    pub fn remove_purchase_observer<O: PurchaseObserver + 'static>(&self, observer: &Rc<O>) {
        self.observers.remove(observer);
    }

    /// Shared handle to the observer set, usable from inside a notification.
    pub fn observers(&self) -> ObserverRegistry {
        self.observers.clone()
    }

    // Configuration.
    // ------------------------------------------------------------------------

    /// Replaces the alias table (alias → real product id).
    pub fn map_product_ids(&mut self, aliases: HashMap<String, String>) {
        self.product_ids.set_aliases(aliases);
    }

    pub fn set_auto_finish_purchases(&mut self, enabled: bool) {
        self.auto_finish_purchases = enabled;
    }

    pub fn auto_finish_purchases(&self) -> bool {
        self.auto_finish_purchases
    }

    /// Installs a receipt validator, replacing the active one. `None` restores
    /// the default, which accepts every receipt.
    pub fn set_validation_handler(&mut self, handler: Option<Rc<dyn ValidationHandler>>) {
        self.backend.set_validation_handler(handler);
    }

    pub fn set_ludei_server_validation_handler(&mut self) {
        self.backend.set_ludei_server_validation_handler();
    }

    // Store operations.
    // ------------------------------------------------------------------------

    /// Starts lifecycle event delivery. Register observers first: events the
    /// store sends earlier are lost.
    pub fn start(&mut self) {
        self.backend.start();
    }

    pub fn fetch_products<S, F>(&mut self, product_ids: &[S], callback: F)
    where
        S: AsRef<str>,
        F: FnOnce(Vec<Product>, StoreError) + 'static,
    {
        let resolved = product_ids
            .iter()
            .map(|id| self.product_ids.resolve(id.as_ref()).to_string())
            .collect();
        self.backend.fetch_products(resolved, Box::new(callback));
    }

    pub fn get_products(&self) -> Vec<Product> {
        self.backend.get_products()
    }

    pub fn product_for_id(&self, product_id: &str) -> Option<Product> {
        self.backend
            .product_for_id(self.product_ids.resolve(product_id))
    }

    pub fn is_purchased(&self, product_id: &str) -> bool {
        self.backend.is_purchased(self.product_ids.resolve(product_id))
    }

    pub fn stock_of_product(&self, product_id: &str) -> i32 {
        self.backend
            .stock_of_product(self.product_ids.resolve(product_id))
    }

    pub fn can_purchase(&self) -> bool {
        self.backend.can_purchase()
    }

    /// Replays earlier transactions as completed events; `callback` only
    /// reports whether the restore itself succeeded.
    pub fn restore_purchases<F>(&mut self, callback: F)
    where
        F: FnOnce(StoreError) + 'static,
    {
        self.backend.restore_purchases(Box::new(callback));
    }

    /// Purchases a single unit of `product_id`.
    pub fn purchase<F>(&mut self, product_id: &str, callback: F)
    where
        F: FnOnce(Purchase, StoreError) + 'static,
    {
        self.purchase_quantity(product_id, 1, callback);
    }

    pub fn purchase_quantity<F>(&mut self, product_id: &str, quantity: i32, callback: F)
    where
        F: FnOnce(Purchase, StoreError) + 'static,
    {
        let resolved = self.product_ids.resolve(product_id).to_string();
        self.backend.purchase(&resolved, quantity, Box::new(callback));
    }

    pub fn consume<F>(&mut self, product_id: &str, quantity: i32, callback: F)
    where
        F: FnOnce(i32, StoreError) + 'static,
    {
        let resolved = self.product_ids.resolve(product_id).to_string();
        self.backend.consume(&resolved, quantity, Box::new(callback));
    }

    pub fn finish_purchase(&mut self, transaction_id: &str) {
        self.backend.finish_purchase(transaction_id);
    }

    pub fn pending_callbacks(&self) -> usize {
        self.backend.pending_callbacks()
    }

    // Future-based variants.
    // ------------------------------------------------------------------------

    pub fn fetch_products_async<S: AsRef<str>>(
        &mut self,
        product_ids: &[S],
    ) -> Completion<(Vec<Product>, StoreError)> {
        let (tx, rx) = oneshot::channel();
        self.fetch_products(product_ids, move |products, error| {
            let _ = tx.send((products, error));
        });
        rx
    }

    pub fn restore_purchases_async(&mut self) -> Completion<StoreError> {
        let (tx, rx) = oneshot::channel();
        self.restore_purchases(move |error| {
            let _ = tx.send(error);
        });
        rx
    }

    pub fn purchase_async(
        &mut self,
        product_id: &str,
        quantity: i32,
    ) -> Completion<(Purchase, StoreError)> {
        let (tx, rx) = oneshot::channel();
        self.purchase_quantity(product_id, quantity, move |purchase, error| {
            let _ = tx.send((purchase, error));
        });
        rx
    }

    pub fn consume_async(&mut self, product_id: &str, quantity: i32) -> Completion<(i32, StoreError)> {
        let (tx, rx) = oneshot::channel();
        self.consume(product_id, quantity, move |consumed, error| {
            let _ = tx.send((consumed, error));
        });
        rx
    }

    // Dispatch.
    // ------------------------------------------------------------------------

    /// Handles every message the store has queued, without waiting. Returns
    /// how many were handled.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.backend.dispatch_one() {
                Dispatched::Idle | Dispatched::Disconnected => return handled,
                Dispatched::Reply => {}
                Dispatched::Event(event) => self.deliver(event),
            }
            handled += 1;
        }
    }

    /// Waits for and handles the next store message. Returns `false` once the
    /// store runtime has gone away.
    pub async fn dispatch_next(&mut self) -> bool {
        match self.backend.dispatch_next().await {
            Dispatched::Disconnected => false,
            Dispatched::Event(event) => {
                self.deliver(event);
                true
            }
            Dispatched::Idle | Dispatched::Reply => true,
        }
    }

    /// Dispatches store messages until `future` resolves.
    pub async fn run_until<F: Future>(&mut self, future: F) -> F::Output {
        let mut future = pin!(future);
        loop {
            let alive = match select(future.as_mut(), pin!(self.dispatch_next())).await {
                Either::Left((output, _)) => return output,
                Either::Right((alive, _)) => alive,
            };
            if !alive {
                return future.await;
            }
        }
    }

    fn deliver(&mut self, event: PurchaseEvent) {
        match event {
            PurchaseEvent::Started { product_id } => self.observers.notify_started(&product_id),
            PurchaseEvent::Failed { product_id, error } => {
                self.observers.notify_failed(&product_id, &error)
            }
            PurchaseEvent::Completed(purchase) => {
                self.observers.notify_completed(&purchase);
                if self.auto_finish_purchases {
                    self.backend.finish_purchase(&purchase.transaction_id);
                }
            }
        }
    }
}
