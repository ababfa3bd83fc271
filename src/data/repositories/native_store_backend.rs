use std::{cell::RefCell, rc::Rc};

use async_trait::async_trait;
use futures::{
    channel::mpsc::UnboundedReceiver,
    future::{select, Either, LocalBoxFuture},
    stream::FuturesUnordered,
    FutureExt, StreamExt,
};

use crate::{
    constants::{RUNTIME_DISCONNECTED_ERROR_CODE, VALIDATION_NOT_LOCAL_ERROR_CODE},
    data::{
        bridge::{
            callback_bridge::{CallbackBridge, NativeReply, PendingCallback},
            native_reply_sink::reply_channel,
        },
        datasources::native_store_datasource::{NativeStoreConnector, NativeStoreDatasource},
        models::native_store::{
            native_message_model::NativeMessage, native_purchase_model::unix_millis_to_datetime,
        },
    },
    domain::{
        entities::{
            product::Product, purchase::Purchase, purchase_event::PurchaseEvent,
            store_error::StoreError,
        },
        handlers::validation_handler::{AcceptAllValidationHandler, ValidationHandler},
        repositories::store_backend::{
            ConsumeCallback, Dispatched, FetchCallback, PurchaseCallback, RestoreCallback,
            StoreBackend,
        },
    },
};

enum Validator {
    Local(Rc<dyn ValidationHandler>),
    /// The runtime validates against its own server.
    StoreServer,
}

/// Backend that drives a store runtime through a `NativeStoreDatasource`.
pub struct NativeStoreBackend<D: NativeStoreDatasource> {
    identifier: String,
    datasource: D,
    replies: UnboundedReceiver<NativeMessage>,
    callbacks: CallbackBridge,
    products: Rc<RefCell<Vec<Product>>>,
    validator: Validator,
    validations: FuturesUnordered<LocalBoxFuture<'static, (u64, StoreError)>>,
    started: bool,
    disconnected: bool,
}

impl<D: NativeStoreDatasource> NativeStoreBackend<D> {
    /// Connects a fresh datasource and asks it to load `identifier`.
    ///
    /// Returns `None` when the runtime does not provide that store.
    pub fn connect<C>(connector: &C, identifier: &str) -> Option<Self>
    where
        C: NativeStoreConnector<Datasource = D>,
    {
        let (sink, replies) = reply_channel();
        let datasource = connector.connect(sink);
        if !datasource.init(identifier) {
            log::info!("Store backend {identifier} is not available.");
            return None;
        }
        let mut products = Vec::new();
        for m in datasource.get_products() {
            upsert_product(&mut products, Product::from(m));
        }
        log::debug!(
            "Store backend {identifier} initialized with {} cached products.",
            products.len()
        );
        Some(Self {
            identifier: identifier.to_string(),
            datasource,
            replies,
            callbacks: CallbackBridge::default(),
            products: Rc::new(RefCell::new(products)),
            validator: Validator::Local(Rc::new(AcceptAllValidationHandler)),
            validations: FuturesUnordered::new(),
            started: false,
            disconnected: false,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    fn handle(&mut self, message: NativeMessage) -> Dispatched {
        match message {
            NativeMessage::PurchaseStarted { product_id } => {
                self.event(PurchaseEvent::Started { product_id })
            }
            NativeMessage::PurchaseFailed {
                product_id,
                code,
                message,
            } => self.event(PurchaseEvent::Failed {
                product_id,
                error: StoreError::new(code, message),
            }),
            NativeMessage::PurchaseCompleted {
                transaction_id,
                product_id,
                quantity,
                date,
            } => self.event(PurchaseEvent::Completed(Purchase {
                transaction_id,
                product_id,
                purchase_date: unix_millis_to_datetime(date),
                quantity: quantity.max(1),
            })),
            NativeMessage::FetchReply {
                handle,
                products,
                code,
                message,
            } => self.reply(
                handle,
                NativeReply::Fetch {
                    products,
                    error: StoreError::new(code, message),
                },
            ),
            NativeMessage::RestoreReply {
                handle,
                code,
                message,
            } => self.reply(
                handle,
                NativeReply::Restore {
                    error: StoreError::new(code, message),
                },
            ),
            NativeMessage::PurchaseReply {
                handle,
                purchase,
                code,
                message,
            } => self.reply(
                handle,
                NativeReply::Purchase {
                    purchase,
                    error: StoreError::new(code, message),
                },
            ),
            NativeMessage::ConsumeReply {
                handle,
                consumed,
                code,
                message,
            } => self.reply(
                handle,
                NativeReply::Consume {
                    consumed,
                    error: StoreError::new(code, message),
                },
            ),
            NativeMessage::ValidationRequest {
                receipt,
                product_id,
                completion_id,
            } => {
                self.validate(receipt, product_id, completion_id);
                Dispatched::Reply
            }
        }
    }

    fn event(&self, event: PurchaseEvent) -> Dispatched {
        if !self.started {
            log::debug!("Dropping {event:?}: backend {} not started.", self.identifier);
            return Dispatched::Reply;
        }
        Dispatched::Event(event)
    }

    fn reply(&mut self, handle: u64, reply: NativeReply) -> Dispatched {
        if let Err(e) = self.callbacks.invoke(handle, reply) {
            log::warn!("Discarding native reply: {e}");
        }
        Dispatched::Reply
    }

    fn validate(&mut self, receipt: String, product_id: String, completion_id: u64) {
        match &self.validator {
            Validator::StoreServer => {
                log::warn!("Runtime asked for local validation of {product_id} while server validation is active.");
                self.datasource.finish_validation(
                    completion_id,
                    &StoreError::new(
                        VALIDATION_NOT_LOCAL_ERROR_CODE,
                        "Receipt validation is handled by the store runtime.",
                    ),
                );
            }
            Validator::Local(handler) => {
                let handler = handler.clone();
                self.validations.push(
                    async move {
                        let error = handler.validate(&receipt, &product_id).await;
                        (completion_id, error)
                    }
                    .boxed_local(),
                );
                self.poll_validations();
            }
        }
    }

    fn poll_validations(&mut self) {
        while let Some(Some((completion_id, error))) = self.validations.next().now_or_never() {
            self.datasource.finish_validation(completion_id, &error);
        }
    }

    fn disconnect(&mut self) -> Dispatched {
        if !self.disconnected {
            self.disconnected = true;
            let failed = self.callbacks.fail_all(&StoreError::new(
                RUNTIME_DISCONNECTED_ERROR_CODE,
                "Store runtime disconnected.",
            ));
            log::warn!(
                "Store backend {} disconnected; failed {failed} pending callbacks.",
                self.identifier
            );
        }
        Dispatched::Disconnected
    }
}

#[async_trait(?Send)]
impl<D: NativeStoreDatasource> StoreBackend for NativeStoreBackend<D> {
    fn start(&mut self) {
        if !self.started {
            self.started = true;
            self.datasource.start();
        }
    }

    fn fetch_products(&mut self, product_ids: Vec<String>, callback: FetchCallback) {
        let cache = self.products.clone();
        let handle = self
            .callbacks
            .wrap(PendingCallback::Fetch(Box::new(move |products, error| {
                if error.is_empty() {
                    let mut cache = cache.borrow_mut();
                    for product in &products {
                        upsert_product(&mut cache, product.clone());
                    }
                }
                callback(products, error);
            })));
        self.datasource.fetch_products(&product_ids, handle);
    }

    fn get_products(&self) -> Vec<Product> {
        self.products.borrow().clone()
    }

    fn product_for_id(&self, product_id: &str) -> Option<Product> {
        let cached = self
            .products
            .borrow()
            .iter()
            .find(|p| p.product_id == product_id)
            .cloned();
        cached.or_else(|| {
            let product = Product::from(self.datasource.product_for_id(product_id)?);
            upsert_product(&mut self.products.borrow_mut(), product.clone());
            Some(product)
        })
    }

    fn is_purchased(&self, product_id: &str) -> bool {
        self.datasource.is_purchased(product_id)
    }

    fn stock_of_product(&self, product_id: &str) -> i32 {
        self.datasource.stock_of_product(product_id)
    }

    fn can_purchase(&self) -> bool {
        self.datasource.can_purchase()
    }

    fn restore_purchases(&mut self, callback: RestoreCallback) {
        let handle = self.callbacks.wrap(PendingCallback::Restore(callback));
        self.datasource.restore_purchases(handle);
    }

    fn purchase(&mut self, product_id: &str, quantity: i32, callback: PurchaseCallback) {
        let handle = self.callbacks.wrap(PendingCallback::Purchase(callback));
        self.datasource.purchase(product_id, quantity.max(1), handle);
    }

    fn consume(&mut self, product_id: &str, quantity: i32, callback: ConsumeCallback) {
        let handle = self.callbacks.wrap(PendingCallback::Consume {
            requested: quantity,
            callback,
        });
        self.datasource.consume(product_id, quantity, handle);
    }

    fn finish_purchase(&mut self, transaction_id: &str) {
        self.datasource.finish_purchase(transaction_id);
    }

    fn set_validation_handler(&mut self, handler: Option<Rc<dyn ValidationHandler>>) {
        self.datasource.set_custom_validation_enabled(handler.is_some());
        self.validator = Validator::Local(
            handler.unwrap_or_else(|| Rc::new(AcceptAllValidationHandler)),
        );
    }

    fn set_ludei_server_validation_handler(&mut self) {
        self.validator = Validator::StoreServer;
        self.datasource.set_ludei_server_validation_handler();
    }

    fn pending_callbacks(&self) -> usize {
        self.callbacks.pending()
    }

    fn dispatch_one(&mut self) -> Dispatched {
        self.poll_validations();
        if self.disconnected {
            return Dispatched::Disconnected;
        }
        #[allow(deprecated)]
        let next = self.replies.try_next();
        match next {
            Ok(Some(message)) => self.handle(message),
            Ok(None) => self.disconnect(),
            Err(_) => Dispatched::Idle,
        }
    }

    async fn dispatch_next(&mut self) -> Dispatched {
        loop {
            if self.disconnected {
                return Dispatched::Disconnected;
            }
            if self.validations.is_empty() {
                return match self.replies.next().await {
                    Some(message) => self.handle(message),
                    None => self.disconnect(),
                };
            }
            let next = match select(self.replies.next(), self.validations.next()).await {
                Either::Left((message, _)) => Either::Left(message),
                Either::Right((validated, _)) => Either::Right(validated),
            };
            match next {
                Either::Left(Some(message)) => return self.handle(message),
                Either::Left(None) => return self.disconnect(),
                Either::Right(Some((completion_id, error))) => {
                    self.datasource.finish_validation(completion_id, &error)
                }
                Either::Right(None) => {}
            }
        }
    }
}

/// Replaces the product with the same id in place, or appends it.
fn upsert_product(products: &mut Vec<Product>, product: Product) {
    match products
        .iter_mut()
        .find(|p| p.product_id == product.product_id)
    {
        Some(existing) => *existing = product,
        None => products.push(product),
    }
}
