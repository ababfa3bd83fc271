use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};

use crate::data::models::native_store::{
    native_message_model::NativeMessage, native_product_model::NativeProductModel,
    native_purchase_model::NativePurchaseModel,
};

/// Entry points a store runtime calls to talk back to the owning context.
///
/// Safe to clone and call from any thread: every call only queues a
/// `NativeMessage`; nothing runs until the service dispatches it. Dropping
/// every clone tells the service the runtime is gone.
#[derive(Debug, Clone)]
pub struct NativeReplySink {
    sender: UnboundedSender<NativeMessage>,
}

pub(crate) fn reply_channel() -> (NativeReplySink, UnboundedReceiver<NativeMessage>) {
    let (sender, receiver) = unbounded();
    (NativeReplySink { sender }, receiver)
}

impl NativeReplySink {
    pub fn purchase_started(&self, product_id: impl Into<String>) {
        self.send(NativeMessage::PurchaseStarted {
            product_id: product_id.into(),
        });
    }

    pub fn purchase_failed(&self, product_id: impl Into<String>, code: i32, message: impl Into<String>) {
        self.send(NativeMessage::PurchaseFailed {
            product_id: product_id.into(),
            code,
            message: message.into(),
        });
    }

    pub fn purchase_completed(
        &self,
        transaction_id: impl Into<String>,
        product_id: impl Into<String>,
        quantity: i32,
        date: i64,
    ) {
        self.send(NativeMessage::PurchaseCompleted {
            transaction_id: transaction_id.into(),
            product_id: product_id.into(),
            quantity,
            date,
        });
    }

    pub fn fetch_reply(
        &self,
        handle: u64,
        products: Vec<NativeProductModel>,
        code: i32,
        message: impl Into<String>,
    ) {
        self.send(NativeMessage::FetchReply {
            handle,
            products,
            code,
            message: message.into(),
        });
    }

    pub fn restore_reply(&self, handle: u64, code: i32, message: impl Into<String>) {
        self.send(NativeMessage::RestoreReply {
            handle,
            code,
            message: message.into(),
        });
    }

    pub fn purchase_reply(
        &self,
        handle: u64,
        purchase: Option<NativePurchaseModel>,
        code: i32,
        message: impl Into<String>,
    ) {
        self.send(NativeMessage::PurchaseReply {
            handle,
            purchase,
            code,
            message: message.into(),
        });
    }

    pub fn consume_reply(&self, handle: u64, consumed: i32, code: i32, message: impl Into<String>) {
        self.send(NativeMessage::ConsumeReply {
            handle,
            consumed,
            code,
            message: message.into(),
        });
    }

    pub fn validation_request(
        &self,
        receipt: impl Into<String>,
        product_id: impl Into<String>,
        completion_id: u64,
    ) {
        self.send(NativeMessage::ValidationRequest {
            receipt: receipt.into(),
            product_id: product_id.into(),
            completion_id,
        });
    }

    fn send(&self, message: NativeMessage) {
        if self.sender.unbounded_send(message).is_err() {
            log::debug!("Store service is gone; dropping native message.");
        }
    }
}
