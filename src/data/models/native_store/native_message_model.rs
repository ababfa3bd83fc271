use super::{native_product_model::NativeProductModel, native_purchase_model::NativePurchaseModel};

/// Everything a store runtime can send back to the owning context.
///
/// Replies carry the raw callback handle issued with the request; events are
/// unsolicited.
#[derive(Debug, Clone)]
pub enum NativeMessage {
    PurchaseStarted {
        product_id: String,
    },
    PurchaseFailed {
        product_id: String,
        code: i32,
        message: String,
    },
    PurchaseCompleted {
        transaction_id: String,
        product_id: String,
        quantity: i32,
        /// Unix milliseconds.
        date: i64,
    },
    FetchReply {
        handle: u64,
        products: Vec<NativeProductModel>,
        code: i32,
        message: String,
    },
    RestoreReply {
        handle: u64,
        code: i32,
        message: String,
    },
    PurchaseReply {
        handle: u64,
        purchase: Option<NativePurchaseModel>,
        code: i32,
        message: String,
    },
    ConsumeReply {
        handle: u64,
        consumed: i32,
        code: i32,
        message: String,
    },
    /// The runtime wants a receipt checked before completing a purchase.
    /// Answered with `NativeStoreDatasource::finish_validation`.
    ValidationRequest {
        receipt: String,
        product_id: String,
        completion_id: u64,
    },
}
