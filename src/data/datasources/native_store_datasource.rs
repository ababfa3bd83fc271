use crate::{
    data::{
        bridge::{callback_bridge::CallbackHandle, native_reply_sink::NativeReplySink},
        models::native_store::native_product_model::NativeProductModel,
    },
    domain::entities::store_error::StoreError,
};

/// Calls into one store runtime (the platform bridge object).
///
/// Asynchronous calls return immediately; the runtime answers later through
/// the `NativeReplySink` it was connected with, quoting `callback.to_raw()`.
/// Each request must be answered at most once.
pub trait NativeStoreDatasource {
    /// Instantiates the store implementation named by `identifier`. Returns
    /// `false` if it is not linked or not available on this device.
    fn init(&self, identifier: &str) -> bool;

    /// Begins delivering lifecycle events.
    fn start(&self);

    fn fetch_products(&self, product_ids: &[String], callback: CallbackHandle);

    /// Products the runtime has persisted from earlier fetches.
    fn get_products(&self) -> Vec<NativeProductModel>;

    /// Local lookup in the runtime's persisted products. Must not reach the
    /// network.
    fn product_for_id(&self, product_id: &str) -> Option<NativeProductModel>;

    /// Reads the runtime's local purchase ledger; may be stale until purchases
    /// are restored.
    fn is_purchased(&self, product_id: &str) -> bool;

    fn stock_of_product(&self, product_id: &str) -> i32;

    fn can_purchase(&self) -> bool;

    fn restore_purchases(&self, callback: CallbackHandle);

    fn purchase(&self, product_id: &str, quantity: i32, callback: CallbackHandle);

    fn consume(&self, product_id: &str, quantity: i32, callback: CallbackHandle);

    fn finish_purchase(&self, transaction_id: &str);

    /// Tells the runtime whether to send `validation_request`s for receipts.
    fn set_custom_validation_enabled(&self, enabled: bool);

    /// Switches the runtime to its own server-side receipt validation.
    fn set_ludei_server_validation_handler(&self);

    /// Answers a `validation_request`; the empty error accepts the receipt.
    fn finish_validation(&self, completion_id: u64, error: &StoreError);
}

/// Builds datasources wired to a reply channel.
pub trait NativeStoreConnector {
    type Datasource: NativeStoreDatasource + 'static;

    /// The returned datasource (or the runtime behind it) owns `replies`.
    fn connect(&self, replies: NativeReplySink) -> Self::Datasource;
}
