use crate::{
    data::models::native_store::{
        native_product_model::NativeProductModel, native_purchase_model::NativePurchaseModel,
    },
    domain::{
        entities::{product::Product, purchase::Purchase, store_error::StoreError},
        repositories::store_backend::{
            ConsumeCallback, FetchCallback, PurchaseCallback, RestoreCallback,
        },
    },
    errors::BridgeError,
};

/// Opaque token for a callback waiting on a native reply.
///
/// Crosses the boundary as a `u64` (generation in the high half, slot index in
/// the low half). Generations start at 1, so a raw `0` is never a live handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle {
    index: u32,
    generation: u32,
}

impl CallbackHandle {
    pub fn to_raw(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    pub fn from_raw(raw: u64) -> Self {
        Self {
            index: raw as u32,
            generation: (raw >> 32) as u32,
        }
    }
}

pub(crate) enum PendingCallback {
    Fetch(FetchCallback),
    Restore(RestoreCallback),
    Purchase(PurchaseCallback),
    Consume {
        requested: i32,
        callback: ConsumeCallback,
    },
}

impl PendingCallback {
    fn kind(&self) -> &'static str {
        match self {
            PendingCallback::Fetch(_) => "fetch",
            PendingCallback::Restore(_) => "restore",
            PendingCallback::Purchase(_) => "purchase",
            PendingCallback::Consume { .. } => "consume",
        }
    }

    /// Completes the callback without a reply from the runtime.
    pub(crate) fn fail(self, error: StoreError) {
        match self {
            PendingCallback::Fetch(callback) => callback(Vec::new(), error),
            PendingCallback::Restore(callback) => callback(error),
            PendingCallback::Purchase(callback) => callback(Purchase::default(), error),
            PendingCallback::Consume { callback, .. } => callback(0, error),
        }
    }
}

/// Raw reply payloads, before decoding into domain values.
#[derive(Debug)]
pub(crate) enum NativeReply {
    Fetch {
        products: Vec<NativeProductModel>,
        error: StoreError,
    },
    Restore {
        error: StoreError,
    },
    Purchase {
        purchase: Option<NativePurchaseModel>,
        error: StoreError,
    },
    Consume {
        consumed: i32,
        error: StoreError,
    },
}

impl NativeReply {
    fn kind(&self) -> &'static str {
        match self {
            NativeReply::Fetch { .. } => "fetch",
            NativeReply::Restore { .. } => "restore",
            NativeReply::Purchase { .. } => "purchase",
            NativeReply::Consume { .. } => "consume",
        }
    }
}

struct Slot {
    generation: u32,
    callback: Option<PendingCallback>,
}

/// Table of callbacks handed across the native boundary.
///
/// Each handle completes at most once. Replies for a handle that was already
/// completed, or that was never issued, are rejected instead of reaching a
/// reused slot.
#[derive(Default)]
pub(crate) struct CallbackBridge {
    slots: Vec<Slot>,
    free: Vec<u32>,
    pending: usize,
}

impl CallbackBridge {
    pub(crate) fn wrap(&mut self, callback: PendingCallback) -> CallbackHandle {
        self.pending += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = match slot.generation.wrapping_add(1) {
                0 => 1,
                g => g,
            };
            slot.callback = Some(callback);
            return CallbackHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            callback: Some(callback),
        });
        CallbackHandle {
            index,
            generation: 1,
        }
    }

    /// Decodes `reply` and runs the callback registered under `raw_handle`,
    /// releasing the handle.
    pub(crate) fn invoke(&mut self, raw_handle: u64, reply: NativeReply) -> Result<(), BridgeError> {
        let slot = self.live_slot(raw_handle)?;
        let expected = slot.callback.as_ref().map(PendingCallback::kind).unwrap_or("");
        if expected != reply.kind() {
            return Err(BridgeError::ReplyKindMismatch {
                handle: raw_handle,
                expected,
                actual: reply.kind(),
            });
        }
        let callback = self.release(raw_handle)?;
        match (callback, reply) {
            (PendingCallback::Fetch(callback), NativeReply::Fetch { products, error }) => {
                callback(products.into_iter().map(Product::from).collect(), error)
            }
            (PendingCallback::Restore(callback), NativeReply::Restore { error }) => callback(error),
            (PendingCallback::Purchase(callback), NativeReply::Purchase { purchase, error }) => {
                callback(purchase.map(Purchase::from).unwrap_or_default(), error)
            }
            (
                PendingCallback::Consume {
                    requested,
                    callback,
                },
                NativeReply::Consume { consumed, error },
            ) => {
                let clamped = consumed.clamp(0, requested.max(0));
                if clamped != consumed {
                    log::warn!(
                        "Runtime reported {consumed} consumed for a request of {requested}; reporting {clamped}."
                    );
                }
                callback(clamped, error)
            }
            _ => unreachable!("reply kind checked above"),
        }
        Ok(())
    }

    /// Completes every outstanding callback with `error`.
    pub(crate) fn fail_all(&mut self, error: &StoreError) -> usize {
        let mut failed = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(callback) = slot.callback.take() {
                self.free.push(index as u32);
                failed.push(callback);
            }
        }
        self.pending = 0;
        let count = failed.len();
        for callback in failed {
            callback.fail(error.clone());
        }
        count
    }

    pub(crate) fn pending(&self) -> usize {
        self.pending
    }

    fn live_slot(&self, raw_handle: u64) -> Result<&Slot, BridgeError> {
        let handle = CallbackHandle::from_raw(raw_handle);
        let slot = self
            .slots
            .get(handle.index as usize)
            .filter(|_| handle.generation != 0)
            .ok_or(BridgeError::UnknownHandle(raw_handle))?;
        if slot.generation != handle.generation || slot.callback.is_none() {
            return Err(BridgeError::StaleHandle(raw_handle));
        }
        Ok(slot)
    }

    fn release(&mut self, raw_handle: u64) -> Result<PendingCallback, BridgeError> {
        self.live_slot(raw_handle)?;
        let index = CallbackHandle::from_raw(raw_handle).index;
        let callback = self.slots[index as usize]
            .callback
            .take()
            .ok_or(BridgeError::StaleHandle(raw_handle))?;
        self.free.push(index);
        self.pending -= 1;
        Ok(callback)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    fn counting_restore(counter: &Rc<RefCell<Vec<StoreError>>>) -> PendingCallback {
        let counter = counter.clone();
        PendingCallback::Restore(Box::new(move |error| counter.borrow_mut().push(error)))
    }

    #[test]
    fn handle_survives_raw_round_trip_and_is_never_zero() {
        let mut bridge = CallbackBridge::default();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let handle = bridge.wrap(counting_restore(&calls));
        assert_ne!(handle.to_raw(), 0);
        assert_eq!(CallbackHandle::from_raw(handle.to_raw()), handle);
    }

    #[test]
    fn second_invoke_does_not_rerun_the_callback() {
        let mut bridge = CallbackBridge::default();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let raw = bridge.wrap(counting_restore(&calls)).to_raw();

        bridge
            .invoke(raw, NativeReply::Restore { error: StoreError::none() })
            .unwrap();
        let second = bridge.invoke(raw, NativeReply::Restore { error: StoreError::none() });

        assert_eq!(second, Err(BridgeError::StaleHandle(raw)));
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(bridge.pending(), 0);
    }

    #[test]
    fn reused_slot_rejects_the_old_handle() {
        let mut bridge = CallbackBridge::default();
        let first_calls = Rc::new(RefCell::new(Vec::new()));
        let second_calls = Rc::new(RefCell::new(Vec::new()));

        let old = bridge.wrap(counting_restore(&first_calls)).to_raw();
        bridge
            .invoke(old, NativeReply::Restore { error: StoreError::none() })
            .unwrap();
        let new = bridge.wrap(counting_restore(&second_calls)).to_raw();

        assert_ne!(old, new);
        assert_eq!(
            bridge.invoke(old, NativeReply::Restore { error: StoreError::none() }),
            Err(BridgeError::StaleHandle(old))
        );
        assert!(second_calls.borrow().is_empty());
        bridge
            .invoke(new, NativeReply::Restore { error: StoreError::new(3, "nope") })
            .unwrap();
        assert_eq!(second_calls.borrow()[0], StoreError::new(3, "nope"));
    }

    #[test]
    fn unknown_and_null_handles_are_rejected() {
        let mut bridge = CallbackBridge::default();
        assert_eq!(
            bridge.invoke(0, NativeReply::Restore { error: StoreError::none() }),
            Err(BridgeError::UnknownHandle(0))
        );
        let bogus = CallbackHandle { index: 9, generation: 1 }.to_raw();
        assert_eq!(
            bridge.invoke(bogus, NativeReply::Restore { error: StoreError::none() }),
            Err(BridgeError::UnknownHandle(bogus))
        );
    }

    #[test]
    fn mismatched_reply_keeps_the_callback_pending() {
        let mut bridge = CallbackBridge::default();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let raw = bridge.wrap(counting_restore(&calls)).to_raw();

        let err = bridge
            .invoke(raw, NativeReply::Consume { consumed: 1, error: StoreError::none() })
            .unwrap_err();
        assert!(matches!(err, BridgeError::ReplyKindMismatch { expected: "restore", .. }));
        assert_eq!(bridge.pending(), 1);

        bridge
            .invoke(raw, NativeReply::Restore { error: StoreError::none() })
            .unwrap();
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn consumed_quantity_is_clamped_to_request() {
        let mut bridge = CallbackBridge::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for reported in [5, -2, 2] {
            let seen = seen.clone();
            let raw = bridge
                .wrap(PendingCallback::Consume {
                    requested: 3,
                    callback: Box::new(move |consumed, _| seen.borrow_mut().push(consumed)),
                })
                .to_raw();
            bridge
                .invoke(
                    raw,
                    NativeReply::Consume {
                        consumed: reported,
                        error: StoreError::none(),
                    },
                )
                .unwrap();
        }
        assert_eq!(*seen.borrow(), vec![3, 0, 2]);
    }

    #[test]
    fn fail_all_completes_each_pending_callback_once() {
        let mut bridge = CallbackBridge::default();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let a = bridge.wrap(counting_restore(&calls)).to_raw();
        bridge.wrap(counting_restore(&calls));

        assert_eq!(bridge.fail_all(&StoreError::new(-1, "gone")), 2);
        assert_eq!(calls.borrow().len(), 2);
        assert_eq!(bridge.pending(), 0);
        assert_eq!(
            bridge.invoke(a, NativeReply::Restore { error: StoreError::none() }),
            Err(BridgeError::StaleHandle(a))
        );
        assert_eq!(bridge.fail_all(&StoreError::new(-1, "gone")), 0);
    }
}
