use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::domain::{
    entities::{purchase::Purchase, store_error::StoreError},
    handlers::purchase_observer::PurchaseObserver,
};

struct Entry {
    id: *const (),
    observer: Weak<dyn PurchaseObserver>,
}

/// Ordered set of purchase observers, held without ownership.
///
/// Clones share the same set, so an observer holding a clone can add or
/// remove observers while being notified. Each notification runs over a
/// snapshot taken when it starts.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    entries: Rc<RefCell<Vec<Entry>>>,
}

impl ObserverRegistry {
    /// Appends `observer` unless it is already registered.
    pub fn add<O: PurchaseObserver + 'static>(&self, observer: &Rc<O>) {
        let id = Rc::as_ptr(observer) as *const ();
        let mut entries = self.entries.borrow_mut();
        entries.retain(|e| e.observer.strong_count() > 0);
        if entries.iter().any(|e| e.id == id) {
            return;
        }
        let observer: Rc<dyn PurchaseObserver> = observer.clone();
        entries.push(Entry {
            id,
            observer: Rc::downgrade(&observer),
        });
    }

    /// Removes `observer`; does nothing if it is not registered.
    pub fn remove<O: PurchaseObserver + 'static>(&self, observer: &Rc<O>) {
        let id = Rc::as_ptr(observer) as *const ();
        let mut entries = self.entries.borrow_mut();
        if let Some(position) = entries.iter().position(|e| e.id == id) {
            entries.remove(position);
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.observer.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify_started(&self, product_id: &str) {
        for observer in self.snapshot() {
            observer.on_purchase_started(product_id);
        }
    }

    pub fn notify_failed(&self, product_id: &str, error: &StoreError) {
        for observer in self.snapshot() {
            observer.on_purchase_failed(product_id, error);
        }
    }

    pub fn notify_completed(&self, purchase: &Purchase) {
        for observer in self.snapshot() {
            observer.on_purchase_completed(purchase);
        }
    }

    fn snapshot(&self) -> Vec<Rc<dyn PurchaseObserver>> {
        self.entries
            .borrow()
            .iter()
            .filter_map(|e| e.observer.upgrade())
            .collect()
    }
}
