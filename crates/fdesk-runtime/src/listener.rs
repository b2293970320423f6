#![forbid(unsafe_code)]

//! Scoped pointer listeners for outside-click detection.
//!
//! A widget that wants to hear about pointer presses outside itself registers
//! with the host's [`PointerListeners`] and keeps the returned
//! [`ListenerGuard`] for as long as it cares, typically exactly while an
//! overlay is open. Dropping the guard deregisters, so a closed or destroyed
//! widget can never be notified.
//!
//! The host calls [`PointerListeners::outside_of`] with the hit-test result of
//! a primary press *before* routing the press to widgets. A widget opened by
//! that same press has not registered yet and is therefore not told to close.

use fdesk_render::frame::HitId;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Registry {
    next: u64,
    entries: BTreeMap<u64, HitId>,
}

/// Host-side registry of active outside-click listeners.
///
/// Cloning shares the registry. Single-threaded by construction.
#[derive(Debug, Clone, Default)]
pub struct PointerListeners {
    registry: Rc<RefCell<Registry>>,
}

impl PointerListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `owner`; the listener lives until the guard drops.
    pub fn register(&self, owner: HitId) -> ListenerGuard {
        let mut registry = self.registry.borrow_mut();
        let key = registry.next;
        registry.next += 1;
        registry.entries.insert(key, owner);
        tracing::trace!(target: "fdesk.listener", owner = owner.id(), key, "listener attached");
        ListenerGuard {
            registry: Rc::downgrade(&self.registry),
            key,
            owner,
        }
    }

    /// Owners whose listener should fire for a press that hit `hit`.
    ///
    /// A press inside an owner's own cells is not outside. Owners are returned
    /// once each, in registration order.
    pub fn outside_of(&self, hit: Option<HitId>) -> Vec<HitId> {
        let registry = self.registry.borrow();
        let mut owners: Vec<HitId> = Vec::with_capacity(registry.entries.len());
        for owner in registry.entries.values() {
            if Some(*owner) != hit && !owners.contains(owner) {
                owners.push(*owner);
            }
        }
        owners
    }

    pub fn is_listening(&self, owner: HitId) -> bool {
        self.registry
            .borrow()
            .entries
            .values()
            .any(|o| *o == owner)
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Live registration. Dropping it removes the listener.
#[derive(Debug)]
pub struct ListenerGuard {
    registry: std::rc::Weak<RefCell<Registry>>,
    key: u64,
    owner: HitId,
}

impl ListenerGuard {
    pub fn owner(&self) -> HitId {
        self.owner
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if let Ok(mut registry) = registry.try_borrow_mut()
            && registry.entries.remove(&self.key).is_some()
        {
            tracing::trace!(
                target: "fdesk.listener",
                owner = self.owner.id(),
                key = self.key,
                "listener detached"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_scopes_registration() {
        let listeners = PointerListeners::new();
        let guard = listeners.register(HitId::new(3));
        assert!(listeners.is_listening(HitId::new(3)));
        drop(guard);
        assert!(listeners.is_empty());
    }

    #[test]
    fn press_on_owner_is_not_outside() {
        let listeners = PointerListeners::new();
        let _a = listeners.register(HitId::new(1));
        let _b = listeners.register(HitId::new(2));
        assert_eq!(listeners.outside_of(Some(HitId::new(1))), vec![HitId::new(2)]);
        assert_eq!(listeners.outside_of(None), vec![HitId::new(1), HitId::new(2)]);
    }

    #[test]
    fn duplicate_registrations_report_once() {
        let listeners = PointerListeners::new();
        let _a = listeners.register(HitId::new(5));
        let _b = listeners.register(HitId::new(5));
        assert_eq!(listeners.outside_of(None), vec![HitId::new(5)]);
        assert_eq!(listeners.len(), 2);
    }

    #[test]
    fn guard_outliving_registry_is_harmless() {
        let listeners = PointerListeners::new();
        let guard = listeners.register(HitId::new(9));
        drop(listeners);
        assert_eq!(guard.owner(), HitId::new(9));
        drop(guard);
    }
}
