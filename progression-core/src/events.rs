//! Observer notifications emitted by the trackers.
//!
//! Each tracker owns a [`Notifier`] for its own event type. Hosts subscribe
//! with a closure and receive a [`Subscription`] guard; dropping the guard
//! deregisters the listener, so a subscription never outlives the entity
//! that registered it.
//!
//! Emission snapshots the listener list before invoking anything, which lets
//! a listener subscribe or unsubscribe from inside a callback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::types::ItemId;

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener<E>)>>,
}

/// An observer list for events of type `E`.
pub struct Notifier<E> {
    registry: Arc<Registry<E>>,
}

impl<E: 'static> Notifier<E> {
    /// Create a notifier with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                next_id: AtomicU64::new(0),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register a listener. It stays registered until the returned guard is
    /// dropped or [`Subscription::detach`]ed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
        E: Send + Sync,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.listeners.lock().push((id, Arc::new(listener)));

        let weak: Weak<Registry<E>> = Arc::downgrade(&self.registry);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.listeners.lock().retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Deliver `event` to every current listener, in subscription order.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .registry
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry.listeners.lock().len()
    }
}

impl<E: 'static> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.registry.listeners.lock().len())
            .finish()
    }
}

/// Scoped registration handle returned by [`Notifier::subscribe`].
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Explicitly remove the listener. Equivalent to dropping the guard.
    pub fn detach(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Event payloads
// ---------------------------------------------------------------------------

/// Notifications from a [`crate::vitality::VitalityTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VitalityEvent {
    /// Damage landed without killing. Carries the raw damage argument.
    DamageTaken {
        /// Damage as requested by the caller, before clamping.
        amount: f32,
    },
    /// This hit brought health to zero. Fires once per death.
    Died,
    /// Alive → dead edge; the animation layer plays the death animation.
    Collapsed,
    /// Dead → alive edge; the animation layer resets its state.
    Revived,
}

/// Notifications from an [`crate::experience::ExperienceLedger`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExperienceEvent {
    /// Experience was added.
    Gained {
        /// Amount added by this call.
        amount: f32,
        /// Ledger total after the update.
        total: f32,
    },
}

/// Notifications from a [`crate::quest::QuestTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestEvent {
    /// A new quest record was created.
    Added {
        /// Quest name.
        quest: String,
    },
    /// An objective was marked complete.
    ObjectiveCompleted {
        /// Quest name.
        quest: String,
        /// Objective reference.
        objective: String,
        /// Whether the quest as a whole is now complete.
        quest_complete: bool,
    },
    /// A reward could not be placed in the inventory and was dropped.
    RewardDropped {
        /// Quest name.
        quest: String,
        /// Item dropped into the world.
        item: ItemId,
        /// Stack size.
        count: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn emit_without_listeners_is_noop() {
        let notifier: Notifier<u32> = Notifier::new();
        notifier.emit(&7);
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let notifier: Notifier<u32> = Notifier::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let sub = notifier.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        notifier.emit(&1);
        drop(sub);
        notifier.emit(&2);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn detach_outliving_notifier_is_harmless() {
        let notifier: Notifier<u32> = Notifier::new();
        let sub = notifier.subscribe(|_| {});
        drop(notifier);
        sub.detach();
    }

    #[test]
    fn listeners_receive_payload_in_order() {
        let notifier: Notifier<u32> = Notifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let a = Arc::clone(&seen);
        let _first = notifier.subscribe(move |e| a.lock().push(("first", *e)));
        let b = Arc::clone(&seen);
        let _second = notifier.subscribe(move |e| b.lock().push(("second", *e)));

        notifier.emit(&5);
        assert_eq!(*seen.lock(), vec![("first", 5), ("second", 5)]);
    }
}
