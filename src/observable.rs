//! Store-and-notify primitive shared by every binding.
//!
//! `ObservableValue` keeps the latest value in a `tokio::sync::watch` slot and
//! holds two callback registries: will-change (fired before a mutation is
//! attempted) and did-change (fired once per successful store). Stream
//! subscribers read the watch slot; callback observers are invoked
//! synchronously on the thread that performed the store.
//!
//! Every store bumps a generation counter while the slot is write-locked. A
//! silent refresh carries the generation observed before its value was read
//! and is dropped if a store landed in between, so a slow reader cannot
//! overwrite a newer published value.
//!
//! Callbacks are cloned out of the registry before being invoked, so a callback
//! may register or drop observations without deadlocking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::watch;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

// ---------------------------------------------------------------------------
// Observer registry
// ---------------------------------------------------------------------------

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

impl<T> Registry<T> {
    fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

type SharedRegistry<T> = Arc<Mutex<Registry<T>>>;

fn register<T: 'static>(registry: &SharedRegistry<T>, callback: Callback<T>) -> Observation {
    let id = {
        let mut reg = registry.lock().unwrap_or_else(PoisonError::into_inner);
        let id = reg.next_id;
        reg.next_id += 1;
        reg.entries.push((id, callback));
        id
    };

    let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(registry);
    Observation {
        cancel: Some(Box::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entries
                    .retain(|(entry_id, _)| *entry_id != id);
            }
        })),
    }
}

fn notify<T>(registry: &SharedRegistry<T>, value: &T) {
    let callbacks: Vec<Callback<T>> = registry
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entries
        .iter()
        .map(|(_, cb)| Arc::clone(cb))
        .collect();
    for cb in callbacks {
        cb(value);
    }
}

fn observer_count<T>(registry: &SharedRegistry<T>) -> usize {
    registry
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entries
        .len()
}

// ---------------------------------------------------------------------------
// Observation handle
// ---------------------------------------------------------------------------

/// Keeps a callback registered. Dropping it unregisters the callback.
#[must_use = "the callback is unregistered as soon as the Observation is dropped"]
pub struct Observation {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Observation {
    /// Unregisters the callback now. Equivalent to dropping the handle.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observation")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ObservableValue
// ---------------------------------------------------------------------------

/// A single value with will-change / did-change observers and a watch slot.
pub struct ObservableValue<T> {
    slot: watch::Sender<T>,
    generation: AtomicU64,
    will_change: SharedRegistry<()>,
    did_change: SharedRegistry<T>,
}

impl<T> ObservableValue<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (slot, _) = watch::channel(initial);
        Self {
            slot,
            generation: AtomicU64::new(0),
            will_change: Arc::new(Mutex::new(Registry::new())),
            did_change: Arc::new(Mutex::new(Registry::new())),
        }
    }

    /// Returns the stored value.
    pub fn get(&self) -> T {
        self.slot.borrow().clone()
    }

    /// Stores `value` and notifies every did-change observer and watch
    /// subscriber exactly once, even if the value is unchanged.
    pub fn set(&self, value: T) {
        self.slot.send_modify(|current| {
            *current = value.clone();
            self.generation.fetch_add(1, Ordering::SeqCst);
        });
        notify(&self.did_change, &value);
    }

    /// Number of stores so far. Read it before fetching a value to refresh.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Stores `value` without notifying anyone, unless a `set` happened after
    /// `generation` was read. Returns whether the value was stored.
    pub fn refresh_since(&self, generation: u64, value: T) -> bool {
        let mut stored = false;
        self.slot.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) == generation {
                *current = value;
                stored = true;
            }
            false
        });
        stored
    }

    /// Fires the will-change observers. Called before a mutation is attempted.
    pub fn will_change(&self) {
        notify(&self.will_change, &());
    }

    /// Registers a callback invoked with the new value after each store.
    pub fn observe<F>(&self, callback: F) -> Observation
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        register(&self.did_change, Arc::new(callback))
    }

    /// Registers a callback invoked before each mutation attempt.
    pub fn observe_will_change<F>(&self, callback: F) -> Observation
    where
        F: Fn() + Send + Sync + 'static,
    {
        register(&self.will_change, Arc::new(move |_: &()| callback()))
    }

    /// Returns a watch receiver positioned at the current value.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.slot.subscribe()
    }

    /// Number of registered did-change callbacks.
    pub fn observer_count(&self) -> usize {
        observer_count(&self.did_change)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn set_notifies_each_observer_once() {
        let value = ObservableValue::new(false);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let a = {
            let seen = Arc::clone(&seen);
            value.observe(move |v| seen.lock().unwrap().push(("a", *v)))
        };
        let b = {
            let seen = Arc::clone(&seen);
            value.observe(move |v| seen.lock().unwrap().push(("b", *v)))
        };

        value.set(true);
        assert_eq!(*seen.lock().unwrap(), vec![("a", true), ("b", true)]);
        drop((a, b));
    }

    #[test]
    fn setting_same_value_still_notifies() {
        let value = ObservableValue::new(true);
        let count = Arc::new(AtomicUsize::new(0));
        let _obs = {
            let count = Arc::clone(&count);
            value.observe(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        value.set(true);
        value.set(true);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn refresh_is_silent() {
        let value = ObservableValue::new(false);
        let count = Arc::new(AtomicUsize::new(0));
        let _obs = {
            let count = Arc::clone(&count);
            value.observe(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        let mut rx = value.subscribe();

        assert!(value.refresh_since(value.generation(), true));

        assert!(value.get());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());
    }

    #[test]
    fn refresh_after_newer_store_is_dropped() {
        let value = ObservableValue::new(false);
        let before = value.generation();
        value.set(true);
        assert!(!value.refresh_since(before, false));
        assert!(value.get());
        assert_eq!(value.generation(), before + 1);
    }

    #[test]
    fn dropping_observation_unregisters() {
        let value = ObservableValue::new(0u32);
        let obs = value.observe(|_| {});
        assert_eq!(value.observer_count(), 1);
        drop(obs);
        assert_eq!(value.observer_count(), 0);

        let obs = value.observe(|_| {});
        obs.cancel();
        assert_eq!(value.observer_count(), 0);
    }

    #[test]
    fn will_change_fires_separately_from_did_change() {
        let value = ObservableValue::new(false);
        let will = Arc::new(AtomicUsize::new(0));
        let _obs = {
            let will = Arc::clone(&will);
            value.observe_will_change(move || {
                will.fetch_add(1, Ordering::SeqCst);
            })
        };
        value.will_change();
        value.set(true);
        assert_eq!(will.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn set_marks_subscribers_changed() {
        let value = ObservableValue::new(false);
        let mut rx = value.subscribe();
        assert!(!rx.has_changed().unwrap());
        value.set(true);
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());
    }

    #[test]
    fn callback_may_drop_other_observations() {
        let value = Arc::new(ObservableValue::new(false));
        let slot: Arc<Mutex<Option<Observation>>> = Arc::new(Mutex::new(None));
        let other = value.observe(|_| {});
        *slot.lock().unwrap() = Some(other);

        let _obs = {
            let slot = Arc::clone(&slot);
            value.observe(move |_| {
                slot.lock().unwrap().take();
            })
        };
        value.set(true);
        assert_eq!(value.observer_count(), 1);
    }
}
