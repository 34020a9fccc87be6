//! Reactive projections of the login item flag.
//!
//! Every binding here is a thin wrapper over one shared `LoginItemState`:
//!
//! - `EnabledProperty`: get/set plus did-change callbacks, for imperative UI
//!   code that observes properties.
//! - `ChangeStream`: single-slot stream of the latest value.
//! - `ObservableLoginItem`: get/set plus a will-change signal, for
//!   declarative UI layers that re-render before a mutation.
//! - `Toggle`: a labelled on/off control model built on `ObservableLoginItem`.

use std::sync::Arc;

use futures::stream::{self, Stream};
use tokio::sync::watch;

use crate::error::LoginItemError;
use crate::observable::Observation;
use crate::state::LoginItemState;

/// Label shown by [`Toggle`] unless one is supplied.
pub const DEFAULT_TOGGLE_LABEL: &str = "Launch at login";

// ---------------------------------------------------------------------------
// Property observation
// ---------------------------------------------------------------------------

/// Property whose getter and setter delegate straight to the adapter.
#[derive(Debug, Clone)]
pub struct EnabledProperty {
    state: Arc<LoginItemState>,
}

impl EnabledProperty {
    pub fn new(state: Arc<LoginItemState>) -> Self {
        Self { state }
    }

    pub fn get(&self) -> bool {
        self.state.is_enabled()
    }

    pub fn set(&self, enabled: bool) -> Result<(), LoginItemError> {
        self.state.set_enabled(enabled)
    }

    /// Calls `callback` with the new value after each successful `set`.
    pub fn observe<F>(&self, callback: F) -> Observation
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.state.observe(callback)
    }
}

// ---------------------------------------------------------------------------
// Change stream
// ---------------------------------------------------------------------------

/// Latest-value stream of the flag.
///
/// Only the most recent value is retained: a subscriber that falls behind
/// sees the newest value, not every intermediate one. The stream never
/// errors; it ends only when the owning `LoginItemState` is dropped.
#[derive(Debug, Clone)]
pub struct ChangeStream {
    rx: watch::Receiver<bool>,
}

impl ChangeStream {
    pub(crate) fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// The value currently held in the slot.
    pub fn current(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits for the next successful mutation and returns its value.
    ///
    /// Returns `None` once the adapter has been dropped.
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    /// Converts into a `Stream` whose first item is the current value.
    pub fn into_stream(self) -> impl Stream<Item = bool> + Send + Unpin + 'static {
        Box::pin(stream::unfold(
            (self.rx, true),
            |(mut rx, first)| async move {
                if !first && rx.changed().await.is_err() {
                    return None;
                }
                let value = *rx.borrow_and_update();
                Some((value, (rx, false)))
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// Declarative binding
// ---------------------------------------------------------------------------

/// Get/set binding that announces mutations before they happen.
#[derive(Debug, Clone)]
pub struct ObservableLoginItem {
    state: Arc<LoginItemState>,
}

impl ObservableLoginItem {
    pub fn new(state: Arc<LoginItemState>) -> Self {
        Self { state }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), LoginItemError> {
        self.state.set_enabled(enabled)
    }

    /// Flips the flag in one serialized read-and-write; returns the new value.
    pub fn toggle(&self) -> Result<bool, LoginItemError> {
        self.state.toggle()
    }

    /// Calls `callback` before every mutation attempt, successful or not.
    pub fn on_will_change<F>(&self, callback: F) -> Observation
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.state.observe_will_change(callback)
    }
}

// ---------------------------------------------------------------------------
// Toggle
// ---------------------------------------------------------------------------

/// A labelled on/off control bound to the login item flag.
#[derive(Debug, Clone)]
pub struct Toggle {
    binding: ObservableLoginItem,
    label: String,
}

impl Toggle {
    /// Creates a toggle with [`DEFAULT_TOGGLE_LABEL`].
    pub fn new(binding: ObservableLoginItem) -> Self {
        Self::with_label(binding, DEFAULT_TOGGLE_LABEL)
    }

    /// Creates a toggle with a custom (e.g. localized) label.
    pub fn with_label(binding: ObservableLoginItem, label: impl Into<String>) -> Self {
        Self {
            binding,
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_on(&self) -> bool {
        self.binding.is_enabled()
    }

    pub fn set_on(&self, on: bool) -> Result<(), LoginItemError> {
        self.binding.set_enabled(on)
    }

    /// Flips the control, as a click would, and returns the new state.
    pub fn toggle(&self) -> Result<bool, LoginItemError> {
        self.binding.toggle()
    }

    pub fn binding(&self) -> &ObservableLoginItem {
        &self.binding
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
