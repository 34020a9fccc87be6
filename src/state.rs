//! The login item adapter.
//!
//! `LoginItemState` owns the helper identifier, the platform service and the
//! observable value every binding reads from. The getter always re-queries the
//! service; the cached value is only what stream subscribers see between
//! queries, and it is refreshed silently on every read.
//!
//! Mutations are serialized: one platform request is in flight at a time and
//! observers are notified only after the platform has accepted it. Observer
//! callbacks run on the mutating thread while the mutation lock is held, so
//! they must not call `set_enabled` or `toggle` themselves.

use std::sync::{Arc, Mutex, PoisonError};

use crate::bindings::{ChangeStream, EnabledProperty, ObservableLoginItem};
use crate::config::Config;
use crate::error::{verb, LoginItemError};
use crate::identifier::HelperIdentifier;
use crate::observable::{Observation, ObservableValue};
use crate::platform::{self, find_on_demand, LoginItemService};

/// Launch-at-login state for one application.
pub struct LoginItemState {
    service: Box<dyn LoginItemService>,
    identifier: HelperIdentifier,
    value: ObservableValue<bool>,
    mutation: Mutex<()>,
}

impl LoginItemState {
    /// Creates the adapter and seeds the cache from one platform query.
    pub fn new(service: Box<dyn LoginItemService>, identifier: HelperIdentifier) -> Self {
        let initial = query(service.as_ref(), &identifier);
        log::debug!("state: {identifier} starts {}", describe(initial));
        Self {
            service,
            identifier,
            value: ObservableValue::new(initial),
            mutation: Mutex::new(()),
        }
    }

    /// Creates the adapter over the platform service, resolving the helper
    /// identifier from `config` and the main bundle.
    pub fn from_config(config: &Config) -> Result<Self, LoginItemError> {
        let identifier = config.helper_identifier(platform::main_bundle_identifier())?;
        let service = platform::create_login_item_service()?;
        Ok(Self::new(service, identifier))
    }

    pub fn identifier(&self) -> &HelperIdentifier {
        &self.identifier
    }

    /// Whether the helper is registered to launch at login.
    ///
    /// Queries the platform every time. A missing entry or an unavailable
    /// listing reads as `false`. Does not notify observers.
    ///
    /// Takes no lock, so observer callbacks may call it. If a mutation
    /// completes while the query is in flight, the query's answer is returned
    /// but not cached: the published value stays the newer one.
    pub fn is_enabled(&self) -> bool {
        let generation = self.value.generation();
        let enabled = query(self.service.as_ref(), &self.identifier);
        if !self.value.refresh_since(generation, enabled) {
            log::debug!("state: {} read raced a mutation, cache kept", self.identifier);
        }
        enabled
    }

    /// Value as of the last query or successful mutation.
    pub fn cached(&self) -> bool {
        self.value.get()
    }

    /// Registers (`true`) or unregisters (`false`) the helper.
    ///
    /// Will-change observers fire before the platform call. On success every
    /// did-change observer and stream subscriber is notified exactly once with
    /// `enabled`; on failure the cached value is left as it was.
    pub fn set_enabled(&self, enabled: bool) -> Result<(), LoginItemError> {
        let _guard = self.mutation.lock().unwrap_or_else(PoisonError::into_inner);
        self.apply(enabled)
    }

    /// Flips the current platform state and returns the new value.
    pub fn toggle(&self) -> Result<bool, LoginItemError> {
        let _guard = self.mutation.lock().unwrap_or_else(PoisonError::into_inner);
        let target = !query(self.service.as_ref(), &self.identifier);
        self.apply(target)?;
        Ok(target)
    }

    /// Caller must hold `self.mutation`.
    fn apply(&self, enabled: bool) -> Result<(), LoginItemError> {
        self.value.will_change();

        if let Err(e) = self.service.set_enabled(&self.identifier, enabled) {
            log::warn!("state: could not {} {}: {e}", verb(&enabled), self.identifier);
            return Err(e);
        }

        log::info!("state: {} {}", describe(enabled), self.identifier);
        self.value.set(enabled);
        Ok(())
    }

    /// Registers a callback invoked with the new value after each successful
    /// mutation.
    pub fn observe<F>(&self, callback: F) -> Observation
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.value.observe(move |enabled| callback(*enabled))
    }

    /// Registers a callback invoked before each mutation attempt.
    pub fn observe_will_change<F>(&self, callback: F) -> Observation
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.value.observe_will_change(callback)
    }

    /// Subscribes to the single-slot change stream.
    pub fn subscribe(&self) -> ChangeStream {
        ChangeStream::new(self.value.subscribe())
    }

    /// Property-observation binding over this state.
    pub fn property(self: &Arc<Self>) -> EnabledProperty {
        EnabledProperty::new(Arc::clone(self))
    }

    /// Declarative-binding object over this state.
    pub fn observable(self: &Arc<Self>) -> ObservableLoginItem {
        ObservableLoginItem::new(Arc::clone(self))
    }
}

impl std::fmt::Debug for LoginItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginItemState")
            .field("identifier", &self.identifier)
            .field("cached", &self.value.get())
            .finish_non_exhaustive()
    }
}

fn query(service: &dyn LoginItemService, identifier: &HelperIdentifier) -> bool {
    let jobs = service.jobs().unwrap_or_default();
    find_on_demand(&jobs, identifier)
}

fn describe(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
