//! Launch at login -- register a macOS app as a per-user login item.
//!
//! `LoginItemState` reads and writes one flag ("is the helper registered to
//! launch at login") through the OS service-management facility and exposes
//! it through several bindings: a property with change callbacks, a
//! latest-value stream, a declarative object with a will-change signal, and a
//! labelled toggle model.
//!
//! ```no_run
//! use std::sync::Arc;
//! use launch_at_login::{Config, LoginItemState, Toggle};
//!
//! let state = Arc::new(LoginItemState::from_config(&Config::default())?);
//! let toggle = Toggle::new(state.observable());
//! toggle.set_on(true)?;
//! assert!(state.is_enabled());
//! # Ok::<(), launch_at_login::LoginItemError>(())
//! ```

pub mod bindings;
pub mod config;
pub mod error;
pub mod identifier;
pub mod observable;
pub mod platform;
pub mod state;

pub use bindings::{ChangeStream, EnabledProperty, ObservableLoginItem, Toggle};
pub use config::Config;
pub use error::LoginItemError;
pub use identifier::{HelperIdentifier, DEFAULT_HELPER_SUFFIX};
pub use observable::Observation;
pub use platform::{JobEntry, LoginItemService};
pub use state::LoginItemState;
