//! Error taxonomy for login item operations.
//!
//! "No matching job entry" is deliberately absent: a helper that was never
//! registered reads as disabled, not as a failure.

use thiserror::Error;

/// Errors surfaced by the login item adapter and its platform backends.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginItemError {
    /// No service-management facility exists on this target.
    #[error("login item service unavailable: {0}")]
    Unavailable(String),

    /// The host bundle has no identifier and none was configured.
    #[error("no bundle identifier: run from an app bundle or set `bundle_identifier`")]
    MissingBundleIdentifier,

    /// The identifier cannot be used to register a helper.
    #[error("invalid helper identifier: {0}")]
    InvalidIdentifier(String),

    /// The platform refused to register or unregister the helper.
    #[error("failed to {} login item `{identifier}`", verb(.enabled))]
    Registration { identifier: String, enabled: bool },

    /// The configuration file could not be read or parsed.
    #[error("config: {0}")]
    Config(String),
}

/// "enable" or "disable", for messages about a mutation.
pub(crate) fn verb(enabled: &bool) -> &'static str {
    if *enabled {
        "enable"
    } else {
        "disable"
    }
}
