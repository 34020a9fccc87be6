//! Platform abstraction layer.
//!
//! Defines the `LoginItemService` trait: the narrow boundary between the
//! adapter and the OS service-management facility. Platform-specific
//! implementations live in child modules; `memory` is an in-process
//! implementation used as an injectable fake.

#[cfg(target_os = "macos")]
mod macos;
pub mod memory;

use std::sync::Arc;

use crate::error::LoginItemError;
use crate::identifier::HelperIdentifier;

// ---------------------------------------------------------------------------
// Job entries
// ---------------------------------------------------------------------------

/// One row of the OS's registered login-job list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEntry {
    /// The job label; matched against the helper identifier.
    pub label: String,
    /// The OS's own enabled flag for the entry.
    pub on_demand: bool,
}

impl JobEntry {
    pub fn new(label: impl Into<String>, on_demand: bool) -> Self {
        Self {
            label: label.into(),
            on_demand,
        }
    }
}

/// Returns the on-demand flag of the first job labelled `identifier`, or
/// `false` when no such job exists.
pub fn find_on_demand(jobs: &[JobEntry], identifier: &HelperIdentifier) -> bool {
    jobs.iter()
        .find(|job| job.label == identifier.as_str())
        .map(|job| job.on_demand)
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Service trait
// ---------------------------------------------------------------------------

/// The OS login-item facility.
///
/// Implementations are synchronous: `set_enabled` returns only after the
/// platform has accepted or rejected the request.
pub trait LoginItemService: Send + Sync {
    /// Lists every registered job in the user's login domain.
    ///
    /// Returns `None` when the platform returns nothing at all; callers treat
    /// that the same as an empty list.
    fn jobs(&self) -> Option<Vec<JobEntry>>;

    /// Registers (`enabled = true`) or unregisters the helper job.
    fn set_enabled(
        &self,
        identifier: &HelperIdentifier,
        enabled: bool,
    ) -> Result<(), LoginItemError>;
}

/// Lets one service be shared between an adapter and code that inspects it.
impl<S: LoginItemService + ?Sized> LoginItemService for Arc<S> {
    fn jobs(&self) -> Option<Vec<JobEntry>> {
        (**self).jobs()
    }

    fn set_enabled(
        &self,
        identifier: &HelperIdentifier,
        enabled: bool,
    ) -> Result<(), LoginItemError> {
        (**self).set_enabled(identifier, enabled)
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Returns the ServiceManagement-backed service.
#[cfg(target_os = "macos")]
pub fn create_login_item_service() -> Result<Box<dyn LoginItemService>, LoginItemError> {
    Ok(Box::new(macos::ServiceManagement::new()))
}

/// Login items are only implemented on macOS.
#[cfg(not(target_os = "macos"))]
pub fn create_login_item_service() -> Result<Box<dyn LoginItemService>, LoginItemError> {
    Err(LoginItemError::Unavailable(format!(
        "login items are not supported on {}",
        std::env::consts::OS
    )))
}

/// Returns the identifier of the process's main bundle.
///
/// `None` for unbundled executables and on targets without bundles.
#[cfg(target_os = "macos")]
pub fn main_bundle_identifier() -> Option<String> {
    macos::main_bundle_identifier()
}

#[cfg(not(target_os = "macos"))]
pub fn main_bundle_identifier() -> Option<String> {
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> HelperIdentifier {
        HelperIdentifier::with_default_suffix("com.example.App").unwrap()
    }

    #[test]
    fn matching_entry_reports_its_flag() {
        let jobs = vec![
            JobEntry::new("com.apple.Other", true),
            JobEntry::new("com.example.App-LaunchAtLoginHelper", true),
        ];
        assert!(find_on_demand(&jobs, &id()));
    }

    #[test]
    fn matching_entry_with_flag_off_reads_false() {
        let jobs = vec![JobEntry::new("com.example.App-LaunchAtLoginHelper", false)];
        assert!(!find_on_demand(&jobs, &id()));
    }

    #[test]
    fn missing_entry_reads_false() {
        let jobs = vec![JobEntry::new("com.example.App", true)];
        assert!(!find_on_demand(&jobs, &id()));
        assert!(!find_on_demand(&[], &id()));
    }

    #[test]
    fn first_match_wins() {
        let jobs = vec![
            JobEntry::new("com.example.App-LaunchAtLoginHelper", false),
            JobEntry::new("com.example.App-LaunchAtLoginHelper", true),
        ];
        assert!(!find_on_demand(&jobs, &id()));
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn factory_reports_unavailable_off_macos() {
        assert!(matches!(
            create_login_item_service(),
            Err(LoginItemError::Unavailable(_))
        ));
        assert_eq!(main_bundle_identifier(), None);
    }
}
