//! Login items via the ServiceManagement framework.
//!
//! `ServiceManagement` implements `LoginItemService`. Listing reads the user
//! launchd domain with `SMCopyAllJobDictionaries`; mutation goes through
//! `SMLoginItemSetEnabled`, which is synchronous and reports success as a
//! Boolean. The helper must be embedded under `Contents/Library/LoginItems`
//! and signed with the same team as the host app, otherwise the mutation
//! returns false.

use core_foundation::array::{CFArray, CFArrayRef};
use core_foundation::base::{Boolean, CFType, TCFType};
use core_foundation::boolean::CFBoolean;
use core_foundation::dictionary::CFDictionary;
use core_foundation::string::{CFString, CFStringRef};

use crate::error::LoginItemError;
use crate::identifier::HelperIdentifier;
use crate::platform::{JobEntry, LoginItemService};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Job dictionary key holding the launchd label.
const JOB_KEY_LABEL: &str = "Label";

/// Job dictionary key holding the per-entry enabled flag.
const JOB_KEY_ON_DEMAND: &str = "OnDemand";

// ---------------------------------------------------------------------------
// Raw FFI
// ---------------------------------------------------------------------------

#[link(name = "ServiceManagement", kind = "framework")]
extern "C" {
    /// The per-user launchd domain.
    static kSMDomainUserLaunchd: CFStringRef;

    /// Copies every job dictionary in `domain`. Create rule; may return null.
    fn SMCopyAllJobDictionaries(domain: CFStringRef) -> CFArrayRef;

    /// Enables or disables the helper registered under `identifier`.
    fn SMLoginItemSetEnabled(identifier: CFStringRef, enabled: Boolean) -> Boolean;
}

// ---------------------------------------------------------------------------
// Public struct
// ---------------------------------------------------------------------------

/// Reads and writes login items in the user launchd domain.
///
/// Stateless: each call talks to the OS directly.
pub struct ServiceManagement;

impl ServiceManagement {
    pub fn new() -> Self {
        ServiceManagement
    }
}

// ---------------------------------------------------------------------------
// LoginItemService trait impl
// ---------------------------------------------------------------------------

impl LoginItemService for ServiceManagement {
    fn jobs(&self) -> Option<Vec<JobEntry>> {
        let raw = unsafe { SMCopyAllJobDictionaries(kSMDomainUserLaunchd) };
        if raw.is_null() {
            log::debug!("service_management: job list unavailable");
            return None;
        }

        // Create rule: the wrapper releases the array when dropped.
        let array: CFArray<CFDictionary<CFString, CFType>> =
            unsafe { CFArray::wrap_under_create_rule(raw) };

        let jobs = job_entries(&array);
        log::debug!("service_management: {} job(s) in user domain", jobs.len());
        Some(jobs)
    }

    fn set_enabled(
        &self,
        identifier: &HelperIdentifier,
        enabled: bool,
    ) -> Result<(), LoginItemError> {
        let id = CFString::new(identifier.as_str());
        let accepted =
            unsafe { SMLoginItemSetEnabled(id.as_concrete_TypeRef(), Boolean::from(enabled)) };

        if accepted == 0 {
            log::warn!(
                "service_management: SMLoginItemSetEnabled({identifier}, {enabled}) returned false"
            );
            return Err(LoginItemError::Registration {
                identifier: identifier.to_string(),
                enabled,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Job dictionary conversion
// ---------------------------------------------------------------------------

/// Converts launchd job dictionaries into `JobEntry` rows.
///
/// Rows without a string `Label` are skipped. A missing or non-boolean
/// `OnDemand` reads as `false`.
fn job_entries(array: &CFArray<CFDictionary<CFString, CFType>>) -> Vec<JobEntry> {
    let label_key = CFString::from_static_string(JOB_KEY_LABEL);
    let on_demand_key = CFString::from_static_string(JOB_KEY_ON_DEMAND);

    let mut jobs = Vec::with_capacity(array.len().max(0) as usize);
    let mut skipped = 0usize;

    for job in array.iter() {
        let Some(label) = job
            .find(&label_key)
            .and_then(|value| value.downcast::<CFString>())
        else {
            skipped += 1;
            continue;
        };
        let on_demand = job
            .find(&on_demand_key)
            .and_then(|value| value.downcast::<CFBoolean>())
            .map(bool::from)
            .unwrap_or(false);
        jobs.push(JobEntry::new(label.to_string(), on_demand));
    }

    if skipped > 0 {
        log::warn!("service_management: skipped {skipped} job(s) without a label");
    }
    jobs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use crate::platform::find_on_demand;
    use core_foundation::number::CFNumber;

    fn job(pairs: &[(&'static str, CFType)]) -> CFDictionary<CFString, CFType> {
        let pairs: Vec<(CFString, CFType)> = pairs
            .iter()
            .map(|(key, value)| (CFString::new(key), value.clone()))
            .collect();
        CFDictionary::from_CFType_pairs(&pairs)
    }

    fn label(text: &str) -> CFType {
        CFString::new(text).as_CFType()
    }

    #[test]
    fn rows_convert_with_their_flags() {
        let array = CFArray::from_CFTypes(&[
            job(&[
                (JOB_KEY_LABEL, label("com.example.App-LaunchAtLoginHelper")),
                (JOB_KEY_ON_DEMAND, CFBoolean::true_value().as_CFType()),
            ]),
            job(&[
                (JOB_KEY_LABEL, label("com.example.Other")),
                (JOB_KEY_ON_DEMAND, CFBoolean::false_value().as_CFType()),
            ]),
        ]);
        assert_eq!(
            job_entries(&array),
            vec![
                JobEntry::new("com.example.App-LaunchAtLoginHelper", true),
                JobEntry::new("com.example.Other", false),
            ]
        );
    }

    #[test]
    fn rows_without_string_label_are_skipped() {
        let array = CFArray::from_CFTypes(&[
            job(&[(JOB_KEY_ON_DEMAND, CFBoolean::true_value().as_CFType())]),
            job(&[
                (JOB_KEY_LABEL, CFNumber::from(7i32).as_CFType()),
                (JOB_KEY_ON_DEMAND, CFBoolean::true_value().as_CFType()),
            ]),
            job(&[(JOB_KEY_LABEL, label("com.example.Kept"))]),
        ]);
        assert_eq!(
            job_entries(&array),
            vec![JobEntry::new("com.example.Kept", false)]
        );
    }

    #[test]
    fn missing_or_non_boolean_on_demand_reads_false() {
        let array = CFArray::from_CFTypes(&[
            job(&[(JOB_KEY_LABEL, label("com.example.Missing"))]),
            job(&[
                (JOB_KEY_LABEL, label("com.example.Number")),
                (JOB_KEY_ON_DEMAND, CFNumber::from(1i32).as_CFType()),
            ]),
            job(&[
                (JOB_KEY_LABEL, label("com.example.Text")),
                (JOB_KEY_ON_DEMAND, label("true")),
            ]),
        ]);
        assert!(job_entries(&array).iter().all(|job| !job.on_demand));
        assert_eq!(job_entries(&array).len(), 3);
    }

    #[test]
    fn empty_array_yields_no_rows() {
        let array: CFArray<CFDictionary<CFString, CFType>> = CFArray::from_CFTypes(&[]);
        assert!(job_entries(&array).is_empty());
    }

    /// Reading must not touch the registry; an identifier nobody registered
    /// reads as disabled whether or not the listing is available.
    #[test]
    fn unregistered_identifier_reads_disabled() {
        let service = ServiceManagement::new();
        let id = HelperIdentifier::with_default_suffix("invalid.launch-at-login.test").unwrap();
        let jobs = service.jobs().unwrap_or_default();
        assert!(!find_on_demand(&jobs, &id));
    }
}
