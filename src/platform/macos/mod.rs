//! macOS platform backend.
//!
//! Listing: `SMCopyAllJobDictionaries(kSMDomainUserLaunchd)`.
//! Mutation: `SMLoginItemSetEnabled` via `ServiceManagement`.
//!
//! The listing API is deprecated but still the only way to read a helper's
//! state without holding an `SMAppService` handle; it is called directly.

mod service_management;

use core_foundation::base::CFType;
use core_foundation::bundle::CFBundle;
use core_foundation::dictionary::CFDictionary;
use core_foundation::string::CFString;

pub use service_management::ServiceManagement;

/// Info.plist key holding the bundle identifier.
const BUNDLE_IDENTIFIER_KEY: &str = "CFBundleIdentifier";

/// Reads `CFBundleIdentifier` from the main bundle's Info.plist.
///
/// Unbundled executables have a main bundle without an identifier.
pub fn main_bundle_identifier() -> Option<String> {
    let identifier = identifier_from_info(&CFBundle::main_bundle().info_dictionary());
    if identifier.is_none() {
        log::debug!("bundle: main bundle has no identifier");
    }
    identifier
}

/// Extracts a non-empty string `CFBundleIdentifier` from an Info.plist
/// dictionary.
fn identifier_from_info(info: &CFDictionary<CFString, CFType>) -> Option<String> {
    let key = CFString::from_static_string(BUNDLE_IDENTIFIER_KEY);
    info.find(&key)
        .and_then(|value| value.downcast::<CFString>())
        .map(|value| value.to_string())
        .filter(|value| !value.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
