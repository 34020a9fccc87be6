//! Helper identifier derivation.
//!
//! The login item is looked up and registered under `<bundle id><suffix>`.
//! This must match the identifier the helper executable is embedded with at
//! packaging time.

use std::fmt;

use crate::error::LoginItemError;

/// Suffix appended to the host bundle identifier when none is configured.
pub const DEFAULT_HELPER_SUFFIX: &str = "-LaunchAtLoginHelper";

/// Identifier of the login item helper, e.g. `com.example.App-LaunchAtLoginHelper`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HelperIdentifier(String);

impl HelperIdentifier {
    /// Derives the helper identifier from a bundle identifier and suffix.
    ///
    /// Surrounding whitespace on the bundle identifier is ignored; an empty
    /// result is rejected because the OS would match no job at all.
    pub fn derive(bundle_identifier: &str, suffix: &str) -> Result<Self, LoginItemError> {
        let bundle = bundle_identifier.trim();
        if bundle.is_empty() {
            return Err(LoginItemError::InvalidIdentifier(
                "bundle identifier is empty".into(),
            ));
        }
        if bundle.chars().any(char::is_whitespace) {
            return Err(LoginItemError::InvalidIdentifier(format!(
                "bundle identifier `{bundle}` contains whitespace"
            )));
        }
        Ok(Self(format!("{bundle}{suffix}")))
    }

    /// Derives the identifier with [`DEFAULT_HELPER_SUFFIX`].
    pub fn with_default_suffix(bundle_identifier: &str) -> Result<Self, LoginItemError> {
        Self::derive(bundle_identifier, DEFAULT_HELPER_SUFFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HelperIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HelperIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_suffix_is_appended() {
        let id = HelperIdentifier::with_default_suffix("com.example.App").unwrap();
        assert_eq!(id.as_str(), "com.example.App-LaunchAtLoginHelper");
    }

    #[test]
    fn custom_suffix_is_appended() {
        let id = HelperIdentifier::derive("com.example.App", ".Helper").unwrap();
        assert_eq!(id.to_string(), "com.example.App.Helper");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let id = HelperIdentifier::derive("  com.example.App\n", "-H").unwrap();
        assert_eq!(id.as_str(), "com.example.App-H");
    }

    #[test]
    fn empty_bundle_identifier_is_rejected() {
        assert!(matches!(
            HelperIdentifier::with_default_suffix("   "),
            Err(LoginItemError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn inner_whitespace_is_rejected() {
        assert!(HelperIdentifier::with_default_suffix("com.example My App").is_err());
    }
}
