//! TOML configuration.
//!
//! ```toml
//! # Optional. Defaults to the main bundle's identifier.
//! bundle_identifier = "com.example.App"
//! # Optional. Defaults to "-LaunchAtLoginHelper".
//! helper_suffix = "-LaunchAtLoginHelper"
//! ```
//!
//! Every key is optional; an empty file is a valid config. Unknown keys are
//! rejected so that typos do not silently fall back to defaults.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::LoginItemError;
use crate::identifier::{HelperIdentifier, DEFAULT_HELPER_SUFFIX};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Overrides the identifier read from the main bundle.
    pub bundle_identifier: Option<String>,
    /// Appended to the bundle identifier to form the helper identifier.
    pub helper_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bundle_identifier: None,
            helper_suffix: DEFAULT_HELPER_SUFFIX.to_string(),
        }
    }
}

impl Config {
    /// Parses a config from TOML text. Parse errors include line/column.
    pub fn from_toml_str(text: &str) -> Result<Self, LoginItemError> {
        toml::from_str(text).map_err(|e| LoginItemError::Config(e.to_string()))
    }

    /// Reads and parses a config file.
    pub fn load(path: &Path) -> Result<Self, LoginItemError> {
        let text = fs::read_to_string(path)
            .map_err(|e| LoginItemError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("config: loaded {}", path.display());
        Ok(config)
    }

    /// Resolves the helper identifier.
    ///
    /// The configured `bundle_identifier` wins; otherwise `fallback` (normally
    /// the main bundle's identifier) is used.
    pub fn helper_identifier(
        &self,
        fallback: Option<String>,
    ) -> Result<HelperIdentifier, LoginItemError> {
        let bundle = self
            .bundle_identifier
            .clone()
            .or(fallback)
            .ok_or(LoginItemError::MissingBundleIdentifier)?;
        HelperIdentifier::derive(&bundle, &self.helper_suffix)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
