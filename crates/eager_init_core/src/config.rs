//! Generator configuration.
//!
//! # Responsibility
//! - Read `packageName` / `className` from host options or an options file.
//! - Apply defaults and reject malformed names before generation starts.
//!
//! # Invariants
//! - Missing or blank options fall back to `lol.ffi` / `EagerInitializeGenerated`.
//! - A validated config always names a dot-separated package and a bare identifier.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Host option key for the generated package.
pub const OPTION_PACKAGE_NAME: &str = "packageName";
/// Host option key for the generated type.
pub const OPTION_CLASS_NAME: &str = "className";

pub const DEFAULT_PACKAGE_NAME: &str = "lol.ffi";
pub const DEFAULT_CLASS_NAME: &str = "EagerInitializeGenerated";

static PACKAGE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("valid package name regex")
});
static CLASS_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid class name regex"));

/// Output naming for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    pub package_name: String,
    pub class_name: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            class_name: DEFAULT_CLASS_NAME.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Builds a config from a host options map.
    ///
    /// Unrecognized keys are ignored.
    pub fn from_options(options: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        for key in options.keys() {
            if key != OPTION_PACKAGE_NAME && key != OPTION_CLASS_NAME {
                debug!("event=config_option module=config status=ignored key={key}");
            }
        }

        let mut config = Self::default();
        if let Some(value) = options.get(OPTION_PACKAGE_NAME) {
            config.package_name = value.clone();
        }
        if let Some(value) = options.get(OPTION_CLASS_NAME) {
            config.class_name = value.clone();
        }
        config.normalized()
    }

    /// Trims values, restores defaults for blanks, and validates both names.
    ///
    /// # Errors
    /// - `InvalidPackageName` when the package is not dot-separated identifiers.
    /// - `InvalidClassName` when the class name is not one identifier.
    pub fn normalized(self) -> Result<Self, ConfigError> {
        let package_name = non_blank_or(self.package_name, DEFAULT_PACKAGE_NAME);
        let class_name = non_blank_or(self.class_name, DEFAULT_CLASS_NAME);

        if !PACKAGE_NAME_RE.is_match(&package_name) {
            return Err(ConfigError::InvalidPackageName(package_name));
        }
        if !CLASS_NAME_RE.is_match(&class_name) {
            return Err(ConfigError::InvalidClassName(class_name));
        }
        Ok(Self {
            package_name,
            class_name,
        })
    }
}

fn non_blank_or(value: String, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Configuration and message-construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An invalid-declarations error was requested for an empty set.
    EmptyInvalidSet,
    InvalidPackageName(String),
    InvalidClassName(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInvalidSet => write!(
                f,
                "invalid declarations error requested with an empty declaration list"
            ),
            Self::InvalidPackageName(value) => write!(
                f,
                "{OPTION_PACKAGE_NAME} is invalid: `{value}` (expected dot-separated identifiers)"
            ),
            Self::InvalidClassName(value) => write!(
                f,
                "{OPTION_CLASS_NAME} is invalid: `{value}` (expected one identifier)"
            ),
        }
    }
}

impl Error for ConfigError {}
