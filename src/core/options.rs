//! Build options with explicit presence.
//!
//! An option that is absent from an [`OptionSet`] is a different state from
//! an option that is present and `false`: absence means the option does not
//! apply on this platform (or was nullified by another option), and for
//! optional dependencies it means the feature is unavailable.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::platform::{Os, PlatformDescriptor};

/// Recognized option names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionName {
    /// Build shared instead of static libraries.
    Shared,
    /// Position-independent code for static libraries.
    Fpic,
    /// Build only the core serialization libraries.
    LiteMode,
    /// Build the TLS integration (depends on OpenSSL).
    WithTls,
    /// Build the compression integration (depends on zlib).
    WithCompression,
}

impl OptionName {
    pub const ALL: [OptionName; 5] = [
        OptionName::Shared,
        OptionName::Fpic,
        OptionName::LiteMode,
        OptionName::WithTls,
        OptionName::WithCompression,
    ];

    /// Canonical option name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionName::Shared => "shared",
            OptionName::Fpic => "fPIC",
            OptionName::LiteMode => "lite-mode",
            OptionName::WithTls => "with-tls",
            OptionName::WithCompression => "with-compression",
        }
    }

    /// Value used when the request does not mention the option.
    pub fn default_value(&self) -> bool {
        match self {
            OptionName::Shared => false,
            OptionName::Fpic => true,
            OptionName::LiteMode => false,
            OptionName::WithTls => true,
            OptionName::WithCompression => true,
        }
    }

    /// Whether the option exists at all on the given OS.
    ///
    /// Windows has no position-independent-code toggle, and the TLS
    /// dependency cannot be provided there.
    pub fn exists_on(&self, os: Os) -> bool {
        match self {
            OptionName::Fpic | OptionName::WithTls => os != Os::Windows,
            OptionName::Shared | OptionName::LiteMode | OptionName::WithCompression => true,
        }
    }
}

impl FromStr for OptionName {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "shared" => Ok(OptionName::Shared),
            "fPIC" | "fpic" | "pic" => Ok(OptionName::Fpic),
            "lite-mode" | "lite_mode" | "lite" => Ok(OptionName::LiteMode),
            "with-tls" | "with_tls" | "with-openssl" | "with_openssl" => Ok(OptionName::WithTls),
            "with-compression" | "with_compression" | "with-zlib" | "with_zlib" => {
                Ok(OptionName::WithCompression)
            }
            other => Err(OptionParseError::UnknownOption(other.to_string())),
        }
    }
}

impl Serialize for OptionName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing an option name or `name=value` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionParseError {
    UnknownOption(String),
    InvalidValue { option: String, value: String },
    MissingValue(String),
}

impl fmt::Display for OptionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionParseError::UnknownOption(name) => write!(
                f,
                "unknown option '{}', valid options: shared, fPIC, lite-mode, with-tls, with-compression",
                name
            ),
            OptionParseError::InvalidValue { option, value } => write!(
                f,
                "invalid value '{}' for option '{}', expected true or false",
                value, option
            ),
            OptionParseError::MissingValue(s) => {
                write!(f, "expected `name=value`, got '{}'", s)
            }
        }
    }
}

impl std::error::Error for OptionParseError {}

fn parse_bool(option: &str, value: &str) -> Result<bool, OptionParseError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(OptionParseError::InvalidValue {
            option: option.to_string(),
            value: value.to_string(),
        }),
    }
}

/// A mapping from option name to value, with presence tracked explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, bool>", into = "BTreeMap<String, bool>")]
pub struct OptionSet {
    values: BTreeMap<OptionName, bool>,
}

impl OptionSet {
    /// Create an empty option set (every option absent).
    pub fn new() -> Self {
        OptionSet {
            values: BTreeMap::new(),
        }
    }

    /// Every option that exists on the platform, at its default value.
    pub fn defaults_for(platform: &PlatformDescriptor) -> Self {
        let mut set = OptionSet::new();
        for name in OptionName::ALL {
            if name.exists_on(platform.os) {
                set.set(name, name.default_value());
            }
        }
        set
    }

    /// Builder-style setter.
    pub fn with(mut self, name: OptionName, value: bool) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: OptionName, value: bool) {
        self.values.insert(name, value);
    }

    /// Remove an option, returning its previous value.
    pub fn remove(&mut self, name: OptionName) -> Option<bool> {
        self.values.remove(&name)
    }

    /// The option's value, or `None` if absent.
    pub fn get(&self, name: OptionName) -> Option<bool> {
        self.values.get(&name).copied()
    }

    pub fn contains(&self, name: OptionName) -> bool {
        self.values.contains_key(&name)
    }

    /// True only when the option is present and set.
    pub fn is_enabled(&self, name: OptionName) -> bool {
        self.get(name) == Some(true)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate present options in name order.
    pub fn iter(&self) -> impl Iterator<Item = (OptionName, bool)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// Apply a `name=value` assignment, as given on the command line.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), OptionParseError> {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| OptionParseError::MissingValue(assignment.to_string()))?;
        let option: OptionName = name.parse()?;
        self.set(option, parse_bool(name, value)?);
        Ok(())
    }

    /// Overlay another set on top of this one (other wins per key).
    pub fn merge(&mut self, other: &OptionSet) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }
}

impl TryFrom<BTreeMap<String, bool>> for OptionSet {
    type Error = OptionParseError;

    fn try_from(map: BTreeMap<String, bool>) -> Result<Self, Self::Error> {
        let mut set = OptionSet::new();
        for (name, value) in map {
            set.set(name.parse()?, value);
        }
        Ok(set)
    }
}

impl From<OptionSet> for BTreeMap<String, bool> {
    fn from(set: OptionSet) -> Self {
        set.values
            .into_iter()
            .map(|(k, v)| (k.as_str().to_string(), v))
            .collect()
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
