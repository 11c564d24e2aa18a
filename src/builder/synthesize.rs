//! Configuration synthesis.
//!
//! Options are first reduced to a set of backend-neutral features, then
//! each feature is rendered through [`FLAG_TABLE`]. The same table decodes
//! arguments back into features, which is how the two backends are kept
//! equivalent.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::builder::backend::BackendKind;
use crate::core::options::{OptionName, OptionSet};

/// Backend-neutral build feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    SharedLibraries,
    PositionIndependentCode,
    Tls,
    Compression,
    Reflection,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::SharedLibraries => "shared libraries",
            Feature::PositionIndependentCode => "position-independent code",
            Feature::Tls => "TLS",
            Feature::Compression => "compression",
            Feature::Reflection => "reflection",
        };
        write!(f, "{}", name)
    }
}

/// Features stated for a build. A feature missing from the set is left to
/// the backend's own default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureSet {
    values: BTreeMap<Feature, bool>,
}

impl FeatureSet {
    pub fn new() -> Self {
        FeatureSet::default()
    }

    /// Derive features from an effective option set.
    pub fn from_options(options: &OptionSet) -> Self {
        let lite = options.is_enabled(OptionName::LiteMode);
        let mut features = FeatureSet::new();

        if let Some(shared) = options.get(OptionName::Shared) {
            features.set(Feature::SharedLibraries, shared);
        }
        if let Some(pic) = options.get(OptionName::Fpic) {
            features.set(Feature::PositionIndependentCode, pic);
        }

        // An integration whose toggle was deleted is unavailable, not defaulted.
        features.set(
            Feature::Tls,
            options.is_enabled(OptionName::WithTls) && !lite,
        );
        features.set(
            Feature::Compression,
            options.is_enabled(OptionName::WithCompression) && !lite,
        );
        features.set(Feature::Reflection, !lite);

        features
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        self.values.insert(feature, enabled);
    }

    pub fn get(&self, feature: Feature) -> Option<bool> {
        self.values.get(&feature).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, bool)> + '_ {
        self.values.iter().map(|(f, v)| (*f, *v))
    }
}

/// One row of the cross-backend flag table.
#[derive(Debug, Clone, Copy)]
pub struct FlagRow {
    pub feature: Feature,
    pub autotools_on: &'static [&'static str],
    pub autotools_off: &'static [&'static str],
    pub cmake_define: &'static str,
    /// The define is ON when the feature is off
    pub cmake_inverted: bool,
}

pub const FLAG_TABLE: &[FlagRow] = &[
    FlagRow {
        feature: Feature::SharedLibraries,
        autotools_on: &["--disable-static", "--enable-shared"],
        autotools_off: &["--disable-shared", "--enable-static"],
        cmake_define: "BUILD_SHARED_LIBS",
        cmake_inverted: false,
    },
    FlagRow {
        feature: Feature::PositionIndependentCode,
        autotools_on: &["--with-pic"],
        autotools_off: &["--without-pic"],
        cmake_define: "CMAKE_POSITION_INDEPENDENT_CODE",
        cmake_inverted: false,
    },
    FlagRow {
        feature: Feature::Tls,
        autotools_on: &["--with-openssl"],
        autotools_off: &["--without-openssl"],
        cmake_define: "WITH_OPENSSL",
        cmake_inverted: false,
    },
    FlagRow {
        feature: Feature::Compression,
        autotools_on: &["--with-zlib"],
        autotools_off: &["--without-zlib"],
        cmake_define: "WITH_ZLIB",
        cmake_inverted: false,
    },
    FlagRow {
        feature: Feature::Reflection,
        autotools_on: &["--enable-reflection"],
        autotools_off: &["--disable-reflection"],
        cmake_define: "CAPNP_LITE",
        cmake_inverted: true,
    },
];

/// CMake defines passed on every configure.
const CMAKE_FIXED_DEFINES: &[(&str, bool)] = &[("BUILD_TESTING", false), ("EXTERNAL_CAPNP", false)];

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

/// Backend-native arguments for an effective option set.
pub fn synthesize(kind: BackendKind, options: &OptionSet) -> Vec<String> {
    let features = FeatureSet::from_options(options);
    let mut args = Vec::new();

    if kind == BackendKind::CMake {
        for (name, value) in CMAKE_FIXED_DEFINES {
            args.push(format!("-D{}={}", name, on_off(*value)));
        }
    }

    for row in FLAG_TABLE {
        let Some(enabled) = features.get(row.feature) else {
            continue;
        };

        match kind {
            BackendKind::Autotools => {
                let flags = if enabled {
                    row.autotools_on
                } else {
                    row.autotools_off
                };
                args.extend(flags.iter().map(|f| f.to_string()));
            }
            BackendKind::CMake => {
                let value = enabled != row.cmake_inverted;
                args.push(format!("-D{}={}", row.cmake_define, on_off(value)));
            }
        }
    }

    tracing::debug!("Synthesized {} arguments: {}", kind, args.join(" "));
    args
}

/// Recover the features stated by a list of backend arguments.
///
/// Arguments the table does not know are ignored.
pub fn decode_features(kind: BackendKind, args: &[String]) -> FeatureSet {
    let mut features = FeatureSet::new();

    match kind {
        BackendKind::Autotools => {
            for row in FLAG_TABLE {
                if contains_run(args, row.autotools_on) {
                    features.set(row.feature, true);
                } else if contains_run(args, row.autotools_off) {
                    features.set(row.feature, false);
                }
            }
        }
        BackendKind::CMake => {
            let defines: BTreeMap<&str, &str> = args
                .iter()
                .filter_map(|a| a.strip_prefix("-D"))
                .filter_map(|a| a.split_once('='))
                .collect();

            for row in FLAG_TABLE {
                if let Some(value) = defines.get(row.cmake_define) {
                    let on = value.eq_ignore_ascii_case("ON");
                    features.set(row.feature, on != row.cmake_inverted);
                }
            }
        }
    }

    features
}

fn contains_run(args: &[String], flags: &[&str]) -> bool {
    args.windows(flags.len())
        .any(|w| w.iter().zip(flags).all(|(a, f)| a == f))
}
