//! The component catalog.
//!
//! A component is a separately linkable library of the packaged release.
//! The catalog is static data versioned with the library; the only dynamic
//! part is each component's presence predicate, evaluated against the
//! effective option set.

use semver::Version;
use serde::Serialize;

use crate::core::options::{OptionName, OptionSet};
use crate::core::platform::Os;

/// Release of the packaged library the catalog describes.
pub const LIBRARY_VERSION: &str = "0.8.0";

/// Directory (relative to the package root) holding the CMake helpers
/// consumers need.
pub const CMAKE_MODULE_DIR: &str = "lib/cmake/CapnProto";

/// A single condition of a presence predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "when", content = "option", rename_all = "kebab-case")]
pub enum Condition {
    /// Option present and true.
    Enabled(OptionName),
    /// Option absent or false.
    NotEnabled(OptionName),
}

impl Condition {
    pub fn holds(&self, options: &OptionSet) -> bool {
        match self {
            Condition::Enabled(name) => options.is_enabled(*name),
            Condition::NotEnabled(name) => !options.is_enabled(*name),
        }
    }
}

/// A system library linked only on one OS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemLib {
    pub os: Os,
    pub name: &'static str,
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    /// Component name, e.g. `kj-async`
    pub name: &'static str,
    /// Library artifact names (without prefix or extension)
    pub libs: Vec<&'static str>,
    /// Direct dependencies on other catalog components
    pub requires: Vec<&'static str>,
    /// Dependencies on other packages' components, e.g. `zlib::zlib`
    pub external_requires: Vec<&'static str>,
    /// OS-conditional system libraries
    pub system_libs: Vec<SystemLib>,
    /// Conjunction of conditions; empty means always present
    pub presence: Vec<Condition>,
    /// Build-system integration files, relative to the package root
    pub build_modules: Vec<&'static str>,
    /// Directories searched for build-system integration files
    pub build_dirs: Vec<&'static str>,
}

impl Component {
    /// A component with a single library of the same name, always present.
    pub fn new(name: &'static str) -> Self {
        Component {
            name,
            libs: vec![name],
            requires: Vec::new(),
            external_requires: Vec::new(),
            system_libs: Vec::new(),
            presence: Vec::new(),
            build_modules: Vec::new(),
            build_dirs: Vec::new(),
        }
    }

    pub fn requires(mut self, deps: &[&'static str]) -> Self {
        self.requires.extend_from_slice(deps);
        self
    }

    pub fn requires_external(mut self, deps: &[&'static str]) -> Self {
        self.external_requires.extend_from_slice(deps);
        self
    }

    pub fn system_lib(mut self, os: Os, name: &'static str) -> Self {
        self.system_libs.push(SystemLib { os, name });
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.presence.push(condition);
        self
    }

    pub fn build_module(mut self, path: &'static str) -> Self {
        self.build_modules.push(path);
        self
    }

    pub fn build_dir(mut self, path: &'static str) -> Self {
        self.build_dirs.push(path);
        self
    }

    /// Evaluate the presence predicate.
    pub fn is_present(&self, options: &OptionSet) -> bool {
        self.presence.iter().all(|c| c.holds(options))
    }

    /// System libraries that apply on `os`, in declaration order.
    pub fn system_libs_for(&self, os: Os) -> Vec<&'static str> {
        self.system_libs
            .iter()
            .filter(|lib| lib.os == os)
            .map(|lib| lib.name)
            .collect()
    }
}

/// The ordered, versioned list of components.
///
/// Declaration order matters: it is the tie-break for link ordering.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub version: Version,
    components: Vec<Component>,
}

impl Catalog {
    pub fn new(version: Version, components: Vec<Component>) -> Self {
        Catalog {
            version,
            components,
        }
    }

    /// The Cap'n Proto catalog.
    pub fn capnproto() -> Self {
        let full = Condition::NotEnabled(OptionName::LiteMode);

        let components = vec![
            Component::new("capnp").requires(&["kj"]),
            Component::new("capnp-json")
                .requires(&["capnp", "kj"])
                .when(full),
            Component::new("capnp-rpc")
                .requires(&["capnp", "kj", "kj-async"])
                .when(full),
            Component::new("capnpc")
                .requires(&["capnp", "kj"])
                .when(full),
            Component::new("kj")
                .system_lib(Os::Linux, "pthread")
                .build_dir(CMAKE_MODULE_DIR)
                .build_module("lib/cmake/CapnProto/CapnProtoMacros.cmake")
                .build_module("lib/cmake/CapnProto/CapnProtoTargets.cmake"),
            Component::new("kj-async")
                .requires(&["kj"])
                .system_lib(Os::Linux, "pthread")
                .system_lib(Os::Windows, "ws2_32")
                .when(full),
            Component::new("kj-http")
                .requires(&["kj", "kj-async"])
                .when(full),
            Component::new("kj-gzip")
                .requires(&["kj", "kj-async"])
                .requires_external(&["zlib::zlib"])
                .when(full)
                .when(Condition::Enabled(OptionName::WithCompression)),
            Component::new("kj-tls")
                .requires(&["kj", "kj-async"])
                .requires_external(&["openssl::openssl"])
                .when(full)
                .when(Condition::Enabled(OptionName::WithTls)),
        ];

        Catalog::new(Version::new(0, 8, 0), components)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn get(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Declaration index of a component.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
