//! Consumer-facing package description.
//!
//! Everything here is derived from one resolution, so the per-component
//! view and the flattened link view cannot disagree.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::BackendKind;
use crate::core::component::LIBRARY_VERSION;
use crate::core::options::{OptionName, OptionSet};
use crate::resolver::link_order::{link_libraries, link_system_libraries};
use crate::resolver::Resolution;

/// Package name.
pub const PACKAGE_NAME: &str = "capnproto";

/// Name consumers find the package by in CMake.
pub const CMAKE_PACKAGE_NAME: &str = "CapnProto";

/// Generators the global name is registered for.
const CMAKE_GENERATORS: &[&str] = &["cmake_find_package", "cmake_find_package_multi"];

/// Generators each component name is registered for.
const COMPONENT_GENERATORS: &[&str] = &["cmake_find_package", "cmake_find_package_multi", "pkg_config"];

/// Reference to another package, e.g. `zlib/1.2.11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub name: &'static str,
    pub version: &'static str,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

impl Serialize for Requirement {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub const OPENSSL: Requirement = Requirement {
    name: "openssl",
    version: "1.1.1h",
};

pub const ZLIB: Requirement = Requirement {
    name: "zlib",
    version: "1.2.11",
};

pub const AUTOCONF: Requirement = Requirement {
    name: "autoconf",
    version: "2.69",
};

/// Packages the library links against.
pub fn requirements(options: &OptionSet) -> Vec<Requirement> {
    let mut reqs = Vec::new();
    if options.is_enabled(OptionName::WithTls) {
        reqs.push(OPENSSL);
    }
    if options.is_enabled(OptionName::WithCompression) {
        reqs.push(ZLIB);
    }
    reqs
}

/// Packages needed only to build.
pub fn build_requirements(backend: BackendKind) -> Vec<Requirement> {
    match backend {
        BackendKind::Autotools => vec![AUTOCONF],
        BackendKind::CMake => Vec::new(),
    }
}

/// One component as consumers see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentInfo {
    pub name: &'static str,
    /// Per-generator names
    pub names: BTreeMap<&'static str, &'static str>,
    pub libs: Vec<&'static str>,
    /// Catalog components and external `package::component` references
    pub requires: Vec<&'static str>,
    pub system_libs: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub build_dirs: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub build_modules: Vec<&'static str>,
}

/// Environment changes consumers should apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvInfo {
    /// Entries appended to PATH
    pub path: Vec<PathBuf>,
}

/// The full consumer description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub package_id: String,
    pub names: BTreeMap<&'static str, &'static str>,
    /// Present components in catalog order
    pub components: Vec<ComponentInfo>,
    /// All libraries in link order
    pub libs: Vec<&'static str>,
    pub system_libs: Vec<&'static str>,
    pub requires: Vec<Requirement>,
    pub build_requires: Vec<Requirement>,
    pub bin_dirs: Vec<&'static str>,
    pub env: EnvInfo,
}

/// Describe the package for `resolution`.
///
/// With a `package_dir`, PATH gets its `bin` directory appended.
pub fn package_info(resolution: &Resolution, package_dir: Option<&Path>) -> PackageInfo {
    let graph = &resolution.graph;

    let components = graph
        .components()
        .into_iter()
        .map(|node| {
            let component = &node.component;
            let mut requires = component.requires.clone();
            requires.extend(component.external_requires.iter().copied());

            ComponentInfo {
                name: component.name,
                names: COMPONENT_GENERATORS
                    .iter()
                    .map(|g| (*g, component.name))
                    .collect(),
                libs: component.libs.clone(),
                requires,
                system_libs: node.system_libs.clone(),
                build_dirs: component.build_dirs.clone(),
                build_modules: component.build_modules.clone(),
            }
        })
        .collect();

    let env = match package_dir {
        Some(dir) => {
            let bin = dir.join("bin");
            tracing::info!("Appending PATH env var with: {}", bin.display());
            EnvInfo { path: vec![bin] }
        }
        None => EnvInfo::default(),
    };

    PackageInfo {
        name: PACKAGE_NAME,
        version: LIBRARY_VERSION,
        package_id: resolution.configuration.package_id.clone(),
        names: CMAKE_GENERATORS
            .iter()
            .map(|g| (*g, CMAKE_PACKAGE_NAME))
            .collect(),
        components,
        libs: link_libraries(graph, &resolution.link_order),
        system_libs: link_system_libraries(graph, &resolution.link_order),
        requires: requirements(resolution.options()),
        build_requires: build_requirements(resolution.configuration.backend),
        bin_dirs: vec!["bin"],
        env,
    }
}
