//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.capnp-recipe/config.toml` - User-wide defaults
//! - Project: `.capnp-recipe/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, key by key. A
//! non-empty `[[patches]]` list replaces the global one as a whole.
//! Command-line flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::{
    BuildLayout, SourcePatch, BUILD_SUBFOLDER, PACKAGE_SUBFOLDER, SOURCE_SUBFOLDER,
};
use crate::core::options::OptionSet;
use crate::core::platform::{
    Arch, BuildType, CompilerId, CompilerVersion, CppStandard, Os, PlatformDescriptor,
};

/// Name of the configuration directory, both global and per project.
pub const CONFIG_DIR: &str = ".capnp-recipe";

/// Recipe configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeConfig {
    /// Target platform; unset fields come from host detection
    pub platform: PlatformConfig,

    /// Requested options, before normalization
    pub options: OptionSet,

    /// Directory layout, relative to the recipe root
    pub layout: LayoutConfig,

    /// Tool overrides
    pub tools: ToolsConfig,

    /// Patches applied to the source tree before the bootstrap
    pub patches: Vec<SourcePatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub os: Option<Os>,
    pub arch: Option<Arch>,
    pub compiler: Option<CompilerId>,
    pub compiler_version: Option<CompilerVersion>,
    pub cppstd: Option<CppStandard>,
    pub build_type: Option<BuildType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub source_dir: Option<PathBuf>,
    pub build_dir: Option<PathBuf>,
    pub package_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Path to `autoreconf` (the `AUTORECONF` environment variable wins)
    pub autoreconf: Option<PathBuf>,

    /// Parallel build jobs
    pub jobs: Option<usize>,
}

impl PlatformConfig {
    /// Whether every field needed for a descriptor is set.
    pub fn is_complete(&self) -> bool {
        self.os.is_some()
            && self.arch.is_some()
            && self.compiler.is_some()
            && self.compiler_version.is_some()
    }

    /// Overlay the configured fields onto a base descriptor.
    pub fn apply_to(&self, mut base: PlatformDescriptor) -> PlatformDescriptor {
        if let Some(os) = self.os {
            base.os = os;
        }
        if let Some(arch) = self.arch {
            base.arch = arch;
        }
        if let Some(compiler) = self.compiler {
            base.compiler = compiler;
        }
        if let Some(ref version) = self.compiler_version {
            base.compiler_version = version.clone();
        }
        if self.cppstd.is_some() {
            base.cppstd = self.cppstd;
        }
        if let Some(build_type) = self.build_type {
            base.build_type = build_type;
        }
        base
    }

    /// Build a descriptor, calling `detect` only if a field is missing.
    pub fn resolve(
        &self,
        detect: impl FnOnce() -> Result<PlatformDescriptor>,
    ) -> Result<PlatformDescriptor> {
        match (self.os, self.arch, self.compiler, &self.compiler_version) {
            (Some(os), Some(arch), Some(compiler), Some(version)) => {
                let descriptor = PlatformDescriptor::new(os, arch, compiler, version.clone());
                Ok(self.apply_to(descriptor))
            }
            _ => {
                let host = detect().context("failed to detect the host platform")?;
                Ok(self.apply_to(host))
            }
        }
    }

    fn merge(&mut self, other: PlatformConfig) {
        if other.os.is_some() {
            self.os = other.os;
        }
        if other.arch.is_some() {
            self.arch = other.arch;
        }
        if other.compiler.is_some() {
            self.compiler = other.compiler;
        }
        if other.compiler_version.is_some() {
            self.compiler_version = other.compiler_version;
        }
        if other.cppstd.is_some() {
            self.cppstd = other.cppstd;
        }
        if other.build_type.is_some() {
            self.build_type = other.build_type;
        }
    }
}

impl LayoutConfig {
    /// Resolve the layout below `root`, using defaults for unset entries.
    pub fn layout(&self, root: &Path) -> BuildLayout {
        let pick = |dir: &Option<PathBuf>, default: &str| {
            root.join(dir.as_deref().unwrap_or(Path::new(default)))
        };

        BuildLayout {
            source_dir: pick(&self.source_dir, SOURCE_SUBFOLDER),
            build_dir: pick(&self.build_dir, BUILD_SUBFOLDER),
            package_dir: pick(&self.package_dir, PACKAGE_SUBFOLDER),
        }
    }
}

impl RecipeConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: RecipeConfig = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        for patch in &config.patches {
            patch
                .validate()
                .with_context(|| format!("invalid config file: {}", path.display()))?;
        }

        Ok(config)
    }

    /// Load configuration, or defaults if the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {}", path.display());
            Ok(Self::default())
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: RecipeConfig) {
        self.platform.merge(other.platform);
        self.options.merge(&other.options);

        if other.layout.source_dir.is_some() {
            self.layout.source_dir = other.layout.source_dir;
        }
        if other.layout.build_dir.is_some() {
            self.layout.build_dir = other.layout.build_dir;
        }
        if other.layout.package_dir.is_some() {
            self.layout.package_dir = other.layout.package_dir;
        }

        if other.tools.autoreconf.is_some() {
            self.tools.autoreconf = other.tools.autoreconf;
        }
        if other.tools.jobs.is_some() {
            self.tools.jobs = other.tools.jobs;
        }

        if !other.patches.is_empty() {
            self.patches = other.patches;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.capnp-recipe/config.toml)
/// 2. Global config (~/.capnp-recipe/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<RecipeConfig> {
    let mut config = RecipeConfig::default();

    if let Some(global_path) = global_path {
        config.merge(RecipeConfig::load_or_default(global_path)?);
    }

    config.merge(RecipeConfig::load_or_default(project_path)?);

    Ok(config)
}

/// Get the global config directory (~/.capnp-recipe).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the global config path (~/.capnp-recipe/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.capnp-recipe/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join("config.toml")
}
