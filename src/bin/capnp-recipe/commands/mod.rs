//! Command implementations

pub mod build;
pub mod info;
pub mod linkplan;
pub mod package;
pub mod resolve;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use capnp_recipe::builder::{BuildLayout, BuildSession, BuildTools};
use capnp_recipe::core::options::OptionSet;
use capnp_recipe::core::platform::PlatformDescriptor;
use capnp_recipe::resolver::{resolve, Resolution};
use capnp_recipe::util::config::{
    global_config_path, load_config, project_config_path, PlatformConfig, RecipeConfig,
};
use capnp_recipe::util::process::SystemRunner;

/// Configuration, platform and options with every override applied.
pub struct Setup {
    pub root: PathBuf,
    pub config: RecipeConfig,
    pub platform: PlatformDescriptor,
    pub options: OptionSet,
}

impl Setup {
    /// Load config files and apply command-line overrides.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let root = std::env::current_dir().context("failed to get current directory")?;

        let config = match &global.config {
            Some(path) => {
                let mut config = match global_config_path() {
                    Some(global_path) => RecipeConfig::load_or_default(&global_path)?,
                    None => RecipeConfig::default(),
                };
                config.merge(RecipeConfig::load(path)?);
                config
            }
            None => load_config(global_config_path().as_deref(), &project_config_path(&root))?,
        };

        let mut platform_config = config.platform.clone();
        apply_platform_flags(&mut platform_config, global);
        let platform =
            platform_config.resolve(|| PlatformDescriptor::detect_host(&mut SystemRunner))?;

        let mut options = config.options.clone();
        for assignment in &global.options {
            options
                .apply_assignment(assignment)
                .with_context(|| format!("invalid `--option {}`", assignment))?;
        }

        tracing::debug!("Target platform: {}", platform);

        Ok(Setup {
            root,
            config,
            platform,
            options,
        })
    }

    pub fn resolve(&self) -> Result<Resolution> {
        Ok(resolve(&self.platform, &self.options)?)
    }

    pub fn layout(&self) -> BuildLayout {
        self.config.layout.layout(&self.root)
    }

    /// A session running real tools.
    pub fn session(&self, jobs: Option<usize>) -> Result<BuildSession<SystemRunner>> {
        let mut tools = BuildTools::detect(self.config.tools.autoreconf.as_deref());
        if let Some(jobs) = jobs.or(self.config.tools.jobs) {
            tools.jobs = jobs.max(1);
        }

        let patches = self
            .config
            .patches
            .iter()
            .map(|patch| patch.rooted(&self.root))
            .collect();

        Ok(BuildSession::new(self.resolve()?, self.layout(), &tools, SystemRunner)
            .with_patches(patches))
    }
}

fn apply_platform_flags(platform: &mut PlatformConfig, global: &GlobalArgs) {
    if global.os.is_some() {
        platform.os = global.os;
    }
    if global.arch.is_some() {
        platform.arch = global.arch;
    }
    if global.compiler.is_some() {
        platform.compiler = global.compiler;
    }
    if global.compiler_version.is_some() {
        platform.compiler_version = global.compiler_version.clone();
    }
    if global.cppstd.is_some() {
        platform.cppstd = global.cppstd;
    }
    if global.build_type.is_some() {
        platform.build_type = global.build_type;
    }
}
