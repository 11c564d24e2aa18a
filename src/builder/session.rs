//! Build session.
//!
//! A session lives for one build invocation. It owns the resolution and
//! remembers which steps already ran. Source patches and the bootstrap run
//! at most once (a failure is remembered, not retried) and configure runs
//! at most once after succeeding.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::backend::{driver_for, BackendDriver, BackendKind};
use crate::builder::patch::{apply_command, check_command, SourcePatch};
use crate::builder::{BuildConfiguration, BuildLayout, BuildTools};
use crate::resolver::{RecipeError, Resolution};
use crate::util::fs::ensure_dir;
use crate::util::process::{ProcessBuilder, ToolRunner};

pub struct BuildSession<R: ToolRunner> {
    resolution: Resolution,
    layout: BuildLayout,
    driver: Box<dyn BackendDriver>,
    runner: R,
    git: PathBuf,
    patches: Vec<SourcePatch>,
    patch_outcome: Option<Result<(), RecipeError>>,
    bootstrap_outcome: Option<Result<(), RecipeError>>,
    configured: bool,
}

impl<R: ToolRunner> BuildSession<R> {
    pub fn new(resolution: Resolution, layout: BuildLayout, tools: &BuildTools, runner: R) -> Self {
        let driver = driver_for(resolution.configuration.backend, tools);
        BuildSession {
            resolution,
            layout,
            driver,
            runner,
            git: tools.git.clone(),
            patches: Vec::new(),
            patch_outcome: None,
            bootstrap_outcome: None,
            configured: false,
        }
    }

    /// Patches to apply before the bootstrap, in order.
    pub fn with_patches(mut self, patches: Vec<SourcePatch>) -> Self {
        self.patches = patches;
        self
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    pub fn backend(&self) -> BackendKind {
        self.driver.kind()
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Apply the source patches, once.
    ///
    /// Each patch is checked against its hash, then dry-run with
    /// `git apply --check` before it is applied.
    pub fn apply_patches(&mut self) -> Result<()> {
        if let Some(outcome) = &self.patch_outcome {
            return outcome.clone().map_err(Into::into);
        }

        let outcome = self.run_patches();
        self.patch_outcome = Some(outcome.clone());
        outcome.map_err(Into::into)
    }

    fn run_patches(&mut self) -> Result<(), RecipeError> {
        for patch in &self.patches {
            patch.verify()?;
            let name = patch.file.display().to_string();

            let check = check_command(&self.git, patch, &self.layout.source_dir);
            tracing::debug!("{}", check.display_command());
            match self.runner.output(&check) {
                Ok(output) if output.success() => {}
                Ok(output) => {
                    if !output.stderr.trim().is_empty() {
                        tracing::error!("{}", output.stderr.trim());
                    }
                    return Err(RecipeError::PatchFailed {
                        patch: name,
                        status: output.code,
                    });
                }
                Err(err) => {
                    tracing::error!("{:#}", err);
                    return Err(RecipeError::PatchFailed {
                        patch: name,
                        status: None,
                    });
                }
            }

            let apply = apply_command(&self.git, patch, &self.layout.source_dir);
            tracing::debug!("{}", apply.display_command());
            let status = match self.runner.status(&apply) {
                Ok(output) if output.success() => {
                    tracing::info!("Applied patch: {}", name);
                    continue;
                }
                Ok(output) => output.code,
                Err(err) => {
                    tracing::error!("{:#}", err);
                    None
                }
            };
            return Err(RecipeError::PatchFailed {
                patch: name,
                status,
            });
        }

        Ok(())
    }

    /// Prepare the source tree, once. Patches are applied first.
    pub fn bootstrap(&mut self) -> Result<()> {
        self.apply_patches()?;

        if let Some(outcome) = &self.bootstrap_outcome {
            return outcome.clone().map_err(Into::into);
        }

        let Some(cmd) = self.driver.bootstrap(&self.layout) else {
            self.bootstrap_outcome = Some(Ok(()));
            return Ok(());
        };

        tracing::info!("Bootstrapping {} build", self.backend());
        tracing::debug!("{}", cmd.display_command());

        let tool = cmd.get_program().display().to_string();
        let result = run_step(&mut self.runner, &cmd, |status| {
            RecipeError::BootstrapFailed {
                tool: tool.clone(),
                status,
            }
        });

        self.bootstrap_outcome = Some(match &result {
            Ok(()) => Ok(()),
            Err(err) => Err(err
                .downcast_ref::<RecipeError>()
                .cloned()
                .unwrap_or(RecipeError::BootstrapFailed { tool, status: None })),
        });

        result
    }

    /// Run configure, once. Bootstraps first when the backend needs it.
    pub fn configure(&mut self) -> Result<&BuildConfiguration> {
        if !self.configured {
            self.bootstrap()?;
            ensure_dir(&self.layout.build_dir)?;

            let cmd = self
                .driver
                .configure(&self.layout, &self.resolution.configuration);
            let backend = self.backend().to_string();

            tracing::info!("Configuring {} build", backend);
            tracing::debug!("{}", cmd.display_command());

            run_step(&mut self.runner, &cmd, |status| RecipeError::ConfigureFailed {
                backend: backend.clone(),
                status,
            })?;
            self.configured = true;
        } else {
            tracing::debug!("Reusing configured {} build", self.backend());
        }

        Ok(&self.resolution.configuration)
    }

    /// Compile the library.
    pub fn build(&mut self) -> Result<()> {
        self.configure()?;

        let cmd = self
            .driver
            .build(&self.layout, &self.resolution.configuration);
        let backend = self.backend().to_string();

        tracing::info!("Building {} components", self.resolution.graph.len());
        tracing::debug!("{}", cmd.display_command());

        run_step(&mut self.runner, &cmd, |status| RecipeError::BuildFailed {
            backend: backend.clone(),
            status,
        })
    }

    /// Install into the package directory.
    pub fn install(&mut self) -> Result<()> {
        self.configure()?;
        ensure_dir(&self.layout.package_dir)?;

        let cmd = self
            .driver
            .install(&self.layout, &self.resolution.configuration);
        let backend = self.backend().to_string();

        tracing::info!("Installing into {}", self.layout.package_dir.display());
        tracing::debug!("{}", cmd.display_command());

        run_step(&mut self.runner, &cmd, |status| RecipeError::InstallFailed {
            backend: backend.clone(),
            status,
        })
    }
}

/// Run a streaming step, mapping a failed exit to `fail(status)`.
///
/// A tool that cannot be started at all keeps its I/O error as the cause.
fn run_step<R: ToolRunner>(
    runner: &mut R,
    cmd: &ProcessBuilder,
    fail: impl Fn(Option<i32>) -> RecipeError,
) -> Result<()> {
    match runner.status(cmd) {
        Ok(output) if output.success() => Ok(()),
        Ok(output) => Err(fail(output.code).into()),
        Err(err) => Err(err.context(fail(None))),
    }
}
