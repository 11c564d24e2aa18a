//! Recipe error taxonomy and diagnostics.
//!
//! Every variant is fatal. Toolchain and option errors are user-facing;
//! catalog errors are defects in the static component catalog and cannot be
//! fixed by changing inputs. Nothing is retried.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error raised while resolving or building the recipe.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum RecipeError {
    #[error("Cap'n Proto doesn't support {compiler} {version} (minimum is {minimum})")]
    #[diagnostic(code(capnp_recipe::validate::unsupported_toolchain))]
    UnsupportedToolchain {
        compiler: String,
        version: String,
        minimum: String,
    },

    #[error("Cap'n Proto requires at least {minimum}, but {requested} was requested")]
    #[diagnostic(code(capnp_recipe::validate::unsupported_language_standard))]
    UnsupportedLanguageStandard { requested: String, minimum: String },

    #[error("option `{option}` is not supported by {compiler} on {os}: {reason}")]
    #[diagnostic(code(capnp_recipe::validate::invalid_option_combination))]
    InvalidOptionCombination {
        option: String,
        compiler: String,
        os: String,
        reason: String,
    },

    #[error("patch file not found: {patch}")]
    #[diagnostic(code(capnp_recipe::patch::not_found))]
    PatchNotFound { patch: String },

    #[error("patch file hash mismatch for `{patch}`: expected {expected}, got {actual}")]
    #[diagnostic(code(capnp_recipe::patch::checksum_mismatch))]
    PatchChecksumMismatch {
        patch: String,
        expected: String,
        actual: String,
    },

    #[error("patch `{patch}` will not apply cleanly (exit code {})", display_status(.status))]
    #[diagnostic(code(capnp_recipe::patch::apply_failed))]
    PatchFailed { patch: String, status: Option<i32> },

    #[error("bootstrap step `{tool}` failed with exit code {}", display_status(.status))]
    #[diagnostic(code(capnp_recipe::build::bootstrap_failed))]
    BootstrapFailed { tool: String, status: Option<i32> },

    #[error("{backend} configure failed with exit code {}", display_status(.status))]
    #[diagnostic(code(capnp_recipe::build::configure_failed))]
    ConfigureFailed { backend: String, status: Option<i32> },

    #[error("{backend} build failed with exit code {}", display_status(.status))]
    #[diagnostic(code(capnp_recipe::build::build_failed))]
    BuildFailed { backend: String, status: Option<i32> },

    #[error("{backend} install failed with exit code {}", display_status(.status))]
    #[diagnostic(code(capnp_recipe::build::install_failed))]
    InstallFailed { backend: String, status: Option<i32> },

    #[error("inconsistent component catalog: `{component}` {problem}")]
    #[diagnostic(code(capnp_recipe::catalog::inconsistent))]
    InconsistentCatalog { component: String, problem: String },

    #[error("cycle detected in component graph")]
    #[diagnostic(code(capnp_recipe::catalog::cycle))]
    CyclicDependency { components: Vec<String> },
}

/// Render an exit status, naming the case where there is none.
pub(crate) fn display_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "none (not started or terminated by signal)".to_string(),
    }
}

impl RecipeError {
    /// Whether the error points at the static catalog rather than user input.
    pub fn is_catalog_defect(&self) -> bool {
        matches!(
            self,
            RecipeError::InconsistentCatalog { .. } | RecipeError::CyclicDependency { .. }
        )
    }

    /// Whether the error was raised before any external tool ran.
    pub fn is_pre_build(&self) -> bool {
        matches!(
            self,
            RecipeError::UnsupportedToolchain { .. }
                | RecipeError::UnsupportedLanguageStandard { .. }
                | RecipeError::InvalidOptionCombination { .. }
        )
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = match self {
            RecipeError::UnsupportedToolchain {
                compiler,
                version,
                minimum,
            } => Diagnostic::error(format!(
                "Cap'n Proto doesn't support {} {}",
                compiler, version
            ))
            .with_context(format!("minimum supported {} version is {}", compiler, minimum))
            .with_suggestion(format!("Upgrade {} to {} or newer", compiler, minimum))
            .with_suggestion("Select another compiler with `--compiler`"),

            RecipeError::UnsupportedLanguageStandard { requested, minimum } => {
                Diagnostic::error(format!("{} is too old for Cap'n Proto", requested))
                    .with_context(format!("minimum language standard is {}", minimum))
                    .with_suggestion(format!("Build with `--cppstd {}` or newer", minimum))
            }

            RecipeError::InvalidOptionCombination {
                option,
                compiler,
                os,
                reason,
            } => Diagnostic::error(format!(
                "option `{}` cannot be used with {} on {}",
                option, compiler, os
            ))
            .with_context(reason.clone())
            .with_suggestion(format!("Remove `-o {}=true`", option)),

            RecipeError::PatchNotFound { patch } => {
                Diagnostic::error(format!("patch file not found: {}", patch))
                    .with_suggestion("Check the `file` entries under `[[patches]]` in the config")
            }

            RecipeError::PatchChecksumMismatch {
                patch,
                expected,
                actual,
            } => Diagnostic::error(format!("patch `{}` does not match its checksum", patch))
                .with_context(format!("expected sha256: {}", expected))
                .with_context(format!("actual sha256:   {}", actual))
                .with_suggestion("Update the `sha256` entry if the patch was changed on purpose"),

            RecipeError::PatchFailed { patch, status } => {
                Diagnostic::error(format!("patch `{}` will not apply cleanly", patch))
                    .with_context(format!("exit code: {}", display_status(status)))
                    .with_note("the source tree may already be patched or be a different release")
                    .with_suggestion("Extract a fresh source tree and rerun the build")
            }

            RecipeError::BootstrapFailed { tool, status } => {
                Diagnostic::error(format!("`{}` failed", tool))
                    .with_context(format!("exit code: {}", display_status(status)))
                    .with_suggestion("Check that autoconf, automake and libtool are installed")
                    .with_suggestion("Set AUTORECONF to the autoreconf executable to use")
            }

            RecipeError::ConfigureFailed { backend, status }
            | RecipeError::BuildFailed { backend, status }
            | RecipeError::InstallFailed { backend, status } => {
                Diagnostic::error(self.to_string())
                    .with_context(format!("backend: {}", backend))
                    .with_context(format!("exit code: {}", display_status(status)))
                    .with_suggestion("Run with `--verbose` to see the full command line")
            }

            RecipeError::InconsistentCatalog { component, problem } => {
                Diagnostic::error(format!("component `{}` {}", component, problem))
                    .with_note("this is a defect in the component catalog, not in your options")
            }

            RecipeError::CyclicDependency { components } => {
                Diagnostic::error("cycle detected in component graph")
                    .with_context(format!("cycle: {}", components.join(" -> ")))
                    .with_note("this is a defect in the component catalog, not in your options")
            }
        };

        match MietteDiagnostic::code(self) {
            Some(code) => diagnostic.with_code(code.to_string()),
            None => diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolchain_diagnostic_names_compiler() {
        let err = RecipeError::UnsupportedToolchain {
            compiler: "gcc".to_string(),
            version: "4.9".to_string(),
            minimum: "5".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "Cap'n Proto doesn't support gcc 4.9 (minimum is 5)"
        );
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("gcc 4.9"));
        assert!(output.contains("Upgrade gcc to 5"));
        assert!(err.is_pre_build());
        assert!(!err.is_catalog_defect());
    }

    #[test]
    fn test_exit_status_rendering() {
        let err = RecipeError::BootstrapFailed {
            tool: "autoreconf".to_string(),
            status: Some(2),
        };
        assert!(err.to_string().contains("exit code 2"));

        let err = RecipeError::BuildFailed {
            backend: "cmake".to_string(),
            status: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_patch_mismatch_diagnostic() {
        let err = RecipeError::PatchChecksumMismatch {
            patch: "patches/0001-fix-gcc10.patch".to_string(),
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.starts_with("error[capnp_recipe::patch::checksum_mismatch]"));
        assert!(output.contains("expected sha256: aa"));
        assert!(!err.is_pre_build());
        assert!(!err.is_catalog_defect());
    }

    #[test]
    fn test_cycle_is_catalog_defect() {
        let err = RecipeError::CyclicDependency {
            components: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };

        assert!(err.is_catalog_defect());
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("a -> b -> a"));
        assert!(output.starts_with("error[capnp_recipe::catalog::cycle]"));
        assert!(output.contains("note: this is a defect"));
    }
}
