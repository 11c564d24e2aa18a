//! Source patches.
//!
//! Patches are applied with `git apply` in the source directory after the
//! tree is extracted and before the backend bootstrap. Each patch is pinned
//! by the SHA256 of its bytes.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::resolver::RecipeError;
use crate::util::hash::sha256_file;
use crate::util::process::ProcessBuilder;

/// A patch to apply to the source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePatch {
    /// Path to the patch file, relative to the recipe root
    pub file: PathBuf,

    /// SHA256 hash of the patch file bytes
    pub sha256: String,
}

impl SourcePatch {
    pub fn new(file: impl Into<PathBuf>, sha256: impl Into<String>) -> Self {
        SourcePatch {
            file: file.into(),
            sha256: sha256.into(),
        }
    }

    /// Check that the pinned hash is well-formed.
    pub fn validate(&self) -> Result<()> {
        if self.sha256.len() != 64 || !self.sha256.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!(
                "patch sha256 must be a 64-character hex string for '{}', got '{}'",
                self.file.display(),
                self.sha256
            );
        }
        Ok(())
    }

    /// The same patch with its file resolved against `root`.
    pub fn rooted(&self, root: &Path) -> Self {
        SourcePatch {
            file: root.join(&self.file),
            sha256: self.sha256.clone(),
        }
    }

    /// Check that the file exists and matches its pinned hash.
    pub fn verify(&self) -> Result<(), RecipeError> {
        let patch = self.file.display().to_string();
        if !self.file.is_file() {
            return Err(RecipeError::PatchNotFound { patch });
        }

        let actual = sha256_file(&self.file).map_err(|err| {
            tracing::debug!("Hashing {} failed: {:#}", patch, err);
            RecipeError::PatchNotFound {
                patch: patch.clone(),
            }
        })?;

        if !actual.eq_ignore_ascii_case(&self.sha256) {
            return Err(RecipeError::PatchChecksumMismatch {
                patch,
                expected: self.sha256.clone(),
                actual,
            });
        }

        Ok(())
    }
}

/// `git apply --check <patch>`, run in the source directory.
pub fn check_command(git: &Path, patch: &SourcePatch, source_dir: &Path) -> ProcessBuilder {
    ProcessBuilder::new(git)
        .args(["apply", "--check"])
        .arg(&patch.file)
        .cwd(source_dir)
}

/// `git apply <patch>`, run in the source directory.
pub fn apply_command(git: &Path, patch: &SourcePatch, source_dir: &Path) -> ProcessBuilder {
    ProcessBuilder::new(git)
        .arg("apply")
        .arg(&patch.file)
        .cwd(source_dir)
}
