//! Implementation of `capnp-recipe package`.
//!
//! Installs the build into the package directory, then trims the install
//! tree down to what consumers are meant to see.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use walkdir::WalkDir;

use crate::builder::{BackendKind, BuildSession};
use crate::core::component::CMAKE_MODULE_DIR;
use crate::ops::recipe_build::check_source_tree;
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists};
use crate::util::process::ToolRunner;

/// CMake files that survive packaging; the rest reference install paths.
pub const KEPT_CMAKE_FILES: &[&str] = &["CapnProtoMacros.cmake", "CapnProtoTargets.cmake"];

/// What `package` produced.
#[derive(Debug, Clone, Default)]
pub struct PackageReport {
    pub package_dir: PathBuf,
    /// Files removed by pruning, relative to the package directory
    pub removed: Vec<PathBuf>,
    /// Files left in the package, relative and sorted
    pub files: Vec<PathBuf>,
}

/// Build, install and prune.
pub fn package<R: ToolRunner>(session: &mut BuildSession<R>) -> Result<PackageReport> {
    check_source_tree(session.layout(), session.backend())?;

    session.build()?;
    session.install()?;

    let layout = session.layout().clone();
    copy_license(&layout.source_dir, &layout.package_dir)?;
    let removed = prune(&layout.package_dir, session.backend())?;
    let files = list_files(&layout.package_dir)?;

    tracing::info!(
        "Packaged {} files into {}",
        files.len(),
        layout.package_dir.display()
    );

    Ok(PackageReport {
        package_dir: layout.package_dir,
        removed,
        files,
    })
}

/// Copy the license into `licenses/`.
pub fn copy_license(source_dir: &Path, package_dir: &Path) -> Result<()> {
    let license = source_dir.join("LICENSE");
    let dest_dir = package_dir.join("licenses");
    ensure_dir(&dest_dir)?;

    fs::copy(&license, dest_dir.join("LICENSE"))
        .with_context(|| format!("failed to copy license from {}", license.display()))?;
    Ok(())
}

/// Remove install artifacts consumers must not see.
///
/// Returns the removed files relative to `package_dir`.
pub fn prune(package_dir: &Path, backend: BackendKind) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    if backend == BackendKind::Autotools {
        removed.extend(remove_matching(package_dir, "lib/*.la", |_| true)?);
    }

    let cmake_pattern = format!("{}/*", CMAKE_MODULE_DIR);
    removed.extend(remove_matching(package_dir, &cmake_pattern, |path| {
        path.file_name()
            .and_then(|n| n.to_str())
            .map_or(true, |name| !KEPT_CMAKE_FILES.contains(&name))
    })?);

    let pkgconfig = package_dir.join("lib").join("pkgconfig");
    if pkgconfig.exists() {
        for entry in WalkDir::new(&pkgconfig).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() {
                removed.push(relative(package_dir, entry.path()));
            }
        }
        remove_dir_all_if_exists(&pkgconfig)?;
    }

    removed.sort();
    for path in &removed {
        tracing::debug!("Removed {}", path.display());
    }
    Ok(removed)
}

fn remove_matching(
    base: &Path,
    pattern: &str,
    should_remove: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>> {
    // The base is a literal path; only `pattern` may hold wildcards.
    let escaped_base = Pattern::escape(&base.to_string_lossy());
    let full_pattern = Path::new(&escaped_base).join(pattern);
    let pattern_str = full_pattern.to_string_lossy();
    let mut removed = Vec::new();

    for entry in glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("glob error: {}", e);
                continue;
            }
        };

        if path.is_file() && should_remove(&path) {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
            removed.push(relative(base, &path));
        }
    }

    Ok(removed)
}

fn relative(base: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(base).unwrap_or(path).to_path_buf()
}

/// Every file under `dir`, relative and sorted.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(relative(dir, entry.path()));
        }
    }
    Ok(files)
}
