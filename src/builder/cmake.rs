//! CMake driver.

use std::path::PathBuf;

use crate::builder::backend::{BackendDriver, BackendKind};
use crate::builder::{BuildConfiguration, BuildLayout, BuildTools};
use crate::util::process::ProcessBuilder;

/// Drives the library's own CMake build.
#[derive(Debug, Clone)]
pub struct CMakeDriver {
    cmake: PathBuf,
    jobs: usize,
}

impl CMakeDriver {
    pub fn new(tools: &BuildTools) -> Self {
        CMakeDriver {
            cmake: tools.cmake.clone(),
            jobs: tools.jobs,
        }
    }
}

impl BackendDriver for CMakeDriver {
    fn kind(&self) -> BackendKind {
        BackendKind::CMake
    }

    fn bootstrap(&self, _layout: &BuildLayout) -> Option<ProcessBuilder> {
        None
    }

    fn configure(&self, layout: &BuildLayout, config: &BuildConfiguration) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake)
            .arg("-S")
            .arg(layout.cxx_dir())
            .arg("-B")
            .arg(&layout.build_dir)
            .arg(format!("-DCMAKE_BUILD_TYPE={}", config.build_type))
            .arg(format!(
                "-DCMAKE_INSTALL_PREFIX={}",
                layout.package_dir.display()
            ))
            .args(&config.arguments)
    }

    /// `--config` selects the configuration on multi-config generators.
    fn build(&self, layout: &BuildLayout, config: &BuildConfiguration) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake)
            .arg("--build")
            .arg(&layout.build_dir)
            .arg("--config")
            .arg(config.build_type.as_str())
            .arg("--parallel")
            .arg(self.jobs.to_string())
    }

    fn install(&self, layout: &BuildLayout, config: &BuildConfiguration) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake)
            .arg("--install")
            .arg(&layout.build_dir)
            .arg("--config")
            .arg(config.build_type.as_str())
    }
}
