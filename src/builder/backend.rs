//! Backend selection and the driver interface.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::builder::autotools::AutotoolsDriver;
use crate::builder::cmake::CMakeDriver;
use crate::builder::{BuildConfiguration, BuildLayout, BuildTools};
use crate::core::platform::{Os, PlatformDescriptor};
use crate::util::process::ProcessBuilder;

/// The two native build systems the library ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    CMake,
    Autotools,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::CMake => "cmake",
            BackendKind::Autotools => "autotools",
        }
    }

    /// Whether a one-time bootstrap must run before configure.
    pub fn needs_bootstrap(&self) -> bool {
        matches!(self, BackendKind::Autotools)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cmake" => Ok(BackendKind::CMake),
            "autotools" => Ok(BackendKind::Autotools),
            _ => Err(format!("unknown backend `{}`", s)),
        }
    }
}

/// Pick the backend for a platform.
///
/// Autotools needs a POSIX shell and `autoreconf`, neither of which the
/// native Windows toolchain has.
pub fn select_backend(platform: &PlatformDescriptor) -> BackendKind {
    match platform.os {
        Os::Windows => BackendKind::CMake,
        _ => BackendKind::Autotools,
    }
}

/// Turns a build configuration into concrete tool invocations.
///
/// Drivers only describe commands; running them is the session's job.
pub trait BackendDriver {
    fn kind(&self) -> BackendKind;

    /// One-time source preparation, if the backend needs it.
    fn bootstrap(&self, layout: &BuildLayout) -> Option<ProcessBuilder>;

    fn configure(&self, layout: &BuildLayout, config: &BuildConfiguration) -> ProcessBuilder;

    fn build(&self, layout: &BuildLayout, config: &BuildConfiguration) -> ProcessBuilder;

    fn install(&self, layout: &BuildLayout, config: &BuildConfiguration) -> ProcessBuilder;
}

/// The driver for `kind`.
pub fn driver_for(kind: BackendKind, tools: &BuildTools) -> Box<dyn BackendDriver> {
    match kind {
        BackendKind::CMake => Box::new(CMakeDriver::new(tools)),
        BackendKind::Autotools => Box::new(AutotoolsDriver::new(tools)),
    }
}
