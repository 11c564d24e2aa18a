//! Core data structures.
//!
//! - Platform descriptors (os, arch, compiler, C++ standard)
//! - Recipe options
//! - The component catalog of the Cap'n Proto library family

pub mod component;
pub mod options;
pub mod platform;

pub use component::{Catalog, Component, Condition, LIBRARY_VERSION};
pub use options::{OptionName, OptionSet};
pub use platform::{Arch, CompilerId, CompilerVersion, CppStandard, Os, PlatformDescriptor};
