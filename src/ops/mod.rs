//! High-level operations.
//!
//! This module contains the implementation of the recipe's lifecycle
//! commands.

pub mod package_info;
pub mod recipe_build;
pub mod recipe_package;

pub use package_info::{package_info, PackageInfo};
pub use recipe_build::build;
pub use recipe_package::{package, PackageReport};
pub use recipe_test::{run_smoke_test, SmokeOutcome};
