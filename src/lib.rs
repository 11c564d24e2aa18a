//! capnp-recipe - A build recipe for the Cap'n Proto C++ library
//!
//! This crate provides the library side of the recipe: validating a target
//! platform, normalizing options, picking a build backend, synthesizing its
//! configuration and resolving the library components into link order.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a scripted tool runner and platform fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    component::Catalog, options::OptionSet, platform::PlatformDescriptor,
};

pub use resolver::{resolve, RecipeError, Resolution};
