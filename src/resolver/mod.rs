//! Configuration resolution.
//!
//! The pipeline is pure and deterministic: validate the request, normalize
//! the options, pick and parametrize a backend, then build the component
//! graph and order it for linking. All I/O happens outside this module.

pub mod errors;
pub mod graph;
pub mod link_order;
pub mod normalize;
pub mod validate;

pub use errors::RecipeError;
pub use graph::{build_graph, ComponentGraph};
pub use link_order::resolve_order;
pub use normalize::normalize;
pub use validate::{validate, CompatibilityRules};

use crate::builder::BuildConfiguration;
use crate::core::component::Catalog;
use crate::core::options::OptionSet;
use crate::core::platform::PlatformDescriptor;

/// Everything derived from one (platform, options) request.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub platform: PlatformDescriptor,
    pub configuration: BuildConfiguration,
    pub graph: ComponentGraph,
    /// Present components, dependents first
    pub link_order: Vec<&'static str>,
}

impl Resolution {
    /// Effective options after normalization.
    pub fn options(&self) -> &OptionSet {
        &self.configuration.options
    }
}

/// Resolve against the Cap'n Proto catalog and default rules.
pub fn resolve(platform: &PlatformDescriptor, raw: &OptionSet) -> Result<Resolution, RecipeError> {
    resolve_with(
        &CompatibilityRules::default(),
        &Catalog::capnproto(),
        platform,
        raw,
    )
}

/// Resolve with explicit rules and catalog.
pub fn resolve_with(
    rules: &CompatibilityRules,
    catalog: &Catalog,
    platform: &PlatformDescriptor,
    raw: &OptionSet,
) -> Result<Resolution, RecipeError> {
    rules.validate(platform, raw)?;

    let effective = normalize(platform, raw);
    tracing::debug!("Effective options: {}", effective);

    let configuration = BuildConfiguration::new(platform, effective);
    let graph = build_graph(catalog, &configuration.options, platform.os)?;
    let link_order = resolve_order(&graph)?;

    tracing::debug!("Link order: {}", link_order.join(" "));

    Ok(Resolution {
        platform: platform.clone(),
        configuration,
        graph,
        link_order,
    })
}
