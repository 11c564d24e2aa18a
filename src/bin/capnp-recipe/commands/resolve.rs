//! `capnp-recipe resolve` command

use anyhow::Result;
use serde::Serialize;

use super::Setup;
use crate::cli::{GlobalArgs, ResolveArgs};
use capnp_recipe::builder::{BackendKind, BuildConfiguration};
use capnp_recipe::core::platform::PlatformDescriptor;
use capnp_recipe::core::LIBRARY_VERSION;

#[derive(Serialize)]
struct ResolveReport<'a> {
    version: &'static str,
    platform: &'a PlatformDescriptor,
    #[serde(flatten)]
    configuration: &'a BuildConfiguration,
    link_order: &'a [&'static str],
}

pub fn execute(args: ResolveArgs, global: &GlobalArgs) -> Result<()> {
    let setup = Setup::load(global)?;
    let resolution = setup.resolve()?;
    let config = &resolution.configuration;

    if args.json {
        let report = ResolveReport {
            version: LIBRARY_VERSION,
            platform: &resolution.platform,
            configuration: config,
            link_order: &resolution.link_order,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Cap'n Proto {} for {}", LIBRARY_VERSION, resolution.platform);
    println!();
    println!("  Backend:    {}", config.backend);
    println!("  Build type: {}", config.build_type);
    if config.backend == BackendKind::Autotools {
        println!("  Bootstrap:  autoreconf");
    }
    println!("  Package id: {}", config.package_id);
    println!();

    println!("Options:");
    for (name, value) in config.options.iter() {
        println!("  {} = {}", name, value);
    }
    println!();

    println!("Arguments:");
    for arg in &config.arguments {
        println!("  {}", arg);
    }
    println!();

    println!("Components:");
    for name in &resolution.link_order {
        println!("  {}", name);
    }

    Ok(())
}
