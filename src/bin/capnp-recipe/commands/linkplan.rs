//! `capnp-recipe linkplan` command

use anyhow::Result;

use super::Setup;
use crate::cli::{GlobalArgs, LinkplanArgs};
use capnp_recipe::resolver::link_order::{link_libraries, link_system_libraries};

pub fn execute(args: LinkplanArgs, global: &GlobalArgs) -> Result<()> {
    let setup = Setup::load(global)?;
    let resolution = setup.resolve()?;
    let graph = &resolution.graph;

    let libs = link_libraries(graph, &resolution.link_order);
    let system_libs = link_system_libraries(graph, &resolution.link_order);

    if args.quiet {
        for lib in libs.iter().chain(system_libs.iter()) {
            println!("{}", lib);
        }
        return Ok(());
    }

    println!("Link order for Cap'n Proto ({}):", resolution.platform);
    println!();

    let mut index = 1;

    for name in &resolution.link_order {
        let deps = graph.dependencies(name);
        println!("  {}. {}", index, name);
        if deps.is_empty() {
            println!("     Requires: (nothing)");
        } else {
            println!("     Requires: {}", deps.join(", "));
        }
        let own = graph.system_libs(name);
        if !own.is_empty() {
            println!("     System:   {}", own.join(", "));
        }
        println!();
        index += 1;
    }

    if !system_libs.is_empty() {
        println!("System libraries:");
        for lib in &system_libs {
            println!("  {}", lib);
        }
    }

    Ok(())
}
