//! `capnp-recipe info` command

use anyhow::Result;

use super::Setup;
use crate::cli::{GlobalArgs, InfoArgs};
use capnp_recipe::ops::package_info;
use capnp_recipe::util::fs::write_string;

pub fn execute(args: InfoArgs, global: &GlobalArgs) -> Result<()> {
    let setup = Setup::load(global)?;
    let resolution = setup.resolve()?;

    let info = package_info(&resolution, args.package_dir.as_deref());
    let json = serde_json::to_string_pretty(&info)?;

    match args.output {
        Some(path) => {
            write_string(&path, &json)?;
            eprintln!("    Wrote {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
