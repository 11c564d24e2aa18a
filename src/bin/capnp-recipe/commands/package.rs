//! `capnp-recipe package` command

use anyhow::Result;

use super::Setup;
use crate::cli::{GlobalArgs, PackageArgs};
use capnp_recipe::ops::package;

pub fn execute(args: PackageArgs, global: &GlobalArgs) -> Result<()> {
    let setup = Setup::load(global)?;
    let mut session = setup.session(args.jobs)?;

    let report = package(&mut session)?;

    for file in &report.files {
        println!("{}", file.display());
    }

    eprintln!(
        "    Packaged {} files into {} ({} pruned)",
        report.files.len(),
        report.package_dir.display(),
        report.removed.len()
    );

    Ok(())
}
