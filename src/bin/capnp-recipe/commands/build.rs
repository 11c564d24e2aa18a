//! `capnp-recipe build` command

use anyhow::Result;

use super::Setup;
use crate::cli::{BuildArgs, GlobalArgs};
use capnp_recipe::core::LIBRARY_VERSION;
use capnp_recipe::ops::build;

pub fn execute(args: BuildArgs, global: &GlobalArgs) -> Result<()> {
    let setup = Setup::load(global)?;
    let mut session = setup.session(args.jobs)?;

    let configuration = build(&mut session)?;

    eprintln!(
        "    Finished capnproto/{} ({}, package id {})",
        LIBRARY_VERSION, configuration.backend, configuration.package_id
    );

    Ok(())
}
