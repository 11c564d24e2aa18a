//! capnp-recipe CLI - Build and package Cap'n Proto for a target platform

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use capnp_recipe::util::diagnostic::emit;
use capnp_recipe::RecipeError;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.global.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<RecipeError>() {
            Some(recipe_err) => emit(&recipe_err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.global.verbose {
        EnvFilter::new("capnp_recipe=debug")
    } else {
        EnvFilter::new("capnp_recipe=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global = cli.global;
    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args, &global),
        Commands::Linkplan(args) => commands::linkplan::execute(args, &global),
        Commands::Info(args) => commands::info::execute(args, &global),
        Commands::Build(args) => commands::build::execute(args, &global),
        Commands::Package(args) => commands::package::execute(args, &global),
        Commands::Test(args) => commands::test::execute(args, &global),
    }
}
