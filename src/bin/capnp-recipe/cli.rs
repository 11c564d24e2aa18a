//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use capnp_recipe::core::platform::{
    Arch, BuildType, CompilerId, CompilerVersion, CppStandard, Os,
};

/// capnp-recipe - Build and package the Cap'n Proto C++ library
#[derive(Parser)]
#[command(name = "capnp-recipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command.
#[derive(Args)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Read this config file instead of .capnp-recipe/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set an option, e.g. `-o shared=true` (repeatable)
    #[arg(short = 'o', long = "option", global = true, value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// Target operating system
    #[arg(long, global = true)]
    pub os: Option<Os>,

    /// Target architecture
    #[arg(long, global = true)]
    pub arch: Option<Arch>,

    /// Compiler family
    #[arg(long, global = true)]
    pub compiler: Option<CompilerId>,

    /// Compiler version, e.g. `11` or `9.4`
    #[arg(long, global = true, value_name = "VERSION")]
    pub compiler_version: Option<CompilerVersion>,

    /// C++ standard, e.g. `14`, `17` or `gnu17`
    #[arg(long, global = true, value_name = "STD")]
    pub cppstd: Option<CppStandard>,

    /// Build type: Release, Debug, RelWithDebInfo or MinSizeRel
    #[arg(long, global = true, value_name = "TYPE")]
    pub build_type: Option<BuildType>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate and resolve the build configuration
    Resolve(ResolveArgs),

    /// Show the link order of the library components
    Linkplan(LinkplanArgs),

    /// Print the package description for consumers as JSON
    Info(InfoArgs),

    /// Bootstrap, configure and compile Cap'n Proto
    Build(BuildArgs),

    /// Build, install and prune the package
    Package(PackageArgs),

    /// Run a smoke-test binary linked against the package
    Test(TestArgs),
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Emit the resolution as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct LinkplanArgs {
    /// Only print library names, one per line
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Installed package directory, used for the PATH entry
    #[arg(long, value_name = "DIR")]
    pub package_dir: Option<PathBuf>,

    /// Write the JSON to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct PackageArgs {
    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct TestArgs {
    /// Consumer binary to run (invoked as `<binary> write`)
    pub binary: PathBuf,
}
