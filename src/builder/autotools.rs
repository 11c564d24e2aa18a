//! Autotools driver.
//!
//! The source release ships `configure.ac` but no generated `configure`,
//! so a bootstrap with `autoreconf` has to run in the C++ source directory
//! first. Configure then runs out of tree in the build directory, with the
//! build type expressed as a `CXXFLAGS=` assignment.

use std::path::PathBuf;

use crate::builder::backend::{BackendDriver, BackendKind};
use crate::builder::{BuildConfiguration, BuildLayout, BuildTools};
use crate::core::platform::BuildType;
use crate::util::process::ProcessBuilder;

/// Arguments for the bootstrap step.
pub const AUTORECONF_ARGS: &[&str] = &["--install", "--verbose", "-Wall"];

/// Compiler flags handed to `configure` for a build type.
pub fn cxxflags(build_type: BuildType) -> &'static str {
    match build_type {
        BuildType::Release => "-O2 -DNDEBUG",
        BuildType::Debug => "-g -O0",
        BuildType::RelWithDebInfo => "-g -O2 -DNDEBUG",
        BuildType::MinSizeRel => "-Os -DNDEBUG",
    }
}

#[derive(Debug, Clone)]
pub struct AutotoolsDriver {
    autoreconf: PathBuf,
    make: PathBuf,
    jobs: usize,
}

impl AutotoolsDriver {
    pub fn new(tools: &BuildTools) -> Self {
        AutotoolsDriver {
            autoreconf: tools.autoreconf.clone(),
            make: tools.make.clone(),
            jobs: tools.jobs,
        }
    }
}

impl BackendDriver for AutotoolsDriver {
    fn kind(&self) -> BackendKind {
        BackendKind::Autotools
    }

    fn bootstrap(&self, layout: &BuildLayout) -> Option<ProcessBuilder> {
        Some(
            ProcessBuilder::new(&self.autoreconf)
                .args(AUTORECONF_ARGS)
                .cwd(layout.cxx_dir()),
        )
    }

    fn configure(&self, layout: &BuildLayout, config: &BuildConfiguration) -> ProcessBuilder {
        ProcessBuilder::new(layout.cxx_dir().join("configure"))
            .arg(format!("--prefix={}", layout.package_dir.display()))
            .args(&config.arguments)
            .arg(format!("CXXFLAGS={}", cxxflags(config.build_type)))
            .cwd(&layout.build_dir)
    }

    fn build(&self, layout: &BuildLayout, _config: &BuildConfiguration) -> ProcessBuilder {
        ProcessBuilder::new(&self.make)
            .arg(format!("-j{}", self.jobs))
            .cwd(&layout.build_dir)
    }

    fn install(&self, layout: &BuildLayout, _config: &BuildConfiguration) -> ProcessBuilder {
        ProcessBuilder::new(&self.make)
            .arg("install")
            .cwd(&layout.build_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::OptionSet;
    use crate::core::platform::PlatformDescriptor;
    use crate::resolver::normalize::normalize;
    use crate::test_support::linux_gcc;
    use std::path::Path;

    fn driver() -> AutotoolsDriver {
        AutotoolsDriver::new(&BuildTools::default())
    }

    fn configuration(platform: &PlatformDescriptor) -> BuildConfiguration {
        BuildConfiguration::new(platform, normalize(platform, &OptionSet::new()))
    }

    #[test]
    fn test_bootstrap_runs_in_cxx_dir() {
        let layout = BuildLayout::new(Path::new("/w"));
        let cmd = driver().bootstrap(&layout).unwrap();

        assert_eq!(cmd.display_command(), "autoreconf --install --verbose -Wall");
        assert_eq!(cmd.get_cwd(), Some(Path::new("/w/source_subfolder/c++")));
    }

    #[test]
    fn test_configure_out_of_tree() {
        let config = configuration(&linux_gcc("11"));
        let layout = BuildLayout::new(Path::new("/w"));
        let cmd = driver().configure(&layout, &config);
        let args = cmd.get_args();

        assert_eq!(
            cmd.get_program(),
            Path::new("/w/source_subfolder/c++/configure")
        );
        assert_eq!(args[0], "--prefix=/w/package");
        assert_eq!(&args[1..args.len() - 1], config.arguments.as_slice());
        assert_eq!(args.last().unwrap(), "CXXFLAGS=-O2 -DNDEBUG");
        assert_eq!(cmd.get_cwd(), Some(Path::new("/w/build_subfolder")));
    }

    #[test]
    fn test_debug_cxxflags() {
        let config = configuration(&linux_gcc("11").with_build_type(BuildType::Debug));
        let cmd = driver().configure(&BuildLayout::new(Path::new("/w")), &config);

        assert_eq!(cmd.get_args().last().unwrap(), "CXXFLAGS=-g -O0");
        for build_type in BuildType::ALL {
            let flags = cxxflags(build_type);
            assert_eq!(flags.contains("-DNDEBUG"), build_type != BuildType::Debug);
        }
    }

    #[test]
    fn test_custom_autoreconf() {
        let tools = BuildTools {
            autoreconf: PathBuf::from("/opt/bin/autoreconf"),
            ..BuildTools::default()
        };
        let layout = BuildLayout::new(Path::new("/w"));
        let cmd = AutotoolsDriver::new(&tools).bootstrap(&layout).unwrap();

        assert_eq!(cmd.get_program(), Path::new("/opt/bin/autoreconf"));
    }

    #[test]
    fn test_make_commands() {
        let layout = BuildLayout::new(Path::new("/w"));
        let config = configuration(&linux_gcc("11"));
        assert_eq!(driver().build(&layout, &config).display_command(), "make -j1");
        assert_eq!(
            driver().install(&layout, &config).display_command(),
            "make install"
        );
    }
}
