//! Implementation of `capnp-recipe build`.

use anyhow::{bail, Result};

use crate::builder::{BackendKind, BuildConfiguration, BuildLayout, BuildSession};
use crate::util::process::ToolRunner;

/// Check that the sources the backend needs are on disk.
pub fn check_source_tree(layout: &BuildLayout, backend: BackendKind) -> Result<()> {
    let cxx_dir = layout.cxx_dir();
    let marker = match backend {
        BackendKind::Autotools => "configure.ac",
        BackendKind::CMake => "CMakeLists.txt",
    };

    if !cxx_dir.join(marker).is_file() {
        bail!(
            "source tree not found: `{}` is missing\n\
             \n\
             Extract the Cap'n Proto release into `{}` before building.",
            cxx_dir.join(marker).display(),
            layout.source_dir.display()
        );
    }

    Ok(())
}

/// Bootstrap (if needed), configure and compile.
pub fn build<R: ToolRunner>(session: &mut BuildSession<R>) -> Result<BuildConfiguration> {
    check_source_tree(session.layout(), session.backend())?;

    let configuration = session.configure()?.clone();
    session.build()?;

    tracing::info!(
        "Built Cap'n Proto with {} (package id {})",
        configuration.backend,
        configuration.package_id
    );

    Ok(configuration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BuildTools;
    use crate::core::options::OptionSet;
    use crate::resolver::resolve;
    use crate::test_support::{linux_gcc, write_source_tree, write_tree, MockRunner};
    use tempfile::TempDir;

    #[test]
    fn test_missing_sources_rejected_before_running_tools() {
        let tmp = TempDir::new().unwrap();
        let resolution = resolve(&linux_gcc("11"), &OptionSet::new()).unwrap();
        let mut session = BuildSession::new(
            resolution,
            BuildLayout::new(tmp.path()),
            &BuildTools::default(),
            MockRunner::succeeding(),
        );

        let err = build(&mut session).unwrap_err();
        assert!(err.to_string().contains("configure.ac"));
        assert!(session.runner().calls().is_empty());
    }

    #[test]
    fn test_build_runs_full_sequence() {
        let tmp = TempDir::new().unwrap();
        let layout = BuildLayout::new(tmp.path());
        write_source_tree(&layout.source_dir);

        let resolution = resolve(&linux_gcc("11"), &OptionSet::new()).unwrap();
        let mut session = BuildSession::new(
            resolution,
            layout,
            &BuildTools::default(),
            MockRunner::succeeding(),
        );

        let config = build(&mut session).unwrap();
        let calls = session.runner().calls();

        assert_eq!(config.backend, BackendKind::Autotools);
        assert_eq!(calls.len(), 3);
        assert!(calls[0].starts_with("autoreconf"));
        assert!(calls[1].contains("configure --prefix="));
        assert_eq!(calls[2], "make -j1");
    }

    #[test]
    fn test_cmake_needs_cmakelists() {
        let tmp = TempDir::new().unwrap();
        let layout = BuildLayout::new(tmp.path());
        write_tree(&layout.source_dir, &["c++/configure.ac"]);

        assert!(check_source_tree(&layout, BackendKind::Autotools).is_ok());
        assert!(check_source_tree(&layout, BackendKind::CMake).is_err());

        write_tree(&layout.source_dir, &["c++/CMakeLists.txt"]);
        assert!(check_source_tree(&layout, BackendKind::CMake).is_ok());
    }
}
