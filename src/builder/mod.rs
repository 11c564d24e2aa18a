//! Native build backends.
//!
//! Backend selection, argument synthesis, the two backend drivers and the
//! build session that runs them.

pub mod autotools;
pub mod backend;
pub mod cmake;
pub mod patch;
pub mod session;
pub mod synthesize;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::component::LIBRARY_VERSION;
use crate::core::options::OptionSet;
use crate::core::platform::{BuildType, PlatformDescriptor};
use crate::util::hash::Fingerprint;
use crate::util::process::{find_cmake, find_git, find_make};

pub use backend::{select_backend, BackendDriver, BackendKind};
pub use patch::SourcePatch;
pub use session::BuildSession;
pub use synthesize::{decode_features, synthesize, Feature, FeatureSet};

/// Default source directory name under the recipe root.
pub const SOURCE_SUBFOLDER: &str = "source_subfolder";

/// Default build directory name under the recipe root.
pub const BUILD_SUBFOLDER: &str = "build_subfolder";

/// Default package directory name under the recipe root.
pub const PACKAGE_SUBFOLDER: &str = "package";

/// Backend choice plus the arguments it will be configured with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfiguration {
    pub backend: BackendKind,
    pub build_type: BuildType,
    /// Backend-native arguments, in emission order
    pub arguments: Vec<String>,
    /// Effective options the arguments were synthesized from
    pub options: OptionSet,
    /// Short fingerprint of platform and effective options
    pub package_id: String,
}

impl BuildConfiguration {
    /// Select the backend for `platform` and synthesize its arguments.
    pub fn new(platform: &PlatformDescriptor, options: OptionSet) -> Self {
        let backend = select_backend(platform);
        let arguments = synthesize(backend, &options);
        let package_id = package_id(platform, &options);

        BuildConfiguration {
            backend,
            build_type: platform.build_type,
            arguments,
            options,
            package_id,
        }
    }
}

/// Fingerprint identifying one binary configuration of the package.
pub fn package_id(platform: &PlatformDescriptor, options: &OptionSet) -> String {
    let mut fp = Fingerprint::new();
    fp.update_str(LIBRARY_VERSION)
        .update_str(platform.os.as_str())
        .update_str(platform.arch.as_str())
        .update_str(platform.compiler.as_str())
        .update_str(&platform.compiler_version.to_string())
        .update_opt(platform.cppstd.map(|s| s.year()))
        .update_str(platform.build_type.as_str());

    for (name, value) in options.iter() {
        fp.update_str(name.as_str()).update_bool(value);
    }

    fp.finish_short()
}

/// Where sources live, where the build happens and where it installs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub package_dir: PathBuf,
}

impl BuildLayout {
    /// The default layout below `root`.
    pub fn new(root: &Path) -> Self {
        BuildLayout {
            source_dir: root.join(SOURCE_SUBFOLDER),
            build_dir: root.join(BUILD_SUBFOLDER),
            package_dir: root.join(PACKAGE_SUBFOLDER),
        }
    }

    /// The directory holding the C++ sources and build scripts.
    pub fn cxx_dir(&self) -> PathBuf {
        self.source_dir.join("c++")
    }
}

/// Executables the backends invoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTools {
    pub autoreconf: PathBuf,
    pub cmake: PathBuf,
    pub make: PathBuf,
    pub git: PathBuf,
    /// Parallel job count passed to the build step
    pub jobs: usize,
}

impl Default for BuildTools {
    fn default() -> Self {
        BuildTools {
            autoreconf: PathBuf::from("autoreconf"),
            cmake: PathBuf::from("cmake"),
            make: PathBuf::from("make"),
            git: PathBuf::from("git"),
            jobs: 1,
        }
    }
}

impl BuildTools {
    /// Locate tools on this machine.
    ///
    /// `autoreconf` comes from the `AUTORECONF` environment variable, then
    /// the configured path, then PATH lookup by name.
    pub fn detect(configured_autoreconf: Option<&Path>) -> Self {
        let from_env = std::env::var_os("AUTORECONF")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let jobs = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        BuildTools {
            autoreconf: pick_autoreconf(from_env, configured_autoreconf),
            cmake: find_cmake().unwrap_or_else(|| PathBuf::from("cmake")),
            make: find_make().unwrap_or_else(|| PathBuf::from("make")),
            git: find_git().unwrap_or_else(|| PathBuf::from("git")),
            jobs,
        }
    }
}

fn pick_autoreconf(from_env: Option<PathBuf>, configured: Option<&Path>) -> PathBuf {
    from_env
        .or_else(|| configured.map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("autoreconf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::OptionName;
    use crate::core::platform::CppStandard;
    use crate::resolver::normalize::normalize;
    use crate::test_support::{linux_gcc, windows_msvc};

    #[test]
    fn test_configuration_for_linux() {
        let platform = linux_gcc("11");
        let config = BuildConfiguration::new(&platform, normalize(&platform, &OptionSet::new()));

        assert_eq!(config.backend, BackendKind::Autotools);
        assert_eq!(config.build_type, BuildType::Release);
        assert_eq!(
            config.arguments,
            vec![
                "--disable-shared",
                "--enable-static",
                "--with-pic",
                "--with-openssl",
                "--with-zlib",
                "--enable-reflection",
            ]
        );
        assert_eq!(config.package_id.len(), 16);
    }

    #[test]
    fn test_package_id_tracks_inputs() {
        let platform = linux_gcc("11");
        let options = normalize(&platform, &OptionSet::new());
        let base = package_id(&platform, &options);

        assert_eq!(base, package_id(&platform, &options));
        assert_ne!(base, package_id(&linux_gcc("12"), &options));
        assert_ne!(
            base,
            package_id(&platform.clone().with_cppstd(CppStandard::Cpp17), &options)
        );

        let shared = normalize(&platform, &OptionSet::new().with(OptionName::Shared, true));
        assert_ne!(base, package_id(&platform, &shared));
        assert_ne!(base, package_id(&windows_msvc("16"), &options));
        assert_ne!(
            base,
            package_id(&platform.clone().with_build_type(BuildType::Debug), &options)
        );
    }

    #[test]
    fn test_layout_defaults() {
        let layout = BuildLayout::new(Path::new("/work"));
        assert_eq!(layout.source_dir, Path::new("/work/source_subfolder"));
        assert_eq!(layout.cxx_dir(), Path::new("/work/source_subfolder/c++"));
        assert_eq!(layout.package_dir, Path::new("/work/package"));
    }

    #[test]
    fn test_autoreconf_precedence() {
        let configured = Path::new("/opt/autotools/bin/autoreconf");

        assert_eq!(
            pick_autoreconf(Some(PathBuf::from("autoreconf-2.69")), Some(configured)),
            PathBuf::from("autoreconf-2.69")
        );
        assert_eq!(pick_autoreconf(None, Some(configured)), configured);
        assert_eq!(pick_autoreconf(None, None), PathBuf::from("autoreconf"));
    }
}
