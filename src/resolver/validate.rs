//! Compatibility validation.
//!
//! A pure gate run before anything else: it rejects toolchains that are too
//! old to build the library and option combinations the toolchain cannot
//! produce. It looks at the raw request, not the normalized one, because a
//! conflicting option is itself the diagnostic the user needs.

use std::collections::BTreeMap;

use crate::core::options::{OptionName, OptionSet};
use crate::core::platform::{CompilerId, CompilerVersion, CppStandard, Os, PlatformDescriptor};
use crate::resolver::errors::RecipeError;

/// Minimum compiler versions known to build the library.
const MINIMUM_COMPILER_VERSIONS: &[(CompilerId, &str)] = &[
    (CompilerId::Msvc, "15"),
    (CompilerId::Gcc, "5"),
    (CompilerId::Clang, "5"),
    (CompilerId::AppleClang, "4.3"),
];

/// Compatibility rules for a library release.
#[derive(Debug, Clone)]
pub struct CompatibilityRules {
    minimum_versions: BTreeMap<CompilerId, CompilerVersion>,
    minimum_cppstd: Option<CppStandard>,
}

impl Default for CompatibilityRules {
    fn default() -> Self {
        let minimum_versions = MINIMUM_COMPILER_VERSIONS
            .iter()
            .filter_map(|(id, v)| CompilerVersion::parse(v).ok().map(|v| (*id, v)))
            .collect();

        CompatibilityRules {
            minimum_versions,
            minimum_cppstd: Some(CppStandard::Cpp14),
        }
    }
}

impl CompatibilityRules {
    /// Rules with no minimums at all.
    pub fn permissive() -> Self {
        CompatibilityRules {
            minimum_versions: BTreeMap::new(),
            minimum_cppstd: None,
        }
    }

    /// Add or replace a compiler's minimum version.
    pub fn with_minimum_version(mut self, compiler: CompilerId, version: CompilerVersion) -> Self {
        self.minimum_versions.insert(compiler, version);
        self
    }

    pub fn with_minimum_cppstd(mut self, std: Option<CppStandard>) -> Self {
        self.minimum_cppstd = std;
        self
    }

    pub fn minimum_version(&self, compiler: CompilerId) -> Option<&CompilerVersion> {
        self.minimum_versions.get(&compiler)
    }

    /// Check the platform and requested options.
    pub fn validate(
        &self,
        platform: &PlatformDescriptor,
        requested: &OptionSet,
    ) -> Result<(), RecipeError> {
        if let Some(minimum) = self.minimum_versions.get(&platform.compiler) {
            if platform.compiler_version < *minimum {
                return Err(RecipeError::UnsupportedToolchain {
                    compiler: platform.compiler.to_string(),
                    version: platform.compiler_version.to_string(),
                    minimum: minimum.to_string(),
                });
            }
        }

        if let (Some(minimum), Some(requested_std)) = (self.minimum_cppstd, platform.cppstd) {
            if requested_std < minimum {
                return Err(RecipeError::UnsupportedLanguageStandard {
                    requested: requested_std.to_string(),
                    minimum: minimum.to_string(),
                });
            }
        }

        if platform.os == Os::Windows
            && platform.compiler == CompilerId::Msvc
            && requested.is_enabled(OptionName::Shared)
        {
            return Err(RecipeError::InvalidOptionCombination {
                option: OptionName::Shared.to_string(),
                compiler: platform.compiler.to_string(),
                os: platform.os.to_string(),
                reason: "Cap'n Proto doesn't support shared libraries for Visual Studio"
                    .to_string(),
            });
        }

        Ok(())
    }
}

/// Validate against the default rules.
pub fn validate(platform: &PlatformDescriptor, requested: &OptionSet) -> Result<(), RecipeError> {
    CompatibilityRules::default().validate(platform, requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::Arch;
    use crate::test_support::{linux_gcc, platform, windows_msvc};

    #[test]
    fn test_supported_toolchain_passes() {
        let request = OptionSet::new().with(OptionName::Shared, false);
        assert!(validate(&linux_gcc("11"), &request).is_ok());
        assert!(validate(&linux_gcc("5"), &request).is_ok());
    }

    #[test]
    fn test_old_compiler_rejected() {
        let err = validate(&linux_gcc("4.9"), &OptionSet::new()).unwrap_err();
        assert_eq!(
            err,
            RecipeError::UnsupportedToolchain {
                compiler: "gcc".to_string(),
                version: "4.9".to_string(),
                minimum: "5".to_string(),
            }
        );
    }

    #[test]
    fn test_apple_clang_minor_version() {
        let old = platform(Os::Macos, Arch::Armv8, CompilerId::AppleClang, "4.2");
        let ok = platform(Os::Macos, Arch::Armv8, CompilerId::AppleClang, "4.3");

        assert!(matches!(
            validate(&old, &OptionSet::new()),
            Err(RecipeError::UnsupportedToolchain { .. })
        ));
        assert!(validate(&ok, &OptionSet::new()).is_ok());
    }

    #[test]
    fn test_unknown_compiler_has_no_minimum() {
        let intel = platform(Os::Linux, Arch::X86_64, CompilerId::Intel, "1");
        assert!(validate(&intel, &OptionSet::new()).is_ok());
    }

    #[test]
    fn test_toolchain_checked_before_standard() {
        let p = linux_gcc("4").with_cppstd(CppStandard::Cpp11);
        assert!(matches!(
            validate(&p, &OptionSet::new()),
            Err(RecipeError::UnsupportedToolchain { .. })
        ));
    }

    #[test]
    fn test_language_standard() {
        let old = linux_gcc("11").with_cppstd(CppStandard::Cpp11);
        let err = validate(&old, &OptionSet::new()).unwrap_err();
        assert_eq!(
            err,
            RecipeError::UnsupportedLanguageStandard {
                requested: "C++11".to_string(),
                minimum: "C++14".to_string(),
            }
        );

        let exact = linux_gcc("11").with_cppstd(CppStandard::Cpp14);
        assert!(validate(&exact, &OptionSet::new()).is_ok());

        let permissive = CompatibilityRules::default().with_minimum_cppstd(None);
        assert!(permissive.validate(&old, &OptionSet::new()).is_ok());
    }

    #[test]
    fn test_msvc_shared_rejected() {
        let request = OptionSet::new().with(OptionName::Shared, true);
        let err = validate(&windows_msvc("16"), &request).unwrap_err();

        assert!(matches!(
            err,
            RecipeError::InvalidOptionCombination { ref option, .. } if option == "shared"
        ));
        assert!(err.to_string().contains("msvc on windows"));
    }

    #[test]
    fn test_shared_allowed_elsewhere() {
        let request = OptionSet::new().with(OptionName::Shared, true);
        let clang_windows = platform(Os::Windows, Arch::X86_64, CompilerId::Clang, "15");

        assert!(validate(&linux_gcc("11"), &request).is_ok());
        assert!(validate(&clang_windows, &request).is_ok());
    }

    #[test]
    fn test_table_is_extendable() {
        let rules = CompatibilityRules::default()
            .with_minimum_version(CompilerId::Intel, "19".parse().unwrap());
        let intel = platform(Os::Linux, Arch::X86_64, CompilerId::Intel, "18");

        assert!(rules.validate(&intel, &OptionSet::new()).is_err());
        assert!(CompatibilityRules::permissive()
            .validate(&linux_gcc("3"), &OptionSet::new())
            .is_ok());
    }
}
