//! Test fixtures: platforms, option sets and installed package trees.

use std::path::Path;

use crate::core::options::{OptionName, OptionSet};
use crate::core::platform::{Arch, CompilerId, CompilerVersion, Os, PlatformDescriptor};

/// A platform from its parts. Panics on an unparsable version.
pub fn platform(os: Os, arch: Arch, compiler: CompilerId, version: &str) -> PlatformDescriptor {
    let version = CompilerVersion::parse(version)
        .unwrap_or_else(|e| panic!("bad compiler version in fixture: {}", e));
    PlatformDescriptor::new(os, arch, compiler, version)
}

/// Linux x86_64 with gcc.
pub fn linux_gcc(version: &str) -> PlatformDescriptor {
    platform(Os::Linux, Arch::X86_64, CompilerId::Gcc, version)
}

/// Windows x86_64 with MSVC.
pub fn windows_msvc(version: &str) -> PlatformDescriptor {
    platform(Os::Windows, Arch::X86_64, CompilerId::Msvc, version)
}

/// macOS armv8 with apple-clang.
pub fn macos_apple_clang(version: &str) -> PlatformDescriptor {
    platform(Os::Macos, Arch::Armv8, CompilerId::AppleClang, version)
}

/// A fixed list of supported platforms covering both backends.
pub fn sample_platforms() -> Vec<PlatformDescriptor> {
    vec![
        linux_gcc("11"),
        platform(Os::Linux, Arch::Armv8, CompilerId::Clang, "14"),
        macos_apple_clang("13"),
        windows_msvc("16"),
        platform(Os::Windows, Arch::X86_64, CompilerId::Clang, "15"),
        platform(Os::Freebsd, Arch::X86_64, CompilerId::Clang, "13"),
        platform(Os::Android, Arch::Armv7, CompilerId::Clang, "12"),
    ]
}

/// Every option set where each option is absent, true or false.
pub fn all_option_sets() -> Vec<OptionSet> {
    let mut sets = vec![OptionSet::new()];
    for name in OptionName::ALL {
        let mut next = Vec::with_capacity(sets.len() * 3);
        for set in sets {
            next.push(set.clone().with(name, true));
            next.push(set.clone().with(name, false));
            next.push(set);
        }
        sets = next;
    }
    sets
}

/// Files an Autotools `make install` leaves behind.
pub const AUTOTOOLS_INSTALL_TREE: &[&str] = &[
    "bin/capnp",
    "bin/capnpc-c++",
    "include/capnp/message.h",
    "include/kj/common.h",
    "lib/libcapnp.a",
    "lib/libcapnp.la",
    "lib/libkj.a",
    "lib/libkj.la",
    "lib/cmake/CapnProto/CapnProtoConfig.cmake",
    "lib/cmake/CapnProto/CapnProtoConfigVersion.cmake",
    "lib/cmake/CapnProto/CapnProtoMacros.cmake",
    "lib/cmake/CapnProto/CapnProtoTargets.cmake",
    "lib/cmake/CapnProto/CapnProtoTargets-release.cmake",
    "lib/pkgconfig/capnp.pc",
    "lib/pkgconfig/kj.pc",
];

/// Write empty files for each relative path under `root`.
pub fn write_tree(root: &Path, files: &[&str]) {
    for file in files {
        let path = root.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, b"").unwrap();
    }
}

/// Write a minimal source tree with a license and both build systems.
pub fn write_source_tree(root: &Path) {
    write_tree(root, &["c++/configure.ac", "c++/Makefile.am", "c++/CMakeLists.txt"]);
    std::fs::write(root.join("LICENSE"), "Copyright (c) 2013-2017 Sandstorm Development Group\n")
        .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_option_sets_is_exhaustive() {
        let sets = all_option_sets();
        assert_eq!(sets.len(), 3usize.pow(OptionName::ALL.len() as u32));
        assert!(sets.iter().any(|s| s.is_empty()));
        assert!(sets.iter().any(|s| s.len() == OptionName::ALL.len()));
    }
}
