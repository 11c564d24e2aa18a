//! Platform descriptor: target OS, architecture and compiler identity.
//!
//! The descriptor is supplied once per build invocation and never mutated.
//! Every setting is a closed enum except the compiler version, which is
//! compared numerically but displayed exactly as the user wrote it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::util::process::{ProcessBuilder, ToolRunner};

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    #[serde(alias = "Linux")]
    Linux,
    #[serde(alias = "Macos", alias = "darwin")]
    Macos,
    #[serde(alias = "Windows")]
    Windows,
    #[serde(alias = "FreeBSD")]
    Freebsd,
    #[serde(alias = "Android")]
    Android,
    #[serde(alias = "iOS")]
    Ios,
}

impl Os {
    pub const ALL: [Os; 6] = [
        Os::Linux,
        Os::Macos,
        Os::Windows,
        Os::Freebsd,
        Os::Android,
        Os::Ios,
    ];

    /// Get the OS name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Macos => "macos",
            Os::Windows => "windows",
            Os::Freebsd => "freebsd",
            Os::Android => "android",
            Os::Ios => "ios",
        }
    }

    /// Detect the OS this binary was compiled for.
    pub fn host() -> Option<Os> {
        std::env::consts::OS.parse().ok()
    }
}

impl FromStr for Os {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Os::Linux),
            "macos" | "darwin" => Ok(Os::Macos),
            "windows" => Ok(Os::Windows),
            "freebsd" => Ok(Os::Freebsd),
            "android" => Ok(Os::Android),
            "ios" => Ok(Os::Ios),
            _ => Err(PlatformParseError::new("operating system", s)),
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    X86,
    #[serde(alias = "amd64")]
    X86_64,
    #[serde(alias = "arm")]
    Armv7,
    #[serde(alias = "aarch64", alias = "arm64")]
    Armv8,
    #[serde(alias = "wasm32")]
    Wasm,
}

impl Arch {
    /// Get the architecture name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Armv7 => "armv7",
            Arch::Armv8 => "armv8",
            Arch::Wasm => "wasm",
        }
    }

    /// Detect the architecture this binary was compiled for.
    pub fn host() -> Option<Arch> {
        std::env::consts::ARCH.parse().ok()
    }
}

impl FromStr for Arch {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "i686" | "i386" => Ok(Arch::X86),
            "x86_64" | "amd64" => Ok(Arch::X86_64),
            "armv7" | "arm" => Ok(Arch::Armv7),
            "armv8" | "aarch64" | "arm64" => Ok(Arch::Armv8),
            "wasm" | "wasm32" => Ok(Arch::Wasm),
            _ => Err(PlatformParseError::new("architecture", s)),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiler family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompilerId {
    #[serde(rename = "msvc", alias = "Visual Studio", alias = "visual-studio")]
    Msvc,
    #[serde(rename = "gcc")]
    Gcc,
    #[serde(rename = "clang")]
    Clang,
    #[serde(rename = "apple-clang", alias = "apple_clang")]
    AppleClang,
    #[serde(rename = "intel")]
    Intel,
}

impl CompilerId {
    /// Get the compiler name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerId::Msvc => "msvc",
            CompilerId::Gcc => "gcc",
            CompilerId::Clang => "clang",
            CompilerId::AppleClang => "apple-clang",
            CompilerId::Intel => "intel",
        }
    }
}

impl FromStr for CompilerId {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "msvc" | "visual studio" | "visual-studio" | "cl" => Ok(CompilerId::Msvc),
            "gcc" | "g++" => Ok(CompilerId::Gcc),
            "clang" | "clang++" => Ok(CompilerId::Clang),
            "apple-clang" | "apple_clang" => Ok(CompilerId::AppleClang),
            "intel" | "icc" => Ok(CompilerId::Intel),
            _ => Err(PlatformParseError::new("compiler", s)),
        }
    }
}

impl fmt::Display for CompilerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiler version such as `15`, `4.3` or `11.2.0`.
///
/// Missing components count as zero and trailing non-numeric suffixes
/// (`12.1.0-ubuntu`) are ignored for comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompilerVersion {
    raw: String,
    version: semver::Version,
}

impl CompilerVersion {
    /// Parse a version, accepting incomplete forms.
    pub fn parse(s: &str) -> Result<Self, PlatformParseError> {
        let raw = s.trim();
        let numeric = raw
            .split(|c: char| !c.is_ascii_digit() && c != '.')
            .next()
            .unwrap_or("");

        let mut parts = numeric.split('.').filter(|p| !p.is_empty());
        let mut next = || -> Result<u64, PlatformParseError> {
            match parts.next() {
                Some(p) => p
                    .parse()
                    .map_err(|_| PlatformParseError::new("compiler version", raw)),
                None => Ok(0),
            }
        };

        if numeric.is_empty() {
            return Err(PlatformParseError::new("compiler version", raw));
        }

        let version = semver::Version::new(next()?, next()?, next()?);
        Ok(CompilerVersion {
            raw: raw.to_string(),
            version,
        })
    }

    /// The numeric version used for comparisons.
    pub fn as_semver(&self) -> &semver::Version {
        &self.version
    }

    /// The version exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for CompilerVersion {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for CompilerVersion {}

impl PartialOrd for CompilerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CompilerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}

impl FromStr for CompilerVersion {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompilerVersion::parse(s)
    }
}

impl TryFrom<String> for CompilerVersion {
    type Error = PlatformParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        CompilerVersion::parse(&s)
    }
}

impl From<CompilerVersion> for String {
    fn from(v: CompilerVersion) -> Self {
        v.raw
    }
}

impl fmt::Display for CompilerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// C++ standard version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CppStandard {
    Cpp98,
    Cpp11,
    Cpp14,
    Cpp17,
    Cpp20,
    Cpp23,
}

impl CppStandard {
    /// The year ordinal, e.g. `14` for C++14.
    pub fn year(&self) -> &'static str {
        match self {
            CppStandard::Cpp98 => "98",
            CppStandard::Cpp11 => "11",
            CppStandard::Cpp14 => "14",
            CppStandard::Cpp17 => "17",
            CppStandard::Cpp20 => "20",
            CppStandard::Cpp23 => "23",
        }
    }
}

impl FromStr for CppStandard {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let year = lower
            .strip_prefix("c++")
            .or_else(|| lower.strip_prefix("gnu++"))
            .or_else(|| lower.strip_prefix("gnu"))
            .or_else(|| lower.strip_prefix("cpp"))
            .unwrap_or(&lower);

        match year {
            "98" | "03" => Ok(CppStandard::Cpp98),
            "11" => Ok(CppStandard::Cpp11),
            "14" => Ok(CppStandard::Cpp14),
            "17" => Ok(CppStandard::Cpp17),
            "20" => Ok(CppStandard::Cpp20),
            "23" => Ok(CppStandard::Cpp23),
            _ => Err(PlatformParseError::new("C++ standard", s)),
        }
    }
}

impl TryFrom<String> for CppStandard {
    type Error = PlatformParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CppStandard> for String {
    fn from(s: CppStandard) -> Self {
        s.year().to_string()
    }
}

impl fmt::Display for CppStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C++{}", self.year())
    }
}

/// Build configuration, named the way CMake names them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildType {
    #[default]
    #[serde(rename = "Release", alias = "release")]
    Release,
    #[serde(rename = "Debug", alias = "debug")]
    Debug,
    #[serde(rename = "RelWithDebInfo", alias = "relwithdebinfo")]
    RelWithDebInfo,
    #[serde(rename = "MinSizeRel", alias = "minsizerel")]
    MinSizeRel,
}

impl BuildType {
    pub const ALL: [BuildType; 4] = [
        BuildType::Release,
        BuildType::Debug,
        BuildType::RelWithDebInfo,
        BuildType::MinSizeRel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Release => "Release",
            BuildType::Debug => "Debug",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl FromStr for BuildType {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildType::ALL
            .into_iter()
            .find(|bt| bt.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PlatformParseError::new("build type", s))
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a platform setting cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformParseError {
    pub setting: &'static str,
    pub value: String,
}

impl PlatformParseError {
    fn new(setting: &'static str, value: &str) -> Self {
        PlatformParseError {
            setting,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for PlatformParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} '{}'", self.setting, self.value)
    }
}

impl std::error::Error for PlatformParseError {}

/// Everything the resolver needs to know about the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    pub os: Os,
    pub arch: Arch,
    pub compiler: CompilerId,
    pub compiler_version: CompilerVersion,
    /// Requested language standard, if the user pinned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cppstd: Option<CppStandard>,
    #[serde(default)]
    pub build_type: BuildType,
}

impl PlatformDescriptor {
    /// Create a descriptor without a pinned language standard.
    pub fn new(os: Os, arch: Arch, compiler: CompilerId, compiler_version: CompilerVersion) -> Self {
        PlatformDescriptor {
            os,
            arch,
            compiler,
            compiler_version,
            cppstd: None,
            build_type: BuildType::Release,
        }
    }

    /// Pin the language standard.
    pub fn with_cppstd(mut self, cppstd: CppStandard) -> Self {
        self.cppstd = Some(cppstd);
        self
    }

    pub fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }

    /// Whether binaries built for `self` cannot run on `host`.
    pub fn is_cross_building(&self, host: &PlatformDescriptor) -> bool {
        self.os != host.os || self.arch != host.arch
    }

    /// Detect the host platform by probing the C++ compiler.
    ///
    /// The compiler is taken from `CXX` if set, otherwise `c++` (or `cl`
    /// on Windows).
    pub fn detect_host(runner: &mut dyn ToolRunner) -> Result<Self> {
        let os = Os::host()
            .with_context(|| format!("unsupported host OS `{}`", std::env::consts::OS))?;
        let arch = Arch::host()
            .with_context(|| format!("unsupported host arch `{}`", std::env::consts::ARCH))?;

        let default_cxx = if os == Os::Windows { "cl" } else { "c++" };
        let cxx = std::env::var("CXX").unwrap_or_else(|_| default_cxx.to_string());

        let cmd = if os == Os::Windows && cxx == "cl" {
            ProcessBuilder::new(&cxx)
        } else {
            ProcessBuilder::new(&cxx).arg("--version")
        };
        let output = runner.output(&cmd)?;
        let banner = format!("{}\n{}", output.stdout, output.stderr);

        let (compiler, compiler_version) = parse_compiler_banner(&banner)
            .with_context(|| format!("could not identify compiler from `{}` output", cxx))?;

        tracing::debug!("Detected host compiler {} {}", compiler, compiler_version);

        Ok(PlatformDescriptor::new(os, arch, compiler, compiler_version))
    }
}

impl fmt::Display for PlatformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} {} {}",
            self.os, self.arch, self.compiler, self.compiler_version
        )?;
        if let Some(std) = self.cppstd {
            write!(f, " ({})", std)?;
        }
        if self.build_type != BuildType::Release {
            write!(f, " [{}]", self.build_type)?;
        }
        Ok(())
    }
}

/// Identify the compiler family and version from a `--version` banner.
pub fn parse_compiler_banner(banner: &str) -> Option<(CompilerId, CompilerVersion)> {
    let lower = banner.to_lowercase();

    let compiler = if lower.contains("microsoft") {
        CompilerId::Msvc
    } else if lower.contains("apple") && lower.contains("clang") {
        CompilerId::AppleClang
    } else if lower.contains("clang") {
        CompilerId::Clang
    } else if lower.contains("intel") {
        CompilerId::Intel
    } else if lower.contains("gcc") || lower.contains("g++") || lower.contains("free software") {
        CompilerId::Gcc
    } else {
        return None;
    };

    let re = Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").ok()?;
    let caps = re.captures(banner)?;
    let version = CompilerVersion::parse(caps.get(0)?.as_str()).ok()?;

    // cl.exe reports the toolset (19.x); map it onto the Visual Studio
    // release numbering the minimum-version table uses.
    let version = if compiler == CompilerId::Msvc {
        msvc_toolset_to_release(&version).unwrap_or(version)
    } else {
        version
    };

    Some((compiler, version))
}

fn msvc_toolset_to_release(toolset: &CompilerVersion) -> Option<CompilerVersion> {
    let v = toolset.as_semver();
    let release = match (v.major, v.minor) {
        (19, m) if m >= 30 => "17",
        (19, m) if m >= 20 => "16",
        (19, m) if m >= 10 => "15",
        (19, _) => "14",
        (18, _) => "12",
        _ => return None,
    };
    CompilerVersion::parse(release).ok()
}
