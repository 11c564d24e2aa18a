//! CLI integration tests for capnp-recipe.
//!
//! These tests drive the binary with explicit platform flags so that no host
//! detection or real toolchain is involved.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the capnp-recipe binary command, isolated from user config.
fn recipe(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("capnp-recipe").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("AUTORECONF")
        .current_dir(home.path());
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

const LINUX_GCC: &[&str] = &[
    "--os",
    "linux",
    "--arch",
    "x86_64",
    "--compiler",
    "gcc",
    "--compiler-version",
    "11",
];

const WINDOWS_MSVC: &[&str] = &[
    "--os",
    "windows",
    "--arch",
    "x86_64",
    "--compiler",
    "msvc",
    "--compiler-version",
    "16",
];

// ============================================================================
// capnp-recipe resolve
// ============================================================================

#[test]
fn test_resolve_linux_defaults() {
    let tmp = temp_dir();

    recipe(&tmp)
        .arg("resolve")
        .args(LINUX_GCC)
        .assert()
        .success()
        .stdout(predicate::str::contains("Backend:    autotools"))
        .stdout(predicate::str::contains("--with-openssl"))
        .stdout(predicate::str::contains("--disable-shared"))
        .stdout(predicate::str::contains("capnp-json"));
}

#[test]
fn test_resolve_json_windows_uses_cmake() {
    let tmp = temp_dir();

    let output = recipe(&tmp)
        .args(["resolve", "--json"])
        .args(WINDOWS_MSVC)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["backend"], "cmake");
    assert_eq!(json["version"], "0.8.0");

    let arguments: Vec<&str> = json["arguments"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a.as_str())
        .collect();
    assert!(arguments.contains(&"-DBUILD_SHARED_LIBS=OFF"));
    assert!(arguments.contains(&"-DBUILD_TESTING=OFF"));
    assert!(arguments.contains(&"-DWITH_OPENSSL=OFF"));

    let order: Vec<&str> = json["link_order"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a.as_str())
        .collect();
    assert!(!order.contains(&"kj-tls"));
    assert_eq!(order.last(), Some(&"kj"));
}

#[test]
fn test_build_type_flag() {
    let tmp = temp_dir();

    let release = recipe(&tmp)
        .args(["resolve", "--json"])
        .args(WINDOWS_MSVC)
        .output()
        .unwrap();
    let debug = recipe(&tmp)
        .args(["resolve", "--json", "--build-type", "debug"])
        .args(WINDOWS_MSVC)
        .output()
        .unwrap();
    assert!(release.status.success());
    assert!(debug.status.success());

    let release: serde_json::Value = serde_json::from_slice(&release.stdout).unwrap();
    let debug: serde_json::Value = serde_json::from_slice(&debug.stdout).unwrap();
    assert_eq!(release["build_type"], "Release");
    assert_eq!(debug["build_type"], "Debug");
    assert_ne!(release["package_id"], debug["package_id"]);
}

#[test]
fn test_unknown_build_type_rejected() {
    let tmp = temp_dir();

    recipe(&tmp)
        .arg("resolve")
        .args(LINUX_GCC)
        .args(["--build-type", "Profile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid build type 'Profile'"));
}

#[test]
fn test_old_gcc_rejected() {
    let tmp = temp_dir();

    recipe(&tmp)
        .args(["resolve", "--os", "linux", "--arch", "x86_64"])
        .args(["--compiler", "gcc", "--compiler-version", "4.8"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Cap'n Proto doesn't support gcc 4.8",
        ))
        .stderr(predicate::str::contains("minimum supported gcc version is 5"));
}

#[test]
fn test_msvc_shared_rejected() {
    let tmp = temp_dir();

    recipe(&tmp)
        .arg("resolve")
        .args(WINDOWS_MSVC)
        .args(["-o", "shared=true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("option `shared` cannot be used"))
        .stderr(predicate::str::contains("shared libraries for Visual Studio"));
}

#[test]
fn test_old_cppstd_rejected() {
    let tmp = temp_dir();

    recipe(&tmp)
        .arg("resolve")
        .args(LINUX_GCC)
        .args(["--cppstd", "11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too old for Cap'n Proto"));
}

#[test]
fn test_unknown_option_rejected() {
    let tmp = temp_dir();

    recipe(&tmp)
        .arg("resolve")
        .args(LINUX_GCC)
        .args(["-o", "with-python=true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown option 'with-python'"));
}

// ============================================================================
// capnp-recipe linkplan
// ============================================================================

#[test]
fn test_linkplan_full_order() {
    let tmp = temp_dir();

    let output = recipe(&tmp)
        .args(["linkplan", "--quiet"])
        .args(LINUX_GCC)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let libs: Vec<&str> = stdout.lines().collect();
    let pos = |name: &str| libs.iter().position(|l| *l == name).unwrap();

    assert!(pos("capnp-rpc") < pos("capnp"));
    assert!(pos("capnp") < pos("kj"));
    assert!(pos("kj-async") < pos("kj"));
    assert!(pos("kj") < pos("pthread"));
}

#[test]
fn test_linkplan_lite_mode() {
    let tmp = temp_dir();

    recipe(&tmp)
        .arg("linkplan")
        .args(LINUX_GCC)
        .args(["-o", "lite-mode=true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. capnp"))
        .stdout(predicate::str::contains("2. kj"))
        .stdout(predicate::str::contains("capnp-rpc").not());
}

// ============================================================================
// capnp-recipe info
// ============================================================================

#[test]
fn test_info_json() {
    let tmp = temp_dir();

    let output = recipe(&tmp)
        .arg("info")
        .args(LINUX_GCC)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "capnproto");
    assert_eq!(json["names"]["cmake_find_package"], "CapnProto");
    assert_eq!(json["components"].as_array().unwrap().len(), 9);

    let requires: Vec<&str> = json["requires"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r.as_str())
        .collect();
    assert_eq!(requires, vec!["openssl/1.1.1h", "zlib/1.2.11"]);
}

#[test]
fn test_info_writes_file() {
    let tmp = temp_dir();
    let out = tmp.path().join("out/capnproto.json");

    recipe(&tmp)
        .arg("info")
        .args(LINUX_GCC)
        .args(["-o", "with-tls=false", "--output"])
        .arg(&out)
        .assert()
        .success();

    let contents = fs::read_to_string(&out).unwrap();
    assert!(!contents.contains("openssl"));
    assert!(contents.contains("zlib/1.2.11"));
}

// ============================================================================
// Configuration files
// ============================================================================

#[test]
fn test_project_config_supplies_platform() {
    let tmp = temp_dir();
    let config_dir = tmp.path().join("project/.capnp-recipe");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        r#"
[platform]
os = "linux"
arch = "x86_64"
compiler = "clang"
compiler_version = "14"

[options]
lite-mode = true
"#,
    )
    .unwrap();

    recipe(&tmp)
        .current_dir(tmp.path().join("project"))
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("clang 14"))
        .stdout(predicate::str::contains("--disable-reflection"));
}

#[test]
fn test_cli_overrides_config_options() {
    let tmp = temp_dir();
    let config = tmp.path().join("recipe.toml");
    fs::write(&config, "[options]\nwith-compression = false\n").unwrap();

    recipe(&tmp)
        .arg("resolve")
        .args(LINUX_GCC)
        .arg("--config")
        .arg(&config)
        .args(["-o", "with-compression=true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--with-zlib"));
}

#[test]
fn test_malformed_project_config_stops_run() {
    let tmp = temp_dir();
    let config_dir = tmp.path().join(".capnp-recipe");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[options]\nshared = true\nwith_ssl = true\n",
    )
    .unwrap();

    recipe(&tmp)
        .arg("resolve")
        .args(LINUX_GCC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"))
        .stdout(predicate::str::contains("--enable-static").not());
}

#[test]
fn test_missing_config_file_is_error() {
    let tmp = temp_dir();

    recipe(&tmp)
        .arg("resolve")
        .args(LINUX_GCC)
        .args(["--config", "does-not-exist.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

// ============================================================================
// capnp-recipe build / test
// ============================================================================

#[test]
fn test_build_without_sources_fails() {
    let tmp = temp_dir();

    recipe(&tmp)
        .arg("build")
        .args(LINUX_GCC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("source tree not found"));
}
