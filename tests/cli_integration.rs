//! CLI integration tests
//!
//! These tests run the `coherence-discover` binary and check parsing,
//! model output, archive creation and exit codes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn discover_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_coherence-discover"))
}

fn run(args: &[&str]) -> Output {
    run_with_env(args, &[])
}

fn run_with_env(args: &[&str], vars: &[(&str, &str)]) -> Output {
    let mut command = Command::new(discover_bin());
    command
        .args(args)
        .env_remove("COHDISC_ARCHIVE")
        .env_remove("COHDISC_OUTPUT_FORMAT")
        .env_remove("COHDISC_HTTP_TIMEOUT")
        .env_remove("COHDISC_LOG_LEVEL")
        .env_remove("COHDISC_LOG_JSON")
        .env_remove("RUST_LOG");
    for (key, value) in vars {
        command.env(key, value);
    }
    command.output().expect("Failed to execute coherence-discover")
}

/// Writes a one-cluster snapshot whose cache configuration lives in `dir`.
fn create_snapshot(dir: &TempDir) -> PathBuf {
    let cache_config = dir.path().join("cache-config.xml");
    fs::write(&cache_config, "<cache-config/>").unwrap();

    let snapshot = format!(
        r#"CoherenceClusterSystemResource:
  instances:
    myCluster:
      attributes:
        CoherenceCacheConfigFile: {}
        ClusteringMode: unicast
      folders:
        CoherenceResource:
          kind: single
          folders:
            CoherencePersistenceParams:
              kind: single
              attributes:
                ActiveDirectory: /u01/coherence/active
"#,
        cache_config.display()
    );
    let path = dir.path().join("domain.yaml");
    fs::write(&path, snapshot).unwrap();
    path
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_cli_help() {
    let output = run(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("coherence-discover"));
    assert!(stdout.contains("discover"));
}

#[test]
fn test_cli_version() {
    let output = run(&["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_discover_help_lists_options() {
    let output = run(&["discover", "--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for option in ["--snapshot", "--archive", "--output", "--format", "--timeout"] {
        assert!(stdout.contains(option), "missing {} in help", option);
    }
}

#[test]
fn test_discover_prints_yaml_model() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);
    let archive = dir.path().join("archive.tar");

    let output = run(&[
        "-q",
        "discover",
        "--snapshot",
        path_arg(&snapshot),
        "--archive",
        path_arg(&archive),
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("resources:\n  CoherenceClusterSystemResource:\n    myCluster:\n"));
    assert!(stdout.contains("CoherenceCacheConfigFile: wlsdeploy/coherence/myCluster/cache-config.xml"));
    assert!(stdout.contains("ActiveDirectory: wlsdeploy/coherence/myCluster/active/"));
    assert!(stdout.contains("ClusteringMode: unicast"));
    assert!(archive.exists());
}

#[test]
fn test_discover_writes_json_model_file() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);
    let archive = dir.path().join("archive.tgz");
    let model = dir.path().join("model.json");

    let output = run(&[
        "discover",
        "-s",
        path_arg(&snapshot),
        "-a",
        path_arg(&archive),
        "-o",
        path_arg(&model),
        "--format",
        "json",
    ]);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Discovered 1 cluster into CoherenceClusterSystemResource"));

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&model).unwrap()).unwrap();
    assert_eq!(
        parsed["resources"]["CoherenceClusterSystemResource"]["myCluster"]
            ["CoherenceCacheConfigFile"],
        "wlsdeploy/coherence/myCluster/cache-config.xml"
    );
    assert!(archive.exists());
}

#[test]
fn test_soft_failures_keep_exit_code_zero() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("domain.yaml");
    fs::write(
        &snapshot,
        "CoherenceClusterSystemResource:\n  instances:\n    c1:\n      attributes:\n        CustomClusterConfigurationFileName: /nonexistent/cluster.xml\n",
    )
    .unwrap();
    let archive = dir.path().join("archive.tar");

    let output = run(&[
        "discover",
        "-s",
        path_arg(&snapshot),
        "-a",
        path_arg(&archive),
    ]);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("COHDISC-104"));
    assert!(stderr.contains("1 artifact(s) could not be archived"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("CustomClusterConfigurationFileName"));
}

#[test]
fn test_missing_snapshot_fails() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("archive.tar");

    let output = run(&[
        "discover",
        "-s",
        path_arg(&dir.path().join("missing.yaml")),
        "-a",
        path_arg(&archive),
    ]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_archive_is_required() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);

    let output = run(&["discover", "-s", path_arg(&snapshot)]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--archive"));
}

#[test]
fn test_invalid_timeout_fails() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);

    let output = run(&[
        "discover",
        "-s",
        path_arg(&snapshot),
        "-a",
        path_arg(&dir.path().join("archive.tar")),
        "--timeout",
        "0",
    ]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_invalid_log_level_in_environment_fails() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);
    let archive = dir.path().join("archive.tar");
    let argv = ["discover", "-s", path_arg(&snapshot), "-a", path_arg(&archive)];

    let output = run_with_env(&argv, &[("COHDISC_LOG_LEVEL", "warning")]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid log level: warning"));
    assert!(!archive.exists());
}

#[test]
fn test_log_level_flag_replaces_environment_level() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);
    let archive = dir.path().join("archive.tar");

    let output = run_with_env(
        &[
            "--log-level",
            "debug",
            "discover",
            "-s",
            path_arg(&snapshot),
            "-a",
            path_arg(&archive),
        ],
        &[("COHDISC_LOG_LEVEL", "warning")],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stderr).contains("DEBUG"));
    assert!(archive.exists());
}

#[test]
fn test_missing_subcommand_is_a_usage_error() {
    let output = run(&[]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}
