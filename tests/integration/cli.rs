//! The `kitchen` binary.

use anyhow::Result;
use assert_cmd::Command;
use kitchen_proxy::test_utils::DepsTree;
use predicates::prelude::*;
use tempfile::TempDir;

/// `kitchen` pointed at a config file that does not exist, so defaults apply.
fn kitchen(config_dir: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("kitchen")?;
    cmd.arg("--config").arg(config_dir.path().join("config.toml")).env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn test_resolve_prints_bundle() -> Result<()> {
    let tree = DepsTree::new();
    let config_dir = TempDir::new()?;

    kitchen(&config_dir)?
        .args(["resolve", "--manifest"])
        .arg(tree.manifest())
        .arg("a.B")
        .assert()
        .success()
        .stdout("// base.js\n// debug/logger.js\n// a.js\n");
    Ok(())
}

#[test]
fn test_resolve_reports_unknown_symbols_on_stderr() -> Result<()> {
    let tree = DepsTree::new();
    let config_dir = TempDir::new()?;

    kitchen(&config_dir)?
        .args(["--quiet", "resolve", "--files", "--manifest"])
        .arg(tree.manifest())
        .args(["x.Unknown", "dom"])
        .assert()
        .success()
        .stdout("base.js\ndebug/logger.js\ndom.js\n")
        .stderr(predicate::str::contains("x.Unknown is not exist."));
    Ok(())
}

#[test]
fn test_resolve_json_matches_server_body() -> Result<()> {
    let tree = DepsTree::new();
    let config_dir = TempDir::new()?;

    let output = kitchen(&config_dir)?
        .args(["--quiet", "resolve", "--json", "--manifest"])
        .arg(tree.manifest())
        .args(["widget.Widget", "x.Unknown"])
        .output()?;
    assert!(output.status.success());

    let body: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(body["code"], "// base.js\n// debug/logger.js\n// dom.js\n// widget.js\n");
    assert_eq!(body["errors"], serde_json::json!(["x.Unknown is not exist."]));
    Ok(())
}

#[test]
fn test_resolve_missing_manifest_fails() -> Result<()> {
    let config_dir = TempDir::new()?;

    kitchen(&config_dir)?
        .args(["resolve", "--manifest"])
        .arg(config_dir.path().join("nope/deps.js"))
        .arg("a.B")
        .assert()
        .failure()
        .stderr(predicate::str::contains("deps.js"));
    Ok(())
}

#[test]
fn test_config_init_then_show() -> Result<()> {
    let config_dir = TempDir::new()?;
    let path = config_dir.path().join("config.toml");

    kitchen(&config_dir)?
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));
    assert!(path.exists());

    kitchen(&config_dir)?
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    kitchen(&config_dir)?
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("change-me").not());
    Ok(())
}

#[test]
fn test_verbose_and_quiet_conflict() -> Result<()> {
    let config_dir = TempDir::new()?;

    kitchen(&config_dir)?.args(["--verbose", "--quiet", "config", "path"]).assert().failure();
    Ok(())
}
