//! Command-line interface against throwaway applications.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const MODULES: &str = "<?php\n\nreturn [\n    'Laminas\\Router',\n    'Application',\n];\n";

/// Helper to create an application with a module list and an aggregator
fn setup_test_application() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("config")).unwrap();
    fs::write(dir.path().join("config/modules.config.php"), MODULES).unwrap();
    fs::write(
        dir.path().join("config/config.php"),
        "<?php\n$aggregator = new ConfigAggregator([\n    App\\ConfigProvider::class,\n]);\n",
    )
    .unwrap();
    dir
}

fn run(project: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_component-installer"))
        .arg("--project")
        .arg(project)
        .args(args)
        .env("NO_COLOR", "1")
        .env("CLICOLOR", "0")
        .env_remove("COMPONENT_INSTALLER_LOG")
        .env_remove("COMPONENT_INSTALLER_PROJECT")
        .output()
        .unwrap()
}

/// Output text with terminal color sequences removed.
fn plain(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}

fn modules(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("config/modules.config.php")).unwrap()
}

#[test]
fn test_inject_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_component-installer"))
        .args(["inject", "--help"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = plain(&output.stdout);
    assert!(stdout.contains("--kind"));
    assert!(stdout.contains("--dependency"));
}

#[test]
fn test_inject_component() {
    let dir = setup_test_application();
    let output = run(dir.path(), &["inject", "Laminas\\Form", "--kind", "component"]);

    assert!(output.status.success(), "{}", plain(&output.stderr));
    let stdout = plain(&output.stdout);
    assert!(stdout.contains("Injected into"));
    assert_eq!(
        modules(&dir),
        "<?php\n\nreturn [\n    'Laminas\\Router',\n    'Laminas\\Form',\n    'Application',\n];\n"
    );

    let again = run(dir.path(), &["inject", "Laminas\\Form", "--kind", "component"]);
    assert!(again.status.success());
    assert!(plain(&again.stdout).contains("Already registered"));
}

#[test]
fn test_inject_dry_run_leaves_file() {
    let dir = setup_test_application();
    let output = run(
        dir.path(),
        &["--dry-run", "--diff", "inject", "Laminas\\Form", "-k", "component"],
    );

    assert!(output.status.success());
    let stdout = plain(&output.stdout);
    assert!(stdout.contains("DRY RUN"));
    assert!(stdout.contains("+    'Laminas\\Form',"));
    assert_eq!(modules(&dir), MODULES);
}

#[test]
fn test_inject_config_provider_routes_to_aggregator() {
    let dir = setup_test_application();
    let output = run(dir.path(), &["inject", "Laminas\\Form", "-k", "config-provider"]);

    assert!(output.status.success());
    let aggregator = fs::read_to_string(dir.path().join("config/config.php")).unwrap();
    assert!(aggregator.contains("    \\Laminas\\Form\\ConfigProvider::class,\n]);"));
    assert_eq!(modules(&dir), MODULES);
}

#[test]
fn test_inject_unknown_kind_fails() {
    let dir = setup_test_application();
    let output = run(dir.path(), &["inject", "Laminas\\Form", "--kind", "plugin"]);

    assert!(!output.status.success());
    assert!(plain(&output.stderr).contains("unknown injector kind"));
}

#[test]
fn test_remove_round_trip() {
    let dir = setup_test_application();
    run(dir.path(), &["inject", "Acme\\Blog"]);
    assert!(modules(&dir).contains("'Acme\\Blog'"));

    let output = run(dir.path(), &["remove", "Acme\\Blog"]);
    assert!(output.status.success());
    assert!(plain(&output.stdout).contains("Removed from"));
    assert_eq!(modules(&dir), MODULES);

    let output = run(dir.path(), &["remove", "Acme\\Blog"]);
    assert!(output.status.success());
    assert!(plain(&output.stdout).contains("Not registered"));
}

#[test]
fn test_remove_reports_malformed_file() {
    let dir = setup_test_application();
    let broken = "<?php\nreturn [\n    $modules,\n];\n";
    fs::write(dir.path().join("config/modules.config.php"), broken).unwrap();

    let output = run(dir.path(), &["remove", "Application"]);
    assert!(!output.status.success());
    assert!(plain(&output.stderr).contains("Error"));
    assert_eq!(modules(&dir), broken);
}

#[test]
fn test_status_suggests_close_names() {
    let dir = setup_test_application();
    let output = run(dir.path(), &["status", "Laminas\\Routr"]);

    assert!(output.status.success());
    let stdout = plain(&output.stdout);
    assert!(stdout.contains("is not registered"));
    assert!(stdout.contains("Did you mean: Laminas\\Router"));
}

#[test]
fn test_install_from_manifest() {
    let dir = setup_test_application();
    let manifest = dir.path().join("blog.json");
    fs::write(
        &manifest,
        r#"{"name": "acme/blog", "extra": {"laminas": {"component": "Acme\\Blog"}}}"#,
    )
    .unwrap();

    let output = run(dir.path(), &["install", manifest.to_str().unwrap()]);
    assert!(output.status.success(), "{}", plain(&output.stderr));
    let stdout = plain(&output.stdout);
    assert!(stdout.contains("1 injected"));
    assert!(modules(&dir).contains("    'Acme\\Blog',\n    'Application',"));

    let output = run(dir.path(), &["uninstall", manifest.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(plain(&output.stdout).contains("1 removed"));
    assert_eq!(modules(&dir), MODULES);
}

#[test]
fn test_list_marks_present_targets() {
    let dir = setup_test_application();
    let output = run(dir.path(), &["list"]);

    assert!(output.status.success());
    let stdout = plain(&output.stdout);
    assert!(stdout.contains("config/modules.config.php"));
    assert!(stdout.contains("accepts: config-provider"));
}

#[test]
fn test_invalid_settings_file_fails() {
    let dir = setup_test_application();
    fs::write(
        dir.path().join("component-installer.toml"),
        "[injector]\nunknown = true\n",
    )
    .unwrap();

    let output = run(dir.path(), &["list"]);
    assert!(!output.status.success());
}
