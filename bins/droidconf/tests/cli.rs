//! End-to-end tests for the droidconf binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../crates/android/fixtures/flutter_app.gradle.kts")
}

/// Command running in an empty directory so no settings file is picked up
fn droidconf(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("droidconf").expect("binary should build");
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

const MINIMAL: &str = r#"
android {
    namespace = "com.acme.app"
    compileSdk = 34
    defaultConfig {
        minSdk = 21
        targetSdk = 34
    }
}
"#;

#[test]
fn check_reports_warnings_for_flutter_module() {
    let dir = TempDir::new().unwrap();
    droidconf(&dir)
        .arg("check")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("valid (2 warnings)"))
        .stderr(predicate::str::contains("com.example"))
        .stderr(predicate::str::contains("debug identity"));
}

#[test]
fn check_json_output() {
    let dir = TempDir::new().unwrap();
    let output = droidconf(&dir)
        .args(["check", "--json"])
        .arg(fixture())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], true);
    assert_eq!(report["errors"].as_array().unwrap().len(), 0);
    assert_eq!(report["warnings"].as_array().unwrap().len(), 2);
}

#[test]
fn check_fails_on_sdk_order() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("app.json");
    fs::write(
        &file,
        r#"{"applicationId":"com.acme.app","sdk":{"min":30,"target":21,"compile":34}}"#,
    )
    .unwrap();

    droidconf(&dir)
        .arg("check")
        .arg(&file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("sdk.min"));
}

#[test]
fn check_fails_on_conflicting_dependencies() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("build.gradle.kts");
    fs::write(
        &file,
        format!("{MINIMAL}\ndependencies {{\n implementation(\"g:a:1.0\")\n implementation(\"g:a:2.0\")\n}}"),
    )
    .unwrap();

    droidconf(&dir)
        .args(["check", "--json"])
        .arg(&file)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("DUPLICATE_DEPENDENCY"));
}

#[test]
fn check_reports_parse_errors_with_position() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("build.gradle.kts");
    fs::write(&file, "android {\n    namespace = \n}\n").unwrap();

    droidconf(&dir)
        .arg("check")
        .arg(&file)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("line 3, column 1"));
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    droidconf(&dir)
        .args(["check", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn build_type_lookup() {
    let dir = TempDir::new().unwrap();
    droidconf(&dir)
        .args(["build-type", "--json"])
        .arg(fixture())
        .arg("release")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"minify\": true"))
        .stdout(predicate::str::contains("\"effectiveSigning\": \"debug\""));

    droidconf(&dir)
        .arg("build-type")
        .arg(fixture())
        .arg("staging")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown build type: staging"));
}

#[test]
fn export_and_render_round_trip() {
    let dir = TempDir::new().unwrap();
    let exported = dir.path().join("app.toml");

    droidconf(&dir)
        .args(["export", "--format", "toml", "--output"])
        .arg(&exported)
        .arg(fixture())
        .assert()
        .success();

    let toml = fs::read_to_string(&exported).unwrap();
    assert!(toml.contains("applicationId = \"com.example.clinic_app\""));

    let rendered = droidconf(&dir)
        .arg("render")
        .arg(&exported)
        .output()
        .unwrap();
    assert!(rendered.status.success());
    let kts = dir.path().join("build.gradle.kts");
    fs::write(&kts, &rendered.stdout).unwrap();

    let reexported = droidconf(&dir)
        .args(["export", "--format", "toml"])
        .arg(&kts)
        .output()
        .unwrap();
    assert!(reexported.status.success());
    assert_eq!(String::from_utf8(reexported.stdout).unwrap(), toml);
}

#[test]
fn export_json_to_stdout() {
    let dir = TempDir::new().unwrap();
    droidconf(&dir)
        .args(["export", "--format", "json"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"jvmTarget\": \"JAVA_17\""))
        .stdout(predicate::str::contains("\"default:proguard-android-optimize.txt\""));
}

#[test]
fn settings_override_properties() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".droidconf.toml"),
        "[properties]\n\"flutter.minSdkVersion\" = 24\n\n[rules]\nwarn_debug_signed_release = false\n",
    )
    .unwrap();

    droidconf(&dir)
        .args(["properties", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"flutter.minSdkVersion\": \"24\""));

    droidconf(&dir)
        .arg("check")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("valid (1 warning)"));
}

#[test]
fn json_log_lines() {
    let dir = TempDir::new().unwrap();
    let output = droidconf(&dir)
        .args(["--log-json", "-v", "check"])
        .arg(fixture())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    let line = stderr
        .lines()
        .find(|line| line.contains("Configuration loaded"))
        .expect("load should be logged at info");
    let event: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(event["level"], "INFO");
}

#[test]
fn explicit_missing_settings_file() {
    let dir = TempDir::new().unwrap();
    droidconf(&dir)
        .args(["--config", "missing.toml", "properties"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn scan_checks_every_module() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("app");
    let bad = dir.path().join("legacy");
    let ignored = dir.path().join("app/build/generated");
    fs::create_dir_all(&good).unwrap();
    fs::create_dir_all(&bad).unwrap();
    fs::create_dir_all(&ignored).unwrap();
    fs::write(good.join("build.gradle.kts"), MINIMAL).unwrap();
    fs::write(bad.join("build.gradle.kts"), "android { compileSdk = 34 }").unwrap();
    fs::write(ignored.join("build.gradle.kts"), "not kotlin {").unwrap();

    let output = droidconf(&dir)
        .args(["scan", "--json", "."])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["valid"], true);
    assert_eq!(reports[1]["valid"], false);
    assert_eq!(reports[1]["error"]["code"], "VALIDATION_ERROR");
}

#[test]
fn scan_empty_directory() {
    let dir = TempDir::new().unwrap();
    droidconf(&dir)
        .arg("scan")
        .assert()
        .success()
        .stdout(predicate::str::contains("No build files found"));
}
