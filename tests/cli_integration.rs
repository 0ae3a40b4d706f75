//! CLI integration tests
//!
//! These tests verify the command-line interface behavior, including:
//! - Command parsing and validation
//! - Output formatting
//! - Exit codes
//!
//! Build and validation tools are stubbed with shell scripts placed on a
//! controlled PATH, so no real Xcode installation is required.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
#[cfg(unix)]
use yare::parameterized;

/// Helper to get the path to the buildsmith binary
fn buildsmith_bin() -> PathBuf {
    // In tests, the binary should be at target/debug/buildsmith
    let mut path = env::current_exe()
        .expect("Failed to get current executable path")
        .parent()
        .expect("No parent")
        .to_path_buf();

    // If we're in deps/, go up one more level
    if path.ends_with("deps") {
        path = path.parent().expect("No parent").to_path_buf();
    }

    path.join("buildsmith")
}

/// Helper to create a project directory holding an Xcode project bundle
fn create_project_dir(dir: &TempDir, name: &str) -> PathBuf {
    let root = dir.path().to_path_buf();
    fs::create_dir(root.join(format!("{name}.xcodeproj"))).expect("Failed to create bundle");
    root
}

/// Helper to install an executable shell script stub
#[cfg(unix)]
fn install_stub(dir: &Path, name: &str, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, script).expect("Failed to write stub");
    let mut permissions = fs::metadata(&path).expect("No metadata").permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&path, permissions).expect("Failed to set permissions");
}

#[cfg(unix)]
fn report_json() -> &'static str {
    r#"{"projectPath": "/repo/App", "summary": {"totalFiles": 42, "violationsCount": 3, "healthScore": 87, "automation": {"automatableFixes": 2, "averageConfidence": 0.62}}, "findings": [{"severity": "critical"}, {"severity": "low"}], "actionableInsights": [{"title": "Split reducer", "description": "Root reducer handles unrelated domains.", "actionable": true, "estimatedEffort": 45}], "aiRecommendations": [{"title": "Adopt scoped stores", "description": "Reduce observation surface.", "implementationSteps": ["Introduce a child store", "Move bindings"]}], "efficiency": {"overallScore": 0.74}}"#
}

/// Validator stub that records its arguments in the working directory
/// and prints a fixed JSON report.
#[cfg(unix)]
fn install_validator_stub(dir: &Path, exit_code: i32) {
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > validator-args.txt\nprintf '%s\\n' '{}'\nexit {}\n",
        report_json(),
        exit_code
    );
    install_stub(dir, "archsift", &script);
}

#[test]
fn test_cli_help() {
    let output = Command::new(buildsmith_bin())
        .arg("--help")
        .output()
        .expect("Failed to execute buildsmith");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("buildsmith"));
    assert!(stdout.contains("detect"));
    assert!(stdout.contains("rebuild"));
    assert!(stdout.contains("validate"));
    assert!(stdout.contains("diagnose"));
}

#[test]
fn test_cli_version() {
    let output = Command::new(buildsmith_bin())
        .arg("--version")
        .output()
        .expect("Failed to execute buildsmith");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("buildsmith"));
}

#[test]
fn test_detect_help() {
    let output = Command::new(buildsmith_bin())
        .arg("detect")
        .arg("--help")
        .output()
        .expect("Failed to execute buildsmith");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.to_lowercase().contains("workspace"));
    assert!(stdout.contains("--format"));
}

#[test]
fn test_detect_workspace_human_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::create_dir(temp_dir.path().join("App.xcworkspace")).expect("Failed to create bundle");

    let output = Command::new(buildsmith_bin())
        .arg("detect")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Xcode Workspace (App)"));
    assert!(stdout.contains("App.xcworkspace"));
}

#[test]
fn test_detect_workspace_wins_over_project() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::create_dir(temp_dir.path().join("App.xcworkspace")).expect("Failed to create bundle");
    fs::create_dir(temp_dir.path().join("App.xcodeproj")).expect("Failed to create bundle");
    fs::write(temp_dir.path().join("Package.swift"), "// swift-tools-version:5.9\n")
        .expect("Failed to write manifest");

    let output = Command::new(buildsmith_bin())
        .arg("detect")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Xcode Workspace (App)"));
}

#[test]
fn test_detect_package_manifest() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("Package.swift"), "// swift-tools-version:5.9\n")
        .expect("Failed to write manifest");

    let output = Command::new(buildsmith_bin())
        .arg("detect")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Swift Package"));
}

#[test]
fn test_detect_json_format() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::create_dir(temp_dir.path().join("App.xcworkspace")).expect("Failed to create bundle");

    let output = Command::new(buildsmith_bin())
        .arg("detect")
        .arg(temp_dir.path())
        .arg("--format")
        .arg("json")
        .output()
        .expect("Failed to execute buildsmith");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(value["kind"]["kind"], "xcode_workspace");
    assert_eq!(value["kind"]["name"], "App");
}

#[test]
fn test_detect_unknown_is_still_success() {
    // An unrecognized directory is a valid answer, not an error
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = Command::new(buildsmith_bin())
        .arg("detect")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Unknown"));
}

#[test]
fn test_detect_nonexistent_path_is_unknown() {
    let output = Command::new(buildsmith_bin())
        .arg("detect")
        .arg("/nonexistent/path/12345")
        .output()
        .expect("Failed to execute buildsmith");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Unknown"));
}

#[test]
fn test_rebuild_without_project_exits_2() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = Command::new(buildsmith_bin())
        .arg("rebuild")
        .current_dir(temp_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no Xcode workspace"));
}

#[cfg(unix)]
#[test]
fn test_rebuild_with_stubbed_build_tool() {
    let stub_dir = TempDir::new().expect("Failed to create temp dir");
    install_stub(stub_dir.path(), "xcodebuild", "#!/bin/sh\nexit 0\n");

    let project_dir = TempDir::new().expect("Failed to create temp dir");
    create_project_dir(&project_dir, "Shipyard");

    let output = Command::new(buildsmith_bin())
        .arg("rebuild")
        .current_dir(project_dir.path())
        .env("PATH", stub_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Succeeded"));
    assert!(stdout.contains("Shipyard"));
    assert!(stdout.contains("clean build"));
}

#[cfg(unix)]
#[test]
fn test_rebuild_with_relative_project_override() {
    let stub_dir = TempDir::new().expect("Failed to create temp dir");
    install_stub(
        stub_dir.path(),
        "xcodebuild",
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > xcodebuild-args.txt\nexit 0\n",
    );

    let project_dir = TempDir::new().expect("Failed to create temp dir");
    create_project_dir(&project_dir, "Shipyard");

    // A bare relative override, as typed from inside the project root
    let output = Command::new(buildsmith_bin())
        .arg("rebuild")
        .arg("--project")
        .arg("Shipyard.xcodeproj")
        .current_dir(project_dir.path())
        .env("PATH", stub_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Succeeded"));

    // The stub ran in the project root, so the build rooted correctly
    let recorded = fs::read_to_string(project_dir.path().join("xcodebuild-args.txt"))
        .expect("Stub did not record its arguments");
    let arguments: Vec<&str> = recorded.lines().collect();
    assert!(arguments.contains(&"-project"));
    assert!(arguments.contains(&"./Shipyard.xcodeproj"));
    assert!(arguments.contains(&"clean"));
    assert!(arguments.contains(&"build"));
}

#[cfg(unix)]
#[test]
fn test_monitor_build_failure_maps_to_exit_1() {
    let stub_dir = TempDir::new().expect("Failed to create temp dir");
    install_stub(
        stub_dir.path(),
        "xcodebuild",
        "#!/bin/sh\necho 'error: scheme not found' >&2\nexit 65\n",
    );

    let project_dir = TempDir::new().expect("Failed to create temp dir");
    create_project_dir(&project_dir, "Shipyard");

    let output = Command::new(buildsmith_bin())
        .arg("monitor")
        .current_dir(project_dir.path())
        .env("PATH", stub_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Failed"));
    assert!(stdout.contains("exited with code 65"));
    assert!(stdout.contains("scheme not found"));
}

#[cfg(unix)]
#[parameterized(
    build = { "build" },
    test = { "test" },
    archive = { "archive" },
)]
fn monitor_action_reaches_build_tool(action: &str) {
    let stub_dir = TempDir::new().expect("Failed to create temp dir");
    install_stub(
        stub_dir.path(),
        "xcodebuild",
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > xcodebuild-args.txt\nexit 0\n",
    );

    let project_dir = TempDir::new().expect("Failed to create temp dir");
    create_project_dir(&project_dir, "Shipyard");

    let output = Command::new(buildsmith_bin())
        .arg("monitor")
        .arg(action)
        .current_dir(project_dir.path())
        .env("PATH", stub_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert_eq!(output.status.code(), Some(0));
    let recorded = fs::read_to_string(project_dir.path().join("xcodebuild-args.txt"))
        .expect("Stub did not record its arguments");
    let arguments: Vec<&str> = recorded.lines().collect();
    assert!(arguments.contains(&action));
    // A monitored run is a single action, never a clean
    assert!(!arguments.contains(&"clean"));
}

#[test]
fn test_monitor_rejects_unknown_action() {
    let output = Command::new(buildsmith_bin())
        .arg("monitor")
        .arg("deploy")
        .output()
        .expect("Failed to execute buildsmith");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid value") || stderr.contains("possible values"));
}

#[test]
fn test_validate_missing_tool_exits_2() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let empty_path = TempDir::new().expect("Failed to create temp dir");

    let output = Command::new(buildsmith_bin())
        .arg("validate")
        .arg(temp_dir.path())
        .env("PATH", empty_path.path())
        .env("BUILDSMITH_VALIDATOR_BIN", "archsift-test-missing")
        .output()
        .expect("Failed to execute buildsmith");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"));
}

#[cfg(unix)]
#[test]
fn test_validate_aggregates_stub_report() {
    let stub_dir = TempDir::new().expect("Failed to create temp dir");
    install_validator_stub(stub_dir.path(), 0);

    let project_dir = TempDir::new().expect("Failed to create temp dir");
    let project_path = create_project_dir(&project_dir, "Shipyard");

    let output = Command::new(buildsmith_bin())
        .arg("validate")
        .arg(&project_path)
        .arg("--level")
        .arg("comprehensive")
        .arg("--deep")
        .current_dir(project_dir.path())
        .env("PATH", stub_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Health Score: 87/100"));
    assert!(stdout.contains("Split reducer (45 min)"));
    assert!(stdout.contains("1. Adopt scoped stores"));

    // The stub recorded the argument vector it was handed
    let recorded = fs::read_to_string(project_dir.path().join("validator-args.txt"))
        .expect("Stub did not record its arguments");
    let arguments: Vec<&str> = recorded.lines().collect();
    assert_eq!(
        arguments,
        vec![
            project_path.display().to_string().as_str(),
            "--level=comprehensive",
            "--format=summary",
            "--deep",
        ]
    );
}

#[cfg(unix)]
#[test]
fn test_validate_json_passthrough() {
    let stub_dir = TempDir::new().expect("Failed to create temp dir");
    install_validator_stub(stub_dir.path(), 0);

    let project_dir = TempDir::new().expect("Failed to create temp dir");
    let project_path = create_project_dir(&project_dir, "Shipyard");

    let output = Command::new(buildsmith_bin())
        .arg("validate")
        .arg(&project_path)
        .arg("--report-format")
        .arg("json")
        .current_dir(project_dir.path())
        .env("PATH", stub_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    // Tool output passes through verbatim, no human decoration
    assert!(stdout.trim_start().starts_with('{'));
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(value["summary"]["healthScore"], 87);
}

#[cfg(unix)]
#[test]
fn test_validate_failing_tool_degrades_report() {
    let stub_dir = TempDir::new().expect("Failed to create temp dir");
    install_validator_stub(stub_dir.path(), 3);

    let project_dir = TempDir::new().expect("Failed to create temp dir");
    let project_path = create_project_dir(&project_dir, "Shipyard");

    let output = Command::new(buildsmith_bin())
        .arg("validate")
        .arg(&project_path)
        .current_dir(project_dir.path())
        .env("PATH", stub_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Degraded"));
    assert!(stdout.contains("may be partial"));
    // The parsed report is still shown
    assert!(stdout.contains("Health Score: 87/100"));
}

#[cfg(unix)]
#[test]
fn test_validate_unparseable_output_falls_back_to_raw_text() {
    let stub_dir = TempDir::new().expect("Failed to create temp dir");
    install_stub(
        stub_dir.path(),
        "archsift",
        "#!/bin/sh\necho 'Checked 42 files, all good'\nexit 0\n",
    );

    let project_dir = TempDir::new().expect("Failed to create temp dir");
    let project_path = create_project_dir(&project_dir, "Shipyard");

    let output = Command::new(buildsmith_bin())
        .arg("validate")
        .arg(&project_path)
        .current_dir(project_dir.path())
        .env("PATH", stub_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    // The tool itself succeeded; only the parse fell back
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Unparsed"));
    assert!(stdout.contains("Checked 42 files, all good"));
}

#[test]
fn test_diagnose_help() {
    let output = Command::new(buildsmith_bin())
        .arg("diagnose")
        .arg("--help")
        .output()
        .expect("Failed to execute buildsmith");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PATH"));
    assert!(stdout.contains("--format"));
}

#[cfg(unix)]
#[test]
fn test_diagnose_with_available_tools() {
    let stub_dir = TempDir::new().expect("Failed to create temp dir");
    install_stub(
        stub_dir.path(),
        "xcodebuild",
        "#!/bin/sh\nif [ \"$1\" = \"-version\" ]; then echo 'Xcode 15.4'; fi\nexit 0\n",
    );
    install_stub(stub_dir.path(), "archsift", "#!/bin/sh\nexit 0\n");

    let project_dir = TempDir::new().expect("Failed to create temp dir");
    create_project_dir(&project_dir, "Shipyard");

    let output = Command::new(buildsmith_bin())
        .arg("diagnose")
        .arg(project_dir.path())
        .current_dir(project_dir.path())
        .env("PATH", stub_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Xcode Project (Shipyard)"));
    assert!(stdout.contains("xcodebuild: available (Xcode 15.4)"));
    assert!(stdout.contains("archsift: available"));
}

#[test]
fn test_diagnose_missing_tools_exits_1() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let empty_path = TempDir::new().expect("Failed to create temp dir");

    let output = Command::new(buildsmith_bin())
        .arg("diagnose")
        .arg(temp_dir.path())
        .env("PATH", empty_path.path())
        .env("BUILDSMITH_VALIDATOR_BIN", "archsift-test-missing")
        .output()
        .expect("Failed to execute buildsmith");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("missing"));
}

#[test]
fn test_global_verbose_flag() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = Command::new(buildsmith_bin())
        .arg("-v")
        .arg("detect")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert!(output.status.success());
}

#[test]
fn test_global_quiet_flag() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = Command::new(buildsmith_bin())
        .arg("-q")
        .arg("detect")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert!(output.status.success());
}

#[test]
fn test_log_level_flag() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = Command::new(buildsmith_bin())
        .arg("--log-level")
        .arg("debug")
        .arg("detect")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to execute buildsmith");

    assert!(output.status.success());
}

#[test]
fn test_invalid_timeout_env_is_ignored() {
    // Unparseable timeout values fall back to defaults instead of failing
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = Command::new(buildsmith_bin())
        .arg("detect")
        .arg(temp_dir.path())
        .env("BUILDSMITH_BUILD_TIMEOUT", "five minutes")
        .output()
        .expect("Failed to execute buildsmith");

    assert!(output.status.success());
}
