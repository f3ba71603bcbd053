//! CLI Integration Tests for uibind
//!
//! Runs the `uibind` binary against scratch resource directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use uibind::ffi::{library_file_name, Platform};

/// Run `uibind` with only the given resource directory on the search path
fn uibind(resource_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_uibind"))
        .current_dir(resource_dir)
        .env_remove("UIBIND_RESOURCE_PATH")
        .env_remove("UIBIND_LOG")
        .arg("--no-default-roots")
        .arg("--resource-dir")
        .arg(resource_dir)
        .args(args)
        .output()
        .expect("Failed to run uibind")
}

/// The `rust_ui` cdylib cargo built next to this test, if any
fn built_artifact() -> Option<PathBuf> {
    let platform = Platform::current();
    let prefix = format!("{}rust_ui", platform.prefix());
    let exe = std::env::current_exe().ok()?;
    let deps = exe.parent()?;

    [deps, deps.parent()?].iter().find_map(|dir| {
        fs::read_dir(dir).ok()?.flatten().map(|e| e.path()).find(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(&prefix) && n.ends_with(platform.suffix()))
                .unwrap_or(false)
        })
    })
}

#[test]
fn test_signatures() {
    let dir = tempfile::tempdir().unwrap();
    let output = uibind(dir.path(), &["signatures"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("void helloWorld()"));
    assert!(stdout.contains("string hello(string)"));
}

#[test]
fn test_resolve_missing_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = uibind(dir.path(), &["resolve"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("missing resource"),
        "unexpected stderr: {}",
        stderr
    );
    assert!(stderr.contains(&library_file_name("rust_ui")));
}

#[test]
fn test_resolve_present() {
    let dir = tempfile::tempdir().unwrap();
    let file_name = library_file_name("rust_ui");
    fs::write(dir.path().join(&file_name), b"").unwrap();

    let output = uibind(dir.path(), &["resolve"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some(file_name.as_str()));
    assert!(lines.next().unwrap().ends_with(&file_name));
}

#[test]
fn test_hello_world_aborts_without_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let output = uibind(dir.path(), &["hello-world"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to initialize native library 'rust_ui'"));
}

#[test]
fn test_load_malformed_artifact() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(library_file_name("rust_ui")), b"garbage").unwrap();

    let output = uibind(dir.path(), &["load"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load"), "unexpected stderr: {}", stderr);
}

#[test]
fn test_info_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = uibind(dir.path(), &["info", "--json"]);
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["name"], "rust_ui");
    assert_eq!(info["file_name"], library_file_name("rust_ui"));
    assert_eq!(info["symbols"]["hello"], "hello");
    assert!(info["resolved_path"].is_null());
    assert!(info["error"].as_str().unwrap().contains("missing resource"));
}

#[test]
fn test_config_overrides_library_name() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("uibind.toml"),
        "[library]\nname = \"ui_core\"\n",
    )
    .unwrap();
    fs::write(dir.path().join(library_file_name("ui_core")), b"").unwrap();

    let output = uibind(dir.path(), &["resolve"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with(&library_file_name("ui_core")));
}

#[test]
fn test_hello_through_built_artifact() {
    let Some(artifact) = built_artifact() else {
        eprintln!("rust_ui cdylib not found next to the test binary, skipping");
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let library_path = artifact.to_str().unwrap();

    let output = uibind(dir.path(), &["--library-path", library_path, "hello", "World"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Hello World!\n");
}

#[test]
fn test_hello_world_through_built_artifact() {
    let Some(artifact) = built_artifact() else {
        eprintln!("rust_ui cdylib not found next to the test binary, skipping");
        return;
    };
    let dir = tempfile::tempdir().unwrap();

    let output = uibind(
        dir.path(),
        &["--library-path", artifact.to_str().unwrap(), "hello-world"],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Hello World from Rust!"));
}

#[test]
fn test_load_bundled_artifact() {
    let Some(artifact) = built_artifact() else {
        eprintln!("rust_ui cdylib not found next to the test binary, skipping");
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    fs::copy(&artifact, dir.path().join(library_file_name("rust_ui"))).unwrap();

    let output = uibind(dir.path(), &["load"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Loaded rust_ui from"));
}
