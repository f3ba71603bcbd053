//! Loader Integration Tests
//!
//! Exercises the public loading API end to end: resource lookup, mapping
//! real files with the platform loader, and the C ABI adapter against the
//! `rust_ui` native crate.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use uibind::ffi::{
    library_file_name, ForeignValue, LibrarySpec, LoadState, LoaderError, LoaderHandle,
    LoaderRegistry, NativeBindings, Platform, UiBindings, HELLO,
};
use uibind::resources::{BundleDirs, ChainedLocator, EmbeddedBundle};

/// Bindings over the native crate linked into this test binary
fn linked_bindings() -> NativeBindings {
    unsafe {
        NativeBindings::from_raw(
            rust_ui::helloWorld,
            rust_ui::hello,
            rust_ui::rust_ui_string_free,
        )
    }
}

/// Find the `rust_ui` cdylib built alongside this test, if cargo produced one
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

fn empty_bundle() -> (tempfile::TempDir, Arc<BundleDirs>) {
    let dir = tempfile::tempdir().unwrap();
    let locator = Arc::new(BundleDirs::new([dir.path()]));
    (dir, locator)
}

// === Resolution ===

#[test]
fn test_missing_artifact_is_resource_not_found() {
    let (_dir, locator) = empty_bundle();
    let handle = LoaderHandle::new(LibrarySpec::new("rust_ui"), locator);

    let err = handle.resolve().unwrap_err();
    match &err {
        LoaderError::ResourceNotFound { name, file_name } => {
            assert_eq!(name, "rust_ui");
            assert_eq!(file_name, &library_file_name("rust_ui"));
        }
        other => panic!("expected ResourceNotFound, got {:?}", other),
    }

    assert!(handle.load().is_err());
    assert_eq!(handle.state(), LoadState::Failed);
}

#[test]
fn test_resolve_finds_bundled_file() {
    let (dir, locator) = empty_bundle();
    let file_name = library_file_name("rust_ui");
    fs::write(dir.path().join(&file_name), b"").unwrap();

    let handle = LoaderHandle::new(LibrarySpec::new("rust_ui"), locator);
    let artifact = handle.resolve().unwrap();
    assert_eq!(artifact.file_name, file_name);
    assert_eq!(artifact.path, dir.path().join(&file_name));

    // Resolution alone does not load
    assert_eq!(handle.state(), LoadState::Unloaded);
}

// === Loading ===

#[test]
fn test_malformed_artifact_is_load_error() {
    let (dir, locator) = empty_bundle();
    fs::write(dir.path().join(library_file_name("rust_ui")), [0u8; 64]).unwrap();

    let registry = LoaderRegistry::new(locator);
    let err = registry.load(LibrarySpec::new("rust_ui")).unwrap_err();
    assert!(matches!(err, LoaderError::Load { .. }), "unexpected: {}", err);

    // Failed stays failed; the handle reports it rather than "unloaded"
    let handle = registry.get("rust_ui").unwrap();
    assert_eq!(handle.state(), LoadState::Failed);
    assert!(matches!(handle.hello_world(), Err(LoaderError::Load { .. })));
}

#[test]
fn test_embedded_malformed_artifact_is_load_error() {
    let extract = tempfile::tempdir().unwrap();
    let (_dir, dirs) = empty_bundle();
    let embedded = EmbeddedBundle::new(extract.path())
        .with(library_file_name("rust_ui"), b"\x7fELF but truncated".to_vec());

    let locator = ChainedLocator::new().push(dirs).push(Arc::new(embedded));
    let handle = LoaderHandle::new(LibrarySpec::new("rust_ui"), Arc::new(locator));

    let artifact = handle.resolve().unwrap();
    assert!(artifact.path.starts_with(extract.path()));
    assert!(matches!(handle.load(), Err(LoaderError::Load { .. })));
}

#[test]
fn test_call_before_load_reports_unloaded() {
    let (_dir, locator) = empty_bundle();
    let handle = LoaderHandle::new(LibrarySpec::new("rust_ui"), locator);

    assert!(matches!(handle.hello_world(), Err(LoaderError::Unloaded(_))));
    assert!(matches!(
        handle.call(HELLO, &[ForeignValue::from("x")]),
        Err(LoaderError::Unloaded(_))
    ));
}

// === C ABI adapter ===

#[test]
fn test_native_bindings_against_linked_library() {
    let bindings = linked_bindings();

    bindings.hello_world().unwrap();
    assert_eq!(bindings.hello("World").unwrap(), rust_ui::greeting("World"));
    assert_eq!(bindings.hello("").unwrap(), rust_ui::greeting(""));
}

#[test]
fn test_native_bindings_reject_interior_nul() {
    let bindings = linked_bindings();
    let err = bindings.hello("a\0b").unwrap_err();
    assert!(matches!(err, LoaderError::InvalidInput(_)));
}

#[test]
fn test_native_bindings_unicode() {
    let bindings = linked_bindings();
    assert_eq!(bindings.hello("Grüße").unwrap(), rust_ui::greeting("Grüße"));
}

// === Built artifact ===

#[test]
fn test_load_built_artifact() {
    let Some(artifact) = built_artifact() else {
        eprintln!("rust_ui cdylib not found next to the test binary; skipping");
        return;
    };

    let bundle = tempfile::tempdir().unwrap();
    let bundled = bundle.path().join(library_file_name("rust_ui"));
    fs::copy(&artifact, &bundled).unwrap();

    let registry = LoaderRegistry::new(Arc::new(BundleDirs::new([bundle.path()])));
    let library = registry.load(LibrarySpec::new("rust_ui")).unwrap();
    assert_eq!(library.path(), bundled.as_path());

    let handle = registry.get("rust_ui").unwrap();
    handle.hello_world().unwrap();
    assert_eq!(handle.hello("World").unwrap(), rust_ui::greeting("World"));

    let again = registry.load(LibrarySpec::new("rust_ui")).unwrap();
    assert!(Arc::ptr_eq(&library, &again));
}

#[test]
fn test_explicit_path_to_built_artifact() {
    let Some(artifact) = built_artifact() else {
        return;
    };

    let (_dir, locator) = empty_bundle();
    let handle = LoaderHandle::new(LibrarySpec::new("rust_ui").with_path(&artifact), locator);
    let library = handle.load().unwrap();
    assert_eq!(library.path(), Path::new(&artifact));
    assert_eq!(handle.state(), LoadState::Loaded);
}
