//! FFI Module for uibind
//!
//! Loads the native UI library once and exposes its entry points.
//!
//! # Architecture
//!
//! ```text
//! Caller
//!       │
//!       ▼
//! LoaderHandle::load()            (once per logical name)
//!       │
//!       ▼
//! ResourceLocator                 (rust_ui → librust_ui.so → path)
//!       │
//!       ▼
//! LibraryBackend (libloading)     (map + bind helloWorld / hello)
//!       │
//!       ▼
//! UiBindings                      (blocking native calls)
//! ```
//!
//! # Example
//!
//! ```ignore
//! let locator = Arc::new(BundleDirs::from_env());
//! let handle = LoaderHandle::new(LibrarySpec::new("rust_ui"), locator);
//! handle.load()?;
//!
//! handle.hello_world()?;
//! let greeting = handle.hello("World")?;
//! ```

mod bindings;
mod handle;
mod loader;
mod registry;
mod types;

pub use bindings::{call_foreign, FreeStringFn, HelloFn, HelloWorldFn, NativeBindings, UiBindings};
pub use handle::{
    resolve_library_path, LibrarySpec, LoadState, LoadedLibrary, LoaderHandle, ResolvedArtifact,
};
pub use loader::{library_file_name, DlopenBackend, DynamicLibrary, LibraryBackend, Platform};
pub use registry::{LoaderError, LoaderRegistry};
pub use types::{
    ForeignSignature, ForeignType, ForeignValue, SymbolNames, DEFAULT_LIBRARY_NAME, HELLO,
    HELLO_WORLD,
};
