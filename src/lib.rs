//! uibind - Native UI Library Loader
//!
//! Loads the `rust_ui` shared library shipped with an application and exposes
//! its two entry points to Rust callers.
//!
//! # Features
//!
//! - **Platform naming**: `rust_ui` becomes `librust_ui.so`, `librust_ui.dylib` or `rust_ui.dll`
//! - **Bundled resources**: artifacts are found in resource directories or embedded bundles, never system paths
//! - **Load once**: concurrent first use maps the library exactly once; failures are cached and fatal
//! - **Typed surface**: callers depend on [`ffi::UiBindings`], not on `libloading`
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use uibind::ffi::{LibrarySpec, LoaderHandle, UiBindings};
//! use uibind::resources::BundleDirs;
//!
//! let handle = LoaderHandle::new(LibrarySpec::new("rust_ui"), Arc::new(BundleDirs::from_env()));
//! handle.load().expect("native UI library must be bundled");
//!
//! handle.hello_world().unwrap();
//! let greeting = handle.hello("World").unwrap();
//! println!("{}", greeting);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ Composition root│  owns LoaderRegistry / LoaderHandle
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ ResourceLocator │  file name → bundled path
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ LibraryBackend  │  libloading map + symbol binding
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   UiBindings    │  helloWorld() / hello(string)
//! └─────────────────┘
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod ffi;
pub mod logging;
pub mod resources;

// Re-export commonly used types
pub use config::{ConfigError, UiBindConfig};
pub use ffi::{
    LibrarySpec, LoadState, LoadedLibrary, LoaderError, LoaderHandle, LoaderRegistry, UiBindings,
};
pub use resources::{BundleDirs, EmbeddedBundle, ResourceLocator};
