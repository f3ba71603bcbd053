//! Loader Registry
//!
//! Maps logical library names to their handles so that each name is loaded
//! at most once, and defines the error type shared by the ffi module.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use super::handle::{LibrarySpec, LoadedLibrary, LoaderHandle};
use super::loader::{DlopenBackend, LibraryBackend};
use super::types::ForeignType;
use crate::resources::ResourceLocator;

/// Error type for loading and calling the native library
#[derive(Debug, Clone, Error)]
pub enum LoaderError {
    /// The artifact is absent from the resource bundle
    #[error("missing resource: {file_name} (library '{name}')")]
    ResourceNotFound { name: String, file_name: String },

    /// The artifact exists but could not be mapped
    #[error("failed to load '{}': {}", .path.display(), .message)]
    Load { path: PathBuf, message: String },

    /// The artifact mapped but lacks a required export
    #[error("symbol '{}' not found in '{}': {}", .symbol, .path.display(), .message)]
    MissingSymbol {
        path: PathBuf,
        symbol: String,
        message: String,
    },

    /// A call was made before the library was loaded
    #[error("library '{0}' is not loaded")]
    Unloaded(String),

    /// The name is already registered with a different spec
    #[error("library '{name}' is already registered from a different source")]
    Conflict { name: String },

    /// No entry point with this name
    #[error("unknown entry point: {0}")]
    UnknownEntryPoint(String),

    /// Wrong number of arguments
    #[error("invalid argument count for '{name}': expected {expected}, got {got}")]
    InvalidArgCount {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Wrong argument type
    #[error("invalid argument type for '{name}': expected {expected}, got {got}")]
    InvalidArgType {
        name: String,
        expected: ForeignType,
        got: ForeignType,
    },

    /// Argument cannot be marshalled to the native side
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The native call returned something unusable
    #[error("native call '{symbol}' failed: {message}")]
    CallFailed { symbol: String, message: String },
}

impl LoaderError {
    /// Whether this error leaves the library permanently unusable
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LoaderError::ResourceNotFound { .. }
                | LoaderError::Load { .. }
                | LoaderError::MissingSymbol { .. }
                | LoaderError::Conflict { .. }
        )
    }
}

/// Registry of loader handles, keyed by logical name.
///
/// Owned by the application's composition root. Requesting a name twice
/// with the same spec returns the same handle; a different spec for a
/// registered name is rejected rather than loading a second binary.
pub struct LoaderRegistry {
    locator: Arc<dyn ResourceLocator>,
    backend: Arc<dyn LibraryBackend>,
    handles: Mutex<HashMap<String, Arc<LoaderHandle>>>,
}

impl LoaderRegistry {
    /// Registry using the platform dynamic loader
    pub fn new(locator: Arc<dyn ResourceLocator>) -> Self {
        Self::with_backend(locator, Arc::new(DlopenBackend))
    }

    /// Registry with a custom backend
    pub fn with_backend(locator: Arc<dyn ResourceLocator>, backend: Arc<dyn LibraryBackend>) -> Self {
        Self {
            locator,
            backend,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create the handle for `spec.name`
    pub fn handle(&self, spec: LibrarySpec) -> Result<Arc<LoaderHandle>, LoaderError> {
        let mut handles = self.handles.lock();

        if let Some(existing) = handles.get(&spec.name) {
            if existing.spec() != &spec {
                return Err(LoaderError::Conflict { name: spec.name });
            }
            return Ok(Arc::clone(existing));
        }

        let handle = Arc::new(LoaderHandle::with_backend(
            spec.clone(),
            Arc::clone(&self.locator),
            Arc::clone(&self.backend),
        ));
        handles.insert(spec.name, Arc::clone(&handle));
        Ok(handle)
    }

    /// Register and load in one step
    pub fn load(&self, spec: LibrarySpec) -> Result<Arc<LoadedLibrary>, LoaderError> {
        // The map lock is released before loading so other names are not blocked.
        let handle = self.handle(spec)?;
        handle.load()
    }

    /// Get a registered handle
    pub fn get(&self, name: &str) -> Option<Arc<LoaderHandle>> {
        self.handles.lock().get(name).cloned()
    }

    /// Names of registered libraries, sorted
    pub fn registered(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handles.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("registered", &self.registered())
            .finish_non_exhaustive()
    }
}
