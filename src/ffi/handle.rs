//! Loader Handle
//!
//! Owns the load-once lifecycle of one logical library:
//!
//! ```text
//! Unloaded ──resolve + load ok──▶ Loaded   (terminal)
//!     │
//!     └──────resolve or load err─▶ Failed   (terminal, error replayed)
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use super::bindings::{call_foreign, UiBindings};
use super::loader::{library_file_name, DlopenBackend, LibraryBackend};
use super::registry::LoaderError;
use super::types::{ForeignValue, SymbolNames, DEFAULT_LIBRARY_NAME};
use crate::resources::ResourceLocator;

/// What to load and which exports to bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySpec {
    /// Logical library name, e.g. `rust_ui`
    pub name: String,
    /// Explicit artifact path, bypassing resource lookup
    pub path: Option<PathBuf>,
    /// Export names to bind
    pub symbols: SymbolNames,
}

impl LibrarySpec {
    /// Spec for a logical name with default exports
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            symbols: SymbolNames::default(),
        }
    }

    /// Load from an explicit path instead of the resource bundle
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Override export names
    pub fn with_symbols(mut self, symbols: SymbolNames) -> Self {
        self.symbols = symbols;
        self
    }
}

impl Default for LibrarySpec {
    fn default() -> Self {
        Self::new(DEFAULT_LIBRARY_NAME)
    }
}

/// Where a logical name resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// Platform file name, e.g. `librust_ui.so`
    pub file_name: String,
    /// Location of that file
    pub path: PathBuf,
}

/// Load state reported by a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loaded,
    Failed,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Unloaded => write!(f, "unloaded"),
            LoadState::Loaded => write!(f, "loaded"),
            LoadState::Failed => write!(f, "failed"),
        }
    }
}

/// A successfully mapped and bound native library
pub struct LoadedLibrary {
    name: String,
    file_name: String,
    path: PathBuf,
    bindings: Arc<dyn UiBindings>,
}

impl LoadedLibrary {
    /// Logical name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Platform file name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Filesystem path the library was mapped from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bound entry points
    pub fn bindings(&self) -> &dyn UiBindings {
        self.bindings.as_ref()
    }
}

impl fmt::Debug for LoadedLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedLibrary")
            .field("name", &self.name)
            .field("file_name", &self.file_name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Resolve a logical name to a bundled artifact path
pub fn resolve_library_path(
    name: &str,
    locator: &dyn ResourceLocator,
) -> Result<ResolvedArtifact, LoaderError> {
    let file_name = library_file_name(name);
    debug!(name, file_name = %file_name, locator = %locator.describe(), "resolving native library");

    let path = locator
        .locate(&file_name)
        .ok_or_else(|| LoaderError::ResourceNotFound {
            name: name.to_string(),
            file_name: file_name.clone(),
        })?;

    Ok(ResolvedArtifact { file_name, path })
}

/// Injectable, load-once handle for one native library.
///
/// The first call to [`LoaderHandle::load`] resolves and maps the library;
/// concurrent callers block until it finishes and all observe the same
/// outcome. Failures are cached: a failed handle never retries.
pub struct LoaderHandle {
    spec: LibrarySpec,
    locator: Arc<dyn ResourceLocator>,
    backend: Arc<dyn LibraryBackend>,
    state: OnceCell<Result<Arc<LoadedLibrary>, LoaderError>>,
}

impl LoaderHandle {
    /// Handle using the platform dynamic loader
    pub fn new(spec: LibrarySpec, locator: Arc<dyn ResourceLocator>) -> Self {
        Self::with_backend(spec, locator, Arc::new(DlopenBackend))
    }

    /// Handle with a custom backend
    pub fn with_backend(
        spec: LibrarySpec,
        locator: Arc<dyn ResourceLocator>,
        backend: Arc<dyn LibraryBackend>,
    ) -> Self {
        Self {
            spec,
            locator,
            backend,
            state: OnceCell::new(),
        }
    }

    /// Logical library name
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// What this handle loads
    pub fn spec(&self) -> &LibrarySpec {
        &self.spec
    }

    /// Resolve the artifact without loading it
    pub fn resolve(&self) -> Result<ResolvedArtifact, LoaderError> {
        match &self.spec.path {
            Some(path) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| library_file_name(&self.spec.name));
                if !path.is_file() {
                    return Err(LoaderError::ResourceNotFound {
                        name: self.spec.name.clone(),
                        file_name: path.display().to_string(),
                    });
                }
                Ok(ResolvedArtifact {
                    file_name,
                    path: path.clone(),
                })
            }
            None => resolve_library_path(&self.spec.name, self.locator.as_ref()),
        }
    }

    /// Resolve and map the library, once.
    pub fn load(&self) -> Result<Arc<LoadedLibrary>, LoaderError> {
        self.state.get_or_init(|| self.load_uncached()).clone()
    }

    fn load_uncached(&self) -> Result<Arc<LoadedLibrary>, LoaderError> {
        let result = self.resolve().and_then(|artifact| {
            let bindings = self.backend.open(&artifact.path, &self.spec.symbols)?;
            Ok(Arc::new(LoadedLibrary {
                name: self.spec.name.clone(),
                file_name: artifact.file_name,
                path: artifact.path,
                bindings,
            }))
        });

        match &result {
            Ok(library) => info!(
                name = %library.name,
                path = %library.path.display(),
                "native library loaded"
            ),
            Err(err) => warn!(name = %self.spec.name, error = %err, "native library failed to load"),
        }
        result
    }

    /// Current load state
    pub fn state(&self) -> LoadState {
        match self.state.get() {
            None => LoadState::Unloaded,
            Some(Ok(_)) => LoadState::Loaded,
            Some(Err(_)) => LoadState::Failed,
        }
    }

    /// The loaded library, without triggering a load
    pub fn loaded(&self) -> Result<Arc<LoadedLibrary>, LoaderError> {
        match self.state.get() {
            None => Err(LoaderError::Unloaded(self.spec.name.clone())),
            Some(result) => result.clone(),
        }
    }

    /// Invoke an entry point by logical name
    pub fn call(&self, name: &str, args: &[ForeignValue]) -> Result<ForeignValue, LoaderError> {
        let library = self.loaded()?;
        call_foreign(library.bindings(), name, args)
    }
}

impl UiBindings for LoaderHandle {
    fn hello_world(&self) -> Result<(), LoaderError> {
        self.loaded()?.bindings().hello_world()
    }

    fn hello(&self, input: &str) -> Result<String, LoaderError> {
        self.loaded()?.bindings().hello(input)
    }
}

impl fmt::Debug for LoaderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderHandle")
            .field("spec", &self.spec)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
