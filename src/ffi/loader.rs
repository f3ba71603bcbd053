//! Dynamic Library Loader
//!
//! Safe wrapper around libloading for mapping the UI library, plus the
//! platform file naming rules used to find it.

use std::collections::HashMap;
use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use parking_lot::Mutex;
use tracing::debug;

use super::bindings::{NativeBindings, UiBindings};
use super::registry::LoaderError;
use super::types::SymbolNames;

/// Shared-library naming convention of an operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux and other ELF systems: `lib{name}.so`
    Unix,
    /// macOS: `lib{name}.dylib`
    MacOs,
    /// Windows: `{name}.dll`
    Windows,
    /// Unknown targets keep the name as-is
    Other,
}

impl Platform {
    /// The platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "macos") || cfg!(target_os = "ios") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(unix) {
            Platform::Unix
        } else {
            Platform::Other
        }
    }

    /// File name prefix
    pub fn prefix(self) -> &'static str {
        match self {
            Platform::Unix | Platform::MacOs => "lib",
            Platform::Windows | Platform::Other => "",
        }
    }

    /// File name suffix, including the dot
    pub fn suffix(self) -> &'static str {
        match self {
            Platform::Unix => ".so",
            Platform::MacOs => ".dylib",
            Platform::Windows => ".dll",
            Platform::Other => "",
        }
    }

    /// Construct the library file name for a logical name
    pub fn library_file_name(self, name: &str) -> String {
        format!("{}{}{}", self.prefix(), name, self.suffix())
    }
}

/// Platform-specific file name for `name` on the current target
pub fn library_file_name(name: &str) -> String {
    Platform::current().library_file_name(name)
}

/// A dynamically loaded library
pub struct DynamicLibrary {
    /// Path to the library
    path: PathBuf,
    /// The loaded library handle
    library: Library,
    /// Cached symbol addresses
    symbols: Mutex<HashMap<String, usize>>,
}

impl DynamicLibrary {
    /// Map the library at `path` into the process
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoaderError> {
        let path = path.as_ref().to_path_buf();

        // Safety: loading a library runs its initializers. The path comes from
        // the application's own bundle, which is trusted to contain the UI library.
        let library = unsafe {
            Library::new(&path).map_err(|e| LoaderError::Load {
                path: path.clone(),
                message: e.to_string(),
            })?
        };

        debug!(path = %path.display(), "mapped native library");

        Ok(Self {
            path,
            library,
            symbols: Mutex::new(HashMap::new()),
        })
    }

    /// Get the address of an exported symbol
    pub fn symbol_address(&self, name: &str) -> Result<usize, LoaderError> {
        let mut symbols = self.symbols.lock();
        if let Some(&addr) = symbols.get(name) {
            return Ok(addr);
        }

        let c_name = CString::new(name).map_err(|_| LoaderError::MissingSymbol {
            path: self.path.clone(),
            symbol: name.to_string(),
            message: "symbol name contains a NUL byte".to_string(),
        })?;

        // Safety: only the address is read here; the type is imposed by the
        // caller when it turns the address back into a function pointer.
        let addr = unsafe {
            let symbol: libloading::Symbol<*const ()> = self
                .library
                .get(c_name.as_bytes_with_nul())
                .map_err(|e| LoaderError::MissingSymbol {
                    path: self.path.clone(),
                    symbol: name.to_string(),
                    message: e.to_string(),
                })?;
            *symbol as usize
        };

        if addr == 0 {
            return Err(LoaderError::MissingSymbol {
                path: self.path.clone(),
                symbol: name.to_string(),
                message: "symbol resolved to a null address".to_string(),
            });
        }

        symbols.insert(name.to_string(), addr);
        Ok(addr)
    }

    /// Number of symbols resolved so far
    pub fn cached_symbols(&self) -> usize {
        self.symbols.lock().len()
    }
}

impl std::fmt::Debug for DynamicLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicLibrary")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Turns a resolved artifact path into bound entry points.
///
/// The production backend maps the file with `libloading`; tests substitute
/// their own to observe how often a physical load happens.
pub trait LibraryBackend: Send + Sync {
    /// Map the artifact at `path` and bind the exports named in `symbols`
    fn open(&self, path: &Path, symbols: &SymbolNames) -> Result<Arc<dyn UiBindings>, LoaderError>;
}

/// Backend that maps artifacts with the platform dynamic loader
#[derive(Debug, Default, Clone, Copy)]
pub struct DlopenBackend;

impl LibraryBackend for DlopenBackend {
    fn open(&self, path: &Path, symbols: &SymbolNames) -> Result<Arc<dyn UiBindings>, LoaderError> {
        let library = Arc::new(DynamicLibrary::open(path)?);
        let bindings = NativeBindings::bind(library, symbols)?;
        Ok(Arc::new(bindings))
    }
}
