//! Bundled Resources
//!
//! Lookup of native artifacts shipped with the application. A locator answers
//! one question: where is the file called `librust_ui.so` (or the platform's
//! equivalent), if it exists at all.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Environment variable with extra resource roots, in `PATH` syntax
pub const RESOURCE_PATH_ENV: &str = "UIBIND_RESOURCE_PATH";

/// Maps a resource file name to a readable location
pub trait ResourceLocator: Send + Sync {
    /// Find `file_name`, or `None` if the bundle does not contain it
    fn locate(&self, file_name: &str) -> Option<PathBuf>;

    /// Human-readable description for diagnostics
    fn describe(&self) -> String {
        "custom locator".to_string()
    }
}

impl<F> ResourceLocator for F
where
    F: Fn(&str) -> Option<PathBuf> + Send + Sync,
{
    fn locate(&self, file_name: &str) -> Option<PathBuf> {
        self(file_name)
    }
}

/// Ordered resource root directories; the first match wins
#[derive(Debug, Clone, Default)]
pub struct BundleDirs {
    roots: Vec<PathBuf>,
}

impl BundleDirs {
    /// Locator over exactly these roots
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Locator over the default roots
    pub fn from_env() -> Self {
        Self {
            roots: default_roots(),
        }
    }

    /// Add a root after the existing ones
    pub fn add_root(&mut self, root: impl AsRef<Path>) {
        self.roots.push(root.as_ref().to_path_buf());
    }

    /// Configured roots, in search order
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl ResourceLocator for BundleDirs {
    fn locate(&self, file_name: &str) -> Option<PathBuf> {
        for root in &self.roots {
            let candidate = root.join(file_name);
            if candidate.is_file() {
                debug!(path = %candidate.display(), "resource found");
                return Some(candidate);
            }
        }
        None
    }

    fn describe(&self) -> String {
        let roots: Vec<String> = self.roots.iter().map(|r| r.display().to_string()).collect();
        format!("bundle dirs [{}]", roots.join(", "))
    }
}

/// Get the default resource roots for this process
///
/// Roots from [`RESOURCE_PATH_ENV`] come first, then the executable's
/// directory and its `resources/` child, then the working directory and its
/// `resources/` child. System library paths are deliberately absent.
pub fn default_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();

    if let Some(extra) = std::env::var_os(RESOURCE_PATH_ENV) {
        roots.extend(std::env::split_paths(&extra).filter(|p| !p.as_os_str().is_empty()));
    }

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir.join("resources"));
        roots.push(exe_dir);
    }

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.join("resources"));
        roots.push(cwd);
    }

    roots
}

/// Resources compiled into the binary, extracted to disk on first lookup.
///
/// Each file lands in `<extract_dir>/<digest>/<file_name>` where `digest` is
/// a prefix of the content's SHA-256, so two different binaries with the same
/// file name never share a path.
#[derive(Debug, Clone)]
pub struct EmbeddedBundle {
    extract_dir: PathBuf,
    entries: HashMap<String, Arc<[u8]>>,
}

impl EmbeddedBundle {
    /// Empty bundle extracting under `extract_dir`
    pub fn new(extract_dir: impl Into<PathBuf>) -> Self {
        Self {
            extract_dir: extract_dir.into(),
            entries: HashMap::new(),
        }
    }

    /// Add a resource
    pub fn insert(&mut self, file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.entries.insert(file_name.into(), bytes.into());
    }

    /// Builder form of [`EmbeddedBundle::insert`]
    pub fn with(mut self, file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert(file_name, bytes);
        self
    }

    /// Path `file_name` extracts to, without extracting it
    pub fn extraction_path(&self, file_name: &str) -> Option<PathBuf> {
        let bytes = self.entries.get(file_name)?;
        Some(self.extract_dir.join(content_digest(bytes)).join(file_name))
    }

    fn extract(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let dir = self.extract_dir.join(content_digest(bytes));
        let target = dir.join(file_name);
        if target.is_file() {
            return Ok(target);
        }

        fs::create_dir_all(&dir)?;

        // Every writer gets its own scratch file; only complete files are
        // ever renamed onto `target`.
        let mut partial = NamedTempFile::new_in(&dir)?;
        partial.write_all(bytes)?;
        match partial.persist(&target) {
            Ok(_) => {
                debug!(path = %target.display(), "extracted embedded resource");
                Ok(target)
            }
            // Another extractor won the race with identical content
            Err(_) if target.is_file() => Ok(target),
            Err(err) => Err(err.error),
        }
    }
}

impl ResourceLocator for EmbeddedBundle {
    fn locate(&self, file_name: &str) -> Option<PathBuf> {
        let bytes = self.entries.get(file_name)?;
        match self.extract(file_name, bytes) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(file_name, error = %err, "failed to extract embedded resource");
                None
            }
        }
    }

    fn describe(&self) -> String {
        format!("embedded bundle ({} entries) at {}", self.entries.len(), self.extract_dir.display())
    }
}

/// Queries several locators in order
#[derive(Clone, Default)]
pub struct ChainedLocator {
    locators: Vec<Arc<dyn ResourceLocator>>,
}

impl ChainedLocator {
    /// Empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a locator
    pub fn push(mut self, locator: Arc<dyn ResourceLocator>) -> Self {
        self.locators.push(locator);
        self
    }
}

impl ResourceLocator for ChainedLocator {
    fn locate(&self, file_name: &str) -> Option<PathBuf> {
        self.locators.iter().find_map(|l| l.locate(file_name))
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.locators.iter().map(|l| l.describe()).collect();
        parts.join(" -> ")
    }
}

fn content_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..8])
}
