//! uibind Configuration
//!
//! Handles parsing and management of uibind.toml configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::ffi::{LibrarySpec, SymbolNames, DEFAULT_LIBRARY_NAME};
use crate::resources::{default_roots, BundleDirs, ResourceLocator};

/// Name of the configuration file searched for.
pub const CONFIG_FILE_NAME: &str = "uibind.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching uibind.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiBindConfig {
    /// Which library to load
    #[serde(default)]
    pub library: LibraryConfig,

    /// Where bundled resources live
    #[serde(default)]
    pub resources: ResourcesConfig,

    /// Log filter defaults
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory of the file this was loaded from; relative paths resolve against it
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl UiBindConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: UiBindConfig = toml::from_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                return Ok(Self::default());
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve a configured path against the config file's directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// What to load, as configured.
    pub fn library_spec(&self) -> LibrarySpec {
        let mut spec = LibrarySpec::new(self.library.name.clone())
            .with_symbols(self.library.symbols.clone());
        if let Some(path) = &self.library.path {
            spec = spec.with_path(self.resolve_path(path));
        }
        spec
    }

    /// Resource roots in search order: configured roots, then defaults.
    pub fn resource_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .resources
            .roots
            .iter()
            .map(|root| self.resolve_path(root))
            .collect();
        if self.resources.include_defaults {
            roots.extend(default_roots());
        }
        roots
    }

    /// Build the resource locator for this configuration.
    pub fn locator(&self) -> Arc<dyn ResourceLocator> {
        Arc::new(BundleDirs::new(self.resource_roots()))
    }
}

/// Library selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Logical library name
    #[serde(default = "default_library_name")]
    pub name: String,

    /// Explicit artifact path, bypassing resource lookup
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Export names
    #[serde(default)]
    pub symbols: SymbolNames,
}

fn default_library_name() -> String {
    DEFAULT_LIBRARY_NAME.to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            name: default_library_name(),
            path: None,
            symbols: SymbolNames::default(),
        }
    }
}

/// Resource lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// Extra resource roots, searched first
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Also search the default roots
    #[serde(default = "default_true")]
    pub include_defaults: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            include_defaults: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing-subscriber filter directive
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UiBindConfig::default();
        assert_eq!(config.library.name, "rust_ui");
        assert!(config.library.path.is_none());
        assert_eq!(config.library.symbols.hello_world, "helloWorld");
        assert!(config.resources.include_defaults);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
[library]
name = "ui_core"

[library.symbols]
hello = "ui_hello"

[resources]
roots = ["/opt/app/native"]
include_defaults = false

[logging]
filter = "uibind=debug"
"#;
        let config: UiBindConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.library.name, "ui_core");
        assert_eq!(config.library.symbols.hello, "ui_hello");
        assert_eq!(config.library.symbols.hello_world, "helloWorld");
        assert_eq!(config.resource_roots(), vec![PathBuf::from("/opt/app/native")]);
        assert_eq!(config.logging.filter, "uibind=debug");
    }

    #[test]
    fn test_library_spec_from_config() {
        let mut config = UiBindConfig::default();
        config.library.path = Some(PathBuf::from("native/librust_ui.so"));
        config.base_dir = Some(PathBuf::from("/srv/app"));

        let spec = config.library_spec();
        assert_eq!(spec.name, "rust_ui");
        assert_eq!(spec.path, Some(PathBuf::from("/srv/app/native/librust_ui.so")));
    }

    #[test]
    fn test_find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[resources]\nroots = [\"bundle\"]\ninclude_defaults = false\n",
        )
        .unwrap();

        let config = UiBindConfig::find_and_load(&nested).unwrap();
        assert_eq!(config.resource_roots(), vec![dir.path().join("bundle")]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = UiBindConfig::default();
        config.library.name = "saved_ui".to_string();
        config.save(&path).unwrap();

        let loaded = UiBindConfig::load(&path).unwrap();
        assert_eq!(loaded.library.name, "saved_ui");
        assert_eq!(loaded.base_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = UiBindConfig::load(Path::new("/nonexistent/uibind.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
