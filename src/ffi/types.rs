//! Foreign Call Types
//!
//! The small type vocabulary shared by the loader and the native side:
//! parameter/return types, call values, entry point signatures and the
//! export names the loader binds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical name of the native UI library.
pub const DEFAULT_LIBRARY_NAME: &str = "rust_ui";

/// Logical name of the diagnostic entry point.
pub const HELLO_WORLD: &str = "helloWorld";

/// Logical name of the string transformation entry point.
pub const HELLO: &str = "hello";

/// Types that can cross the native boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignType {
    /// No value
    Void,
    /// UTF-8 string, passed as a NUL-terminated `char*`
    Str,
}

impl fmt::Display for ForeignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForeignType::Void => write!(f, "void"),
            ForeignType::Str => write!(f, "string"),
        }
    }
}

/// A value passed to or returned from a foreign call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForeignValue {
    /// No value
    Void,
    /// Owned string
    Str(String),
}

impl ForeignValue {
    /// Get the type of this value
    pub fn get_type(&self) -> ForeignType {
        match self {
            ForeignValue::Void => ForeignType::Void,
            ForeignValue::Str(_) => ForeignType::Str,
        }
    }

    /// Borrow the string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ForeignValue::Str(s) => Some(s),
            ForeignValue::Void => None,
        }
    }
}

impl From<&str> for ForeignValue {
    fn from(value: &str) -> Self {
        ForeignValue::Str(value.to_string())
    }
}

impl From<String> for ForeignValue {
    fn from(value: String) -> Self {
        ForeignValue::Str(value)
    }
}

/// Signature of a foreign entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignSignature {
    /// Logical entry point name
    pub name: String,
    /// Parameter types
    pub params: Vec<ForeignType>,
    /// Return type
    pub return_type: ForeignType,
}

impl ForeignSignature {
    /// Create a new signature
    pub fn new(name: impl Into<String>, params: Vec<ForeignType>, return_type: ForeignType) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
        }
    }

    /// Validate argument count
    pub fn validate_args(&self, arg_count: usize) -> bool {
        arg_count == self.params.len()
    }

    /// The two entry points the UI library must export
    pub fn standard() -> Vec<ForeignSignature> {
        vec![
            ForeignSignature::new(HELLO_WORLD, vec![], ForeignType::Void),
            ForeignSignature::new(HELLO, vec![ForeignType::Str], ForeignType::Str),
        ]
    }

    /// Look up one of the standard entry points by logical name
    pub fn lookup(name: &str) -> Option<ForeignSignature> {
        Self::standard().into_iter().find(|sig| sig.name == name)
    }
}

impl fmt::Display for ForeignSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.return_type, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}

/// Export names bound from the native library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolNames {
    /// `void helloWorld(void)`
    #[serde(default = "default_hello_world")]
    pub hello_world: String,

    /// `char* hello(const char*)`
    #[serde(default = "default_hello")]
    pub hello: String,

    /// `void free_string(char*)`, releases strings returned by `hello`
    #[serde(default = "default_free_string")]
    pub free_string: String,
}

fn default_hello_world() -> String {
    HELLO_WORLD.to_string()
}

fn default_hello() -> String {
    HELLO.to_string()
}

fn default_free_string() -> String {
    "rust_ui_string_free".to_string()
}

impl Default for SymbolNames {
    fn default() -> Self {
        Self {
            hello_world: default_hello_world(),
            hello: default_hello(),
            free_string: default_free_string(),
        }
    }
}

impl SymbolNames {
    /// All export names, in binding order
    pub fn all(&self) -> [&str; 3] {
        [&self.hello_world, &self.hello, &self.free_string]
    }
}
