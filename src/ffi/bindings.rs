//! UI Bindings
//!
//! The callable surface of the native UI library and its C ABI adapter.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::Arc;

use super::loader::DynamicLibrary;
use super::registry::LoaderError;
use super::types::{ForeignSignature, ForeignValue, SymbolNames, HELLO, HELLO_WORLD};

/// `void helloWorld(void)`
pub type HelloWorldFn = unsafe extern "C" fn();
/// `char* hello(const char*)`
pub type HelloFn = unsafe extern "C" fn(*const c_char) -> *mut c_char;
/// `void free_string(char*)`
pub type FreeStringFn = unsafe extern "C" fn(*mut c_char);

/// Entry points exported by the UI library.
///
/// What the calls do is defined by the native side. Both block the calling
/// thread until the native function returns.
pub trait UiBindings: Send + Sync {
    /// Diagnostic call with no arguments and no result
    fn hello_world(&self) -> Result<(), LoaderError>;

    /// String transformation owned by the native library
    fn hello(&self, input: &str) -> Result<String, LoaderError>;
}

/// C ABI adapter over resolved function pointers
pub struct NativeBindings {
    /// Keeps the mapping alive for as long as the pointers are reachable
    _library: Option<Arc<DynamicLibrary>>,
    symbols: SymbolNames,
    hello_world: HelloWorldFn,
    hello: HelloFn,
    free_string: FreeStringFn,
}

impl NativeBindings {
    /// Resolve every export named in `symbols` from a mapped library
    pub fn bind(library: Arc<DynamicLibrary>, symbols: &SymbolNames) -> Result<Self, LoaderError> {
        let hello_world = library.symbol_address(&symbols.hello_world)?;
        let hello = library.symbol_address(&symbols.hello)?;
        let free_string = library.symbol_address(&symbols.free_string)?;

        // Safety: the addresses are non-null exports of the UI library, whose
        // ABI contract fixes these three signatures.
        let (hello_world, hello, free_string) = unsafe {
            (
                std::mem::transmute::<usize, HelloWorldFn>(hello_world),
                std::mem::transmute::<usize, HelloFn>(hello),
                std::mem::transmute::<usize, FreeStringFn>(free_string),
            )
        };

        Ok(Self {
            _library: Some(library),
            symbols: symbols.clone(),
            hello_world,
            hello,
            free_string,
        })
    }

    /// Wrap function pointers that are linked into the process directly.
    ///
    /// # Safety
    ///
    /// `hello` must return either null or a NUL-terminated UTF-8 string that
    /// `free_string` accepts, and all three must stay valid for the lifetime
    /// of the returned value.
    pub unsafe fn from_raw(hello_world: HelloWorldFn, hello: HelloFn, free_string: FreeStringFn) -> Self {
        Self {
            _library: None,
            symbols: SymbolNames::default(),
            hello_world,
            hello,
            free_string,
        }
    }
}

impl UiBindings for NativeBindings {
    fn hello_world(&self) -> Result<(), LoaderError> {
        // Safety: bound to a `void (*)(void)` export.
        unsafe { (self.hello_world)() };
        Ok(())
    }

    fn hello(&self, input: &str) -> Result<String, LoaderError> {
        let input = CString::new(input)
            .map_err(|e| LoaderError::InvalidInput(format!("interior NUL at byte {}", e.nul_position())))?;

        // Safety: `input` outlives the call and is NUL-terminated.
        let raw = unsafe { (self.hello)(input.as_ptr()) };
        if raw.is_null() {
            return Err(LoaderError::CallFailed {
                symbol: self.symbols.hello.clone(),
                message: "returned a null string".to_string(),
            });
        }

        // Safety: non-null results are NUL-terminated strings owned by the
        // native side until handed back to `free_string`.
        let output = unsafe { CStr::from_ptr(raw) }.to_str().map(str::to_owned);
        unsafe { (self.free_string)(raw) };

        output.map_err(|e| LoaderError::CallFailed {
            symbol: self.symbols.hello.clone(),
            message: format!("returned invalid UTF-8: {}", e),
        })
    }
}

impl std::fmt::Debug for NativeBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeBindings")
            .field("symbols", &self.symbols)
            .finish_non_exhaustive()
    }
}

/// Dispatch a call by logical entry point name.
///
/// Arguments are checked against the entry point's signature before any
/// native code runs.
pub fn call_foreign(
    bindings: &dyn UiBindings,
    name: &str,
    args: &[ForeignValue],
) -> Result<ForeignValue, LoaderError> {
    let signature =
        ForeignSignature::lookup(name).ok_or_else(|| LoaderError::UnknownEntryPoint(name.to_string()))?;

    if !signature.validate_args(args.len()) {
        return Err(LoaderError::InvalidArgCount {
            name: signature.name,
            expected: signature.params.len(),
            got: args.len(),
        });
    }

    for (arg, &expected) in args.iter().zip(signature.params.iter()) {
        let got = arg.get_type();
        if got != expected {
            return Err(LoaderError::InvalidArgType {
                name: signature.name,
                expected,
                got,
            });
        }
    }

    match (signature.name.as_str(), args) {
        (HELLO_WORLD, []) => {
            bindings.hello_world()?;
            Ok(ForeignValue::Void)
        }
        (HELLO, [ForeignValue::Str(input)]) => Ok(ForeignValue::Str(bindings.hello(input)?)),
        _ => Err(LoaderError::UnknownEntryPoint(name.to_string())),
    }
}
