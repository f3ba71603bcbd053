//! rust_ui - Native UI Library
//!
//! The shared library that `uibind` maps at runtime. It exports a C ABI:
//!
//! ```text
//! void  helloWorld(void);
//! char* hello(const char* input);
//! void  rust_ui_string_free(char* s);
//! ```
//!
//! # Ownership
//!
//! Strings returned by `hello` are allocated here and must be released with
//! `rust_ui_string_free`, never with the caller's allocator.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

/// Line written by [`helloWorld`].
pub const HELLO_WORLD_LINE: &str = "Hello World from Rust!";

/// The transformation behind [`hello`].
pub fn greeting(input: &str) -> String {
    format!("Hello {}!", input)
}

/// Diagnostic entry point: writes one line to stdout.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn helloWorld() {
    println!("{}", HELLO_WORLD_LINE);
}

/// Greets `input`. Returns null if `input` is null.
///
/// # Safety
///
/// `input` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn hello(input: *const c_char) -> *mut c_char {
    if input.is_null() {
        return ptr::null_mut();
    }
    let input = CStr::from_ptr(input).to_string_lossy();
    to_c_string(&greeting(&input))
}

/// Releases a string returned by [`hello`]. Null is ignored.
///
/// # Safety
///
/// `s` must be null or a pointer previously returned by [`hello`] that has
/// not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn rust_ui_string_free(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    drop(CString::from_raw(s));
}

fn to_c_string(input: &str) -> *mut c_char {
    CString::new(input)
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}
