// ABOUTME: C-linkage embedding ABI: paren_init, paren_eval_string, paren_import

use std::ffi::CStr;
use std::os::raw::c_char;

/// Install built-in bindings and load the prelude. Must be called exactly
/// once before any other entry point (§6).
#[no_mangle]
pub extern "C" fn paren_init() {
    crate::kernel::init();
}

/// Tokenize, read, compile, evaluate, and discard the result of `src`.
/// Safety: `src` must be a valid, null-terminated, UTF-8 byte string; the
/// caller retains ownership of it.
#[no_mangle]
pub unsafe extern "C" fn paren_eval_string(src: *const c_char) {
    let Some(kernel) = crate::kernel::kernel() else {
        eprintln!("{}", crate::error::EvalError::NotInitialized);
        return;
    };
    let Ok(src) = CStr::from_ptr(src).to_str() else {
        return;
    };
    kernel.eval_str(src);
}

/// Slurp `path` and behave like `paren_eval_string`; prints to standard
/// error if the file cannot be read.
/// Safety: `path` must be a valid, null-terminated, UTF-8 byte string.
#[no_mangle]
pub unsafe extern "C" fn paren_import(path: *const c_char) {
    let Some(kernel) = crate::kernel::kernel() else {
        eprintln!("{}", crate::error::EvalError::NotInitialized);
        return;
    };
    let Ok(path) = CStr::from_ptr(path).to_str() else {
        return;
    };
    kernel.import(path);
}
