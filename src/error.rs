// ABOUTME: Error types for the narrow set of situations Paren reports rather than silently coercing

use thiserror::Error;

/// The language itself has no visible exception construct (§7, Non-goals):
/// type mismatches coerce or yield `nil`, undefined symbols yield `nil`.
/// `EvalError` covers what's left over: debug-mode assertion aborts on
/// out-of-bounds access, and embedding-ABI misuse.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    #[error("paren_eval_string/paren_import called before paren_init")]
    NotInitialized,

    #[error("{function}: index {index} out of range for length {length}")]
    IndexOutOfRange {
        function: &'static str,
        index: i64,
        length: usize,
    },
}
