// ABOUTME: Loads the shipped prelude script after built-ins are installed

use crate::config::DEFAULT_PRELUDE_FILENAME;
use crate::kernel::Kernel;

/// Reads `library.paren` from the current working directory and evaluates
/// it against `kernel`'s global environment. If the file is missing, print
/// a message to standard error and continue — the kernel stays usable with
/// only built-ins (§4.8).
pub fn load(kernel: &Kernel) {
    match std::fs::read_to_string(DEFAULT_PRELUDE_FILENAME) {
        Ok(src) => {
            kernel.eval_str(&src);
        }
        Err(e) => {
            eprintln!("{DEFAULT_PRELUDE_FILENAME}: {e}, continuing with built-ins only");
        }
    }
}
