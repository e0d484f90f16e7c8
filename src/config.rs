// ABOUTME: Configuration and constants for the Paren interpreter CLI

pub const VERSION: &str = "0.1.0";
pub const WELCOME_MESSAGE: &str = "Paren";
pub const WELCOME_SUBTITLE: &str = "A small Lisp-family interpreter";
pub const WELCOME_FOOTER: &str = "Type an expression, or Ctrl-D to exit.";

pub const DEFAULT_PRELUDE_FILENAME: &str = "library.paren";
