// ABOUTME: Process-wide kernel handle backing the embedding ABI and reflective builtins

use crate::env::Environment;
use crate::macros::MacroTable;
use crate::symtab::SymbolTable;
use crate::value::Value;
use std::sync::{Arc, Mutex, OnceLock};

/// Bundles the process-wide mutable state a running program needs reachable
/// from anywhere: the global environment, the symbol table, and the macro
/// table. Held in a `static` rather than a `thread_local!`: `thread` spawns
/// real OS threads (§5) that must see the same kernel the spawner does, and
/// a thread-local would give each one its own.
pub struct Kernel {
    pub env: Arc<Environment>,
    pub symtab: Mutex<SymbolTable>,
    pub macros: Mutex<MacroTable>,
}

static KERNEL: OnceLock<Kernel> = OnceLock::new();

impl Kernel {
    /// Installs built-ins and specials without loading the prelude. Used by
    /// `init()` and directly by tests that want a clean kernel.
    pub fn bootstrap() -> Kernel {
        let env = Environment::new();
        let symtab = Mutex::new(SymbolTable::new());
        for (name, f) in crate::eval::specials() {
            let code = symtab.lock().unwrap().intern(name);
            env.define(code, Value::special(f));
        }
        for (name, f) in crate::builtins::builtins() {
            let code = symtab.lock().unwrap().intern(name);
            env.define(code, Value::builtin(f));
        }
        Kernel {
            env,
            symtab,
            macros: Mutex::new(MacroTable::new()),
        }
    }

    /// Interns `name` against this kernel's symbol table.
    pub fn intern(&self, name: &str) -> usize {
        self.symtab.lock().unwrap().intern(name)
    }

    /// Reads every top-level form out of `src`.
    pub fn read(&self, src: &str) -> Vec<Value> {
        let ts = crate::tokenizer::tokenize(src);
        crate::reader::read_all(&ts.tokens, &self.symtab)
    }

    /// Macro-expands `form` against this kernel's macro table.
    pub fn compile(&self, form: &Value) -> Value {
        crate::compile::compile(form, &self.macros)
    }

    /// Tokenizes, reads, compiles, and evaluates every top-level form in
    /// `src` against the global environment; returns the last result,
    /// `nil` if `src` held no forms.
    pub fn eval_str(&self, src: &str) -> Value {
        let mut result = Value::nil();
        for form in self.read(src) {
            let compiled = self.compile(&form);
            result = crate::eval::eval(&compiled, &self.env);
        }
        result
    }

    /// Slurps `path` then behaves like `eval_str`; prints to standard error
    /// and leaves the kernel otherwise unchanged if the file can't be read.
    pub fn import(&self, path: &str) {
        match std::fs::read_to_string(path) {
            Ok(src) => {
                self.eval_str(&src);
            }
            Err(e) => eprintln!("import: cannot read {path}: {e}"),
        }
    }
}

/// Installs built-ins and specials, then loads the prelude, exactly once
/// per process. Backs `paren_init`.
pub fn init() -> &'static Kernel {
    KERNEL.get_or_init(|| {
        let kernel = Kernel::bootstrap();
        crate::prelude::load(&kernel);
        kernel
    })
}

/// The process-wide kernel, once `init()` has run.
pub fn kernel() -> Option<&'static Kernel> {
    KERNEL.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_installs_arithmetic() {
        let kernel = Kernel::bootstrap();
        let result = kernel.eval_str("(+ 1 2 3)");
        assert_eq!(result.as_int(), Some(6));
    }

    #[test]
    fn test_bootstrap_installs_specials() {
        let kernel = Kernel::bootstrap();
        let result = kernel.eval_str("(if true 1 2)");
        assert_eq!(result.as_int(), Some(1));
    }

    #[test]
    fn test_eval_str_returns_last_form() {
        let kernel = Kernel::bootstrap();
        assert_eq!(kernel.eval_str("1 2 3").as_int(), Some(3));
    }

    #[test]
    fn test_eval_str_empty_is_nil() {
        let kernel = Kernel::bootstrap();
        assert!(kernel.eval_str("").is_nil());
    }
}
