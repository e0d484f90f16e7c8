// ABOUTME: Environment module for managing variable bindings and scopes

use crate::value::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A mapping from interned symbol code to `Value`, plus an optional outer
/// link. Lookup walks outward until the name is found or the chain ends
/// (then yields `nil`, per §4.4 — there is no "undefined symbol" error at
/// this layer).
pub struct Environment {
    bindings: Mutex<HashMap<usize, Value>>,
    parent: Option<Arc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Arc<Self> {
        Arc::new(Environment {
            bindings: Mutex::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Arc<Environment>) -> Arc<Self> {
        Arc::new(Environment {
            bindings: Mutex::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Binds `code` in THIS frame, creating or overwriting (doesn't walk the
    /// parent chain). This is the primitive `def` and argument binding build
    /// on.
    pub fn define(&self, code: usize, value: Value) {
        self.bindings.lock().unwrap().insert(code, value);
    }

    /// Looks up `code` in this frame, then outward. Returns `nil` (never an
    /// error) when the chain is exhausted.
    pub fn get(&self, code: usize) -> Value {
        if let Some(value) = self.bindings.lock().unwrap().get(&code) {
            return value.clone();
        }
        if let Some(parent) = &self.parent {
            return parent.get(code);
        }
        Value::nil()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let env = Environment::new();
        env.define(0, Value::int(42));
        assert_eq!(env.get(0).as_int(), Some(42));
    }

    #[test]
    fn test_undefined_symbol_is_nil() {
        let env = Environment::new();
        assert!(env.get(0).is_nil());
    }

    #[test]
    fn test_shadowing() {
        let parent = Environment::new();
        parent.define(0, Value::int(42));

        let child = Environment::with_parent(parent);
        child.define(0, Value::int(100));

        assert_eq!(child.get(0).as_int(), Some(100));
    }

    #[test]
    fn test_parent_lookup() {
        let parent = Environment::new();
        parent.define(0, Value::int(42));

        let child = Environment::with_parent(parent);
        assert_eq!(child.get(0).as_int(), Some(42));
    }

    #[test]
    fn test_multiple_levels() {
        let grandparent = Environment::new();
        grandparent.define(0, Value::int(1));

        let parent = Environment::with_parent(grandparent);
        parent.define(1, Value::int(2));

        let child = Environment::with_parent(parent);
        child.define(2, Value::int(3));

        assert_eq!(child.get(0).as_int(), Some(1));
        assert_eq!(child.get(1).as_int(), Some(2));
        assert_eq!(child.get(2).as_int(), Some(3));
    }
}
