// ABOUTME: Macro table for storing and retrieving defmacro definitions

use crate::value::Value;
use std::collections::HashMap;

/// A recorded `defmacro`: the formal parameter names (the literal name
/// `...` among them acts as a rest-binding, §4.5) and the unevaluated body
/// form.
#[derive(Clone)]
pub struct MacroDef {
    pub params: Vec<String>,
    pub body: Value,
}

/// Process-wide mapping from macro name (by string, not interned code) to
/// its definition. Lifetime matches the process; there is no removal
/// operation.
#[derive(Default)]
pub struct MacroTable {
    macros: HashMap<String, MacroDef>,
}

impl MacroTable {
    pub fn new() -> Self {
        MacroTable::default()
    }

    pub fn define(&mut self, name: String, params: Vec<String>, body: Value) {
        self.macros.insert(name, MacroDef { params, body });
    }

    pub fn get(&self, name: &str) -> Option<MacroDef> {
        self.macros.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let mut table = MacroTable::new();
        table.define(
            "unless".to_string(),
            vec!["c".to_string(), "body".to_string()],
            Value::symbol("body", 0),
        );

        let def = table.get("unless").unwrap();
        assert_eq!(def.params, vec!["c", "body"]);
    }

    #[test]
    fn test_get_undefined_is_none() {
        let table = MacroTable::new();
        assert!(table.get("nope").is_none());
    }

    #[test]
    fn test_contains() {
        let mut table = MacroTable::new();
        assert!(!table.contains("m"));
        table.define("m".to_string(), vec![], Value::nil());
        assert!(table.contains("m"));
    }
}
