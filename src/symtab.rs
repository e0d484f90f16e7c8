// ABOUTME: Process-wide, bidirectional symbol-to-code interning table

use std::collections::HashMap;
use std::sync::Arc;

/// Maps symbol names to dense, monotonically-assigned integer codes and
/// back. Never shrinks: once a name is interned it keeps its code for the
/// life of the table.
pub struct SymbolTable {
    names: Vec<Arc<str>>,
    codes: HashMap<Arc<str>, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            names: Vec::new(),
            codes: HashMap::new(),
        }
    }

    /// Returns the existing code for `name` if known, otherwise assigns and
    /// returns the next code.
    pub fn intern(&mut self, name: &str) -> usize {
        if let Some(code) = self.codes.get(name) {
            return *code;
        }
        let code = self.names.len();
        let arc_name: Arc<str> = Arc::from(name);
        self.names.push(arc_name.clone());
        self.codes.insert(arc_name, code);
        code
    }

    /// The interned name for a code assigned by this table.
    pub fn name_of(&self, code: usize) -> Option<Arc<str>> {
        self.names.get(code).cloned()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
