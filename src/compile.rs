// ABOUTME: Macro-expanding compile pass run over parsed forms before evaluation

use crate::macros::{MacroDef, MacroTable};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Mutex;

const REST_PARAM: &str = "...";

enum Binding {
    Form(Value),
    Rest(Vec<Value>),
}

/// Walks `form`, recording `defmacro`s into `macros` and expanding macro
/// calls, recursively, until none remain. `quote` forms are left untouched
/// (no descent) so literal macro-shaped data survives. See §4.5.
pub fn compile(form: &Value, macros: &Mutex<MacroTable>) -> Value {
    if !form.is_list() {
        return form.clone();
    }
    let items = form.with_list(|items| items.to_vec()).unwrap();
    if items.is_empty() {
        return form.clone();
    }

    let head = compile(&items[0], macros);

    if let Some((name, _)) = head.as_symbol() {
        if &*name == "defmacro" {
            define_macro(&items, macros);
            return Value::nil();
        }

        if &*name == "quote" {
            return form.clone();
        }

        let maybe_def = macros.lock().unwrap().get(&name);
        if let Some(def) = maybe_def {
            let expansion = expand(&def, &items[1..]);
            return compile(&expansion, macros);
        }
    }

    let compiled: Vec<Value> = items.iter().map(|item| compile(item, macros)).collect();
    Value::list(compiled)
}

/// `(defmacro NAME (PARAMS...) BODY)`.
fn define_macro(items: &[Value], macros: &Mutex<MacroTable>) {
    if items.len() < 4 {
        return;
    }
    let Some((name, _)) = items[1].as_symbol() else {
        return;
    };
    let params = items[2]
        .with_list(|params| {
            params
                .iter()
                .filter_map(|p| p.as_symbol().map(|(n, _)| n.to_string()))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let body = items[3].clone();
    macros.lock().unwrap().define(name.to_string(), params, body);
}

fn bind_params(params: &[String], args: &[Value]) -> HashMap<String, Binding> {
    let mut bindings = HashMap::new();
    let mut i = 0;
    for p in params {
        if p == REST_PARAM {
            bindings.insert(p.clone(), Binding::Rest(args.get(i..).unwrap_or(&[]).to_vec()));
            i = args.len();
        } else {
            let value = args.get(i).cloned().unwrap_or_else(Value::nil);
            bindings.insert(p.clone(), Binding::Form(value));
            i += 1;
        }
    }
    bindings
}

fn expand(def: &MacroDef, args: &[Value]) -> Value {
    let bindings = bind_params(&def.params, args);
    substitute(&def.body, &bindings)
}

fn substitute(form: &Value, bindings: &HashMap<String, Binding>) -> Value {
    if let Some(items) = form.with_list(|items| items.to_vec()) {
        let mut out = Vec::with_capacity(items.len());
        for item in &items {
            if let Some((name, _)) = item.as_symbol() {
                if &*name == REST_PARAM {
                    if let Some(Binding::Rest(elems)) = bindings.get(REST_PARAM) {
                        out.extend(elems.iter().cloned());
                        continue;
                    }
                }
            }
            out.push(substitute(item, bindings));
        }
        return Value::list(out);
    }

    if let Some((name, _)) = form.as_symbol() {
        if let Some(Binding::Form(value)) = bindings.get(&*name) {
            return value.clone();
        }
    }

    form.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_all;
    use crate::symtab::SymbolTable;
    use crate::tokenizer::tokenize;

    fn compile_str(src: &str) -> Vec<Value> {
        let symtab = Mutex::new(SymbolTable::new());
        let macros = Mutex::new(MacroTable::new());
        let ts = tokenize(src);
        let forms = read_all(&ts.tokens, &symtab);
        forms.iter().map(|f| compile(f, &macros)).collect()
    }

    #[test]
    fn test_non_list_is_unchanged() {
        let out = compile_str("42");
        assert_eq!(out[0].as_int(), Some(42));
    }

    #[test]
    fn test_empty_list_is_unchanged() {
        let out = compile_str("()");
        assert!(out[0].is_list());
    }

    #[test]
    fn test_defmacro_compiles_to_nil() {
        let out = compile_str("(defmacro unless (c body) (if c nil body))");
        assert!(out[0].is_nil());
    }

    #[test]
    fn test_quote_is_not_descended() {
        let out = compile_str("(quote (defmacro x (a) a))");
        out[0]
            .with_list(|items| assert_eq!(items[0].as_symbol().unwrap().0.as_ref(), "defmacro"))
            .unwrap();
    }

    #[test]
    fn test_macro_call_expands() {
        let out = compile_str(
            "(defmacro unless (c body) (if c nil body)) (unless false 42)",
        );
        // form 0: defmacro -> nil, form 1: expanded (if false nil 42)
        out[1]
            .with_list(|items| {
                assert_eq!(items[0].as_symbol().unwrap().0.as_ref(), "if");
            })
            .unwrap();
    }

    #[test]
    fn test_rest_param_splices() {
        let out = compile_str(
            "(defmacro my-list (... ) (list ...)) (my-list 1 2 3)",
        );
        out[1]
            .with_list(|items| {
                // (list 1 2 3)
                assert_eq!(items.len(), 4);
                assert_eq!(items[0].as_symbol().unwrap().0.as_ref(), "list");
                assert_eq!(items[1].as_int(), Some(1));
                assert_eq!(items[3].as_int(), Some(3));
            })
            .unwrap();
    }

    #[test]
    fn test_fixed_point_on_recompile() {
        let symtab = Mutex::new(SymbolTable::new());
        let macros = Mutex::new(MacroTable::new());
        let ts = tokenize("(defmacro sq (x) (* x x)) (sq 5)");
        let forms = read_all(&ts.tokens, &symtab);
        let once: Vec<Value> = forms.iter().map(|f| compile(f, &macros)).collect();
        let twice: Vec<Value> = once.iter().map(|f| compile(f, &macros)).collect();
        assert_eq!(once[1].to_string(), twice[1].to_string());
    }
}
