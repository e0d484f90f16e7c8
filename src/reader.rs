// ABOUTME: Builds S-expression trees out of a token sequence

use crate::symtab::SymbolTable;
use crate::value::Value;
use std::sync::Mutex;

/// Reads every top-level form out of `tokens`, interning symbols into
/// `symtab` as they're encountered. Total: never errors. A stray `)` at top
/// level, or an unterminated `(`, simply stops that form rather than
/// aborting the whole buffer (§4.2 leaves malformed input to manifest
/// downstream, not here). The atoms `true`/`false` read as `bool` literals
/// rather than symbols; every other non-numeric token is a symbol. The
/// tokenizer's empty sentinel token (emitted when a high-bit-set byte opens
/// an atom, §4.2's bail-out edge case) stops reading at that point, same as
/// running out of tokens.
pub fn read_all(tokens: &[String], symtab: &Mutex<SymbolTable>) -> Vec<Value> {
    let mut pos = 0;
    let mut forms = Vec::new();
    while pos < tokens.len() {
        if tokens[pos] == ")" {
            // Stray close at top level: skip it, keep reading.
            pos += 1;
            continue;
        }
        match read_form(tokens, &mut pos, symtab) {
            Some(form) => forms.push(form),
            None => break,
        }
    }
    forms
}

fn read_form(tokens: &[String], pos: &mut usize, symtab: &Mutex<SymbolTable>) -> Option<Value> {
    let tok = tokens.get(*pos)?;
    if tok.is_empty() {
        // High-bit-byte bail-out token: stop here, same as running out of input.
        return None;
    }
    *pos += 1;

    if tok == "(" {
        let mut items = Vec::new();
        loop {
            match tokens.get(*pos) {
                None => break,
                Some(t) if t.is_empty() => break,
                Some(t) if t == ")" => {
                    *pos += 1;
                    break;
                }
                _ => match read_form(tokens, pos, symtab) {
                    Some(item) => items.push(item),
                    None => break,
                },
            }
        }
        return Some(Value::list(items));
    }

    if let Some(stripped) = tok.strip_prefix('"') {
        return Some(Value::string(stripped.to_string()));
    }

    Some(read_atom(tok, symtab))
}

fn read_atom(tok: &str, symtab: &Mutex<SymbolTable>) -> Value {
    if tok == "true" {
        return Value::bool(true);
    }
    if tok == "false" {
        return Value::bool(false);
    }
    if looks_numeric(tok) {
        if tok.contains('.') || tok.contains('e') || tok.contains('E') {
            if let Ok(d) = tok.parse::<f64>() {
                return Value::double(d);
            }
        } else if let Ok(n) = tok.parse::<i64>() {
            return Value::int(n);
        }
    }
    let code = symtab.lock().unwrap().intern(tok);
    Value::symbol(tok, code)
}

fn looks_numeric(tok: &str) -> bool {
    let mut chars = tok.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('-') => matches!(chars.next(), Some(c) if c.is_ascii_digit()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn read(src: &str) -> Vec<Value> {
        let symtab = Mutex::new(SymbolTable::new());
        let ts = tokenize(src);
        read_all(&ts.tokens, &symtab)
    }

    #[test]
    fn test_read_int() {
        let forms = read("42");
        assert_eq!(forms[0].as_int(), Some(42));
    }

    #[test]
    fn test_read_negative_int() {
        let forms = read("-7");
        assert_eq!(forms[0].as_int(), Some(-7));
    }

    #[test]
    fn test_read_double_with_dot() {
        let forms = read("3.5");
        assert_eq!(forms[0].as_double(), Some(3.5));
    }

    #[test]
    fn test_read_double_with_exponent() {
        let forms = read("1e3");
        assert_eq!(forms[0].as_double(), Some(1000.0));
    }

    #[test]
    fn test_read_true_false_as_bool_literals() {
        let forms = read("true false");
        assert_eq!(forms[0].as_bool(), Some(true));
        assert_eq!(forms[1].as_bool(), Some(false));
    }

    #[test]
    fn test_read_symbol() {
        let forms = read("foo-bar");
        let (name, _) = forms[0].as_symbol().unwrap();
        assert_eq!(&*name, "foo-bar");
    }

    #[test]
    fn test_read_string() {
        let forms = read("\"hi\"");
        assert_eq!(forms[0].as_string(), Some("hi".to_string()));
    }

    #[test]
    fn test_read_nested_list() {
        let forms = read("(+ 1 (* 2 3))");
        assert_eq!(forms.len(), 1);
        forms[0]
            .with_list(|items| {
                assert_eq!(items.len(), 3);
                assert!(items[2].is_list());
            })
            .unwrap();
    }

    #[test]
    fn test_read_multiple_top_level_forms() {
        let forms = read("(def x 1) (set x 2) x");
        assert_eq!(forms.len(), 3);
    }

    #[test]
    fn test_same_symbol_name_shares_code() {
        let symtab = Mutex::new(SymbolTable::new());
        let ts = tokenize("foo foo");
        let forms = read_all(&ts.tokens, &symtab);
        let (_, code_a) = forms[0].as_symbol().unwrap();
        let (_, code_b) = forms[1].as_symbol().unwrap();
        assert_eq!(code_a, code_b);
    }

    #[test]
    fn test_reader_tolerates_unterminated_list() {
        let forms = read("(+ 1 2");
        assert_eq!(forms.len(), 1);
    }

    #[test]
    fn test_reader_ignores_stray_close_paren() {
        let forms = read(") 5");
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].as_int(), Some(5));
    }

    #[test]
    fn test_round_trip_parse_print_preserves_value() {
        // §8's reader/printer invariant: parse(print(v))[0] equals v
        // structurally, for values built without fn/builtin/special/thread.
        let cases = vec![
            read("42").remove(0),
            read("-7").remove(0),
            read("3.5").remove(0),
            read("true").remove(0),
            read("false").remove(0),
            read("foo-bar").remove(0),
            read("(1 2 (3 4) foo)").remove(0),
        ];
        for original in cases {
            let printed = original.to_string();
            let round_tripped = read(&printed).remove(0);
            assert!(
                original.structural_eq(&round_tripped),
                "{printed:?} did not round-trip structurally"
            );
        }
    }

    #[test]
    fn test_high_bit_byte_bails_out_at_top_level() {
        let forms = read("1 2 \u{00e9} 3");
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[0].as_int(), Some(1));
        assert_eq!(forms[1].as_int(), Some(2));
    }

    #[test]
    fn test_high_bit_byte_bails_out_inside_a_list() {
        let forms = read("(1 2 \u{00e9} 3)");
        assert_eq!(forms.len(), 1);
        forms[0]
            .with_list(|items| assert_eq!(items.len(), 2))
            .unwrap();
    }

    #[test]
    fn test_nil_and_empty_list_are_distinct_reader_results() {
        // The reader has no literal `nil` token of its own; `nil` only comes
        // from evaluation (undefined lookup, empty-body `fn`, etc). `()`
        // always reads as a genuine empty list value.
        let forms = read("()");
        assert!(forms[0].is_list());
        forms[0].with_list(|items| assert!(items.is_empty())).unwrap();
    }
}
