// ABOUTME: Primitive operations the evaluator exposes: arithmetic, comparison, string, list, I/O, and control/FFI

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{BuiltinFn, Value};
use std::sync::Arc;

fn coerce_int(v: &Value) -> i64 {
    v.as_int()
        .or_else(|| v.as_double().map(|d| d as i64))
        .or_else(|| v.as_bool().map(|b| b as i64))
        .unwrap_or(0)
}

fn coerce_double(v: &Value) -> f64 {
    v.as_double()
        .or_else(|| v.as_bool().map(|b| if b { 1.0 } else { 0.0 }))
        .unwrap_or(0.0)
}

/// Shared shape of `+ - * /`: zero operands yield `identity`; the first
/// operand's tag (int vs. everything else) picks int or double mode for
/// every remaining operand, folded left to right (§4.6).
fn arith(args: &[Value], identity: i64, int_op: fn(i64, i64) -> i64, dbl_op: fn(f64, f64) -> f64) -> Value {
    if args.is_empty() {
        return Value::int(identity);
    }
    if args[0].as_int().is_some() {
        let nums: Vec<i64> = args.iter().map(coerce_int).collect();
        Value::int(nums[1..].iter().fold(nums[0], |acc, &x| int_op(acc, x)))
    } else {
        let nums: Vec<f64> = args.iter().map(coerce_double).collect();
        Value::double(nums[1..].iter().fold(nums[0], |acc, &x| dbl_op(acc, x)))
    }
}

fn builtin_add(args: &[Value], _env: &Arc<Environment>) -> Value {
    arith(args, 0, |a, b| a.wrapping_add(b), |a, b| a + b)
}

fn builtin_sub(args: &[Value], _env: &Arc<Environment>) -> Value {
    arith(args, 0, |a, b| a.wrapping_sub(b), |a, b| a - b)
}

fn builtin_mul(args: &[Value], _env: &Arc<Environment>) -> Value {
    arith(args, 1, |a, b| a.wrapping_mul(b), |a, b| a * b)
}

/// Division by zero is the host numeric layer's problem, not this
/// function's (§4.6): integer division panics, float division yields
/// `inf`/`nan` per IEEE-754, same as Rust's own operators.
fn builtin_div(args: &[Value], _env: &Arc<Environment>) -> Value {
    arith(args, 1, |a, b| a / b, |a, b| a / b)
}

fn builtin_mod(args: &[Value], _env: &Arc<Environment>) -> Value {
    if args.len() < 2 {
        return Value::nil();
    }
    Value::int(coerce_int(&args[0]) % coerce_int(&args[1]))
}

fn builtin_pow(args: &[Value], _env: &Arc<Environment>) -> Value {
    if args.len() < 2 {
        return Value::nil();
    }
    Value::double(coerce_double(&args[0]).powf(coerce_double(&args[1])))
}

fn unary_double(args: &[Value], f: fn(f64) -> f64) -> Value {
    Value::double(f(args.first().map(coerce_double).unwrap_or(0.0)))
}

fn builtin_sqrt(args: &[Value], _env: &Arc<Environment>) -> Value {
    unary_double(args, f64::sqrt)
}

fn builtin_floor(args: &[Value], _env: &Arc<Environment>) -> Value {
    unary_double(args, f64::floor)
}

fn builtin_ceil(args: &[Value], _env: &Arc<Environment>) -> Value {
    unary_double(args, f64::ceil)
}

fn builtin_ln(args: &[Value], _env: &Arc<Environment>) -> Value {
    unary_double(args, f64::ln)
}

fn builtin_log10(args: &[Value], _env: &Arc<Environment>) -> Value {
    unary_double(args, f64::log10)
}

fn builtin_rand(_args: &[Value], _env: &Arc<Environment>) -> Value {
    Value::double(rand::random::<f64>())
}

/// `++`/`--` mutate the operand's cell in place, type preserved, and
/// return it — so every alias of the operand observes the change.
fn builtin_incr(args: &[Value], _env: &Arc<Environment>) -> Value {
    step(args, 1)
}

fn builtin_decr(args: &[Value], _env: &Arc<Environment>) -> Value {
    step(args, -1)
}

fn step(args: &[Value], by: i64) -> Value {
    let Some(v) = args.first() else {
        return Value::nil();
    };
    if let Some(n) = v.as_int() {
        v.replace_in_place(&Value::int(n + by));
    } else if let Some(d) = v.as_double() {
        v.replace_in_place(&Value::double(d + by as f64));
    }
    v.clone()
}

/// `<`: chained comparison across every adjacent pair, mode picked by the
/// first operand's tag.
fn builtin_lt(args: &[Value], _env: &Arc<Environment>) -> Value {
    if args.len() < 2 {
        return Value::bool(true);
    }
    let int_mode = args[0].as_int().is_some();
    for pair in args.windows(2) {
        let ok = if int_mode {
            coerce_int(&pair[0]) < coerce_int(&pair[1])
        } else {
            coerce_double(&pair[0]) < coerce_double(&pair[1])
        };
        if !ok {
            return Value::bool(false);
        }
    }
    Value::bool(true)
}

/// `==`: n-ary, short-circuits to false on the first operand that doesn't
/// match operand 0, mode picked by operand 0's tag.
fn builtin_eq(args: &[Value], _env: &Arc<Environment>) -> Value {
    if args.is_empty() {
        return Value::bool(true);
    }
    let int_mode = args[0].as_int().is_some();
    for a in &args[1..] {
        let ok = if int_mode {
            coerce_int(a) == coerce_int(&args[0])
        } else {
            coerce_double(a) == coerce_double(&args[0])
        };
        if !ok {
            return Value::bool(false);
        }
    }
    Value::bool(true)
}

/// `!` negates truthiness rather than requiring a literal `bool` slot, so
/// it composes with `nil` the same way `if`/`while` do.
fn builtin_not(args: &[Value], _env: &Arc<Environment>) -> Value {
    let v = args.first().cloned().unwrap_or_else(Value::nil);
    Value::bool(!v.is_truthy())
}

fn builtin_int(args: &[Value], _env: &Arc<Environment>) -> Value {
    Value::int(args.first().map(coerce_int).unwrap_or(0))
}

fn builtin_double(args: &[Value], _env: &Arc<Environment>) -> Value {
    Value::double(args.first().map(coerce_double).unwrap_or(0.0))
}

fn builtin_type(args: &[Value], _env: &Arc<Environment>) -> Value {
    let v = args.first().cloned().unwrap_or_else(Value::nil);
    Value::string(v.type_name())
}

/// `(string ...)`: concatenates the printed form of every operand — but
/// only when there are more than one; zero or one operand yields an empty
/// string (§4.6's literal wording).
fn builtin_string(args: &[Value], _env: &Arc<Environment>) -> Value {
    if args.len() <= 1 {
        return Value::string(String::new());
    }
    let mut out = String::new();
    for a in args {
        out.push_str(&a.to_string());
    }
    Value::string(out)
}

fn builtin_strlen(args: &[Value], _env: &Arc<Environment>) -> Value {
    let s = args.first().and_then(|v| v.as_string()).unwrap_or_default();
    Value::int(s.len() as i64)
}

/// Indexed lookup into a string's bytes. Out-of-range: debug-mode
/// assertion abort, `nil` in release (§7).
fn builtin_char_at(args: &[Value], _env: &Arc<Environment>) -> Value {
    let Some(s) = args.first().and_then(|v| v.as_string()) else {
        return Value::nil();
    };
    let idx = args.get(1).map(coerce_int).unwrap_or(0);
    let bytes = s.as_bytes();
    if idx < 0 || idx as usize >= bytes.len() {
        if cfg!(debug_assertions) {
            panic!(
                "{}",
                EvalError::IndexOutOfRange {
                    function: "char-at",
                    index: idx,
                    length: bytes.len(),
                }
            );
        }
        return Value::nil();
    }
    Value::int(bytes[idx as usize] as i64)
}

/// `chr`: codepoint → one-character string.
fn builtin_chr(args: &[Value], _env: &Arc<Environment>) -> Value {
    let n = args.first().map(coerce_int).unwrap_or(0);
    let c = u32::try_from(n)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or('\u{FFFD}');
    Value::string(c.to_string())
}

fn builtin_read_string(args: &[Value], _env: &Arc<Environment>) -> Value {
    let Some(src) = args.first().and_then(|v| v.as_string()) else {
        return Value::nil();
    };
    match crate::kernel::kernel() {
        Some(k) => k.read(&src).into_iter().next().unwrap_or_else(Value::nil),
        None => Value::nil(),
    }
}

fn builtin_list(args: &[Value], _env: &Arc<Environment>) -> Value {
    Value::list(args.to_vec())
}

fn builtin_cons(args: &[Value], _env: &Arc<Environment>) -> Value {
    let head = args.first().cloned().unwrap_or_else(Value::nil);
    let tail = args
        .get(1)
        .and_then(|v| v.with_list(|items| items.to_vec()))
        .unwrap_or_default();
    let mut out = Vec::with_capacity(tail.len() + 1);
    out.push(head);
    out.extend(tail);
    Value::list(out)
}

fn builtin_nth(args: &[Value], _env: &Arc<Environment>) -> Value {
    let Some(list) = args.first() else {
        return Value::nil();
    };
    let idx = args.get(1).map(coerce_int).unwrap_or(0);
    let items = list.with_list(|items| items.to_vec()).unwrap_or_default();
    if idx < 0 || idx as usize >= items.len() {
        if cfg!(debug_assertions) {
            panic!(
                "{}",
                EvalError::IndexOutOfRange {
                    function: "nth",
                    index: idx,
                    length: items.len(),
                }
            );
        }
        return Value::nil();
    }
    items[idx as usize].clone()
}

fn builtin_length(args: &[Value], _env: &Arc<Environment>) -> Value {
    let Some(list) = args.first() else {
        return Value::int(0);
    };
    Value::int(list.with_list(|items| items.len()).unwrap_or(0) as i64)
}

/// Destructive append; the pushed value is cloned into a fresh cell so
/// later mutation of the caller's value doesn't alias the list element.
fn builtin_push_back(args: &[Value], _env: &Arc<Environment>) -> Value {
    let Some(list) = args.first() else {
        return Value::nil();
    };
    if let Some(value) = args.get(1) {
        list.with_list_mut(|items| items.push(value.fresh_clone()));
    }
    list.clone()
}

fn builtin_pop_back(args: &[Value], _env: &Arc<Environment>) -> Value {
    let Some(list) = args.first() else {
        return Value::nil();
    };
    list.with_list_mut(|items| items.pop())
        .flatten()
        .unwrap_or_else(Value::nil)
}

fn builtin_apply(args: &[Value], env: &Arc<Environment>) -> Value {
    let Some(func) = args.first() else {
        return Value::nil();
    };
    let call_args = args
        .get(1)
        .and_then(|v| v.with_list(|items| items.to_vec()))
        .unwrap_or_default();
    crate::eval::apply(func, &call_args, env)
}

fn builtin_map(args: &[Value], env: &Arc<Environment>) -> Value {
    let Some(func) = args.first() else {
        return Value::nil();
    };
    let items = args
        .get(1)
        .and_then(|v| v.with_list(|items| items.to_vec()))
        .unwrap_or_default();
    let mapped: Vec<Value> = items
        .iter()
        .map(|item| crate::eval::apply(func, &[item.clone()], env))
        .collect();
    Value::list(mapped)
}

fn builtin_filter(args: &[Value], env: &Arc<Environment>) -> Value {
    let Some(func) = args.first() else {
        return Value::nil();
    };
    let items = args
        .get(1)
        .and_then(|v| v.with_list(|items| items.to_vec()))
        .unwrap_or_default();
    let kept: Vec<Value> = items
        .into_iter()
        .filter(|item| crate::eval::apply(func, &[item.clone()], env).is_truthy())
        .collect();
    Value::list(kept)
}

/// Left fold seeded with element 0; an empty list has no seed, so it's
/// documented here as `nil` rather than left undefined (§9 Open Questions).
fn builtin_fold(args: &[Value], env: &Arc<Environment>) -> Value {
    let Some(func) = args.first() else {
        return Value::nil();
    };
    let items = args
        .get(1)
        .and_then(|v| v.with_list(|items| items.to_vec()))
        .unwrap_or_default();
    if items.is_empty() {
        return Value::nil();
    }
    let mut acc = items[0].clone();
    for item in &items[1..] {
        acc = crate::eval::apply(func, &[acc, item.clone()], env);
    }
    acc
}

fn builtin_pr(args: &[Value], _env: &Arc<Environment>) -> Value {
    use std::io::Write;
    let parts: Vec<String> = args.iter().map(|v| v.to_string()).collect();
    print!("{}", parts.join(" "));
    let _ = std::io::stdout().flush();
    Value::nil()
}

fn builtin_prn(args: &[Value], _env: &Arc<Environment>) -> Value {
    let parts: Vec<String> = args.iter().map(|v| v.to_string()).collect();
    println!("{}", parts.join(" "));
    Value::nil()
}

fn builtin_read_line(_args: &[Value], _env: &Arc<Environment>) -> Value {
    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(0) => Value::nil(),
        Ok(_) => {
            if line.ends_with('\n') {
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
            }
            Value::string(line)
        }
        Err(_) => Value::nil(),
    }
}

fn builtin_slurp(args: &[Value], _env: &Arc<Environment>) -> Value {
    let Some(path) = args.first().and_then(|v| v.as_string()) else {
        return Value::nil();
    };
    match std::fs::read_to_string(&path) {
        Ok(s) => Value::string(s),
        Err(_) => Value::nil(),
    }
}

fn builtin_spit(args: &[Value], _env: &Arc<Environment>) -> Value {
    let (Some(path), Some(content)) = (
        args.first().and_then(|v| v.as_string()),
        args.get(1).and_then(|v| v.as_string()),
    ) else {
        return Value::int(-1);
    };
    match std::fs::write(&path, &content) {
        Ok(()) => Value::int(content.len() as i64),
        Err(_) => Value::int(-1),
    }
}

fn builtin_eval(args: &[Value], env: &Arc<Environment>) -> Value {
    let Some(form) = args.first() else {
        return Value::nil();
    };
    let compiled = match crate::kernel::kernel() {
        Some(k) => k.compile(form),
        None => form.clone(),
    };
    crate::eval::eval(&compiled, env)
}

fn builtin_exit(args: &[Value], _env: &Arc<Environment>) -> Value {
    let code = args.first().map(coerce_int).unwrap_or(0);
    std::process::exit(code as i32);
}

fn builtin_system(args: &[Value], _env: &Arc<Environment>) -> Value {
    let Some(cmd) = args.first().and_then(|v| v.as_string()) else {
        return Value::int(-1);
    };
    match std::process::Command::new("sh").arg("-c").arg(&cmd).status() {
        Ok(status) => Value::int(status.code().unwrap_or(-1) as i64),
        Err(_) => Value::int(-1),
    }
}

fn builtin_import(args: &[Value], _env: &Arc<Environment>) -> Value {
    let Some(path) = args.first().and_then(|v| v.as_string()) else {
        return Value::nil();
    };
    if let Some(k) = crate::kernel::kernel() {
        k.import(&path);
    }
    Value::nil()
}

fn builtin_join(args: &[Value], _env: &Arc<Environment>) -> Value {
    let Some(handle_cell) = args.first().and_then(|v| v.as_thread()) else {
        return Value::nil();
    };
    if let Some(handle) = handle_cell.lock().unwrap().take() {
        let _ = handle.join();
    }
    Value::nil()
}

/// The builtin bindings installed into the global environment at init.
pub fn builtins() -> Vec<(&'static str, BuiltinFn)> {
    vec![
        ("+", builtin_add as BuiltinFn),
        ("-", builtin_sub),
        ("*", builtin_mul),
        ("/", builtin_div),
        ("%", builtin_mod),
        ("^", builtin_pow),
        ("sqrt", builtin_sqrt),
        ("floor", builtin_floor),
        ("ceil", builtin_ceil),
        ("ln", builtin_ln),
        ("log10", builtin_log10),
        ("rand", builtin_rand),
        ("++", builtin_incr),
        ("--", builtin_decr),
        ("<", builtin_lt),
        ("==", builtin_eq),
        ("!", builtin_not),
        ("int", builtin_int),
        ("double", builtin_double),
        ("type", builtin_type),
        ("string", builtin_string),
        ("strlen", builtin_strlen),
        ("char-at", builtin_char_at),
        ("chr", builtin_chr),
        ("read-string", builtin_read_string),
        ("list", builtin_list),
        ("cons", builtin_cons),
        ("nth", builtin_nth),
        ("length", builtin_length),
        ("push-back!", builtin_push_back),
        ("pop-back!", builtin_pop_back),
        ("apply", builtin_apply),
        ("map", builtin_map),
        ("filter", builtin_filter),
        ("fold", builtin_fold),
        ("pr", builtin_pr),
        ("prn", builtin_prn),
        ("read-line", builtin_read_line),
        ("slurp", builtin_slurp),
        ("spit", builtin_spit),
        ("eval", builtin_eval),
        ("system", builtin_system),
        ("import", builtin_import),
        ("join", builtin_join),
    ]
}
