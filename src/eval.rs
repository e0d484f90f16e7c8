// ABOUTME: Tree-walking evaluator: dispatch, special forms, and function application

use crate::env::Environment;
use crate::value::{Lambda, Value};
use std::sync::Arc;
use std::thread;

/// `eval(form, env)` per §4.6: symbols look up in `env`; non-list,
/// non-symbol values are self-evaluating; lists dispatch on the evaluated
/// head. `if`, `begin`, and tail calls into a user `fn` are handled in this
/// loop (rebinding `form`/`env` and looping) rather than by recursing, so
/// tail-recursive Paren programs don't grow the Rust stack.
pub fn eval(form: &Value, env: &Arc<Environment>) -> Value {
    let mut form = form.clone();
    let mut env = env.clone();
    loop {
        if let Some((_, code)) = form.as_symbol() {
            return env.get(code);
        }
        if !form.is_list() {
            return form;
        }
        let items = form.with_list(|items| items.to_vec()).unwrap();
        if items.is_empty() {
            return Value::nil();
        }

        let head = eval(&items[0], &env);
        let operands = &items[1..];

        if let Some(special) = head.as_special() {
            if fn_eq(special, special_if) {
                let cond = eval(operands.first().unwrap_or(&Value::nil()), &env);
                let branch = if cond.is_truthy() {
                    operands.get(1)
                } else {
                    operands.get(2)
                };
                match branch {
                    Some(b) => {
                        form = b.clone();
                        continue;
                    }
                    None => return Value::nil(),
                }
            }
            if fn_eq(special, special_begin) {
                if operands.is_empty() {
                    return Value::nil();
                }
                for e in &operands[..operands.len() - 1] {
                    eval(e, &env);
                }
                form = operands[operands.len() - 1].clone();
                continue;
            }
            return special(operands, &env);
        }

        if let Some(builtin) = head.as_builtin() {
            let args: Vec<Value> = operands.iter().map(|a| eval(a, &env)).collect();
            return builtin(&args, &env);
        }

        if let Some(lambda) = head.as_fn() {
            let args: Vec<Value> = operands.iter().map(|a| eval(a, &env)).collect();
            let call_env = Environment::with_parent(lambda.env.clone());
            bind_params(&lambda, &args, &call_env);
            if lambda.body.is_empty() {
                return Value::nil();
            }
            for b in &lambda.body[..lambda.body.len() - 1] {
                eval(b, &call_env);
            }
            form = lambda.body[lambda.body.len() - 1].clone();
            env = call_env;
            continue;
        }

        // Self-evaluating head of any other type: §4.6, §9 "self-evaluating heads".
        return Value::nil();
    }
}

/// `apply(func, args, env)` per §4.6, for callers (the `apply`/`map`/
/// `filter`/`fold` builtins) that already have an evaluated argument vector
/// in hand and don't need tail-call treatment.
pub fn apply(func: &Value, args: &[Value], env: &Arc<Environment>) -> Value {
    if let Some(builtin) = func.as_builtin() {
        return builtin(args, env);
    }
    if let Some(lambda) = func.as_fn() {
        let call_env = Environment::with_parent(lambda.env.clone());
        bind_params(&lambda, args, &call_env);
        let mut result = Value::nil();
        for b in &lambda.body {
            result = eval(b, &call_env);
        }
        return result;
    }
    Value::nil()
}

fn bind_params(lambda: &Lambda, args: &[Value], call_env: &Arc<Environment>) {
    for (code, value) in lambda.params.iter().zip(args.iter()) {
        call_env.define(*code, value.clone());
    }
}

fn fn_eq(a: crate::value::SpecialFn, b: crate::value::SpecialFn) -> bool {
    a as usize == b as usize
}

/// `(def SYM V)`: evaluate V, clone into a fresh cell, bind in the current frame.
fn special_def(operands: &[Value], env: &Arc<Environment>) -> Value {
    let Some(sym) = operands.first() else {
        return Value::nil();
    };
    let Some((_, code)) = sym.as_symbol() else {
        return Value::nil();
    };
    let value = operands
        .get(1)
        .map(|v| eval(v, env))
        .unwrap_or_else(Value::nil)
        .fresh_clone();
    env.define(code, value.clone());
    value
}

/// `(set SYM-OR-PLACE V)`: if the symbol's current lookup is `nil`, create a
/// new binding in the current frame; otherwise mutate the existing binding's
/// cell in place so every alias observes it. Note this is lookup-based, not
/// ownership-based: a symbol explicitly bound to `nil` in an outer frame
/// still gets a fresh local binding, leaving the outer `nil` untouched.
fn special_set(operands: &[Value], env: &Arc<Environment>) -> Value {
    let Some(sym) = operands.first() else {
        return Value::nil();
    };
    let Some((_, code)) = sym.as_symbol() else {
        return Value::nil();
    };
    let new_value = operands
        .get(1)
        .map(|v| eval(v, env))
        .unwrap_or_else(Value::nil);
    let existing = env.get(code);
    if existing.is_nil() {
        env.define(code, new_value.clone());
        new_value
    } else {
        existing.replace_in_place(&new_value);
        existing
    }
}

/// Handled inline by the TCO loop above; kept as a real special binding so
/// `(type if)` reports `special` and `if` can be passed around like any
/// other value.
fn special_if(operands: &[Value], env: &Arc<Environment>) -> Value {
    let cond = eval(operands.first().unwrap_or(&Value::nil()), env);
    let branch = if cond.is_truthy() {
        operands.get(1)
    } else {
        operands.get(2)
    };
    match branch {
        Some(b) => eval(b, env),
        None => Value::nil(),
    }
}

/// `(fn (P…) BODY…)`: produce a closure capturing the current environment.
fn special_fn(operands: &[Value], env: &Arc<Environment>) -> Value {
    let Some(param_forms) = operands.first() else {
        return Value::nil();
    };
    let params: Vec<usize> = param_forms
        .with_list(|items| {
            items
                .iter()
                .filter_map(|p| p.as_symbol().map(|(_, code)| code))
                .collect()
        })
        .unwrap_or_default();
    let body = operands.get(1..).unwrap_or(&[]).to_vec();
    Value::func(Lambda {
        params,
        body,
        env: env.clone(),
    })
}

/// Handled inline by the TCO loop; see `special_if`'s note.
fn special_begin(operands: &[Value], env: &Arc<Environment>) -> Value {
    let mut result = Value::nil();
    for e in operands {
        result = eval(e, env);
    }
    result
}

/// `(while C E…)`: re-evaluate C before each pass; returns `nil`.
fn special_while(operands: &[Value], env: &Arc<Environment>) -> Value {
    let Some(cond) = operands.first() else {
        return Value::nil();
    };
    let body = &operands[1..];
    while eval(cond, env).is_truthy() {
        for e in body {
            eval(e, env);
        }
    }
    Value::nil()
}

/// `(quote X)`: return X unevaluated.
fn special_quote(operands: &[Value], _env: &Arc<Environment>) -> Value {
    operands.first().cloned().unwrap_or_else(Value::nil)
}

/// `(&& E…)`: stops on the first false-bool; `(&&)` is `true`.
fn special_and(operands: &[Value], env: &Arc<Environment>) -> Value {
    for e in operands {
        if !eval(e, env).is_truthy() {
            return Value::bool(false);
        }
    }
    Value::bool(true)
}

/// `(|| E…)`: stops on the first true-bool; `(||)` is `false`.
fn special_or(operands: &[Value], env: &Arc<Environment>) -> Value {
    for e in operands {
        if eval(e, env).is_truthy() {
            return Value::bool(true);
        }
    }
    Value::bool(false)
}

/// `(thread E…)`: spawn an OS thread sharing the spawner's environment.
fn special_thread(operands: &[Value], env: &Arc<Environment>) -> Value {
    let body = operands.to_vec();
    let thread_env = env.clone();
    let handle = thread::Builder::new()
        .spawn(move || {
            let mut result = Value::nil();
            for e in &body {
                result = eval(e, &thread_env);
            }
            result
        })
        .expect("failed to spawn thread");
    Value::thread(handle)
}

/// The special-form bindings installed into the global environment at init.
pub fn specials() -> Vec<(&'static str, crate::value::SpecialFn)> {
    vec![
        ("def", special_def as crate::value::SpecialFn),
        ("set", special_set),
        ("if", special_if),
        ("fn", special_fn),
        ("begin", special_begin),
        ("while", special_while),
        ("quote", special_quote),
        ("&&", special_and),
        ("||", special_or),
        ("thread", special_thread),
    ]
}
