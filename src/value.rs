// ABOUTME: Value representation for the Paren interpreter

use crate::env::Environment;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// Signature shared by builtins and special forms: `(args, env) -> Value`.
/// Builtins receive already-evaluated argument values; specials receive the
/// raw, unevaluated operand forms.
pub type BuiltinFn = fn(&[Value], &Arc<Environment>) -> Value;
pub type SpecialFn = fn(&[Value], &Arc<Environment>) -> Value;

/// A user-defined closure: parameter names, body forms, and the environment
/// captured at the `fn` site.
pub struct Lambda {
    pub params: Vec<usize>,
    pub body: Vec<Value>,
    pub env: Arc<Environment>,
}

pub(crate) enum Inner {
    Nil,
    Int(i64),
    Double(f64),
    Bool(bool),
    Str(String),
    Symbol(Arc<str>, usize),
    List(Vec<Value>),
    BuiltIn(BuiltinFn),
    Special(SpecialFn),
    Fn(Arc<Lambda>),
    Thread(Arc<Mutex<Option<JoinHandle<Value>>>>),
}

impl Clone for Inner {
    fn clone(&self) -> Self {
        match self {
            Inner::Nil => Inner::Nil,
            Inner::Int(n) => Inner::Int(*n),
            Inner::Double(n) => Inner::Double(*n),
            Inner::Bool(b) => Inner::Bool(*b),
            Inner::Str(s) => Inner::Str(s.clone()),
            Inner::Symbol(name, code) => Inner::Symbol(name.clone(), *code),
            Inner::List(items) => Inner::List(items.clone()),
            Inner::BuiltIn(f) => Inner::BuiltIn(*f),
            Inner::Special(f) => Inner::Special(*f),
            Inner::Fn(lambda) => Inner::Fn(lambda.clone()),
            Inner::Thread(handle) => Inner::Thread(handle.clone()),
        }
    }
}

/// A Paren value. Every value is a handle to a shared, mutable cell: cloning
/// a `Value` copies the handle, not the contents, so `def`'s explicit
/// fresh-copy and `set`/`push-back!`/`pop-back!`/`++`/`--`'s in-place
/// mutation (observable through every alias) are both expressible without
/// `unsafe`. See §3 and the Design Notes of SPEC_FULL.md.
#[derive(Clone)]
pub struct Value(pub(crate) Arc<Mutex<Inner>>);

impl Value {
    fn new(inner: Inner) -> Self {
        Value(Arc::new(Mutex::new(inner)))
    }

    pub fn nil() -> Self {
        Value::new(Inner::Nil)
    }

    pub fn int(n: i64) -> Self {
        Value::new(Inner::Int(n))
    }

    pub fn double(n: f64) -> Self {
        Value::new(Inner::Double(n))
    }

    pub fn bool(b: bool) -> Self {
        Value::new(Inner::Bool(b))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::new(Inner::Str(s.into()))
    }

    pub fn symbol(name: impl Into<Arc<str>>, code: usize) -> Self {
        Value::new(Inner::Symbol(name.into(), code))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::new(Inner::List(items))
    }

    pub fn builtin(f: BuiltinFn) -> Self {
        Value::new(Inner::BuiltIn(f))
    }

    pub fn special(f: SpecialFn) -> Self {
        Value::new(Inner::Special(f))
    }

    pub fn func(lambda: Lambda) -> Self {
        Value::new(Inner::Fn(Arc::new(lambda)))
    }

    pub fn thread(handle: JoinHandle<Value>) -> Self {
        Value::new(Inner::Thread(Arc::new(Mutex::new(Some(handle)))))
    }

    /// `def`'s "clone into a fresh value": copies the current contents into a
    /// brand-new cell, so the new binding no longer aliases `self`.
    pub fn fresh_clone(&self) -> Value {
        let inner = self.0.lock().unwrap().clone();
        Value::new(inner)
    }

    /// Overwrite the contents of this cell with `other`'s, so every existing
    /// alias of `self` observes the change. Used by `set`, `push-back!`,
    /// `pop-back!`, `++`, `--`.
    pub fn replace_in_place(&self, other: &Value) {
        let new_inner = other.0.lock().unwrap().clone();
        *self.0.lock().unwrap() = new_inner;
    }

    pub fn is_nil(&self) -> bool {
        matches!(&*self.0.lock().unwrap(), Inner::Nil)
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(&*self.0.lock().unwrap(), Inner::Nil | Inner::Bool(false))
    }

    pub fn as_int(&self) -> Option<i64> {
        match &*self.0.lock().unwrap() {
            Inner::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match &*self.0.lock().unwrap() {
            Inner::Int(n) => Some(*n as f64),
            Inner::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &*self.0.lock().unwrap() {
            Inner::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> Option<R> {
        match &*self.0.lock().unwrap() {
            Inner::Str(s) => Some(f(s)),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<String> {
        self.with_str(|s| s.to_string())
    }

    pub fn as_symbol(&self) -> Option<(Arc<str>, usize)> {
        match &*self.0.lock().unwrap() {
            Inner::Symbol(name, code) => Some((name.clone(), *code)),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(&*self.0.lock().unwrap(), Inner::List(_))
    }

    pub fn with_list<R>(&self, f: impl FnOnce(&[Value]) -> R) -> Option<R> {
        match &*self.0.lock().unwrap() {
            Inner::List(items) => Some(f(items)),
            _ => None,
        }
    }

    pub fn with_list_mut<R>(&self, f: impl FnOnce(&mut Vec<Value>) -> R) -> Option<R> {
        match &mut *self.0.lock().unwrap() {
            Inner::List(items) => Some(f(items)),
            _ => None,
        }
    }

    pub fn as_builtin(&self) -> Option<BuiltinFn> {
        match &*self.0.lock().unwrap() {
            Inner::BuiltIn(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_special(&self) -> Option<SpecialFn> {
        match &*self.0.lock().unwrap() {
            Inner::Special(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_fn(&self) -> Option<Arc<Lambda>> {
        match &*self.0.lock().unwrap() {
            Inner::Fn(l) => Some(l.clone()),
            _ => None,
        }
    }

    pub fn as_thread(&self) -> Option<Arc<Mutex<Option<JoinHandle<Value>>>>> {
        match &*self.0.lock().unwrap() {
            Inner::Thread(h) => Some(h.clone()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &*self.0.lock().unwrap() {
            Inner::Nil => "nil",
            Inner::Int(_) => "int",
            Inner::Double(_) => "double",
            Inner::Bool(_) => "bool",
            Inner::Str(_) => "string",
            Inner::Symbol(..) => "symbol",
            Inner::List(_) => "list",
            Inner::BuiltIn(_) => "builtin",
            Inner::Special(_) => "special",
            Inner::Fn(_) => "fn",
            Inner::Thread(_) => "thread",
        }
    }

    /// Structural equality, used by `==`/`=`. Function-like and thread
    /// values compare by identity of their shared cell.
    pub fn structural_eq(&self, other: &Value) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        let a = self.0.lock().unwrap();
        let b = other.0.lock().unwrap();
        match (&*a, &*b) {
            (Inner::Nil, Inner::Nil) => true,
            (Inner::Int(x), Inner::Int(y)) => x == y,
            (Inner::Int(x), Inner::Double(y)) | (Inner::Double(y), Inner::Int(x)) => {
                (*x as f64) == *y
            }
            (Inner::Double(x), Inner::Double(y)) => x == y,
            (Inner::Bool(x), Inner::Bool(y)) => x == y,
            (Inner::Str(x), Inner::Str(y)) => x == y,
            (Inner::Symbol(_, x), Inner::Symbol(_, y)) => x == y,
            (Inner::List(x), Inner::List(y)) => {
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| a.structural_eq(b))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0.lock().unwrap() {
            Inner::Nil => Ok(()),
            Inner::Int(n) => write!(f, "{n}"),
            Inner::Double(n) => write!(f, "{}", format_double(*n)),
            Inner::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Inner::Str(s) => write!(f, "{s}"),
            Inner::Symbol(name, _) => write!(f, "{name}"),
            Inner::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Inner::BuiltIn(func) => write!(f, "#<builtin:{:x}>", *func as usize),
            Inner::Special(func) => write!(f, "#<builtin:{:x}>", *func as usize),
            Inner::Fn(lambda) => {
                write!(f, "(")?;
                for (i, item) in lambda.body.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Inner::Thread(_) => write!(f, "#<builtin:thread>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({} : {})", self, self.type_name())
    }
}

/// Doubles print with up to 16 significant digits, per §6's printed-form
/// rule. Rust's default `Display` for `f64` yields the *shortest*
/// round-tripping decimal, which can run past 16 significant digits (e.g.
/// `0.1 + 0.2` displays as `0.30000000000000004`, 17 of them) — so the
/// default isn't usable directly; round through scientific notation at 16
/// significant digits first, then render plainly.
fn format_double(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if n.is_nan() {
        return "nan".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let rounded: f64 = format!("{n:.15e}").parse().unwrap();

    let mut s = format!("{rounded}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_prints_empty() {
        assert_eq!(Value::nil().to_string(), "");
    }

    #[test]
    fn test_int_display() {
        assert_eq!(Value::int(42).to_string(), "42");
    }

    #[test]
    fn test_double_display_trims() {
        assert_eq!(Value::double(3.5).to_string(), "3.5");
    }

    #[test]
    fn test_double_display_caps_at_sixteen_significant_digits() {
        // Rust's shortest-round-trip Display would print this as
        // "0.30000000000000004" (17 significant digits).
        let n = 0.1 + 0.2;
        let printed = Value::double(n).to_string();
        assert_eq!(printed, "0.3");
    }

    #[test]
    fn test_double_display_zero_and_negative() {
        assert_eq!(Value::double(0.0).to_string(), "0");
        assert_eq!(Value::double(-2.5).to_string(), "-2.5");
    }

    #[test]
    fn test_bool_display() {
        assert_eq!(Value::bool(true).to_string(), "true");
        assert_eq!(Value::bool(false).to_string(), "false");
    }

    #[test]
    fn test_list_display() {
        let v = Value::list(vec![Value::int(1), Value::int(2), Value::int(3)]);
        assert_eq!(v.to_string(), "(1 2 3)");
    }

    #[test]
    fn test_truthy() {
        assert!(!Value::nil().is_truthy());
        assert!(!Value::bool(false).is_truthy());
        assert!(Value::bool(true).is_truthy());
        assert!(Value::list(vec![]).is_truthy());
        assert!(Value::int(0).is_truthy());
    }

    #[test]
    fn test_fresh_clone_breaks_aliasing() {
        let a = Value::int(5);
        let b = a.fresh_clone();
        b.replace_in_place(&Value::int(6));
        assert_eq!(a.as_int(), Some(5));
        assert_eq!(b.as_int(), Some(6));
    }

    #[test]
    fn test_replace_in_place_is_observed_through_alias() {
        let a = Value::int(5);
        let alias = a.clone();
        a.replace_in_place(&Value::int(99));
        assert_eq!(alias.as_int(), Some(99));
    }

    #[test]
    fn test_structural_eq() {
        assert!(Value::int(5).structural_eq(&Value::double(5.0)));
        assert!(!Value::int(5).structural_eq(&Value::int(6)));
        let xs = Value::list(vec![Value::int(1), Value::int(2)]);
        let ys = Value::list(vec![Value::int(1), Value::int(2)]);
        assert!(xs.structural_eq(&ys));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::nil().type_name(), "nil");
        assert_eq!(Value::int(1).type_name(), "int");
        assert_eq!(Value::double(1.0).type_name(), "double");
        assert_eq!(Value::string("x").type_name(), "string");
        assert_eq!(Value::list(vec![]).type_name(), "list");
    }
}
