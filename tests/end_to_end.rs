// ABOUTME: End-to-end REPL scenarios driving the crate's public API and asserting printed output

use paren::kernel::Kernel;
use paren::value::Value;

fn printed(kernel: &Kernel, src: &str) -> String {
    let mut last = Value::nil();
    for form in kernel.read(src) {
        let compiled = kernel.compile(&form);
        last = paren::eval::eval(&compiled, &kernel.env);
    }
    format!("{} : {}", last, last.type_name())
}

#[test]
fn test_scenario_1_integer_arithmetic() {
    let kernel = Kernel::bootstrap();
    assert_eq!(printed(&kernel, "(+ 1 2 3)"), "6 : int");
}

#[test]
fn test_scenario_2_mixed_arithmetic_promotes_to_double() {
    let kernel = Kernel::bootstrap();
    assert_eq!(printed(&kernel, "(+ 1.5 2)"), "3.5 : double");
}

#[test]
fn test_scenario_3_def_then_set_mutates_in_place() {
    let kernel = Kernel::bootstrap();
    assert_eq!(
        printed(&kernel, "(def x 10) (set x (+ x 1)) x"),
        "11 : int"
    );
}

#[test]
fn test_scenario_4_recursive_fibonacci() {
    let kernel = Kernel::bootstrap();
    let src = "(def f (fn (n) (if (< n 2) n (+ (f (- n 1)) (f (- n 2)))))) (f 10)";
    assert_eq!(printed(&kernel, src), "55 : int");
}

#[test]
fn test_scenario_5_macro_expansion() {
    let kernel = Kernel::bootstrap();
    let src = "(defmacro unless (c body) (if c nil body)) (unless false 42)";
    assert_eq!(printed(&kernel, src), "42 : int");
}

#[test]
fn test_scenario_6_push_back_mutates_shared_list() {
    let kernel = Kernel::bootstrap();
    let src = "(def xs (list 1 2 3)) (push-back! xs 4) (length xs)";
    assert_eq!(printed(&kernel, src), "4 : int");
}

#[test]
fn test_scenario_7_map_over_list() {
    let kernel = Kernel::bootstrap();
    let src = "(map (fn (x) (* x x)) (list 1 2 3))";
    assert_eq!(printed(&kernel, src), "(1 4 9) : list");
}

#[test]
fn test_scenario_8_thread_join_returns_nil() {
    let kernel = Kernel::bootstrap();
    let src = "(def t (thread (+ 1 1))) (join t)";
    assert_eq!(printed(&kernel, src), " : nil");
}

#[test]
fn test_fixed_point_macro_expansion_is_idempotent() {
    let kernel = Kernel::bootstrap();
    let forms = kernel.read("(defmacro sq (x) (* x x)) (sq 5)");
    let once: Vec<Value> = forms.iter().map(|f| kernel.compile(f)).collect();
    let twice: Vec<Value> = once.iter().map(|f| kernel.compile(f)).collect();
    assert_eq!(once[1].to_string(), twice[1].to_string());
}

#[test]
fn test_and_or_empty_identities() {
    let kernel = Kernel::bootstrap();
    assert_eq!(printed(&kernel, "(&&)"), "true : bool");
    assert_eq!(printed(&kernel, "(||)"), "false : bool");
}

#[test]
fn test_def_inside_fn_does_not_escape() {
    let kernel = Kernel::bootstrap();
    let src = "(def x 1) (def f (fn () (def x 2) x)) (f) x";
    assert_eq!(printed(&kernel, src), "1 : int");
}
