// ABOUTME: Ahead-of-time emitter: wraps source text into a driver calling the embedding ABI

/// Which textual form the driver translation unit is emitted in. Neither
/// variant performs language analysis — both just wrap `src` as a string
/// literal inside a call to `paren_init`/`paren_eval_string` (§1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitKind {
    Llvm,
    Asm,
}

/// Escapes `src` so it can be embedded as a double-quoted string literal in
/// the emitted driver.
fn escape_literal(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    for c in src.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Produces the driver translation unit's text for `src`. This is the
/// entire AOT path: the caller still links the result against a `paren`
/// static library to get a runnable binary.
pub fn emit(src: &str, kind: EmitKind) -> String {
    let literal = escape_literal(src);
    match kind {
        EmitKind::Llvm => format!(
            "; paren AOT driver (LLVM IR)\n\
             declare void @paren_init()\n\
             declare void @paren_eval_string(i8*)\n\
             \n\
             @.src = private unnamed_addr constant [{len} x i8] c\"{literal}\\00\"\n\
             \n\
             define i32 @main() {{\n\
             \x20 call void @paren_init()\n\
             \x20 %src = getelementptr [{len} x i8], [{len} x i8]* @.src, i64 0, i64 0\n\
             \x20 call void @paren_eval_string(i8* %src)\n\
             \x20 ret i32 0\n\
             }}\n",
            len = literal.len() + 1,
            literal = literal,
        ),
        EmitKind::Asm => format!(
            "# paren AOT driver (assembly)\n\
             .section .rodata\n\
             .paren_src:\n\
             \x20 .asciz \"{literal}\"\n\
             .section .text\n\
             .global main\n\
             main:\n\
             \x20 call paren_init\n\
             \x20 lea .paren_src(%rip), %rdi\n\
             \x20 call paren_eval_string\n\
             \x20 xor %eax, %eax\n\
             \x20 ret\n",
            literal = literal,
        ),
    }
}
