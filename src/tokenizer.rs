// ABOUTME: Lexes a source buffer into tokens, tracking paren/string balance for the REPL

/// Result of lexing one buffer: the token sequence plus the net count of
/// unbalanced `(` / `"`. The tokenizer never errors — malformed input just
/// produces tokens the reader can't make sense of (§4.1).
pub struct TokenStream {
    pub tokens: Vec<String>,
    pub unclosed: i64,
}

/// Lex `src` into a flat token sequence. Whitespace separates tokens; `;`
/// and `#!` start line comments; `"..."` is a single string token (escapes
/// `\n \r \t` translated, anything else escaped taken literally); `(` and
/// `)` are always their own token; everything else runs together into an
/// "atom" token.
pub fn tokenize(src: &str) -> TokenStream {
    let mut tokens = Vec::new();
    let mut unclosed: i64 = 0;
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;
    let n = chars.len();

    while i < n {
        let c = chars[i];

        if c == ' ' || c == '\t' || c == '\r' || c == '\n' {
            i += 1;
            continue;
        }

        if c == ';' || (c == '#' && i + 1 < n && chars[i + 1] == '!') {
            while i < n && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        if c == '"' {
            let mut literal = String::from("\"");
            i += 1;
            let mut closed = false;
            while i < n {
                let ch = chars[i];
                if ch == '"' {
                    i += 1;
                    closed = true;
                    break;
                }
                if ch == '\\' && i + 1 < n {
                    let esc = chars[i + 1];
                    match esc {
                        'n' => literal.push('\n'),
                        'r' => literal.push('\r'),
                        't' => literal.push('\t'),
                        other => literal.push(other),
                    }
                    i += 2;
                    continue;
                }
                literal.push(ch);
                i += 1;
            }
            unclosed += 1;
            if closed {
                unclosed -= 1;
            }
            tokens.push(literal);
            continue;
        }

        if c == '(' {
            unclosed += 1;
            tokens.push("(".to_string());
            i += 1;
            continue;
        }

        if c == ')' {
            unclosed -= 1;
            tokens.push(")".to_string());
            i += 1;
            continue;
        }

        // A non-ASCII leading byte here mirrors the host parser's signed-`char`
        // bail-out: an atom can't start with a high-bit-set byte, so reading
        // stops at this point rather than running the byte into a symbol.
        if c as u32 >= 0x80 {
            tokens.push(String::new());
            break;
        }

        let start = i;
        while i < n {
            let ch = chars[i];
            if ch == ' ' || ch == '\t' || ch == '\r' || ch == '\n' || ch == '(' || ch == ')' || ch == '"' {
                break;
            }
            i += 1;
        }
        tokens.push(chars[start..i].iter().collect());
    }

    TokenStream { tokens, unclosed }
}
