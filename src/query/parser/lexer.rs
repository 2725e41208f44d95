// Query Lexical Primitives
//
// Character classes and keyword tables shared by the grammar engine.
// Nothing here holds scan state; the engine owns the position.

/// Words an identifier may not start with.
///
/// Matching is case-insensitive and a keyword only counts when it is not
/// immediately followed by another identifier character, so `limits` and
/// `selected` stay valid column names.
pub const KEYWORDS: [&str; 6] = ["select", "group by", "filters", "order by", "desc", "limit"];

/// First character of an identifier: ASCII letter or underscore
pub fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

/// Any later identifier character: ASCII letter, digit or underscore
pub fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Space, tab, CR or LF (CRLF is two of these in a row)
pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

pub fn is_octal_digit(ch: char) -> bool {
    matches!(ch, '0'..='7')
}

pub fn is_hex_digit(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

pub fn is_sign(ch: char) -> bool {
    ch == '+' || ch == '-'
}

/// Characters allowed after a backslash in a simple escape (`\n`, `\"`, ...)
pub fn is_simple_escape(ch: char) -> bool {
    matches!(ch, '\'' | '"' | '?' | '\\' | 'a' | 'b' | 'f' | 'n' | 'r' | 't' | 'v')
}

/// Case-insensitive comparison of one input character against a literal character
pub fn eq_ignore_case(ch: char, expected: char) -> bool {
    ch.eq_ignore_ascii_case(&expected)
}

/// Remove the quotes around every segment of a captured string literal.
///
/// `"foo""bar"` becomes `foobar`. Escape sequences are kept as written: the
/// grammar only recognizes them, it never translates them.
pub fn unquote_segments(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut in_segment = false;
    let mut chars = literal.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => in_segment = !in_segment,
            '\\' if in_segment => {
                out.push(ch);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            _ if in_segment => out.push(ch),
            _ => {}
        }
    }

    out
}
