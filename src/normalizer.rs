//! The lexical normalizer.
//!
//! Rewrites a raw expression string into the canonical form the parser
//! consumes: surrounding whitespace trimmed, parentheses validated, the
//! word-operators `AND`, `OR`, `NOT`, `IF`, `MOD`, `MIN`, `MAX` and the
//! comparison digraphs `<=`, `>=`, `<>` replaced by single-character
//! surrogates, all whitespace removed, and identifiers folded to uppercase
//! when case-insensitive matching is active.
//!
//! The rewrite is a single left-to-right pass in O(n) time and O(n) space.
//! Word-operators are only replaced at token boundaries, so identifiers
//! like `ORANGE` or `MODE` pass through untouched. Raw input is restricted
//! to the expression-language alphabet (letters, digits, `_`, `.`,
//! whitespace, `( ) , + - * / ^ < > =`); anything else is rejected here,
//! which also guarantees the surrogate characters can never collide with
//! caller input.
//!
//! Error positions, here and in the parser, are 1-based character offsets
//! into the normalized string; a missing closing parenthesis is reported
//! one past the end.

use crate::error::{FuncError, Result};

// Surrogate alphabet shared with the parser.
pub(crate) const AND_OP: u8 = b'&';
pub(crate) const OR_OP: u8 = b'|';
pub(crate) const NOT_OP: u8 = b'!';
pub(crate) const IF_MARK: u8 = b'?';
pub(crate) const MOD_OP: u8 = b'%';
pub(crate) const MIN_MARK: u8 = b'$';
pub(crate) const MAX_MARK: u8 = b'~';
pub(crate) const LE_OP: u8 = b'{';
pub(crate) const GE_OP: u8 = b'}';
pub(crate) const NE_OP: u8 = b'#';

const WORD_OPS: &[(&str, u8)] = &[
    ("AND", AND_OP),
    ("OR", OR_OP),
    ("NOT", NOT_OP),
    ("IF", IF_MARK),
    ("MOD", MOD_OP),
    ("MIN", MIN_MARK),
    ("MAX", MAX_MARK),
];

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn word_op(token: &str, case_sensitive: bool) -> Option<u8> {
    WORD_OPS.iter().find_map(|(word, op)| {
        let hit = if case_sensitive {
            token == *word
        } else {
            token.eq_ignore_ascii_case(word)
        };
        hit.then_some(*op)
    })
}

/// Normalize a raw expression string.
///
/// The output contains only ASCII: digits, identifier characters, `.`,
/// parentheses, commas, the operator characters `+ - * / ^ < > =`, and the
/// surrogate characters. With `case_sensitive` off, every identifier letter
/// is folded to uppercase; the caller keeps the raw string for diagnostics.
pub(crate) fn normalize(raw: &str, case_sensitive: bool) -> Result<String> {
    let src: Vec<char> = raw.trim().chars().collect();
    let mut out = String::with_capacity(src.len());
    let mut depth = 0usize;
    let mut i = 0;

    while i < src.len() {
        let c = src[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '(' => {
                depth += 1;
                out.push('(');
                i += 1;
            }
            ')' => {
                if depth == 0 {
                    return Err(FuncError::Unbalanced {
                        position: out.len() + 1,
                    });
                }
                depth -= 1;
                out.push(')');
                i += 1;
            }
            '<' => match src.get(i + 1) {
                Some('=') => {
                    out.push(LE_OP as char);
                    i += 2;
                }
                Some('>') => {
                    out.push(NE_OP as char);
                    i += 2;
                }
                _ => {
                    out.push('<');
                    i += 1;
                }
            },
            '>' => {
                if src.get(i + 1) == Some(&'=') {
                    out.push(GE_OP as char);
                    i += 2;
                } else {
                    out.push('>');
                    i += 1;
                }
            }
            '0'..='9' => scan_number(&src, &mut i, &mut out),
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < src.len() && is_ident_char(src[i]) {
                    i += 1;
                }
                // A word-operator only counts at a token boundary; mid-token
                // starts like the `AND` in `2AND` stay identifier text.
                let bounded = start == 0 || !is_ident_char(src[start - 1]);
                let token: String = src[start..i].iter().collect();
                match if bounded {
                    word_op(&token, case_sensitive)
                } else {
                    None
                } {
                    Some(op) => out.push(op as char),
                    None if case_sensitive => out.push_str(&token),
                    None => {
                        for ch in token.chars() {
                            out.push(ch.to_ascii_uppercase());
                        }
                    }
                }
            }
            '+' | '-' | '*' | '/' | '^' | ',' | '=' | '.' => {
                out.push(c);
                i += 1;
            }
            other => {
                return Err(FuncError::UnexpectedToken {
                    position: out.len() + 1,
                    found: other.to_string(),
                });
            }
        }
    }

    if depth > 0 {
        return Err(FuncError::Unbalanced {
            position: out.len() + 1,
        });
    }
    log::trace!("normalized '{}' to '{}'", raw.trim(), out);
    Ok(out)
}

/// Consume a numeric literal: digits, optional fraction, optional exponent.
/// The scan is lenient; the parser validates the full literal shape.
fn scan_number(src: &[char], i: &mut usize, out: &mut String) {
    while *i < src.len() && src[*i].is_ascii_digit() {
        out.push(src[*i]);
        *i += 1;
    }
    if *i < src.len() && src[*i] == '.' {
        out.push('.');
        *i += 1;
        while *i < src.len() && src[*i].is_ascii_digit() {
            out.push(src[*i]);
            *i += 1;
        }
    }
    // An exponent marker is consumed only when digits actually follow, so
    // `2e5` stays one token while `2elephant` splits after the `2`.
    if *i < src.len() && (src[*i] == 'e' || src[*i] == 'E') {
        let digits_follow = match src.get(*i + 1) {
            Some(d) if d.is_ascii_digit() => true,
            Some('+') | Some('-') => src.get(*i + 2).is_some_and(|d| d.is_ascii_digit()),
            _ => false,
        };
        if digits_follow {
            out.push(src[*i]);
            *i += 1;
            if src[*i] == '+' || src[*i] == '-' {
                out.push(src[*i]);
                *i += 1;
            }
            while *i < src.len() && src[*i].is_ascii_digit() {
                out.push(src[*i]);
                *i += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_operators_replaced() {
        assert_eq!(normalize("x AND y", false).unwrap(), "X&Y");
        assert_eq!(normalize("x OR y", false).unwrap(), "X|Y");
        assert_eq!(normalize("NOT x", false).unwrap(), "!X");
        assert_eq!(normalize("IF(x, 1, 2)", false).unwrap(), "?(X,1,2)");
        assert_eq!(normalize("a MOD b", false).unwrap(), "A%B");
        assert_eq!(normalize("MIN(a, b)", false).unwrap(), "$(A,B)");
        assert_eq!(normalize("MAX(a, b)", false).unwrap(), "~(A,B)");
    }

    #[test]
    fn test_identifiers_containing_word_operators_survive() {
        assert_eq!(normalize("ORANGE + MODE", false).unwrap(), "ORANGE+MODE");
        assert_eq!(normalize("ANDY AND MANDY", false).unwrap(), "ANDY&MANDY");
        assert_eq!(normalize("iffy", false).unwrap(), "IFFY");
    }

    #[test]
    fn test_word_operator_after_comma_or_paren() {
        assert_eq!(normalize("IF(x, NOT y, 0)", false).unwrap(), "?(X,!Y,0)");
        assert_eq!(normalize("(NOT x)", false).unwrap(), "(!X)");
    }

    #[test]
    fn test_digraphs_replaced() {
        assert_eq!(normalize("a <= b", false).unwrap(), "A{B");
        assert_eq!(normalize("a >= b", false).unwrap(), "A}B");
        assert_eq!(normalize("a <> b", false).unwrap(), "A#B");
        assert_eq!(normalize("a < b", false).unwrap(), "A<B");
        assert_eq!(normalize("a = b", false).unwrap(), "A=B");
    }

    #[test]
    fn test_whitespace_removed_and_trimmed() {
        assert_eq!(normalize("  1 +  2 \t* 3\n", false).unwrap(), "1+2*3");
    }

    #[test]
    fn test_case_folding_honors_flag() {
        assert_eq!(normalize("Sin(x)", false).unwrap(), "SIN(X)");
        assert_eq!(normalize("Sin(x)", true).unwrap(), "Sin(x)");
        // Case-sensitive word operators match canonical uppercase only.
        assert_eq!(normalize("x and y", true).unwrap(), "xandy");
        assert_eq!(normalize("x AND y", true).unwrap(), "x&y");
    }

    #[test]
    fn test_numbers_keep_exponents() {
        assert_eq!(normalize("2.5e-3", false).unwrap(), "2.5e-3");
        assert_eq!(normalize("1E+10", false).unwrap(), "1E+10");
        assert_eq!(normalize("2e5", false).unwrap(), "2e5");
    }

    #[test]
    fn test_unbalanced_positions() {
        // Missing close is one past the end of the normalized string.
        assert_eq!(
            normalize("sin(x", false).unwrap_err(),
            crate::error::FuncError::Unbalanced { position: 6 }
        );
        // A stray close is reported at its own position.
        assert_eq!(
            normalize("a)b", false).unwrap_err(),
            crate::error::FuncError::Unbalanced { position: 2 }
        );
    }

    #[test]
    fn test_illegal_characters_rejected() {
        for bad in ["a & b", "a | b", "x ? y", "a{b", "a$b", "a;b"] {
            assert!(
                matches!(
                    normalize(bad, false),
                    Err(crate::error::FuncError::UnexpectedToken { .. })
                ),
                "expected rejection of {:?}",
                bad
            );
        }
    }
}
