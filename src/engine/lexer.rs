//! Condition tokenizer.
//!
//! Tokens are recognized by trying a fixed, ordered table of anchored
//! patterns at the current position; the first one that matches wins.
//! Whitespace (ASCII space, tab, CR, LF and form feed only) is consumed but
//! not emitted; any other space character is an unexpected character.
//!
//! ```text
//! ("a" OR "b"i) and not "c"
//! LParen Lit(a) Or Lit(b,ci) RParen And Not Lit(c)
//! ```
//!
//! Keywords match case-insensitively and, like the rest of the table, as a
//! plain prefix: `ANDNOT` lexes as `AND` followed by `NOT`.
//!
//! Literal payloads are unescaped and kept verbatim. The `i` suffix only sets
//! a flag; lowering happens when the matcher is built.

use crate::Literal;
use crate::error::SyntaxError;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    And,
    Or,
    Not,
    LParen,
    RParen,
    Literal(Literal),
}

/// One token with its 1-based character offset and character length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub offset: usize,
    pub len: usize,
}

impl Token {
    /// Offset just past the token.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

#[derive(Debug, Clone, Copy)]
enum Class {
    Space,
    And,
    Or,
    Not,
    Literal,
    LParen,
    RParen,
}

fn token_table() -> [(Class, &'static Regex); 7] {
    [
        (Class::Space, regex!(r"^[\t\n\f\r ]+")),
        (Class::And, regex!(r"^(?i)and")),
        (Class::Or, regex!(r"^(?i)or")),
        (Class::Not, regex!(r"^(?i)not")),
        (Class::Literal, regex!(r#"^(?s)"(?:[^"\\]|\\.)*"(i?)"#)),
        (Class::LParen, regex!(r"^\(")),
        (Class::RParen, regex!(r"^\)")),
    ]
}

/// Split `text` into tokens.
pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>, SyntaxError> {
    let table = token_table();
    let mut tokens = Vec::new();
    let mut rest = text;
    let mut offset = 1;

    'scan: while !rest.is_empty() {
        for (class, re) in &table {
            let Some(caps) = re.captures(rest) else {
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let matched = whole.as_str();
            let len = matched.chars().count();

            let kind = match class {
                Class::Space => None,
                Class::And => Some(TokenKind::And),
                Class::Or => Some(TokenKind::Or),
                Class::Not => Some(TokenKind::Not),
                Class::LParen => Some(TokenKind::LParen),
                Class::RParen => Some(TokenKind::RParen),
                Class::Literal => {
                    let case_insensitive = caps.get(1).is_some_and(|m| m.as_str() == "i");
                    let suffix = usize::from(case_insensitive);
                    // Strip the quotes (and the suffix); all three are ASCII.
                    let raw = &matched[1..matched.len() - 1 - suffix];
                    let text = unescape(raw, offset + 1)?;
                    Some(TokenKind::Literal(Literal { text, case_insensitive }))
                }
            };

            if let Some(kind) = kind {
                tokens.push(Token { kind, offset, len });
            }
            offset += len;
            rest = &rest[matched.len()..];
            continue 'scan;
        }

        return Err(match rest.chars().next() {
            Some('"') | None => SyntaxError::UnterminatedLiteral { offset },
            Some(found) => SyntaxError::UnexpectedChar { offset, found },
        });
    }

    Ok(tokens)
}

/// Resolve backslash escapes inside a literal body starting at `start`.
///
/// ```text
/// \" \\ \' \a \b \f \n \r \t \v    single characters
/// \NNN                         octal, three digits, ASCII only
/// \0                           NUL, when no octal digit follows
/// \xNN                         hex, ASCII only
/// \uNNNN  \UNNNNNNNN  \u{N..}  code points (braced: 1 to 6 digits)
/// ```
///
/// Every escape `Display` emits is in this set, so rendered conditions lex
/// back to the same literal.
fn unescape(raw: &str, start: usize) -> Result<String, SyntaxError> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }

    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '\\' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let (resolved, used) = escape(&chars[i + 1..]);
        let Some(c) = resolved else {
            let end = (i + 1 + used).min(chars.len());
            return Err(SyntaxError::InvalidEscape { offset: start + i, escape: chars[i..end].iter().collect() });
        };
        out.push(c);
        i += 1 + used;
    }

    Ok(out)
}

/// Decode the escape following a backslash: the character, if valid, and
/// how many characters of `rest` the escape spans.
fn escape(rest: &[char]) -> (Option<char>, usize) {
    let Some(&kind) = rest.first() else {
        return (None, 0);
    };
    let digits = &rest[1..];

    let single = match kind {
        '"' => Some('"'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        'f' => Some('\x0c'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\x0b'),
        _ => None,
    };
    if single.is_some() {
        return (single, 1);
    }

    match kind {
        'x' => {
            let (value, used) = fixed_hex(digits, 2);
            (value.filter(|v| *v <= 0x7f).and_then(char::from_u32), 1 + used)
        }
        'u' if digits.first() == Some(&'{') => {
            let (value, used) = braced_hex(&digits[1..]);
            (value.and_then(char::from_u32), 2 + used)
        }
        'u' | 'U' => {
            let (value, used) = fixed_hex(digits, if kind == 'u' { 4 } else { 8 });
            (value.and_then(char::from_u32), 1 + used)
        }
        '0'..='7' => {
            let octal = rest.iter().take(3).take_while(|c| c.is_digit(8)).count();
            match octal {
                3 => {
                    let value = rest[..3].iter().filter_map(|c| c.to_digit(8)).fold(0, |acc, d| acc * 8 + d);
                    (char::from_u32(value).filter(char::is_ascii), 3)
                }
                1 if kind == '0' => (Some('\0'), 1),
                _ => (None, octal),
            }
        }
        _ => (None, 1),
    }
}

/// Exactly `count` hex digits; on failure, the span up to the bad digit.
fn fixed_hex(digits: &[char], count: usize) -> (Option<u32>, usize) {
    let mut value = 0u32;
    for (i, c) in digits.iter().take(count).enumerate() {
        match c.to_digit(16) {
            Some(d) => value = value * 16 + d,
            None => return (None, i + 1),
        }
    }
    if digits.len() < count {
        return (None, digits.len());
    }
    (Some(value), count)
}

/// Hex digits up to a closing `}` (which counts as used).
fn braced_hex(digits: &[char]) -> (Option<u32>, usize) {
    let mut value = 0u32;
    for (i, c) in digits.iter().enumerate() {
        if *c == '}' {
            return (Some(value).filter(|_| i > 0), i + 1);
        }
        match c.to_digit(16) {
            Some(d) if i < 6 => value = value * 16 + d,
            _ => return (None, i + 1),
        }
    }
    (None, digits.len())
}
