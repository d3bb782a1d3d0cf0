//! Compile-time errors.
//!
//! Matching never fails; everything that can go wrong happens while a
//! condition set is compiled. Offsets are 1-based character positions into
//! the offending condition text.

use std::fmt;

/// Boolean operator named in [`SyntaxError::MissingOperand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    And,
    Or,
    Not,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
        })
    }
}

/// A condition that could not be tokenized or parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("unexpected character {found:?} at position {offset}")]
    UnexpectedChar { offset: usize, found: char },
    #[error("unterminated quoted literal starting at position {offset}")]
    UnterminatedLiteral { offset: usize },
    #[error("invalid escape sequence {escape:?} at position {offset}")]
    InvalidEscape { offset: usize, escape: String },
    #[error("unmatched parenthesis at position {offset}")]
    UnmatchedParen { offset: usize },
    #[error("empty parenthesis group at position {offset}")]
    EmptyGroup { offset: usize },
    #[error("missing operand for {operator} at position {offset}")]
    MissingOperand { operator: Operator, offset: usize },
    #[error("expected exactly one expression, found extra input at position {offset}")]
    Malformed { offset: usize },
}

impl SyntaxError {
    /// 1-based character offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            SyntaxError::UnexpectedChar { offset, .. }
            | SyntaxError::UnterminatedLiteral { offset }
            | SyntaxError::InvalidEscape { offset, .. }
            | SyntaxError::UnmatchedParen { offset }
            | SyntaxError::EmptyGroup { offset }
            | SyntaxError::MissingOperand { offset, .. }
            | SyntaxError::Malformed { offset } => *offset,
        }
    }
}

/// Why a single condition failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// AND-path extraction met a negation above something other than a
    /// literal. The normalizer pushes every negation down to a literal, so
    /// this only fires on a tree that skipped it.
    #[error("negation of a compound expression reached AND-path extraction")]
    NotNormalized,
}

/// First failing condition of a `compile` call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("condition {index}: {cause}")]
pub struct CompileError {
    /// Ordinal index of the condition in the submitted list.
    pub index: usize,
    #[source]
    pub cause: ConditionError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display() {
        let cases = vec![
            (SyntaxError::UnexpectedChar { offset: 3, found: '#' }, "unexpected character '#' at position 3"),
            (SyntaxError::UnterminatedLiteral { offset: 1 }, "unterminated quoted literal starting at position 1"),
            (SyntaxError::EmptyGroup { offset: 7 }, "empty parenthesis group at position 7"),
            (
                SyntaxError::MissingOperand { operator: Operator::And, offset: 5 },
                "missing operand for AND at position 5",
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn compile_error_wraps_cause() {
        let error = CompileError { index: 4, cause: SyntaxError::UnmatchedParen { offset: 2 }.into() };
        assert_eq!(error.to_string(), "condition 4: unmatched parenthesis at position 2");

        let source = std::error::Error::source(&error).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("unmatched parenthesis at position 2"));
    }

    #[test]
    fn offset_accessor_covers_every_variant() {
        assert_eq!(SyntaxError::Malformed { offset: 9 }.offset(), 9);
        assert_eq!(SyntaxError::InvalidEscape { offset: 4, escape: "\\q".into() }.offset(), 4);
    }
}
