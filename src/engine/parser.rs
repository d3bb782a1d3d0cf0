//! Condition parser.
//!
//! Builds a boolean [`Node`] tree from lexer tokens. Binding, tightest first:
//!
//! ```text
//! NOT  >  AND  >  OR          parentheses override
//!
//! "a" OR "b" AND NOT "c"   ->  OR("a", AND("b", NOT("c")))
//! "a" OR "b" OR "c"        ->  OR(OR("a", "b"), "c")
//! ```
//!
//! Chains of the same operator always group to the left. `NOT` takes exactly
//! one primary operand, so a stacked negation needs parentheses:
//! `NOT (NOT "a")` parses, `NOT NOT "a"` is a missing operand.
//!
//! A parenthesized group is located by its matching close paren first and
//! parsed as an independent token slice; the outer parser then treats it as a
//! single operand.

use super::lexer::{Token, TokenKind, tokenize};
use crate::Node;
use crate::error::{Operator, SyntaxError};

/// Tokenize and parse one condition.
pub(crate) fn parse_condition(text: &str) -> Result<Node, SyntaxError> {
    let tokens = tokenize(text)?;
    parse(&tokens)
}

/// Parse a complete token sequence into exactly one expression.
pub(crate) fn parse(tokens: &[Token]) -> Result<Node, SyntaxError> {
    let mut parser = Parser { tokens, pos: 0 };
    let node = parser.disjunction(None)?;
    match parser.peek() {
        None => Ok(node),
        Some(Token { kind: TokenKind::RParen, offset, .. }) => Err(SyntaxError::UnmatchedParen { offset: *offset }),
        Some(extra) => Err(SyntaxError::Malformed { offset: extra.offset }),
    }
}

/// The operator (and its offset) that is waiting for the next operand.
type Pending = Option<(Operator, usize)>;

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, kind: &TokenKind) -> Option<&'t Token> {
        let tok = self.peek().filter(|t| &t.kind == kind)?;
        self.pos += 1;
        Some(tok)
    }

    fn disjunction(&mut self, pending: Pending) -> Result<Node, SyntaxError> {
        let mut left = self.conjunction(pending)?;
        while let Some(op) = self.eat(&TokenKind::Or) {
            let right = self.conjunction(Some((Operator::Or, op.offset)))?;
            left = Node::or(left, right);
        }
        Ok(left)
    }

    fn conjunction(&mut self, pending: Pending) -> Result<Node, SyntaxError> {
        let mut left = self.unary(pending)?;
        while let Some(op) = self.eat(&TokenKind::And) {
            let right = self.unary(Some((Operator::And, op.offset)))?;
            left = Node::and(left, right);
        }
        Ok(left)
    }

    fn unary(&mut self, pending: Pending) -> Result<Node, SyntaxError> {
        match self.eat(&TokenKind::Not) {
            Some(op) => Ok(Node::not(self.primary(Some((Operator::Not, op.offset)))?)),
            None => self.primary(pending),
        }
    }

    fn primary(&mut self, pending: Pending) -> Result<Node, SyntaxError> {
        let Some(tok) = self.peek() else {
            return Err(match pending {
                Some((operator, offset)) => SyntaxError::MissingOperand { operator, offset },
                None => SyntaxError::Malformed { offset: self.tokens.last().map_or(1, Token::end) },
            });
        };

        match &tok.kind {
            TokenKind::Literal(lit) => {
                self.pos += 1;
                Ok(Node::Value(lit.clone()))
            }
            TokenKind::LParen => {
                let close = self.closing_paren().ok_or(SyntaxError::UnmatchedParen { offset: tok.offset })?;
                if close == self.pos + 1 {
                    return Err(SyntaxError::EmptyGroup { offset: tok.offset });
                }
                let inner = parse(&self.tokens[self.pos + 1..close])?;
                self.pos = close + 1;
                Ok(inner)
            }
            TokenKind::RParen => Err(SyntaxError::UnmatchedParen { offset: tok.offset }),
            TokenKind::And => Err(SyntaxError::MissingOperand { operator: Operator::And, offset: tok.offset }),
            TokenKind::Or => Err(SyntaxError::MissingOperand { operator: Operator::Or, offset: tok.offset }),
            // Only reached straight after another NOT; that one lacks its operand.
            TokenKind::Not => Err(SyntaxError::MissingOperand {
                operator: Operator::Not,
                offset: pending.map_or(tok.offset, |(_, offset)| offset),
            }),
        }
    }

    /// Index of the paren closing the one at `self.pos`.
    fn closing_paren(&self) -> Option<usize> {
        let mut depth = 0usize;
        for (i, tok) in self.tokens.iter().enumerate().skip(self.pos) {
            match tok.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }
}
