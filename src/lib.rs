//! Compile many boolean string-literal conditions once, match them against
//! many inputs fast.
//!
//! A condition combines quoted literals with `AND`, `OR`, `NOT` and
//! parentheses; a trailing `i` after a literal makes it case-insensitive:
//!
//! ```text
//! ("powershell"i OR "cmd.exe") AND NOT "whoami"
//! ```
//!
//! Each literal is a substring-containment test against the input. Compiling
//! a condition set rewrites every condition into disjunctive normal form,
//! threads each conjunction into a shared decision tree, and builds one
//! Aho-Corasick automaton over all distinct literals. Matching an input is a
//! single automaton pass followed by a tree walk, and always returns exactly
//! what evaluating every condition on its own would.
//!
//! ```
//! let matcher = boolsieve::compile(["\"foo\" OR \"bar\"", "\"baz\" AND \"qux\""]).unwrap();
//!
//! assert_eq!(matcher.matches("foo"), vec![0]);
//! assert_eq!(matcher.matches("qux baz"), vec![1]);
//! assert!(matcher.matches("baz").is_empty());
//! ```

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
pub mod export;

#[cfg(test)]
mod tests;

use once_cell::unsync::OnceCell;
use std::fmt;

pub use api::{Matcher, Options, compile, compile_with, parse};
pub use engine::{AndPath, CompileStats, MatchMetrics, MatchRun, PathAtom};
pub use error::{CompileError, ConditionError, Operator, SyntaxError};

// --- Condition AST -----------------------------------------------------------

/// A quoted literal: substring containment against the input.
///
/// The text is stored exactly as written (after unescaping). Case-insensitive
/// literals are lowered when the matcher is built, never at parse time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Literal {
    pub text: String,
    pub case_insensitive: bool,
}

impl Literal {
    pub fn new(text: impl Into<String>, case_insensitive: bool) -> Self {
        Literal { text: text.into(), case_insensitive }
    }
}

/// Boolean AST of one condition.
///
/// Nodes are immutable; `normalize` and friends build new trees. Parsed
/// chains are left-grouped, so a tree is as deep as its longest chain;
/// evaluation, rendering and drop walk it with an explicit stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Not(Box<Node>),
    Value(Literal),
}

impl Node {
    pub fn and(left: Node, right: Node) -> Self {
        Node::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Node, right: Node) -> Self {
        Node::Or(Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(sub: Node) -> Self {
        Node::Not(Box::new(sub))
    }

    /// Case-sensitive literal leaf.
    pub fn value(text: impl Into<String>) -> Self {
        Node::Value(Literal::new(text, false))
    }

    /// Case-insensitive literal leaf (`"..."i`).
    pub fn value_ci(text: impl Into<String>) -> Self {
        Node::Value(Literal::new(text, true))
    }

    /// Rewrite into disjunctive normal form: negations only directly above
    /// literals, no `OR` below any `AND`.
    pub fn normalize(&self) -> Node {
        engine::normalize(self)
    }

    /// True if negations sit only directly above literals and no `OR` sits
    /// below an `AND`.
    pub fn is_normalized(&self) -> bool {
        engine::is_normalized(self)
    }

    /// Canonical conjunction terms of a tree already in normal form.
    pub fn and_paths(&self) -> Result<Vec<AndPath<'_>>, ConditionError> {
        engine::and_paths(self)
    }

    /// Every literal leaf, left to right, duplicates included.
    pub fn literals(&self) -> Vec<&Literal> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::And(l, r) | Node::Or(l, r) => {
                    stack.push(r);
                    stack.push(l);
                }
                Node::Not(sub) => stack.push(sub),
                Node::Value(lit) => out.push(lit),
            }
        }
        out
    }

    /// Direct evaluation with Unicode case folding.
    ///
    /// This is the reference semantics the compiled matcher must reproduce.
    pub fn evaluate(&self, input: &str) -> bool {
        self.evaluate_with(input, CaseFolding::default())
    }

    pub fn evaluate_with(&self, input: &str, folding: CaseFolding) -> bool {
        let haystack = Haystack { raw: input, folded: OnceCell::new(), folding };
        self.eval(&haystack)
    }

    fn eval(&self, haystack: &Haystack<'_>) -> bool {
        enum Step<'n> {
            Eval(&'n Node),
            /// Left operand is in `value`; `right` decides only if it did not.
            Then { right: &'n Node, and: bool },
            Negate,
        }

        let mut value = false;
        let mut steps = vec![Step::Eval(self)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Eval(Node::And(l, r)) => {
                    steps.push(Step::Then { right: r, and: true });
                    steps.push(Step::Eval(l));
                }
                Step::Eval(Node::Or(l, r)) => {
                    steps.push(Step::Then { right: r, and: false });
                    steps.push(Step::Eval(l));
                }
                Step::Eval(Node::Not(sub)) => {
                    steps.push(Step::Negate);
                    steps.push(Step::Eval(sub));
                }
                Step::Eval(Node::Value(lit)) => value = haystack.contains(lit),
                Step::Then { right, and } => {
                    if value == and {
                        steps.push(Step::Eval(right));
                    }
                }
                Step::Negate => value = !value,
            }
        }
        value
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut detached = Vec::new();
        detach_children(self, &mut detached);
        while let Some(mut node) = detached.pop() {
            detach_children(&mut node, &mut detached);
        }
    }
}

/// Move compound children out of `node`, leaving empty leaves behind, so
/// that no drop ever recurses more than one level.
fn detach_children(node: &mut Node, out: &mut Vec<Node>) {
    let mut detach = |child: &mut Box<Node>| {
        if !matches!(**child, Node::Value(_)) {
            out.push(std::mem::replace(&mut **child, Node::Value(Literal::default())));
        }
    };
    match node {
        Node::And(l, r) | Node::Or(l, r) => {
            detach(l);
            detach(r);
        }
        Node::Not(sub) => detach(sub),
        Node::Value(_) => {}
    }
}

/// Input plus its lazily lowered copy, shared across one evaluation.
struct Haystack<'a> {
    raw: &'a str,
    folded: OnceCell<String>,
    folding: CaseFolding,
}

impl Haystack<'_> {
    fn folded(&self) -> &str {
        self.folded.get_or_init(|| self.folding.fold(self.raw))
    }

    fn contains(&self, lit: &Literal) -> bool {
        if lit.case_insensitive {
            self.folded().contains(self.folding.fold(&lit.text).as_str())
        } else {
            self.raw.contains(lit.text.as_str())
        }
    }
}

/// Renders condition text that parses back to the same tree.
///
/// Binary operators are always parenthesized so grouping survives the
/// round trip regardless of precedence. A negation directly under another is
/// parenthesized too: `NOT (NOT "a")`.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Piece<'n> {
            Expr(&'n Node),
            Text(&'static str),
        }

        let mut pieces = vec![Piece::Expr(self)];
        while let Some(piece) = pieces.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Expr(Node::And(l, r)) => {
                    f.write_str("(")?;
                    pieces.extend([Piece::Text(")"), Piece::Expr(r), Piece::Text(" AND "), Piece::Expr(l)]);
                }
                Piece::Expr(Node::Or(l, r)) => {
                    f.write_str("(")?;
                    pieces.extend([Piece::Text(")"), Piece::Expr(r), Piece::Text(" OR "), Piece::Expr(l)]);
                }
                Piece::Expr(Node::Not(sub)) => {
                    if matches!(**sub, Node::Not(_)) {
                        f.write_str("NOT (")?;
                        pieces.push(Piece::Text(")"));
                    } else {
                        f.write_str("NOT ")?;
                    }
                    pieces.push(Piece::Expr(sub));
                }
                Piece::Expr(Node::Value(lit)) => write_literal(f, lit)?,
            }
        }
        Ok(())
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, lit: &Literal) -> fmt::Result {
    f.write_str("\"")?;
    for c in lit.text.chars() {
        match c {
            // `\0` followed by digits would lex as an octal escape.
            '\0' => f.write_str("\\u{0}")?,
            '\'' => write!(f, "{c}")?,
            _ => write!(f, "{}", c.escape_debug())?,
        }
    }
    f.write_str(if lit.case_insensitive { "\"i" } else { "\"" })
}

// --- Case folding ------------------------------------------------------------

/// How case-insensitive literals and their inputs are lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaseFolding {
    /// `str::to_lowercase`.
    #[default]
    Unicode,
    /// `str::to_ascii_lowercase`; leaves non-ASCII text untouched.
    Ascii,
}

impl CaseFolding {
    pub fn fold(self, text: &str) -> String {
        match self {
            CaseFolding::Unicode => text.to_lowercase(),
            CaseFolding::Ascii => text.to_ascii_lowercase(),
        }
    }
}
