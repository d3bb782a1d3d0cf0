//! Disjunctive normal form.
//!
//! The result is an OR-tree whose leaves are conjunctions of literals or
//! negated literals:
//!
//! ```text
//! NOT ("a" AND ("b" OR "c"))
//!   -> OR(NOT "a", AND(NOT "b", NOT "c"))
//! ```
//!
//! Rewrites, applied with an explicit work stack so that long chains cost no
//! call depth:
//!
//! ```text
//! NOT(AND(a, b))  -> OR(NOT a, NOT b)
//! NOT(OR(a, b))   -> AND(NOT a, NOT b)
//! NOT(NOT a)      -> a
//! AND(OR(x, y), b) -> OR(AND(x, b), AND(y, b))     left operand's terms first
//! AND(a, OR(x, y)) -> OR(AND(a, x), AND(a, y))
//! ```
//!
//! The output is rebuilt left-grouped, the way the parser groups chains:
//! terms joined by `OR`, atoms inside a term joined by `AND`, both in operand
//! order. Normalizing that output again yields it unchanged.
//!
//! Expansion is exponential in the worst case (the product of OR-branch
//! counts along an AND chain). Nothing here caps it.

use super::and_path::{PathAtom, expand};
use crate::Node;

/// Rewrite `node` into disjunctive normal form.
pub fn normalize(node: &Node) -> Node {
    let terms = expand(node).terms.into_iter().filter_map(|term| term.into_iter().map(atom).reduce(Node::and));
    terms.reduce(Node::or).unwrap_or_else(|| node.clone())
}

fn atom(atom: PathAtom<'_>) -> Node {
    let value = Node::Value(atom.literal.clone());
    if atom.negated { Node::not(value) } else { value }
}

/// True if `node` is already in the shape `normalize` produces.
pub fn is_normalized(node: &Node) -> bool {
    // (node, inside an AND)
    let mut stack = vec![(node, false)];
    while let Some((node, in_and)) = stack.pop() {
        match node {
            Node::Value(_) => {}
            Node::Not(sub) if matches!(**sub, Node::Value(_)) => {}
            Node::Not(_) => return false,
            Node::Or(..) if in_and => return false,
            Node::Or(l, r) => {
                stack.push((r, false));
                stack.push((l, false));
            }
            Node::And(l, r) => {
                stack.push((r, true));
                stack.push((l, true));
            }
        }
    }
    true
}
