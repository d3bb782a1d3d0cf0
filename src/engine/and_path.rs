//! AND-path extraction.
//!
//! Flattens a normalized tree into its conjunction terms. Each term is put in
//! canonical order so that logically identical conjunctions produce identical
//! paths (and therefore share decision-tree edges):
//!
//! ```text
//! OR(AND(NOT "z", "b"), AND("a", "b"))
//!   -> [ ["b", NOT "z"], ["a", "b"] ]
//!
//! canonical order: positive atoms by text, then negated atoms by text
//! ```

use crate::error::ConditionError;
use crate::{Literal, Node};

/// One signed literal inside an AND-path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathAtom<'a> {
    pub literal: &'a Literal,
    pub negated: bool,
}

/// A conjunction of atoms in canonical order.
pub type AndPath<'a> = Vec<PathAtom<'a>>;

/// Extract the canonical AND-paths of `node`.
///
/// `AND` takes the cartesian product of its operands' paths and `OR`
/// concatenates them. The product rule applies at any depth, so a tree with
/// an `OR` still below an `AND` is handled too. A negation above anything but
/// a literal is rejected.
pub fn and_paths(node: &Node) -> Result<Vec<AndPath<'_>>, ConditionError> {
    let Expansion { mut terms, pushed_negation } = expand(node);
    if pushed_negation {
        return Err(ConditionError::NotNormalized);
    }
    for path in &mut terms {
        canonicalize(path);
    }
    Ok(terms)
}

/// True when a path has no positive atom; such paths hang off the root's
/// negative edges and are visited on every match.
pub fn is_negative_only(path: &[PathAtom<'_>]) -> bool {
    path.iter().all(|atom| atom.negated)
}

// --- Expansion ---------------------------------------------------------------

/// Conjunction terms of a tree, in operand order, not yet canonical.
pub(crate) struct Expansion<'a> {
    pub terms: Vec<AndPath<'a>>,
    /// A `NOT` sat above something other than a literal and was pushed down.
    pub pushed_negation: bool,
}

enum Frame<'a> {
    Visit { node: &'a Node, positive: bool },
    /// Pop two operand expansions and join them.
    Join { product: bool },
}

/// Expand `node` into conjunction terms, pushing negations down to the
/// literals (De Morgan, double negation) on the way.
///
/// Uses an explicit work stack: parsed chains are as deep as they are long.
pub(crate) fn expand(node: &Node) -> Expansion<'_> {
    let mut pushed_negation = false;
    let mut work = vec![Frame::Visit { node, positive: true }];
    let mut done: Vec<Vec<AndPath<'_>>> = Vec::new();

    while let Some(frame) = work.pop() {
        match frame {
            Frame::Visit { node: Node::Value(literal), positive } => {
                done.push(vec![vec![PathAtom { literal, negated: !positive }]]);
            }
            Frame::Visit { node: Node::Not(sub), positive } => {
                pushed_negation |= !matches!(**sub, Node::Value(_));
                work.push(Frame::Visit { node: sub, positive: !positive });
            }
            // Under a negation AND becomes OR and vice versa.
            Frame::Visit { node: Node::And(l, r), positive } => {
                work.push(Frame::Join { product: positive });
                work.push(Frame::Visit { node: r, positive });
                work.push(Frame::Visit { node: l, positive });
            }
            Frame::Visit { node: Node::Or(l, r), positive } => {
                work.push(Frame::Join { product: !positive });
                work.push(Frame::Visit { node: r, positive });
                work.push(Frame::Visit { node: l, positive });
            }
            Frame::Join { product } => {
                let (Some(right), Some(left)) = (done.pop(), done.pop()) else {
                    unreachable!("both operands are expanded before their join");
                };
                done.push(if product { multiply(left, right) } else { concat(left, right) });
            }
        }
    }

    let terms = done.pop().unwrap_or_default();
    Expansion { terms, pushed_negation }
}

fn concat<'a>(mut left: Vec<AndPath<'a>>, right: Vec<AndPath<'a>>) -> Vec<AndPath<'a>> {
    left.extend(right);
    left
}

fn multiply<'a>(mut left: Vec<AndPath<'a>>, right: Vec<AndPath<'a>>) -> Vec<AndPath<'a>> {
    // A plain AND chain keeps one term; grow it in place.
    if let [single] = right.as_slice() {
        for path in &mut left {
            path.extend_from_slice(single);
        }
        return left;
    }
    let mut paths = Vec::with_capacity(left.len() * right.len());
    for lp in &left {
        for rp in &right {
            let mut path = Vec::with_capacity(lp.len() + rp.len());
            path.extend_from_slice(lp);
            path.extend_from_slice(rp);
            paths.push(path);
        }
    }
    paths
}

fn canonicalize(path: &mut AndPath<'_>) {
    path.sort_by(|a, b| {
        a.negated
            .cmp(&b.negated)
            .then_with(|| a.literal.text.cmp(&b.literal.text))
            .then_with(|| a.literal.case_insensitive.cmp(&b.literal.case_insensitive))
    });
    // `"a" AND "a"` is just `"a"`.
    path.dedup();
}
