//! Shared decision tree over canonical AND-paths.
//!
//! Every AND-path of every condition is threaded from the root, one edge per
//! atom. Paths with a common canonical prefix share nodes, so a literal that
//! starts many conjunctions is tested once:
//!
//! ```text
//! #0: "a" AND "b"        (root)
//! #1: "a" AND NOT "c"      +a ─> [ ] ─ +b ─> [#0]
//! #2: NOT "c"                    └── -c ─> [#1]
//!                          -c ─> [#2]
//! ```
//!
//! Evaluation gets the set of literals present in the input and walks every
//! edge whose atom holds: a positive edge when its literal is present, a
//! negative edge when it is absent. Outputs on every node reached are
//! collected.
//!
//! Nodes live in an arena (`Vec<TreeNode>`) addressed by `NodeId`; the tree
//! only grows while compiling and is read-only afterwards.

use std::collections::HashMap;

use super::compiled::{EdgeKey, PresenceSet};

pub(crate) type NodeId = usize;

const ROOT: NodeId = 0;

/// One atom of an AND-path, resolved to its registry id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TreeAtom {
    pub key: EdgeKey,
    pub negated: bool,
}

#[derive(Debug, Default, Clone)]
struct TreeNode {
    positive: HashMap<EdgeKey, NodeId>,
    negative: HashMap<EdgeKey, NodeId>,
    /// Condition indices whose AND-path ends here, ascending.
    outputs: Vec<usize>,
}

/// Result of one tree walk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Walk {
    /// Sorted, duplicate-free condition indices.
    pub conditions: Vec<usize>,
    pub nodes_visited: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    pub fn new() -> Self {
        DecisionTree { nodes: vec![TreeNode::default()] }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Thread `path` from the root and record `condition` at its end.
    ///
    /// Conditions must be inserted in ascending index order.
    pub fn insert(&mut self, path: &[TreeAtom], condition: usize) {
        let mut current = ROOT;
        for atom in path {
            let node = &self.nodes[current];
            let edges = if atom.negated { &node.negative } else { &node.positive };
            current = match edges.get(&atom.key).copied() {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TreeNode::default());
                    let node = &mut self.nodes[current];
                    let edges = if atom.negated { &mut node.negative } else { &mut node.positive };
                    edges.insert(atom.key, child);
                    child
                }
            };
        }

        // Two paths of one condition ending on the same node.
        let outputs = &mut self.nodes[current].outputs;
        if outputs.last() != Some(&condition) {
            outputs.push(condition);
        }
    }

    /// Collect every condition whose AND-path holds for `present`.
    pub fn walk(&self, present: &PresenceSet) -> Walk {
        let mut found: Vec<usize> = Vec::new();
        let mut visited = 0;
        let mut stack = vec![ROOT];

        while let Some(id) = stack.pop() {
            visited += 1;
            let node = &self.nodes[id];
            found.extend_from_slice(&node.outputs);

            // Probe from whichever side is smaller.
            if present.len() < node.positive.len() {
                stack.extend(present.iter().filter_map(|key| node.positive.get(key).copied()));
            } else {
                stack.extend(node.positive.iter().filter(|(key, _)| present.contains(key)).map(|(_, &child)| child));
            }
            stack.extend(node.negative.iter().filter(|(key, _)| !present.contains(key)).map(|(_, &child)| child));
        }

        found.sort_unstable();
        found.dedup();
        Walk { conditions: found, nodes_visited: visited }
    }

    #[cfg(test)]
    pub(crate) fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.positive.len() + n.negative.len()).sum()
    }
}
