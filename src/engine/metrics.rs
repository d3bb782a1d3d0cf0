//! Match metrics and compile statistics.
//!
//! `Matcher::matches` is the hot path and collects nothing.
//! `Matcher::match_with_metrics` returns the same indices plus a
//! [`MatchMetrics`] for profiling; [`CompileStats`] describes the shape of a
//! compiled set and is fixed once `compile` returns.

use std::time::Duration;

// --- Metrics -----------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MatchMetrics {
    /// Total elapsed time for the match.
    pub total: Duration,
    /// Automaton scans, including lowering the input.
    pub scan: Duration,
    /// Decision-tree walk.
    pub traversal: Duration,
    /// Distinct `(literal, case class)` atoms found in the input.
    pub literals_present: usize,
    /// Decision-tree nodes reached, root included.
    pub nodes_visited: usize,
}

/// Match output bundled with timing information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRun {
    /// Ascending, duplicate-free condition indices.
    pub indices: Vec<usize>,
    pub metrics: MatchMetrics,
}

/// Size of a compiled condition set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompileStats {
    /// Submitted conditions, empty ones included.
    pub conditions: usize,
    /// Empty condition strings (never match).
    pub empty: usize,
    /// Registry entries: distinct `(text, case class)` literals.
    pub literals: usize,
    /// Distinct automaton patterns after lowering case-insensitive literals.
    pub patterns: usize,
    /// AND-paths inserted into the decision tree, across all conditions.
    pub and_paths: usize,
    pub tree_nodes: usize,
    pub automaton_states: usize,
}
