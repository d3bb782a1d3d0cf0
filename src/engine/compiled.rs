//! Condition compilation and indexing.
//!
//! This module holds the *static* side of the engine: everything derived from
//! the full condition list once, so that matching an input is one automaton
//! pass plus one tree walk.
//!
//! Matching is split into two phases:
//!
//! 1. **Compile** (`CompiledSet::build`): parse every condition, register its
//!    literals, normalize, extract AND-paths, thread them into the shared
//!    `DecisionTree`, then build the `Prefilter` over the final registry.
//! 2. **Run** (`CompiledSet::run`): scan the input into a `PresenceSet`, then
//!    walk the tree with it.
//!
//! ## Literal identity
//!
//! A literal is identified by its text *as written* plus its case class, so
//! `"foo"` and `"foo"i` are two registry entries and two edge families in the
//! tree. The automaton, on the other hand, is built over pattern *texts*: the
//! literal text for case-sensitive entries, the folded text for
//! case-insensitive ones. One pattern can therefore stand for several
//! entries (`"foo"`, `"FOO"i` and `"foo"i` all share the pattern `foo`), and
//! each scan only reports the entries of its own class:
//!
//! ```text
//! raw input      ──scan──> pattern ids ──> case-sensitive entries   ─┐
//! folded input   ──scan──> pattern ids ──> case-insensitive entries ─┴─> PresenceSet
//! ```
//!
//! ## Invariants
//!
//! - `LiteralId` is an index into `LiteralRegistry::literals`, assigned in
//!   first-seen order. Ids never change after they are handed out.
//! - `Prefilter::targets` is indexed by automaton `PatternId`; both are built
//!   together and stay aligned.
//! - A `ScanMask` bit is set iff at least one literal of that class exists.
//!   The scan it guards is skipped otherwise, lowering included.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tracing::{debug, trace};

use super::and_path::{and_paths, is_negative_only};
use super::automaton::Automaton;
use super::decision_tree::{DecisionTree, TreeAtom};
use super::metrics::{CompileStats, MatchMetrics, MatchRun};
use super::normalize::normalize;
use super::parser::parse_condition;
use crate::error::{CompileError, ConditionError};
use crate::{CaseFolding, Literal, Node};

// --- Literal registry --------------------------------------------------------

/// Literal identifier (index into the registry).
pub(crate) type LiteralId = usize;

/// Decision-tree edge key and presence-set element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct EdgeKey {
    pub literal: LiteralId,
    pub case_insensitive: bool,
}

/// Literals confirmed present in one input.
pub(crate) type PresenceSet = HashSet<EdgeKey>;

bitflags::bitflags! {
    /// Which automaton scans a compiled set needs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ScanMask: u8 {
        /// Raw input, for case-sensitive literals.
        const SENSITIVE   = 1 << 0;
        /// Folded input, for case-insensitive literals.
        const INSENSITIVE = 1 << 1;
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct LiteralRegistry {
    ids: HashMap<Literal, LiteralId>,
    literals: Vec<Literal>,
}

impl LiteralRegistry {
    /// Id of `literal`, allocating the next one on first sight.
    pub fn intern(&mut self, literal: &Literal) -> LiteralId {
        if let Some(&id) = self.ids.get(literal) {
            return id;
        }
        let id = self.literals.len();
        self.literals.push(literal.clone());
        self.ids.insert(literal.clone(), id);
        id
    }

    pub fn key(&mut self, literal: &Literal) -> EdgeKey {
        EdgeKey { literal: self.intern(literal), case_insensitive: literal.case_insensitive }
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }
}

// --- Prefilter ---------------------------------------------------------------

/// Turns an input into its [`PresenceSet`].
#[derive(Debug, Clone)]
pub(crate) struct Prefilter {
    /// `None` when no literal was registered.
    automaton: Option<Automaton>,
    /// Registry entries each automaton pattern stands for.
    targets: Vec<Vec<EdgeKey>>,
    scans: ScanMask,
    folding: CaseFolding,
}

impl Prefilter {
    pub fn new(registry: &LiteralRegistry, folding: CaseFolding) -> Self {
        let mut pattern_ids: HashMap<String, usize> = HashMap::new();
        let mut patterns: Vec<String> = Vec::new();
        let mut targets: Vec<Vec<EdgeKey>> = Vec::new();
        let mut scans = ScanMask::empty();

        for (id, literal) in registry.literals().iter().enumerate() {
            let text = if literal.case_insensitive {
                scans |= ScanMask::INSENSITIVE;
                folding.fold(&literal.text)
            } else {
                scans |= ScanMask::SENSITIVE;
                literal.text.clone()
            };

            let pattern = *pattern_ids.entry(text).or_insert_with_key(|text| {
                patterns.push(text.clone());
                targets.push(Vec::new());
                patterns.len() - 1
            });
            targets[pattern].push(EdgeKey { literal: id, case_insensitive: literal.case_insensitive });
        }

        let automaton = if patterns.is_empty() { None } else { Some(Automaton::new(&patterns)) };
        Prefilter { automaton, targets, scans, folding }
    }

    pub fn scans(&self) -> ScanMask {
        self.scans
    }

    pub fn pattern_count(&self) -> usize {
        self.automaton.as_ref().map_or(0, Automaton::pattern_count)
    }

    pub fn state_count(&self) -> usize {
        self.automaton.as_ref().map_or(0, Automaton::state_count)
    }

    /// Every registered literal occurring in `input`, tagged with its class.
    pub fn scan(&self, input: &str) -> PresenceSet {
        let mut present = PresenceSet::new();
        let Some(automaton) = &self.automaton else {
            return present;
        };

        if self.scans.contains(ScanMask::SENSITIVE) {
            automaton.scan(input.as_bytes(), |pattern| {
                present.extend(self.targets[pattern].iter().filter(|key| !key.case_insensitive));
            });
        }

        if self.scans.contains(ScanMask::INSENSITIVE) {
            let folded = self.folding.fold(input);
            automaton.scan(folded.as_bytes(), |pattern| {
                present.extend(self.targets[pattern].iter().filter(|key| key.case_insensitive));
            });
        }

        present
    }
}

// --- Compiled condition set --------------------------------------------------

/// Everything one `compile` call produces. Immutable once built.
#[derive(Debug, Clone)]
pub(crate) struct CompiledSet {
    /// Parsed ASTs by submission index; `None` for empty strings.
    conditions: Vec<Option<Node>>,
    registry: LiteralRegistry,
    tree: DecisionTree,
    prefilter: Prefilter,
    negatives: Vec<usize>,
    stats: CompileStats,
}

impl CompiledSet {
    /// Compile `conditions` in order; the first failure aborts the build.
    #[tracing::instrument(level = "debug", skip_all, fields(folding = ?folding))]
    pub fn build<I, S>(conditions: I, folding: CaseFolding) -> Result<Self, CompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = LiteralRegistry::default();
        let mut tree = DecisionTree::new();
        let mut asts = Vec::new();
        let mut negatives = Vec::new();
        let mut stats = CompileStats::default();

        for (index, text) in conditions.into_iter().enumerate() {
            let text = text.as_ref();
            if text.is_empty() {
                debug!(index, "skipping empty condition");
                asts.push(None);
                stats.empty += 1;
                continue;
            }

            let ast = parse_condition(text)
                .map_err(|err| CompileError { index, cause: ConditionError::from(err) })?;
            for literal in ast.literals() {
                registry.intern(literal);
            }

            let normalized = normalize(&ast);
            let paths = and_paths(&normalized).map_err(|cause| CompileError { index, cause })?;
            for path in &paths {
                let atoms: Vec<TreeAtom> =
                    path.iter().map(|atom| TreeAtom { key: registry.key(atom.literal), negated: atom.negated }).collect();
                tree.insert(&atoms, index);
            }

            let negative_only = !paths.is_empty() && paths.iter().all(|path| is_negative_only(path));
            if negative_only {
                negatives.push(index);
            }

            debug!(index, and_paths = paths.len(), negative_only, "compiled condition");
            stats.and_paths += paths.len();
            asts.push(Some(ast));
        }

        let prefilter = Prefilter::new(&registry, folding);

        stats.conditions = asts.len();
        stats.literals = registry.len();
        stats.patterns = prefilter.pattern_count();
        stats.tree_nodes = tree.node_count();
        stats.automaton_states = prefilter.state_count();
        debug!(
            conditions = stats.conditions,
            literals = stats.literals,
            patterns = stats.patterns,
            and_paths = stats.and_paths,
            tree_nodes = stats.tree_nodes,
            scans = ?prefilter.scans(),
            "compiled condition set"
        );

        Ok(CompiledSet { conditions: asts, registry, tree, prefilter, negatives, stats })
    }

    /// Condition indices satisfied by `input`.
    pub fn matches(&self, input: &str) -> Vec<usize> {
        let present = self.prefilter.scan(input);
        self.tree.walk(&present).conditions
    }

    /// Same as [`CompiledSet::matches`], timed.
    pub fn run(&self, input: &str) -> MatchRun {
        let start = Instant::now();
        let present = self.prefilter.scan(input);
        let scan = start.elapsed();

        let walk_start = Instant::now();
        let walk = self.tree.walk(&present);
        let traversal = walk_start.elapsed();

        trace!(
            present = present.len(),
            nodes_visited = walk.nodes_visited,
            matched = walk.conditions.len(),
            "matched input"
        );

        MatchRun {
            indices: walk.conditions,
            metrics: MatchMetrics {
                total: start.elapsed(),
                scan,
                traversal,
                literals_present: present.len(),
                nodes_visited: walk.nodes_visited,
            },
        }
    }

    pub fn condition(&self, index: usize) -> Option<&Node> {
        self.conditions.get(index)?.as_ref()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn negatives(&self) -> &[usize] {
        &self.negatives
    }

    pub fn literal_count(&self) -> usize {
        self.registry.len()
    }

    pub fn stats(&self) -> &CompileStats {
        &self.stats
    }

    #[cfg(test)]
    pub fn scans(&self) -> ScanMask {
        self.prefilter.scans()
    }
}
