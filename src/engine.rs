//! Compilation and matching engine.
//!
//! The engine is split into focused submodules under `src/engine/`; this file
//! only wires them together and re-exports what the facade needs.
//!
//! ## How the parts work together
//!
//! Compiling a condition set is a pipeline run once per condition, followed by
//! one prefilter build over every literal seen:
//!
//! ```text
//! condition text
//!     │  tokenize                      (lexer.rs)
//!     │  parse                         (parser.rs)
//!     v
//! Node (AST) ───────────── kept for `Matcher::condition` / direct evaluation
//!     │  normalize → DNF               (normalize.rs)
//!     │  and_paths → canonical terms   (and_path.rs)
//!     v
//! DecisionTree::insert                 (decision_tree.rs)
//!
//! all literals ── LiteralRegistry ── Prefilter / Automaton    (compiled.rs, automaton.rs)
//! ```
//!
//! Matching an input never touches the ASTs:
//!
//! ```text
//! input ── Prefilter::scan ──> PresenceSet ── DecisionTree::walk ──> [condition index]
//!          (raw + folded scans)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `lexer.rs`: regex-table tokenizer, escape handling, character offsets.
//! - `parser.rs`: recursive descent with `NOT > AND > OR` binding.
//! - `normalize.rs`: De Morgan, double negation and distribution into DNF.
//! - `and_path.rs`: DNF to canonically ordered conjunctions.
//! - `decision_tree.rs`: shared prefix tree with positive/negative edges.
//! - `automaton.rs`: Aho-Corasick over byte patterns.
//! - `compiled.rs`: literal registry, prefilter, and the `CompiledSet` that
//!   ties the pipeline together.
//! - `metrics.rs`: optional timing data for runs and compile statistics.
//!
//! ## Debugging
//!
//! Every stage logs through `tracing`: compile summaries at `debug`, per-match
//! presence and traversal counts at `trace`.

#[path = "engine/and_path.rs"]
mod and_path;
#[path = "engine/automaton.rs"]
mod automaton;
#[path = "engine/compiled.rs"]
mod compiled;
#[path = "engine/decision_tree.rs"]
mod decision_tree;
#[path = "engine/lexer.rs"]
mod lexer;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/normalize.rs"]
mod normalize;
#[path = "engine/parser.rs"]
mod parser;

pub use and_path::{AndPath, PathAtom, and_paths};
pub(crate) use compiled::CompiledSet;
pub use metrics::{CompileStats, MatchMetrics, MatchRun};
pub use normalize::{is_normalized, normalize};
pub(crate) use parser::parse_condition;
