use crate::engine::{self, CompileStats, MatchRun};
use crate::error::{CompileError, SyntaxError};
use crate::{CaseFolding, Node};

/// Options that affect compilation and matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Lowering applied to case-insensitive literals and to the input they
    /// are compared against.
    pub case_folding: CaseFolding,
}

/// A compiled, immutable condition set.
///
/// Matching takes `&self` and allocates only per call, so one `Matcher` can
/// be shared across threads (for example behind an `Arc`).
#[derive(Debug, Clone)]
pub struct Matcher {
    compiled: engine::CompiledSet,
    options: Options,
}

/// Compile `conditions` with default [`Options`].
///
/// Condition indices are submission positions. Empty strings are kept as
/// conditions that never match.
///
/// # Example
/// ```
/// let matcher = boolsieve::compile(["\"FOO\"i AND \"bar\"", "", "NOT \"bar\""]).unwrap();
///
/// assert_eq!(matcher.len(), 3);
/// assert_eq!(matcher.matches("foo bar"), vec![0]);
/// assert_eq!(matcher.matches("FoO BaR"), vec![2]);
/// ```
pub fn compile<I, S>(conditions: I) -> Result<Matcher, CompileError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    compile_with(conditions, &Options::default())
}

/// Compile `conditions` with explicit `options`.
///
/// Stops at the first condition that fails; no partial matcher is returned.
pub fn compile_with<I, S>(conditions: I, options: &Options) -> Result<Matcher, CompileError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let compiled = engine::CompiledSet::build(conditions, options.case_folding)?;
    Ok(Matcher { compiled, options: *options })
}

/// Parse a single condition into its AST without compiling it.
///
/// ```
/// use boolsieve::{Node, parse};
///
/// let ast = parse("\"a\" OR \"b\" AND NOT \"c\"").unwrap();
/// assert_eq!(ast, Node::or(Node::value("a"), Node::and(Node::value("b"), Node::not(Node::value("c")))));
/// ```
pub fn parse(text: &str) -> Result<Node, SyntaxError> {
    engine::parse_condition(text)
}

impl Matcher {
    /// Ascending, duplicate-free indices of the conditions `input` satisfies.
    pub fn matches(&self, input: &str) -> Vec<usize> {
        self.compiled.matches(input)
    }

    /// Like [`Matcher::matches`], with timings and traversal counts.
    pub fn match_with_metrics(&self, input: &str) -> MatchRun {
        self.compiled.run(input)
    }

    /// Ascending indices of conditions with no positive literal on any
    /// AND-path. Their tree nodes are visited on every match.
    pub fn negatives(&self) -> &[usize] {
        self.compiled.negatives()
    }

    /// The AST of condition `index` as parsed (before normalization).
    ///
    /// `None` for empty conditions and out-of-range indices.
    pub fn condition(&self, index: usize) -> Option<&Node> {
        self.compiled.condition(index)
    }

    /// Evaluate condition `index` directly against `input`, bypassing the
    /// compiled structures.
    pub fn evaluate(&self, index: usize, input: &str) -> Option<bool> {
        self.condition(index).map(|node| node.evaluate_with(input, self.options.case_folding))
    }

    /// Number of submitted conditions, empty ones included.
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct `(text, case class)` literals across all conditions.
    pub fn literal_count(&self) -> usize {
        self.compiled.literal_count()
    }

    pub fn stats(&self) -> &CompileStats {
        self.compiled.stats()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConditionError;
    use pretty_assertions::assert_eq;

    #[test]
    fn compile_accepts_owned_and_borrowed_strings() {
        let owned = vec![String::from("\"a\""), String::from("\"b\"")];
        let borrowed = ["\"a\"", "\"b\""];
        assert_eq!(compile(&owned).unwrap().matches("ab"), vec![0, 1]);
        assert_eq!(compile(borrowed).unwrap().matches("b"), vec![1]);
    }

    #[test]
    fn empty_condition_list() {
        let matcher = compile(Vec::<String>::new()).unwrap();
        assert!(matcher.is_empty());
        assert_eq!(matcher.literal_count(), 0);
        assert!(matcher.matches("anything").is_empty());
        assert!(matcher.negatives().is_empty());
    }

    #[test]
    fn compile_error_carries_index_and_offset() {
        let err = compile(["\"ok\"", "\"a\" OR (\"b\""]).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.cause, ConditionError::Syntax(SyntaxError::UnmatchedParen { offset: 8 }));
        assert_eq!(err.to_string(), "condition 1: unmatched parenthesis at position 8");
    }

    #[test]
    fn condition_and_evaluate_accessors() {
        let matcher = compile(["\"x\" AND NOT \"y\"", ""]).unwrap();
        assert_eq!(matcher.condition(0), Some(&Node::and(Node::value("x"), Node::not(Node::value("y")))));
        assert_eq!(matcher.condition(1), None);
        assert_eq!(matcher.condition(7), None);

        assert_eq!(matcher.evaluate(0, "x"), Some(true));
        assert_eq!(matcher.evaluate(0, "xy"), Some(false));
        assert_eq!(matcher.evaluate(1, "x"), None);
    }

    #[test]
    fn match_with_metrics_agrees_with_matches() {
        let matcher = compile(["\"a\" OR \"b\"", "NOT \"c\"", "\"a\" AND \"c\""]).unwrap();
        for input in ["", "a", "c", "ac", "bc"] {
            let run = matcher.match_with_metrics(input);
            assert_eq!(run.indices, matcher.matches(input), "input {input:?}");
            assert!(run.metrics.nodes_visited >= 1);
        }
    }

    #[test]
    fn ascii_folding_option() {
        let options = Options { case_folding: CaseFolding::Ascii };
        let matcher = compile_with(["\"STRASSE\"i", "\"ÜBER\"i"], &options).unwrap();
        assert_eq!(matcher.options().case_folding, CaseFolding::Ascii);
        assert_eq!(matcher.matches("strasse"), vec![0]);
        // ASCII lowering keeps `Ü` as is.
        assert!(matcher.matches("über").is_empty());
        assert_eq!(matcher.matches("Über"), vec![1]);

        let unicode = compile(["\"ÜBER\"i"]).unwrap();
        assert_eq!(unicode.matches("über"), vec![0]);
    }

    #[test]
    fn matcher_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Matcher>();

        let matcher = std::sync::Arc::new(compile(["\"needle\"", "NOT \"needle\""]).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let matcher = std::sync::Arc::clone(&matcher);
                std::thread::spawn(move || {
                    let input = if i % 2 == 0 { "hay needle hay" } else { "hay" };
                    matcher.matches(input)
                })
            })
            .collect();
        let results: Vec<Vec<usize>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![vec![0], vec![1], vec![0], vec![1]]);
    }
}
