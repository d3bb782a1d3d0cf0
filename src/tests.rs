//! Crate-level scenarios and properties of the whole pipeline.

use std::collections::HashMap;

use crate::{CaseFolding, Literal, Node, Options, compile, compile_with, parse};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn scenario_matching() {
    // (conditions, [(input, expected indices)])
    let cases: Vec<(Vec<&str>, Vec<(&str, Vec<usize>)>)> = vec![
        (
            vec![r#""foo" OR "bar""#, r#""baz" AND "qux""#],
            vec![("foo", vec![0]), ("baz qux", vec![1]), ("qux baz", vec![1]), ("baz", vec![])],
        ),
        (
            vec![r#"("a" OR "b") AND ("c" OR "d")"#],
            vec![("ac", vec![0]), ("ab", vec![]), ("cd", vec![]), ("abcd", vec![0])],
        ),
        (
            vec![r#""1" AND NOT "2""#, r#""1" AND NOT "2""#],
            vec![("1", vec![0, 1]), ("2", vec![]), ("12", vec![])],
        ),
        (
            vec![r#"NOT "foo" AND NOT "bar""#, r#"NOT ("foo" AND "bar" AND "baz")"#, r#""foo" OR NOT "baz""#],
            vec![("foo bar baz", vec![2]), ("qux", vec![0, 1, 2])],
        ),
        (vec![r#""FOO"i AND "bar""#], vec![("foo bar", vec![0]), ("FoO BaR", vec![])]),
        (
            vec!["", r#""x""#, "", r#"NOT "x""#],
            vec![("x", vec![1]), ("", vec![3]), ("y", vec![3])],
        ),
        (
            vec![r#""foo" AND "foo"i"#, r#""foo"i AND NOT "foo""#],
            vec![("foo", vec![0]), ("FOO", vec![1]), ("Foo foo", vec![0]), ("bar", vec![])],
        ),
        (
            vec![r#""straße"i"#, r#""ÄRGER"i"#],
            vec![("STRAßE", vec![0]), ("ärger", vec![1]), ("Ärger", vec![1]), ("arger", vec![])],
        ),
    ];

    for (conditions, inputs) in cases {
        let matcher = compile(&conditions).unwrap();
        for (input, expected) in inputs {
            assert_eq!(matcher.matches(input), expected, "conditions {conditions:?}, input {input:?}");
        }
    }
}

#[test]
fn scenario_negatives() {
    let matcher = compile([
        r#"NOT "foo" AND NOT "bar""#,
        r#"NOT ("foo" AND "bar" AND "baz")"#,
        r#""foo" OR NOT "baz""#,
        "",
    ])
    .unwrap();
    assert_eq!(matcher.negatives(), &[0, 1]);
}

#[test]
fn keywords_and_layout_do_not_matter() {
    let loose = compile(["(\"a\"or\"b\")\nand\tnot(\"c\")"]).unwrap();
    let tidy = compile([r#"("a" OR "b") AND NOT "c""#]).unwrap();
    assert_eq!(loose.condition(0), tidy.condition(0));
    for input in ["a", "bc", "", "ab"] {
        assert_eq!(loose.matches(input), tidy.matches(input));
    }
}

#[test]
fn rendering_parses_back() {
    let cases = [
        r#""a""#,
        r#""Ab"i"#,
        r#"NOT (NOT "a")"#,
        r#""\u{0}12" AND NOT (NOT (NOT "b"))"#,
        r#""\012\U0001F600\x07""#,
        r#""a" OR "b" AND NOT ("c" OR "d"i)"#,
        r#""quote \" and \\ backslash" AND "tab\t""#,
        r#""é\u{1F600}" OR """#,
    ];
    for text in cases {
        let node = parse(text).unwrap();
        assert_eq!(parse(&node.to_string()), Ok(node.clone()), "rendered {node}");
    }
}

#[test]
fn direct_evaluation_and_literal_listing() {
    let node = parse(r#""Err"i AND NOT ("ok" OR "done")"#).unwrap();
    assert!(node.evaluate("an ERROR here"));
    assert!(!node.evaluate("err ok"));
    assert!(!node.evaluate("warning"));

    let texts: Vec<(&str, bool)> = node.literals().iter().map(|l| (l.text.as_str(), l.case_insensitive)).collect();
    assert_eq!(texts, vec![("Err", true), ("ok", false), ("done", false)]);
}

#[test]
fn case_folding_modes() {
    assert_eq!(CaseFolding::Unicode.fold("ÄB"), "äb");
    assert_eq!(CaseFolding::Ascii.fold("ÄB"), "Äb");
    assert_eq!(CaseFolding::default(), CaseFolding::Unicode);

    let node = Node::value_ci("ÄB");
    assert!(node.evaluate("xäbx"));
    assert!(!node.evaluate_with("xäbx", CaseFolding::Ascii));
}

#[test]
fn display_is_fully_parenthesized() {
    let node = Node::or(Node::and(Node::not(Node::value("a")), Node::value_ci("b\"")), Node::value("c"));
    assert_eq!(node.to_string(), r#"((NOT "a" AND "b\""i) OR "c")"#);
    assert_eq!(Node::not(Node::not(Node::value("a"))).to_string(), r#"NOT (NOT "a")"#);
}

#[test]
fn nul_renders_unambiguously() {
    let node = Node::value("\u{0}12");
    assert_eq!(node.to_string(), r#""\u{0}12""#);
    assert_eq!(parse(&node.to_string()), Ok(node));
}

#[test]
fn long_or_chain_compiles_and_matches() {
    let n = 100_000;
    let condition = (0..n).map(|i| format!("\"ioc{i}\"")).collect::<Vec<_>>().join(" OR ");
    let matcher = compile([condition.as_str()]).unwrap();

    assert_eq!(matcher.literal_count(), n);
    assert_eq!(matcher.matches("xx ioc7 yy"), vec![0]);
    assert_eq!(matcher.matches("xx ioc99999"), vec![0]);
    assert!(matcher.matches("nothing here").is_empty());
    assert_eq!(matcher.evaluate(0, "xx ioc99999"), Some(true));
    assert_eq!(matcher.evaluate(0, "nothing here"), Some(false));

    let rendered = matcher.condition(0).unwrap().to_string();
    assert!(rendered.starts_with(&"(".repeat(n - 1)));
    assert!(rendered.ends_with(r#" OR "ioc99999")"#));
}

#[test]
fn long_and_chain_compiles_and_matches() {
    let n = 20_000;
    let texts: Vec<String> = (0..n).map(|i| format!("w{i}.")).collect();
    let condition = texts.iter().map(|t| format!("\"{t}\"")).collect::<Vec<_>>().join(" AND NOT ");
    let matcher = compile([condition.as_str()]).unwrap();

    // The first literal is positive, the rest negated.
    assert_eq!(matcher.matches("w0."), vec![0]);
    assert!(matcher.matches("w0. w19999.").is_empty());
    assert!(matcher.matches("w1.").is_empty());

    let node = parse(&condition).unwrap();
    assert!(node.is_normalized());
    assert!(node.evaluate("w0. w7"));
    assert_eq!(node.and_paths().unwrap().len(), 1);
}

// -- Strategies --

/// Literal leaves over a small alphabet so that generated conditions share
/// literals and inputs actually contain them.
fn literal_leaf(texts: &'static [&'static str]) -> impl Strategy<Value = Node> {
    (prop::sample::select(texts), any::<bool>()).prop_map(|(text, ci)| Node::Value(Literal::new(text, ci)))
}

fn expr(texts: &'static [&'static str]) -> impl Strategy<Value = Node> {
    literal_leaf(texts).prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Node::and(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Node::or(l, r)),
            inner.prop_map(Node::not),
        ]
    })
}

const MATCH_TEXTS: &[&str] = &["a", "b", "ab", "B", "ba", ""];
const TRUTH_TEXTS: &[&str] = &["a", "b", "c"];
const RENDER_TEXTS: &[&str] = &["a", "x y", "q\"t", "back\\slash", "é", "\t", "NOT", "\u{0}7", "it's"];

// -- Helpers --

/// Evaluate under an explicit truth assignment instead of an input string.
fn eval_assigned(node: &Node, truth: &HashMap<Literal, bool>) -> bool {
    match node {
        Node::And(l, r) => eval_assigned(l, truth) && eval_assigned(r, truth),
        Node::Or(l, r) => eval_assigned(l, truth) || eval_assigned(r, truth),
        Node::Not(sub) => !eval_assigned(sub, truth),
        Node::Value(lit) => truth[lit],
    }
}

/// Swap the operands of every `AND`.
fn mirror_and(node: &Node) -> Node {
    match node {
        Node::And(l, r) => Node::and(mirror_and(r), mirror_and(l)),
        Node::Or(l, r) => Node::or(mirror_and(l), mirror_and(r)),
        Node::Not(sub) => Node::not(mirror_and(sub)),
        Node::Value(_) => node.clone(),
    }
}

/// Paths as owned `(negated, text, ci)` tuples, in sorted, deduplicated order.
fn path_set(node: &Node) -> Vec<Vec<(bool, String, bool)>> {
    let mut paths: Vec<Vec<(bool, String, bool)>> = node
        .normalize()
        .and_paths()
        .unwrap()
        .iter()
        .map(|path| path.iter().map(|a| (a.negated, a.literal.text.clone(), a.literal.case_insensitive)).collect())
        .collect();
    paths.sort();
    paths.dedup();
    paths
}

// -- Property Tests --

proptest! {
    #[test]
    fn prop_normalize_is_idempotent(node in expr(MATCH_TEXTS)) {
        let once = node.normalize();
        prop_assert!(once.is_normalized(), "not normal: {}", once);
        prop_assert_eq!(once.normalize(), once);
    }

    #[test]
    fn prop_normal_form_is_equivalent(node in expr(TRUTH_TEXTS)) {
        let normal = node.normalize();

        let mut literals: Vec<Literal> = node.literals().into_iter().cloned().collect();
        literals.sort_by(|a, b| (&a.text, a.case_insensitive).cmp(&(&b.text, b.case_insensitive)));
        literals.dedup();
        prop_assert!(literals.len() <= 6);

        for bits in 0u32..(1 << literals.len()) {
            let truth: HashMap<Literal, bool> =
                literals.iter().enumerate().map(|(i, lit)| (lit.clone(), bits & (1 << i) != 0)).collect();
            prop_assert_eq!(eval_assigned(&node, &truth), eval_assigned(&normal, &truth), "assignment {:b}", bits);
        }
    }

    #[test]
    fn prop_canonical_paths_ignore_operand_order(node in expr(MATCH_TEXTS)) {
        prop_assert_eq!(path_set(&node), path_set(&mirror_and(&node)));
    }

    #[test]
    fn prop_rendering_round_trips(node in expr(RENDER_TEXTS)) {
        let text = node.to_string();
        prop_assert_eq!(parse(&text), Ok(node), "rendered {}", text);
    }

    #[test]
    fn prop_compiled_matches_direct_evaluation(
        nodes in prop::collection::vec(expr(MATCH_TEXTS), 1..6),
        inputs in prop::collection::vec("[abAB .]{0,8}", 1..8),
        ascii in any::<bool>(),
    ) {
        let folding = if ascii { CaseFolding::Ascii } else { CaseFolding::Unicode };
        let texts: Vec<String> = nodes.iter().map(Node::to_string).collect();
        let matcher = compile_with(&texts, &Options { case_folding: folding }).unwrap();

        for input in &inputs {
            let expected: Vec<usize> =
                nodes.iter().enumerate().filter(|(_, n)| n.evaluate_with(input, folding)).map(|(i, _)| i).collect();
            prop_assert_eq!(matcher.matches(input), expected.clone(), "input {:?}", input);
            prop_assert_eq!(matcher.match_with_metrics(input).indices, expected, "input {:?}", input);
        }
    }
}
