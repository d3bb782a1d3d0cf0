//! Export conditions as a document-search boolean query.
//!
//! Works on the parsed ASTs, not on the compiled structures, so the output
//! follows the conditions as written:
//!
//! ```text
//! ("foo" OR "bar") AND NOT "baz"
//!
//! {"bool": {"must": [
//!     {"bool": {"should": [<foo>, <bar>]}},
//!     {"bool": {"must_not": [<baz>]}}
//! ]}}
//! ```
//!
//! `AND`/`OR` chains of any depth become one n-ary `must`/`should` list, and
//! stacked `NOT`s cancel in pairs. Each `<leaf>` is either a `wildcard` query
//! (`*text*`, substring semantics) or a `match_phrase` query.

use serde_json::{Map, Value, json};

use crate::{Literal, Matcher, Node};

/// How literal leaves are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LeafStyle {
    /// `{"wildcard": {field: {"value": "*text*", "case_insensitive": ..}}}`
    #[default]
    Wildcard,
    /// `{"match_phrase": {field: "text"}}`; case sensitivity is left to the
    /// field's analyzer.
    MatchPhrase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Document field every leaf queries.
    pub field: String,
    pub leaf: LeafStyle,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions { field: "raw".to_string(), leaf: LeafStyle::Wildcard }
    }
}

/// One query matching a document if any non-empty condition of `matcher`
/// would. A matcher without such conditions exports `{}`.
pub fn to_query(matcher: &Matcher, options: &ExportOptions) -> Value {
    let mut clauses = Vec::new();
    for node in (0..matcher.len()).filter_map(|index| matcher.condition(index)) {
        clauses.extend(flatten(node, Chain::Or).into_iter().map(|branch| node_to_query(branch, options)));
    }

    match clauses.len() {
        0 => Value::Object(Map::new()),
        1 => clauses.remove(0),
        _ => json!({ "bool": { "should": clauses } }),
    }
}

/// Query for a single AST.
pub fn node_to_query(node: &Node, options: &ExportOptions) -> Value {
    match node {
        Node::Value(literal) => leaf(literal, options),
        Node::And(..) => {
            let must: Vec<Value> = flatten(node, Chain::And).into_iter().map(|n| node_to_query(n, options)).collect();
            json!({ "bool": { "must": must } })
        }
        Node::Or(..) => {
            let should: Vec<Value> = flatten(node, Chain::Or).into_iter().map(|n| node_to_query(n, options)).collect();
            json!({ "bool": { "should": should } })
        }
        Node::Not(sub) => {
            let mut inner: &Node = sub;
            let mut negated = true;
            while let Node::Not(next) = inner {
                inner = next;
                negated = !negated;
            }
            let query = node_to_query(inner, options);
            if negated { json!({ "bool": { "must_not": [query] } }) } else { query }
        }
    }
}

#[derive(Clone, Copy)]
enum Chain {
    And,
    Or,
}

/// Operands of the `chain` rooted at `node`, left to right, however they are
/// grouped.
fn flatten(node: &Node, chain: Chain) -> Vec<&Node> {
    let mut operands = Vec::new();
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        match (node, chain) {
            (Node::And(l, r), Chain::And) | (Node::Or(l, r), Chain::Or) => {
                stack.push(r);
                stack.push(l);
            }
            (other, _) => operands.push(other),
        }
    }
    operands
}

fn leaf(literal: &Literal, options: &ExportOptions) -> Value {
    let (kind, body) = match options.leaf {
        LeafStyle::Wildcard => (
            "wildcard",
            json!({
                "value": format!("*{}*", escape_wildcard(&literal.text)),
                "case_insensitive": literal.case_insensitive,
            }),
        ),
        LeafStyle::MatchPhrase => ("match_phrase", Value::String(literal.text.clone())),
    };

    let mut field = Map::new();
    field.insert(options.field.clone(), body);
    let mut query = Map::new();
    query.insert(kind.to_string(), Value::Object(field));
    Value::Object(query)
}

/// Escape the wildcard metacharacters `\`, `*` and `?`.
fn escape_wildcard(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '?') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
