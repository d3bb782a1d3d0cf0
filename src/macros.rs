/// Lazily compiled, process-wide `Regex` for a literal pattern.
///
/// Patterns are string literals checked by the lexer tests, so a failure
/// here is a programming error rather than a runtime condition.
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}
