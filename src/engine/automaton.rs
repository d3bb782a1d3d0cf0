//! Multi-pattern substring detection (Aho-Corasick).
//!
//! A trie over every pattern, plus a failure link per state pointing at the
//! longest proper suffix of that state's path which is also a trie prefix.
//! Scanning walks the input once; on a mismatch it follows failure links
//! instead of re-reading bytes, so a scan costs O(input + reported matches)
//! no matter how many patterns there are.
//!
//! ```text
//! patterns: he, she, his, hers
//!
//!   (root) -h-> [h] -e-> [he]* -r-> [her] -s-> [hers]*
//!      |         `-i-> [hi] -s-> [his]*
//!      `-s-> [s] -h-> [sh] -e-> [she]*   fail(she) = he
//! ```
//!
//! Each state's output list already includes the outputs reachable through
//! its failure chain, so reporting a position is a single slice walk.
//!
//! The automaton works on bytes. For UTF-8 text, byte-substring and
//! `str::contains` agree.

use std::collections::VecDeque;

/// Index of a pattern in the order it was given to [`Automaton::new`].
pub(crate) type PatternId = usize;

type StateId = usize;

const ROOT: StateId = 0;

#[derive(Debug, Default, Clone)]
struct State {
    /// Sorted by byte.
    transitions: Vec<(u8, StateId)>,
    fail: StateId,
    outputs: Vec<PatternId>,
}

impl State {
    fn goto(&self, byte: u8) -> Option<StateId> {
        self.transitions.binary_search_by_key(&byte, |&(b, _)| b).ok().map(|i| self.transitions[i].1)
    }
}

/// Read-only after construction; scanning takes `&self`.
#[derive(Debug, Clone)]
pub(crate) struct Automaton {
    states: Vec<State>,
    /// Empty patterns occur in every input, including the empty one.
    always: Vec<PatternId>,
    pattern_count: usize,
}

impl Automaton {
    pub fn new<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mut states = vec![State::default()];
        let mut always = Vec::new();
        let mut pattern_count = 0;

        // Trie.
        for (id, pattern) in patterns.into_iter().enumerate() {
            pattern_count += 1;
            let bytes = pattern.as_ref();
            if bytes.is_empty() {
                always.push(id);
                continue;
            }

            let mut current = ROOT;
            for &byte in bytes {
                current = match states[current].goto(byte) {
                    Some(next) => next,
                    None => {
                        let next = states.len();
                        states.push(State::default());
                        let transitions = &mut states[current].transitions;
                        let at = transitions.partition_point(|&(b, _)| b < byte);
                        transitions.insert(at, (byte, next));
                        next
                    }
                };
            }
            states[current].outputs.push(id);
        }

        // Failure links, breadth first so a state's fail target (always
        // shallower) is complete before the state itself.
        let mut queue: VecDeque<StateId> = states[ROOT].transitions.iter().map(|&(_, s)| s).collect();
        while let Some(state) = queue.pop_front() {
            let transitions = states[state].transitions.clone();
            for (byte, child) in transitions {
                let mut fallback = states[state].fail;
                let fail = loop {
                    if let Some(next) = states[fallback].goto(byte) {
                        break next;
                    }
                    if fallback == ROOT {
                        break ROOT;
                    }
                    fallback = states[fallback].fail;
                };

                let inherited = states[fail].outputs.clone();
                let child_state = &mut states[child];
                child_state.fail = fail;
                child_state.outputs.extend(inherited);
                queue.push_back(child);
            }
        }

        Automaton { states, always, pattern_count }
    }

    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Call `on_match` for every pattern occurrence in `haystack`.
    ///
    /// A pattern occurring several times is reported several times.
    pub fn scan(&self, haystack: &[u8], mut on_match: impl FnMut(PatternId)) {
        for &id in &self.always {
            on_match(id);
        }

        let mut current = ROOT;
        for &byte in haystack {
            current = self.next_state(current, byte);
            for &id in &self.states[current].outputs {
                on_match(id);
            }
        }
    }

    /// Sorted, deduplicated ids of the patterns occurring in `haystack`.
    #[cfg(test)]
    pub fn find_all(&self, haystack: &[u8]) -> Vec<PatternId> {
        let mut found = Vec::new();
        self.scan(haystack, |id| found.push(id));
        found.sort_unstable();
        found.dedup();
        found
    }

    fn next_state(&self, mut state: StateId, byte: u8) -> StateId {
        loop {
            if let Some(next) = self.states[state].goto(byte) {
                return next;
            }
            if state == ROOT {
                return ROOT;
            }
            state = self.states[state].fail;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classic_overlapping_patterns() {
        let ac = Automaton::new(["he", "she", "his", "hers"]);
        assert_eq!(ac.find_all(b"ushers"), vec![0, 1, 3]);
        assert_eq!(ac.find_all(b"this"), vec![2]);
        assert!(ac.find_all(b"hx sx").is_empty());
    }

    #[test]
    fn failure_links_recover_without_rescanning() {
        // "aab" needs the fail link from "aa" back to "a" to catch "ab".
        let ac = Automaton::new(["ab", "aaa"]);
        assert_eq!(ac.find_all(b"aab"), vec![0]);
        assert_eq!(ac.find_all(b"aaab"), vec![0, 1]);
    }

    #[test]
    fn nested_patterns_are_all_reported() {
        let ac = Automaton::new(["abcd", "bc", "c", "xyz"]);
        assert_eq!(ac.find_all(b"abcd"), vec![0, 1, 2]);
    }

    #[test]
    fn repeated_occurrences_are_reported_each_time() {
        let ac = Automaton::new(["a"]);
        let mut hits = 0;
        ac.scan(b"banana", |_| hits += 1);
        assert_eq!(hits, 3);
    }

    #[test]
    fn empty_pattern_always_matches() {
        let ac = Automaton::new(["", "x"]);
        assert_eq!(ac.find_all(b""), vec![0]);
        assert_eq!(ac.find_all(b"yx"), vec![0, 1]);
    }

    #[test]
    fn duplicate_patterns_share_a_state() {
        let ac = Automaton::new(["dup", "dup"]);
        assert_eq!(ac.find_all(b"a dup"), vec![0, 1]);
        assert_eq!(ac.state_count(), 4);
        assert_eq!(ac.pattern_count(), 2);
    }

    #[test]
    fn multibyte_text() {
        let ac = Automaton::new(["é", "über", "ü"]);
        assert_eq!(ac.find_all("Grüße über".as_bytes()), vec![1, 2]);
    }

    #[test]
    fn agrees_with_naive_search() {
        let patterns = ["ab", "b", "bab", "abba", "aa", "bbb"];
        let ac = Automaton::new(patterns);
        for input in ["", "a", "abab", "babba", "aabbbab", "bbbbbb", "abbaab"] {
            let expected: Vec<PatternId> =
                patterns.iter().enumerate().filter(|(_, p)| input.contains(*p)).map(|(i, _)| i).collect();
            assert_eq!(ac.find_all(input.as_bytes()), expected, "input {input:?}");
        }
    }

    #[test]
    fn many_patterns_get_distinct_states() {
        let patterns: Vec<String> = (0..5000).map(|i| format!("p{i:05}")).collect();
        let ac = Automaton::new(&patterns);
        // root, "p", then a digit trie: 1 + 5 + 50 + 500 + 5000 nodes.
        assert_eq!(ac.state_count(), 5558);
        assert_eq!(ac.find_all(b"xx p04999 p00000"), vec![0, 4999]);
    }
}
