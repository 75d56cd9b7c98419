//! Aho-Corasick matching over a prepared dictionary.
//!
//! Matching streams through the text once, following child transitions
//! where possible and failure links on mismatch, so runtime is linear in
//! the text length plus the number of hits. Every occurrence of every
//! stored pattern is reported, overlapping occurrences included.

use ahash::AHashSet;

use crate::dict::node::{NodeIndex, Symbol, NO_VALUE, ROOT};
use crate::dict::TrieDict;
use crate::TrieError;

/// Word-boundary characters used by the CLI's `--words` mode, matching the
/// punctuation set a text tokenizer would treat as separators.
pub const DEFAULT_BOUND_CHARS: &str = " !?=-*+#:;,.'\"()&%$";

/// A single pattern occurrence in a text.
///
/// `end` is exclusive: the index one past the last matched symbol, so the
/// occurrence spans `text[start()..end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Index immediately after the last matched symbol.
    pub end: usize,
    /// The stored pattern that matched.
    pub pattern: Vec<Symbol>,
    /// The value assigned to the pattern.
    pub value: u32,
}

impl Match {
    /// Index of the first matched symbol.
    pub fn start(&self) -> usize {
        self.end - self.pattern.len()
    }
}

impl TrieDict {
    /// Iterate over every occurrence of every stored pattern in `text`.
    ///
    /// Fails with [`TrieError::StaleLinks`] if the dictionary was mutated
    /// since the last [`TrieDict::build_suffix_links`] call; this engine
    /// never rebuilds implicitly.
    pub fn find_iter<'a>(&'a self, text: &'a [Symbol]) -> Result<FindIter<'a>, TrieError> {
        self.matcher(text, None)
    }

    /// Like [`TrieDict::find_iter`], but keep only occurrences whose
    /// neighbors on both sides are boundary symbols or the ends of the
    /// text. An occurrence abutting any other symbol is dropped.
    pub fn find_bounded_iter<'a>(
        &'a self,
        text: &'a [Symbol],
        bounds: &[Symbol],
    ) -> Result<FindIter<'a>, TrieError> {
        self.matcher(text, Some(bounds.iter().copied().collect()))
    }

    fn matcher<'a>(
        &'a self,
        text: &'a [Symbol],
        bounds: Option<AHashSet<Symbol>>,
    ) -> Result<FindIter<'a>, TrieError> {
        if !self.links_built {
            return Err(TrieError::StaleLinks);
        }
        Ok(FindIter {
            dict: self,
            text,
            pos: 0,
            state: ROOT,
            report: ROOT,
            bounds,
        })
    }
}

/// Streaming match iterator returned by [`TrieDict::find_iter`].
pub struct FindIter<'a> {
    dict: &'a TrieDict,
    text: &'a [Symbol],
    pos: usize,
    /// Current automaton state.
    state: NodeIndex,
    /// Cursor on the suffix chain of `state` with hits still to report;
    /// ROOT when the chain is drained.
    report: NodeIndex,
    bounds: Option<AHashSet<Symbol>>,
}

impl FindIter<'_> {
    fn passes_bounds(&self, m: &Match) -> bool {
        let Some(bounds) = &self.bounds else {
            return true;
        };
        let start = m.start();
        let left_ok = start == 0 || bounds.contains(&self.text[start - 1]);
        let right_ok = m.end == self.text.len() || bounds.contains(&self.text[m.end]);
        left_ok && right_ok
    }
}

impl Iterator for FindIter<'_> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        loop {
            // Drain pattern nodes on the current state's suffix chain. All
            // patterns ending at this text position lie on that chain.
            while self.report != ROOT {
                let node = self.dict.store.get(self.report);
                let terminal = self.report;
                self.report = node.suffix;
                if node.value != NO_VALUE {
                    let m = Match {
                        end: self.pos,
                        pattern: self.dict.pattern_of(terminal).to_vec(),
                        value: node.value,
                    };
                    if self.passes_bounds(&m) {
                        return Some(m);
                    }
                }
            }

            let &symbol = self.text.get(self.pos)?;
            let mut state = self.state;
            loop {
                let next = self.dict.store.find_child(state, symbol);
                if next != 0 {
                    state = next;
                    break;
                }
                if state == ROOT {
                    // No pattern prefix continues here; consume the symbol
                    // from the root.
                    break;
                }
                state = self.dict.store.get(state).suffix;
            }
            self.pos += 1;
            self.state = state;
            self.report = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::{decode_symbols, encode_str};

    fn dict_of(entries: &[(&str, u32)]) -> TrieDict {
        let mut dict = TrieDict::new();
        for &(key, value) in entries {
            dict.assign(&encode_str(key), value).unwrap();
        }
        dict.build_suffix_links();
        dict
    }

    fn hits(dict: &TrieDict, text: &str) -> Vec<(usize, String, u32)> {
        dict.find_iter(&encode_str(text))
            .unwrap()
            .map(|m| (m.end, decode_symbols(&m.pattern), m.value))
            .collect()
    }

    #[test]
    fn readme_scenario() {
        let dict = dict_of(&[("key1", 0), ("key2", 11)]);
        let found = hits(&dict, "this is key1 and key2key1 in a string");
        assert_eq!(
            found,
            vec![
                (12, "key1".to_string(), 0),
                (21, "key2".to_string(), 11),
                (25, "key1".to_string(), 0),
            ]
        );
    }

    #[test]
    fn readme_scenario_with_bounds() {
        let dict = dict_of(&[("key1", 0), ("key2", 11)]);
        let text = encode_str("this is key1 and key2key1 in a string");
        let bounds = encode_str(" .,;!?'\"()[]$=");
        let found: Vec<_> = dict
            .find_bounded_iter(&text, &bounds)
            .unwrap()
            .map(|m| (m.end, decode_symbols(&m.pattern), m.value))
            .collect();
        assert_eq!(found, vec![(12, "key1".to_string(), 0)]);
    }

    #[test]
    fn overlapping_occurrences_are_all_reported() {
        let dict = dict_of(&[("aa", 5)]);
        let found = hits(&dict, "aaaa");
        assert_eq!(
            found,
            vec![
                (2, "aa".to_string(), 5),
                (3, "aa".to_string(), 5),
                (4, "aa".to_string(), 5),
            ]
        );
    }

    #[test]
    fn pattern_and_its_prefix_both_match() {
        let dict = dict_of(&[("he", 1), ("hers", 2)]);
        let found = hits(&dict, "hers");
        assert_eq!(
            found,
            vec![(2, "he".to_string(), 1), (4, "hers".to_string(), 2)]
        );
    }

    #[test]
    fn suffix_chain_reports_shorter_pattern_at_same_end() {
        let dict = dict_of(&[("she", 1), ("he", 2)]);
        let found = hits(&dict, "she");
        assert_eq!(
            found,
            vec![(3, "she".to_string(), 1), (3, "he".to_string(), 2)]
        );
    }

    #[test]
    fn empty_dictionary_matches_nothing() {
        let dict = TrieDict::new();
        assert!(hits(&dict, "anything at all").is_empty());
    }

    #[test]
    fn empty_text_matches_nothing() {
        let dict = dict_of(&[("a", 1)]);
        assert!(hits(&dict, "").is_empty());
    }

    #[test]
    fn no_hits_is_empty_not_an_error() {
        let dict = dict_of(&[("xyz", 1)]);
        assert!(hits(&dict, "no such substring here").is_empty());
    }

    #[test]
    fn stale_links_refuse_to_match() {
        let mut dict = dict_of(&[("a", 1)]);
        dict.assign(&encode_str("b"), 2).unwrap();
        let text = encode_str("ab");
        assert!(matches!(dict.find_iter(&text), Err(TrieError::StaleLinks)));
        dict.build_suffix_links();
        assert_eq!(dict.find_iter(&text).unwrap().count(), 2);
    }

    #[test]
    fn bounds_at_text_edges_count_as_boundaries() {
        let dict = dict_of(&[("key", 7)]);
        let bounds = encode_str(" ");
        let at_edges = encode_str("key and key");
        let found: Vec<_> = dict.find_bounded_iter(&at_edges, &bounds).unwrap().collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].start(), 0);
        assert_eq!(found[1].end, at_edges.len());

        let embedded = encode_str("akeyb");
        assert_eq!(dict.find_bounded_iter(&embedded, &bounds).unwrap().count(), 0);
    }

    #[test]
    fn match_positions_span_the_occurrence() {
        let dict = dict_of(&[("cart", 3)]);
        let text = encode_str("a cart ride");
        let m = dict.find_iter(&text).unwrap().next().unwrap();
        assert_eq!(m.start(), 2);
        assert_eq!(m.end, 6);
        assert_eq!(decode_symbols(&text[m.start()..m.end]), "cart");
    }
}
