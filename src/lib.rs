//! # tridex
//!
//! A compressed, serializable dictionary implemented as a trie over a flat
//! array of fixed-width nodes. Keys are sequences of symbols (natively, the
//! characters of a string) and values are small non-negative integers.
//! Supports
//!
//! 1. exact lookup,
//! 2. prefix search (predictive search), and
//! 3. Aho-Corasick multi-pattern matching over a text.
//!
//! With an average key length of `m`, lookup and prefix descent are O(m) and
//! matching a text of length `t` is O(t) plus the number of hits.
//!
//! # Quick start
//!
//! ```
//! use tridex::{encode_str, TrieDict};
//!
//! let mut dict = TrieDict::new();
//! dict.assign(&encode_str("key1"), 0).unwrap();
//! dict.assign(&encode_str("key2"), 11).unwrap();
//!
//! assert_eq!(dict.lookup(&encode_str("key2")), Some(11));
//!
//! dict.build_suffix_links();
//! let text = encode_str("this is key1 in a string");
//! let hit = dict.find_iter(&text).unwrap().next().unwrap();
//! assert_eq!((hit.start(), hit.end, hit.value), (8, 12, 0));
//! ```
//!
//! Dictionaries serialize to a compact binary stream ([`TrieDict::serialize`])
//! and load back with validation ([`TrieDict::deserialize`]).

pub mod dict;
pub mod matcher;
pub mod output;
pub mod serial;

use thiserror::Error;

pub use dict::node::{NodeIndex, Symbol, MAX_VALUE};
pub use dict::{decode_symbols, encode_str, PrefixSearchIter, TrieDict};
pub use matcher::{FindIter, Match, DEFAULT_BOUND_CHARS};

/// Errors surfaced by dictionary operations.
#[derive(Debug, Error)]
pub enum TrieError {
    /// The pattern has zero symbols.
    #[error("pattern is empty")]
    EmptyKey,
    /// The pattern contains the reserved symbol 0.
    #[error("pattern contains the reserved symbol 0")]
    ReservedSymbol,
    /// The value collides with the "no value" sentinel.
    #[error("value {0} exceeds the maximum storable value {MAX_VALUE}")]
    ValueOutOfRange(u32),
    /// The node array cannot grow further.
    #[error("node capacity exhausted")]
    CapacityExhausted,
    /// The dictionary was mutated after the last suffix-link build;
    /// call [`TrieDict::build_suffix_links`] before matching.
    #[error("suffix links are stale; rebuild before matching")]
    StaleLinks,
    /// The serialized stream is truncated or inconsistent.
    #[error("corrupt serialized data: {0}")]
    CorruptSerializedData(String),
    /// The sink or source failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
