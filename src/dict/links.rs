use std::collections::VecDeque;

use crate::dict::node::ROOT;
use crate::dict::TrieDict;

impl TrieDict {
    /// Populate every node's failure link in one breadth-first pass and mark
    /// the links current.
    ///
    /// After the pass, a node's `suffix` points at the node whose
    /// path-from-root is the longest proper suffix of its own path that is
    /// also a trie path; nodes with no such suffix link to the root. Linear
    /// in the node count. Must be re-run after any `assign` before matching.
    pub fn build_suffix_links(&mut self) {
        self.store.get_mut(ROOT).suffix = 0;

        // Depth-1 nodes always fall back to the root.
        let mut queue = VecDeque::new();
        let mut child = self.store.get(ROOT).child;
        while child != 0 {
            self.store.get_mut(child).suffix = ROOT;
            queue.push_back(child);
            child = self.store.get(child).sibling;
        }

        while let Some(parent) = queue.pop_front() {
            let mut child = self.store.get(parent).child;
            while child != 0 {
                let symbol = self.store.get(child).symbol;

                // Follow the parent's failure chain to the deepest node
                // that can extend by this symbol.
                let mut fallback = self.store.get(parent).suffix;
                while fallback != ROOT && self.store.find_child(fallback, symbol) == 0 {
                    fallback = self.store.get(fallback).suffix;
                }
                let target = self.store.find_child(fallback, symbol);
                // target == child happens for depth-1 symbols reachable
                // straight from the root; the proper suffix is then empty.
                self.store.get_mut(child).suffix = if target == 0 || target == child {
                    ROOT
                } else {
                    target
                };

                queue.push_back(child);
                child = self.store.get(child).sibling;
            }
        }

        self.links_built = true;
    }
}
