//! Weighted prefix tree over byte strings.
//!
//! Mirrors `TTrie` from the original `AutocompleteUtils.cpp`: one node per
//! byte of every inserted word, a zero-byte terminator marking word ends,
//! and a finalisation pass that turns accumulated weights into
//! probabilities and sorts children so the best-first searcher in
//! `search.rs` reaches high-probability regions first.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::LoadError;

/// Byte value reserved for the end-of-word marker. No dictionary word may
/// contain this byte (it can't, in practice — it's the NUL byte).
pub const TERMINATOR: u8 = 0;
/// Character carried by the root node. Never matched against query bytes.
const ROOT_CHAR: u8 = b' ';

/// A single node in the arena. `children` is empty for terminators and is
/// kept in descending `prob` order for every other node once `finalize`
/// has run.
#[derive(Debug, Clone)]
pub struct Node {
    pub c: u8,
    pub prob: f32,
    pub children: Vec<usize>,
}

impl Node {
    fn new(c: u8) -> Self {
        Node {
            c,
            prob: 0.0,
            children: Vec::new(),
        }
    }
}

/// Arena-indexed weighted prefix tree. Node 0 is always the root.
#[derive(Debug)]
pub struct Trie {
    nodes: Vec<Node>,
    sum_weight: f32,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub fn new() -> Self {
        Trie {
            nodes: vec![Node::new(ROOT_CHAR)],
            sum_weight: 0.0,
        }
    }

    #[inline]
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    #[inline]
    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Inserts `word` with `weight`, creating one node per byte. Duplicate
    /// insertions of the same word accumulate into the same terminator.
    fn add(&mut self, word: &[u8], weight: f32) {
        self.sum_weight += weight;
        self.add_rec(0, word, weight);
    }

    fn add_rec(&mut self, node_id: usize, rest: &[u8], weight: f32) {
        if rest.is_empty() {
            for &child_id in &self.nodes[node_id].children {
                if self.nodes[child_id].c == TERMINATOR {
                    self.nodes[child_id].prob += weight;
                    return;
                }
            }
            let new_id = self.nodes.len();
            let mut terminator = Node::new(TERMINATOR);
            terminator.prob = weight;
            self.nodes.push(terminator);
            self.nodes[node_id].children.push(new_id);
            return;
        }

        let c = rest[0];
        for &child_id in &self.nodes[node_id].children {
            if self.nodes[child_id].c == c {
                self.add_rec(child_id, &rest[1..], weight);
                return;
            }
        }

        let new_id = self.nodes.len();
        self.nodes.push(Node::new(c));
        self.nodes[node_id].children.push(new_id);
        self.add_rec(new_id, &rest[1..], weight);
    }

    /// Turns accumulated weights into probabilities and sorts every node's
    /// children descending by `prob`. Called once, after all inserts.
    fn finalize(&mut self, node_id: usize) {
        if self.nodes[node_id].children.is_empty() {
            self.nodes[node_id].prob /= self.sum_weight;
            return;
        }

        let children = self.nodes[node_id].children.clone();
        let mut max_prob = 0.0f32;
        for &child_id in &children {
            self.finalize(child_id);
            max_prob = max_prob.max(self.nodes[child_id].prob);
        }
        self.nodes[node_id].prob = max_prob;

        let nodes = &self.nodes;
        self.nodes[node_id]
            .children
            .sort_by(|&a, &b| nodes[b].prob.total_cmp(&nodes[a].prob));
    }

    /// Parses a `<weight> <word>` dictionary file, one entry per line, and
    /// builds a finalised trie from it.
    pub fn load(path: impl AsRef<Path>) -> Result<Trie, LoadError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let reader = BufReader::new(file);

        let mut trie = Trie::new();
        for (line_no, line) in reader.lines().enumerate() {
            let mut line = line.map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            if line.ends_with('\r') {
                line.pop();
            }
            if line.is_empty() {
                continue;
            }

            let (weight_str, word) = line.split_once(' ').ok_or_else(|| LoadError::MalformedLine {
                path: path.clone(),
                line: line_no,
            })?;
            let weight: f32 = weight_str.parse().map_err(|_| LoadError::MalformedLine {
                path: path.clone(),
                line: line_no,
            })?;
            if weight <= 0.0 {
                return Err(LoadError::NonPositiveWeight {
                    path: path.clone(),
                    line: line_no,
                    weight,
                });
            }

            trie.add(word.as_bytes(), weight);
        }

        if trie.sum_weight == 0.0 {
            return Err(LoadError::EmptyDictionary { path });
        }

        trie.finalize(0);
        debug_print::debug_println!(
            "fuzzyprefix: loaded {} nodes, total weight {}",
            trie.len(),
            trie.sum_weight
        );
        Ok(trie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie_from_pairs(pairs: &[(&str, f32)]) -> Trie {
        let mut trie = Trie::new();
        let mut total = 0.0;
        for &(word, weight) in pairs {
            trie.add(word.as_bytes(), weight);
            total += weight;
        }
        trie.sum_weight = total;
        trie.finalize(0);
        trie
    }

    #[test]
    fn terminator_probabilities_sum_to_one() {
        let trie = trie_from_pairs(&[("a", 1.0), ("ab", 2.0), ("abc", 1.0), ("b", 4.0)]);
        let mut sum = 0.0;
        fn walk(trie: &Trie, id: usize, sum: &mut f32) {
            let node = trie.node(id);
            if node.children.is_empty() {
                *sum += node.prob;
            } else {
                for &child in &node.children {
                    walk(trie, child, sum);
                }
            }
        }
        walk(&trie, 0, &mut sum);
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn interior_prob_is_max_of_children() {
        let trie = trie_from_pairs(&[("cat", 1.0), ("car", 5.0), ("cart", 2.0)]);
        fn check(trie: &Trie, id: usize) {
            let node = trie.node(id);
            if !node.children.is_empty() {
                let max_child = node
                    .children
                    .iter()
                    .map(|&c| trie.node(c).prob)
                    .fold(0.0f32, f32::max);
                assert!((node.prob - max_child).abs() < 1e-6);
                for &child in &node.children {
                    check(trie, child);
                }
            }
        }
        check(&trie, 0);
    }

    #[test]
    fn children_sorted_descending() {
        let trie = trie_from_pairs(&[("ant", 1.0), ("art", 9.0), ("ark", 3.0)]);
        fn check(trie: &Trie, id: usize) {
            let node = trie.node(id);
            for pair in node.children.windows(2) {
                assert!(trie.node(pair[0]).prob >= trie.node(pair[1]).prob);
            }
            for &child in &node.children {
                check(trie, child);
            }
        }
        check(&trie, 0);
    }

    #[test]
    fn duplicate_insertions_aggregate_weight() {
        let trie = trie_from_pairs(&[("paris", 1.0), ("paris", 1.0)]);
        // root -> p -> a -> r -> i -> s -> terminator
        let mut id = 0usize;
        for _ in 0..5 {
            id = trie.node(id).children[0];
        }
        let terminator = trie.node(id).children[0];
        assert_eq!(trie.node(terminator).c, TERMINATOR);
        assert!((trie.node(terminator).prob - 1.0).abs() < 1e-6);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let err = Trie::load("/nonexistent/path/does-not-exist.txt");
        assert!(matches!(err, Err(LoadError::Io { .. })));
    }
}
