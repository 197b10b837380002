//! Search-frontier state: `Operation`/`Action` (the five successor-generating
//! moves and the cursor that iterates them) and `Candidate` (a partial
//! alignment of the query against the trie), translated from `TAction` and
//! `TCandidate` in `AutocompleteUtils.h`.

use std::cmp::Ordering;

use derive_new::new;

use super::trie::Trie;

/// The five ways a candidate can advance, plus the `End` sentinel that
/// marks one-past-the-last action. Order is part of the contract: it fixes
/// the order `split` considers successors in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    NoCorrection,
    Substitute,
    Delete,
    Transpose,
    End,
}

impl Operation {
    fn next(self) -> Operation {
        use Operation::*;
        match self {
            Insert => NoCorrection,
            NoCorrection => Substitute,
            Substitute => Delete,
            Delete => Transpose,
            Transpose => End,
            End => unreachable!("stepped past the terminal search action"),
        }
    }
}

/// A tagged descriptor into a node's successor-generation space: which
/// operation, and (for the operations that iterate children) which child.
/// `Delete` and `Transpose` ignore `child_cursor` — they're one-shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct Action {
    pub node_id: usize,
    pub operation: Operation,
    pub child_cursor: usize,
}

impl Action {
    /// The full `[Insert, End)` window over `node_id`'s actions, collapsed
    /// to an empty window immediately if the node has no children (delete
    /// and transpose still apply regardless of children, but per the
    /// source behaviour an empty `sub_trees` list degenerates the whole
    /// window to empty — preserved here for fidelity).
    pub fn full_window(trie: &Trie, node_id: usize) -> (Action, Action) {
        let begin = Action::new(node_id, Operation::Insert, 0);
        if trie.node(node_id).children.is_empty() {
            (begin, begin)
        } else {
            (begin, Action::new(node_id, Operation::End, 0))
        }
    }

    /// The next action in iteration order: next child under the same
    /// operation, or the first child of the next operation once children
    /// are exhausted (immediately, for `Delete`/`Transpose`, which don't
    /// iterate children at all).
    pub fn advanced(self, trie: &Trie) -> Action {
        match self.operation {
            Operation::Delete | Operation::Transpose => {
                Action::new(self.node_id, self.operation.next(), 0)
            }
            _ => {
                let len = trie.node(self.node_id).children.len();
                if len == 0 || self.child_cursor + 1 >= len {
                    Action::new(self.node_id, self.operation.next(), 0)
                } else {
                    Action::new(self.node_id, self.operation, self.child_cursor + 1)
                }
            }
        }
    }
}

/// A search-frontier element: "we are at trie node `node_id`, having
/// consumed the query up to `query_pos`, proposing `suggestion`, with
/// cumulative query likelihood `query_prob` and heuristic `priority`,
/// after `n_errors` edits." `begin`/`end` bound the subset of successor
/// actions this candidate still owes the frontier.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub node_id: usize,
    pub begin: Action,
    pub end: Action,
    pub query_pos: usize,
    /// Bytes of the word spelled out so far, including a trailing
    /// terminator byte once the search reaches one (stripped at the point
    /// a goal is recorded, same as the original's `substr(0, size-1)`).
    pub suggestion: Vec<u8>,
    pub query_prob: f32,
    pub priority: f32,
    pub n_errors: u32,
}

impl Candidate {
    /// A candidate that has just advanced the trie position to `node_id`,
    /// with a fresh full action window over it.
    pub fn at_node(
        trie: &Trie,
        node_id: usize,
        query_pos: usize,
        suggestion: Vec<u8>,
        query_prob: f32,
        n_errors: u32,
    ) -> Candidate {
        let (begin, end) = Action::full_window(trie, node_id);
        let priority = query_prob * trie.node(node_id).prob;
        Candidate {
            node_id,
            begin,
            end,
            query_pos,
            suggestion,
            query_prob,
            priority,
            n_errors,
        }
    }
}

// Frontier order is by `priority` alone; ties are unspecified (the
// iteration cap and the probability floor make tie order immaterial).
impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}
impl Eq for Candidate {}
impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.total_cmp(&other.priority)
    }
}
