//! Best-first error-tolerant search over a [`Trie`], scored by the typing
//! error model in `error_model.rs`. Translated from `TAutocomplete::Run` /
//! `split` / `expand_matched_query` in `Autocomplete.cpp`: a max-priority
//! frontier of [`Candidate`]s, each owning a window of still-unexplored
//! successor actions at its node. Popping a candidate scans its whole
//! window to find the single best successor, then pushes just that
//! successor plus up to two bound-carrying placeholders for the rest of
//! the window — so the frontier never grows by more than three entries per
//! pop, however many children or operations that window covers.

use std::collections::BinaryHeap;

use super::candidate::{Action, Candidate, Operation};
use super::error_model::{
    error_probabilities, transition_prob, BEGIN_INSERTION_PENALTY, BEGIN_SUBSTITUTION_PENALTY,
};
use super::keyboard::Keyboard;
use super::trie::{Trie, TERMINATOR};

/// Bounds on how hard the search is allowed to work before it gives up and
/// returns whatever it's found.
#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    /// Hard cap on candidates popped from the frontier while no suggestion
    /// has been found yet. The legacy engine used this exact cap (a stray
    /// comment there claims 1000, the code enforces 10000 — this crate
    /// follows the code). Once a first suggestion is found the cap no
    /// longer applies; the probability floor takes over as the only
    /// remaining bound.
    pub iteration_cap: usize,
    /// Once a suggestion has been found, any frontier entry whose priority
    /// is more than this factor below that first (and, by admissibility of
    /// best-first search, best possible) suggestion's priority is
    /// discarded rather than expanded further.
    pub floor_divisor: f32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            iteration_cap: 10_000,
            floor_divisor: 100.0,
        }
    }
}

/// Position just past the query character consumed at `consumed_idx`,
/// collapsing any run of spaces that follows into a single skip (a run
/// that reaches the end of the query is skipped entirely, matching the
/// original's `next_char` iterator walk).
fn next_pos(query: &[u8], consumed_idx: usize) -> usize {
    let mut begin = consumed_idx + 1;
    if begin >= query.len() || query[begin] != b' ' {
        return begin;
    }
    let mut next = begin + 1;
    while next < query.len() && query[next] == b' ' {
        begin = next;
        next += 1;
    }
    if next >= query.len() {
        return next;
    }
    begin
}

/// Index of the first non-space byte in `query`, or `query.len()` if it's
/// empty or all spaces.
fn skip_leading_spaces(query: &[u8]) -> usize {
    let mut pos = 0;
    while pos < query.len() && query[pos] == b' ' {
        pos += 1;
    }
    pos
}

fn child_at_cursor(trie: &Trie, action: Action) -> Option<usize> {
    trie.node(action.node_id)
        .children
        .get(action.child_cursor)
        .copied()
}

/// A candidate is a goal exactly when its node is a leaf (a terminator,
/// since those are the only childless nodes in a well-formed trie).
/// Whether it's *recorded* additionally requires the query to be fully
/// consumed; either way a goal candidate is never expanded further.
fn is_goal_node(trie: &Trie, node_id: usize) -> bool {
    trie.node(node_id).children.is_empty()
}

/// Generates the successor candidate (if any) produced by executing a
/// single `action` against `candidate`. Each operation consumes zero, one,
/// or two query bytes and descends zero, one, or two trie levels; see the
/// design notes on the five operations' exact semantics. `action` need not
/// be `candidate.begin` — `expand_window` below scans every action in a
/// candidate's window through this function to find the best successor and
/// the admissible bounds on the rest.
fn expand_action(
    trie: &Trie,
    keyboard: &Keyboard,
    query: &[u8],
    candidate: &Candidate,
    action: Action,
) -> Vec<Candidate> {
    let node = trie.node(candidate.node_id);
    let qpos = candidate.query_pos;
    let at_start = qpos == 0;
    let probs = error_probabilities(keyboard, query, qpos, node.c);

    match action.operation {
        // The dictionary has a letter here that the query never typed:
        // advance the trie, leave the query cursor where it is. Weighted
        // over all children (including exact-key ones — unlike
        // `substitute`, an insertion doesn't care whether the landed-on
        // key happens to also be the literal next query character).
        Operation::Insert => {
            let Some(child_id) = child_at_cursor(trie, action) else {
                return Vec::new();
            };
            let child = trie.node(child_id);
            let Some((own_prob, _)) =
                transition_prob(keyboard, child.c, query[qpos], at_start, BEGIN_INSERTION_PENALTY)
            else {
                return Vec::new();
            };
            let sum: f32 = node
                .children
                .iter()
                .filter_map(|&id| {
                    transition_prob(keyboard, trie.node(id).c, query[qpos], at_start, BEGIN_INSERTION_PENALTY)
                        .map(|(p, _)| p)
                })
                .sum();
            if sum <= 0.0 {
                return Vec::new();
            }
            let mut suggestion = candidate.suggestion.clone();
            suggestion.push(child.c);
            let new_prob = candidate.query_prob * probs.insertion * own_prob / sum;
            vec![Candidate::at_node(
                trie,
                child_id,
                qpos,
                suggestion,
                new_prob,
                candidate.n_errors + 1,
            )]
        }

        // The query byte matches the child's key position exactly: no
        // error. Normalised over every sibling that's also an exact match
        // (homologous keys, e.g. shifted/unshifted pairs on one key, can
        // make more than one child qualify).
        Operation::NoCorrection => {
            let Some(child_id) = child_at_cursor(trie, action) else {
                return Vec::new();
            };
            let child = trie.node(child_id);
            if qpos >= query.len() || keyboard.distance(child.c, query[qpos]) != 0 {
                return Vec::new();
            }
            let matches = node
                .children
                .iter()
                .filter(|&&id| keyboard.distance(trie.node(id).c, query[qpos]) == 0)
                .count() as f32;
            if matches <= 0.0 {
                return Vec::new();
            }
            let mut suggestion = candidate.suggestion.clone();
            suggestion.push(child.c);
            let new_prob = candidate.query_prob * probs.hit / matches;
            vec![Candidate::at_node(
                trie,
                child_id,
                next_pos(query, qpos),
                suggestion,
                new_prob,
                candidate.n_errors,
            )]
        }

        // The query byte is a mistyped rendering of the child's byte:
        // advance both trie and query. Exact matches are excluded — those
        // are `no_correction`'s territory.
        Operation::Substitute => {
            let Some(child_id) = child_at_cursor(trie, action) else {
                return Vec::new();
            };
            if qpos >= query.len() {
                return Vec::new();
            }
            let child = trie.node(child_id);
            let Some((own_prob, exact)) = transition_prob(
                keyboard,
                child.c,
                query[qpos],
                at_start,
                BEGIN_SUBSTITUTION_PENALTY,
            ) else {
                return Vec::new();
            };
            if exact {
                return Vec::new();
            }
            let sum: f32 = node
                .children
                .iter()
                .filter_map(|&id| {
                    transition_prob(
                        keyboard,
                        trie.node(id).c,
                        query[qpos],
                        at_start,
                        BEGIN_SUBSTITUTION_PENALTY,
                    )
                    .filter(|&(_, exact)| !exact)
                    .map(|(p, _)| p)
                })
                .sum();
            if sum <= 0.0 {
                return Vec::new();
            }
            let mut suggestion = candidate.suggestion.clone();
            suggestion.push(child.c);
            let new_prob = candidate.query_prob * probs.substitution * own_prob / sum;
            vec![Candidate::at_node(
                trie,
                child_id,
                next_pos(query, qpos),
                suggestion,
                new_prob,
                candidate.n_errors + 1,
            )]
        }

        // A spurious keystroke: the typed byte doesn't correspond to
        // anything in the trie. Stay at the same node, discard the query
        // byte. One-shot — doesn't iterate children.
        Operation::Delete => {
            if qpos >= query.len() {
                return Vec::new();
            }
            let new_prob = candidate.query_prob * probs.deletion;
            vec![Candidate::at_node(
                trie,
                candidate.node_id,
                next_pos(query, qpos),
                candidate.suggestion.clone(),
                new_prob,
                candidate.n_errors + 1,
            )]
        }

        // Two adjacent query bytes were typed in swapped order: some
        // child matches the *second* query byte, and one of its own
        // children matches the first. Only the first matching two-level
        // path is used, mirroring the original `transpose()`'s
        // single-best-match search rather than trying every transposed
        // path.
        Operation::Transpose => {
            if qpos + 1 >= query.len() {
                return Vec::new();
            }
            let second_typed = query[qpos + 1];
            let first_typed = query[qpos];
            for &child_id in &node.children {
                let child = trie.node(child_id);
                if child.c == TERMINATOR || keyboard.distance(second_typed, child.c) != 0 {
                    continue;
                }
                for &grandchild_id in &trie.node(child_id).children {
                    let grandchild = trie.node(grandchild_id);
                    if grandchild.c != TERMINATOR && keyboard.distance(first_typed, grandchild.c) == 0 {
                        let mut suggestion = candidate.suggestion.clone();
                        suggestion.push(child.c);
                        suggestion.push(grandchild.c);
                        let new_prob = candidate.query_prob * probs.transposition;
                        return vec![Candidate::at_node(
                            trie,
                            grandchild_id,
                            next_pos(query, qpos + 1),
                            suggestion,
                            new_prob,
                            candidate.n_errors + 1,
                        )];
                    }
                }
                return Vec::new();
            }
            Vec::new()
        }

        Operation::End => Vec::new(),
    }
}

/// The mandatory five-way split over a candidate's full `[begin, end)`
/// action window: every action in the window is evaluated in one pass so
/// the single best successor can be identified, then at most three items
/// are pushed back onto the frontier — the best successor itself, plus two
/// placeholders ("revisit left slice" / "revisit right slice") carrying the
/// true max priority achieved by the (unpushed) successors on either side
/// of the best one. Because every successor's priority is computed from
/// `query_prob * node.prob` with error-model weights that are never above
/// 1, those maxima are themselves admissible upper bounds on anything a
/// further split of that slice could produce — so deferring the slices
/// behind a placeholder never drops a candidate that could have out-ranked
/// something already on the heap. `floor`, when set, lets placeholders
/// below the current probability floor be dropped immediately instead of
/// re-entering the heap only to be discarded on their next pop.
fn expand_window(
    trie: &Trie,
    keyboard: &Keyboard,
    query: &[u8],
    candidate: &Candidate,
    floor: Option<f32>,
) -> Vec<Candidate> {
    let mut entries: Vec<(Action, Candidate)> = Vec::new();
    let mut action = candidate.begin;
    while action != candidate.end {
        if let Some(successor) = expand_action(trie, keyboard, query, candidate, action)
            .into_iter()
            .next()
        {
            entries.push((action, successor));
        }
        action = action.advanced(trie);
    }

    let Some((best_idx, _)) = entries
        .iter()
        .enumerate()
        .max_by(|(_, (_, a)), (_, (_, b))| a.priority.total_cmp(&b.priority))
    else {
        return Vec::new();
    };

    let left_bound = entries[..best_idx]
        .iter()
        .map(|(_, c)| c.priority)
        .fold(0.0f32, f32::max);
    let right_bound = entries[best_idx + 1..]
        .iter()
        .map(|(_, c)| c.priority)
        .fold(0.0f32, f32::max);

    let above_floor = |priority: f32| priority > 0.0 && floor.map_or(true, |f| priority > f);

    let mut out = Vec::with_capacity(3);

    let (best_action, best_candidate) = entries.into_iter().nth(best_idx).unwrap();
    out.push(best_candidate);

    if above_floor(left_bound) {
        let mut left = candidate.clone();
        left.end = best_action;
        left.priority = left_bound;
        out.push(left);
    }
    if above_floor(right_bound) {
        let mut right = candidate.clone();
        right.begin = best_action.advanced(trie);
        right.priority = right_bound;
        out.push(right);
    }

    out
}

/// Prefix-only expansion: the query is already fully matched at an
/// interior node (it's a prefix of one or more longer words). Emulates a
/// depth-first descent into the most probable completion while lazily
/// keeping the rest of this node's children available to the frontier.
/// Translated from `expand_matched_query`.
fn expand_matched_prefix(trie: &Trie, candidate: &Candidate) -> Vec<Candidate> {
    if candidate.begin == candidate.end {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(2);

    let action = candidate.begin;
    let Some(first_id) = child_at_cursor(trie, action) else {
        return out;
    };
    let first = trie.node(first_id);
    let mut suggestion = candidate.suggestion.clone();
    suggestion.push(first.c);
    out.push(Candidate::at_node(
        trie,
        first_id,
        candidate.query_pos,
        suggestion,
        candidate.query_prob,
        candidate.n_errors,
    ));

    // Preserved quirk from the source: the lazily-deferred sibling slice
    // is only re-queued if advancing the cursor doesn't roll over into the
    // next operation tag.
    let old_operation = action.operation;
    let advanced = action.advanced(trie);
    if advanced != candidate.end && advanced.operation == old_operation {
        if let Some(second_id) = child_at_cursor(trie, advanced) {
            let mut rest = candidate.clone();
            rest.begin = Action::new(candidate.node_id, Operation::NoCorrection, advanced.child_cursor);
            rest.end = Action::new(
                candidate.node_id,
                Operation::NoCorrection,
                trie.node(candidate.node_id).children.len(),
            );
            rest.priority = candidate.query_prob * trie.node(second_id).prob;
            out.push(rest);
        }
    }

    out
}

/// Runs the search to completion (or until a limit trips) and returns up
/// to `max_results` dictionary words, most likely first.
pub fn autocomplete(
    trie: &Trie,
    keyboard: &Keyboard,
    limits: &SearchLimits,
    query: &[u8],
    max_results: usize,
) -> Vec<String> {
    let start = skip_leading_spaces(query);
    if start == query.len() || max_results == 0 {
        return Vec::new();
    }
    let query = &query[start..];
    debug_print::debug_println!(
        "fuzzyprefix: autocomplete({:?}, max_results={})",
        String::from_utf8_lossy(query),
        max_results
    );

    let mut frontier = BinaryHeap::new();
    frontier.push(Candidate::at_node(trie, 0, 0, Vec::new(), 1.0, 0));

    let mut suggestions: Vec<Vec<u8>> = Vec::new();
    let mut floor: Option<f32> = None;
    let mut iterations = 0usize;

    while let Some(candidate) = frontier.pop() {
        if let Some(floor) = floor {
            if candidate.priority < floor {
                break;
            }
        } else {
            iterations += 1;
            if iterations > limits.iteration_cap {
                break;
            }
        }

        if is_goal_node(trie, candidate.node_id) {
            if candidate.query_pos == query.len() {
                // The node just reached is the terminator itself; its byte
                // (a trailing NUL) was pushed onto `suggestion` by whichever
                // expansion stepped into it and is not part of the word.
                let mut word = candidate.suggestion.clone();
                if word.last() == Some(&TERMINATOR) {
                    word.pop();
                }
                if !suggestions.contains(&word) {
                    if floor.is_none() {
                        floor = Some(candidate.priority / limits.floor_divisor);
                    }
                    suggestions.push(word);
                    if suggestions.len() >= max_results {
                        break;
                    }
                }
            }
            continue;
        }

        if candidate.query_pos == query.len() {
            // Prefix-only expansion manages its own lazily-deferred
            // sibling slice internally (see `expand_matched_prefix`); the
            // generic "requeue the rest of this window" step below would
            // duplicate that with the wrong priority, so it's skipped here.
            for successor in expand_matched_prefix(trie, &candidate) {
                frontier.push(successor);
            }
        } else {
            for successor in expand_window(trie, keyboard, query, &candidate, floor) {
                frontier.push(successor);
            }
        }

        if frontier.is_empty() {
            break;
        }
    }

    debug_print::debug_println!(
        "fuzzyprefix: autocomplete finished after {} iterations, {} suggestion(s) found",
        iterations,
        suggestions.len()
    );

    suggestions
        .into_iter()
        .map(|word| String::from_utf8_lossy(&word).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autocomplete::trie::Trie;

    fn trie_from_pairs(pairs: &[(&str, f32)]) -> Trie {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        let mut lines = String::new();
        for &(word, weight) in pairs {
            lines.push_str(&format!("{weight} {word}\n"));
        }
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "fuzzyprefix-test-{}-{id}.txt",
            std::process::id()
        ));
        std::fs::write(&path, lines).unwrap();
        let trie = Trie::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        trie
    }

    #[test]
    fn exact_prefix_match_is_found() {
        let trie = trie_from_pairs(&[("houston", 10.0), ("austin", 5.0), ("boston", 3.0)]);
        let keyboard = Keyboard::default();
        let limits = SearchLimits::default();
        let results = autocomplete(&trie, &keyboard, &limits, b"houston", 3);
        assert!(results.contains(&"houston".to_string()));
    }

    #[test]
    fn single_substitution_is_tolerated() {
        let trie = trie_from_pairs(&[("copenhagen", 10.0), ("stockholm", 5.0)]);
        let keyboard = Keyboard::default();
        let limits = SearchLimits::default();
        let results = autocomplete(&trie, &keyboard, &limits, b"cpenhagen", 3);
        assert!(results.contains(&"copenhagen".to_string()));
    }

    #[test]
    fn results_are_ranked_by_probability() {
        let trie = trie_from_pairs(&[("newark", 1.0), ("new york", 100.0)]);
        let keyboard = Keyboard::default();
        let limits = SearchLimits::default();
        let results = autocomplete(&trie, &keyboard, &limits, b"nw yr", 2);
        assert!(!results.is_empty());
        assert_eq!(results[0], "new york");
    }

    #[test]
    fn empty_query_yields_no_results() {
        let trie = trie_from_pairs(&[("paris", 1.0)]);
        let keyboard = Keyboard::default();
        let limits = SearchLimits::default();
        assert!(autocomplete(&trie, &keyboard, &limits, b"", 5).is_empty());
    }

    #[test]
    fn whitespace_only_query_yields_no_results() {
        let trie = trie_from_pairs(&[("paris", 1.0)]);
        let keyboard = Keyboard::default();
        let limits = SearchLimits::default();
        assert!(autocomplete(&trie, &keyboard, &limits, b"   ", 5).is_empty());
    }

    #[test]
    fn results_never_exceed_max_results() {
        let trie = trie_from_pairs(&[
            ("ant", 5.0),
            ("art", 4.0),
            ("ark", 3.0),
            ("arm", 2.0),
            ("arc", 1.0),
        ]);
        let keyboard = Keyboard::default();
        let limits = SearchLimits::default();
        let results = autocomplete(&trie, &keyboard, &limits, b"ar", 2);
        assert!(results.len() <= 2);
    }

    #[test]
    fn duplicate_word_insertions_still_yield_a_single_result() {
        let trie = trie_from_pairs(&[("paris", 1.0), ("paris", 1.0)]);
        let keyboard = Keyboard::default();
        let limits = SearchLimits::default();
        let results = autocomplete(&trie, &keyboard, &limits, b"paris", 5);
        assert_eq!(results.iter().filter(|w| *w == "paris").count(), 1);
    }
}
