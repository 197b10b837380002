//! The typing-error channel model: how likely a typed byte is to be a hit,
//! insertion, substitution, deletion, or transposition, and how that base
//! rate bends with keyboard distance. Translated from `error_probabilities`
//! and `transition_prob` in `Autocomplete.cpp`; every constant below is
//! copied from there verbatim, not re-derived.

use super::keyboard::Keyboard;
use super::trie::TERMINATOR;

/// Per-keypress chance that any given byte is mistyped, independent of
/// which error class it ends up being.
const KEYPRESS_ERROR_RATE: f32 = 0.05;

/// Extra multiplier folded into a substitute/insert transition when it
/// lands on the very first character of the query — people commit to the
/// wrong neighbouring key more readily on the first keystroke.
pub const BEGIN_INSERTION_PENALTY: f32 = 0.05;
pub const BEGIN_SUBSTITUTION_PENALTY: f32 = 0.10;

/// Base rates for each of the five outcomes of a single keypress, before
/// the per-keypress error-rate scaling and the deletion's
/// position/distance adjustment below.
const BASE_INSERTION: f32 = 0.16;
const BASE_SUBSTITUTION: f32 = 0.17;
const BASE_DELETION: f32 = 0.60;
const BASE_TRANSPOSITION: f32 = 0.06;

/// Per-key correct-press rate; deliberately not scaled by
/// `KEYPRESS_ERROR_RATE` a second time (it already *is* `1 -
/// KEYPRESS_ERROR_RATE`).
const HIT_PROB: f32 = 1.0 - KEYPRESS_ERROR_RATE;

/// The five per-keypress probabilities this model assigns for a given
/// candidate. Unlike a typical noisy-channel table these do **not** sum to
/// 1 — each is an independent per-operation weight the searcher applies to
/// `query_prob`, not a partition of keypress outcomes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorProbs {
    pub hit: f32,
    pub insertion: f32,
    pub substitution: f32,
    pub deletion: f32,
    pub transposition: f32,
}

/// Computes `ErrorProbs` for a candidate sitting at trie node character
/// `node_char`, with the query's next unconsumed byte at `query[query_pos]`
/// (used only to scale `deletion`, the one class with position/geometry
/// conditioning).
///
/// `query_pos` is relative to the already-leading-trimmed query: position 0
/// is the very first character the user typed.
pub fn error_probabilities(
    keyboard: &Keyboard,
    query: &[u8],
    query_pos: usize,
    node_char: u8,
) -> ErrorProbs {
    let mut deletion = BASE_DELETION;
    if query_pos == 0 {
        deletion *= 0.05;
    } else if query_pos == 1 {
        deletion *= 0.1;
    } else if keyboard.distance(query[query_pos], node_char) > 2 {
        // insertion errors (of the kind deletion models, from the trie's
        // point of view) are usually near keys; far apart is suspicious
        deletion *= 0.25;
    }

    ErrorProbs {
        hit: HIT_PROB,
        insertion: BASE_INSERTION * KEYPRESS_ERROR_RATE,
        substitution: BASE_SUBSTITUTION * KEYPRESS_ERROR_RATE,
        deletion: deletion * KEYPRESS_ERROR_RATE,
        transposition: BASE_TRANSPOSITION * KEYPRESS_ERROR_RATE,
    }
}

/// Probability mass `transition_prob` assigns to a substitution or
/// insertion landing on a key at keyboard distance `d` from the intended
/// key, bucketed the way `Autocomplete.cpp`'s `transition_prob` does.
fn distance_bucket_prob(distance: u32) -> f32 {
    match distance {
        0 => 0.95,
        1 => 0.10,
        d if d < 4 => 0.05,
        d if d < 8 => 0.0025,
        _ => 0.00005,
    }
}

/// The edge-transition weight used by both the `insert` and `substitute`
/// operations: how plausible is it that `node_char` is what `query_char`
/// was meant to produce, given keyboard geometry? Returns `None` for a
/// terminator node (no expansion allowed through it). The returned bool is
/// `true` exactly when the characters share a key (keyboard distance 0) —
/// "exact match", used by callers to route that case through `hit` instead.
///
/// `begin_penalty` (one of [`BEGIN_INSERTION_PENALTY`] /
/// [`BEGIN_SUBSTITUTION_PENALTY`]) only applies at the very first query
/// character, and only when the transition isn't already an exact match.
pub fn transition_prob(
    keyboard: &Keyboard,
    node_char: u8,
    query_char: u8,
    at_query_start: bool,
    begin_penalty: f32,
) -> Option<(f32, bool)> {
    if node_char == TERMINATOR {
        return None;
    }
    let distance = keyboard.distance(node_char, query_char);
    let mut prob = distance_bucket_prob(distance);
    if at_query_start && distance > 0 {
        prob *= begin_penalty;
    }
    Some((prob, distance == 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deletion_scales_down_near_query_start() {
        let kb = Keyboard::default();
        let p0 = error_probabilities(&kb, b"abcdef", 0, b'a');
        let p1 = error_probabilities(&kb, b"abcdef", 1, b'a');
        let mid = error_probabilities(&kb, b"abcdef", 3, b'a');
        assert!(p0.deletion < p1.deletion);
        assert!(p1.deletion < mid.deletion);
    }

    #[test]
    fn deletion_scales_down_for_distant_keys_past_the_second_position() {
        let kb = Keyboard::default();
        // 'q' and 'p' are at opposite ends of the top row: keyboard distance > 2.
        let far = error_probabilities(&kb, b"xxxq", 3, b'p');
        let near = error_probabilities(&kb, b"xxxq", 3, b'q');
        assert!(far.deletion < near.deletion);
    }

    #[test]
    fn hit_is_the_flat_keypress_rate() {
        let kb = Keyboard::default();
        for pos in 0..4 {
            assert_eq!(error_probabilities(&kb, b"abcd", pos, b'a').hit, 0.95);
        }
    }

    #[test]
    fn exact_match_is_flagged_and_scores_highest() {
        let kb = Keyboard::default();
        let (prob, exact) = transition_prob(&kb, b'q', b'q', false, BEGIN_SUBSTITUTION_PENALTY).unwrap();
        assert!(exact);
        assert_eq!(prob, 0.95);
    }

    #[test]
    fn terminator_node_never_offers_a_transition() {
        let kb = Keyboard::default();
        assert!(transition_prob(&kb, TERMINATOR, b'a', false, BEGIN_SUBSTITUTION_PENALTY).is_none());
    }

    #[test]
    fn begin_of_query_penalty_only_applies_to_non_exact_transitions_at_position_zero() {
        let kb = Keyboard::default();
        let (begin, _) = transition_prob(&kb, b'q', b'w', true, BEGIN_SUBSTITUTION_PENALTY).unwrap();
        let (mid, _) = transition_prob(&kb, b'q', b'w', false, BEGIN_SUBSTITUTION_PENALTY).unwrap();
        assert!(begin < mid);
    }
}
