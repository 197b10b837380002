//! Error-tolerant autocomplete over a weighted prefix tree.
//!
//! Builds a [`Trie`] from a dictionary of weighted words, then answers
//! queries with a best-first search (`autocomplete::search`) over a typing
//! error model (`autocomplete::error_model`) calibrated by a keyboard's
//! physical key layout (`autocomplete::keyboard`). See `DESIGN.md` for the
//! design rationale.

pub mod autocomplete;
pub mod error;

use std::path::Path;

pub use crate::autocomplete::keyboard::Keyboard;
pub use crate::autocomplete::search::SearchLimits;
pub use crate::autocomplete::trie::Trie;
pub use crate::error::LoadError;

/// Top-level façade: a loaded dictionary, a keyboard layout, and the
/// search limits to apply, bundled for repeated querying.
///
/// `Autocompleter` is `Send + Sync` — nothing behind it is mutated once
/// built, so one instance can be shared across threads (e.g. behind an
/// `Arc`) without synchronisation.
#[derive(Debug)]
pub struct Autocompleter {
    trie: Trie,
    keyboard: Keyboard,
    limits: SearchLimits,
}

impl Autocompleter {
    /// Loads a dictionary from `path` (see `Trie::load` for the file
    /// format) and pairs it with the reference keyboard layout and
    /// default search limits.
    pub fn load(path: impl AsRef<Path>) -> Result<Autocompleter, LoadError> {
        Ok(Autocompleter {
            trie: Trie::load(path)?,
            keyboard: Keyboard::default(),
            limits: SearchLimits::default(),
        })
    }

    /// Replaces the keyboard layout used to weigh substitution errors.
    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = keyboard;
        self
    }

    /// Replaces the default iteration cap / pruning floor.
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns up to 5 completions for `query`, most likely first.
    pub fn autocomplete(&self, query: &str) -> Vec<String> {
        self.autocomplete_k(query, 5)
    }

    /// Returns up to `max_results` completions for `query`, most likely
    /// first, using this instance's configured limits.
    pub fn autocomplete_k(&self, query: &str, max_results: usize) -> Vec<String> {
        self.autocomplete_with_limits(query, max_results, &self.limits)
    }

    /// Returns up to `max_results` completions for `query`, overriding the
    /// configured [`SearchLimits`] for this call only.
    pub fn autocomplete_with_limits(
        &self,
        query: &str,
        max_results: usize,
        limits: &SearchLimits,
    ) -> Vec<String> {
        autocomplete::search::autocomplete(
            &self.trie,
            &self.keyboard,
            limits,
            query.as_bytes(),
            max_results,
        )
    }
}
