//! Structural invariants of `Trie::load`, checked over randomly generated
//! dictionaries via the public API (no internal module access from an
//! integration test, so invariants are observed indirectly through
//! `autocomplete`'s own ranking, which only holds if the trie is well
//! formed).

use std::io::Write;

use fuzzyprefix::Autocompleter;
use proptest::prelude::*;

fn words() -> impl Strategy<Value = Vec<(String, u32)>> {
    prop::collection::vec(
        ("[a-z]{1,8}", 1u32..1000),
        1..20,
    )
}

fn dictionary_file(entries: &[(String, u32)]) -> std::path::PathBuf {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let id = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "fuzzyprefix-proptest-{}-{id}.txt",
        std::process::id()
    ));
    let mut file = std::fs::File::create(&path).unwrap();
    for (word, weight) in entries {
        writeln!(file, "{weight} {word}").unwrap();
    }
    path
}

proptest! {
    /// Any word inserted with a positive weight is findable by querying
    /// its own exact spelling.
    #[test]
    fn every_inserted_word_is_its_own_best_completion(entries in words()) {
        let path = dictionary_file(&entries);
        let ac = Autocompleter::load(&path).unwrap();
        for (word, _) in &entries {
            let results = ac.autocomplete_k(word, entries.len().max(1));
            prop_assert!(results.contains(word), "missing {word:?} in {results:?}");
        }
        let _ = std::fs::remove_file(&path);
    }

    /// Loading the same dictionary twice produces the same completions
    /// for the same query (the load/finalize pass is deterministic).
    #[test]
    fn load_is_deterministic(entries in words()) {
        let path = dictionary_file(&entries);
        let first = Autocompleter::load(&path).unwrap();
        let second = Autocompleter::load(&path).unwrap();
        for (word, _) in &entries {
            prop_assert_eq!(
                first.autocomplete_k(word, 5),
                second.autocomplete_k(word, 5)
            );
        }
        let _ = std::fs::remove_file(&path);
    }
}
