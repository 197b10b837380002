use std::path::PathBuf;

/// Failure modes for [`crate::autocomplete::trie::Trie::load`].
///
/// Search itself never errors — malformed, empty, or off-keyboard queries
/// all produce a well-defined (possibly empty) result list. This is the
/// only fallible entry point in the crate.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot open dictionary file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: malformed dictionary line")]
    MalformedLine { path: PathBuf, line: usize },
    #[error("{path}:{line}: weight must be a positive number, got {weight}")]
    NonPositiveWeight {
        path: PathBuf,
        line: usize,
        weight: f32,
    },
    #[error("{path} contains no entries")]
    EmptyDictionary { path: PathBuf },
}
