// ============================================================
// Layer 3 — Fragment Domain Type
// ============================================================
// Represents a bounded-length piece of text produced by the
// splitter, wrapped with enough metadata to trace it back to
// its origin. This is the unit that gets embedded, indexed,
// retrieved, and stuffed into the generation prompt.
//
// Why fragments instead of whole pages?
//   - Embedding models have an input length limit
//   - Retrieval is sharper over small, focused passages
//   - The generation model's context window is bounded, so
//     we can only afford a handful of passages per question
//
// Fragment ids are dense indices (0, 1, 2, ...) assigned in
// document order. The vector index stores vectors in the same
// order, so a fragment id doubles as a row number.
//
// Reference: Rust Book §5 (Structs)

use serde::{Deserialize, Serialize};

/// A splitter-produced passage of text with provenance metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    /// Dense index of this fragment within the ingested corpus.
    /// Doubles as the row number in the vector index.
    pub id: usize,

    /// Source document this fragment came from (filename or path)
    pub source: String,

    /// 1-based page number the fragment starts on
    pub page: u32,

    /// The fragment text itself, already cleaned
    pub text: String,
}

impl Fragment {
    /// Create a new Fragment
    pub fn new(id: usize, source: impl Into<String>, page: u32, text: impl Into<String>) -> Self {
        Self {
            id,
            source: source.into(),
            page,
            text: text.into(),
        }
    }
}

/// A fragment paired with its similarity score from retrieval.
/// Scores are cosine similarities in [-1, 1]; higher is closer.
#[derive(Debug, Clone)]
pub struct ScoredFragment {
    pub fragment: Fragment,
    pub score: f32,
}
