// ============================================================
// Layer 6 — Retriever
// ============================================================
// The thin configuration wrapper over the vector index: it
// fixes the similarity search mode (cosine top-k) and the
// result count, and resolves raw index hits back into
// fragments the application layer can use.
//
// Fragment ids are row numbers in the index (see Layer 3), so
// resolution is a direct slice lookup — a hit with an id
// outside the fragment table would mean the persisted index
// and fragment table are out of sync, which we surface as an
// error rather than silently dropping the hit.

use anyhow::{bail, Result};

use crate::domain::fragment::{Fragment, ScoredFragment};
use crate::retrieval::index::VectorIndex;

pub struct Retriever {
    /// How many fragments to hand to the generation model
    top_k: usize,
}

impl Retriever {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    /// Find the top-k fragments most similar to the query vector.
    pub fn retrieve(
        &self,
        index: &VectorIndex,
        fragments: &[Fragment],
        query: &[f32],
    ) -> Result<Vec<ScoredFragment>> {
        let hits = index.search(query, self.top_k)?;

        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            let Some(fragment) = fragments.get(hit.fragment_id) else {
                bail!(
                    "Index hit refers to fragment {} but only {} fragments are stored — \
                     the index and fragment table are out of sync",
                    hit.fragment_id,
                    fragments.len()
                );
            };
            results.push(ScoredFragment {
                fragment: fragment.clone(),
                score: hit.score,
            });
        }

        tracing::debug!(
            "Retrieved {} fragments (best score {:.4})",
            results.len(),
            results.first().map(|r| r.score).unwrap_or(0.0)
        );

        Ok(results)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn unit(v: &[f32]) -> Vec<f32> {
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        v.iter().map(|x| x / norm).collect()
    }

    fn fragment(id: usize, text: &str) -> Fragment {
        Fragment::new(id, "doc.pdf", 1, text)
    }

    #[test]
    fn test_resolves_hits_to_fragments() {
        let mut idx = VectorIndex::new(2);
        idx.add(unit(&[1.0, 0.0])).unwrap();
        idx.add(unit(&[0.0, 1.0])).unwrap();
        let fragments = vec![fragment(0, "about cats"), fragment(1, "about dogs")];

        let r = Retriever::new(1);
        let results = r.retrieve(&idx, &fragments, &unit(&[0.1, 1.0])).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].fragment.text, "about dogs");
    }

    #[test]
    fn test_out_of_sync_tables_error() {
        let mut idx = VectorIndex::new(2);
        idx.add(unit(&[1.0, 0.0])).unwrap();
        // Empty fragment table but non-empty index
        let r = Retriever::new(1);
        assert!(r.retrieve(&idx, &[], &unit(&[1.0, 0.0])).is_err());
    }

    #[test]
    fn test_empty_index_gives_empty_results() {
        let idx = VectorIndex::new(2);
        let r = Retriever::new(3);
        let results = r.retrieve(&idx, &[], &unit(&[1.0, 0.0])).unwrap();
        assert!(results.is_empty());
    }
}
