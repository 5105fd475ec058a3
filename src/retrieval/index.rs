// ============================================================
// Layer 6 — Vector Index
// ============================================================
// A flat exact nearest-neighbour index over L2-normalised
// embedding vectors.
//
// Invariants:
//   - Every stored vector has exactly `dimension` components
//   - Vectors are stored in fragment-id order: row i belongs
//     to fragment id i
//   - Inputs are L2-normalised, so dot product == cosine
//     similarity and every score lies in [-1, 1]
//
// Search scans every row, scores it against the query, and
// returns the k best in descending score order. k is clamped
// to the number of stored vectors.
//
// The index is a plain serde struct; persistence lives in the
// infra layer (Layer 7), not here.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// One search hit: a fragment id and its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Fragment id == row number in the index
    pub fragment_id: usize,
    /// Cosine similarity to the query, in [-1, 1]
    pub score: f32,
}

/// Flat exact cosine similarity index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    /// Row i is the embedding of fragment id i
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Create an empty index for vectors of the given dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Append a vector. The new row's number is the fragment id
    /// of the text it embeds — callers add vectors in fragment
    /// order.
    pub fn add(&mut self, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            bail!(
                "Vector dimension mismatch: index holds {}-dim vectors, got {}",
                self.dimension,
                vector.len()
            );
        }
        self.vectors.push(vector);
        Ok(())
    }

    /// Return the k most similar rows to the query, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Hit>> {
        if query.len() != self.dimension {
            bail!(
                "Query dimension mismatch: index holds {}-dim vectors, got {}",
                self.dimension,
                query.len()
            );
        }

        let mut hits: Vec<Hit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, v)| Hit {
                fragment_id: id,
                score: dot(query, v),
            })
            .collect();

        // Descending score. The inputs are finite (normalised
        // embeddings), so total_cmp only breaks exact ties.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k.min(self.vectors.len()));
        Ok(hits)
    }

    /// Number of vectors in the index
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// True when no vectors have been added yet
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The dimension every stored vector must have
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Dot product of two equal-length vectors.
/// On normalised inputs this IS the cosine similarity.
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Normalise a vector so the index's cosine assumption holds
    fn unit(v: &[f32]) -> Vec<f32> {
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        v.iter().map(|x| x / norm).collect()
    }

    #[test]
    fn test_nearest_neighbour_wins() {
        let mut idx = VectorIndex::new(3);
        idx.add(unit(&[1.0, 0.0, 0.0])).unwrap();
        idx.add(unit(&[0.0, 1.0, 0.0])).unwrap();
        idx.add(unit(&[0.9, 0.1, 0.0])).unwrap();

        let hits = idx.search(&unit(&[1.0, 0.0, 0.0]), 2).unwrap();
        assert_eq!(hits.len(), 2);
        // Exact match first, the near-parallel vector second
        assert_eq!(hits[0].fragment_id, 0);
        assert!((hits[0].score - 1.0).abs() < 1e-5);
        assert_eq!(hits[1].fragment_id, 2);
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn test_k_is_clamped_to_len() {
        let mut idx = VectorIndex::new(2);
        idx.add(unit(&[1.0, 0.0])).unwrap();
        let hits = idx.search(&unit(&[1.0, 0.0]), 10).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_empty_index_returns_no_hits() {
        let idx = VectorIndex::new(4);
        let hits = idx.search(&[0.5, 0.5, 0.5, 0.5], 3).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_rejects_wrong_dimension_on_add() {
        let mut idx = VectorIndex::new(3);
        assert!(idx.add(vec![1.0, 0.0]).is_err());
    }

    #[test]
    fn test_rejects_wrong_dimension_on_search() {
        let idx = VectorIndex::new(3);
        assert!(idx.search(&[1.0, 0.0], 1).is_err());
    }

    #[test]
    fn test_scores_descend() {
        let mut idx = VectorIndex::new(2);
        idx.add(unit(&[1.0, 0.0])).unwrap();
        idx.add(unit(&[0.0, 1.0])).unwrap();
        idx.add(unit(&[1.0, 1.0])).unwrap();

        let hits = idx.search(&unit(&[1.0, 0.2]), 3).unwrap();
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
