// ============================================================
// Layer 6 — Retrieval Layer
// ============================================================
// Nearest-neighbour search over fragment embeddings.
//
//   index.rs     — VectorIndex, a flat exact cosine index.
//                  All vectors are L2-normalised, so similarity
//                  is a single dot product per row. Exact
//                  search is O(N) per query, which is more than
//                  fast enough for one document's fragments —
//                  the same trade-off FAISS makes with its flat
//                  index type.
//
//   retriever.rs — Retriever, the thin top-k configuration
//                  wrapper that resolves index hits back into
//                  fragments with scores.
//
// Reference: Johnson et al. (2017) Billion-scale similarity
//            search with GPUs (FAISS)

/// Flat exact cosine similarity index
pub mod index;

/// Top-k retriever over the index
pub mod retriever;
