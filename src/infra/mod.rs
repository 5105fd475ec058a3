// ============================================================
// Layer 7 — Infrastructure Layer
// ============================================================
// Handles persistence — the cross-cutting concern that turns
// a one-shot ingest into something `ask` can reuse:
//
//   index_store.rs — Vector index + fragment table persistence
//                    Serialises both together with bincode so
//                    they can never drift apart on disk.
//
//   manifest.rs    — Pipeline manifest persistence
//                    A JSON file recording which models,
//                    splitter parameters and retriever settings
//                    produced the index. `ask` rebuilds the
//                    whole QA chain from this file alone.
//
// Why is this a separate layer?
//   The retrieval layer defines WHAT an index is; this layer
//   decides WHERE and HOW it lives on disk. Swapping bincode
//   files for a real vector database would only touch this
//   layer.
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Vector index + fragment table save/load (bincode)
pub mod index_store;

/// Pipeline manifest save/load (JSON)
pub mod manifest;
