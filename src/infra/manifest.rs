// ============================================================
// Layer 7 — Pipeline Manifest
// ============================================================
// Saves and restores the pipeline manifest — the serialized
// "QA chain" of this system.
//
// Why a manifest instead of serialising the models?
//   Model weights already live on disk in their snapshot
//   directories; copying gigabytes into a pipeline file would
//   gain nothing. What `ask` actually needs to rebuild the
//   chain is WHICH models were used, HOW the text was split,
//   and WHERE the index lives — a few hundred bytes of JSON.
//
// File naming convention:
//   <index_dir>/
//     index.bin       ← vectors + fragments (index_store.rs)
//     manifest.json   ← this file
//
// The manifest also records the embedding dimension and the
// fragment count so a mismatched embed model (different
// checkpoint than at ingest time) fails fast with a clear
// message instead of garbage retrieval.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const MANIFEST_FILE: &str = "manifest.json";

/// Everything needed to rebuild the QA chain for `ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineManifest {
    /// Source PDF the index was built from (informational)
    pub source: String,

    /// Snapshot directory of the sentence-embedding model
    pub embed_model_dir: String,

    /// Snapshot directory of the generation model
    pub gen_model_dir: String,

    /// Splitter parameters used at ingest time
    pub chunk_size: usize,
    pub chunk_overlap: usize,

    /// Retriever result count
    pub top_k: usize,

    /// Generation token budget
    pub max_new_tokens: usize,

    /// Output dimension of the embedding model at ingest time
    pub embedding_dimension: usize,

    /// Number of fragments that were indexed
    pub fragment_count: usize,
}

pub struct ManifestStore {
    dir: PathBuf,
}

impl ManifestStore {
    /// Create a new ManifestStore.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save the manifest as pretty-printed JSON.
    pub fn save(&self, manifest: &PipelineManifest) -> Result<()> {
        let path = self.dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(manifest)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write manifest to '{}'", path.display()))?;

        tracing::debug!("Saved pipeline manifest to '{}'", path.display());
        Ok(())
    }

    /// Load the manifest back from JSON.
    pub fn load(&self) -> Result<PipelineManifest> {
        let path = self.dir.join(MANIFEST_FILE);

        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read manifest from '{}'. \
                 Make sure you have run 'ingest' before 'ask'.",
                path.display()
            )
        })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Manifest '{}' is not valid JSON", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PipelineManifest {
        PipelineManifest {
            source: "handbook.pdf".to_string(),
            embed_model_dir: "models/all-MiniLM-L6-v2".to_string(),
            gen_model_dir: "models/flan-t5-base".to_string(),
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 3,
            max_new_tokens: 200,
            embedding_dimension: 384,
            fragment_count: 42,
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ManifestStore::new(tmp.path());

        store.save(&sample()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.source, "handbook.pdf");
        assert_eq!(loaded.chunk_size, 500);
        assert_eq!(loaded.embedding_dimension, 384);
        assert_eq!(loaded.fragment_count, 42);
    }

    #[test]
    fn test_load_without_ingest_fails_helpfully() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ManifestStore::new(tmp.path());
        let err = store.load().unwrap_err().to_string();
        assert!(err.contains("ingest"), "unhelpful error: {err}");
    }
}
