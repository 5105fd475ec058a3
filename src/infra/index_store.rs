// ============================================================
// Layer 7 — Index Store
// ============================================================
// Persists the vector index and the fragment table to disk as
// ONE bincode file.
//
// Why one file instead of two?
//   Fragment ids are row numbers in the index. Storing the two
//   structures in separate files would let them drift apart
//   (e.g. a crash between writes, or a stale file from an
//   earlier ingest). One atomic-ish write keeps the invariant
//   "row i ↔ fragment i" true on disk too.
//
// File layout:
//   <index_dir>/index.bin — bincode(PersistedIndex)
//
// Load verifies the invariant and rejects an empty index with
// a message pointing at `ingest`, since an empty index would
// make every `ask` return nothing.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use crate::domain::fragment::Fragment;
use crate::retrieval::index::VectorIndex;

const INDEX_FILE: &str = "index.bin";

/// Everything `ask` needs to search: the index and the texts
/// its rows point at.
#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    index: VectorIndex,
    fragments: Vec<Fragment>,
}

pub struct IndexStore {
    /// Directory where the index file is stored
    dir: PathBuf,
}

impl IndexStore {
    /// Create a new IndexStore.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save the index and fragment table together.
    pub fn save(&self, index: &VectorIndex, fragments: &[Fragment]) -> Result<()> {
        if index.len() != fragments.len() {
            bail!(
                "Refusing to save: index has {} rows but {} fragments",
                index.len(),
                fragments.len()
            );
        }

        let path = self.dir.join(INDEX_FILE);
        let file = fs::File::create(&path)
            .with_context(|| format!("Cannot create index file '{}'", path.display()))?;
        let writer = BufWriter::new(file);

        let persisted = PersistedIndex {
            index: index.clone(),
            fragments: fragments.to_vec(),
        };
        bincode::serialize_into(writer, &persisted)
            .with_context(|| format!("Cannot write index to '{}'", path.display()))?;

        tracing::info!(
            "Saved index with {} vectors to '{}'",
            index.len(),
            path.display()
        );
        Ok(())
    }

    /// Load the index and fragment table back from disk.
    pub fn load(&self) -> Result<(VectorIndex, Vec<Fragment>)> {
        let path = self.dir.join(INDEX_FILE);
        let file = fs::File::open(&path).with_context(|| {
            format!(
                "Cannot open index file '{}'. Have you run 'ingest' first?",
                path.display()
            )
        })?;
        let reader = BufReader::new(file);

        let persisted: PersistedIndex = bincode::deserialize_from(reader)
            .with_context(|| format!("Index file '{}' is corrupt", path.display()))?;

        if persisted.index.len() != persisted.fragments.len() {
            bail!(
                "Index file '{}' is inconsistent: {} rows vs {} fragments",
                path.display(),
                persisted.index.len(),
                persisted.fragments.len()
            );
        }
        if persisted.index.is_empty() {
            bail!(
                "Index file '{}' is empty. Re-run 'ingest' on a PDF with extractable text.",
                path.display()
            );
        }

        tracing::info!(
            "Loaded index with {} vectors (dimension {})",
            persisted.index.len(),
            persisted.index.dimension()
        );
        Ok((persisted.index, persisted.fragments))
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

    #[test]
    fn test_save_and_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path());

        let mut index = VectorIndex::new(3);
        index.add(unit(&[1.0, 0.0, 0.0])).unwrap();
        index.add(unit(&[0.0, 1.0, 0.0])).unwrap();
        let fragments = vec![
            Fragment::new(0, "doc.pdf", 1, "first passage"),
            Fragment::new(1, "doc.pdf", 2, "second passage"),
        ];

        store.save(&index, &fragments).unwrap();
        let (loaded_index, loaded_fragments) = store.load().unwrap();

        assert_eq!(loaded_index.len(), 2);
        assert_eq!(loaded_index.dimension(), 3);
        assert_eq!(loaded_fragments.len(), 2);
        assert_eq!(loaded_fragments[1].text, "second passage");

        // Search still works after the round trip
        let hits = loaded_index.search(&unit(&[1.0, 0.0, 0.0]), 1).unwrap();
        assert_eq!(hits[0].fragment_id, 0);
    }

    #[test]
    fn test_load_without_ingest_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path());
        let err = store.load().unwrap_err().to_string();
        assert!(err.contains("ingest"), "unhelpful error: {err}");
    }

    #[test]
    fn test_refuses_mismatched_tables() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path());

        let mut index = VectorIndex::new(2);
        index.add(unit(&[1.0, 0.0])).unwrap();
        // One row, zero fragments
        assert!(store.save(&index, &[]).is_err());
    }

    #[test]
    fn test_refuses_empty_index_on_load() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path());
        store.save(&VectorIndex::new(2), &[]).unwrap();
        assert!(store.load().is_err());
    }
}
