// ============================================================
// Layer 2 — IngestUseCase
// ============================================================
// Orchestrates the full ingest pipeline in order:
//
//   Step 1: Load the PDF page by page   (Layer 4 - data)
//   Step 2: Clean each page's text      (Layer 4 - data)
//   Step 3: Split pages into fragments  (Layer 4 - data)
//   Step 4: Embed every fragment        (Layer 5 - ml)
//   Step 5: Build the vector index      (Layer 6 - retrieval)
//   Step 6: Persist index + fragments   (Layer 7 - infra)
//   Step 7: Write the pipeline manifest (Layer 7 - infra)
//
// Splitting happens per page, not on the concatenated
// document, so every fragment keeps the page number it
// started on — that provenance survives all the way into
// the answer's context.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{loader::PdfLoader, preprocessor::Preprocessor, splitter::RecursiveSplitter};
use crate::domain::fragment::Fragment;
use crate::domain::traits::{DocumentSource, TextEmbedder};
use crate::infra::index_store::IndexStore;
use crate::infra::manifest::{ManifestStore, PipelineManifest};
use crate::ml::embedder::SentenceEmbedder;
use crate::retrieval::index::VectorIndex;

// ─── Ingest Configuration ────────────────────────────────────────────────────
// All parameters for an ingest run. Serialisable so the values
// can be echoed into the pipeline manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub pdf_path: String,
    pub index_dir: String,
    pub embed_model_dir: String,
    pub gen_model_dir: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub max_new_tokens: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            pdf_path: "data/document.pdf".to_string(),
            index_dir: "data/index".to_string(),
            embed_model_dir: "models/all-MiniLM-L6-v2".to_string(),
            gen_model_dir: "models/flan-t5-base".to_string(),
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 3,
            max_new_tokens: 200,
        }
    }
}

// ─── IngestUseCase ────────────────────────────────────────────────────────────
// Owns the config and runs the full ingest pipeline.
pub struct IngestUseCase {
    config: IngestConfig,
}

impl IngestUseCase {
    /// Create a new IngestUseCase with the given configuration
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Execute the full ingest pipeline end to end.
    /// Returns the number of fragments indexed.
    pub fn execute(&self) -> Result<usize> {
        let cfg = &self.config;

        // ── Step 1: Load the PDF ─────────────────────────────────────────────
        tracing::info!("Loading PDF '{}'", cfg.pdf_path);
        let loader = PdfLoader::new(&cfg.pdf_path);
        let document = loader.load()?;

        // ── Steps 2+3: Clean and split, page by page ─────────────────────────
        // Fragments carry (source, page) provenance, and ids are
        // assigned in document order — the index relies on that.
        let preprocessor = Preprocessor::new();
        let splitter = RecursiveSplitter::new(cfg.chunk_size, cfg.chunk_overlap);

        let mut fragments: Vec<Fragment> = Vec::new();
        for page in &document.pages {
            let clean = preprocessor.clean(&page.text);
            for text in splitter.split(&clean) {
                let id = fragments.len();
                fragments.push(Fragment::new(id, &document.source, page.number, text));
            }
        }
        tracing::info!(
            "Split {} pages into {} fragments",
            document.pages.len(),
            fragments.len()
        );

        if fragments.is_empty() {
            bail!(
                "'{}' produced no fragments — nothing to index",
                cfg.pdf_path
            );
        }

        // ── Step 4: Embed every fragment ─────────────────────────────────────
        let embedder = SentenceEmbedder::from_dir(&cfg.embed_model_dir)?;
        let texts: Vec<String> = fragments.iter().map(|f| f.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts)?;
        tracing::info!(
            "Embedded {} fragments ({} dimensions)",
            vectors.len(),
            embedder.dimension()
        );

        // ── Step 5: Build the vector index ───────────────────────────────────
        // Vectors are added in fragment order, so row i holds
        // fragment i's embedding.
        let mut index = VectorIndex::new(embedder.dimension());
        for vector in vectors {
            index.add(vector)?;
        }

        // ── Step 6: Persist index + fragment table ───────────────────────────
        let index_store = IndexStore::new(&cfg.index_dir);
        index_store.save(&index, &fragments)?;

        // ── Step 7: Write the pipeline manifest ──────────────────────────────
        // `ask` rebuilds the whole chain from this file
        let manifest = PipelineManifest {
            source: document.source.clone(),
            embed_model_dir: cfg.embed_model_dir.clone(),
            gen_model_dir: cfg.gen_model_dir.clone(),
            chunk_size: cfg.chunk_size,
            chunk_overlap: cfg.chunk_overlap,
            top_k: cfg.top_k,
            max_new_tokens: cfg.max_new_tokens,
            embedding_dimension: embedder.dimension(),
            fragment_count: fragments.len(),
        };
        ManifestStore::new(&cfg.index_dir).save(&manifest)?;

        tracing::info!(
            "Ingest complete: {} fragments indexed into '{}'",
            fragments.len(),
            cfg.index_dir
        );
        Ok(fragments.len())
    }
}
