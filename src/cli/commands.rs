// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `ingest` and `ask`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::ingest_use_case::IngestConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a PDF, split it into fragments, embed them,
    /// and persist a searchable vector index
    Ingest(IngestArgs),

    /// Ask a question over a previously ingested PDF
    Ask(AskArgs),
}

/// All arguments for the `ingest` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Path to the PDF file to index
    #[arg(long, default_value = "data/document.pdf")]
    pub pdf: String,

    /// Directory where the vector index and manifest are written
    #[arg(long, default_value = "data/index")]
    pub index_dir: String,

    /// Snapshot directory of the sentence-embedding model
    /// (config.json, tokenizer.json, model.safetensors)
    #[arg(long, default_value = "models/all-MiniLM-L6-v2")]
    pub embed_model_dir: String,

    /// Snapshot directory of the generation model
    #[arg(long, default_value = "models/flan-t5-base")]
    pub gen_model_dir: String,

    /// Maximum fragment length in characters
    #[arg(long, default_value_t = 500)]
    pub chunk_size: usize,

    /// Characters of trailing context carried into the next fragment
    #[arg(long, default_value_t = 50)]
    pub chunk_overlap: usize,

    /// How many fragments to retrieve per question
    #[arg(long, default_value_t = 3)]
    pub top_k: usize,

    /// Maximum number of tokens the generator may produce
    #[arg(long, default_value_t = 200)]
    pub max_new_tokens: usize,
}

/// Convert CLI IngestArgs into the application-layer IngestConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<IngestArgs> for IngestConfig {
    fn from(a: IngestArgs) -> Self {
        IngestConfig {
            pdf_path: a.pdf,
            index_dir: a.index_dir,
            embed_model_dir: a.embed_model_dir,
            gen_model_dir: a.gen_model_dir,
            chunk_size: a.chunk_size,
            chunk_overlap: a.chunk_overlap,
            top_k: a.top_k,
            max_new_tokens: a.max_new_tokens,
        }
    }
}

/// All arguments for the `ask` command
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The natural language question to answer
    #[arg(long)]
    pub question: String,

    /// Directory holding the persisted index and manifest
    /// (same as used during ingest)
    #[arg(long, default_value = "data/index")]
    pub index_dir: String,
}
