// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Traits are Rust's way of defining shared behaviour —
// similar to interfaces in Java or abstract classes in Python.
//
// By programming against traits instead of concrete types,
// we can swap implementations without changing the code
// that uses them. For example:
//   - PdfLoader implements DocumentSource
//   - A future DocxLoader could also implement DocumentSource
//   - The application layer only sees DocumentSource
//     and works with both without any changes
//
// This is the Dependency Inversion Principle from SOLID,
// applied using Rust's trait system.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Object Oriented Patterns)

use anyhow::Result;
use crate::domain::document::Document;

// ─── DocumentSource ───────────────────────────────────────────────────────────
/// Any component that can load a document from a source.
///
/// Implementations:
///   - PdfLoader → loads a .pdf file page by page
///   - (future) DocxLoader → loads from .docx files
///   - (future) WebLoader  → loads from URLs
pub trait DocumentSource {
    /// Load the document, with its pages in reading order.
    fn load(&self) -> Result<Document>;
}

// ─── TextEmbedder ─────────────────────────────────────────────────────────────
/// Any component that maps text to a fixed-dimension vector such
/// that semantically similar texts land close together under
/// cosine similarity.
///
/// Implementations:
///   - SentenceEmbedder → MiniLM-class model via Candle
pub trait TextEmbedder {
    /// Embed a batch of texts. Returns one vector per input text,
    /// in the same order. All vectors are L2-normalised.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text (convenience over embed_batch).
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut out = self.embed_batch(&[text.to_string()])?;
        out.pop()
            .ok_or_else(|| anyhow::anyhow!("Embedder returned no vector"))
    }

    /// The output dimension of this embedder's vectors.
    fn dimension(&self) -> usize;
}

// ─── AnswerGenerator ──────────────────────────────────────────────────────────
/// Any component that turns a fully assembled prompt into
/// generated answer text.
///
/// Takes &mut self because autoregressive decoding mutates the
/// model's KV cache between steps.
///
/// Implementations:
///   - Generator → flan-t5-class model via Candle
pub trait AnswerGenerator {
    /// Generate text for the given prompt, bounded by the
    /// implementation's configured token budget.
    fn generate(&mut self, prompt: &str) -> Result<String>;

    /// Count how many input tokens the prompt occupies, using the
    /// same tokenizer generate() will use. Callers size their
    /// prompts with this so nothing is lost to truncation.
    fn count_tokens(&self, text: &str) -> Result<usize>;

    /// Maximum number of input tokens generate() accepts.
    fn input_budget(&self) -> usize;
}
