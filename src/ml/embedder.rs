// ============================================================
// Layer 5 — Sentence Embedder
// ============================================================
// Wraps a BERT-family sentence-embedding model (MiniLM class,
// e.g. all-MiniLM-L6-v2) behind the TextEmbedder trait.
//
// The model directory must contain the standard HuggingFace
// snapshot files:
//   config.json        — architecture hyperparameters
//   tokenizer.json     — WordPiece tokenizer
//   model.safetensors  — the weights
//
// From token states to ONE vector per text:
//   The encoder outputs a [batch, tokens, hidden] tensor.
//   Sentence-embedding models are trained with MEAN POOLING:
//   average the token states (ignoring padding positions via
//   the attention mask), then L2-normalise. After
//   normalisation, dot product == cosine similarity, which is
//   what the vector index relies on.

use anyhow::{anyhow, Context, Result};
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use std::path::Path;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::domain::traits::TextEmbedder;

// Texts per forward pass — bounds peak memory during ingest
const BATCH_SIZE: usize = 16;
// BERT positional embedding limit
const MAX_TOKENS: usize = 512;

pub struct SentenceEmbedder {
    model:     BertModel,
    tokenizer: Tokenizer,
    device:    Device,
    dimension: usize,
}

impl SentenceEmbedder {
    /// Load the embedding model from a local snapshot directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let device = Device::cuda_if_available(0)?;

        let config: BertConfig = read_config(&dir.join("config.json"))?;
        let dimension = config.hidden_size;

        // Pad to the longest sequence in each batch so the whole
        // batch goes through in one tensor
        let mut tokenizer = Tokenizer::from_file(dir.join("tokenizer.json"))
            .map_err(|e| anyhow!("Cannot load tokenizer from '{}': {e}", dir.display()))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Cannot configure truncation: {e}"))?;

        let weights = dir.join("model.safetensors");
        // Safety: the safetensors file is memory-mapped read-only
        // and must not be modified while the model is alive
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights.clone()], DTYPE, &device)
                .with_context(|| format!("Cannot load weights from '{}'", weights.display()))?
        };
        let model = BertModel::load(vb, &config)
            .context("Cannot build embedding model from weights")?;

        tracing::info!(
            "Embedding model loaded from '{}' (dimension {}, device {:?})",
            dir.display(),
            dimension,
            device
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            dimension,
        })
    }

    /// Run one padded batch through the encoder and pool.
    fn embed_one_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow!("Tokenisation failed: {e}"))?;

        // Batch-longest padding makes every row the same length,
        // so the rows stack into one rectangular tensor
        let id_rows = encodings
            .iter()
            .map(|e| Tensor::new(e.get_ids(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let mask_rows = encodings
            .iter()
            .map(|e| Tensor::new(e.get_attention_mask(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;

        let input_ids = Tensor::stack(&id_rows, 0)?;
        let attention_mask = Tensor::stack(&mask_rows, 0)?;
        // Single-segment input → all token type ids are zero
        let token_type_ids = input_ids.zeros_like()?;

        // [batch, tokens, hidden]
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // ── Mean pooling over real (non-padding) tokens ──────────────────────
        let mask_f = attention_mask.to_dtype(DTYPE)?.unsqueeze(2)?; // [b, t, 1]
        let summed = hidden.broadcast_mul(&mask_f)?.sum(1)?;        // [b, h]
        let counts = mask_f.sum(1)?;                                // [b, 1]
        let pooled = summed.broadcast_div(&counts)?;

        // ── L2 normalisation ─────────────────────────────────────────────────
        // After this, dot product == cosine similarity
        let norms = pooled.sqr()?.sum_keepdim(1)?.sqrt()?;
        let normalised = pooled.broadcast_div(&norms)?;

        Ok(normalised.to_vec2::<f32>()?)
    }
}

impl TextEmbedder for SentenceEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(BATCH_SIZE) {
            vectors.extend(self.embed_one_batch(batch)?);
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Read and parse a model config.json
fn read_config(path: &Path) -> Result<BertConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read model config '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Cannot parse model config '{}'", path.display()))
}
