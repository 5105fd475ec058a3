// ============================================================
// Layer 5 — ML / Model Layer (Candle)
// ============================================================
// This layer contains ALL Candle framework specific code.
// No other layer imports from candle directly — only this one.
//
// Why isolate Candle code here?
//   - If Candle's API changes, we only update this layer
//   - Other layers are testable without model weights
//   - The two models are clearly separated from data loading
//     and application logic
//
// What's in this layer:
//
//   embedder.rs  — Sentence-embedding model (MiniLM class)
//                  Loads a BERT-family encoder from a local
//                  directory, mean-pools token states and
//                  L2-normalises the result so dot product
//                  equals cosine similarity.
//
//   generator.rs — Local generation model (flan-t5 class)
//                  Loads a T5-family seq2seq model, encodes
//                  the prompt once, then decodes token by
//                  token up to a configured budget.
//
// Both models load from a directory containing config.json,
// tokenizer.json and model.safetensors — the standard
// HuggingFace snapshot layout, so any compatible checkpoint
// downloaded from the Hub works unchanged.
//
// Reference: candle-transformers documentation
//            Vaswani et al. (2017) Attention Is All You Need
//            Raffel et al. (2020) T5

/// Sentence-embedding model — text to fixed-dimension vectors
pub mod embedder;

/// Seq2seq generation model — prompt to answer text
pub mod generator;
