// ============================================================
// Layer 5 — Answer Generator
// ============================================================
// Wraps a T5-family conditional generation model (flan-t5
// class) behind the AnswerGenerator trait.
//
// T5 is an encoder-decoder model:
//   1. The full prompt (instruction + retrieved context +
//      question) is ENCODED once.
//   2. The DECODER then produces the answer one token at a
//      time, attending to the encoder output at every step.
//      Each new token is fed back in; the KV cache keeps the
//      cost of a step constant.
//
// Decoding stops at the EOS token or after `max_new_tokens`,
// whichever comes first. Sampling is delegated to Candle's
// LogitsProcessor: temperature 0 / None means greedy argmax,
// which is what we want for factual question answering.
//
// Reference: Raffel et al. (2020) T5
//            candle-transformers t5 module

use anyhow::{anyhow, Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::t5;
use std::path::Path;
use tokenizers::Tokenizer;

use crate::domain::traits::AnswerGenerator;

// T5 relative-position buckets cover 512 input tokens
const MAX_INPUT_TOKENS: usize = 512;
// Fixed seed — with greedy decoding the seed is inert, but
// LogitsProcessor requires one
const SEED: u64 = 299792458;

pub struct Generator {
    model:          t5::T5ForConditionalGeneration,
    tokenizer:      Tokenizer,
    config:         t5::Config,
    device:         Device,
    max_new_tokens: usize,
    temperature:    Option<f64>,
}

impl Generator {
    /// Load the generation model from a local snapshot directory
    /// (config.json, tokenizer.json, model.safetensors).
    pub fn from_dir(dir: impl AsRef<Path>, max_new_tokens: usize) -> Result<Self> {
        let dir = dir.as_ref();
        let device = Device::cuda_if_available(0)?;

        let config_path = dir.join("config.json");
        let json = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Cannot read model config '{}'", config_path.display()))?;
        let config: t5::Config = serde_json::from_str(&json)
            .with_context(|| format!("Cannot parse model config '{}'", config_path.display()))?;

        let tokenizer = Tokenizer::from_file(dir.join("tokenizer.json"))
            .map_err(|e| anyhow!("Cannot load tokenizer from '{}': {e}", dir.display()))?;

        let weights = dir.join("model.safetensors");
        // Safety: memory-mapped read-only for the model's lifetime
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights.clone()], DType::F32, &device)
                .with_context(|| format!("Cannot load weights from '{}'", weights.display()))?
        };
        let model = t5::T5ForConditionalGeneration::load(vb, &config)
            .context("Cannot build generation model from weights")?;

        tracing::info!(
            "Generation model loaded from '{}' (device {:?})",
            dir.display(),
            device
        );

        Ok(Self {
            model,
            tokenizer,
            config,
            device,
            max_new_tokens,
            // None = greedy decoding — what we want for
            // factual question answering
            temperature: None,
        })
    }
}

impl AnswerGenerator for Generator {
    fn generate(&mut self, prompt: &str) -> Result<String> {
        // ── Encode the prompt ────────────────────────────────────────────────
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| anyhow!("Tokenisation failed: {e}"))?;
        let mut input_ids: Vec<u32> = encoding.get_ids().to_vec();

        // Callers size their prompts via count_tokens()/input_budget(),
        // so this is a last-resort guard. Tail truncation would eat
        // the end of the prompt, which is where the question lives.
        if input_ids.len() > MAX_INPUT_TOKENS {
            tracing::warn!(
                "Prompt is {} tokens, truncating to {}",
                input_ids.len(),
                MAX_INPUT_TOKENS
            );
            input_ids.truncate(MAX_INPUT_TOKENS);
        }

        let input = Tensor::new(input_ids.as_slice(), &self.device)?.unsqueeze(0)?;

        // Fresh generation — drop any cached state from a
        // previous question
        self.model.clear_kv_cache();
        let encoder_output = self.model.encode(&input)?;

        // ── Decode token by token ────────────────────────────────────────────
        // The decoder is primed with the model's start token
        // (T5 reuses the pad token when none is configured)
        let start_token = self
            .config
            .decoder_start_token_id
            .unwrap_or(self.config.pad_token_id) as u32;
        let eos_token = self.config.eos_token_id as u32;

        let mut output_ids: Vec<u32> = vec![start_token];
        let mut sampler = LogitsProcessor::new(SEED, self.temperature, None);

        for step in 0..self.max_new_tokens {
            // With the KV cache warm we only feed the newest token;
            // the first step (and cache-less configs) feed everything
            let decoder_input = if step == 0 || !self.config.use_cache {
                Tensor::new(output_ids.as_slice(), &self.device)?.unsqueeze(0)?
            } else {
                let last = *output_ids
                    .last()
                    .ok_or_else(|| anyhow!("Decoder state is empty"))?;
                Tensor::new(&[last], &self.device)?.unsqueeze(0)?
            };

            // decode() returns the logits for the final position:
            // [batch, vocab] → squeeze to [vocab]
            let logits = self
                .model
                .decode(&decoder_input, &encoder_output)?
                .squeeze(0)?;

            let next = sampler.sample(&logits)?;
            if next == eos_token {
                break;
            }
            output_ids.push(next);
        }

        // Skip the start token when decoding back to text
        let answer = self
            .tokenizer
            .decode(&output_ids[1..], true)
            .map_err(|e| anyhow!("Cannot decode generated tokens: {e}"))?;

        tracing::debug!(
            "Generated {} tokens: '{}'",
            output_ids.len() - 1,
            answer
        );

        Ok(answer.trim().to_string())
    }

    fn count_tokens(&self, text: &str) -> Result<usize> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenisation failed: {e}"))?;
        Ok(encoding.get_ids().len())
    }

    fn input_budget(&self) -> usize {
        MAX_INPUT_TOKENS
    }
}
