// ============================================================
// Layer 2 — Ask Use Case
// ============================================================
// Retrieval-augmented answering:
//   1. Load the manifest and the persisted index
//   2. Embed the question with the SAME model used at ingest
//   3. Retrieve the top-k most similar fragments
//   4. Stuff them into a prompt together with the question
//   5. Run the generation model and tidy its output
//
// The "stuff" prompt style puts every retrieved fragment into
// a single numbered context block. The question sits at the
// END of the prompt, so an oversize prompt must shed CONTEXT,
// never its tail: build_prompt_within drops the lowest-ranked
// fragments (then shortens the last survivor) until the whole
// prompt fits the generation model's input budget.

use anyhow::{bail, Result};

use crate::domain::fragment::{Fragment, ScoredFragment};
use crate::domain::traits::{AnswerGenerator, TextEmbedder};
use crate::infra::index_store::IndexStore;
use crate::infra::manifest::{ManifestStore, PipelineManifest};
use crate::ml::embedder::SentenceEmbedder;
use crate::ml::generator::Generator;
use crate::retrieval::index::VectorIndex;
use crate::retrieval::retriever::Retriever;

const FALLBACK_ANSWER: &str = "I don't know based on the indexed document.";

pub struct AskUseCase {
    manifest:  PipelineManifest,
    index:     VectorIndex,
    fragments: Vec<Fragment>,
    embedder:  SentenceEmbedder,
    generator: Generator,
    retriever: Retriever,
}

impl AskUseCase {
    /// Rebuild the QA chain from a persisted index directory.
    pub fn new(index_dir: &str) -> Result<Self> {
        let manifest = ManifestStore::new(index_dir).load()?;
        let (index, fragments) = IndexStore::new(index_dir).load()?;

        let embedder = SentenceEmbedder::from_dir(&manifest.embed_model_dir)?;
        verify_manifest(&manifest, fragments.len(), embedder.dimension())?;

        let generator = Generator::from_dir(&manifest.gen_model_dir, manifest.max_new_tokens)?;
        let retriever = Retriever::new(manifest.top_k);

        Ok(Self {
            manifest,
            index,
            fragments,
            embedder,
            generator,
            retriever,
        })
    }

    /// Answer a question from the indexed document.
    pub fn answer(&mut self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            bail!("Question is empty");
        }

        // ── Embed the question and retrieve context ──────────────────────────
        let query = self.embedder.embed(question)?;
        let retrieved = self
            .retriever
            .retrieve(&self.index, &self.fragments, &query)?;

        if retrieved.is_empty() {
            // Nothing indexed — don't invoke the generator with
            // an empty context, it would only hallucinate
            return Ok(FALLBACK_ANSWER.to_string());
        }

        for r in &retrieved {
            tracing::debug!(
                "Context (score {:.4}, page {}): {}...",
                r.score,
                r.fragment.page,
                r.fragment.text.chars().take(60).collect::<String>()
            );
        }

        // ── Assemble the prompt and generate ─────────────────────────────────
        let prompt = build_prompt_within(
            question,
            &retrieved,
            self.generator.input_budget(),
            |text| self.generator.count_tokens(text),
        )?;
        tracing::info!(
            "Generating answer from {} context fragments (source '{}')",
            retrieved.len(),
            self.manifest.source
        );

        let raw = self.generator.generate(&prompt)?;
        let answer = tidy_answer(&raw);

        if answer.is_empty() {
            Ok(FALLBACK_ANSWER.to_string())
        } else {
            Ok(answer)
        }
    }
}

/// Check the loaded state against what the manifest recorded at
/// ingest time. A different embedding checkpoint would make query
/// vectors incomparable with the index; a fragment-count mismatch
/// means the index file and manifest come from different runs.
fn verify_manifest(
    manifest: &PipelineManifest,
    fragment_count: usize,
    embedding_dimension: usize,
) -> Result<()> {
    if embedding_dimension != manifest.embedding_dimension {
        bail!(
            "Embedding model at '{}' produces {}-dim vectors but the index was \
             built with {} dimensions. Re-run 'ingest' with the current model.",
            manifest.embed_model_dir,
            embedding_dimension,
            manifest.embedding_dimension
        );
    }
    if fragment_count != manifest.fragment_count {
        bail!(
            "Manifest records {} fragments but the index file holds {} — \
             the files come from different ingest runs. Re-run 'ingest'.",
            manifest.fragment_count,
            fragment_count
        );
    }
    Ok(())
}

/// Build a prompt that fits within `budget` tokens, as measured by
/// `count` (the generation model's own tokenizer).
///
/// The question sits at the END of the prompt, so overflow must be
/// shed from the CONTEXT block, never from the tail:
///   1. Drop the lowest-ranked fragments one by one.
///   2. If the single best fragment still overflows, halve its text
///      (on a char boundary) until the prompt fits.
///   3. A question so long that it overflows on its own is an error.
fn build_prompt_within<F>(
    question: &str,
    retrieved: &[ScoredFragment],
    budget: usize,
    count: F,
) -> Result<String>
where
    F: Fn(&str) -> Result<usize>,
{
    let mut kept = retrieved.to_vec();

    loop {
        let prompt = build_prompt(question, &kept);
        if count(&prompt)? <= budget {
            return Ok(prompt);
        }

        if kept.len() > 1 {
            // Fragments arrive best-first from the retriever
            let dropped = kept.pop();
            if let Some(d) = dropped {
                tracing::warn!(
                    "Prompt over the {budget}-token budget — dropping fragment {} \
                     (score {:.4})",
                    d.fragment.id,
                    d.score
                );
            }
            continue;
        }

        let Some(last) = kept.last_mut() else {
            bail!(
                "Question alone exceeds the {budget}-token input budget — \
                 please ask a shorter question"
            );
        };
        let len = last.fragment.text.chars().count();
        if len < 2 {
            kept.clear();
            continue;
        }
        tracing::warn!(
            "Prompt over the {budget}-token budget — shortening fragment {} \
             from {} chars",
            last.fragment.id,
            len
        );
        last.fragment.text = last.fragment.text.chars().take(len / 2).collect();
    }
}

/// Build a "stuff"-style prompt: instruction, numbered context
/// fragments, then the question.
fn build_prompt(question: &str, retrieved: &[ScoredFragment]) -> String {
    let mut prompt = String::from(
        "Answer the question using only the context below. \
         If the context does not contain the answer, say \"I don't know\".\n\nContext:\n",
    );

    for (i, r) in retrieved.iter().enumerate() {
        prompt.push_str(&format!(
            "[{}] (page {}) {}\n",
            i + 1,
            r.fragment.page,
            r.fragment.text
        ));
    }

    prompt.push_str(&format!("\nQuestion: {}\nAnswer:", question));
    prompt
}

/// Clean up generated text: collapse whitespace runs the decoder
/// sometimes emits and strip stray leading punctuation.
fn tidy_answer(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_start_matches([':', ',', '.', ';'])
        .trim()
        .to_string()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn scored(id: usize, page: u32, text: &str) -> ScoredFragment {
        ScoredFragment {
            fragment: Fragment::new(id, "doc.pdf", page, text),
            score: 0.9,
        }
    }

    #[test]
    fn test_prompt_contains_context_and_question() {
        let retrieved = vec![
            scored(0, 3, "Rust was announced in 2010."),
            scored(1, 7, "The first stable release was 2015."),
        ];
        let prompt = build_prompt("When was Rust announced?", &retrieved);

        assert!(prompt.contains("[1] (page 3) Rust was announced in 2010."));
        assert!(prompt.contains("[2] (page 7)"));
        assert!(prompt.contains("Question: When was Rust announced?"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn test_prompt_numbers_fragments_in_rank_order() {
        let retrieved = vec![scored(5, 1, "best match"), scored(2, 9, "runner up")];
        let prompt = build_prompt("q?", &retrieved);
        let best = prompt.find("best match").unwrap();
        let runner = prompt.find("runner up").unwrap();
        assert!(best < runner);
    }

    #[test]
    fn test_tidy_answer_collapses_whitespace() {
        assert_eq!(tidy_answer("  the   answer \n is 42  "), "the answer is 42");
    }

    #[test]
    fn test_tidy_answer_strips_leading_punctuation() {
        assert_eq!(tidy_answer(": 15 April 2026"), "15 April 2026");
    }

    #[test]
    fn test_tidy_answer_empty_input() {
        assert_eq!(tidy_answer("   "), "");
    }

    // A stand-in tokenizer: one token per whitespace-separated word
    fn word_count(text: &str) -> anyhow::Result<usize> {
        Ok(text.split_whitespace().count())
    }

    #[test]
    fn test_budget_keeps_everything_when_it_fits() {
        let retrieved = vec![scored(0, 1, "short context"), scored(1, 2, "more context")];
        let prompt = build_prompt_within("q?", &retrieved, 1000, word_count).unwrap();
        assert_eq!(prompt, build_prompt("q?", &retrieved));
    }

    #[test]
    fn test_budget_drops_lowest_ranked_fragment_first() {
        let retrieved = vec![
            scored(0, 1, "best match kept"),
            scored(1, 2, &"filler ".repeat(40)),
        ];
        let full = word_count(&build_prompt("q?", &retrieved)).unwrap();
        let prompt = build_prompt_within("q?", &retrieved, full - 1, word_count).unwrap();

        // The lowest-ranked fragment goes, the best one stays
        assert!(prompt.contains("best match kept"));
        assert!(!prompt.contains("filler"));
    }

    #[test]
    fn test_budget_never_loses_the_question_tail() {
        let retrieved = vec![
            scored(0, 1, &"alpha ".repeat(60)),
            scored(1, 2, &"bravo ".repeat(60)),
            scored(2, 3, &"charlie ".repeat(60)),
        ];
        let prompt =
            build_prompt_within("When was it announced?", &retrieved, 50, word_count).unwrap();

        assert!(word_count(&prompt).unwrap() <= 50);
        assert!(prompt.contains("Question: When was it announced?"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn test_budget_shortens_a_single_oversize_fragment() {
        let retrieved = vec![scored(0, 1, &"word ".repeat(200))];
        let prompt = build_prompt_within("q?", &retrieved, 40, word_count).unwrap();

        assert!(word_count(&prompt).unwrap() <= 40);
        // Some of the fragment survives alongside the question
        assert!(prompt.contains("word"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn test_budget_rejects_an_unanswerably_long_question() {
        let retrieved = vec![scored(0, 1, "tiny")];
        let question = "why ".repeat(100);
        assert!(build_prompt_within(&question, &retrieved, 20, word_count).is_err());
    }

    fn manifest(dimension: usize, fragment_count: usize) -> PipelineManifest {
        PipelineManifest {
            source: "doc.pdf".to_string(),
            embed_model_dir: "models/all-MiniLM-L6-v2".to_string(),
            gen_model_dir: "models/flan-t5-base".to_string(),
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 3,
            max_new_tokens: 200,
            embedding_dimension: dimension,
            fragment_count,
        }
    }

    #[test]
    fn test_verify_manifest_accepts_matching_state() {
        assert!(verify_manifest(&manifest(384, 10), 10, 384).is_ok());
    }

    #[test]
    fn test_verify_manifest_rejects_dimension_mismatch() {
        let err = verify_manifest(&manifest(384, 10), 10, 768)
            .unwrap_err()
            .to_string();
        assert!(err.contains("ingest"), "unhelpful error: {err}");
    }

    #[test]
    fn test_verify_manifest_rejects_fragment_count_mismatch() {
        let err = verify_manifest(&manifest(384, 10), 7, 384)
            .unwrap_err()
            .to_string();
        assert!(err.contains("ingest"), "unhelpful error: {err}");
    }
}
