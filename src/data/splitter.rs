// ============================================================
// Layer 4 — Recursive Text Splitter
// ============================================================
// Splits page text into bounded, overlapping fragments using a
// hierarchy of separators.
//
// Why recursive splitting instead of a fixed window?
//   A fixed word window cuts through paragraphs and sentences.
//   Recursive splitting tries the COARSEST separator first
//   ("\n\n" = paragraph), and only falls back to finer ones
//   ("\n", " ", then individual characters) for pieces that are
//   still too long. Fragments therefore align with natural text
//   boundaries whenever possible.
//
// The algorithm:
//   1. Pick the first separator in the hierarchy that occurs
//      in the text (the empty string matches anything and
//      splits into single characters).
//   2. Split the text on it.
//   3. Pieces within the length budget are merged greedily
//      back together up to `max_len`, carrying `overlap`
//      characters of trailing context into the next fragment.
//   4. Oversize pieces are split again with the REMAINING
//      (finer) separators.
//
// Lengths are measured in characters, not bytes, so multi-byte
// UTF-8 text never splits mid-character.
//
// Example with max_len=12, overlap=0:
//   Text:      "intro\n\nlong paragraph here"
//   Split on "\n\n" → ["intro", "long paragraph here"]
//   "intro" fits → fragment 1
//   "long paragraph here" is oversize → re-split on " ",
//   merged back into ≤12-char fragments.
//
// Reference: Rust Book §8 (Slices), §13 (Iterators)

use std::collections::VecDeque;

/// Separator hierarchy: paragraph, line, word, character.
const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

pub struct RecursiveSplitter {
    /// Target maximum number of characters per fragment
    max_len: usize,
    /// Number of trailing characters carried into the next fragment
    overlap: usize,
    /// Ordered separator hierarchy, coarsest first
    separators: Vec<String>,
}

impl RecursiveSplitter {
    /// Create a splitter with the default separator hierarchy.
    ///
    /// # Panics
    /// Panics if overlap >= max_len, because the merge step
    /// could then never make forward progress.
    pub fn new(max_len: usize, overlap: usize) -> Self {
        Self::with_separators(
            max_len,
            overlap,
            DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Create a splitter with a custom separator hierarchy.
    pub fn with_separators(max_len: usize, overlap: usize, separators: Vec<String>) -> Self {
        assert!(
            overlap < max_len,
            "overlap ({}) must be less than max_len ({})",
            overlap,
            max_len
        );
        Self {
            max_len,
            overlap,
            separators,
        }
    }

    /// Split text into ordered fragments of at most `max_len`
    /// characters (best-effort), trimmed, with empty fragments
    /// dropped.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_with(text, &self.separators)
    }

    /// One level of the recursion: split on the coarsest separator
    /// present in `text`, merge small pieces, recurse on big ones.
    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        // Pick the first separator that occurs in the text.
        // The empty separator always "occurs" and is the base case.
        let mut separator = separators.last().cloned().unwrap_or_default();
        let mut remaining: &[String] = &[];

        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() || text.contains(sep.as_str()) {
                separator = sep.clone();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let pieces = split_on(text, &separator);

        let mut fragments = Vec::new();
        // Pieces within budget, waiting to be merged back together
        let mut good: Vec<String> = Vec::new();

        for piece in pieces {
            if char_len(&piece) <= self.max_len {
                good.push(piece);
            } else {
                // Flush what we have, then descend to finer separators
                if !good.is_empty() {
                    fragments.extend(self.merge(&good, &separator));
                    good.clear();
                }
                if remaining.is_empty() {
                    // No finer separator left — emit oversize as-is
                    fragments.push(piece);
                } else {
                    fragments.extend(self.split_with(&piece, remaining));
                }
            }
        }

        if !good.is_empty() {
            fragments.extend(self.merge(&good, &separator));
        }

        fragments
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect()
    }

    /// Greedily merge consecutive pieces back together up to
    /// `max_len`, keeping `overlap` characters of trailing context
    /// when starting the next fragment.
    fn merge(&self, pieces: &[String], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);

        let mut fragments = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let piece_len = char_len(piece);
            let join_cost = if window.is_empty() { 0 } else { sep_len };

            if total + piece_len + join_cost > self.max_len && !window.is_empty() {
                // Emit the current window as one fragment
                fragments.push(join_window(&window, separator));

                // Shrink the window from the front until it fits the
                // overlap budget AND leaves room for the new piece
                while total > self.overlap
                    || (total + piece_len + if window.is_empty() { 0 } else { sep_len }
                        > self.max_len
                        && total > 0)
                {
                    let front_len = char_len(window.front().copied().unwrap_or(""));
                    let front_sep = if window.len() > 1 { sep_len } else { 0 };
                    total = total.saturating_sub(front_len + front_sep);
                    window.pop_front();
                    if window.is_empty() {
                        break;
                    }
                }
            }

            let join_cost = if window.is_empty() { 0 } else { sep_len };
            total += piece_len + join_cost;
            window.push_back(piece.as_str());
        }

        if !window.is_empty() {
            fragments.push(join_window(&window, separator));
        }

        fragments
    }
}

/// Split `text` on `separator`; the empty separator splits into
/// single characters (the last-resort base case).
fn split_on(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        text.chars().map(|c| c.to_string()).collect()
    } else {
        text.split(separator)
            .filter(|p| !p.is_empty())
            .map(|p| p.to_string())
            .collect()
    }
}

/// Join the merge window back together with its separator
fn join_window(window: &VecDeque<&str>, separator: &str) -> String {
    window
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
}

/// Character count (not byte count) — keeps UTF-8 intact
fn char_len(s: &str) -> usize {
    s.chars().count()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_gives_one_fragment() {
        let s = RecursiveSplitter::new(100, 10);
        let fragments = s.split("just a few words");
        assert_eq!(fragments, vec!["just a few words".to_string()]);
    }

    #[test]
    fn test_empty_text_gives_no_fragments() {
        let s = RecursiveSplitter::new(100, 10);
        assert!(s.split("").is_empty());
        assert!(s.split("   \n\n  ").is_empty());
    }

    #[test]
    fn test_splits_on_paragraphs_first() {
        let s = RecursiveSplitter::new(8, 0);
        let fragments = s.split("aaaa\n\nbbbb\n\ncccc");
        // Each paragraph fits the budget on its own but two
        // can't merge (4 + 2 + 4 > 8), so boundaries hold
        assert_eq!(fragments, vec!["aaaa", "bbbb", "cccc"]);
    }

    #[test]
    fn test_merges_small_paragraphs() {
        let s = RecursiveSplitter::new(20, 0);
        let fragments = s.split("aaaa\n\nbbbb\n\ncccc");
        // All three fit into one 14-char fragment
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].contains("aaaa") && fragments[0].contains("cccc"));
    }

    #[test]
    fn test_oversize_paragraph_recurses_to_words() {
        let s = RecursiveSplitter::new(12, 0);
        let fragments = s.split("one two three four five six");
        assert!(fragments.len() > 1);
        for f in &fragments {
            assert!(f.chars().count() <= 12, "fragment too long: '{}'", f);
        }
        // Word boundaries are respected
        assert!(fragments.iter().all(|f| !f.starts_with(' ') && !f.ends_with(' ')));
    }

    #[test]
    fn test_overlap_carries_trailing_context() {
        let s = RecursiveSplitter::new(10, 4);
        let fragments = s.split("aa bb cc dd ee ff");
        assert!(fragments.len() > 1);
        // The second fragment must re-start with trailing words
        // of the first one
        let first_tail = fragments[0].split_whitespace().last().unwrap();
        assert!(
            fragments[1].contains(first_tail),
            "no overlap between '{}' and '{}'",
            fragments[0],
            fragments[1]
        );
    }

    #[test]
    fn test_unsplittable_run_falls_back_to_chars() {
        let s = RecursiveSplitter::new(4, 2);
        let fragments = s.split("abcdefghij");
        for f in &fragments {
            assert!(f.chars().count() <= 4);
        }
        // Char-level overlap of 2: next fragment starts with the
        // last 2 chars of the previous one
        assert_eq!(fragments[0], "abcd");
        assert!(fragments[1].starts_with("cd"));
    }

    #[test]
    fn test_fragments_preserve_document_order() {
        let s = RecursiveSplitter::new(10, 0);
        let fragments = s.split("alpha\n\nbravo\n\ncharlie\n\ndelta");
        let joined = fragments.join(" ");
        let a = joined.find("alpha").unwrap();
        let b = joined.find("bravo").unwrap();
        let d = joined.find("delta").unwrap();
        assert!(a < b && b < d);
    }

    #[test]
    #[should_panic]
    fn test_overlap_must_be_less_than_max_len() {
        let _ = RecursiveSplitter::new(5, 5);
    }
}
