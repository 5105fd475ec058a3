// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Cleans raw text extracted from PDF pages before splitting.
//
// Why do we need to clean text?
//   PDF text extraction often produces:
//   - Glyph-name escapes like "/quotesingle.ts1" where the
//     extractor couldn't map a glyph to a character
//   - Ligature characters (ﬁ, ﬂ) instead of letter pairs
//   - Non-breaking spaces (U+00A0) from layout
//   - Carriage returns (\r) from Windows-produced PDFs
//   - Control characters from malformed content streams
//   - Runs of spaces where column layout was flattened
//
// If we don't clean these, they end up inside fragments, hurt
// embedding quality, and leak into the generated answer.
//
// Cleaning steps (applied in order):
//   1. Replace known glyph-name escapes with their character
//   2. Expand ligature characters to letter pairs
//   3. Replace Unicode whitespace variants with plain space
//   4. Remove invisible control characters
//   5. Collapse multiple spaces into one per line
//   6. Trim leading/trailing whitespace per line
//   7. Collapse more than 2 consecutive blank lines
//
// Reference: Rust Book §8 (Strings in Rust)

/// Glyph-name escapes that extractors emit for unmapped glyphs.
/// The ".ts1" suffixed variant comes first so the plain variant
/// doesn't leave the suffix behind.
const GLYPH_ESCAPES: [(&str, &str); 4] = [
    ("/quotesingle.ts1", "'"),
    ("/quotesingle", "'"),
    ("/quotedbl", "\""),
    ("/hyphen", "-"),
];

pub struct Preprocessor;

impl Preprocessor {
    /// Create a new Preprocessor instance
    pub fn new() -> Self {
        Self
    }

    /// Clean a raw page text for downstream splitting.
    /// Takes a &str and returns an owned String.
    pub fn clean(&self, text: &str) -> String {
        // ── Step 1: Replace glyph-name escapes ────────────────────────────────
        let mut step1 = text.to_string();
        for (escape, replacement) in GLYPH_ESCAPES {
            if step1.contains(escape) {
                step1 = step1.replace(escape, replacement);
            }
        }

        // ── Step 2: Normalise individual characters ───────────────────────────
        // Ligatures expand to two chars, so map to &str not char
        let step2: String = step1
            .chars()
            .map(|c| match c {
                // Ligatures → letter pairs
                '\u{FB01}' => "fi".to_string(),
                '\u{FB02}' => "fl".to_string(),
                // Tab → space
                '\t' => " ".to_string(),
                // Non-breaking space → regular space
                '\u{00A0}' => " ".to_string(),
                // Zero-width space → regular space
                '\u{200B}' => " ".to_string(),
                // Byte order mark → space
                '\u{FEFF}' => " ".to_string(),
                // Windows carriage return → Unix newline
                '\r' => "\n".to_string(),
                // Any other control character (except newline) → space
                c if c.is_control() && c != '\n' => " ".to_string(),
                // All other characters pass through unchanged
                c => c.to_string(),
            })
            .collect();

        // ── Step 3: Clean each line individually ─────────────────────────────
        // Process line by line so we don't accidentally collapse
        // intentional paragraph breaks
        let step3: String = step2
            .lines()
            .map(|line| {
                // Collapse multiple consecutive spaces into one
                let mut out = String::with_capacity(line.len());
                let mut last_space = false;

                for c in line.chars() {
                    if c == ' ' {
                        if !last_space {
                            out.push(' ');
                        }
                        last_space = true;
                    } else {
                        out.push(c);
                        last_space = false;
                    }
                }

                out.trim().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n");

        // ── Step 4: Collapse excessive blank lines ────────────────────────────
        // Allow at most 2 consecutive newlines (one blank line).
        // Paragraph breaks survive; page-layout gaps don't.
        let mut result = String::with_capacity(step3.len());
        let mut newline_count = 0usize;

        for c in step3.chars() {
            if c == '\n' {
                newline_count += 1;
                if newline_count <= 2 {
                    result.push(c);
                }
            } else {
                newline_count = 0;
                result.push(c);
            }
        }

        result.trim().to_string()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_glyph_escape() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("it/quotesingle.ts1s here"), "it's here");
    }

    #[test]
    fn test_expands_ligatures() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("de\u{FB01}ne \u{FB02}ow"), "define flow");
    }

    #[test]
    fn test_collapses_multiple_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello   world"), "hello world");
    }

    #[test]
    fn test_trims_edges() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  hello world  "), "hello world");
    }

    #[test]
    fn test_removes_control_chars() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello\x01world"), "hello world");
    }

    #[test]
    fn test_collapses_blank_lines() {
        let p = Preprocessor::new();
        let output = p.clean("line1\n\n\n\n\nline2");
        assert!(!output.contains("\n\n\n"));
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
    }
}
