// ============================================================
// Layer 4 — Document Loader
// ============================================================
// Loads a .pdf file using the lopdf crate.
//
// How PDF text extraction works:
//   A PDF is a tree of numbered objects; each page references
//   content streams of drawing operators, some of which place
//   text. lopdf parses the object tree and exposes
//   extract_text(), which walks a page's content streams and
//   collects the text-showing operators in order.
//
// Extraction is best-effort: scanned pages, pages with exotic
// font encodings, or pure-image pages yield little or no text.
// We skip those pages with a warning rather than failing the
// whole ingest — but a PDF with NO extractable text at all is
// an error, because there would be nothing to index.
//
// Reference: lopdf crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::domain::document::{Document, Page};
use crate::domain::traits::DocumentSource;

/// Loads a single .pdf file page by page.
/// Implements the DocumentSource trait from Layer 3.
pub struct PdfLoader {
    /// Path to the .pdf file
    path: PathBuf,
}

impl PdfLoader {
    /// Create a new PdfLoader pointed at a file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Implement the DocumentSource trait so the application layer
/// can call load() without knowing about PDF internals
impl DocumentSource for PdfLoader {
    fn load(&self) -> Result<Document> {
        let pdf = lopdf::Document::load(&self.path)
            .with_context(|| format!("Cannot open PDF '{}'", self.path.display()))?;

        let pages = extract_pages(&pdf, &self.path)?;

        tracing::info!(
            "Loaded '{}': {} pages with extractable text",
            self.path.display(),
            pages.len()
        );

        let source = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Document::new(source, pages))
    }
}

/// Walk every page of the parsed PDF and extract its text.
/// Pages are returned in ascending page-number order.
fn extract_pages(pdf: &lopdf::Document, path: &Path) -> Result<Vec<Page>> {
    // get_pages() returns a BTreeMap<u32, ObjectId> keyed by
    // 1-based page number, so iteration is already ordered
    let page_map = pdf.get_pages();
    let total = page_map.len();

    if total == 0 {
        bail!("PDF '{}' contains no pages", path.display());
    }

    let mut pages = Vec::with_capacity(total);

    for &number in page_map.keys() {
        // extract_text takes a slice of page numbers; we go one
        // page at a time so a single bad page can't poison the rest
        match pdf.extract_text(&[number]) {
            Ok(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    // Likely a scanned or image-only page
                    tracing::warn!("Page {} has no extractable text — skipping", number);
                } else {
                    tracing::debug!("Page {}: {} chars extracted", number, text.len());
                    pages.push(Page::new(number, text));
                }
            }
            // Log a warning but continue — don't fail on one bad page
            Err(e) => {
                tracing::warn!("Cannot extract text from page {}: {}", number, e);
            }
        }
    }

    if pages.is_empty() {
        bail!(
            "No extractable text in '{}' ({} pages). \
             The document may be scanned images only.",
            path.display(),
            total
        );
    }

    Ok(pages)
}
