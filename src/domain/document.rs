// ============================================================
// Layer 3 — Document Domain Types
// ============================================================
// Represents a document loaded from disk and its pages.
// These are plain data structs with no behaviour —
// by the time a Page is created, the text has already been
// extracted from the PDF format by the loader.
//
// Using #[derive(Debug, Clone)] gives us:
//   - Debug: lets us print the struct with {:?}
//   - Clone: lets us make copies of the struct
// Documents live only for the duration of an ingest run —
// what gets persisted is the Fragment table, not the pages.
//
// Reference: Rust Book §5 (Structs and Methods)

/// A raw document loaded from disk.
#[derive(Debug, Clone)]
pub struct Document {
    /// The filename or path — kept for traceability
    /// so we know which file an answer came from
    pub source: String,

    /// The pages of the document, in reading order
    pub pages: Vec<Page>,
}

/// One page of a document with its extracted text.
///
/// Page numbers are 1-based, matching what a reader sees
/// in a PDF viewer.
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page number as shown in a PDF viewer
    pub number: u32,

    /// The extracted text content of this page,
    /// before any cleaning or splitting
    pub text: String,
}

impl Document {
    /// Create a new Document from a source path and its pages.
    /// Uses impl Into<String> so callers can pass &str or String.
    pub fn new(source: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            source: source.into(),
            pages,
        }
    }
}

impl Page {
    /// Create a new Page
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}
