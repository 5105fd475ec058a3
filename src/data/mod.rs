// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from the raw .pdf file
// up to clean, bounded text fragments ready for embedding.
//
// The pipeline flows in this order:
//
//   .pdf file
//       │
//       ▼
//   PdfLoader          → parses the file, extracts page text
//       │
//       ▼
//   Preprocessor       → cleans text (glyph artifacts, whitespace)
//       │
//       ▼
//   RecursiveSplitter  → splits pages into overlapping fragments
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Loads a .pdf file page by page using lopdf
pub mod loader;

/// Cleans and normalises raw extracted PDF text
pub mod preprocessor;

/// Splits page text into bounded, overlapping fragments
pub mod splitter;
