// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (building the index or answering a question).
//
// Rules for this layer:
//   - No model math or tensor code here
//   - No UI or printing here (that's Layer 1)
//   - No direct file-format parsing (that's Layer 4 and 7)
//   - Only workflow coordination
//
// Think of this layer as the "director" — it tells other
// layers what to do but doesn't do the work itself.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The ingest workflow: PDF → fragments → vectors → persisted index
pub mod ingest_use_case;

// The question-answering workflow: retrieve → prompt → generate
pub mod ask_use_case;
