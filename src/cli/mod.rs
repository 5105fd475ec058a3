// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `ingest` — builds the vector index from a PDF
//   2. `ask`    — answers a question over the persisted index
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{AskArgs, Commands, IngestArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-doc-qa",
    version = "0.1.0",
    about = "Index a PDF into a vector store, then ask questions over it."
)]
pub struct Cli {
    /// The subcommand to run (ingest or ask)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Ingest(args) => Self::run_ingest(args),
            Commands::Ask(args) => Self::run_ask(args),
        }
    }

    /// Handles the `ingest` subcommand.
    /// Converts CLI args into an IngestConfig and hands off to Layer 2.
    fn run_ingest(args: IngestArgs) -> Result<()> {
        use crate::application::ingest_use_case::IngestUseCase;

        tracing::info!("Starting ingest of: {}", args.pdf);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = IngestUseCase::new(args.into());
        let count = use_case.execute()?;

        println!("Ingest complete. {count} fragments indexed.");
        Ok(())
    }

    /// Handles the `ask` subcommand.
    /// Rebuilds the QA chain from disk and prints the answer.
    fn run_ask(args: AskArgs) -> Result<()> {
        use crate::application::ask_use_case::AskUseCase;

        // Build the use case from the persisted index directory
        let mut use_case = AskUseCase::new(&args.index_dir)?;

        // Run retrieval + generation and print the result
        let answer = use_case.answer(&args.question)?;
        println!("\nAnswer: {}", answer);
        Ok(())
    }
}
