//
// lib.rs
// Station-Tools-rs
//
// Exposes the crate's modules and re-exports the CLI entry point for both binary and library consumers.
//
// Thales Matheus Mendonça Santos - November 2025

// Pipeline stages first, then the drivers that walk a corpus.
pub mod extract;
pub mod identification;
pub mod lexicon;
pub mod models;
pub mod names;
pub mod scrub;
pub mod synthesize;
pub mod text;

pub mod batch;
pub mod cli;
pub mod error;
pub mod record;
pub mod report;
pub mod storage;
pub mod tidy;

pub use cli::{run as run_cli, Cli, Commands};
pub use error::ProcessError;
pub use record::{Anonymizer, AnonymizerOptions, CaseRecord};
