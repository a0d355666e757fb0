//
// cli.rs
// Station-Tools-rs
//
// Defines the CLI surface with Clap and dispatches user-selected commands to the corresponding modules.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::batch::{self, AnonymizeOptions, CheckStatus};
use crate::tidy;

const DEFAULT_DIRECTORY: &str = "ESTAÇÕES A SEREM AUDITADAS";
const DEFAULT_NAMES: &str = "banco de nomes.json";

#[derive(Parser)]
#[command(name = "station-tools")]
#[command(about = "Ferramentas para anonimização de estações clínicas", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Anonymize every station under a directory
    Anonymize {
        #[arg(short, long, default_value = DEFAULT_DIRECTORY)]
        directory: PathBuf,
        /// Name database (JSON)
        #[arg(short, long, default_value = DEFAULT_NAMES)]
        names: PathBuf,
        #[arg(long, default_value = ".")]
        report_dir: PathBuf,
        /// Fixed seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
        /// Compute and report without writing any station
        #[arg(long)]
        dry_run: bool,
        /// Fail instead of inferring age or gender missing from the description
        #[arg(long)]
        no_infer: bool,
    },
    /// Classify stations without modifying them
    Check {
        #[arg(short, long, default_value = DEFAULT_DIRECTORY)]
        directory: PathBuf,
    },
    /// Preview the anonymization of a single station
    Inspect {
        file: PathBuf,
        #[arg(short, long, default_value = DEFAULT_NAMES)]
        names: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Remove validation/metadata leftovers and rename stations after their title
    Tidy {
        #[arg(short, long, default_value = DEFAULT_DIRECTORY)]
        directory: PathBuf,
        #[arg(long, default_value = ".")]
        report_dir: PathBuf,
    },
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Anonymize {
            directory,
            names,
            report_dir,
            seed,
            dry_run,
            no_infer,
        } => {
            batch::run_anonymize(&AnonymizeOptions {
                directory,
                names,
                report_dir,
                seed,
                dry_run,
                infer_missing: !no_infer,
            })?;
        }
        Commands::Check { directory } => {
            let results = batch::check_directory(&directory)?;
            let malformed = results
                .iter()
                .filter(|(_, status)| matches!(status, CheckStatus::Malformed(_)))
                .count();
            if malformed > 0 {
                eprintln!("{} arquivo(s) inválido(s)", malformed);
            }
        }
        Commands::Inspect { file, names, seed } => {
            println!("{}", batch::preview_file(&file, &names, seed)?);
        }
        Commands::Tidy {
            directory,
            report_dir,
        } => {
            tidy::run_tidy(&directory, &report_dir)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymize_defaults_match_the_corpus_layout() {
        let cli = Cli::try_parse_from(["station-tools", "anonymize"]).expect("parse");
        match cli.command {
            Commands::Anonymize {
                directory,
                names,
                seed,
                dry_run,
                no_infer,
                ..
            } => {
                assert_eq!(directory, PathBuf::from(DEFAULT_DIRECTORY));
                assert_eq!(names, PathBuf::from(DEFAULT_NAMES));
                assert_eq!(seed, None);
                assert!(!dry_run);
                assert!(!no_infer);
            }
            _ => panic!("expected anonymize"),
        }
    }

    #[test]
    fn flags_are_parsed() {
        let cli = Cli::try_parse_from([
            "station-tools",
            "anonymize",
            "--seed",
            "7",
            "--dry-run",
            "--no-infer",
            "-d",
            "corpus",
        ])
        .expect("parse");
        match cli.command {
            Commands::Anonymize {
                directory,
                seed,
                dry_run,
                no_infer,
                ..
            } => {
                assert_eq!(directory, PathBuf::from("corpus"));
                assert_eq!(seed, Some(7));
                assert!(dry_run);
                assert!(no_infer);
            }
            _ => panic!("expected anonymize"),
        }
    }

    #[test]
    fn inspect_requires_a_file() {
        assert!(Cli::try_parse_from(["station-tools", "inspect"]).is_err());
    }
}
