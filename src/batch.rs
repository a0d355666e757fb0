//
// batch.rs
// Station-Tools-rs
//
// Directory-level drivers: the sequential anonymization batch, the parallel read-only audit
// and the single-file preview.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Local;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::ProcessError;
use crate::names::NameRegistry;
use crate::record::{Anonymizer, AnonymizerOptions, CaseRecord, ProcessOutcome, RecordStatus};
use crate::report::{BatchReport, FileReport, OutcomeKind};
use crate::storage;

/// Settings of one `anonymize` run, built from the CLI.
#[derive(Debug, Clone)]
pub struct AnonymizeOptions {
    pub directory: PathBuf,
    pub names: PathBuf,
    pub report_dir: PathBuf,
    pub seed: Option<u64>,
    pub dry_run: bool,
    pub infer_missing: bool,
}

pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Every `*.json` under `dir`, in a stable order. Hidden files (our own temp files) are skipped.
pub fn find_json_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
        .map(|e| e.into_path())
        .collect()
}

fn anonymize_file<R: Rng>(
    path: &Path,
    anonymizer: &mut Anonymizer<R>,
    dry_run: bool,
) -> FileReport {
    let report = |kind: OutcomeKind, message: String, fingerprints| FileReport {
        path: path.to_path_buf(),
        kind,
        message,
        fingerprints,
    };
    let failed = |error: ProcessError| {
        tracing::debug!(file = %path.display(), reason = error.label(), "Arquivo não processado");
        report(OutcomeKind::from_error(&error), error.to_string(), None)
    };

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => return failed(ProcessError::Io(err)),
    };
    let mut record = match CaseRecord::parse(&raw) {
        Ok(record) => record,
        Err(err) => return failed(err),
    };

    match anonymizer.process(&mut record) {
        Ok(ProcessOutcome::Rewritten(rewrite)) => {
            let json = match record.to_pretty_json() {
                Ok(json) => json,
                Err(err) => return failed(err),
            };
            if !dry_run {
                if let Err(err) = storage::write_atomic(path, json.as_bytes()) {
                    return report(OutcomeKind::Error, format!("{:#}", err), None);
                }
            }
            report(
                OutcomeKind::Success,
                rewrite.summary(),
                Some((
                    storage::fingerprint(raw.as_bytes()),
                    storage::fingerprint(json.as_bytes()),
                )),
            )
        }
        Ok(ProcessOutcome::AlreadyCorrect(reason)) => {
            report(OutcomeKind::AlreadyCorrect, reason.to_string(), None)
        }
        Err(err) => failed(err),
    }
}

/// Processes every station under `dir` in order. Per-file failures are recorded, never fatal.
pub fn anonymize_directory<R: Rng>(
    dir: &Path,
    anonymizer: &mut Anonymizer<R>,
    dry_run: bool,
) -> BatchReport {
    let mut report = BatchReport::new(Local::now(), dry_run);
    let files = find_json_files(dir);
    println!("Encontrados {} arquivos JSON para processar", files.len());

    for path in files {
        let relative = path.strip_prefix(dir).unwrap_or(path.as_path());
        println!("Processando: {}", relative.display());

        let file = anonymize_file(&path, anonymizer, dry_run);
        match file.kind {
            OutcomeKind::Success | OutcomeKind::AlreadyCorrect => {
                println!("  ✓ {}", file.message)
            }
            _ => eprintln!("  ✗ {}", file.message),
        }
        report.push(file);
    }

    report.finish();
    report
}

/// The `anonymize` command: loads the name database (fatal on failure), rewrites the corpus
/// and saves the report. Returns the report path.
pub fn run_anonymize(options: &AnonymizeOptions) -> Result<PathBuf> {
    let started = Local::now();
    println!("Hora de início: {}", started.format("%H:%M:%S"));

    let registry = NameRegistry::load(&options.names)
        .with_context(|| format!("Erro ao inicializar com {:?}", options.names))?;
    if !options.directory.is_dir() {
        bail!("Diretório não encontrado: {:?}", options.directory);
    }

    println!("\nProcessando diretório: {:?}", options.directory);
    if options.dry_run {
        println!("Modo simulação: nenhum arquivo será alterado");
    }
    tracing::info!(
        seed = ?options.seed,
        infer = options.infer_missing,
        "Iniciando anonimização"
    );

    let mut anonymizer = Anonymizer::new(
        registry,
        seeded_rng(options.seed),
        AnonymizerOptions {
            infer_missing: options.infer_missing,
        },
    );
    let report = anonymize_directory(&options.directory, &mut anonymizer, options.dry_run);

    println!("\n{}", report.render());
    let path = report.save(&options.report_dir)?;
    println!("\nRelatório salvo em: {}", path.display());
    Ok(path)
}

/// Read-only classification used by `check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Duplicate(usize),
    Incomplete,
    Clean,
    Pending,
    Identified,
    Malformed(String),
}

impl CheckStatus {
    fn of(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => return CheckStatus::Malformed(err.to_string()),
        };
        match CaseRecord::parse(&raw) {
            Ok(record) => match record.classify() {
                RecordStatus::Duplicate(count) => CheckStatus::Duplicate(count),
                RecordStatus::Incomplete => CheckStatus::Incomplete,
                RecordStatus::AlreadyClean => CheckStatus::Clean,
                RecordStatus::NeedsIdentification => CheckStatus::Pending,
                RecordStatus::HasIdentification => CheckStatus::Identified,
            },
            Err(ProcessError::IncompleteStructure) => CheckStatus::Incomplete,
            Err(err) => CheckStatus::Malformed(err.to_string()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            CheckStatus::Duplicate(count) => format!("duplicado ({} blocos)", count),
            CheckStatus::Incomplete => "estrutura incompleta".to_string(),
            CheckStatus::Clean => "sem dados de filiação".to_string(),
            CheckStatus::Pending => "pendente de anonimização".to_string(),
            CheckStatus::Identified => "identificação presente".to_string(),
            CheckStatus::Malformed(reason) => format!("inválido: {}", reason),
        }
    }
}

/// Classifies every station under `dir` in parallel without writing anything.
pub fn check_directory(dir: &Path) -> Result<Vec<(PathBuf, CheckStatus)>> {
    if !dir.is_dir() {
        bail!("Diretório não encontrado: {:?}", dir);
    }
    println!("Verificando diretório: {:?}", dir);

    let files = find_json_files(dir);
    println!("Encontrados {} arquivos.", files.len());

    let results: Vec<(PathBuf, CheckStatus)> = files
        .par_iter()
        .map(|path| (path.clone(), CheckStatus::of(path)))
        .collect();

    for (path, status) in &results {
        let relative = path.strip_prefix(dir).unwrap_or(path.as_path());
        println!("{}: {}", relative.display(), status.label());
    }
    let pending = results
        .iter()
        .filter(|(_, status)| *status == CheckStatus::Pending)
        .count();
    println!("Pendentes: {}/{}", pending, results.len());
    Ok(results)
}

/// What `anonymize` would do to one file, without touching it.
pub fn preview_file(path: &Path, names: &Path, seed: Option<u64>) -> Result<String> {
    let registry = NameRegistry::load(names)
        .with_context(|| format!("Erro ao inicializar com {:?}", names))?;
    let raw = fs::read_to_string(path).with_context(|| format!("Falha ao ler {:?}", path))?;
    let mut record =
        CaseRecord::parse(&raw).with_context(|| format!("Falha ao interpretar {:?}", path))?;
    let mut anonymizer = Anonymizer::new(
        registry,
        seeded_rng(seed),
        AnonymizerOptions::default(),
    );

    let mut lines = vec![
        format!("Arquivo: {}", path.display()),
        format!("Título: {}", record.title()),
    ];
    match anonymizer.process(&mut record)? {
        ProcessOutcome::Rewritten(rewrite) => {
            lines.push(format!(
                "Idade extraída: {}",
                rewrite
                    .demographics
                    .age
                    .map_or_else(|| "não encontrada".to_string(), |age| age.to_string())
            ));
            lines.push(format!(
                "Gênero extraído: {}",
                rewrite
                    .demographics
                    .gender
                    .map_or("não encontrado", |gender| gender.as_str())
            ));
            lines.push(String::new());
            lines.push("Identificação:".to_string());
            lines.push(rewrite.identification.clone());
            lines.push(String::new());
            lines.push("Descrição:".to_string());
            lines.push(rewrite.description.clone());
            lines.push(String::new());
            lines.push(rewrite.summary());
        }
        ProcessOutcome::AlreadyCorrect(reason) => {
            lines.push(format!("Nada a fazer: {}", reason));
        }
    }
    Ok(lines.join("\n"))
}
