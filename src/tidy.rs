//
// tidy.rs
// Station-Tools-rs
//
// Station housekeeping: drops validation leftovers and export metadata, then renames each file
// after its station title.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use serde_json::Value;

use crate::batch::find_json_files;
use crate::report::save_timestamped;
use crate::storage;

const VALIDATION_BLOCK: &str = "_validation_issues";

/// Export metadata that has no place in a published station.
const METADATA_FIELDS: &[&str] = &[
    "id",
    "created_at",
    "created_by",
    "source",
    "tema_original",
    "especialidade_original",
    "titulo",
    "sync_status",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TidyOperations {
    pub renamed_to: Option<PathBuf>,
    pub validation_removed: bool,
    pub metadata_removed: Vec<&'static str>,
}

impl TidyOperations {
    pub fn changed_anything(&self) -> bool {
        self.renamed_to.is_some() || self.validation_removed || !self.metadata_removed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct TidyReport {
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
    pub processed: Vec<(PathBuf, TidyOperations)>,
    pub errors: Vec<(PathBuf, String)>,
}

impl TidyReport {
    fn total(&self) -> usize {
        self.processed.len() + self.errors.len()
    }

    pub fn renamed(&self) -> usize {
        self.processed
            .iter()
            .filter(|(_, ops)| ops.renamed_to.is_some())
            .count()
    }

    pub fn validation_removed(&self) -> usize {
        self.processed
            .iter()
            .filter(|(_, ops)| ops.validation_removed)
            .count()
    }

    pub fn metadata_removed(&self) -> usize {
        self.processed
            .iter()
            .filter(|(_, ops)| !ops.metadata_removed.is_empty())
            .count()
    }

    pub fn render(&self) -> String {
        let total = self.total();
        let success = self.processed.len();
        let duration = (self.finished - self.started).num_milliseconds() as f64 / 1000.0;

        let mut lines = vec![
            "=".repeat(80),
            "RELATÓRIO DE PROCESSAMENTO UNIFICADO DE ARQUIVOS JSON".to_string(),
            "=".repeat(80),
            String::new(),
            format!(
                "Data e hora do processamento: {}",
                self.started.format("%Y-%m-%d %H:%M:%S")
            ),
            format!("Duração: {:.2} segundos", duration),
            String::new(),
            "ESTATÍSTICAS GERAIS:".to_string(),
            "-".repeat(40),
            format!("Total de arquivos JSON encontrados: {}", total),
            format!("Arquivos processados com sucesso: {}", success),
            format!("Arquivos com erro: {}", self.errors.len()),
            String::new(),
            "OPERAÇÕES REALIZADAS:".to_string(),
            "-".repeat(40),
            format!("Arquivos renomeados: {}", self.renamed()),
            format!(
                "Blocos {} removidos: {}",
                VALIDATION_BLOCK,
                self.validation_removed()
            ),
            format!("Arquivos com metadados removidos: {}", self.metadata_removed()),
            String::new(),
        ];

        if !self.processed.is_empty() {
            lines.push("ARQUIVOS PROCESSADOS COM SUCESSO:".to_string());
            lines.push("-".repeat(50));
            for (path, ops) in &self.processed {
                lines.push(format!("Arquivo: {}", path.display()));
                if let Some(new_path) = &ops.renamed_to {
                    let name = new_path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    lines.push(format!("  → Renomeado para: {}", name));
                }
                if ops.validation_removed {
                    lines.push(format!("  → Bloco {} removido", VALIDATION_BLOCK));
                }
                if !ops.metadata_removed.is_empty() {
                    lines.push(format!(
                        "  → Campos de metadados removidos: {}",
                        ops.metadata_removed.join(", ")
                    ));
                }
                lines.push(String::new());
            }
        }

        if !self.errors.is_empty() {
            lines.push("ERROS ENCONTRADOS:".to_string());
            lines.push("-".repeat(40));
            for (path, error) in &self.errors {
                lines.push(format!("Arquivo: {}", path.display()));
                lines.push(format!("Erro: {}", error));
                lines.push(String::new());
            }
        }

        lines.extend([
            "=".repeat(80),
            "RESUMO FINAL".to_string(),
            "=".repeat(80),
            format!(
                "Processamento concluído: {}/{} arquivos processados com sucesso",
                success, total
            ),
        ]);
        if self.errors.is_empty() {
            lines.push("✓ Todos os arquivos foram processados com sucesso!".to_string());
        } else {
            lines.push(format!(
                "⚠ {} arquivo(s) apresentou(aram) erro(s)",
                self.errors.len()
            ));
        }
        lines.join("\n")
    }

    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        save_timestamped(
            dir,
            "relatorio_processamento_unificado",
            self.started,
            &self.render(),
        )
    }
}

/// Removes the validation block and metadata fields in place; a missing block is not an error.
fn strip_fields(document: &mut Value) -> Result<(bool, Vec<&'static str>)> {
    let Some(map) = document.as_object_mut() else {
        bail!("Estrutura inválida: o JSON não é um objeto");
    };
    let validation_removed = map.shift_remove(VALIDATION_BLOCK).is_some();
    let metadata_removed = METADATA_FIELDS
        .iter()
        .copied()
        .filter(|field| map.shift_remove(*field).is_some())
        .collect();
    Ok((validation_removed, metadata_removed))
}

/// Stem the file should carry: the sanitized station title, or its current stem when untitled.
fn target_stem(document: &Value, path: &Path) -> String {
    match document.get("tituloEstacao").and_then(Value::as_str) {
        Some(title) if !title.is_empty() => storage::sanitize_title(title),
        _ => {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            storage::sanitize_title(&stem)
        }
    }
}

pub fn tidy_file(path: &Path) -> Result<TidyOperations> {
    let raw = fs::read_to_string(path).with_context(|| format!("Falha ao ler {:?}", path))?;
    let mut document: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Erro ao fazer parse do JSON {:?}", path))?;

    let (validation_removed, metadata_removed) = strip_fields(&mut document)?;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let target = storage::unique_json_path(dir, &target_stem(&document, path), Some(path));

    let mut json = serde_json::to_string_pretty(&document)?;
    json.push('\n');
    storage::write_atomic(path, json.as_bytes())?;

    let renamed_to = if target.as_path() != path {
        fs::rename(path, &target)
            .with_context(|| format!("Falha ao renomear {:?} para {:?}", path, target))?;
        Some(target)
    } else {
        None
    };

    Ok(TidyOperations {
        renamed_to,
        validation_removed,
        metadata_removed,
    })
}

pub fn tidy_directory(dir: &Path) -> Result<TidyReport> {
    if !dir.is_dir() {
        bail!("Diretório não encontrado: {:?}", dir);
    }
    let started = Local::now();
    let files = find_json_files(dir);
    println!("Encontrados {} arquivos JSON", files.len());

    let mut report = TidyReport {
        started,
        finished: started,
        processed: Vec::new(),
        errors: Vec::new(),
    };
    let total = files.len();
    for (index, path) in files.into_iter().enumerate() {
        let relative = path.strip_prefix(dir).unwrap_or(path.as_path()).to_path_buf();
        println!("[{}/{}] Processando: {}", index + 1, total, relative.display());

        match tidy_file(&path) {
            Ok(ops) => {
                println!("  ✓ Processado com sucesso");
                if let Some(new_path) = &ops.renamed_to {
                    println!("    → Renomeado: {}", new_path.display());
                }
                tracing::debug!(file = %relative.display(), ?ops, "Estação organizada");
                report.processed.push((relative, ops));
            }
            Err(err) => {
                eprintln!("  ✗ Erro: {:#}", err);
                report.errors.push((relative, format!("{:#}", err)));
            }
        }
    }
    report.finished = Local::now();
    Ok(report)
}

/// The `tidy` command. Returns the report path.
pub fn run_tidy(dir: &Path, report_dir: &Path) -> Result<PathBuf> {
    println!("INICIANDO PROCESSAMENTO UNIFICADO DE ARQUIVOS JSON");
    println!("Diretório: {:?}", dir);

    let report = tidy_directory(dir)?;
    println!("\n{}", report.render());
    let path = report.save(report_dir)?;
    println!("\nRelatório salvo em: {}", path.display());
    Ok(path)
}
