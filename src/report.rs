//
// report.rs
// Station-Tools-rs
//
// Collects per-file outcomes of a batch and renders/saves the plain-text summary.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::error::ProcessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    AlreadyCorrect,
    Duplicate,
    Incomplete,
    Error,
}

impl OutcomeKind {
    pub fn from_error(error: &ProcessError) -> Self {
        match error {
            ProcessError::DuplicateIdentification(_) => OutcomeKind::Duplicate,
            ProcessError::IncompleteStructure => OutcomeKind::Incomplete,
            _ => OutcomeKind::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub kind: OutcomeKind,
    pub message: String,
    /// Content fingerprints before and after a rewrite.
    pub fingerprints: Option<(String, String)>,
}

impl FileReport {
    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
    pub dry_run: bool,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn new(started: DateTime<Local>, dry_run: bool) -> Self {
        Self {
            started,
            finished: started,
            dry_run,
            files: Vec::new(),
        }
    }

    pub fn push(&mut self, file: FileReport) {
        self.files.push(file);
    }

    pub fn finish(&mut self) {
        self.finished = Local::now();
    }

    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.files.iter().filter(|f| f.kind == kind).count()
    }

    fn section(&self, lines: &mut Vec<String>, kind: OutcomeKind, heading: &str, rule: usize) {
        let files: Vec<&FileReport> = self.files.iter().filter(|f| f.kind == kind).collect();
        if files.is_empty() {
            return;
        }
        lines.push(heading.to_string());
        lines.push("-".repeat(rule));
        for file in files {
            lines.push(format!("Arquivo: {}", file.file_name()));
            match kind {
                OutcomeKind::AlreadyCorrect => {}
                OutcomeKind::Error => lines.push(format!("  Erro: {}", file.message)),
                _ => lines.push(format!("  {}", file.message)),
            }
            if let Some((before, after)) = &file.fingerprints {
                lines.push(format!("  Conteúdo: {} -> {}", before, after));
            }
            lines.push(String::new());
        }
    }

    pub fn render(&self) -> String {
        let total = self.files.len();
        let success = self.count(OutcomeKind::Success);
        let correct = self.count(OutcomeKind::AlreadyCorrect);
        let duplicates = self.count(OutcomeKind::Duplicate);
        let incomplete = self.count(OutcomeKind::Incomplete);
        let errors = self.count(OutcomeKind::Error);
        let duration = (self.finished - self.started).num_milliseconds() as f64 / 1000.0;

        let mut lines = vec![
            "=".repeat(80),
            "RELATÓRIO DE LIMPEZA DE DADOS FILIATÓRIOS".to_string(),
            "=".repeat(80),
            String::new(),
            format!(
                "Data e hora do processamento: {}",
                self.started.format("%Y-%m-%d %H:%M:%S")
            ),
            format!("Duração: {:.2} segundos", duration),
        ];
        if self.dry_run {
            lines.push("Modo simulação: nenhum arquivo foi alterado".to_string());
        }
        lines.extend([
            String::new(),
            "ESTATÍSTICAS GERAIS:".to_string(),
            "-".repeat(40),
            format!("Total de arquivos JSON: {}", total),
            format!("Arquivos processados com sucesso: {}", success),
            format!("Arquivos já corretos (pulados): {}", correct),
            format!("Arquivos com duplicatas (ignorados): {}", duplicates),
            format!("Arquivos com estrutura incompleta: {}", incomplete),
            format!("Arquivos com erro: {}", errors),
            String::new(),
        ]);

        self.section(
            &mut lines,
            OutcomeKind::Success,
            "ARQUIVOS PROCESSADOS COM SUCESSO:",
            50,
        );
        self.section(
            &mut lines,
            OutcomeKind::AlreadyCorrect,
            "ARQUIVOS JÁ CORRETOS (SEM DADOS FILIATÓRIOS):",
            50,
        );
        self.section(
            &mut lines,
            OutcomeKind::Duplicate,
            "ARQUIVOS COM DUPLICATAS (IGNORADOS):",
            40,
        );
        self.section(
            &mut lines,
            OutcomeKind::Incomplete,
            "ARQUIVOS COM ESTRUTURA INCOMPLETA (IGNORADOS):",
            40,
        );
        self.section(&mut lines, OutcomeKind::Error, "ERROS ENCONTRADOS:", 30);

        lines.extend([
            "=".repeat(80),
            "RESUMO FINAL".to_string(),
            "=".repeat(80),
            format!(
                "Processamento concluído: {}/{} arquivos limpos com sucesso",
                success, total
            ),
            format!("Arquivos já corretos: {}", correct),
            format!("Arquivos com duplicatas ignorados: {}", duplicates),
        ]);
        lines.join("\n")
    }

    /// Writes the report as `relatorio_limpeza_filiatorios_YYYYMMDD_HHMMSS.txt` under `dir`.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        save_timestamped(dir, "relatorio_limpeza_filiatorios", self.started, &self.render())
    }
}

pub fn save_timestamped(
    dir: &Path,
    prefix: &str,
    timestamp: DateTime<Local>,
    contents: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Falha ao criar diretório de relatórios {:?}", dir))?;
    let path = dir.join(format!("{}_{}.txt", prefix, timestamp.format("%Y%m%d_%H%M%S")));
    fs::write(&path, contents).with_context(|| format!("Falha ao salvar relatório {:?}", path))?;
    Ok(path)
}
