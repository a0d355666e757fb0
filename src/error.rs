//
// error.rs
// Station-Tools-rs
//
// Per-file failure taxonomy of the anonymization batch.
//
// Thales Matheus Mendonça Santos - November 2025

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("JSON inválido: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("Estrutura incompleta: descrição do caso ausente")]
    IncompleteStructure,
    #[error("Arquivo com {0} blocos de identificação; ignorado para evitar corrupção")]
    DuplicateIdentification(usize),
    #[error("Não foi possível extrair idade ou gênero de: {0}")]
    ExtractionFailed(String),
    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessError {
    /// Short label used in the report's per-file lines.
    pub fn label(&self) -> &'static str {
        match self {
            ProcessError::MalformedJson(_) => "json inválido",
            ProcessError::IncompleteStructure => "estrutura incompleta",
            ProcessError::DuplicateIdentification(_) => "identificação duplicada",
            ProcessError::ExtractionFailed(_) => "extração falhou",
            ProcessError::Io(_) => "erro de E/S",
        }
    }
}
