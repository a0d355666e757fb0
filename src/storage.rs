//
// storage.rs
// Station-Tools-rs
//
// Atomic in-place rewrites of station files, content fingerprints and title-based file names.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

const MAX_STEM_CHARS: usize = 100;

/// First 12 hex digits of the SHA-256 of `bytes`.
pub fn fingerprint(bytes: &[u8]) -> String {
    let hash = hex::encode(Sha256::digest(bytes));
    hash[..12].to_string()
}

/// Writes `bytes` to a temporary sibling and renames it over `path`, so a failed write never
/// leaves a truncated station behind.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Caminho de arquivo sem nome")?;
    let temp = dir.join(format!(".{}.{}.tmp", name, fingerprint(bytes)));

    if let Err(err) = fs::write(&temp, bytes) {
        let _ = fs::remove_file(&temp);
        return Err(err)
            .with_context(|| format!("Falha ao gravar arquivo temporário {:?}", temp));
    }
    if let Err(err) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(err).with_context(|| format!("Falha ao substituir {:?}", path));
    }
    Ok(())
}

/// File stem derived from a station title: punctuation dropped, whitespace turned into `_`,
/// lowercase, at most 100 characters. Only a missing title is "sem_titulo"; one that sanitizes
/// to nothing is "titulo_sanitizado".
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    let joined = kept.split_whitespace().collect::<Vec<_>>().join("_");
    let truncated: String = joined.chars().take(MAX_STEM_CHARS).collect();
    let stem = truncated.trim_matches('_').to_lowercase();

    if stem.is_empty() {
        if title.is_empty() {
            "sem_titulo".to_string()
        } else {
            "titulo_sanitizado".to_string()
        }
    } else {
        stem
    }
}

/// `dir/stem.json`, or `dir/stem_N.json` with the first free N. `current` is never treated
/// as a collision so an already well-named file keeps its name.
pub fn unique_json_path(dir: &Path, stem: &str, current: Option<&Path>) -> PathBuf {
    let is_free = |candidate: &Path| !candidate.exists() || Some(candidate) == current;

    let candidate = dir.join(format!("{stem}.json"));
    if is_free(candidate.as_path()) {
        return candidate;
    }
    (1..)
        .map(|n| dir.join(format!("{stem}_{n}.json")))
        .find(|candidate| is_free(candidate.as_path()))
        .unwrap_or(candidate)
}
