//
// names.rs
// Station-Tools-rs
//
// Loads the name database and hands out names per (age band, gender) category without
// repeating any name until its category is exhausted.
//
// Thales Matheus Mendonça Santos - November 2025

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{Gender, NameCategory};

/// Returned only when the database has no usable category at all, which `load` rejects.
const UNKNOWN_NAME: &str = "Nome Desconhecido";

#[derive(Debug, Error)]
pub enum NameDatabaseError {
    #[error("Banco de nomes não encontrado: {0}")]
    NotFound(PathBuf),
    #[error("Falha ao ler banco de nomes {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Erro ao carregar banco de nomes: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Banco de nomes sem nenhuma categoria com nomes")]
    Empty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NameDatabase {
    pub categorias: Vec<NameDatabaseCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NameDatabaseCategory {
    pub titulo: String,
    #[serde(default)]
    pub nomes: Vec<String>,
}

impl NameDatabase {
    pub fn load(path: &Path) -> Result<Self, NameDatabaseError> {
        let raw = fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                NameDatabaseError::NotFound(path.to_path_buf())
            } else {
                NameDatabaseError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, NameDatabaseError> {
        let database: NameDatabase = serde_json::from_str(raw)?;
        if database.categorias.iter().all(|c| c.nomes.is_empty()) {
            return Err(NameDatabaseError::Empty);
        }
        Ok(database)
    }
}

/// Name pools plus the per-category record of names already issued in this run.
#[derive(Debug, Clone)]
pub struct NameRegistry {
    pools: BTreeMap<String, Vec<String>>,
    used: BTreeMap<String, HashSet<String>>,
}

impl NameRegistry {
    pub fn new(database: NameDatabase) -> Self {
        let mut pools: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for category in database.categorias {
            let pool = pools.entry(category.titulo).or_default();
            for name in category.nomes {
                let name = name.trim().to_string();
                if !name.is_empty() && !pool.contains(&name) {
                    pool.push(name);
                }
            }
        }
        pools.retain(|_, names| !names.is_empty());

        let used = pools.keys().map(|k| (k.clone(), HashSet::new())).collect();
        Self { pools, used }
    }

    pub fn load(path: &Path) -> Result<Self, NameDatabaseError> {
        NameDatabase::load(path).map(Self::new)
    }

    pub fn category_for(age: u32, gender: Gender) -> NameCategory {
        NameCategory::for_patient(age, gender)
    }

    /// Resolves a category to the database title actually used: the category itself, the
    /// senior pool of the same gender, any pool of the same gender, then any pool.
    pub fn resolve(&self, category: &NameCategory) -> Option<&str> {
        let preferred = category
            .titles()
            .into_iter()
            .chain(NameCategory::fallback(category.gender).titles());
        for title in preferred {
            if let Some((key, _)) = self.pools.get_key_value(&title) {
                return Some(key.as_str());
            }
        }

        let same_gender = self
            .pools
            .keys()
            .find(|title| NameCategory::title_matches_gender(title, category.gender));
        same_gender.or_else(|| self.pools.keys().next()).map(String::as_str)
    }

    /// Draws a name not yet issued in the category; once every name has been issued the
    /// category starts over.
    pub fn draw<R: Rng + ?Sized>(&mut self, category: &NameCategory, rng: &mut R) -> String {
        let Some(title) = self.resolve(category).map(str::to_string) else {
            return UNKNOWN_NAME.to_string();
        };
        if !category.titles().contains(&title) {
            tracing::warn!(
                "Categoria de nomes ausente para {:?}; usando '{}'",
                category,
                title
            );
        }

        let pool = &self.pools[&title];
        let used = self.used.entry(title.clone()).or_default();
        let mut available: Vec<&String> = pool.iter().filter(|n| !used.contains(*n)).collect();
        if available.is_empty() {
            tracing::debug!("Categoria '{}' esgotada; reiniciando", title);
            used.clear();
            available = pool.iter().collect();
        }

        let Some(chosen) = available.choose(rng).map(|n| (*n).clone()) else {
            return UNKNOWN_NAME.to_string();
        };
        used.insert(chosen.clone());
        chosen
    }

    /// Forgets which names of a category were issued.
    pub fn reset_category(&mut self, title: &str) {
        if let Some(used) = self.used.get_mut(title) {
            used.clear();
        }
    }

    pub fn pool_size(&self, title: &str) -> usize {
        self.pools.get(title).map_or(0, Vec::len)
    }

    pub fn used_count(&self, title: &str) -> usize {
        self.used.get(title).map_or(0, HashSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const YOUNG_WOMEN: &str = "Nomes Femininos Mais Comuns (Jovens e Adolescentes)";
    const SENIOR_WOMEN: &str = "Nomes Femininos Mais Comuns (Meia-Idade e Idosas)";
    const SENIOR_MEN: &str = "Nomes Masculinos Mais Comuns (Meia-Idade e Idosos)";

    fn registry() -> NameRegistry {
        let raw = format!(
            r#"{{"categorias": [
                {{"titulo": "{YOUNG_WOMEN}", "nomes": ["Ana Souza", "Beatriz Lima", "Carla Dias", "Ana Souza"]}},
                {{"titulo": "{SENIOR_WOMEN}", "nomes": ["Dalva Rocha"]}},
                {{"titulo": "{SENIOR_MEN}", "nomes": ["Ernesto Prado", "Fausto Neves"]}}
            ]}}"#
        );
        NameRegistry::new(NameDatabase::from_json_str(&raw).expect("database"))
    }

    #[test]
    fn draws_do_not_repeat_until_category_is_exhausted() {
        let mut registry = registry();
        let mut rng = StdRng::seed_from_u64(7);
        let category = NameRegistry::category_for(30, Gender::Feminine);
        assert_eq!(registry.pool_size(YOUNG_WOMEN), 3);

        let mut seen = HashSet::new();
        for _ in 0..3 {
            assert!(seen.insert(registry.draw(&category, &mut rng)));
        }
        assert_eq!(registry.used_count(YOUNG_WOMEN), 3);

        // The fourth draw recycles the pool, so it necessarily repeats one earlier name.
        let fourth = registry.draw(&category, &mut rng);
        assert!(seen.contains(&fourth));
        assert_eq!(registry.used_count(YOUNG_WOMEN), 1);
    }

    #[test]
    fn missing_category_falls_back_to_senior_pool_of_same_gender() {
        let mut registry = registry();
        let mut rng = StdRng::seed_from_u64(1);

        let girl = NameRegistry::category_for(8, Gender::Feminine);
        assert_eq!(registry.resolve(&girl), Some(SENIOR_WOMEN));
        assert_eq!(registry.draw(&girl, &mut rng), "Dalva Rocha");

        let young_man = NameRegistry::category_for(20, Gender::Masculine);
        assert_eq!(registry.resolve(&young_man), Some(SENIOR_MEN));
    }

    #[test]
    fn reset_category_clears_usage() {
        let mut registry = registry();
        let mut rng = StdRng::seed_from_u64(3);
        let category = NameRegistry::category_for(60, Gender::Masculine);
        registry.draw(&category, &mut rng);
        assert_eq!(registry.used_count(SENIOR_MEN), 1);
        registry.reset_category(SENIOR_MEN);
        assert_eq!(registry.used_count(SENIOR_MEN), 0);
    }

    #[test]
    fn empty_or_malformed_database_is_rejected() {
        assert!(matches!(
            NameDatabase::from_json_str(r#"{"categorias": [{"titulo": "X", "nomes": []}]}"#),
            Err(NameDatabaseError::Empty)
        ));
        assert!(matches!(
            NameDatabase::from_json_str("{not json"),
            Err(NameDatabaseError::Malformed(_))
        ));
    }
}
