//
// identification.rs
// Station-Tools-rs
//
// Builds the "IDENTIFICAÇÃO DO PACIENTE" entry from a synthesized identity and re-normalizes
// entries that already exist in either the legacy "Chave: valor" layout or the comma sentence.
//
// Thales Matheus Mendonça Santos - November 2025

use std::collections::BTreeMap;

use crate::lexicon;
use crate::models::{
    Gender, IdentificationField, SynthesizedIdentity, VerbalInfo, IDENTIFICATION_KEY,
};
use crate::text;

const ORIGIN_HINTS: &[&str] = &[
    "área",
    "zona",
    "capital",
    "urbana",
    "rural",
    "procedência",
    "procedente",
    "natural de",
];

/// Ordered field values of an identification entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentificationBlock {
    values: BTreeMap<IdentificationField, String>,
}

impl IdentificationBlock {
    pub fn build(identity: &SynthesizedIdentity, disclose_gender: bool) -> Self {
        let mut values = BTreeMap::new();
        values.insert(IdentificationField::Name, identity.name.clone());
        values.insert(IdentificationField::Age, format!("{} anos", identity.age));
        if disclose_gender {
            values.insert(
                IdentificationField::Gender,
                identity.gender.label().to_string(),
            );
        }
        values.insert(IdentificationField::Occupation, identity.occupation.clone());
        values.insert(
            IdentificationField::MaritalStatus,
            identity.marital_status.clone(),
        );
        if let Some(origin) = &identity.origin {
            values.insert(IdentificationField::Origin, origin.clone());
        }
        Self { values }
    }

    pub fn get(&self, field: IdentificationField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// "Nome: ...\nIdade: ..." lines, the layout written for new entries.
    pub fn render_lines(&self) -> String {
        self.values
            .iter()
            .map(|(field, value)| format!("{}: {}", field.label(), value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// "v1, v2 e v3", the layout existing entries are normalized to.
    pub fn render_sentence(&self) -> String {
        let values: Vec<&str> = self.values.values().map(String::as_str).collect();
        match values.split_last() {
            None => String::new(),
            Some((last, [])) => last.to_string(),
            Some((last, rest)) => format!("{} e {}", rest.join(", "), last),
        }
    }

    pub fn to_verbal_info(&self) -> VerbalInfo {
        VerbalInfo {
            context_key: IDENTIFICATION_KEY.to_string(),
            information: self.render_lines(),
        }
    }

    /// Parses an existing entry, dropping placeholders and correcting gender agreement.
    pub fn parse(raw: &str) -> Self {
        let raw_values = if raw.lines().any(|line| line.contains(':')) {
            parse_key_value_lines(raw)
        } else {
            parse_sentence(raw)
        };

        let mut values = BTreeMap::new();
        for (field, value) in raw_values {
            if let Some(value) = clean_value(field, &value) {
                values.entry(field).or_insert(value);
            }
        }

        let mut block = Self { values };
        block.correct_agreement();
        block
    }

    fn correct_agreement(&mut self) {
        let gender = self
            .get(IdentificationField::Gender)
            .and_then(Gender::parse);

        if let Some(occupation) = self.values.get_mut(&IdentificationField::Occupation) {
            let corrected = match gender {
                Some(gender) => lexicon::correct_occupation(occupation, gender),
                None => lexicon::standardize(lexicon::OCCUPATIONS, occupation)
                    .map_or_else(|| occupation.clone(), str::to_string),
            };
            if corrected != *occupation {
                tracing::debug!("Ocupação corrigida: '{}' -> '{}'", occupation, corrected);
                *occupation = corrected;
            }
        }

        if let Some(marital) = self.values.get_mut(&IdentificationField::MaritalStatus) {
            let corrected = match gender {
                Some(gender) => lexicon::correct_marital_status(marital, gender),
                None => lexicon::standardize(lexicon::MARITAL_STATUSES, marital)
                    .map_or_else(|| marital.clone(), str::to_string),
            };
            if corrected != *marital {
                tracing::debug!("Estado civil corrigido: '{}' -> '{}'", marital, corrected);
                *marital = corrected;
            }
        }
    }
}

fn parse_key_value_lines(raw: &str) -> Vec<(IdentificationField, String)> {
    raw.lines()
        .filter_map(|line| line.split_once(':'))
        .filter_map(|(key, value)| {
            IdentificationField::from_key(key).map(|field| (field, value.trim().to_string()))
        })
        .collect()
}

fn is_placeholder(field: IdentificationField, value: &str) -> bool {
    field
        .placeholder()
        .is_some_and(|placeholder| text::fold(value) == text::fold(placeholder))
}

fn classify(item: &str) -> Option<IdentificationField> {
    let fold = text::fold(item);
    let is_placeholder_of = |field: IdentificationField| is_placeholder(field, item);

    if text::contains_any_term(&fold, &["anos", "ano", "idade"]) {
        Some(IdentificationField::Age)
    } else if Gender::parse(item).is_some() || is_placeholder_of(IdentificationField::Gender) {
        Some(IdentificationField::Gender)
    } else if lexicon::lookup(lexicon::MARITAL_STATUSES, item).is_some()
        || is_placeholder_of(IdentificationField::MaritalStatus)
    {
        Some(IdentificationField::MaritalStatus)
    } else if lexicon::lookup(lexicon::OCCUPATIONS, item).is_some()
        || is_placeholder_of(IdentificationField::Occupation)
    {
        Some(IdentificationField::Occupation)
    } else if ORIGIN_HINTS
        .iter()
        .any(|hint| text::contains_term(&fold, &text::fold(hint)))
    {
        Some(IdentificationField::Origin)
    } else {
        None
    }
}

/// Splits "Nome, 34 anos, feminino, Professora e Casada" into its items.
fn split_items(raw: &str) -> Vec<String> {
    let mut items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    if let Some(last) = items.pop() {
        match last.rsplit_once(" e ") {
            Some((head, tail)) => {
                items.push(head.trim().to_string());
                items.push(tail.trim().to_string());
            }
            None => items.push(last),
        }
    }
    items.retain(|item| !item.is_empty());
    items
}

fn parse_sentence(raw: &str) -> Vec<(IdentificationField, String)> {
    let mut values: Vec<(IdentificationField, String)> = Vec::new();
    let filled = |values: &[(IdentificationField, String)], field| {
        values.iter().any(|(existing, _)| *existing == field)
    };

    for (index, item) in split_items(raw).into_iter().enumerate() {
        let field = match classify(&item) {
            Some(field) => field,
            None if index == 0 => IdentificationField::Name,
            None if !filled(&values, IdentificationField::Occupation) => {
                IdentificationField::Occupation
            }
            None if !filled(&values, IdentificationField::MaritalStatus) => {
                IdentificationField::MaritalStatus
            }
            None => {
                tracing::debug!("Item de identificação não classificado: '{}'", item);
                continue;
            }
        };
        values.push((field, item));
    }
    values
}

/// Drops placeholders and blanks; ages are rewritten as "N anos".
fn clean_value(field: IdentificationField, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || is_placeholder(field, value) {
        return None;
    }
    if field == IdentificationField::Age {
        let digits: String = value.chars().filter(char::is_ascii_digit).collect();
        return digits.parse::<u32>().ok().map(|age| format!("{age} anos"));
    }
    Some(value.to_string())
}

/// Normalized sentence for an existing identification text; empty when nothing resolved.
pub fn normalize_existing(raw: &str) -> String {
    IdentificationBlock::parse(raw).render_sentence()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(gender: Gender, origin: Option<&str>) -> SynthesizedIdentity {
        SynthesizedIdentity {
            name: "Ana Lima".to_string(),
            age: 34,
            gender,
            occupation: "Professora".to_string(),
            marital_status: "Casada".to_string(),
            origin: origin.map(str::to_string),
        }
    }

    #[test]
    fn built_block_renders_ordered_lines() {
        let block = IdentificationBlock::build(&identity(Gender::Feminine, None), false);
        assert_eq!(
            block.render_lines(),
            "Nome: Ana Lima\nIdade: 34 anos\nOcupação: Professora\nEstado Civil: Casada"
        );
        assert_eq!(block.get(IdentificationField::Gender), None);
    }

    #[test]
    fn gender_and_origin_lines_are_conditional() {
        let block = IdentificationBlock::build(
            &identity(Gender::Feminine, Some("Área urbana periférica")),
            true,
        );
        let lines = block.render_lines();
        assert!(lines.contains("\nGênero: Feminino\n"));
        assert!(lines.ends_with("Procedência: Área urbana periférica"));
    }

    #[test]
    fn comma_sentence_is_corrected_for_gender() {
        assert_eq!(
            normalize_existing("João Santos, 70 anos, masculino, aposentado e viúva"),
            "João Santos, 70 anos, masculino, Aposentado e Viúvo"
        );
        assert_eq!(
            normalize_existing("Ana Lima, 40 anos, feminino, professor e viúvo"),
            "Ana Lima, 40 anos, feminino, Professora e Viúva"
        );
    }

    #[test]
    fn legacy_lines_become_a_sentence() {
        let raw = "Nome: Ana Lima\nIdade: 34\nGênero: Feminino\nProfissão: professor\nEstado civil: casado";
        assert_eq!(
            normalize_existing(raw),
            "Ana Lima, 34 anos, Feminino, Professora e Casada"
        );
    }

    #[test]
    fn placeholders_are_omitted() {
        let raw = "Nome: Nome Desconhecido\nIdade: idade não informada\nGênero: gênero não informado";
        assert_eq!(normalize_existing(raw), "");
        assert_eq!(
            normalize_existing("Carlos Reis, 50 anos, gênero não informado, Motorista e estado civil não informado"),
            "Carlos Reis, 50 anos e Motorista"
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "João Santos, 70 anos, masculino, aposentado e viúva",
            "Nome: Ana Lima\nIdade: 34 anos\nOcupação: Profissional de escritório\nEstado Civil: Casada\nProcedência: Área rural de Minas Gerais",
            "Carlos Reis, 50 anos e Motorista",
            "Maria Souza",
        ];
        for raw in inputs {
            let once = normalize_existing(raw);
            assert_eq!(normalize_existing(&once), once);
        }
    }

    #[test]
    fn rendered_lines_normalize_to_rendered_sentence() {
        let block = IdentificationBlock::build(
            &identity(Gender::Feminine, Some("Área rural de Minas Gerais")),
            true,
        );
        assert_eq!(normalize_existing(&block.render_lines()), block.render_sentence());
    }
}
