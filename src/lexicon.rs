//
// lexicon.rs
// Station-Tools-rs
//
// Masculine/feminine word pairs for occupations and marital statuses, used to generate
// agreeing values and to correct disagreeing ones in existing identification blocks.
//
// Thales Matheus Mendonça Santos - November 2025

use crate::models::Gender;
use crate::text;

/// A word with its masculine and feminine spellings. Epicene words use the same form twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inflection {
    pub masculine: &'static str,
    pub feminine: &'static str,
}

impl Inflection {
    const fn new(masculine: &'static str, feminine: &'static str) -> Self {
        Self {
            masculine,
            feminine,
        }
    }

    const fn epicene(word: &'static str) -> Self {
        Self::new(word, word)
    }

    pub fn for_gender(&self, gender: Gender) -> &'static str {
        gender.pick(self.masculine, self.feminine)
    }

    pub fn is_epicene(&self) -> bool {
        self.masculine == self.feminine
    }

    /// Which gender a spelling belongs to, when it is one of this entry's forms.
    fn gender_of(&self, value: &str) -> Option<Gender> {
        let folded = text::fold(value.trim());
        if folded == text::fold(self.masculine) {
            Some(Gender::Masculine)
        } else if folded == text::fold(self.feminine) {
            Some(Gender::Feminine)
        } else {
            None
        }
    }
}

pub const RETIRED: Inflection = Inflection::new("Aposentado", "Aposentada");
pub const RURAL_WORKER: Inflection = Inflection::new("Trabalhador rural", "Trabalhadora rural");
pub const STUDENT: Inflection = Inflection::epicene("Estudante");
pub const UNIVERSITY_STUDENT: Inflection =
    Inflection::new("Estudante universitário", "Estudante universitária");
pub const LIBERAL_PROFESSIONAL: Inflection = Inflection::epicene("Profissional liberal");
pub const OFFICE_PROFESSIONAL: Inflection = Inflection::epicene("Profissional de escritório");

pub const SINGLE: Inflection = Inflection::new("Solteiro", "Solteira");
pub const MARRIED: Inflection = Inflection::new("Casado", "Casada");
pub const DIVORCED: Inflection = Inflection::new("Divorciado", "Divorciada");
pub const WIDOWED: Inflection = Inflection::new("Viúvo", "Viúva");
pub const SEPARATED: Inflection = Inflection::new("Separado", "Separada");

/// Pool sampled for adults without a disease-specific occupation.
pub const GENERAL_OCCUPATIONS: &[Inflection] = &[
    Inflection::new("Professor", "Professora"),
    Inflection::new("Enfermeiro", "Enfermeira"),
    Inflection::epicene("Comerciante"),
    Inflection::epicene("Motorista"),
    Inflection::new("Funcionário público", "Funcionária pública"),
];

/// Every occupation the tool knows how to inflect. Longer phrases come before their heads
/// so "funcionária pública" is corrected as a whole.
pub const OCCUPATIONS: &[Inflection] = &[
    Inflection::new("Funcionário público", "Funcionária pública"),
    Inflection::new("Funcionário", "Funcionária"),
    UNIVERSITY_STUDENT,
    RURAL_WORKER,
    RETIRED,
    Inflection::new("Professor", "Professora"),
    Inflection::new("Enfermeiro", "Enfermeira"),
    Inflection::new("Cozinheiro", "Cozinheira"),
    Inflection::new("Médico", "Médica"),
    Inflection::new("Advogado", "Advogada"),
    Inflection::new("Engenheiro", "Engenheira"),
    Inflection::new("Contador", "Contadora"),
    Inflection::new("Empresário", "Empresária"),
    Inflection::new("Agricultor", "Agricultora"),
    Inflection::new("Bancário", "Bancária"),
    Inflection::new("Vendedor", "Vendedora"),
    Inflection::epicene("Comerciante"),
    Inflection::epicene("Motorista"),
    STUDENT,
    LIBERAL_PROFESSIONAL,
    OFFICE_PROFESSIONAL,
];

pub const MARITAL_STATUSES: &[Inflection] = &[SINGLE, MARRIED, DIVORCED, WIDOWED, SEPARATED];

/// Finds the entry whose masculine or feminine spelling equals `value` (accent-insensitive).
pub fn lookup(forms: &[Inflection], value: &str) -> Option<Inflection> {
    forms
        .iter()
        .copied()
        .find(|entry| entry.gender_of(value).is_some())
}

/// Canonical spelling of `value` for `gender`, when `value` is a known form.
pub fn inflect(forms: &[Inflection], value: &str, gender: Gender) -> Option<&'static str> {
    lookup(forms, value).map(|entry| entry.for_gender(gender))
}

/// Canonical spelling of a known form, keeping the gender it was written in.
pub fn standardize(forms: &[Inflection], value: &str) -> Option<&'static str> {
    forms
        .iter()
        .find_map(|entry| entry.gender_of(value).map(|gender| entry.for_gender(gender)))
}

/// Whether `value` agrees with `gender`. Unknown and epicene words always agree.
pub fn agrees(forms: &[Inflection], value: &str, gender: Gender) -> bool {
    match lookup(forms, value) {
        Some(entry) if !entry.is_epicene() => entry.gender_of(value) == Some(gender),
        _ => true,
    }
}

/// Corrects an occupation for `gender`. Known occupations are replaced by their canonical
/// spelling; free-form ones ("professora de inglês") only get the disagreeing word swapped.
pub fn correct_occupation(value: &str, gender: Gender) -> String {
    if let Some(canonical) = inflect(OCCUPATIONS, value, gender) {
        return canonical.to_string();
    }

    let wrong = gender.opposite();
    for entry in OCCUPATIONS.iter().filter(|e| !e.is_epicene()) {
        let disagreeing = entry.for_gender(wrong);
        if let Some(range) = text::find_term(value, disagreeing) {
            let replacement = entry.for_gender(gender);
            let replacement = if range.start == 0 {
                replacement.to_string()
            } else {
                replacement.to_lowercase()
            };
            let mut corrected = String::with_capacity(value.len());
            corrected.push_str(&value[..range.start]);
            corrected.push_str(&replacement);
            corrected.push_str(&value[range.end..]);
            return corrected;
        }
    }
    value.to_string()
}

/// Corrects a marital status for `gender`, standardizing known spellings.
pub fn correct_marital_status(value: &str, gender: Gender) -> String {
    inflect(MARITAL_STATUSES, value, gender)
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marital_status_agrees_after_correction() {
        assert_eq!(correct_marital_status("viúva", Gender::Masculine), "Viúvo");
        assert_eq!(correct_marital_status("viuvo", Gender::Feminine), "Viúva");
        assert_eq!(correct_marital_status("casado", Gender::Masculine), "Casado");
        assert_eq!(
            correct_marital_status("união estável", Gender::Feminine),
            "união estável"
        );
    }

    #[test]
    fn occupation_correction_standardizes_known_words() {
        assert_eq!(correct_occupation("professora", Gender::Masculine), "Professor");
        assert_eq!(correct_occupation("aposentado", Gender::Masculine), "Aposentado");
        assert_eq!(
            correct_occupation("funcionaria publica", Gender::Masculine),
            "Funcionário público"
        );
    }

    #[test]
    fn occupation_correction_keeps_free_text_around_the_word() {
        assert_eq!(
            correct_occupation("Professora de inglês", Gender::Masculine),
            "Professor de inglês"
        );
        assert_eq!(
            correct_occupation("Feirante", Gender::Feminine),
            "Feirante"
        );
    }

    #[test]
    fn standardize_keeps_written_gender() {
        assert_eq!(standardize(MARITAL_STATUSES, "viuva"), Some("Viúva"));
        assert_eq!(standardize(OCCUPATIONS, "APOSENTADO"), Some("Aposentado"));
        assert_eq!(standardize(OCCUPATIONS, "Feirante"), None);
    }

    #[test]
    fn agreement_detects_mismatches() {
        assert!(!agrees(MARITAL_STATUSES, "Casada", Gender::Masculine));
        assert!(agrees(MARITAL_STATUSES, "Casada", Gender::Feminine));
        assert!(agrees(OCCUPATIONS, "Motorista", Gender::Masculine));
        assert!(agrees(OCCUPATIONS, "Feirante", Gender::Feminine));
    }
}
