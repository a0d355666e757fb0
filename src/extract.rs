//
// extract.rs
// Station-Tools-rs
//
// Recovers the patient's age and gender from a free-text case description through ordered,
// first-match-wins rule cascades.
//
// Thales Matheus Mendonça Santos - November 2025

use std::sync::LazyLock;

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use crate::models::{Demographics, Gender};
use crate::text;

/// Plausible ages for a patient described only as elderly.
pub const ELDERLY_AGES: [u32; 5] = [65, 70, 75, 80, 85];

const MAX_AGE: u32 = 120;

static EXPLICIT_AGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,3})\s*anos?\b").unwrap());
static AGE_OF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bidade\s+de\s+(\d{1,3})\b").unwrap());
static PATIENT_OF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpaciente\s+de\s+(\d{1,3})\s*anos?\b").unwrap());
static NAMED_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\p{Lu}\p{Ll}+(?:\s+(?:d[aeo]s?\s+)?\p{Lu}\p{Ll}+)+\s*,\s*(\d{1,3})\s*(?i:anos?)\b")
        .unwrap()
});
static ELDERLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bidos[oa]\s*\(a\)|\b(?:paciente|senhora?)\s+idos[oa]\b").unwrap()
});

static EXPLICIT_GENDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:sexo|g[êe]nero)\s*:?\s*(masculino|feminino)\b").unwrap()
});
static PATIENT_ADJECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpaciente\s+(masculino|feminina|feminino)\b").unwrap());
static PASSIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bé\s+(?:trazid|levad|encaminhad|atendid|internad)([oa])\b").unwrap()
});
static INDEFINITE_ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(uma?)\s+paciente\b").unwrap());
static DEFINITE_ARTICLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^\p{L}\p{N}])(o|a|à|ao|do|da|no|na|pelo|pela)\s+paciente\b").unwrap()
});
static HONORIFIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?i:(dona|sra\.?|senhora|dr\.?|sr\.?|senhor))\s+\p{Lu}\p{Ll}+").unwrap()
});
static COMPANION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bacompanhad([oa])\b").unwrap());
static KINSHIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(pai|mãe|filho|filha)\s+tem\b").unwrap());
static GIVEN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|[.;]\s*)(?:(?i:dona|sra\.?|sr\.?|paciente)\s+)?(\p{Lu}\p{Ll}+)(?:\s+(?:d[aeo]s?\s+)?\p{Lu}\p{Ll}+)*\s*,\s*\d{1,3}\s*(?i:anos?)\b",
    )
    .unwrap()
});

const FEMININE_GIVEN_NAMES: &[&str] = &[
    "maria", "ana", "beatriz", "isabel", "raquel", "ester", "ruth", "rute", "carmen",
    "ivone", "lourdes", "mercedes", "inês", "ines", "liz", "alice", "beatrice", "iris",
];
const MASCULINE_GIVEN_NAMES: &[&str] = &[
    "joão", "joao", "josé", "jose", "luiz", "luis", "luís", "davi", "david", "miguel",
    "rafael", "gabriel", "daniel", "samuel", "manuel", "raul", "rui", "ângelo", "angelo",
    "luca", "nicolas", "jorge", "henrique", "felipe", "caique",
];

/// Ordered age rules; the first one yielding a value wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeRule {
    /// "34 anos", skipping durations such as "há 2 anos".
    Explicit,
    /// "idade de 68".
    AgeOf,
    /// "paciente de 25 anos".
    PatientOf,
    /// "Maria Silva, 62 anos".
    NamedComma,
    /// "idoso(a)" with no number: a plausible elderly age is drawn.
    Elderly,
}

pub const AGE_RULES: [AgeRule; 5] = [
    AgeRule::Explicit,
    AgeRule::AgeOf,
    AgeRule::PatientOf,
    AgeRule::NamedComma,
    AgeRule::Elderly,
];

fn plausible_age(raw: &str) -> Option<u32> {
    raw.parse::<u32>()
        .ok()
        .filter(|age| (1..=MAX_AGE).contains(age))
}

fn first_captured_age(re: &Regex, description: &str) -> Option<u32> {
    re.captures_iter(description)
        .find_map(|caps| caps.get(1).and_then(|m| plausible_age(m.as_str())))
}

impl AgeRule {
    pub fn apply<R: Rng + ?Sized>(self, description: &str, rng: &mut R) -> Option<u32> {
        match self {
            AgeRule::Explicit => EXPLICIT_AGE.captures_iter(description).find_map(|caps| {
                let whole = caps.get(0)?;
                let before = &description[..whole.start()];
                let after = &description[whole.end()..];
                if text::age_in_clinical_context(before, after) {
                    return None;
                }
                caps.get(1).and_then(|m| plausible_age(m.as_str()))
            }),
            AgeRule::AgeOf => first_captured_age(&AGE_OF, description),
            AgeRule::PatientOf => first_captured_age(&PATIENT_OF, description),
            AgeRule::NamedComma => first_captured_age(&NAMED_COMMA, description),
            AgeRule::Elderly => {
                if ELDERLY.is_match(description) {
                    ELDERLY_AGES.choose(rng).copied()
                } else {
                    None
                }
            }
        }
    }
}

/// Ordered gender rules; the first one yielding a value wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenderRule {
    /// "sexo feminino", "gênero: masculino".
    Explicit,
    /// "paciente feminina".
    PatientAdjective,
    /// "é trazido" / "é trazida" and similar participles.
    Passive,
    /// "um paciente" / "uma paciente".
    IndefiniteArticle,
    /// "o paciente" / "a paciente", including contractions ("da", "pelo").
    DefiniteArticle,
    /// "Dona Maria" / "Sr. José".
    Honorific,
    /// "acompanhado" / "acompanhada".
    Companion,
    /// "pai tem" / "mãe tem" / "filho tem" / "filha tem".
    Kinship,
    /// Given name of a "Name Surname, N anos" clause.
    GivenName,
}

pub const GENDER_RULES: [GenderRule; 9] = [
    GenderRule::Explicit,
    GenderRule::PatientAdjective,
    GenderRule::Passive,
    GenderRule::IndefiniteArticle,
    GenderRule::DefiniteArticle,
    GenderRule::Honorific,
    GenderRule::Companion,
    GenderRule::Kinship,
    GenderRule::GivenName,
];

fn gender_from_ending(word: &str) -> Option<Gender> {
    match word.chars().last() {
        Some('o') => Some(Gender::Masculine),
        Some('a') | Some('à') => Some(Gender::Feminine),
        _ => None,
    }
}

/// Guesses the gender of a Portuguese given name: known names first, then the final vowel.
pub fn gender_of_given_name(name: &str) -> Option<Gender> {
    let lower = name.to_lowercase();
    if FEMININE_GIVEN_NAMES.contains(&lower.as_str()) {
        return Some(Gender::Feminine);
    }
    if MASCULINE_GIVEN_NAMES.contains(&lower.as_str()) {
        return Some(Gender::Masculine);
    }
    gender_from_ending(&lower)
}

impl GenderRule {
    pub fn apply(self, description: &str) -> Option<Gender> {
        let captured = |re: &Regex| -> Option<String> {
            re.captures(description)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_lowercase())
        };

        match self {
            GenderRule::Explicit | GenderRule::PatientAdjective => {
                let re = if self == GenderRule::Explicit {
                    &*EXPLICIT_GENDER
                } else {
                    &*PATIENT_ADJECTIVE
                };
                captured(re).and_then(|word| Gender::parse(&word))
            }
            GenderRule::Passive | GenderRule::Companion => {
                let re = if self == GenderRule::Passive {
                    &*PASSIVE
                } else {
                    &*COMPANION
                };
                captured(re).and_then(|ending| gender_from_ending(&ending))
            }
            GenderRule::IndefiniteArticle => {
                captured(&INDEFINITE_ARTICLE).map(|article| match article.as_str() {
                    "uma" => Gender::Feminine,
                    _ => Gender::Masculine,
                })
            }
            GenderRule::DefiniteArticle => {
                captured(&DEFINITE_ARTICLE).and_then(|article| gender_from_ending(&article))
            }
            GenderRule::Honorific => captured(&HONORIFIC).map(|title| {
                let title = title.trim_end_matches('.');
                match title {
                    "dona" | "sra" | "senhora" => Gender::Feminine,
                    _ => Gender::Masculine,
                }
            }),
            GenderRule::Kinship => captured(&KINSHIP).map(|kin| match kin.as_str() {
                "mãe" | "filha" => Gender::Feminine,
                _ => Gender::Masculine,
            }),
            GenderRule::GivenName => GIVEN_NAME
                .captures_iter(description)
                .filter_map(|caps| caps.get(1))
                .filter(|m| !m.as_str().eq_ignore_ascii_case("paciente"))
                .find_map(|m| gender_of_given_name(m.as_str())),
        }
    }
}

/// Whole-text keyword tiers for the second pass, feminine cues before masculine ones.
const KEYWORD_TIERS: &[(&[&str], Gender)] = &[
    (
        &[
            "paciente feminina",
            "mulher",
            "dona",
            "sra",
            "senhora",
            "gestante",
            "grávida",
            "puérpera",
            "mãe tem",
            "filha tem",
            "acompanhada",
        ],
        Gender::Feminine,
    ),
    (
        &[
            "paciente masculino",
            "homem",
            "sr",
            "dr",
            "senhor",
            "pai tem",
            "filho tem",
            "acompanhado",
        ],
        Gender::Masculine,
    ),
    (&["a paciente"], Gender::Feminine),
    (&["o paciente"], Gender::Masculine),
    (&["mãe", "filha"], Gender::Feminine),
    (&["pai", "filho"], Gender::Masculine),
];

pub fn extract_age<R: Rng + ?Sized>(description: &str, rng: &mut R) -> Option<u32> {
    AGE_RULES
        .iter()
        .find_map(|rule| rule.apply(description, rng))
}

pub fn extract_gender(description: &str) -> Option<Gender> {
    GENDER_RULES
        .iter()
        .find_map(|rule| rule.apply(description))
        .or_else(|| {
            KEYWORD_TIERS
                .iter()
                .find(|(cues, _)| text::contains_any_term(description, cues))
                .map(|(_, gender)| *gender)
        })
}

/// Age and gender as stated (or strongly implied) by the description.
pub fn extract<R: Rng + ?Sized>(description: &str, rng: &mut R) -> Demographics {
    let demographics = Demographics {
        age: extract_age(description, rng),
        gender: extract_gender(description),
    };
    tracing::debug!(
        age = ?demographics.age,
        gender = ?demographics.gender,
        "Dados extraídos da descrição"
    );
    demographics
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn explicit_age_wins_over_later_rules() {
        let text = "Maria Silva, 34 anos, chega com disúria e dor suprapúbica";
        assert_eq!(AgeRule::Explicit.apply(text, &mut rng()), Some(34));
        assert_eq!(AgeRule::NamedComma.apply(text, &mut rng()), Some(34));
        assert_eq!(extract_age(text, &mut rng()), Some(34));
    }

    #[test]
    fn durations_are_not_ages() {
        let text = "Paciente refere dor lombar há 2 anos. Tem idade de 58 e é tabagista.";
        assert_eq!(AgeRule::Explicit.apply(text, &mut rng()), None);
        assert_eq!(extract_age(text, &mut rng()), Some(58));
    }

    #[test]
    fn patient_of_rule_reads_the_number() {
        assert_eq!(
            AgeRule::PatientOf.apply("paciente de 25 anos procura a UBS", &mut rng()),
            Some(25)
        );
    }

    #[test]
    fn elderly_without_number_draws_plausible_age() {
        let age = extract_age("Idoso(a) chega com confusão mental", &mut rng()).expect("age");
        assert!(ELDERLY_AGES.contains(&age));
    }

    #[test]
    fn implausible_numbers_are_ignored() {
        assert_eq!(extract_age("Refere 0 anos de sono", &mut rng()), None);
        assert_eq!(extract_age("Paciente com 300 anos", &mut rng()), None);
    }

    #[test]
    fn gender_rules_map_grammatical_cues() {
        assert_eq!(
            GenderRule::Explicit.apply("Paciente do sexo feminino"),
            Some(Gender::Feminine)
        );
        assert_eq!(
            GenderRule::Passive.apply("Paciente é trazido pelo SAMU"),
            Some(Gender::Masculine)
        );
        assert_eq!(
            GenderRule::IndefiniteArticle.apply("Trata-se de uma paciente com dor"),
            Some(Gender::Feminine)
        );
        assert_eq!(
            GenderRule::DefiniteArticle.apply("Exame da paciente mostra"),
            Some(Gender::Feminine)
        );
        assert_eq!(
            GenderRule::Honorific.apply("Sr. José Santos procura a unidade"),
            Some(Gender::Masculine)
        );
        assert_eq!(
            GenderRule::Honorific.apply("Dona Maria Silva procura a unidade"),
            Some(Gender::Feminine)
        );
        assert_eq!(
            GenderRule::Kinship.apply("Refere que a filha tem asma"),
            Some(Gender::Feminine)
        );
    }

    #[test]
    fn uma_paciente_is_not_read_as_definite_article() {
        assert_eq!(GenderRule::DefiniteArticle.apply("uma paciente"), None);
    }

    #[test]
    fn explicit_cue_beats_article_cue() {
        let text = "O paciente, do sexo feminino, chega à UPA";
        assert_eq!(extract_gender(text), Some(Gender::Feminine));
    }

    #[test]
    fn given_name_of_demographic_clause_sets_gender() {
        assert_eq!(
            extract_gender("Maria Silva, 34 anos, chega com disúria"),
            Some(Gender::Feminine)
        );
        assert_eq!(
            extract_gender("João Santos, 70 anos, refere dispneia"),
            Some(Gender::Masculine)
        );
    }

    #[test]
    fn keyword_pass_prefers_feminine_cues() {
        assert_eq!(
            extract_gender("Mulher refere cefaleia; homem ao lado"),
            Some(Gender::Feminine)
        );
        assert_eq!(extract_gender("Homem com tosse"), Some(Gender::Masculine));
        assert_eq!(extract_gender("Refere tosse seca há 3 dias"), None);
    }

    #[test]
    fn keyword_pass_does_not_match_inside_words() {
        assert_eq!(extract_gender("Usa drogas e refere dor"), None);
    }
}
