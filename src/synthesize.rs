//
// synthesize.rs
// Station-Tools-rs
//
// Epidemiological priors keyed by case title: fills in missing age/gender and derives
// occupation, marital status, origin and the gender-disclosure decision.
//
// Thales Matheus Mendonça Santos - November 2025

use rand::seq::SliceRandom;
use rand::Rng;

use crate::lexicon::{self, Inflection};
use crate::models::{Demographics, Gender};
use crate::text;

/// Probability of a feminine patient when no title keyword applies.
pub const DEFAULT_FEMININE_RATIO: f64 = 0.52;

const SEX_RATIOS: &[(&[&str], f64)] = &[
    (&["cistite", "itu"], 0.85),
    (&["câncer de mama", "mastite"], 1.0),
    (&["câncer de próstata", "hiperplasia prostática"], 0.0),
    (&["gravidez", "parto", "puerpério"], 1.0),
    (&["câncer cervical", "câncer de colo uterino"], 1.0),
    (&["endometriose", "mioma"], 1.0),
    (&["câncer de ovário", "câncer de endométrio"], 1.0),
    (&["menopausa", "osteoporose"], 0.80),
    (&["avc", "acidente vascular"], 0.45),
    (&["infarto", "angina"], 0.30),
    (&["diabetes", "cetoacidose"], 0.50),
];

/// Age samples per title keyword; gender-specific rows hold separate masculine/feminine ranges.
enum AgeSamples {
    Any(&'static [u32]),
    ByGender {
        masculine: &'static [u32],
        feminine: &'static [u32],
    },
}

impl AgeSamples {
    fn for_gender(&self, gender: Gender) -> &'static [u32] {
        match self {
            AgeSamples::Any(ages) => *ages,
            AgeSamples::ByGender {
                masculine,
                feminine,
            } => match gender {
                Gender::Masculine => *masculine,
                Gender::Feminine => *feminine,
            },
        }
    }
}

const AGE_TABLE: &[(&[&str], AgeSamples)] = &[
    (
        &["diabetes", "cetoacidose"],
        AgeSamples::Any(&[25, 35, 45, 65, 75]),
    ),
    (
        &["cistite", "itu"],
        AgeSamples::ByGender {
            masculine: &[45, 55, 65, 70],
            feminine: &[22, 28, 35, 42, 55],
        },
    ),
    (
        &["chagas", "chagásica"],
        AgeSamples::Any(&[45, 50, 55, 60, 65]),
    ),
    (
        &["avc", "acidente vascular"],
        AgeSamples::Any(&[60, 65, 70, 75, 80]),
    ),
    (
        &["infarto", "angina"],
        AgeSamples::ByGender {
            masculine: &[50, 55, 60, 65, 70],
            feminine: &[55, 60, 65, 70, 75],
        },
    ),
];

const DEFAULT_AGES: AgeSamples = AgeSamples::ByGender {
    masculine: &[30, 40, 50, 60, 70],
    feminine: &[25, 35, 45, 55, 65],
};

const GENDER_DISCLOSURE_TERMS: &[&str] = &[
    "homossexual",
    "lésbica",
    "gay",
    "lgbt",
    "lgbtqia",
    "trans",
    "transexual",
    "identidade de gênero",
    "orientação sexual",
    "dst",
    "ist",
    "aids",
    "hiv",
    "gonorreia",
    "sífilis",
    "herpes genital",
    "condiloma",
    "hpv",
];

const ORIGINS: &[(&[&str], &str)] = &[
    (&["chagas", "chagásica"], "Área rural de Minas Gerais"),
    (&["dengue", "chikungunya", "zika"], "Área urbana periférica"),
];

fn matching<'a, T>(table: &'a [(&[&str], T)], title: &str) -> Option<&'a T> {
    table
        .iter()
        .find(|(keywords, _)| text::contains_any_term(title, keywords))
        .map(|(_, value)| value)
}

/// Probability that a patient of this case is feminine.
pub fn feminine_ratio(title: &str) -> f64 {
    matching(SEX_RATIOS, title)
        .copied()
        .unwrap_or(DEFAULT_FEMININE_RATIO)
}

pub fn infer_gender<R: Rng + ?Sized>(title: &str, rng: &mut R) -> Gender {
    if rng.gen_bool(feminine_ratio(title)) {
        Gender::Feminine
    } else {
        Gender::Masculine
    }
}

pub fn infer_age<R: Rng + ?Sized>(title: &str, gender: Gender, rng: &mut R) -> u32 {
    let samples = matching(AGE_TABLE, title).unwrap_or(&DEFAULT_AGES);
    samples
        .for_gender(gender)
        .choose(rng)
        .copied()
        .unwrap_or(45)
}

fn disease_occupation(age: u32, title: &str) -> Option<Inflection> {
    if text::contains_any_term(title, &["chagas", "chagásica"]) {
        return Some(lexicon::RURAL_WORKER);
    }
    let adult = if text::contains_any_term(title, &["diabetes", "cetoacidose"]) {
        lexicon::LIBERAL_PROFESSIONAL
    } else if text::contains_any_term(title, &["cistite", "itu"]) {
        lexicon::OFFICE_PROFESSIONAL
    } else {
        return None;
    };
    Some(if age > 60 {
        lexicon::RETIRED
    } else if age > 25 {
        adult
    } else {
        lexicon::STUDENT
    })
}

pub fn infer_occupation<R: Rng + ?Sized>(
    age: u32,
    title: &str,
    gender: Gender,
    rng: &mut R,
) -> String {
    let entry = disease_occupation(age, title).unwrap_or_else(|| {
        if age > 65 {
            lexicon::RETIRED
        } else if age > 25 {
            lexicon::GENERAL_OCCUPATIONS
                .choose(rng)
                .copied()
                .unwrap_or(lexicon::LIBERAL_PROFESSIONAL)
        } else if age > 18 {
            lexicon::UNIVERSITY_STUDENT
        } else {
            lexicon::STUDENT
        }
    });
    entry.for_gender(gender).to_string()
}

pub fn infer_marital_status<R: Rng + ?Sized>(age: u32, gender: Gender, rng: &mut R) -> String {
    let candidates: &[Inflection] = if age < 25 {
        &[lexicon::SINGLE]
    } else if age < 60 {
        &[lexicon::MARRIED, lexicon::SINGLE, lexicon::DIVORCED]
    } else {
        &[lexicon::MARRIED, lexicon::WIDOWED]
    };
    candidates
        .choose(rng)
        .copied()
        .unwrap_or(lexicon::SINGLE)
        .for_gender(gender)
        .to_string()
}

pub fn infer_origin(title: &str) -> Option<String> {
    matching(ORIGINS, title).map(|origin| origin.to_string())
}

/// Gender is only surfaced for sexual-health and LGBT-related cases.
pub fn is_gender_disclosure_relevant(title: &str) -> bool {
    text::contains_any_term(title, GENDER_DISCLOSURE_TERMS)
}

/// Fills whatever extraction left unresolved. Gender is inferred first so the age sample
/// can depend on it.
pub fn complete_demographics<R: Rng + ?Sized>(
    extracted: Demographics,
    title: &str,
    rng: &mut R,
) -> (u32, Gender) {
    let gender = extracted
        .gender
        .unwrap_or_else(|| infer_gender(title, rng));
    let age = extracted
        .age
        .unwrap_or_else(|| infer_age(title, gender, rng));
    if !extracted.is_complete() {
        tracing::debug!(
            age,
            %gender,
            "Dados demográficos completados por inferência a partir do título"
        );
    }
    (age, gender)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sex_ratio_follows_first_matching_keyword() {
        assert_eq!(feminine_ratio("Cistite não complicada"), 0.85);
        assert_eq!(feminine_ratio("Câncer de próstata avançado"), 0.0);
        assert_eq!(feminine_ratio("Cefaleia tensional"), DEFAULT_FEMININE_RATIO);
    }

    #[test]
    fn certain_priors_fix_gender() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            assert_eq!(
                infer_gender("Câncer de mama inicial", &mut rng),
                Gender::Feminine
            );
            assert_eq!(
                infer_gender("Hiperplasia prostática benigna", &mut rng),
                Gender::Masculine
            );
        }
    }

    #[test]
    fn age_samples_come_from_title_table() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let age = infer_age("AVC isquêmico", Gender::Masculine, &mut rng);
            assert!([60, 65, 70, 75, 80].contains(&age));
            let age = infer_age("ITU de repetição", Gender::Feminine, &mut rng);
            assert!([22, 28, 35, 42, 55].contains(&age));
        }
    }

    #[test]
    fn synthesized_words_agree_with_gender() {
        let mut rng = StdRng::seed_from_u64(99);
        let titles = ["Cistite", "Diabetes tipo 2", "Doença de Chagas", "Lombalgia"];
        for gender in [Gender::Masculine, Gender::Feminine] {
            for title in titles {
                for age in [10, 20, 30, 45, 62, 80] {
                    let occupation = infer_occupation(age, title, gender, &mut rng);
                    assert!(lexicon::agrees(lexicon::OCCUPATIONS, &occupation, gender));
                    let marital = infer_marital_status(age, gender, &mut rng);
                    assert!(lexicon::agrees(lexicon::MARITAL_STATUSES, &marital, gender));
                }
            }
        }
    }

    #[test]
    fn disease_occupations_take_priority() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            infer_occupation(40, "Doença de Chagas", Gender::Feminine, &mut rng),
            "Trabalhadora rural"
        );
        assert_eq!(
            infer_occupation(34, "Cistite não complicada", Gender::Feminine, &mut rng),
            "Profissional de escritório"
        );
        assert_eq!(
            infer_occupation(70, "Lombalgia", Gender::Masculine, &mut rng),
            "Aposentado"
        );
        assert_eq!(
            infer_occupation(20, "Lombalgia", Gender::Feminine, &mut rng),
            "Estudante universitária"
        );
    }

    #[test]
    fn young_patients_are_single() {
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(infer_marital_status(19, Gender::Feminine, &mut rng), "Solteira");
    }

    #[test]
    fn origin_only_for_endemic_titles() {
        assert_eq!(
            infer_origin("Doença de Chagas crônica").as_deref(),
            Some("Área rural de Minas Gerais")
        );
        assert_eq!(
            infer_origin("Dengue com sinais de alarme").as_deref(),
            Some("Área urbana periférica")
        );
        assert_eq!(infer_origin("Asma"), None);
    }

    #[test]
    fn disclosure_matches_whole_terms_only() {
        assert!(is_gender_disclosure_relevant("Infecção pelo HIV"));
        assert!(is_gender_disclosure_relevant("Saúde da população trans"));
        assert!(!is_gender_disclosure_relevant("Transtorno de ansiedade"));
        assert!(!is_gender_disclosure_relevant("Cistite não complicada"));
    }

    #[test]
    fn complete_demographics_keeps_extracted_values() {
        let mut rng = StdRng::seed_from_u64(3);
        let extracted = Demographics {
            age: Some(34),
            gender: Some(Gender::Feminine),
        };
        assert_eq!(
            complete_demographics(extracted, "Qualquer", &mut rng),
            (34, Gender::Feminine)
        );

        let partial = Demographics {
            age: Some(50),
            gender: None,
        };
        let (age, gender) = complete_demographics(partial, "Câncer de mama", &mut rng);
        assert_eq!((age, gender), (50, Gender::Feminine));
    }
}
