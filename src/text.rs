//
// text.rs
// Station-Tools-rs
//
// Small text utilities shared by the extractor, scrubber and identification normalizer:
// word-bounded term search, accent folding, capitalization and clinical age context.
//
// Thales Matheus Mendonça Santos - November 2025

use std::ops::Range;

/// Words that, right before an "N anos" mention, turn it into a duration instead of an age.
const DURATION_MARKERS: &[&str] = &[
    "há", "ha", "faz", "por", "durante", "desde", "últimos", "ultimos", "próximos", "após",
    "apos",
];

/// Words that, right after an "N anos" mention, mark it as part of clinical history.
const CLINICAL_FOLLOWERS: &[&str] = &[
    "atrás",
    "atras",
    "antes",
    "dor",
    "febre",
    "diarreia",
    "diarréia",
    "constipação",
    "tontura",
    "fraqueza",
    "dispneia",
    "taquicardia",
    "hipotensão",
    "hipertensão",
    "diabetes",
    "câncer",
    "avc",
    "infarto",
    "evolução",
    "história",
    "duração",
    "diagnóstico",
    "tabagismo",
    "etilismo",
    "uso",
    "tratamento",
    "sintomas",
    "acompanhamento",
];

fn lower_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

fn at_word_start(haystack: &str, idx: usize) -> bool {
    haystack[..idx]
        .chars()
        .next_back()
        .map_or(true, |c| !is_word_char(c))
}

fn at_word_end(haystack: &str, idx: usize) -> bool {
    haystack[idx..]
        .chars()
        .next()
        .map_or(true, |c| !is_word_char(c))
}

/// Finds the first case-insensitive, word-bounded occurrence of `term` in `haystack`.
pub fn find_term(haystack: &str, term: &str) -> Option<Range<usize>> {
    let needle: Vec<char> = term.chars().map(lower_char).collect();
    if needle.is_empty() {
        return None;
    }

    for (start, _) in haystack.char_indices() {
        if !at_word_start(haystack, start) {
            continue;
        }
        let mut end = start;
        let mut chars = haystack[start..].char_indices();
        let matched = needle.iter().all(|&expected| match chars.next() {
            Some((offset, c)) if lower_char(c) == expected => {
                end = start + offset + c.len_utf8();
                true
            }
            _ => false,
        });
        if matched && at_word_end(haystack, end) {
            return Some(start..end);
        }
    }
    None
}

pub fn contains_term(haystack: &str, term: &str) -> bool {
    find_term(haystack, term).is_some()
}

pub fn contains_any_term(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| contains_term(haystack, term))
}

/// Lowercases and strips Portuguese diacritics so "Viuva" and "viúva" compare equal.
pub fn fold(input: &str) -> String {
    input
        .chars()
        .map(|c| match lower_char(c) {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

pub fn capitalize_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercases the first letter unless the first word looks like an acronym ("HIV", "AVC").
pub fn lowercase_first(input: &str) -> String {
    let first_word: String = input.chars().take_while(|c| is_word_char(*c)).collect();
    let is_acronym =
        first_word.chars().count() > 1 && first_word.chars().all(|c| !c.is_lowercase());
    if is_acronym {
        return input.to_string();
    }
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// First `max_chars` characters of `input`, with an ellipsis when truncated.
pub fn excerpt(input: &str, max_chars: usize) -> String {
    let mut out: String = input.chars().take(max_chars).collect();
    if input.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

fn last_words(input: &str, count: usize) -> Vec<String> {
    let words: Vec<String> = input
        .split(|c: char| !is_word_char(c))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();
    let skip = words.len().saturating_sub(count);
    words.into_iter().skip(skip).collect()
}

fn first_words(input: &str, count: usize) -> Vec<String> {
    input
        .split(|c: char| !is_word_char(c))
        .filter(|w| !w.is_empty())
        .take(count)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Whether an "N anos" mention sits in a duration or clinical-history context, given the
/// text before and after it. Such mentions are history ("dor há 2 anos"), not the patient's age.
pub fn age_in_clinical_context(before: &str, after: &str) -> bool {
    let preceding = last_words(before, 3);
    if preceding
        .iter()
        .any(|w| DURATION_MARKERS.contains(&w.as_str()))
    {
        return true;
    }

    // Skip a connecting "de" ("3 anos de dor") before looking at the next word.
    let following = first_words(after, 2);
    let next = match following.first().map(String::as_str) {
        Some("de") => following.get(1).map(String::as_str),
        other => other,
    };
    next.map_or(false, |w| CLINICAL_FOLLOWERS.contains(&w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_search_respects_word_boundaries() {
        assert!(contains_term("Infecção urinária (ITU) de repetição", "itu"));
        assert!(!contains_term("Constituição familiar", "itu"));
        assert!(!contains_term("Transtorno de ansiedade", "trans"));
        assert!(contains_term("Saúde da mulher trans", "trans"));
        assert!(contains_term("Orientação Sexual e saúde", "orientação sexual"));
    }

    #[test]
    fn find_term_returns_byte_range_over_accents() {
        let text = "Paciente viúva há anos";
        let range = find_term(text, "VIÚVA").expect("term");
        assert_eq!(&text[range], "viúva");
    }

    #[test]
    fn fold_strips_diacritics() {
        assert_eq!(fold("Funcionária Pública"), "funcionaria publica");
        assert_eq!(fold("VIÚVO"), "viuvo");
    }

    #[test]
    fn lowercase_first_keeps_acronyms() {
        assert_eq!(lowercase_first("Chega com dor"), "chega com dor");
        assert_eq!(lowercase_first("HIV positivo"), "HIV positivo");
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        assert_eq!(excerpt("ação", 2), "aç...");
        assert_eq!(excerpt("curto", 10), "curto");
    }

    #[test]
    fn durations_are_clinical_context() {
        assert!(age_in_clinical_context("Refere dor lombar há", " e piora"));
        assert!(age_in_clinical_context("Diabético", " de evolução"));
        assert!(age_in_clinical_context("Tabagista com", " de tabagismo"));
        assert!(!age_in_clinical_context("Maria Silva,", ", chega com dor"));
    }
}
