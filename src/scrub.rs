//
// scrub.rs
// Station-Tools-rs
//
// Rewrites a case description so it no longer carries the patient's name, age, gender,
// occupation, marital status or origin, while keeping the clinical narrative intact.
//
// Thales Matheus Mendonça Santos - November 2025

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::lexicon;
use crate::models::Demographics;
use crate::text;

/// One to four capitalized words, allowing "da/de/do/das/dos" between them.
const NAME: &str = r"\p{Lu}\p{Ll}+(?:\s+(?:d[aeo]s?\s+)?\p{Lu}\p{Ll}+){0,3}";
const HONORIFIC: &str = r"(?i:dona|sra\.?|sr\.?|senhora|senhor|dra\.?|dr\.?)";
const PLACE: &str = r"\p{Lu}\p{Ll}*(?:\s+(?:d[aeo]s?\s+)?\p{Lu}\p{Ll}*)*";

/// Words that start the clinical part of a leading "Name, N anos, ..." clause.
const CLINICAL_MARKERS: &[&str] = &[
    "apresenta",
    "apresentando",
    "refere",
    "referindo",
    "relata",
    "relatando",
    "queixa",
    "queixa-se",
    "com",
    "história",
    "antecedente",
    "antecedentes",
    "em uso",
    "diagnóstico",
    "dor",
    "febre",
    "náusea",
    "náuseas",
    "vômito",
    "vômitos",
    "cefaleia",
    "tontura",
    "fraqueza",
    "tosse",
    "dispneia",
    "é trazido",
    "é trazida",
    "é levado",
    "é levada",
    "é encaminhado",
    "é encaminhada",
    "chega",
    "comparece",
    "procura",
    "busca",
    "deu entrada",
    "vem",
];

/// Capitalized words that never belong to a person's name (folded to lowercase, no accents).
const NON_NAME_WORDS: &[&str] = &[
    // clinical
    "paciente", "gestante", "puerpera", "doenca", "sindrome", "chagas", "diabetes", "mellitus",
    "hipertensao", "arterial", "pressao", "sistemica", "insuficiencia", "cardiaca", "renal",
    "cronica", "aguda", "hipertenso", "hipertensa", "diabetico", "diabetica", "tabagista",
    "etilista", "obeso", "obesa", "idoso", "idosa", "adulto", "adulta", "crianca",
    "adolescente", "lactente", "masculino", "masculina", "feminino", "feminina", "tipo", "grau",
    "estagio", "escala", "glasgow", "teste", "rapido", "tomografia", "ressonancia", "raio",
    "eletrocardiograma", "hemograma", "glicemia", "covid", "dengue", "zika", "chikungunya",
    "alzheimer", "parkinson", "crohn", "cushing", "addison", "graves", "hashimoto", "down",
    "guillain", "barre", "exame", "sistemico", "eritematoso", "sinal", "manobra", "lupus",
    "criterios", "portador", "portadora", "gravida", "primigesta", "multipara",
    // people
    "mulher", "homem", "senhora", "senhor", "rapaz", "moca", "jovem", "menino", "menina",
    "bebe", "recem", "nascido", "ele", "ela", "mae", "pai", "filho", "filha", "esposa",
    "esposo", "marido", "irmao", "irma", "acompanhante", "familiares", "cuidador", "cuidadora",
    // institutional
    "hospital", "unidade", "basica", "saude", "pronto", "socorro", "atendimento", "servico",
    "sistema", "unico", "programa", "estrategia", "familia", "centro", "clinica", "clinicas",
    "policlinica", "ambulatorio", "posto", "enfermaria", "emergencia", "santa", "casa",
    "instituto", "universidade", "faculdade", "escola", "secretaria", "ministerio",
    "organizacao", "mundial", "sociedade", "brasileira", "nacional", "municipal", "estadual",
    "federal", "rede", "cegonha", "bolsa", "agente", "comunitario", "medicos",
    // calendar
    "janeiro", "fevereiro", "marco", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro", "segunda", "terca", "quarta", "quinta", "sexta",
    "sabado", "domingo", "feira",
    // sentence starters
    "refere", "relata", "apresenta", "nega", "hoje", "ontem", "durante", "apos", "ha", "ao",
    "no", "na", "em", "de", "foi", "esta", "estava", "veio", "chega", "procura", "traz",
];

/// Head nouns of eponyms and disease names ("Sinal de Giordano", "Lúpus Eritematoso Sistêmico").
/// A capitalized sequence opening with one of them is clinical vocabulary.
const CLINICAL_HEADS: &[&str] = &[
    "sinal", "sinais", "manobra", "lupus", "criterio", "criterios", "doenca", "sindrome",
    "escala", "escore", "teste", "prova", "reflexo", "triade", "classificacao", "regra",
    "ponto", "fenomeno", "sopro", "mal", "tetralogia", "linfoma", "sarcoma", "tumor", "metodo",
    "esclerose", "anemia", "hepatite", "virus", "febre", "bacilo", "ulcera", "cirrose",
    "angina", "arterite", "paralisia", "neuralgia", "tireoidite", "posicao", "tecnica",
    "formula", "lei", "curva", "indice", "protocolo",
];

const SPECIALTIES: &[&str] = &[
    "cardiologista", "pediatra", "clinico", "clinica", "ginecologista", "obstetra",
    "neurologista", "ortopedista", "psiquiatra", "infectologista", "endocrinologista",
    "urologista", "dermatologista", "oncologista", "cirurgiao", "cirurgia", "medico", "medica",
    "especialista", "plantonista", "geriatra", "pneumologista", "nefrologista",
    "gastroenterologista", "reumatologista", "hematologista", "oftalmologista",
    "otorrinolaringologista", "residente",
];

/// Occupations the scrubber recognizes beyond the ones the tool itself generates.
const EXTRA_OCCUPATIONS: &[&str] = &[
    "pedreiro", "doméstica", "empregada doméstica", "do lar", "dona de casa", "costureira",
    "costureiro", "lavrador", "lavradora", "pescador", "pescadora", "caminhoneiro", "pintor",
    "pintora", "eletricista", "mecânico", "porteiro", "porteira", "faxineira", "faxineiro",
    "cabeleireira", "cabeleireiro", "auxiliar de enfermagem", "técnico de enfermagem",
    "técnica de enfermagem", "militar", "policial", "garçom", "garçonete", "secretária",
    "secretário", "servente", "zelador", "zeladora", "catador", "catadora", "diarista",
    "autônomo", "autônoma", "desempregado", "desempregada", "motorista de aplicativo",
    "motorista de ônibus", "motorista de caminhão", "analista financeiro", "analista financeira",
];

const EXTRA_MARITAL_STATUSES: &[&str] = &["união estável", "amasiado", "amasiada"];

/// "médico" and "enfermeira" after these words describe care, not the patient's job.
const REFERENT_WORDS: &[&str] = &["medico", "medica", "enfermeiro", "enfermeira"];
const REFERENT_PRECEDERS: &[&str] = &[
    "o", "a", "um", "uma", "pelo", "pela", "ao", "a", "do", "da", "com", "seu", "sua", "outro",
    "outra", "atendimento", "consulta", "avaliacao", "acompanhamento", "historico", "historia",
    "atestado", "encaminhamento", "equipe", "orientacao", "parecer", "exame", "clinica",
    "assistencia", "prescricao", "alta", "licenca", "indicacao", "conduta", "supervisao",
];

const OPENERS: &[&str] = &["paciente", "com dor", "referindo", "apresenta", "queixa"];

const FILIATION_LABELS: &[&str] = &[
    "profissão",
    "ocupação",
    "estado civil",
    "procedência",
    "origem",
];

static LEADING_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*(?:{HONORIFIC}\s+|(?i:paciente)\s+)?(?P<name>{NAME})\s*,\s*(?:(?i:de|com)\s+)?\d{{1,3}}\s*(?i:anos?)(?:\s+(?i:de\s+idade))?\s*,?"
    ))
    .unwrap()
});
static PATIENT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?P<patient>(?i:paciente))\s+(?P<name>{NAME})\b(?P<comma>\s*,)?"
    ))
    .unwrap()
});
static LEADING_GIVEN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<name>\p{Lu}\p{Ll}+)\s+(?P<verb>refere|relata|apresenta|procura|chega|comparece|nega|informa|conta|busca|vem|queixa-se)\b",
    )
    .unwrap()
});
static COMPANION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i:com)\s+(?P<name>\p{Lu}\p{Ll}+)").unwrap());
static LEADING_NAMES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^\s*(?P<name>{NAME})\s*,\s*")).unwrap());
static PATIENT_AGE_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(paciente)\s+(?:de|com)\s+\d{1,3}\s*anos?(?:\s+de\s+idade)?(?:\s*,?\s*do\s+sexo\s+(?:masculino|feminino))?\b",
    )
    .unwrap()
});
static AGE_OF_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:com\s+)?idade\s+de\s+\d{1,3}(?:\s*anos?)?\b").unwrap()
});
static SEX_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:do\s+)?(?:sexo|g[êe]nero)\s*:?\s*(?:masculino|feminino)\b").unwrap()
});
static STANDALONE_AGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(?:de|com|aos)\s+)?\d{1,3}\s*anos?(?:\s+de\s+idade)?\b").unwrap()
});
static ORIGIN_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:,\s*)?\b(?i:natural|procedente|proveniente|oriundo|oriunda|moradora|morador|residente)\s+(?i:de|do|da|dos|das|em|no|na)\s+(?:(?i:zona|área|area)\s+(?i:rural|urbana)(?:\s+(?i:de|do|da)\s+{PLACE})?|{PLACE})"
    ))
    .unwrap()
});
static ORIGIN_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:proced[êe]ncia|origem)\s*:\s*[^,.;\n]+").unwrap());
static HONORIFIC_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?P<title>{HONORIFIC})\s+(?P<name>{NAME})")).unwrap()
});
static KINSHIP_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?P<kin>(?i:mãe|pai|filho|filha|esposa|esposo|marido|irmão|irmã))\s+(?P<name>\p{Lu}\p{Ll}+)\b",
    )
    .unwrap()
});
static NAME_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\p{Lu}\p{Ll}+(?:\s+(?:d[aeo]s?\s+)?\p{Lu}\p{Ll}+){1,3}\b").unwrap()
});
static ATTENDED_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\batendid[oa]\s+pel[oa]\s*$").unwrap());
static DOCTOR_BEFORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdra?\.?\s*$").unwrap());
static OCCUPATION_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    let forms = lexicon::OCCUPATIONS
        .iter()
        .flat_map(|entry| [entry.masculine, entry.feminine])
        .chain(EXTRA_OCCUPATIONS.iter().copied());
    Regex::new(&format!(
        r"(?i)(?:\b(?:é|trabalha\s+como|atua\s+como)\s+)?\b(?P<word>{})\b",
        alternation(forms)
    ))
    .unwrap()
});
static MARITAL_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    let forms = lexicon::MARITAL_STATUSES
        .iter()
        .flat_map(|entry| [entry.masculine, entry.feminine])
        .chain(EXTRA_MARITAL_STATUSES.iter().copied());
    Regex::new(&format!(r"(?i)\b(?P<word>{})\b", alternation(forms))).unwrap()
});
static FOLLOWED_BY_CLINICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s+(?:com\s+dor|com\s+febre|referindo|apresenta|queixa|diagn[óo]stico)\b")
        .unwrap()
});
static SON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(seu|meu|o)\s+filho\b").unwrap());
static DAUGHTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(sua|minha|a)\s+filha\b").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static EMPTY_PARENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\s*\)").unwrap());
static DOUBLE_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*,").unwrap());
static DOUBLE_PERIOD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\s*\.").unwrap());
static COMMA_PERIOD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*\.").unwrap());
static PERIOD_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\s*,").unwrap());
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,.;:!?])").unwrap());
static DANGLING_AND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+e\s*([,.;:])").unwrap());
static LEADING_NOUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:(?:o|a|um|uma)\s+)?(?:homem|mulher|senhora|senhor|rapaz|moça|jovem)(?:\s*,\s*|\s+)|(?:o|a|um|uma)\s+paciente(?:\s*,\s*|\s+)|(?:e\s+que|que|e)\s+)",
    )
    .unwrap()
});
static PATIENT_AND_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(paciente)\s+e\s+(refere|relata|apresenta|nega|procura|chega|informa|conta)\b")
        .unwrap()
});
static PATIENT_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((?i:paciente))\s*,\s*").unwrap());

fn alternation<'a>(forms: impl Iterator<Item = &'a str>) -> String {
    let mut forms: Vec<String> = forms.map(str::to_lowercase).collect();
    forms.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    forms.dedup();
    forms
        .iter()
        .map(|form| regex::escape(form))
        .collect::<Vec<_>>()
        .join("|")
}

fn next_word(after: &str) -> Option<String> {
    after
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .map(text::fold)
}

fn previous_word(before: &str) -> Option<String> {
    before
        .rsplit(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .map(text::fold)
}

/// Whether a capitalized sequence could be a person's name.
fn looks_like_name(candidate: &str) -> bool {
    let opens_clinically = candidate
        .split_whitespace()
        .next()
        .is_some_and(|first| CLINICAL_HEADS.contains(&text::fold(first).as_str()));
    if opens_clinically {
        return false;
    }
    candidate
        .split_whitespace()
        .filter(|word| word.chars().next().is_some_and(char::is_uppercase))
        .all(|word| !NON_NAME_WORDS.contains(&text::fold(word).as_str()))
}

fn whole(caps: &Captures<'_>) -> (usize, usize) {
    caps.get(0).map_or((0, 0), |m| (m.start(), m.end()))
}

fn named<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map_or("", |m| m.as_str())
}

/// Strips a leading "Name, N anos," clause up to the first clinical marker. Without any
/// marker the rest of the text is kept.
fn strip_leading_clause(description: &str) -> Option<String> {
    let caps = LEADING_CLAUSE.captures(description)?;
    let name = named(&caps, "name");
    if !looks_like_name(name) && text::fold(name) != "paciente" {
        return None;
    }
    let (_, end) = whole(&caps);
    let rest = &description[end..];
    // Everything between the clause and the earliest clinical word is demographic. "com"
    // followed by a name ("casada com Pedro") is still part of it.
    let cut = CLINICAL_MARKERS
        .iter()
        .filter_map(|marker| text::find_term(rest, marker))
        .map(|range| range.start)
        .filter(|&start| !introduces_companion(&rest[start..]))
        .min();
    Some(match cut {
        Some(start) => rest[start..].to_string(),
        None => rest.to_string(),
    })
}

fn introduces_companion(at: &str) -> bool {
    COMPANION_NAME
        .captures(at)
        .is_some_and(|caps| looks_like_name(named(&caps, "name")))
}

fn next_word_is_lowercase(after: &str) -> bool {
    after
        .trim_start()
        .chars()
        .next()
        .map_or(true, |c| !c.is_uppercase())
}

fn strip_patient_name(input: &str) -> String {
    let source = input;
    PATIENT_NAME
        .replace_all(source, |caps: &Captures<'_>| {
            let (_, end) = whole(caps);
            let name = named(&caps, "name");
            let has_comma = caps.name("comma").is_some();
            let multi_word = name.split_whitespace().count() > 1;
            // A lone given name only counts when the sentence carries on in lowercase.
            let lone_name = !multi_word && next_word_is_lowercase(&source[end..]);
            if looks_like_name(name) && (has_comma || multi_word || lone_name) {
                named(&caps, "patient").to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// "Joana refere ..." at the start of the text: the verb stays, the name goes.
fn strip_leading_given_name(input: &str) -> String {
    LEADING_GIVEN_NAME
        .replace(input, |caps: &Captures<'_>| {
            if looks_like_name(named(&caps, "name")) {
                named(&caps, "verb").to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn strip_leading_names(input: &str) -> String {
    LEADING_NAMES
        .replace(input, |caps: &Captures<'_>| {
            let name = named(&caps, "name");
            if name.split_whitespace().count() > 1 && looks_like_name(name) {
                String::new()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn age_is_clinical(source: &str, start: usize, end: usize) -> bool {
    text::age_in_clinical_context(&source[..start], &source[end..])
}

fn strip_ages(input: &str, age: Option<u32>) -> String {
    let stripped = PATIENT_AGE_PHRASE.replace_all(input, "${1}");
    let stripped = AGE_OF_PHRASE.replace_all(&stripped, "");
    let stripped = SEX_PHRASE.replace_all(&stripped, "").into_owned();

    let source = stripped.as_str();
    let stripped = STANDALONE_AGE
        .replace_all(source, |caps: &Captures<'_>| {
            let (start, end) = whole(caps);
            if age_is_clinical(source, start, end) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned();

    match age.map(|age| Regex::new(&format!(r"\b{age}a\b"))) {
        Some(Ok(compact)) => compact.replace_all(&stripped, "").into_owned(),
        _ => stripped,
    }
}

fn strip_origin(input: &str) -> String {
    let stripped = ORIGIN_PHRASE.replace_all(input, "");
    ORIGIN_LABEL.replace_all(&stripped, "").into_owned()
}

fn name_is_protected(before: &str) -> bool {
    ATTENDED_BY.is_match(before) || DOCTOR_BEFORE.is_match(before)
}

fn strip_names(input: &str) -> String {
    let source = input;
    let stripped = HONORIFIC_NAME
        .replace_all(source, |caps: &Captures<'_>| {
            let (start, end) = whole(caps);
            let title = text::fold(named(&caps, "title"));
            let is_doctor = title.starts_with("dr");
            let follows_specialty = next_word(&source[end..])
                .is_some_and(|word| SPECIALTIES.contains(&word.as_str()));
            if (is_doctor && follows_specialty)
                || ATTENDED_BY.is_match(&source[..start])
                || !looks_like_name(named(&caps, "name"))
            {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned();

    let stripped = KINSHIP_NAME
        .replace_all(&stripped, |caps: &Captures<'_>| {
            if looks_like_name(named(&caps, "name")) {
                named(&caps, "kin").to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned();

    // Bare runs of capitalized words last; eponyms and "atendido pelo ..." are kept.
    let source = stripped.as_str();
    NAME_SEQUENCE
        .replace_all(source, |caps: &Captures<'_>| {
            let (start, _) = whole(caps);
            if name_is_protected(&source[..start]) || !looks_like_name(&caps[0]) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// Keep rules shared by occupation and marital-status words.
fn demographic_word_is_kept(source: &str, start: usize, end: usize) -> bool {
    let before = &source[..start];
    let after = &source[end..];

    // Right after a comma in a sentence giving an age, the word belongs to a clinical history
    // ("há 10 anos, aposentado por invalidez"); leading demographic clauses are gone by now.
    let trimmed = before.trim_end();
    if trimmed.ends_with(',') {
        let clause = trimmed.rsplit('.').next().unwrap_or(trimmed);
        if text::contains_any_term(clause, &["anos", "ano", "idade"]) {
            return true;
        }
    }
    if text::fold(before).ends_with("ex-") {
        return true;
    }
    FOLLOWED_BY_CLINICAL.is_match(after)
}

fn strip_occupations(input: &str) -> String {
    let source = input;
    OCCUPATION_WORDS
        .replace_all(source, |caps: &Captures<'_>| {
            let (start, end) = whole(caps);
            let word = text::fold(named(&caps, "word"));
            let is_referent = REFERENT_WORDS.contains(&word.as_str())
                && previous_word(&source[..start])
                    .is_some_and(|prev| REFERENT_PRECEDERS.contains(&prev.as_str()));
            if is_referent || demographic_word_is_kept(source, start, end) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

fn strip_marital_status(input: &str) -> String {
    let source = input;
    MARITAL_WORDS
        .replace_all(source, |caps: &Captures<'_>| {
            let (start, end) = whole(caps);
            if demographic_word_is_kept(source, start, end) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

fn neutralize_kinship(input: &str) -> String {
    let rewritten = SON.replace_all(input, "${1} acompanhante");
    DAUGHTER
        .replace_all(&rewritten, "${1} acompanhante")
        .into_owned()
}

fn replace_until_stable(input: String, re: &Regex, with: &str) -> String {
    let mut current = input;
    loop {
        let next = re.replace_all(&current, with).into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn trim_punctuation(input: &str) -> &str {
    input
        .trim_start_matches(|c: char| c.is_whitespace() || ",.;:-".contains(c))
        .trim_end_matches(|c: char| c.is_whitespace() || ",;:".contains(c))
}

/// Whitespace, punctuation and opening repairs; guarantees a non-empty "Paciente ..." text.
fn normalize(input: &str) -> String {
    let mut out = WHITESPACE.replace_all(input, " ").into_owned();
    out = EMPTY_PARENS.replace_all(&out, "").into_owned();
    loop {
        let before = out.clone();
        out = replace_until_stable(out, &DOUBLE_COMMA, ",");
        out = replace_until_stable(out, &DOUBLE_PERIOD, ".");
        out = COMMA_PERIOD.replace_all(&out, ".").into_owned();
        out = PERIOD_COMMA.replace_all(&out, ".").into_owned();
        out = SPACE_BEFORE_PUNCT.replace_all(&out, "${1}").into_owned();
        out = DANGLING_AND.replace_all(&out, "${1}").into_owned();
        out = PATIENT_AND_VERB.replace_all(&out, "${1} ${2}").into_owned();
        if out == before {
            break;
        }
    }

    let mut out = trim_punctuation(&out).to_string();
    loop {
        let next = LEADING_NOUN.replace(&out, "").into_owned();
        let next = trim_punctuation(&next).to_string();
        if next == out {
            break;
        }
        out = next;
    }
    let out = PATIENT_COMMA.replace(&out, "${1} ").into_owned();
    let out = out.trim();

    if out.is_empty() {
        return "Paciente".to_string();
    }
    let opens_clinically = OPENERS
        .iter()
        .any(|opener| text::find_term(out, opener).is_some_and(|range| range.start == 0));
    if opens_clinically {
        text::capitalize_first(out)
    } else {
        format!("Paciente {}", text::lowercase_first(out))
    }
}

/// Removes filiation data from a description. Re-running on the output changes nothing.
pub fn scrub(description: &str, demographics: &Demographics) -> String {
    let text = strip_leading_clause(description).unwrap_or_else(|| description.to_string());
    let text = strip_patient_name(&text);
    let text = strip_leading_given_name(&text);
    let text = strip_leading_names(&text);
    let text = strip_ages(&text, demographics.age);
    let text = strip_origin(&text);
    let text = strip_names(&text);
    let text = strip_occupations(&text);
    let text = strip_marital_status(&text);
    let text = neutralize_kinship(&text);
    let scrubbed = normalize(&text);

    if scrubbed != description {
        tracing::debug!(
            antes = %text::excerpt(description, 80),
            depois = %text::excerpt(&scrubbed, 80),
            "Descrição reescrita"
        );
    }
    scrubbed
}

/// Names the first kind of filiation data still present in a description, if any.
pub fn has_filiation_data(description: &str) -> Option<&'static str> {
    if strip_leading_clause(description).is_some() {
        return Some("nome e idade");
    }
    if strip_patient_name(description) != description
        || strip_leading_given_name(description) != description
    {
        return Some("nome");
    }
    let honorific_name = HONORIFIC_NAME.captures_iter(description).any(|caps| {
        let (start, end) = whole(&caps);
        let title = text::fold(named(&caps, "title"));
        let follows_specialty = next_word(&description[end..])
            .is_some_and(|word| SPECIALTIES.contains(&word.as_str()));
        !(title.starts_with("dr") && follows_specialty)
            && !ATTENDED_BY.is_match(&description[..start])
            && looks_like_name(named(&caps, "name"))
    });
    let bare_name = NAME_SEQUENCE.find_iter(description).any(|m| {
        !name_is_protected(&description[..m.start()]) && looks_like_name(m.as_str())
    });
    if honorific_name || bare_name {
        return Some("nome");
    }
    if STANDALONE_AGE
        .find_iter(description)
        .any(|m| !age_is_clinical(description, m.start(), m.end()))
        || AGE_OF_PHRASE.is_match(description)
    {
        return Some("idade");
    }
    if SEX_PHRASE.is_match(description) {
        return Some("sexo");
    }
    FILIATION_LABELS
        .iter()
        .find(|label| text::contains_term(description, label))
        .copied()
}
