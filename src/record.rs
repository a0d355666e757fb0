//
// record.rs
// Station-Tools-rs
//
// Wraps one station JSON document and runs the anonymization pipeline against it:
// skip checks, extraction, synthesis, name draw, identification entry and description rewrite.
//
// Thales Matheus Mendonça Santos - November 2025

use rand::Rng;
use serde_json::{Map, Value};

use crate::error::ProcessError;
use crate::extract;
use crate::identification::{self, IdentificationBlock};
use crate::models::{
    Demographics, IdentificationField, SynthesizedIdentity, IDENTIFICATION_KEY,
};
use crate::names::NameRegistry;
use crate::scrub;
use crate::synthesize;
use crate::text;

const TITLE: &str = "tituloEstacao";
const INSTRUCTIONS: &str = "instrucoesParticipante";
const DESCRIPTION: &str = "descricaoCasoCompleta";
const MATERIALS: &str = "materiaisDisponiveis";
const VERBAL_INFO: &str = "informacoesVerbaisSimulado";
const CONTEXT_KEY: &str = "contextoOuPerguntaChave";
const INFORMATION: &str = "informacao";

/// A station document. Fields the tool does not touch keep their values and key order.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    document: Value,
}

/// What a record needs before any rewriting happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Duplicate(usize),
    Incomplete,
    AlreadyClean,
    NeedsIdentification,
    HasIdentification,
}

impl CaseRecord {
    pub fn parse(raw: &str) -> Result<Self, ProcessError> {
        let document: Value = serde_json::from_str(raw)?;
        if !document.is_object() {
            return Err(ProcessError::IncompleteStructure);
        }
        Ok(Self { document })
    }

    pub fn from_value(document: Value) -> Self {
        Self { document }
    }

    pub fn as_value(&self) -> &Value {
        &self.document
    }

    pub fn title(&self) -> &str {
        self.document
            .get(TITLE)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn description(&self) -> Option<&str> {
        self.document
            .get(INSTRUCTIONS)
            .and_then(|instructions| instructions.get(DESCRIPTION))
            .and_then(Value::as_str)
    }

    pub fn set_description(&mut self, description: String) -> Result<(), ProcessError> {
        let slot = self
            .document
            .get_mut(INSTRUCTIONS)
            .and_then(|instructions| instructions.get_mut(DESCRIPTION))
            .ok_or(ProcessError::IncompleteStructure)?;
        *slot = Value::String(description);
        Ok(())
    }

    fn verbal_entries(&self) -> &[Value] {
        self.document
            .get(MATERIALS)
            .and_then(|materials| materials.get(VERBAL_INFO))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn is_identification(entry: &Value) -> bool {
        entry.get(CONTEXT_KEY).and_then(Value::as_str) == Some(IDENTIFICATION_KEY)
    }

    pub fn identification_count(&self) -> usize {
        self.verbal_entries()
            .iter()
            .filter(|entry| Self::is_identification(entry))
            .count()
    }

    pub fn identification_text(&self) -> Option<&str> {
        self.verbal_entries()
            .iter()
            .find(|entry| Self::is_identification(entry))
            .and_then(|entry| entry.get(INFORMATION))
            .and_then(Value::as_str)
    }

    pub fn set_identification_text(&mut self, information: String) {
        let entry = self
            .document
            .get_mut(MATERIALS)
            .and_then(|materials| materials.get_mut(VERBAL_INFO))
            .and_then(Value::as_array_mut)
            .and_then(|entries| entries.iter_mut().find(|e| Self::is_identification(e)))
            .and_then(Value::as_object_mut);
        if let Some(entry) = entry {
            entry.insert(INFORMATION.to_string(), Value::String(information));
        }
    }

    /// Puts the identification entry first in the verbal-information list, creating the
    /// containers when the document has none.
    pub fn insert_identification(
        &mut self,
        block: &IdentificationBlock,
    ) -> Result<(), ProcessError> {
        let entry = serde_json::to_value(block.to_verbal_info())?;
        let root = self
            .document
            .as_object_mut()
            .ok_or(ProcessError::IncompleteStructure)?;
        let materials = root
            .entry(MATERIALS)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or(ProcessError::IncompleteStructure)?;
        let entries = materials
            .entry(VERBAL_INFO)
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or(ProcessError::IncompleteStructure)?;
        entries.insert(0, entry);
        Ok(())
    }

    pub fn classify(&self) -> RecordStatus {
        let count = self.identification_count();
        if count > 1 {
            return RecordStatus::Duplicate(count);
        }
        let Some(description) = self.description() else {
            return RecordStatus::Incomplete;
        };
        if count == 1 {
            RecordStatus::HasIdentification
        } else if scrub::has_filiation_data(description).is_none() {
            RecordStatus::AlreadyClean
        } else {
            RecordStatus::NeedsIdentification
        }
    }

    /// Two-space indented JSON with non-ASCII characters written literally.
    pub fn to_pretty_json(&self) -> Result<String, ProcessError> {
        let mut json = serde_json::to_string_pretty(&self.document)?;
        json.push('\n');
        Ok(json)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnonymizerOptions {
    /// Fill missing age/gender from title priors; without it such records fail.
    pub infer_missing: bool,
}

impl Default for AnonymizerOptions {
    fn default() -> Self {
        Self {
            infer_missing: true,
        }
    }
}

/// Result of a successful rewrite.
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub demographics: Demographics,
    pub identity: Option<SynthesizedIdentity>,
    pub gender_disclosed: bool,
    pub identification: String,
    pub description: String,
    pub created: bool,
}

impl Rewrite {
    pub fn summary(&self) -> String {
        match &self.identity {
            Some(identity) => format!(
                "Arquivo processado com sucesso. Nome: {}, Idade: {}, Gênero: {}{}",
                identity.name,
                identity.age,
                identity.gender,
                if self.gender_disclosed {
                    " (gênero exibido)"
                } else {
                    ""
                }
            ),
            None => format!(
                "Arquivo atualizado com sucesso. Correções de gênero aplicadas ({} gênero)",
                if self.gender_disclosed { "com" } else { "sem" }
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ProcessOutcome {
    Rewritten(Rewrite),
    AlreadyCorrect(&'static str),
}

/// Runs the pipeline over records, owning the name registry and the random source of a batch.
pub struct Anonymizer<R: Rng> {
    registry: NameRegistry,
    rng: R,
    options: AnonymizerOptions,
}

impl<R: Rng> Anonymizer<R> {
    pub fn new(registry: NameRegistry, rng: R, options: AnonymizerOptions) -> Self {
        Self {
            registry,
            rng,
            options,
        }
    }

    pub fn registry(&self) -> &NameRegistry {
        &self.registry
    }

    pub fn process(&mut self, record: &mut CaseRecord) -> Result<ProcessOutcome, ProcessError> {
        match record.classify() {
            RecordStatus::Duplicate(count) => Err(ProcessError::DuplicateIdentification(count)),
            RecordStatus::Incomplete => Err(ProcessError::IncompleteStructure),
            RecordStatus::AlreadyClean => Ok(ProcessOutcome::AlreadyCorrect(
                "descrição sem dados de filiação",
            )),
            RecordStatus::HasIdentification => self.update_existing(record),
            RecordStatus::NeedsIdentification => self.create(record),
        }
    }

    fn update_existing(&mut self, record: &mut CaseRecord) -> Result<ProcessOutcome, ProcessError> {
        let description = record
            .description()
            .ok_or(ProcessError::IncompleteStructure)?
            .to_string();
        let raw = record.identification_text().unwrap_or_default().to_string();

        let normalized = identification::normalize_existing(&raw);
        let identification = if normalized.is_empty() { raw.clone() } else { normalized };
        let gender_disclosed = IdentificationBlock::parse(&identification)
            .get(IdentificationField::Gender)
            .is_some();

        let demographics = extract::extract(&description, &mut self.rng);
        let scrubbed = scrub::scrub(&description, &demographics);

        if identification == raw && scrubbed == description {
            return Ok(ProcessOutcome::AlreadyCorrect(
                "identificação e descrição já normalizadas",
            ));
        }
        if identification != raw {
            record.set_identification_text(identification.clone());
        }
        if scrubbed != description {
            record.set_description(scrubbed.clone())?;
        }

        Ok(ProcessOutcome::Rewritten(Rewrite {
            demographics,
            identity: None,
            gender_disclosed,
            identification,
            description: scrubbed,
            created: false,
        }))
    }

    fn create(&mut self, record: &mut CaseRecord) -> Result<ProcessOutcome, ProcessError> {
        let description = record
            .description()
            .ok_or(ProcessError::IncompleteStructure)?
            .to_string();
        let title = record.title().to_string();

        let demographics = extract::extract(&description, &mut self.rng);
        let (age, gender) = match (demographics.age, demographics.gender) {
            (Some(age), Some(gender)) => (age, gender),
            _ if self.options.infer_missing => {
                synthesize::complete_demographics(demographics, &title, &mut self.rng)
            }
            _ => {
                return Err(ProcessError::ExtractionFailed(text::excerpt(
                    &description,
                    100,
                )))
            }
        };

        let category = NameRegistry::category_for(age, gender);
        let identity = SynthesizedIdentity {
            name: self.registry.draw(&category, &mut self.rng),
            age,
            gender,
            occupation: synthesize::infer_occupation(age, &title, gender, &mut self.rng),
            marital_status: synthesize::infer_marital_status(age, gender, &mut self.rng),
            origin: synthesize::infer_origin(&title),
        };
        let gender_disclosed = synthesize::is_gender_disclosure_relevant(&title);
        let block = IdentificationBlock::build(&identity, gender_disclosed);
        record.insert_identification(&block)?;

        let scrubbed = scrub::scrub(&description, &demographics);
        record.set_description(scrubbed.clone())?;

        Ok(ProcessOutcome::Rewritten(Rewrite {
            demographics,
            identity: Some(identity),
            gender_disclosed,
            identification: block.render_lines(),
            description: scrubbed,
            created: true,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use crate::names::NameDatabase;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn anonymizer(options: AnonymizerOptions) -> Anonymizer<StdRng> {
        let database = NameDatabase::from_json_str(
            r#"{"categorias": [
                {"titulo": "Nomes Femininos Mais Comuns (Jovens e Adolescentes)", "nomes": ["Ana Souza"]},
                {"titulo": "Nomes Femininos Mais Comuns (Meia-Idade e Idosas)", "nomes": ["Dalva Rocha"]},
                {"titulo": "Nomes Masculinos Mais Comuns (Jovens e Adolescentes)", "nomes": ["Bruno Costa"]},
                {"titulo": "Nomes Masculinos Mais Comuns (Meia-Idade e Idosos)", "nomes": ["Ernesto Prado"]}
            ]}"#,
        )
        .expect("database");
        Anonymizer::new(
            NameRegistry::new(database),
            StdRng::seed_from_u64(2025),
            options,
        )
    }

    fn record(title: &str, description: &str, entries: Value) -> CaseRecord {
        CaseRecord::from_value(json!({
            "id": "abc-123",
            "tituloEstacao": title,
            "instrucoesParticipante": {
                "descricaoCasoCompleta": description,
                "tarefas": ["Realizar anamnese"]
            },
            "materiaisDisponiveis": {
                "informacoesVerbaisSimulado": entries
            }
        }))
    }

    fn identification(text: &str) -> Value {
        json!({"contextoOuPerguntaChave": IDENTIFICATION_KEY, "informacao": text})
    }

    #[test]
    fn creates_identification_and_scrubs_description() {
        let mut anonymizer = anonymizer(AnonymizerOptions::default());
        let mut record = record(
            "Cistite não complicada",
            "Maria Silva, 34 anos, chega com disúria e dor suprapúbica",
            json!([{"contextoOuPerguntaChave": "Queixa", "informacao": "Ardência"}]),
        );

        let ProcessOutcome::Rewritten(rewrite) = anonymizer.process(&mut record).expect("process")
        else {
            panic!("expected rewrite");
        };
        let identity = rewrite.identity.expect("identity");
        assert_eq!(identity.age, 34);
        assert_eq!(identity.gender, Gender::Feminine);
        assert_eq!(identity.name, "Ana Souza");
        assert!(!rewrite.gender_disclosed);

        let entries = record.as_value()["materiaisDisponiveis"]["informacoesVerbaisSimulado"]
            .as_array()
            .expect("entries");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0][CONTEXT_KEY], IDENTIFICATION_KEY);
        let text = entries[0][INFORMATION].as_str().expect("text");
        assert!(text.starts_with(
            "Nome: Ana Souza\nIdade: 34 anos\nOcupação: Profissional de escritório\nEstado Civil: "
        ));
        assert!(!text.contains("Gênero"));

        assert_eq!(
            record.description(),
            Some("Paciente chega com disúria e dor suprapúbica")
        );
        let json = record.to_pretty_json().expect("json");
        assert!(json.starts_with("{\n  \"id\": \"abc-123\",\n  \"tituloEstacao\""));
        assert!(json.contains("disúria"));
    }

    #[test]
    fn relevant_title_discloses_gender() {
        let mut anonymizer = anonymizer(AnonymizerOptions::default());
        let mut record = record(
            "Infecção pelo HIV",
            "Carlos Pereira procura a UBS para resultado de teste rápido.",
            json!([]),
        );
        let outcome = anonymizer.process(&mut record).expect("process");
        assert!(matches!(outcome, ProcessOutcome::Rewritten(ref r) if r.gender_disclosed));
        assert!(record.identification_text().expect("text").contains("\nGênero: "));
        assert_eq!(
            record.description(),
            Some("Paciente procura a UBS para resultado de teste rápido.")
        );
    }

    #[test]
    fn existing_block_is_normalized_without_drawing_a_name() {
        let mut anonymizer = anonymizer(AnonymizerOptions::default());
        let mut record = record(
            "Insuficiência cardíaca",
            "Paciente refere dispneia aos esforços.",
            json!([identification("João Santos, 70 anos, masculino, aposentado e viúva")]),
        );

        let outcome = anonymizer.process(&mut record).expect("process");
        let ProcessOutcome::Rewritten(rewrite) = outcome else {
            panic!("expected rewrite");
        };
        assert!(!rewrite.created);
        assert_eq!(
            record.identification_text(),
            Some("João Santos, 70 anos, masculino, Aposentado e Viúvo")
        );
        assert!(rewrite.summary().starts_with("Arquivo atualizado com sucesso"));
        assert_eq!(
            anonymizer
                .registry()
                .used_count("Nomes Masculinos Mais Comuns (Meia-Idade e Idosos)"),
            0
        );

        let again = anonymizer.process(&mut record).expect("second pass");
        assert!(matches!(again, ProcessOutcome::AlreadyCorrect(_)));
    }

    #[test]
    fn duplicate_blocks_are_rejected_untouched() {
        let mut anonymizer = anonymizer(AnonymizerOptions::default());
        let mut record = record(
            "Asma",
            "Maria Silva, 34 anos, tosse",
            json!([identification("A"), identification("B")]),
        );
        let before = record.clone();
        assert!(matches!(
            anonymizer.process(&mut record),
            Err(ProcessError::DuplicateIdentification(2))
        ));
        assert_eq!(record, before);
    }

    #[test]
    fn skip_and_failure_statuses() {
        let mut anonymizer = anonymizer(AnonymizerOptions::default());
        let mut clean = record("Cefaleia", "Paciente refere cefaleia há 2 dias.", json!([]));
        assert_eq!(clean.classify(), RecordStatus::AlreadyClean);
        assert!(matches!(
            anonymizer.process(&mut clean),
            Ok(ProcessOutcome::AlreadyCorrect(_))
        ));

        let mut incomplete = CaseRecord::from_value(json!({"tituloEstacao": "Sem descrição"}));
        assert!(matches!(
            anonymizer.process(&mut incomplete),
            Err(ProcessError::IncompleteStructure)
        ));

        assert!(matches!(
            CaseRecord::parse("{ quebrado"),
            Err(ProcessError::MalformedJson(_))
        ));
    }

    #[test]
    fn eponyms_do_not_make_a_record_dirty() {
        let mut anonymizer = anonymizer(AnonymizerOptions::default());
        let mut record = record(
            "Pielonefrite",
            "Ao exame, Sinal de Giordano positivo à direita.",
            json!([]),
        );
        assert_eq!(record.classify(), RecordStatus::AlreadyClean);
        let before = record.clone();
        assert!(matches!(
            anonymizer.process(&mut record),
            Ok(ProcessOutcome::AlreadyCorrect(_))
        ));
        assert_eq!(record, before);
    }

    #[test]
    fn lone_given_name_is_not_skipped_as_clean() {
        let record = record(
            "Enxaqueca",
            "Paciente Joana refere cefaleia há 2 dias.",
            json!([]),
        );
        assert_eq!(record.classify(), RecordStatus::NeedsIdentification);
    }

    #[test]
    fn strict_mode_reports_unresolved_demographics() {
        let mut anonymizer = anonymizer(AnonymizerOptions {
            infer_missing: false,
        });
        let mut record = record(
            "Infecção pelo HIV",
            "Carlos Pereira procura a UBS para resultado de teste rápido.",
            json!([]),
        );
        let before = record.clone();
        match anonymizer.process(&mut record) {
            Err(ProcessError::ExtractionFailed(excerpt)) => {
                assert!(excerpt.starts_with("Carlos Pereira procura"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(record, before);
    }
}
