//
// models.rs
// Station-Tools-rs
//
// Defines the demographic types, name categories, synthesized identities and verbal-information entries.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::text;

/// Context key of the structured identification entry inside `informacoesVerbaisSimulado`.
pub const IDENTIFICATION_KEY: &str = "IDENTIFICAÇÃO DO PACIENTE";

/// Grammatical gender of the patient, which also drives word agreement in Portuguese.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "masculino")]
    Masculine,
    #[serde(rename = "feminino")]
    Feminine,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Masculine => "masculino",
            Gender::Feminine => "feminino",
        }
    }

    /// Capitalized form used in the identification block ("Gênero: Feminino").
    pub fn label(self) -> &'static str {
        match self {
            Gender::Masculine => "Masculino",
            Gender::Feminine => "Feminino",
        }
    }

    /// Recognizes the words the corpus uses for a gender value.
    pub fn parse(value: &str) -> Option<Self> {
        match text::fold(value.trim()).as_str() {
            "masculino" | "masculina" | "homem" | "m" => Some(Gender::Masculine),
            "feminino" | "feminina" | "mulher" | "f" => Some(Gender::Feminine),
            _ => None,
        }
    }

    /// Picks the word form agreeing with this gender.
    pub fn pick<'a>(self, masculine: &'a str, feminine: &'a str) -> &'a str {
        match self {
            Gender::Masculine => masculine,
            Gender::Feminine => feminine,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Gender::Masculine => Gender::Feminine,
            Gender::Feminine => Gender::Masculine,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBand {
    /// Under 15.
    Child,
    /// 15 to 40.
    YoungAdult,
    /// Over 40.
    SeniorAdult,
}

impl AgeBand {
    pub fn for_age(age: u32) -> Self {
        if age < 15 {
            AgeBand::Child
        } else if age <= 40 {
            AgeBand::YoungAdult
        } else {
            AgeBand::SeniorAdult
        }
    }

    fn label(self) -> &'static str {
        match self {
            AgeBand::Child => "recém-nascidos, crianças e pré-adolescentes",
            AgeBand::YoungAdult => "Jovens e Adolescentes",
            AgeBand::SeniorAdult => "Meia-Idade e Idosos",
        }
    }
}

/// Key of a pool in the name database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameCategory {
    pub band: AgeBand,
    pub gender: Gender,
}

impl NameCategory {
    pub fn for_patient(age: u32, gender: Gender) -> Self {
        Self {
            band: AgeBand::for_age(age),
            gender,
        }
    }

    /// Default pool used when a category is missing from the database.
    pub fn fallback(gender: Gender) -> Self {
        Self {
            band: AgeBand::SeniorAdult,
            gender,
        }
    }

    /// Titles under which this category may appear in the database, preferred first.
    pub fn titles(&self) -> Vec<String> {
        let prefix = self.gender.pick("Masculinos", "Femininos");
        let mut titles = vec![format!("Nomes {} Mais Comuns ({})", prefix, self.band.label())];
        if self.band == AgeBand::SeniorAdult && self.gender == Gender::Feminine {
            titles.push("Nomes Femininos Mais Comuns (Meia-Idade e Idosas)".to_string());
        }
        titles
    }

    /// Whether a database title belongs to this category's gender.
    pub fn title_matches_gender(title: &str, gender: Gender) -> bool {
        title.contains(gender.pick("Masculinos", "Femininos"))
    }
}

/// Demographics recovered from prose; either side may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Demographics {
    pub age: Option<u32>,
    pub gender: Option<Gender>,
}

impl Demographics {
    pub fn is_complete(&self) -> bool {
        self.age.is_some() && self.gender.is_some()
    }
}

/// Replacement identity written to the identification block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizedIdentity {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub occupation: String,
    pub marital_status: String,
    pub origin: Option<String>,
}

/// One entry of `materiaisDisponiveis.informacoesVerbaisSimulado`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbalInfo {
    #[serde(rename = "contextoOuPerguntaChave")]
    pub context_key: String,
    #[serde(rename = "informacao")]
    pub information: String,
}

/// Fields of the identification block, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentificationField {
    Name,
    Age,
    Gender,
    Occupation,
    MaritalStatus,
    Origin,
}

impl IdentificationField {
    pub fn label(self) -> &'static str {
        match self {
            IdentificationField::Name => "Nome",
            IdentificationField::Age => "Idade",
            IdentificationField::Gender => "Gênero",
            IdentificationField::Occupation => "Ocupação",
            IdentificationField::MaritalStatus => "Estado Civil",
            IdentificationField::Origin => "Procedência",
        }
    }

    /// Value standing in for a missing field; never rendered.
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            IdentificationField::Name => Some("Nome Desconhecido"),
            IdentificationField::Age => Some("idade não informada"),
            IdentificationField::Gender => Some("gênero não informado"),
            IdentificationField::Occupation => Some("ocupação não informada"),
            IdentificationField::MaritalStatus => Some("estado civil não informado"),
            IdentificationField::Origin => None,
        }
    }

    /// Maps a legacy "Key: value" key onto a field.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = text::fold(key.trim());
        if key.contains("nome") {
            Some(IdentificationField::Name)
        } else if key.contains("idade") {
            Some(IdentificationField::Age)
        } else if key.contains("genero") || key.contains("sexo") {
            Some(IdentificationField::Gender)
        } else if key.contains("ocupacao") || key.contains("profissao") {
            Some(IdentificationField::Occupation)
        } else if key.contains("estado civil") || key.contains("estado_civil") {
            Some(IdentificationField::MaritalStatus)
        } else if key.contains("procedencia") || key.contains("origem") {
            Some(IdentificationField::Origin)
        } else {
            None
        }
    }
}
