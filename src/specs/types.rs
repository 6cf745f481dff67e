//! # Tipos de Specs
//! src/specs/types.rs
//!
//! Una spec describe una clase de jobs: qué inputs espera, qué outputs
//! produce y la plantilla de ejecución (aplicación + argumentos con
//! placeholders `${inputs.<id>}`).

use crate::api::links;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Especificación inmutable de un tipo de job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expected_inputs: Vec<ExpectedInput>,
    #[serde(default)]
    pub expected_outputs: Vec<ExpectedOutput>,
    pub execution: ExecutionTemplate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedInput {
    pub id: String,
    #[serde(rename = "type")]
    pub input_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedOutput {
    pub id: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Plantilla opaca: el executor la interpreta, el catálogo solo la guarda
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionTemplate {
    pub application: String,
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// Entrada del listado de specs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub href: String,
}

impl JobSpec {
    pub fn summary(&self) -> SpecSummary {
        SpecSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            href: links::spec(&self.id),
        }
    }

    pub fn expected_input(&self, id: &str) -> Option<&ExpectedInput> {
        self.expected_inputs.iter().find(|input| input.id == id)
    }
}

/// Ids válidos: `[A-Za-z0-9_-]+`
pub fn is_valid_spec_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
