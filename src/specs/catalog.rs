//! # Catálogo de Specs
//! src/specs/catalog.rs
//!
//! Registro de solo lectura de las specs disponibles. Se construye una vez
//! al arrancar (built-ins o un directorio de `*.json`) y nunca se modifica.

use crate::error::ApiError;
use crate::specs::types::{is_valid_spec_id, ExecutionTemplate, ExpectedInput, JobSpec, SpecSummary};
use serde_json::json;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Cannot read specs from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed spec file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate spec id: {0}")]
    DuplicateId(String),

    #[error("Invalid spec id: {0:?}")]
    InvalidId(String),

    #[error("No specs found in {0}")]
    Empty(PathBuf),
}

/// Catálogo ordenado (orden de carga) de specs compartidas
#[derive(Debug, Clone)]
pub struct SpecCatalog {
    specs: Vec<Arc<JobSpec>>,
}

impl SpecCatalog {
    /// Valida ids (formato y unicidad) y fija el orden
    pub fn from_specs(specs: Vec<JobSpec>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if !is_valid_spec_id(&spec.id) {
                return Err(CatalogError::InvalidId(spec.id.clone()));
            }
            if !seen.insert(spec.id.clone()) {
                return Err(CatalogError::DuplicateId(spec.id.clone()));
            }
        }

        Ok(Self {
            specs: specs.into_iter().map(Arc::new).collect(),
        })
    }

    /// Specs incluidas en el binario: `echo` y `sleep`
    pub fn builtin() -> Self {
        let specs = vec![
            JobSpec {
                id: "echo".to_string(),
                name: "Echo".to_string(),
                description: "Simple echo command that prints input to stdout".to_string(),
                expected_inputs: vec![ExpectedInput {
                    id: "message".to_string(),
                    input_type: "string".to_string(),
                    name: "Message".to_string(),
                    description: "The message to echo".to_string(),
                    default: Some(json!("Hello, World!")),
                }],
                expected_outputs: Vec::new(),
                execution: ExecutionTemplate {
                    application: "echo".to_string(),
                    arguments: vec!["${inputs.message}".to_string()],
                },
            },
            JobSpec {
                id: "sleep".to_string(),
                name: "Sleep".to_string(),
                description: "Sleep for specified seconds".to_string(),
                expected_inputs: vec![ExpectedInput {
                    id: "seconds".to_string(),
                    input_type: "integer".to_string(),
                    name: "Seconds".to_string(),
                    description: "Number of seconds to sleep".to_string(),
                    default: Some(json!(1)),
                }],
                expected_outputs: Vec::new(),
                execution: ExecutionTemplate {
                    application: "sleep".to_string(),
                    arguments: vec!["${inputs.seconds}".to_string()],
                },
            },
        ];

        Self {
            specs: specs.into_iter().map(Arc::new).collect(),
        }
    }

    /// Carga cada `*.json` del directorio (ordenados por nombre) como una spec
    pub fn load_dir(dir: &Path) -> Result<Self, CatalogError> {
        let io_err = |source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(CatalogError::Empty(dir.to_path_buf()));
        }

        let mut specs = Vec::with_capacity(files.len());
        for path in files {
            let raw = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            let spec: JobSpec = serde_json::from_str(&raw)
                .map_err(|source| CatalogError::Parse { path: path.clone(), source })?;
            debug!(spec = %spec.id, file = %path.display(), "spec loaded");
            specs.push(spec);
        }

        let catalog = Self::from_specs(specs)?;
        info!(count = catalog.len(), dir = %dir.display(), "spec catalog loaded");
        Ok(catalog)
    }

    /// Busca una spec por id
    pub fn lookup(&self, id: &str) -> Result<Arc<JobSpec>, ApiError> {
        self.specs
            .iter()
            .find(|spec| spec.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Spec not found: {}", id)))
    }

    /// Resúmenes en el orden de carga, cada uno con su `href`
    pub fn list(&self) -> Vec<SpecSummary> {
        self.specs.iter().map(|spec| spec.summary()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
