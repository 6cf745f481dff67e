//! # Tipos y Estructuras para el Sistema de Jobs
//! src/jobs/types.rs
//!
//! Un `Job` es una instancia concreta de una spec con inputs propios.
//! Su ciclo de vida:
//!
//! ```text
//! SUBMITTED ──► RUNNING ──► FINISHED
//!     │            │
//!     └────────────┴──────► ABORTED
//! ```
//!
//! FINISHED y ABORTED son terminales: `finished` queda fijado y ninguna
//! transición posterior está permitida.

use crate::api::links;
use crate::specs::JobSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Mapa input id -> valor, tal cual lo envió el cliente
pub type JobInputs = Map<String, Value>;

/// Estado de un job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Creado, aún no entregado al executor
    Submitted,

    /// El executor lo está procesando
    Running,

    /// Terminó (con o sin diagnóstico en stderr)
    Finished,

    /// Abortado explícitamente
    Aborted,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Aborted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Submitted => "SUBMITTED",
            JobStatus::Running => "RUNNING",
            JobStatus::Finished => "FINISHED",
            JobStatus::Aborted => "ABORTED",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transición inválida sobre un job terminal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Job {id} is already {status}")]
pub struct TransitionError {
    pub id: String,
    pub status: JobStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobTimestamps {
    pub submitted: DateTime<Utc>,
    pub started: DateTime<Utc>,
    /// `Some` si y solo si el status es terminal
    pub finished: Option<DateTime<Utc>>,
}

/// stdout/stderr capturados; inmutables una vez que el job es terminal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOutputs {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone)]
pub struct Job {
    id: String,
    name: String,
    spec: Arc<JobSpec>,
    inputs: JobInputs,
    status: JobStatus,
    timestamps: JobTimestamps,
}

impl Job {
    /// Crea un job en SUBMITTED con `submitted` y `started` en `now`
    pub fn new(
        id: String,
        name: String,
        spec: Arc<JobSpec>,
        inputs: JobInputs,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            spec,
            inputs,
            status: JobStatus::Submitted,
            timestamps: JobTimestamps {
                submitted: now,
                started: now,
                finished: None,
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &Arc<JobSpec> {
        &self.spec
    }

    pub fn inputs(&self) -> &JobInputs {
        &self.inputs
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn timestamps(&self) -> &JobTimestamps {
        &self.timestamps
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// SUBMITTED -> RUNNING
    pub fn mark_running(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.ensure_not_terminal()?;
        self.status = JobStatus::Running;
        self.timestamps.started = now;
        Ok(())
    }

    /// Cualquier estado no terminal -> FINISHED
    pub fn mark_finished(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.finish(JobStatus::Finished, now)
    }

    /// Cualquier estado no terminal -> ABORTED
    pub fn mark_aborted(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.finish(JobStatus::Aborted, now)
    }

    fn finish(&mut self, status: JobStatus, now: DateTime<Utc>) -> Result<(), TransitionError> {
        debug_assert!(status.is_terminal());
        self.ensure_not_terminal()?;
        self.status = status;
        self.timestamps.finished = Some(now);
        Ok(())
    }

    fn ensure_not_terminal(&self) -> Result<(), TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError {
                id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }

    /// Vista JSON del job (detalle y entradas del listado)
    pub fn details(&self) -> JobDetails<'_> {
        let mut job_links = Map::new();
        let mut add = |rel: &str, href: String| {
            job_links.insert(rel.to_string(), serde_json::json!({ "href": href }));
        };
        add("self", links::job(&self.id));
        add("spec", links::job_resource(&self.id, "spec"));
        add("inputs", links::job_resource(&self.id, "inputs"));
        add("stdout", links::job_resource(&self.id, "stdout"));
        add("stderr", links::job_resource(&self.id, "stderr"));
        if !self.is_terminal() {
            add("abort", links::job_resource(&self.id, "abort"));
        }

        JobDetails {
            id: &self.id,
            name: &self.name,
            spec: &self.spec.id,
            inputs: &self.inputs,
            status: self.status,
            timestamps: &self.timestamps,
            links: job_links,
        }
    }
}

/// `{id, name, spec, inputs, status, timestamps, _links}`
#[derive(Debug, Serialize)]
pub struct JobDetails<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub spec: &'a str,
    pub inputs: &'a JobInputs,
    pub status: JobStatus,
    pub timestamps: &'a JobTimestamps,
    #[serde(rename = "_links")]
    pub links: Map<String, Value>,
}
