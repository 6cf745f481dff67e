//! # Store de Jobs
//! src/jobs/store.rs
//!
//! Tabla autoritativa en memoria de jobs y sus outputs. Un único `Mutex`
//! cubre create/get/delete/abort/list, así que:
//!
//! - submissions concurrentes nunca corrompen el mapa id -> job
//! - un delete concurrente con un get nunca deja ver un job a medio borrar
//! - un abort que llega después de que el job terminó devuelve Conflict
//!
//! El executor corre fuera del lock: el job pasa a RUNNING, se libera el
//! lock, se ejecuta, y se vuelve a tomar para finalizar. La finalización
//! nunca pisa un job que se volvió terminal en el medio.

use crate::error::ApiError;
use crate::jobs::executor::{Execution, JobExecutor};
use crate::jobs::types::{Job, JobInputs, JobOutputs, JobStatus, TransitionError};
use crate::specs::SpecCatalog;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Largo máximo del nombre de un job (en caracteres)
const MAX_NAME_CHARS: usize = 255;

/// Un job y sus outputs se guardan y se borran juntos
#[derive(Debug)]
struct Entry {
    job: Job,
    outputs: JobOutputs,
}

#[derive(Debug, Default)]
struct StoreInner {
    jobs: HashMap<String, Entry>,
    /// Ids en orden de creación
    order: Vec<String>,
}

/// Página del listado de jobs
#[derive(Debug, Clone)]
pub struct JobPage {
    pub entries: Vec<Job>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

pub struct JobStore {
    inner: Mutex<StoreInner>,
    catalog: Arc<SpecCatalog>,
    executor: JobExecutor,
}

impl JobStore {
    pub fn new(catalog: Arc<SpecCatalog>, executor: JobExecutor) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            catalog,
            executor,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_entry<R>(&self, id: &str, f: impl FnOnce(&mut Entry) -> R) -> Option<R> {
        self.lock().jobs.get_mut(id).map(f)
    }

    /// Crea un job y lo ejecuta antes de retornar
    ///
    /// # Errores
    ///
    /// `ApiError::Validation` si `spec_id` no existe en el catálogo; en ese
    /// caso no se crea nada.
    pub fn create(
        &self,
        spec_id: &str,
        name: Option<&str>,
        inputs: JobInputs,
    ) -> Result<Job, ApiError> {
        let spec = self
            .catalog
            .lookup(spec_id)
            .map_err(|_| ApiError::Validation(format!("Invalid spec: {}", spec_id)))?;

        let job = {
            let mut inner = self.lock();
            let id = loop {
                let candidate = Uuid::new_v4().to_string();
                if !inner.jobs.contains_key(&candidate) {
                    break candidate;
                }
            };
            let name = normalize_name(name, &id);
            let job = Job::new(id.clone(), name, spec, inputs, Utc::now());

            inner.order.push(id.clone());
            inner.jobs.insert(
                id,
                Entry {
                    job: job.clone(),
                    outputs: JobOutputs::default(),
                },
            );
            job
        };
        info!(job = %job.id(), spec = %job.spec().id, "job submitted");

        let started = self.with_entry(job.id(), |entry| {
            entry
                .job
                .mark_running(Utc::now())
                .map(|()| entry.job.clone())
        });
        let job = match started {
            Some(Ok(running)) => running,
            // Abortado o borrado antes de arrancar
            Some(Err(TransitionError { .. })) => return Ok(self.get(job.id()).unwrap_or(job)),
            None => return Ok(job),
        };
        debug!(job = %job.id(), "job running");

        let Execution { outputs, status } = self.executor.run(job.inputs(), job.spec());

        let finished = self.with_entry(job.id(), |entry| {
            let now = Utc::now();
            let transition = match status {
                JobStatus::Aborted => entry.job.mark_aborted(now),
                _ => entry.job.mark_finished(now),
            };
            match transition {
                Ok(()) => entry.outputs = outputs,
                Err(err) => debug!(job = %entry.job.id(), %err, "execution result discarded"),
            }
            entry.job.clone()
        });

        match finished {
            Some(job) => {
                info!(job = %job.id(), status = %job.status(), "job completed");
                Ok(job)
            }
            None => {
                // Borrado durante la ejecución: se devuelve la última vista conocida
                debug!(job = %job.id(), "job deleted while running");
                let mut job = job;
                let _ = job.mark_finished(Utc::now());
                Ok(job)
            }
        }
    }

    pub fn get(&self, id: &str) -> Result<Job, ApiError> {
        self.with_entry(id, |entry| entry.job.clone())
            .ok_or_else(|| job_not_found(id))
    }

    /// stdout/stderr capturados del job
    pub fn outputs(&self, id: &str) -> Result<JobOutputs, ApiError> {
        self.with_entry(id, |entry| entry.outputs.clone())
            .ok_or_else(|| job_not_found(id))
    }

    /// Borra el job y sus outputs en una sola sección crítica
    pub fn delete(&self, id: &str) -> Result<(), ApiError> {
        let mut inner = self.lock();
        if inner.jobs.remove(id).is_none() {
            return Err(job_not_found(id));
        }
        inner.order.retain(|existing| existing != id);
        drop(inner);

        info!(job = %id, "job deleted");
        Ok(())
    }

    /// Fuerza ABORTED; Conflict si el job ya era terminal
    pub fn abort(&self, id: &str) -> Result<Job, ApiError> {
        let job = self
            .with_entry(id, |entry| {
                entry
                    .job
                    .mark_aborted(Utc::now())
                    .map(|()| entry.job.clone())
            })
            .ok_or_else(|| job_not_found(id))?
            .map_err(|err| ApiError::Conflict(err.to_string()))?;

        info!(job = %id, "job aborted");
        Ok(job)
    }

    /// Rebanada `[page*page_size, page*page_size + page_size)` en orden de creación
    ///
    /// Páginas fuera de rango devuelven `entries` vacío.
    pub fn list(&self, page: usize, page_size: usize) -> JobPage {
        let inner = self.lock();
        let total = inner.order.len();

        let start = page.checked_mul(page_size).unwrap_or(usize::MAX).min(total);
        let end = start.saturating_add(page_size).min(total);

        let entries = inner.order[start..end]
            .iter()
            .filter_map(|id| inner.jobs.get(id))
            .map(|entry| entry.job.clone())
            .collect();

        JobPage {
            entries,
            page,
            page_size,
            total,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn job_not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Job not found: {}", id))
}

/// Recorta y neutraliza `<`/`>`; vacío o ausente -> `Job <8 chars del id>`
fn normalize_name(name: Option<&str>, id: &str) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => escape_markup(name),
        None => format!("Job {}", id.chars().take(8).collect::<String>()),
    }
}

/// Escapa y corta en `MAX_NAME_CHARS` ya escapados, sin partir una entidad
fn escape_markup(name: &str) -> String {
    let mut out = String::with_capacity(name.len().min(MAX_NAME_CHARS));
    let mut chars = 0;

    for c in name.chars() {
        let escaped = match c {
            '<' => Some("&lt;"),
            '>' => Some("&gt;"),
            _ => None,
        };
        let width = escaped.map_or(1, str::len);
        if chars + width > MAX_NAME_CHARS {
            break;
        }
        match escaped {
            Some(entity) => out.push_str(entity),
            None => out.push(c),
        }
        chars += width;
    }

    out
}
