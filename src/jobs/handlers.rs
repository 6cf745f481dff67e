//! # Handlers HTTP para Jobs
//! src/jobs/handlers.rs
//!
//! Implementa los endpoints del sistema de jobs:
//! - `GET/POST /api/v1/jobs`
//! - `GET/DELETE /api/v1/jobs/{id}`
//! - `GET /api/v1/jobs/{id}/{inputs,spec,stdout,stderr}`
//! - `POST /api/v1/jobs/{id}/abort`

use crate::api::{codec, AppState};
use crate::error::ApiError;
use crate::http::{Request, Response};
use crate::jobs::types::{JobDetails, JobInputs};
use crate::router::PathParams;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body de `POST /api/v1/jobs`
#[derive(Debug, Deserialize)]
struct SubmissionRequest {
    spec: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Option<JobInputs>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JobList<'a> {
    entries: Vec<JobDetails<'a>>,
    page: usize,
    page_size: usize,
    total: usize,
}

/// Handler para `GET /api/v1/jobs?page=N&page-size=M`
///
/// # Query parameters
/// - `page`: página desde 0 (opcional, default: 0)
/// - `page-size`: tamaño de página (opcional, default: configurado)
///
/// # Ejemplo de response
/// ```json
/// {"entries": [...], "page": 0, "pageSize": 100, "total": 3}
/// ```
pub fn list_jobs(req: &Request, _params: &PathParams, state: &AppState) -> Result<Response, ApiError> {
    let page = query_usize(req, "page")?.unwrap_or(0);
    let page_size = query_usize(req, "page-size")?.unwrap_or(state.default_page_size);

    let listing = state.store.list(page, page_size);
    codec::json(&JobList {
        entries: listing.entries.iter().map(|job| job.details()).collect(),
        page: listing.page,
        page_size: listing.page_size,
        total: listing.total,
    })
}

/// Handler para `POST /api/v1/jobs`
///
/// Crea el job y lo ejecuta antes de responder.
///
/// # Body
/// ```json
/// {"spec": "echo", "name": "opcional", "inputs": {"message": "hi"}}
/// ```
pub fn create_job(req: &Request, _params: &PathParams, state: &AppState) -> Result<Response, ApiError> {
    let submission = parse_submission(req.body())?;

    let spec = submission
        .spec
        .ok_or_else(|| ApiError::Validation("Missing required field: spec".to_string()))?;

    let job = state.store.create(
        &spec,
        submission.name.as_deref(),
        submission.inputs.unwrap_or_default(),
    )?;
    codec::json(&job.details())
}

/// Handler para `GET /api/v1/jobs/{id}`
pub fn get_job(_req: &Request, params: &PathParams, state: &AppState) -> Result<Response, ApiError> {
    let job = state.store.get(params.require("id")?)?;
    codec::json(&job.details())
}

/// Handler para `DELETE /api/v1/jobs/{id}`
pub fn delete_job(_req: &Request, params: &PathParams, state: &AppState) -> Result<Response, ApiError> {
    state.store.delete(params.require("id")?)?;
    Ok(codec::message("Job deleted"))
}

/// Handler para `GET /api/v1/jobs/{id}/inputs`: el mapping tal como se envió
pub fn get_inputs(_req: &Request, params: &PathParams, state: &AppState) -> Result<Response, ApiError> {
    let job = state.store.get(params.require("id")?)?;
    codec::json(job.inputs())
}

/// Handler para `GET /api/v1/jobs/{id}/spec`
pub fn get_job_spec(_req: &Request, params: &PathParams, state: &AppState) -> Result<Response, ApiError> {
    let job = state.store.get(params.require("id")?)?;
    codec::json(job.spec().as_ref())
}

pub fn get_stdout(_req: &Request, params: &PathParams, state: &AppState) -> Result<Response, ApiError> {
    let outputs = state.store.outputs(params.require("id")?)?;
    Ok(codec::text(&outputs.stdout))
}

pub fn get_stderr(_req: &Request, params: &PathParams, state: &AppState) -> Result<Response, ApiError> {
    let outputs = state.store.outputs(params.require("id")?)?;
    Ok(codec::text(&outputs.stderr))
}

/// Handler para `POST /api/v1/jobs/{id}/abort`
///
/// 404 si no existe, 409 si ya estaba terminado.
pub fn abort_job(_req: &Request, params: &PathParams, state: &AppState) -> Result<Response, ApiError> {
    state.store.abort(params.require("id")?)?;
    Ok(codec::message("Job aborted"))
}

/// El body tiene que ser un objeto JSON; un array no cuenta aunque serde
/// lo aceptaría para un struct
fn parse_submission(body: &[u8]) -> Result<SubmissionRequest, ApiError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::Validation(format!("Malformed JSON body: {}", e)))?;

    if !value.is_object() {
        return Err(ApiError::Validation(
            "Request body must be a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::Validation(format!("Invalid job request: {}", e)))
}

/// Query param numérico opcional; presente pero no numérico -> 400
fn query_usize(req: &Request, name: &str) -> Result<Option<usize>, ApiError> {
    req.query_param(name)
        .map(|raw| {
            raw.trim().parse::<usize>().map_err(|_| {
                ApiError::Validation(format!(
                    "Invalid {}: expected a non-negative integer, got '{}'",
                    name, raw
                ))
            })
        })
        .transpose()
}
