//! # Handlers de Descubrimiento y Specs
//! src/api/handlers.rs
//!
//! - `/` y `/api/v1`: sobres `_links`
//! - `/api/v1/specs`, `/api/v1/specs/{id}`
//! - `/api/v1/users/current`: identidad fija de invitado
//! - endpoints de streaming: 426

use crate::api::{codec, links, AppState};
use crate::error::ApiError;
use crate::http::{Request, Response};
use crate::router::PathParams;
use serde::Serialize;
use serde_json::json;

pub const GUEST_ID: &str = "guest";
pub const GUEST_NAME: &str = "Guest User";

/// Handler para `GET /`
pub fn root(_req: &Request, _params: &PathParams, _state: &AppState) -> Result<Response, ApiError> {
    codec::json(&links::envelope(&[
        ("specs", links::specs()),
        ("jobs", links::jobs()),
    ]))
}

/// Handler para `GET /api/v1`
pub fn api_root(
    _req: &Request,
    _params: &PathParams,
    _state: &AppState,
) -> Result<Response, ApiError> {
    codec::json(&links::envelope(&[
        ("specs", links::specs()),
        ("jobs", links::jobs()),
        ("current-user", links::current_user()),
    ]))
}

/// Handler para `GET /api/v1/specs`
///
/// ```json
/// {"entries": [{"id": "echo", "name": "Echo", "description": "...", "href": "/api/v1/specs/echo"}]}
/// ```
pub fn list_specs(
    _req: &Request,
    _params: &PathParams,
    state: &AppState,
) -> Result<Response, ApiError> {
    #[derive(Serialize)]
    struct SpecList<T> {
        entries: T,
    }

    codec::json(&SpecList {
        entries: state.catalog.list(),
    })
}

/// Handler para `GET /api/v1/specs/{id}`
pub fn get_spec(_req: &Request, params: &PathParams, state: &AppState) -> Result<Response, ApiError> {
    let spec = state.catalog.lookup(params.require("id")?)?;
    codec::json(spec.as_ref())
}

/// Handler para `GET /api/v1/users/current`
pub fn current_user(
    _req: &Request,
    _params: &PathParams,
    _state: &AppState,
) -> Result<Response, ApiError> {
    codec::json(&json!({ "id": GUEST_ID, "name": GUEST_NAME }))
}

/// Eventos de jobs y updates de stdout/stderr: solo por WebSocket
pub fn upgrade_required(
    _req: &Request,
    _params: &PathParams,
    _state: &AppState,
) -> Result<Response, ApiError> {
    Ok(codec::upgrade_required())
}
