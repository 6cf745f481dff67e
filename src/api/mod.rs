//! # API v1
//!
//! Estado compartido, route table y handlers de los recursos que no son
//! jobs (descubrimiento, specs, usuario actual, endpoints de streaming).

pub mod codec;
pub mod handlers;
pub mod links;

use crate::http::Method;
use crate::jobs::handlers as jobs;
use crate::jobs::{JobExecutor, JobStore};
use crate::router::Router;
use crate::specs::SpecCatalog;
use std::sync::Arc;

/// Estado inyectado en cada handler; vive lo que vive el proceso
pub struct AppState {
    pub catalog: Arc<SpecCatalog>,
    pub store: JobStore,
    pub default_page_size: usize,
}

impl AppState {
    pub fn new(catalog: SpecCatalog, executor: JobExecutor, default_page_size: usize) -> Self {
        let catalog = Arc::new(catalog);
        Self {
            store: JobStore::new(Arc::clone(&catalog), executor),
            catalog,
            default_page_size,
        }
    }
}

/// Route table completo
///
/// Las rutas exactas van antes que las parametrizadas que las cubrirían
/// (`/jobs/events` antes que `/jobs/{id}`).
pub fn router() -> Result<Router<AppState>, regex::Error> {
    let mut router = Router::new();

    router
        .register(Method::GET, "/", handlers::root)?
        .register(Method::GET, "/api/v1", handlers::api_root)?
        .register(Method::GET, "/api/v1/users/current", handlers::current_user)?
        .register(Method::GET, "/api/v1/specs", handlers::list_specs)?
        .register(Method::GET, "/api/v1/specs/{id}", handlers::get_spec)?
        .register(Method::GET, "/api/v1/jobs", jobs::list_jobs)?
        .register(Method::POST, "/api/v1/jobs", jobs::create_job)?
        .register(Method::GET, "/api/v1/jobs/events", handlers::upgrade_required)?
        .register(Method::GET, "/api/v1/jobs/{id}", jobs::get_job)?
        .register(Method::DELETE, "/api/v1/jobs/{id}", jobs::delete_job)?
        .register(Method::GET, "/api/v1/jobs/{id}/inputs", jobs::get_inputs)?
        .register(Method::GET, "/api/v1/jobs/{id}/spec", jobs::get_job_spec)?
        .register(Method::GET, "/api/v1/jobs/{id}/stdout", jobs::get_stdout)?
        .register(Method::GET, "/api/v1/jobs/{id}/stderr", jobs::get_stderr)?
        .register(Method::POST, "/api/v1/jobs/{id}/abort", jobs::abort_job)?
        .register(Method::GET, "/api/v1/jobs/{id}/stdout/updates", handlers::upgrade_required)?
        .register(Method::GET, "/api/v1/jobs/{id}/stderr/updates", handlers::upgrade_required)?;

    Ok(router)
}
