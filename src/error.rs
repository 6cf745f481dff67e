//! # Errores de la API
//! src/error.rs
//!
//! Taxonomía de errores que los handlers devuelven. Todos se recuperan en el
//! borde del router y se renderizan como `{"error": "..."}`.

use crate::http::{Method, ParseError, Response, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Spec, job o ruta inexistente
    #[error("{0}")]
    NotFound(String),

    /// Body malformado o spec inexistente en la submission
    #[error("{0}")]
    Validation(String),

    /// Abort sobre un job terminal
    #[error("{0}")]
    Conflict(String),

    #[error("Method {method} not allowed")]
    MethodNotAllowed { method: String, allowed: Vec<Method> },

    #[error("Request too large")]
    PayloadTooLarge,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NotFound,
            ApiError::Validation(_) => StatusCode::BadRequest,
            ApiError::Conflict(_) => StatusCode::Conflict,
            ApiError::MethodNotAllowed { .. } => StatusCode::MethodNotAllowed,
            ApiError::PayloadTooLarge => StatusCode::PayloadTooLarge,
            ApiError::Internal(_) => StatusCode::InternalServerError,
        }
    }

    /// Renderiza el error como sobre JSON (más `Allow` para 405)
    pub fn into_response(self) -> Response {
        let mut response = Response::error(self.status(), &self.to_string());
        if let ApiError::MethodNotAllowed { allowed, .. } = &self {
            if allowed.is_empty() {
                return response;
            }
            let allow = allowed
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            response.add_header("Allow", &allow);
        }
        response
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnsupportedMethod(method) => ApiError::MethodNotAllowed {
                method,
                allowed: Vec::new(),
            },
            other => ApiError::Validation(format!("Invalid request: {}", other)),
        }
    }
}
