//! # Codec de Respuestas
//! src/api/codec.rs
//!
//! Serializa los resultados de los handlers:
//!
//! - JSON para recursos estructurados (siempre, sin importar `Accept`)
//! - texto plano para stdout/stderr
//! - 426 + `Upgrade` para los endpoints que solo tienen sentido por streaming

use crate::error::ApiError;
use crate::http::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;

/// 200 con el valor serializado como JSON
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Response, ApiError> {
    let body = serde_json::to_string(value)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize response: {}", e)))?;
    Ok(Response::json(StatusCode::Ok, &body))
}

/// 200 con `{"message": ...}`
pub fn message(text: &str) -> Response {
    Response::json(StatusCode::Ok, &json!({ "message": text }).to_string())
}

/// 200 `text/plain`
pub fn text(body: &str) -> Response {
    Response::text(body)
}

/// 426 Upgrade Required: el recurso necesita un transporte persistente
pub fn upgrade_required() -> Response {
    let body = json!({ "error": "This endpoint requires a WebSocket connection" }).to_string();
    Response::json(StatusCode::UpgradeRequired, &body).with_header("Upgrade", "websocket")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_sets_content_type() {
        let response = json(&json!({"a": 1})).unwrap();
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.body(), br#"{"a":1}"#);
    }

    #[test]
    fn test_text_is_not_json() {
        let response = text("hi\n");
        assert!(response.header("Content-Type").unwrap().starts_with("text/plain"));
        assert_eq!(response.body(), b"hi\n");
    }

    #[test]
    fn test_upgrade_required() {
        let response = upgrade_required();
        assert_eq!(response.status(), StatusCode::UpgradeRequired);
        assert_eq!(response.header("Upgrade"), Some("websocket"));
    }

    #[test]
    fn test_message() {
        let response = message("Job deleted");
        assert_eq!(response.body(), br#"{"message":"Job deleted"}"#);
    }
}
