//! # Módulo HTTP
//!
//! Implementa el protocolo HTTP/1.x desde cero, sin librerías de alto nivel:
//!
//! - Parsing de requests (request line, headers, body por `Content-Length`)
//! - Construcción de responses
//! - Códigos de estado
//! - Decodificación de query parameters y capturas de path
//!
//! Una conexión atiende un único request (`Connection: close`), como en HTTP/1.0.

pub mod request;
pub mod response;
pub mod status;

pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
