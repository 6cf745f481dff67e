//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes (un thread por conexión)
//! 3. Lee y parsea un request HTTP por conexión
//! 4. Lo despacha al route table de la API y escribe la response

pub mod tcp;

// Re-exportar para facilitar el uso
pub use tcp::{Server, ServerError};
