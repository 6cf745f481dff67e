//! # Jobson Server
//! src/lib.rs
//!
//! Servidor HTTP/1.x concurrente que expone recursos de jobs: un catálogo
//! de specs, jobs creados contra esas specs, y sus salidas (stdout/stderr).
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing y manejo del protocolo HTTP/1.x
//! - `server`: Lógica del servidor TCP y manejo de conexiones
//! - `router`: Route table tipado (método + plantilla de path)
//! - `api`: Estado compartido, codec de respuestas y endpoints de descubrimiento
//! - `specs`: Catálogo de specs (incluidas o cargadas de un directorio)
//! - `jobs`: Store, executor y endpoints de jobs
//! - `config`: Flags CLI / variables de entorno
//! - `error`: Errores de la API y su mapeo a status HTTP
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use jobson_server::config::Config;
//! use jobson_server::server::Server;
//!
//! let server = Server::bind(Config::default()).expect("bind");
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod jobs;
pub mod router;
pub mod server;
pub mod specs;
