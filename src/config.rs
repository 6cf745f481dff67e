//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de jobs con soporte para argumentos CLI y
//! variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./jobson_server --port 8080 \
//!   --specs-dir ./specs \
//!   --default-page-size 50 \
//!   --max-sleep-secs 5
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! JOBSON_PORT=8080 JOBSON_HOST=0.0.0.0 RUST_LOG=debug ./jobson_server
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be > 0")]
    Zero(&'static str),

    #[error("specs directory is not readable: {0}")]
    SpecsDir(PathBuf),
}

/// Configuración del servidor de jobs
#[derive(Debug, Clone, Parser)]
#[command(name = "jobson_server")]
#[command(about = "Servidor HTTP de jobs: specs, submissions y sus salidas")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = efímero)
    #[arg(short, long, default_value = "8080", env = "JOBSON_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "JOBSON_HOST")]
    pub host: String,

    /// Directorio con specs `*.json`; sin él se usan las specs incluidas
    #[arg(long = "specs-dir", env = "JOBSON_SPECS_DIR")]
    pub specs_dir: Option<PathBuf>,

    /// Tamaño de página de `GET /api/v1/jobs` cuando no se indica `page-size`
    #[arg(long = "default-page-size", default_value = "100", env = "JOBSON_PAGE_SIZE")]
    pub default_page_size: usize,

    /// Tope en segundos para la aplicación simulada `sleep`
    #[arg(long = "max-sleep-secs", default_value = "10", env = "JOBSON_MAX_SLEEP_SECS")]
    pub max_sleep_secs: u64,

    /// Timeout de lectura/escritura del socket en milisegundos
    #[arg(long = "read-timeout-ms", default_value = "30000", env = "JOBSON_READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Tamaño máximo del body de un request
    #[arg(long = "max-body-bytes", default_value = "1048576", env = "JOBSON_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// Nivel de log cuando `RUST_LOG` no está definido
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use jobson_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn max_sleep(&self) -> Duration {
        Duration::from_secs(self.max_sleep_secs)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::Zero("read timeout"));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Zero("max body bytes"));
        }
        if self.default_page_size == 0 {
            return Err(ConfigError::Zero("default page size"));
        }
        if let Some(dir) = &self.specs_dir {
            if std::fs::read_dir(dir).is_err() {
                return Err(ConfigError::SpecsDir(dir.clone()));
            }
        }
        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            specs = %self
                .specs_dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "built-in".to_string()),
            page_size = self.default_page_size,
            max_sleep_secs = self.max_sleep_secs,
            read_timeout_ms = self.read_timeout_ms,
            max_body_bytes = self.max_body_bytes,
            "configuration loaded"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            specs_dir: None,
            default_page_size: 100,
            max_sleep_secs: 10,
            read_timeout_ms: 30_000,
            max_body_bytes: 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}
