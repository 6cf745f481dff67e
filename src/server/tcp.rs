//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Implementación del servidor TCP que maneja múltiples conexiones simultáneas
//! usando threads. Cada conexión se procesa en su propio thread y atiende un
//! único request.

use crate::api::{self, AppState};
use crate::config::{Config, ConfigError};
use crate::error::ApiError;
use crate::http::request::{content_length, find_header_end, HEADER_TERMINATOR};
use crate::http::{ParseError, Request, Response};
use crate::jobs::JobExecutor;
use crate::router::{add_common_headers, Router};
use crate::specs::{CatalogError, SpecCatalog};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, field, info, info_span, warn};
use uuid::Uuid;

/// Tope del bloque request line + headers
pub const MAX_HEADER_BYTES: usize = 16 * 1024;

const READ_CHUNK: usize = 4096;

/// Espera máxima para descartar un body rechazado antes de cerrar
const DRAIN_TIMEOUT: Duration = Duration::from_millis(200);

/// Fallos de arranque del servidor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load specs: {0}")]
    Catalog(#[from] CatalogError),

    #[error("invalid route table: {0}")]
    Route(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Motivos por los que no se obtiene un request completo del socket
#[derive(Debug, Error)]
enum ReadError {
    #[error("request too large")]
    TooLarge,

    #[error(transparent)]
    Malformed(#[from] ParseError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy)]
struct Limits {
    timeout: Duration,
    max_body: usize,
}

/// Servidor HTTP/1.x concurrente
pub struct Server {
    listener: TcpListener,
    router: Arc<Router<AppState>>,
    state: Arc<AppState>,
    limits: Limits,
}

impl Server {
    /// Valida la configuración, carga el catálogo y hace bind del listener
    pub fn bind(config: Config) -> Result<Self, ServerError> {
        config.validate()?;

        let catalog = match &config.specs_dir {
            Some(dir) => SpecCatalog::load_dir(dir)?,
            None => SpecCatalog::builtin(),
        };
        info!(specs = catalog.len(), "spec catalog ready");

        let state = AppState::new(
            catalog,
            JobExecutor::new(config.max_sleep()),
            config.default_page_size,
        );
        let router = api::router()?;
        let listener = TcpListener::bind(config.address())?;

        Ok(Self {
            listener,
            router: Arc::new(router),
            state: Arc::new(state),
            limits: Limits {
                timeout: config.read_timeout(),
                max_body: config.max_body_bytes,
            },
        })
    }

    /// Dirección real del listener (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Acepta conexiones hasta que el listener falle; bloquea el thread
    pub fn run(self) -> Result<(), ServerError> {
        info!(address = %self.local_addr()?, "server listening (one thread per connection)");

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let router = Arc::clone(&self.router);
                    let state = Arc::clone(&self.state);
                    let limits = self.limits;

                    thread::spawn(move || {
                        if let Err(e) = handle_connection(stream, &router, &state, limits) {
                            warn!(error = %e, "connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }

        Ok(())
    }
}

fn handle_connection(
    mut stream: TcpStream,
    router: &Router<AppState>,
    state: &AppState,
    limits: Limits,
) -> io::Result<()> {
    let start = Instant::now();
    stream.set_read_timeout(Some(limits.timeout))?;
    stream.set_write_timeout(Some(limits.timeout))?;

    let request_id = Uuid::new_v4().to_string();
    let span = info_span!(
        "request",
        id = %request_id,
        method = field::Empty,
        path = field::Empty
    );
    let _guard = span.enter();

    if let Ok(peer) = stream.peer_addr() {
        debug!(%peer, "connection accepted");
    }

    let (mut response, rejected) = match read_request(&mut stream, limits.max_body) {
        Ok(Some(raw)) => match Request::parse(&raw) {
            Ok(request) => {
                span.record("method", request.method().as_str());
                span.record("path", request.path());
                (router.dispatch(&request, state), false)
            }
            Err(e) => {
                debug!(error = %e, "malformed request");
                (reject(ApiError::from(e)), false)
            }
        },
        Ok(None) => {
            debug!("connection closed before sending a request");
            return Ok(());
        }
        Err(ReadError::TooLarge) => {
            warn!(limit = limits.max_body, "request rejected: too large");
            (reject(ApiError::PayloadTooLarge), true)
        }
        Err(ReadError::Malformed(e)) => {
            debug!(error = %e, "malformed request");
            (reject(ApiError::from(e)), false)
        }
        Err(ReadError::Io(e)) => return Err(e),
    };

    response.add_header("X-Request-Id", &request_id);
    stream.write_all(&response.to_bytes())?;
    stream.flush()?;

    if rejected {
        drain(&mut stream);
    }

    info!(
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "request completed"
    );
    Ok(())
}

fn reject(err: ApiError) -> Response {
    let mut response = err.into_response();
    add_common_headers(&mut response);
    response
}

/// Lee headers hasta `\r\n\r\n` y luego exactamente `Content-Length` bytes
///
/// `Ok(None)` si el peer cerró sin mandar nada.
fn read_request<R: Read>(stream: &mut R, max_body: usize) -> Result<Option<Vec<u8>>, ReadError> {
    let mut buffer = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    let header_end = loop {
        if let Some(end) = find_header_end(&buffer) {
            break end;
        }
        if buffer.len() > MAX_HEADER_BYTES {
            return Err(ReadError::TooLarge);
        }

        let n = stream.read(&mut chunk)?;
        if n == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            // Sin terminador: el parser decide qué tan roto está
            return Ok(Some(buffer));
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    if header_end > MAX_HEADER_BYTES {
        return Err(ReadError::TooLarge);
    }

    let body_len = content_length(&buffer[..header_end])?.unwrap_or(0);
    if body_len > max_body {
        return Err(ReadError::TooLarge);
    }

    let total = header_end + HEADER_TERMINATOR.len() + body_len;
    while buffer.len() < total {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }
    buffer.truncate(total);

    Ok(Some(buffer))
}

/// Descarta lo que el cliente siga enviando para que el cierre no sea un RST
fn drain(stream: &mut TcpStream) {
    let _ = stream.shutdown(Shutdown::Write);
    let _ = stream.set_read_timeout(Some(DRAIN_TIMEOUT));
    let mut sink = [0u8; READ_CHUNK];
    while let Ok(n) = stream.read(&mut sink) {
        if n == 0 {
            break;
        }
    }
}
