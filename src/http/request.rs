//! # Parsing de Requests HTTP/1.x
//! src/http/request.rs
//!
//! Parser de requests escrito desde cero.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /api/v1/jobs?x=1 HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 17\r\n
//! \r\n
//! {"spec": "echo"}
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path?query HTTP/1.x`
//! 2. **Headers**: Pares `Name: Value` (uno por línea, nombre sin distinguir mayúsculas)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: bytes crudos, acotados por `Content-Length` si está presente

use std::collections::HashMap;
use thiserror::Error;

/// Separador entre el bloque de headers y el body
pub(crate) const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Métodos HTTP reconocidos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
}

impl Method {
    /// Parsea un método HTTP desde su token
    ///
    /// # Errores
    ///
    /// `ParseError::UnsupportedMethod` si el token no es un método conocido
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "PATCH" => Ok(Method::PATCH),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::OPTIONS => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Path crudo, sin decodificar (ej: "/api/v1/jobs/abc")
    path: String,

    /// Query parameters ya decodificados (ej: {"page-size": "10"})
    query_params: HashMap<String, String>,

    /// Headers con el nombre en minúsculas
    headers: HashMap<String, String>,

    version: String,

    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Incomplete HTTP request")]
    IncompleteRequest,

    #[error("Invalid request line format")]
    InvalidRequestLine,

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    #[error("Empty request")]
    EmptyRequest,
}

impl Request {
    /// Parsea un request desde bytes
    ///
    /// El buffer debe contener el request completo (headers y body).
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use jobson_server::http::Request;
    ///
    /// let raw = b"GET /api/v1/jobs?page-size=10 HTTP/1.0\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/api/v1/jobs");
    /// assert_eq!(request.query_param("page-size"), Some("10"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let (head, rest) = match find_header_end(buffer) {
            Some(end) => (&buffer[..end], &buffer[end + HEADER_TERMINATOR.len()..]),
            None => (buffer, &buffer[buffer.len()..]),
        };

        // El bloque de headers tiene que ser UTF-8; el body no
        let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequestLine)?;

        if head.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let mut lines = head.split("\r\n");
        let request_line = lines.next().ok_or(ParseError::IncompleteRequest)?;

        let (method, path, query_params, version) = Self::parse_request_line(request_line)?;
        let headers = Self::parse_headers(lines)?;
        let body = Self::parse_body(&headers, rest)?;

        Ok(Request {
            method,
            path,
            query_params,
            headers,
            version,
            body,
        })
    }

    /// Formato: `GET /path?query HTTP/1.x`
    fn parse_request_line(
        line: &str,
    ) -> Result<(Method, String, HashMap<String, String>, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        // Debe tener exactamente 3 partes: METHOD PATH VERSION
        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        let method = Method::parse(parts[0])?;

        if !parts[1].starts_with('/') {
            return Err(ParseError::InvalidRequestLine);
        }
        let (path, query_params) = Self::parse_path_and_query(parts[1]);

        Ok((method, path, query_params, version))
    }

    /// Ejemplo: "/api/v1/jobs?page=0&page-size=5"
    /// Retorna: ("/api/v1/jobs", {"page": "0", "page-size": "5"})
    fn parse_path_and_query(path_with_query: &str) -> (String, HashMap<String, String>) {
        match path_with_query.split_once('?') {
            Some((path, query)) => (path.to_string(), Self::parse_query_string(query)),
            None => (path_with_query.to_string(), HashMap::new()),
        }
    }

    fn parse_query_string(query: &str) -> HashMap<String, String> {
        let mut params = HashMap::new();

        for param in query.split('&') {
            if param.is_empty() {
                continue;
            }

            match param.split_once('=') {
                Some((key, value)) => {
                    params.insert(percent_decode(key, true), percent_decode(value, true));
                }
                // Parámetro sin valor (ej: "?debug")
                None => {
                    params.insert(percent_decode(param, true), String::new());
                }
            }
        }

        params
    }

    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.trim().is_empty() {
                break;
            }

            match line.split_once(':') {
                Some((name, value)) => {
                    headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
                }
                None => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    /// Con `Content-Length` el body se recorta a ese largo; sin él se toma todo lo recibido
    fn parse_body(headers: &HashMap<String, String>, rest: &[u8]) -> Result<Vec<u8>, ParseError> {
        match headers.get("content-length") {
            Some(raw) => {
                let len = parse_content_length(raw)?;
                if rest.len() < len {
                    return Err(ParseError::IncompleteRequest);
                }
                Ok(rest[..len].to_vec())
            }
            None => Ok(rest.to_vec()),
        }
    }

    // === Métodos públicos para acceder a los campos ===

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Obtiene un query parameter específico
    ///
    /// # Ejemplo
    /// ```
    /// use jobson_server::http::Request;
    ///
    /// let raw = b"GET /test?name=hello%20world HTTP/1.0\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.query_param("name"), Some("hello world"));
    /// assert_eq!(request.query_param("missing"), None);
    /// ```
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    /// Obtiene un header sin distinguir mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Posición donde empieza `\r\n\r\n`, si ya llegó
pub(crate) fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}

/// Busca `Content-Length` dentro de un bloque de headers ya recibido
pub(crate) fn content_length(head: &[u8]) -> Result<Option<usize>, ParseError> {
    let head = String::from_utf8_lossy(head);
    for line in head.split("\r\n").skip(1) {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                return parse_content_length(value).map(Some);
            }
        }
    }
    Ok(None)
}

fn parse_content_length(raw: &str) -> Result<usize, ParseError> {
    raw.trim()
        .parse()
        .map_err(|_| ParseError::InvalidContentLength(raw.trim().to_string()))
}

/// Decodifica `%XX` (UTF-8) y opcionalmente `+` como espacio
///
/// Secuencias inválidas se dejan tal cual.
pub fn percent_decode(s: &str, plus_as_space: bool) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                        continue;
                    }
                    _ => out.push(b'%'),
                }
            }
            b'+' if plus_as_space => out.push(b' '),
            b => out.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
