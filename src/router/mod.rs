//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Route table tipado: (método, plantilla de path) -> handler.
//!
//! ```text
//! Request → Router → Handler → Result<Response, ApiError> → Response
//! ```
//!
//! Las plantillas (`/api/v1/jobs/{id}/stdout`) se compilan una sola vez a
//! regex ancladas con capturas nombradas. El matching recorre las rutas en
//! orden de registro, así que las rutas exactas deben registrarse antes que
//! las parametrizadas que también las cubrirían (`/jobs/events` antes que
//! `/jobs/{id}`). Una captura nunca cruza un `/`.
//!
//! - Path sin ruta → 404 Not Found
//! - Ruta con otro método → 405 Method Not Allowed (+ `Allow`)
//! - HEAD usa el handler GET y descarta el body

use crate::error::ApiError;
use crate::http::request::percent_decode;
use crate::http::{Method, Request, Response};
use regex::Regex;
use std::collections::HashMap;

/// Un handler recibe el request, las capturas del path y el estado compartido
pub type Handler<S> = fn(&Request, &PathParams, &S) -> Result<Response, ApiError>;

/// Capturas nombradas del path, ya decodificadas
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|s| s.as_str())
    }

    /// Captura obligatoria; su ausencia es un error de registro de rutas
    pub fn require(&self, name: &str) -> Result<&str, ApiError> {
        self.get(name)
            .ok_or_else(|| ApiError::Internal(format!("route has no {{{}}} capture", name)))
    }
}

struct Route<S> {
    template: String,
    pattern: Regex,
    handlers: Vec<(Method, Handler<S>)>,
}

impl<S> Route<S> {
    fn handler_for(&self, method: Method) -> Option<Handler<S>> {
        let find = |wanted: Method| {
            self.handlers
                .iter()
                .find(|(m, _)| *m == wanted)
                .map(|(_, h)| *h)
        };
        match method {
            Method::HEAD => find(Method::HEAD).or_else(|| find(Method::GET)),
            other => find(other),
        }
    }

    fn allowed(&self) -> Vec<Method> {
        let mut allowed: Vec<Method> = self.handlers.iter().map(|(m, _)| *m).collect();
        if allowed.contains(&Method::GET) && !allowed.contains(&Method::HEAD) {
            allowed.push(Method::HEAD);
        }
        allowed
    }
}

/// Router que mapea (método, path) a handlers
pub struct Router<S> {
    routes: Vec<Route<S>>,
}

impl<S> Router<S> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra un handler para un método y una plantilla
    ///
    /// Registrar otro método sobre la misma plantilla la reutiliza.
    ///
    /// # Ejemplo
    /// ```
    /// use jobson_server::error::ApiError;
    /// use jobson_server::http::{Method, Request, Response, StatusCode};
    /// use jobson_server::router::{PathParams, Router};
    ///
    /// fn hello(_req: &Request, params: &PathParams, _state: &()) -> Result<Response, ApiError> {
    ///     let name = params.require("name")?;
    ///     Ok(Response::json(StatusCode::Ok, &format!(r#"{{"hello": "{}"}}"#, name)))
    /// }
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, "/hello/{name}", hello).unwrap();
    ///
    /// let request = Request::parse(b"GET /hello/world HTTP/1.0\r\n\r\n").unwrap();
    /// assert_eq!(router.dispatch(&request, &()).status(), StatusCode::Ok);
    /// ```
    pub fn register(
        &mut self,
        method: Method,
        template: &str,
        handler: Handler<S>,
    ) -> Result<&mut Self, regex::Error> {
        if let Some(index) = self.routes.iter().position(|r| r.template == template) {
            self.routes[index].handlers.push((method, handler));
            return Ok(self);
        }

        self.routes.push(Route {
            template: template.to_string(),
            pattern: compile_template(template)?,
            handlers: vec![(method, handler)],
        });
        Ok(self)
    }

    /// Encuentra y ejecuta el handler; los errores se renderizan como JSON
    pub fn dispatch(&self, request: &Request, state: &S) -> Response {
        let mut response = match self.resolve(request.method(), request.path()) {
            Ok((handler, params)) => {
                handler(request, &params, state).unwrap_or_else(ApiError::into_response)
            }
            Err(err) => err.into_response(),
        };

        if request.method() == Method::HEAD {
            response.strip_body();
        }
        add_common_headers(&mut response);
        response
    }

    fn resolve(&self, method: Method, path: &str) -> Result<(Handler<S>, PathParams), ApiError> {
        let path = normalize_path(path);

        for route in &self.routes {
            let Some(captures) = route.pattern.captures(path) else {
                continue;
            };

            let Some(handler) = route.handler_for(method) else {
                return Err(ApiError::MethodNotAllowed {
                    method: method.to_string(),
                    allowed: route.allowed(),
                });
            };

            let params = route
                .pattern
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.to_string(), percent_decode(m.as_str(), false)))
                })
                .collect();

            return Ok((handler, PathParams(params)));
        }

        Err(ApiError::NotFound(format!("Route not found: {}", path)))
    }
}

impl<S> Default for Router<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// `/api/v1/jobs/{id}` → `^/api/v1/jobs/(?P<id>[^/]+)$`
fn compile_template(template: &str) -> Result<Regex, regex::Error> {
    let mut pattern = String::from("^");
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        pattern.push_str(&regex::escape(&rest[..open]));
        let name = &rest[open + 1..open + close];
        pattern.push_str(&format!("(?P<{}>[^/]+)", name));
        rest = &rest[open + close + 1..];
    }

    pattern.push_str(&regex::escape(rest));
    pattern.push('$');
    Regex::new(&pattern)
}

/// Ignora un `/` final salvo en la raíz
fn normalize_path(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Headers comunes a todas las respuestas
pub(crate) fn add_common_headers(response: &mut Response) {
    response.add_header("Server", "Jobson-RS/0.1");
    response.add_header("Connection", "close");
}
