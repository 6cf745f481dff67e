//! Hrefs de los recursos y el sobre de descubrimiento `_links`.

use serde_json::{json, Map, Value};

pub const API_ROOT: &str = "/api/v1";

pub fn specs() -> String {
    format!("{}/specs", API_ROOT)
}

pub fn spec(id: &str) -> String {
    format!("{}/specs/{}", API_ROOT, id)
}

pub fn jobs() -> String {
    format!("{}/jobs", API_ROOT)
}

pub fn job(id: &str) -> String {
    format!("{}/jobs/{}", API_ROOT, id)
}

/// Sub-recurso de un job (`stdout`, `inputs`, `abort`, ...)
pub fn job_resource(id: &str, resource: &str) -> String {
    format!("{}/jobs/{}/{}", API_ROOT, id, resource)
}

pub fn current_user() -> String {
    format!("{}/users/current", API_ROOT)
}

/// `{"_links": {rel: {"href": ...}, ...}}` en el orden dado
pub fn envelope(rels: &[(&str, String)]) -> Value {
    let mut links = Map::new();
    for (rel, href) in rels {
        links.insert(rel.to_string(), json!({ "href": href }));
    }
    json!({ "_links": links })
}
