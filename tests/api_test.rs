//! Tests de integración para la API de jobs
//! tests/api_test.rs
//!
//! Cada test levanta su propio servidor en un puerto efímero y le habla
//! HTTP/1.0 crudo por `TcpStream`.

use jobson_server::config::Config;
use jobson_server::server::Server;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

struct HttpResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl HttpResponse {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("UTF-8 body")
    }
}

/// Helper: levanta el servidor en background y retorna su dirección
fn start_server() -> SocketAddr {
    let mut config = Config::default();
    config.port = 0;
    config.max_sleep_secs = 2;
    config.max_body_bytes = 64 * 1024;
    config.read_timeout_ms = 5_000;

    let server = Server::bind(config).expect("bind server");
    let addr = server.local_addr().expect("local addr");
    thread::spawn(move || {
        let _ = server.run();
    });
    addr
}

/// Helper: envía un request HTTP y retorna la response parseada
fn send(addr: SocketAddr, method: &str, path: &str, body: Option<&str>) -> HttpResponse {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    stream.set_write_timeout(Some(Duration::from_secs(10))).unwrap();

    let mut raw = format!("{} {} HTTP/1.0\r\nHost: localhost\r\n", method, path);
    if let Some(body) = body {
        raw.push_str("Content-Type: application/json\r\n");
        raw.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    raw.push_str("\r\n");
    raw.push_str(body.unwrap_or(""));

    stream.write_all(raw.as_bytes()).unwrap();
    stream.shutdown(Shutdown::Write).unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).unwrap();
    parse_response(&buf)
}

fn parse_response(buf: &[u8]) -> HttpResponse {
    let split = buf
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("header terminator");
    let head = String::from_utf8_lossy(&buf[..split]).into_owned();
    let mut lines = head.split("\r\n");

    let status = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .expect("status line");
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    HttpResponse {
        status,
        headers,
        body: buf[split + 4..].to_vec(),
    }
}

fn get(addr: SocketAddr, path: &str) -> HttpResponse {
    send(addr, "GET", path, None)
}

fn submit(addr: SocketAddr, body: &str) -> Value {
    let response = send(addr, "POST", "/api/v1/jobs", Some(body));
    assert_eq!(response.status, 200, "submit failed: {}", response.text());
    response.json()
}

fn total_jobs(addr: SocketAddr) -> u64 {
    get(addr, "/api/v1/jobs").json()["total"].as_u64().unwrap()
}

// ==================== Descubrimiento ====================

#[test]
fn test_root_links() {
    let addr = start_server();
    let response = get(addr, "/");

    assert_eq!(response.status, 200);
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    let body = response.json();
    assert_eq!(body["_links"]["specs"]["href"], "/api/v1/specs");
    assert_eq!(body["_links"]["jobs"]["href"], "/api/v1/jobs");
}

#[test]
fn test_api_root_and_versions() {
    let addr = start_server();

    let body = get(addr, "/api/v1").json();
    assert_eq!(body["_links"]["current-user"]["href"], "/api/v1/users/current");
    assert_eq!(get(addr, "/api/v1/").status, 200);

    for other in ["/api/v2", "/api/v0", "/api"] {
        assert_eq!(get(addr, other).status, 404, "{}", other);
    }
}

#[test]
fn test_current_user() {
    let addr = start_server();
    let response = get(addr, "/api/v1/users/current");
    assert_eq!(response.status, 200);
    assert_eq!(response.json(), json!({"id": "guest", "name": "Guest User"}));
}

// ==================== Specs ====================

#[test]
fn test_spec_listing_hrefs_resolve() {
    let addr = start_server();
    let listing = get(addr, "/api/v1/specs").json();
    let entries = listing["entries"].as_array().unwrap();
    assert!(!entries.is_empty());

    for entry in entries {
        let detail = get(addr, entry["href"].as_str().unwrap());
        assert_eq!(detail.status, 200);
        let detail = detail.json();
        assert_eq!(detail["id"], entry["id"]);
        for field in ["name", "description", "expectedInputs", "expectedOutputs", "execution"] {
            assert!(detail.get(field).is_some(), "missing {}", field);
        }
    }
}

#[test]
fn test_unknown_spec_and_traversal() {
    let addr = start_server();
    let response = get(addr, "/api/v1/specs/nonexistent");
    assert_eq!(response.status, 404);
    assert!(response.json()["error"].is_string());

    assert_eq!(get(addr, "/api/v1/specs/../../etc/passwd").status, 404);
    assert_eq!(get(addr, "/api/v1/specs/%2e%2e%2fsecret").status, 404);
}

// ==================== Jobs ====================

#[test]
fn test_create_and_read_job() {
    let addr = start_server();
    let job = submit(
        addr,
        r#"{"spec": "echo", "name": "Test Job", "inputs": {"message": "Hello, World!"}}"#,
    );

    let id = job["id"].as_str().unwrap().to_string();
    assert_eq!(job["name"], "Test Job");
    assert_eq!(job["spec"], "echo");
    assert_eq!(job["status"], "FINISHED");
    assert_eq!(job["inputs"], json!({"message": "Hello, World!"}));

    let detail = get(addr, &format!("/api/v1/jobs/{}", id));
    assert_eq!(detail.status, 200);
    let detail = detail.json();
    assert!(detail["timestamps"]["submitted"].is_string());
    assert!(detail["timestamps"]["started"].is_string());
    assert!(detail["timestamps"]["finished"].is_string());
    assert_eq!(detail["_links"]["stdout"]["href"], format!("/api/v1/jobs/{}/stdout", id));

    let stdout = get(addr, &format!("/api/v1/jobs/{}/stdout", id));
    assert_eq!(stdout.status, 200);
    assert!(stdout.header("Content-Type").unwrap().starts_with("text/plain"));
    assert_eq!(stdout.text(), "Hello, World!\n");

    let stderr = get(addr, &format!("/api/v1/jobs/{}/stderr", id));
    assert_eq!(stderr.status, 200);
    assert_eq!(stderr.text(), "");

    let spec = get(addr, &format!("/api/v1/jobs/{}/spec", id));
    assert_eq!(spec.status, 200);
    assert_eq!(spec.json()["id"], "echo");
}

#[test]
fn test_generated_name_and_default_input() {
    let addr = start_server();
    let job = submit(addr, r#"{"spec": "echo"}"#);

    let id = job["id"].as_str().unwrap();
    assert_eq!(job["name"], format!("Job {}", &id[..8]));
    assert_eq!(
        get(addr, &format!("/api/v1/jobs/{}/stdout", id)).text(),
        "Hello, World!\n"
    );
}

#[test]
fn test_invalid_spec_creates_nothing() {
    let addr = start_server();
    submit(addr, r#"{"spec": "echo"}"#);
    let before = total_jobs(addr);

    let response = send(addr, "POST", "/api/v1/jobs", Some(r#"{"spec": "nonexistent"}"#));
    assert_eq!(response.status, 400);
    assert!(response.json()["error"].is_string());
    assert_eq!(total_jobs(addr), before);
}

#[test]
fn test_malformed_submissions() {
    let addr = start_server();
    for body in ["", "not json", "{\"spec\":", "[1,2]", "{}", r#"{"spec": null}"#] {
        let response = send(addr, "POST", "/api/v1/jobs", Some(body));
        assert_eq!(response.status, 400, "body: {:?}", body);
    }
    assert_eq!(total_jobs(addr), 0);
}

#[test]
fn test_get_delete_get() {
    let addr = start_server();
    let job = submit(addr, r#"{"spec": "echo"}"#);
    let path = format!("/api/v1/jobs/{}", job["id"].as_str().unwrap());

    assert_eq!(get(addr, &path).status, 200);
    let deleted = send(addr, "DELETE", &path, None);
    assert_eq!(deleted.status, 200);
    assert_eq!(deleted.json()["message"], "Job deleted");
    assert_eq!(get(addr, &path).status, 404);

    for sub in ["inputs", "spec", "stdout", "stderr"] {
        assert_eq!(get(addr, &format!("{}/{}", path, sub)).status, 404, "{}", sub);
    }
    assert_eq!(send(addr, "DELETE", &path, None).status, 404);
}

#[test]
fn test_missing_job_sub_resources() {
    let addr = start_server();
    for path in [
        "/api/v1/jobs/nonexistent",
        "/api/v1/jobs/nonexistent/inputs",
        "/api/v1/jobs/nonexistent/spec",
        "/api/v1/jobs/nonexistent/stdout",
        "/api/v1/jobs/nonexistent/stderr",
    ] {
        assert_eq!(get(addr, path).status, 404, "{}", path);
    }
    assert_eq!(send(addr, "POST", "/api/v1/jobs/nonexistent/abort", None).status, 404);
}

#[test]
fn test_abort_finished_job_conflicts() {
    let addr = start_server();
    let job = submit(addr, r#"{"spec": "echo"}"#);
    let id = job["id"].as_str().unwrap();

    let response = send(addr, "POST", &format!("/api/v1/jobs/{}/abort", id), None);
    assert_eq!(response.status, 409);
    assert_eq!(get(addr, &format!("/api/v1/jobs/{}", id)).json()["status"], "FINISHED");
}

#[test]
fn test_abort_running_job() {
    let addr = start_server();

    let submitter = thread::spawn(move || submit(addr, r#"{"spec": "sleep", "inputs": {"seconds": 2}}"#));

    // Esperar a que el job aparezca RUNNING en el listado
    let deadline = Instant::now() + Duration::from_millis(1500);
    let id = loop {
        let listing = get(addr, "/api/v1/jobs").json();
        let running = listing["entries"]
            .as_array()
            .unwrap()
            .iter()
            .find(|job| job["status"] == "RUNNING")
            .map(|job| job["id"].as_str().unwrap().to_string());
        if let Some(id) = running {
            break id;
        }
        assert!(Instant::now() < deadline, "job never reached RUNNING");
        thread::sleep(Duration::from_millis(10));
    };

    let running = get(addr, &format!("/api/v1/jobs/{}", id)).json();
    assert!(running["_links"].get("abort").is_some());
    assert!(running["timestamps"]["finished"].is_null());

    let aborted = send(addr, "POST", &format!("/api/v1/jobs/{}/abort", id), None);
    assert_eq!(aborted.status, 200);
    assert_eq!(aborted.json()["message"], "Job aborted");

    let returned = submitter.join().unwrap();
    assert_eq!(returned["status"], "ABORTED");

    let detail = get(addr, &format!("/api/v1/jobs/{}", id)).json();
    assert_eq!(detail["status"], "ABORTED");
    assert!(detail["timestamps"]["finished"].is_string());
    assert!(detail["_links"].get("abort").is_none());
    assert_eq!(send(addr, "POST", &format!("/api/v1/jobs/{}/abort", id), None).status, 409);
}

#[test]
fn test_pagination_bounds() {
    let addr = start_server();
    for _ in 0..5 {
        submit(addr, r#"{"spec": "echo"}"#);
    }

    for n in 0..7 {
        let listing = get(addr, &format!("/api/v1/jobs?page-size={}", n)).json();
        assert!(listing["entries"].as_array().unwrap().len() <= n);
        assert_eq!(listing["total"], 5);
        assert_eq!(listing["pageSize"], n);
    }

    let last = get(addr, "/api/v1/jobs?page=2&page-size=2").json();
    assert_eq!(last["entries"].as_array().unwrap().len(), 1);
    assert_eq!(last["page"], 2);

    let beyond = get(addr, "/api/v1/jobs?page=99&page-size=2").json();
    assert!(beyond["entries"].as_array().unwrap().is_empty());

    assert_eq!(get(addr, "/api/v1/jobs?page-size=abc").status, 400);
}

#[test]
fn test_listing_keeps_creation_order() {
    let addr = start_server();
    let ids: Vec<String> = (0..3)
        .map(|i| {
            let job = submit(addr, &format!(r#"{{"spec": "echo", "name": "job {}"}}"#, i));
            job["id"].as_str().unwrap().to_string()
        })
        .collect();

    let listing = get(addr, "/api/v1/jobs").json();
    let listed: Vec<&str> = listing["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|job| job["id"].as_str().unwrap())
        .collect();
    assert_eq!(listed, ids);
}

#[test]
fn test_unicode_inputs_preserved() {
    let addr = start_server();
    let inputs = r#"{"message":"Hello 世界 🌍 مرحبا Привет"}"#;
    let job = submit(addr, &format!(r#"{{"spec": "echo", "inputs": {}}}"#, inputs));
    let id = job["id"].as_str().unwrap();

    let response = get(addr, &format!("/api/v1/jobs/{}/inputs", id));
    assert_eq!(response.status, 200);
    assert_eq!(response.body, inputs.as_bytes());

    let stdout = get(addr, &format!("/api/v1/jobs/{}/stdout", id));
    assert_eq!(stdout.text(), "Hello 世界 🌍 مرحبا Привет\n");

    let numbers = r#"{"big":12345678901234567890123,"dec":0.1000000000000000055511151231257827,"exp":1e2,"f":1.50}"#;
    let job = submit(addr, &format!(r#"{{"spec": "echo", "inputs": {}}}"#, numbers));
    let id = job["id"].as_str().unwrap();

    let response = get(addr, &format!("/api/v1/jobs/{}/inputs", id));
    assert_eq!(response.status, 200);
    assert_eq!(response.body, numbers.as_bytes());
}

#[test]
fn test_markup_in_name_is_escaped() {
    let addr = start_server();
    let job = submit(addr, r#"{"spec": "echo", "name": "<script>alert(1)</script>"}"#);
    let name = job["name"].as_str().unwrap();
    assert!(!name.contains('<'));
    assert!(!name.contains('>'));
}

#[test]
fn test_concurrent_submissions() {
    let addr = start_server();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            thread::spawn(move || {
                (0..5)
                    .map(|i| {
                        let body = format!(
                            r#"{{"spec": "echo", "inputs": {{"message": "t{} i{}"}}}}"#,
                            t, i
                        );
                        submit(addr, &body)["id"].as_str().unwrap().to_string()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: HashSet<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    assert_eq!(ids.len(), 40);
    assert_eq!(total_jobs(addr), 40);
}

// ==================== Streaming y protocolo ====================

#[test]
fn test_streaming_endpoints_require_upgrade() {
    let addr = start_server();
    for path in [
        "/api/v1/jobs/events",
        "/api/v1/jobs/test-id/stdout/updates",
        "/api/v1/jobs/test-id/stderr/updates",
    ] {
        let response = get(addr, path);
        assert_eq!(response.status, 426, "{}", path);
        assert_eq!(response.header("Upgrade"), Some("websocket"));
    }
}

#[test]
fn test_method_not_allowed() {
    let addr = start_server();

    let response = send(addr, "DELETE", "/api/v1/specs", None);
    assert_eq!(response.status, 405);
    assert_eq!(response.header("Allow"), Some("GET, HEAD"));

    assert_eq!(send(addr, "PUT", "/api/v1/jobs", None).status, 405);
    assert_eq!(send(addr, "GET", "/api/v1/jobs/x/abort", None).status, 405);
    assert_eq!(send(addr, "BREW", "/api/v1", None).status, 405);
}

#[test]
fn test_head_has_no_body() {
    let addr = start_server();
    let response = send(addr, "HEAD", "/api/v1/specs", None);

    assert_eq!(response.status, 200);
    assert!(response.body.is_empty());
    let length: usize = response.header("Content-Length").unwrap().parse().unwrap();
    assert!(length > 0);
}

#[test]
fn test_common_headers() {
    let addr = start_server();
    let first = get(addr, "/");
    let second = get(addr, "/nonexistent");

    assert_eq!(second.status, 404);
    for response in [&first, &second] {
        assert_eq!(response.header("Connection"), Some("close"));
        assert!(response.header("Server").is_some());
    }
    let first_id = first.header("X-Request-Id").unwrap();
    let second_id = second.header("X-Request-Id").unwrap();
    assert_ne!(first_id, second_id);
}

#[test]
fn test_payload_too_large() {
    let addr = start_server();
    let big = format!(r#"{{"spec": "echo", "inputs": {{"message": "{}"}}}}"#, "x".repeat(70 * 1024));
    let response = send(addr, "POST", "/api/v1/jobs", Some(&big));
    assert_eq!(response.status, 413);
    assert_eq!(total_jobs(addr), 0);
}
