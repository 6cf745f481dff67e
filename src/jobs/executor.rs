//! # Executor de Jobs
//! src/jobs/executor.rs
//!
//! Transforma (inputs, spec) en stdout/stderr y un status terminal.
//! Es síncrono: el thread que crea el job espera aquí hasta tener la salida.
//!
//! La plantilla `execution` de la spec se resuelve sustituyendo cada
//! `${inputs.<id>}` por el valor enviado (o el default declarado) y luego se
//! "ejecuta" con un intérprete simulado de unas pocas aplicaciones.
//! Los fallos del comando nunca son errores de protocolo: terminan en
//! FINISHED con el diagnóstico en stderr.

use crate::jobs::types::{JobInputs, JobOutputs, JobStatus};
use crate::specs::JobSpec;
use serde_json::Value;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const PLACEHOLDER_OPEN: &str = "${";
const INPUTS_PREFIX: &str = "inputs.";

/// Resultado de una ejecución
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub outputs: JobOutputs,
    pub status: JobStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
enum TemplateError {
    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("unsupported placeholder: ${{{0}}}")]
    UnsupportedPlaceholder(String),
}

#[derive(Debug, Clone)]
pub struct JobExecutor {
    /// Tope para `sleep`
    max_sleep: Duration,
}

impl JobExecutor {
    pub fn new(max_sleep: Duration) -> Self {
        Self { max_sleep }
    }

    /// Ejecuta la plantilla de la spec con los inputs del job
    pub fn run(&self, inputs: &JobInputs, spec: &JobSpec) -> Execution {
        let outputs = match resolve_arguments(inputs, spec) {
            Ok(args) => self.simulate(&spec.execution.application, &args),
            Err(err) => JobOutputs {
                stdout: String::new(),
                stderr: format!("{}\n", err),
            },
        };

        Execution {
            outputs,
            status: JobStatus::Finished,
        }
    }

    fn simulate(&self, application: &str, args: &[String]) -> JobOutputs {
        debug!(application, ?args, "executing simulated command");
        match application {
            "echo" => JobOutputs {
                stdout: format!("{}\n", args.join(" ")),
                stderr: String::new(),
            },
            "sleep" => self.sleep(args),
            other => JobOutputs {
                stdout: String::new(),
                stderr: format!("{}: command not found\n", other),
            },
        }
    }

    fn sleep(&self, args: &[String]) -> JobOutputs {
        let Some(arg) = args.first() else {
            return stderr_only("sleep: missing operand\n".to_string());
        };

        let seconds: f64 = match arg.trim().parse() {
            Ok(s) if f64::is_finite(s) && s >= 0.0 => s,
            _ => return stderr_only(format!("sleep: invalid time interval '{}'\n", arg)),
        };

        let cap = self.max_sleep.as_secs_f64();
        if seconds > cap {
            debug!(requested = seconds, cap, "sleep capped");
        }
        thread::sleep(Duration::from_secs_f64(seconds.min(cap)));

        JobOutputs::default()
    }
}

impl Default for JobExecutor {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

fn stderr_only(stderr: String) -> JobOutputs {
    JobOutputs {
        stdout: String::new(),
        stderr,
    }
}

/// Sustituye los placeholders de cada argumento
fn resolve_arguments(inputs: &JobInputs, spec: &JobSpec) -> Result<Vec<String>, TemplateError> {
    spec.execution
        .arguments
        .iter()
        .map(|arg| resolve_argument(arg, inputs, spec))
        .collect()
}

fn resolve_argument(arg: &str, inputs: &JobInputs, spec: &JobSpec) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;

    while let Some(start) = rest.find(PLACEHOLDER_OPEN) {
        let after_open = &rest[start + PLACEHOLDER_OPEN.len()..];
        let Some(end) = after_open.find('}') else {
            // Sin cierre: el resto es texto literal
            break;
        };

        out.push_str(&rest[..start]);
        let expr = &after_open[..end];
        let input_id = expr
            .strip_prefix(INPUTS_PREFIX)
            .ok_or_else(|| TemplateError::UnsupportedPlaceholder(expr.to_string()))?;
        out.push_str(&lookup_input(input_id, inputs, spec)?);

        rest = &after_open[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Valor enviado, o el default de la spec si se omitió (o vino `null`)
fn lookup_input(id: &str, inputs: &JobInputs, spec: &JobSpec) -> Result<String, TemplateError> {
    let supplied = inputs.get(id).filter(|v| !v.is_null());
    let default = spec
        .expected_input(id)
        .and_then(|input| input.default.as_ref())
        .filter(|v| !v.is_null());

    supplied
        .or(default)
        .map(value_to_argument)
        .ok_or_else(|| TemplateError::MissingInput(id.to_string()))
}

fn value_to_argument(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
