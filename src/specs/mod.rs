//! # Specs de Jobs
//!
//! Catálogo estático de especificaciones contra las que se crean jobs.

pub mod catalog;
pub mod types;

pub use catalog::{CatalogError, SpecCatalog};
pub use types::{ExecutionTemplate, ExpectedInput, ExpectedOutput, JobSpec, SpecSummary};
