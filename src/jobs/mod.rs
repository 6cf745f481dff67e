//! # Sistema de Jobs
//!
//! Estado y ejecución de los jobs enviados a la API:
//!
//! - `types`: Job, máquina de estados y vista JSON
//! - `store`: JobStore, la única tabla id -> job (un solo lock)
//! - `executor`: resuelve la plantilla de la spec y simula el comando
//! - `handlers`: endpoints `/api/v1/jobs/...`
//!
//! ```text
//! SUBMITTED -> RUNNING -> FINISHED
//!     \           \
//!      +-----------+--> ABORTED
//! ```

pub mod executor;
pub mod handlers;
pub mod store;
pub mod types;

pub use executor::{Execution, JobExecutor};
pub use store::{JobPage, JobStore, DEFAULT_PAGE_SIZE};
pub use types::{Job, JobInputs, JobOutputs, JobStatus};
