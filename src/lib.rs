pub mod ast;
pub mod config;
pub mod error;
pub mod explain;
pub mod export;
pub mod model;
pub mod orchestrator;
pub mod sandbox;
pub mod types;
pub mod validator;

pub use config::ValidatorConfig;
pub use error::{Error, StatementError};
pub use export::{JsonLinesSink, MemorySink, ValidationSink};
pub use model::RepositoryInput;
pub use orchestrator::{Orchestrator, RepositorySummary, RunTotals};
pub use validator::{ExecutionValidator, ValidationResult};
