//! Per-repository embedded database and the schema synthesized into it.

pub mod connection;
pub mod schema;

pub use connection::{HelperFailure, Sandbox};
pub use schema::{synthesize, SchemaError, SchemaSynthesizer, Synthesis};
