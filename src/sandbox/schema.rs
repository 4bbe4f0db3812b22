/// Schema synthesis: table shapes → sandbox DDL plus two seed rows.
///
/// Every materialized table holds exactly one row of per-category example
/// values and one row of NULLs, so the planner can never prove a predicate
/// empty from the table contents alone.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

use super::connection::Sandbox;
use crate::model::{Table, TableShape};

/// A table the sandbox could not materialize. The table is excluded;
/// siblings are unaffected.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("failed to materialize {table_name}: {message}")]
pub struct SchemaError {
    pub repo_id: i64,
    pub table_name: String,
    pub message: String,
    pub generated_ddl: String,
}

/// Outcome of one synthesis pass.
#[derive(Debug, Default)]
pub struct Synthesis {
    pub tables: Vec<Table>,
    pub errors: Vec<SchemaError>,
}

pub struct SchemaSynthesizer<'a> {
    sandbox: &'a Sandbox,
    seed: bool,
}

impl<'a> SchemaSynthesizer<'a> {
    pub fn new(sandbox: &'a Sandbox) -> Self {
        Self {
            sandbox,
            seed: true,
        }
    }

    /// Skip the seed rows. Tables are still created.
    pub fn without_seed(mut self) -> Self {
        self.seed = false;
        self
    }

    pub fn synthesize(&self, shapes: &[TableShape]) -> Synthesis {
        let repo_id = self.sandbox.repo_id();
        let mut synthesis = Synthesis::default();
        let mut seen = HashSet::new();

        for shape in shapes {
            let table = Table::resolve(shape);
            let key = identity_key(&table);
            if seen.contains(&key) || self.already_exists(&table) {
                warn!(repo_id, table = %shape.table_name, "duplicate table definition");
                synthesis.errors.push(SchemaError {
                    repo_id,
                    table_name: shape.table_name.clone(),
                    message: "duplicate table definition; first definition kept".into(),
                    generated_ddl: create_table_ddl(&table),
                });
                continue;
            }

            // Only a materialized definition claims its name.
            match self.materialize(&table) {
                Ok(()) => {
                    debug!(repo_id, table = %table.qualified_name(), columns = table.columns.len(), "table materialized");
                    seen.insert(key);
                    synthesis.tables.push(table);
                }
                Err(e) => {
                    warn!(repo_id, table = %e.table_name, error = %e.message, "table not materialized");
                    synthesis.errors.push(e);
                }
            }
        }
        synthesis
    }

    fn materialize(&self, table: &Table) -> Result<(), SchemaError> {
        let fail = |ddl: String, e: duckdb::Error| SchemaError {
            repo_id: self.sandbox.repo_id(),
            table_name: table.qualified_name(),
            message: e.to_string(),
            generated_ddl: ddl,
        };

        if let Some(schema) = &table.schema {
            let ddl = format!("CREATE SCHEMA IF NOT EXISTS {schema}");
            self.sandbox
                .execute_batch(&ddl)
                .map_err(|e| fail(ddl.clone(), e))?;
        }

        let ddl = create_table_ddl(table);
        self.sandbox
            .execute_batch(&ddl)
            .map_err(|e| fail(ddl.clone(), e))?;

        if self.seed {
            let insert = seed_insert(table);
            if let Err(e) = self.sandbox.execute_batch(&insert) {
                // An unseeded table must not shadow a later definition.
                let drop = format!("DROP TABLE IF EXISTS {}", table.qualified_name());
                if let Err(drop_err) = self.sandbox.execute_batch(&drop) {
                    warn!(table = %table.qualified_name(), error = %drop_err, "failed to drop unseeded table");
                }
                return Err(fail(insert, e));
            }
        }
        Ok(())
    }

    /// Whether the table is already present in the sandbox, e.g. created
    /// under its explicit `main.` qualifier by an earlier definition.
    fn already_exists(&self, table: &Table) -> bool {
        let schema = table.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
        self.sandbox
            .table_exists(Some(schema), &table.name)
            .unwrap_or_else(|e| {
                warn!(table = %table.qualified_name(), error = %e, "table lookup failed");
                false
            })
    }
}

/// Synthesize with seeding enabled.
pub fn synthesize(sandbox: &Sandbox, shapes: &[TableShape]) -> Synthesis {
    SchemaSynthesizer::new(sandbox).synthesize(shapes)
}

pub fn create_table_ddl(table: &Table) -> String {
    let columns = table
        .columns
        .iter()
        .map(|c| c.definition())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({columns})",
        table.qualified_name()
    )
}

/// One `INSERT` carrying the example row and the NULL row.
pub fn seed_insert(table: &Table) -> String {
    let names = table
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let examples = table
        .columns
        .iter()
        .map(|c| c.category.example_literal())
        .collect::<Vec<_>>()
        .join(", ");
    let nulls = vec!["NULL"; table.columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({names}) VALUES ({examples}), ({nulls})",
        table.qualified_name()
    )
}

/// Schema unqualified tables land in.
const DEFAULT_SCHEMA: &str = "main";

/// `users` and `main.users` name the same table.
fn identity_key(table: &Table) -> (String, String) {
    let fold = |s: &str| s.trim_matches('"').to_lowercase();
    (
        fold(table.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)),
        fold(&table.name),
    )
}
