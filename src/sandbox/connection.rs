use duckdb::Connection;
use tracing::{debug, warn};

use crate::error::Error;

/// An ephemeral in-memory database owned by one repository pass.
///
/// Two sandboxes never share state: each wraps its own in-memory
/// connection, so same-named tables from unrelated repositories never meet.
pub struct Sandbox {
    repo_id: i64,
    conn: Connection,
}

/// A helper statement the sandbox could not install.
#[derive(Debug, Clone, PartialEq)]
pub struct HelperFailure {
    pub statement: String,
    pub message: String,
}

impl Sandbox {
    pub fn open(repo_id: i64) -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        debug!(repo_id, "opened sandbox");
        Ok(Self { repo_id, conn })
    }

    pub fn repo_id(&self) -> i64 {
        self.repo_id
    }

    /// Install compatibility helpers (macros, type aliases). Each statement
    /// is independent; failures are returned, not raised.
    pub fn install_helpers(&self, helpers: &[String]) -> Vec<HelperFailure> {
        let mut failures = Vec::new();
        for statement in helpers {
            if let Err(e) = self.conn.execute_batch(statement) {
                warn!(repo_id = self.repo_id, %statement, error = %e, "helper not installed");
                failures.push(HelperFailure {
                    statement: statement.clone(),
                    message: e.to_string(),
                });
            }
        }
        failures
    }

    /// Disable the optimizer passes that would fold NULL predicates away and
    /// ask the engine for all three plan stages on `EXPLAIN`.
    pub fn prepare_for_explain(&self, disabled_optimizers: &[String]) -> Result<(), Error> {
        if !disabled_optimizers.is_empty() {
            let list = disabled_optimizers.join(",");
            self.conn
                .execute_batch(&format!("SET disabled_optimizers = '{list}'"))?;
        }
        self.conn.execute_batch("SET explain_output = 'all'")?;
        Ok(())
    }

    pub fn execute_batch(&self, sql: &str) -> Result<(), duckdb::Error> {
        self.conn.execute_batch(sql)
    }

    /// Run `EXPLAIN (FORMAT <format>) <sql>` and return the (stage, document)
    /// rows the engine emits.
    pub fn explain(&self, sql: &str, format: &str) -> Result<Vec<(String, String)>, duckdb::Error> {
        let mut stmt = self
            .conn
            .prepare(&format!("EXPLAIN (FORMAT {format}) {sql}"))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_rows(&self, qualified_table: &str) -> Result<i64, duckdb::Error> {
        self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {qualified_table}"),
            [],
            |row| row.get(0),
        )
    }

    pub fn table_exists(&self, schema: Option<&str>, table: &str) -> Result<bool, duckdb::Error> {
        let schema = schema.unwrap_or("main").trim_matches('"');
        let table = table.trim_matches('"');
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE lower(table_schema) = lower(?) AND lower(table_name) = lower(?)",
            duckdb::params![schema, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Discard the sandbox.
    pub fn close(self) -> Result<(), Error> {
        let repo_id = self.repo_id;
        self.conn.close().map_err(|(_, e)| Error::Sandbox(e))?;
        debug!(repo_id, "closed sandbox");
        Ok(())
    }
}
