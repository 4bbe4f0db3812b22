use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Error;

/// Optimizer passes that fold NULL-valued predicates into an empty relation
/// before the plan shape can be captured.
pub const DEFAULT_DISABLED_OPTIMIZERS: &[&str] =
    &["empty_result_pullup", "statistics_propagation", "filter_pushdown"];

/// Dialect-compatibility helpers installed into every sandbox before any
/// statement runs.
pub const DEFAULT_SANDBOX_HELPERS: &[&str] = &[
    "CREATE OR REPLACE MACRO add_days(d, n) AS (d + n * INTERVAL '1 day')",
    "CREATE OR REPLACE MACRO add_months(d, n) AS (d + n * INTERVAL '1 month')",
    "CREATE OR REPLACE MACRO add_years(d, n) AS (d + n * INTERVAL '1 year')",
    "CREATE TYPE XML AS VARCHAR",
    "CREATE TYPE OTHER AS VARCHAR",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub disabled_optimizers: Vec<String>,
    /// Format keyword passed to `EXPLAIN (FORMAT ...)`.
    pub explain_format: String,
    /// Name given to `%s`-style host placeholders during normalization.
    pub placeholder_name: String,
    /// Statements run after the built-in helpers.
    pub extra_helpers: Vec<String>,
    /// Insert the two seed rows into every synthesized table.
    pub seed_tables: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            disabled_optimizers: DEFAULT_DISABLED_OPTIMIZERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            explain_format: String::from("JSON"),
            placeholder_name: String::from("param"),
            extra_helpers: Vec::new(),
            seed_tables: true,
        }
    }
}

impl ValidatorConfig {
    /// Load from an explicit path, or from the default location when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        Self::from_toml(&data)
    }

    pub fn from_toml(data: &str) -> Result<Self, Error> {
        Ok(toml::from_str(data)?)
    }

    /// Built-in helpers followed by the configured extras.
    pub fn helpers(&self) -> Vec<String> {
        DEFAULT_SANDBOX_HELPERS
            .iter()
            .map(|s| s.to_string())
            .chain(self.extra_helpers.iter().cloned())
            .collect()
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sqlsandbox").join("config.toml"))
}
