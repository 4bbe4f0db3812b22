/// Execution validation: one statement, one pass, one terminal result.
///
/// ```text
/// Received → Normalized → Parsed → Neutralized → Explained → Success
///                            ↘           ↘            ↘
///                                       Failure
/// ```
///
/// Failures are values, never panics or errors: a bad statement cannot
/// abort its siblings.
use tracing::debug;

use crate::ast::{neutralize, parse_single, Normalizer};
use crate::config::ValidatorConfig;
use crate::error::StatementError;
use crate::explain::{operator_names, PlanDocuments};
use crate::sandbox::Sandbox;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    Received,
    Normalized,
    Parsed,
    Neutralized,
    Explained,
}

impl ValidationStage {
    pub fn label(&self) -> &'static str {
        match self {
            ValidationStage::Received => "received",
            ValidationStage::Normalized => "normalized",
            ValidationStage::Parsed => "parsed",
            ValidationStage::Neutralized => "neutralized",
            ValidationStage::Explained => "explained",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Success {
        original_sql: String,
        executable_sql: String,
        plans: PlanDocuments,
    },
    Failure {
        original_sql: String,
        /// Set once neutralization produced a rewritten statement.
        executable_sql: Option<String>,
        /// The stage that failed.
        stage: ValidationStage,
        error: StatementError,
    },
}

impl ValidationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationResult::Success { .. })
    }

    pub fn original_sql(&self) -> &str {
        match self {
            ValidationResult::Success { original_sql, .. }
            | ValidationResult::Failure { original_sql, .. } => original_sql,
        }
    }

    pub fn executable_sql(&self) -> Option<&str> {
        match self {
            ValidationResult::Success { executable_sql, .. } => Some(executable_sql),
            ValidationResult::Failure { executable_sql, .. } => executable_sql.as_deref(),
        }
    }
}

/// Validates statements against one prepared sandbox.
pub struct ExecutionValidator<'a> {
    sandbox: &'a Sandbox,
    normalizer: &'a Normalizer,
    explain_format: String,
}

impl<'a> ExecutionValidator<'a> {
    /// The sandbox must already have had its optimizers configured
    /// (see [`Sandbox::prepare_for_explain`]).
    pub fn new(sandbox: &'a Sandbox, normalizer: &'a Normalizer, config: &ValidatorConfig) -> Self {
        Self {
            sandbox,
            normalizer,
            explain_format: config.explain_format.clone(),
        }
    }

    /// Normalize the raw SQL and neutralize its placeholders, yielding the
    /// text that will be explained.
    pub fn prepare(&self, raw_sql: &str) -> Result<String, (ValidationStage, StatementError)> {
        let normalized = self.normalizer.normalize(raw_sql);
        let mut statement =
            parse_single(&normalized).map_err(|e| (ValidationStage::Parsed, e))?;
        let report = neutralize(&mut statement);
        debug!(placeholders = report.total(), "neutralized");
        Ok(statement.to_string())
    }

    pub fn validate(&self, raw_sql: &str) -> ValidationResult {
        let failure = |executable_sql: Option<String>,
                       stage: ValidationStage,
                       error: StatementError| ValidationResult::Failure {
            original_sql: raw_sql.to_string(),
            executable_sql,
            stage,
            error,
        };

        let executable_sql = match self.prepare(raw_sql) {
            Ok(sql) => sql,
            Err((stage, error)) => {
                debug!(stage = stage.label(), %error, "statement rejected");
                return failure(None, stage, error);
            }
        };

        let rows = match self.sandbox.explain(&executable_sql, &self.explain_format) {
            Ok(rows) => rows,
            Err(e) => {
                let error = StatementError::execution(&e);
                debug!(sql = %executable_sql, %error, "explain failed");
                return failure(Some(executable_sql), ValidationStage::Explained, error);
            }
        };

        match PlanDocuments::from_rows(rows) {
            Ok(plans) => {
                debug!(
                    sql = %executable_sql,
                    operators = operator_names(&plans.physical_plan).len(),
                    "statement validated"
                );
                ValidationResult::Success {
                    original_sql: raw_sql.to_string(),
                    executable_sql,
                    plans,
                }
            }
            Err(error) => failure(Some(executable_sql), ValidationStage::Explained, error),
        }
    }
}
