use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::ast::ddl::bare_table_name;
use crate::ast::{table_shape_from_create, Normalizer};
use crate::config::ValidatorConfig;
use crate::error::Error;
use crate::export::{SchemaErrorRecord, ValidationError, ValidationSink, ValidationSuccess};
use crate::model::{RepositoryInput, TableShape};
use crate::sandbox::{Sandbox, SchemaSynthesizer};
use crate::validator::{ExecutionValidator, ValidationResult};

/// Record ids, one sequence per stream. Both start at 1 and advance exactly
/// once per emitted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCounters {
    next_success: u64,
    next_error: u64,
}

impl Default for IdCounters {
    fn default() -> Self {
        Self {
            next_success: 1,
            next_error: 1,
        }
    }
}

impl IdCounters {
    pub fn next_success(&mut self) -> u64 {
        let id = self.next_success;
        self.next_success += 1;
        id
    }

    pub fn next_error(&mut self) -> u64 {
        let id = self.next_error;
        self.next_error += 1;
        id
    }

    /// Number of ids handed out so far, per stream.
    pub fn issued(&self) -> (u64, u64) {
        (self.next_success - 1, self.next_error - 1)
    }
}

/// Counts for one repository pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySummary {
    pub repo_id: i64,
    pub tables_materialized: usize,
    pub tables_failed: usize,
    pub create_statements_skipped: usize,
    pub queries_succeeded: usize,
    pub queries_failed: usize,
}

/// Counts across every pass of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub repositories: usize,
    pub tables_materialized: usize,
    pub tables_failed: usize,
    pub queries_succeeded: usize,
    pub queries_failed: usize,
}

impl RunTotals {
    pub fn add(&mut self, summary: &RepositorySummary) {
        self.repositories += 1;
        self.tables_materialized += summary.tables_materialized;
        self.tables_failed += summary.tables_failed;
        self.queries_succeeded += summary.queries_succeeded;
        self.queries_failed += summary.queries_failed;
    }

    pub fn queries(&self) -> usize {
        self.queries_succeeded + self.queries_failed
    }
}

/// Drives repositories through synthesis and validation, one at a time,
/// each in its own sandbox.
pub struct Orchestrator<S: ValidationSink> {
    config: ValidatorConfig,
    normalizer: Normalizer,
    counters: IdCounters,
    totals: RunTotals,
    sink: S,
}

impl<S: ValidationSink> Orchestrator<S> {
    pub fn new(config: ValidatorConfig, sink: S) -> Self {
        let normalizer = Normalizer::with_placeholder_name(&config.placeholder_name);
        Self {
            config,
            normalizer,
            counters: IdCounters::default(),
            totals: RunTotals::default(),
            sink,
        }
    }

    pub fn totals(&self) -> &RunTotals {
        &self.totals
    }

    pub fn counters(&self) -> &IdCounters {
        &self.counters
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run one repository end to end.
    ///
    /// Per-table and per-statement failures become records; only sandbox
    /// and sink failures are returned as errors.
    pub fn process_repository(
        &mut self,
        repo: &RepositoryInput,
    ) -> Result<RepositorySummary, Error> {
        let mut summary = RepositorySummary {
            repo_id: repo.repo_id,
            ..Default::default()
        };

        let sandbox = Sandbox::open(repo.repo_id)?;
        sandbox.install_helpers(&self.config.helpers());
        sandbox.prepare_for_explain(&self.config.disabled_optimizers)?;

        let (shapes, skipped) = collect_table_shapes(repo);
        summary.create_statements_skipped = skipped;

        let mut synthesizer = SchemaSynthesizer::new(&sandbox);
        if !self.config.seed_tables {
            synthesizer = synthesizer.without_seed();
        }
        let synthesis = synthesizer.synthesize(&shapes);
        summary.tables_materialized = synthesis.tables.len();
        summary.tables_failed = synthesis.errors.len();
        for error in &synthesis.errors {
            self.sink
                .record_schema_error(&SchemaErrorRecord::from(error))?;
        }

        let validator = ExecutionValidator::new(&sandbox, &self.normalizer, &self.config);
        for statement in &repo.statements {
            match validator.validate(&statement.raw_sql) {
                ValidationResult::Success {
                    original_sql,
                    executable_sql,
                    plans,
                } => {
                    summary.queries_succeeded += 1;
                    self.sink.record_success(&ValidationSuccess {
                        id: self.counters.next_success(),
                        query_id: statement.query_id,
                        original_sql,
                        executable_sql,
                        logical_plan: plans.logical_plan,
                        logical_plan_optimized: plans.logical_plan_optimized,
                        physical_plan: plans.physical_plan,
                    })?;
                }
                ValidationResult::Failure {
                    original_sql,
                    executable_sql,
                    stage,
                    error,
                } => {
                    summary.queries_failed += 1;
                    debug!(query_id = statement.query_id, stage = stage.label(), "query failed");
                    self.sink.record_error(&ValidationError {
                        id: self.counters.next_error(),
                        repo_id: repo.repo_id,
                        repo_url: repo.repo_url.clone(),
                        query_id: statement.query_id,
                        error_message: error.to_string(),
                        error_kind: error.kind_label(),
                        original_sql,
                        executable_sql,
                    })?;
                }
            }
        }

        self.sink.flush()?;
        sandbox.close()?;

        info!(
            repo_id = repo.repo_id,
            tables = summary.tables_materialized,
            tables_failed = summary.tables_failed,
            succeeded = summary.queries_succeeded,
            failed = summary.queries_failed,
            "repository validated"
        );
        self.totals.add(&summary);
        Ok(summary)
    }
}

/// Provided table shapes, followed by shapes parsed from the raw CREATE
/// statements for tables not already provided. Returns the shapes and the
/// number of CREATE statements that could not be parsed.
pub fn collect_table_shapes(repo: &RepositoryInput) -> (Vec<TableShape>, usize) {
    let mut shapes = repo.tables.clone();
    let mut known: HashSet<String> = shapes
        .iter()
        .map(|t| bare_table_name(&t.table_name))
        .collect();
    let mut skipped = 0;

    for sql in &repo.create_statements {
        match table_shape_from_create(sql) {
            Ok(shape) => {
                if known.insert(bare_table_name(&shape.table_name)) {
                    shapes.push(shape);
                }
            }
            Err(e) => {
                warn!(repo_id = repo.repo_id, error = %e, "unparsable CREATE TABLE");
                skipped += 1;
            }
        }
    }
    (shapes, skipped)
}
