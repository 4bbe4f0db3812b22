use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::SinkError;
use crate::sandbox::SchemaError;

pub const SUCCESS_FILE: &str = "validation_success.jsonl";
pub const ERROR_FILE: &str = "validation_errors.jsonl";
pub const SCHEMA_ERROR_FILE: &str = "schema_errors.jsonl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSuccess {
    pub id: u64,
    pub query_id: i64,
    pub original_sql: String,
    pub executable_sql: String,
    pub logical_plan: Value,
    pub logical_plan_optimized: Value,
    pub physical_plan: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub id: u64,
    pub repo_id: i64,
    pub repo_url: String,
    pub query_id: i64,
    pub error_message: String,
    pub error_kind: String,
    pub original_sql: String,
    pub executable_sql: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaErrorRecord {
    pub repo_id: i64,
    pub table_name: String,
    pub message: String,
    pub generated_ddl: String,
}

impl From<&SchemaError> for SchemaErrorRecord {
    fn from(e: &SchemaError) -> Self {
        Self {
            repo_id: e.repo_id,
            table_name: e.table_name.clone(),
            message: e.message.clone(),
            generated_ddl: e.generated_ddl.clone(),
        }
    }
}

/// Append-only destination for validation records.
pub trait ValidationSink {
    fn record_success(&mut self, record: &ValidationSuccess) -> Result<(), SinkError>;

    fn record_error(&mut self, record: &ValidationError) -> Result<(), SinkError>;

    fn record_schema_error(&mut self, _record: &SchemaErrorRecord) -> Result<(), SinkError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub successes: Vec<ValidationSuccess>,
    pub errors: Vec<ValidationError>,
    pub schema_errors: Vec<SchemaErrorRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ValidationSink for MemorySink {
    fn record_success(&mut self, record: &ValidationSuccess) -> Result<(), SinkError> {
        self.successes.push(record.clone());
        Ok(())
    }

    fn record_error(&mut self, record: &ValidationError) -> Result<(), SinkError> {
        self.errors.push(record.clone());
        Ok(())
    }

    fn record_schema_error(&mut self, record: &SchemaErrorRecord) -> Result<(), SinkError> {
        self.schema_errors.push(record.clone());
        Ok(())
    }
}

/// One JSON document per line, one file per record stream. Files are opened
/// in append mode so successive runs accumulate.
pub struct JsonLinesSink {
    dir: PathBuf,
    successes: BufWriter<File>,
    errors: BufWriter<File>,
    schema_errors: BufWriter<File>,
}

impl JsonLinesSink {
    pub fn create(dir: &Path) -> Result<Self, SinkError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            successes: open_append(&dir.join(SUCCESS_FILE))?,
            errors: open_append(&dir.join(ERROR_FILE))?,
            schema_errors: open_append(&dir.join(SCHEMA_ERROR_FILE))?,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn open_append(path: &Path) -> Result<BufWriter<File>, SinkError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}

fn write_line<T: Serialize>(out: &mut BufWriter<File>, record: &T) -> Result<(), SinkError> {
    serde_json::to_writer(&mut *out, record)?;
    out.write_all(b"\n")?;
    Ok(())
}

impl ValidationSink for JsonLinesSink {
    fn record_success(&mut self, record: &ValidationSuccess) -> Result<(), SinkError> {
        write_line(&mut self.successes, record)
    }

    fn record_error(&mut self, record: &ValidationError) -> Result<(), SinkError> {
        write_line(&mut self.errors, record)
    }

    fn record_schema_error(&mut self, record: &SchemaErrorRecord) -> Result<(), SinkError> {
        write_line(&mut self.schema_errors, record)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.successes.flush()?;
        self.errors.flush()?;
        self.schema_errors.flush()?;
        Ok(())
    }
}
