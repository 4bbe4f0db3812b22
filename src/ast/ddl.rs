/// CREATE TABLE → [`TableShape`] extraction.
///
/// Harvested DDL is mostly MySQL-flavored; two spellings the parser rejects
/// are rewritten first (`decimal(p,s) unsigned`, `zerofill`).
use regex::Regex;
use sqlparser::ast as sp;
use std::sync::LazyLock;

use super::parser::parse_single;
use crate::error::StatementError;
use crate::model::{ColumnShape, TableShape};

static UNSIGNED_DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(decimal\s*\(\s*\d+\s*,\s*\d+\s*\))\s*unsigned").unwrap_or_else(|e| {
        panic!("invalid decimal pattern: {e}");
    })
});
static ZEROFILL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bzerofill\b").unwrap_or_else(|e| panic!("invalid zerofill pattern: {e}"))
});

pub fn rewrite_for_parsing(sql: &str) -> String {
    let sql = UNSIGNED_DECIMAL.replace_all(sql, "${1}");
    ZEROFILL.replace_all(&sql, "").into_owned()
}

/// Extract the table shape declared by a CREATE TABLE statement.
///
/// The table name is lower-cased with its qualifier kept (`schema.table`).
/// Column names keep their original quoting.
pub fn table_shape_from_create(sql: &str) -> Result<TableShape, StatementError> {
    let statement = parse_single(&rewrite_for_parsing(sql))?;
    let create = match statement {
        sp::Statement::CreateTable(create) => create,
        other => {
            return Err(StatementError::Parse(format!(
                "not a CREATE TABLE statement: {}",
                statement_keyword(&other)
            )))
        }
    };

    let table_name = create
        .name
        .0
        .iter()
        .map(|ident| ident.value.clone())
        .collect::<Vec<_>>()
        .join(".")
        .to_lowercase();
    if table_name.is_empty() {
        return Err(StatementError::Parse("CREATE TABLE without a name".into()));
    }

    let columns = create
        .columns
        .iter()
        .map(|column| ColumnShape {
            column_id: None,
            column_name: column.name.to_string(),
            column_base_type_raw: Some(column.data_type.to_string()),
        })
        .collect();

    Ok(TableShape {
        table_id: None,
        table_name,
        columns,
    })
}

/// Unqualified, unquoted, lower-cased name used to detect duplicates.
pub fn bare_table_name(name: &str) -> String {
    name.rsplit('.')
        .next()
        .unwrap_or(name)
        .trim_matches(|c| matches!(c, '`' | '"' | '\'' | '[' | ']'))
        .to_lowercase()
}

fn statement_keyword(statement: &sp::Statement) -> String {
    statement
        .to_string()
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}
