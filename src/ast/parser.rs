/// Dialect-neutral statement parsing on top of `sqlparser`.
use sqlparser::ast as sp;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser as SqlParser;

use crate::error::StatementError;

/// Parse all statements in `sql`.
pub fn parse_sql(sql: &str) -> Result<Vec<sp::Statement>, StatementError> {
    let dialect = GenericDialect {};
    SqlParser::parse_sql(&dialect, sql).map_err(|e| StatementError::Parse(e.to_string()))
}

/// Parse exactly one statement. Empty input and multi-statement input are
/// both parse errors.
pub fn parse_single(sql: &str) -> Result<sp::Statement, StatementError> {
    let mut statements = parse_sql(sql)?;
    if statements.len() != 1 {
        return Err(StatementError::Parse(format!(
            "expected 1 statement, found {}",
            statements.len()
        )));
    }
    Ok(statements.remove(0))
}
