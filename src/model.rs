//! Inputs handed over by the schema and statement providers, and the
//! resolved column/table shapes built from them for one repository pass.
use serde::{Deserialize, Serialize};

use crate::types::{classify_column, unify_optional, BaseCategory, SemanticType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnShape {
    /// Absent for columns extracted from CREATE TABLE statements.
    #[serde(default)]
    pub column_id: Option<i64>,
    pub column_name: String,
    #[serde(default)]
    pub column_base_type_raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableShape {
    #[serde(default)]
    pub table_id: Option<i64>,
    pub table_name: String,
    #[serde(default)]
    pub columns: Vec<ColumnShape>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub query_id: i64,
    pub raw_sql: String,
}

/// Everything the validator receives for one repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInput {
    pub repo_id: i64,
    #[serde(default)]
    pub repo_url: String,
    #[serde(default)]
    pub tables: Vec<TableShape>,
    #[serde(default)]
    pub statements: Vec<Statement>,
    /// Raw CREATE TABLE statements harvested alongside the SELECTs.
    #[serde(default)]
    pub create_statements: Vec<String>,
}

/// A column with its type resolved. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub id: Option<i64>,
    pub name: String,
    pub raw_type: Option<String>,
    pub canonical_type: String,
    pub category: BaseCategory,
    pub semantic: Option<SemanticType>,
}

impl Column {
    pub fn resolve(shape: &ColumnShape) -> Self {
        let unified = unify_optional(shape.column_base_type_raw.as_deref());
        let name = normalize_identifier(&shape.column_name);
        let semantic = classify_column(name.trim_matches('"'), unified.category);
        Self {
            id: shape.column_id,
            name,
            raw_type: shape.column_base_type_raw.clone(),
            canonical_type: unified.canonical,
            category: unified.category,
            semantic,
        }
    }

    /// Column definition fragment for sandbox DDL.
    pub fn definition(&self) -> String {
        format!("{} {}", self.name, self.category.sandbox_type())
    }
}

/// A table shape with resolved columns and a split qualified name.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub id: Option<i64>,
    pub schema: Option<String>,
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn resolve(shape: &TableShape) -> Self {
        let (schema, name) = split_qualified_name(&shape.table_name);
        Self {
            id: shape.table_id,
            schema,
            name,
            columns: shape.columns.iter().map(Column::resolve).collect(),
        }
    }

    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Rewrite backtick or single-quote wrapping to double-quote wrapping.
/// Bare identifiers are returned trimmed but otherwise untouched.
pub fn normalize_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['`', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            let inner = &trimmed[1..trimmed.len() - 1];
            return format!("\"{}\"", inner.replace('"', "\"\""));
        }
    }
    trimmed.to_string()
}

/// Split `schema.name` at the first dot. Each part is identifier-normalized.
pub fn split_qualified_name(raw: &str) -> (Option<String>, String) {
    match raw.trim().split_once('.') {
        Some((schema, name)) if !schema.trim().is_empty() && !name.trim().is_empty() => (
            Some(normalize_identifier(schema)),
            normalize_identifier(name),
        ),
        _ => (None, normalize_identifier(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, raw: Option<&str>) -> ColumnShape {
        ColumnShape {
            column_id: Some(1),
            column_name: name.to_string(),
            column_base_type_raw: raw.map(str::to_string),
        }
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("`order`"), "\"order\"");
        assert_eq!(normalize_identifier("'name'"), "\"name\"");
        assert_eq!(normalize_identifier("\"id\""), "\"id\"");
        assert_eq!(normalize_identifier("  plain "), "plain");
        assert_eq!(normalize_identifier("`"), "`");
    }

    #[test]
    fn test_split_qualified_name() {
        assert_eq!(
            split_qualified_name("shop.orders"),
            (Some("shop".to_string()), "orders".to_string())
        );
        assert_eq!(
            split_qualified_name("`shop`.`orders`"),
            (Some("\"shop\"".to_string()), "\"orders\"".to_string())
        );
        assert_eq!(split_qualified_name("orders"), (None, "orders".to_string()));
        assert_eq!(split_qualified_name(".orders"), (None, ".orders".to_string()));
    }

    #[test]
    fn test_column_resolution() {
        let c = Column::resolve(&column("`price`", Some("decimal(10,2)")));
        assert_eq!(c.name, "\"price\"");
        assert_eq!(c.canonical_type, "DECIMAL(10,2)");
        assert_eq!(c.category, BaseCategory::Float);
        assert_eq!(c.semantic, Some(SemanticType::Amount));
        assert_eq!(c.definition(), "\"price\" DOUBLE");

        let missing = Column::resolve(&column("blob", None));
        assert_eq!(missing.category, BaseCategory::Other);
        assert_eq!(missing.canonical_type, "OTHER");
    }

    #[test]
    fn test_table_resolution() {
        let shape = TableShape {
            table_id: Some(7),
            table_name: "app.users".to_string(),
            columns: vec![column("id", Some("int")), column("name", Some("text"))],
        };
        let table = Table::resolve(&shape);
        assert_eq!(table.schema.as_deref(), Some("app"));
        assert_eq!(table.name, "users");
        assert_eq!(table.qualified_name(), "app.users");
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[1].category, BaseCategory::Text);
    }

    #[test]
    fn test_repository_input_defaults() {
        let json = r#"{"repo_id": 3, "statements": [{"query_id": 1, "raw_sql": "SELECT 1"}]}"#;
        let input: RepositoryInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.repo_id, 3);
        assert!(input.tables.is_empty());
        assert!(input.create_statements.is_empty());
        assert_eq!(input.statements[0].raw_sql, "SELECT 1");
    }
}
