use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed semantic classification of a column type.
///
/// Every mapping over this enum is an exhaustive `match`; adding a variant
/// forces every sandbox mapping below to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseCategory {
    Int,
    Float,
    Text,
    Boolean,
    DateTime,
    Binary,
    #[serde(rename = "JSON")]
    Json,
    #[serde(rename = "UUID")]
    Uuid,
    #[serde(rename = "XML")]
    Xml,
    Enum,
    #[serde(rename = "ARRAY")]
    Array,
    #[serde(rename = "OTHER")]
    Other,
}

impl BaseCategory {
    pub const ALL: [BaseCategory; 12] = [
        BaseCategory::Int,
        BaseCategory::Float,
        BaseCategory::Text,
        BaseCategory::Boolean,
        BaseCategory::DateTime,
        BaseCategory::Binary,
        BaseCategory::Json,
        BaseCategory::Uuid,
        BaseCategory::Xml,
        BaseCategory::Enum,
        BaseCategory::Array,
        BaseCategory::Other,
    ];

    /// Column type used when the category is materialized in a sandbox.
    ///
    /// `XML` and `OTHER` are type aliases the sandbox installs at open time.
    pub fn sandbox_type(&self) -> &'static str {
        match self {
            BaseCategory::Int => "INTEGER",
            BaseCategory::Float => "DOUBLE",
            BaseCategory::Text => "VARCHAR",
            BaseCategory::Boolean => "BOOLEAN",
            BaseCategory::DateTime => "TIMESTAMP",
            BaseCategory::Binary => "BLOB",
            BaseCategory::Json => "JSON",
            BaseCategory::Uuid => "UUID",
            BaseCategory::Xml => "XML",
            BaseCategory::Enum => "VARCHAR",
            BaseCategory::Array => "VARCHAR[]",
            BaseCategory::Other => "OTHER",
        }
    }

    /// Non-null literal used for the first seed row of a synthesized table.
    pub fn example_literal(&self) -> &'static str {
        match self {
            BaseCategory::Int => "42",
            BaseCategory::Float => "3.14",
            BaseCategory::Text => "'example'",
            BaseCategory::Boolean => "TRUE",
            BaseCategory::DateTime => "TIMESTAMP '2024-01-01 12:00:00'",
            BaseCategory::Binary => "'\\xAA\\xBB'::BLOB",
            BaseCategory::Json => "'{\"key\":\"value\"}'",
            BaseCategory::Uuid => "'123e4567-e89b-12d3-a456-426614174000'",
            BaseCategory::Xml => "'<example/>'",
            BaseCategory::Enum => "'example_label'",
            BaseCategory::Array => "['example']",
            BaseCategory::Other => "'example'",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, BaseCategory::Int | BaseCategory::Float)
    }

    pub fn label(&self) -> &'static str {
        match self {
            BaseCategory::Int => "Int",
            BaseCategory::Float => "Float",
            BaseCategory::Text => "Text",
            BaseCategory::Boolean => "Boolean",
            BaseCategory::DateTime => "DateTime",
            BaseCategory::Binary => "Binary",
            BaseCategory::Json => "JSON",
            BaseCategory::Uuid => "UUID",
            BaseCategory::Xml => "XML",
            BaseCategory::Enum => "Enum",
            BaseCategory::Array => "ARRAY",
            BaseCategory::Other => "OTHER",
        }
    }
}

impl fmt::Display for BaseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
