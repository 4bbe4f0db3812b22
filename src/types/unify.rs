//! Raw column type spelling → canonical name + [`BaseCategory`].
//!
//! The classifier is heuristic: it never fails, and unrecognized spellings
//! resolve to `(OTHER, Other)`.
use regex::Regex;
use std::sync::LazyLock;

use super::category::BaseCategory;

/// Result of resolving one raw type spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedType {
    pub canonical: String,
    pub category: BaseCategory,
}

impl UnifiedType {
    fn new(canonical: impl Into<String>, category: BaseCategory) -> Self {
        Self {
            canonical: canonical.into(),
            category,
        }
    }

    fn other() -> Self {
        Self::new("OTHER", BaseCategory::Other)
    }
}

/// Integer width families, most specific first. `int` must stay last so it
/// never shadows the sized spellings.
static INTEGER_FAMILIES: LazyLock<Vec<(Regex, &'static str, &'static str)>> =
    LazyLock::new(|| {
        [
            (r"\b(bit|tinyint|unsignedtinyint|int1|uint8)\b", "Int8", "UInt8"),
            (r"\b(smallint|unsignedsmallint|int2|smallserial)\b", "Int16", "UInt16"),
            (r"\b(mediumint|unsignedmediumint|int3|int24)\b", "Int24", "UInt24"),
            (r"\b(bigint|unsignedbigint|int8|long|bigserial)\b", "Int64", "UInt64"),
            (
                r"\b(int|unsignedint|unsignedinteger|integer|serial|int4)\b",
                "Int32",
                "UInt32",
            ),
        ]
        .into_iter()
        .map(|(pattern, signed, unsigned)| (word_regex(pattern), signed, unsigned))
        .collect()
    });

static FLOATING: LazyLock<Regex> = LazyLock::new(|| {
    word_regex(r"\b(float|float4|float8|double|doubleprecision|double\s+precision|real|decimal|dec|numeric|number)\b")
});
static ENUM_TYPE: LazyLock<Regex> = LazyLock::new(|| word_regex(r"\b(enum|set)\b"));
static TEXT_VARYING: LazyLock<Regex> = LazyLock::new(|| {
    word_regex(r"\b(char[ _]?varying|string|longvarchar|varchar|charactervarying|longtext|nvarchar|varchar2|nvarchar2|text|clob)\b")
});
// `mediumtext`, `tinytext` and `character varying` resolve to CHAR, matching
// the historical classification.
static TEXT_FIXED: LazyLock<Regex> = LazyLock::new(|| {
    word_regex(r"\b(char|nchar|bpchar|mediumtext|tinytext|character\s+varying)\b")
});
static BOOLEAN: LazyLock<Regex> =
    LazyLock::new(|| word_regex(r"\b(bool|boolean|boolean_char)\b"));
static DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    word_regex(r"\b(date|time|datetime|datetime2|time_stamp|timestamp|timestamptz|smalldatetime|timetz|interval)\b")
});
static BINARY: LazyLock<Regex> = LazyLock::new(|| {
    word_regex(r"\b(blob|binary|varbinary|bytea|image|longblob|mediumblob|tinyblob)\b")
});
static JSON_TYPE: LazyLock<Regex> = LazyLock::new(|| word_regex(r"\b(json|jsonb)\b"));
static UUID_TYPE: LazyLock<Regex> =
    LazyLock::new(|| word_regex(r"\b(uuid|uniqueidentifier)\b"));
static XML_TYPE: LazyLock<Regex> = LazyLock::new(|| word_regex(r"\b(xml)\b"));

static PRECISION_QUALIFIED: LazyLock<Regex> = LazyLock::new(|| {
    word_regex(r"^(number|decimal)\s*\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\)")
});
static QUALIFIER: LazyLock<Regex> = LazyLock::new(|| word_regex(r"\(.*\)"));

// Patterns are compile-time constants; a failure here is caught by the tests.
fn word_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid type pattern {pattern}: {e}"))
}

/// Resolve an optional raw type. `None` resolves to `(OTHER, Other)`.
pub fn unify_optional(raw_type: Option<&str>) -> UnifiedType {
    match raw_type {
        Some(raw) => unify_type(raw),
        None => UnifiedType::other(),
    }
}

/// Resolve a raw, dialect-specific type spelling.
pub fn unify_type(raw_type: &str) -> UnifiedType {
    let t = raw_type.trim().to_lowercase();
    if t.is_empty() {
        return UnifiedType::other();
    }

    if t == "array" {
        return UnifiedType::new("ARRAY", BaseCategory::Array);
    }

    // Bare arbitrary-precision numbers are treated as integers by convention.
    if matches!(t.as_str(), "number" | "numeric" | "decimal") {
        return UnifiedType::new(t.to_uppercase(), BaseCategory::Int);
    }

    if let Some(caps) = PRECISION_QUALIFIED.captures(&t) {
        let name = caps[1].to_uppercase();
        let precision = &caps[2];
        let scale = caps.get(3).map_or("0", |m| m.as_str());
        let category = if scale.parse::<u32>().unwrap_or(0) == 0 {
            BaseCategory::Int
        } else {
            BaseCategory::Float
        };
        return UnifiedType::new(format!("{name}({precision},{scale})"), category);
    }

    let t = QUALIFIER.replace_all(&t, "");
    let t = t.trim();
    if t.is_empty() {
        return UnifiedType::other();
    }

    // Known false positives: `uuid`, `uniqueidentifier`.
    let unsigned = t.contains("unsigned") || t.starts_with('u');

    for (pattern, signed_name, unsigned_name) in INTEGER_FAMILIES.iter() {
        if pattern.is_match(t) {
            let name = if unsigned { unsigned_name } else { signed_name };
            return UnifiedType::new(*name, BaseCategory::Int);
        }
    }

    if FLOATING.is_match(t) {
        return UnifiedType::new("Float", BaseCategory::Float);
    }
    if ENUM_TYPE.is_match(t) {
        return UnifiedType::new("Enum", BaseCategory::Enum);
    }
    if TEXT_VARYING.is_match(t) {
        return UnifiedType::new("VARCHAR", BaseCategory::Text);
    }
    if TEXT_FIXED.is_match(t) {
        return UnifiedType::new("CHAR", BaseCategory::Text);
    }
    if BOOLEAN.is_match(t) {
        return UnifiedType::new("Boolean", BaseCategory::Boolean);
    }
    if DATE_TIME.is_match(t) {
        return UnifiedType::new("Timestamp", BaseCategory::DateTime);
    }
    if BINARY.is_match(t) {
        return UnifiedType::new("Binary", BaseCategory::Binary);
    }
    if JSON_TYPE.is_match(t) {
        return UnifiedType::new("JSON", BaseCategory::Json);
    }
    // UUIDs land in Int, mirroring the historical classification.
    if UUID_TYPE.is_match(t) {
        return UnifiedType::new("UUID", BaseCategory::Int);
    }
    if XML_TYPE.is_match(t) {
        return UnifiedType::new("XML", BaseCategory::Xml);
    }

    UnifiedType::other()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(raw: &str) -> BaseCategory {
        unify_type(raw).category
    }

    fn canonical(raw: &str) -> String {
        unify_type(raw).canonical
    }

    #[test]
    fn test_total_on_degenerate_input() {
        for raw in ["", "   ", "()", "(((", "???", "zzz", "\u{1F600}", "u"] {
            let unified = unify_type(raw);
            assert!(!unified.canonical.is_empty(), "empty canonical for {raw:?}");
        }
        assert_eq!(unify_type(""), UnifiedType::other());
        assert_eq!(unify_type("not a type"), UnifiedType::other());
        assert_eq!(unify_optional(None), UnifiedType::other());
    }

    #[test]
    fn test_array_literal() {
        assert_eq!(
            unify_type("ARRAY"),
            UnifiedType::new("ARRAY", BaseCategory::Array)
        );
        assert_eq!(category(" array "), BaseCategory::Array);
    }

    #[test]
    fn test_eight_bit_spellings() {
        for raw in ["tinyint", "TINYINT", "int1", "bit", "tinyint(1)"] {
            assert_eq!(unify_type(raw), UnifiedType::new("Int8", BaseCategory::Int));
        }
        assert_eq!(canonical("tinyint(1) unsigned"), "UInt8");
        assert_eq!(canonical("unsigned tinyint"), "UInt8");
        assert_eq!(canonical("uint8"), "UInt8");
    }

    #[test]
    fn test_integer_widths() {
        assert_eq!(canonical("smallint"), "Int16");
        assert_eq!(canonical("mediumint(9)"), "Int24");
        assert_eq!(canonical("bigint(20) unsigned"), "UInt64");
        assert_eq!(canonical("int8"), "Int64");
        assert_eq!(canonical("INTEGER"), "Int32");
        assert_eq!(canonical("int(10) unsigned"), "UInt32");
        assert_eq!(canonical("serial"), "Int32");
        assert_eq!(canonical("bigserial"), "Int64");
        assert_eq!(category("int4"), BaseCategory::Int);
    }

    #[test]
    fn test_bare_numbers_are_int() {
        assert_eq!(
            unify_type("NUMERIC"),
            UnifiedType::new("NUMERIC", BaseCategory::Int)
        );
        assert_eq!(category("number"), BaseCategory::Int);
        assert_eq!(category("decimal"), BaseCategory::Int);
    }

    #[test]
    fn test_precision_qualified_numbers() {
        assert_eq!(
            unify_type("decimal(10,2)"),
            UnifiedType::new("DECIMAL(10,2)", BaseCategory::Float)
        );
        assert_eq!(
            unify_type("NUMBER( 10 , 0 )"),
            UnifiedType::new("NUMBER(10,0)", BaseCategory::Int)
        );
        assert_eq!(
            unify_type("number(5)"),
            UnifiedType::new("NUMBER(5,0)", BaseCategory::Int)
        );
        assert_eq!(category("decimal(5,2) unsigned"), BaseCategory::Float);
        // numeric(p,s) goes through the floating family
        assert_eq!(
            unify_type("numeric(10,2)"),
            UnifiedType::new("Float", BaseCategory::Float)
        );
    }

    #[test]
    fn test_floats() {
        for raw in ["float", "double", "double precision", "real", "float8"] {
            assert_eq!(unify_type(raw), UnifiedType::new("Float", BaseCategory::Float));
        }
    }

    #[test]
    fn test_enum_and_set() {
        assert_eq!(category("enum('a','b')"), BaseCategory::Enum);
        assert_eq!(category("set('x')"), BaseCategory::Enum);
    }

    #[test]
    fn test_text_families() {
        assert_eq!(canonical("varchar(255)"), "VARCHAR");
        assert_eq!(canonical("text"), "VARCHAR");
        assert_eq!(canonical("char varying"), "VARCHAR");
        assert_eq!(canonical("nvarchar2"), "VARCHAR");
        assert_eq!(canonical("clob"), "VARCHAR");
        assert_eq!(canonical("char(2)"), "CHAR");
        assert_eq!(canonical("bpchar"), "CHAR");
        assert_eq!(category("longtext"), BaseCategory::Text);
    }

    #[test]
    fn test_historical_fixed_text_spellings() {
        assert_eq!(canonical("mediumtext"), "CHAR");
        assert_eq!(canonical("tinytext"), "CHAR");
        assert_eq!(canonical("character varying(40)"), "CHAR");
        assert_eq!(category("character varying(40)"), BaseCategory::Text);
        assert_eq!(unify_type("character(10)"), UnifiedType::other());
    }

    #[test]
    fn test_other_families() {
        assert_eq!(category("boolean"), BaseCategory::Boolean);
        assert_eq!(category("bool"), BaseCategory::Boolean);
        assert_eq!(category("datetime(6)"), BaseCategory::DateTime);
        assert_eq!(category("timestamp with time zone"), BaseCategory::DateTime);
        assert_eq!(canonical("date"), "Timestamp");
        assert_eq!(category("bytea"), BaseCategory::Binary);
        assert_eq!(category("longblob"), BaseCategory::Binary);
        assert_eq!(category("jsonb"), BaseCategory::Json);
        assert_eq!(category("xml"), BaseCategory::Xml);
    }

    #[test]
    fn test_uuid_maps_to_int() {
        assert_eq!(unify_type("uuid"), UnifiedType::new("UUID", BaseCategory::Int));
        assert_eq!(
            unify_type("uniqueidentifier"),
            UnifiedType::new("UUID", BaseCategory::Int)
        );
    }

    #[test]
    fn test_unsigned_prefix_heuristic() {
        assert_eq!(canonical("smallint unsigned"), "UInt16");
        assert_eq!(canonical("unsigned int"), "UInt32");
        // a leading `u` only matters once a family matches as a whole word
        assert_eq!(canonical("uint"), "OTHER");
        assert_eq!(canonical("u bigint"), "UInt64");
    }
}
