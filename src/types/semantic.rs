use serde::{Deserialize, Serialize};

use super::category::BaseCategory;

/// Coarse meaning of a column, guessed from its name and category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemanticType {
    Id,
    Amount,
    Count,
    Date,
    Name,
    Password,
    Email,
    Url,
    Status,
    Address,
    Category,
    FullText,
    Boolean,
    Timestamp,
    Binary,
    Json,
}

/// Name rules in priority order; the first rule with a matching keyword wins.
const NAME_RULES: &[(SemanticType, &[&str])] = &[
    (SemanticType::Id, &["id", "uuid", "guid"]),
    (
        SemanticType::Amount,
        &[
            "amount", "price", "cost", "value", "budget", "fee", "salary", "revenue", "expense",
        ],
    ),
    (SemanticType::Count, &["count", "quantity", "number", "total"]),
    (
        SemanticType::Date,
        &[
            "date", "time", "timestamp", "created", "updated", "month", "year", "day", "_at",
        ],
    ),
    (SemanticType::Name, &["name", "title"]),
    (
        SemanticType::Password,
        &["password", "passcode", "secret", "token"],
    ),
    (SemanticType::Email, &["email"]),
    (SemanticType::Url, &["url", "link"]),
    (SemanticType::Status, &["status", "state"]),
    (
        SemanticType::Address,
        &["address", "location", "city", "country", "zip", "postal", "street"],
    ),
    (SemanticType::Category, &["category", "type", "kind"]),
    (
        SemanticType::FullText,
        &["text", "description", "content", "body", "summary", "note", "comment"],
    ),
];

pub fn classify_column(column_name: &str, category: BaseCategory) -> Option<SemanticType> {
    match category {
        BaseCategory::Boolean => return Some(SemanticType::Boolean),
        BaseCategory::DateTime => return Some(SemanticType::Timestamp),
        _ => {}
    }

    let name = column_name.to_lowercase();
    for (semantic, keywords) in NAME_RULES {
        if !keywords.iter().any(|k| name.contains(k)) {
            continue;
        }
        // "price" stored as VARCHAR is not an amount
        if matches!(semantic, SemanticType::Amount | SemanticType::Count) && !category.is_numeric()
        {
            continue;
        }
        return Some(*semantic);
    }

    match category {
        BaseCategory::Binary => Some(SemanticType::Binary),
        BaseCategory::Json => Some(SemanticType::Json),
        _ => None,
    }
}
