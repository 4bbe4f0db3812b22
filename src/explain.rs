use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StatementError;

/// Planning stage reported by the engine's `EXPLAIN` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStage {
    Logical,
    LogicalOptimized,
    Physical,
}

impl PlanStage {
    /// Map the engine's stage key (`logical_plan`, `logical_opt`,
    /// `physical_plan`) to a stage.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        if key.contains("physical") {
            Some(PlanStage::Physical)
        } else if key.contains("unopt") {
            Some(PlanStage::Logical)
        } else if key.contains("opt") {
            Some(PlanStage::LogicalOptimized)
        } else if key.contains("logical") {
            Some(PlanStage::Logical)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlanStage::Logical => "logical_plan",
            PlanStage::LogicalOptimized => "logical_plan_optimized",
            PlanStage::Physical => "physical_plan",
        }
    }
}

/// The three plan documents captured for one successful statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocuments {
    pub logical_plan: Value,
    pub logical_plan_optimized: Value,
    pub physical_plan: Value,
}

impl PlanDocuments {
    /// Assemble from `(stage key, document)` rows. Documents that are not
    /// valid JSON are kept verbatim as JSON strings. Every stage must be
    /// present.
    pub fn from_rows<I, K, V>(rows: I) -> Result<Self, StatementError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut logical = None;
        let mut optimized = None;
        let mut physical = None;

        for (key, document) in rows {
            let Some(stage) = PlanStage::from_key(key.as_ref()) else {
                continue;
            };
            let value = parse_document(document.as_ref());
            match stage {
                PlanStage::Logical => logical = Some(value),
                PlanStage::LogicalOptimized => optimized = Some(value),
                PlanStage::Physical => physical = Some(value),
            }
        }

        Ok(Self {
            logical_plan: logical.ok_or_else(|| missing(PlanStage::Logical))?,
            logical_plan_optimized: optimized
                .ok_or_else(|| missing(PlanStage::LogicalOptimized))?,
            physical_plan: physical.ok_or_else(|| missing(PlanStage::Physical))?,
        })
    }

    pub fn get(&self, stage: PlanStage) -> &Value {
        match stage {
            PlanStage::Logical => &self.logical_plan,
            PlanStage::LogicalOptimized => &self.logical_plan_optimized,
            PlanStage::Physical => &self.physical_plan,
        }
    }
}

fn parse_document(document: &str) -> Value {
    serde_json::from_str(document).unwrap_or_else(|_| Value::String(document.to_string()))
}

fn missing(stage: PlanStage) -> StatementError {
    StatementError::PlanCapture(format!("engine returned no {} document", stage.label()))
}

/// Operator names in a plan document, depth first.
///
/// Plan trees are arrays of nodes carrying a `name` and nested `children`.
pub fn operator_names(plan: &Value) -> Vec<String> {
    let mut names = Vec::new();
    collect_operators(plan, &mut names);
    names
}

fn collect_operators(node: &Value, names: &mut Vec<String>) {
    match node {
        Value::Array(nodes) => {
            for n in nodes {
                collect_operators(n, names);
            }
        }
        Value::Object(map) => {
            if let Some(Value::String(name)) = map.get("name") {
                names.push(name.trim().to_string());
            }
            if let Some(children) = map.get("children") {
                collect_operators(children, names);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCAN: &str = r#"[{"name": "PROJECTION", "children": [{"name": "SEQ_SCAN ", "children": [], "extra_info": {"Table": "users"}}]}]"#;

    #[test]
    fn test_stage_keys() {
        assert_eq!(PlanStage::from_key("logical_plan"), Some(PlanStage::Logical));
        assert_eq!(
            PlanStage::from_key("logical_opt"),
            Some(PlanStage::LogicalOptimized)
        );
        assert_eq!(
            PlanStage::from_key("PHYSICAL_PLAN"),
            Some(PlanStage::Physical)
        );
        assert_eq!(
            PlanStage::from_key("unoptimized_logical"),
            Some(PlanStage::Logical)
        );
        assert_eq!(PlanStage::from_key("something"), None);
    }

    #[test]
    fn test_from_rows() {
        let plans = PlanDocuments::from_rows([
            ("logical_plan", SCAN),
            ("logical_opt", SCAN),
            ("physical_plan", SCAN),
        ])
        .unwrap();
        assert_eq!(plans.logical_plan[0]["name"], json!("PROJECTION"));
        assert_eq!(plans.get(PlanStage::Physical), &plans.physical_plan);
    }

    #[test]
    fn test_non_json_document_kept_as_string() {
        let plans = PlanDocuments::from_rows([
            ("logical_plan", "not json"),
            ("logical_opt", SCAN),
            ("physical_plan", SCAN),
        ])
        .unwrap();
        assert_eq!(plans.logical_plan, json!("not json"));
    }

    #[test]
    fn test_missing_stage_is_plan_capture_error() {
        let err = PlanDocuments::from_rows([("logical_plan", SCAN), ("physical_plan", SCAN)])
            .unwrap_err();
        assert!(matches!(err, StatementError::PlanCapture(ref m) if m.contains("logical_plan_optimized")));

        let err = PlanDocuments::from_rows(Vec::<(String, String)>::new()).unwrap_err();
        assert!(matches!(err, StatementError::PlanCapture(_)));
    }

    #[test]
    fn test_operator_names() {
        let plan: Value = serde_json::from_str(SCAN).unwrap();
        assert_eq!(operator_names(&plan), vec!["PROJECTION", "SEQ_SCAN"]);
        assert!(operator_names(&json!("text plan")).is_empty());
    }
}
