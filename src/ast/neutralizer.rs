/// Placeholder neutralization on the parsed statement tree.
///
/// Every parameter placeholder is rewritten in place to the `NULL` literal.
/// The rewrite is a single visit over the expression nodes, so a statement
/// with N placeholders yields exactly one executable statement.
use sqlparser::ast as sp;
use sqlparser::ast::{visit_expressions, visit_expressions_mut};
use std::ops::ControlFlow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    /// `?`
    Positional,
    /// `$1`, `?1`, `:1`
    Numbered,
    /// `:name`, `$name`
    Named,
    /// `@name`; `@@name` is a system variable, not a parameter.
    AtNamed,
}

impl PlaceholderKind {
    /// Classify the text of a placeholder token.
    pub fn from_token(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        let sigil = chars.next()?;
        let rest = chars.as_str();
        match sigil {
            '?' if rest.is_empty() => Some(PlaceholderKind::Positional),
            '?' | '$' | ':' if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) => {
                Some(PlaceholderKind::Numbered)
            }
            '$' | ':' if !rest.is_empty() => Some(PlaceholderKind::Named),
            '@' if !rest.is_empty() && !rest.starts_with('@') => Some(PlaceholderKind::AtNamed),
            _ => None,
        }
    }

    fn of_expr(expr: &sp::Expr) -> Option<Self> {
        match expr {
            sp::Expr::Value(sp::Value::Placeholder(token)) => Self::from_token(token),
            // The generic dialect lexes `@name` as an identifier.
            sp::Expr::Identifier(ident) if ident.quote_style.is_none() => {
                match Self::from_token(&ident.value) {
                    Some(PlaceholderKind::AtNamed) => Some(PlaceholderKind::AtNamed),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Counts of rewritten placeholders, per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeutralizeReport {
    pub positional: usize,
    pub numbered: usize,
    pub named: usize,
    pub at_named: usize,
}

impl NeutralizeReport {
    fn record(&mut self, kind: PlaceholderKind) {
        match kind {
            PlaceholderKind::Positional => self.positional += 1,
            PlaceholderKind::Numbered => self.numbered += 1,
            PlaceholderKind::Named => self.named += 1,
            PlaceholderKind::AtNamed => self.at_named += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positional + self.numbered + self.named + self.at_named
    }
}

/// Rewrite every placeholder in `statement` to `NULL`.
pub fn neutralize(statement: &mut sp::Statement) -> NeutralizeReport {
    let mut report = NeutralizeReport::default();
    let _ = visit_expressions_mut(statement, |expr| {
        if let Some(kind) = PlaceholderKind::of_expr(expr) {
            report.record(kind);
            *expr = sp::Expr::Value(sp::Value::Null);
        }
        ControlFlow::<()>::Continue(())
    });
    report
}

/// Placeholders present in `statement`, in visit order.
pub fn find_placeholders(statement: &sp::Statement) -> Vec<PlaceholderKind> {
    let mut found = Vec::new();
    let _ = visit_expressions(statement, |expr| {
        if let Some(kind) = PlaceholderKind::of_expr(expr) {
            found.push(kind);
        }
        ControlFlow::<()>::Continue(())
    });
    found
}
