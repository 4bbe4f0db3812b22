/// Dialect normalization: ordered text rewrites applied once before parsing.
///
/// Each rule turns one family of dialect-specific surface syntax into the
/// sandbox engine's spelling. Rules are pure and idempotent, and no rule's
/// output is matched by any rule's input, so the whole pipeline is
/// idempotent as well.
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// A single rewrite over raw SQL text.
///
/// # Example
///
/// ```ignore
/// struct StripTrailingSemicolon;
///
/// impl RewriteRule for StripTrailingSemicolon {
///     fn name(&self) -> &str { "strip_trailing_semicolon" }
///     fn apply(&self, sql: &str) -> String {
///         sql.trim_end().trim_end_matches(';').to_string()
///     }
/// }
/// ```
pub trait RewriteRule: Send + Sync {
    /// Unique name identifying this rule.
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn apply(&self, sql: &str) -> String;
}

/// Runs a fixed pipeline of rewrite rules in order.
#[derive(Default)]
pub struct Normalizer {
    rules: Vec<Box<dyn RewriteRule>>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default pipeline, with `%s`-style placeholders renamed to `:param`.
    pub fn with_defaults() -> Self {
        Self::with_placeholder_name("param")
    }

    pub fn with_placeholder_name(name: &str) -> Self {
        let mut normalizer = Self::new();
        normalizer.add_rule(Box::new(BacktickQuotes));
        normalizer.add_rule(Box::new(SpacedComparisons));
        normalizer.add_rule(Box::new(DateFormatFunction));
        normalizer.add_rule(Box::new(MysqlLimit));
        normalizer.add_rule(Box::new(RandFunction));
        normalizer.add_rule(Box::new(HostPlaceholders::new(name)));
        normalizer
    }

    pub fn add_rule(&mut self, rule: Box<dyn RewriteRule>) {
        debug!(rule = rule.name(), description = rule.description(), "rewrite rule registered");
        self.rules.push(rule);
    }

    pub fn normalize(&self, sql: &str) -> String {
        let mut current = sql.to_string();
        for rule in &self.rules {
            current = rule.apply(&current);
        }
        current
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

/// Normalize with the default pipeline.
pub fn normalize(sql: &str) -> String {
    static DEFAULT: LazyLock<Normalizer> = LazyLock::new(Normalizer::with_defaults);
    DEFAULT.normalize(sql)
}

fn rule_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid rewrite pattern {pattern}: {e}"))
}

/// `` `name` `` → `"name"`.
pub struct BacktickQuotes;

impl RewriteRule for BacktickQuotes {
    fn name(&self) -> &str {
        "backtick_quotes"
    }

    fn description(&self) -> &str {
        "Replaces backtick identifier quoting with double quotes"
    }

    fn apply(&self, sql: &str) -> String {
        sql.replace('`', "\"")
    }
}

static SPACED_COMPARISON: LazyLock<Regex> = LazyLock::new(|| rule_regex(r"([<>!=])[ \t]+="));

/// `> =`, `< =`, `! =`, `= =` → tight operators.
pub struct SpacedComparisons;

impl RewriteRule for SpacedComparisons {
    fn name(&self) -> &str {
        "spaced_comparisons"
    }

    fn description(&self) -> &str {
        "Collapses comparison operators split by whitespace"
    }

    fn apply(&self, sql: &str) -> String {
        // Runs to a fixpoint: `= = =` needs two passes.
        let mut current = sql.to_string();
        while SPACED_COMPARISON.is_match(&current) {
            current = SPACED_COMPARISON.replace_all(&current, "${1}=").into_owned();
        }
        current
    }
}

static DATE_FORMAT: LazyLock<Regex> = LazyLock::new(|| rule_regex(r"(?i)\bdate_format\s*\("));

/// `DATE_FORMAT(` → `strftime(`.
pub struct DateFormatFunction;

impl RewriteRule for DateFormatFunction {
    fn name(&self) -> &str {
        "date_format_function"
    }

    fn description(&self) -> &str {
        "Renames the MySQL date formatting function"
    }

    fn apply(&self, sql: &str) -> String {
        DATE_FORMAT.replace_all(sql, "strftime(").into_owned()
    }
}

static MYSQL_LIMIT: LazyLock<Regex> =
    LazyLock::new(|| rule_regex(r"(?i)\blimit\s+(\d+)\s*,\s*(\d+)"));

/// `LIMIT offset, count` → `LIMIT count OFFSET offset`.
pub struct MysqlLimit;

impl RewriteRule for MysqlLimit {
    fn name(&self) -> &str {
        "mysql_limit"
    }

    fn description(&self) -> &str {
        "Rewrites comma-separated LIMIT into LIMIT/OFFSET"
    }

    fn apply(&self, sql: &str) -> String {
        MYSQL_LIMIT
            .replace_all(sql, "LIMIT ${2} OFFSET ${1}")
            .into_owned()
    }
}

static RAND_CALL: LazyLock<Regex> = LazyLock::new(|| rule_regex(r"(?i)\brand\s*\(\s*\)"));

/// `rand()` → `RANDOM()`.
pub struct RandFunction;

impl RewriteRule for RandFunction {
    fn name(&self) -> &str {
        "rand_function"
    }

    fn description(&self) -> &str {
        "Renames RAND() to RANDOM()"
    }

    fn apply(&self, sql: &str) -> String {
        RAND_CALL.replace_all(sql, "RANDOM()").into_owned()
    }
}

static STRING_LITERAL: LazyLock<Regex> = LazyLock::new(|| rule_regex(r"'(?:[^']|'')*'"));
static PERCENT_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| rule_regex(r"%[sid]\b"));
// `#{id,jdbcType=INTEGER}`, `${id}`, `{id}`
static BRACE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| rule_regex(r"[#$]?\{\s*(\w+)[^{}]*\}"));

/// Host-language placeholders → named `:name` placeholders.
pub struct HostPlaceholders {
    replacement: String,
}

impl HostPlaceholders {
    pub fn new(name: &str) -> Self {
        Self {
            replacement: format!(":{name}"),
        }
    }
}

impl RewriteRule for HostPlaceholders {
    fn name(&self) -> &str {
        "host_placeholders"
    }

    fn description(&self) -> &str {
        "Rewrites printf-style and brace interpolation to named placeholders"
    }

    fn apply(&self, sql: &str) -> String {
        outside_literals(sql, |span| {
            let span = PERCENT_PLACEHOLDER.replace_all(span, regex::NoExpand(&self.replacement));
            BRACE_PLACEHOLDER.replace_all(&span, ":${1}").into_owned()
        })
    }
}

/// Apply `rewrite` to every span of `sql` outside single-quoted literals.
/// Format strings and LIKE patterns pass through untouched.
fn outside_literals(sql: &str, rewrite: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut last = 0;
    for literal in STRING_LITERAL.find_iter(sql) {
        out.push_str(&rewrite(&sql[last..literal.start()]));
        out.push_str(literal.as_str());
        last = literal.end();
    }
    out.push_str(&rewrite(&sql[last..]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rule_order() {
        let normalizer = Normalizer::with_defaults();
        assert_eq!(
            normalizer.rule_names(),
            vec![
                "backtick_quotes",
                "spaced_comparisons",
                "date_format_function",
                "mysql_limit",
                "rand_function",
                "host_placeholders",
            ]
        );
    }

    #[test]
    fn test_backticks() {
        assert_eq!(
            BacktickQuotes.apply("SELECT `id` FROM `users`"),
            "SELECT \"id\" FROM \"users\""
        );
    }

    #[test]
    fn test_spaced_comparisons() {
        assert_eq!(SpacedComparisons.apply("a > = 1"), "a >= 1");
        assert_eq!(SpacedComparisons.apply("a <  = 1"), "a <= 1");
        assert_eq!(SpacedComparisons.apply("a ! = 1"), "a != 1");
        assert_eq!(SpacedComparisons.apply("a = = 1"), "a == 1");
        assert_eq!(SpacedComparisons.apply("a = 1"), "a = 1");
        let once = SpacedComparisons.apply("a = = = 1");
        assert_eq!(SpacedComparisons.apply(&once), once);
    }

    #[test]
    fn test_date_format() {
        assert_eq!(
            DateFormatFunction.apply("SELECT DATE_FORMAT (created, '%Y') FROM t"),
            "SELECT strftime(created, '%Y') FROM t"
        );
        assert_eq!(
            DateFormatFunction.apply("SELECT my_date_format(x)"),
            "SELECT my_date_format(x)"
        );
    }

    #[test]
    fn test_mysql_limit() {
        let out = normalize("SELECT * FROM t LIMIT 10, 5");
        assert!(out.ends_with("LIMIT 5 OFFSET 10"), "{out}");
        assert_eq!(
            MysqlLimit.apply("select * from t limit 0 ,20"),
            "select * from t LIMIT 20 OFFSET 0"
        );
        assert_eq!(MysqlLimit.apply("SELECT 1 LIMIT 5"), "SELECT 1 LIMIT 5");
    }

    #[test]
    fn test_rand() {
        assert_eq!(
            normalize("SELECT * FROM t ORDER BY rand()  "),
            "SELECT * FROM t ORDER BY RANDOM()  "
        );
        assert_eq!(RandFunction.apply("ORDER BY RaNd ( )"), "ORDER BY RANDOM()");
        assert_eq!(RandFunction.apply("SELECT operand(x)"), "SELECT operand(x)");
        assert_eq!(RandFunction.apply("ORDER BY RANDOM()"), "ORDER BY RANDOM()");
    }

    #[test]
    fn test_host_placeholders() {
        let rule = HostPlaceholders::new("param");
        assert_eq!(
            rule.apply("SELECT * FROM t WHERE a = %s AND b = %d"),
            "SELECT * FROM t WHERE a = :param AND b = :param"
        );
        assert_eq!(
            rule.apply("WHERE id = #{id,jdbcType=INTEGER}"),
            "WHERE id = :id"
        );
        assert_eq!(rule.apply("WHERE id = {user_id}"), "WHERE id = :user_id");
        assert_eq!(rule.apply("WHERE id = ${user_id}"), "WHERE id = :user_id");
        // LIKE patterns and JSON literals stay untouched
        assert_eq!(rule.apply("WHERE n LIKE '%sam%'"), "WHERE n LIKE '%sam%'");
        assert_eq!(rule.apply("SELECT '{\"k\":1}'"), "SELECT '{\"k\":1}'");
    }

    #[test]
    fn test_string_literals_keep_their_text() {
        assert_eq!(
            normalize("SELECT DATE_FORMAT(created, '%Y-%m-%d') FROM users WHERE id = %s"),
            "SELECT strftime(created, '%Y-%m-%d') FROM users WHERE id = :param"
        );
        assert_eq!(
            normalize("SELECT * FROM t WHERE a LIKE '%s%' AND b = %s"),
            "SELECT * FROM t WHERE a LIKE '%s%' AND b = :param"
        );
        assert_eq!(
            normalize("SELECT '{a}', 'it''s %d' FROM t WHERE c = {c}"),
            "SELECT '{a}', 'it''s %d' FROM t WHERE c = :c"
        );
    }

    #[test]
    fn test_default_rules_are_described() {
        let normalizer = Normalizer::with_defaults();
        for rule in &normalizer.rules {
            assert!(!rule.description().is_empty(), "{} has no description", rule.name());
        }
    }

    #[test]
    fn test_custom_placeholder_name() {
        let normalizer = Normalizer::with_placeholder_name("p");
        assert_eq!(normalizer.normalize("x = %s"), "x = :p");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "SELECT `a` FROM `t` WHERE a > = 1 LIMIT 10, 5",
            "SELECT DATE_FORMAT(d, '%Y-%m-%d') FROM t ORDER BY rand()",
            "SELECT * FROM t WHERE a = %s AND b = #{b} AND c = {c} AND d = ?",
            "SELECT * FROM t WHERE a = = = b",
            "SELECT DATE_FORMAT(d, '%d/%m') FROM t WHERE n LIKE '%s%' AND x = %s",
            "select 1",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }
}
