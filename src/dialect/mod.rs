//! SQL dialect abstraction (Strategy pattern).
//!
//! A [`Dialect`] normalizes vendor SQL differences: identifier quoting,
//! literal formatting, sequence DDL, reserved-word detection, and the
//! per-vendor heuristics that decide whether a constraint name is
//! deterministic or vendor-generated. Vendor capabilities a dialect lacks
//! surface as [`MetaError::UnsupportedCapability`] carrying the dialect's
//! system name, never as a silent no-op.
//!
//! Dialects are selected at runtime through a [`DialectRegistry`]: rules map
//! a product-name prefix plus minimum version to a dialect, first matching
//! rule wins, and an unmatched product falls back to the unknown dialect.

mod hsql;
mod mssql;
mod mysql;
mod oracle;
mod postgres;
pub mod reserved;
mod unknown;
mod value;

use std::sync::Arc;

use crate::error::{MetaError, Result};
use crate::model::Sequence;

pub use hsql::HsqlDialect;
pub use mssql::MssqlDialect;
pub use mysql::MysqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use reserved::ReservedWords;
pub use unknown::UnknownDialect;
pub use value::SqlValue;

/// SQL syntax and capability strategy for one database vendor.
pub trait Dialect: Send + Sync {
    /// The dialect's system name, e.g. "oracle" or "postgres".
    fn system(&self) -> &str;

    /// Whether table names are quoted in rendered SQL.
    fn quotes_table_names(&self) -> bool;

    /// Whether the vendor supports sequences.
    fn supports_sequences(&self) -> bool {
        false
    }

    /// Whether `MINVALUE`/`MAXVALUE` clauses are supported in sequence DDL.
    fn sequence_boundary_supported(&self) -> bool {
        true
    }

    /// chrono pattern for date-only literals.
    fn date_pattern(&self) -> &str {
        "%Y-%m-%d"
    }

    /// chrono pattern for time-only literals.
    fn time_pattern(&self) -> &str {
        "%H:%M:%S"
    }

    /// chrono pattern for datetime literals (fixed high precision).
    fn datetime_pattern(&self) -> &str {
        "%Y-%m-%d %H:%M:%S%.3f"
    }

    /// The lazily merged reserved-word cache of this dialect instance.
    fn reserved(&self) -> &ReservedWords;

    /// Case-insensitive reserved-word test. `driver_words` are merged into
    /// the cached set on first access (superset addition, never subtraction).
    fn is_reserved(&self, word: &str, driver_words: &[String]) -> bool {
        self.reserved().contains(word, driver_words)
    }

    /// Quote an identifier. Double quotes per the SQL standard; vendors with
    /// other quoting characters override.
    fn quote_ident(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Render a table name, quoting it when the dialect quotes table names.
    fn render_table_name(&self, name: &str) -> String {
        if self.quotes_table_names() {
            self.quote_ident(name)
        } else {
            name.to_string()
        }
    }

    /// Boolean literal form; vendors without a boolean type override.
    fn format_bool(&self, value: bool) -> String {
        if value { "true" } else { "false" }.to_string()
    }

    /// Render a value as a SQL literal.
    ///
    /// Strings are escaped by doubling single quotes. A datetime at exact
    /// midnight renders with the date-only pattern; any other datetime uses
    /// the full datetime pattern. Numeric values use their natural display
    /// form.
    fn format_value(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(b) => self.format_bool(*b),
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Decimal(d) => d.to_string(),
            SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
            SqlValue::Uuid(u) => format!("'{}'", u),
            SqlValue::Date(d) => format!("'{}'", d.format(self.date_pattern())),
            SqlValue::DateTime(dt) => {
                if value.is_midnight_datetime() {
                    format!("'{}'", dt.date().format(self.date_pattern()))
                } else {
                    format!("'{}'", dt.format(self.datetime_pattern()))
                }
            }
            SqlValue::Time(t) => format!("'{}'", t.format(self.time_pattern())),
        }
    }

    /// Render `CREATE SEQUENCE` DDL.
    ///
    /// Only non-default values are rendered (start and increment of 1 are
    /// omitted) to keep generated DDL minimal. Boundary clauses are omitted
    /// when the dialect reports no boundary support.
    fn render_create_sequence(&self, sequence: &Sequence) -> Result<String> {
        if !self.supports_sequences() {
            return Err(MetaError::unsupported(self.system(), "sequences"));
        }
        let mut sql = format!("CREATE SEQUENCE {}", self.render_table_name(&sequence.name));
        if sequence.has_non_default_start() {
            sql.push_str(&format!(" START WITH {}", sequence.start));
        }
        if sequence.has_non_default_increment() {
            sql.push_str(&format!(" INCREMENT BY {}", sequence.increment));
        }
        if self.sequence_boundary_supported() {
            if let Some(max) = sequence.max_value {
                sql.push_str(&format!(" MAXVALUE {}", max));
            }
            if let Some(min) = sequence.min_value {
                sql.push_str(&format!(" MINVALUE {}", min));
            }
        }
        if sequence.cycle {
            sql.push_str(" CYCLE");
        }
        Ok(sql)
    }

    /// Render `DROP SEQUENCE` DDL.
    fn render_drop_sequence(&self, name: &str) -> Result<String> {
        if !self.supports_sequences() {
            return Err(MetaError::unsupported(self.system(), "sequences"));
        }
        Ok(format!("DROP SEQUENCE {}", self.render_table_name(name)))
    }

    /// Render the expression fetching a sequence's next value.
    fn render_sequence_value(&self, name: &str) -> Result<String> {
        if !self.supports_sequences() {
            return Err(MetaError::unsupported(self.system(), "sequences"));
        }
        Ok(format!("next value for {}", self.render_table_name(name)))
    }

    /// Render a regular-expression match predicate, when the vendor has one.
    fn render_regex_predicate(&self, _expression: &str, _pattern: &str) -> Result<String> {
        Err(MetaError::unsupported(self.system(), "regular expressions"))
    }

    /// Render a whitespace-trimming expression.
    fn render_trim(&self, expression: &str) -> Result<String> {
        Ok(format!("trim({})", expression))
    }

    /// Whether a primary-key constraint name looks deliberately chosen rather
    /// than vendor-generated. Controls whether DDL renderers emit an explicit
    /// `CONSTRAINT name` clause.
    fn is_deterministic_pk_name(&self, _name: &str) -> bool {
        true
    }

    /// Whether a unique-constraint name looks deliberately chosen.
    fn is_deterministic_uk_name(&self, _name: &str) -> bool {
        true
    }

    /// Whether a foreign-key constraint name looks deliberately chosen.
    fn is_deterministic_fk_name(&self, _name: &str) -> bool {
        true
    }

    /// Whether an index name looks deliberately chosen.
    fn is_deterministic_index_name(&self, _name: &str) -> bool {
        true
    }
}

/// A dotted product version, compared numerically component-wise.
///
/// Tolerant of vendor suffixes: each component keeps its leading digits, so
/// `"14.2 (Debian)"` parses as `[14, 2]`. Missing components compare as zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductVersion(Vec<u32>);

impl ProductVersion {
    pub fn parse(text: &str) -> Self {
        // Only the leading dotted number counts; vendor banners append
        // build metadata like "(Debian 14.2-1)" or "-MariaDB".
        let token = text.trim().split_whitespace().next().unwrap_or("");
        let mut components = Vec::new();
        for part in token.split('.') {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            match digits.parse::<u32>() {
                Ok(n) => components.push(n),
                Err(_) => break,
            }
            if digits.len() != part.len() {
                break;
            }
        }
        Self(components)
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }
}

impl PartialOrd for ProductVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProductVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let len = self.0.len().max(other.0.len());
        for i in 0..len {
            let a = self.0.get(i).copied().unwrap_or(0);
            let b = other.0.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                std::cmp::Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        std::cmp::Ordering::Equal
    }
}

/// One registry rule: a product-name prefix with an optional minimum version.
struct DialectRule {
    product_prefix: String,
    min_version: Option<ProductVersion>,
    dialect: Arc<dyn Dialect>,
}

/// Registry selecting a dialect from a reported product name and version.
///
/// Rules are checked in registration order; the first rule whose prefix is
/// contained in the normalized product name and whose minimum version is
/// satisfied wins. An unmatched product falls back to [`UnknownDialect`].
pub struct DialectRegistry {
    rules: Vec<DialectRule>,
    fallback: Arc<dyn Dialect>,
}

impl DialectRegistry {
    /// Create an empty registry with the unknown-dialect fallback.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: Arc::new(UnknownDialect::new()),
        }
    }

    /// Create a registry with the standard built-in dialects registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("oracle", None, Arc::new(OracleDialect::new()));
        registry.register("postgres", None, Arc::new(PostgresDialect::new()));
        registry.register("microsoft sql server", None, Arc::new(MssqlDialect::new()));
        registry.register("sql server", None, Arc::new(MssqlDialect::new()));
        registry.register("mysql", None, Arc::new(MysqlDialect::new()));
        registry.register("mariadb", None, Arc::new(MysqlDialect::new()));
        registry.register("hsql", None, Arc::new(HsqlDialect::new()));
        registry
    }

    /// Register a rule. `min_version` of `None` matches any version.
    pub fn register(
        &mut self,
        product_prefix: impl Into<String>,
        min_version: Option<&str>,
        dialect: Arc<dyn Dialect>,
    ) {
        self.rules.push(DialectRule {
            product_prefix: product_prefix.into().to_lowercase(),
            min_version: min_version.map(ProductVersion::parse),
            dialect,
        });
    }

    /// Select the dialect for a reported product name and version.
    pub fn lookup(&self, product_name: &str, product_version: &str) -> Arc<dyn Dialect> {
        let normalized = product_name.trim().to_lowercase();
        let version = ProductVersion::parse(product_version);
        for rule in &self.rules {
            if !normalized.contains(&rule.product_prefix) {
                continue;
            }
            match &rule.min_version {
                Some(min) if version < *min => continue,
                _ => return rule.dialect.clone(),
            }
        }
        tracing::debug!(product = %product_name, "no dialect rule matched, using unknown dialect");
        self.fallback.clone()
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_string_escaping_doubles_quotes() {
        let dialect = PostgresDialect::new();
        assert_eq!(
            dialect.format_value(&SqlValue::Text("it's".to_string())),
            "'it''s'"
        );
    }

    #[test]
    fn test_midnight_datetime_renders_date_only() {
        let dialect = PostgresDialect::new();
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            dialect.format_value(&SqlValue::DateTime(midnight)),
            "'2024-03-01'"
        );

        let afternoon = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_milli_opt(13, 30, 5, 250)
            .unwrap();
        assert_eq!(
            dialect.format_value(&SqlValue::DateTime(afternoon)),
            "'2024-03-01 13:30:05.250'"
        );
    }

    #[test]
    fn test_version_parsing_tolerates_suffixes() {
        assert_eq!(
            ProductVersion::parse("14.2 (Debian 14.2-1)").components(),
            &[14, 2]
        );
        assert_eq!(ProductVersion::parse("8").components(), &[8]);
        assert_eq!(
            ProductVersion::parse("10.4.28-MariaDB").components(),
            &[10, 4, 28]
        );
        assert!(ProductVersion::parse("10.0") > ProductVersion::parse("9.6"));
        assert!(ProductVersion::parse("9.6.1") > ProductVersion::parse("9.6"));
    }

    #[test]
    fn test_registry_prefix_and_version_match() {
        let mut registry = DialectRegistry::new();
        registry.register("postgres", Some("9.0"), Arc::new(PostgresDialect::new()));

        let hit = registry.lookup("PostgreSQL", "14.2");
        assert_eq!(hit.system(), "postgres");

        // Below the rule minimum, falls through to the fallback
        let miss = registry.lookup("PostgreSQL", "8.4");
        assert_eq!(miss.system(), "unknown");
    }

    #[test]
    fn test_registry_first_match_wins() {
        let mut registry = DialectRegistry::new();
        registry.register("sql server", None, Arc::new(MssqlDialect::new()));
        registry.register("sql", None, Arc::new(MysqlDialect::new()));

        let hit = registry.lookup("Microsoft SQL Server", "15.0");
        assert_eq!(hit.system(), "mssql");
    }

    #[test]
    fn test_registry_fallback_for_unknown_product() {
        let registry = DialectRegistry::with_builtins();
        let dialect = registry.lookup("FoundationDB", "7.1");
        assert_eq!(dialect.system(), "unknown");
    }

    #[test]
    fn test_builtin_lookup() {
        let registry = DialectRegistry::with_builtins();
        assert_eq!(registry.lookup("Oracle Database 19c", "19.0").system(), "oracle");
        assert_eq!(registry.lookup("MySQL Community", "8.0").system(), "mysql");
        assert_eq!(
            registry.lookup("Microsoft SQL Server", "15.0").system(),
            "mssql"
        );
    }
}
