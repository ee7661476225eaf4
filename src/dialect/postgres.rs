//! PostgreSQL dialect.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

use super::reserved::{self, ReservedWords};
use super::Dialect;

// Names Postgres derives itself: orders_pkey, orders_customer_id_fkey, ...
static GENERATED_PK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+_pkey$").expect("invalid pkey pattern"));
static GENERATED_UK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+_key$").expect("invalid key pattern"));
static GENERATED_FK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+_fkey$").expect("invalid fkey pattern"));
static GENERATED_INDEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+_idx$").expect("invalid idx pattern"));

pub struct PostgresDialect {
    reserved: ReservedWords,
}

impl PostgresDialect {
    pub fn new() -> Self {
        Self {
            reserved: ReservedWords::vendor(reserved::POSTGRES),
        }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for PostgresDialect {
    fn system(&self) -> &str {
        "postgres"
    }

    fn quotes_table_names(&self) -> bool {
        false
    }

    fn supports_sequences(&self) -> bool {
        true
    }

    fn reserved(&self) -> &ReservedWords {
        &self.reserved
    }

    fn render_sequence_value(&self, name: &str) -> Result<String> {
        Ok(format!("select nextval('{}')", name))
    }

    fn render_regex_predicate(&self, expression: &str, pattern: &str) -> Result<String> {
        Ok(format!("{} ~ '{}'", expression, pattern.replace('\'', "''")))
    }

    fn is_deterministic_pk_name(&self, name: &str) -> bool {
        !GENERATED_PK.is_match(name)
    }

    fn is_deterministic_uk_name(&self, name: &str) -> bool {
        !GENERATED_UK.is_match(name)
    }

    fn is_deterministic_fk_name(&self, name: &str) -> bool {
        !GENERATED_FK.is_match(name)
    }

    fn is_deterministic_index_name(&self, name: &str) -> bool {
        !GENERATED_INDEX.is_match(name)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Sequence;

    use super::*;

    #[test]
    fn test_derived_names_are_not_deterministic() {
        let dialect = PostgresDialect::new();
        assert!(!dialect.is_deterministic_pk_name("orders_pkey"));
        assert!(!dialect.is_deterministic_uk_name("orders_number_key"));
        assert!(!dialect.is_deterministic_fk_name("orders_customer_id_fkey"));
        assert!(dialect.is_deterministic_pk_name("pk_orders"));
        assert!(dialect.is_deterministic_fk_name("fk_orders_customer"));
    }

    #[test]
    fn test_sequence_rendering() {
        let dialect = PostgresDialect::new();
        let seq = Sequence::new("order_seq").with_bounds(Some(1), Some(9999));
        assert_eq!(
            dialect.render_create_sequence(&seq).unwrap(),
            "CREATE SEQUENCE order_seq MAXVALUE 9999 MINVALUE 1"
        );
        assert_eq!(
            dialect.render_sequence_value("order_seq").unwrap(),
            "select nextval('order_seq')"
        );
    }

    #[test]
    fn test_regex_predicate() {
        let dialect = PostgresDialect::new();
        assert_eq!(
            dialect.render_regex_predicate("code", "^[A-Z]+$").unwrap(),
            "code ~ '^[A-Z]+$'"
        );
    }
}
