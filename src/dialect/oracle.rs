//! Oracle dialect.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

use super::reserved::{self, ReservedWords};
use super::Dialect;

// System-generated constraint and index names, e.g. SYS_C0042817
static SYS_GENERATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^SYS_C\d+$").expect("invalid Oracle name pattern"));

pub struct OracleDialect {
    reserved: ReservedWords,
}

impl OracleDialect {
    pub fn new() -> Self {
        Self {
            reserved: ReservedWords::vendor(reserved::ORACLE),
        }
    }
}

impl Default for OracleDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for OracleDialect {
    fn system(&self) -> &str {
        "oracle"
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
        Ok(format!("select {}.nextval from dual", name))
    }

    fn render_regex_predicate(&self, expression: &str, pattern: &str) -> Result<String> {
        Ok(format!(
            "REGEXP_LIKE({}, '{}')",
            expression,
            pattern.replace('\'', "''")
        ))
    }

    fn is_deterministic_pk_name(&self, name: &str) -> bool {
        !SYS_GENERATED.is_match(name)
    }

    fn is_deterministic_uk_name(&self, name: &str) -> bool {
        !SYS_GENERATED.is_match(name)
    }

    fn is_deterministic_fk_name(&self, name: &str) -> bool {
        !SYS_GENERATED.is_match(name)
    }

    fn is_deterministic_index_name(&self, name: &str) -> bool {
        !SYS_GENERATED.is_match(name)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Sequence;

    use super::*;

    #[test]
    fn test_system_generated_names_are_not_deterministic() {
        let dialect = OracleDialect::new();
        assert!(!dialect.is_deterministic_pk_name("SYS_C0042817"));
        assert!(!dialect.is_deterministic_fk_name("SYS_C9913"));
        assert!(dialect.is_deterministic_pk_name("PK_CUSTOMER"));
        assert!(dialect.is_deterministic_index_name("IDX_ORDER_DATE"));
    }

    #[test]
    fn test_sequence_rendering() {
        let dialect = OracleDialect::new();
        let seq = Sequence::new("SEQ_ID").with_start(100).with_increment(10);
        assert_eq!(
            dialect.render_create_sequence(&seq).unwrap(),
            "CREATE SEQUENCE SEQ_ID START WITH 100 INCREMENT BY 10"
        );
        assert_eq!(
            dialect.render_sequence_value("SEQ_ID").unwrap(),
            "select SEQ_ID.nextval from dual"
        );
    }

    #[test]
    fn test_reserved_words() {
        let dialect = OracleDialect::new();
        assert!(dialect.is_reserved("select", &[]));
        assert!(dialect.is_reserved("VARCHAR2", &[]));
        assert!(!dialect.is_reserved("customer", &[]));
    }
}
