//! MySQL / MariaDB dialect.

use crate::error::Result;

use super::reserved::{self, ReservedWords};
use super::Dialect;

pub struct MysqlDialect {
    reserved: ReservedWords,
}

impl MysqlDialect {
    pub fn new() -> Self {
        Self {
            reserved: ReservedWords::vendor(reserved::MYSQL),
        }
    }
}

impl Default for MysqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for MysqlDialect {
    fn system(&self) -> &str {
        "mysql"
    }

    fn quotes_table_names(&self) -> bool {
        true
    }

    fn reserved(&self) -> &ReservedWords {
        &self.reserved
    }

    fn quote_ident(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn render_regex_predicate(&self, expression: &str, pattern: &str) -> Result<String> {
        Ok(format!(
            "{} REGEXP '{}'",
            expression,
            pattern.replace('\'', "''")
        ))
    }

    // Primary keys are always named PRIMARY
    fn is_deterministic_pk_name(&self, name: &str) -> bool {
        !name.eq_ignore_ascii_case("PRIMARY")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtick_quoting() {
        let dialect = MysqlDialect::new();
        assert_eq!(dialect.quote_ident("order"), "`order`");
        assert_eq!(dialect.render_table_name("select"), "`select`");
    }

    #[test]
    fn test_primary_name_is_not_deterministic() {
        let dialect = MysqlDialect::new();
        assert!(!dialect.is_deterministic_pk_name("PRIMARY"));
        assert!(dialect.is_deterministic_pk_name("pk_orders"));
        // FK and index names are user-visible and kept as chosen
        assert!(dialect.is_deterministic_fk_name("orders_ibfk_1"));
    }

    #[test]
    fn test_regex_predicate() {
        let dialect = MysqlDialect::new();
        assert_eq!(
            dialect.render_regex_predicate("code", "^[a-z]+$").unwrap(),
            "code REGEXP '^[a-z]+$'"
        );
    }
}
