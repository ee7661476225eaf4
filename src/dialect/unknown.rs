//! Fallback dialect for unrecognized database products.
//!
//! Uses SQL-standard syntax everywhere and reports every vendor capability
//! as unsupported, so callers fail loudly instead of emitting SQL the
//! product may silently misinterpret.

use crate::error::{MetaError, Result};

use super::reserved::ReservedWords;
use super::Dialect;

pub struct UnknownDialect {
    reserved: ReservedWords,
}

impl UnknownDialect {
    pub fn new() -> Self {
        Self {
            reserved: ReservedWords::baseline(),
        }
    }
}

impl Default for UnknownDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for UnknownDialect {
    fn system(&self) -> &str {
        "unknown"
    }

    fn quotes_table_names(&self) -> bool {
        false
    }

    fn reserved(&self) -> &ReservedWords {
        &self.reserved
    }

    fn render_trim(&self, _expression: &str) -> Result<String> {
        Err(MetaError::unsupported(self.system(), "trim"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_fail_loudly() {
        let dialect = UnknownDialect::new();
        assert!(dialect.render_sequence_value("seq").is_err());
        assert!(dialect.render_regex_predicate("c", "x").is_err());
        assert!(dialect.render_trim("c").is_err());
    }

    #[test]
    fn test_standard_quoting_and_reserved_words() {
        let dialect = UnknownDialect::new();
        assert_eq!(dialect.quote_ident("order"), "\"order\"");
        assert!(dialect.is_reserved("SELECT", &[]));
        assert!(dialect.is_reserved("extra", &["EXTRA".to_string()]));
    }
}
