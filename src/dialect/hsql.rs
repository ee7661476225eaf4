//! HSQLDB dialect.

use once_cell::sync::Lazy;
use regex::Regex;

use super::reserved::ReservedWords;
use super::Dialect;

// System names: SYS_PK_10092, SYS_CT_10104, SYS_FK_10118, SYS_IDX_10131
static GENERATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^SYS_(PK|CT|FK|IDX)_\d+$").expect("invalid hsql name pattern"));

pub struct HsqlDialect {
    reserved: ReservedWords,
}

impl HsqlDialect {
    pub fn new() -> Self {
        Self {
            reserved: ReservedWords::baseline(),
        }
    }
}

impl Default for HsqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for HsqlDialect {
    fn system(&self) -> &str {
        "hsql"
    }

    fn quotes_table_names(&self) -> bool {
        false
    }

    fn supports_sequences(&self) -> bool {
        true
    }

    fn sequence_boundary_supported(&self) -> bool {
        false
    }

    fn reserved(&self) -> &ReservedWords {
        &self.reserved
    }

    fn is_deterministic_pk_name(&self, name: &str) -> bool {
        !GENERATED.is_match(name)
    }

    fn is_deterministic_uk_name(&self, name: &str) -> bool {
        !GENERATED.is_match(name)
    }

    fn is_deterministic_fk_name(&self, name: &str) -> bool {
        !GENERATED.is_match(name)
    }

    fn is_deterministic_index_name(&self, name: &str) -> bool {
        !GENERATED.is_match(name)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Sequence;

    use super::*;

    #[test]
    fn test_system_names_are_not_deterministic() {
        let dialect = HsqlDialect::new();
        assert!(!dialect.is_deterministic_pk_name("SYS_PK_10092"));
        assert!(!dialect.is_deterministic_index_name("SYS_IDX_10131"));
        assert!(dialect.is_deterministic_pk_name("PK_CUSTOMER"));
    }

    #[test]
    fn test_sequence_boundaries_omitted() {
        let dialect = HsqlDialect::new();
        let seq = Sequence::new("seq").with_start(5).with_bounds(Some(1), Some(100));
        assert_eq!(
            dialect.render_create_sequence(&seq).unwrap(),
            "CREATE SEQUENCE seq START WITH 5"
        );
    }
}
