//! Microsoft SQL Server dialect.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

use super::reserved::{self, ReservedWords};
use super::Dialect;

// Auto-generated names carry a hex uniquifier: PK__orders__3213E83F5D1A2B4C
static GENERATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(PK|UQ|FK|DF|CK)__\w+__[0-9A-F]{8,16}$").expect("invalid mssql name pattern")
});

pub struct MssqlDialect {
    reserved: ReservedWords,
}

impl MssqlDialect {
    pub fn new() -> Self {
        Self {
            reserved: ReservedWords::vendor(reserved::MSSQL),
        }
    }
}

impl Default for MssqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for MssqlDialect {
    fn system(&self) -> &str {
        "mssql"
    }

    fn quotes_table_names(&self) -> bool {
        true
    }

    fn reserved(&self) -> &ReservedWords {
        &self.reserved
    }

    fn quote_ident(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    // No boolean type; BIT columns take 1/0
    fn format_bool(&self, value: bool) -> String {
        if value { "1" } else { "0" }.to_string()
    }

    fn render_trim(&self, expression: &str) -> Result<String> {
        Ok(format!("ltrim(rtrim({}))", expression))
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
