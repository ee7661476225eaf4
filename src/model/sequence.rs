//! Sequence metadata.

use serde::{Deserialize, Serialize};

use super::object::{DbObject, Named, ObjectType};

/// Default start value; not worth rendering in generated DDL.
pub const DEFAULT_START: i64 = 1;

/// Default increment; not worth rendering in generated DDL.
pub const DEFAULT_INCREMENT: i64 = 1;

/// Sequence metadata.
///
/// Normally owned by a [`Schema`](super::schema::Schema); a detached sequence
/// (one built programmatically before insertion) may carry explicit catalog
/// and schema name strings instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    /// Sequence name.
    pub name: String,

    /// Explicit catalog name for a detached sequence.
    pub catalog_name: Option<String>,

    /// Owning schema name (back-reference, set on insertion) or explicit
    /// schema name for a detached sequence.
    pub schema_name: Option<String>,

    /// First value generated.
    pub start: i64,

    /// Step between generated values.
    pub increment: i64,

    /// Lower boundary, if constrained.
    pub min_value: Option<i64>,

    /// Upper boundary, if constrained.
    pub max_value: Option<i64>,

    /// Whether the sequence wraps around at its boundary.
    pub cycle: bool,

    /// Number of values preallocated in memory, if reported.
    pub cache: Option<i64>,

    /// Whether values are guaranteed to be generated in request order.
    pub order: bool,

    /// Last number issued, as reported by the source catalog.
    pub last_number: i64,
}

impl Sequence {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog_name: None,
            schema_name: None,
            start: DEFAULT_START,
            increment: DEFAULT_INCREMENT,
            min_value: None,
            max_value: None,
            cycle: false,
            cache: None,
            order: false,
            last_number: 0,
        }
    }

    pub fn with_start(mut self, start: i64) -> Self {
        self.start = start;
        self
    }

    pub fn with_increment(mut self, increment: i64) -> Self {
        self.increment = increment;
        self
    }

    pub fn with_bounds(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    pub fn with_cycle(mut self, cycle: bool) -> Self {
        self.cycle = cycle;
        self
    }

    /// Whether the start value differs from the default and should be rendered.
    pub fn has_non_default_start(&self) -> bool {
        self.start != DEFAULT_START
    }

    /// Whether the increment differs from the default and should be rendered.
    pub fn has_non_default_increment(&self) -> bool {
        self.increment != DEFAULT_INCREMENT
    }

    /// Structural comparison, ignoring owner names.
    pub fn is_identical(&self, other: &Sequence) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.start == other.start
            && self.increment == other.increment
            && self.min_value == other.min_value
            && self.max_value == other.max_value
            && self.cycle == other.cycle
    }
}

impl Named for Sequence {
    fn name(&self) -> &str {
        &self.name
    }
}

impl DbObject for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Sequence
    }

    fn owner_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }
}

impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        self.is_identical(other) && self.schema_name == other.schema_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_not_worth_rendering() {
        let seq = Sequence::new("seq_order_id");
        assert!(!seq.has_non_default_start());
        assert!(!seq.has_non_default_increment());

        let seq = seq.with_start(1000).with_increment(10);
        assert!(seq.has_non_default_start());
        assert!(seq.has_non_default_increment());
    }

    #[test]
    fn test_detached_sequence_names() {
        let mut seq = Sequence::new("s");
        seq.catalog_name = Some("main".to_string());
        seq.schema_name = Some("public".to_string());
        assert_eq!(seq.owner_name(), Some("public"));
    }
}
