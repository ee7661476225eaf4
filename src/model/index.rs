//! Index metadata.

use serde::{Deserialize, Serialize};

use super::object::{DbObject, Named, ObjectType};

/// Index metadata.
///
/// A unique index may be backed by a [`UniqueConstraint`] on the same table;
/// the link is kept by constraint name, never by reference.
///
/// [`UniqueConstraint`]: super::constraint::UniqueConstraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,

    /// Whether the index enforces uniqueness.
    pub unique: bool,

    /// Whether the index name is deterministic (not vendor-generated).
    pub name_deterministic: bool,

    /// Indexed column names, in index order.
    pub column_names: Vec<String>,

    /// Name of the unique constraint this index backs, if any.
    pub backing_constraint: Option<String>,

    /// Name of the owning table (back-reference, set on insertion).
    pub owner_table: Option<String>,
}

impl Index {
    pub fn new(name: impl Into<String>, unique: bool, column_names: Vec<String>) -> Self {
        Self {
            name: name.into(),
            unique,
            name_deterministic: true,
            column_names,
            backing_constraint: None,
            owner_table: None,
        }
    }

    /// Structural comparison, ignoring name and owner.
    pub fn is_identical(&self, other: &Index) -> bool {
        self.unique == other.unique
            && self.column_names.len() == other.column_names.len()
            && self
                .column_names
                .iter()
                .zip(other.column_names.iter())
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl Named for Index {
    fn name(&self) -> &str {
        &self.name
    }
}

impl DbObject for Index {
    fn name(&self) -> &str {
        &self.name
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Index
    }

    fn owner_name(&self) -> Option<&str> {
        self.owner_table.as_deref()
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.is_identical(other) && self.owner_table == other.owner_table
    }
}
