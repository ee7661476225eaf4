//! Constraint metadata: primary keys, unique constraints, foreign keys,
//! check constraints and not-null constraints.
//!
//! Constraint identity has two levels. [`is_identical`](PrimaryKey::is_identical)
//! is structural: it ignores the constraint name and the owning table and
//! compares the column lists (and, for foreign keys, the referenced side).
//! `PartialEq` additionally anchors on the owning table, so two constraints
//! with identical column lists on different tables are identical but not equal.

use serde::{Deserialize, Serialize};

use crate::error::{MetaError, Result};

use super::object::{DbObject, ObjectType};

/// Referential action for foreign-key update/delete rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FkRule {
    #[default]
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
}

impl FkRule {
    /// SQL keyword form of the rule.
    pub fn as_sql(self) -> &'static str {
        match self {
            FkRule::NoAction => "NO ACTION",
            FkRule::Cascade => "CASCADE",
            FkRule::SetNull => "SET NULL",
            FkRule::SetDefault => "SET DEFAULT",
            FkRule::Restrict => "RESTRICT",
        }
    }

    /// Parse a rule from the keyword form reported by catalog views.
    pub fn from_sql(text: &str) -> Option<Self> {
        match text.trim().to_uppercase().replace('_', " ").as_str() {
            "NO ACTION" | "" => Some(FkRule::NoAction),
            "CASCADE" => Some(FkRule::Cascade),
            "SET NULL" => Some(FkRule::SetNull),
            "SET DEFAULT" => Some(FkRule::SetDefault),
            "RESTRICT" => Some(FkRule::Restrict),
            _ => None,
        }
    }
}

/// Primary key constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryKey {
    /// Constraint name, if the source reports one.
    pub name: Option<String>,

    /// Whether the name is deterministic (not vendor-generated).
    pub name_deterministic: bool,

    /// Names of the key columns, in key order.
    pub column_names: Vec<String>,

    /// Name of the owning table (back-reference, set on insertion).
    pub owner_table: Option<String>,
}

impl PrimaryKey {
    pub fn new(name: Option<String>, column_names: Vec<String>) -> Self {
        Self {
            name,
            name_deterministic: true,
            column_names,
            owner_table: None,
        }
    }

    /// Structural comparison, ignoring name and owner.
    pub fn is_identical(&self, other: &PrimaryKey) -> bool {
        column_lists_identical(&self.column_names, &other.column_names)
    }
}

impl DbObject for PrimaryKey {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::PrimaryKey
    }

    fn owner_name(&self) -> Option<&str> {
        self.owner_table.as_deref()
    }
}

impl PartialEq for PrimaryKey {
    fn eq(&self, other: &Self) -> bool {
        self.is_identical(other) && self.owner_table == other.owner_table
    }
}

/// Unique constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniqueConstraint {
    /// Constraint name, if the source reports one.
    pub name: Option<String>,

    /// Whether the name is deterministic (not vendor-generated).
    pub name_deterministic: bool,

    /// Names of the constrained columns, in constraint order.
    pub column_names: Vec<String>,

    /// Name of the owning table (back-reference, set on insertion).
    pub owner_table: Option<String>,
}

impl UniqueConstraint {
    pub fn new(name: Option<String>, column_names: Vec<String>) -> Self {
        Self {
            name,
            name_deterministic: true,
            column_names,
            owner_table: None,
        }
    }

    /// Structural comparison, ignoring name and owner.
    pub fn is_identical(&self, other: &UniqueConstraint) -> bool {
        column_lists_identical(&self.column_names, &other.column_names)
    }
}

impl DbObject for UniqueConstraint {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::UniqueConstraint
    }

    fn owner_name(&self) -> Option<&str> {
        self.owner_table.as_deref()
    }
}

impl PartialEq for UniqueConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.is_identical(other) && self.owner_table == other.owner_table
    }
}

/// Foreign key constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name, if the source reports one.
    pub name: Option<String>,

    /// Whether the name is deterministic (not vendor-generated).
    pub name_deterministic: bool,

    /// Referencing column names on the owning table.
    pub column_names: Vec<String>,

    /// Referenced (referee) table name.
    pub ref_table: String,

    /// Referenced column names, positionally matching `column_names`.
    pub ref_column_names: Vec<String>,

    /// ON UPDATE rule.
    pub on_update: FkRule,

    /// ON DELETE rule.
    pub on_delete: FkRule,

    /// Name of the owning table (back-reference, set on insertion).
    pub owner_table: Option<String>,
}

impl ForeignKey {
    /// Create a foreign key, validating that the referencing and referenced
    /// column lists have equal length.
    pub fn new(
        name: Option<String>,
        column_names: Vec<String>,
        ref_table: impl Into<String>,
        ref_column_names: Vec<String>,
    ) -> Result<Self> {
        if column_names.len() != ref_column_names.len() {
            return Err(MetaError::Structural(format!(
                "foreign key {:?} has {} referencing columns but {} referenced columns",
                name,
                column_names.len(),
                ref_column_names.len()
            )));
        }
        if column_names.is_empty() {
            return Err(MetaError::Structural(format!(
                "foreign key {:?} has no columns",
                name
            )));
        }
        Ok(Self {
            name,
            name_deterministic: true,
            column_names,
            ref_table: ref_table.into(),
            ref_column_names,
            on_update: FkRule::NoAction,
            on_delete: FkRule::NoAction,
            owner_table: None,
        })
    }

    /// Single-column convenience constructor.
    pub fn single(
        name: Option<String>,
        column: impl Into<String>,
        ref_table: impl Into<String>,
        ref_column: impl Into<String>,
    ) -> Self {
        // A one-to-one column pair cannot violate the arity invariant.
        Self::new(name, vec![column.into()], ref_table, vec![ref_column.into()])
            .expect("single-column FK is always well-formed")
    }

    pub fn with_rules(mut self, on_update: FkRule, on_delete: FkRule) -> Self {
        self.on_update = on_update;
        self.on_delete = on_delete;
        self
    }

    /// Set the owning table explicitly, for keys built outside a [`Table`].
    ///
    /// [`Table`]: super::Table
    pub fn with_owner(mut self, owner_table: impl Into<String>) -> Self {
        self.owner_table = Some(owner_table.into());
        self
    }

    /// Whether the key references its own table.
    pub fn is_self_referencing(&self) -> bool {
        match &self.owner_table {
            Some(owner) => owner.eq_ignore_ascii_case(&self.ref_table),
            None => false,
        }
    }

    /// Structural comparison, ignoring name and owner.
    pub fn is_identical(&self, other: &ForeignKey) -> bool {
        column_lists_identical(&self.column_names, &other.column_names)
            && self.ref_table.eq_ignore_ascii_case(&other.ref_table)
            && column_lists_identical(&self.ref_column_names, &other.ref_column_names)
            && self.on_update == other.on_update
            && self.on_delete == other.on_delete
    }
}

impl DbObject for ForeignKey {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::ForeignKey
    }

    fn owner_name(&self) -> Option<&str> {
        self.owner_table.as_deref()
    }
}

impl PartialEq for ForeignKey {
    fn eq(&self, other: &Self) -> bool {
        self.is_identical(other) && self.owner_table == other.owner_table
    }
}

/// Check constraint with an opaque SQL condition.
///
/// The referenced column set can be extracted from `condition` with
/// [`crate::scan::referenced_columns`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConstraint {
    /// Constraint name, if the source reports one.
    pub name: Option<String>,

    /// Whether the name is deterministic (not vendor-generated).
    pub name_deterministic: bool,

    /// Raw SQL condition text.
    pub condition: String,

    /// Name of the owning table (back-reference, set on insertion).
    pub owner_table: Option<String>,
}

impl CheckConstraint {
    pub fn new(name: Option<String>, condition: impl Into<String>) -> Self {
        Self {
            name,
            name_deterministic: true,
            condition: condition.into(),
            owner_table: None,
        }
    }

    /// Structural comparison, ignoring name and owner.
    pub fn is_identical(&self, other: &CheckConstraint) -> bool {
        self.condition == other.condition
    }
}

impl DbObject for CheckConstraint {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::CheckConstraint
    }

    fn owner_name(&self) -> Option<&str> {
        self.owner_table.as_deref()
    }
}

impl PartialEq for CheckConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.is_identical(other) && self.owner_table == other.owner_table
    }
}

/// Single-column not-null constraint, the object form used by nullability
/// analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotNullConstraint {
    /// Constraint name, if the source reports one.
    pub name: Option<String>,

    /// The constrained column.
    pub column_name: String,

    /// Name of the owning table (back-reference, set on insertion).
    pub owner_table: Option<String>,
}

impl NotNullConstraint {
    pub fn new(name: Option<String>, column_name: impl Into<String>) -> Self {
        Self {
            name,
            column_name: column_name.into(),
            owner_table: None,
        }
    }

    /// Structural comparison, ignoring name and owner.
    pub fn is_identical(&self, other: &NotNullConstraint) -> bool {
        self.column_name.eq_ignore_ascii_case(&other.column_name)
    }
}

impl DbObject for NotNullConstraint {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::NotNullConstraint
    }

    fn owner_name(&self) -> Option<&str> {
        self.owner_table.as_deref()
    }
}

impl PartialEq for NotNullConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.is_identical(other) && self.owner_table == other.owner_table
    }
}

/// Case-insensitive positional column list comparison.
fn column_lists_identical(a: &[String], b: &[String]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| x.eq_ignore_ascii_case(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fk_arity_invariant() {
        let err = ForeignKey::new(
            Some("fk_bad".to_string()),
            vec!["a".to_string(), "b".to_string()],
            "parent",
            vec!["id".to_string()],
        );
        assert!(matches!(err, Err(MetaError::Structural(_))));

        let ok = ForeignKey::new(
            None,
            vec!["parent_id".to_string()],
            "parent",
            vec!["id".to_string()],
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_unique_identical_but_not_equal_across_tables() {
        let mut a = UniqueConstraint::new(Some("uk1".to_string()), vec!["code".to_string()]);
        let mut b = UniqueConstraint::new(Some("uk2".to_string()), vec!["CODE".to_string()]);
        a.owner_table = Some("t1".to_string());
        b.owner_table = Some("t2".to_string());

        // Name is ignored; columns match case-insensitively
        assert!(a.is_identical(&b));
        assert!(a != b);

        b.owner_table = Some("t1".to_string());
        assert!(a == b);
    }

    #[test]
    fn test_fk_self_reference_detection() {
        let mut fk = ForeignKey::single(None, "manager_id", "employee", "id");
        assert!(!fk.is_self_referencing());
        fk.owner_table = Some("EMPLOYEE".to_string());
        assert!(fk.is_self_referencing());
        fk.owner_table = Some("department".to_string());
        assert!(!fk.is_self_referencing());
    }

    #[test]
    fn test_fk_rule_round_trip() {
        assert_eq!(FkRule::from_sql("cascade"), Some(FkRule::Cascade));
        assert_eq!(FkRule::from_sql("SET_NULL"), Some(FkRule::SetNull));
        assert_eq!(FkRule::from_sql(""), Some(FkRule::NoAction));
        assert_eq!(FkRule::from_sql("bogus"), None);
        assert_eq!(FkRule::Cascade.as_sql(), "CASCADE");
    }

    #[test]
    fn test_fk_identical_considers_rules() {
        let a = ForeignKey::single(None, "pid", "parent", "id")
            .with_rules(FkRule::NoAction, FkRule::Cascade);
        let b = ForeignKey::single(Some("named".to_string()), "pid", "parent", "id")
            .with_rules(FkRule::NoAction, FkRule::Cascade);
        let c = ForeignKey::single(None, "pid", "parent", "id");
        assert!(a.is_identical(&b));
        assert!(!a.is_identical(&c));
    }
}
