//! Trigger metadata.

use serde::{Deserialize, Serialize};

use super::object::{DbObject, Named, ObjectType};

/// Trigger metadata as reported by the source catalog.
///
/// The body is carried as opaque vendor SQL; the model does not interpret it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    /// Trigger name.
    pub name: String,

    /// Trigger type, e.g. `BEFORE EACH ROW` (vendor wording preserved).
    pub trigger_type: Option<String>,

    /// Triggering event, e.g. `INSERT OR UPDATE`.
    pub triggering_event: Option<String>,

    /// Name of the table the trigger fires on.
    pub table_name: Option<String>,

    /// Condition restricting when the trigger fires, if any.
    pub when_clause: Option<String>,

    /// Whether the trigger is enabled.
    pub enabled: bool,

    /// Trigger body (opaque vendor SQL).
    pub body: Option<String>,

    /// Documentation comment.
    pub doc: Option<String>,

    /// Name of the owning schema (back-reference, set on insertion).
    pub schema_name: Option<String>,
}

impl Trigger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trigger_type: None,
            triggering_event: None,
            table_name: None,
            when_clause: None,
            enabled: true,
            body: None,
            doc: None,
            schema_name: None,
        }
    }

    /// Structural comparison, ignoring the owning schema.
    pub fn is_identical(&self, other: &Trigger) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.trigger_type == other.trigger_type
            && self.triggering_event == other.triggering_event
            && self.table_name == other.table_name
            && self.body == other.body
    }
}

impl Named for Trigger {
    fn name(&self) -> &str {
        &self.name
    }
}

impl DbObject for Trigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Trigger
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn owner_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }
}
