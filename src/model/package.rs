//! Stored program-unit (package) metadata.

use serde::{Deserialize, Serialize};

use super::object::{DbObject, Named, ObjectType};

/// A stored program unit (an Oracle-style package or comparable vendor
/// grouping of procedures).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// Package name.
    pub name: String,

    /// Vendor sub-object name, if the catalog reports one.
    pub sub_object_name: Option<String>,

    /// Object id in the source catalog, if reported.
    pub object_id: Option<i64>,

    /// Object type wording from the catalog, e.g. `PACKAGE BODY`.
    pub package_type: Option<String>,

    /// Compilation status, e.g. `VALID`.
    pub status: Option<String>,

    /// Documentation comment.
    pub doc: Option<String>,

    /// Name of the owning schema (back-reference, set on insertion).
    pub schema_name: Option<String>,

    /// Names of the procedures the package exposes.
    pub procedure_names: Vec<String>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_object_name: None,
            object_id: None,
            package_type: None,
            status: None,
            doc: None,
            schema_name: None,
            procedure_names: Vec::new(),
        }
    }

    /// Structural comparison, ignoring the owning schema.
    pub fn is_identical(&self, other: &Package) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.package_type == other.package_type
            && self.procedure_names == other.procedure_names
    }
}

impl Named for Package {
    fn name(&self) -> &str {
        &self.name
    }
}

impl DbObject for Package {
    fn name(&self) -> &str {
        &self.name
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Package
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn owner_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }
}
