//! Schema metadata: the container for tables, sequences, triggers and
//! packages.

use serde::{Deserialize, Serialize};

use crate::error::{MetaError, Result};

use super::import::ImporterHandle;
use super::object::{DbObject, NameMap, Named, ObjectType};
use super::package::Package;
use super::sequence::Sequence;
use super::table::Table;
use super::trigger::Trigger;

/// Schema metadata.
///
/// Table names are unique within a schema, case-insensitively. Inserting a
/// table wires the schema back-reference and hands the schema's importer down
/// so the table's lazy aspects can materialize on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name.
    pub name: String,

    /// Documentation comment.
    pub doc: Option<String>,

    /// Name of the owning catalog (back-reference, set on insertion).
    pub catalog_name: Option<String>,

    tables: NameMap<Table>,

    sequences: NameMap<Sequence>,

    triggers: NameMap<Trigger>,

    packages: NameMap<Package>,

    #[serde(skip)]
    importer: Option<ImporterHandle>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            catalog_name: None,
            tables: NameMap::new(),
            sequences: NameMap::new(),
            triggers: NameMap::new(),
            packages: NameMap::new(),
            importer: None,
        }
    }

    /// Attach the importer and propagate it to the contained tables.
    pub fn set_importer(&mut self, importer: Option<ImporterHandle>) {
        for table in self.tables.values_mut() {
            table.set_importer(importer.clone());
        }
        self.importer = importer;
    }

    // ===== Tables =====

    /// Insert a table, wiring back-reference and importer. Replaces any table
    /// with the same name (case-insensitive).
    pub fn add_table(&mut self, mut table: Table) -> &mut Self {
        table.schema_name = Some(self.name.clone());
        table.set_importer(self.importer.clone());
        self.tables.insert(table);
        self
    }

    /// Tables in insertion order.
    pub fn tables(&self) -> &[Table] {
        self.tables.as_slice()
    }

    pub fn tables_mut(&mut self) -> std::slice::IterMut<'_, Table> {
        self.tables.values_mut()
    }

    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| MetaError::not_found("table", format!("{}.{}", self.name, name)))
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        let schema = self.name.clone();
        self.tables
            .get_mut(name)
            .ok_or_else(|| MetaError::not_found("table", format!("{}.{}", schema, name)))
    }

    pub fn remove_table(&mut self, name: &str) -> Result<Table> {
        self.tables
            .remove(name)
            .ok_or_else(|| MetaError::not_found("table", format!("{}.{}", self.name, name)))
    }

    // ===== Sequences =====

    pub fn add_sequence(&mut self, mut sequence: Sequence) -> &mut Self {
        sequence.schema_name = Some(self.name.clone());
        self.sequences.insert(sequence);
        self
    }

    pub fn sequences(&self) -> &[Sequence] {
        self.sequences.as_slice()
    }

    pub fn sequence(&self, name: &str) -> Result<&Sequence> {
        self.sequences
            .get(name)
            .ok_or_else(|| MetaError::not_found("sequence", format!("{}.{}", self.name, name)))
    }

    pub fn remove_sequence(&mut self, name: &str) -> Result<Sequence> {
        self.sequences
            .remove(name)
            .ok_or_else(|| MetaError::not_found("sequence", format!("{}.{}", self.name, name)))
    }

    // ===== Triggers =====

    pub fn add_trigger(&mut self, mut trigger: Trigger) -> &mut Self {
        trigger.schema_name = Some(self.name.clone());
        self.triggers.insert(trigger);
        self
    }

    pub fn triggers(&self) -> &[Trigger] {
        self.triggers.as_slice()
    }

    pub fn remove_trigger(&mut self, name: &str) -> Result<Trigger> {
        self.triggers
            .remove(name)
            .ok_or_else(|| MetaError::not_found("trigger", format!("{}.{}", self.name, name)))
    }

    // ===== Packages =====

    pub fn add_package(&mut self, mut package: Package) -> &mut Self {
        package.schema_name = Some(self.name.clone());
        self.packages.insert(package);
        self
    }

    pub fn packages(&self) -> &[Package] {
        self.packages.as_slice()
    }

    pub fn remove_package(&mut self, name: &str) -> Result<Package> {
        self.packages
            .remove(name)
            .ok_or_else(|| MetaError::not_found("package", format!("{}.{}", self.name, name)))
    }

    /// Structural comparison: pairwise `is_identical` over children in
    /// container order.
    pub fn is_identical(&self, other: &Schema) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.tables.len() == other.tables.len()
            && self
                .tables
                .values()
                .zip(other.tables.values())
                .all(|(a, b)| a.is_identical(b))
            && self.sequences.len() == other.sequences.len()
            && self
                .sequences
                .values()
                .zip(other.sequences.values())
                .all(|(a, b)| a.is_identical(b))
    }
}

impl Named for Schema {
    fn name(&self) -> &str {
        &self.name
    }
}

impl DbObject for Schema {
    fn name(&self) -> &str {
        &self.name
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Schema
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn owner_name(&self) -> Option<&str> {
        self.catalog_name.as_deref()
    }
}
