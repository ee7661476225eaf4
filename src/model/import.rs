//! Importer collaborator interface.
//!
//! The model never talks to a database itself. An [`Importer`] supplies raw
//! metadata rows through narrow receiver traits, one per lazily-imported
//! aspect. The lazy-import guards call the importer with a collecting
//! receiver, translate the rows into entities, insert them exactly once and
//! then mark the aspect imported.
//!
//! Importers are assumed synchronous; cancellation and timeouts are the
//! importer's responsibility. Errors propagate to the caller and leave the
//! aspect unimported so a later call may retry.

use std::sync::Arc;

use crate::error::Result;

use super::constraint::{CheckConstraint, ForeignKey};
use super::package::Package;
use super::sequence::Sequence;
use super::trigger::Trigger;

/// Raw column row as reported by the source catalog.
#[derive(Debug, Clone)]
pub struct ColumnRow {
    pub name: String,
    pub data_type: String,
    pub size: Option<u32>,
    pub fraction_digits: Option<u32>,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub doc: Option<String>,
    pub version_column: bool,
}

/// Raw primary-key row.
#[derive(Debug, Clone)]
pub struct PkRow {
    pub name: Option<String>,
    pub name_deterministic: bool,
    pub column_names: Vec<String>,
}

/// Raw index row.
#[derive(Debug, Clone)]
pub struct IndexRow {
    pub name: String,
    pub unique: bool,
    pub name_deterministic: bool,
    pub column_names: Vec<String>,
}

/// Check-constraint row attributed to a table (checks are imported per
/// schema and distributed onto tables).
#[derive(Debug, Clone)]
pub struct CheckRow {
    pub table_name: String,
    pub constraint: CheckConstraint,
}

/// Receives column rows for one table.
pub trait ColumnReceiver {
    fn receive_column(&mut self, row: ColumnRow);
}

/// Receives the primary-key row for one table, if it has one.
pub trait PkReceiver {
    fn receive_pk(&mut self, row: PkRow);
}

/// Receives index rows for one table.
pub trait IndexReceiver {
    fn receive_index(&mut self, row: IndexRow);
}

/// Receives foreign-key rows for one table.
pub trait FkReceiver {
    fn receive_fk(&mut self, fk: ForeignKey);
}

/// Receives the names of tables whose foreign keys point at one table.
pub trait ReferrerReceiver {
    fn receive_referrer(&mut self, referencing_table: String);
}

/// Receives sequence rows for one schema.
pub trait SequenceReceiver {
    fn receive_sequence(&mut self, sequence: Sequence);
}

/// Receives trigger rows for one schema.
pub trait TriggerReceiver {
    fn receive_trigger(&mut self, trigger: Trigger);
}

/// Receives package rows for one schema.
pub trait PackageReceiver {
    fn receive_package(&mut self, package: Package);
}

/// Receives check-constraint rows for one schema.
pub trait CheckReceiver {
    fn receive_check(&mut self, row: CheckRow);
}

impl ColumnReceiver for Vec<ColumnRow> {
    fn receive_column(&mut self, row: ColumnRow) {
        self.push(row);
    }
}

impl PkReceiver for Vec<PkRow> {
    fn receive_pk(&mut self, row: PkRow) {
        self.push(row);
    }
}

impl IndexReceiver for Vec<IndexRow> {
    fn receive_index(&mut self, row: IndexRow) {
        self.push(row);
    }
}

impl FkReceiver for Vec<ForeignKey> {
    fn receive_fk(&mut self, fk: ForeignKey) {
        self.push(fk);
    }
}

impl ReferrerReceiver for Vec<String> {
    fn receive_referrer(&mut self, referencing_table: String) {
        self.push(referencing_table);
    }
}

impl SequenceReceiver for Vec<Sequence> {
    fn receive_sequence(&mut self, sequence: Sequence) {
        self.push(sequence);
    }
}

impl TriggerReceiver for Vec<Trigger> {
    fn receive_trigger(&mut self, trigger: Trigger) {
        self.push(trigger);
    }
}

impl PackageReceiver for Vec<Package> {
    fn receive_package(&mut self, package: Package) {
        self.push(package);
    }
}

impl CheckReceiver for Vec<CheckRow> {
    fn receive_check(&mut self, row: CheckRow) {
        self.push(row);
    }
}

/// Supplies raw metadata rows to the model.
///
/// Table-level methods receive the owning schema and table names; schema-level
/// methods receive the schema name. Implementations must push each row exactly
/// once per call; the model handles dedup-by-name through its containers.
pub trait Importer: Send + Sync {
    /// Import column rows for a table.
    fn import_columns(
        &self,
        schema: Option<&str>,
        table: &str,
        out: &mut dyn ColumnReceiver,
    ) -> Result<()>;

    /// Import the primary-key row for a table, if one exists.
    fn import_primary_key(
        &self,
        schema: Option<&str>,
        table: &str,
        out: &mut dyn PkReceiver,
    ) -> Result<()>;

    /// Import index rows (including unique indexes) for a table.
    fn import_indexes(
        &self,
        schema: Option<&str>,
        table: &str,
        out: &mut dyn IndexReceiver,
    ) -> Result<()>;

    /// Import foreign-key rows for a table.
    fn import_foreign_keys(
        &self,
        schema: Option<&str>,
        table: &str,
        out: &mut dyn FkReceiver,
    ) -> Result<()>;

    /// Import the names of tables referencing a table via foreign keys.
    fn import_referrers(
        &self,
        schema: Option<&str>,
        table: &str,
        out: &mut dyn ReferrerReceiver,
    ) -> Result<()>;

    /// Import sequences of a schema.
    fn import_sequences(&self, schema: &str, out: &mut dyn SequenceReceiver) -> Result<()>;

    /// Import triggers of a schema.
    fn import_triggers(&self, schema: &str, out: &mut dyn TriggerReceiver) -> Result<()>;

    /// Import packages of a schema.
    fn import_packages(&self, schema: &str, out: &mut dyn PackageReceiver) -> Result<()>;

    /// Import check constraints of a schema, attributed to their tables.
    fn import_checks(&self, schema: &str, out: &mut dyn CheckReceiver) -> Result<()>;
}

impl std::fmt::Debug for dyn Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Importer")
    }
}

/// Shared handle to an importer, cloned into each entity on insertion.
pub type ImporterHandle = Arc<dyn Importer>;

/// Per-aspect fetch-once flag.
///
/// The guard methods check the flag, run the fetch, and only then mark the
/// aspect imported, so a failed import leaves the aspect retryable. Exclusive
/// entry is enforced uniformly for every aspect by `&mut self` on the guards;
/// the model is confined to one owning thread for mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportFlag {
    imported: bool,
}

impl ImportFlag {
    /// Whether the aspect has been materialized.
    pub fn is_imported(&self) -> bool {
        self.imported
    }

    /// Mark the aspect materialized. Idempotent.
    pub fn mark_imported(&mut self) {
        self.imported = true;
    }

    /// Reset the flag so the next guard call re-fetches.
    pub fn reset(&mut self) {
        self.imported = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_flag_lifecycle() {
        let mut flag = ImportFlag::default();
        assert!(!flag.is_imported());
        flag.mark_imported();
        assert!(flag.is_imported());
        flag.mark_imported();
        assert!(flag.is_imported());
        flag.reset();
        assert!(!flag.is_imported());
    }

    #[test]
    fn test_vec_receivers_collect() {
        let mut cols: Vec<ColumnRow> = Vec::new();
        cols.receive_column(ColumnRow {
            name: "id".to_string(),
            data_type: "int".to_string(),
            size: None,
            fraction_digits: None,
            nullable: false,
            default_value: None,
            doc: None,
            version_column: false,
        });
        assert_eq!(cols.len(), 1);

        let mut refs: Vec<String> = Vec::new();
        refs.receive_referrer("child".to_string());
        assert_eq!(refs, vec!["child"]);
    }
}
