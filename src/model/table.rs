//! Table metadata with per-aspect lazy import.
//!
//! Each table-level aspect (columns, primary key, indexes plus unique
//! constraints, foreign keys, referrer tables) has its own fetch-once guard.
//! A guard is a no-op once its flag is set; otherwise it first materializes
//! the aspects it depends on (columns before the primary key, the primary key
//! before indexes and foreign keys), then invokes the attached [`Importer`]
//! with a typed receiver and finally sets the flag. With no importer attached
//! the guard marks the aspect imported with an empty result, which lets the
//! model double as a fully synthetic in-memory graph.
//!
//! A failed import leaves the flag false, so the aspect stays retryable.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MetaError, Result};

use super::column::Column;
use super::constraint::{CheckConstraint, ForeignKey, NotNullConstraint, PrimaryKey, UniqueConstraint};
use super::import::{ColumnRow, ImportFlag, ImporterHandle, IndexRow, PkRow};
use super::index::Index;
use super::object::{DbObject, NameMap, Named, ObjectType};

/// Table kind as reported by catalog metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TableType {
    #[default]
    Table,
    View,
    SystemTable,
    GlobalTemporary,
    LocalTemporary,
    Alias,
    Synonym,
}

impl TableType {
    /// Parse the catalog wording, e.g. `"SYSTEM TABLE"`.
    pub fn from_catalog(text: &str) -> Self {
        match text.trim().to_uppercase().replace('_', " ").as_str() {
            "VIEW" => TableType::View,
            "SYSTEM TABLE" => TableType::SystemTable,
            "GLOBAL TEMPORARY" => TableType::GlobalTemporary,
            "LOCAL TEMPORARY" => TableType::LocalTemporary,
            "ALIAS" => TableType::Alias,
            "SYNONYM" => TableType::Synonym,
            _ => TableType::Table,
        }
    }
}

/// Per-aspect import flags of a table.
#[derive(Debug, Clone, Copy, Default)]
struct TableAspects {
    columns: ImportFlag,
    pk: ImportFlag,
    indexes: ImportFlag,
    fks: ImportFlag,
    referrers: ImportFlag,
}

/// Table metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,

    /// Table kind (TABLE, VIEW, ...).
    pub table_type: TableType,

    /// Documentation comment.
    pub doc: Option<String>,

    /// Name of the owning schema (back-reference, set on insertion).
    pub schema_name: Option<String>,

    columns: NameMap<Column>,

    primary_key: Option<PrimaryKey>,

    uniques: Vec<UniqueConstraint>,

    indexes: NameMap<Index>,

    foreign_keys: Vec<ForeignKey>,

    checks: Vec<CheckConstraint>,

    /// Names of tables whose foreign keys point at this table.
    referrers: Vec<String>,

    #[serde(skip)]
    importer: Option<ImporterHandle>,

    #[serde(skip)]
    aspects: TableAspects,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_type: TableType::Table,
            doc: None,
            schema_name: None,
            columns: NameMap::new(),
            primary_key: None,
            uniques: Vec::new(),
            indexes: NameMap::new(),
            foreign_keys: Vec::new(),
            checks: Vec::new(),
            referrers: Vec::new(),
            importer: None,
            aspects: TableAspects::default(),
        }
    }

    pub fn with_type(mut self, table_type: TableType) -> Self {
        self.table_type = table_type;
        self
    }

    /// Attach the importer collaborator used by the lazy-import guards.
    pub fn set_importer(&mut self, importer: Option<ImporterHandle>) {
        self.importer = importer;
    }

    /// Fully qualified name for messages and logs.
    pub fn qualified_name(&self) -> String {
        match &self.schema_name {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    // ===== Lazy import guards =====

    /// Ensure the column aspect is materialized. Idempotent.
    pub fn have_columns_imported(&mut self) -> Result<()> {
        if self.aspects.columns.is_imported() {
            return Ok(());
        }
        if let Some(importer) = self.importer.clone() {
            debug!(table = %self.qualified_name(), "importing columns");
            let mut rows: Vec<ColumnRow> = Vec::new();
            importer.import_columns(self.schema_name.as_deref(), &self.name, &mut rows)?;
            for row in rows {
                let mut column = Column::new(row.name, row.data_type);
                column.size = row.size;
                column.fraction_digits = row.fraction_digits;
                column.nullable = row.nullable;
                column.default_value = row.default_value;
                column.doc = row.doc;
                column.version_column = row.version_column;
                self.add_column(column);
            }
        }
        self.aspects.columns.mark_imported();
        Ok(())
    }

    /// Ensure the primary-key aspect is materialized. Requires columns.
    pub fn have_pk_imported(&mut self) -> Result<()> {
        if self.aspects.pk.is_imported() {
            return Ok(());
        }
        self.have_columns_imported()?;
        if let Some(importer) = self.importer.clone() {
            debug!(table = %self.qualified_name(), "importing primary key");
            let mut rows: Vec<PkRow> = Vec::new();
            importer.import_primary_key(self.schema_name.as_deref(), &self.name, &mut rows)?;
            if let Some(row) = rows.into_iter().next() {
                let mut pk = PrimaryKey::new(row.name, row.column_names);
                pk.name_deterministic = row.name_deterministic;
                self.set_primary_key(pk)?;
            }
        }
        self.aspects.pk.mark_imported();
        Ok(())
    }

    /// Ensure indexes and the unique constraints they back are materialized.
    /// Requires the primary key.
    pub fn have_indexes_imported(&mut self) -> Result<()> {
        if self.aspects.indexes.is_imported() {
            return Ok(());
        }
        self.have_pk_imported()?;
        if let Some(importer) = self.importer.clone() {
            debug!(table = %self.qualified_name(), "importing indexes");
            let mut rows: Vec<IndexRow> = Vec::new();
            importer.import_indexes(self.schema_name.as_deref(), &self.name, &mut rows)?;
            for row in rows {
                let mut index = Index::new(row.name, row.unique, row.column_names);
                index.name_deterministic = row.name_deterministic;
                // A unique index that is not the PK's backing index carries a
                // unique constraint with the same column list.
                if index.unique && !self.is_pk_column_list(&index.column_names) {
                    let mut uk = UniqueConstraint::new(
                        Some(index.name.clone()),
                        index.column_names.clone(),
                    );
                    uk.name_deterministic = index.name_deterministic;
                    index.backing_constraint = Some(index.name.clone());
                    self.add_unique_constraint(uk);
                }
                self.add_index(index);
            }
        }
        self.aspects.indexes.mark_imported();
        Ok(())
    }

    /// Ensure foreign keys are materialized. Requires the primary key.
    pub fn have_fks_imported(&mut self) -> Result<()> {
        if self.aspects.fks.is_imported() {
            return Ok(());
        }
        self.have_pk_imported()?;
        if let Some(importer) = self.importer.clone() {
            debug!(table = %self.qualified_name(), "importing foreign keys");
            let mut rows: Vec<ForeignKey> = Vec::new();
            importer.import_foreign_keys(self.schema_name.as_deref(), &self.name, &mut rows)?;
            for fk in rows {
                self.add_foreign_key(fk);
            }
        }
        self.aspects.fks.mark_imported();
        Ok(())
    }

    /// Ensure referrer table names are materialized. Requires the primary key.
    pub fn have_referrers_imported(&mut self) -> Result<()> {
        if self.aspects.referrers.is_imported() {
            return Ok(());
        }
        self.have_pk_imported()?;
        if let Some(importer) = self.importer.clone() {
            debug!(table = %self.qualified_name(), "importing referrers");
            let mut rows: Vec<String> = Vec::new();
            importer.import_referrers(self.schema_name.as_deref(), &self.name, &mut rows)?;
            for referrer in rows {
                self.add_referrer(referrer);
            }
        }
        self.aspects.referrers.mark_imported();
        Ok(())
    }

    /// Materialize every table-level aspect.
    pub fn import_all(&mut self) -> Result<()> {
        self.have_columns_imported()?;
        self.have_pk_imported()?;
        self.have_indexes_imported()?;
        self.have_fks_imported()?;
        self.have_referrers_imported()?;
        Ok(())
    }

    // ===== Columns =====

    /// Insert a column, setting its back-reference. Replaces any column with
    /// the same name (case-insensitive).
    pub fn add_column(&mut self, mut column: Column) -> &mut Self {
        column.owner_table = Some(self.name.clone());
        self.columns.insert(column);
        self
    }

    /// Columns in catalog order.
    pub fn columns(&self) -> &[Column] {
        self.columns.as_slice()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| MetaError::not_found("column", format!("{}.{}", self.name, name)))
    }

    pub fn column_mut(&mut self, name: &str) -> Result<&mut Column> {
        let table = self.name.clone();
        self.columns
            .get_mut(name)
            .ok_or_else(|| MetaError::not_found("column", format!("{}.{}", table, name)))
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.names().map(str::to_string).collect()
    }

    /// Remove a column by name.
    pub fn remove_column(&mut self, name: &str) -> Result<Column> {
        self.columns
            .remove(name)
            .ok_or_else(|| MetaError::not_found("column", format!("{}.{}", self.name, name)))
    }

    // ===== Primary key =====

    /// Set the primary key, validating that every key column exists.
    pub fn set_primary_key(&mut self, mut pk: PrimaryKey) -> Result<()> {
        for col in &pk.column_names {
            if !self.columns.contains(col) {
                return Err(MetaError::Structural(format!(
                    "primary key of table {} references unknown column {}",
                    self.name, col
                )));
            }
        }
        pk.owner_table = Some(self.name.clone());
        self.primary_key = Some(pk);
        Ok(())
    }

    pub fn primary_key(&self) -> Option<&PrimaryKey> {
        self.primary_key.as_ref()
    }

    pub fn remove_primary_key(&mut self) -> Option<PrimaryKey> {
        self.primary_key.take()
    }

    /// Key column names, empty when the table has no primary key.
    pub fn pk_column_names(&self) -> &[String] {
        match &self.primary_key {
            Some(pk) => &pk.column_names,
            None => &[],
        }
    }

    fn is_pk_column_list(&self, columns: &[String]) -> bool {
        let pk = self.pk_column_names();
        pk.len() == columns.len()
            && pk
                .iter()
                .zip(columns.iter())
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    // ===== Unique constraints =====

    pub fn add_unique_constraint(&mut self, mut uk: UniqueConstraint) -> &mut Self {
        uk.owner_table = Some(self.name.clone());
        self.uniques.push(uk);
        self
    }

    pub fn unique_constraints(&self) -> &[UniqueConstraint] {
        &self.uniques
    }

    /// Remove the unique constraint with the given name.
    pub fn remove_unique_constraint(&mut self, name: &str) -> Result<UniqueConstraint> {
        match self
            .uniques
            .iter()
            .position(|uk| uk.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
        {
            Some(pos) => Ok(self.uniques.remove(pos)),
            None => Err(MetaError::not_found(
                "unique constraint",
                format!("{}.{}", self.name, name),
            )),
        }
    }

    // ===== Indexes =====

    pub fn add_index(&mut self, mut index: Index) -> &mut Self {
        index.owner_table = Some(self.name.clone());
        self.indexes.insert(index);
        self
    }

    pub fn indexes(&self) -> &[Index] {
        self.indexes.as_slice()
    }

    pub fn index(&self, name: &str) -> Result<&Index> {
        self.indexes
            .get(name)
            .ok_or_else(|| MetaError::not_found("index", format!("{}.{}", self.name, name)))
    }

    pub fn remove_index(&mut self, name: &str) -> Result<Index> {
        self.indexes
            .remove(name)
            .ok_or_else(|| MetaError::not_found("index", format!("{}.{}", self.name, name)))
    }

    // ===== Foreign keys =====

    pub fn add_foreign_key(&mut self, mut fk: ForeignKey) -> &mut Self {
        fk.owner_table = Some(self.name.clone());
        self.foreign_keys.push(fk);
        self
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Remove the foreign key with the given constraint name.
    pub fn remove_foreign_key(&mut self, name: &str) -> Result<ForeignKey> {
        match self
            .foreign_keys
            .iter()
            .position(|fk| fk.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
        {
            Some(pos) => Ok(self.foreign_keys.remove(pos)),
            None => Err(MetaError::not_found(
                "foreign key",
                format!("{}.{}", self.name, name),
            )),
        }
    }

    // ===== Check constraints =====

    pub fn add_check_constraint(&mut self, mut check: CheckConstraint) -> &mut Self {
        check.owner_table = Some(self.name.clone());
        self.checks.push(check);
        self
    }

    pub fn check_constraints(&self) -> &[CheckConstraint] {
        &self.checks
    }

    pub fn remove_check_constraint(&mut self, name: &str) -> Result<CheckConstraint> {
        match self
            .checks
            .iter()
            .position(|c| c.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
        {
            Some(pos) => Ok(self.checks.remove(pos)),
            None => Err(MetaError::not_found(
                "check constraint",
                format!("{}.{}", self.name, name),
            )),
        }
    }

    /// Not-null constraints derived from the non-nullable columns.
    pub fn not_null_constraints(&self) -> Vec<NotNullConstraint> {
        self.columns
            .values()
            .filter(|c| !c.nullable)
            .map(|c| {
                let mut nn = NotNullConstraint::new(None, c.name.clone());
                nn.owner_table = Some(self.name.clone());
                nn
            })
            .collect()
    }

    // ===== Referrers =====

    /// Record a referencing table name, case-insensitively deduplicated.
    pub fn add_referrer(&mut self, referrer: String) -> &mut Self {
        if !self
            .referrers
            .iter()
            .any(|r| r.eq_ignore_ascii_case(&referrer))
        {
            self.referrers.push(referrer);
        }
        self
    }

    /// Names of tables whose foreign keys point at this table.
    pub fn referrers(&self) -> &[String] {
        &self.referrers
    }

    // ===== Identity =====

    /// Structural comparison: same kind, same component counts, then pairwise
    /// `is_identical` over children in container order. Back-references are
    /// ignored.
    pub fn is_identical(&self, other: &Table) -> bool {
        if !self.name.eq_ignore_ascii_case(&other.name) || self.table_type != other.table_type {
            return false;
        }
        let pk_matches = match (&self.primary_key, &other.primary_key) {
            (Some(a), Some(b)) => a.is_identical(b),
            (None, None) => true,
            _ => false,
        };
        pk_matches
            && pairwise(self.columns.as_slice(), other.columns.as_slice(), Column::is_identical)
            && pairwise(&self.uniques, &other.uniques, UniqueConstraint::is_identical)
            && pairwise(self.indexes.as_slice(), other.indexes.as_slice(), Index::is_identical)
            && pairwise(&self.foreign_keys, &other.foreign_keys, ForeignKey::is_identical)
            && pairwise(&self.checks, &other.checks, CheckConstraint::is_identical)
    }
}

fn pairwise<T>(a: &[T], b: &[T], identical: impl Fn(&T, &T) -> bool) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| identical(x, y))
}

impl Named for Table {
    fn name(&self) -> &str {
        &self.name
    }
}

impl DbObject for Table {
    fn name(&self) -> &str {
        &self.name
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Table
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn owner_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }
}

/// Owner-anchored equality: identical structure within the same schema.
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.is_identical(other) && self.schema_name == other.schema_name
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::error::MetaError;
    use crate::model::import::{
        CheckReceiver, ColumnReceiver, FkReceiver, Importer, IndexReceiver, PackageReceiver,
        PkReceiver, ReferrerReceiver, SequenceReceiver, TriggerReceiver,
    };

    use super::*;

    /// Importer that counts calls and serves a fixed three-column table.
    #[derive(Default)]
    struct CountingImporter {
        column_calls: AtomicUsize,
        pk_calls: AtomicUsize,
        fail_columns: bool,
    }

    impl Importer for CountingImporter {
        fn import_columns(
            &self,
            _schema: Option<&str>,
            table: &str,
            out: &mut dyn ColumnReceiver,
        ) -> crate::error::Result<()> {
            self.column_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_columns {
                return Err(MetaError::import("columns", table, "connection lost"));
            }
            for (name, data_type, nullable, version) in [
                ("id", "int", false, false),
                ("code", "varchar", true, false),
                ("rev", "bigint", false, true),
            ] {
                out.receive_column(ColumnRow {
                    name: name.to_string(),
                    data_type: data_type.to_string(),
                    size: None,
                    fraction_digits: None,
                    nullable,
                    default_value: None,
                    doc: None,
                    version_column: version,
                });
            }
            Ok(())
        }

        fn import_primary_key(
            &self,
            _schema: Option<&str>,
            _table: &str,
            out: &mut dyn PkReceiver,
        ) -> crate::error::Result<()> {
            self.pk_calls.fetch_add(1, Ordering::SeqCst);
            out.receive_pk(PkRow {
                name: Some("pk_t".to_string()),
                name_deterministic: true,
                column_names: vec!["id".to_string()],
            });
            Ok(())
        }

        fn import_indexes(
            &self,
            _schema: Option<&str>,
            _table: &str,
            out: &mut dyn IndexReceiver,
        ) -> crate::error::Result<()> {
            out.receive_index(IndexRow {
                name: "uk_code".to_string(),
                unique: true,
                name_deterministic: true,
                column_names: vec!["code".to_string()],
            });
            Ok(())
        }

        fn import_foreign_keys(
            &self,
            _schema: Option<&str>,
            _table: &str,
            _out: &mut dyn FkReceiver,
        ) -> crate::error::Result<()> {
            Ok(())
        }

        fn import_referrers(
            &self,
            _schema: Option<&str>,
            _table: &str,
            out: &mut dyn ReferrerReceiver,
        ) -> crate::error::Result<()> {
            out.receive_referrer("child".to_string());
            Ok(())
        }

        fn import_sequences(
            &self,
            _schema: &str,
            _out: &mut dyn SequenceReceiver,
        ) -> crate::error::Result<()> {
            Ok(())
        }

        fn import_triggers(
            &self,
            _schema: &str,
            _out: &mut dyn TriggerReceiver,
        ) -> crate::error::Result<()> {
            Ok(())
        }

        fn import_packages(
            &self,
            _schema: &str,
            _out: &mut dyn PackageReceiver,
        ) -> crate::error::Result<()> {
            Ok(())
        }

        fn import_checks(
            &self,
            _schema: &str,
            _out: &mut dyn CheckReceiver,
        ) -> crate::error::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lazy_import_is_idempotent() {
        let importer = Arc::new(CountingImporter::default());
        let mut table = Table::new("t");
        table.set_importer(Some(importer.clone()));

        table.have_columns_imported().unwrap();
        table.have_columns_imported().unwrap();
        assert_eq!(importer.column_calls.load(Ordering::SeqCst), 1);
        assert_eq!(table.columns().len(), 3);
    }

    #[test]
    fn test_version_column_flag_carried_from_import() {
        let importer = Arc::new(CountingImporter::default());
        let mut table = Table::new("t");
        table.set_importer(Some(importer));

        table.have_columns_imported().unwrap();
        assert!(table.column("rev").unwrap().version_column);
        assert!(!table.column("id").unwrap().version_column);
    }

    #[test]
    fn test_debug_output_includes_name_with_importer_attached() {
        let mut table = Table::new("t");
        table.set_importer(Some(Arc::new(CountingImporter::default())));
        let rendered = format!("{table:?}");
        assert!(rendered.contains("\"t\""));
    }

    #[test]
    fn test_pk_import_pulls_columns_first() {
        let importer = Arc::new(CountingImporter::default());
        let mut table = Table::new("t");
        table.set_importer(Some(importer.clone()));

        table.have_pk_imported().unwrap();
        assert_eq!(importer.column_calls.load(Ordering::SeqCst), 1);
        assert_eq!(importer.pk_calls.load(Ordering::SeqCst), 1);
        assert_eq!(table.pk_column_names(), ["id"]);
    }

    #[test]
    fn test_unique_index_produces_unique_constraint() {
        let importer = Arc::new(CountingImporter::default());
        let mut table = Table::new("t");
        table.set_importer(Some(importer));

        table.have_indexes_imported().unwrap();
        assert_eq!(table.indexes().len(), 1);
        assert_eq!(table.unique_constraints().len(), 1);
        assert_eq!(
            table.indexes()[0].backing_constraint.as_deref(),
            Some("uk_code")
        );
    }

    #[test]
    fn test_failed_import_stays_retryable() {
        let importer = Arc::new(CountingImporter {
            fail_columns: true,
            ..Default::default()
        });
        let mut table = Table::new("t");
        table.set_importer(Some(importer.clone()));

        assert!(table.have_columns_imported().is_err());
        // Flag stays false, so the next call hits the importer again.
        assert!(table.have_columns_imported().is_err());
        assert_eq!(importer.column_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_no_importer_marks_aspect_empty() {
        let mut table = Table::new("t");
        table.import_all().unwrap();
        assert!(table.columns().is_empty());
        assert!(table.primary_key().is_none());
    }

    #[test]
    fn test_pk_requires_known_columns() {
        let mut table = Table::new("t");
        table.add_column(Column::new("id", "int"));
        let err = table.set_primary_key(PrimaryKey::new(None, vec!["missing".to_string()]));
        assert!(matches!(err, Err(MetaError::Structural(_))));
        assert!(table
            .set_primary_key(PrimaryKey::new(None, vec!["ID".to_string()]))
            .is_ok());
    }

    #[test]
    fn test_remove_operations_are_explicit() {
        let mut table = Table::new("t");
        table.add_column(Column::new("id", "int"));
        assert!(table.remove_column("id").is_ok());
        assert!(matches!(
            table.remove_column("id"),
            Err(MetaError::NotFound { .. })
        ));
    }

    #[test]
    fn test_referrers_deduplicated() {
        let mut table = Table::new("t");
        table.add_referrer("child".to_string());
        table.add_referrer("CHILD".to_string());
        assert_eq!(table.referrers(), ["child"]);
    }

    #[test]
    fn test_is_identical_recurses_over_children() {
        let mut a = Table::new("t");
        a.add_column(Column::new("id", "int").not_null());
        a.set_primary_key(PrimaryKey::new(Some("pk_a".to_string()), vec!["id".to_string()]))
            .unwrap();

        let mut b = Table::new("T");
        b.add_column(Column::new("ID", "INT").not_null());
        b.set_primary_key(PrimaryKey::new(Some("pk_b".to_string()), vec!["id".to_string()]))
            .unwrap();

        assert!(a.is_identical(&b));

        b.add_column(Column::new("extra", "varchar"));
        assert!(!a.is_identical(&b));
    }
}
