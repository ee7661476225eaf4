//! Database and catalog metadata, with the database-level lazy aspects.
//!
//! Sequences, triggers, packages and check constraints are imported per
//! schema but coordinated at the database level, with the same fetch-once
//! semantics as the table aspects: the guard is a no-op once its flag is set,
//! a failed import leaves the flag false, and with no importer attached the
//! aspect is marked imported with an empty result.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MetaError, Result};

use super::import::{CheckRow, ImportFlag, ImporterHandle};
use super::object::{DbObject, NameMap, Named, ObjectType};
use super::schema::Schema;
use super::sequence::Sequence;

/// Catalog metadata: a named group of schemas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalog name.
    pub name: String,

    /// Documentation comment.
    pub doc: Option<String>,

    /// Name of the owning database environment (back-reference).
    pub database_name: Option<String>,

    schemas: NameMap<Schema>,

    #[serde(skip)]
    importer: Option<ImporterHandle>,
}

impl Catalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            database_name: None,
            schemas: NameMap::new(),
            importer: None,
        }
    }

    pub fn add_schema(&mut self, mut schema: Schema) -> &mut Self {
        schema.catalog_name = Some(self.name.clone());
        schema.set_importer(self.importer.clone());
        self.schemas.insert(schema);
        self
    }

    /// Attach the importer and propagate it to the schemas already present.
    pub(crate) fn set_importer(&mut self, importer: Option<ImporterHandle>) {
        for schema in self.schemas.values_mut() {
            schema.set_importer(importer.clone());
        }
        self.importer = importer;
    }

    pub fn schemas(&self) -> &[Schema] {
        self.schemas.as_slice()
    }

    pub fn schemas_mut(&mut self) -> std::slice::IterMut<'_, Schema> {
        self.schemas.values_mut()
    }

    pub fn schema(&self, name: &str) -> Result<&Schema> {
        self.schemas
            .get(name)
            .ok_or_else(|| MetaError::not_found("schema", format!("{}.{}", self.name, name)))
    }

    pub fn schema_mut(&mut self, name: &str) -> Result<&mut Schema> {
        let catalog = self.name.clone();
        self.schemas
            .get_mut(name)
            .ok_or_else(|| MetaError::not_found("schema", format!("{}.{}", catalog, name)))
    }

    pub fn remove_schema(&mut self, name: &str) -> Result<Schema> {
        self.schemas
            .remove(name)
            .ok_or_else(|| MetaError::not_found("schema", format!("{}.{}", self.name, name)))
    }
}

impl Named for Catalog {
    fn name(&self) -> &str {
        &self.name
    }
}

impl DbObject for Catalog {
    fn name(&self) -> &str {
        &self.name
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Catalog
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn owner_name(&self) -> Option<&str> {
        self.database_name.as_deref()
    }
}

/// Database-level import flags.
#[derive(Debug, Clone, Copy, Default)]
struct DatabaseAspects {
    sequences: ImportFlag,
    triggers: ImportFlag,
    packages: ImportFlag,
    checks: ImportFlag,
}

/// Root of the composite metadata graph.
///
/// Catalog names are unique, case-insensitively. The database also carries
/// import metadata: the connected environment id, the reported product name
/// and version, the import timestamp, table include/exclude filters, and the
/// reserved words reported by the driver (merged into a dialect's baseline
/// word set by [`Dialect::is_reserved`](crate::dialect::Dialect::is_reserved)).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    /// Environment identifier, e.g. a connection profile name.
    pub environment: String,

    /// Product name as reported by the driver, e.g. "PostgreSQL".
    pub product_name: Option<String>,

    /// Product version as reported by the driver, e.g. "14.2".
    pub product_version: Option<String>,

    /// When the structure was imported.
    pub import_date: DateTime<Utc>,

    /// Include filter pattern for table names, if configured.
    table_include: Option<String>,

    /// Exclude filter pattern for table names, if configured.
    table_exclude: Option<String>,

    /// Reserved words reported live by the driver.
    driver_reserved_words: Vec<String>,

    catalogs: NameMap<Catalog>,

    #[serde(skip)]
    include_regex: Option<Regex>,

    #[serde(skip)]
    exclude_regex: Option<Regex>,

    #[serde(skip)]
    importer: Option<ImporterHandle>,

    #[serde(skip)]
    aspects: DatabaseAspects,
}

impl Database {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            product_name: None,
            product_version: None,
            import_date: Utc::now(),
            table_include: None,
            table_exclude: None,
            driver_reserved_words: Vec::new(),
            catalogs: NameMap::new(),
            include_regex: None,
            exclude_regex: None,
            importer: None,
            aspects: DatabaseAspects::default(),
        }
    }

    pub fn with_product(
        mut self,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        self.product_name = Some(name.into());
        self.product_version = Some(version.into());
        self
    }

    /// Attach the importer and propagate it down the graph.
    pub fn set_importer(&mut self, importer: Option<ImporterHandle>) {
        for catalog in self.catalogs.values_mut() {
            catalog.set_importer(importer.clone());
        }
        self.importer = importer;
    }

    // ===== Table filters =====

    /// Set the include filter. Only table names matching the pattern are
    /// accepted by [`accepts_table`](Self::accepts_table).
    pub fn set_table_include(&mut self, pattern: Option<&str>) -> Result<()> {
        self.include_regex = compile_filter(pattern)?;
        self.table_include = pattern.map(str::to_string);
        Ok(())
    }

    /// Set the exclude filter. Table names matching the pattern are rejected.
    pub fn set_table_exclude(&mut self, pattern: Option<&str>) -> Result<()> {
        self.exclude_regex = compile_filter(pattern)?;
        self.table_exclude = pattern.map(str::to_string);
        Ok(())
    }

    /// Whether a table name passes the include/exclude filters.
    pub fn accepts_table(&self, name: &str) -> bool {
        if let Some(include) = &self.include_regex {
            if !include.is_match(name) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude_regex {
            if exclude.is_match(name) {
                return false;
            }
        }
        true
    }

    // ===== Reserved words =====

    /// Record words reported by the driver's metadata. These are merged into
    /// the dialect baseline as a superset addition, never a subtraction.
    pub fn set_driver_reserved_words(&mut self, words: Vec<String>) {
        self.driver_reserved_words = words;
    }

    pub fn driver_reserved_words(&self) -> &[String] {
        &self.driver_reserved_words
    }

    // ===== Catalogs =====

    pub fn add_catalog(&mut self, mut catalog: Catalog) -> &mut Self {
        catalog.database_name = Some(self.environment.clone());
        catalog.set_importer(self.importer.clone());
        self.catalogs.insert(catalog);
        self
    }

    pub fn catalogs(&self) -> &[Catalog] {
        self.catalogs.as_slice()
    }

    pub fn catalog(&self, name: &str) -> Result<&Catalog> {
        self.catalogs
            .get(name)
            .ok_or_else(|| MetaError::not_found("catalog", name))
    }

    pub fn catalog_mut(&mut self, name: &str) -> Result<&mut Catalog> {
        self.catalogs
            .get_mut(name)
            .ok_or_else(|| MetaError::not_found("catalog", name))
    }

    pub fn remove_catalog(&mut self, name: &str) -> Result<Catalog> {
        self.catalogs
            .remove(name)
            .ok_or_else(|| MetaError::not_found("catalog", name))
    }

    /// Find a schema by name across all catalogs.
    pub fn schema(&self, name: &str) -> Result<&Schema> {
        self.catalogs
            .values()
            .find_map(|c| c.schema(name).ok())
            .ok_or_else(|| MetaError::not_found("schema", name))
    }

    /// Find a schema by name across all catalogs, mutably.
    pub fn schema_mut(&mut self, name: &str) -> Result<&mut Schema> {
        for catalog in self.catalogs.values_mut() {
            if let Ok(schema) = catalog.schema_mut(name) {
                return Ok(schema);
            }
        }
        Err(MetaError::not_found("schema", name))
    }

    // ===== Database-level lazy aspects =====

    /// Ensure sequences are materialized for every schema. Idempotent.
    pub fn have_sequences_imported(&mut self) -> Result<()> {
        if self.aspects.sequences.is_imported() {
            return Ok(());
        }
        if let Some(importer) = self.importer.clone() {
            for catalog in self.catalogs.values_mut() {
                for schema in catalog.schemas_mut() {
                    debug!(schema = %schema.name, "importing sequences");
                    let mut rows: Vec<Sequence> = Vec::new();
                    importer.import_sequences(&schema.name, &mut rows)?;
                    for sequence in rows {
                        schema.add_sequence(sequence);
                    }
                }
            }
        }
        self.aspects.sequences.mark_imported();
        Ok(())
    }

    /// Ensure triggers are materialized for every schema. Idempotent.
    pub fn have_triggers_imported(&mut self) -> Result<()> {
        if self.aspects.triggers.is_imported() {
            return Ok(());
        }
        if let Some(importer) = self.importer.clone() {
            for catalog in self.catalogs.values_mut() {
                for schema in catalog.schemas_mut() {
                    debug!(schema = %schema.name, "importing triggers");
                    let mut rows = Vec::new();
                    importer.import_triggers(&schema.name, &mut rows)?;
                    for trigger in rows {
                        schema.add_trigger(trigger);
                    }
                }
            }
        }
        self.aspects.triggers.mark_imported();
        Ok(())
    }

    /// Ensure packages are materialized for every schema. Idempotent.
    pub fn have_packages_imported(&mut self) -> Result<()> {
        if self.aspects.packages.is_imported() {
            return Ok(());
        }
        if let Some(importer) = self.importer.clone() {
            for catalog in self.catalogs.values_mut() {
                for schema in catalog.schemas_mut() {
                    debug!(schema = %schema.name, "importing packages");
                    let mut rows = Vec::new();
                    importer.import_packages(&schema.name, &mut rows)?;
                    for package in rows {
                        schema.add_package(package);
                    }
                }
            }
        }
        self.aspects.packages.mark_imported();
        Ok(())
    }

    /// Ensure check constraints are materialized and distributed onto their
    /// tables. Idempotent.
    pub fn have_checks_imported(&mut self) -> Result<()> {
        if self.aspects.checks.is_imported() {
            return Ok(());
        }
        if let Some(importer) = self.importer.clone() {
            for catalog in self.catalogs.values_mut() {
                for schema in catalog.schemas_mut() {
                    debug!(schema = %schema.name, "importing check constraints");
                    let mut rows: Vec<CheckRow> = Vec::new();
                    importer.import_checks(&schema.name, &mut rows)?;
                    for row in rows {
                        match schema.table_mut(&row.table_name) {
                            Ok(table) => {
                                table.add_check_constraint(row.constraint);
                            }
                            Err(_) => {
                                // The table may have been filtered out of the import.
                                warn!(
                                    schema = %schema.name,
                                    table = %row.table_name,
                                    "check constraint references unknown table, skipping"
                                );
                            }
                        }
                    }
                }
            }
        }
        self.aspects.checks.mark_imported();
        Ok(())
    }
}

impl Named for Database {
    fn name(&self) -> &str {
        &self.environment
    }
}

impl DbObject for Database {
    fn name(&self) -> &str {
        &self.environment
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Database
    }
}

fn compile_filter(pattern: Option<&str>) -> Result<Option<Regex>> {
    match pattern {
        Some(p) => Regex::new(p)
            .map(Some)
            .map_err(|e| MetaError::Config(format!("invalid table filter pattern {:?}: {}", p, e))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::model::constraint::CheckConstraint;
    use crate::model::import::{
        CheckReceiver, ColumnReceiver, FkReceiver, Importer, IndexReceiver, PackageReceiver,
        PkReceiver, ReferrerReceiver, SequenceReceiver, TriggerReceiver,
    };
    use crate::model::package::Package;
    use crate::model::table::Table;
    use crate::model::trigger::Trigger;

    use super::*;

    #[derive(Default)]
    struct SchemaLevelImporter {
        sequence_calls: AtomicUsize,
        trigger_calls: AtomicUsize,
    }

    impl Importer for SchemaLevelImporter {
        fn import_columns(
            &self,
            _schema: Option<&str>,
            _table: &str,
            out: &mut dyn ColumnReceiver,
        ) -> Result<()> {
            out.receive_column(crate::model::import::ColumnRow {
                name: "id".to_string(),
                data_type: "int".to_string(),
                size: None,
                fraction_digits: None,
                nullable: false,
                default_value: None,
                doc: None,
                version_column: false,
            });
            Ok(())
        }

        fn import_primary_key(
            &self,
            _schema: Option<&str>,
            _table: &str,
            _out: &mut dyn PkReceiver,
        ) -> Result<()> {
            Ok(())
        }

        fn import_indexes(
            &self,
            _schema: Option<&str>,
            _table: &str,
            _out: &mut dyn IndexReceiver,
        ) -> Result<()> {
            Ok(())
        }

        fn import_foreign_keys(
            &self,
            _schema: Option<&str>,
            _table: &str,
            _out: &mut dyn FkReceiver,
        ) -> Result<()> {
            Ok(())
        }

        fn import_referrers(
            &self,
            _schema: Option<&str>,
            _table: &str,
            _out: &mut dyn ReferrerReceiver,
        ) -> Result<()> {
            Ok(())
        }

        fn import_sequences(&self, _schema: &str, out: &mut dyn SequenceReceiver) -> Result<()> {
            self.sequence_calls.fetch_add(1, Ordering::SeqCst);
            out.receive_sequence(Sequence::new("seq_id").with_start(100));
            Ok(())
        }

        fn import_triggers(&self, _schema: &str, out: &mut dyn TriggerReceiver) -> Result<()> {
            self.trigger_calls.fetch_add(1, Ordering::SeqCst);
            let mut trigger = Trigger::new("trg_audit");
            trigger.table_name = Some("orders".to_string());
            trigger.triggering_event = Some("INSERT OR UPDATE".to_string());
            out.receive_trigger(trigger);
            Ok(())
        }

        fn import_packages(&self, _schema: &str, out: &mut dyn PackageReceiver) -> Result<()> {
            out.receive_package(Package::new("pkg_orders"));
            Ok(())
        }

        fn import_checks(&self, _schema: &str, out: &mut dyn CheckReceiver) -> Result<()> {
            out.receive_check(CheckRow {
                table_name: "orders".to_string(),
                constraint: CheckConstraint::new(Some("chk_qty".to_string()), "qty > 0"),
            });
            out.receive_check(CheckRow {
                table_name: "missing".to_string(),
                constraint: CheckConstraint::new(None, "x > 0"),
            });
            Ok(())
        }
    }

    fn database_with_schema() -> Database {
        let mut db = Database::new("test-env");
        let mut catalog = Catalog::new("main");
        let mut schema = Schema::new("public");
        schema.add_table(Table::new("orders"));
        catalog.add_schema(schema);
        db.add_catalog(catalog);
        db
    }

    #[test]
    fn test_sequences_imported_once() {
        let importer = Arc::new(SchemaLevelImporter::default());
        let mut db = database_with_schema();
        db.set_importer(Some(importer.clone()));

        db.have_sequences_imported().unwrap();
        db.have_sequences_imported().unwrap();
        assert_eq!(importer.sequence_calls.load(Ordering::SeqCst), 1);

        let schema = db.schema("public").unwrap();
        assert_eq!(schema.sequences().len(), 1);
        assert_eq!(schema.sequences()[0].start, 100);
    }

    #[test]
    fn test_triggers_imported_once() {
        let importer = Arc::new(SchemaLevelImporter::default());
        let mut db = database_with_schema();
        db.set_importer(Some(importer.clone()));

        db.have_triggers_imported().unwrap();
        db.have_triggers_imported().unwrap();
        assert_eq!(importer.trigger_calls.load(Ordering::SeqCst), 1);

        let schema = db.schema("public").unwrap();
        assert_eq!(schema.triggers().len(), 1);
        assert_eq!(schema.triggers()[0].table_name.as_deref(), Some("orders"));
    }

    #[test]
    fn test_packages_imported() {
        let importer = Arc::new(SchemaLevelImporter::default());
        let mut db = database_with_schema();
        db.set_importer(Some(importer));

        db.have_packages_imported().unwrap();
        let schema = db.schema("public").unwrap();
        assert_eq!(schema.packages().len(), 1);
        assert_eq!(schema.packages()[0].name, "pkg_orders");
    }

    #[test]
    fn test_schema_added_after_importer_still_imports() {
        let importer = Arc::new(SchemaLevelImporter::default());
        let mut db = database_with_schema();
        db.set_importer(Some(importer));

        let mut late = Schema::new("audit");
        late.add_table(Table::new("events"));
        db.catalog_mut("main").unwrap().add_schema(late);

        let table = db
            .catalog_mut("main")
            .unwrap()
            .schema_mut("audit")
            .unwrap()
            .table_mut("events")
            .unwrap();
        table.have_columns_imported().unwrap();
        assert_eq!(table.columns().len(), 1);
    }

    #[test]
    fn test_checks_distributed_to_tables() {
        let importer = Arc::new(SchemaLevelImporter::default());
        let mut db = database_with_schema();
        db.set_importer(Some(importer));

        db.have_checks_imported().unwrap();
        let table = db.schema("public").unwrap().table("orders").unwrap();
        assert_eq!(table.check_constraints().len(), 1);
        assert_eq!(table.check_constraints()[0].condition, "qty > 0");
    }

    #[test]
    fn test_table_filters() {
        let mut db = Database::new("env");
        db.set_table_include(Some("^app_.*")).unwrap();
        db.set_table_exclude(Some(".*_tmp$")).unwrap();

        assert!(db.accepts_table("app_users"));
        assert!(!db.accepts_table("sys_config"));
        assert!(!db.accepts_table("app_users_tmp"));

        assert!(db.set_table_include(Some("(unclosed")).is_err());
    }

    #[test]
    fn test_catalog_names_unique_case_insensitive() {
        let mut db = Database::new("env");
        db.add_catalog(Catalog::new("Main"));
        db.add_catalog(Catalog::new("MAIN"));
        assert_eq!(db.catalogs().len(), 1);
    }
}
