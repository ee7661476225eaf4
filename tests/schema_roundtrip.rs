//! End-to-end walk over a small synthetic schema: build it, order it,
//! render DDL for it, and round-trip it through JSON.

use dbmeta::{
    dependency_ordered_tables, sql, Column, DialectRegistry, ForeignKey, PrimaryKey, Schema, Table,
};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn sample_schema() -> Schema {
    init_logging();
    let mut parent = Table::new("parent");
    parent.add_column(Column::new("id", "int").not_null());
    parent.add_column(Column::new("name", "varchar").with_size(50));
    parent
        .set_primary_key(PrimaryKey::new(Some("pk_parent".into()), vec!["id".into()]))
        .unwrap();

    let mut child = Table::new("child");
    child.add_column(Column::new("id", "int").not_null());
    child.add_column(Column::new("parent_id", "int").not_null());
    child
        .set_primary_key(PrimaryKey::new(Some("pk_child".into()), vec!["id".into()]))
        .unwrap();
    child.add_foreign_key(ForeignKey::single(
        Some("fk_child_parent".into()),
        "parent_id",
        "parent",
        "id",
    ));

    let mut schema = Schema::new("app");
    // Child inserted first on purpose; ordering must fix this
    schema.add_table(child);
    schema.add_table(parent);
    schema
}

#[test]
fn dependency_order_puts_parent_first() {
    let schema = sample_schema();
    let ordered = dependency_ordered_tables(&schema).unwrap();
    let names: Vec<&str> = ordered.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["parent", "child"]);
}

#[test]
fn create_script_renders_in_dependency_order() {
    let schema = sample_schema();
    let dialect = DialectRegistry::with_builtins().lookup("PostgreSQL", "14.2");

    let mut script = String::new();
    for table in dependency_ordered_tables(&schema).unwrap() {
        script.push_str(&sql::render_create_table(table, dialect.as_ref(), false));
        script.push_str(";\n");
    }
    for table in schema.tables() {
        for fk in table.foreign_keys() {
            script.push_str(&sql::render_add_foreign_key(
                &table.name,
                fk,
                dialect.as_ref(),
            ));
            script.push_str(";\n");
        }
    }

    assert_eq!(
        script,
        "CREATE TABLE parent (\n    \
         id int NOT NULL,\n    \
         name varchar(50),\n    \
         CONSTRAINT pk_parent PRIMARY KEY (id)\n);\n\
         CREATE TABLE child (\n    \
         id int NOT NULL,\n    \
         parent_id int NOT NULL,\n    \
         CONSTRAINT pk_child PRIMARY KEY (id)\n);\n\
         ALTER TABLE child ADD CONSTRAINT fk_child_parent \
         FOREIGN KEY (parent_id) REFERENCES parent (id);\n"
    );
}

#[test]
fn schema_survives_json_round_trip() {
    let schema = sample_schema();
    let json = serde_json::to_string_pretty(&schema).unwrap();
    let restored: Schema = serde_json::from_str(&json).unwrap();

    assert!(schema.is_identical(&restored));
    let child = restored.table("child").unwrap();
    assert_eq!(child.pk_column_names(), ["id"]);
    assert_eq!(child.foreign_keys()[0].ref_table, "parent");
    // Back-references are rebuilt from the serialized owner fields
    assert_eq!(child.columns()[0].owner_table.as_deref(), Some("child"));
}

#[test]
fn lookup_is_case_insensitive_after_restore() {
    let schema = sample_schema();
    let json = serde_json::to_string(&schema).unwrap();
    let restored: Schema = serde_json::from_str(&json).unwrap();
    assert!(restored.table("PARENT").is_ok());
    assert!(restored.table("missing").is_err());
}
