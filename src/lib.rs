//! # dbmeta
//!
//! Composite database metadata model with lazy introspection.
//!
//! The model mirrors a live database: catalogs contain schemas, schemas
//! contain tables, sequences, triggers and packages, and tables carry their
//! columns, keys, indexes and check constraints. Heavyweight aspects are
//! imported on first access through a pluggable [`Importer`], so walking a
//! thousand-table schema stays cheap until something is actually read.
//!
//! On top of the model:
//!
//! - **Dependency ordering**: [`order`] sorts tables so foreign-key targets
//!   precede their referrers.
//! - **Dialects**: [`dialect`] abstracts vendor SQL differences behind a
//!   strategy trait selected through a product-name registry.
//! - **Condition scanning**: [`scan`] parses check-constraint conditions and
//!   reports the columns they reference.
//! - **SQL rendering**: [`sql`] renders DDL and predicates and classifies
//!   raw statements.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dbmeta::{order, sql, DialectRegistry, Schema};
//!
//! fn create_script(schema: &Schema) -> dbmeta::Result<String> {
//!     let dialect = DialectRegistry::with_builtins().lookup("PostgreSQL", "14.2");
//!     let mut script = String::new();
//!     for table in order::dependency_ordered_tables(schema)? {
//!         script.push_str(&sql::render_create_table(table, dialect.as_ref(), false));
//!         script.push_str(";\n");
//!     }
//!     Ok(script)
//! }
//! ```
//!
//! [`Importer`]: model::Importer

pub mod dialect;
pub mod error;
pub mod model;
pub mod order;
pub mod scan;
pub mod sql;

// Re-exports for convenient access
pub use dialect::{Dialect, DialectRegistry, ReservedWords, SqlValue};
pub use error::{MetaError, Result};
pub use model::{
    Catalog, CheckConstraint, Column, Database, FkRule, ForeignKey, ForeignKeyPath, Importer,
    ImporterHandle, Index, NameMap, Package, PrimaryKey, Schema, Sequence, Table, TableType,
    Trigger, UniqueConstraint,
};
pub use order::dependency_ordered_tables;
