//! Composite metadata model.
//!
//! The entity graph Database → Catalog → Schema → {Table, Sequence, Trigger,
//! Package} → {Column, Index, Constraint}, with per-aspect lazy import fed by
//! an [`Importer`](import::Importer) collaborator. Ownership is arena style:
//! composites own their children in insertion-ordered containers and
//! back-references are plain name strings.
//!
//! The model is designed for single-threaded, synchronous use; lazy-import
//! guards take `&mut self`, which enforces exclusive entry for every aspect.

pub mod column;
pub mod constraint;
pub mod database;
pub mod fkpath;
pub mod import;
pub mod index;
pub mod object;
pub mod package;
pub mod schema;
pub mod sequence;
pub mod table;
pub mod trigger;

pub use column::{parse_type_spec, Column};
pub use constraint::{
    CheckConstraint, FkRule, ForeignKey, NotNullConstraint, PrimaryKey, UniqueConstraint,
};
pub use database::{Catalog, Database};
pub use fkpath::ForeignKeyPath;
pub use import::{
    CheckRow, ColumnRow, ImportFlag, Importer, ImporterHandle, IndexRow, PkRow,
};
pub use index::Index;
pub use object::{DbObject, NameMap, Named, ObjectType};
pub use package::Package;
pub use schema::Schema;
pub use sequence::Sequence;
pub use table::{Table, TableType};
pub use trigger::Trigger;
