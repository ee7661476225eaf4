//! SQL rendering and statement classification.
//!
//! Renders DDL and predicates from the metadata model through a [`Dialect`],
//! and classifies raw SQL text (query vs. DDL vs. DML) after stripping
//! comments and normalizing whitespace.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dialect::{Dialect, SqlValue};
use crate::error::{MetaError, Result};
use crate::model::{FkRule, ForeignKey, ForeignKeyPath, PrimaryKey, Table};

/// Render a column name, quoting it when the dialect reserves the word.
pub fn render_column_name(name: &str, dialect: &dyn Dialect) -> String {
    if dialect.is_reserved(name, &[]) || name.contains(' ') {
        dialect.quote_ident(name)
    } else {
        name.to_string()
    }
}

/// Render a column definition: name, type spec, default, nullability.
pub fn render_column(column: &crate::model::Column, dialect: &dyn Dialect) -> String {
    let mut sql = format!(
        "{} {}",
        render_column_name(&column.name, dialect),
        column.type_spec()
    );
    if let Some(default) = &column.default_value {
        sql.push_str(&format!(" DEFAULT {}", default));
    }
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    sql
}

fn render_column_list(names: &[String], dialect: &dyn Dialect) -> String {
    names
        .iter()
        .map(|n| render_column_name(n, dialect))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_pk_clause(pk: &PrimaryKey, dialect: &dyn Dialect) -> String {
    let columns = render_column_list(&pk.column_names, dialect);
    match &pk.name {
        Some(name) if pk.name_deterministic && dialect.is_deterministic_pk_name(name) => {
            format!("CONSTRAINT {} PRIMARY KEY ({})", name, columns)
        }
        _ => format!("PRIMARY KEY ({})", columns),
    }
}

fn render_fk_clause(fk: &ForeignKey, dialect: &dyn Dialect) -> String {
    let mut sql = match &fk.name {
        Some(name) if fk.name_deterministic && dialect.is_deterministic_fk_name(name) => {
            format!("CONSTRAINT {} FOREIGN KEY ", name)
        }
        _ => "FOREIGN KEY ".to_string(),
    };
    sql.push_str(&format!(
        "({}) REFERENCES {} ({})",
        render_column_list(&fk.column_names, dialect),
        dialect.render_table_name(&fk.ref_table),
        render_column_list(&fk.ref_column_names, dialect),
    ));
    // NO ACTION is the default everywhere and is left implicit
    if fk.on_delete != FkRule::NoAction {
        sql.push_str(&format!(" ON DELETE {}", fk.on_delete.as_sql()));
    }
    if fk.on_update != FkRule::NoAction {
        sql.push_str(&format!(" ON UPDATE {}", fk.on_update.as_sql()));
    }
    sql
}

/// Render `CREATE TABLE` DDL.
///
/// Emits columns, the primary key, unique constraints, optionally inline
/// foreign keys, and check constraints, in that order. Foreign keys are
/// usually deferred to [`render_add_foreign_key`] so tables can be created
/// before all their reference targets exist.
pub fn render_create_table(
    table: &Table,
    dialect: &dyn Dialect,
    include_foreign_keys: bool,
) -> String {
    let mut clauses: Vec<String> = table
        .columns()
        .iter()
        .map(|c| render_column(c, dialect))
        .collect();
    if let Some(pk) = table.primary_key() {
        clauses.push(render_pk_clause(pk, dialect));
    }
    for uk in table.unique_constraints() {
        let columns = render_column_list(&uk.column_names, dialect);
        let clause = match &uk.name {
            Some(name) if uk.name_deterministic && dialect.is_deterministic_uk_name(name) => {
                format!("CONSTRAINT {} UNIQUE ({})", name, columns)
            }
            _ => format!("UNIQUE ({})", columns),
        };
        clauses.push(clause);
    }
    if include_foreign_keys {
        for fk in table.foreign_keys() {
            clauses.push(render_fk_clause(fk, dialect));
        }
    }
    for check in table.check_constraints() {
        let clause = match &check.name {
            Some(name) if check.name_deterministic => {
                format!("CONSTRAINT {} CHECK ({})", name, check.condition)
            }
            _ => format!("CHECK ({})", check.condition),
        };
        clauses.push(clause);
    }
    format!(
        "CREATE TABLE {} (\n    {}\n)",
        dialect.render_table_name(&table.name),
        clauses.join(",\n    ")
    )
}

/// Render `ALTER TABLE ... ADD ... FOREIGN KEY` DDL for one foreign key.
///
/// The `CONSTRAINT name` clause is emitted only when the key carries a name
/// the dialect considers deliberately chosen; vendor-generated names are
/// dropped so the target regenerates its own.
pub fn render_add_foreign_key(table_name: &str, fk: &ForeignKey, dialect: &dyn Dialect) -> String {
    format!(
        "ALTER TABLE {} ADD {}",
        dialect.render_table_name(table_name),
        render_fk_clause(fk, dialect)
    )
}

/// Render `DROP TABLE` DDL.
pub fn render_drop_table(table_name: &str, dialect: &dyn Dialect) -> String {
    format!("DROP TABLE {}", dialect.render_table_name(table_name))
}

/// Render an equality predicate, using `IS NULL` for null values.
pub fn render_equals_predicate(
    column: &str,
    value: &SqlValue,
    dialect: &dyn Dialect,
) -> String {
    let column = render_column_name(column, dialect);
    if matches!(value, SqlValue::Null) {
        format!("{} is null", column)
    } else {
        format!("{} = {}", column, dialect.format_value(value))
    }
}

/// Render an AND-joined conjunction of equality predicates.
pub fn render_conjunction(
    columns: &[String],
    values: &[SqlValue],
    dialect: &dyn Dialect,
) -> Result<String> {
    if columns.len() != values.len() {
        return Err(MetaError::Structural(format!(
            "predicate has {} columns but {} values",
            columns.len(),
            values.len()
        )));
    }
    if columns.is_empty() {
        return Err(MetaError::Structural(
            "predicate needs at least one column".to_string(),
        ));
    }
    Ok(columns
        .iter()
        .zip(values)
        .map(|(c, v)| render_equals_predicate(c, v, dialect))
        .collect::<Vec<_>>()
        .join(" and "))
}

/// Render a multi-hop join following a foreign-key path.
///
/// Each table along the path gets a positional alias (`t0`, `t1`, ...) so
/// self-referencing hops stay unambiguous. The rendered fragment starts at
/// the path's start table and joins through every edge:
/// `order_item t0 join orders t1 on t0.order_id = t1.id join ...`
pub fn render_fk_path_join(path: &ForeignKeyPath, dialect: &dyn Dialect) -> String {
    let mut sql = format!("{} t0", dialect.render_table_name(path.start_table()));
    for (hop, edge) in path.edges().iter().enumerate() {
        let conditions: Vec<String> = edge
            .column_names
            .iter()
            .zip(&edge.ref_column_names)
            .map(|(col, ref_col)| {
                format!(
                    "t{}.{} = t{}.{}",
                    hop,
                    render_column_name(col, dialect),
                    hop + 1,
                    render_column_name(ref_col, dialect)
                )
            })
            .collect();
        sql.push_str(&format!(
            " join {} t{} on {}",
            dialect.render_table_name(&edge.ref_table),
            hop + 1,
            conditions.join(" and ")
        ));
    }
    sql
}

static LINE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--[^\n]*").expect("invalid line comment pattern"));
static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("invalid block comment pattern"));
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("invalid whitespace pattern"));

/// Normalize SQL for classification: strip `--` and `/* */` comments,
/// lowercase, collapse whitespace runs to single spaces, trim.
pub fn normalize(sql: &str) -> String {
    let stripped = LINE_COMMENT.replace_all(sql, " ");
    let stripped = BLOCK_COMMENT.replace_all(&stripped, " ");
    WHITESPACE
        .replace_all(&stripped, " ")
        .trim()
        .to_lowercase()
}

/// Whether the statement is a result-returning query.
///
/// `SELECT ... INTO ...` creates a table and does not count; a leading
/// `WITH` (CTE) does.
pub fn is_query(sql: &str) -> bool {
    let normalized = normalize(sql);
    if normalized.starts_with("with ") {
        return true;
    }
    normalized.starts_with("select ") && !normalized.contains(" into ")
}

/// Whether the statement is DDL.
pub fn is_ddl(sql: &str) -> bool {
    let normalized = normalize(sql);
    ["create ", "drop ", "alter ", "truncate ", "rename "]
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
}

/// Whether the statement is DML.
pub fn is_dml(sql: &str) -> bool {
    let normalized = normalize(sql);
    ["insert ", "update ", "delete ", "merge "]
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
        || normalized.contains(" into ") && normalized.starts_with("select ")
}

/// Whether the statement invokes a stored procedure.
pub fn is_procedure_call(sql: &str) -> bool {
    let normalized = normalize(sql);
    ["call ", "exec ", "execute ", "begin "]
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
}

/// Whether the statement changes database structure.
///
/// `ALTER SESSION` only changes connection settings and does not count.
pub fn mutates_structure(sql: &str) -> bool {
    let normalized = normalize(sql);
    if normalized.starts_with("alter session") {
        return false;
    }
    is_ddl(sql)
}

/// Whether the statement changes data or structure.
pub fn mutates_data_or_structure(sql: &str) -> bool {
    is_dml(sql) || mutates_structure(sql)
}
