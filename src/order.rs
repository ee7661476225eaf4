//! Foreign-key dependency ordering.
//!
//! Orders tables so every referenced table precedes its referrers, which is
//! the safe order for `CREATE TABLE` and `INSERT` and the reverse of the
//! safe order for `DROP` and `DELETE`. Implemented as Kahn's algorithm over
//! the foreign-key graph, with ties broken by the original insertion order
//! so output is deterministic.

use std::collections::{HashMap, HashSet};

use crate::error::{MetaError, Result};
use crate::model::Table;

/// Anything that owns an ordered set of tables.
pub trait TableContainer {
    fn contained_tables(&self) -> &[Table];
}

impl TableContainer for crate::model::Schema {
    fn contained_tables(&self) -> &[Table] {
        self.tables()
    }
}

impl TableContainer for [Table] {
    fn contained_tables(&self) -> &[Table] {
        self
    }
}

impl TableContainer for Vec<Table> {
    fn contained_tables(&self) -> &[Table] {
        self
    }
}

/// Return references to the container's tables with every foreign-key
/// target ahead of the tables referencing it.
///
/// Self-referencing foreign keys are ignored; they never affect creation
/// order. Foreign keys pointing at tables outside the container (other
/// schemas, filtered tables) are ignored as well. A reference cycle between
/// two or more tables yields [`MetaError::CyclicDependency`] naming the
/// tables still waiting on each other, in their insertion order.
pub fn dependency_ordered_tables<C: TableContainer + ?Sized>(
    container: &C,
) -> Result<Vec<&Table>> {
    let tables = container.contained_tables();
    let index_by_name: HashMap<String, usize> = tables
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.to_lowercase(), i))
        .collect();

    // in_degree[i] counts distinct in-container tables that table i references
    let mut in_degree = vec![0usize; tables.len()];
    let mut referrers: Vec<Vec<usize>> = vec![Vec::new(); tables.len()];
    for (i, table) in tables.iter().enumerate() {
        let mut seen = HashSet::new();
        for fk in table.foreign_keys() {
            if fk.is_self_referencing() {
                continue;
            }
            let Some(&target) = index_by_name.get(&fk.ref_table.to_lowercase()) else {
                continue;
            };
            if target == i || !seen.insert(target) {
                continue;
            }
            in_degree[i] += 1;
            referrers[target].push(i);
        }
    }

    let mut ready: Vec<usize> = (0..tables.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut ordered = Vec::with_capacity(tables.len());
    // ready is kept sorted descending so pop() yields the lowest index first
    while let Some(i) = {
        ready.sort_unstable_by(|a, b| b.cmp(a));
        ready.pop()
    } {
        ordered.push(&tables[i]);
        for &referrer in &referrers[i] {
            in_degree[referrer] -= 1;
            if in_degree[referrer] == 0 {
                ready.push(referrer);
            }
        }
    }

    if ordered.len() < tables.len() {
        let stuck: Vec<String> = (0..tables.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| tables[i].name.clone())
            .collect();
        return Err(MetaError::CyclicDependency { tables: stuck });
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use crate::model::ForeignKey;

    use super::*;

    fn table_with_fk(name: &str, ref_table: Option<&str>) -> Table {
        let mut table = Table::new(name);
        table.add_column(crate::model::Column::new("id", "int"));
        if let Some(target) = ref_table {
            table.add_foreign_key(ForeignKey::single(None, "id", target, "id"));
        }
        table
    }

    #[test]
    fn test_parents_before_children() {
        let tables = vec![
            table_with_fk("order_item", Some("orders")),
            table_with_fk("orders", Some("customer")),
            table_with_fk("customer", None),
        ];
        let ordered = dependency_ordered_tables(&tables).unwrap();
        let names: Vec<&str> = ordered.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["customer", "orders", "order_item"]);
    }

    #[test]
    fn test_independent_tables_keep_insertion_order() {
        let tables = vec![
            table_with_fk("zeta", None),
            table_with_fk("alpha", None),
            table_with_fk("mid", None),
        ];
        let ordered = dependency_ordered_tables(&tables).unwrap();
        let names: Vec<&str> = ordered.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_self_reference_is_ignored() {
        let tables = vec![table_with_fk("employee", Some("employee"))];
        let ordered = dependency_ordered_tables(&tables).unwrap();
        assert_eq!(ordered.len(), 1);
    }

    #[test]
    fn test_external_reference_is_ignored() {
        let tables = vec![table_with_fk("orders", Some("remote_customer"))];
        let ordered = dependency_ordered_tables(&tables).unwrap();
        assert_eq!(ordered[0].name, "orders");
    }

    #[test]
    fn test_cycle_is_reported() {
        let tables = vec![
            table_with_fk("b_side", Some("a_side")),
            table_with_fk("a_side", Some("b_side")),
            table_with_fk("standalone", None),
        ];
        let err = dependency_ordered_tables(&tables).unwrap_err();
        match err {
            MetaError::CyclicDependency { tables } => {
                // Same order the tables were added in, not alphabetical.
                assert_eq!(tables, ["b_side", "a_side"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reference_names_compared_case_insensitively() {
        let tables = vec![
            table_with_fk("orders", Some("CUSTOMER")),
            table_with_fk("customer", None),
        ];
        let ordered = dependency_ordered_tables(&tables).unwrap();
        assert_eq!(ordered[0].name, "customer");
    }
}
