//! Foreign-key paths: ordered chains of FK edges connecting a start table to
//! a target table through zero or more intermediates.

use serde::{Deserialize, Serialize};

use crate::error::{MetaError, Result};

use super::constraint::ForeignKey;

/// An ordered list of foreign-key edges with a declared start table.
///
/// Invariant: the edges chain, i.e. each edge's referee table is the next
/// edge's owning table, and the first edge starts at the declared start
/// table. [`append`](Self::append) rejects edges that break the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyPath {
    start_table: String,
    edges: Vec<ForeignKey>,
}

impl ForeignKeyPath {
    pub fn new(start_table: impl Into<String>) -> Self {
        Self {
            start_table: start_table.into(),
            edges: Vec::new(),
        }
    }

    /// Build a path from edges, validating the chain.
    pub fn from_edges(start_table: impl Into<String>, edges: Vec<ForeignKey>) -> Result<Self> {
        let mut path = Self::new(start_table);
        for edge in edges {
            path.append(edge)?;
        }
        Ok(path)
    }

    /// Append an edge, validating that it chains onto the current end.
    pub fn append(&mut self, edge: ForeignKey) -> Result<()> {
        let expected = self.target_table().to_string();
        let owner = edge.owner_table.as_deref().unwrap_or_default();
        if !owner.eq_ignore_ascii_case(&expected) {
            return Err(MetaError::Structural(format!(
                "foreign-key path edge starts at {:?} but the path currently ends at {:?}",
                owner, expected
            )));
        }
        self.edges.push(edge);
        Ok(())
    }

    pub fn start_table(&self) -> &str {
        &self.start_table
    }

    /// The table the path currently ends at: the last edge's referee, or the
    /// start table for an empty path.
    pub fn target_table(&self) -> &str {
        self.edges
            .last()
            .map(|e| e.ref_table.as_str())
            .unwrap_or(&self.start_table)
    }

    pub fn edges(&self) -> &[ForeignKey] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Table names along the path, start table first.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names = vec![self.start_table.as_str()];
        names.extend(self.edges.iter().map(|e| e.ref_table.as_str()));
        names
    }

    /// Referee tables between the start table and the final target.
    pub fn intermediate_tables(&self) -> Vec<&str> {
        if self.edges.len() < 2 {
            return Vec::new();
        }
        self.edges[..self.edges.len() - 1]
            .iter()
            .map(|e| e.ref_table.as_str())
            .collect()
    }
}
