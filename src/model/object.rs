//! Common capabilities shared by every metadata entity.
//!
//! All entities in the composite graph expose `{name, object_type, doc, owner}`
//! through [`DbObject`]. Ownership is arena style: each composite holds its
//! children in a [`NameMap`], an insertion-ordered container with
//! case-insensitive name lookup, and back-references are plain name strings.
//! This keeps the tree navigable in both directions without reference cycles.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Kind discriminator for metadata entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Database,
    Catalog,
    Schema,
    Table,
    Column,
    PrimaryKey,
    UniqueConstraint,
    ForeignKey,
    CheckConstraint,
    NotNullConstraint,
    Index,
    Sequence,
    Trigger,
    Package,
}

impl ObjectType {
    /// Lower-case label used in error messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            ObjectType::Database => "database",
            ObjectType::Catalog => "catalog",
            ObjectType::Schema => "schema",
            ObjectType::Table => "table",
            ObjectType::Column => "column",
            ObjectType::PrimaryKey => "primary key",
            ObjectType::UniqueConstraint => "unique constraint",
            ObjectType::ForeignKey => "foreign key",
            ObjectType::CheckConstraint => "check constraint",
            ObjectType::NotNullConstraint => "not-null constraint",
            ObjectType::Index => "index",
            ObjectType::Sequence => "sequence",
            ObjectType::Trigger => "trigger",
            ObjectType::Package => "package",
        }
    }
}

/// Capability set common to all metadata entities.
///
/// `owner_name` is a non-owning back-reference to the immediate composite
/// parent, set on insertion. The parent's child collection is the owning
/// container; the back-reference never implies lifetime ownership.
pub trait DbObject {
    /// Object name as reported by the source database.
    fn name(&self) -> &str;

    /// Kind of this object.
    fn object_type(&self) -> ObjectType;

    /// Documentation comment, if the source database carries one.
    fn doc(&self) -> Option<&str> {
        None
    }

    /// Name of the immediate composite parent, if inserted into one.
    fn owner_name(&self) -> Option<&str> {
        None
    }
}

/// Access to an entity's name, used for container keying.
pub trait Named {
    fn name(&self) -> &str;
}

/// Insertion-ordered container with case-insensitive name lookup.
///
/// Backs every child collection in the composite graph. Iteration order is
/// insertion order, which the dependency resolver and `is_identical` rely on
/// for determinism. Name uniqueness is case-insensitive per the model
/// invariants; inserting under an existing name replaces that entry in place.
#[derive(Debug, Clone)]
pub struct NameMap<T> {
    entries: Vec<T>,
    /// Lower-cased name -> position in `entries`.
    index: HashMap<String, usize>,
}

impl<T: Named> NameMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert a value keyed by its own name.
    ///
    /// Replaces and returns any existing entry with the same name
    /// (case-insensitive), keeping the original position.
    pub fn insert(&mut self, value: T) -> Option<T> {
        let key = value.name().to_lowercase();
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos], value)),
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(value);
                None
            }
        }
    }

    /// Look up by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.index
            .get(&name.to_lowercase())
            .map(|&pos| &self.entries[pos])
    }

    /// Mutable lookup by name, case-insensitively.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        match self.index.get(&name.to_lowercase()) {
            Some(&pos) => Some(&mut self.entries[pos]),
            None => None,
        }
    }

    /// Remove and return the entry with the given name, if present.
    ///
    /// Later entries keep their relative order.
    pub fn remove(&mut self, name: &str) -> Option<T> {
        let pos = self.index.remove(&name.to_lowercase())?;
        let value = self.entries.remove(pos);
        // Positions after the removed entry shift down by one.
        for idx in self.index.values_mut() {
            if *idx > pos {
                *idx -= 1;
            }
        }
        Some(value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values in insertion order.
    pub fn values(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Mutable values in insertion order.
    pub fn values_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.entries.iter_mut()
    }

    /// Names in insertion order (original casing).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name())
    }

    /// Values as a slice, in insertion order.
    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

impl<T: Named> Default for NameMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a NameMap<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T: Named> FromIterator<T> for NameMap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut map = NameMap::new();
        for value in iter {
            map.insert(value);
        }
        map
    }
}

// Values carry their own names, so the container serializes as a plain
// sequence and rebuilds its index on deserialization.
impl<T: Named + Serialize> Serialize for NameMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de, T: Named + DeserializeOwned> Deserialize<'de> for NameMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = Vec::<T>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
