//! Per-document constant tables and the last-write-wins merge between them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{ConstantCollision, Result};
use crate::gfx::value::Value;

/// A constant together with the document that declared it
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub value: Value,
    pub origin: PathBuf,
}

/// Mapping from constant name to [`Value`].
///
/// Iteration follows first-declaration order. Overwriting a name keeps its
/// position but replaces value and origin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantTable {
    entries: HashMap<String, Constant>,
    order: Vec<String>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table declared by a single document.
    ///
    /// # Arguments
    /// * `declarations` - The document's `constants` object, in declaration order
    /// * `origin` - Path of the declaring document
    pub fn from_declarations(
        declarations: &serde_json::Map<String, serde_json::Value>,
        origin: &Path,
    ) -> Result<Self> {
        let mut table = Self::new();
        for (name, json) in declarations {
            let value = Value::from_json(name, json)?;
            table.insert(name, value, origin);
        }
        Ok(table)
    }

    /// Inserts or replaces a constant, returning the replaced entry
    pub fn insert(&mut self, name: &str, value: Value, origin: &Path) -> Option<Constant> {
        let constant = Constant {
            value,
            origin: origin.to_path_buf(),
        };
        let previous = self.entries.insert(name.to_string(), constant);
        if previous.is_none() {
            self.order.push(name.to_string());
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|c| &c.value)
    }

    /// Document that provided the current definition of `name`
    pub fn origin(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(|c| c.origin.as_path())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.order
            .iter()
            .map(move |name| (name.as_str(), &self.entries[name].value))
    }

    /// Merges `other` into this table, consuming it.
    ///
    /// Later definitions win. A name that was already defined by a different
    /// document produces a [`ConstantCollision`]; collisions are returned in
    /// `other`'s declaration order. Re-merging a definition from the same
    /// document (a diamond import) is silent.
    pub fn merge(&mut self, mut other: ConstantTable) -> Vec<ConstantCollision> {
        let mut collisions = Vec::new();

        for name in std::mem::take(&mut other.order) {
            let Some(incoming) = other.entries.remove(&name) else {
                continue;
            };

            if let Some(previous) = self.insert(&name, incoming.value, &incoming.origin) {
                if previous.origin != incoming.origin {
                    log::debug!(
                        "constant '{}' from {} overrides {}",
                        name,
                        incoming.origin.display(),
                        previous.origin.display()
                    );
                    collisions.push(ConstantCollision {
                        name,
                        previous: previous.origin,
                        source: incoming.origin,
                    });
                }
            }
        }

        collisions
    }
}

impl Serialize for ConstantTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
