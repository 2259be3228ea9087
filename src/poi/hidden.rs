//! Per-category sets of hidden POI identities

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::category::{Category, CategoryMap};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HiddenStateStore {
    sets: CategoryMap<BTreeSet<String>>,
}

impl HiddenStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hidden(&self, category: Category, identity: &str) -> bool {
        self.sets[category].contains(identity)
    }

    /// Idempotent; returns whether the identity was newly hidden
    pub fn hide(&mut self, category: Category, identity: impl Into<String>) -> bool {
        self.sets[category].insert(identity.into())
    }

    /// Returns whether the identity was hidden before
    pub fn unhide(&mut self, category: Category, identity: &str) -> bool {
        self.sets[category].remove(identity)
    }

    /// Clear every category
    pub fn reset(&mut self) {
        for (_, set) in self.sets.iter_mut() {
            set.clear();
        }
    }

    #[cfg(test)]
    pub fn count(&self, category: Category) -> usize {
        self.sets[category].len()
    }

    /// Sorted lists per category, for deterministic persistence
    pub fn export(&self) -> CategoryMap<Vec<String>> {
        CategoryMap::from_fn(|category| self.sets[category].iter().cloned().collect())
    }
}

impl Serialize for HiddenStateStore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.export().serialize(serializer)
    }
}

/// Lenient decode of a persisted `{category: [identity, ...]}` object
///
/// Unknown categories, non-list values and non-string entries are dropped.
impl<'de> Deserialize<'de> for HiddenStateStore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let lists = CategoryMap::<Vec<Value>>::deserialize(deserializer)?;
        let mut store = Self::new();
        for (category, list) in lists.iter() {
            store.sets[category].extend(list.iter().filter_map(Value::as_str).map(str::to_string));
        }
        Ok(store)
    }
}
