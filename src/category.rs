//! The fixed set of POI categories
//!
//! Eleven keys in a fixed declared order. `PossibleXp` is derived: its points
//! are the union of `Towers`, `BigTowers` and `Armories`, in that order.

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PossibleXp,
    Spawns,
    Armories,
    Towers,
    BigTowers,
    Workbenches,
    WildTargets,
    Beetles,
    EasterEggs,
    MeleeWeapons,
    CashRegisters,
}

impl Category {
    pub const COUNT: usize = 11;

    /// Declared order; hit testing and drawing walk categories in this order
    pub const ALL: [Category; Self::COUNT] = [
        Category::PossibleXp,
        Category::Spawns,
        Category::Armories,
        Category::Towers,
        Category::BigTowers,
        Category::Workbenches,
        Category::WildTargets,
        Category::Beetles,
        Category::EasterEggs,
        Category::MeleeWeapons,
        Category::CashRegisters,
    ];

    /// Source categories concatenated into `PossibleXp`, in union order
    pub const DERIVED_SOURCES: [Category; 3] =
        [Category::Towers, Category::BigTowers, Category::Armories];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::PossibleXp => "possible_xp",
            Category::Spawns => "spawns",
            Category::Armories => "armories",
            Category::Towers => "towers",
            Category::BigTowers => "big_towers",
            Category::Workbenches => "workbenches",
            Category::WildTargets => "wild_targets",
            Category::Beetles => "beetles",
            Category::EasterEggs => "easter_eggs",
            Category::MeleeWeapons => "melee_weapons",
            Category::CashRegisters => "cash_registers",
        }
    }

    /// Label used when the style data has no record for this category
    pub fn fallback_label(self) -> &'static str {
        match self {
            Category::PossibleXp => "Possible XP Location",
            Category::Spawns => "Spawns",
            Category::Armories => "Armories",
            Category::Towers => "Hunting Towers",
            Category::BigTowers => "Watch Towers",
            Category::Workbenches => "Workbenches",
            Category::WildTargets => "Wild Targets",
            Category::Beetles => "Beetles",
            Category::EasterEggs => "Easter Eggs",
            Category::MeleeWeapons => "Melee Weapons",
            Category::CashRegisters => "Cash Registers",
        }
    }

    pub fn is_derived(self) -> bool {
        self == Category::PossibleXp
    }

    /// Categories read directly from the raw dataset
    pub fn sources() -> impl Iterator<Item = Category> {
        Self::ALL.into_iter().filter(|c| !c.is_derived())
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown category '{s}'"))
    }
}

/// Dense storage with exactly one value per category
///
/// Every category always has an entry, so lookups never fail.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMap<T> {
    values: [T; Category::COUNT],
}

impl<T> CategoryMap<T> {
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self {
            values: Category::ALL.map(&mut f),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().zip(self.values.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Category, &mut T)> {
        Category::ALL.into_iter().zip(self.values.iter_mut())
    }
}

impl<T: Default> Default for CategoryMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<Category> for CategoryMap<T> {
    type Output = T;

    fn index(&self, category: Category) -> &T {
        &self.values[category.index()]
    }
}

impl<T> IndexMut<Category> for CategoryMap<T> {
    fn index_mut(&mut self, category: Category) -> &mut T {
        &mut self.values[category.index()]
    }
}

/// Serialized as a JSON object keyed by category name, all 11 keys present
impl<T: Serialize> Serialize for CategoryMap<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(Category::COUNT))?;
        for (category, value) in self.iter() {
            map.serialize_entry(category.as_str(), value)?;
        }
        map.end()
    }
}

/// Decoded per category: unknown keys are dropped, and a missing or malformed
/// entry gets `T::default()` without affecting its neighbours
impl<'de, T> Deserialize<'de> for CategoryMap<T>
where
    T: DeserializeOwned + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut object = match Value::deserialize(deserializer)? {
            Value::Object(object) => object,
            other => {
                warn!(value = %other, "Expected an object keyed by category, using defaults");
                return Ok(Self::default());
            }
        };
        Ok(Self::from_fn(|category| {
            let Some(value) = object.remove(category.as_str()) else {
                return T::default();
            };
            serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(category = %category, error = %e, "Malformed category entry, using default");
                T::default()
            })
        }))
    }
}
