//! Raw map/POI dataset in either of its two supported shapes
//!
//! - **indexed**: `[{ "i": <map ordinal>, "r": { "<category>": [...] } }, ...]`
//! - **named**: `[{ "n": "<map name>", "<category>": [...] }, ...]`
//!
//! The shape is decided once from the first entry; callers never need to know
//! which one is in use.

use anyhow::{bail, Result};
use serde_json::{Map, Value};
use tracing::info;

use crate::category::Category;
use crate::types::MapProfile;

/// Field names used by the two dataset shapes
mod fields {
    pub const INDEX: &str = "i";
    pub const CATEGORIES: &str = "r";
    pub const ALTERNATE: &str = "a";
    pub const NAME: &str = "n";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Indexed,
    Named,
}

impl DataFormat {
    /// Classify from the first entry, `None` if the shape is unrecognized
    pub fn detect(data: &Value) -> Option<Self> {
        let first = data.as_array()?.first()?.as_object()?;
        if first.contains_key(fields::INDEX)
            && (first.contains_key(fields::CATEGORIES) || first.contains_key(fields::ALTERNATE))
        {
            return Some(DataFormat::Indexed);
        }
        if first.contains_key(fields::NAME) {
            return Some(DataFormat::Named);
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    format: DataFormat,
    entries: Vec<Value>,
}

impl Dataset {
    /// Wrap a parsed dataset; an unrecognized shape is a fatal startup error
    pub fn from_json(data: Value) -> Result<Self> {
        let (Some(format), Value::Array(entries)) = (DataFormat::detect(&data), data) else {
            bail!("Unrecognized data format: expected a non-empty list of map entries with \"i\"/\"r\" or \"n\" fields");
        };
        info!(format = ?format, maps = entries.len(), "Loaded POI dataset");
        Ok(Self { format, entries })
    }

    /// First entry describing `map`, if any
    pub fn map_block(&self, map: MapProfile) -> Option<&Map<String, Value>> {
        let mut blocks = self.entries.iter().filter_map(Value::as_object);
        match self.format {
            DataFormat::Named => blocks.find(|block| {
                block.get(fields::NAME).and_then(Value::as_str) == Some(map.name())
            }),
            DataFormat::Indexed => {
                let ordinal = map.ordinal() as f64;
                blocks.find(|block| {
                    block.get(fields::INDEX).and_then(Value::as_f64) == Some(ordinal)
                })
            }
        }
    }

    /// Raw items of one category inside a map block; missing or non-list is empty
    pub fn category_items<'a>(&self, block: &'a Map<String, Value>, category: Category) -> &'a [Value] {
        let container = match self.format {
            DataFormat::Named => Some(block),
            DataFormat::Indexed => block.get(fields::CATEGORIES).and_then(Value::as_object),
        };
        container
            .and_then(|c| c.get(category.as_str()))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
