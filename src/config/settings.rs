//! Persisted configuration schema and built-in defaults
//!
//! ```json
//! {
//!   "profiles": { "<map name>": { "rect_ratio": { "rx", "ry", "rw", "rh" } } },
//!   "settings": {
//!     "enable_num_switch": bool,
//!     "selected_map": "<map name>",
//!     "visible_overlay": bool,
//!     "master_on": bool,
//!     "global_scale": 0.10..=5.00,
//!     "types":  { "<category>": { "enabled": bool, "color": [r, g, b] } },
//!     "hidden": { "<category>": ["<identity>", ...] }
//!   }
//! }
//! ```
//!
//! Decoding never rejects a document that is a JSON object: a malformed field
//! falls back to its default on its own. Keys this build does not know (at the
//! top level, in `settings`, in profiles and type entries, and whole profiles
//! for unknown maps) are kept and written back unchanged.

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

use crate::category::CategoryMap;
use crate::color::Rgb;
use crate::constants::scale;
use crate::poi::HiddenStateStore;
use crate::style::TypeSpecs;
use crate::types::{MapProfile, RectRatio};

/// Unrecognized keys carried through a load/save cycle
pub type Extra = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub profiles: Profiles,
    #[serde(deserialize_with = "settings_or_default")]
    pub settings: Settings,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Per-map profiles, keyed by map name on disk
#[derive(Debug, Clone, PartialEq)]
pub struct Profiles {
    pub maps: BTreeMap<MapProfile, ProfileEntry>,
    /// Profiles for map names this build does not know
    pub unknown: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileEntry {
    #[serde(deserialize_with = "rect_ratio_or_default")]
    pub rect_ratio: RectRatio,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(deserialize_with = "num_switch_or_default")]
    pub enable_num_switch: bool,
    #[serde(deserialize_with = "map_or_default")]
    pub selected_map: MapProfile,
    #[serde(deserialize_with = "visible_or_default")]
    pub visible_overlay: bool,
    #[serde(deserialize_with = "master_or_default")]
    pub master_on: bool,
    #[serde(deserialize_with = "deserialize_global_scale")]
    pub global_scale: f64,
    pub types: CategoryMap<TypeSetting>,
    pub hidden: HiddenStateStore,
    #[serde(flatten)]
    pub extra: Extra,
}

/// User-facing per-category settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeSetting {
    #[serde(deserialize_with = "enabled_or_default")]
    pub enabled: bool,
    /// `None` until filled with the style's default fill
    #[serde(deserialize_with = "color_or_unset", skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for Profiles {
    fn default() -> Self {
        Self {
            maps: MapProfile::ALL
                .into_iter()
                .map(|map| (map, ProfileEntry::default()))
                .collect(),
            unknown: Extra::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_num_switch: true,
            selected_map: MapProfile::default(),
            visible_overlay: false,
            master_on: true,
            global_scale: scale::DEFAULT,
            types: CategoryMap::default(),
            hidden: HiddenStateStore::new(),
            extra: Extra::new(),
        }
    }
}

impl Default for TypeSetting {
    fn default() -> Self {
        Self {
            enabled: true,
            color: None,
            extra: Extra::new(),
        }
    }
}

impl Config {
    pub fn rect_ratio(&self, map: MapProfile) -> RectRatio {
        self.profiles
            .maps
            .get(&map)
            .map(|p| p.rect_ratio)
            .unwrap_or_default()
    }
}

impl Settings {
    /// Give every category without a color its style default fill
    pub fn fill_type_defaults(&mut self, specs: &TypeSpecs) {
        for (category, setting) in self.types.iter_mut() {
            setting.color.get_or_insert(specs[category].default_fill);
        }
    }

    /// Re-enable every category and restore style colors, keeping unknown keys
    pub fn reset_types(&mut self, specs: &TypeSpecs) {
        for (category, setting) in self.types.iter_mut() {
            setting.enabled = true;
            setting.color = Some(specs[category].default_fill);
        }
    }
}

/// Clamp a scale into `[0.10, 5.00]`; NaN falls back to the default
pub fn clamp_scale(value: f64) -> f64 {
    if value.is_nan() {
        return scale::DEFAULT;
    }
    value.clamp(scale::MIN, scale::MAX)
}

impl Serialize for Profiles {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.maps.len() + self.unknown.len()))?;
        for (profile, entry) in &self.maps {
            map.serialize_entry(profile.name(), entry)?;
        }
        for (name, value) in &self.unknown {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Known maps are decoded entry by entry; a malformed entry gets the default
/// profile. Entries for unknown map names are kept verbatim.
impl<'de> Deserialize<'de> for Profiles {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = match Value::deserialize(deserializer)? {
            Value::Object(object) => object,
            other => {
                warn!(value = %other, "profiles is not an object, using defaults");
                return Ok(Self::default());
            }
        };

        let mut profiles = Self::default();
        for (name, value) in object {
            let Some(map) = MapProfile::from_name(&name) else {
                profiles.unknown.insert(name, value);
                continue;
            };
            let entry = ProfileEntry::deserialize(value).unwrap_or_else(|e| {
                warn!(map = %map, error = %e, "Malformed profile, using default");
                ProfileEntry::default()
            });
            profiles.maps.insert(map, entry);
        }
        Ok(profiles)
    }
}

/// Decode a field, logging and substituting `default` when it has the wrong shape
fn or_default<'de, D, T>(deserializer: D, field: &'static str, default: fn() -> T) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    match T::deserialize(&value) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            warn!(field, value = %value, error = %e, "Invalid config value, using default");
            Ok(default())
        }
    }
}

fn default_true() -> bool {
    true
}

fn settings_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Settings, D::Error> {
    or_default(deserializer, "settings", Settings::default)
}

fn rect_ratio_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RectRatio, D::Error> {
    or_default(deserializer, "rect_ratio", RectRatio::default)
}

fn num_switch_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    or_default(deserializer, "enable_num_switch", default_true)
}

fn visible_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    or_default(deserializer, "visible_overlay", bool::default)
}

fn master_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    or_default(deserializer, "master_on", default_true)
}

fn map_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MapProfile, D::Error> {
    or_default(deserializer, "selected_map", MapProfile::default)
}

fn enabled_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    or_default(deserializer, "enabled", default_true)
}

fn color_or_unset<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Rgb>, D::Error> {
    or_default(deserializer, "color", || None)
}

/// Numbers or numeric strings, clamped into range
fn deserialize_global_scale<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    let scale = match or_default(deserializer, "global_scale", || None)? {
        Some(NumberOrText::Number(n)) => n,
        Some(NumberOrText::Text(text)) => match text.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => {
                warn!(global_scale = %text, "global_scale is not a number, using default");
                return Ok(scale::DEFAULT);
            }
        },
        None => return Ok(scale::DEFAULT),
    };
    let clamped = clamp_scale(scale);
    if clamped != scale {
        warn!(global_scale = scale, clamped = clamped, "global_scale out of range, clamping");
    }
    Ok(clamped)
}
