//! Per-category marker styling seeded from the style dataset
//!
//! The style dataset is a JSON object of records. A record applies to a
//! category when its `categories` field equals the category key; it may carry
//! `label`, `borderColor`, `fillColor` and `radius`. Missing records and
//! fields fall back to hard-coded values.

use serde_json::{Map, Value};
use tracing::debug;

use crate::category::{Category, CategoryMap};
use crate::color::{HexColor, Rgb};
use crate::constants::marker;

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub label: String,
    pub border: Rgb,
    pub default_fill: Rgb,
    /// Marker radius before global scaling
    pub radius_px: i64,
}

pub type TypeSpecs = CategoryMap<TypeSpec>;

/// Build specs for every category from the parsed style dataset
pub fn build_type_specs(style: &Value) -> TypeSpecs {
    CategoryMap::from_fn(|category| {
        if category.is_derived() {
            return possible_xp_spec();
        }
        let record = find_style_record(style, category);
        if record.is_none() {
            debug!(category = %category, "No style record, using fallback style");
        }
        spec_from_record(category, record)
    })
}

fn possible_xp_spec() -> TypeSpec {
    TypeSpec {
        label: Category::PossibleXp.fallback_label().to_string(),
        border: HexColor::parse(marker::POSSIBLE_XP_BORDER).unwrap_or(Rgb::new(255, 255, 255)),
        default_fill: HexColor::parse(marker::POSSIBLE_XP_FILL).unwrap_or(Rgb::new(255, 211, 77)),
        radius_px: marker::POSSIBLE_XP_RADIUS_PX,
    }
}

/// First record in file order whose `categories` names this category
fn find_style_record(style: &Value, category: Category) -> Option<&Map<String, Value>> {
    style
        .as_object()?
        .values()
        .filter_map(Value::as_object)
        .find(|record| record.get("categories").and_then(Value::as_str) == Some(category.as_str()))
}

fn spec_from_record(category: Category, record: Option<&Map<String, Value>>) -> TypeSpec {
    let field = |name: &str| record.and_then(|r| r.get(name));

    let label = match field("label") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => category.fallback_label().to_string(),
        Some(other) => other.to_string(),
    };

    let fallback_border = HexColor::parse(marker::FALLBACK_BORDER).unwrap_or(Rgb::new(85, 85, 85));
    let fallback_fill = HexColor::parse(marker::FALLBACK_FILL).unwrap_or(Rgb::new(180, 180, 180));

    TypeSpec {
        label,
        border: HexColor::parse_or(field("borderColor"), fallback_border),
        default_fill: HexColor::parse_or(field("fillColor"), fallback_fill),
        radius_px: base_radius_px(field("radius")),
    }
}

/// Convert a style radius into an on-screen base radius in `[3, 10]`
pub fn base_radius_px(radius: Option<&Value>) -> i64 {
    let r = radius
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|r| r.is_finite())
        .unwrap_or(marker::DEFAULT_STYLE_RADIUS);

    let px = (r * marker::STYLE_RADIUS_FACTOR).round_ties_even() as i64;
    px.clamp(marker::MIN_BASE_RADIUS_PX, marker::MAX_BASE_RADIUS_PX)
}
