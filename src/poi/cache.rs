//! Per-map, per-category normalized point lists
//!
//! Built once from the dataset and read every tick by the hit tester and the
//! renderer. There is no automatic invalidation; `rebuild` is explicit.

use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info};

use super::dataset::Dataset;
use super::transform::to_normalized;
use crate::category::{Category, CategoryMap};
use crate::types::MapProfile;

/// A POI ready for hit testing and drawing
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPoint {
    pub u: f64,
    pub v: f64,
    /// Source grid coordinates
    pub x: f64,
    pub y: f64,
    /// Category the point was read from (differs from the list it sits in for union members)
    pub source: Category,
    /// The raw source item, untouched
    pub payload: Rc<Value>,
}

impl NormalizedPoint {
    pub fn from_grid(x: f64, y: f64, source: Category, payload: Rc<Value>) -> Self {
        let (u, v) = to_normalized(x, y);
        Self { u, v, x, y, source, payload }
    }

    /// Grid coordinates rounded to the nearest integer (ties to even)
    pub fn grid(&self) -> (i64, i64) {
        (self.x.round_ties_even() as i64, self.y.round_ties_even() as i64)
    }
}

pub type MapPoints = CategoryMap<Vec<NormalizedPoint>>;

#[derive(Debug, Default)]
pub struct PointCache {
    maps: HashMap<MapProfile, MapPoints>,
}

impl PointCache {
    pub fn build(dataset: &Dataset) -> Self {
        let mut cache = Self::default();
        cache.rebuild(dataset);
        cache
    }

    /// Recompute every map from the dataset
    pub fn rebuild(&mut self, dataset: &Dataset) {
        self.maps.clear();
        for map in MapProfile::ALL {
            let points = build_map_points(dataset, map);
            let total: usize = points.iter().map(|(_, p)| p.len()).sum();
            info!(map = %map, points = total, "Built point cache");
            self.maps.insert(map, points);
        }
    }

    pub fn map_points(&self, map: MapProfile) -> Option<&MapPoints> {
        self.maps.get(&map)
    }

    pub fn points(&self, map: MapProfile, category: Category) -> &[NormalizedPoint] {
        self.maps
            .get(&map)
            .map(|points| points[category].as_slice())
            .unwrap_or(&[])
    }
}

fn build_map_points(dataset: &Dataset, map: MapProfile) -> MapPoints {
    let mut points = MapPoints::default();
    let Some(block) = dataset.map_block(map) else {
        debug!(map = %map, "No dataset entry for map");
        return points;
    };

    for category in Category::sources() {
        points[category] = dataset
            .category_items(block, category)
            .iter()
            .filter_map(|item| parse_item(item, category))
            .collect();
    }
    derive_union(&mut points);
    points
}

/// Recompute the derived category as the ordered concatenation of its sources
pub fn derive_union(points: &mut MapPoints) {
    let union: Vec<NormalizedPoint> = Category::DERIVED_SOURCES
        .iter()
        .flat_map(|source| points[*source].iter().cloned())
        .collect();
    points[Category::PossibleXp] = union;
}

/// Items without a usable `c: [x, y]` pair are skipped
fn parse_item(item: &Value, category: Category) -> Option<NormalizedPoint> {
    let coords = item.as_object()?.get("c")?.as_array()?;
    if coords.len() < 2 {
        return None;
    }
    let x = coordinate(&coords[0])?;
    let y = coordinate(&coords[1])?;
    Some(NormalizedPoint::from_grid(x, y, category, Rc::new(item.clone())))
}

fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}
