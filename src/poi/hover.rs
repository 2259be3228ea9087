//! Nearest-marker hit test for the pointer

use super::cache::{MapPoints, NormalizedPoint};
use super::hidden::HiddenStateStore;
use super::identity::identity;
use crate::category::Category;
use crate::types::{MapProfile, ScreenRect};

/// The POI under the pointer
#[derive(Debug, Clone, PartialEq)]
pub struct HoverHit {
    pub map: MapProfile,
    pub category: Category,
    /// Position in the category's cached list
    pub index: usize,
    pub point: NormalizedPoint,
}

impl HoverHit {
    pub fn identity(&self) -> String {
        identity(self.category, &self.point)
    }
}

/// Find the enabled, visible point nearest to `pointer` within `radius`
///
/// Categories are walked in declared order and points in cache order. A
/// candidate replaces the current best when its squared distance is `<=` the
/// best so far (seeded with `radius²`), so later points win exact ties.
pub fn find_hovered(
    map: MapProfile,
    points: &MapPoints,
    rect: ScreenRect,
    pointer: (f64, f64),
    enabled: impl Fn(Category) -> bool,
    hidden: &HiddenStateStore,
    radius: f64,
) -> Option<HoverHit> {
    let (mx, my) = pointer;
    let mut best_d2 = radius * radius;
    let mut best: Option<(Category, usize, &NormalizedPoint)> = None;

    for category in Category::ALL {
        if !enabled(category) {
            continue;
        }
        for (index, point) in points[category].iter().enumerate() {
            if hidden.is_hidden(category, &identity(category, point)) {
                continue;
            }
            let (cx, cy) = rect.project(point.u, point.v);
            let dx = mx - cx;
            let dy = my - cy;
            let d2 = dx * dx + dy * dy;
            if d2 <= best_d2 {
                best_d2 = d2;
                best = Some((category, index, point));
            }
        }
    }

    best.map(|(category, index, point)| HoverHit {
        map,
        category,
        index,
        point: point.clone(),
    })
}
