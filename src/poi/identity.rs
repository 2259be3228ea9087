use super::cache::NormalizedPoint;
use crate::category::Category;

/// Stable key for a POI within `category`, used for persisted hiding
///
/// `"{x}:{y}"` on rounded grid coordinates, prefixed with the source category
/// for the derived category so hides there never leak into the sources.
/// Independent of resolution, rectangle and scale.
pub fn identity(category: Category, point: &NormalizedPoint) -> String {
    let (x, y) = point.grid();
    if category.is_derived() {
        format!("{}:{x}:{y}", point.source)
    } else {
        format!("{x}:{y}")
    }
}
