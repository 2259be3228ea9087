//! POI data pipeline: raw dataset -> normalized cached points -> hover and hide state

pub mod cache;
pub mod dataset;
pub mod hidden;
pub mod hover;
pub mod identity;
pub mod transform;

pub use cache::{NormalizedPoint, PointCache};
pub use dataset::Dataset;
pub use hidden::HiddenStateStore;
pub use hover::{find_hovered, HoverHit};
pub use identity::identity;
