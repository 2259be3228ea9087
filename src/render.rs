//! Draw-ready view of the engine state and the surface that consumes it

use tracing::{debug, info};

use crate::category::Category;
use crate::color::Rgb;
use crate::constants::marker;
use crate::engine::OverlayEngine;
use crate::poi::identity;
use crate::types::{MapProfile, ScreenRect};

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub category: Category,
    pub index: usize,
    /// Screen-space center
    pub center: (f64, f64),
    pub radius: i64,
    pub fill: Rgb,
    pub border: Rgb,
    pub hovered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub map: MapProfile,
    /// Map name drawn in the overlay corner
    pub label: &'static str,
    pub rect: ScreenRect,
    pub markers: Vec<Marker>,
}

/// Marker radius after global scaling
pub fn scaled_radius(radius_px: i64, global_scale: f64) -> i64 {
    ((radius_px as f64 * global_scale).round_ties_even() as i64)
        .clamp(marker::MIN_SCALED_RADIUS_PX, marker::MAX_SCALED_RADIUS_PX)
}

impl Frame {
    /// Snapshot what should be on screen, or `None` while the overlay is off
    pub fn capture(engine: &OverlayEngine) -> Option<Self> {
        if !engine.is_shown() {
            return None;
        }
        let settings = engine.settings();
        let map = settings.selected_map;
        let rect = engine.rect();
        let hover = engine.hover();

        let mut markers = Vec::new();
        for category in Category::ALL {
            let setting = &settings.types[category];
            if !setting.enabled {
                continue;
            }
            let spec = &engine.specs()[category];
            let fill = setting.color.unwrap_or(spec.default_fill);
            let radius = scaled_radius(spec.radius_px, settings.global_scale);
            for (index, point) in engine.points(category).iter().enumerate() {
                if settings.hidden.is_hidden(category, &identity(category, point)) {
                    continue;
                }
                markers.push(Marker {
                    category,
                    index,
                    center: rect.project(point.u, point.v),
                    radius,
                    fill,
                    border: spec.border,
                    hovered: hover.is_some_and(|h| h.category == category && h.index == index),
                });
            }
        }

        Some(Self {
            map,
            label: map.name(),
            rect,
            markers,
        })
    }

    pub fn hovered(&self) -> Option<&Marker> {
        self.markers.iter().find(|m| m.hovered)
    }
}

/// Whatever presents frames to the user
pub trait OverlaySurface {
    fn present(&mut self, frame: Option<&Frame>);
}

/// Headless surface that logs what a window would show whenever it changes
#[derive(Debug, Default)]
pub struct LogSurface {
    last: Option<(MapProfile, usize, Option<(Category, usize)>)>,
}

impl OverlaySurface for LogSurface {
    fn present(&mut self, frame: Option<&Frame>) {
        let summary = frame.map(|f| {
            (
                f.map,
                f.markers.len(),
                f.hovered().map(|m| (m.category, m.index)),
            )
        });
        if summary == self.last {
            return;
        }

        match frame {
            None => info!("Overlay hidden"),
            Some(frame) => {
                let shown_before = self.last.is_some_and(|(map, count, _)| map == frame.map && count == frame.markers.len());
                if !shown_before {
                    info!(map = frame.label, markers = frame.markers.len(), rect = ?frame.rect, "Overlay showing");
                }
                if let Some(marker) = frame.hovered() {
                    debug!(category = %marker.category, index = marker.index, center = ?marker.center, "Marker hovered");
                }
            }
        }
        self.last = summary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use crate::hotkeys::{Key, KeySnapshot};
    use crate::poi::Dataset;
    use crate::style::build_type_specs;
    use crate::x11_utils::PointerSource;
    use anyhow::Result;
    use serde_json::json;

    struct Pointer(f64, f64);

    impl PointerSource for Pointer {
        fn position(&self) -> Result<(f64, f64)> {
            Ok((self.0, self.1))
        }
    }

    fn engine() -> OverlayEngine {
        let dataset = Dataset::from_json(json!([
            {
                "n": "Stillwater Bayou",
                "spawns": [{"c": [1000, 1000]}, {"c": [3000, 3000]}],
                "towers": [{"c": [2000, 500]}]
            }
        ]))
        .unwrap();
        let style = json!({
            "a": {"categories": "spawns", "radius": 40, "fillColor": "#102030", "borderColor": "#000000"}
        });
        let specs = build_type_specs(&style);
        OverlayEngine::new(&dataset, specs.clone(), ConfigStore::in_memory(&specs), (2560, 1440))
    }

    fn show(engine: &mut OverlayEngine) {
        engine
            .tick(&KeySnapshot::from_keys([Key::Tab]), &Pointer(-100.0, -100.0))
            .unwrap();
    }

    #[test]
    fn test_scaled_radius() {
        assert_eq!(scaled_radius(10, 1.0), 10);
        assert_eq!(scaled_radius(5, 0.5), 2);
        assert_eq!(scaled_radius(7, 0.5), 4);
        assert_eq!(scaled_radius(3, 0.10), 1);
        assert_eq!(scaled_radius(10, 5.0), 40);
    }

    #[test]
    fn test_no_frame_while_hidden() {
        let engine = engine();
        assert!(Frame::capture(&engine).is_none());
    }

    #[test]
    fn test_frame_lists_visible_markers_in_order() {
        let mut engine = engine();
        show(&mut engine);
        let frame = Frame::capture(&engine).unwrap();
        assert_eq!(frame.label, "Stillwater Bayou");

        let categories: Vec<Category> = frame.markers.iter().map(|m| m.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::PossibleXp,
                Category::Spawns,
                Category::Spawns,
                Category::Towers
            ]
        );
        let spawn = &frame.markers[1];
        assert_eq!(spawn.radius, 10);
        assert_eq!(spawn.fill, Rgb::new(0x10, 0x20, 0x30));
        assert_eq!(spawn.border, Rgb::new(0, 0, 0));
        assert_eq!(frame.markers[0].radius, 6);
        assert!(frame.hovered().is_none());
    }

    #[test]
    fn test_frame_skips_hidden_and_disabled() {
        let mut engine = engine();
        show(&mut engine);
        engine.set_type_enabled(Category::PossibleXp, false);
        let first = engine.points(Category::Spawns)[0].clone();
        let (x, y) = engine.rect().project(first.u, first.v);

        let pointer = Pointer(x, y);
        engine.tick(&KeySnapshot::default(), &pointer).unwrap();
        let frame = Frame::capture(&engine).unwrap();
        let hovered = frame.hovered().unwrap();
        assert_eq!((hovered.category, hovered.index), (Category::Spawns, 0));

        engine.hide_hovered();
        let frame = Frame::capture(&engine).unwrap();
        assert_eq!(frame.markers.len(), 2);
        assert_eq!(frame.markers[0].index, 1);
        assert!(frame.markers.iter().all(|m| m.category != Category::PossibleXp));
    }

    #[test]
    fn test_scale_applies_to_markers() {
        let mut engine = engine();
        show(&mut engine);
        engine.set_global_scale(0.5);
        let frame = Frame::capture(&engine).unwrap();
        assert_eq!(frame.markers[0].radius, 3);
        assert_eq!(frame.markers[1].radius, 5);
    }
}
