//! Map profiles and the screen rectangles they draw into

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::maps;

/// One of the four selectable maps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapProfile {
    #[default]
    StillwaterBayou,
    DeSalle,
    LawsonDelta,
    MammonsGulch,
}

impl MapProfile {
    pub const ALL: [MapProfile; 4] = [
        MapProfile::StillwaterBayou,
        MapProfile::DeSalle,
        MapProfile::LawsonDelta,
        MapProfile::MammonsGulch,
    ];

    /// Position in the fixed map list (the `i` field of indexed datasets)
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }

    pub fn name(self) -> &'static str {
        maps::NAMES[self.ordinal()]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

impl fmt::Display for MapProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MapProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            anyhow::anyhow!("unknown map '{s}', expected one of: {}", maps::NAMES.join(", "))
        })
    }
}

impl Serialize for MapProfile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for MapProfile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name).ok_or_else(|| de::Error::custom(format!("unknown map '{name}'")))
    }
}

/// Overlay rectangle as fractions of the display resolution
///
/// Decoding is strict: all four fields must be numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectRatio {
    pub rx: f64,
    pub ry: f64,
    pub rw: f64,
    pub rh: f64,
}

impl Default for RectRatio {
    fn default() -> Self {
        Self {
            rx: maps::DEFAULT_RX,
            ry: maps::DEFAULT_RY,
            rw: maps::DEFAULT_RW,
            rh: maps::DEFAULT_RH,
        }
    }
}

impl RectRatio {
    /// Resolve against the current display size; width and height are at least 1px
    pub fn to_screen_rect(self, screen_width: u32, screen_height: u32) -> ScreenRect {
        let w = f64::from(screen_width);
        let h = f64::from(screen_height);
        ScreenRect {
            x: (self.rx * w) as i32,
            y: (self.ry * h) as i32,
            width: ((self.rw * w) as i32).max(1),
            height: ((self.rh * h) as i32).max(1),
        }
    }
}

/// Rectangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRect {
    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    /// Screen position of a normalized `(u, v)` point inside this rectangle
    pub fn project(&self, u: f64, v: f64) -> (f64, f64) {
        (
            f64::from(self.left()) + u * f64::from(self.width),
            f64::from(self.top()) + v * f64::from(self.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_names_round_trip() {
        for map in MapProfile::ALL {
            assert_eq!(map.name().parse::<MapProfile>().unwrap(), map);
            assert_eq!(MapProfile::from_ordinal(map.ordinal()), Some(map));
        }
        assert_eq!("Mammon's Gulch".parse::<MapProfile>().unwrap(), MapProfile::MammonsGulch);
        assert!("Lawson".parse::<MapProfile>().is_err());
        assert_eq!(MapProfile::from_ordinal(4), None);
    }

    #[test]
    fn test_default_ratio_on_recorded_display() {
        let rect = RectRatio::default().to_screen_rect(2560, 1440);
        assert_eq!(rect, ScreenRect { x: 790, y: 210, width: 983, height: 984 });
    }

    #[test]
    fn test_ratio_scales_with_resolution() {
        let rect = RectRatio::default().to_screen_rect(1920, 1080);
        assert_eq!(rect.x, 592);
        assert_eq!(rect.y, 157);
        assert_eq!(rect.width, 737);
        assert_eq!(rect.height, 738);
    }

    #[test]
    fn test_zero_sized_ratio_keeps_one_pixel() {
        let ratio = RectRatio { rx: 0.5, ry: 0.5, rw: 0.0, rh: 0.0 };
        let rect = ratio.to_screen_rect(800, 600);
        assert_eq!((rect.width, rect.height), (1, 1));
    }

    #[test]
    fn test_ratio_decode_is_strict() {
        let decode = |value| serde_json::from_value::<RectRatio>(value).ok();
        assert_eq!(
            decode(json!({"rx": 0.1, "ry": 0.2, "rw": 0.3, "rh": 0.4})),
            Some(RectRatio { rx: 0.1, ry: 0.2, rw: 0.3, rh: 0.4 })
        );
        assert_eq!(decode(json!({"rx": 0, "ry": 0, "rw": 1, "rh": 1})), Some(RectRatio { rx: 0.0, ry: 0.0, rw: 1.0, rh: 1.0 }));
        assert_eq!(decode(json!({"rx": 0.1, "ry": 0.2, "rw": 0.3})), None);
        assert_eq!(decode(json!({"rx": "a", "ry": 0.2, "rw": 0.3, "rh": 0.4})), None);
    }

    #[test]
    fn test_map_decodes_by_name() {
        assert_eq!(serde_json::from_value::<MapProfile>(json!("DeSalle")).unwrap(), MapProfile::DeSalle);
        assert!(serde_json::from_value::<MapProfile>(json!("Atlantis")).is_err());
        assert!(serde_json::from_value::<MapProfile>(json!(2)).is_err());
        assert_eq!(MapProfile::default(), MapProfile::StillwaterBayou);
    }

    #[test]
    fn test_project() {
        let rect = ScreenRect { x: 100, y: 50, width: 200, height: 400 };
        assert_eq!(rect.project(0.0, 0.0), (100.0, 50.0));
        assert_eq!(rect.project(0.5, 1.0), (200.0, 450.0));
    }
}
