//! Color types shared by style data, user settings and the render view

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// SVG color keywords accepted in style data, matched case-insensitively
const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("black", Rgb::new(0, 0, 0)),
    ("white", Rgb::new(255, 255, 255)),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 128, 0)),
    ("lime", Rgb::new(0, 255, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("gold", Rgb::new(255, 215, 0)),
    ("orange", Rgb::new(255, 165, 0)),
    ("orangered", Rgb::new(255, 69, 0)),
    ("purple", Rgb::new(128, 0, 128)),
    ("violet", Rgb::new(238, 130, 238)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("fuchsia", Rgb::new(255, 0, 255)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("aqua", Rgb::new(0, 255, 255)),
    ("teal", Rgb::new(0, 128, 128)),
    ("navy", Rgb::new(0, 0, 128)),
    ("maroon", Rgb::new(128, 0, 0)),
    ("olive", Rgb::new(128, 128, 0)),
    ("brown", Rgb::new(165, 42, 42)),
    ("pink", Rgb::new(255, 192, 203)),
    ("silver", Rgb::new(192, 192, 192)),
    ("gray", Rgb::new(128, 128, 128)),
    ("grey", Rgb::new(128, 128, 128)),
    ("darkgray", Rgb::new(169, 169, 169)),
    ("darkgrey", Rgb::new(169, 169, 169)),
    ("lightgray", Rgb::new(211, 211, 211)),
    ("lightgrey", Rgb::new(211, 211, 211)),
    ("darkred", Rgb::new(139, 0, 0)),
    ("darkgreen", Rgb::new(0, 100, 0)),
    ("darkblue", Rgb::new(0, 0, 139)),
    ("skyblue", Rgb::new(135, 206, 235)),
    ("turquoise", Rgb::new(64, 224, 208)),
    ("khaki", Rgb::new(240, 230, 140)),
    ("salmon", Rgb::new(250, 128, 114)),
    ("tomato", Rgb::new(255, 99, 71)),
    ("crimson", Rgb::new(220, 20, 60)),
    ("chocolate", Rgb::new(210, 105, 30)),
    ("tan", Rgb::new(210, 180, 140)),
    ("beige", Rgb::new(245, 245, 220)),
    ("ivory", Rgb::new(255, 255, 240)),
    ("indigo", Rgb::new(75, 0, 130)),
    ("orchid", Rgb::new(218, 112, 214)),
    ("coral", Rgb::new(255, 127, 80)),
];

/// 8-bit RGB color, persisted as a `[r, g, b]` array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex_string(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [self.r, self.g, self.b].serialize(serializer)
    }
}

/// Components may be integers, floats (truncated) or numeric strings and are
/// clamped to 0..=255. Anything other than a 3-element array is rejected.
impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Channel {
            Int(i64),
            Float(f64),
            Text(String),
        }

        let channels = <[Channel; 3]>::deserialize(deserializer)?;
        let mut rgb = [0u8; 3];
        for (slot, channel) in rgb.iter_mut().zip(channels) {
            let n = match channel {
                Channel::Int(n) => n,
                Channel::Float(f) => f.trunc() as i64,
                Channel::Text(s) => s
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| de::Error::custom(format!("invalid color channel '{s}'")))?,
            };
            *slot = n.clamp(0, 255) as u8;
        }
        Ok(Self::new(rgb[0], rgb[1], rgb[2]))
    }
}

/// Color parser for style data
///
/// Accepts `RGB`, `RRGGBB` and `AARRGGBB` with an optional `#` prefix, or an
/// SVG color keyword such as `gold`. Alpha is parsed but discarded since
/// markers are always drawn opaque.
pub struct HexColor;

impl HexColor {
    pub fn parse(input: &str) -> Option<Rgb> {
        let input = input.trim();
        let hex = input.strip_prefix('#').unwrap_or(input);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Self::named(input);
        }

        match hex.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (slot, c) in channels.iter_mut().zip(hex.chars()) {
                    let nibble = c.to_digit(16)? as u8;
                    *slot = nibble * 17;
                }
                Some(Rgb::new(channels[0], channels[1], channels[2]))
            }
            6 | 8 => {
                let argb = u32::from_str_radix(hex, 16).ok()?;
                Some(Self::from_argb32(argb))
            }
            _ => None,
        }
    }

    fn named(name: &str) -> Option<Rgb> {
        NAMED_COLORS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|&(_, rgb)| rgb)
    }

    /// Drop the alpha byte of a packed ARGB value
    pub fn from_argb32(argb: u32) -> Rgb {
        Rgb::new((argb >> 16) as u8, (argb >> 8) as u8, argb as u8)
    }

    /// Parse or fall back, for style records that may carry garbage
    pub fn parse_or(input: Option<&Value>, fallback: Rgb) -> Rgb {
        input
            .and_then(Value::as_str)
            .and_then(Self::parse)
            .unwrap_or(fallback)
    }
}
