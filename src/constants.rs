//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Source map grid constants
pub mod grid {
    /// Largest coordinate on the 4096x4096 source grid
    pub const MAX_COORD: f64 = 4095.0;
}

/// Map profile constants
pub mod maps {
    /// Display names of the selectable maps, in ordinal order
    pub const NAMES: [&str; 4] = [
        "Stillwater Bayou",
        "DeSalle",
        "Lawson Delta",
        "Mammon's Gulch",
    ];

    /// Default rectangle, recorded on a 2560x1440 display
    pub const DEFAULT_RX: f64 = 790.0 / 2560.0;
    pub const DEFAULT_RY: f64 = 210.0 / 1440.0;
    pub const DEFAULT_RW: f64 = 983.0 / 2560.0;
    pub const DEFAULT_RH: f64 = 984.0 / 1440.0;
}

/// Hover and marker sizing constants
pub mod hover {
    /// Pointer must be within this many pixels of a marker center
    pub const RADIUS_PX: f64 = 10.0;
}

pub mod marker {
    /// Style radius is multiplied by this before clamping
    pub const STYLE_RADIUS_FACTOR: f64 = 0.25;

    /// Radius used when the style record has none (or a non-numeric one)
    pub const DEFAULT_STYLE_RADIUS: f64 = 12.0;

    pub const MIN_BASE_RADIUS_PX: i64 = 3;
    pub const MAX_BASE_RADIUS_PX: i64 = 10;

    /// Bounds after global scaling
    pub const MIN_SCALED_RADIUS_PX: i64 = 1;
    pub const MAX_SCALED_RADIUS_PX: i64 = 40;

    /// Fallback colors for categories without a style record
    pub const FALLBACK_BORDER: &str = "#555555";
    pub const FALLBACK_FILL: &str = "#B4B4B4";

    /// Derived category styling (never read from style data)
    pub const POSSIBLE_XP_FILL: &str = "#FFD34D";
    pub const POSSIBLE_XP_BORDER: &str = "#FFFFFF";
    pub const POSSIBLE_XP_RADIUS_PX: i64 = 6;
}

/// Global scale bounds
pub mod scale {
    pub const MIN: f64 = 0.10;
    pub const MAX: f64 = 5.00;
    pub const DEFAULT: f64 = 1.00;

    /// Step used by the smaller/bigger actions
    pub const STEP: f64 = 0.05;
}

/// Control loop timing
pub mod timing {
    use std::time::Duration;

    /// Nominal tick interval in milliseconds
    pub const TICK_INTERVAL_MS: u64 = 16;

    /// How often the run loop re-reads the display size
    pub const SCREEN_CHECK_INTERVAL: Duration = Duration::from_secs(1);
}

/// File system paths and names
pub mod paths {
    /// Directory under the user's local data dir
    pub const APP_DIR: &str = "hunt-overlay";

    pub const DATA_FILE: &str = "data.json";
    pub const STYLE_FILE: &str = "poiData.json";
    pub const CONFIG_FILE: &str = "config.json";

    /// Input device directory
    pub const DEV_INPUT: &str = "/dev/input";
}

/// Input permissions constants
pub mod permissions {
    /// Group required for reading /dev/input devices
    pub const INPUT_GROUP: &str = "input";

    /// Command to add user to input group
    pub const ADD_TO_INPUT_GROUP: &str = "sudo usermod -aG input $USER";
}
