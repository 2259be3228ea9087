//! Command line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::category::Category;
use crate::constants::timing;
use crate::types::MapProfile;

/// Map point-of-interest overlay driven by global hotkeys
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// directory holding data.json, poiData.json and config.json
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// raw map/POI dataset
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// style/metadata dataset
    #[arg(long)]
    pub style: Option<PathBuf>,

    /// persisted settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// control loop period in milliseconds
    #[arg(long, default_value_t = timing::TICK_INTERVAL_MS)]
    pub tick_ms: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the overlay loop (default)
    Run,
    /// Select the active map
    SelectMap {
        #[arg(value_parser = parse_map)]
        map: MapProfile,
    },
    /// Set the global marker scale (clamped to 0.10..=5.00)
    Scale {
        #[arg(required_unless_present = "step")]
        value: Option<f64>,
        /// step the current scale by this many 0.05 increments instead
        #[arg(long, allow_negative_numbers = true, conflicts_with = "value")]
        step: Option<i32>,
    },
    /// Show or hide a whole category
    ToggleType {
        #[arg(value_parser = parse_category)]
        category: Category,
        state: Switch,
    },
    /// Set a category's marker color
    Color {
        #[arg(value_parser = parse_category)]
        category: Category,
        r: u8,
        g: u8,
        b: u8,
    },
    /// Re-enable every category and restore default colors
    ResetColors,
    /// Unhide every hidden POI
    ResetHidden,
    /// Unhide one POI by its identity (e.g. `1024:2048` or `towers:1024:2048`)
    Unhide {
        #[arg(value_parser = parse_category)]
        category: Category,
        id: String,
    },
    /// Allow or forbid switching maps with the number keys
    NumSwitch { state: Switch },
    /// Print the merged configuration as JSON
    Show,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn enabled(self) -> bool {
        self == Switch::On
    }
}

fn parse_map(s: &str) -> Result<MapProfile, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}
