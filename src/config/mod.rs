//! Configuration management
//!
//! - **settings**: the persisted schema and its built-in defaults
//! - **persistent**: ConfigStore, merging the JSON file over defaults and writing it back

pub mod persistent;
pub mod settings;

// Re-export commonly used types
pub use persistent::ConfigStore;
pub use settings::{clamp_scale, Settings};
