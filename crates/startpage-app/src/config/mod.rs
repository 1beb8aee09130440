//! Configuration file parsing for the start page
//!
//! Supports:
//! - `<config_dir>/start-page/config.toml` - Global settings
//! - `--config PATH` - An explicit settings file

pub mod settings;
pub mod types;

pub use settings::{default_config_path, init_config, load_settings, validate_settings};
pub use types::*;
