//! Settings parser for config.toml

use std::path::{Path, PathBuf};

use startpage_core::prelude::*;

use super::types::Settings;
use crate::state::DEFAULT_TAB_COUNT;

const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "start-page";

/// `<config_dir>/start-page/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

/// Load settings from `path`, or from the default location when `None`.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) => path,
            None => {
                debug!("No config directory on this platform, using defaults");
                return Settings::default();
            }
        },
    };

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    let settings = match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    };

    sanitize(settings)
}

/// Check values the type system cannot
pub fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.view.tab_count == 0 {
        return Err(Error::config_invalid("view.tab_count must be at least 1"));
    }
    Ok(())
}

/// Replace invalid values with their defaults, logging each one
fn sanitize(mut settings: Settings) -> Settings {
    if let Err(e) = validate_settings(&settings) {
        warn!("{}; using {}", e, DEFAULT_TAB_COUNT);
        settings.view.tab_count = DEFAULT_TAB_COUNT;
    }
    settings
}

/// Write a commented default config to `path` unless one exists.
///
/// Returns true if a file was written.
pub fn init_config(path: &Path) -> Result<bool> {
    if path.exists() {
        debug!("Config already exists at {:?}", path);
        return Ok(false);
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config dir {:?}", dir))?;
    }

    std::fs::write(path, generate_default_config()).context("Failed to write default config")?;

    info!("Wrote default config to {:?}", path);
    Ok(true)
}

fn generate_default_config() -> String {
    r#"# Start Page Configuration

[view]
flow = "changelog"      # "changelog" (menu open) or "no-python" (menu collapsed)
tab_count = 4

[protocol]
# Stamp RequestShowAgainSetting with an id and ignore answers to older requests.
# Only enable for hosts that echo the id back.
correlate_requests = false

[transport]
kind = "stdio"          # "stdio" or "tcp"
addr = "127.0.0.1:7878" # Host address when kind = "tcp"
"#
    .to_string()
}
