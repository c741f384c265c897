//! Configuration module
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use crate::error::Result;
use std::path::PathBuf;
use tracing::info;

/// Load settings from the first file found, falling back to defaults.
///
/// `CLARIFAI_SETTINGS_PATH` takes precedence over the default locations.
/// Environment overrides are applied in every case.
pub fn load() -> Result<Settings> {
    let explicit = std::env::var("CLARIFAI_SETTINGS_PATH").ok().map(PathBuf::from);
    match find_settings_file(explicit, &default_paths()) {
        Some(path) => load_from(path),
        None => {
            info!("No settings file found, using defaults");
            let mut settings = Settings::default();
            settings.merge_env();
            Ok(settings)
        }
    }
}

/// First existing file: the explicit path, then `candidates` in order
fn find_settings_file(explicit: Option<PathBuf>, candidates: &[PathBuf]) -> Option<PathBuf> {
    explicit
        .into_iter()
        .chain(candidates.iter().cloned())
        .find(|path| path.exists())
}

/// Load settings from an explicit path and apply environment overrides
pub fn load_from(path: PathBuf) -> Result<Settings> {
    info!("Loading settings from: {}", path.display());
    let mut settings = Settings::from_file(&path)?;
    settings.merge_env();
    Ok(settings)
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("clarifai.yml"),
        PathBuf::from("config/clarifai.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("clarifai-search/clarifai.yml"));
    }
    paths
}
