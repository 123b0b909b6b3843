use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::controller::RetapPolicy;
use crate::domain::TravelMode;

/// Environment variable consulted when no Mapbox token is configured.
pub const MAPBOX_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

fn default_verbose() -> bool {
    false
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub mode: TravelMode,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub overpass: Option<OverpassConfig>,
    #[serde(default)]
    pub nominatim: Option<NominatimConfig>,
    #[serde(default)]
    pub mapbox: Option<MapboxConfig>,
    #[serde(default)]
    pub selection: Option<SelectionConfig>,
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_overpass_timeout_secs() -> u64 {
    25
}

#[derive(Debug, Deserialize, Clone)]
pub struct OverpassConfig {
    #[serde(default = "default_overpass_url")]
    pub url: String,
    #[serde(default = "default_overpass_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            url: default_overpass_url(),
            timeout_secs: default_overpass_timeout_secs(),
        }
    }
}

fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_http_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct NominatimConfig {
    #[serde(default = "default_nominatim_url")]
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            url: default_nominatim_url(),
            enabled: default_enabled(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn default_mapbox_url() -> String {
    "https://api.mapbox.com".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapboxConfig {
    #[serde(default = "default_mapbox_url")]
    pub base_url: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MapboxConfig {
    fn default() -> Self {
        Self {
            base_url: default_mapbox_url(),
            access_token: None,
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl MapboxConfig {
    /// Token from the file, else from `MAPBOX_ACCESS_TOKEN`.
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(token) = self.access_token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(token.clone());
        }
        match std::env::var(MAPBOX_TOKEN_ENV) {
            Ok(token) if !token.is_empty() => Ok(token),
            _ => bail!(
                "Mapbox access token missing: set [mapbox] access_token or {}",
                MAPBOX_TOKEN_ENV
            ),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SelectionConfig {
    #[serde(default = "default_enabled")]
    pub require_confirmation: bool,
    #[serde(default)]
    pub retap: RetapPolicy,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            require_confirmation: default_enabled(),
            retap: RetapPolicy::default(),
        }
    }
}

impl FileConfig {
    /// Load the first parseable config file from the search path.
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", path.display());
                        return Some(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                    }
                }
            }
        }
        None
    }

    /// Load an explicitly requested config file; a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn overpass(&self) -> OverpassConfig {
        self.overpass.clone().unwrap_or_default()
    }

    pub fn nominatim(&self) -> NominatimConfig {
        self.nominatim.clone().unwrap_or_default()
    }

    pub fn mapbox(&self) -> MapboxConfig {
        self.mapbox.clone().unwrap_or_default()
    }

    pub fn selection(&self) -> SelectionConfig {
        self.selection.unwrap_or_default()
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("parkfinder.toml"));
    paths.push(PathBuf::from(".parkfinder.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("parkfinder").join("config.toml"));
        paths.push(config_dir.join("parkfinder.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".parkfinder.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.mode, TravelMode::Driving);
        assert_eq!(config.overpass().url, "https://overpass-api.de/api/interpreter");
        assert!(config.nominatim().enabled);
        assert!(config.selection().require_confirmation);
        assert_eq!(config.selection().retap, RetapPolicy::Reset);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parkfinder.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
mode = "walking"

[mapbox]
access_token = "pk.test"

[selection]
require_confirmation = false
retap = "ignore"
"#
        )
        .unwrap();

        let config = FileConfig::load_from(&path).unwrap();
        assert_eq!(config.mode, TravelMode::Walking);
        assert_eq!(config.mapbox().resolve_token().unwrap(), "pk.test");
        assert_eq!(config.mapbox().base_url, "https://api.mapbox.com");
        let selection = config.selection();
        assert!(!selection.require_confirmation);
        assert_eq!(selection.retap, RetapPolicy::Ignore);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempdir().unwrap();
        let err = FileConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "mode = \"teleport\"").unwrap();
        assert!(FileConfig::load_from(&path).is_err());
    }
}
