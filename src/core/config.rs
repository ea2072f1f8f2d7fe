//! Render configuration
//!
//! Holds the tile sources to composite, the optional compass overlay and the
//! download settings handed through to whatever fetches tiles. Everything is
//! serde-enabled so a configuration can be kept as JSON next to the tiles.

use crate::core::constants::DEFAULT_RADIUS_KM;
use crate::tiles::source::TileSource;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Tile sources in priority order; later sources are drawn on top
    pub sources: Vec<TileSource>,
    pub compass: Option<CompassOverlay>,
    /// Radius used when a render covers a single point
    pub default_radius_km: f64,
    pub download: DownloadSettings,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            compass: None,
            default_radius_km: DEFAULT_RADIUS_KM,
            download: DownloadSettings::default(),
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_source(mut self, source: TileSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_compass(mut self, compass: CompassOverlay) -> Self {
        self.compass = Some(compass);
        self
    }
}

/// Compass icon drawn over the finished output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompassOverlay {
    /// Icon file handed to the icon lookup
    pub icon: PathBuf,
    /// Size the rotated icon is resized to
    pub size: (u32, u32),
    /// Top-left position in the output image
    pub position: (i64, i64),
}

impl CompassOverlay {
    pub fn new(icon: impl Into<PathBuf>, size: (u32, u32), position: (i64, i64)) -> Self {
        Self {
            icon: icon.into(),
            size,
            position,
        }
    }
}

/// Settings for the external tile downloader. The renderer never acts on
/// these; they travel with the configuration so a fetcher can pick them up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    pub max_threads: usize,
    pub retry_after_secs: u64,
    /// Folder the downloader writes tiles into
    pub temp_dir: PathBuf,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            max_threads: 1,
            retry_after_secs: 900,
            temp_dir: PathBuf::from("."),
        }
    }
}

impl DownloadSettings {
    /// Ignores zero, at least one worker is always allowed
    pub fn set_max_threads(&mut self, max_threads: usize) {
        if max_threads > 0 {
            self.max_threads = max_threads;
        }
    }

    pub fn set_retry_after_secs(&mut self, retry_after_secs: u64) {
        self.retry_after_secs = retry_after_secs;
    }

    /// An empty path falls back to the working directory
    pub fn set_temp_dir(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.temp_dir = if path.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            path
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert!(config.sources.is_empty());
        assert!(config.compass.is_none());
        assert_eq!(config.default_radius_km, 1.0);
        assert_eq!(config.download.max_threads, 1);
        assert_eq!(config.download.retry_after_secs, 900);
        assert_eq!(config.download.temp_dir, PathBuf::from("."));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RenderConfig::from_json_str(
            r#"{
                "default_radius_km": 5.0,
                "compass": { "icon": "compass.png", "size": [64, 64], "position": [10, 20] },
                "download": { "max_threads": 4 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.default_radius_km, 5.0);
        assert_eq!(
            config.compass,
            Some(CompassOverlay::new("compass.png", (64, 64), (10, 20)))
        );
        assert_eq!(config.download.max_threads, 4);
        assert_eq!(config.download.retry_after_secs, 900);
    }

    #[test]
    fn test_json_round_trip() {
        let config = RenderConfig::default()
            .with_source(TileSource::new(7, "Streets", "https://tiles.example/{z}/{x}/{y}.png"))
            .with_compass(CompassOverlay::new("north.png", (32, 32), (0, 0)));
        let json = config.to_json_pretty().unwrap();
        assert_eq!(RenderConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.json");
        let config = RenderConfig::default().with_source(TileSource::openstreetmap(2));
        std::fs::write(&path, config.to_json_pretty().unwrap()).unwrap();
        assert_eq!(RenderConfig::from_json_file(&path).unwrap(), config);

        assert!(matches!(
            RenderConfig::from_json_file(dir.path().join("missing.json")),
            Err(crate::MapError::Io(_))
        ));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        assert!(matches!(
            RenderConfig::from_json_str("{ not json"),
            Err(crate::MapError::Config(_))
        ));
    }

    #[test]
    fn test_download_setters_clamp() {
        let mut download = DownloadSettings::default();
        download.set_max_threads(0);
        assert_eq!(download.max_threads, 1);
        download.set_max_threads(8);
        assert_eq!(download.max_threads, 8);
        download.set_temp_dir("");
        assert_eq!(download.temp_dir, PathBuf::from("."));
        download.set_temp_dir("/var/tiles");
        assert_eq!(download.temp_dir, PathBuf::from("/var/tiles"));
    }
}
