//! Application configuration.
//!
//! The recording and export core never reads this directly; the entry point
//! loads it and passes the relevant values in as call parameters.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::StepcastResult;
use crate::format::ExportFormat;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where exported documents are written.
    pub output_dir: PathBuf,

    /// Document format used when none is given explicitly.
    pub output_format: ExportFormat,

    /// Title printed on exported documents.
    pub document_title: String,

    /// Whether PDF exports start with a cover page.
    pub cover_page: bool,

    /// TrueType font for PDF text; the system sans-serif face when unset.
    pub pdf_font: Option<PathBuf>,

    /// Default recording settings.
    pub recording: RecordingDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default recording parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingDefaults {
    /// Button-state polling interval in milliseconds.
    pub tick_interval_ms: u64,

    /// Radius of the click marker circle in pixels.
    pub marker_radius: u32,

    /// Edge length of each painted marker block in pixels.
    pub marker_block_size: u32,

    /// Marker color as RGBA.
    pub marker_color: [u8; 4],
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "stepcast=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            output_format: ExportFormat::Html,
            document_title: "Step Recording".to_string(),
            cover_page: true,
            pdf_font: None,
            recording: RecordingDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RecordingDefaults {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            marker_radius: 20,
            marker_block_size: 5,
            marker_color: [255, 0, 0, 255],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                Self::default()
            }
        }
    }

    /// Load config from `path`. A missing file yields defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> StepcastResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> StepcastResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> StepcastResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Document path for a recording finished at `now`.
    pub fn output_path(&self, format: ExportFormat, now: DateTime<Local>) -> PathBuf {
        let file_name = format!(
            "recording_{}.{}",
            now.format("%Y-%m-%d_%H%M%S"),
            format.extension()
        );
        self.output_dir.join(file_name)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"));
    base.join("stepcast").join("config.json")
}

/// Default output directory.
fn default_output_dir() -> PathBuf {
    home_dir().join("Documents").join("Stepcast")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.output_format, ExportFormat::Html);
        assert_eq!(config.recording.tick_interval_ms, 50);
        assert!(config.cover_page);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.output_format = ExportFormat::Pdf;
        config.output_dir = dir.path().join("out");
        config.recording.marker_radius = 12;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.output_format, ExportFormat::Pdf);
        assert_eq!(loaded.output_dir, dir.path().join("out"));
        assert_eq!(loaded.recording.marker_radius, 12);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"output_format":"pdf","recording":{"tick_interval_ms":20}}"#)
            .unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.output_format, ExportFormat::Pdf);
        assert_eq!(loaded.recording.tick_interval_ms, 20);
        assert_eq!(loaded.recording.marker_block_size, 5);
        assert_eq!(loaded.logging.level, "info");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn output_path_uses_timestamp_and_extension() {
        let mut config = AppConfig::default();
        config.output_dir = PathBuf::from("/data/out");
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            config.output_path(ExportFormat::Pdf, now),
            PathBuf::from("/data/out/recording_2024-03-09_140507.pdf")
        );
    }
}
