use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::columns::{DEFAULT_TIMEZONE, WidthLimits};
use crate::virtual_list::DEFAULT_OVERSCAN;

/// Inputs larger than this are parsed off the UI task
pub const DEFAULT_ASYNC_PARSE_THRESHOLD: usize = 256 * 1024;

/// Buffer size of the channel carrying background parse results
pub const DEFAULT_CHANNEL_BUFFER: usize = 16;

/// Configuration for iisview
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// IANA timezone the date and time columns are shown in
    pub timezone: String,
    /// Rows rendered beyond each edge of the viewport
    pub overscan: usize,
    /// Estimated height of a row, in lines
    pub row_height: u32,
    pub min_column_width: u16,
    pub max_column_width: u16,
    pub default_column_width: u16,
    /// Size in bytes above which pasted text is parsed in the background
    pub async_parse_threshold: usize,
    /// Color theme name
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.name().to_string(),
            overscan: DEFAULT_OVERSCAN,
            row_height: 1,
            min_column_width: 6,
            max_column_width: 60,
            default_column_width: 16,
            async_parse_threshold: DEFAULT_ASYNC_PARSE_THRESHOLD,
            theme: "default".to_string(),
        }
    }
}

impl Config {
    /// Load configuration.
    /// Priority: environment variables > config file > defaults
    pub fn load() -> Result<Self> {
        let mut config = match Self::path() {
            Some(path) if path.exists() => {
                tracing::info!(path = %path.display(), "loading configuration");
                Self::from_file(&path)?
            }
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.normalize();
        Ok(config)
    }

    /// `IISVIEW_CONFIG`, or `config.toml` in the user's config directory
    pub fn path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("IISVIEW_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("iisview").join("config.toml"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `IISVIEW_*` overrides looked up through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(tz) = lookup("IISVIEW_TZ") {
            self.timezone = tz;
        }
        if let Some(overscan) = lookup("IISVIEW_OVERSCAN").and_then(|s| s.parse().ok()) {
            self.overscan = overscan;
        }
        if let Some(theme) = lookup("IISVIEW_THEME") {
            self.theme = theme;
        }
    }

    /// Repair values that would make the table unusable
    fn normalize(&mut self) {
        self.row_height = self.row_height.max(1);
        self.min_column_width = self.min_column_width.max(1);
        self.max_column_width = self.max_column_width.max(self.min_column_width);
        self.default_column_width = self
            .default_column_width
            .clamp(self.min_column_width, self.max_column_width);
    }

    /// The configured display timezone, or the default if the name is unknown
    pub fn timezone(&self) -> Tz {
        match self.timezone.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::warn!(timezone = %self.timezone, "unknown timezone, using default");
                DEFAULT_TIMEZONE
            }
        }
    }

    pub fn width_limits(&self) -> WidthLimits {
        WidthLimits {
            min: self.min_column_width,
            max: self.max_column_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timezone(), chrono_tz::Asia::Seoul);
        assert_eq!(config.overscan, 10);
        assert_eq!(config.width_limits(), WidthLimits { min: 6, max: 60 });
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("timezone = \"Europe/Berlin\"\noverscan = 4\n").unwrap();
        assert_eq!(config.timezone(), chrono_tz::Europe::Berlin);
        assert_eq!(config.overscan, 4);
        assert_eq!(config.default_column_width, 16);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(Config::from_toml("overscan = \"many\"").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml("timezone = \"UTC\"\ntheme = \"dracula\"").unwrap();
        config.apply_overrides(|key| match key {
            "IISVIEW_TZ" => Some("America/New_York".to_string()),
            "IISVIEW_OVERSCAN" => Some("not a number".to_string()),
            _ => None,
        });
        assert_eq!(config.timezone, "America/New_York");
        assert_eq!(config.overscan, 10);
        assert_eq!(config.theme, "dracula");
    }

    #[test]
    fn test_unknown_timezone_falls_back() {
        let config = Config {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..Config::default()
        };
        assert_eq!(config.timezone(), DEFAULT_TIMEZONE);
    }

    #[test]
    fn test_normalize_repairs_widths() {
        let mut config = Config {
            min_column_width: 0,
            max_column_width: 0,
            default_column_width: 40,
            row_height: 0,
            ..Config::default()
        };
        config.normalize();
        assert_eq!(config.min_column_width, 1);
        assert_eq!(config.max_column_width, 1);
        assert_eq!(config.default_column_width, 1);
        assert_eq!(config.row_height, 1);
    }
}
