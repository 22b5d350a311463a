//! Configuration for termprogress.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.termprogress/config.toml`
//! - Progress and color settings for the demo runner
//!
//! # Configuration File
//!
//! ```toml
//! # Reset colors when interrupted by a signal
//! install_signal_handlers = true
//!
//! [progress]
//! label = "Working"
//! steps = 50
//! delay_ms = 40
//!
//! [color]
//! foreground = "green"
//! foreground_style = ["bold"]
//! background = "black"
//! background_style = []
//! ```
//!
//! Colors: black, red, green, yellow, blue, purple (or magenta), cyan, white.
//! Styles: regular, bold, underline, high_intensity.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConsoleError, Result};
use crate::ui::{Color, ColorStyle};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Install the color-reset signal handlers
    pub install_signal_handlers: bool,
    /// Progress run settings
    pub progress: ProgressConfig,
    /// Output colors
    pub color: ColorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            install_signal_handlers: true,
            progress: ProgressConfig::default(),
            color: ColorConfig::default(),
        }
    }
}

/// Progress run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub label: String,
    pub steps: u32,
    pub delay_ms: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            label: "Working".to_string(),
            steps: 50,
            delay_ms: 40,
        }
    }
}

/// Color configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub foreground: Color,
    pub foreground_style: Vec<String>,
    pub background: Color,
    pub background_style: Vec<String>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            foreground: Color::Green,
            foreground_style: vec!["bold".to_string()],
            background: Color::Black,
            background_style: Vec::new(),
        }
    }
}

impl ColorConfig {
    pub fn foreground_style(&self) -> Result<ColorStyle> {
        parse_styles(&self.foreground_style)
    }

    pub fn background_style(&self) -> Result<ColorStyle> {
        parse_styles(&self.background_style)
    }
}

fn parse_styles(names: &[String]) -> Result<ColorStyle> {
    names.iter().try_fold(ColorStyle::empty(), |acc, name| {
        ColorStyle::parse(name)
            .map(|style| acc | style)
            .ok_or_else(|| ConsoleError::UnknownStyle(name.clone()))
    })
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Load configuration from `path`
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConsoleError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConsoleError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path().ok_or(ConsoleError::NoConfigPath)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| ConsoleError::ConfigWrite {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| ConsoleError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `~/.termprogress/config.toml`
    pub fn config_path() -> Option<PathBuf> {
        data_dir().map(|dir| dir.join("config.toml"))
    }
}

/// `~/.termprogress`, home of the config file and the log
pub fn data_dir() -> Option<PathBuf> {
    home_dir().map(|home| home.join(".termprogress"))
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str(
            r#"
            install_signal_handlers = false

            [progress]
            label = "Pulling"

            [color]
            foreground = "cyan"
            foreground_style = ["underline", "high_intensity"]
            background_style = ["bold"]
            "#,
        )
        .unwrap();

        assert!(!config.install_signal_handlers);
        assert_eq!(config.progress.label, "Pulling");
        assert_eq!(config.progress.steps, 50);
        assert_eq!(config.color.foreground, Color::Cyan);
        assert_eq!(
            config.color.foreground_style().unwrap(),
            ColorStyle::UNDERLINE | ColorStyle::HIGH_INTENSITY
        );
        assert_eq!(config.color.background, Color::Black);
        assert_eq!(config.color.background_style().unwrap(), ColorStyle::BOLD);
    }

    #[test]
    fn test_unknown_color_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("[color]\nforeground = \"orange\"");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Unknown color: orange"), "{}", err);
    }

    #[test]
    fn test_color_names_are_case_insensitive() {
        let config: Config = toml::from_str("[color]\nforeground = \"Magenta\"\nbackground = \"WHITE\"").unwrap();
        assert_eq!(config.color.foreground, Color::Purple);
        assert_eq!(config.color.background, Color::White);
    }

    #[test]
    fn test_unknown_style_rejected() {
        let color = ColorConfig {
            foreground_style: vec!["bold".to_string(), "blink".to_string()],
            ..ColorConfig::default()
        };
        match color.foreground_style() {
            Err(ConsoleError::UnknownStyle(name)) => assert_eq!(name, "blink"),
            other => panic!("expected UnknownStyle, got {:?}", other),
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("termprogress-config-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut config = Config::default();
        config.progress.steps = 7;
        config.color.background = Color::Blue;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = Path::new("/nonexistent/termprogress/config.toml");
        assert!(matches!(Config::load_from(path), Err(ConsoleError::ConfigRead { .. })));
    }
}
