//! Configuration management for Verdict
//!
//! Handles loading, validating and saving page geometry, chart sizes, the default
//! palette and report wording.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::aggregate::DEFAULT_NARRATIVE_TEMPLATE;
use crate::color::Palette;
use crate::{Result, VerdictError};

pub const CONFIG_ENV_VAR: &str = "VERDICT_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerdictConfig {
  /// Chart colors used when the caller does not supply any
  #[serde(default)]
  pub palette: Palette,
  #[serde(default)]
  pub page: PageSettings,
  #[serde(default)]
  pub chart: ChartSettings,
  #[serde(default)]
  pub report: ReportSettings,
}

/// Fixed-page geometry, in PDF points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSettings {
  #[serde(default = "default_page_width")]
  pub width: f32,
  #[serde(default = "default_page_height")]
  pub height: f32,
  #[serde(default = "default_side_margin")]
  pub margin_left: f32,
  #[serde(default = "default_side_margin")]
  pub margin_right: f32,
  #[serde(default = "default_vertical_margin")]
  pub margin_top: f32,
  #[serde(default = "default_vertical_margin")]
  pub margin_bottom: f32,
  /// Vertical gap left after every placed block
  #[serde(default = "default_block_padding")]
  pub block_padding: f32,
}

/// Raster size of generated charts and the size they are drawn at in documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSettings {
  #[serde(default = "default_chart_width")]
  pub width: u32,
  #[serde(default = "default_chart_height")]
  pub height: u32,
  /// Label text height in pixels
  #[serde(default = "default_font_size")]
  pub font_size: u32,
  #[serde(default = "default_display_width")]
  pub display_width: f32,
  #[serde(default = "default_display_height")]
  pub display_height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
  #[serde(default = "default_title")]
  pub title: String,
  #[serde(default = "default_narrative_template")]
  pub narrative_template: String,
  /// Prefix for generated file names, e.g. `report_<id>.pdf`
  #[serde(default = "default_file_stem")]
  pub file_stem: String,
}

// Default value functions
fn default_page_width() -> f32 {
  595.0
}
fn default_page_height() -> f32 {
  842.0
}
fn default_side_margin() -> f32 {
  72.0
}
fn default_vertical_margin() -> f32 {
  30.0
}
fn default_block_padding() -> f32 {
  20.0
}
fn default_chart_width() -> u32 {
  800
}
fn default_chart_height() -> u32 {
  400
}
fn default_font_size() -> u32 {
  20
}
fn default_display_width() -> f32 {
  400.0
}
fn default_display_height() -> f32 {
  200.0
}
fn default_title() -> String {
  "Report".to_string()
}
fn default_narrative_template() -> String {
  DEFAULT_NARRATIVE_TEMPLATE.to_string()
}
fn default_file_stem() -> String {
  "report".to_string()
}

impl Default for PageSettings {
  fn default() -> Self {
    Self {
      width: default_page_width(),
      height: default_page_height(),
      margin_left: default_side_margin(),
      margin_right: default_side_margin(),
      margin_top: default_vertical_margin(),
      margin_bottom: default_vertical_margin(),
      block_padding: default_block_padding(),
    }
  }
}

impl PageSettings {
  pub fn content_width(&self) -> f32 {
    self.width - self.margin_left - self.margin_right
  }

  pub fn content_height(&self) -> f32 {
    self.height - self.margin_top - self.margin_bottom
  }
}

impl Default for ChartSettings {
  fn default() -> Self {
    Self {
      width: default_chart_width(),
      height: default_chart_height(),
      font_size: default_font_size(),
      display_width: default_display_width(),
      display_height: default_display_height(),
    }
  }
}

impl Default for ReportSettings {
  fn default() -> Self {
    Self {
      title: default_title(),
      narrative_template: default_narrative_template(),
      file_stem: default_file_stem(),
    }
  }
}

impl VerdictConfig {
  /// Load configuration from a file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
      .map_err(|e| VerdictError::config(format!("cannot read {}: {e}", path.display())))?;
    let config: VerdictConfig = serde_json::from_str(&content)
      .map_err(|e| VerdictError::config(format!("invalid {}: {e}", path.display())))?;
    config.validate()?;
    Ok(config)
  }

  /// Load configuration from `$VERDICT_CONFIG`, the current directory, the home
  /// directory, or fall back to defaults
  pub fn load() -> Result<Self> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
      return Self::load_from_file(explicit);
    }

    for path in Self::search_paths() {
      if path.exists() {
        return Self::load_from_file(path);
      }
    }

    // No config file found, use defaults
    Ok(VerdictConfig::default())
  }

  fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(".verdict.json"), PathBuf::from("verdict.json")];
    if let Some(home) = dirs::home_dir() {
      paths.push(home.join(".verdict").join("config.json"));
    }
    paths
  }

  /// Save configuration to a file
  pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(self)
      .map_err(|e| VerdictError::config(format!("cannot serialize configuration: {e}")))?;
    std::fs::write(path, content)?;
    Ok(())
  }

  pub fn validate(&self) -> Result<()> {
    let page = &self.page;
    if page.width <= 0.0 || page.height <= 0.0 {
      return Err(VerdictError::config("page width and height must be positive"));
    }
    if page.content_width() <= 0.0 || page.content_height() <= 0.0 {
      return Err(VerdictError::config("page margins leave no room for content"));
    }
    if self.chart.width == 0 || self.chart.height == 0 || self.chart.font_size == 0 {
      return Err(VerdictError::config("chart width, height and font size must be non-zero"));
    }
    if self.chart.display_width <= 0.0 || self.chart.display_height <= 0.0 {
      return Err(VerdictError::config("chart display size must be positive"));
    }
    if self.chart.display_height > page.content_height() {
      return Err(VerdictError::config("chart display height exceeds the printable page height"));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use std::fs;
  use tempfile::TempDir;

  #[test]
  fn test_config_default() {
    let config = VerdictConfig::default();
    assert_eq!(config.page.width, 595.0);
    assert_eq!(config.page.height, 842.0);
    assert_eq!(config.page.margin_left, 72.0);
    assert_eq!(config.page.content_width(), 451.0);
    assert_eq!(config.chart.width, 800);
    assert_eq!(config.palette.len(), 3);
    assert_eq!(config.report.title, "Report");
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_config_load_nonexistent_file() {
    let result = VerdictConfig::load_from_file(Path::new("nonexistent.json"));
    assert_eq!(result.unwrap_err().kind(), "config");
  }

  #[test]
  fn test_config_load_partial_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("partial.json");

    let config_content = r#"{
            "page": { "margin_top": 50 },
            "palette": ["pink", "yellow", "red"]
        }"#;
    fs::write(&config_path, config_content).unwrap();

    let config = VerdictConfig::load_from_file(&config_path).unwrap();
    assert_eq!(config.page.margin_top, 50.0);
    // Other fields should have defaults
    assert_eq!(config.page.margin_bottom, 30.0);
    assert_eq!(config.chart.height, 400);
    assert_eq!(config.palette.colors()[0].to_string(), "#ffc0cb");
  }

  #[test]
  fn test_config_load_invalid_json() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("invalid.json");
    fs::write(&config_path, "{ invalid json }").unwrap();

    assert!(VerdictConfig::load_from_file(&config_path).is_err());
  }

  #[test]
  fn test_config_rejects_margins_wider_than_page() {
    let mut config = VerdictConfig::default();
    config.page.margin_left = 400.0;
    config.page.margin_right = 400.0;
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_config_rejects_zero_chart_size() {
    let mut config = VerdictConfig::default();
    config.chart.width = 0;
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_config_load_and_save() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("verdict.json");

    let mut original = VerdictConfig::default();
    original.report.title = "Quarterly Reviews".to_string();
    original.chart.display_height = 180.0;

    original.save_to_file(&config_path).unwrap();
    let loaded = VerdictConfig::load_from_file(&config_path).unwrap();

    assert_eq!(original, loaded);
  }

  #[test]
  #[serial]
  fn test_config_load_honours_env_var() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("custom.json");
    fs::write(&config_path, r#"{ "report": { "title": "From env" } }"#).unwrap();

    std::env::set_var(CONFIG_ENV_VAR, &config_path);
    let config = VerdictConfig::load();
    std::env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.unwrap().report.title, "From env");
  }
}
