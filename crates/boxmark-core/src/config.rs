//! Engine configuration.

use crate::interaction::{GestureSettings, NotifyMode};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default display surface size in device pixels.
pub const DEFAULT_DISPLAY_SIZE: Size = Size::new(800.0, 600.0);
/// Default margin kept around the fitted image, in device pixels.
pub const DEFAULT_MARGIN: f64 = 20.0;
/// Default minimum annotation side, in image units.
pub const DEFAULT_MIN_SIZE: f64 = 10.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid display size {width}x{height}")]
    DisplaySize { width: f64, height: f64 },
    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
    #[error("Invalid key binding for {0}")]
    EmptyBinding(&'static str),
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Key bindings for engine actions that have no fixed key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keybindings {
    /// Switches between the select and draw tools.
    pub toggle_tool: String,
}

impl Default for Keybindings {
    fn default() -> Self {
        Self {
            toggle_tool: "b".to_string(),
        }
    }
}

/// Parameters of one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub display_width: f64,
    pub display_height: f64,
    /// Space kept free around the image when fitting it.
    pub margin: f64,
    /// Boxes must be strictly larger than this on both sides.
    pub min_size: f64,
    /// Side length of resize handle hotspots.
    pub handle_size: f64,
    pub double_click_ms: u64,
    pub double_click_distance: f64,
    pub notify_mode: NotifyMode,
    pub keybindings: Keybindings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            display_width: DEFAULT_DISPLAY_SIZE.width,
            display_height: DEFAULT_DISPLAY_SIZE.height,
            margin: DEFAULT_MARGIN,
            min_size: DEFAULT_MIN_SIZE,
            handle_size: crate::hit_test::HANDLE_SIZE,
            double_click_ms: 500,
            double_click_distance: 5.0,
            notify_mode: NotifyMode::EveryFrame,
            keybindings: Keybindings::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.display_width > 0.0 && self.display_height > 0.0) {
            return Err(ConfigError::DisplaySize {
                width: self.display_width,
                height: self.display_height,
            });
        }
        if !(self.margin >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "margin",
                value: self.margin,
            });
        }
        if !(self.min_size >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "min_size",
                value: self.min_size,
            });
        }
        if !(self.handle_size > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "handle_size",
                value: self.handle_size,
            });
        }
        if !(self.double_click_distance >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "double_click_distance",
                value: self.double_click_distance,
            });
        }
        if self.keybindings.toggle_tool.trim().is_empty() {
            return Err(ConfigError::EmptyBinding("toggle_tool"));
        }
        Ok(())
    }

    pub fn display_size(&self) -> Size {
        Size::new(self.display_width, self.display_height)
    }

    pub fn double_click_interval(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }

    pub fn gesture_settings(&self) -> GestureSettings {
        GestureSettings {
            min_size: self.min_size,
            handle_size: self.handle_size,
            notify_mode: self.notify_mode,
        }
    }

    pub fn with_display_size(mut self, width: f64, height: f64) -> Self {
        self.display_width = width;
        self.display_height = height;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_min_size(mut self, min_size: f64) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_handle_size(mut self, handle_size: f64) -> Self {
        self.handle_size = handle_size;
        self
    }

    pub fn with_notify_mode(mut self, mode: NotifyMode) -> Self {
        self.notify_mode = mode;
        self
    }

    pub fn with_toggle_tool_key(mut self, key: impl Into<String>) -> Self {
        self.keybindings.toggle_tool = key.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.display_size(), Size::new(800.0, 600.0));
        assert!((config.min_size - 10.0).abs() < f64::EPSILON);
        assert!((config.handle_size - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{"min_size": 4, "notify_mode": "on_release"}"#).unwrap();
        assert!((config.min_size - 4.0).abs() < f64::EPSILON);
        assert_eq!(config.notify_mode, NotifyMode::OnRelease);
        assert_eq!(config.keybindings.toggle_tool, "b");
    }

    #[test]
    fn test_validation_errors() {
        let bad = EngineConfig::default().with_display_size(0.0, 600.0);
        assert!(matches!(bad.validate(), Err(ConfigError::DisplaySize { .. })));

        let bad = EngineConfig::default().with_handle_size(-1.0);
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::InvalidValue { field: "handle_size", .. })
        ));

        let bad = EngineConfig::default().with_toggle_tool_key(" ");
        assert!(matches!(bad.validate(), Err(ConfigError::EmptyBinding(_))));

        assert!(matches!(EngineConfig::from_json("42"), Err(ConfigError::Parse(_))));
        assert!(EngineConfig::from_json(r#"{"margin": -3}"#).is_err());
    }
}
