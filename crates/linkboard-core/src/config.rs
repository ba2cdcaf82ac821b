//! Editor tuning parameters.

use crate::connection::DEFAULT_CONNECTION_COLOR;
use crate::ports::PORT_CAPTURE_RADIUS;
use crate::shapes::SerializableColor;
use crate::snap::{ALIGNMENT_TOLERANCE, SNAP_DISTANCE};
use crate::spacing::{CENTER_ALIGNMENT_TOLERANCE, SPACING_TOLERANCE};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tolerances and defaults used by the interaction engine.
///
/// Missing fields in a config file fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub alignment_tolerance: f64,
    pub snap_distance: f64,
    pub center_alignment_tolerance: f64,
    pub spacing_tolerance: f64,
    pub port_capture_radius: f64,
    pub default_canvas_width: f64,
    pub default_canvas_height: f64,
    /// Color given to newly drawn connections.
    pub connection_color: SerializableColor,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            alignment_tolerance: ALIGNMENT_TOLERANCE,
            snap_distance: SNAP_DISTANCE,
            center_alignment_tolerance: CENTER_ALIGNMENT_TOLERANCE,
            spacing_tolerance: SPACING_TOLERANCE,
            port_capture_radius: PORT_CAPTURE_RADIUS,
            default_canvas_width: 800.0,
            default_canvas_height: 600.0,
            connection_color: DEFAULT_CONNECTION_COLOR,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check that tolerances are finite and non-negative and the canvas is not empty.
    pub fn validate(&self) -> ConfigResult<()> {
        let tolerances = [
            ("alignment_tolerance", self.alignment_tolerance),
            ("snap_distance", self.snap_distance),
            ("center_alignment_tolerance", self.center_alignment_tolerance),
            ("spacing_tolerance", self.spacing_tolerance),
            ("port_capture_radius", self.port_capture_radius),
        ];
        for (field, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a finite non-negative number, got {}", value),
                });
            }
        }

        let extents = [
            ("default_canvas_width", self.default_canvas_width),
            ("default_canvas_height", self.default_canvas_height),
        ];
        for (field, value) in extents {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a positive number, got {}", value),
                });
            }
        }

        Ok(())
    }

    /// The configured default canvas size.
    pub fn default_canvas_size(&self) -> Size {
        Size::new(self.default_canvas_width, self.default_canvas_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!((config.alignment_tolerance - 5.0).abs() < f64::EPSILON);
        assert!((config.snap_distance - 8.0).abs() < f64::EPSILON);
        assert!((config.port_capture_radius - 15.0).abs() < f64::EPSILON);
        assert_eq!(config.default_canvas_size(), Size::new(800.0, 600.0));
        assert_eq!(config.connection_color, SerializableColor::black());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r##"{"snap_distance": 12, "connection_color": "#ff0000"}"##;
        let config = EditorConfig::from_json(json).unwrap();
        assert!((config.snap_distance - 12.0).abs() < f64::EPSILON);
        assert!((config.spacing_tolerance - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.connection_color, SerializableColor::rgb(255, 0, 0));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EditorConfig {
            alignment_tolerance: 3.0,
            ..EditorConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(EditorConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_values() {
        let err = EditorConfig::from_json(r#"{"alignment_tolerance": -1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "alignment_tolerance", .. }));

        let err = EditorConfig::from_json(r#"{"default_canvas_width": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "default_canvas_width", .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = EditorConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let err = EditorConfig::from_json(r#"{"connection_color": "blue"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"port_capture_radius": 20}}"#).unwrap();
        let config = EditorConfig::load(file.path()).unwrap();
        assert!((config.port_capture_radius - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EditorConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
