//! Animator configuration.
//!
//! Timing is kept in whole milliseconds, like the page script it models.
//! Values can come from code (builder methods) or from a TOML file:
//!
//! ```toml
//! lines = ["before failure.", "Cut unplanned downtime by 40%+."]
//!
//! [timing]
//! type_interval_ms = 50
//! hold_ms = 2000
//! erase_interval_ms = 25
//! inter_line_pause_ms = 500
//! start_delay_ms = 300
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

// =============================================================================
// AnimatorConfig
// =============================================================================

/// Timing of the typing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimatorConfig {
    /// Delay between typed characters. Must be positive.
    pub type_interval_ms: u64,
    /// How long a fully typed line stays before erasing.
    pub hold_ms: u64,
    /// Delay between erased characters. Must be positive.
    pub erase_interval_ms: u64,
    /// Empty-surface pause before the next line.
    pub inter_line_pause_ms: u64,
    /// Delay before the very first step after `start()`.
    pub start_delay_ms: u64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            type_interval_ms: 50,
            hold_ms: 2000,
            erase_interval_ms: 25,
            inter_line_pause_ms: 500,
            start_delay_ms: 300,
        }
    }
}

impl AnimatorConfig {
    /// Timing derived from a typing speed and a hold time.
    ///
    /// Erasing runs at twice the typing speed.
    pub fn from_speed(type_interval_ms: u64, hold_ms: u64) -> Self {
        Self {
            type_interval_ms,
            hold_ms,
            erase_interval_ms: (type_interval_ms / 2).max(1),
            ..Self::default()
        }
    }

    pub fn with_type_interval(mut self, ms: u64) -> Self {
        self.type_interval_ms = ms;
        self
    }

    pub fn with_hold(mut self, ms: u64) -> Self {
        self.hold_ms = ms;
        self
    }

    pub fn with_erase_interval(mut self, ms: u64) -> Self {
        self.erase_interval_ms = ms;
        self
    }

    pub fn with_inter_line_pause(mut self, ms: u64) -> Self {
        self.inter_line_pause_ms = ms;
        self
    }

    pub fn with_start_delay(mut self, ms: u64) -> Self {
        self.start_delay_ms = ms;
        self
    }

    /// Check that the per-character intervals are positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.type_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval { field: "type_interval_ms" });
        }
        if self.erase_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval { field: "erase_interval_ms" });
        }
        Ok(())
    }

    pub fn type_interval(&self) -> Duration {
        Duration::from_millis(self.type_interval_ms)
    }

    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }

    pub fn erase_interval(&self) -> Duration {
        Duration::from_millis(self.erase_interval_ms)
    }

    pub fn inter_line_pause(&self) -> Duration {
        Duration::from_millis(self.inter_line_pause_ms)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }
}

// =============================================================================
// TypewriterFile
// =============================================================================

/// Lines plus timing, as stored in a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypewriterFile {
    pub lines: Vec<String>,
    #[serde(default)]
    pub timing: AnimatorConfig,
}

impl TypewriterFile {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: Self = toml::from_str(source)?;
        file.timing.validate()?;
        Ok(file)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnimatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.type_interval(), Duration::from_millis(50));
        assert_eq!(config.start_delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_from_speed_halves_erase() {
        let config = AnimatorConfig::from_speed(36, 1400);
        assert_eq!(config.erase_interval_ms, 18);
        assert_eq!(config.hold_ms, 1400);

        // Never rounds down to an invalid zero interval
        assert_eq!(AnimatorConfig::from_speed(1, 0).erase_interval_ms, 1);
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let config = AnimatorConfig::default().with_type_interval(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroInterval { field: "type_interval_ms" })
        );

        let config = AnimatorConfig::default().with_erase_interval(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroInterval { field: "erase_interval_ms" })
        );

        // Hold and pause may be zero
        let config = AnimatorConfig::default().with_hold(0).with_inter_line_pause(0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_with_partial_timing() {
        let file = TypewriterFile::from_toml_str(
            r#"
            lines = ["hi", "bye"]

            [timing]
            type_interval_ms = 10
            hold_ms = 100
            "#,
        )
        .unwrap();

        assert_eq!(file.lines, vec!["hi", "bye"]);
        assert_eq!(file.timing.type_interval_ms, 10);
        assert_eq!(file.timing.hold_ms, 100);
        assert_eq!(file.timing.erase_interval_ms, 25);
    }

    #[test]
    fn test_toml_without_timing_uses_defaults() {
        let file = TypewriterFile::from_toml_str(r#"lines = ["one"]"#).unwrap();
        assert_eq!(file.timing, AnimatorConfig::default());
    }

    #[test]
    fn test_toml_invalid_timing() {
        let err = TypewriterFile::from_toml_str(
            r#"
            lines = ["x"]
            [timing]
            erase_interval_ms = 0
            "#,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::ZeroInterval { field: "erase_interval_ms" });
    }

    #[test]
    fn test_toml_unknown_field() {
        let err = TypewriterFile::from_toml_str(
            r#"
            lines = ["x"]
            [timing]
            speed = 3
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = TypewriterFile::load("/nonexistent/typewriter.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
