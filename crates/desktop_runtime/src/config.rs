//! Shell timing, window-geometry, and workspace configuration.

use std::time::Duration;

use desktop_app_contract::OsSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{PointerPosition, WindowRect};

#[derive(Debug, Error)]
/// Errors raised while loading a [`ShellConfig`].
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse shell config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field holds a value the shell cannot work with.
    #[error("invalid shell config field `{field}`: {reason}")]
    Invalid {
        /// Dotted field path.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Delays for the timed session transitions, in milliseconds.
pub struct SessionTimings {
    /// `booting -> locked`.
    pub boot_delay_ms: u64,
    /// `restarting -> locked`.
    pub restart_delay_ms: u64,
    /// `locked -> login`, covering the lock-screen exit animation.
    pub unlock_delay_ms: u64,
    /// `login -> desktop`, emulating authentication latency.
    pub login_delay_ms: u64,
}

impl SessionTimings {
    pub fn boot_delay(&self) -> Duration {
        Duration::from_millis(self.boot_delay_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn unlock_delay(&self) -> Duration {
        Duration::from_millis(self.unlock_delay_ms)
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            boot_delay_ms: 3000,
            restart_delay_ms: 3000,
            unlock_delay_ms: 500,
            login_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Geometry used for newly launched windows.
pub struct WindowDefaults {
    pub default_width: i32,
    pub default_height: i32,
    pub spawn_origin_x: i32,
    pub spawn_origin_y: i32,
    /// Exclusive upper bound of the random offset added to the spawn origin on each axis.
    pub spawn_jitter: i32,
    pub min_width: i32,
    pub min_height: i32,
}

impl WindowDefaults {
    /// Initial floating rectangle for a window spawned with `offset` added to the origin.
    pub fn spawn_rect(&self, offset: PointerPosition) -> WindowRect {
        WindowRect {
            x: self.spawn_origin_x + offset.x,
            y: self.spawn_origin_y + offset.y,
            w: self.default_width,
            h: self.default_height,
        }
        .clamped_min(self.min_width, self.min_height)
    }
}

impl Default for WindowDefaults {
    fn default() -> Self {
        Self {
            default_width: 960,
            default_height: 680,
            spawn_origin_x: 120,
            spawn_origin_y: 120,
            spawn_jitter: 80,
            min_width: 320,
            min_height: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Visible workspace dimensions.
pub struct WorkspaceConfig {
    pub width: i32,
    pub height: i32,
    /// Height of the bottom band reserved for the taskbar.
    pub reserved_bottom: i32,
}

impl WorkspaceConfig {
    /// Rectangle a maximized window occupies.
    pub fn maximized_rect(&self) -> WindowRect {
        WindowRect {
            x: 0,
            y: 0,
            w: self.width,
            h: self.height - self.reserved_bottom,
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            reserved_bottom: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Top-level shell configuration.
pub struct ShellConfig {
    pub session: SessionTimings,
    pub windows: WindowDefaults,
    pub workspace: WorkspaceConfig,
    /// Seed for window spawn jitter. Seeded from the clock when absent.
    pub spawn_seed: Option<u64>,
    /// Settings the session starts with.
    pub settings: OsSettings,
}

impl ShellConfig {
    /// Parses and validates a TOML document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and [`ConfigError::Invalid`] when a value
    /// fails [`ShellConfig::validate`].
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks geometry values the window registry relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workspace.width <= 0 || self.workspace.height <= 0 {
            return Err(ConfigError::Invalid {
                field: "workspace",
                reason: format!(
                    "workspace must be non-empty, got {}x{}",
                    self.workspace.width, self.workspace.height
                ),
            });
        }
        if self.workspace.reserved_bottom < 0
            || self.workspace.reserved_bottom >= self.workspace.height
        {
            return Err(ConfigError::Invalid {
                field: "workspace.reserved_bottom",
                reason: format!(
                    "must be in 0..{}, got {}",
                    self.workspace.height, self.workspace.reserved_bottom
                ),
            });
        }
        if self.windows.default_width <= 0 || self.windows.default_height <= 0 {
            return Err(ConfigError::Invalid {
                field: "windows.default_width",
                reason: "default window size must be positive".to_string(),
            });
        }
        if self.windows.spawn_jitter < 0 {
            return Err(ConfigError::Invalid {
                field: "windows.spawn_jitter",
                reason: format!("must not be negative, got {}", self.windows.spawn_jitter),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ShellConfig::from_toml_str("").expect("parse empty");
        assert_eq!(config, ShellConfig::default());
        assert_eq!(config.session.boot_delay(), Duration::from_secs(3));
        assert_eq!(config.session.unlock_delay(), Duration::from_millis(500));
    }

    #[test]
    fn partial_tables_override_only_named_fields() {
        let config = ShellConfig::from_toml_str(
            r#"
            spawn_seed = 9

            [session]
            login_delay_ms = 250

            [settings]
            user_name = "Ada"
            "#,
        )
        .expect("parse partial");

        assert_eq!(config.session.login_delay_ms, 250);
        assert_eq!(config.session.boot_delay_ms, 3000);
        assert_eq!(config.spawn_seed, Some(9));
        assert_eq!(config.settings.user_name, "Ada");
        assert!(config.settings.dark_mode);
    }

    #[test]
    fn reserved_band_taller_than_workspace_is_rejected() {
        let err = ShellConfig::from_toml_str(
            r#"
            [workspace]
            height = 100
            reserved_bottom = 100
            "#,
        )
        .expect_err("should reject");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "workspace.reserved_bottom",
                ..
            }
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = ShellConfig::from_toml_str("session = [").expect_err("should fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn maximized_rect_excludes_reserved_band() {
        let workspace = WorkspaceConfig::default();
        assert_eq!(
            workspace.maximized_rect(),
            WindowRect {
                x: 0,
                y: 0,
                w: 1920,
                h: 980,
            }
        );
    }
}
