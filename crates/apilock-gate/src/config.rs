use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Environment variable that forces snapshot updates when set to `1` or `true`.
pub const UPDATE_ENV: &str = "APILOCK_UPDATE";

/// Configuration for the API regression gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// When `true`, every check is accepted without comparing.
    pub permissive: bool,
    /// Record the live tree when no snapshot exists yet, instead of failing.
    pub record_missing: bool,
    /// Overwrite stored snapshots with the live tree after comparing.
    pub update_snapshots: bool,
    /// Maximum number of mismatches attached to a result.
    pub max_reported: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            permissive: false,
            record_missing: true,
            update_snapshots: false,
            max_reported: 20,
        }
    }
}

impl GateConfig {
    /// Accept everything; useful to switch the gate off locally.
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Default::default()
        }
    }

    /// A configuration that rewrites snapshots (approval mode).
    pub fn updating() -> Self {
        Self {
            update_snapshots: true,
            ..Default::default()
        }
    }

    /// Parse from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, GateError> {
        let config: Self = toml::from_str(s).map_err(|e| GateError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, GateError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| GateError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        let value = std::env::var(UPDATE_ENV).ok();
        self.with_update_flag(value.as_deref())
    }

    fn with_update_flag(mut self, value: Option<&str>) -> Self {
        if matches!(value.map(str::trim), Some("1") | Some("true")) {
            self.update_snapshots = true;
        }
        self
    }

    pub fn validate(&self) -> Result<(), GateError> {
        if self.max_reported == 0 {
            return Err(GateError::Config("max_reported must be at least 1".into()));
        }
        Ok(())
    }
}
