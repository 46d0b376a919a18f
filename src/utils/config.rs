//! Configuration management for the companion
//!
//! This module handles loading the site-level configuration (eligibility
//! policy, variant rules, timing knobs) from config files and environment
//! variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::eligibility::{EnablePolicy, VariantRule};
use crate::utils::error::{CompanionError, IntoCompanionError, Result};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base path that asset URLs are built from
    pub assets_path: String,

    /// Global on/off policy; absent means the companion is disabled
    pub enable: Option<EnablePolicy>,

    /// Variant rules, scanned in order
    pub variant_rules: Vec<VariantRule>,

    /// JSON file mapping page ids to default variants
    pub default_mapping_path: Option<PathBuf>,

    /// Media player settings
    pub player: PlayerSettings,

    /// Sleep/wake settings
    pub inactivity: InactivitySettings,

    /// Placement settings
    pub placement: PlacementSettings,

    /// General settings
    pub general: GeneralConfig,
}

/// Media player settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// How long an image stands in for a one-shot clip, in milliseconds
    pub image_step_ms: u64,
}

/// Sleep/wake settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct InactivitySettings {
    /// Hidden duration after which the companion is shown asleep, in seconds
    pub sleep_after_secs: u64,

    /// Minimum spacing between accepted activity events, in milliseconds
    pub activity_throttle_ms: u64,
}

/// Placement settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    /// Viewport width at which the large layout starts
    pub large_breakpoint_px: u32,
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            assets_path: "/assets".to_string(),
            enable: None,
            variant_rules: Vec::new(),
            default_mapping_path: None,
            player: PlayerSettings::default(),
            inactivity: InactivitySettings::default(),
            placement: PlacementSettings::default(),
            general: GeneralConfig::default(),
        }
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self { image_step_ms: 2000 }
    }
}

impl PlayerSettings {
    pub fn image_step(&self) -> Duration {
        Duration::from_millis(self.image_step_ms)
    }
}

impl Default for InactivitySettings {
    fn default() -> Self {
        Self {
            sleep_after_secs: 5 * 60,
            activity_throttle_ms: 1000,
        }
    }
}

impl InactivitySettings {
    pub fn sleep_after(&self) -> Duration {
        Duration::from_secs(self.sleep_after_secs)
    }

    pub fn activity_throttle(&self) -> Duration {
        Duration::from_millis(self.activity_throttle_ms)
    }
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self { large_breakpoint_px: 1120 }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. System config file (/etc/companion/config.toml on Linux)
    /// 3. User config file (~/.config/companion/config.toml on Linux)
    /// 4. The explicitly requested file, if any
    /// 5. Environment variables (COMPANION_* prefix)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(system_path) = Self::system_config_path() {
            if system_path.exists() {
                config = Self::from_file(&system_path)?;
            }
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config = Self::from_file(&user_path)?;
            }
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(CompanionError::NotFound(format!("config file {}", path.display())));
            }
            config = Self::from_file(path)?;
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a single TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).config_err("Failed to read config file")?;
        let config: SiteConfig = toml::from_str(&contents).config_err("Failed to parse config file")?;

        log::debug!("Loaded site config from {}", path.display());
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("COMPANION_ASSETS_PATH") {
            self.assets_path = path;
        }

        if let Ok(secs) = std::env::var("COMPANION_SLEEP_AFTER_SECS") {
            self.inactivity.sleep_after_secs = secs.parse()
                .map_err(|_| CompanionError::Config("Invalid COMPANION_SLEEP_AFTER_SECS".to_string()))?;
        }

        if let Ok(ms) = std::env::var("COMPANION_IMAGE_STEP_MS") {
            self.player.image_step_ms = ms.parse()
                .map_err(|_| CompanionError::Config("Invalid COMPANION_IMAGE_STEP_MS".to_string()))?;
        }

        if let Ok(log_level) = std::env::var("COMPANION_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.assets_path.trim().is_empty() {
            return Err(CompanionError::Config("assets_path must not be empty".to_string()));
        }

        if self.player.image_step_ms == 0 {
            return Err(CompanionError::Config("player.image_step_ms must be non-zero".to_string()));
        }

        if self.inactivity.sleep_after_secs == 0 {
            return Err(CompanionError::Config("inactivity.sleep_after_secs must be non-zero".to_string()));
        }

        if self.placement.large_breakpoint_px == 0 {
            return Err(CompanionError::Config("placement.large_breakpoint_px must be non-zero".to_string()));
        }

        if let Some(rule) = self.variant_rules.iter().find(|r| r.variant.trim().is_empty()) {
            return Err(CompanionError::Config(format!(
                "Variant rule with mode {:?} has an empty variant name",
                rule.mode
            )));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(CompanionError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level,
                valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get system config file path
    fn system_config_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        return Some(PathBuf::from("/etc/companion/config.toml"));

        #[cfg(target_os = "windows")]
        return std::env::var("PROGRAMDATA").ok()
            .map(|p| PathBuf::from(p).join("Companion").join("config.toml"));

        #[cfg(target_os = "macos")]
        return Some(PathBuf::from("/Library/Application Support/Companion/config.toml"));

        #[allow(unreachable_code)]
        None
    }

    /// Get user config file path
    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("companion").join("config.toml"))
    }
}
