//! Utility module for the companion
//!
//! This module provides common utilities used throughout the crate:
//! - Error handling with custom error types
//! - Site configuration management
//! - Small duration helpers

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::{SiteConfig, PlayerSettings, InactivitySettings, PlacementSettings, GeneralConfig};
pub use error::{CompanionError, IntoCompanionError, Result};

use std::time::Duration;

/// Initialize the site configuration
///
/// Loads configuration from:
/// 1. Default values
/// 2. System configuration file
/// 3. User configuration file
/// 4. The explicitly requested file
/// 5. Environment variables
pub fn load_config(explicit: Option<&std::path::Path>) -> Result<SiteConfig> {
    SiteConfig::load(explicit)
}

/// Parse a human duration such as `300s`, `1500ms`, `5m` or a bare number of seconds
pub fn parse_duration(input: &str) -> Result<Duration> {
    let input = input.trim();
    let (digits, unit) = match input.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => input.split_at(idx),
        None => (input, "s"),
    };

    let value: u64 = digits
        .parse()
        .map_err(|_| CompanionError::InvalidInput(format!("bad duration '{}'", input)))?;

    let secs_per_unit = match unit {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        _ => return Err(CompanionError::InvalidInput(format!("bad duration unit in '{}'", input))),
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| CompanionError::InvalidInput(format!("duration '{}' is too long", input)))
}

/// Format a duration for log output
///
/// Produces "MM:SS" or "HH:MM:SS" for durations of an hour or more
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
