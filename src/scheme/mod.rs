//! Color scheme module for the companion
//!
//! Combines the user's three-way theme preference with the OS-level
//! light/dark signal into one authoritative [`ColorScheme`]. The ambient
//! state lives in a shared [`SchemeProvider`]; each [`ColorSchemeResolver`]
//! only caches the last value it reported so it can fire on real changes.

mod provider;
mod resolver;

pub use provider::{SchemeProvider, SchemeSource, OsSubscription};
pub use resolver::{ColorSchemeResolver, SchemeChangeCallback};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolved visual theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }

    /// Scheme for an OS `prefers-color-scheme: dark` match
    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark {
            ColorScheme::Dark
        } else {
            ColorScheme::Light
        }
    }

    /// Lenient parse; anything but `"dark"` is light
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("dark") {
            ColorScheme::Dark
        } else {
            ColorScheme::Light
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User theme preference as stored by the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinTheme {
    Day,
    Night,
    Os,
}

impl SkinTheme {
    /// Parse a stored preference value; unknown values yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "day" => Some(SkinTheme::Day),
            "night" => Some(SkinTheme::Night),
            "os" => Some(SkinTheme::Os),
            _ => None,
        }
    }
}

/// What the provider knows about the stored preference
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SkinSetting {
    /// Nothing stored yet
    #[default]
    Unset,

    /// A recognised preference
    Theme(SkinTheme),

    /// A value the companion does not understand
    Unrecognized(String),
}

impl SkinSetting {
    pub fn from_value(value: &str) -> Self {
        match SkinTheme::parse(value) {
            Some(theme) => SkinSetting::Theme(theme),
            None => SkinSetting::Unrecognized(value.to_string()),
        }
    }

    pub fn is_os(&self) -> bool {
        matches!(self, SkinSetting::Theme(SkinTheme::Os))
    }
}

/// Resolve a scheme from the stored preference and the OS signal
///
/// Total: `night` is dark, `day` is light, `os` follows the OS when it is
/// known, and everything else falls back to light.
pub fn resolve_color_scheme(skin: &SkinSetting, os: Option<ColorScheme>) -> ColorScheme {
    match skin {
        SkinSetting::Theme(SkinTheme::Night) => ColorScheme::Dark,
        SkinSetting::Theme(SkinTheme::Day) => ColorScheme::Light,
        SkinSetting::Theme(SkinTheme::Os) => os.unwrap_or(ColorScheme::Light),
        SkinSetting::Unset | SkinSetting::Unrecognized(_) => ColorScheme::Light,
    }
}
