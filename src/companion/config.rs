//! Companion configuration
//!
//! A [`CompanionConfig`] describes one variant: the asset URL for every clip
//! type in both color schemes, and which interactions are switched on. It is
//! built once per page and never changes afterwards.

use crate::media::MediaKind;
use crate::scheme::ColorScheme;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known clip types; the set is open and keyed by string
pub mod video_type {
    pub const IDLE: &str = "idle";
    pub const CLICK: &str = "click";
    pub const SLEEP_LOOP: &str = "sleepLoop";
    pub const SLEEP_TRANSITION_OUT: &str = "sleepTransitionOut";
    pub const TRANSITION_FROM_SLEEP: &str = "transitionFromSleep";
    pub const FLASHLIGHT: &str = "flashlight";

    /// File name segment for a clip type (`sleepLoop` -> `sleep-loop`)
    pub fn file_segment(video_type: &str) -> String {
        let mut segment = String::with_capacity(video_type.len() + 4);
        for c in video_type.chars() {
            if c.is_ascii_uppercase() {
                segment.push('-');
                segment.push(c.to_ascii_lowercase());
            } else {
                segment.push(c);
            }
        }
        segment
    }
}

/// Asset URLs for one clip type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoVariant {
    /// Always present; also used when no dark asset exists
    pub light: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark: Option<String>,
}

impl VideoVariant {
    pub fn new(light: impl Into<String>, dark: Option<String>) -> Self {
        Self {
            light: light.into(),
            dark,
        }
    }

    /// URL for a scheme, falling back to the light asset
    pub fn for_scheme(&self, scheme: ColorScheme) -> &str {
        match (scheme, &self.dark) {
            (ColorScheme::Dark, Some(dark)) => dark,
            _ => &self.light,
        }
    }
}

/// Interaction switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interactions {
    pub click: bool,
    pub sleep: bool,
    pub flashlight: bool,
}

/// Immutable per-page companion configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionConfig {
    name: String,
    video_variants: HashMap<String, VideoVariant>,
    interactions: Interactions,
    is_reduced_motion: bool,
}

impl CompanionConfig {
    /// Start building a configuration by hand
    pub fn builder(name: impl Into<String>) -> CompanionConfigBuilder {
        CompanionConfigBuilder {
            name: name.into(),
            video_variants: HashMap::new(),
            interactions: Interactions::default(),
            is_reduced_motion: false,
        }
    }

    /// Build the standard asset table for a named variant
    ///
    /// URLs follow `{assets}/{video|image}/{name}-{type}-{scheme}.{webm|webp}`.
    /// Idle is always present; click, sleep and flashlight assets are added
    /// only when their interaction is enabled.
    pub fn from_assets(
        assets_path: &str,
        name: &str,
        interactions: Interactions,
        is_reduced_motion: bool,
    ) -> Self {
        let kind = MediaKind::for_reduced_motion(is_reduced_motion);
        let base = format!("{}/{}", assets_path.trim_end_matches('/'), kind.asset_dir());

        let mut types = vec![video_type::IDLE];
        if interactions.click {
            types.push(video_type::CLICK);
        }
        if interactions.sleep {
            types.extend([
                video_type::SLEEP_LOOP,
                video_type::SLEEP_TRANSITION_OUT,
                video_type::TRANSITION_FROM_SLEEP,
            ]);
        }
        if interactions.flashlight {
            types.push(video_type::FLASHLIGHT);
        }

        let mut builder = Self::builder(name)
            .interactions(interactions)
            .reduced_motion(is_reduced_motion);
        for video_type in types {
            let stem = format!("{}/{}-{}", base, name, video_type::file_segment(video_type));
            builder = builder.variant(
                video_type,
                format!("{}-light.{}", stem, kind.extension()),
                Some(format!("{}-dark.{}", stem, kind.extension())),
            );
        }
        builder.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interactions(&self) -> Interactions {
        self.interactions
    }

    /// Asset family this configuration's URLs point at
    pub fn media_kind(&self) -> MediaKind {
        MediaKind::for_reduced_motion(self.is_reduced_motion)
    }

    pub fn video_variant(&self, video_type: &str) -> Option<&VideoVariant> {
        self.video_variants.get(video_type)
    }

    /// Configured clip types, sorted
    pub fn video_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.video_variants.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

/// Builder for [`CompanionConfig`]
#[derive(Debug, Clone)]
pub struct CompanionConfigBuilder {
    name: String,
    video_variants: HashMap<String, VideoVariant>,
    interactions: Interactions,
    is_reduced_motion: bool,
}

impl CompanionConfigBuilder {
    /// Add or replace the assets of one clip type
    pub fn variant(
        mut self,
        video_type: impl Into<String>,
        light: impl Into<String>,
        dark: Option<String>,
    ) -> Self {
        self.video_variants
            .insert(video_type.into(), VideoVariant::new(light, dark));
        self
    }

    pub fn interactions(mut self, interactions: Interactions) -> Self {
        self.interactions = interactions;
        self
    }

    pub fn reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.is_reduced_motion = reduced_motion;
        self
    }

    pub fn build(self) -> CompanionConfig {
        CompanionConfig {
            name: self.name,
            video_variants: self.video_variants,
            interactions: self.interactions,
            is_reduced_motion: self.is_reduced_motion,
        }
    }
}

/// Named variants a site can show
#[derive(Debug, Clone)]
pub struct VariantCatalog {
    entries: Vec<(String, Interactions)>,
}

impl VariantCatalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// The stock set of variants
    pub fn standard() -> Self {
        let click = Interactions {
            click: true,
            ..Default::default()
        };

        let mut catalog = Self::new()
            .with_variant("default", Interactions::default());
        for name in [
            "phone", "newspaper", "book", "laptop", "headphones", "camera",
            "synthesizer", "balloons", "confetti",
        ] {
            catalog = catalog.with_variant(name, click);
        }
        catalog
            .with_variant("dreaming", Interactions { click: true, sleep: true, flashlight: false })
            .with_variant("outerspace", Interactions { click: true, sleep: false, flashlight: true })
    }

    /// Add or replace a variant
    pub fn with_variant(mut self, name: &str, interactions: Interactions) -> Self {
        self.entries.retain(|(n, _)| n != name);
        self.entries.push((name.to_string(), interactions));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Build the configuration for a named variant
    pub fn create(&self, name: &str, assets_path: &str, reduced_motion: bool) -> Option<CompanionConfig> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(n, interactions)| {
                CompanionConfig::from_assets(assets_path, n, *interactions, reduced_motion)
            })
    }
}

impl Default for VariantCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
