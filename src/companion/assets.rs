//! Asset lookup for the current color scheme

use crate::companion::config::CompanionConfig;
use crate::scheme::{ColorScheme, SchemeProvider};
use std::sync::Arc;

/// Answers "which URL plays for this clip type right now"
#[cfg_attr(test, mockall::automock)]
pub trait SourceLookup: Send + Sync {
    /// URL for a clip type in the current scheme; `None` when the type is not configured
    fn video_src(&self, video_type: &str) -> Option<String>;
}

/// Looks assets up in a [`CompanionConfig`], resolving the scheme at call time
#[derive(Clone)]
pub struct AssetResolver {
    config: Arc<CompanionConfig>,
    provider: Arc<SchemeProvider>,
}

impl AssetResolver {
    pub fn new(config: Arc<CompanionConfig>, provider: Arc<SchemeProvider>) -> Self {
        Self { config, provider }
    }

    /// URL for a clip type in an explicit scheme
    pub fn video_src_for(&self, video_type: &str, scheme: ColorScheme) -> Option<String> {
        self.config
            .video_variant(video_type)
            .map(|variant| variant.for_scheme(scheme).to_string())
    }
}

impl SourceLookup for AssetResolver {
    fn video_src(&self, video_type: &str) -> Option<String> {
        self.video_src_for(video_type, self.provider.current_color_scheme())
    }
}
