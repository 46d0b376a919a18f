//! Shared fixtures for the integration tests

use companion::companion::{video_type, CompanionConfig, Interactions, SourceLookup};
use companion::media::{HeadlessElement, MediaKind, MediaPlayer};
use companion::utils::PlayerSettings;
use mockall::mock;
use std::sync::Arc;

mock! {
    pub Lookup {}

    impl SourceLookup for Lookup {
        fn video_src(&self, video_type: &str) -> Option<String>;
    }
}

/// A lookup answering from a fixed table
pub fn table_lookup(entries: &'static [(&'static str, &'static str)]) -> MockLookup {
    let mut lookup = MockLookup::new();
    lookup.expect_video_src().returning(move |video_type| {
        entries
            .iter()
            .find(|(t, _)| *t == video_type)
            .map(|(_, src)| src.to_string())
    });
    lookup
}

/// A video element with a player on top
pub fn video_player() -> (Arc<HeadlessElement>, MediaPlayer) {
    let element = Arc::new(HeadlessElement::new(MediaKind::Video));
    let player = MediaPlayer::new(element.clone(), PlayerSettings::default());
    (element, player)
}

/// Light and dark assets for every clip type, all interactions on
pub fn full_config(name: &str) -> CompanionConfig {
    let mut builder = CompanionConfig::builder(name).interactions(Interactions {
        click: true,
        sleep: true,
        flashlight: true,
    });
    for video_type in [
        video_type::IDLE,
        video_type::CLICK,
        video_type::SLEEP_LOOP,
        video_type::SLEEP_TRANSITION_OUT,
        video_type::TRANSITION_FROM_SLEEP,
        video_type::FLASHLIGHT,
    ] {
        builder = builder.variant(
            video_type,
            format!("{}-light", video_type),
            Some(format!("{}-dark", video_type)),
        );
    }
    builder.build()
}

/// Let spawned continuations run
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
