//! Companion orchestration end to end

use crate::support::{full_config, settle};
use companion::companion::{video_type, Companion, CompanionConfig, VariantCatalog};
use companion::interactions::{CompanionEvent, SleepState};
use companion::lifecycle::{CompanionFactory, CompanionLifecycle, PreferenceChange};
use companion::media::{ElementCall, HeadlessElement, MediaElement, MediaKind};
use companion::placement::{ContainerElement, HeadlessContainer, Landmark};
use companion::scheme::{ColorScheme, SchemeProvider, SchemeSource};
use std::sync::Arc;
use std::time::Duration;

struct Page {
    element: Arc<HeadlessElement>,
    container: Arc<HeadlessContainer>,
    provider: Arc<SchemeProvider>,
}

impl Page {
    fn new(kind: MediaKind, os_dark: bool, skin: &str) -> Self {
        let provider = Arc::new(SchemeProvider::new());
        provider.init(Some(os_dark), Some(skin));
        Self {
            element: Arc::new(HeadlessElement::new(kind)),
            container: Arc::new(HeadlessContainer::new()),
            provider,
        }
    }

    fn companion(&self, config: CompanionConfig) -> Companion {
        Companion::new(
            config,
            self.element.clone(),
            self.container.clone(),
            self.provider.clone(),
        )
    }
}

fn idle_only() -> CompanionConfig {
    CompanionConfig::builder("idle")
        .variant(video_type::IDLE, "L", Some("D".to_string()))
        .build()
}

#[tokio::test]
async fn test_idle_follows_color_scheme() {
    let page = Page::new(MediaKind::Video, false, "night");
    let companion = page.companion(idle_only());
    assert!(companion.play_idle_video());
    assert_eq!(page.element.source().as_deref(), Some("D"));

    let page = Page::new(MediaKind::Video, false, "purple");
    let companion = page.companion(idle_only());
    assert!(companion.play_idle_video());
    assert_eq!(page.element.source().as_deref(), Some("L"));

    let page = Page::new(MediaKind::Video, true, "os");
    let companion = page.companion(CompanionConfig::builder("empty").build());
    assert!(!companion.play_idle_video());
    assert!(page.element.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_asleep_scheme_change_beats_flashlight() {
    let page = Page::new(MediaKind::Video, false, "os");
    let companion = page.companion(full_config("dreaming"));
    companion.setup(1400);

    companion.handle_event(CompanionEvent::VisibilityChanged { hidden: true });
    tokio::time::advance(Duration::from_secs(6 * 60)).await;
    companion.handle_event(CompanionEvent::VisibilityChanged { hidden: false });
    assert_eq!(companion.sleep_state(), Some(SleepState::Sleep));
    page.element.clear_calls();

    // Light to dark through the OS signal while the stored preference is "os"
    page.provider.set_os_dark(true);

    assert_eq!(
        page.element.calls(),
        vec![
            ElementCall::SetSource {
                src: "sleepLoop-dark".to_string(),
                looping: true
            },
            ElementCall::Play,
        ]
    );
    assert_eq!(companion.sleep_state(), Some(SleepState::Sleep));
    assert!(!companion.is_playing_animation());
}

#[tokio::test(start_paused = true)]
async fn test_wake_then_click() {
    let page = Page::new(MediaKind::Video, false, "day");
    let companion = page.companion(full_config("dreaming"));
    companion.setup(800);

    companion.handle_event(CompanionEvent::VisibilityChanged { hidden: true });
    tokio::time::advance(Duration::from_secs(6 * 60)).await;
    companion.handle_event(CompanionEvent::VisibilityChanged { hidden: false });

    // The waking click is swallowed by the sleep behavior
    companion.handle_event(CompanionEvent::Click);
    assert_eq!(companion.sleep_state(), Some(SleepState::TransitionFromSleep));
    assert!(!companion.is_playing_animation());

    for _ in 0..2 {
        settle().await;
        companion.player().notify_ended();
    }
    settle().await;
    assert_eq!(companion.sleep_state(), Some(SleepState::Idle));
    assert_eq!(page.element.source().as_deref(), Some("idle-light"));

    tokio::time::advance(Duration::from_secs(2)).await;
    companion.handle_event(CompanionEvent::Click);
    assert!(companion.is_playing_animation());
    assert_eq!(page.element.source().as_deref(), Some("click-light"));
}

#[tokio::test]
async fn test_flashlight_then_idle_on_lights_out() {
    let page = Page::new(MediaKind::Video, false, "day");
    let companion = page.companion(full_config("outerspace"));
    companion.setup(800);

    companion.handle_skin_theme_change("night");
    settle().await;
    companion.player().notify_ended();
    settle().await;

    let sources: Vec<String> = page.element.sources().into_iter().map(|(src, _)| src).collect();
    assert_eq!(sources, vec!["idle-light", "flashlight-dark", "idle-dark"]);
    assert_eq!(companion.color_scheme(), Some(ColorScheme::Dark));
}

#[tokio::test(start_paused = true)]
async fn test_image_companion_clicks_on_timer() {
    let page = Page::new(MediaKind::Image, false, "day");
    let config = VariantCatalog::standard()
        .create("phone", "/assets", true)
        .unwrap();
    let companion = page.companion(config);
    companion.setup(800);
    assert_eq!(
        page.element.source().as_deref(),
        Some("/assets/image/phone-idle-light.webp")
    );

    companion.handle_event(CompanionEvent::Click);
    assert!(companion.is_playing_animation());

    tokio::time::sleep(Duration::from_millis(2100)).await;
    settle().await;

    assert!(!companion.is_playing_animation());
    assert_eq!(
        page.element.source().as_deref(),
        Some("/assets/image/phone-idle-light.webp")
    );
}

#[tokio::test]
async fn test_relocation_keeps_playback() {
    let page = Page::new(MediaKind::Video, false, "day");
    let companion = page.companion(full_config("phone"));
    companion.setup(1400);
    companion.handle_event(CompanionEvent::Click);
    let calls = page.element.calls();

    assert_eq!(page.container.parent(), Some(Landmark::ColumnEnd));
    companion.handle_viewport_change(600);
    assert_eq!(page.container.parent(), Some(Landmark::SiteNotice));

    assert_eq!(page.element.calls(), calls);
    assert!(companion.is_playing_animation());
}

#[tokio::test]
async fn test_missing_landmark_keeps_companion_hidden() {
    let page = Page::new(MediaKind::Video, false, "day");
    let container = Arc::new(HeadlessContainer::with_landmarks(&[]));
    let companion = Companion::new(idle_only(), page.element.clone(), container.clone(), page.provider.clone());

    companion.setup(1400);

    assert_eq!(container.parent(), None);
    assert!(!container.is_visible());
}

struct StoredPreferences;

impl SchemeSource for StoredPreferences {
    fn os_prefers_dark(&self) -> Option<bool> {
        Some(true)
    }

    fn stored_skin_theme(&self) -> Option<String> {
        Some("os".to_string())
    }
}

#[tokio::test]
async fn test_lifecycle_toggles_fresh_companions() {
    let provider = Arc::new(SchemeProvider::with_source(Box::new(StoredPreferences)));
    let container = Arc::new(HeadlessContainer::new());
    let elements: Arc<parking_lot::Mutex<Vec<Arc<HeadlessElement>>>> = Default::default();

    let factory: CompanionFactory = {
        let provider = provider.clone();
        let container = container.clone();
        let elements = elements.clone();
        Box::new(move || {
            let element = Arc::new(HeadlessElement::new(MediaKind::Video));
            elements.lock().push(element.clone());
            let config = VariantCatalog::standard().create("confetti", "/a", false)?;
            Some(Companion::new(config, element, container.clone(), provider.clone()))
        })
    };

    let lifecycle = CompanionLifecycle::new(factory, 1400);
    lifecycle.setup(Some("1"));
    assert!(lifecycle.is_shown());
    assert_eq!(provider.os_listener_count(), 1);
    assert_eq!(
        elements.lock()[0].source().as_deref(),
        Some("/a/video/confetti-idle-dark.webm")
    );

    assert!(lifecycle.handle_class_change(["companion-enable-clientpref-0"]));
    assert_eq!(provider.os_listener_count(), 0);
    assert!(!elements.lock()[0].is_attached());

    assert!(lifecycle.apply(PreferenceChange::Enabled));
    assert_eq!(elements.lock().len(), 2);
    assert!(elements.lock()[1].is_attached());
    assert_eq!(container.parent(), Some(Landmark::ColumnEnd));
}
