//! Sleep and click behaviors against a mocked asset lookup

use crate::support::{settle, table_lookup, video_player, MockLookup};
use companion::interactions::{Behavior, ClickHandler, InactivityMonitor, SleepState};
use companion::media::MediaElement;
use companion::placement::{CompanionSignal, Cursor, HeadlessContainer};
use companion::utils::InactivitySettings;
use std::sync::Arc;
use std::time::Duration;

const SLEEPY: &[(&str, &str)] = &[
    ("idle", "idle.webm"),
    ("sleepLoop", "sleep.webm"),
    ("sleepTransitionOut", "out.webm"),
    ("transitionFromSleep", "from.webm"),
];

async fn away_for(monitor: &InactivityMonitor, duration: Duration) {
    monitor.handle_visibility_change(true);
    tokio::time::advance(duration).await;
    monitor.handle_visibility_change(false);
}

#[tokio::test(start_paused = true)]
async fn test_six_minutes_away_falls_asleep() {
    let (element, player) = video_player();
    let monitor = InactivityMonitor::new(player, Arc::new(table_lookup(SLEEPY)), &InactivitySettings::default());
    monitor.setup();

    away_for(&monitor, Duration::from_secs(6 * 60)).await;

    assert_eq!(monitor.state(), SleepState::Sleep);
    assert_eq!(element.sources(), vec![("sleep.webm".to_string(), true)]);
}

#[tokio::test(start_paused = true)]
async fn test_one_second_away_stays_idle() {
    let (element, player) = video_player();
    let mut lookup = MockLookup::new();
    lookup.expect_video_src().never();
    let monitor = InactivityMonitor::new(player, Arc::new(lookup), &InactivitySettings::default());
    monitor.setup();

    away_for(&monitor, Duration::from_secs(1)).await;

    assert_eq!(monitor.state(), SleepState::Idle);
    assert!(element.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_wake_plays_three_sources_in_order() {
    let (element, player) = video_player();
    let monitor = InactivityMonitor::new(
        player.clone(),
        Arc::new(table_lookup(SLEEPY)),
        &InactivitySettings::default(),
    );
    monitor.setup();
    away_for(&monitor, Duration::from_secs(6 * 60)).await;
    element.clear_calls();

    monitor.handle_activity();
    assert_eq!(monitor.state(), SleepState::TransitionFromSleep);

    for _ in 0..2 {
        settle().await;
        player.notify_ended();
    }
    settle().await;

    assert_eq!(
        element.sources(),
        vec![
            ("out.webm".to_string(), false),
            ("from.webm".to_string(), false),
            ("idle.webm".to_string(), true),
        ]
    );
    assert_eq!(monitor.state(), SleepState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_no_wake_assets_stays_asleep() {
    let (element, player) = video_player();
    let mut lookup = MockLookup::new();
    lookup
        .expect_video_src()
        .withf(|video_type| video_type == "sleepLoop")
        .returning(|_| Some("sleep.webm".to_string()));
    lookup.expect_video_src().returning(|_| None);

    let monitor = InactivityMonitor::new(player, Arc::new(lookup), &InactivitySettings::default());
    monitor.setup();
    away_for(&monitor, Duration::from_secs(6 * 60)).await;
    element.clear_calls();

    monitor.handle_activity();

    assert_eq!(monitor.state(), SleepState::Sleep);
    assert!(element.calls().is_empty());
}

#[tokio::test]
async fn test_second_click_never_reaches_lookup_or_player() {
    let (element, player) = video_player();
    let container = Arc::new(HeadlessContainer::new());
    let mut lookup = MockLookup::new();
    lookup
        .expect_video_src()
        .withf(|video_type| video_type == "click")
        .times(1)
        .returning(|_| Some("click.webm".to_string()));

    let handler = ClickHandler::new(container.clone(), player, Arc::new(lookup));
    handler.setup();

    assert!(handler.handle_click());
    let calls = element.calls();

    assert!(!handler.handle_click());
    assert!(!handler.handle_click());
    assert_eq!(element.calls(), calls);
    assert_eq!(container.signals(), vec![CompanionSignal::Click]);
    assert_eq!(container.cursor(), Cursor::Default);
}

#[tokio::test]
async fn test_click_returns_to_idle_and_accepts_next_click() {
    let (element, player) = video_player();
    let container = Arc::new(HeadlessContainer::new());
    let lookup = table_lookup(&[("idle", "idle.webm"), ("click", "click.webm")]);
    let handler = ClickHandler::new(container.clone(), player.clone(), Arc::new(lookup));
    handler.setup();

    handler.handle_click();
    settle().await;
    player.notify_ended();
    settle().await;

    assert_eq!(element.source().as_deref(), Some("idle.webm"));
    assert_eq!(container.cursor(), Cursor::Pointer);
    assert!(handler.handle_click());
    assert_eq!(container.signals().len(), 2);
}
