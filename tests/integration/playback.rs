//! Media player ordering, cancellation and cleanup

use crate::support::{settle, video_player};
use companion::media::{ElementCall, HeadlessElement, MediaElement, MediaKind, MediaPlayer, SequenceOutcome};
use companion::utils::PlayerSettings;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_at_most_one_pending_playback() {
    let (_element, player) = video_player();
    assert!(!player.has_pending_playback());

    let first = player.play_once("a.webm", None);
    assert!(player.has_pending_playback());

    let second = player.play_once("b.webm", None);
    assert!(player.has_pending_playback());
    assert!(first.await.is_err());

    player.play_loop("idle.webm");
    assert!(!player.has_pending_playback());
    assert!(second.await.is_err());

    player.cancel_playback();
    player.cancel_playback();
    assert!(!player.has_pending_playback());
}

#[tokio::test]
async fn test_sequence_plays_in_order_and_loops_last() {
    let (element, player) = video_player();
    let sequence = tokio::spawn(player.play_sequence(vec![
        "a.webm".to_string(),
        "b.webm".to_string(),
        "c.webm".to_string(),
    ]));

    settle().await;
    player.notify_ended();
    settle().await;
    player.notify_ended();

    assert_eq!(sequence.await.unwrap(), SequenceOutcome::Completed);
    assert_eq!(
        element.sources(),
        vec![
            ("a.webm".to_string(), false),
            ("b.webm".to_string(), false),
            ("c.webm".to_string(), true),
        ]
    );
}

#[tokio::test]
async fn test_cancel_after_first_step_stops_sequence() {
    let (element, player) = video_player();
    let sequence = tokio::spawn(player.play_sequence(vec![
        "a.webm".to_string(),
        "b.webm".to_string(),
        "c.webm".to_string(),
    ]));

    assert_eq!(element.source().as_deref(), Some("a.webm"));
    player.cancel_playback();

    assert_eq!(sequence.await.unwrap(), SequenceOutcome::Cancelled);
    assert_eq!(element.sources(), vec![("a.webm".to_string(), false)]);

    // A late ended notification finds nothing to complete
    player.notify_ended();
    settle().await;
    assert_eq!(element.sources().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_image_sequence_advances_on_timer() {
    let element = Arc::new(HeadlessElement::new(MediaKind::Image));
    let settings = PlayerSettings { image_step_ms: 500 };
    let player = MediaPlayer::new(element.clone(), settings);

    let outcome = player
        .play_sequence(vec!["a.webp".to_string(), "b.webp".to_string()])
        .await;

    assert_eq!(outcome, SequenceOutcome::Completed);
    assert_eq!(element.source().as_deref(), Some("b.webp"));
    assert!(element.is_looping());
}

#[tokio::test(start_paused = true)]
async fn test_image_explicit_duration() {
    let element = Arc::new(HeadlessElement::new(MediaKind::Image));
    let player = MediaPlayer::new(element.clone(), PlayerSettings::default());

    let start = tokio::time::Instant::now();
    player.play_once("a.webp", Some(Duration::from_millis(300))).await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(300) && elapsed < Duration::from_millis(400));
}

#[tokio::test]
async fn test_blocked_play_completes_sequence_step() {
    let (element, player) = video_player();
    element.block_next_plays(1);

    let outcome = player
        .play_sequence(vec!["a.webm".to_string(), "b.webm".to_string()])
        .await;

    assert_eq!(outcome, SequenceOutcome::Completed);
    assert_eq!(element.source().as_deref(), Some("b.webm"));
}

#[tokio::test]
async fn test_cleanup_releases_element_and_disables_player() {
    let (element, player) = video_player();
    let pending = player.play_once("a.webm", None);

    player.cleanup();
    assert!(pending.await.is_err());
    assert!(player.is_disposed());
    assert!(!element.is_attached());

    element.clear_calls();
    player.play_loop("idle.webm");
    assert!(player.play_once("b.webm", None).await.is_err());
    assert!(element.calls().is_empty());

    player.cleanup();
    assert!(!element.calls().contains(&ElementCall::Detach));
}
