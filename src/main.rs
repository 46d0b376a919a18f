use anyhow::{Context, Result};
use env_logger::Env;
use log::{info, warn};
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use companion::companion::{Companion, VariantCatalog};
use companion::eligibility::{PageContext, PageDecision, PageResolver};
use companion::interactions::CompanionEvent;
use companion::lifecycle::{CompanionLifecycle, CompanionFactory, PreferenceChange};
use companion::media::{HeadlessElement, MediaKind};
use companion::placement::HeadlessContainer;
use companion::scheme::SchemeProvider;
use companion::utils::{self, CompanionError};

/// Companion - run a page companion against an in-memory page
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Site configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Title of the page being viewed
    #[arg(long, default_value = "Main Page")]
    page: String,

    /// Page id used by the default variant mapping
    #[arg(long, value_name = "ID")]
    page_id: Option<String>,

    /// Stored theme preference (day, night, os)
    #[arg(long, value_name = "THEME")]
    skin_theme: Option<String>,

    /// The OS prefers a dark color scheme
    #[arg(long)]
    os_dark: bool,

    /// Use still images instead of animated clips
    #[arg(long)]
    reduced_motion: bool,

    /// Viewport width in pixels
    #[arg(long, default_value = "1280")]
    viewport: u32,

    /// Hidden duration after which the companion falls asleep (e.g. 300s, 5m)
    #[arg(long, value_name = "DURATION")]
    sleep_after: Option<String>,

    /// Scripted host events, applied in order
    /// (click, enter, hide, show, wait:DURATION, ended, error, theme:VALUE,
    /// os:dark, os:light, viewport:WIDTH, on, off)
    #[arg(short, long = "event", value_name = "EVENT")]
    events: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// One step of the scripted session
#[derive(Debug, Clone, PartialEq)]
enum ScriptEvent {
    Host(CompanionEvent),
    Wait(std::time::Duration),
    Ended,
    Error,
    SkinTheme(String),
    OsDark(bool),
    Viewport(u32),
    Preference(PreferenceChange),
}

impl FromStr for ScriptEvent {
    type Err = CompanionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = match s.split_once(':') {
            Some((name, value)) => (name, Some(value)),
            None => (s, None),
        };

        let event = match (name, value) {
            ("click", None) => ScriptEvent::Host(CompanionEvent::Click),
            ("enter", None) => ScriptEvent::Host(CompanionEvent::MouseEnter),
            ("hide", None) => ScriptEvent::Host(CompanionEvent::VisibilityChanged { hidden: true }),
            ("show", None) => ScriptEvent::Host(CompanionEvent::VisibilityChanged { hidden: false }),
            ("ended", None) => ScriptEvent::Ended,
            ("error", None) => ScriptEvent::Error,
            ("on", None) => ScriptEvent::Preference(PreferenceChange::Enabled),
            ("off", None) => ScriptEvent::Preference(PreferenceChange::Disabled),
            ("wait", Some(duration)) => ScriptEvent::Wait(utils::parse_duration(duration)?),
            ("theme", Some(theme)) => ScriptEvent::SkinTheme(theme.to_string()),
            ("os", Some("dark")) => ScriptEvent::OsDark(true),
            ("os", Some("light")) => ScriptEvent::OsDark(false),
            ("viewport", Some(width)) => ScriptEvent::Viewport(width.parse().map_err(|_| {
                CompanionError::InvalidInput(format!("bad viewport width '{}'", width))
            })?),
            _ => return Err(CompanionError::InvalidInput(format!("unknown event '{}'", s))),
        };
        Ok(event)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = utils::load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(sleep_after) = &args.sleep_after {
        config.inactivity.sleep_after_secs = utils::parse_duration(sleep_after)?.as_secs().max(1);
    }

    let log_level = if args.debug { "debug" } else { config.general.log_level.as_str() };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting companion v{}", env!("CARGO_PKG_VERSION"));

    let script = args
        .events
        .iter()
        .map(|e| e.parse::<ScriptEvent>())
        .collect::<Result<Vec<_>, _>>()?;

    // Server side: decide and announce through document classes
    let catalog = VariantCatalog::standard();
    let resolver = PageResolver::from_config(&config, catalog.clone())?;
    let mut page = PageContext::article(&args.page);
    if let Some(id) = &args.page_id {
        page = page.with_id(id);
    }
    let classes = resolver.decide(&page).html_classes();
    println!("classes: {}", classes.join(" "));

    // Client side: read the decision back
    let decision = PageDecision::from_html_classes(classes.iter().map(String::as_str));
    let Some(variant) = decision.variant.filter(|_| decision.enabled) else {
        println!("no companion on '{}'", args.page);
        return Ok(());
    };

    let provider = Arc::new(SchemeProvider::new());
    provider.init(Some(args.os_dark), args.skin_theme.as_deref());

    let container = Arc::new(HeadlessContainer::new());
    let kind = MediaKind::for_reduced_motion(args.reduced_motion);
    let factory: CompanionFactory = {
        let provider = Arc::clone(&provider);
        let container = Arc::clone(&container);
        let config = config.clone();
        let reduced_motion = args.reduced_motion;
        Box::new(move || {
            let companion_config = catalog.create(&variant, &config.assets_path, reduced_motion)?;
            Some(Companion::with_settings(
                companion_config,
                Arc::new(HeadlessElement::new(kind)),
                container.clone(),
                provider.clone(),
                &config,
            ))
        })
    };

    let lifecycle = CompanionLifecycle::new(factory, args.viewport);
    lifecycle.setup(Some("1"));
    report(&lifecycle, &container, "setup");

    for (event, raw) in script.into_iter().zip(&args.events) {
        apply(&lifecycle, event).await;
        settle().await;
        report(&lifecycle, &container, raw);
    }

    lifecycle.apply(PreferenceChange::Disabled);
    info!("Companion session finished");
    Ok(())
}

async fn apply(lifecycle: &CompanionLifecycle, event: ScriptEvent) {
    if let ScriptEvent::Preference(change) = event {
        lifecycle.apply(change);
        return;
    }
    if let ScriptEvent::Viewport(width) = event {
        lifecycle.handle_viewport_change(width);
        return;
    }
    if let ScriptEvent::Wait(duration) = event {
        info!("Waiting {}", utils::format_duration(duration));
        tokio::time::sleep(duration).await;
        return;
    }

    let Some(companion) = lifecycle.companion() else {
        warn!("No companion shown, ignoring {:?}", event);
        return;
    };

    match event {
        ScriptEvent::Host(event) => companion.handle_event(event),
        ScriptEvent::Ended => companion.player().notify_ended(),
        ScriptEvent::Error => companion.player().notify_error("scripted failure"),
        ScriptEvent::SkinTheme(theme) => companion.handle_skin_theme_change(&theme),
        ScriptEvent::OsDark(is_dark) => companion.handle_os_color_scheme_change(is_dark),
        ScriptEvent::Preference(_) | ScriptEvent::Viewport(_) | ScriptEvent::Wait(_) => {}
    }
}

/// Let spawned continuations run
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

fn report(lifecycle: &CompanionLifecycle, container: &HeadlessContainer, step: &str) {
    use companion::placement::ContainerElement;

    let Some(companion) = lifecycle.companion() else {
        println!("{:<16} hidden", step);
        return;
    };

    println!(
        "{:<16} source={} scheme={} sleep={} animating={} mount={:?} visible={}",
        step,
        companion.player().current_source().unwrap_or_else(|| "-".to_string()),
        companion
            .color_scheme()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string()),
        companion
            .sleep_state()
            .map(|s| format!("{:?}", s))
            .unwrap_or_else(|| "-".to_string()),
        companion.is_playing_animation(),
        container.parent(),
        container.is_visible(),
    );
}
