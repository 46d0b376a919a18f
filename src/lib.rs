//! Companion - playback and interaction core for a decorative animated page companion
//!
//! The crate decides whether a page shows a companion and which variant, then
//! drives a single media element through idle, click, sleep and flashlight
//! clips while reacting to color scheme changes. The page itself is reached
//! through the [`media::MediaElement`] and [`placement::ContainerElement`]
//! traits; in-memory implementations of both ship with the crate.

pub mod companion;
pub mod eligibility;
pub mod interactions;
pub mod lifecycle;
pub mod media;
pub mod placement;
pub mod scheme;
pub mod utils;

pub use companion::{Companion, CompanionConfig, Interactions, VariantCatalog};
pub use eligibility::{PageContext, PageDecision, PageResolver};
pub use interactions::CompanionEvent;
pub use lifecycle::{CompanionLifecycle, PreferenceChange};
pub use media::{MediaElement, MediaKind, MediaPlayer};
pub use placement::ContainerElement;
pub use scheme::{ColorScheme, SchemeProvider};
pub use utils::{CompanionError, Result, SiteConfig};
