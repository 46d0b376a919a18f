//! Integration tests for the companion crate
//!
//! These tests drive the public API end to end against the in-memory host:
//! - Media player ordering and cancellation
//! - Sleep and click interactions with mocked asset lookup
//! - Companion precedence rules and lifecycle
//! - Site configuration loading and page eligibility

mod support;

mod companion_flow;
mod config_loading;
mod interactions;
mod playback;
