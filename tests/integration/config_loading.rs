//! Site configuration loading and page eligibility

use companion::companion::VariantCatalog;
use companion::eligibility::{PageContext, PageResolver};
use companion::utils::{CompanionError, SiteConfig};
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, mapping: Option<&str>) -> std::path::PathBuf {
    let mapping_line = match mapping {
        Some(json) => {
            let path = dir.path().join("default-companions.json");
            fs::write(&path, json).unwrap();
            format!("default_mapping_path = {:?}\n", path.display().to_string())
        }
        None => String::new(),
    };

    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        format!(
            r#"
assets_path = "/static/companion"
{mapping_line}
[enable]
type = "blockFilter"
filterPages = ["Special Page"]

[[variant_rules]]
variant = "balloons"
mode = "allow"
pages = ["Party"]

[[variant_rules]]
variant = "dreaming"
mode = "block"
pages = ["Party", "Moon", "Douglas Adams"]

[player]
image_step_ms = 1500

[inactivity]
sleep_after_secs = 120
"#
        ),
    )
    .unwrap();
    path
}

#[test]
fn test_load_explicit_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, None);

    let config = SiteConfig::from_file(&path).unwrap();
    config.validate().unwrap();

    assert_eq!(config.assets_path, "/static/companion");
    assert_eq!(config.player.image_step_ms, 1500);
    assert_eq!(config.inactivity.sleep_after_secs, 120);
    assert_eq!(config.inactivity.activity_throttle_ms, 1000);
    assert_eq!(config.placement.large_breakpoint_px, 1120);
    assert_eq!(config.variant_rules.len(), 2);
}

#[test]
fn test_missing_explicit_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let err = SiteConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, CompanionError::NotFound(_)));
}

#[test]
fn test_broken_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "assets_path = [").unwrap();

    let err = SiteConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, CompanionError::Config(_)));
}

#[test]
fn test_page_decisions_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, Some(r#"{"Q42": "book"}"#));
    let config = SiteConfig::from_file(&path).unwrap();
    let resolver = PageResolver::from_config(&config, VariantCatalog::standard()).unwrap();

    let classes = |page: PageContext| resolver.decide(&page).html_classes();

    assert!(classes(PageContext::article("Special Page")).is_empty());
    assert_eq!(
        classes(PageContext::article("Party")),
        vec!["companion-enabled", "companion-balloons"]
    );
    assert_eq!(
        classes(PageContext::article("Cat")),
        vec!["companion-enabled", "companion-dreaming"]
    );
    assert_eq!(
        classes(PageContext::article("Douglas Adams").with_id("Q42")),
        vec!["companion-enabled", "companion-book"]
    );
    assert_eq!(classes(PageContext::article("Moon")), vec!["companion-enabled"]);
}

#[test]
fn test_broken_mapping_fails_resolver() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, Some("{"));
    let config = SiteConfig::from_file(&path).unwrap();

    let err = PageResolver::from_config(&config, VariantCatalog::standard()).unwrap_err();
    assert!(matches!(err, CompanionError::Config(_)));
}
