//! Page eligibility
//!
//! Decides, for one page view, whether a companion is shown at all and which
//! variant it is. The decision is made from the site configuration: a global
//! enable policy, an ordered list of variant rules, and a static mapping from
//! page ids to variants used when no rule matches.

use crate::companion::VariantCatalog;
use crate::utils::config::SiteConfig;
use crate::utils::error::{IntoCompanionError, Result};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use log::{debug, warn};

/// Class added to the document when a companion is shown
pub const ENABLED_CLASS: &str = "companion-enabled";

/// Prefix of the class naming the chosen variant
pub const VARIANT_CLASS_PREFIX: &str = "companion-";

/// How the enable policy treats its page list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnableMode {
    /// Every article page
    #[default]
    Everywhere,

    /// Only the listed pages
    AllowFilter,

    /// Every page except the listed ones
    BlockFilter,
}

/// Global switch for the companion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnablePolicy {
    #[serde(rename = "type")]
    pub mode: EnableMode,

    pub filter_pages: Vec<String>,
}

impl EnablePolicy {
    pub fn everywhere() -> Self {
        Self::default()
    }

    pub fn allows(&self, title: &str) -> bool {
        let listed = self.filter_pages.iter().any(|p| p == title);
        match self.mode {
            EnableMode::Everywhere => true,
            EnableMode::AllowFilter => listed,
            EnableMode::BlockFilter => !listed,
        }
    }
}

/// How a variant rule treats its page list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMode {
    /// Matches listed pages
    Allow,

    /// Matches pages that are not listed
    Block,

    /// Matches every page
    #[default]
    Default,
}

/// Picks a variant for the pages it matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRule {
    pub variant: String,

    #[serde(default)]
    pub mode: RuleMode,

    #[serde(default)]
    pub pages: Vec<String>,
}

impl VariantRule {
    pub fn matches(&self, title: &str) -> bool {
        let listed = self.pages.iter().any(|p| p == title);
        match self.mode {
            RuleMode::Allow => listed,
            RuleMode::Block => !listed,
            RuleMode::Default => true,
        }
    }
}

/// Static page id to variant mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct DefaultMapping {
    entries: HashMap<String, String>,
}

impl DefaultMapping {
    /// Parse a JSON object of `"page id": "variant"` pairs
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the mapping file; a missing file yields an empty mapping
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No default mapping at {}", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn get(&self, page_id: &str) -> Option<&str> {
        self.entries.get(page_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The page being viewed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    /// Full page title as listed in filters
    pub title: String,

    /// Stable id used by the default mapping
    pub id: Option<String>,

    /// Whether this is a plain view of an article
    pub is_article_view: bool,
}

impl PageContext {
    /// A plain view of an article
    pub fn article(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            id: None,
            is_article_view: true,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Outcome for one page view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDecision {
    pub enabled: bool,
    pub variant: Option<String>,
}

impl PageDecision {
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Document classes announcing the decision to the client
    pub fn html_classes(&self) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        let mut classes = vec![ENABLED_CLASS.to_string()];
        if let Some(variant) = &self.variant {
            classes.push(format!("{}{}", VARIANT_CLASS_PREFIX, variant));
        }
        classes
    }

    /// Read a decision back from document classes
    pub fn from_html_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> Self {
        let mut decision = Self::disabled();
        for class in classes {
            if class == ENABLED_CLASS {
                decision.enabled = true;
            } else if let Some(variant) = class.strip_prefix(VARIANT_CLASS_PREFIX) {
                // Variant names are single words; this skips preference classes
                if !variant.is_empty() && !variant.contains('-') && decision.variant.is_none() {
                    decision.variant = Some(variant.to_string());
                }
            }
        }
        if !decision.enabled {
            decision.variant = None;
        }
        decision
    }
}

/// Resolves page decisions from the site configuration
#[derive(Debug, Clone)]
pub struct PageResolver {
    enable: Option<EnablePolicy>,
    rules: Vec<VariantRule>,
    mapping: DefaultMapping,
    catalog: VariantCatalog,
}

impl PageResolver {
    pub fn new(
        enable: Option<EnablePolicy>,
        rules: Vec<VariantRule>,
        mapping: DefaultMapping,
        catalog: VariantCatalog,
    ) -> Self {
        Self {
            enable,
            rules,
            mapping,
            catalog,
        }
    }

    /// Build a resolver from site configuration, loading the default mapping
    pub fn from_config(config: &SiteConfig, catalog: VariantCatalog) -> Result<Self> {
        let mapping = match &config.default_mapping_path {
            Some(path) => DefaultMapping::load(path)
                .config_err(&format!("Failed to load {}", path.display()))?,
            None => DefaultMapping::default(),
        };

        Ok(Self::new(
            config.enable.clone(),
            config.variant_rules.clone(),
            mapping,
            catalog,
        ))
    }

    /// Whether the companion is shown on the page at all
    pub fn is_companion_enabled(&self, title: &str) -> bool {
        self.enable.as_ref().is_some_and(|policy| policy.allows(title))
    }

    /// Variant for the page: first matching rule, then the default mapping
    pub fn current_variant(&self, title: &str, page_id: Option<&str>) -> Option<String> {
        let from_rules = self
            .rules
            .iter()
            .find(|rule| rule.matches(title))
            .map(|rule| rule.variant.as_str());

        let from_mapping = || page_id.and_then(|id| self.mapping.get(id));

        let variant = from_rules.or_else(from_mapping)?;
        if self.catalog.contains(variant) {
            Some(variant.to_string())
        } else {
            warn!(
                "Ignoring unknown variant '{}' for {} (known: {})",
                variant,
                title,
                self.catalog.names().collect::<Vec<_>>().join(", ")
            );
            None
        }
    }

    /// Full decision for a page view
    pub fn decide(&self, page: &PageContext) -> PageDecision {
        if !page.is_article_view || !self.is_companion_enabled(&page.title) {
            return PageDecision::disabled();
        }

        PageDecision {
            enabled: true,
            variant: self.current_variant(&page.title, page.id.as_deref()),
        }
    }
}
