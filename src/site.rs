#![allow(dead_code)]

//! Documentation-site metadata
//!
//! The semifold docs site is rendered by an external static-site generator;
//! this module owns the data that generator consumes: the site configuration
//! record (title, icons, locales, social links, build plugins) and the small
//! tab-label view used for navigation tabs. `semifold init --docs` writes
//! the default configuration as JSON for the site build to pick up.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{FoldError, FoldResult};

/// Sizing class applied to tab icons
pub const ICON_SIZE_CLASS: &str = "size-4";

/// Per-language display strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleEntry {
  /// Language code, e.g. "en" or "zh"
  pub lang: String,
  /// Label shown in the language switcher
  pub label: String,
  pub title: String,
  pub description: String,
  pub search_placeholder_text: String,
  pub outline_title: String,
}

/// A social-link entry in the site header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLink {
  pub icon: String,
  pub mode: String,
  pub content: String,
}

/// Light/dark logo asset pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logo {
  pub light: String,
  pub dark: String,
}

/// Static site configuration consumed by the documentation build
///
/// Built once, never mutated; malformed fields are the site generator's
/// build-time concern, except for the locale invariants checked by
/// [`SiteConfig::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
  pub title: String,
  pub description: String,
  pub icon: String,
  pub logo: Logo,
  pub locales: Vec<LocaleEntry>,
  pub social_links: Vec<SocialLink>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub plugins: Vec<String>,
}

impl SiteConfig {
  /// The semifold documentation site
  pub fn semifold() -> Self {
    Self {
      title: "Semifold - Next-generation cross-language monorepo version and release management tool".to_string(),
      description: "Cross-language monorepo version and release management tool".to_string(),
      icon: "/favicon-dark.svg".to_string(),
      logo: Logo {
        light: "/favicon-light.svg".to_string(),
        dark: "/favicon-dark.svg".to_string(),
      },
      locales: vec![
        LocaleEntry {
          lang: "en".to_string(),
          label: "English".to_string(),
          title: "Semifold".to_string(),
          description: "Cross-language monorepo version and release management tool".to_string(),
          search_placeholder_text: "Search docs".to_string(),
          outline_title: "On this page".to_string(),
        },
        LocaleEntry {
          lang: "zh".to_string(),
          label: "简体中文".to_string(),
          title: "Semifold".to_string(),
          description: "跨语言 monorepo 版本与发布管理工具".to_string(),
          search_placeholder_text: "搜索文档".to_string(),
          outline_title: "目录".to_string(),
        },
      ],
      social_links: vec![SocialLink {
        icon: "github".to_string(),
        mode: "link".to_string(),
        content: "https://github.com/noctisynth/semifold".to_string(),
      }],
      plugins: Vec::new(),
    }
  }

  /// Check the locale invariants: unique codes, non-empty display strings
  pub fn validate(&self) -> FoldResult<()> {
    let mut seen = std::collections::BTreeSet::new();
    for locale in &self.locales {
      if !seen.insert(locale.lang.as_str()) {
        return Err(FoldError::message(format!("duplicate locale code '{}'", locale.lang)));
      }
      if locale.title.is_empty() || locale.description.is_empty() {
        return Err(FoldError::message(format!(
          "locale '{}' needs a non-empty title and description",
          locale.lang
        )));
      }
    }
    Ok(())
  }

  pub fn to_json(&self) -> FoldResult<String> {
    let mut rendered = serde_json::to_string_pretty(self)?;
    rendered.push('\n');
    Ok(rendered)
  }
}

/// Something that can render itself as an inline SVG with a sizing class
pub trait VectorIcon {
  fn render_svg(&self, class: &str) -> String;
}

/// A tab icon is exactly one of two shapes: an image resource locator, or a
/// renderer producing vector markup
pub enum TabIcon {
  Image(String),
  Vector(Box<dyn VectorIcon>),
}

impl fmt::Debug for TabIcon {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TabIcon::Image(src) => f.debug_tuple("Image").field(src).finish(),
      TabIcon::Vector(_) => f.debug_tuple("Vector").finish(),
    }
  }
}

/// Icon-plus-content label for a navigation tab
pub struct TabLabel {
  icon: TabIcon,
  children: String,
}

impl TabLabel {
  pub fn new(icon: TabIcon, children: impl Into<String>) -> Self {
    Self {
      icon,
      children: children.into(),
    }
  }

  /// Render the label markup
  ///
  /// An image icon uses its locator for both the source and the accessible
  /// description; both branches get the fixed sizing class, and the children
  /// follow the icon.
  pub fn render(&self) -> String {
    let icon = match &self.icon {
      TabIcon::Image(src) => format!(r#"<img src="{src}" alt="{src}" class="{ICON_SIZE_CLASS}" />"#),
      TabIcon::Vector(vector) => vector.render_svg(ICON_SIZE_CLASS),
    };
    format!(r#"<div class="flex flex-row items-center gap-1">{}{}</div>"#, icon, self.children)
  }
}
