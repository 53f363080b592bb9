//! Page-level configuration.
//!
//! Read once at start from the `data-*` attributes of
//! `#courseware-widgets-config`, falling back to `<body>`.

use crate::dom;

pub const CONFIG_ELEMENT_ID: &str = "courseware-widgets-config";
const BOOKMARKS_BUTTON: &str = ".courseware-bookmarks-button";

/// Which bookmark markup the page renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookmarkLayout {
    /// One control per vertical, initial flag on `#seq_content`.
    Vertical,
    /// Controls anywhere under `.course-content`, refreshed on sequence change.
    CourseContent,
    /// Sequence navigation under `#seq_content` with per-button URLs.
    Sequence,
}

impl BookmarkLayout {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "vertical" => Some(Self::Vertical),
            "course-content" => Some(Self::CourseContent),
            "sequence" => Some(Self::Sequence),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageConfig {
    pub log_filter: String,
    pub csrf_cookie: String,
    pub bookmarks_api_url: Option<String>,
    pub bookmark_layout: BookmarkLayout,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_owned(),
            csrf_cookie: "csrftoken".to_owned(),
            bookmarks_api_url: None,
            bookmark_layout: BookmarkLayout::CourseContent,
        }
    }
}

impl PageConfig {
    pub fn read() -> Self {
        let source = dom::by_id(CONFIG_ELEMENT_ID)
            .or_else(|| dom::document().body().map(Into::into));
        let mut config = Self::from_lookup(|key| {
            source
                .as_ref()
                .and_then(|el| el.get_attribute(&format!("data-{key}")))
        });
        if config.bookmarks_api_url.is_none() {
            config.bookmarks_api_url = dom::query(BOOKMARKS_BUTTON)
                .and_then(|el| el.get_attribute("data-bookmarks-api-url"))
                .filter(|url| !url.trim().is_empty());
        }
        config
    }

    /// Build from a `data-*` key lookup; blank values fall back to defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| get(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Self {
            log_filter: get("log-filter").unwrap_or(defaults.log_filter),
            csrf_cookie: get("csrf-cookie").unwrap_or(defaults.csrf_cookie),
            bookmarks_api_url: get("bookmarks-api-url"),
            bookmark_layout: get("bookmark-layout")
                .and_then(|raw| BookmarkLayout::parse(&raw))
                .unwrap_or(defaults.bookmark_layout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> PageConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PageConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_page_uses_defaults() {
        assert_eq!(lookup(&[]), PageConfig::default());
    }

    #[test]
    fn attributes_override_defaults() {
        let config = lookup(&[
            ("log-filter", "debug,cw_client=trace"),
            ("csrf-cookie", "lms_csrftoken"),
            ("bookmarks-api-url", "/api/bookmarks/v1/bookmarks/"),
            ("bookmark-layout", "sequence"),
        ]);
        assert_eq!(config.log_filter, "debug,cw_client=trace");
        assert_eq!(config.csrf_cookie, "lms_csrftoken");
        assert_eq!(config.bookmarks_api_url.as_deref(), Some("/api/bookmarks/v1/bookmarks/"));
        assert_eq!(config.bookmark_layout, BookmarkLayout::Sequence);
    }

    #[test]
    fn blank_or_unknown_values_fall_back() {
        let config = lookup(&[("log-filter", "  "), ("bookmark-layout", "sidebar")]);
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.bookmark_layout, BookmarkLayout::CourseContent);
    }
}
