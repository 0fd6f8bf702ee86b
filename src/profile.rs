// src/profile.rs
//
// Declarative platform description: where to log in, how to recognize a
// successful login, and which nodes carry modules, lessons, materials and
// video players. One JSON document per platform, loaded once per run.

use crate::error::{AppError, AppResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};

/// Attribute constraint inside a [`SelectorSpec`]. A small closed set of
/// variants interpreted by the resolver keeps the engine platform-agnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum AttrRule {
    /// Attribute equals the value. For `class` this is whitespace-token
    /// membership, matching how HTML class lists behave.
    Exact { name: String, value: String },
    /// Attribute contains the value as a substring (iframe `src` matching).
    Contains { name: String, value: String },
    /// Attribute presence is the match; its value is an opaque media id.
    /// `url_template` synthesizes the player URL, `{id}` is the placeholder.
    DeriveId { name: String, url_template: String },
}

impl AttrRule {
    pub fn name(&self) -> &str {
        match self {
            AttrRule::Exact { name, .. }
            | AttrRule::Contains { name, .. }
            | AttrRule::DeriveId { name, .. } => name,
        }
    }
}

/// Declarative description of which HTML node(s) to find. Purely data;
/// behavior lives in [`crate::selector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSpec {
    pub tag: String,
    #[serde(default)]
    pub attrs: Vec<AttrRule>,
    /// Optional nested narrowing applied before text/link extraction.
    #[serde(default)]
    pub inner: Option<Box<SelectorSpec>>,
}

impl SelectorSpec {
    pub fn tag(tag: &str) -> Self {
        Self { tag: tag.to_string(), attrs: Vec::new(), inner: None }
    }

    /// The `contains` rule for a given attribute, if the spec carries one.
    pub fn contains_rule(&self, attr: &str) -> Option<&str> {
        self.attrs.iter().find_map(|rule| match rule {
            AttrRule::Contains { name, value } if name == attr => Some(value.as_str()),
            _ => None,
        })
    }

    /// The `derive_id` rule, if the spec carries one.
    pub fn derive_id_rule(&self) -> Option<(&str, &str)> {
        self.attrs.iter().find_map(|rule| match rule {
            AttrRule::DeriveId { name, url_template } => {
                Some((name.as_str(), url_template.as_str()))
            }
            _ => None,
        })
    }
}

/// Rule classifying a completed login response as success or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Indicator {
    UrlContains { value: String },
    UrlIsNot { value: String },
    PageTextContains { value: String },
    ElementExists { selector: SelectorSpec },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginConfig {
    pub page_url: String,
    /// Form action; defaults to the login page URL.
    #[serde(default)]
    pub action_url: Option<String>,
    /// `username`/`password` map to the platform's field names; every other
    /// entry passes through into the payload verbatim (flags, CSRF stubs).
    pub payload_fields: HashMap<String, String>,
    #[serde(default)]
    pub success_indicators: Vec<Indicator>,
    #[serde(default)]
    pub failure_indicators: Vec<Indicator>,
}

impl LoginConfig {
    pub fn action_url(&self) -> &str {
        self.action_url.as_deref().unwrap_or(&self.page_url)
    }
}

/// Material discovery entry: either link nodes found directly on the page,
/// or repeated parent blocks (dropdowns, lists) searched independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialSelector {
    Grouped { parent: SelectorSpec, item: SelectorSpec },
    Direct(SelectorSpec),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub module_item: SelectorSpec,
    #[serde(default)]
    pub module_title: Option<SelectorSpec>,
    /// Lesson-bearing container inside a module item; when absent, lessons
    /// are searched in the module item itself.
    #[serde(default)]
    pub lesson_container: Option<SelectorSpec>,
    pub lesson_item: SelectorSpec,
    #[serde(default)]
    pub lesson_title: Option<SelectorSpec>,
    #[serde(default)]
    pub lesson_link: Option<SelectorSpec>,
    #[serde(default)]
    pub materials: Vec<MaterialSelector>,
    #[serde(default)]
    pub video_iframes: Vec<SelectorSpec>,
}

/// Immutable per-platform configuration, read-only for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub platform_name: String,
    pub login: LoginConfig,
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub delay_between_lessons_ms: Option<u64>,
}

impl PlatformProfile {
    pub fn from_json(content: &str) -> AppResult<Self> {
        let profile: PlatformProfile = serde_json::from_str(content)
            .map_err(|e| AppError::Profile(format!("invalid profile document: {}", e)))?;
        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> AppResult<()> {
        for required in ["username", "password"] {
            if !self.login.payload_fields.contains_key(required) {
                return Err(AppError::Profile(format!(
                    "login.payload_fields is missing the required '{}' mapping",
                    required
                )));
            }
        }
        Ok(())
    }
}

/// Loads `{profile_dir}/{name}.json`, failing fast with a diagnostic naming
/// the file and the offending key.
pub fn load(profile_dir: &Path, name: &str) -> AppResult<PlatformProfile> {
    let path = profile_dir.join(format!("{}.json", name));
    debug!("loading platform profile from {:?}", path);
    if !path.is_file() {
        return Err(AppError::Profile(format!(
            "no profile '{}' under '{}' (expected {})",
            name,
            profile_dir.display(),
            path.display()
        )));
    }
    let content = fs::read_to_string(&path)?;
    PlatformProfile::from_json(&content)
        .map_err(|e| AppError::Profile(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static str {
        r#"{
            "platform_name": "Example Edu",
            "login": {
                "page_url": "https://edu.example.com/login",
                "action_url": "https://edu.example.com/do_login",
                "payload_fields": { "username": "email", "password": "senha", "remember": "1" },
                "success_indicators": [
                    { "kind": "url_contains", "value": "/dashboard" },
                    { "kind": "element_exists", "selector": { "tag": "div", "attrs": [ { "match": "exact", "name": "class", "value": "user-menu" } ] } }
                ],
                "failure_indicators": [
                    { "kind": "page_text_contains", "value": "Invalid credentials" }
                ]
            },
            "selectors": {
                "module_item": { "tag": "div", "attrs": [ { "match": "exact", "name": "class", "value": "module" } ] },
                "lesson_item": { "tag": "li" },
                "materials": [
                    { "tag": "a", "attrs": [ { "match": "exact", "name": "class", "value": "material" } ] },
                    { "parent": { "tag": "div", "attrs": [ { "match": "exact", "name": "class", "value": "dropdown" } ] },
                      "item": { "tag": "a" } }
                ],
                "video_iframes": [
                    { "tag": "iframe", "attrs": [ { "match": "contains", "name": "src", "value": "player.vimeo.com" } ] },
                    { "tag": "iframe", "attrs": [ { "match": "derive_id", "name": "data-video-id", "url_template": "https://player.vimeo.com/video/{id}" } ] }
                ]
            },
            "delay_between_lessons_ms": 100
        }"#
    }

    #[test]
    fn parses_full_profile() {
        let profile = PlatformProfile::from_json(sample()).unwrap();
        assert_eq!(profile.platform_name, "Example Edu");
        assert_eq!(profile.login.action_url(), "https://edu.example.com/do_login");
        assert_eq!(profile.login.success_indicators.len(), 2);
        assert_eq!(profile.selectors.materials.len(), 2);
        assert!(matches!(profile.selectors.materials[0], MaterialSelector::Direct(_)));
        assert!(matches!(profile.selectors.materials[1], MaterialSelector::Grouped { .. }));
        assert_eq!(profile.delay_between_lessons_ms, Some(100));
    }

    #[test]
    fn action_url_defaults_to_page_url() {
        let mut profile = PlatformProfile::from_json(sample()).unwrap();
        profile.login.action_url = None;
        assert_eq!(profile.login.action_url(), "https://edu.example.com/login");
    }

    #[test]
    fn missing_required_key_fails_fast() {
        let doc = r#"{ "platform_name": "x", "selectors": { "module_item": { "tag": "div" }, "lesson_item": { "tag": "li" } } }"#;
        let err = PlatformProfile::from_json(doc).unwrap_err();
        assert!(err.to_string().contains("login"));
    }

    #[test]
    fn missing_payload_mapping_fails_fast() {
        let doc = r#"{
            "platform_name": "x",
            "login": { "page_url": "https://e/login", "payload_fields": { "username": "u" } },
            "selectors": { "module_item": { "tag": "div" }, "lesson_item": { "tag": "li" } }
        }"#;
        let err = PlatformProfile::from_json(doc).unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn contains_and_derive_id_rules_are_queryable() {
        let profile = PlatformProfile::from_json(sample()).unwrap();
        let iframe = &profile.selectors.video_iframes[0];
        assert_eq!(iframe.contains_rule("src"), Some("player.vimeo.com"));
        let derived = &profile.selectors.video_iframes[1];
        assert_eq!(
            derived.derive_id_rule(),
            Some(("data-video-id", "https://player.vimeo.com/video/{id}"))
        );
    }
}
