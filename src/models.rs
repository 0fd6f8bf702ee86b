// src/models.rs

use std::path::PathBuf;
use url::Url;

/// Mutable run state threaded through every request in causal order. Owned
/// exclusively by one engine instance; sequential access only.
#[derive(Debug, Default, Clone)]
pub struct CrawlSession {
    pub authenticated: bool,
    /// Final URL of the last response, stamped on subsequent requests.
    pub referer: Option<Url>,
}

impl CrawlSession {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Material,
    Video,
}

impl AssetKind {
    /// Human-readable label used in progress lines and diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Material => "material",
            AssetKind::Video => "video",
        }
    }
}

/// A resolved download directive, consumed immediately after extraction.
#[derive(Debug, Clone)]
pub struct Asset {
    pub kind: AssetKind,
    pub url: Url,
    pub name: String,
}

/// One lesson slot. Ordinals are global across modules, 1-based and strictly
/// increasing; a lesson keeps its slot even when it has no page URL or no
/// creatable destination.
#[derive(Debug, Clone)]
pub struct LessonNode {
    pub ordinal: u32,
    pub title: String,
    pub page_url: Option<Url>,
    pub dir: Option<PathBuf>,
}

impl LessonNode {
    /// Folder component: `"{ordinal:03} - {title}"`.
    pub fn folder_name(&self) -> String {
        format!("{:03} - {}", self.ordinal, self.title)
    }
}

/// Ephemeral product of one hierarchy-walker pass; never persisted.
#[derive(Debug, Clone)]
pub struct ModuleNode {
    pub title: String,
    pub lessons: Vec<LessonNode>,
}

/// Per-asset result of the file materializer. Failures are data, not errors;
/// the walk continues past them.
#[derive(Debug, Clone)]
pub enum MaterialOutcome {
    Downloaded(PathBuf),
    /// Already present and non-empty; no network request performed.
    Skipped(PathBuf),
    Failed(String),
}
