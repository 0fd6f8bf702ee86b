// src/extractor.rs
//
// Per-lesson asset extraction: zero-or-more material links and zero-or-one
// video source, resolved from an already-fetched page. Pure over the parsed
// tree; "nothing found" is a normal outcome, never an error.

use crate::{
    constants,
    models::{Asset, AssetKind},
    profile::{MaterialSelector, SelectorSpec},
    selector,
};
use log::debug;
use scraper::{ElementRef, Html};
use url::Url;

/// Walks the configured material entries in order. `Direct` entries yield
/// link nodes straight from the page; `Grouped` entries find each parent
/// block first and search items within each one independently (repeated
/// dropdown/list markup).
pub fn extract_materials(
    doc: &Html,
    entries: &[MaterialSelector],
    page_url: &Url,
) -> Vec<Asset> {
    let root = doc.root_element();
    let mut assets = Vec::new();
    for entry in entries {
        match entry {
            MaterialSelector::Direct(spec) => collect_links(root, spec, page_url, &mut assets),
            MaterialSelector::Grouped { parent, item } => {
                for block in selector::find_all(root, parent) {
                    collect_links(block, item, page_url, &mut assets);
                }
            }
        }
    }
    assets
}

fn collect_links(container: ElementRef<'_>, spec: &SelectorSpec, page_url: &Url, out: &mut Vec<Asset>) {
    for link in selector::find_all(container, spec) {
        let Some(url) = selector::href_of(link, None, page_url) else {
            continue;
        };
        let text = selector::text_of(link, None, "");
        let name = if text.is_empty() {
            // Unique placeholder for nameless attachments.
            format!(
                "{}_{}",
                constants::MATERIAL_PLACEHOLDER_PREFIX,
                chrono::Utc::now().timestamp_millis()
            )
        } else {
            text
        };
        out.push(Asset { kind: AssetKind::Material, url, name });
    }
}

/// Walks the configured iframe entries in order and returns on the first
/// usable source. A candidate with a `src` is accepted when the entry's
/// substring demand (if any) holds; failing that, an entry carrying a
/// `derive_id` rule synthesizes a player URL from the named data attribute.
pub fn extract_video_url(doc: &Html, entries: &[SelectorSpec], page_url: &Url) -> Option<Url> {
    let root = doc.root_element();
    for spec in entries {
        for iframe in selector::find_all(root, spec) {
            if let Some(src) = iframe.value().attr("src") {
                let src = src.trim();
                let accepted = !src.is_empty()
                    && spec
                        .contains_rule("src")
                        .map_or(true, |fragment| src.contains(fragment));
                if accepted {
                    if let Ok(url) = page_url.join(src) {
                        debug!("video source accepted from iframe src: {}", url);
                        return Some(url);
                    }
                }
            }
            if let Some((attr, template)) = spec.derive_id_rule() {
                if let Some(id) = iframe.value().attr(attr) {
                    let id = id.trim();
                    if !id.is_empty() {
                        if let Ok(url) = Url::parse(&template.replace("{id}", id)) {
                            debug!("video source synthesized from '{}': {}", attr, url);
                            return Some(url);
                        }
                    }
                }
            }
        }
    }
    None
}
