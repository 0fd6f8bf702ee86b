// src/selector.rs
//
// Interprets declarative SelectorSpecs against an already-parsed document
// tree. Pure functions, no I/O; absence is always a default/None, never an
// error, because real platform markup is inconsistent by nature.

use crate::profile::{AttrRule, SelectorSpec};
use scraper::ElementRef;
use url::Url;

fn rule_matches(el: ElementRef<'_>, rule: &AttrRule) -> bool {
    match rule {
        AttrRule::Exact { name, value } => match el.value().attr(name) {
            // Class lists are token sets, not opaque strings.
            Some(actual) if name == "class" => actual.split_whitespace().any(|t| t == value),
            Some(actual) => actual == value,
            None => false,
        },
        AttrRule::Contains { name, value } => {
            el.value().attr(name).is_some_and(|a| a.contains(value.as_str()))
        }
        AttrRule::DeriveId { name, .. } => el.value().attr(name).is_some(),
    }
}

fn element_matches(el: ElementRef<'_>, spec: &SelectorSpec) -> bool {
    el.value().name().eq_ignore_ascii_case(&spec.tag)
        && spec.attrs.iter().all(|rule| rule_matches(el, rule))
}

/// All descendants of `container` (excluding the container itself) matching
/// `spec`, in document order. When the spec carries an `inner` narrowing,
/// each match is replaced by its first inner descendant; matches without
/// one are dropped.
pub fn find_all<'a>(container: ElementRef<'a>, spec: &SelectorSpec) -> Vec<ElementRef<'a>> {
    let direct = container
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| element_matches(*el, spec));

    match &spec.inner {
        None => direct.collect(),
        Some(inner) => direct.filter_map(|el| find_first(el, inner)).collect(),
    }
}

pub fn find_first<'a>(container: ElementRef<'a>, spec: &SelectorSpec) -> Option<ElementRef<'a>> {
    find_all(container, spec).into_iter().next()
}

/// Whitespace-normalized text of `node`, optionally narrowed to a descendant
/// matching `sub_spec` first. A missing descendant or empty text yields the
/// default.
pub fn text_of(node: ElementRef<'_>, sub_spec: Option<&SelectorSpec>, default: &str) -> String {
    let target = match sub_spec {
        Some(spec) => match find_first(node, spec) {
            Some(found) => found,
            None => return default.to_string(),
        },
        None => node,
    };
    let text = target
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() { default.to_string() } else { text }
}

/// The `href` of `node` (or of a descendant matching `sub_spec`), resolved
/// against `base_url` per standard relative-reference rules. Absent
/// descendant, absent attribute or unresolvable reference yield `None`.
pub fn href_of(node: ElementRef<'_>, sub_spec: Option<&SelectorSpec>, base_url: &Url) -> Option<Url> {
    let target = match sub_spec {
        Some(spec) => find_first(node, spec)?,
        None => node,
    };
    let href = target.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    base_url.join(href).ok()
}
