// src/utils.rs

use crate::{constants, error::*};
use anyhow::Context;
use log::{error, warn};
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::{
    fs,
    path::{Component, Path, PathBuf},
    sync::LazyLock,
};
use url::Url;

static ILLEGAL_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|#%&{}$!@()+=\[\]]"#).unwrap());
// Hyphens survive so "{ordinal:03} - {title}" folder names keep their shape.
static SEPARATOR_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s._]+").unwrap());

/// Total, deterministic path-component sanitizer. Any input yields a
/// non-empty, filesystem-safe name no longer than `MAX_FILENAME_BYTES`.
/// Dots are collapsed away, so this is for name stems; extensions are
/// appended by the caller afterwards.
pub fn sanitize_filename(name: &str) -> String {
    let original = name.trim();
    if original.is_empty() {
        return "untitled".to_string();
    }

    let mut name = ILLEGAL_CHARS_RE.replace_all(original, "").into_owned();
    name = SEPARATOR_RUN_RE.replace_all(&name, " ").trim().to_string();
    name = name
        .trim_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string();
    if name.is_empty() {
        return "untitled".to_string();
    }

    // Checked after the collapse/trim steps so the prefix survives them.
    let windows_reserved = [
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
        "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    if windows_reserved.contains(&name.to_uppercase().as_str()) {
        name = format!("_{}", name);
    }

    safe_truncate_utf8(&name, constants::MAX_FILENAME_BYTES).to_string()
}

fn safe_truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut i = max_bytes;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    &s[..i]
}

// Extensions shorter than ".x" or longer than ".xxxx" are treated as noise
// (version numbers, trailing dots in prose, etc.).
fn is_plausible_extension(ext_with_dot: &str) -> bool {
    let len = ext_with_dot.len();
    (2..=5).contains(&len)
        && ext_with_dot.starts_with('.')
        && ext_with_dot[1..].chars().all(|c| c.is_ascii_alphanumeric())
}

/// Extension (with leading dot) taken from the URL path, ignoring query and
/// fragment. `None` when absent or implausible.
pub fn extension_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    let (_, ext) = decoded.rsplit_once('.')?;
    let candidate = format!(".{}", ext);
    is_plausible_extension(&candidate).then_some(candidate)
}

/// Splits a suggested display name into stem and plausible extension.
pub fn split_suggested_ext(name: &str) -> (&str, Option<String>) {
    if let Some((stem, ext)) = name.rsplit_once('.') {
        let candidate = format!(".{}", ext);
        if !stem.is_empty() && is_plausible_extension(&candidate) {
            return (stem, Some(candidate));
        }
    }
    (name, None)
}

/// Joins `relative_path` under `base_dir`, refusing any component that would
/// escape the base. The base directory must already exist.
pub fn secure_join_path(base_dir: &Path, relative_path: &Path) -> AppResult<PathBuf> {
    let resolved_base = dunce::canonicalize(base_dir)
        .with_context(|| format!("base directory '{}' does not exist or is not accessible", base_dir.display()))?;
    let mut final_path = resolved_base.clone();
    for component in relative_path.components() {
        match component {
            Component::Normal(part) => final_path.push(part),
            Component::ParentDir => {
                return Err(AppError::Security("path traversal '..' detected".to_string()));
            }
            _ => continue,
        }
    }
    if !final_path.starts_with(&resolved_base) {
        return Err(AppError::Security(format!(
            "path escapes base directory: '{}'",
            relative_path.display()
        )));
    }
    Ok(final_path)
}

/// Materializes `base/course/module/lesson` with every component sanitized.
/// On failure a fallback `lesson_{first token}` directory is attempted under
/// the module; if that also fails the lesson gets no destination and the
/// caller is expected to skip its downloads.
pub fn create_lesson_dir(
    base: &Path,
    course: &str,
    module: &str,
    lesson_folder: &str,
) -> Option<PathBuf> {
    if let Err(e) = fs::create_dir_all(base) {
        error!("cannot create base output directory '{}': {}", base.display(), e);
        return None;
    }

    let relative: PathBuf = [
        sanitize_filename(course),
        sanitize_filename(module),
        sanitize_filename(lesson_folder),
    ]
    .iter()
    .collect();

    match secure_join_path(base, &relative).and_then(|path| {
        fs::create_dir_all(&path)?;
        Ok(path)
    }) {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(
                "could not create lesson directory '{}': {}; trying fallback",
                relative.display(),
                e
            );
            let first_token = lesson_folder.split_whitespace().next().unwrap_or("item");
            let fallback: PathBuf = [
                sanitize_filename(course),
                sanitize_filename(module),
                sanitize_filename(&format!("lesson_{}", first_token)),
            ]
            .iter()
            .collect();
            match secure_join_path(base, &fallback).and_then(|path| {
                fs::create_dir_all(&path)?;
                Ok(path)
            }) {
                Ok(path) => {
                    warn!("using fallback lesson directory '{}'", path.display());
                    Some(path)
                }
                Err(e_alt) => {
                    error!(
                        "fallback lesson directory also failed ('{}'): {}; lesson will be skipped",
                        fallback.display(),
                        e_alt
                    );
                    None
                }
            }
        }
    }
}
