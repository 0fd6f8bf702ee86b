// src/media.rs
//
// Boundary to the external media-retrieval tool. The engine only resolves a
// player URL and an output template; fetching, format choice and retries
// are the tool's business, and its exit code is the sole signal consumed.

use crate::{constants, error::*, models::Asset, utils};
use async_trait::async_trait;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use url::Url;

#[derive(Debug, Clone)]
pub struct MediaRequest {
    pub url: Url,
    /// Lesson page URL, stamped as the tool's referer.
    pub referer: Url,
    pub dest_dir: PathBuf,
    pub title: String,
}

impl MediaRequest {
    /// Builds the delegate request from a resolved video asset.
    pub fn from_asset(asset: &Asset, referer: &Url, dest_dir: &Path) -> Self {
        Self {
            url: asset.url.clone(),
            referer: referer.clone(),
            dest_dir: dest_dir.to_path_buf(),
            title: asset.name.clone(),
        }
    }
}

#[async_trait]
pub trait MediaDelegate: Send + Sync {
    async fn fetch(&self, request: &MediaRequest) -> AppResult<()>;
}

/// Skip-if-any-known-extension-present policy: the delegate chooses the
/// container, so any common one under the sanitized title counts as done.
pub fn existing_video_file(dest_dir: &Path, title: &str) -> Option<PathBuf> {
    let stem = utils::sanitize_filename(title);
    constants::VIDEO_EXTENSIONS
        .iter()
        .map(|ext| dest_dir.join(format!("{}.{}", stem, ext)))
        .find(|candidate| candidate.exists())
}

pub struct YtDlpDelegate {
    binary: PathBuf,
}

impl YtDlpDelegate {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }
}

#[async_trait]
impl MediaDelegate for YtDlpDelegate {
    async fn fetch(&self, request: &MediaRequest) -> AppResult<()> {
        // The tool fills in its chosen extension for the %(ext)s placeholder.
        let output_template = request
            .dest_dir
            .join(format!("{}.%(ext)s", utils::sanitize_filename(&request.title)));

        let mut command = Command::new(&self.binary);
        command
            .arg("--referer")
            .arg(request.referer.as_str())
            .arg("-o")
            .arg(&output_template)
            .arg("--no-playlist")
            .arg("--force-overwrites")
            .arg("--retries")
            .arg(constants::MEDIA_TOOL_RETRIES)
            .arg("--fragment-retries")
            .arg(constants::MEDIA_TOOL_FRAGMENT_RETRIES)
            .arg("--socket-timeout")
            .arg(constants::MEDIA_TOOL_SOCKET_TIMEOUT)
            .arg("--progress")
            .arg("--no-warnings")
            .arg(request.url.as_str());

        info!("invoking media delegate for '{}' ({})", request.title, request.url);
        debug!("media delegate command: {:?}", command);

        let status = command.status().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::MediaDelegate(format!(
                    "'{}' not found; install it or pass --yt-dlp-path",
                    self.binary.display()
                ))
            } else {
                AppError::Io(e)
            }
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(AppError::MediaDelegate(format!(
                "'{}' exited with {}",
                self.binary.display(),
                status
            )))
        }
    }
}
