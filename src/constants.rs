// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const MAX_FILENAME_BYTES: usize = 150;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const LOG_FILE_NAME: &str = concat!(clap::crate_name!(), ".log");
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const DEFAULT_SAVE_DIR: &str = "downloads";
pub const DEFAULT_PROFILE_DIR: &str = "platforms";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/99.0.4844.51 Safari/537.36";

pub const CONNECT_TIMEOUT_SECS: u64 = 10;
/// Timeout for regular page fetches.
pub const PAGE_TIMEOUT_SECS: u64 = 30;
/// Larger timeout for streamed file transfers.
pub const FILE_TIMEOUT_SECS: u64 = 60;
/// Pause between successive lesson page fetches, overridable per profile.
pub const DEFAULT_LESSON_DELAY_MS: u64 = 500;

pub const DEFAULT_MODULE_TITLE: &str = "Unknown Module";
/// Used when a material link has no text.
pub const MATERIAL_PLACEHOLDER_PREFIX: &str = "attachment";
/// Extension applied when neither the URL nor the display name yields one.
pub const FALLBACK_EXTENSION: &str = ".dat";

/// Containers the media delegate may pick; any of these already present
/// under the lesson title means the video is treated as satisfied.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "flv", "avi", "mov", "ts"];

pub const DEFAULT_MEDIA_TOOL: &str = "yt-dlp";
pub const MEDIA_TOOL_RETRIES: &str = "3";
pub const MEDIA_TOOL_FRAGMENT_RETRIES: &str = "3";
pub const MEDIA_TOOL_SOCKET_TIMEOUT: &str = "60";
