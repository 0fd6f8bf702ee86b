// src/config.rs

use crate::{cli::Cli, constants, profile::PlatformProfile};
use std::{path::PathBuf, time::Duration};

/// Runtime configuration assembled once from CLI arguments, the platform
/// profile's tunables and built-in defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub page_timeout: Duration,
    pub file_timeout: Duration,
    /// Pause between successive lesson page fetches.
    pub lesson_delay: Duration,
    pub output_dir: PathBuf,
    pub media_tool: PathBuf,
    pub skip_videos: bool,
    pub skip_materials: bool,
}

impl AppConfig {
    pub fn new(args: &Cli, profile: &PlatformProfile) -> Self {
        // CLI override beats the profile tunable beats the default.
        let delay_ms = args
            .delay_ms
            .or(profile.delay_between_lessons_ms)
            .unwrap_or(constants::DEFAULT_LESSON_DELAY_MS);
        Self {
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(constants::CONNECT_TIMEOUT_SECS),
            page_timeout: Duration::from_secs(constants::PAGE_TIMEOUT_SECS),
            file_timeout: Duration::from_secs(constants::FILE_TIMEOUT_SECS),
            lesson_delay: Duration::from_millis(delay_ms),
            output_dir: args.output.clone(),
            media_tool: args
                .yt_dlp_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_MEDIA_TOOL)),
            skip_videos: args.skip_videos,
            skip_materials: args.skip_materials,
        }
    }
}

#[cfg(feature = "testing")]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(5),
            page_timeout: Duration::from_secs(15),
            file_timeout: Duration::from_secs(15),
            lesson_delay: Duration::from_millis(0),
            output_dir: PathBuf::from("downloads"),
            media_tool: PathBuf::from(constants::DEFAULT_MEDIA_TOOL),
            skip_videos: false,
            skip_materials: false,
        }
    }
}
