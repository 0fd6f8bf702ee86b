// src/cli.rs

use crate::constants;
use clap::{crate_version, Parser, ValueEnum};
use std::path::PathBuf;

/// Log output level for the hidden debug log file.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Platform profile name (loads '{profile-dir}/{NAME}.json')
    pub platform: String,
    /// Course root URL where modules and lessons are listed
    pub course_url: String,
    /// Name used for this course's folder under the output directory
    pub course_name: String,
    /// Username or e-mail for the platform login
    pub username: String,

    /// Password; prompted for interactively (hidden) when omitted
    #[arg(short, long, help_heading = "Options")]
    pub password: Option<String>,
    /// Base directory where the course folder is created
    #[arg(short, long, value_name = "DIR", default_value_os_t = PathBuf::from(constants::DEFAULT_SAVE_DIR), help_heading = "Options")]
    pub output: PathBuf,
    /// Directory holding platform profile JSON files
    #[arg(long, value_name = "DIR", default_value_os_t = PathBuf::from(constants::DEFAULT_PROFILE_DIR), help_heading = "Options")]
    pub profile_dir: PathBuf,
    /// Full path to the yt-dlp executable when it is not on PATH
    #[arg(long, value_name = "PATH", help_heading = "Options")]
    pub yt_dlp_path: Option<PathBuf>,
    /// Skip video retrieval, downloading only supporting materials
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub skip_videos: bool,
    /// Skip supporting materials, downloading only videos
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub skip_materials: bool,
    /// Override the pause between lesson page fetches
    #[arg(long, value_name = "MS", help_heading = "Options")]
    pub delay_ms: Option<u64>,

    /// (hidden) log file output level, for debugging
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}
