// src/lib.rs

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod materializer;
pub mod media;
pub mod models;
pub mod profile;
pub mod selector;
pub mod symbols;
pub mod ui;
pub mod utils;
pub mod walker;

use crate::{
    cli::Cli,
    client::SessionClient,
    config::AppConfig,
    error::*,
    media::YtDlpDelegate,
    walker::CourseCrawler,
};
use log::{debug, info};
use std::sync::Arc;
use url::Url;

pub async fn run_from_cli(args: Arc<Cli>) -> AppResult<()> {
    logging::init(args.log_level);
    debug!("CLI arguments: {:?}", args);

    let profile = Arc::new(profile::load(&args.profile_dir, &args.platform)?);
    let config = Arc::new(AppConfig::new(&args, &profile));
    let course_url = Url::parse(&args.course_url)?;

    ui::print_header(&format!(
        "{} / {}",
        profile.platform_name, args.course_name
    ));

    let password = match &args.password {
        Some(password) => password.clone(),
        None => ui::prompt_hidden(&format!("Password for '{}'", args.username))?,
    };

    let client = SessionClient::new(&config)?;
    let media = Arc::new(YtDlpDelegate::new(config.media_tool.clone()));
    let mut crawler = CourseCrawler::new(
        profile.clone(),
        config,
        client,
        media,
        course_url,
        args.course_name.clone(),
    );

    info!("logging in to '{}' as '{}'", profile.platform_name, args.username);
    println!("Logging in to '{}'...", profile.platform_name);
    if !crawler.login(&args.username, &password).await? {
        return Err(AppError::LoginFailed(profile.platform_name.clone()));
    }

    crawler.walk().await?;
    Ok(())
}
