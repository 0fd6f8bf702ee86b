// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use course_dl::{cli::Cli, run_from_cli};
use std::{env, sync::Arc, time::Duration};

#[tokio::main]
async fn main() {
    // Enables ANSI color support in Windows terminals.
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.unwrap();
        println!("\n{} Interrupted by the user.", "[!]".yellow());
        tokio::time::sleep(Duration::from_millis(100)).await;
        std::process::exit(130);
    });

    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| "course-dl".to_string());

    let after_help = format!(
        "Examples:\n  # Download a whole course (prompts for the password)\n  {bin} my_platform \"https://edu.example.com/course/42\" \"My Course\" ana@example.com\n\n  # Materials only, with a custom output directory\n  {bin} my_platform \"https://edu.example.com/course/42\" \"My Course\" ana@example.com --skip-videos -o ~/courses\n\n  # Point at a yt-dlp binary that is not on PATH\n  {bin} my_platform \"https://edu.example.com/course/42\" \"My Course\" ana@example.com --yt-dlp-path /opt/yt-dlp/yt-dlp",
        bin = bin_name
    );

    let cmd = Cli::command().after_help(after_help);

    let args = Arc::new(Cli::from_arg_matches(&cmd.get_matches()).unwrap());

    if let Err(e) = run_from_cli(args).await {
        eprintln!("\n{} {}", "[X]".red(), format!("Run failed: {}", e).red());
        std::process::exit(1);
    }
}
