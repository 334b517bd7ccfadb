use clap::{Parser, Subcommand};

pub mod error;
pub mod handler;
pub mod output;

/// Video Download Assistant - terminal companion for a local yt-dlp download server
#[derive(Parser, Debug)]
#[command(name = "vda")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Override config directory path
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<std::path::PathBuf>,

    /// Enable verbose logging (TRACE level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Page to watch when the TUI opens
    #[arg(value_name = "PAGE_URL")]
    pub page_url: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe the download server once
    Status,

    /// Show the server's download queue
    Queue {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract a page and submit it for download
    Grab {
        /// Page to extract
        page_url: String,

        /// yt-dlp quality selector (e.g. best, bestaudio, "best[height<=720]")
        #[arg(long)]
        quality: Option<String>,

        /// Container format (mp4, mkv, webm, mp3)
        #[arg(long)]
        format: Option<String>,
    },
}
