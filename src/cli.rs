// Command-line interface definition.
// Parsed with clap's derive API.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_API_URL, DEFAULT_CACHE_TTL, DEFAULT_EXPORT_DIR};
use crate::export::ExportFormat;

#[derive(Debug, Parser)]
#[command(name = "followback", version)]
#[command(about = "Analyze who does and doesn't follow you back on GitHub", long_about = None)]
pub struct Cli {
    /// GitHub username to analyze
    pub username: String,

    /// GitHub API token (falls back to GITHUB_TOKEN, then an interactive prompt)
    #[arg(short, long)]
    pub token: Option<String>,

    /// Never prompt for a token
    #[arg(long)]
    pub no_prompt: bool,

    /// Disable caching of API responses
    #[arg(long)]
    pub no_cache: bool,

    /// Clear existing cached data before running
    #[arg(long)]
    pub clear_cache: bool,

    /// Cache directory (defaults to the platform cache dir)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Maximum age of cached data in seconds
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL.as_secs())]
    pub cache_ttl: u64,

    /// Maximum number of users to display in lists
    #[arg(long, default_value_t = 10)]
    pub max_display: usize,

    /// Directory for exported files
    #[arg(long, default_value = DEFAULT_EXPORT_DIR)]
    pub export_dir: PathBuf,

    /// Export format for user lists
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub export_format: ExportFormat,

    /// Also export mutual followers and the full followers/following lists
    #[arg(long)]
    pub export_all: bool,

    /// Skip writing export files
    #[arg(long, conflicts_with = "export_all")]
    pub no_export: bool,

    /// Retry transient network failures this many times
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// GitHub API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
