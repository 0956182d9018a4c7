// Error types for followback.
// Covers GitHub API failures, cache problems, and export write errors.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FollowError {
    #[error("GitHub user not found: {0}")]
    UserNotFound(String),

    #[error("GitHub API rate limit exceeded{}", describe_reset(.reset_at))]
    RateLimitExceeded { reset_at: Option<DateTime<Utc>> },

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid GitHub username: {0:?}")]
    InvalidUsername(String),

    #[error("Failed to write {}: {source}", .path.display())]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unreadable cache entry {}: {reason}", .path.display())]
    CacheCorruption { path: PathBuf, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FollowError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, FollowError::Transport(_))
    }

    pub(crate) fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FollowError::IoWrite {
            path: path.into(),
            source,
        }
    }
}

fn describe_reset(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(at) => format!(", resets at {}", at.format("%H:%M:%S UTC")),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, FollowError>;
