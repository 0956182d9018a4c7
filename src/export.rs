// Export of analysis results to CSV and JSON files.
// Every file is written atomically; one failed file does not stop the others.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analyze::{AnalysisResult, Summary};
use crate::config::ExportConfig;
use crate::error::Result;
use crate::fs::write_atomic;
use crate::github::{FollowList, User};

/// Column order for CSV user lists.
pub const CSV_COLUMNS: [&str; 6] = [
    "login",
    "profile_url",
    "name",
    "type",
    "created_at",
    "public_repos",
];

/// Output format for user lists. Summaries are always JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A file produced by an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub format: ExportFormat,
    /// Number of users written, or 1 for a summary.
    pub records: usize,
}

/// One exported row. Field order matches [`CSV_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub login: String,
    pub profile_url: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub account_type: String,
    pub created_at: Option<DateTime<Utc>>,
    pub public_repos: Option<u64>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            login: user.login.clone(),
            profile_url: user.profile_url(),
            name: user.display_name.clone(),
            account_type: user.account_type.as_str().to_string(),
            created_at: user.account_created_at,
            public_repos: user.public_repo_count,
        }
    }
}

/// Write a list of users to `path` in `format`.
pub fn export_users<'a>(
    users: impl IntoIterator<Item = &'a User>,
    path: &Path,
    format: ExportFormat,
) -> Result<ExportArtifact> {
    let records: Vec<UserRecord> = users.into_iter().map(UserRecord::from).collect();

    let contents = match format {
        ExportFormat::Json => serde_json::to_vec_pretty(&records)?,
        ExportFormat::Csv => to_csv(&records)?,
    };
    write_atomic(path, &contents)?;

    Ok(ExportArtifact {
        path: path.to_path_buf(),
        format,
        records: records.len(),
    })
}

/// Write the summary as pretty-printed JSON.
pub fn export_summary(summary: &Summary, path: &Path) -> Result<ExportArtifact> {
    let contents = serde_json::to_vec_pretty(summary)?;
    write_atomic(path, &contents)?;

    Ok(ExportArtifact {
        path: path.to_path_buf(),
        format: ExportFormat::Json,
        records: 1,
    })
}

fn to_csv(records: &[UserRecord]) -> Result<Vec<u8>> {
    // Header is written by hand so an empty list still gets one
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| crate::error::FollowError::Io(e.into_error()))
}

/// Result of exporting one file in a run.
#[derive(Debug)]
pub struct ExportOutcome {
    /// Short description, e.g. "not following back".
    pub label: &'static str,
    pub path: PathBuf,
    pub result: Result<ExportArtifact>,
}

/// True when at least one export file could not be written.
pub fn any_failed(outcomes: &[ExportOutcome]) -> bool {
    outcomes.iter().any(|outcome| outcome.result.is_err())
}

/// Writes the per-run set of export files into a directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
    format: ExportFormat,
    all: bool,
}

impl Exporter {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            format: config.format,
            all: config.all,
        }
    }

    /// Path of `{owner}_{name}.{ext}` in the export directory.
    pub fn path_for(&self, owner: &str, name: &str, format: ExportFormat) -> PathBuf {
        self.dir
            .join(format!("{}_{}.{}", owner, name, format.extension()))
    }

    /// Export the summary, both difference lists, and with `all` the mutual
    /// and full lists. Each file is attempted regardless of earlier failures.
    pub fn export_run(
        &self,
        owner: &str,
        summary: &Summary,
        analysis: &AnalysisResult<'_>,
        followers: &FollowList,
        following: &FollowList,
    ) -> Vec<ExportOutcome> {
        let mut outcomes = Vec::new();

        let path = self.path_for(owner, "summary", ExportFormat::Json);
        let result = export_summary(summary, &path);
        outcomes.push(self.finish("summary", path, result));

        let mut lists: Vec<(&'static str, &'static str, Vec<&User>)> = vec![
            (
                "not following back",
                "not_following_back",
                analysis.not_following_back.clone(),
            ),
            (
                "not followed back",
                "not_following",
                analysis.not_followed_back.clone(),
            ),
        ];
        if self.all {
            lists.push(("mutual", "mutual_followers", analysis.mutual.clone()));
            lists.push(("all followers", "all_followers", followers.users.iter().collect()));
            lists.push(("all following", "all_following", following.users.iter().collect()));
        }

        for (label, name, users) in lists {
            let path = self.path_for(owner, name, self.format);
            let result = export_users(users, &path, self.format);
            outcomes.push(self.finish(label, path, result));
        }

        outcomes
    }

    fn finish(
        &self,
        label: &'static str,
        path: PathBuf,
        result: Result<ExportArtifact>,
    ) -> ExportOutcome {
        match &result {
            Ok(artifact) => info!(label, path = %path.display(), records = artifact.records, "Exported"),
            Err(e) => warn!(label, path = %path.display(), error = %e, "Export failed"),
        }
        ExportOutcome {
            label,
            path,
            result,
        }
    }
}
