// followback library.
// Fetches a GitHub user's followers and following, compares them, and exports the result.

pub mod analyze;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fs;
pub mod github;
pub mod report;
pub mod tracker;

pub use analyze::{AnalysisResult, FollowStats, Summary, analyze};
pub use cache::FollowCache;
pub use config::{Config, CredentialChain, CredentialSource};
pub use error::{FollowError, Result};
pub use export::{ExportArtifact, ExportFormat, ExportOutcome, Exporter, any_failed};
pub use github::{FollowList, GitHubClient, Paginator, RelationKind, RetryPolicy, Retrying, User};
pub use report::{ConsoleSink, Report, ResultSink};
pub use tracker::{Snapshot, Tracker};
