// GitHub API module.
// Client, endpoints, pagination, and retry for the followers/following lists.

pub mod client;
pub mod endpoints;
pub mod paginate;
pub mod retry;
pub mod types;

pub use client::GitHubClient;
pub use endpoints::validate_login;
pub use paginate::{PageSource, Paginator, ProfileSource};
pub use retry::{RetryPolicy, Retrying};
pub use types::*;
