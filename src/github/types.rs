// GitHub API data types.
// Users, profiles, relation lists, and pagination metadata.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base URL for public GitHub profile pages.
pub const GITHUB_WEB_BASE: &str = "https://github.com";

/// Account type discriminator (user, organization, or bot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AccountType {
    #[default]
    User,
    Organization,
    Bot,
    #[serde(other)]
    Unknown,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::User => "User",
            AccountType::Organization => "Organization",
            AccountType::Bot => "Bot",
            AccountType::Unknown => "Unknown",
        }
    }
}

/// A GitHub account as it appears in a followers/following list.
///
/// Identity is the `login`; the optional attributes are only filled when the
/// upstream payload carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(rename = "name", default)]
    pub display_name: Option<String>,
    #[serde(rename = "type", default)]
    pub account_type: AccountType,
    #[serde(rename = "created_at", default)]
    pub account_created_at: Option<DateTime<Utc>>,
    #[serde(rename = "public_repos", default)]
    pub public_repo_count: Option<u64>,
}

impl User {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            display_name: None,
            account_type: AccountType::User,
            account_created_at: None,
            public_repo_count: None,
        }
    }

    /// Public profile page, derived from the login.
    pub fn profile_url(&self) -> String {
        format!("{}/{}", GITHUB_WEB_BASE, self.login)
    }
}

/// Full profile returned by `GET /users/{login}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub public_gists: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
}

/// Which side of the follow graph a list describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Accounts that follow the owner.
    Followers,
    /// Accounts the owner follows.
    Following,
}

impl RelationKind {
    /// Path segment used by the REST endpoint and the cache layout.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Followers => "followers",
            RelationKind::Following => "following",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete, ordered relation list for one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowList {
    pub owner: String,
    pub kind: RelationKind,
    pub users: Vec<User>,
}

impl FollowList {
    pub fn new(owner: impl Into<String>, kind: RelationKind, users: Vec<User>) -> Self {
        Self {
            owner: owner.into(),
            kind,
            users,
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn logins(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(|u| u.login.as_str())
    }
}

/// 1-based page number used as the pagination cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageCursor(pub u32);

impl PageCursor {
    pub const FIRST: PageCursor = PageCursor(1);

    pub fn next(self) -> PageCursor {
        PageCursor(self.0 + 1)
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::FIRST
    }
}

/// One page of a relation list.
#[derive(Debug, Clone)]
pub struct Page {
    pub items: Vec<User>,
    pub next: Option<PageCursor>,
    pub rate_limit: RateLimit,
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    /// Epoch seconds at which the window resets.
    pub reset: u64,
}

impl RateLimit {
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        if self.reset == 0 {
            return None;
        }
        DateTime::from_timestamp(i64::try_from(self.reset).ok()?, 0)
    }
}
