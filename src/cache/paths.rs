// Cache path utilities.
// Builds filesystem paths for cached profiles and relation lists under a root directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::github::RelationKind;

/// Platform cache directory (~/.cache/followback on Linux).
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "followback").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Layout of cache files below an explicit root directory.
///
/// ```text
/// <root>/owners/<login>/profile.json
/// <root>/owners/<login>/followers.json
/// <root>/owners/<login>/following.json
/// ```
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every owner's entries.
    pub fn owners_dir(&self) -> PathBuf {
        self.root.join("owners")
    }

    /// Path to an owner's directory.
    pub fn owner_dir(&self, owner: &str) -> PathBuf {
        self.owners_dir().join(sanitize_name(owner))
    }

    /// Path to an owner's cached profile.
    pub fn profile_path(&self, owner: &str) -> PathBuf {
        self.owner_dir(owner).join("profile.json")
    }

    /// Path to an owner's cached followers or following list.
    pub fn relation_path(&self, owner: &str, kind: RelationKind) -> PathBuf {
        self.owner_dir(owner).join(format!("{}.json", kind.as_str()))
    }
}

/// Sanitize a login for use in filesystem paths.
/// Logins are case-insensitive on GitHub, so the key is lowercased.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '.' => '_',
            _ => c.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("simple"), "simple");
        assert_eq!(sanitize_name("OctoCat"), "octocat");
        assert_eq!(sanitize_name("with/slash"), "with_slash");
        assert_eq!(sanitize_name(".."), "__");
    }

    #[test]
    fn test_cache_paths() {
        let layout = CacheLayout::new("/tmp/followback");

        let profile = layout.profile_path("octocat");
        assert!(profile.ends_with("owners/octocat/profile.json"));

        let followers = layout.relation_path("octocat", RelationKind::Followers);
        assert!(followers.ends_with("owners/octocat/followers.json"));

        let following = layout.relation_path("Octocat", RelationKind::Following);
        assert!(following.ends_with("owners/octocat/following.json"));

        assert!(layout.owner_dir("octocat").starts_with(layout.root()));
    }
}
