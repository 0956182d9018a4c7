// Follower tracker.
// Loads a user's profile and both relation lists, preferring fresh cache entries.

use tracing::{info, instrument, warn};

use crate::cache::FollowCache;
use crate::error::Result;
use crate::github::{
    FollowList, PageSource, Paginator, Profile, ProfileSource, RelationKind, validate_login,
};

/// Everything fetched for one owner in one run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub profile: Profile,
    pub followers: FollowList,
    pub following: FollowList,
}

/// Cache-aware loader over a GitHub source.
pub struct Tracker<S> {
    source: S,
    cache: FollowCache,
}

impl<S: PageSource + ProfileSource> Tracker<S> {
    pub fn new(source: S, cache: FollowCache) -> Self {
        Self { source, cache }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &FollowCache {
        &self.cache
    }

    /// Load profile, followers, and following for `owner`.
    ///
    /// The profile is resolved first so an unknown user fails before any
    /// pagination. The two lists are then fetched concurrently.
    #[instrument(skip(self))]
    pub async fn snapshot(&self, owner: &str) -> Result<Snapshot> {
        validate_login(owner)?;

        let profile = self.load_profile(owner).await?;
        let (followers, following) = tokio::try_join!(
            self.load_relation(owner, RelationKind::Followers),
            self.load_relation(owner, RelationKind::Following),
        )?;

        Ok(Snapshot {
            profile,
            followers,
            following,
        })
    }

    async fn load_profile(&self, owner: &str) -> Result<Profile> {
        if let Some(profile) = self.cache.get_profile(owner) {
            info!(owner, "Using cached profile");
            return Ok(profile);
        }

        info!(owner, "Fetching user data");
        let profile = self.source.fetch_profile(owner).await?;
        if let Err(e) = self.cache.put_profile(owner, &profile) {
            warn!(owner, error = %e, "Failed to cache profile");
        }
        Ok(profile)
    }

    async fn load_relation(&self, owner: &str, kind: RelationKind) -> Result<FollowList> {
        if let Some(list) = self.cache.get(owner, kind) {
            info!(owner, %kind, count = list.len(), "Using cached list");
            return Ok(list);
        }

        info!(owner, %kind, "Fetching list");
        let list = Paginator::new(&self.source).fetch_all(owner, kind).await?;
        if let Err(e) = self.cache.put(owner, kind, &list) {
            warn!(owner, %kind, error = %e, "Failed to cache list");
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    use crate::config::CacheConfig;
    use crate::error::FollowError;
    use crate::github::paginate::tests::FakeUpstream;
    use crate::github::{Page, PageCursor};
    use tempfile::TempDir;

    /// FakeUpstream plus a profile endpoint that can report a missing user.
    struct FakeGitHub {
        pages: FakeUpstream,
        exists: bool,
        profile_calls: Cell<u32>,
    }

    impl FakeGitHub {
        fn new(total: usize, exists: bool) -> Self {
            Self {
                pages: FakeUpstream::new(total, 2),
                exists,
                profile_calls: Cell::new(0),
            }
        }
    }

    impl PageSource for FakeGitHub {
        async fn fetch_page(
            &self,
            owner: &str,
            kind: RelationKind,
            cursor: PageCursor,
        ) -> Result<Page> {
            self.pages.fetch_page(owner, kind, cursor).await
        }
    }

    impl ProfileSource for FakeGitHub {
        async fn fetch_profile(&self, login: &str) -> Result<Profile> {
            self.profile_calls.set(self.profile_calls.get() + 1);
            if !self.exists {
                return Err(FollowError::UserNotFound(login.to_string()));
            }
            Ok(Profile {
                login: login.to_string(),
                name: None,
                created_at: None,
                public_repos: 0,
                public_gists: 0,
                followers: 0,
                following: 0,
            })
        }
    }

    fn cache_in(dir: &TempDir, enabled: bool) -> FollowCache {
        FollowCache::new(&CacheConfig {
            dir: dir.path().to_path_buf(),
            ttl: Duration::from_secs(3600),
            enabled,
        })
    }

    #[tokio::test]
    async fn test_second_snapshot_is_served_from_cache() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = Tracker::new(FakeGitHub::new(5, true), cache_in(&temp_dir, true));

        let first = tracker.snapshot("octocat").await.unwrap();
        assert_eq!(first.followers.len(), 5);
        assert_eq!(first.following.len(), 5);
        // 3 pages of 2 for each list
        assert_eq!(tracker.source.pages.requests.get(), 6);

        let second = tracker.snapshot("octocat").await.unwrap();
        assert_eq!(second.followers, first.followers);
        assert_eq!(second.following, first.following);
        assert_eq!(tracker.source.pages.requests.get(), 6);
        assert_eq!(tracker.source.profile_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_fetches() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = Tracker::new(FakeGitHub::new(1, true), cache_in(&temp_dir, false));

        tracker.snapshot("octocat").await.unwrap();
        tracker.snapshot("octocat").await.unwrap();
        assert_eq!(tracker.source.pages.requests.get(), 4);
        assert_eq!(tracker.source.profile_calls.get(), 2);
    }

    #[tokio::test]
    async fn test_unknown_user_fails_before_pagination() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = Tracker::new(FakeGitHub::new(5, false), cache_in(&temp_dir, true));

        let err = tracker.snapshot("ghost").await.unwrap_err();
        assert!(matches!(err, FollowError::UserNotFound(ref l) if l == "ghost"));
        assert_eq!(tracker.source.pages.requests.get(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_no_cache_entry() {
        let temp_dir = TempDir::new().unwrap();
        let mut github = FakeGitHub::new(6, true);
        github.pages.fail_on_page = Some(2);
        let tracker = Tracker::new(github, cache_in(&temp_dir, true));

        assert!(tracker.snapshot("octocat").await.is_err());
        assert_eq!(tracker.cache().get("octocat", RelationKind::Followers), None);
        assert_eq!(tracker.cache().get("octocat", RelationKind::Following), None);
    }
}
