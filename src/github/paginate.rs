// Pagination over follower/following endpoints.
// Walks page cursors until the upstream reports no further page.

use tracing::{debug, info, instrument};

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{FollowList, Page, PageCursor, Profile, RelationKind};

/// Anything that can serve single pages of a relation list.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_page(&self, owner: &str, kind: RelationKind, cursor: PageCursor)
    -> Result<Page>;
}

/// Anything that can look up a user's profile.
#[allow(async_fn_in_trait)]
pub trait ProfileSource {
    async fn fetch_profile(&self, login: &str) -> Result<Profile>;
}

impl PageSource for GitHubClient {
    async fn fetch_page(
        &self,
        owner: &str,
        kind: RelationKind,
        cursor: PageCursor,
    ) -> Result<Page> {
        self.get_follow_page(owner, kind, cursor).await
    }
}

impl ProfileSource for GitHubClient {
    async fn fetch_profile(&self, login: &str) -> Result<Profile> {
        self.get_user(login).await
    }
}

impl<T: PageSource + ?Sized> PageSource for &T {
    async fn fetch_page(
        &self,
        owner: &str,
        kind: RelationKind,
        cursor: PageCursor,
    ) -> Result<Page> {
        (**self).fetch_page(owner, kind, cursor).await
    }
}

impl<T: ProfileSource + ?Sized> ProfileSource for &T {
    async fn fetch_profile(&self, login: &str) -> Result<Profile> {
        (**self).fetch_profile(login).await
    }
}

/// Collects every page of a relation list into one [`FollowList`].
pub struct Paginator<S> {
    source: S,
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch all pages in upstream order.
    ///
    /// Stops on an empty page or when no next cursor is reported. Any page
    /// failure fails the whole call; partial lists are never returned.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self, owner: &str, kind: RelationKind) -> Result<FollowList> {
        let mut users = Vec::new();
        let mut cursor = PageCursor::FIRST;
        let mut requests = 0u32;

        loop {
            let page = self.source.fetch_page(owner, kind, cursor).await?;
            requests += 1;
            debug!(
                page = cursor.0,
                items = page.items.len(),
                remaining = page.rate_limit.remaining,
                "Received page"
            );

            if page.items.is_empty() {
                break;
            }
            users.extend(page.items);

            match page.next {
                // A cursor that does not advance would loop forever
                Some(next) if next > cursor => cursor = next,
                _ => break,
            }
        }

        info!(owner, %kind, total = users.len(), requests, "Fetched relation list");
        Ok(FollowList::new(owner, kind, users))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::error::FollowError;
    use crate::github::types::{RateLimit, User};

    /// In-memory upstream that serves `total` users in pages of `page_size`.
    pub(crate) struct FakeUpstream {
        pub total: usize,
        pub page_size: usize,
        pub fail_on_page: Option<u32>,
        pub requests: Cell<u32>,
    }

    impl FakeUpstream {
        pub(crate) fn new(total: usize, page_size: usize) -> Self {
            Self {
                total,
                page_size,
                fail_on_page: None,
                requests: Cell::new(0),
            }
        }
    }

    impl PageSource for FakeUpstream {
        async fn fetch_page(
            &self,
            owner: &str,
            kind: RelationKind,
            cursor: PageCursor,
        ) -> Result<Page> {
            self.requests.set(self.requests.get() + 1);
            if self.fail_on_page == Some(cursor.0) {
                return Err(FollowError::RateLimitExceeded { reset_at: None });
            }

            let start = (cursor.0 as usize - 1) * self.page_size;
            let end = (start + self.page_size).min(self.total);
            let items: Vec<User> = (start..end)
                .map(|i| User::new(format!("{owner}-{kind}-{i}")))
                .collect();
            let next = (end < self.total).then(|| cursor.next());

            Ok(Page {
                items,
                next,
                rate_limit: RateLimit::default(),
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_all_makes_one_request_per_page() {
        for (total, expected_requests) in [(250, 3), (200, 2), (1, 1), (100, 1)] {
            let upstream = FakeUpstream::new(total, 100);
            let list = Paginator::new(&upstream)
                .fetch_all("octocat", RelationKind::Followers)
                .await
                .unwrap();

            assert_eq!(list.len(), total);
            assert_eq!(upstream.requests.get(), expected_requests);
        }
    }

    #[tokio::test]
    async fn test_fetch_all_preserves_upstream_order() {
        let upstream = FakeUpstream::new(7, 3);
        let list = Paginator::new(&upstream)
            .fetch_all("octocat", RelationKind::Following)
            .await
            .unwrap();

        let logins: Vec<&str> = list.logins().collect();
        let expected: Vec<String> = (0..7).map(|i| format!("octocat-following-{i}")).collect();
        assert_eq!(logins, expected);
        assert_eq!(list.owner, "octocat");
        assert_eq!(list.kind, RelationKind::Following);
    }

    #[tokio::test]
    async fn test_empty_list_stops_after_first_page() {
        let upstream = FakeUpstream::new(0, 100);
        let list = Paginator::new(&upstream)
            .fetch_all("octocat", RelationKind::Followers)
            .await
            .unwrap();

        assert!(list.is_empty());
        assert_eq!(upstream.requests.get(), 1);
    }

    #[tokio::test]
    async fn test_mid_pagination_failure_returns_no_partial_list() {
        let mut upstream = FakeUpstream::new(500, 100);
        upstream.fail_on_page = Some(3);

        let err = Paginator::new(&upstream)
            .fetch_all("octocat", RelationKind::Followers)
            .await
            .unwrap_err();

        assert!(matches!(err, FollowError::RateLimitExceeded { .. }));
        assert_eq!(upstream.requests.get(), 3);
    }

    struct StuckCursor;

    impl PageSource for StuckCursor {
        async fn fetch_page(&self, _: &str, _: RelationKind, cursor: PageCursor) -> Result<Page> {
            Ok(Page {
                items: vec![User::new("loop")],
                next: Some(cursor),
                rate_limit: RateLimit::default(),
            })
        }
    }

    #[tokio::test]
    async fn test_non_advancing_cursor_terminates() {
        let list = Paginator::new(StuckCursor)
            .fetch_all("octocat", RelationKind::Followers)
            .await
            .unwrap();
        assert_eq!(list.len(), 1);
    }
}
