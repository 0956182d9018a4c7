// GitHub API endpoint functions.
// Typed calls for user profiles and follower/following pages.

use reqwest::header::LINK;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{FollowError, Result};

use super::client::{GitHubClient, rate_limit_from_headers};
use super::types::{Page, PageCursor, Profile, RelationKind, User};

/// Longest login accepted before issuing a request.
const MAX_LOGIN_LEN: usize = 100;

impl GitHubClient {
    /// Get the public profile of a user.
    #[instrument(skip(self))]
    pub async fn get_user(&self, login: &str) -> Result<Profile> {
        validate_login(login)?;
        let no_params: [(&str, &str); 0] = [];
        let response = self
            .get_with_params(&format!("/users/{}", login), &no_params, login)
            .await?;
        let body = response.text().await?;
        let profile: Profile = serde_json::from_str(&body)?;
        Ok(profile)
    }

    /// Get one page of an owner's followers or following list.
    ///
    /// The next cursor comes from the `Link` header when GitHub sends one;
    /// otherwise a full page implies another page may follow.
    #[instrument(skip(self), fields(page = cursor.0))]
    pub async fn get_follow_page(
        &self,
        owner: &str,
        kind: RelationKind,
        cursor: PageCursor,
    ) -> Result<Page> {
        validate_login(owner)?;
        let params = [
            ("per_page", self.per_page().to_string()),
            ("page", cursor.0.to_string()),
        ];
        let response = self
            .get_with_params(&format!("/users/{}/{}", owner, kind), &params, owner)
            .await?;

        let rate_limit = rate_limit_from_headers(response.headers());
        let link = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await?;
        let items: Vec<User> = serde_json::from_str(&body)?;

        let next = if items.is_empty() {
            None
        } else {
            match link {
                Some(link) => next_cursor_from_link(&link),
                None if items.len() >= self.per_page() as usize => Some(cursor.next()),
                None => None,
            }
        };

        debug!(items = items.len(), next = ?next, "Fetched page");
        Ok(Page {
            items,
            next,
            rate_limit,
        })
    }
}

/// Reject logins that could not name a GitHub account or would escape the URL path.
pub fn validate_login(login: &str) -> Result<()> {
    let valid = !login.is_empty()
        && login.len() <= MAX_LOGIN_LEN
        && login
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '[' | ']'));

    if valid {
        Ok(())
    } else {
        Err(FollowError::InvalidUsername(login.to_string()))
    }
}

/// Extract the `page` parameter of the `rel="next"` target in a `Link` header.
fn next_cursor_from_link(link: &str) -> Option<PageCursor> {
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts
            .next()?
            .trim()
            .strip_prefix('<')?
            .strip_suffix('>')?;
        if !parts.any(|p| p.trim() == r#"rel="next""#) {
            return None;
        }

        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
            .map(PageCursor)
    })
}
