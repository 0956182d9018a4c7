// GitHub API HTTP client.
// Handles authentication, rate limit detection, and status-to-error mapping.

use std::sync::RwLock;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT},
};
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{FollowError, Result};

use super::types::RateLimit;

const GITHUB_API_VERSION: &str = "2022-11-28";

/// Remaining-request count below which a warning is logged.
const LOW_RATE_LIMIT: u64 = 5;

/// GitHub API client with optional authentication and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    per_page: u32,
    rate_limit: RwLock<RateLimit>,
}

impl GitHubClient {
    /// Create a client from configuration. Requests are unauthenticated when no token is set.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| FollowError::Unauthorized)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("followback"));
        headers.insert(USER_AGENT, user_agent);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            per_page: config.per_page.max(1),
            rate_limit: RwLock::new(RateLimit::default()),
        })
    }

    /// Page size sent with every list request.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Most recently observed rate limit.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
            .read()
            .map(|rl| *rl)
            .unwrap_or_default()
    }

    /// Make a GET request with query parameters.
    ///
    /// `subject` names the user the request is about and is reported in
    /// [`FollowError::UserNotFound`] on a 404.
    #[instrument(skip(self, params))]
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
        subject: &str,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.client.get(&url).query(params).send().await?;

        let rate_limit = rate_limit_from_headers(response.headers());
        self.update_rate_limit(rate_limit);
        self.check_response(response, subject).await
    }

    fn update_rate_limit(&self, rate_limit: RateLimit) {
        if rate_limit.limit == 0 {
            return;
        }

        if rate_limit.remaining < LOW_RATE_LIMIT {
            warn!(
                remaining = rate_limit.remaining,
                limit = rate_limit.limit,
                reset_at = ?rate_limit.reset_at(),
                "GitHub API rate limit almost exhausted"
            );
        }

        if let Ok(mut current) = self.rate_limit.write() {
            *current = rate_limit;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response, subject: &str) -> Result<Response> {
        let status = response.status();
        debug!(status = status.as_u16(), "GitHub API response");

        match status {
            s if s.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(FollowError::Unauthorized),
            StatusCode::NOT_FOUND => Err(FollowError::UserNotFound(subject.to_string())),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                if let Some(reset_at) = rate_limit_reset(status, response.headers()) {
                    return Err(FollowError::RateLimitExceeded { reset_at });
                }
                Err(FollowError::Api {
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                })
            }
            status => Err(FollowError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

/// Parse the `x-ratelimit-*` headers. Missing headers read as zero.
pub fn rate_limit_from_headers(headers: &HeaderMap) -> RateLimit {
    RateLimit {
        limit: header_u64(headers, "x-ratelimit-limit").unwrap_or(0),
        remaining: header_u64(headers, "x-ratelimit-remaining").unwrap_or(0),
        reset: header_u64(headers, "x-ratelimit-reset").unwrap_or(0),
    }
}

/// Decide whether a 403/429 is a rate limit rejection.
///
/// Returns `Some(reset_at)` when it is: the primary limit reports zero
/// remaining requests, a secondary limit sends `retry-after`, or the status
/// is 429. The inner option is the reset time when one is known.
fn rate_limit_reset(
    status: StatusCode,
    headers: &HeaderMap,
) -> Option<Option<DateTime<Utc>>> {
    let exhausted = header_u64(headers, "x-ratelimit-remaining") == Some(0);
    let retry_after = header_u64(headers, RETRY_AFTER.as_str());

    if !exhausted && retry_after.is_none() && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    let reset_at = retry_after
        .and_then(retry_after_deadline)
        .or_else(|| rate_limit_from_headers(headers).reset_at());
    Some(reset_at)
}

/// `now + secs`, or `None` when the delay does not fit a timestamp.
fn retry_after_deadline(secs: u64) -> Option<DateTime<Utc>> {
    let delay = TimeDelta::try_seconds(i64::try_from(secs).ok()?)?;
    Utc::now().checked_add_signed(delay)
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
