// Follow relationship analysis.
// Set differences between followers and following, plus summary statistics.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::github::{FollowList, Profile, User};

/// Partition of `followers ∪ following` by login.
///
/// Borrows the users from the two input lists. Each login lands in exactly
/// one of the three collections.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult<'a> {
    /// Followed by the owner, not following back. In `following` order.
    pub not_following_back: Vec<&'a User>,
    /// Following the owner, not followed back. In `followers` order.
    pub not_followed_back: Vec<&'a User>,
    /// Both directions. In `followers` order.
    pub mutual: Vec<&'a User>,
    pub stats: FollowStats,
}

/// Counts and ratios derived from an analysis.
///
/// Ratios are `None` when their denominator is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowStats {
    pub total_followers: usize,
    pub total_following: usize,
    pub mutual_count: usize,
    pub not_following_back_count: usize,
    pub not_followed_back_count: usize,
    /// followers / following.
    pub follow_ratio: Option<f64>,
    /// mutual / max(followers, following), in percent.
    pub mutual_percentage: Option<f64>,
    /// not_following_back / following, in percent.
    pub not_following_back_percentage: Option<f64>,
    /// not_followed_back / followers, in percent.
    pub not_followed_back_percentage: Option<f64>,
}

/// Compare two relation snapshots by login.
pub fn analyze<'a>(followers: &'a FollowList, following: &'a FollowList) -> AnalysisResult<'a> {
    let follower_logins: HashSet<&str> = followers.logins().collect();
    let following_logins: HashSet<&str> = following.logins().collect();

    let not_following_back = select(following, |login| !follower_logins.contains(login));
    let not_followed_back = select(followers, |login| !following_logins.contains(login));
    let mutual = select(followers, |login| following_logins.contains(login));

    let total_followers = follower_logins.len();
    let total_following = following_logins.len();

    let stats = FollowStats {
        total_followers,
        total_following,
        mutual_count: mutual.len(),
        not_following_back_count: not_following_back.len(),
        not_followed_back_count: not_followed_back.len(),
        follow_ratio: ratio(total_followers, total_following),
        mutual_percentage: percentage(mutual.len(), total_followers.max(total_following)),
        not_following_back_percentage: percentage(not_following_back.len(), total_following),
        not_followed_back_percentage: percentage(not_followed_back.len(), total_followers),
    };

    AnalysisResult {
        not_following_back,
        not_followed_back,
        mutual,
        stats,
    }
}

/// Users of `list` whose login passes `keep`, first occurrence only.
fn select<'a>(list: &'a FollowList, keep: impl Fn(&str) -> bool) -> Vec<&'a User> {
    let mut seen = HashSet::new();
    list.users
        .iter()
        .filter(|user| keep(&user.login) && seen.insert(user.login.as_str()))
        .collect()
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

fn percentage(part: usize, whole: usize) -> Option<f64> {
    ratio(part, whole).map(|r| r * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Account overview combining the profile with the follow statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub username: String,
    pub name: Option<String>,
    #[serde(flatten)]
    pub stats: FollowStats,
    pub join_date: Option<DateTime<Utc>>,
    pub account_age_days: Option<i64>,
    pub public_repos: u64,
    pub public_gists: u64,
}

impl Summary {
    /// Build a summary as of `now`. Ratios are rounded to two decimals.
    pub fn new(profile: &Profile, stats: &FollowStats, now: DateTime<Utc>) -> Self {
        let rounded = FollowStats {
            follow_ratio: stats.follow_ratio.map(round2),
            mutual_percentage: stats.mutual_percentage.map(round2),
            not_following_back_percentage: stats.not_following_back_percentage.map(round2),
            not_followed_back_percentage: stats.not_followed_back_percentage.map(round2),
            ..stats.clone()
        };

        Self {
            username: profile.login.clone(),
            name: profile.name.clone(),
            stats: rounded,
            join_date: profile.created_at,
            account_age_days: profile
                .created_at
                .map(|created| now.signed_duration_since(created).num_days()),
            public_repos: profile.public_repos,
            public_gists: profile.public_gists,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::RelationKind;

    fn list(kind: RelationKind, logins: &[&str]) -> FollowList {
        FollowList::new(
            "octocat",
            kind,
            logins.iter().map(|l| User::new(*l)).collect(),
        )
    }

    fn logins<'a>(users: &[&'a User]) -> Vec<&'a str> {
        users.iter().map(|u| u.login.as_str()).collect()
    }

    #[test]
    fn test_octocat_scenario() {
        let followers = list(RelationKind::Followers, &["a", "b", "c"]);
        let following = list(RelationKind::Following, &["b", "c", "d"]);

        let result = analyze(&followers, &following);

        assert_eq!(logins(&result.not_following_back), ["d"]);
        assert_eq!(logins(&result.not_followed_back), ["a"]);
        assert_eq!(logins(&result.mutual), ["b", "c"]);

        let stats = &result.stats;
        assert_eq!(stats.total_followers, 3);
        assert_eq!(stats.total_following, 3);
        assert_eq!(stats.follow_ratio, Some(1.0));
        assert_eq!(stats.not_following_back_count, 1);
        assert_eq!(stats.not_followed_back_count, 1);
        assert_eq!(stats.mutual_count, 2);
    }

    #[test]
    fn test_sets_partition_union() {
        let followers = list(RelationKind::Followers, &["a", "b", "c", "e", "f"]);
        let following = list(RelationKind::Following, &["f", "b", "g", "h"]);

        let result = analyze(&followers, &following);

        let nfb: HashSet<&str> = logins(&result.not_following_back).into_iter().collect();
        let nfd: HashSet<&str> = logins(&result.not_followed_back).into_iter().collect();
        let mutual: HashSet<&str> = logins(&result.mutual).into_iter().collect();

        assert!(nfb.is_disjoint(&nfd));
        assert!(nfb.is_disjoint(&mutual));
        assert!(nfd.is_disjoint(&mutual));

        let union: HashSet<&str> = followers.logins().chain(following.logins()).collect();
        let covered: HashSet<&str> = nfb.iter().chain(&nfd).chain(&mutual).copied().collect();
        assert_eq!(union, covered);

        let intersection: HashSet<&str> = followers
            .logins()
            .filter(|l| following.logins().any(|f| f == *l))
            .collect();
        assert_eq!(mutual, intersection);
    }

    #[test]
    fn test_membership_is_by_login() {
        let followers = list(RelationKind::Followers, &["a"]);
        let mut following = list(RelationKind::Following, &["a"]);
        following.users[0].display_name = Some("Different record".into());

        let result = analyze(&followers, &following);
        assert_eq!(logins(&result.mutual), ["a"]);
        assert!(result.not_following_back.is_empty());
    }

    #[test]
    fn test_duplicate_logins_counted_once() {
        let followers = list(RelationKind::Followers, &["a", "a", "b"]);
        let following = list(RelationKind::Following, &["b", "b"]);

        let result = analyze(&followers, &following);
        assert_eq!(logins(&result.not_followed_back), ["a"]);
        assert_eq!(logins(&result.mutual), ["b"]);
        assert_eq!(result.stats.total_followers, 2);
        assert_eq!(result.stats.total_following, 1);
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let followers = list(RelationKind::Followers, &["x", "y", "z", "w"]);
        let following = list(RelationKind::Following, &["w", "q", "x"]);

        assert_eq!(analyze(&followers, &following), analyze(&followers, &following));
    }

    #[test]
    fn test_zero_following_yields_no_ratio() {
        let followers = list(RelationKind::Followers, &["a", "b"]);
        let following = list(RelationKind::Following, &[]);

        let stats = analyze(&followers, &following).stats;
        assert_eq!(stats.follow_ratio, None);
        assert_eq!(stats.not_following_back_percentage, None);
        assert_eq!(stats.not_followed_back_percentage, Some(100.0));
        assert_eq!(stats.mutual_percentage, Some(0.0));
    }

    #[test]
    fn test_empty_inputs_yield_no_ratios() {
        let followers = list(RelationKind::Followers, &[]);
        let following = list(RelationKind::Following, &[]);

        let stats = analyze(&followers, &following).stats;
        assert_eq!(stats.follow_ratio, None);
        assert_eq!(stats.mutual_percentage, None);
        assert_eq!(stats.not_following_back_percentage, None);
        assert_eq!(stats.not_followed_back_percentage, None);
    }

    #[test]
    fn test_summary_rounds_and_ages() {
        let followers = list(RelationKind::Followers, &["a", "b"]);
        let following = list(RelationKind::Following, &["a", "c", "d"]);
        let result = analyze(&followers, &following);

        let created = "2020-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let now = "2020-01-31T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let profile = Profile {
            login: "octocat".into(),
            name: Some("The Octocat".into()),
            created_at: Some(created),
            public_repos: 8,
            public_gists: 1,
            followers: 2,
            following: 3,
        };

        let summary = Summary::new(&profile, &result.stats, now);
        assert_eq!(summary.stats.follow_ratio, Some(0.67));
        assert_eq!(summary.stats.not_following_back_percentage, Some(66.67));
        assert_eq!(summary.stats.mutual_percentage, Some(33.33));
        assert_eq!(summary.account_age_days, Some(30));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total_followers"], 2);
        assert_eq!(json["username"], "octocat");
    }

    #[test]
    fn test_summary_serializes_missing_ratio_as_null() {
        let followers = list(RelationKind::Followers, &["a"]);
        let following = list(RelationKind::Following, &[]);
        let result = analyze(&followers, &following);
        let profile = Profile {
            login: "octocat".into(),
            name: None,
            created_at: None,
            public_repos: 0,
            public_gists: 0,
            followers: 1,
            following: 0,
        };

        let json = serde_json::to_value(Summary::new(&profile, &result.stats, Utc::now())).unwrap();
        assert!(json["follow_ratio"].is_null());
        assert!(json["account_age_days"].is_null());
    }
}
