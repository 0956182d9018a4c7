// Cache store for profiles and relation lists.
// Handles JSON serialization, TTL checking, and clearing.

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::config::CacheConfig;
use crate::error::{FollowError, Result};
use crate::fs::write_atomic;
use crate::github::{FollowList, Profile, RelationKind};

use super::paths::CacheLayout;

/// Wrapper for cached data with its fetch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    /// The cached data.
    pub data: T,
    /// When the data was fetched.
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    /// Create a new cached data entry stamped with the current time.
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    /// Check if this cached data has expired based on TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        let elapsed = Utc::now()
            .signed_duration_since(self.cached_at)
            .to_std()
            // A timestamp from the future has no measurable age
            .unwrap_or(Duration::MAX);

        elapsed > ttl
    }

    /// Check if this cached data is still valid (not expired).
    pub fn is_valid(&self, ttl: Duration) -> bool {
        !self.is_expired(ttl)
    }
}

/// Read a cache entry. A missing file is `Ok(None)`; an unparseable one is
/// [`FollowError::CacheCorruption`].
pub fn read_cached<T: DeserializeOwned>(path: &Path) -> Result<Option<CachedData<T>>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let cached = serde_json::from_str(&contents).map_err(|e| FollowError::CacheCorruption {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(Some(cached))
}

/// Write a cache entry as JSON, atomically.
pub fn write_cached<T: Serialize>(path: &Path, cached: &CachedData<T>) -> Result<()> {
    let json = serde_json::to_vec_pretty(cached)?;
    write_atomic(path, &json)
}

/// Delete a cached directory and all contents.
pub fn delete_dir(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    Ok(())
}

/// On-disk cache keyed by (owner, relation kind) with a freshness window.
#[derive(Debug, Clone)]
pub struct FollowCache {
    layout: CacheLayout,
    ttl: Duration,
    enabled: bool,
}

impl FollowCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            layout: CacheLayout::new(&config.dir),
            ttl: config.ttl,
            enabled: config.enabled,
        }
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Cached relation list, if present and fresh.
    pub fn get(&self, owner: &str, kind: RelationKind) -> Option<FollowList> {
        let list: FollowList = self.load(&self.layout.relation_path(owner, kind))?;

        if list.kind != kind || !list.owner.eq_ignore_ascii_case(owner) {
            warn!(owner, %kind, cached_owner = %list.owner, "Cache entry does not match its key, ignoring");
            return None;
        }
        Some(list)
    }

    /// Store a relation list, replacing any previous entry.
    pub fn put(&self, owner: &str, kind: RelationKind, list: &FollowList) -> Result<()> {
        self.store(&self.layout.relation_path(owner, kind), list)
    }

    /// Cached profile, if present and fresh.
    pub fn get_profile(&self, owner: &str) -> Option<Profile> {
        self.load(&self.layout.profile_path(owner))
    }

    pub fn put_profile(&self, owner: &str, profile: &Profile) -> Result<()> {
        self.store(&self.layout.profile_path(owner), profile)
    }

    /// Remove cached entries for one owner, or for everyone when `owner` is `None`.
    ///
    /// Works whether or not caching is enabled for this run.
    #[instrument(skip(self))]
    pub fn clear(&self, owner: Option<&str>) -> Result<()> {
        let dir = match owner {
            Some(owner) => self.layout.owner_dir(owner),
            None => self.layout.owners_dir(),
        };
        debug!(dir = %dir.display(), "Clearing cache");
        delete_dir(&dir)
    }

    fn load<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        if !self.enabled {
            return None;
        }

        match read_cached::<T>(path) {
            Ok(Some(cached)) if cached.is_valid(self.ttl) => {
                debug!(path = %path.display(), cached_at = %cached.cached_at, "Cache hit");
                Some(cached.data)
            }
            Ok(Some(cached)) => {
                debug!(path = %path.display(), cached_at = %cached.cached_at, "Cache entry expired");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    fn store<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        write_cached(path, &CachedData::new(data))
    }
}
