// Cache module for local filesystem caching.
// Stores fetched profiles and follow lists so repeat runs skip the API.

pub mod paths;
pub mod store;

pub use paths::{CacheLayout, default_cache_dir};
pub use store::{CachedData, FollowCache, read_cached, write_cached};
