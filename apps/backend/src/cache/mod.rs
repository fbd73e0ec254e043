pub mod keys;
pub mod profile_cache;
pub mod store;

pub use profile_cache::ProfileCache;
pub use store::{CacheError, CacheStore, FailOpenCache, RedisCacheStore};
