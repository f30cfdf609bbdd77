//! Caching layer for carecost-core
//!
//! A shared Redis tier fronted by a bounded in-process Moka tier, both behind
//! the [`CacheBackend`] contract. Entries are advisory: losing them only
//! costs recomputation.

pub mod backend;
pub mod key;
pub mod memory;
pub mod remote;
pub mod tiered;

pub use backend::{CacheBackend, CacheError, CachedValue};
pub use key::CacheKey;
pub use memory::MemoryCacheBackend;
pub use remote::RedisCacheBackend;
pub use tiered::TieredCache;
