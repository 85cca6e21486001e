//! Cache store backends behind the [`CacheStore`] port.
//!
//! [`CacheStore`]: crate::application::ports::CacheStore

mod memory;
mod sqlite;

pub use memory::MemoryCacheStore;
pub use sqlite::SqliteCacheStore;
