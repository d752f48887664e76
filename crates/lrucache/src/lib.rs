//! # lrucache
//!
//! Fixed-capacity key/value cache with least-recently-used eviction.
//!
//! ## Architecture
//! - **Store**: AHash map from key to value (O(1))
//! - **Recency list**: arena-backed doubly-linked list of keys plus a
//!   key-to-slot index, so touch/add/evict are O(1)
//! - **SharedCache**: the whole cache behind one `parking_lot` mutex
//! - **Trace**: text format and replay for recorded get/put sequences
//!
//! ```
//! use lrucache::LruCache;
//!
//! let mut cache = LruCache::new(2)?;
//! cache.put(1, "one");
//! cache.put(2, "two");
//! cache.get(&1);
//! cache.put(3, "three"); // evicts 2
//!
//! assert_eq!(cache.get(&2), None);
//! assert_eq!(cache.get(&1), Some(&"one"));
//! # Ok::<(), lrucache::Error>(())
//! ```

#![warn(missing_docs)]

mod cache;
mod error;
mod recency;
mod stats;
mod sync;
pub mod trace;

pub use cache::LruCache;
pub use error::{Error, Result};
pub use recency::{Iter, RecencyList};
pub use stats::CacheStats;
pub use sync::SharedCache;
