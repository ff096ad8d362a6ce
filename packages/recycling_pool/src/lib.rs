#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! This package provides [`RecyclingPool`], an object pool that recycles items of one type
//! instead of creating and destroying them over and over.
//!
//! Items are created by a factory you provide and stay owned by the pool. You borrow an item by
//! pulling its [`Key`] and give it back by pushing the key. The pool tracks which items are in
//! use (*active*) and which are available (*inactive*), and rejects keys it does not own or
//! items that were already returned.
//!
//! # Configuration
//!
//! * [`AccessMode`] decides which inactive item is reused next: the one that has been waiting
//!   the longest ([`AccessMode::FirstIn`]) or the one returned most recently
//!   ([`AccessMode::LastIn`]).
//! * [`LoadingMode`] decides when items are created: all at once when the pool is built
//!   ([`LoadingMode::Eager`]) or on demand until the target size is reached
//!   ([`LoadingMode::Lazy`]).
//!
//! The target size is not a limit. A pool with no inactive item available creates a new one
//! rather than failing.
//!
//! # Notifications
//!
//! Item types can implement [`Poolable`] to be told when they are pulled or pushed. Pools
//! also accept callbacks for pull, push and prune, and a destroyer that receives items the pool
//! forgets when it is cleared.
//!
//! # Multiple pools
//!
//! [`PoolRegistry`] keeps one pool per prototype key and creates pools on demand.
//! [`SharedRecyclingPool`] makes a single pool usable from multiple threads.
//!
//! # Example
//!
//! ```rust
//! use recycling_pool::{AccessMode, LoadingMode, RecyclingPool};
//!
//! let mut pool = RecyclingPool::builder()
//!     .size(2)
//!     .access_mode(AccessMode::FirstIn)
//!     .loading_mode(LoadingMode::Eager)
//!     .factory(|ctx| format!("connection {}", ctx.pool().len()))
//!     .build()
//!     .unwrap();
//!
//! let first = pool.pull();
//! let second = pool.pull();
//! assert_eq!(pool.get(first).unwrap(), "connection 0");
//! assert_eq!(pool.get(second).unwrap(), "connection 1");
//!
//! // Both preloaded items are in use, so the pool grows.
//! let third = pool.pull();
//! assert_eq!(pool.len(), 3);
//!
//! pool.push(second).unwrap();
//! pool.push(third).unwrap();
//!
//! // The item that has been inactive the longest is reused first.
//! assert_eq!(pool.pull(), second);
//! ```

mod builder;
mod callbacks;
mod config;
mod constants;
mod error;
mod item_store;
mod key;
mod pool;
mod poolable;
mod registry;
mod shared;
mod slots;

pub use builder::*;
pub use config::*;
pub use error::*;
pub use key::*;
pub use pool::*;
pub use poolable::*;
pub use registry::*;
pub use shared::*;
