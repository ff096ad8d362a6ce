use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{AccessMode, LoadingMode, PoolConfig};

/// Identifies one pool instance. No two pools in the same process share an identifier.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PoolId(u64);

impl PoolId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);

        // We only need uniqueness, not ordering with respect to other memory operations.
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A handle to an item owned by a [`RecyclingPool`][crate::RecyclingPool].
///
/// Keys are returned by [`pull()`][crate::RecyclingPool::pull] and are the identity of an item:
/// two keys are equal if and only if they refer to the same item of the same pool. A key keeps
/// referring to its item while the item moves between the active and inactive state, and stops
/// being valid once the item is pruned or the pool is cleared.
///
/// # Example
///
/// ```rust
/// use recycling_pool::{PoolConfig, RecyclingPool};
///
/// let mut pool = RecyclingPool::new(PoolConfig::new(1), |_| 0_u64);
///
/// let key = pool.pull();
/// *pool.get_mut(key).unwrap() += 5;
/// pool.push(key).unwrap();
///
/// // The same item is reused.
/// let again = pool.pull();
/// assert_eq!(again, key);
/// assert_eq!(*pool.get(again).unwrap(), 5);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Key {
    pool_id: PoolId,
    index: usize,

    /// Incremented every time the slot at `index` is vacated, so stale keys never match
    /// an item that later reuses the slot.
    generation: u32,
}

impl Key {
    pub(crate) fn new(pool_id: PoolId, index: usize, generation: u32) -> Self {
        Self {
            pool_id,
            index,
            generation,
        }
    }

    /// The pool that created the item.
    #[must_use]
    pub fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}@pool{}", self.index, self.generation, self.pool_id)
    }
}

/// A read-only snapshot of a pool's configuration and population.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PoolInfo {
    id: PoolId,
    config: PoolConfig,
    len: usize,
    stored_len: usize,
}

impl PoolInfo {
    pub(crate) fn new(id: PoolId, config: PoolConfig, len: usize, stored_len: usize) -> Self {
        Self {
            id,
            config,
            len,
            stored_len,
        }
    }

    /// The identifier of the pool.
    #[must_use]
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// The configuration the pool was built with.
    #[must_use]
    pub fn config(&self) -> PoolConfig {
        self.config
    }

    /// The target population of the pool.
    #[must_use]
    pub fn size(&self) -> usize {
        self.config.size()
    }

    /// The reuse discipline of the pool.
    #[must_use]
    pub fn access_mode(&self) -> AccessMode {
        self.config.access_mode()
    }

    /// The population strategy of the pool.
    #[must_use]
    pub fn loading_mode(&self) -> LoadingMode {
        self.config.loading_mode()
    }

    /// The number of items the pool owned when the snapshot was taken.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the pool owned no items when the snapshot was taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of inactive items when the snapshot was taken.
    #[must_use]
    pub fn stored_len(&self) -> usize {
        self.stored_len
    }
}

/// What a pool's factory is told about the item it is asked to create.
///
/// The key is the one the new item will be registered under, which lets an item remember
/// its own identity (for example to return itself to the pool later).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CreateContext {
    key: Key,
    pool: PoolInfo,
}

impl CreateContext {
    pub(crate) fn new(key: Key, pool: PoolInfo) -> Self {
        Self { key, pool }
    }

    /// The key the new item will have.
    #[must_use]
    pub fn key(&self) -> Key {
        self.key
    }

    /// The state of the pool just before the item is added to it.
    #[must_use]
    pub fn pool(&self) -> &PoolInfo {
        &self.pool
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Key: Send, Sync, Copy);
    assert_impl_all!(CreateContext: Send, Sync, Copy);

    #[test]
    fn pool_ids_are_unique() {
        let a = PoolId::next();
        let b = PoolId::next();

        assert_ne!(a, b);
    }

    #[test]
    fn keys_differ_by_any_component() {
        let pool = PoolId::next();
        let other_pool = PoolId::next();

        let key = Key::new(pool, 3, 0);

        assert_eq!(key, Key::new(pool, 3, 0));
        assert_ne!(key, Key::new(other_pool, 3, 0));
        assert_ne!(key, Key::new(pool, 4, 0));
        assert_ne!(key, Key::new(pool, 3, 1));
    }

    #[test]
    fn key_display_includes_pool() {
        let pool = PoolId::next();
        let key = Key::new(pool, 7, 2);

        assert_eq!(key.to_string(), format!("7v2@pool{pool}"));
    }
}
