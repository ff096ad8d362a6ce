use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::constants::ERR_POISONED_LOCK;
use crate::{Key, PoolInfo, RecyclingPool, Result};

/// A thread-safe wrapper around [`RecyclingPool`].
///
/// This type acts as a cloneable handle to a shared pool instance. Every operation locks the
/// pool for its whole duration, so each pull, push or prune is atomic with respect to the
/// others. Operations may block while another thread is using the pool.
///
/// # Example
///
/// ```rust
/// use std::thread;
///
/// use recycling_pool::{PoolConfig, RecyclingPool, SharedRecyclingPool};
///
/// let pool = RecyclingPool::new(PoolConfig::new(4), |_| Vec::<u8>::new());
/// let pool = SharedRecyclingPool::from(pool);
///
/// let pool_clone = pool.clone();
/// let handle = thread::spawn(move || {
///     let key = pool_clone.pull();
///     pool_clone.with_item_mut(key, |buffer| buffer.push(1));
///     pool_clone.push(key).unwrap();
/// });
///
/// handle.join().unwrap();
/// assert_eq!(pool.stored_len(), 1);
/// ```
pub struct SharedRecyclingPool<T> {
    inner: Arc<Mutex<RecyclingPool<T>>>,
}

impl<T> From<RecyclingPool<T>> for SharedRecyclingPool<T> {
    fn from(pool: RecyclingPool<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }
}

impl<T> Clone for SharedRecyclingPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for SharedRecyclingPool<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRecyclingPool")
            .field("inner", &*self.lock())
            .finish()
    }
}

impl<T> SharedRecyclingPool<T> {
    fn lock(&self) -> MutexGuard<'_, RecyclingPool<T>> {
        self.inner.lock().expect(ERR_POISONED_LOCK)
    }

    /// Hands out an item. See [`RecyclingPool::pull()`].
    #[must_use]
    pub fn pull(&self) -> Key {
        self.lock().pull()
    }

    /// Hands out an item wrapped in a handle that can return itself to this pool.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycling_pool::{PoolConfig, RecyclingPool, SharedRecyclingPool};
    ///
    /// let pool = SharedRecyclingPool::from(RecyclingPool::new(PoolConfig::new(1), |_| 7_u32));
    ///
    /// let item = pool.pull_pooled();
    /// assert_eq!(item.with_item(|value| *value), Some(7));
    ///
    /// item.return_to_pool().unwrap();
    /// assert_eq!(pool.stored_len(), 1);
    /// ```
    #[must_use]
    pub fn pull_pooled(&self) -> Pooled<T> {
        let key = self.pull();

        Pooled {
            key,
            pool: self.clone(),
        }
    }

    /// Returns an active item to the pool. See [`RecyclingPool::push()`].
    ///
    /// # Errors
    ///
    /// Same as [`RecyclingPool::push()`].
    pub fn push(&self, key: Key) -> Result<()> {
        self.lock().push(key)
    }

    /// Makes the pool forget an item. See [`RecyclingPool::prune()`].
    pub fn prune(&self, key: Key) -> Option<T> {
        self.lock().prune(key)
    }

    /// Forgets every item. See [`RecyclingPool::clear()`].
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Pushes every active item back. See [`RecyclingPool::recall_all()`].
    pub fn recall_all(&self) -> usize {
        self.lock().recall_all()
    }

    /// Runs `f` with a shared reference to the item, if the pool owns it.
    pub fn with_item<R>(&self, key: Key, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.lock().get(key).map(f)
    }

    /// Runs `f` with an exclusive reference to the item, if the pool owns it.
    pub fn with_item_mut<R>(&self, key: Key, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.lock().get_mut(key).map(f)
    }

    /// Whether the pool owns the item, active or not.
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.lock().contains(key)
    }

    /// The number of items the pool owns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the pool owns no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The number of inactive items.
    #[must_use]
    pub fn stored_len(&self) -> usize {
        self.lock().stored_len()
    }

    /// The number of active items.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.lock().active_len()
    }

    /// A snapshot of the configuration and population of the pool.
    #[must_use]
    pub fn info(&self) -> PoolInfo {
        self.lock().info()
    }
}

/// An item pulled from a [`SharedRecyclingPool`] that knows which pool it came from.
///
/// Dropping a `Pooled` does not return the item; the item stays active until
/// [`return_to_pool()`][Self::return_to_pool] is called or the key is pushed by other means.
#[must_use]
pub struct Pooled<T> {
    key: Key,
    pool: SharedRecyclingPool<T>,
}

impl<T> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pooled")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl<T> Pooled<T> {
    /// The key of the item in its pool.
    #[must_use]
    pub fn key(&self) -> Key {
        self.key
    }

    /// The pool the item belongs to.
    #[must_use]
    pub fn pool(&self) -> &SharedRecyclingPool<T> {
        &self.pool
    }

    /// Runs `f` with a shared reference to the item, unless the item has been pruned.
    pub fn with_item<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.pool.with_item(self.key, f)
    }

    /// Runs `f` with an exclusive reference to the item, unless the item has been pruned.
    pub fn with_item_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.pool.with_item_mut(self.key, f)
    }

    /// Pushes the item back into the pool it came from.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOwned`][crate::Error::NotOwned] if the item was pruned or the pool
    /// cleared in the meantime, and [`Error::AlreadyStored`][crate::Error::AlreadyStored] if
    /// the key was already pushed by other means.
    pub fn return_to_pool(self) -> Result<()> {
        self.pool.push(self.key)
    }
}
