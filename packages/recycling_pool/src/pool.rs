use std::any::type_name;
use std::fmt;

use tracing::{debug, trace};

use crate::callbacks::{Callbacks, Factory};
use crate::item_store::ItemStore;
use crate::slots::Slots;
use crate::{
    AccessMode, CreateContext, Error, Key, LoadingMode, PoolConfig, PoolId, PoolInfo,
    RecyclingPoolBuilder, Result,
};

/// A pool that recycles items of a single type.
///
/// Items are created by a factory and stay owned by the pool for their whole life. Callers
/// borrow an item by [pulling][Self::pull] its [`Key`] and give it back by
/// [pushing][Self::push] the key. Each owned item is either *active* (pulled and not yet
/// pushed back) or *inactive* (stored and available for the next pull).
///
/// # Growth
///
/// The pool never refuses a pull. A new item is created when no inactive item is available,
/// or when the pool is [lazily loaded][LoadingMode::Lazy] and owns fewer than `size` items.
/// Otherwise the next inactive item is reused, picked according to the [`AccessMode`].
/// The pool never shrinks by itself; use [`prune()`][Self::prune] to forget individual items
/// and [`clear()`][Self::clear] to forget all of them.
///
/// # Example
///
/// ```rust
/// use recycling_pool::{LoadingMode, PoolConfig, RecyclingPool};
///
/// let config = PoolConfig::new(2).with_loading_mode(LoadingMode::Eager);
/// let mut pool = RecyclingPool::new(config, |ctx| format!("item {}", ctx.pool().len()));
///
/// assert_eq!(pool.stored_len(), 2);
///
/// let key = pool.pull();
/// assert_eq!(pool.get(key).map(String::as_str), Some("item 0"));
/// assert_eq!(pool.active_len(), 1);
///
/// pool.push(key).unwrap();
/// assert_eq!(pool.active_len(), 0);
/// ```
pub struct RecyclingPool<T> {
    config: PoolConfig,
    factory: Factory<T>,

    /// Every owned item, with a flag telling whether it is inactive.
    slots: Slots<T>,

    /// Keys of the inactive items, in the order they will be reused.
    /// Always contains exactly the keys whose slot is flagged as stored.
    store: ItemStore,

    callbacks: Callbacks<T>,
}

impl<T> fmt::Debug for RecyclingPool<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("id", &self.id())
            .field("config", &self.config)
            .field("len", &self.len())
            .field("stored_len", &self.stored_len())
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

impl<T> RecyclingPool<T> {
    pub(crate) fn new_inner(
        config: PoolConfig,
        factory: Factory<T>,
        callbacks: Callbacks<T>,
    ) -> Self {
        let mut pool = Self {
            config,
            factory,
            slots: Slots::new(PoolId::next(), config.size()),
            store: ItemStore::with_capacity(config.access_mode(), config.size()),
            callbacks,
        };

        debug!(
            pool = %pool.id(),
            item_type = type_name::<T>(),
            size = config.size(),
            access_mode = ?config.access_mode(),
            loading_mode = ?config.loading_mode(),
            "pool created"
        );

        if config.loading_mode() == LoadingMode::Eager {
            pool.preload();
        }

        pool
    }

    /// Creates a new pool with the given configuration and factory.
    ///
    /// This is a shorthand for the [builder][Self::builder] when no callbacks are needed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycling_pool::{PoolConfig, RecyclingPool};
    ///
    /// let pool = RecyclingPool::new(PoolConfig::new(4), |_| [0_u8; 64]);
    ///
    /// // Lazily loaded pools start out empty.
    /// assert!(pool.is_empty());
    /// ```
    pub fn new<F>(config: PoolConfig, factory: F) -> Self
    where
        F: FnMut(&CreateContext) -> T + Send + 'static,
    {
        Self::new_inner(config, Box::new(factory), Callbacks::new())
    }

    /// Starts building a new [`RecyclingPool`].
    pub fn builder() -> RecyclingPoolBuilder<T> {
        RecyclingPoolBuilder::new()
    }

    fn preload(&mut self) {
        for _ in 0..self.config.size() {
            let key = self.create_item(true);
            self.store.store(key);
        }

        debug!(pool = %self.id(), count = self.config.size(), "pool preloaded");
    }

    /// Calls the factory and registers the new item.
    fn create_item(&mut self, stored: bool) -> Key {
        let key = self.slots.next_key();
        let context = CreateContext::new(key, self.info());

        let item = (self.factory)(&context);

        let inserted = self.slots.insert(item, stored);
        debug_assert_eq!(inserted, key);

        trace!(pool = %self.id(), %key, stored, "item created");

        key
    }

    /// Takes the next inactive item out of the store, unless the pool should grow instead.
    fn next_reusable(&mut self) -> Option<Key> {
        if self.config.loading_mode() == LoadingMode::Lazy && self.len() < self.config.size() {
            return None;
        }

        self.store.fetch()
    }

    /// Hands out an item, creating a new one if the pool decides it needs to grow.
    ///
    /// The item's [`Poolable`][crate::Poolable] hook (if enabled) and then the pulled callback
    /// are invoked before this returns.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycling_pool::{PoolConfig, RecyclingPool};
    ///
    /// let mut pool = RecyclingPool::new(PoolConfig::new(2), |_| 0_u32);
    ///
    /// // While under its target size, a lazy pool keeps creating items.
    /// let a = pool.pull();
    /// let b = pool.pull();
    /// let c = pool.pull();
    ///
    /// assert_ne!(a, b);
    /// assert_ne!(b, c);
    /// assert_eq!(pool.len(), 3);
    /// ```
    pub fn pull(&mut self) -> Key {
        let key = match self.next_reusable() {
            Some(key) => {
                self.slots.set_stored(key, false);
                trace!(pool = %self.id(), %key, "item reused");
                key
            }
            None => self.create_item(false),
        };

        if let Some(item) = self.slots.get_mut(key) {
            self.callbacks.notify_pulled(key, item);
        }

        key
    }

    /// Returns an active item to the pool, making it available to later pulls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOwned`] if the key was not created by this pool or its item has been
    /// pruned or cleared, and [`Error::AlreadyStored`] if the item is already inactive. The pool
    /// is unchanged in both cases.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycling_pool::{Error, PoolConfig, RecyclingPool};
    ///
    /// let mut pool = RecyclingPool::new(PoolConfig::new(1), |_| ());
    ///
    /// let key = pool.pull();
    /// pool.push(key).unwrap();
    ///
    /// assert!(matches!(pool.push(key), Err(Error::AlreadyStored { .. })));
    /// ```
    pub fn push(&mut self, key: Key) -> Result<()> {
        match self.slots.is_stored(key) {
            None => return Err(Error::NotOwned { key }),
            Some(true) => return Err(Error::AlreadyStored { key }),
            Some(false) => {}
        }

        self.store_active(key);
        Ok(())
    }

    /// Moves an item that is known to be owned and active into the store.
    fn store_active(&mut self, key: Key) {
        self.store.store(key);
        self.slots.set_stored(key, true);

        trace!(pool = %self.id(), %key, "item stored");

        if let Some(item) = self.slots.get_mut(key) {
            self.callbacks.notify_pushed(key, item);
        }
    }

    /// Makes the pool forget an item, handing the item back to the caller.
    ///
    /// This is meant for items whose underlying resource is being destroyed by someone else.
    /// Pruning a key the pool does not own (for example one that was already pruned) does
    /// nothing and returns `None`.
    ///
    /// Pruning an inactive item keeps the relative order of the remaining inactive items.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycling_pool::{PoolConfig, RecyclingPool};
    ///
    /// let mut pool = RecyclingPool::new(PoolConfig::new(1), |_| String::from("socket"));
    ///
    /// let key = pool.pull();
    /// assert_eq!(pool.prune(key).as_deref(), Some("socket"));
    /// assert_eq!(pool.prune(key), None);
    /// assert!(pool.is_empty());
    /// ```
    pub fn prune(&mut self, key: Key) -> Option<T> {
        let (mut item, was_stored) = self.slots.remove(key)?;

        if was_stored {
            self.store.rebuild_without(key);
        }

        debug_assert_eq!(self.store.len(), self.slots.stored_len());

        trace!(pool = %self.id(), %key, was_stored, "item pruned");

        self.callbacks.notify_pruned(key, &mut item);

        Some(item)
    }

    /// Forgets every item, passing each to the destroyer (or dropping it if there is none).
    ///
    /// Keys handed out before the call are no longer owned by the pool afterwards. The pool
    /// stays usable: the next pull creates a fresh item. An eagerly loaded pool is not
    /// preloaded again.
    ///
    /// No pull, push or prune callbacks are invoked.
    pub fn clear(&mut self) {
        let items = self.slots.drain();
        self.store = ItemStore::with_capacity(self.config.access_mode(), self.config.size());

        debug!(pool = %self.id(), count = items.len(), "pool cleared");

        for item in items {
            self.callbacks.destroy(item);
        }
    }

    /// Pushes every active item back into the pool, returning how many there were.
    ///
    /// Items are returned in key order, firing the usual push hooks and callbacks.
    pub fn recall_all(&mut self) -> usize {
        let active: Vec<Key> = self.slots.active_keys().collect();

        for key in &active {
            self.store_active(*key);
        }

        if !active.is_empty() {
            debug!(pool = %self.id(), count = active.len(), "active items recalled");
        }

        active.len()
    }

    /// Gets a shared reference to an owned item, active or not.
    #[must_use]
    pub fn get(&self, key: Key) -> Option<&T> {
        self.slots.get(key)
    }

    /// Gets an exclusive reference to an owned item, active or not.
    #[must_use]
    pub fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        self.slots.get_mut(key)
    }

    /// Whether the pool owns the item, active or not.
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.slots.contains(key)
    }

    /// Whether the pool owns the item and it is inactive.
    #[must_use]
    pub fn is_stored(&self, key: Key) -> bool {
        self.slots.is_stored(key) == Some(true)
    }

    /// Whether the pool owns the item and it is active.
    #[must_use]
    pub fn is_active(&self, key: Key) -> bool {
        self.slots.is_stored(key) == Some(false)
    }

    /// The number of items the pool owns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool owns no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of inactive items.
    #[must_use]
    pub fn stored_len(&self) -> usize {
        self.slots.stored_len()
    }

    /// The number of active items.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.len()
            .checked_sub(self.stored_len())
            .expect("stored items are a subset of owned items")
    }

    /// Keys of all owned items.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.slots.keys()
    }

    /// Keys of the inactive items, in the order the next pulls would reuse them.
    pub fn stored_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.store.iter()
    }

    /// Keys of the active items.
    pub fn active_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.slots.active_keys()
    }

    /// The identifier of this pool, which is also embedded in every key it creates.
    #[must_use]
    pub fn id(&self) -> PoolId {
        self.slots.pool_id()
    }

    /// The configuration of this pool.
    #[must_use]
    pub fn config(&self) -> PoolConfig {
        self.config
    }

    /// The target population of this pool.
    #[must_use]
    pub fn size(&self) -> usize {
        self.config.size()
    }

    /// The reuse discipline of this pool.
    #[must_use]
    pub fn access_mode(&self) -> AccessMode {
        self.store.access_mode()
    }

    /// The population strategy of this pool.
    #[must_use]
    pub fn loading_mode(&self) -> LoadingMode {
        self.config.loading_mode()
    }

    /// A snapshot of the configuration and population of this pool.
    #[must_use]
    pub fn info(&self) -> PoolInfo {
        PoolInfo::new(self.id(), self.config, self.len(), self.stored_len())
    }
}
