use std::any::type_name;
use std::fmt;

use crate::callbacks::{Callbacks, Factory, ItemHooks};
use crate::{
    AccessMode, CreateContext, Error, Key, LoadingMode, PoolConfig, Poolable, RecyclingPool,
    Result,
};

/// Builder for creating an instance of [`RecyclingPool`].
///
/// A factory is mandatory. Everything else has a default: target size zero,
/// [`AccessMode::FirstIn`], [`LoadingMode::Lazy`], no callbacks and items that are simply
/// dropped when the pool is cleared.
///
/// # Examples
///
/// ```
/// use recycling_pool::{AccessMode, LoadingMode, RecyclingPool};
///
/// let pool = RecyclingPool::builder()
///     .size(8)
///     .access_mode(AccessMode::LastIn)
///     .loading_mode(LoadingMode::Eager)
///     .factory(|_| Vec::<u8>::with_capacity(1024))
///     .on_pushed(|_, buffer| buffer.clear())
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.stored_len(), 8);
/// ```
#[must_use]
pub struct RecyclingPoolBuilder<T> {
    config: PoolConfig,
    factory: Option<Factory<T>>,
    callbacks: Callbacks<T>,
}

impl<T> fmt::Debug for RecyclingPoolBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("config", &self.config)
            .field("factory", &self.factory.is_some())
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

impl<T> RecyclingPoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            config: PoolConfig::default(),
            factory: None,
            callbacks: Callbacks::new(),
        }
    }

    /// Replaces the whole configuration at once.
    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the target population of the pool.
    pub fn size(mut self, size: usize) -> Self {
        self.config = self.config.with_size(size);
        self
    }

    /// Sets the [reuse discipline][AccessMode] of the pool.
    pub fn access_mode(mut self, access_mode: AccessMode) -> Self {
        self.config = self.config.with_access_mode(access_mode);
        self
    }

    /// Sets the [population strategy][LoadingMode] of the pool.
    pub fn loading_mode(mut self, loading_mode: LoadingMode) -> Self {
        self.config = self.config.with_loading_mode(loading_mode);
        self
    }

    /// Sets the function that creates new items.
    ///
    /// The factory is called whenever the pool decides to grow, including during
    /// [`build()`][Self::build] for eagerly loaded pools.
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: FnMut(&CreateContext) -> T + Send + 'static,
    {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Calls the [`Poolable`] hooks of each item when it is pulled or pushed.
    pub fn notify_poolable(mut self) -> Self
    where
        T: Poolable,
    {
        self.callbacks.item_hooks = ItemHooks::poolable();
        self
    }

    /// Registers a callback that runs after every pull.
    pub fn on_pulled<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Key, &mut T) + Send + 'static,
    {
        self.callbacks.pulled = Some(Box::new(callback));
        self
    }

    /// Registers a callback that runs after every successful push.
    pub fn on_pushed<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Key, &mut T) + Send + 'static,
    {
        self.callbacks.pushed = Some(Box::new(callback));
        self
    }

    /// Registers a callback that runs when an item is pruned, just before the item is
    /// handed back to the caller of [`prune()`][RecyclingPool::prune].
    pub fn on_pruned<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Key, &mut T) + Send + 'static,
    {
        self.callbacks.pruned = Some(Box::new(callback));
        self
    }

    /// Sets the function that receives every item forgotten by [`clear()`][RecyclingPool::clear].
    ///
    /// Without a destroyer, cleared items are dropped.
    pub fn destroyer<F>(mut self, destroyer: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        self.callbacks.destroyer = Some(Box::new(destroyer));
        self
    }

    /// Builds the pool, creating all items up front if the loading mode is
    /// [`LoadingMode::Eager`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingFactory`] if no factory was set.
    ///
    /// # Examples
    ///
    /// ```
    /// use recycling_pool::{Error, RecyclingPool};
    ///
    /// let result = RecyclingPool::<u32>::builder().size(4).build();
    /// assert!(matches!(result, Err(Error::MissingFactory)));
    /// ```
    pub fn build(self) -> Result<RecyclingPool<T>> {
        let factory = self.factory.ok_or(Error::MissingFactory)?;

        Ok(RecyclingPool::new_inner(self.config, factory, self.callbacks))
    }
}
