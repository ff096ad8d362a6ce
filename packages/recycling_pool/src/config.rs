/// Determines which inactive item a pool hands out next.
///
/// # Examples
///
/// ```
/// use recycling_pool::{AccessMode, PoolConfig, RecyclingPool};
///
/// let mut pool = RecyclingPool::new(
///     PoolConfig::new(2).with_access_mode(AccessMode::LastIn),
///     |_| String::new(),
/// );
///
/// let first = pool.pull();
/// let second = pool.pull();
/// pool.push(first).unwrap();
/// pool.push(second).unwrap();
///
/// // The most recently returned item comes back first.
/// assert_eq!(pool.pull(), second);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum AccessMode {
    /// The item that has been inactive the longest is reused first. This is the default.
    #[default]
    FirstIn,

    /// The item that became inactive most recently is reused first.
    LastIn,
}

/// Determines when a pool creates its items.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum LoadingMode {
    /// All `size` items are created when the pool is built.
    Eager,

    /// Items are created on demand until the pool owns `size` of them, after which inactive
    /// items are reused whenever one is available. This is the default.
    #[default]
    Lazy,
}

/// The immutable configuration of a pool.
///
/// The default configuration has a target size of zero, [`AccessMode::FirstIn`] and
/// [`LoadingMode::Lazy`]. A pool with a target size of zero still hands out items; it simply
/// never preallocates and always prefers reuse when an item is available.
///
/// # Examples
///
/// ```
/// use recycling_pool::{AccessMode, LoadingMode, PoolConfig};
///
/// let config = PoolConfig::new(16)
///     .with_access_mode(AccessMode::LastIn)
///     .with_loading_mode(LoadingMode::Eager);
///
/// assert_eq!(config.size(), 16);
/// assert_eq!(config.access_mode(), AccessMode::LastIn);
/// assert_eq!(config.loading_mode(), LoadingMode::Eager);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PoolConfig {
    size: usize,
    access_mode: AccessMode,
    loading_mode: LoadingMode,
}

impl PoolConfig {
    /// Creates a configuration with the given target size and default modes.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Replaces the target size.
    #[must_use]
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Replaces the access mode.
    #[must_use]
    pub fn with_access_mode(mut self, access_mode: AccessMode) -> Self {
        self.access_mode = access_mode;
        self
    }

    /// Replaces the loading mode.
    #[must_use]
    pub fn with_loading_mode(mut self, loading_mode: LoadingMode) -> Self {
        self.loading_mode = loading_mode;
        self
    }

    /// The target population of the pool.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The reuse discipline of the pool.
    #[must_use]
    pub fn access_mode(&self) -> AccessMode {
        self.access_mode
    }

    /// The population strategy of the pool.
    #[must_use]
    pub fn loading_mode(&self) -> LoadingMode {
        self.loading_mode
    }
}
