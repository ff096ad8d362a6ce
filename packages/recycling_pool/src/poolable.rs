use crate::Key;

/// Optional notifications an item type can receive from the pool that owns it.
///
/// Implementing this trait is not required for an item to be pooled. A pool only calls these
/// hooks if it was built with [`notify_poolable()`][crate::RecyclingPoolBuilder::notify_poolable],
/// which is available only for item types that implement the trait.
///
/// Both hooks run after the pool has updated its own bookkeeping and before the pool-level
/// callbacks registered on the builder.
///
/// # Example
///
/// ```rust
/// use recycling_pool::{Key, Poolable, RecyclingPool};
///
/// #[derive(Default)]
/// struct Projectile {
///     in_flight: bool,
/// }
///
/// impl Poolable for Projectile {
///     fn on_pulled(&mut self, _key: Key) {
///         self.in_flight = true;
///     }
///
///     fn on_pushed(&mut self, _key: Key) {
///         self.in_flight = false;
///     }
/// }
///
/// let mut pool = RecyclingPool::builder()
///     .factory(|_| Projectile::default())
///     .notify_poolable()
///     .build()
///     .unwrap();
///
/// let key = pool.pull();
/// assert!(pool.get(key).unwrap().in_flight);
///
/// pool.push(key).unwrap();
/// assert!(!pool.get(key).unwrap().in_flight);
/// ```
pub trait Poolable {
    /// Called when the item has been handed out by [`pull()`][crate::RecyclingPool::pull].
    fn on_pulled(&mut self, key: Key) {
        _ = key;
    }

    /// Called when the item has been returned by [`push()`][crate::RecyclingPool::push].
    fn on_pushed(&mut self, key: Key) {
        _ = key;
    }
}
