use std::any::type_name;
use std::collections::hash_map::Entry;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use foldhash::{HashMap, HashMapExt};
use tracing::debug;

use crate::callbacks::{Callbacks, ItemHooks};
use crate::{CreateContext, Error, Key, PoolConfig, Poolable, RecyclingPool, Result};

type PrototypeFactory<P, T> = Arc<dyn Fn(&P, &CreateContext) -> T + Send + Sync>;
type PrototypeDestroyer<P, T> = Arc<dyn Fn(&P, T) + Send + Sync>;

/// What a [`PoolRegistry`] does when asked to pull from or push to a prototype that has
/// no pool yet.
///
/// Pruning never needs a pool: pruning an item of an unknown prototype does nothing
/// regardless of the policy.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum MissingPoolPolicy {
    /// A pool is created with the registry's default configuration. This is the default.
    #[default]
    AutoCreate,

    /// The operation fails with [`Error::PoolMissing`].
    Fail,
}

/// A collection of pools, one per prototype.
///
/// A prototype is any key that describes what kind of item to create, for example an asset
/// name or an enum of entity kinds. The registry creates a [`RecyclingPool`] for a prototype
/// the first time it is needed (or explicitly via [`create_pool()`][Self::create_pool]) and
/// builds that pool's items through a single prototype-aware factory.
///
/// Host lifecycle events map to explicit calls: [`recall_all()`][Self::recall_all] returns
/// every item in use to its pool, [`clear_all()`][Self::clear_all] forgets all items while
/// keeping the pools, and [`destroy_all()`][Self::destroy_all] forgets the pools too.
///
/// # Example
///
/// ```rust
/// use recycling_pool::{PoolConfig, PoolRegistry};
///
/// #[derive(Clone, Debug, Eq, Hash, PartialEq)]
/// enum Effect {
///     Spark,
///     Smoke,
/// }
///
/// let mut registry = PoolRegistry::builder()
///     .default_config(PoolConfig::new(8))
///     .build(|effect: &Effect, _| format!("{effect:?} particle"));
///
/// let spark = registry.pull(Effect::Spark).unwrap();
/// assert_eq!(
///     registry.get(&Effect::Spark, spark).map(String::as_str),
///     Some("Spark particle")
/// );
///
/// registry.push(&Effect::Spark, spark).unwrap();
/// assert_eq!(registry.stored_count(&Effect::Spark), 1);
/// assert_eq!(registry.stored_count(&Effect::Smoke), 0);
/// ```
pub struct PoolRegistry<P, T> {
    pools: HashMap<P, RecyclingPool<T>>,
    provisioner: Provisioner<P, T>,
    default_config: PoolConfig,
    missing_pool_policy: MissingPoolPolicy,
}

/// Everything needed to build a pool for a prototype.
struct Provisioner<P, T> {
    factory: PrototypeFactory<P, T>,
    destroyer: Option<PrototypeDestroyer<P, T>>,
    item_hooks: ItemHooks<T>,
}

impl<P, T> Provisioner<P, T>
where
    P: Clone + Send + 'static,
    T: 'static,
{
    fn provision(&self, prototype: &P, config: PoolConfig) -> RecyclingPool<T> {
        let mut callbacks = Callbacks::new();
        callbacks.item_hooks = self.item_hooks;

        if let Some(destroyer) = &self.destroyer {
            let destroyer = Arc::clone(destroyer);
            let prototype = prototype.clone();
            callbacks.destroyer = Some(Box::new(move |item| destroyer(&prototype, item)));
        }

        let factory = Arc::clone(&self.factory);
        let prototype = prototype.clone();

        RecyclingPool::new_inner(
            config,
            Box::new(move |ctx: &CreateContext| factory(&prototype, ctx)),
            callbacks,
        )
    }
}

impl<P, T> fmt::Debug for PoolRegistry<P, T>
where
    P: fmt::Debug,
{
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("pools", &self.pools)
            .field("default_config", &self.default_config)
            .field("missing_pool_policy", &self.missing_pool_policy)
            .field("item_hooks", &self.provisioner.item_hooks)
            .field("destroyer", &self.provisioner.destroyer.is_some())
            .finish_non_exhaustive()
    }
}

impl<P, T> PoolRegistry<P, T>
where
    P: Clone + Eq + Hash + fmt::Debug + Send + 'static,
    T: 'static,
{
    /// Creates a registry with the default configuration for auto-created pools.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&P, &CreateContext) -> T + Send + Sync + 'static,
    {
        Self::builder().build(factory)
    }

    /// Starts building a registry with custom settings.
    pub fn builder() -> PoolRegistryBuilder<P, T> {
        PoolRegistryBuilder::new()
    }

    /// Creates a pool for a prototype with a specific configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicatePool`] if the prototype already has a pool. The existing pool
    /// is left untouched.
    pub fn create_pool(&mut self, prototype: P, config: PoolConfig) -> Result<()> {
        if self.pools.contains_key(&prototype) {
            return Err(Error::DuplicatePool {
                prototype: format!("{prototype:?}"),
            });
        }

        let pool = self.provisioner.provision(&prototype, config);
        debug!(?prototype, pool = %pool.id(), "pool registered");
        self.pools.insert(prototype, pool);

        Ok(())
    }

    /// Clears the pool of a prototype (passing its items to the destroyer) and forgets it.
    ///
    /// Returns whether the prototype had a pool.
    pub fn destroy_pool(&mut self, prototype: &P) -> bool {
        let Some(mut pool) = self.pools.remove(prototype) else {
            return false;
        };

        pool.clear();
        debug!(?prototype, pool = %pool.id(), "pool destroyed");

        true
    }

    /// Resolves the pool of a prototype, provisioning it if the policy allows.
    fn pool_for(&mut self, prototype: &P) -> Result<&mut RecyclingPool<T>> {
        match self.pools.entry(prototype.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                if self.missing_pool_policy == MissingPoolPolicy::Fail {
                    return Err(Error::PoolMissing {
                        prototype: format!("{prototype:?}"),
                    });
                }

                let pool = self.provisioner.provision(prototype, self.default_config);
                debug!(?prototype, pool = %pool.id(), "pool auto-created");

                Ok(entry.insert(pool))
            }
        }
    }

    /// Hands out an item of the given prototype.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolMissing`] if the prototype has no pool and the registry uses
    /// [`MissingPoolPolicy::Fail`].
    pub fn pull(&mut self, prototype: P) -> Result<Key> {
        Ok(self.pool_for(&prototype)?.pull())
    }

    /// Returns an item to the pool of its prototype.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolMissing`] if the prototype has no pool and the registry uses
    /// [`MissingPoolPolicy::Fail`]. Under [`MissingPoolPolicy::AutoCreate`] a missing pool is
    /// created first, after which the push fails with [`Error::NotOwned`] because the new pool
    /// cannot own the item. Otherwise fails like [`RecyclingPool::push()`].
    pub fn push(&mut self, prototype: &P, key: Key) -> Result<()> {
        self.pool_for(prototype)?.push(key)
    }

    /// Makes the pool of a prototype forget an item, handing the item back to the caller.
    ///
    /// Does nothing if the prototype has no pool or the pool does not own the item.
    pub fn prune(&mut self, prototype: &P, key: Key) -> Option<T> {
        self.pools.get_mut(prototype)?.prune(key)
    }

    /// Gets a shared reference to an item of a prototype.
    #[must_use]
    pub fn get(&self, prototype: &P, key: Key) -> Option<&T> {
        self.pools.get(prototype)?.get(key)
    }

    /// Gets an exclusive reference to an item of a prototype.
    #[must_use]
    pub fn get_mut(&mut self, prototype: &P, key: Key) -> Option<&mut T> {
        self.pools.get_mut(prototype)?.get_mut(key)
    }

    /// The pool of a prototype, if it has one.
    #[must_use]
    pub fn pool(&self, prototype: &P) -> Option<&RecyclingPool<T>> {
        self.pools.get(prototype)
    }

    /// The pool of a prototype, if it has one.
    #[must_use]
    pub fn pool_mut(&mut self, prototype: &P) -> Option<&mut RecyclingPool<T>> {
        self.pools.get_mut(prototype)
    }

    /// Whether the prototype has a pool.
    #[must_use]
    pub fn contains_pool(&self, prototype: &P) -> bool {
        self.pools.contains_key(prototype)
    }

    /// The prototypes that have a pool, in no particular order.
    pub fn prototypes(&self) -> impl Iterator<Item = &P> {
        self.pools.keys()
    }

    /// The number of pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Whether the registry has no pools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// The number of items the pool of a prototype owns, zero if there is no pool.
    #[must_use]
    pub fn item_count(&self, prototype: &P) -> usize {
        self.pools.get(prototype).map_or(0, RecyclingPool::len)
    }

    /// The number of inactive items of a prototype, zero if there is no pool.
    #[must_use]
    pub fn stored_count(&self, prototype: &P) -> usize {
        self.pools
            .get(prototype)
            .map_or(0, RecyclingPool::stored_len)
    }

    /// The number of active items of a prototype, zero if there is no pool.
    #[must_use]
    pub fn active_count(&self, prototype: &P) -> usize {
        self.pools
            .get(prototype)
            .map_or(0, RecyclingPool::active_len)
    }

    /// Pushes every active item of every pool back, returning how many there were.
    pub fn recall_all(&mut self) -> usize {
        self.pools.values_mut().map(RecyclingPool::recall_all).sum()
    }

    /// Clears every pool, keeping the (now empty) pools registered.
    pub fn clear_all(&mut self) {
        for pool in self.pools.values_mut() {
            pool.clear();
        }
    }

    /// Clears and forgets every pool.
    pub fn destroy_all(&mut self) {
        for (prototype, mut pool) in self.pools.drain() {
            pool.clear();
            debug!(?prototype, pool = %pool.id(), "pool destroyed");
        }
    }
}

/// Builder for creating an instance of [`PoolRegistry`].
///
/// # Examples
///
/// ```
/// use recycling_pool::{AccessMode, MissingPoolPolicy, PoolConfig, PoolRegistry};
///
/// let registry = PoolRegistry::builder()
///     .default_config(PoolConfig::new(4).with_access_mode(AccessMode::LastIn))
///     .missing_pool_policy(MissingPoolPolicy::Fail)
///     .destroyer(|name: &&'static str, item: String| println!("destroying {item} of {name}"))
///     .build(|name: &&'static str, _| name.to_uppercase());
///
/// assert!(registry.is_empty());
/// ```
#[must_use]
pub struct PoolRegistryBuilder<P, T> {
    default_config: PoolConfig,
    missing_pool_policy: MissingPoolPolicy,
    destroyer: Option<PrototypeDestroyer<P, T>>,
    item_hooks: ItemHooks<T>,
}

impl<P, T> fmt::Debug for PoolRegistryBuilder<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("default_config", &self.default_config)
            .field("missing_pool_policy", &self.missing_pool_policy)
            .field("destroyer", &self.destroyer.is_some())
            .field("item_hooks", &self.item_hooks)
            .finish()
    }
}

impl<P, T> PoolRegistryBuilder<P, T>
where
    P: Clone + Eq + Hash + fmt::Debug + Send + 'static,
    T: 'static,
{
    fn new() -> Self {
        Self {
            default_config: PoolConfig::default(),
            missing_pool_policy: MissingPoolPolicy::default(),
            destroyer: None,
            item_hooks: ItemHooks::none(),
        }
    }

    /// Sets the configuration of pools that are created on demand.
    pub fn default_config(mut self, config: PoolConfig) -> Self {
        self.default_config = config;
        self
    }

    /// Sets what happens when pulling from or pushing to a prototype without a pool.
    pub fn missing_pool_policy(mut self, policy: MissingPoolPolicy) -> Self {
        self.missing_pool_policy = policy;
        self
    }

    /// Sets the function that receives every item forgotten when a pool is cleared or destroyed.
    pub fn destroyer<F>(mut self, destroyer: F) -> Self
    where
        F: Fn(&P, T) + Send + Sync + 'static,
    {
        self.destroyer = Some(Arc::new(destroyer));
        self
    }

    /// Calls the [`Poolable`] hooks of items in every pool of the registry.
    pub fn notify_poolable(mut self) -> Self
    where
        T: Poolable,
    {
        self.item_hooks = ItemHooks::poolable();
        self
    }

    /// Builds the registry with the factory that creates items for every prototype.
    pub fn build<F>(self, factory: F) -> PoolRegistry<P, T>
    where
        F: Fn(&P, &CreateContext) -> T + Send + Sync + 'static,
    {
        PoolRegistry {
            pools: HashMap::new(),
            provisioner: Provisioner {
                factory: Arc::new(factory),
                destroyer: self.destroyer,
                item_hooks: self.item_hooks,
            },
            default_config: self.default_config,
            missing_pool_policy: self.missing_pool_policy,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{AccessMode, LoadingMode};

    fn registry() -> PoolRegistry<&'static str, String> {
        PoolRegistry::new(|prototype: &&'static str, ctx: &CreateContext| {
            format!("{prototype}#{}", ctx.pool().len())
        })
    }

    #[test]
    fn pull_auto_creates_pool() {
        let mut registry = registry();
        assert!(!registry.contains_pool(&"orc"));

        let key = registry.pull("orc").unwrap();

        assert!(registry.contains_pool(&"orc"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&"orc", key).map(String::as_str), Some("orc#0"));
        assert_eq!(registry.active_count(&"orc"), 1);
    }

    #[test]
    fn create_pool_uses_given_config() {
        let mut registry = registry();

        registry
            .create_pool(
                "arrow",
                PoolConfig::new(3)
                    .with_loading_mode(LoadingMode::Eager)
                    .with_access_mode(AccessMode::LastIn),
            )
            .unwrap();

        assert_eq!(registry.stored_count(&"arrow"), 3);
        assert_eq!(
            registry.pool(&"arrow").unwrap().access_mode(),
            AccessMode::LastIn
        );

        let key = registry.pull("arrow").unwrap();
        assert_eq!(registry.get(&"arrow", key).map(String::as_str), Some("arrow#2"));
    }

    #[test]
    fn create_pool_twice_fails() {
        let mut registry = registry();

        registry.create_pool("orc", PoolConfig::new(1)).unwrap();
        let key = registry.pull("orc").unwrap();

        let result = registry.create_pool("orc", PoolConfig::new(5));

        assert!(matches!(result, Err(Error::DuplicatePool { .. })));
        assert!(registry.pool(&"orc").unwrap().contains(key));
        assert_eq!(registry.pool(&"orc").unwrap().size(), 1);
    }

    #[test]
    fn fail_policy_rejects_unknown_prototypes() {
        let mut registry = PoolRegistry::builder()
            .missing_pool_policy(MissingPoolPolicy::Fail)
            .build(|_: &u8, _| ());

        assert!(matches!(registry.pull(1), Err(Error::PoolMissing { .. })));
        assert!(registry.is_empty());

        registry.create_pool(1, PoolConfig::new(1)).unwrap();
        let key = registry.pull(1).unwrap();

        assert!(matches!(
            registry.push(&2, key),
            Err(Error::PoolMissing { .. })
        ));
        registry.push(&1, key).unwrap();
    }

    #[test]
    fn auto_create_push_to_unknown_prototype_is_not_owned() {
        let mut registry = registry();
        let key = registry.pull("orc").unwrap();

        let result = registry.push(&"goblin", key);

        assert!(matches!(result, Err(Error::NotOwned { .. })));
        assert!(registry.contains_pool(&"goblin"));
        assert_eq!(registry.active_count(&"orc"), 1);
    }

    #[test]
    fn prune_without_pool_is_noop() {
        let mut registry = registry();
        let key = registry.pull("orc").unwrap();

        assert_eq!(registry.prune(&"goblin", key), None);
        assert!(!registry.contains_pool(&"goblin"));

        assert_eq!(registry.prune(&"orc", key).as_deref(), Some("orc#0"));
        assert_eq!(registry.prune(&"orc", key), None);
    }

    #[test]
    fn destroy_pool_passes_items_to_destroyer() {
        let destroyed = Arc::new(Mutex::new(Vec::new()));

        let mut registry = PoolRegistry::builder()
            .destroyer({
                let destroyed = Arc::clone(&destroyed);
                move |prototype: &&'static str, item: String| {
                    destroyed.lock().unwrap().push(format!("{prototype}:{item}"));
                }
            })
            .build(|prototype: &&'static str, _| prototype.to_string());

        _ = registry.pull("orc").unwrap();

        assert!(registry.destroy_pool(&"orc"));
        assert!(!registry.destroy_pool(&"orc"));
        assert!(!registry.contains_pool(&"orc"));
        assert_eq!(*destroyed.lock().unwrap(), vec!["orc:orc".to_string()]);
    }

    #[test]
    fn bulk_operations_cover_all_pools() {
        let mut registry = registry();

        let orc = registry.pull("orc").unwrap();
        _ = registry.pull("orc").unwrap();
        _ = registry.pull("elf").unwrap();
        registry.push(&"orc", orc).unwrap();

        assert_eq!(registry.recall_all(), 2);
        assert_eq!(registry.active_count(&"orc"), 0);
        assert_eq!(registry.stored_count(&"orc"), 2);
        assert_eq!(registry.stored_count(&"elf"), 1);

        registry.clear_all();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.item_count(&"orc"), 0);
        assert_eq!(registry.item_count(&"elf"), 0);

        let mut prototypes: Vec<_> = registry.prototypes().copied().collect();
        prototypes.sort_unstable();
        assert_eq!(prototypes, vec!["elf", "orc"]);

        registry.destroy_all();
        assert!(registry.is_empty());
    }

    #[test]
    fn poolable_hooks_apply_to_every_pool() {
        #[derive(Debug, Default)]
        struct Unit {
            pulls: usize,
        }

        impl Poolable for Unit {
            fn on_pulled(&mut self, _key: Key) {
                self.pulls += 1;
            }
        }

        let mut registry = PoolRegistry::builder()
            .notify_poolable()
            .build(|_: &u32, _| Unit::default());

        let a = registry.pull(1).unwrap();
        let b = registry.pull(2).unwrap();

        assert_eq!(registry.get(&1, a).unwrap().pulls, 1);
        assert_eq!(registry.get(&2, b).unwrap().pulls, 1);
    }

    #[test]
    fn counts_for_unknown_prototype_are_zero() {
        let registry = registry();

        assert_eq!(registry.item_count(&"none"), 0);
        assert_eq!(registry.stored_count(&"none"), 0);
        assert_eq!(registry.active_count(&"none"), 0);
        assert!(registry.pool(&"none").is_none());
    }
}
