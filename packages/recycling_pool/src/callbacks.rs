use std::fmt;

use crate::{CreateContext, Key, Poolable};

pub(crate) type Factory<T> = Box<dyn FnMut(&CreateContext) -> T + Send>;
pub(crate) type ItemCallback<T> = Box<dyn FnMut(Key, &mut T) + Send>;
pub(crate) type Destroyer<T> = Box<dyn FnMut(T) + Send>;

/// The [`Poolable`] hooks of an item type, captured at build time.
pub(crate) struct ItemHooks<T> {
    on_pulled: Option<fn(&mut T, Key)>,
    on_pushed: Option<fn(&mut T, Key)>,
}

impl<T> ItemHooks<T> {
    pub(crate) fn none() -> Self {
        Self {
            on_pulled: None,
            on_pushed: None,
        }
    }

    pub(crate) fn poolable() -> Self
    where
        T: Poolable,
    {
        Self {
            on_pulled: Some(<T as Poolable>::on_pulled),
            on_pushed: Some(<T as Poolable>::on_pushed),
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.on_pulled.is_some() || self.on_pushed.is_some()
    }
}

// Manual impls because derive would require `T: Clone`.
impl<T> Clone for ItemHooks<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ItemHooks<T> {}

impl<T> fmt::Debug for ItemHooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemHooks")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Everything a pool calls out to when items change state.
pub(crate) struct Callbacks<T> {
    pub(crate) item_hooks: ItemHooks<T>,
    pub(crate) pulled: Option<ItemCallback<T>>,
    pub(crate) pushed: Option<ItemCallback<T>>,
    pub(crate) pruned: Option<ItemCallback<T>>,
    pub(crate) destroyer: Option<Destroyer<T>>,
}

impl<T> Callbacks<T> {
    pub(crate) fn new() -> Self {
        Self {
            item_hooks: ItemHooks::none(),
            pulled: None,
            pushed: None,
            pruned: None,
            destroyer: None,
        }
    }

    pub(crate) fn notify_pulled(&mut self, key: Key, item: &mut T) {
        if let Some(hook) = self.item_hooks.on_pulled {
            hook(item, key);
        }

        if let Some(callback) = self.pulled.as_mut() {
            callback(key, item);
        }
    }

    pub(crate) fn notify_pushed(&mut self, key: Key, item: &mut T) {
        if let Some(hook) = self.item_hooks.on_pushed {
            hook(item, key);
        }

        if let Some(callback) = self.pushed.as_mut() {
            callback(key, item);
        }
    }

    pub(crate) fn notify_pruned(&mut self, key: Key, item: &mut T) {
        if let Some(callback) = self.pruned.as_mut() {
            callback(key, item);
        }
    }

    /// Hands an item that the pool has forgotten to the destroyer, or drops it if there is none.
    pub(crate) fn destroy(&mut self, item: T) {
        match self.destroyer.as_mut() {
            Some(destroyer) => destroyer(item),
            None => drop(item),
        }
    }
}

impl<T> fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("item_hooks", &self.item_hooks)
            .field("pulled", &self.pulled.is_some())
            .field("pushed", &self.pushed.is_some())
            .field("pruned", &self.pruned.is_some())
            .field("destroyer", &self.destroyer.is_some())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::PoolId;

    #[derive(Default)]
    struct Recorder {
        events: Vec<&'static str>,
    }

    impl Poolable for Recorder {
        fn on_pulled(&mut self, _key: Key) {
            self.events.push("item pulled");
        }

        fn on_pushed(&mut self, _key: Key) {
            self.events.push("item pushed");
        }
    }

    #[test]
    fn item_hooks_run_before_pool_callbacks() {
        let key = Key::new(PoolId::next(), 0, 0);
        let mut callbacks = Callbacks::<Recorder>::new();
        callbacks.item_hooks = ItemHooks::poolable();
        callbacks.pulled = Some(Box::new(|_, item: &mut Recorder| {
            item.events.push("pool pulled");
        }));
        callbacks.pushed = Some(Box::new(|_, item: &mut Recorder| {
            item.events.push("pool pushed");
        }));

        let mut item = Recorder::default();
        callbacks.notify_pulled(key, &mut item);
        callbacks.notify_pushed(key, &mut item);

        assert_eq!(
            item.events,
            vec!["item pulled", "pool pulled", "item pushed", "pool pushed"]
        );
    }

    #[test]
    fn item_hooks_are_skipped_unless_enabled() {
        let key = Key::new(PoolId::next(), 0, 0);
        let mut callbacks = Callbacks::<Recorder>::new();

        let mut item = Recorder::default();
        callbacks.notify_pulled(key, &mut item);
        callbacks.notify_pushed(key, &mut item);

        assert!(item.events.is_empty());
        assert!(!callbacks.item_hooks.is_enabled());
    }

    #[test]
    fn destroy_prefers_destroyer() {
        let destroyed = Arc::new(Mutex::new(Vec::new()));
        let mut callbacks = Callbacks::<u32>::new();

        callbacks.destroy(1);

        callbacks.destroyer = Some(Box::new({
            let destroyed = Arc::clone(&destroyed);
            move |item: u32| destroyed.lock().unwrap().push(item)
        }));
        callbacks.destroy(2);

        assert_eq!(*destroyed.lock().unwrap(), vec![2]);
    }
}
