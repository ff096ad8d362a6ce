use crate::{Key, PoolId};

/// Arena holding every item a pool owns.
///
/// An occupied slot is an owned item; its `stored` flag marks the item as inactive. Vacated
/// slots are reused for new items with a bumped generation, so keys of forgotten items never
/// resolve to a newer item.
#[derive(Debug)]
pub(crate) struct Slots<T> {
    pool_id: PoolId,
    slots: Vec<Slot<T>>,

    /// Indexes of vacant slots. The most recently vacated slot is reused first.
    vacant: Vec<usize>,

    len: usize,
    stored_len: usize,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    entry: Option<Entry<T>>,
}

#[derive(Debug)]
struct Entry<T> {
    item: T,
    stored: bool,
}

impl<T> Slots<T> {
    pub(crate) fn new(pool_id: PoolId, capacity: usize) -> Self {
        Self {
            pool_id,
            slots: Vec::with_capacity(capacity),
            vacant: Vec::new(),
            len: 0,
            stored_len: 0,
        }
    }

    pub(crate) fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    /// Number of owned items.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Number of owned items that are inactive.
    pub(crate) fn stored_len(&self) -> usize {
        self.stored_len
    }

    /// The key that the next call to [`insert()`][Self::insert] will return.
    pub(crate) fn next_key(&self) -> Key {
        match self.vacant.last() {
            Some(&index) => {
                let generation = self
                    .slots
                    .get(index)
                    .map(|slot| slot.generation)
                    .expect("vacant list only refers to existing slots");

                Key::new(self.pool_id, index, generation)
            }
            None => Key::new(self.pool_id, self.slots.len(), 0),
        }
    }

    pub(crate) fn insert(&mut self, item: T, stored: bool) -> Key {
        let key = self.next_key();

        let entry = Entry { item, stored };

        if self.vacant.pop().is_some() {
            let slot = self
                .slots
                .get_mut(key.index())
                .expect("vacant list only refers to existing slots");

            debug_assert!(slot.entry.is_none());
            slot.entry = Some(entry);
        } else {
            self.slots.push(Slot {
                generation: key.generation(),
                entry: Some(entry),
            });
        }

        self.len = self
            .len
            .checked_add(1)
            .expect("cannot own more items than fit in virtual memory");

        if stored {
            self.stored_len = self
                .stored_len
                .checked_add(1)
                .expect("stored items are a subset of owned items");
        }

        key
    }

    fn entry(&self, key: Key) -> Option<&Entry<T>> {
        if key.pool_id() != self.pool_id {
            return None;
        }

        self.slots
            .get(key.index())
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.entry.as_ref())
    }

    fn entry_mut(&mut self, key: Key) -> Option<&mut Entry<T>> {
        if key.pool_id() != self.pool_id {
            return None;
        }

        self.slots
            .get_mut(key.index())
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.entry.as_mut())
    }

    pub(crate) fn contains(&self, key: Key) -> bool {
        self.entry(key).is_some()
    }

    /// `None` if the key is not owned, otherwise whether the item is inactive.
    pub(crate) fn is_stored(&self, key: Key) -> Option<bool> {
        self.entry(key).map(|entry| entry.stored)
    }

    pub(crate) fn get(&self, key: Key) -> Option<&T> {
        self.entry(key).map(|entry| &entry.item)
    }

    pub(crate) fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        self.entry_mut(key).map(|entry| &mut entry.item)
    }

    /// Moves an owned item between the active and inactive state.
    ///
    /// # Panics
    ///
    /// Panics if the key is not owned or the item is already in the requested state.
    pub(crate) fn set_stored(&mut self, key: Key, stored: bool) {
        let entry = self
            .entry_mut(key)
            .expect("caller must only change the state of owned items");

        assert_ne!(
            entry.stored, stored,
            "caller must only change the state of an item to a different state"
        );

        entry.stored = stored;

        self.stored_len = if stored {
            self.stored_len
                .checked_add(1)
                .expect("stored items are a subset of owned items")
        } else {
            self.stored_len
                .checked_sub(1)
                .expect("an item was stored so the count cannot be zero")
        };
    }

    /// Forgets an owned item, returning it and whether it was inactive.
    pub(crate) fn remove(&mut self, key: Key) -> Option<(T, bool)> {
        if !self.contains(key) {
            return None;
        }

        let slot = self.slots.get_mut(key.index())?;
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);

        self.vacant.push(key.index());

        self.len = self
            .len
            .checked_sub(1)
            .expect("an item was owned so the count cannot be zero");

        if entry.stored {
            self.stored_len = self
                .stored_len
                .checked_sub(1)
                .expect("an item was stored so the count cannot be zero");
        }

        Some((entry.item, entry.stored))
    }

    /// Forgets every owned item, returning them in slot order.
    ///
    /// Slots are retained (with bumped generations) so that keys handed out earlier stay invalid.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        let mut items = Vec::with_capacity(self.len);

        for slot in &mut self.slots {
            if let Some(entry) = slot.entry.take() {
                slot.generation = slot.generation.wrapping_add(1);
                items.push(entry.item);
            }
        }

        // Reuse low indexes first, same as a freshly created arena would.
        self.vacant = (0..self.slots.len()).rev().collect();
        self.len = 0;
        self.stored_len = 0;

        items
    }

    /// Keys of all owned items in slot order.
    pub(crate) fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys_where(|_| true)
    }

    /// Keys of all active items in slot order.
    pub(crate) fn active_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys_where(|stored| !stored)
    }

    fn keys_where(&self, filter: fn(bool) -> bool) -> impl Iterator<Item = Key> + '_ {
        let pool_id = self.pool_id;

        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(index, slot)| {
                slot.entry
                    .as_ref()
                    .filter(|entry| filter(entry.stored))
                    .map(|_| Key::new(pool_id, index, slot.generation))
            })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut slots = Slots::new(PoolId::next(), 0);

        let a = slots.insert("a", false);
        let b = slots.insert("b", true);

        assert_eq!(slots.len(), 2);
        assert_eq!(slots.stored_len(), 1);
        assert_eq!(slots.get(a), Some(&"a"));
        assert_eq!(slots.get(b), Some(&"b"));
        assert_eq!(slots.is_stored(a), Some(false));
        assert_eq!(slots.is_stored(b), Some(true));
    }

    #[test]
    fn next_key_predicts_insert() {
        let mut slots = Slots::new(PoolId::next(), 0);

        let predicted = slots.next_key();
        assert_eq!(slots.insert(1, false), predicted);

        let second = slots.insert(2, false);
        slots.remove(predicted);

        let predicted = slots.next_key();
        assert_eq!(slots.insert(3, false), predicted);
        assert_ne!(predicted, second);
    }

    #[test]
    fn removed_key_is_not_resurrected_by_slot_reuse() {
        let mut slots = Slots::new(PoolId::next(), 0);

        let old = slots.insert(1, true);
        assert_eq!(slots.remove(old), Some((1, true)));

        let new = slots.insert(2, false);

        assert_eq!(old.index(), new.index());
        assert!(!slots.contains(old));
        assert_eq!(slots.get(old), None);
        assert_eq!(slots.get(new), Some(&2));
        assert_eq!(slots.stored_len(), 0);
    }

    #[test]
    fn foreign_key_is_not_contained() {
        let mut mine = Slots::new(PoolId::next(), 0);
        let mut theirs = Slots::new(PoolId::next(), 0);

        _ = mine.insert(1, false);
        let foreign = theirs.insert(1, false);

        assert!(!mine.contains(foreign));
        assert_eq!(mine.remove(foreign), None);
        assert_eq!(mine.len(), 1);
    }

    #[test]
    fn set_stored_tracks_counts() {
        let mut slots = Slots::new(PoolId::next(), 0);
        let key = slots.insert((), false);

        slots.set_stored(key, true);
        assert_eq!(slots.stored_len(), 1);
        assert_eq!(slots.active_keys().count(), 0);

        slots.set_stored(key, false);
        assert_eq!(slots.stored_len(), 0);
        assert_eq!(slots.active_keys().collect::<Vec<_>>(), vec![key]);
    }

    #[test]
    #[should_panic(expected = "different state")]
    fn set_stored_twice_panics() {
        let mut slots = Slots::new(PoolId::next(), 0);
        let key = slots.insert((), true);

        slots.set_stored(key, true);
    }

    #[test]
    fn drain_invalidates_all_keys() {
        let mut slots = Slots::new(PoolId::next(), 0);
        let a = slots.insert('a', true);
        let b = slots.insert('b', false);

        assert_eq!(slots.drain(), vec!['a', 'b']);
        assert_eq!(slots.len(), 0);
        assert_eq!(slots.stored_len(), 0);
        assert!(!slots.contains(a));
        assert!(!slots.contains(b));

        let c = slots.insert('c', false);
        assert_eq!(c.index(), 0);
        assert_ne!(c, a);
        assert_eq!(slots.keys().collect::<Vec<_>>(), vec![c]);
    }
}
