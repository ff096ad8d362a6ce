use std::collections::VecDeque;

use itertools::Either;

use crate::{AccessMode, Key};

/// The ordered set of inactive items of a pool.
///
/// The store only holds keys. The pool keeps the items themselves in its slots and is
/// responsible for keeping the store in sync with the "stored" flag of each slot.
#[derive(Clone, Debug)]
pub(crate) enum ItemStore {
    /// [`AccessMode::FirstIn`]: keys are stored at the back and fetched from the front.
    Queue(VecDeque<Key>),

    /// [`AccessMode::LastIn`]: keys are stored and fetched at the end.
    Stack(Vec<Key>),
}

impl ItemStore {
    pub(crate) fn with_capacity(access_mode: AccessMode, capacity: usize) -> Self {
        match access_mode {
            AccessMode::FirstIn => Self::Queue(VecDeque::with_capacity(capacity)),
            AccessMode::LastIn => Self::Stack(Vec::with_capacity(capacity)),
        }
    }

    /// Creates a store that contains `keys`, as if each had been stored in iteration order.
    pub(crate) fn from_keys(access_mode: AccessMode, keys: impl IntoIterator<Item = Key>) -> Self {
        match access_mode {
            AccessMode::FirstIn => Self::Queue(keys.into_iter().collect()),
            AccessMode::LastIn => Self::Stack(keys.into_iter().collect()),
        }
    }

    pub(crate) fn access_mode(&self) -> AccessMode {
        match self {
            Self::Queue(_) => AccessMode::FirstIn,
            Self::Stack(_) => AccessMode::LastIn,
        }
    }

    pub(crate) fn store(&mut self, key: Key) {
        match self {
            Self::Queue(queue) => queue.push_back(key),
            Self::Stack(stack) => stack.push(key),
        }
    }

    pub(crate) fn fetch(&mut self) -> Option<Key> {
        match self {
            Self::Queue(queue) => queue.pop_front(),
            Self::Stack(stack) => stack.pop(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Queue(queue) => queue.len(),
            Self::Stack(stack) => stack.len(),
        }
    }

    /// Iterates over the keys in the order [`fetch()`][Self::fetch] would return them.
    pub(crate) fn iter(&self) -> impl Iterator<Item = Key> + '_ {
        match self {
            Self::Queue(queue) => Either::Left(queue.iter().copied()),
            Self::Stack(stack) => Either::Right(stack.iter().rev().copied()),
        }
    }

    /// Iterates over the keys in the order they were stored.
    fn iter_stored_order(&self) -> impl Iterator<Item = Key> + '_ {
        match self {
            Self::Queue(queue) => Either::Left(queue.iter().copied()),
            Self::Stack(stack) => Either::Right(stack.iter().copied()),
        }
    }

    /// Rebuilds the store without `key`.
    ///
    /// The remaining keys keep their relative order, so the next fetch after a removal
    /// returns the same item it would have returned if the removed key had never been stored.
    pub(crate) fn rebuild_without(&mut self, key: Key) {
        let remaining: Vec<Key> = self
            .iter_stored_order()
            .filter(|stored| *stored != key)
            .collect();

        *self = Self::from_keys(self.access_mode(), remaining);
    }
}
