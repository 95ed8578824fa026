//! Index-based node storage.
//!
//! Every intrusive structure in this crate (bucket chains, the LFU ring, the
//! 3Q list, the access-ordered list behind [`LruHashMap`](crate::LruHashMap))
//! stores its nodes in an [`Arena`] and links them with plain `usize`
//! indices. Freed slots go to a free list and are reused by later inserts,
//! so a cache at steady state stops allocating.

use core::ops::{Index, IndexMut};

/// A growable slab of `T` addressed by stable `usize` indices.
///
/// An index stays valid until the slot is removed. Indexing a vacant slot
/// panics; callers only index slots they reached through live links.
#[derive(Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value` and returns its index.
    pub(crate) fn insert(&mut self, value: T) -> usize {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = Some(value);
            idx
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        };
        self.len += 1;
        idx
    }

    /// Takes the value out of slot `idx` and returns the slot to the free list.
    pub(crate) fn remove(&mut self, idx: usize) -> Option<T> {
        let value = self.slots.get_mut(idx)?.take()?;
        self.free_list.push(idx);
        self.len -= 1;
        Some(value)
    }

    #[inline]
    pub(crate) fn get(&self, idx: usize) -> Option<&T> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    /// Number of occupied slots.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
    }
}

impl<T> Index<usize> for Arena<T> {
    type Output = T;

    #[inline]
    fn index(&self, idx: usize) -> &T {
        match self.get(idx) {
            Some(v) => v,
            None => panic!("arena slot {idx} is vacant"),
        }
    }
}

impl<T> IndexMut<usize> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, idx: usize) -> &mut T {
        match self.get_mut(idx) {
            Some(v) => v,
            None => panic!("arena slot {idx} is vacant"),
        }
    }
}
