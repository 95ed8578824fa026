//! A bounded doubly linked list with stable node handles.
//!
//! Nodes live in an [`Arena`] and are linked by index between two sentinel
//! nodes, so every operation is O(1) and no `unsafe` is needed. The handle
//! returned by [`List::add`] stays valid until the node is removed.

use crate::arena::Arena;
use core::fmt;
use core::num::NonZeroUsize;

/// A node in the doubly linked list. `val` is `None` only for sentinels.
struct Entry<T> {
    val: Option<T>,
    prev: usize,
    next: usize,
}

/// A doubly linked list with fixed capacity.
///
/// The front of the list is the most recently added or moved node; the back
/// is the oldest.
pub(crate) struct List<T> {
    /// Maximum number of items the list can hold.
    cap: NonZeroUsize,
    nodes: Arena<Entry<T>>,
    head: usize,
    tail: usize,
}

impl<T> List<T> {
    /// Creates a list that holds at most `cap` items.
    pub(crate) fn new(cap: NonZeroUsize) -> List<T> {
        let mut nodes = Arena::with_capacity(cap.get() + 2);
        let head = nodes.insert(Entry {
            val: None,
            prev: 0,
            next: 0,
        });
        let tail = nodes.insert(Entry {
            val: None,
            prev: head,
            next: 0,
        });
        nodes[head].next = tail;
        nodes[tail].next = tail;
        nodes[head].prev = head;

        List {
            cap,
            nodes,
            head,
            tail,
        }
    }

    /// Returns the maximum number of items the list can hold.
    pub(crate) fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    /// Returns the current number of items in the list.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len() - 2
    }

    /// Returns true if the list contains no items.
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the list is at capacity.
    pub(crate) fn is_full(&self) -> bool {
        self.len() == self.cap.get()
    }

    #[inline]
    fn is_sentinel(&self, node: usize) -> bool {
        node == self.head || node == self.tail
    }

    /// Removes the last (least recently added) item from the list.
    pub(crate) fn remove_last(&mut self) -> Option<T> {
        let prev = self.nodes[self.tail].prev;
        if prev == self.head {
            return None;
        }
        self.remove(prev)
    }

    /// Detaches `node` and returns its value. Sentinels and vacant handles
    /// yield `None`.
    pub(crate) fn remove(&mut self, node: usize) -> Option<T> {
        if self.is_sentinel(node) || self.nodes.get(node).is_none() {
            return None;
        }
        self.detach(node);
        self.nodes.remove(node).and_then(|e| e.val)
    }

    fn detach(&mut self, node: usize) {
        let (prev, next) = (self.nodes[node].prev, self.nodes[node].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    /// Links `node` right after the head sentinel.
    fn attach(&mut self, node: usize) {
        let first = self.nodes[self.head].next;
        self.nodes[node].prev = self.head;
        self.nodes[node].next = first;
        self.nodes[first].prev = node;
        self.nodes[self.head].next = node;
    }

    /// Moves a node to the front of the list.
    pub(crate) fn move_to_front(&mut self, node: usize) {
        if self.is_sentinel(node) || self.nodes[self.head].next == node {
            return;
        }
        self.detach(node);
        self.attach(node);
    }

    /// Adds a value to the front of the list.
    ///
    /// Returns the handle of the new node, or `None` if the list is full.
    pub(crate) fn add(&mut self, v: T) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let node = self.nodes.insert(Entry {
            val: Some(v),
            prev: self.head,
            next: self.head,
        });
        self.attach(node);
        Some(node)
    }

    /// Replaces the value of `node` and returns the old one.
    pub(crate) fn update(&mut self, node: usize, v: T) -> Option<T> {
        if self.is_sentinel(node) {
            return None;
        }
        self.nodes.get_mut(node)?.val.replace(v)
    }

    /// Gets a reference to the value of `node`.
    pub(crate) fn get_value(&self, node: usize) -> Option<&T> {
        if self.is_sentinel(node) {
            return None;
        }
        self.nodes.get(node)?.val.as_ref()
    }

    /// Gets a mutable reference to the value of `node`.
    pub(crate) fn get_value_mut(&mut self, node: usize) -> Option<&mut T> {
        if self.is_sentinel(node) {
            return None;
        }
        self.nodes.get_mut(node)?.val.as_mut()
    }

    /// Value at the back of the list.
    pub(crate) fn back(&self) -> Option<&T> {
        let prev = self.nodes[self.tail].prev;
        self.get_value(prev)
    }

    /// Iterates values from front to back.
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cur: self.nodes[self.head].next,
        }
    }

    /// Clears the list, removing all entries.
    pub(crate) fn clear(&mut self) {
        *self = List::new(self.cap);
    }
}

/// Front-to-back iterator over a [`List`].
pub(crate) struct Iter<'a, T> {
    list: &'a List<T>,
    cur: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.cur == self.list.tail {
            return None;
        }
        let entry = &self.list.nodes[self.cur];
        self.cur = entry.next;
        entry.val.as_ref()
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("cap", &self.cap)
            .field("len", &self.len())
            .field("values", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}
