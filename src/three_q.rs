//! Three-round LRU list.
//!
//! The recency list behind [`ConcurrentLruCache`](crate::ConcurrentLruCache).
//! Entries are ordered from the most recently linked (head) to the least
//! recently linked (tail), and each carries the logical time of its last
//! visit. Instead of keeping the order exact, the list remembers the
//! timestamps at which the last three "rounds" of visits began:
//!
//! ```text
//!            first round        middle round        last round
//!   head ──▶ [ ... newer ... ] [ ... ........ ... ] [ ... older ... ] ◀── tail
//!                 ▲                  ▲                    ▲
//!         first_header_time  middle_header_time   last_header_time
//! ```
//!
//! An entry whose last visit is not newer than `last_header_time` has gone
//! untouched for at least two full rounds and may be evicted. The victim
//! search walks from the tail; entries it passes over were visited recently
//! and are moved back to the head in one splice, so the next search does not
//! walk them again. A search that walks `victim_size` entries without a
//! match rolls the header times forward using the entry under the cursor,
//! which guarantees that a long walk eventually finds a victim or ends.
//!
//! The list does not own its nodes. They live in an [`Arena`] owned by the
//! cache and every operation borrows it.

use crate::arena::Arena;
use core::fmt;

/// Link value of a node that has no neighbour on that side.
pub(crate) const NIL: usize = usize::MAX;

/// A node of the 3Q list.
#[derive(Debug)]
pub(crate) struct LruNode<T> {
    pub(crate) item: T,
    /// Logical time of the last visit.
    pub(crate) last_visit_at: u64,
    /// Neighbour towards the head.
    prev: usize,
    /// Neighbour towards the tail.
    next: usize,
    linked: bool,
}

impl<T> LruNode<T> {
    pub(crate) fn new(item: T, last_visit_at: u64) -> Self {
        Self {
            item,
            last_visit_at,
            prev: NIL,
            next: NIL,
            linked: false,
        }
    }
}

/// Intrusive recency list with three round-header timestamps.
#[derive(Default)]
pub(crate) struct ThreeQLruList {
    head: usize,
    tail: usize,
    walk_through: usize,
    first_header_time: u64,
    middle_header_time: u64,
    last_header_time: u64,
    /// Entries passed over by victim searches.
    scanned: u64,
    /// Header time pushes, from the cache or from a long walk.
    header_pushes: u64,
}

impl ThreeQLruList {
    pub(crate) fn new() -> Self {
        Self {
            head: NIL,
            tail: NIL,
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub(crate) fn head(&self) -> Option<usize> {
        (self.head != NIL).then_some(self.head)
    }

    #[cfg(test)]
    pub(crate) fn tail(&self) -> Option<usize> {
        (self.tail != NIL).then_some(self.tail)
    }

    /// Node indices from head to tail. Panics on a broken back link.
    #[cfg(test)]
    pub(crate) fn indices<T>(&self, nodes: &Arena<LruNode<T>>) -> Vec<usize> {
        let mut out = Vec::new();
        let mut prev = NIL;
        let mut cur = self.head;
        while cur != NIL {
            assert_eq!(nodes[cur].prev, prev, "broken back link at {cur}");
            assert!(nodes[cur].linked);
            out.push(cur);
            prev = cur;
            cur = nodes[cur].next;
        }
        assert_eq!(self.tail, prev);
        out
    }

    /// Header times as `(first, middle, last)`.
    #[cfg(test)]
    pub(crate) fn header_times(&self) -> (u64, u64, u64) {
        (
            self.first_header_time,
            self.middle_header_time,
            self.last_header_time,
        )
    }

    pub(crate) fn scanned(&self) -> u64 {
        self.scanned
    }

    pub(crate) fn header_pushes(&self) -> u64 {
        self.header_pushes
    }

    /// Starts a new round at `time`; the oldest round header is dropped.
    pub(crate) fn push_header_time(&mut self, time: u64) {
        self.last_header_time = self.middle_header_time;
        self.middle_header_time = self.first_header_time;
        self.first_header_time = time;
        self.header_pushes += 1;
    }

    /// Links `idx` at the head.
    pub(crate) fn add_entry<T>(&mut self, nodes: &mut Arena<LruNode<T>>, idx: usize) {
        let old_head = self.head;
        {
            let node = &mut nodes[idx];
            node.prev = NIL;
            node.next = old_head;
            node.linked = true;
        }
        if old_head != NIL {
            nodes[old_head].prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
    }

    /// Unlinks `idx`. Does nothing if it is not linked.
    pub(crate) fn remove_entry<T>(&mut self, nodes: &mut Arena<LruNode<T>>, idx: usize) {
        if !nodes[idx].linked {
            return;
        }
        let (prev, next) = (nodes[idx].prev, nodes[idx].next);

        if prev == NIL {
            self.head = next;
        } else {
            nodes[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            nodes[next].prev = prev;
        }

        let node = &mut nodes[idx];
        node.prev = NIL;
        node.next = NIL;
        node.linked = false;
    }

    /// Moves a linked node to the head.
    pub(crate) fn move_to_head<T>(&mut self, nodes: &mut Arena<LruNode<T>>, idx: usize) {
        if self.head == idx {
            return;
        }
        self.remove_entry(nodes, idx);
        self.add_entry(nodes, idx);
    }

    /// Looks for an entry not visited since the last round header.
    ///
    /// On success the victim is unlinked and returned, and the entries the
    /// walk passed over are spliced onto the head in their current order.
    /// Returns `None` after walking the whole list without a match; the list
    /// order is unchanged in that case.
    pub(crate) fn find_victim<T>(
        &mut self,
        nodes: &mut Arena<LruNode<T>>,
        victim_size: usize,
    ) -> Option<usize> {
        let mut cur = self.tail;
        let mut time = self.last_header_time;

        while cur != NIL {
            if nodes[cur].last_visit_at <= time {
                self.take_victim(nodes, cur);
                return Some(cur);
            }

            self.scanned += 1;
            self.walk_through += 1;
            if self.walk_through >= victim_size {
                self.walk_through = 0;
                self.push_header_time(nodes[cur].last_visit_at);
                time = self.last_header_time;
            }
            cur = nodes[cur].prev;
        }

        None
    }

    /// Unlinks `victim` and moves the run between it and the tail to the
    /// head.
    fn take_victim<T>(&mut self, nodes: &mut Arena<LruNode<T>>, victim: usize) {
        let run_start = nodes[victim].next;
        let run_end = self.tail;
        self.remove_entry(nodes, victim);

        if run_start == NIL {
            return;
        }
        let before = nodes[run_start].prev;
        if before == NIL {
            // The run already starts at the head.
            return;
        }

        nodes[before].next = NIL;
        self.tail = before;

        nodes[run_end].next = self.head;
        nodes[self.head].prev = run_end;
        nodes[run_start].prev = NIL;
        self.head = run_start;
    }

    /// Forgets every node. The arena is cleared by the caller.
    pub(crate) fn clear(&mut self) {
        self.head = NIL;
        self.tail = NIL;
        self.walk_through = 0;
    }
}

impl fmt::Debug for ThreeQLruList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreeQLruList")
            .field("walk_through", &self.walk_through)
            .field("first_header_time", &self.first_header_time)
            .field("middle_header_time", &self.middle_header_time)
            .field("last_header_time", &self.last_header_time)
            .finish()
    }
}
