//! A single shard of [`SegmentLfuCache`](crate::SegmentLfuCache).
//!
//! A segment is a small LFU hash map. It owns a power-of-two table of bucket
//! sentinels and one extra sentinel, the *LFU head*, that anchors a circular
//! list of every entry in the segment:
//!
//! ```text
//!   table[0]  ⇄ e3 ⇄ e7 ⇄ (table[0])        bucket chains, circular
//!   table[1]  ⇄ (table[1])                  empty bucket: self-linked
//!   ...
//!   LFU head ⇄ e7 ⇄ e5 ⇄ e3 ⇄ ... ⇄ (LFU head)   eviction ring
//! ```
//!
//! Eviction is a clock approximation of LFU. The LFU head doubles as the
//! clock hand: a sweep starts at the entry just before the head and moves
//! towards the front, decrementing each entry's visit counter. The first
//! entry that drops to zero is the victim and the head takes its place in the
//! ring, so the next sweep resumes where this one stopped. A sweep looks at
//! no more than a third of the segment (plus a small constant); when that
//! budget runs out the head is parked behind the last visited entry and the
//! sweep reports no victim, letting the caller move on to another segment.
//!
//! All methods take `&mut self`; the owning cache wraps each segment in its
//! own mutex.

use crate::arena::Arena;
use crate::error::CacheError;
use crate::metrics::SegmentLfuMetrics;
use core::borrow::Borrow;
use core::fmt;

/// Link value of a field that is not part of any list.
const NIL: usize = usize::MAX;

/// Hash code stored in sentinel nodes.
const SENTINEL_HASH: u32 = u32::MAX;

/// A node of the segment: either a live entry or a sentinel.
pub(crate) struct ItemEntry<K, V> {
    hash: u32,
    /// Number of visits not yet consumed by the clock hand.
    visits: u32,
    /// `None` for sentinels.
    kv: Option<(K, V)>,
    map_prev: usize,
    map_next: usize,
    link_prev: usize,
    link_next: usize,
}

impl<K, V> ItemEntry<K, V> {
    fn sentinel(idx: usize) -> Self {
        Self {
            hash: SENTINEL_HASH,
            visits: 0,
            kv: None,
            map_prev: idx,
            map_next: idx,
            link_prev: NIL,
            link_next: NIL,
        }
    }

    fn new(key: K, value: V, hash: u32) -> Self {
        Self {
            hash,
            visits: 1,
            kv: Some((key, value)),
            map_prev: NIL,
            map_next: NIL,
            link_prev: NIL,
            link_next: NIL,
        }
    }
}

/// An LFU hash map with sentinel-headed bucket chains and a clock-rotated
/// eviction ring.
pub(crate) struct Segment<K, V> {
    nodes: Arena<ItemEntry<K, V>>,
    entry_mask: u32,
    lfu_head: usize,
    item_size: usize,
    metrics: SegmentLfuMetrics,
}

impl<K, V> Segment<K, V> {
    /// Creates a segment with `entry_size` buckets.
    ///
    /// `entry_size` must be a power of two so a bucket can be selected by
    /// masking the hash.
    pub(crate) fn new(entry_size: usize) -> Result<Self, CacheError> {
        if !entry_size.is_power_of_two() || entry_size > u32::MAX as usize {
            return Err(CacheError::InvalidEntrySize(entry_size));
        }

        let mut nodes = Arena::with_capacity(entry_size * 2 + 1);
        for i in 0..entry_size {
            let idx = nodes.insert(ItemEntry::sentinel(i));
            debug_assert_eq!(idx, i);
        }
        let lfu_head = nodes.insert(ItemEntry::sentinel(entry_size));
        nodes[lfu_head].link_prev = lfu_head;
        nodes[lfu_head].link_next = lfu_head;

        #[allow(clippy::cast_possible_truncation)]
        let entry_mask = (entry_size - 1) as u32;

        Ok(Self {
            nodes,
            entry_mask,
            lfu_head,
            item_size: 0,
            metrics: SegmentLfuMetrics::new(),
        })
    }

    /// Number of entries stored in this segment.
    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.item_size
    }

    #[inline]
    pub(crate) fn metrics(&self) -> &SegmentLfuMetrics {
        &self.metrics
    }

    /// Index of the bucket sentinel for `hash`.
    #[inline]
    pub(crate) fn entry_for(&self, hash: u32) -> usize {
        (hash & self.entry_mask) as usize
    }

    /// Walks the bucket chain of `hash` looking for `key`.
    pub(crate) fn find_item<Q>(&self, hash: u32, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let head = self.entry_for(hash);
        let mut cur = self.nodes[head].map_next;
        while cur != head {
            let node = &self.nodes[cur];
            if node.hash == hash {
                if let Some((k, _)) = &node.kv {
                    if k.borrow() == key {
                        return Some(cur);
                    }
                }
            }
            cur = node.map_next;
        }
        None
    }

    /// Looks up `key`, counting the visit. Returns a clone of the value.
    pub(crate) fn get<Q>(&mut self, hash: u32, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        V: Clone,
    {
        match self.find_item(hash, key) {
            Some(idx) => {
                let node = &mut self.nodes[idx];
                node.visits = node.visits.saturating_add(1);
                self.metrics.core.record_hit();
                node.kv.as_ref().map(|(_, v)| v.clone())
            }
            None => {
                self.metrics.core.record_miss();
                None
            }
        }
    }

    /// Stores `value` under `key`.
    ///
    /// A new key is linked at the front of its bucket and right after the LFU
    /// head with one visit. An existing key gets its value replaced and one
    /// more visit; its ring position does not change. Returns the previous
    /// value, if any.
    pub(crate) fn put(&mut self, hash: u32, key: K, value: V) -> Option<V>
    where
        K: Eq,
    {
        if let Some(idx) = self.find_item(hash, &key) {
            let node = &mut self.nodes[idx];
            node.visits = node.visits.saturating_add(1);
            self.metrics.core.record_update();
            return node.kv.as_mut().map(|(_, v)| core::mem::replace(v, value));
        }

        self.add_new_item(hash, key, value);
        self.metrics.core.record_insertion();
        None
    }

    /// Unlinks `key` from both chains and returns its value.
    pub(crate) fn remove<Q>(&mut self, hash: u32, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let idx = self.find_item(hash, key)?;
        self.unlink_map(idx);
        self.unlink_link(idx);
        self.metrics.core.record_removal();
        self.release(idx).map(|(_, v)| v)
    }

    /// Runs one clock sweep. Returns the number of entries evicted (0 or 1).
    ///
    /// A sweep visits at most `size / 3 + 3` entries. Returning 0 with a
    /// non-empty segment means the budget ran out; the next sweep continues
    /// from the parked hand with already-decremented counters, so repeated
    /// calls always make progress.
    pub(crate) fn eviction(&mut self) -> usize {
        let head = self.lfu_head;
        let batch_size = self.item_size / 3 + 3;
        let mut tail = self.nodes[head].link_prev;
        let mut walked = 0;

        if tail == head {
            return 0;
        }
        self.metrics.eviction_sweeps += 1;

        while tail != head {
            walked += 1;
            if walked > batch_size {
                // Park the hand behind `tail` so this run is not rescanned.
                self.unlink_link(head);
                self.link_after(head, tail);
                self.metrics.batch_exhausted += 1;
                return 0;
            }
            self.metrics.entries_scanned += 1;

            let node = &mut self.nodes[tail];
            node.visits = node.visits.saturating_sub(1);
            if node.visits == 0 {
                self.unlink_map(tail);
                if self.nodes[tail].link_next == head {
                    self.unlink_link(tail);
                } else {
                    // The hand takes the victim's place in the ring.
                    self.unlink_link(head);
                    let prev = self.nodes[tail].link_prev;
                    let next = self.nodes[tail].link_next;
                    self.nodes[head].link_prev = prev;
                    self.nodes[head].link_next = next;
                    self.nodes[prev].link_next = head;
                    self.nodes[next].link_prev = head;
                }
                self.metrics.core.record_eviction();
                log::trace!("segment evicted entry with hash {:#010x}", self.nodes[tail].hash);
                self.release(tail);
                return 1;
            }

            tail = self.nodes[tail].link_prev;
        }

        0
    }

    /// Drops every entry and resets all sentinels.
    pub(crate) fn clear(&mut self) {
        let entry_size = self.lfu_head;
        let metrics = core::mem::take(&mut self.metrics);
        if let Ok(fresh) = Self::new(entry_size) {
            *self = fresh;
        }
        self.metrics = metrics;
    }

    fn add_new_item(&mut self, hash: u32, key: K, value: V) {
        let head = self.entry_for(hash);
        let idx = self.nodes.insert(ItemEntry::new(key, value, hash));

        let first = self.nodes[head].map_next;
        self.nodes[idx].map_prev = head;
        self.nodes[idx].map_next = first;
        self.nodes[first].map_prev = idx;
        self.nodes[head].map_next = idx;

        self.link_after(idx, self.lfu_head);
        self.item_size += 1;
    }

    /// Links `idx` into the LFU ring right after `after`.
    fn link_after(&mut self, idx: usize, after: usize) {
        let next = self.nodes[after].link_next;
        self.nodes[idx].link_prev = after;
        self.nodes[idx].link_next = next;
        self.nodes[next].link_prev = idx;
        self.nodes[after].link_next = idx;
    }

    fn unlink_link(&mut self, idx: usize) {
        let prev = self.nodes[idx].link_prev;
        let next = self.nodes[idx].link_next;
        self.nodes[prev].link_next = next;
        self.nodes[next].link_prev = prev;
    }

    fn unlink_map(&mut self, idx: usize) {
        let prev = self.nodes[idx].map_prev;
        let next = self.nodes[idx].map_next;
        self.nodes[prev].map_next = next;
        self.nodes[next].map_prev = prev;
    }

    /// Frees the slot of an entry already unlinked from both chains.
    fn release(&mut self, idx: usize) -> Option<(K, V)> {
        self.item_size -= 1;
        self.nodes.remove(idx).and_then(|node| node.kv)
    }
}

impl<K, V> fmt::Debug for Segment<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("entry_size", &self.lfu_head)
            .field("item_size", &self.item_size)
            .finish()
    }
}
