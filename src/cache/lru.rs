//! LRU arena
//!
//! Entries live in a slot vector and are chained into a doubly linked
//! recency list by slot index rather than by pointer. A key → slot map
//! gives O(1) lookup; vacated slots are recycled through a free list.
//!
//! ```text
//!   index: {"a" → 2, "b" → 0, "c" → 1}
//!
//!   head ─▶ [2:"a"] ⇄ [1:"c"] ⇄ [0:"b"] ◀─ tail
//!           (MRU)                (LRU, eviction candidate)
//! ```
//!
//! Not synchronised; the store wraps it in a mutex.

use std::collections::HashMap;

use super::CacheEntry;

#[derive(Debug)]
struct Node {
    entry: CacheEntry,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Recency-ordered entry arena
#[derive(Debug, Default)]
pub(crate) struct LruList {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl LruList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    /// Slot holding `key`, if any
    pub(crate) fn find(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub(crate) fn entry(&self, slot: usize) -> Option<&CacheEntry> {
        self.slots.get(slot)?.as_ref().map(|node| &node.entry)
    }

    pub(crate) fn entry_mut(&mut self, slot: usize) -> Option<&mut CacheEntry> {
        self.slots.get_mut(slot)?.as_mut().map(|node| &mut node.entry)
    }

    /// Move a slot to the most-recently-used position
    pub(crate) fn promote(&mut self, slot: usize) {
        if self.head == Some(slot) {
            return;
        }
        self.unlink(slot);
        self.link_front(slot);
    }

    /// Add a new entry at the most-recently-used position
    ///
    /// The caller guarantees the key isn't already present.
    pub(crate) fn insert(&mut self, entry: CacheEntry) -> usize {
        let key = entry.key.clone();
        let node = Node {
            entry,
            prev: None,
            next: None,
        };

        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        self.index.insert(key, slot);
        self.link_front(slot);
        slot
    }

    /// Remove and return the least-recently-used entry
    pub(crate) fn evict_tail(&mut self) -> Option<CacheEntry> {
        let slot = self.tail?;
        self.unlink(slot);

        let node = self.slots[slot].take()?;
        self.free.push(slot);
        self.index.remove(&node.entry.key);
        Some(node.entry)
    }

    /// Keys from most- to least-recently used
    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            match &self.slots[slot] {
                Some(node) => {
                    keys.push(node.entry.key.clone());
                    cursor = node.next;
                }
                None => break,
            }
        }
        keys
    }

    fn link_front(&mut self, slot: usize) {
        let old_head = self.head;
        if let Some(node) = self.slots[slot].as_mut() {
            node.prev = None;
            node.next = old_head;
        }
        match old_head.and_then(|h| self.slots[h].as_mut()) {
            Some(head) => head.prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = match self.slots[slot].as_mut() {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev.and_then(|p| self.slots[p].as_mut()) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.slots[n].as_mut()) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }
    }
}
