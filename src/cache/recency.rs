//! Recency Map Module
//!
//! Entry storage and access ordering in a single structure.
//!
//! Entries live in a `Vec` arena linked into a doubly-linked list by index,
//! with a `HashMap` from key to arena slot. A key is in the map exactly when
//! its node is linked, so the store and the recency order cannot drift apart.
//!
//! - Head = most recently used
//! - Tail = least recently used

use std::collections::HashMap;

use crate::cache::CacheEntry;

/// Null link.
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node<V> {
    entry: Option<CacheEntry<V>>,
    prev: usize,
    next: usize,
}

// == Recency Map ==
/// Key → entry map that remembers access order.
#[derive(Debug)]
pub struct RecencyMap<V> {
    index: HashMap<String, usize>,
    arena: Vec<Node<V>>,
    head: usize,
    tail: usize,
    free: usize,
}

impl<V> Default for RecencyMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RecencyMap<V> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            arena: Vec::new(),
            head: NIL,
            tail: NIL,
            free: NIL,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Looks up an entry without changing its position.
    pub fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.index
            .get(key)
            .and_then(|&idx| self.arena[idx].entry.as_ref())
    }

    /// Mutable lookup without changing position.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut CacheEntry<V>> {
        let idx = *self.index.get(key)?;
        self.arena[idx].entry.as_mut()
    }

    // == Insert ==
    /// Inserts at the most-recently-used end, replacing any existing entry
    /// under the same key. Returns the replaced entry.
    pub fn insert(&mut self, entry: CacheEntry<V>) -> Option<CacheEntry<V>> {
        let replaced = self.remove(&entry.key);
        let key = entry.key.clone();
        let idx = self.alloc(entry);
        self.push_head(idx);
        self.index.insert(key, idx);
        replaced
    }

    // == Touch ==
    /// Marks a key as recently used. Returns false if the key is absent.
    pub fn touch(&mut self, key: &str) -> bool {
        match self.index.get(key) {
            Some(&idx) => {
                if self.head != idx {
                    self.unlink(idx);
                    self.push_head(idx);
                }
                true
            }
            None => false,
        }
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let idx = self.index.remove(key)?;
        self.unlink(idx);
        let entry = self.arena[idx].entry.take();
        self.arena[idx].next = self.free;
        self.free = idx;
        entry
    }

    // == Clear ==
    /// Empties the map, handing back every entry in LRU → MRU order.
    pub fn drain(&mut self) -> Vec<CacheEntry<V>> {
        let mut drained = Vec::with_capacity(self.len());
        let mut cursor = self.tail;
        while cursor != NIL {
            let node = &mut self.arena[cursor];
            cursor = node.prev;
            if let Some(entry) = node.entry.take() {
                drained.push(entry);
            }
        }
        self.index.clear();
        self.arena.clear();
        self.head = NIL;
        self.tail = NIL;
        self.free = NIL;
        drained
    }

    /// Iterates from least to most recently used.
    pub fn iter_lru(&self) -> LruIter<'_, V> {
        LruIter {
            arena: &self.arena,
            cursor: self.tail,
        }
    }

    /// Key at the least-recently-used end.
    #[cfg(test)]
    pub(crate) fn peek_oldest(&self) -> Option<&str> {
        self.iter_lru().next().map(|entry| entry.key.as_str())
    }

    // --- linked list internals ---

    fn alloc(&mut self, entry: CacheEntry<V>) -> usize {
        let node = Node {
            entry: Some(entry),
            prev: NIL,
            next: NIL,
        };
        if self.free != NIL {
            let idx = self.free;
            self.free = self.arena[idx].next;
            self.arena[idx] = node;
            idx
        } else {
            self.arena.push(node);
            self.arena.len() - 1
        }
    }

    fn push_head(&mut self, idx: usize) {
        self.arena[idx].prev = NIL;
        self.arena[idx].next = self.head;
        if self.head != NIL {
            self.arena[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.arena[idx].prev, self.arena[idx].next);
        if prev != NIL {
            self.arena[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.arena[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.arena[idx].prev = NIL;
        self.arena[idx].next = NIL;
    }
}

/// Iterator from the least-recently-used end.
pub struct LruIter<'a, V> {
    arena: &'a [Node<V>],
    cursor: usize,
}

impl<'a, V> Iterator for LruIter<'a, V> {
    type Item = &'a CacheEntry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor != NIL {
            let node = &self.arena[self.cursor];
            self.cursor = node.prev;
            if let Some(entry) = node.entry.as_ref() {
                return Some(entry);
            }
        }
        None
    }
}
