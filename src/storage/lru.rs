//! Recency List
//!
//! A doubly-linked LRU list stored as an indexed slot arena instead of a
//! pointer-chased linked list. Each slot holds `{prev, next, key}`; freed
//! slots are chained into a free list and reused. A key→slot map gives O(1)
//! touch, remove, and tail eviction.
//!
//! Head is most-recently-used, tail is the eviction victim.

use std::collections::HashMap;

/// Sentinel index for "no slot".
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Slot {
    prev: usize,
    next: usize,
    key: String,
}

/// Doubly-linked recency list with O(1) operations.
#[derive(Debug, Default)]
pub struct LruList {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
    head: usize,
    tail: usize,
    /// Head of the free-slot chain (linked through `next`).
    free: usize,
    len: usize,
}

impl LruList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
            head: NIL,
            tail: NIL,
            free: NIL,
            len: 0,
        }
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if `key` has a position in the list.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Moves `key` to the head, inserting it if absent.
    pub fn touch(&mut self, key: &str) {
        if let Some(&idx) = self.index.get(key) {
            if self.head == idx {
                return;
            }
            self.unlink(idx);
            self.push_front(idx);
        } else {
            let idx = self.alloc(key.to_owned());
            self.push_front(idx);
            self.index.insert(key.to_owned(), idx);
            self.len += 1;
        }
    }

    /// Removes `key` from the list. Returns `true` if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.index.remove(key) {
            Some(idx) => {
                self.unlink(idx);
                self.release(idx);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Removes and returns the least-recently-used key.
    pub fn pop_tail(&mut self) -> Option<String> {
        if self.tail == NIL {
            return None;
        }
        let idx = self.tail;
        self.unlink(idx);
        let key = self.release(idx);
        self.index.remove(&key);
        self.len -= 1;
        Some(key)
    }

    /// Drops every key and recycles all slots.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.head = NIL;
        self.tail = NIL;
        self.free = NIL;
        self.len = 0;
    }

    /// Keys from most- to least-recently-used. Test and debug aid.
    #[cfg(test)]
    fn iter_keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.len);
        let mut idx = self.head;
        while idx != NIL {
            keys.push(self.slots[idx].key.as_str());
            idx = self.slots[idx].next;
        }
        keys
    }

    fn alloc(&mut self, key: String) -> usize {
        if self.free != NIL {
            let idx = self.free;
            self.free = self.slots[idx].next;
            self.slots[idx].key = key;
            self.slots[idx].prev = NIL;
            self.slots[idx].next = NIL;
            idx
        } else {
            self.slots.push(Slot {
                prev: NIL,
                next: NIL,
                key,
            });
            self.slots.len() - 1
        }
    }

    /// Returns the slot's key and chains the slot onto the free list.
    fn release(&mut self, idx: usize) -> String {
        let key = std::mem::take(&mut self.slots[idx].key);
        self.slots[idx].prev = NIL;
        self.slots[idx].next = self.free;
        self.free = idx;
        key
    }

    /// Detaches `idx` from its neighbors without touching the free list.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        if prev != NIL {
            self.slots[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.slots[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.slots[idx].prev = NIL;
        self.slots[idx].next = NIL;
    }

    fn push_front(&mut self, idx: usize) {
        self.slots[idx].prev = NIL;
        self.slots[idx].next = self.head;
        if self.head != NIL {
            self.slots[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_inserts_at_head() {
        let mut lru = LruList::new();
        lru.touch("a");
        lru.touch("b");
        lru.touch("c");

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.iter_keys(), vec!["c", "b", "a"]);
    }

    #[test]
    fn touch_existing_moves_to_head() {
        let mut lru = LruList::new();
        lru.touch("a");
        lru.touch("b");
        lru.touch("c");
        lru.touch("a");

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.iter_keys(), vec!["a", "c", "b"]);
    }

    #[test]
    fn pop_tail_returns_least_recent() {
        let mut lru = LruList::new();
        lru.touch("a");
        lru.touch("b");
        lru.touch("c");
        lru.touch("a"); // order now: a, c, b

        assert_eq!(lru.pop_tail(), Some("b".to_string()));
        assert_eq!(lru.pop_tail(), Some("c".to_string()));
        assert_eq!(lru.pop_tail(), Some("a".to_string()));
        assert_eq!(lru.pop_tail(), None);
        assert!(lru.is_empty());
    }

    #[test]
    fn remove_detaches_anywhere() {
        let mut lru = LruList::new();
        lru.touch("a");
        lru.touch("b");
        lru.touch("c");

        assert!(lru.remove("b"));
        assert!(!lru.remove("b"));
        assert_eq!(lru.iter_keys(), vec!["c", "a"]);

        assert!(lru.remove("c")); // head
        assert_eq!(lru.iter_keys(), vec!["a"]);
        assert!(lru.remove("a")); // last
        assert!(lru.is_empty());
    }

    #[test]
    fn slots_are_reused_after_removal() {
        let mut lru = LruList::new();
        for i in 0..8 {
            lru.touch(&format!("k{}", i));
        }
        for i in 0..8 {
            assert!(lru.remove(&format!("k{}", i)));
        }
        for i in 8..16 {
            lru.touch(&format!("k{}", i));
        }
        // the arena never grew past the first eight slots
        assert_eq!(lru.slots.len(), 8);
        assert_eq!(lru.len(), 8);
    }

    #[test]
    fn single_entry_is_both_head_and_tail() {
        let mut lru = LruList::new();
        lru.touch("only");
        lru.touch("only");
        assert_eq!(lru.len(), 1);
        assert_eq!(lru.pop_tail(), Some("only".to_string()));
    }

    /// Model-based check: random touch/remove/pop sequences against a
    /// straightforward Vec model must agree on ordering at every step.
    #[test]
    fn random_ops_match_vec_model() {
        use rand::prelude::*;

        let mut rng = StdRng::seed_from_u64(0x9e3779b9);
        let mut lru = LruList::new();
        let mut model: Vec<String> = Vec::new(); // front = MRU

        for _ in 0..5000 {
            let key = format!("k{}", rng.gen_range(0..32));
            match rng.gen_range(0..4) {
                0 | 1 => {
                    lru.touch(&key);
                    model.retain(|k| k != &key);
                    model.insert(0, key);
                }
                2 => {
                    let expected = model.iter().any(|k| k == &key);
                    assert_eq!(lru.remove(&key), expected);
                    model.retain(|k| k != &key);
                }
                _ => {
                    assert_eq!(lru.pop_tail(), model.pop());
                }
            }
            assert_eq!(lru.len(), model.len());
        }

        assert_eq!(
            lru.iter_keys(),
            model.iter().map(|s| s.as_str()).collect::<Vec<_>>()
        );
    }
}
