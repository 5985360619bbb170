//! Recency list backing the cache
//!
//! Entries live in a slot arena; the key index maps keys to slot ids and
//! the prev/next links order slots from most to least recently used.
//! Not synchronized: `LruCache` serializes all access through its lock.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use ahash::RandomState;

/// Slot in the recency arena
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Key index plus doubly-linked recency order with fixed capacity
pub(crate) struct RecencyList<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K, V>>>,
    /// Most recently used
    head: Option<usize>,
    /// Least recently used, next eviction target
    tail: Option<usize>,
    free_list: Vec<usize>,
    capacity: usize,
}

impl<K, V> RecencyList<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create an empty list. `capacity` is validated by the caller.
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);

        Self {
            map: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free_list: Vec::new(),
            capacity,
        }
    }

    /// Look up a value and promote it to the front
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Look up a value without touching the recency order
    pub(crate) fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Insert or overwrite a key, moving it to the front.
    ///
    /// Returns the evicted least-recently-used entry when a new key
    /// arrives at full capacity. Overwrites never evict.
    pub(crate) fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.map.get(&key) {
            if let Some(node) = &mut self.nodes[idx] {
                node.value = value;
            }
            self.move_to_front(idx);
            return None;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.pop_back()
        } else {
            None
        };

        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.push_front(idx);
        self.map.insert(key, idx);

        evicted
    }

    /// Remove a key, returning its value if it was present
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.map.remove(key)?;
        self.unlink(idx);
        self.free_node(idx).map(|node| node.value)
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterate entries from most to least recently used
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
            remaining: self.map.len(),
        }
    }

    /// Verify the index/order bijection and link structure.
    ///
    /// Walks the whole list, so this is O(n) and meant for tests and
    /// diagnostics only.
    pub(crate) fn check(&self) -> bool {
        if self.map.len() > self.capacity {
            return false;
        }

        let mut seen = 0usize;
        let mut prev: Option<usize> = None;
        let mut cursor = self.head;

        while let Some(idx) = cursor {
            let Some(node) = self.nodes.get(idx).and_then(|slot| slot.as_ref()) else {
                return false;
            };
            if node.prev != prev || self.map.get(&node.key) != Some(&idx) {
                return false;
            }
            seen += 1;
            // A cycle would walk past the number of live slots
            if seen > self.map.len() {
                return false;
            }
            prev = cursor;
            cursor = node.next;
        }

        let live = self.nodes.iter().filter(|slot| slot.is_some()).count();
        seen == self.map.len() && live == seen && self.tail == prev
    }

    fn push_front(&mut self, idx: usize) {
        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = self.head;
        }

        match self.head {
            Some(head_idx) => {
                if let Some(head) = &mut self.nodes[head_idx] {
                    head.prev = Some(idx);
                }
            }
            None => self.tail = Some(idx),
        }

        self.head = Some(idx);
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }

        self.unlink(idx);
        self.push_front(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match &self.nodes[idx] {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = None;
        }
    }

    fn pop_back(&mut self) -> Option<(K, V)> {
        let tail_idx = self.tail?;
        self.unlink(tail_idx);
        let node = self.free_node(tail_idx)?;
        self.map.remove(&node.key);
        Some((node.key, node.value))
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }

    fn free_node(&mut self, idx: usize) -> Option<Node<K, V>> {
        let node = self.nodes[idx].take();
        if node.is_some() {
            self.free_list.push(idx);
        }
        node
    }
}

/// Front-to-back iterator over a `RecencyList`
pub(crate) struct Iter<'a, K, V> {
    nodes: &'a [Option<Node<K, V>>],
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = self.nodes[idx].as_ref()?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<V>(list: &RecencyList<&'static str, V>) -> Vec<&'static str> {
        list.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_lru_basic() {
        let mut list = RecencyList::new(2);

        list.put(1, "a");
        list.put(2, "b");

        assert_eq!(list.get(&1), Some(&"a"));
        assert_eq!(list.get(&2), Some(&"b"));
        assert_eq!(list.len(), 2);
        assert!(list.check());
    }

    #[test]
    fn test_lru_eviction() {
        let mut list = RecencyList::new(2);

        assert_eq!(list.put(1, "a"), None);
        assert_eq!(list.put(2, "b"), None);
        assert_eq!(list.put(3, "c"), Some((1, "a")));

        assert_eq!(list.get(&1), None);
        assert_eq!(list.get(&2), Some(&"b"));
        assert_eq!(list.get(&3), Some(&"c"));
        assert!(list.check());
    }

    #[test]
    fn test_lru_get_promotes() {
        let mut list = RecencyList::new(2);

        list.put(1, "a");
        list.put(2, "b");
        list.get(&1);
        assert_eq!(list.put(3, "c"), Some((2, "b")));

        assert_eq!(list.get(&1), Some(&"a"));
        assert_eq!(list.get(&2), None);
        assert_eq!(list.get(&3), Some(&"c"));
    }

    #[test]
    fn test_lru_peek_does_not_promote() {
        let mut list = RecencyList::new(2);

        list.put(1, "a");
        list.put(2, "b");
        assert_eq!(list.peek(&1), Some(&"a"));
        assert_eq!(list.put(3, "c"), Some((1, "a")));
    }

    #[test]
    fn test_lru_order() {
        let mut list = RecencyList::new(3);

        list.put("A", 1);
        list.put("B", 2);
        list.put("C", 3);
        assert_eq!(keys(&list), ["C", "B", "A"]);

        list.get("A");
        assert_eq!(keys(&list), ["A", "C", "B"]);

        list.put("B", 20);
        assert_eq!(keys(&list), ["B", "A", "C"]);
        assert!(list.check());
    }

    #[test]
    fn test_lru_remove() {
        let mut list = RecencyList::new(3);

        list.put(1, "a");
        list.put(2, "b");
        list.put(3, "c");

        assert_eq!(list.remove(&2), Some("b"));
        assert_eq!(list.remove(&2), None);
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(&2), None);
        assert!(list.check());
    }

    #[test]
    fn test_lru_remove_head_and_tail() {
        let mut list = RecencyList::new(3);

        list.put("A", 1);
        list.put("B", 2);
        list.put("C", 3);

        list.remove("C");
        list.remove("A");
        assert_eq!(keys(&list), ["B"]);
        assert!(list.check());

        list.remove("B");
        assert_eq!(list.len(), 0);
        assert!(list.check());
    }

    #[test]
    fn test_lru_slot_reuse() {
        let mut list = RecencyList::new(2);

        for i in 0..100 {
            list.put(i, i * 10);
        }

        assert_eq!(list.len(), 2);
        assert!(list.nodes.len() <= 3);
        assert_eq!(list.peek(&99), Some(&990));
        assert_eq!(list.peek(&98), Some(&980));
        assert!(list.check());
    }

    #[test]
    fn test_lru_clear() {
        let mut list = RecencyList::new(3);

        list.put(1, "a");
        list.put(2, "b");
        list.clear();

        assert_eq!(list.len(), 0);
        assert_eq!(list.iter().count(), 0);
        assert!(list.check());

        list.put(3, "c");
        assert_eq!(list.get(&3), Some(&"c"));
    }

    #[test]
    fn test_lru_overwrite() {
        let mut list = RecencyList::new(2);

        list.put(1, "a");
        assert_eq!(list.put(1, "b"), None);

        assert_eq!(list.get(&1), Some(&"b"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_lru_overwrite_at_capacity() {
        let mut list = RecencyList::new(2);

        list.put(1, "a");
        list.put(2, "b");
        assert_eq!(list.put(1, "z"), None);

        assert!(list.contains(&1));
        assert!(list.contains(&2));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_lru_borrowed_lookup() {
        let mut list: RecencyList<String, i32> = RecencyList::new(2);

        list.put("users".to_string(), 1);

        assert_eq!(list.get("users"), Some(&1));
        assert!(list.contains("users"));
        assert_eq!(list.remove("users"), Some(1));
    }

    #[test]
    fn test_lru_check_detects_broken_links() {
        let mut list = RecencyList::new(3);

        list.put(1, "a");
        list.put(2, "b");
        assert!(list.check());

        list.tail = list.head;
        assert!(!list.check());
    }
}
