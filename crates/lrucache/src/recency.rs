//! Recency list: keys in least-to-most recently used order
//!
//! Nodes live in a slot arena and link to each other by slot number. The
//! key index maps each resident key to its slot, so `touch`, `add` and
//! `remove_lru` never walk the list.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use ahash::RandomState;

use crate::error::{Error, Result};

/// Node in the recency list
struct Node<K> {
    key: K,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly-linked list of keys ordered by recency of use
///
/// `head` is the least recently used key, `tail` the most recently used.
pub struct RecencyList<K> {
    index: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
}

impl<K> RecencyList<K> {
    fn node(&self, idx: usize) -> Option<&Node<K>> {
        self.nodes.get(idx).and_then(Option::as_ref)
    }
}

impl<K> RecencyList<K>
where
    K: Hash + Eq + Clone,
{
    /// Create an empty recency list
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty recency list with room for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free_list: Vec::new(),
        }
    }

    /// Move `key` to the most recently used end.
    ///
    /// Relative order of every other key is preserved. Touching the current
    /// tail is a no-op.
    ///
    /// # Errors
    /// * `Error::NotFound` - `key` has no node in the list
    pub fn touch(&mut self, key: &K) -> Result<()> {
        let idx = *self.index.get(key).ok_or(Error::NotFound)?;

        if self.tail == Some(idx) {
            return Ok(()); // Already most recently used
        }

        // Covers both the head and the middle case: unlink rewires `head`
        // when the node has no predecessor.
        self.unlink(idx);
        self.link_tail(idx);
        Ok(())
    }

    /// Append a new key at the most recently used end.
    ///
    /// # Errors
    /// * `Error::DuplicateKey` - `key` already has a node
    pub fn add(&mut self, key: K) -> Result<()> {
        if self.index.contains_key(&key) {
            return Err(Error::DuplicateKey);
        }

        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            prev: None,
            next: None,
        });
        self.link_tail(idx);
        self.index.insert(key, idx);
        Ok(())
    }

    /// Remove and return the least recently used key.
    ///
    /// # Errors
    /// * `Error::Empty` - the list has no keys
    pub fn remove_lru(&mut self) -> Result<K> {
        let head_idx = self.head.ok_or(Error::Empty)?;

        self.unlink(head_idx);
        let node = self.nodes[head_idx].take().ok_or(Error::Empty)?;
        self.free_node(head_idx);
        self.index.remove(&node.key);

        Ok(node.key)
    }

    /// Number of keys in the list
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Check whether `key` has a node
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Least recently used key, the next one `remove_lru` returns
    pub fn peek_lru(&self) -> Option<&K> {
        self.head.and_then(|idx| self.node(idx)).map(|node| &node.key)
    }

    /// Most recently used key
    pub fn peek_mru(&self) -> Option<&K> {
        self.tail.and_then(|idx| self.node(idx)).map(|node| &node.key)
    }

    /// Iterate keys from least to most recently used
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len(),
        }
    }

    /// Drop every key
    pub fn clear(&mut self) {
        self.index.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<K>> {
        self.nodes.get_mut(idx).and_then(Option::as_mut)
    }

    /// Splice `idx` out of the list, rewiring its neighbours and head/tail.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.node_mut(idx) {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = self.node_mut(prev_idx) {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = self.node_mut(next_idx) {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    /// Attach a detached node after the current tail.
    fn link_tail(&mut self, idx: usize) {
        let old_tail = self.tail;

        if let Some(node) = self.node_mut(idx) {
            node.prev = old_tail;
            node.next = None;
        }

        match old_tail {
            Some(tail_idx) => {
                if let Some(tail) = self.node_mut(tail_idx) {
                    tail.next = Some(idx);
                }
            }
            None => self.head = Some(idx),
        }

        self.tail = Some(idx);
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

    fn free_node(&mut self, idx: usize) {
        self.free_list.push(idx);
    }

    /// Walk the list and check every structural invariant.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.head.is_none(), self.tail.is_none());
        assert_eq!(self.head.is_none(), self.index.is_empty());

        let mut steps = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = self.node(idx).expect("linked slot is vacant");
            assert_eq!(node.prev, prev, "prev/next are not mutual inverses");
            assert_eq!(self.index.get(&node.key), Some(&idx), "index points elsewhere");
            steps += 1;
            assert!(steps <= self.index.len(), "list longer than index");
            prev = Some(idx);
            cursor = node.next;
        }

        assert_eq!(prev, self.tail);
        assert_eq!(steps, self.index.len());
    }
}

impl<K> Default for RecencyList<K>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for RecencyList<K>
where
    K: Hash + Eq + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over keys from least to most recently used
pub struct Iter<'a, K> {
    list: &'a RecencyList<K>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let list = self.list;
        let node = self.cursor.and_then(|idx| list.node(idx))?;
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &RecencyList<u32>) -> Vec<u32> {
        list.iter().copied().collect()
    }

    fn list_of(items: &[u32]) -> RecencyList<u32> {
        let mut list = RecencyList::new();
        for &k in items {
            list.add(k).unwrap();
        }
        list
    }

    #[test]
    fn test_add_appends_at_mru_end() {
        let list = list_of(&[1, 2, 3]);

        assert_eq!(keys(&list), vec![1, 2, 3]);
        assert_eq!(list.peek_lru(), Some(&1));
        assert_eq!(list.peek_mru(), Some(&3));
        assert_eq!(list.len(), 3);
        list.assert_consistent();
    }

    #[test]
    fn test_add_duplicate() {
        let mut list = list_of(&[1, 2]);

        assert_eq!(list.add(1), Err(Error::DuplicateKey));
        assert_eq!(keys(&list), vec![1, 2]);
        list.assert_consistent();
    }

    #[test]
    fn test_touch_tail_is_noop() {
        let mut list = list_of(&[1, 2, 3]);

        list.touch(&3).unwrap();
        assert_eq!(keys(&list), vec![1, 2, 3]);
        list.assert_consistent();
    }

    #[test]
    fn test_touch_single_element() {
        let mut list = list_of(&[7]);

        list.touch(&7).unwrap();
        assert_eq!(keys(&list), vec![7]);
        assert_eq!(list.peek_lru(), Some(&7));
        assert_eq!(list.peek_mru(), Some(&7));
        list.assert_consistent();
    }

    #[test]
    fn test_touch_head() {
        let mut list = list_of(&[1, 2, 3]);

        list.touch(&1).unwrap();
        assert_eq!(keys(&list), vec![2, 3, 1]);
        list.assert_consistent();
    }

    #[test]
    fn test_touch_head_of_two() {
        let mut list = list_of(&[1, 2]);

        list.touch(&1).unwrap();
        assert_eq!(keys(&list), vec![2, 1]);
        list.assert_consistent();
    }

    #[test]
    fn test_touch_middle() {
        let mut list = list_of(&[1, 2, 3, 4]);

        list.touch(&2).unwrap();
        assert_eq!(keys(&list), vec![1, 3, 4, 2]);

        list.touch(&4).unwrap();
        assert_eq!(keys(&list), vec![1, 3, 2, 4]);
        list.assert_consistent();
    }

    #[test]
    fn test_touch_missing() {
        let mut list = list_of(&[1]);
        assert_eq!(list.touch(&9), Err(Error::NotFound));

        let mut empty: RecencyList<u32> = RecencyList::new();
        assert_eq!(empty.touch(&1), Err(Error::NotFound));
    }

    #[test]
    fn test_remove_lru_order() {
        let mut list = list_of(&[1, 2, 3]);
        list.touch(&1).unwrap();

        assert_eq!(list.remove_lru(), Ok(2));
        list.assert_consistent();
        assert_eq!(list.remove_lru(), Ok(3));
        list.assert_consistent();
        assert_eq!(list.remove_lru(), Ok(1));
        list.assert_consistent();

        assert!(list.is_empty());
        assert_eq!(list.peek_lru(), None);
        assert_eq!(list.peek_mru(), None);
    }

    #[test]
    fn test_remove_lru_empty() {
        let mut list: RecencyList<u32> = RecencyList::new();
        assert_eq!(list.remove_lru(), Err(Error::Empty));
    }

    #[test]
    fn test_removed_key_can_be_readded() {
        let mut list = list_of(&[1, 2]);

        assert_eq!(list.remove_lru(), Ok(1));
        assert!(!list.contains(&1));
        assert_eq!(list.touch(&1), Err(Error::NotFound));

        list.add(1).unwrap();
        assert_eq!(keys(&list), vec![2, 1]);
        list.assert_consistent();
    }

    #[test]
    fn test_slots_are_reused() {
        let mut list = list_of(&[1, 2, 3]);

        for k in 4..100 {
            list.remove_lru().unwrap();
            list.add(k).unwrap();
        }

        assert_eq!(list.nodes.len(), 3);
        assert_eq!(keys(&list), vec![97, 98, 99]);
        list.assert_consistent();
    }

    #[test]
    fn test_clear() {
        let mut list = list_of(&[1, 2, 3]);
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
        list.add(5).unwrap();
        assert_eq!(keys(&list), vec![5]);
        list.assert_consistent();
    }

    #[test]
    fn test_debug_lists_lru_first() {
        let mut list = list_of(&[1, 2, 3]);
        list.touch(&2).unwrap();

        assert_eq!(format!("{:?}", list), "[1, 3, 2]");
        assert_eq!(format!("{:?}", RecencyList::<u32>::new()), "[]");
    }

    #[test]
    fn test_iter_exact_size() {
        let list = list_of(&[4, 5, 6]);
        assert_eq!(list.iter().len(), 3);
    }
}
