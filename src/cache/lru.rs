//! Recency List Module
//!
//! Doubly-linked access-order list used by the bounded LRU cache.

// == Node ==
pub type NodeId = usize;

#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

// == Recency List ==
/// Tracks access order for LRU eviction.
///
/// Nodes live in an arena indexed by [`NodeId`]; freed slots are reused.
/// - Front (head) = Most recently used
/// - Back (tail) = Least recently used
///
/// Every operation is O(1). Ids stay valid until the node is removed.
#[derive(Debug)]
pub struct RecencyList<K> {
    nodes: Vec<Option<Node<K>>>,
    free: Vec<NodeId>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl<K> RecencyList<K> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Adds a key as the most recently used entry and returns its id.
    pub fn push_front(&mut self, key: K) -> NodeId {
        let node = Node {
            key,
            prev: None,
            next: None,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.link_front(id);
        self.len += 1;
        id
    }

    // == Touch ==
    /// Marks a node as recently used (moves to front).
    pub fn touch(&mut self, id: NodeId) {
        if self.head == Some(id) || self.slot(id).is_none() {
            return;
        }
        self.unlink(id);
        self.link_front(id);
    }

    // == Remove ==
    /// Removes a node and returns its key.
    pub fn remove(&mut self, id: NodeId) -> Option<K> {
        self.slot(id)?;
        self.unlink(id);
        let node = self.nodes[id].take()?;
        self.free.push(id);
        self.len -= 1;
        Some(node.key)
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if the list is empty.
    pub fn evict_oldest(&mut self) -> Option<K> {
        let id = self.tail?;
        self.remove(id)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    #[cfg(test)]
    pub fn peek_oldest(&self) -> Option<&K> {
        self.tail.and_then(|id| self.slot(id)).map(|node| &node.key)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates keys from least to most recently used.
    pub fn iter_oldest_first(&self) -> OldestFirst<'_, K> {
        OldestFirst {
            list: self,
            cursor: self.tail,
        }
    }

    // == Linking ==
    fn slot(&self, id: NodeId) -> Option<&Node<K>> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Node<K>> {
        self.nodes.get_mut(id).and_then(Option::as_mut)
    }

    fn unlink(&mut self, id: NodeId) {
        let Some((prev, next)) = self.slot(id).map(|node| (node.prev, node.next)) else {
            return;
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.slot_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.slot_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.slot_mut(id) {
            node.prev = None;
            node.next = None;
        }
    }

    fn link_front(&mut self, id: NodeId) {
        let old_head = self.head;
        match self.slot_mut(id) {
            Some(node) => {
                node.prev = None;
                node.next = old_head;
            }
            None => return,
        }

        match old_head {
            Some(h) => {
                if let Some(node) = self.slot_mut(h) {
                    node.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }
}

impl<K> Default for RecencyList<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`RecencyList::iter_oldest_first`].
pub struct OldestFirst<'a, K> {
    list: &'a RecencyList<K>,
    cursor: Option<NodeId>,
}

impl<'a, K> Iterator for OldestFirst<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.slot(self.cursor?)?;
        self.cursor = node.prev;
        Some(&node.key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys<K: Clone>(list: &RecencyList<K>) -> Vec<K> {
        list.iter_oldest_first().cloned().collect()
    }

    #[test]
    fn test_lru_new() {
        let lru: RecencyList<&str> = RecencyList::new();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.peek_oldest(), None);
    }

    #[test]
    fn test_lru_push_new_keys() {
        let mut lru = RecencyList::new();

        lru.push_front("key1");
        lru.push_front("key2");
        lru.push_front("key3");

        assert_eq!(lru.len(), 3);
        // key1 is oldest (added first)
        assert_eq!(lru.peek_oldest(), Some(&"key1"));
    }

    #[test]
    fn test_lru_touch_existing_key() {
        let mut lru = RecencyList::new();

        let key1 = lru.push_front("key1");
        lru.push_front("key2");
        lru.push_front("key3");

        // Touch key1 again - should move to front
        lru.touch(key1);

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.peek_oldest(), Some(&"key2"));
        assert_eq!(keys(&lru), vec!["key2", "key3", "key1"]);
    }

    #[test]
    fn test_lru_evict_oldest() {
        let mut lru = RecencyList::new();

        lru.push_front("key1");
        lru.push_front("key2");
        lru.push_front("key3");

        assert_eq!(lru.evict_oldest(), Some("key1"));
        assert_eq!(lru.len(), 2);

        assert_eq!(lru.evict_oldest(), Some("key2"));
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_lru_evict_empty() {
        let mut lru: RecencyList<String> = RecencyList::new();
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_remove_middle() {
        let mut lru = RecencyList::new();

        lru.push_front("key1");
        let key2 = lru.push_front("key2");
        lru.push_front("key3");

        assert_eq!(lru.remove(key2), Some("key2"));
        assert_eq!(lru.len(), 2);
        assert_eq!(keys(&lru), vec!["key1", "key3"]);

        // Removing twice is a no-op
        assert_eq!(lru.remove(key2), None);
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn test_lru_order_after_multiple_touches() {
        let mut lru = RecencyList::new();

        let a = lru.push_front("a");
        let b = lru.push_front("b");
        let c = lru.push_front("c");

        lru.touch(a);
        lru.touch(c);
        lru.touch(b);

        // front=[b, c, a]=back
        assert_eq!(lru.evict_oldest(), Some("a"));
        assert_eq!(lru.evict_oldest(), Some("c"));
        assert_eq!(lru.evict_oldest(), Some("b"));
        assert!(lru.is_empty());
    }

    #[test]
    fn test_lru_touch_head_is_noop() {
        let mut lru = RecencyList::new();

        lru.push_front("a");
        let b = lru.push_front("b");
        lru.touch(b);
        lru.touch(b);

        assert_eq!(keys(&lru), vec!["a", "b"]);
    }

    #[test]
    fn test_lru_reuses_freed_slots() {
        let mut lru = RecencyList::new();

        let a = lru.push_front("a");
        lru.push_front("b");
        lru.remove(a);

        let c = lru.push_front("c");
        assert_eq!(c, a, "Freed slot should be reused");
        assert_eq!(keys(&lru), vec!["b", "c"]);
    }

    #[test]
    fn test_lru_single_node_remove_resets_ends() {
        let mut lru = RecencyList::new();

        let only = lru.push_front("only");
        lru.remove(only);

        assert!(lru.is_empty());
        assert_eq!(lru.peek_oldest(), None);

        lru.push_front("next");
        assert_eq!(lru.peek_oldest(), Some(&"next"));
    }

    #[test]
    fn test_lru_clear() {
        let mut lru = RecencyList::new();
        lru.push_front(1);
        lru.push_front(2);

        lru.clear();

        assert!(lru.is_empty());
        assert_eq!(lru.iter_oldest_first().count(), 0);
    }
}
