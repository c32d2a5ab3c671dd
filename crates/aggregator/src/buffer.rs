//! Keyed ordered buffer
//!
//! Holds album items grouped by their group key, each group kept sorted by
//! sequence no matter in which order the network delivered the items.

use ahash::AHashMap;
use parking_lot::Mutex;
use rt_core::MediaKind;
use smallvec::SmallVec;

/// Albums carry at most ten items, so a group fits inline
pub const ALBUM_CAPACITY: usize = 10;

type Group<P> = SmallVec<[Item<P>; ALBUM_CAPACITY]>;

/// One buffered album item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item<P> {
    /// Key correlating the items of one burst
    pub group_key: String,
    /// Ordering value (message id), independent of arrival time
    pub sequence: i64,
    /// Media kind
    pub kind: MediaKind,
    /// Opaque handle passed through unchanged
    pub payload: P,
}

impl<P> Item<P> {
    /// Create a new item
    pub fn new(group_key: impl Into<String>, sequence: i64, kind: MediaKind, payload: P) -> Self {
        Self {
            group_key: group_key.into(),
            sequence,
            kind,
            payload,
        }
    }
}

/// Concurrency-safe map of group key -> items sorted by sequence
///
/// A single lock guards every operation, so `get` never observes a
/// half-finished `add` and `remove` is atomic with respect to both.
pub struct KeyedOrderedBuffer<P> {
    groups: Mutex<AHashMap<String, Group<P>>>,
}

impl<P> Default for KeyedOrderedBuffer<P> {
    fn default() -> Self {
        Self {
            groups: Mutex::new(AHashMap::new()),
        }
    }
}

impl<P: Clone> KeyedOrderedBuffer<P> {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item under its group key, keeping ascending sequence order
    ///
    /// A redelivered sequence replaces the stored item in place, so a group
    /// never holds two items with the same sequence. Returns true when an
    /// existing item was replaced.
    pub fn add(&self, item: Item<P>) -> bool {
        let mut groups = self.groups.lock();
        let group = groups.entry(item.group_key.clone()).or_default();
        let pos = group.partition_point(|existing| existing.sequence < item.sequence);
        if group.get(pos).is_some_and(|existing| existing.sequence == item.sequence) {
            group[pos] = item;
            true
        } else {
            group.insert(pos, item);
            false
        }
    }

    /// Ordered snapshot of a group (empty if the key is absent)
    pub fn get(&self, key: &str) -> Vec<Item<P>> {
        self.groups
            .lock()
            .get(key)
            .map(|group| group.to_vec())
            .unwrap_or_default()
    }

    /// Drop a whole group, returning how many items it held
    ///
    /// Removing an absent key is a no-op returning 0.
    pub fn remove(&self, key: &str) -> usize {
        self.groups
            .lock()
            .remove(key)
            .map(|group| group.len())
            .unwrap_or(0)
    }

    /// Remove a group and hand back its ordered items in one step
    ///
    /// Anything added under the key afterwards starts a new group.
    pub fn take(&self, key: &str) -> Vec<Item<P>> {
        self.groups
            .lock()
            .remove(key)
            .map(|group| group.into_vec())
            .unwrap_or_default()
    }

    /// Highest sequence currently stored for a key
    pub fn newest_sequence(&self, key: &str) -> Option<i64> {
        self.groups
            .lock()
            .get(key)
            .and_then(|group| group.last())
            .map(|item| item.sequence)
    }

    /// Number of items stored under a key
    pub fn len(&self, key: &str) -> usize {
        self.groups.lock().get(key).map_or(0, |group| group.len())
    }

    /// Number of groups currently buffered
    pub fn group_count(&self) -> usize {
        self.groups.lock().len()
    }

    /// True when no group is buffered
    pub fn is_empty(&self) -> bool {
        self.groups.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    fn photo(key: &str, sequence: i64) -> Item<String> {
        Item::new(key, sequence, MediaKind::Photo, format!("file-{}", sequence))
    }

    fn sequences(items: &[Item<String>]) -> Vec<i64> {
        items.iter().map(|item| item.sequence).collect()
    }

    #[test]
    fn test_empty_buffer() {
        let buffer: KeyedOrderedBuffer<String> = KeyedOrderedBuffer::new();
        assert!(buffer.is_empty());
        assert!(buffer.get("1").is_empty());
        assert_eq!(buffer.newest_sequence("1"), None);
    }

    #[test]
    fn test_add_groups_by_key() {
        let buffer = KeyedOrderedBuffer::new();
        buffer.add(photo("1", 1));
        buffer.add(photo("1", 2));
        buffer.add(photo("2", 3));

        assert_eq!(buffer.group_count(), 2);
        assert_eq!(sequences(&buffer.get("1")), vec![1, 2]);
        assert_eq!(sequences(&buffer.get("2")), vec![3]);
        assert_eq!(buffer.get("1")[1].payload, "file-2");
    }

    #[test]
    fn test_out_of_order_arrival_is_sorted() {
        let buffer = KeyedOrderedBuffer::new();
        for seq in [1, 3, 2, 4] {
            buffer.add(photo("g1", seq));
        }

        assert_eq!(sequences(&buffer.get("g1")), vec![1, 2, 3, 4]);
        assert_eq!(buffer.newest_sequence("g1"), Some(4));
    }

    #[test]
    fn test_any_insertion_order_is_sorted() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..50 {
            let mut order: Vec<i64> = (100..110).collect();
            order.shuffle(&mut rng);

            let buffer = KeyedOrderedBuffer::new();
            for seq in &order {
                buffer.add(photo("album", *seq));
            }

            assert_eq!(sequences(&buffer.get("album")), (100..110).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_redelivered_sequence_replaces_item() {
        let buffer = KeyedOrderedBuffer::new();
        assert!(!buffer.add(Item::new("k", 5, MediaKind::Photo, "first".to_string())));
        assert!(!buffer.add(Item::new("k", 9, MediaKind::Photo, "last".to_string())));
        assert!(buffer.add(Item::new("k", 5, MediaKind::Video, "redelivered".to_string())));

        let stored = buffer.get("k");
        assert_eq!(sequences(&stored), vec![5, 9]);
        assert_eq!(stored[0].kind, MediaKind::Video);
        let payloads: Vec<_> = stored.into_iter().map(|item| item.payload).collect();
        assert_eq!(payloads, vec!["redelivered", "last"]);
    }

    #[test]
    fn test_take_empties_group() {
        let buffer = KeyedOrderedBuffer::new();
        for seq in [3, 1, 2] {
            buffer.add(photo("g", seq));
        }
        buffer.add(photo("other", 7));

        assert_eq!(sequences(&buffer.take("g")), vec![1, 2, 3]);
        assert!(buffer.get("g").is_empty());
        assert!(buffer.take("g").is_empty());
        assert_eq!(buffer.len("other"), 1);

        // Same key after take is a fresh group
        buffer.add(photo("g", 4));
        assert_eq!(sequences(&buffer.take("g")), vec![4]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let buffer = KeyedOrderedBuffer::new();
        buffer.add(photo("1", 1));
        buffer.add(photo("1", 2));
        buffer.add(photo("2", 3));

        assert_eq!(buffer.remove("1"), 2);
        assert!(buffer.get("1").is_empty());
        assert_eq!(buffer.len("2"), 1);

        // Absent key
        assert_eq!(buffer.remove("1"), 0);
        assert_eq!(buffer.remove("missing"), 0);
    }

    #[test]
    fn test_groups_beyond_inline_capacity() {
        let buffer = KeyedOrderedBuffer::new();
        for seq in (0..25).rev() {
            buffer.add(photo("big", seq));
        }
        assert_eq!(buffer.len("big"), 25);
        assert_eq!(sequences(&buffer.get("big")), (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_concurrent_adds() {
        let buffer = Arc::new(KeyedOrderedBuffer::<String>::new());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let buffer = Arc::clone(&buffer);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        // Interleave sequences across workers
                        buffer.add(photo("shared", i * 8 + worker));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let stored = sequences(&buffer.get("shared"));
        assert_eq!(stored.len(), 400);
        assert_eq!(stored, (0..400).collect::<Vec<_>>());
    }
}
