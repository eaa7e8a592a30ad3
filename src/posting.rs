//! Posting store: key identifier to compressed set of value identifiers.

use std::collections::HashMap;

use roaring::RoaringBitmap;

/// Map from key identifier to a [`RoaringBitmap`] of value identifiers.
///
/// Bitmaps are never shared between keys; two keys holding the same value only
/// share the identifier number.
#[derive(Debug, Clone, Default)]
pub struct PostingStore {
    lists: HashMap<u32, RoaringBitmap>,
}

impl PostingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lists: HashMap::with_capacity(capacity),
        }
    }

    /// Adds `value_id` to the posting set of `key_id`.
    ///
    /// Returns `true` if the identifier was not already present.
    pub fn insert(&mut self, key_id: u32, value_id: u32) -> bool {
        self.lists.entry(key_id).or_default().insert(value_id)
    }

    /// Posting set of `key_id`.
    #[inline]
    pub fn get(&self, key_id: u32) -> Option<&RoaringBitmap> {
        self.lists.get(&key_id)
    }

    /// Whether `value_id` is in the posting set of `key_id`.
    #[inline]
    pub fn contains(&self, key_id: u32, value_id: u32) -> bool {
        self.lists
            .get(&key_id)
            .is_some_and(|bitmap| bitmap.contains(value_id))
    }

    /// Number of value identifiers held for `key_id` (0 if absent).
    pub fn cardinality(&self, key_id: u32) -> u64 {
        self.lists.get(&key_id).map_or(0, RoaringBitmap::len)
    }

    /// Drops the posting set of `key_id`, returning it.
    pub fn remove(&mut self, key_id: u32) -> Option<RoaringBitmap> {
        self.lists.remove(&key_id)
    }

    /// Number of keys with a posting set.
    #[inline]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Whether no key has a posting set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Approximate heap bytes: map slots plus the serialized size of each bitmap.
    pub fn memory_usage(&self) -> usize {
        let slots = self.lists.capacity()
            * (std::mem::size_of::<u32>() + std::mem::size_of::<RoaringBitmap>() + 1);
        let bitmaps: usize = self.lists.values().map(RoaringBitmap::serialized_size).sum();
        slots + bitmaps
    }

    /// Release spare map capacity.
    pub fn shrink_to_fit(&mut self) {
        self.lists.shrink_to_fit();
    }
}
