//! Unsynchronized interned multimap.
//!
//! [`RoarMultimap`] owns the key interner, the value interner and the posting
//! store. It takes `&mut self` for writes and performs no locking; wrap it in
//! [`RoarIndex`](crate::RoarIndex) to share it between threads.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use tracing::debug;

use crate::error::{Error, Result};
use crate::interner::{Interner, Namespace};
use crate::posting::PostingStore;

/// Mapping from keys `K` to duplicate-free sets of values `V`.
///
/// Values of a key come back in ascending value-identifier order, i.e. the
/// order in which each value was first pushed under *any* key.
#[derive(Clone)]
pub struct RoarMultimap<K, V> {
    keys: Interner<K>,
    values: Interner<V>,
    postings: PostingStore,
}

impl<K, V> RoarMultimap<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    /// Create an empty multimap.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create an empty multimap sized for `keys` keys and `values` values.
    pub fn with_capacity(keys: usize, values: usize) -> Self {
        Self {
            keys: Interner::with_capacity(Namespace::Key, keys),
            values: Interner::with_capacity(Namespace::Value, values),
            postings: PostingStore::with_capacity(keys),
        }
    }

    /// Associates `value` with `key`.
    ///
    /// Returns `true` if the pair was not already present.
    ///
    /// # Panics
    ///
    /// Panics if a new key or value is pushed after all 2^32 identifiers of its
    /// namespace were handed out. Use [`try_push`](Self::try_push) to handle
    /// that case.
    pub fn push(&mut self, key: K, value: V) -> bool {
        match self.try_push(key, value) {
            Ok(added) => added,
            Err(err) => panic!("RoarMultimap::push: {err}"),
        }
    }

    /// Associates `value` with `key`, failing instead of panicking when an
    /// identifier namespace is exhausted. Nothing is modified on error.
    pub fn try_push(&mut self, key: K, value: V) -> Result<bool> {
        self.keys.has_room_for(&key)?;
        self.values.has_room_for(&value)?;

        let key_id = self.keys.intern(key)?;
        let value_id = self.values.intern(value)?;
        Ok(self.postings.insert(key_id, value_id))
    }

    /// Returns every value associated with `key`, in ascending value-identifier
    /// order.
    pub fn get<Q>(&self, key: &Q) -> Result<Vec<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let key_id = self.keys.id(key).ok_or(Error::KeyNotFound)?;
        let Some(bitmap) = self.postings.get(key_id) else {
            return Ok(Vec::new());
        };

        let mut out = Vec::with_capacity(bitmap.len() as usize);
        out.extend(
            bitmap
                .iter()
                .filter_map(|value_id| self.values.resolve(value_id).cloned()),
        );
        Ok(out)
    }

    /// Whether `value` is currently associated with `key`.
    pub fn has_value<QK, QV>(&self, key: &QK, value: &QV) -> bool
    where
        K: Borrow<QK>,
        V: Borrow<QV>,
        QK: Hash + Eq + ?Sized,
        QV: Hash + Eq + ?Sized,
    {
        let Some(key_id) = self.keys.id(key) else {
            return false;
        };
        let Some(value_id) = self.values.id(value) else {
            return false;
        };
        self.postings.contains(key_id, value_id)
    }

    /// Removes `key` and its posting set. Absent keys are ignored.
    ///
    /// Value identifiers referenced only by this key stay interned: they keep
    /// showing up in [`values`](Self::values) and are reused if pushed again.
    pub fn delete<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(key_id) = self.keys.remove(key) else {
            return;
        };
        let cardinality = self.postings.remove(key_id).map_or(0, |bitmap| bitmap.len());
        debug!(key_id, cardinality, "deleted key");
    }

    /// Whether `key` is currently visible.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.keys.id(key).is_some()
    }

    /// Number of values associated with `key`.
    pub fn value_count<Q>(&self, key: &Q) -> Result<u64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let key_id = self.keys.id(key).ok_or(Error::KeyNotFound)?;
        Ok(self.postings.cardinality(key_id))
    }

    /// Snapshot of the visible keys, in unspecified order.
    pub fn keys(&self) -> Vec<K> {
        self.keys.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Snapshot of every value ever interned, in unspecified order.
    ///
    /// Not filtered by current membership: values of deleted keys remain.
    pub fn values(&self) -> Vec<V> {
        self.values.iter().map(|(value, _)| value.clone()).collect()
    }

    /// Number of visible keys.
    #[inline]
    pub fn count(&self) -> usize {
        self.keys.len()
    }

    /// Whether no key is visible.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of values ever interned.
    #[inline]
    pub fn value_interner_len(&self) -> usize {
        self.values.len()
    }

    /// Approximate heap bytes as `(keys, values, postings)`.
    pub fn memory_usage(&self) -> (usize, usize, usize) {
        (
            self.keys.memory_usage(),
            self.values.memory_usage(),
            self.postings.memory_usage(),
        )
    }

    /// Release spare capacity.
    pub fn shrink_to_fit(&mut self) {
        self.keys.shrink_to_fit();
        self.values.shrink_to_fit();
        self.postings.shrink_to_fit();
    }

    #[cfg(test)]
    pub(crate) fn validate(&self) {
        for (key, key_id) in self.keys.iter() {
            assert!(
                self.keys.resolve(key_id) == Some(key),
                "key interner directions must agree"
            );
            if let Some(bitmap) = self.postings.get(key_id) {
                for value_id in bitmap {
                    assert!(
                        self.values.resolve(value_id).is_some(),
                        "posting references unknown value id {value_id}"
                    );
                }
            }
        }
        assert!(
            self.postings.len() <= self.keys.len(),
            "posting store must not outlive deleted keys"
        );
        for (value, value_id) in self.values.iter() {
            assert!(
                self.values.resolve(value_id) == Some(value),
                "value interner directions must agree"
            );
        }
        assert_eq!(self.values.len() as u64, self.values.next_id());
    }
}

impl<K, V> Default for RoarMultimap<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for RoarMultimap<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, _) in self.keys.iter() {
            map.entry(key, &self.get(key).unwrap_or_default());
        }
        map.finish()
    }
}
