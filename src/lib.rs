//! # roar-index
//!
//! A memory-dense in-memory inverted index: a mapping from keys to
//! duplicate-free sets of values.
//!
//! Keys and values are interned into dense `u32` identifiers, and each key's
//! values are stored as a [Roaring bitmap](https://roaringbitmap.org/) of value
//! identifiers. This suits workloads with many keys that each own a possibly
//! large set of values: tag indexes, posting lists, group memberships.
//!
//! ## Architecture
//!
//! - **Interners**: one per namespace (keys, values), assigning identifiers in
//!   first-seen order. Identifiers are never reused.
//! - **Posting store**: key identifier to compressed bitmap of value identifiers.
//! - **Guard**: a single reader/writer lock around everything. Writers
//!   (`push`, `delete`) are exclusive; readers run concurrently.
//!
//! [`RoarMultimap`] is the unsynchronized core; [`RoarIndex`] wraps it for
//! shared use across threads.
//!
//! ## Example
//!
//! ```rust
//! use roar_index::{Error, RoarIndex};
//!
//! let index: RoarIndex<String, String> = RoarIndex::new();
//! index.push("fruit".to_string(), "apple".to_string());
//! index.push("fruit".to_string(), "pear".to_string());
//! index.push("fruit".to_string(), "apple".to_string());
//!
//! assert_eq!(index.get("fruit").unwrap(), vec!["apple", "pear"]);
//! assert!(index.has_value("fruit", "pear"));
//! assert_eq!(index.count(), 1);
//!
//! index.delete("fruit");
//! assert_eq!(index.get("fruit"), Err(Error::KeyNotFound));
//! ```
//!
//! ## Ordering
//!
//! [`RoarIndex::get`] yields values in ascending value-identifier order, which
//! is the order each value was first pushed under *any* key, not the order it
//! was pushed under the queried key.
//!
//! ## Memory
//!
//! Deleting a key releases its key identifier mapping and its bitmap, but
//! value identifiers are kept forever. [`RoarIndex::values`] therefore also
//! reports values that no visible key references anymore.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod interner;
pub mod multimap;
pub mod posting;

pub use error::{Error, Result};
pub use interner::Namespace;
pub use multimap::RoarMultimap;

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use parking_lot::RwLock;

/// Memory usage statistics for the index.
#[derive(Debug, Clone, Default)]
pub struct MemoryStats {
    /// Approximate bytes used by the key interner
    pub key_bytes: usize,
    /// Approximate bytes used by the value interner
    pub value_bytes: usize,
    /// Approximate bytes used by the posting bitmaps
    pub posting_bytes: usize,
    /// Number of visible keys
    pub num_keys: usize,
    /// Number of interned values (including ones no key references)
    pub num_values: usize,
    /// Bytes per visible key (calculated)
    pub bytes_per_key: f64,
}

impl MemoryStats {
    /// Sum of all byte counters.
    pub fn total_bytes(&self) -> usize {
        self.key_bytes + self.value_bytes + self.posting_bytes
    }
}

/// Configuration for a [`RoarIndex`].
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Initial capacity hint for the number of distinct keys
    pub initial_key_capacity: usize,
    /// Initial capacity hint for the number of distinct values
    pub initial_value_capacity: usize,
}

/// Thread-safe inverted index from keys `K` to sets of values `V`.
///
/// Every operation takes one lock over the whole structure: writers
/// ([`push`](Self::push), [`delete`](Self::delete)) exclusively, readers
/// shared. A push's identifier assignment and posting update are observed as a
/// unit.
pub struct RoarIndex<K, V> {
    inner: RwLock<RoarMultimap<K, V>>,
    config: Config,
}

impl<K, V> RoarIndex<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    /// Create a new empty index with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new index with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            inner: RwLock::new(RoarMultimap::with_capacity(
                config.initial_key_capacity,
                config.initial_value_capacity,
            )),
            config,
        }
    }

    /// Configuration this index was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Associate `value` with `key`.
    ///
    /// Returns `true` if the pair was newly added. Pushing the same pair again
    /// is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if more than 2^32 distinct keys or values are interned; see
    /// [`try_push`](Self::try_push).
    pub fn push(&self, key: K, value: V) -> bool {
        self.inner.write().push(key, value)
    }

    /// Associate `value` with `key`, returning
    /// [`Error::IdSpaceExhausted`] instead of panicking when no identifier is
    /// left. The index is unchanged on error.
    pub fn try_push(&self, key: K, value: V) -> Result<bool> {
        self.inner.write().try_push(key, value)
    }

    /// Get the values associated with `key`, in ascending value-identifier
    /// order.
    ///
    /// Fails with [`Error::KeyNotFound`] if the key was never pushed or has
    /// been deleted.
    pub fn get<Q>(&self, key: &Q) -> Result<Vec<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().get(key)
    }

    /// Check whether `value` is associated with `key`.
    pub fn has_value<QK, QV>(&self, key: &QK, value: &QV) -> bool
    where
        K: Borrow<QK>,
        V: Borrow<QV>,
        QK: Hash + Eq + ?Sized,
        QV: Hash + Eq + ?Sized,
    {
        self.inner.read().has_value(key, value)
    }

    /// Remove `key` and all of its values. Absent keys are ignored.
    ///
    /// The values themselves stay interned and keep appearing in
    /// [`values`](Self::values).
    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().delete(key)
    }

    /// Check if `key` is visible.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().contains_key(key)
    }

    /// Number of values associated with `key`.
    pub fn value_count<Q>(&self, key: &Q) -> Result<u64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().value_count(key)
    }

    /// Copy of all visible keys, in unspecified order.
    pub fn keys(&self) -> Vec<K> {
        self.inner.read().keys()
    }

    /// Copy of all values ever interned, in unspecified order.
    pub fn values(&self) -> Vec<V> {
        self.inner.read().values()
    }

    /// Number of visible keys.
    pub fn count(&self) -> usize {
        self.inner.read().count()
    }

    /// Check if no key is visible.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Get memory usage statistics.
    pub fn memory_usage(&self) -> MemoryStats {
        let inner = self.inner.read();
        let (key_bytes, value_bytes, posting_bytes) = inner.memory_usage();
        let num_keys = inner.count();
        let total = key_bytes + value_bytes + posting_bytes;
        MemoryStats {
            key_bytes,
            value_bytes,
            posting_bytes,
            num_keys,
            num_values: inner.value_interner_len(),
            bytes_per_key: if num_keys > 0 {
                total as f64 / num_keys as f64
            } else {
                0.0
            },
        }
    }

    /// Release spare capacity held by the interners and the posting store.
    pub fn shrink_to_fit(&self) {
        self.inner.write().shrink_to_fit();
    }

    /// Consume the index, returning the unsynchronized core.
    pub fn into_inner(self) -> RoarMultimap<K, V> {
        self.inner.into_inner()
    }
}

impl<K, V> Default for RoarIndex<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for RoarIndex<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: RwLock::new(self.inner.read().clone()),
            config: self.config.clone(),
        }
    }
}

impl<K, V> From<RoarMultimap<K, V>> for RoarIndex<K, V> {
    fn from(inner: RoarMultimap<K, V>) -> Self {
        Self {
            inner: RwLock::new(inner),
            config: Config::default(),
        }
    }
}

impl<K, V> fmt::Debug for RoarIndex<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner.read(), f)
    }
}



#[cfg(test)]
mod proptests;
