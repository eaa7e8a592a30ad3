//! Bidirectional interning of keys and values into dense `u32` identifiers.
//!
//! Identifiers are minted in first-seen order starting at 0 and are never
//! reused: removing an entry drops both directions of the mapping but leaves
//! the counter where it was.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::{trace, warn};

use crate::error::{Error, Result};

/// Number of identifiers a namespace can hand out (`0..=u32::MAX`).
const ID_SPACE: u64 = 1 << 32;

/// Which identifier namespace an interner serves.
///
/// Key and value identifiers are independent: the same number in both spaces
/// implies no relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Key identifiers
    Key,
    /// Value identifiers
    Value,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Key => f.write_str("key"),
            Namespace::Value => f.write_str("value"),
        }
    }
}

/// Get-or-create table between values of `T` and `u32` identifiers.
#[derive(Clone)]
pub struct Interner<T> {
    namespace: Namespace,
    to_id: HashMap<T, u32>,
    from_id: HashMap<u32, T>,
    /// Next identifier to mint. Kept as `u64` so exhaustion is representable.
    next_id: u64,
}

impl<T> Interner<T>
where
    T: Eq + Hash + Clone,
{
    /// Create an empty interner for `namespace`.
    pub fn new(namespace: Namespace) -> Self {
        Self::with_capacity(namespace, 0)
    }

    /// Create an empty interner with room for `capacity` entries.
    pub fn with_capacity(namespace: Namespace, capacity: usize) -> Self {
        Self {
            namespace,
            to_id: HashMap::with_capacity(capacity),
            from_id: HashMap::with_capacity(capacity),
            next_id: 0,
        }
    }

    /// Namespace this interner mints identifiers for.
    #[inline]
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Returns the identifier for `value`, minting the next one if unseen.
    pub fn intern(&mut self, value: T) -> Result<u32> {
        if let Some(&id) = self.to_id.get(&value) {
            return Ok(id);
        }

        let id = self.mint()?;
        self.to_id.insert(value.clone(), id);
        self.from_id.insert(id, value);
        trace!(namespace = %self.namespace, id, "interned");
        Ok(id)
    }

    /// Checks that interning `value` would succeed, without changing anything.
    pub fn has_room_for<Q>(&self, value: &Q) -> Result<()>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.to_id.contains_key(value) || self.next_id < ID_SPACE {
            Ok(())
        } else {
            Err(self.exhausted())
        }
    }

    fn mint(&mut self) -> Result<u32> {
        let id = u32::try_from(self.next_id).map_err(|_| self.exhausted())?;
        self.next_id += 1;
        Ok(id)
    }

    fn exhausted(&self) -> Error {
        warn!(namespace = %self.namespace, "identifier space exhausted");
        Error::IdSpaceExhausted {
            namespace: self.namespace,
        }
    }

    /// Identifier of `value`, if interned.
    #[inline]
    pub fn id<Q>(&self, value: &Q) -> Option<u32>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.to_id.get(value).copied()
    }

    /// Value behind `id`, if still live.
    #[inline]
    pub fn resolve(&self, id: u32) -> Option<&T> {
        self.from_id.get(&id)
    }

    /// Forgets `value`. Its identifier is retired, not recycled.
    pub fn remove<Q>(&mut self, value: &Q) -> Option<u32>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.to_id.remove(value)?;
        self.from_id.remove(&id);
        Some(id)
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.to_id.len()
    }

    /// Whether no entry is live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.to_id.is_empty()
    }

    /// Identifier the next unseen value will receive.
    #[inline]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Live entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, u32)> + '_ {
        self.to_id.iter().map(|(value, &id)| (value, id))
    }

    /// Approximate heap bytes of both directions.
    pub fn memory_usage(&self) -> usize {
        let entry = std::mem::size_of::<T>() + std::mem::size_of::<u32>() + 1;
        (self.to_id.capacity() + self.from_id.capacity()) * entry
    }

    /// Release spare capacity.
    pub fn shrink_to_fit(&mut self) {
        self.to_id.shrink_to_fit();
        self.from_id.shrink_to_fit();
    }

    #[cfg(test)]
    pub(crate) fn starting_at(namespace: Namespace, next_id: u64) -> Self {
        Self {
            next_id,
            ..Self::new(namespace)
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Interner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner")
            .field("namespace", &self.namespace)
            .field("len", &self.to_id.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
