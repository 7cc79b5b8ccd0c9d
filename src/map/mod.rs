//! PersistentHashMap - An immutable map based on a hash array mapped trie.
//!
//! Each key is hashed to 32 bits, and the hash is sliced five bits at a time
//! into the slot indexes of successive trie levels. Only populated slots are
//! stored, so a node is a presence bitmap and a dense array. Keys whose hashes
//! are equal in all 32 bits end up together in a collision node at the bottom
//! of the trie, where they are scanned linearly.
//!
//! Updates return a new map. The path from the root to the changed entry is
//! copied and every other node is shared, so each update costs O(log32 n)
//! allocations. Updates that change nothing return a handle to the very same
//! trie, which `ptr_eq` can detect.
//!
//! When many updates are applied at once, use a `HashMapBuilder`. It edits the
//! nodes it has already copied in place, so a batch copies each node at most
//! once.
//!
//! Iteration order is unspecified, but is stable for a given set of keys.

mod builder;

pub use builder::{HashMapBuilder, HashMapCursor};
pub use crate::internals::trie::iter::{IntoIter, Iter, KeyIter, ValueIter};

use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::iter::FromIterator;
use std::sync::Arc;

use crate::internals::trie::node::TrieNode;
use crate::traits::PersistentCollection;
use crate::utils::hash_key;

/// An immutable hash map with structural sharing between versions.
pub struct PersistentHashMap<K, V> {
    pub(crate) root: Arc<TrieNode<K, V>>,
    pub(crate) size: usize,
}

impl<K, V> Clone for PersistentHashMap<K, V> {
    fn clone(&self) -> Self {
        PersistentHashMap {
            root: self.root.clone(),
            size: self.size,
        }
    }
}

impl<K, V> Default for PersistentHashMap<K, V> {
    fn default() -> Self {
        PersistentHashMap {
            root: Arc::new(TrieNode::empty()),
            size: 0,
        }
    }
}

impl<K, V> PersistentHashMap<K, V> {
    /// Construct a new, empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of entries in the map.
    pub fn len(&self) -> usize {
        self.size
    }

    /// True if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// True if both maps are the same version of the same trie.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    /// Iterate over references to the entries of the map.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root, self.size)
    }

    /// Iterate over the keys of the map.
    pub fn keys(&self) -> KeyIter<'_, K, V> {
        KeyIter::new(&self.root, self.size)
    }

    /// Iterate over the values of the map.
    pub fn values(&self) -> ValueIter<'_, K, V> {
        ValueIter::new(&self.root, self.size)
    }
}

impl<K: Hash + Eq + Clone, V: Clone> PersistentHashMap<K, V> {
    /// Retrieve the value for `k`.
    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(k).map(|(_, v)| v)
    }

    /// Retrieve the stored key and value for `k`.
    pub fn get_key_value<Q>(&self, k: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.root.get(hash_key(k), k, 0).map(|d| (&d.k, &d.v))
    }

    /// Assert if a key exists in the map.
    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(k).is_some()
    }

    /// Return a map with `k` bound to `v`. If `k` is already bound to an
    /// equal value, this map is returned unchanged.
    pub fn insert(&self, k: K, v: V) -> Self
    where
        V: PartialEq,
    {
        if self.get(&k) == Some(&v) {
            return self.clone();
        }
        let mut builder = self.builder();
        builder.insert(k, v);
        builder.into_map()
    }

    /// Return a map with every pair of `iter` inserted, later pairs winning.
    pub fn insert_all<I>(&self, iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut builder = self.builder();
        builder.extend(iter);
        builder.into_map()
    }

    /// Return a map without `k`. If `k` is absent, this map is returned
    /// unchanged.
    pub fn remove<Q>(&self, k: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.contains_key(k) {
            return self.clone();
        }
        let mut builder = self.builder();
        builder.remove(k);
        builder.into_map()
    }

    /// Return a map without the entries for which `f` returns true.
    pub fn remove_all<F>(&self, f: F) -> Self
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut builder = self.builder();
        builder.remove_all(f);
        builder.into_map()
    }

    /// Return an empty map.
    pub fn clear(&self) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        Self::new()
    }

    /// Create a builder over this map. This is O(1); nodes are copied as the
    /// builder first touches them.
    pub fn builder(&self) -> HashMapBuilder<K, V> {
        HashMapBuilder::from_map(self)
    }

    #[allow(unused)]
    pub(crate) fn verify(&self)
    where
        K: Debug,
    {
        assert_eq!(self.root.verify(0, true), self.size);
    }
}

impl<K: Hash + Eq + Clone, V: Clone> PersistentCollection for PersistentHashMap<K, V> {
    type Builder = HashMapBuilder<K, V>;

    fn len(&self) -> usize {
        self.size
    }

    fn builder(&self) -> Self::Builder {
        HashMapBuilder::from_map(self)
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }
}

impl<K: Hash + Eq + Clone, V: Clone> FromIterator<(K, V)> for PersistentHashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut builder = HashMapBuilder::new();
        builder.extend(iter);
        builder.into_map()
    }
}

impl<K: Hash + Eq + Clone, V: Clone + PartialEq> PartialEq for PersistentHashMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.size == other.size && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Hash + Eq + Clone, V: Clone + Eq> Eq for PersistentHashMap<K, V> {}

impl<K: Debug, V: Debug> Debug for PersistentHashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentHashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone, V: Clone> IntoIterator for PersistentHashMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.root, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// A key with a fixed hash, so every instance collides with every other.
    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Colliding(u64);

    impl Hash for Colliding {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            0xfeed_u64.hash(state)
        }
    }

    #[test]
    fn test_hashmap_basic() {
        let map = PersistentHashMap::new();
        assert!(map.is_empty());
        let a = map.insert(1u64, "one");
        let b = a.insert(2, "two");
        assert_eq!(map.len(), 0);
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 2);
        assert_eq!(b.get(&1), Some(&"one"));
        assert_eq!(b.get(&3), None);
        assert_eq!(b.get_key_value(&2), Some((&2, &"two")));

        let c = b.insert(1, "uno");
        assert_eq!(c.get(&1), Some(&"uno"));
        assert_eq!(b.get(&1), Some(&"one"));

        let d = c.remove(&1);
        assert_eq!(d.len(), 1);
        assert!(!d.contains_key(&1));
        assert!(c.contains_key(&1));
        b.verify();
        d.verify();
    }

    #[test]
    fn test_hashmap_noop_identity() {
        let map: PersistentHashMap<u64, u64> = (0..100).map(|k| (k, k)).collect();
        assert!(map.insert(5, 5).ptr_eq(&map));
        assert!(!map.insert(5, 6).ptr_eq(&map));
        assert!(map.remove(&500).ptr_eq(&map));
        assert!(map.remove_all(|k, _| *k > 1000).ptr_eq(&map));
        assert!(map.builder().build().ptr_eq(&map));
        let empty = PersistentHashMap::<u64, u64>::new();
        assert!(empty.clear().ptr_eq(&empty));
    }

    #[test]
    fn test_hashmap_large() {
        let mut map = PersistentHashMap::new();
        let mut model = HashMap::new();
        for k in 0..5000u64 {
            map = map.insert(k, k * 3);
            model.insert(k, k * 3);
        }
        map.verify();
        for k in (0..5000u64).step_by(3) {
            map = map.remove(&k);
            model.remove(&k);
        }
        map.verify();
        assert_eq!(map.len(), model.len());
        for (k, v) in model.iter() {
            assert_eq!(map.get(k), Some(v));
        }
        assert_eq!(map.iter().count(), model.len());
        let back: PersistentHashMap<u64, u64> = map.clone().into_iter().collect();
        assert_eq!(back, map);
    }

    #[test]
    fn test_hashmap_collisions() {
        let map: PersistentHashMap<Colliding, u64> =
            (0..64).map(|k| (Colliding(k), k)).collect();
        map.verify();
        assert_eq!(map.len(), 64);
        let half = map.remove_all(|k, _| k.0 % 2 == 0);
        half.verify();
        for k in 0..64 {
            assert_eq!(half.contains_key(&Colliding(k)), k % 2 == 1);
            assert!(map.contains_key(&Colliding(k)));
        }

        // Down to one colliding entry, which must collapse out of the
        // collision node.
        let one = half.remove_all(|k, _| k.0 != 7);
        one.verify();
        assert_eq!(one.len(), 1);
        assert_eq!(one.get(&Colliding(7)), Some(&7));
    }

    #[test]
    fn test_hashmap_eq_debug() {
        let a: PersistentHashMap<u64, u64> = (0..10).map(|k| (k, k)).collect();
        let b: PersistentHashMap<u64, u64> = (0..10).rev().map(|k| (k, k)).collect();
        assert_eq!(a, b);
        assert_ne!(a, b.insert(3, 4));
        assert_ne!(a, b.remove(&3));
        let one = PersistentHashMap::new().insert("k", 1);
        assert_eq!(format!("{:?}", one), "{\"k\": 1}");
    }

    #[test]
    fn test_hashmap_insert_all_clear() {
        let a: PersistentHashMap<u64, u64> = PersistentHashMap::new().insert_all((0..50).map(|k| (k, k)));
        assert_eq!(a.len(), 50);
        let b = a.insert_all(vec![(1, 100), (60, 60)]);
        assert_eq!(b.len(), 51);
        assert_eq!(b.get(&1), Some(&100));
        assert_eq!(a.get(&1), Some(&1));
        assert!(b.clear().is_empty());
        assert_eq!(b.keys().count(), 51);
        assert_eq!(b.values().filter(|v| **v == 100).count(), 1);
    }
}
