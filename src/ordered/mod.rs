//! PersistentOrderedMap - An immutable map that remembers insertion order.
//!
//! The entries live in a `PersistentHashMap` whose values carry the keys of
//! their neighbours in insertion order, forming a doubly linked chain through
//! the map itself. The map remembers the first and last key of the chain.
//! Links are keys, not references, so following one is a hash lookup and the
//! chain never forms an ownership cycle.
//!
//! Appending a new key rewrites the previous last entry's link and adds the
//! new entry, two trie updates. Replacing a value leaves the chain alone, so
//! an update never moves a key. Removing a key splices its neighbours
//! together; inserting it again later appends it at the end.

mod builder;
mod set;

pub use builder::{OrderedMapBuilder, OrderedMapCursor};
pub use set::{Iter as SetIter, OrderedSetBuilder, OrderedSetCursor, PersistentOrderedSet};

use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::iter::FromIterator;

use crate::internals::trie::node::TrieNode;
use crate::map::PersistentHashMap;
use crate::traits::PersistentCollection;
use crate::utils::hash_key;

/// A value of the backing map, with the keys of its neighbours in the chain.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LinkedValue<K, V> {
    pub(crate) value: V,
    pub(crate) previous: Option<K>,
    pub(crate) next: Option<K>,
}

/// An immutable map that iterates in insertion order.
pub struct PersistentOrderedMap<K, V> {
    first: Option<K>,
    last: Option<K>,
    map: PersistentHashMap<K, LinkedValue<K, V>>,
}

/// Iterator over the entries of an ordered map or builder, in insertion
/// order.
pub struct Iter<'a, K, V> {
    root: &'a TrieNode<K, LinkedValue<K, V>>,
    next: Option<&'a K>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(
        root: &'a TrieNode<K, LinkedValue<K, V>>,
        first: Option<&'a K>,
        remaining: usize,
    ) -> Self {
        Iter {
            root,
            next: first,
            remaining,
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            root: self.root,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

impl<'a, K: Hash + Eq, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let k = self.next?;
        let d = self.root.get(hash_key(k), k, 0)?;
        self.next = d.v.next.as_ref();
        self.remaining -= 1;
        Some((&d.k, &d.v.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Hash + Eq, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K: Clone, V: Clone> Clone for PersistentOrderedMap<K, V> {
    fn clone(&self) -> Self {
        PersistentOrderedMap {
            first: self.first.clone(),
            last: self.last.clone(),
            map: self.map.clone(),
        }
    }
}

impl<K, V> Default for PersistentOrderedMap<K, V> {
    fn default() -> Self {
        PersistentOrderedMap {
            first: None,
            last: None,
            map: PersistentHashMap::default(),
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone> PersistentOrderedMap<K, V> {
    /// Construct a new, empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of entries in the map.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// True if both maps are the same version of the same structure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.map.ptr_eq(&other.map)
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.map.root, self.first.as_ref(), self.len())
    }

    /// Iterate over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Iterate over the values in insertion order of their keys.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// The earliest inserted entry.
    pub fn first(&self) -> Option<(&K, &V)> {
        let k = self.first.as_ref()?;
        self.get_key_value(k)
    }

    /// The latest inserted entry.
    pub fn last(&self) -> Option<(&K, &V)> {
        let k = self.last.as_ref()?;
        self.get_key_value(k)
    }

    /// Retrieve the value for `k`.
    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(k).map(|link| &link.value)
    }

    /// Retrieve the stored key and value for `k`.
    pub fn get_key_value<Q>(&self, k: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get_key_value(k).map(|(k, link)| (k, &link.value))
    }

    /// Assert if a key exists in the map.
    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(k)
    }

    /// Return a map with `k` bound to `v`. A new key goes to the end of the
    /// order; an existing key keeps its place. If `k` is already bound to an
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

    /// Return a map with every pair of `iter` inserted in turn.
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

    /// Return a map without `k`, but only if it is bound to a value equal to
    /// `v`. Otherwise this map is returned unchanged.
    pub fn remove_entry_if_equal<Q>(&self, k: &Q, v: &V) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        if self.get(k) != Some(v) {
            return self.clone();
        }
        self.remove(k)
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

    /// Create a builder over this map.
    pub fn builder(&self) -> OrderedMapBuilder<K, V> {
        OrderedMapBuilder::from_parts(self.first.clone(), self.last.clone(), self.map.builder())
    }

    /// Check the chain against the backing map, panicking on any break.
    #[allow(unused)]
    pub(crate) fn verify(&self)
    where
        K: Debug,
    {
        self.map.verify();
        verify_chain(&self.map.root, self.first.as_ref(), self.last.as_ref(), self.len());
    }
}

pub(crate) fn verify_chain<K: Hash + Eq + Debug, V>(
    root: &TrieNode<K, LinkedValue<K, V>>,
    first: Option<&K>,
    last: Option<&K>,
    len: usize,
) {
    let mut previous: Option<&K> = None;
    let mut next = first;
    let mut count = 0;
    while let Some(k) = next {
        let d = match root.get(hash_key(k), k, 0) {
            Some(d) => d,
            None => panic!("chain links to absent key {:?}", k),
        };
        assert_eq!(d.v.previous.as_ref(), previous, "broken back link at {:?}", k);
        previous = Some(&d.k);
        next = d.v.next.as_ref();
        count += 1;
        assert!(count <= len, "chain longer than the map");
    }
    assert_eq!(count, len);
    assert_eq!(previous, last);
}

impl<K: Hash + Eq + Clone, V: Clone> PersistentCollection for PersistentOrderedMap<K, V> {
    type Builder = OrderedMapBuilder<K, V>;

    fn len(&self) -> usize {
        self.map.len()
    }

    fn builder(&self) -> Self::Builder {
        PersistentOrderedMap::builder(self)
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        self.map.ptr_eq(&other.map)
    }
}

impl<K: Hash + Eq + Clone, V: Clone> FromIterator<(K, V)> for PersistentOrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut builder = OrderedMapBuilder::new();
        builder.extend(iter);
        builder.into_map()
    }
}

/// Equality is by content. Two maps holding the same entries in a different
/// order are equal.
impl<K: Hash + Eq + Clone, V: Clone + PartialEq> PartialEq for PersistentOrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v)))
    }
}

impl<K: Hash + Eq + Clone, V: Clone + Eq> Eq for PersistentOrderedMap<K, V> {}

impl<K: Hash + Eq + Clone + Debug, V: Clone + Debug> Debug for PersistentOrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K: Hash + Eq + Clone, V: Clone> IntoIterator for &'a PersistentOrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
