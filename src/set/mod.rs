//! PersistentHashSet - An immutable set based on a hash array mapped trie.
//!
//! This is a `PersistentHashMap` whose values are `()`, so it shares the map's
//! trie, its structural sharing and its builder protocol. See the `map`
//! module for the details.

use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::iter::FromIterator;

use crate::error::CollectionError;
use crate::internals::trie::iter::{IntoIter as MapIntoIter, KeyIter};
use crate::map::{HashMapBuilder, HashMapCursor, PersistentHashMap};
use crate::traits::{CollectionBuilder, PersistentCollection};

/// An immutable hash set with structural sharing between versions.
pub struct PersistentHashSet<T> {
    map: PersistentHashMap<T, ()>,
}

/// Iterator over references to the elements of a set.
pub struct Iter<'a, T> {
    inner: KeyIter<'a, T, ()>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Owning iterator over cloned elements of a set.
pub struct IntoIter<T> {
    inner: MapIntoIter<T, ()>,
}

impl<T: Clone> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> Clone for PersistentHashSet<T> {
    fn clone(&self) -> Self {
        PersistentHashSet {
            map: self.map.clone(),
        }
    }
}

impl<T> Default for PersistentHashSet<T> {
    fn default() -> Self {
        PersistentHashSet {
            map: PersistentHashMap::default(),
        }
    }
}

impl<T> PersistentHashSet<T> {
    /// Construct a new, empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of elements in the set.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if the set holds no elements.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// True if both sets are the same version of the same trie.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.map.ptr_eq(&other.map)
    }

    /// Iterate over the elements of the set.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.map.keys(),
        }
    }
}

impl<T: Hash + Eq + Clone> PersistentHashSet<T> {
    /// Assert if `x` is in the set.
    pub fn contains<Q>(&self, x: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(x)
    }

    /// Retrieve the stored element equal to `x`.
    pub fn get<Q>(&self, x: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get_key_value(x).map(|(k, _)| k)
    }

    /// Return a set holding `x`. If `x` is already present, this set is
    /// returned unchanged.
    pub fn insert(&self, x: T) -> Self {
        PersistentHashSet {
            map: self.map.insert(x, ()),
        }
    }

    /// Return a set holding every element of `iter` as well.
    pub fn insert_all<I: IntoIterator<Item = T>>(&self, iter: I) -> Self {
        let mut builder = self.builder();
        builder.extend(iter);
        builder.into_set()
    }

    /// Return a set without `x`. If `x` is absent, this set is returned
    /// unchanged.
    pub fn remove<Q>(&self, x: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        PersistentHashSet {
            map: self.map.remove(x),
        }
    }

    /// Return a set without the elements for which `f` returns true.
    pub fn remove_all<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&T) -> bool,
    {
        PersistentHashSet {
            map: self.map.remove_all(|k, _| f(k)),
        }
    }

    /// Return an empty set.
    pub fn clear(&self) -> Self {
        PersistentHashSet {
            map: self.map.clear(),
        }
    }

    /// The elements in either set. The larger set's trie is the base, so the
    /// result is that set itself when the other adds nothing.
    pub fn union(&self, other: &Self) -> Self {
        let (base, rest) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut builder = base.builder();
        for x in rest.iter() {
            if !builder.contains(x) {
                builder.insert(x.clone());
            }
        }
        builder.into_set()
    }

    /// The elements of this set that are also in `other`.
    pub fn intersection(&self, other: &Self) -> Self {
        self.remove_all(|x| !other.contains(x))
    }

    /// The elements of this set that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.remove_all(|x| other.contains(x))
    }

    /// True if every element of this set is in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|x| other.contains(x))
    }

    /// Create a builder over this set.
    pub fn builder(&self) -> HashSetBuilder<T> {
        HashSetBuilder {
            inner: self.map.builder(),
        }
    }

    #[allow(unused)]
    pub(crate) fn verify(&self)
    where
        T: Debug,
    {
        self.map.verify()
    }
}

impl<T: Hash + Eq + Clone> PersistentCollection for PersistentHashSet<T> {
    type Builder = HashSetBuilder<T>;

    fn len(&self) -> usize {
        self.map.len()
    }

    fn builder(&self) -> Self::Builder {
        PersistentHashSet::builder(self)
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        self.map.ptr_eq(&other.map)
    }
}

impl<T: Hash + Eq + Clone> FromIterator<T> for PersistentHashSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut builder = HashSetBuilder::new();
        builder.extend(iter);
        builder.into_set()
    }
}

impl<T: Hash + Eq + Clone> PartialEq for PersistentHashSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Hash + Eq + Clone> Eq for PersistentHashSet<T> {}

impl<T: Debug> Debug for PersistentHashSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a PersistentHashSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone> IntoIterator for PersistentHashSet<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.map.into_iter(),
        }
    }
}

/// A mutable front end over a `PersistentHashSet`.
pub struct HashSetBuilder<T> {
    inner: HashMapBuilder<T, ()>,
}

impl<T> Default for HashSetBuilder<T> {
    fn default() -> Self {
        HashSetBuilder {
            inner: HashMapBuilder::default(),
        }
    }
}

impl<T> HashSetBuilder<T> {
    /// Construct a builder over an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of elements in the builder.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if the builder holds no elements.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The count of structural modifications made through this builder.
    pub fn mod_count(&self) -> usize {
        self.inner.mod_count()
    }

    /// Iterate over the elements of the builder.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.inner.keys(),
        }
    }

    /// Freeze the current content as a set.
    pub fn build(&mut self) -> PersistentHashSet<T> {
        PersistentHashSet {
            map: self.inner.build(),
        }
    }

    fn into_set(self) -> PersistentHashSet<T> {
        PersistentHashSet {
            map: self.inner.into_map(),
        }
    }
}

impl<T: Hash + Eq + Clone> HashSetBuilder<T> {
    /// Assert if `x` is in the builder.
    pub fn contains<Q>(&self, x: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(x)
    }

    /// Add `x`, returning true if it was not already present.
    pub fn insert(&mut self, x: T) -> bool {
        if self.inner.contains_key(&x) {
            return false;
        }
        self.inner.insert(x, ());
        true
    }

    /// Remove `x`, returning true if it was present.
    pub fn remove<Q>(&mut self, x: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove(x).is_some()
    }

    /// Remove every element for which `f` returns true, returning how many
    /// were removed.
    pub fn remove_all<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.inner.remove_all(|k, _| f(k))
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.inner.clear()
    }

    /// Start a mutating iteration over the builder.
    pub fn cursor(&self) -> HashSetCursor<T> {
        HashSetCursor {
            inner: self.inner.cursor(),
        }
    }
}

impl<T: Hash + Eq + Clone> Extend<T> for HashSetBuilder<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for x in iter {
            self.insert(x);
        }
    }
}

impl<T: Hash + Eq + Clone> CollectionBuilder for HashSetBuilder<T> {
    type Collection = PersistentHashSet<T>;

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn mod_count(&self) -> usize {
        self.inner.mod_count()
    }

    fn build(&mut self) -> PersistentHashSet<T> {
        HashSetBuilder::build(self)
    }
}

impl<T: Debug> Debug for HashSetBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A mutating iterator over a `HashSetBuilder`. Pass the same builder to
/// every call.
#[derive(Debug)]
pub struct HashSetCursor<T> {
    inner: HashMapCursor<T, ()>,
}

impl<T: Hash + Eq + Clone> HashSetCursor<T> {
    /// True if `next` has an element to return.
    pub fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    /// Advance to the next element.
    pub fn next<'b>(&mut self, builder: &'b HashSetBuilder<T>) -> Result<&'b T, CollectionError> {
        self.inner.next(&builder.inner).map(|(k, _)| k)
    }

    /// Remove the element last returned by `next`.
    pub fn remove(&mut self, builder: &mut HashSetBuilder<T>) -> Result<T, CollectionError> {
        self.inner.remove(&mut builder.inner).map(|(k, _)| k)
    }
}
