use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::iter::FromIterator;

use super::{Iter as MapIter, OrderedMapBuilder, OrderedMapCursor, PersistentOrderedMap};
use crate::error::CollectionError;
use crate::traits::{CollectionBuilder, PersistentCollection};

/// An immutable set that iterates in insertion order. It is an ordered map
/// whose values are `()`.
pub struct PersistentOrderedSet<T> {
    map: PersistentOrderedMap<T, ()>,
}

/// Iterator over the elements of an ordered set, in insertion order.
pub struct Iter<'a, T> {
    inner: MapIter<'a, T, ()>,
}

impl<'a, T: Hash + Eq> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T: Hash + Eq> ExactSizeIterator for Iter<'_, T> {}

impl<T: Clone> Clone for PersistentOrderedSet<T> {
    fn clone(&self) -> Self {
        PersistentOrderedSet {
            map: self.map.clone(),
        }
    }
}

impl<T> Default for PersistentOrderedSet<T> {
    fn default() -> Self {
        PersistentOrderedSet {
            map: PersistentOrderedMap::default(),
        }
    }
}

impl<T: Hash + Eq + Clone> PersistentOrderedSet<T> {
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

    /// True if both sets are the same version of the same structure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.map.ptr_eq(&other.map)
    }

    /// Iterate over the elements in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.map.iter(),
        }
    }

    /// The earliest inserted element.
    pub fn first(&self) -> Option<&T> {
        self.map.first().map(|(k, _)| k)
    }

    /// The latest inserted element.
    pub fn last(&self) -> Option<&T> {
        self.map.last().map(|(k, _)| k)
    }

    /// Assert if `x` is in the set.
    pub fn contains<Q>(&self, x: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(x)
    }

    /// Return a set with `x` appended. If `x` is already present, this set
    /// is returned unchanged and `x` keeps its place.
    pub fn insert(&self, x: T) -> Self {
        PersistentOrderedSet {
            map: self.map.insert(x, ()),
        }
    }

    /// Return a set with every element of `iter` appended in turn.
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
        PersistentOrderedSet {
            map: self.map.remove(x),
        }
    }

    /// Return a set without the elements for which `f` returns true.
    pub fn remove_all<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&T) -> bool,
    {
        PersistentOrderedSet {
            map: self.map.remove_all(|k, _| f(k)),
        }
    }

    /// Return an empty set.
    pub fn clear(&self) -> Self {
        PersistentOrderedSet {
            map: self.map.clear(),
        }
    }

    /// Create a builder over this set.
    pub fn builder(&self) -> OrderedSetBuilder<T> {
        OrderedSetBuilder {
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

impl<T: Hash + Eq + Clone> PersistentCollection for PersistentOrderedSet<T> {
    type Builder = OrderedSetBuilder<T>;

    fn len(&self) -> usize {
        self.map.len()
    }

    fn builder(&self) -> Self::Builder {
        PersistentOrderedSet::builder(self)
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        self.map.ptr_eq(&other.map)
    }
}

impl<T: Hash + Eq + Clone> FromIterator<T> for PersistentOrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut builder = OrderedSetBuilder::new();
        builder.extend(iter);
        builder.into_set()
    }
}

/// Equality is by content, regardless of order.
impl<T: Hash + Eq + Clone> PartialEq for PersistentOrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Hash + Eq + Clone> Eq for PersistentOrderedSet<T> {}

impl<T: Hash + Eq + Clone + Debug> Debug for PersistentOrderedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T: Hash + Eq + Clone> IntoIterator for &'a PersistentOrderedSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A mutable front end over a `PersistentOrderedSet`.
pub struct OrderedSetBuilder<T> {
    inner: OrderedMapBuilder<T, ()>,
}

impl<T: Hash + Eq + Clone> OrderedSetBuilder<T> {
    /// Construct a builder over an empty set.
    pub fn new() -> Self {
        OrderedSetBuilder {
            inner: OrderedMapBuilder::new(),
        }
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

    /// Iterate over the elements in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.inner.iter(),
        }
    }

    /// Assert if `x` is in the builder.
    pub fn contains<Q>(&self, x: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(x)
    }

    /// Append `x`, returning true if it was not already present.
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

    /// Start a mutating iteration over the builder, in insertion order.
    pub fn cursor(&self) -> OrderedSetCursor<T> {
        OrderedSetCursor {
            inner: self.inner.cursor(),
        }
    }

    /// Freeze the current content as a set.
    pub fn build(&mut self) -> PersistentOrderedSet<T> {
        PersistentOrderedSet {
            map: self.inner.build(),
        }
    }

    fn into_set(self) -> PersistentOrderedSet<T> {
        PersistentOrderedSet {
            map: self.inner.into_map(),
        }
    }
}

impl<T: Hash + Eq + Clone> Default for OrderedSetBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq + Clone> Extend<T> for OrderedSetBuilder<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for x in iter {
            self.insert(x);
        }
    }
}

impl<T: Hash + Eq + Clone> CollectionBuilder for OrderedSetBuilder<T> {
    type Collection = PersistentOrderedSet<T>;

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn mod_count(&self) -> usize {
        self.inner.mod_count()
    }

    fn build(&mut self) -> PersistentOrderedSet<T> {
        OrderedSetBuilder::build(self)
    }
}

impl<T: Hash + Eq + Clone + Debug> Debug for OrderedSetBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A mutating iterator over an `OrderedSetBuilder`, in insertion order.
#[derive(Debug)]
pub struct OrderedSetCursor<T> {
    inner: OrderedMapCursor<T, ()>,
}

impl<T: Hash + Eq + Clone> OrderedSetCursor<T> {
    /// True if `next` has an element to return.
    pub fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    /// Advance to the next element.
    pub fn next<'b>(&mut self, builder: &'b OrderedSetBuilder<T>) -> Result<&'b T, CollectionError> {
        self.inner.next(&builder.inner).map(|(k, _)| k)
    }

    /// Remove the element last returned by `next`.
    pub fn remove(&mut self, builder: &mut OrderedSetBuilder<T>) -> Result<T, CollectionError> {
        self.inner.remove(&mut builder.inner).map(|(k, _)| k)
    }
}
