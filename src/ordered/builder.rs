use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::mem;

use super::{Iter, LinkedValue, PersistentOrderedMap};
use crate::error::{check_mod_count, CollectionError};
use crate::map::HashMapBuilder;
use crate::traits::CollectionBuilder;

/// A mutable front end over a `PersistentOrderedMap`.
///
/// Every top level call that adds or removes keys counts as one structural
/// modification, however many links it rewrites underneath.
pub struct OrderedMapBuilder<K, V> {
    first: Option<K>,
    last: Option<K>,
    inner: HashMapBuilder<K, LinkedValue<K, V>>,
    mod_count: usize,
}

impl<K, V> Default for OrderedMapBuilder<K, V> {
    fn default() -> Self {
        OrderedMapBuilder {
            first: None,
            last: None,
            inner: HashMapBuilder::default(),
            mod_count: 0,
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone> OrderedMapBuilder<K, V> {
    /// Construct a builder over an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        first: Option<K>,
        last: Option<K>,
        inner: HashMapBuilder<K, LinkedValue<K, V>>,
    ) -> Self {
        OrderedMapBuilder {
            first,
            last,
            inner,
            mod_count: 0,
        }
    }

    /// The number of entries in the builder.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if the builder holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The count of structural modifications made through this builder.
    pub fn mod_count(&self) -> usize {
        self.mod_count
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.inner.root(), self.first.as_ref(), self.len())
    }

    /// Retrieve the value for `k`.
    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get(k).map(|link| &link.value)
    }

    /// Assert if a key exists in the builder.
    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(k)
    }

    /// Bind `k` to `v`, returning the value it replaced. A new key is
    /// appended to the order.
    pub fn insert(&mut self, k: K, v: V) -> Option<V> {
        if let Some(link) = self.inner.get_mut(&k) {
            return Some(mem::replace(&mut link.value, v));
        }

        let previous = self.last.take();
        match &previous {
            Some(last) => {
                if let Some(link) = self.inner.get_mut(last) {
                    link.next = Some(k.clone());
                }
            }
            None => self.first = Some(k.clone()),
        }
        self.inner.insert(
            k.clone(),
            LinkedValue {
                value: v,
                previous,
                next: None,
            },
        );
        self.last = Some(k);
        self.mod_count += 1;
        None
    }

    /// Remove `k`, returning its value if it was present.
    pub fn remove<Q>(&mut self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(k).map(|(_, v)| v)
    }

    /// Remove `k`, returning the stored key and value if it was present.
    pub fn remove_entry<Q>(&mut self, k: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (k, link) = self.inner.remove_entry(k)?;
        self.unlink(link.previous.as_ref(), link.next.as_ref());
        self.mod_count += 1;
        Some((k, link.value))
    }

    // Join the neighbours of a removed entry to each other.
    fn unlink(&mut self, previous: Option<&K>, next: Option<&K>) {
        match previous {
            Some(p) => {
                if let Some(link) = self.inner.get_mut(p) {
                    link.next = next.cloned();
                }
            }
            None => self.first = next.cloned(),
        }
        match next {
            Some(n) => {
                if let Some(link) = self.inner.get_mut(n) {
                    link.previous = previous.cloned();
                }
            }
            None => self.last = previous.cloned(),
        }
    }

    /// Remove `k` only if it is bound to a value equal to `v`. Returns true
    /// if it was removed.
    pub fn remove_entry_if_equal<Q>(&mut self, k: &Q, v: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        if self.get(k) != Some(v) {
            return false;
        }
        self.remove_entry(k).is_some()
    }

    /// Remove every entry for which `f` returns true, returning how many
    /// were removed.
    pub fn remove_all<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        let doomed: Vec<K> = self
            .iter()
            .filter(|&(k, v)| f(k, v))
            .map(|(k, _)| k.clone())
            .collect();
        if doomed.is_empty() {
            return 0;
        }
        for k in doomed.iter() {
            if let Some((_, link)) = self.inner.remove_entry(k) {
                self.unlink(link.previous.as_ref(), link.next.as_ref());
            }
        }
        self.mod_count += 1;
        doomed.len()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        self.first = None;
        self.last = None;
        self.inner.clear();
        self.mod_count += 1;
    }

    /// Start a mutating iteration over the builder, in insertion order.
    pub fn cursor(&self) -> OrderedMapCursor<K, V> {
        OrderedMapCursor {
            next: self.first.clone(),
            last: None,
            expected: self.mod_count,
            marker: std::marker::PhantomData,
        }
    }

    /// Freeze the current content as a map.
    pub fn build(&mut self) -> PersistentOrderedMap<K, V> {
        tracing::trace!(size = self.len(), mod_count = self.mod_count, "ordered map built");
        PersistentOrderedMap {
            first: self.first.clone(),
            last: self.last.clone(),
            map: self.inner.build(),
        }
    }

    pub(crate) fn into_map(self) -> PersistentOrderedMap<K, V> {
        PersistentOrderedMap {
            first: self.first,
            last: self.last,
            map: self.inner.into_map(),
        }
    }

    #[allow(unused)]
    pub(crate) fn verify(&self)
    where
        K: Debug,
    {
        super::verify_chain(
            self.inner.root(),
            self.first.as_ref(),
            self.last.as_ref(),
            self.len(),
        );
    }
}

impl<K: Hash + Eq + Clone, V: Clone> Extend<(K, V)> for OrderedMapBuilder<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone> CollectionBuilder for OrderedMapBuilder<K, V> {
    type Collection = PersistentOrderedMap<K, V>;

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn mod_count(&self) -> usize {
        self.mod_count
    }

    fn build(&mut self) -> PersistentOrderedMap<K, V> {
        OrderedMapBuilder::build(self)
    }
}

impl<K: Hash + Eq + Clone + Debug, V: Clone + Debug> Debug for OrderedMapBuilder<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// A mutating iterator over an `OrderedMapBuilder`, in insertion order.
///
/// The position is the key of the next entry, which removing the current
/// entry does not disturb. Pass the same builder to every call.
#[derive(Debug)]
pub struct OrderedMapCursor<K, V> {
    next: Option<K>,
    last: Option<K>,
    expected: usize,
    marker: std::marker::PhantomData<fn() -> V>,
}

impl<K: Hash + Eq + Clone, V: Clone> OrderedMapCursor<K, V> {
    /// True if `next` has an entry to return.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Advance to the next entry.
    pub fn next<'b>(
        &mut self,
        builder: &'b OrderedMapBuilder<K, V>,
    ) -> Result<(&'b K, &'b V), CollectionError> {
        check_mod_count(self.expected, builder.mod_count)?;
        let k = self.next.take().ok_or(CollectionError::NoSuchElement)?;
        let (k, link) = builder
            .inner
            .root()
            .get(crate::utils::hash_key(&k), &k, 0)
            .map(|d| (&d.k, &d.v))
            .ok_or(CollectionError::NoSuchElement)?;
        self.next = link.next.clone();
        self.last = Some(k.clone());
        Ok((k, &link.value))
    }

    /// Replace the value of the entry last returned by `next`.
    pub fn set_value(
        &mut self,
        builder: &mut OrderedMapBuilder<K, V>,
        v: V,
    ) -> Result<V, CollectionError> {
        check_mod_count(self.expected, builder.mod_count)?;
        let k = self.last.as_ref().ok_or(CollectionError::IllegalState)?;
        builder.insert(k.clone(), v).ok_or(CollectionError::IllegalState)
    }

    /// Remove the entry last returned by `next`.
    pub fn remove(&mut self, builder: &mut OrderedMapBuilder<K, V>) -> Result<(K, V), CollectionError> {
        check_mod_count(self.expected, builder.mod_count)?;
        let k = self.last.take().ok_or(CollectionError::IllegalState)?;
        let removed = builder
            .remove_entry(&k)
            .ok_or(CollectionError::IllegalState)?;
        self.expected = builder.mod_count;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_map_builder_basic() {
        let mut b = OrderedMapBuilder::new();
        for k in (0..100u32).rev() {
            assert_eq!(b.insert(k, k), None);
        }
        assert_eq!(b.mod_count(), 100);
        assert_eq!(b.insert(50, 500), Some(50));
        assert_eq!(b.mod_count(), 100);
        assert_eq!(b.remove(&99), Some(99));
        assert_eq!(b.remove(&0), Some(0));
        assert_eq!(b.remove(&0), None);
        assert!(!b.remove_entry_if_equal(&50, &50));
        assert!(b.remove_entry_if_equal(&50, &500));
        b.verify();
        assert_eq!(b.mod_count(), 103);
        assert!(b.iter().map(|(k, _)| *k).eq((1..99).rev().filter(|k| *k != 50)));

        assert_eq!(b.remove_all(|k, _| k % 2 == 0), 48);
        assert_eq!(b.mod_count(), 104);
        b.verify();

        let m = b.build();
        m.verify();
        b.clear();
        b.verify();
        assert!(b.is_empty());
        assert_eq!(m.len(), 49);
        assert!(m.keys().all(|k| k % 2 == 1));
    }

    #[test]
    fn test_ordered_map_builder_isolation() {
        let m: PersistentOrderedMap<u32, u32> = (0..200).map(|k| (k, k)).collect();
        let mut b = m.builder();
        b.remove(&0);
        b.insert(0, 0);
        b.insert(5, 55);
        let n = b.build();
        b.remove(&100);
        m.verify();
        n.verify();
        assert!(m.keys().copied().eq(0..200));
        assert!(n.keys().copied().eq((1..200).chain(0..1)));
        assert_eq!(n.get(&5), Some(&55));
        assert_eq!(m.get(&5), Some(&5));
        assert!(n.contains_key(&100));
    }

    #[test]
    fn test_ordered_map_cursor() {
        let mut b: OrderedMapBuilder<u32, u32> = (0..100).map(|k| (k, k)).collect::<PersistentOrderedMap<_, _>>().builder();
        let mut cursor = b.cursor();
        assert_eq!(cursor.remove(&mut b), Err(CollectionError::IllegalState));
        let mut seen = Vec::new();
        while cursor.has_next() {
            let (k, _) = cursor.next(&b).unwrap();
            let k = *k;
            seen.push(k);
            if k % 3 == 0 {
                assert_eq!(cursor.remove(&mut b), Ok((k, k)));
            } else {
                assert_eq!(cursor.set_value(&mut b, k + 1000), Ok(k));
            }
        }
        assert!(seen.into_iter().eq(0..100));
        assert_eq!(cursor.next(&b), Err(CollectionError::NoSuchElement));
        b.verify();
        assert!(b.iter().all(|(k, v)| k % 3 != 0 && *v == k + 1000));

        let mut cursor = b.cursor();
        assert!(cursor.next(&b).is_ok());
        b.insert(1000, 0);
        assert!(matches!(
            cursor.next(&b),
            Err(CollectionError::ConcurrentModification { .. })
        ));
    }
}
