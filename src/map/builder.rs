use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;

use super::PersistentHashMap;
use crate::error::CollectionError;
use crate::internals::trie::cursor::TrieCursor;
use crate::internals::trie::iter::{Iter, KeyIter};
use crate::internals::trie::node::{Datum, TrieNode};
use crate::owner::{edit, Owner};
use crate::traits::CollectionBuilder;
use crate::utils::hash_key;

/// A mutable front end over a `PersistentHashMap`.
///
/// The builder owns the nodes it has copied and edits them in place, so a
/// batch of updates copies each node at most once. `build()` hands out the
/// current content as a map in O(1), after which the builder copies on write
/// again.
pub struct HashMapBuilder<K, V> {
    root: Arc<TrieNode<K, V>>,
    size: usize,
    owner: Owner,
    mod_count: usize,
}

impl<K, V> Default for HashMapBuilder<K, V> {
    fn default() -> Self {
        HashMapBuilder {
            root: Arc::new(TrieNode::empty()),
            size: 0,
            owner: Owner::new(),
            mod_count: 0,
        }
    }
}

impl<K, V> HashMapBuilder<K, V> {
    /// Construct a builder over an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_map(map: &PersistentHashMap<K, V>) -> Self {
        tracing::trace!(size = map.size, "hash map builder created");
        HashMapBuilder {
            root: map.root.clone(),
            size: map.size,
            owner: Owner::new(),
            mod_count: 0,
        }
    }

    /// The number of entries in the builder.
    pub fn len(&self) -> usize {
        self.size
    }

    /// True if the builder holds no entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The count of structural modifications made through this builder.
    pub fn mod_count(&self) -> usize {
        self.mod_count
    }

    /// Iterate over references to the entries of the builder.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root, self.size)
    }

    /// Iterate over the keys of the builder.
    pub fn keys(&self) -> KeyIter<'_, K, V> {
        KeyIter::new(&self.root, self.size)
    }

    /// Freeze the current content as a map. Later edits through this builder
    /// do not affect the returned map.
    pub fn build(&mut self) -> PersistentHashMap<K, V> {
        tracing::trace!(size = self.size, mod_count = self.mod_count, "hash map built");
        self.owner = Owner::new();
        PersistentHashMap {
            root: self.root.clone(),
            size: self.size,
        }
    }

    pub(crate) fn root(&self) -> &TrieNode<K, V> {
        &self.root
    }

    // For one-shot builders behind the persistent operations.
    pub(crate) fn into_map(self) -> PersistentHashMap<K, V> {
        PersistentHashMap {
            root: self.root,
            size: self.size,
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone> HashMapBuilder<K, V> {
    /// Retrieve the value for `k`.
    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.root.get(hash_key(k), k, 0).map(|d| &d.v)
    }

    /// Assert if a key exists in the builder.
    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.root.get(hash_key(k), k, 0).is_some()
    }

    /// Mutable access to the value for `k`. A miss copies nothing.
    pub fn get_mut<Q>(&mut self, k: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let h = hash_key(k);
        self.root.get(h, k, 0)?;
        edit(&mut self.root, self.owner)
            .get_mut(h, k, 0, self.owner)
            .map(|d| &mut d.v)
    }

    /// Bind `k` to `v`, returning the value it replaced. Only a new key counts
    /// as a structural modification.
    pub fn insert(&mut self, k: K, v: V) -> Option<V> {
        let h = hash_key(&k);
        let prev = edit(&mut self.root, self.owner).put(Datum::new(h, k, v), 0, self.owner);
        if prev.is_none() {
            self.size += 1;
            self.mod_count += 1;
        }
        prev
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
        let h = hash_key(k);
        // A miss must not copy the path.
        self.root.get(h, k, 0)?;
        let d = edit(&mut self.root, self.owner).remove(h, k, 0, self.owner)?;
        self.size -= 1;
        self.mod_count += 1;
        Some((d.k, d.v))
    }

    /// Remove every entry for which `f` returns true, returning how many
    /// were removed.
    pub fn remove_all<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        // `f` sees each entry exactly once, before anything is copied.
        let doomed: Vec<K> = self
            .iter()
            .filter(|&(k, v)| f(k, v))
            .map(|(k, _)| k.clone())
            .collect();
        if doomed.is_empty() {
            return 0;
        }
        let owner = self.owner;
        let root = edit(&mut self.root, owner);
        for k in doomed.iter() {
            let removed = root.remove(hash_key(k), k, 0, owner);
            debug_assert!(removed.is_some());
        }
        self.size -= doomed.len();
        self.mod_count += 1;
        doomed.len()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        if self.size == 0 {
            return;
        }
        self.root = Arc::new(TrieNode::empty());
        self.size = 0;
        self.mod_count += 1;
    }

    /// Start a mutating iteration over the builder.
    pub fn cursor(&self) -> HashMapCursor<K, V> {
        HashMapCursor {
            inner: TrieCursor::new(&self.root, self.mod_count),
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone> Extend<(K, V)> for HashMapBuilder<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone> CollectionBuilder for HashMapBuilder<K, V> {
    type Collection = PersistentHashMap<K, V>;

    fn len(&self) -> usize {
        self.size
    }

    fn mod_count(&self) -> usize {
        self.mod_count
    }

    fn build(&mut self) -> PersistentHashMap<K, V> {
        HashMapBuilder::build(self)
    }
}

impl<K: Debug, V: Debug> Debug for HashMapBuilder<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// A mutating iterator over a `HashMapBuilder`.
///
/// The cursor does not borrow the builder. Pass the same builder to every
/// call. If the builder is structurally modified by anything other than this
/// cursor, the next call reports `ConcurrentModification`.
#[derive(Debug)]
pub struct HashMapCursor<K, V> {
    inner: TrieCursor<K, V>,
}

impl<K: Hash + Eq + Clone, V: Clone> HashMapCursor<K, V> {
    /// True if `next` has an entry to return.
    pub fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    /// Advance to the next entry.
    pub fn next<'b>(
        &mut self,
        builder: &'b HashMapBuilder<K, V>,
    ) -> Result<(&'b K, &'b V), CollectionError> {
        let d = self.inner.next(&builder.root, builder.mod_count)?;
        Ok((&d.k, &d.v))
    }

    /// Replace the value of the entry last returned by `next`.
    pub fn set_value(
        &mut self,
        builder: &mut HashMapBuilder<K, V>,
        v: V,
    ) -> Result<V, CollectionError> {
        let (_, k) = self.inner.last(builder.mod_count)?;
        let k = k.clone();
        builder.insert(k, v).ok_or(CollectionError::IllegalState)
    }

    /// Remove the entry last returned by `next`. Iteration continues with the
    /// entry that would have followed it.
    pub fn remove(&mut self, builder: &mut HashMapBuilder<K, V>) -> Result<(K, V), CollectionError> {
        let (k, next) = self.inner.begin_remove(&builder.root, builder.mod_count)?;
        let removed = builder
            .remove_entry(&k)
            .ok_or(CollectionError::IllegalState)?;
        self.inner.finish_remove(&builder.root, next, builder.mod_count);
        Ok(removed)
    }
}
