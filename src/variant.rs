//! Selecting a map or set implementation by name.
//!
//! The backings are a closed set, so they are modelled as enums rather than
//! trait objects. Each operation dispatches with a `match`.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::CollectionError;
use crate::map::PersistentHashMap;
use crate::ordered::{PersistentOrderedMap, PersistentOrderedSet};
use crate::set::PersistentHashSet;

/// The backing of a map or set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    /// Unordered, backed by the hash trie alone.
    Hash,
    /// Insertion ordered, backed by the linked hash trie.
    Ordered,
}

/// Sets come in the same kinds as maps.
pub type SetKind = MapKind;

impl FromStr for MapKind {
    type Err = CollectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hash" => Ok(MapKind::Hash),
            "ordered" => Ok(MapKind::Ordered),
            other => {
                tracing::debug!(name = other, "unknown collection implementation");
                Err(CollectionError::UnsupportedConfiguration(other.to_string()))
            }
        }
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKind::Hash => write!(f, "hash"),
            MapKind::Ordered => write!(f, "ordered"),
        }
    }
}

/// A persistent map of either kind.
#[derive(Clone)]
pub enum AnyMap<K, V> {
    /// Unordered.
    Hash(PersistentHashMap<K, V>),
    /// Insertion ordered.
    Ordered(PersistentOrderedMap<K, V>),
}

impl<K: Hash + Eq + Clone, V: Clone + PartialEq> AnyMap<K, V> {
    /// An empty map of the given kind.
    pub fn empty(kind: MapKind) -> Self {
        match kind {
            MapKind::Hash => AnyMap::Hash(PersistentHashMap::new()),
            MapKind::Ordered => AnyMap::Ordered(PersistentOrderedMap::new()),
        }
    }

    /// The kind of this map.
    pub fn kind(&self) -> MapKind {
        match self {
            AnyMap::Hash(_) => MapKind::Hash,
            AnyMap::Ordered(_) => MapKind::Ordered,
        }
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        match self {
            AnyMap::Hash(m) => m.len(),
            AnyMap::Ordered(m) => m.len(),
        }
    }

    /// True if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieve the value for `k`.
    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self {
            AnyMap::Hash(m) => m.get(k),
            AnyMap::Ordered(m) => m.get(k),
        }
    }

    /// Return a map with `k` bound to `v`.
    pub fn insert(&self, k: K, v: V) -> Self {
        match self {
            AnyMap::Hash(m) => AnyMap::Hash(m.insert(k, v)),
            AnyMap::Ordered(m) => AnyMap::Ordered(m.insert(k, v)),
        }
    }

    /// Return a map without `k`.
    pub fn remove<Q>(&self, k: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self {
            AnyMap::Hash(m) => AnyMap::Hash(m.remove(k)),
            AnyMap::Ordered(m) => AnyMap::Ordered(m.remove(k)),
        }
    }

    /// True if both are the same version of the same structure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AnyMap::Hash(a), AnyMap::Hash(b)) => a.ptr_eq(b),
            (AnyMap::Ordered(a), AnyMap::Ordered(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Iterate over the entries, in the order of the backing.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        match self {
            AnyMap::Hash(m) => Box::new(m.iter()),
            AnyMap::Ordered(m) => Box::new(m.iter()),
        }
    }
}

/// A persistent set of either kind.
#[derive(Clone)]
pub enum AnySet<T> {
    /// Unordered.
    Hash(PersistentHashSet<T>),
    /// Insertion ordered.
    Ordered(PersistentOrderedSet<T>),
}

impl<T: Hash + Eq + Clone> AnySet<T> {
    /// An empty set of the given kind.
    pub fn empty(kind: SetKind) -> Self {
        match kind {
            MapKind::Hash => AnySet::Hash(PersistentHashSet::new()),
            MapKind::Ordered => AnySet::Ordered(PersistentOrderedSet::new()),
        }
    }

    /// The kind of this set.
    pub fn kind(&self) -> SetKind {
        match self {
            AnySet::Hash(_) => MapKind::Hash,
            AnySet::Ordered(_) => MapKind::Ordered,
        }
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        match self {
            AnySet::Hash(s) => s.len(),
            AnySet::Ordered(s) => s.len(),
        }
    }

    /// True if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Assert if `x` is in the set.
    pub fn contains<Q>(&self, x: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self {
            AnySet::Hash(s) => s.contains(x),
            AnySet::Ordered(s) => s.contains(x),
        }
    }

    /// Return a set holding `x`.
    pub fn insert(&self, x: T) -> Self {
        match self {
            AnySet::Hash(s) => AnySet::Hash(s.insert(x)),
            AnySet::Ordered(s) => AnySet::Ordered(s.insert(x)),
        }
    }

    /// Return a set without `x`.
    pub fn remove<Q>(&self, x: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self {
            AnySet::Hash(s) => AnySet::Hash(s.remove(x)),
            AnySet::Ordered(s) => AnySet::Ordered(s.remove(x)),
        }
    }

    /// True if both are the same version of the same structure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AnySet::Hash(a), AnySet::Hash(b)) => a.ptr_eq(b),
            (AnySet::Ordered(a), AnySet::Ordered(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Iterate over the elements, in the order of the backing.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        match self {
            AnySet::Hash(s) => Box::new(s.iter()),
            AnySet::Ordered(s) => Box::new(s.iter()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_parse() {
        assert_eq!("hash".parse::<MapKind>(), Ok(MapKind::Hash));
        assert_eq!("ordered".parse::<SetKind>(), Ok(MapKind::Ordered));
        assert_eq!(
            "btree".parse::<MapKind>(),
            Err(CollectionError::UnsupportedConfiguration("btree".to_string()))
        );
        assert_eq!(MapKind::Ordered.to_string(), "ordered");
    }

    #[test]
    fn test_variant_any_map() {
        for kind in [MapKind::Hash, MapKind::Ordered] {
            let mut m = AnyMap::empty(kind);
            for k in (0..50u32).rev() {
                m = m.insert(k, k * 2);
            }
            assert_eq!(m.kind(), kind);
            assert_eq!(m.len(), 50);
            assert_eq!(m.get(&7), Some(&14));
            assert!(m.insert(7, 14).ptr_eq(&m));
            let m2 = m.remove(&7);
            assert_eq!(m2.len(), 49);
            assert!(!m2.ptr_eq(&m));
            assert_eq!(m.iter().count(), 50);
            if kind == MapKind::Ordered {
                assert!(m.iter().map(|(k, _)| *k).eq((0..50).rev()));
            }
        }
        assert!(!AnyMap::<u32, u32>::empty(MapKind::Hash).ptr_eq(&AnyMap::empty(MapKind::Ordered)));
    }

    #[test]
    fn test_variant_any_set() {
        for kind in ["hash", "ordered"] {
            let kind: SetKind = kind.parse().unwrap();
            let s = AnySet::empty(kind).insert("x").insert("y").insert("x");
            assert_eq!(s.len(), 2);
            assert!(s.contains("y"));
            assert!(s.remove("q").ptr_eq(&s));
            assert!(s.remove("x").iter().copied().eq(["y"]));
            assert!(!s.is_empty());
        }
    }
}
