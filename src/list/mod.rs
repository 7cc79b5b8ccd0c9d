//! PersistentList - An immutable list based on a vector trie.
//!
//! Elements are addressed by position. The list is a trie of 32 way branches
//! over leaves of 32 elements, plus a tail leaf holding the last 1 to 32
//! elements. Reads descend at most log32(n) levels, and appends usually only
//! copy the small tail.
//!
//! Inserting or removing in the middle splits the trie at the start of the
//! affected leaf. The prefix keeps sharing its nodes with the old list, and
//! only the elements from that leaf onward are appended again.

mod builder;
mod view;

pub use crate::internals::vector::iter::{IntoIter, Iter};
pub use builder::ListBuilder;
pub use view::{ListCursor, SubList};

use std::fmt::{self, Debug};
use std::iter::FromIterator;
use std::ops::Index;

use crate::error::{check_index, check_position, CollectionError};
use crate::internals::vector::node::Vector;
use crate::owner::Owner;
use crate::traits::PersistentCollection;

/// An immutable list with structural sharing between versions.
pub struct PersistentList<T> {
    pub(crate) vector: Vector<T>,
}

impl<T> Clone for PersistentList<T> {
    fn clone(&self) -> Self {
        PersistentList {
            vector: self.vector.clone(),
        }
    }
}

impl<T> Default for PersistentList<T> {
    fn default() -> Self {
        PersistentList {
            vector: Vector::new(),
        }
    }
}

impl<T> PersistentList<T> {
    /// Construct a new, empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of elements in the list.
    pub fn len(&self) -> usize {
        self.vector.len()
    }

    /// True if the list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.vector.len() == 0
    }

    /// True if both lists are the same version of the same trie.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.vector.ptr_eq(&other.vector)
    }

    /// The element at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.vector.get(index)
    }

    /// The first element.
    pub fn first(&self) -> Option<&T> {
        self.vector.get(0)
    }

    /// The last element.
    pub fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.vector.get(i))
    }

    /// Iterate over the elements, front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.vector, 0, self.vector.len())
    }

    /// The position of the first element equal to `x`.
    pub fn index_of(&self, x: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|y| y == x)
    }

    /// Assert if an element equal to `x` is in the list.
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(x).is_some()
    }
}

impl<T: Clone> PersistentList<T> {
    fn update<F>(&self, f: F) -> Self
    where
        F: FnOnce(&mut Vector<T>, Owner),
    {
        let mut vector = self.vector.clone();
        f(&mut vector, Owner::new());
        PersistentList { vector }
    }

    /// Return a list with `x` appended.
    pub fn push(&self, x: T) -> Self {
        self.update(|v, owner| v.push(x, owner))
    }

    /// Return a list with every element of `iter` appended.
    pub fn push_all<I: IntoIterator<Item = T>>(&self, iter: I) -> Self {
        self.update(|v, owner| v.extend(iter, owner))
    }

    /// Return a list with `x` inserted before position `index`.
    pub fn insert(&self, index: usize, x: T) -> Result<Self, CollectionError> {
        check_position(index, self.len())?;
        Ok(self.update(|v, owner| v.insert(index, x, owner)))
    }

    /// Return a list with the elements of `iter` inserted before `index`,
    /// keeping their order.
    pub fn insert_all<I>(&self, index: usize, iter: I) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = T>,
    {
        check_position(index, self.len())?;
        let values: Vec<T> = iter.into_iter().collect();
        if values.is_empty() {
            return Ok(self.clone());
        }
        Ok(self.update(|v, owner| v.insert_all(index, values, owner)))
    }

    /// Return a list with the element at `index` replaced by `x`.
    pub fn set(&self, index: usize, x: T) -> Result<Self, CollectionError> {
        check_index(index, self.len())?;
        Ok(self.update(|v, owner| {
            v.set(index, x, owner);
        }))
    }

    /// Return a list without the element at `index`.
    pub fn remove_at(&self, index: usize) -> Result<Self, CollectionError> {
        check_index(index, self.len())?;
        Ok(self.update(|v, owner| {
            v.remove(index, owner);
        }))
    }

    /// Return a list without its last element. An empty list is returned
    /// unchanged.
    pub fn pop(&self) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        self.update(|v, owner| {
            v.pop(owner);
        })
    }

    /// Return a list without the first element equal to `x`. If there is
    /// none, this list is returned unchanged.
    pub fn remove(&self, x: &T) -> Self
    where
        T: PartialEq,
    {
        match self.index_of(x) {
            Some(index) => self.update(|v, owner| {
                v.remove(index, owner);
            }),
            None => self.clone(),
        }
    }

    /// Return a list without the elements for which `f` returns true.
    pub fn remove_all<F>(&self, f: F) -> Self
    where
        F: FnMut(&T) -> bool,
    {
        let mut vector = self.vector.clone();
        if vector.remove_if(Owner::new(), f) == 0 {
            return self.clone();
        }
        PersistentList { vector }
    }

    /// Return the first `len` elements. A list no longer than `len` is
    /// returned unchanged.
    pub fn truncate(&self, len: usize) -> Self {
        if len >= self.len() {
            return self.clone();
        }
        self.update(|v, owner| v.truncate(len, owner))
    }

    /// Return an empty list.
    pub fn clear(&self) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        Self::new()
    }

    /// Create a builder over this list.
    pub fn builder(&self) -> ListBuilder<T> {
        ListBuilder::from_list(self)
    }

    #[allow(unused)]
    pub(crate) fn verify(&self) {
        self.vector.verify()
    }
}

impl<T: Clone> PersistentCollection for PersistentList<T> {
    type Builder = ListBuilder<T>;

    fn len(&self) -> usize {
        self.vector.len()
    }

    fn builder(&self) -> Self::Builder {
        ListBuilder::from_list(self)
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        self.vector.ptr_eq(&other.vector)
    }
}

impl<T> Index<usize> for PersistentList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.vector.get(index) {
            Some(x) => x,
            None => panic!("index {} out of bounds for size {}", index, self.len()),
        }
    }
}

impl<T: Clone> FromIterator<T> for PersistentList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vector = Vector::new();
        vector.extend(iter, Owner::new());
        PersistentList { vector }
    }
}

impl<T: PartialEq> PartialEq for PersistentList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.len() == other.len() && self.iter().eq(other.iter()))
    }
}

impl<T: Eq> Eq for PersistentList<T> {}

impl<T: Debug> Debug for PersistentList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a PersistentList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone> IntoIterator for PersistentList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_index_law() {
        for n in [0usize, 1, 31, 32, 33, 1024, 100_000] {
            let list: PersistentList<usize> = (0..n).collect();
            list.verify();
            assert_eq!(list.len(), n);
            for i in 0..n {
                assert_eq!(list[i], i);
            }
            assert_eq!(list.get(n), None);
        }
    }

    #[test]
    fn test_list_clone_without_clone_elements() {
        // Handles share nodes, so the element type never needs to be cloned.
        struct Opaque;

        let a: PersistentList<Opaque> = PersistentList::new();
        let b = a.clone();
        assert!(b.ptr_eq(&a));
        assert!(b.is_empty());

        let mut builder: ListBuilder<Opaque> = ListBuilder::new();
        let built = builder.build();
        assert!(built.clone().is_empty());
    }

    #[test]
    fn test_list_persistence() {
        let a: PersistentList<u32> = (0..100).collect();
        let b = a.push(100);
        let c = b.set(50, 5000).unwrap();
        let d = c.remove_at(0).unwrap();
        assert_eq!(a.len(), 100);
        assert_eq!(b.len(), 101);
        assert_eq!(b[50], 50);
        assert_eq!(c[50], 5000);
        assert_eq!(d[0], 1);
        assert_eq!(d[49], 5000);
        assert_eq!(a.last(), Some(&99));
        assert_eq!(b.last(), Some(&100));
        assert_eq!(d.first(), Some(&1));
        d.verify();
    }

    #[test]
    fn test_list_middle_insert_law() {
        let n = 1000usize;
        let list: PersistentList<usize> = (0..n).collect();
        for k in [0, n, 517, 32, 64, 992] {
            let inserted = list.insert(k, 9999).unwrap();
            inserted.verify();
            let mut model: Vec<usize> = (0..n).collect();
            model.insert(k, 9999);
            assert_eq!(inserted.iter().copied().collect::<Vec<_>>(), model);

            if k < n {
                let removed = list.remove_at(k).unwrap();
                removed.verify();
                let mut model: Vec<usize> = (0..n).collect();
                model.remove(k);
                assert_eq!(removed.into_iter().collect::<Vec<_>>(), model);
            }
        }
        // The source is untouched by all of it.
        assert!(list.iter().copied().eq(0..n));
    }

    #[test]
    fn test_list_bounds() {
        let list: PersistentList<u8> = (0..10).collect();
        assert_eq!(
            list.insert(11, 0).unwrap_err(),
            CollectionError::IndexOutOfBounds { index: 11, size: 10 }
        );
        assert!(list.insert(10, 0).is_ok());
        assert!(list.set(10, 0).is_err());
        assert!(list.remove_at(10).is_err());
        assert!(list.insert_all(12, vec![1, 2]).is_err());
    }

    #[test]
    fn test_list_noop_identity() {
        let list: PersistentList<u32> = (0..40).collect();
        assert!(list.remove(&1000).ptr_eq(&list));
        assert!(list.remove_all(|x| *x > 1000).ptr_eq(&list));
        assert!(list.truncate(40).ptr_eq(&list));
        assert!(list.insert_all(3, Vec::new()).unwrap().ptr_eq(&list));
        assert!(list.builder().build().ptr_eq(&list));
        let empty = PersistentList::<u32>::new();
        assert!(empty.pop().ptr_eq(&empty));
        assert!(empty.clear().ptr_eq(&empty));
    }

    #[test]
    fn test_list_search_and_bulk() {
        let list: PersistentList<u32> = (0..200).collect();
        assert_eq!(list.index_of(&150), Some(150));
        assert!(!list.contains(&200));
        let fewer = list.remove(&150).remove_all(|x| x % 2 == 1);
        fewer.verify();
        assert_eq!(fewer.len(), 99);
        assert!(!fewer.contains(&150));

        let more = list.insert_all(33, vec![7, 7, 7]).unwrap().push_all(0..3);
        more.verify();
        assert_eq!(more.len(), 206);
        assert_eq!(more[33], 7);
        assert_eq!(more[36], 33);

        let short = list.truncate(33).pop();
        assert_eq!(short.len(), 32);
        assert_eq!(format!("{:?}", short.truncate(3)), "[0, 1, 2]");
        assert_eq!(short, (0..32).collect::<PersistentList<u32>>());
    }
}
