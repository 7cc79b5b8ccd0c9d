use std::fmt::{self, Debug};

use super::view::{ListCursor, SubList};
use super::{Iter, PersistentList};
use crate::error::{check_index, check_position, CollectionError};
use crate::internals::vector::node::Vector;
use crate::owner::Owner;
use crate::traits::CollectionBuilder;

/// A mutable front end over a `PersistentList`.
///
/// Nodes copied by the builder are edited in place until the next `build()`.
/// Every change of length counts as a structural modification; replacing an
/// element with `set` does not.
pub struct ListBuilder<T> {
    pub(crate) vector: Vector<T>,
    owner: Owner,
    mod_count: usize,
}

impl<T> Default for ListBuilder<T> {
    fn default() -> Self {
        ListBuilder {
            vector: Vector::new(),
            owner: Owner::new(),
            mod_count: 0,
        }
    }
}

impl<T> ListBuilder<T> {
    /// Construct a builder over an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_list(list: &PersistentList<T>) -> Self {
        tracing::trace!(size = list.len(), "list builder created");
        ListBuilder {
            vector: list.vector.clone(),
            owner: Owner::new(),
            mod_count: 0,
        }
    }

    /// The number of elements in the builder.
    pub fn len(&self) -> usize {
        self.vector.len()
    }

    /// True if the builder holds no elements.
    pub fn is_empty(&self) -> bool {
        self.vector.len() == 0
    }

    /// The count of structural modifications made through this builder.
    pub fn mod_count(&self) -> usize {
        self.mod_count
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

    /// Assert if an element equal to `x` is in the builder.
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(x).is_some()
    }

    /// Freeze the current content as a list.
    pub fn build(&mut self) -> PersistentList<T> {
        tracing::trace!(size = self.len(), mod_count = self.mod_count, "list built");
        self.owner = Owner::new();
        PersistentList {
            vector: self.vector.clone(),
        }
    }
}

impl<T: Clone> ListBuilder<T> {
    /// Append `x`.
    pub fn push(&mut self, x: T) {
        self.vector.push(x, self.owner);
        self.mod_count += 1;
    }

    /// Insert `x` before position `index`.
    pub fn insert(&mut self, index: usize, x: T) -> Result<(), CollectionError> {
        check_position(index, self.len())?;
        self.vector.insert(index, x, self.owner);
        self.mod_count += 1;
        Ok(())
    }

    /// Insert the elements of `iter` before position `index`, keeping their
    /// order.
    pub fn insert_all<I>(&mut self, index: usize, iter: I) -> Result<(), CollectionError>
    where
        I: IntoIterator<Item = T>,
    {
        check_position(index, self.len())?;
        let values: Vec<T> = iter.into_iter().collect();
        if !values.is_empty() {
            self.vector.insert_all(index, values, self.owner);
            self.mod_count += 1;
        }
        Ok(())
    }

    /// Replace the element at `index`, returning the old one.
    pub fn set(&mut self, index: usize, x: T) -> Result<T, CollectionError> {
        check_index(index, self.len())?;
        Ok(self.vector.set(index, x, self.owner))
    }

    /// Remove and return the element at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<T, CollectionError> {
        check_index(index, self.len())?;
        let removed = self
            .vector
            .remove(index, self.owner)
            .ok_or(CollectionError::IndexOutOfBounds {
                index,
                size: self.len(),
            })?;
        self.mod_count += 1;
        Ok(removed)
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        let x = self.vector.pop(self.owner)?;
        self.mod_count += 1;
        Some(x)
    }

    /// Remove the first element equal to `x`, returning true if there was
    /// one.
    pub fn remove(&mut self, x: &T) -> bool
    where
        T: PartialEq,
    {
        match self.index_of(x) {
            Some(index) => self.remove_at(index).is_ok(),
            None => false,
        }
    }

    /// Remove every element for which `f` returns true, returning how many
    /// were removed.
    pub fn remove_all<F>(&mut self, f: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let removed = self.vector.remove_if(self.owner, f);
        if removed > 0 {
            self.mod_count += 1;
        }
        removed
    }

    /// Shorten the builder to `len` elements.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            self.vector.truncate(len, self.owner);
            self.mod_count += 1;
        }
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.truncate(0)
    }

    /// Start a list iterator positioned before `index`.
    pub fn cursor(&self, index: usize) -> Result<ListCursor<T>, CollectionError> {
        check_position(index, self.len())?;
        Ok(ListCursor::new(index, self.len(), self.mod_count))
    }

    /// A view of the elements in `from..to`. Edits through the view land in
    /// this builder; any other structural edit of the builder invalidates
    /// the view.
    pub fn sub_list(&self, from: usize, to: usize) -> Result<SubList<T>, CollectionError> {
        check_position(to, self.len())?;
        if from > to {
            return Err(CollectionError::IndexOutOfBounds {
                index: from,
                size: to,
            });
        }
        Ok(SubList::new(from, to - from, self.mod_count))
    }
}

impl<T: Clone> Extend<T> for ListBuilder<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for x in iter {
            self.push(x);
        }
    }
}

impl<T: Clone> CollectionBuilder for ListBuilder<T> {
    type Collection = PersistentList<T>;

    fn len(&self) -> usize {
        self.vector.len()
    }

    fn mod_count(&self) -> usize {
        self.mod_count
    }

    fn build(&mut self) -> PersistentList<T> {
        ListBuilder::build(self)
    }
}

impl<T: Debug> Debug for ListBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_builder_basic() {
        let mut b = ListBuilder::new();
        b.extend(0..1000u32);
        assert_eq!(b.mod_count(), 1000);
        assert_eq!(b.set(10, 77), Ok(10));
        assert_eq!(b.mod_count(), 1000);
        b.insert(0, 5000).unwrap();
        assert_eq!(b.remove_at(11), Ok(77));
        assert_eq!(b.pop(), Some(999));
        assert_eq!(b.len(), 999);
        assert_eq!(b.first(), Some(&5000));
        assert!(b.remove(&5000));
        assert!(!b.remove(&5000));
        assert_eq!(b.remove_at(5000).unwrap_err(), CollectionError::IndexOutOfBounds { index: 5000, size: 998 });

        let list = b.build();
        list.verify();
        let mut model: Vec<u32> = (0..999).collect();
        model.remove(10);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), model);
    }

    #[test]
    fn test_list_builder_build_isolation() {
        let mut b: ListBuilder<u32> = (0..2000).collect::<PersistentList<_>>().builder();
        let first = b.build();
        for i in 0..2000 {
            b.set(i, i as u32 + 1).unwrap();
        }
        b.insert(1000, 0).unwrap();
        b.truncate(1500);
        let second = b.build();
        b.clear();
        let third = b.build();

        assert!(first.iter().copied().eq(0..2000));
        assert_eq!(second.len(), 1500);
        assert_eq!(second[1000], 0);
        assert_eq!(second[999], 1000);
        assert!(third.is_empty());
        first.verify();
        second.verify();
        third.verify();
    }

    #[test]
    fn test_list_builder_bulk() {
        let mut b = ListBuilder::new();
        b.extend(0..100u32);
        b.insert_all(40, vec![1, 2, 3]).unwrap();
        assert_eq!(b.len(), 103);
        assert!(b.insert_all(500, vec![1]).is_err());
        assert_eq!(b.remove_all(|x| *x < 10), 13);
        assert_eq!(b.index_of(&10), Some(0));
        assert!(b.contains(&99));
        assert_eq!(b.last(), Some(&99));
        b.build().verify();
    }

    #[test]
    fn test_list_builder_remove_all_calls_once() {
        let list: PersistentList<u32> = (0..1000).collect();

        let mut calls = 0;
        let mut b = list.builder();
        assert_eq!(b.remove_all(|x| {
            calls += 1;
            *x == 5
        }), 1);
        assert_eq!(calls, 1000);

        // The first match decides where the list is cut, and must not be
        // asked about a second time.
        let mut n = 0;
        let mut seen = Vec::new();
        let mut b = list.builder();
        let removed = b.remove_all(|x| {
            n += 1;
            seen.push(*x);
            n % 2 == 0
        });
        assert_eq!(removed, 500);
        assert!(seen.into_iter().eq(0..1000));

        let odd = b.build();
        odd.verify();
        assert!(odd.iter().copied().eq((0..1000).step_by(2)));
        assert_eq!(list.len(), 1000);
    }
}
