//! Positional iteration over the vector trie.

use super::node::Vector;

/// Iterator over references to the elements of a list, front to back.
///
/// The leaf holding the current position is cached, so the trie is only
/// descended once per 32 elements.
pub struct Iter<'a, T> {
    vector: &'a Vector<T>,
    index: usize,
    end: usize,
    leaf: &'a [T],
    leaf_start: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(vector: &'a Vector<T>, from: usize, to: usize) -> Self {
        debug_assert!(from <= to && to <= vector.len());
        Iter {
            vector,
            index: from,
            end: to,
            leaf: &[],
            leaf_start: from,
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            vector: self.vector,
            index: self.index,
            end: self.end,
            leaf: self.leaf,
            leaf_start: self.leaf_start,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        let offset = self.index.wrapping_sub(self.leaf_start);
        if self.index < self.leaf_start || offset >= self.leaf.len() {
            let (leaf, start) = self.vector.leaf_for(self.index);
            self.leaf = leaf;
            self.leaf_start = start;
        }
        let item = self.leaf.get(self.index - self.leaf_start);
        self.index += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.index;
        (n, Some(n))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        self.end -= 1;
        self.vector.get(self.end)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Owning iterator over cloned elements. The trie stays shared with the list
/// it came from.
pub struct IntoIter<T> {
    vector: Vector<T>,
    index: usize,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(vector: Vector<T>) -> Self {
        IntoIter { vector, index: 0 }
    }
}

impl<T: Clone> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.vector.get(self.index).cloned();
        if item.is_some() {
            self.index += 1;
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.vector.len() - self.index;
        (n, Some(n))
    }
}

impl<T: Clone> ExactSizeIterator for IntoIter<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::owner::Owner;

    #[test]
    fn test_vector_iter_ranges() {
        let mut v = Vector::new();
        v.extend(0..1500usize, Owner::new());

        assert_eq!(Iter::new(&v, 0, 0).count(), 0);
        let all: Vec<usize> = Iter::new(&v, 0, 1500).copied().collect();
        assert_eq!(all, (0..1500).collect::<Vec<_>>());

        let mid: Vec<usize> = Iter::new(&v, 30, 1490).copied().collect();
        assert_eq!(mid, (30..1490).collect::<Vec<_>>());

        let back: Vec<usize> = Iter::new(&v, 0, 100).rev().copied().collect();
        assert_eq!(back, (0..100).rev().collect::<Vec<_>>());

        let iter = Iter::new(&v, 10, 20);
        assert_eq!(iter.len(), 10);

        let owned: Vec<usize> = IntoIter::new(v.clone()).collect();
        assert_eq!(owned.len(), 1500);
    }

    #[test]
    fn test_vector_iter_both_ends() {
        let mut v = Vector::new();
        v.extend(0..5usize, Owner::new());
        let mut iter = Iter::new(&v, 0, 5);
        assert_eq!(iter.next(), Some(&0));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&3));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }
}
