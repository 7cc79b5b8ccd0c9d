//! Iterators for the hash trie

use smallvec::SmallVec;
use std::sync::Arc;

use super::node::{Slot, TrieNode, MAX_DEPTH};

/// Iterator over references to Key Value pairs stored in the map.
///
/// The walk is depth first over the slots of each node, left to right, with
/// an explicit stack holding one frame per trie level.
pub struct Iter<'a, K, V> {
    length: usize,
    stack: SmallVec<[(&'a [Slot<K, V>], usize); MAX_DEPTH]>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(root: &'a TrieNode<K, V>, length: usize) -> Self {
        let mut stack = SmallVec::new();
        stack.push((root.slots.as_slice(), 0));
        Iter { length, stack }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            length: self.length,
            stack: self.stack.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    /// Yield the next key value reference, or `None` if exhausted.
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (slots, idx) = self.stack.last_mut()?;
            let slots: &'a [Slot<K, V>] = *slots;
            let i = *idx;
            *idx += 1;

            match slots.get(i) {
                None => {
                    self.stack.pop();
                }
                Some(Slot::Entry(d)) => {
                    self.length -= 1;
                    return Some((&d.k, &d.v));
                }
                Some(Slot::Node(child)) => {
                    self.stack.push((child.slots.as_slice(), 0));
                }
            }
        }
    }

    /// Provide a hint as to the number of items this iterator will yield.
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.length, Some(self.length))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over references to Keys stored in the map.
pub struct KeyIter<'a, K, V> {
    iter: Iter<'a, K, V>,
}

impl<'a, K, V> KeyIter<'a, K, V> {
    pub(crate) fn new(root: &'a TrieNode<K, V>, length: usize) -> Self {
        KeyIter {
            iter: Iter::new(root, length),
        }
    }
}

impl<'a, K, V> Iterator for KeyIter<'a, K, V> {
    type Item = &'a K;

    /// Yield the next key reference, or `None` if exhausted.
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V> ExactSizeIterator for KeyIter<'_, K, V> {}

/// Iterator over references to Values stored in the map.
pub struct ValueIter<'a, K, V> {
    iter: Iter<'a, K, V>,
}

impl<'a, K, V> ValueIter<'a, K, V> {
    pub(crate) fn new(root: &'a TrieNode<K, V>, length: usize) -> Self {
        ValueIter {
            iter: Iter::new(root, length),
        }
    }
}

impl<'a, K, V> Iterator for ValueIter<'a, K, V> {
    type Item = &'a V;

    /// Yield the next value reference, or `None` if exhausted.
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValueIter<'_, K, V> {}

/// Owning iterator over cloned Key Value pairs. Nodes stay shared with any
/// other collection that holds them; only the entries are cloned out.
pub struct IntoIter<K, V> {
    length: usize,
    stack: SmallVec<[(Arc<TrieNode<K, V>>, usize); MAX_DEPTH]>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(root: Arc<TrieNode<K, V>>, length: usize) -> Self {
        let mut stack = SmallVec::new();
        stack.push((root, 0));
        IntoIter { length, stack }
    }
}

impl<K: Clone, V: Clone> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, idx) = self.stack.last_mut()?;
            let i = *idx;
            *idx += 1;

            let next = match node.slots.get(i) {
                None => None,
                Some(Slot::Entry(d)) => {
                    self.length -= 1;
                    return Some((d.k.clone(), d.v.clone()));
                }
                Some(Slot::Node(child)) => Some(child.clone()),
            };

            match next {
                Some(child) => self.stack.push((child, 0)),
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.length, Some(self.length))
    }
}

impl<K: Clone, V: Clone> ExactSizeIterator for IntoIter<K, V> {}
