//! The cursor is the mutable iterator over a hash trie builder.
//!
//! It does not borrow the builder between calls. Instead it remembers its
//! position as the slot index taken at each level on the way to the next
//! entry, and re-walks that path from whatever root the builder holds when it
//! is asked to move. This costs O(depth) per step and lets the builder be
//! mutated between steps, which is exactly what the cursor has to police:
//! each step compares the builder's modification count against the one it
//! last saw, and refuses to continue if someone else changed the structure.
//!
//! After removing through the cursor, the path is recomputed from the root
//! using the hash of the next entry, as removal can shift bitmap indexes
//! anywhere along the path.

use smallvec::SmallVec;
use std::marker::PhantomData;

use super::node::{bit_for, Datum, Slot, TrieNode, BITS, MAX_DEPTH, MAX_SHIFT};
use crate::error::{check_mod_count, CollectionError};
use crate::utils::slot_index;

type Path = SmallVec<[usize; MAX_DEPTH]>;

#[derive(Debug)]
pub(crate) struct TrieCursor<K, V> {
    // Slot indexes leading to the next entry. Empty once exhausted.
    path: Path,
    expected: usize,
    last: Option<(u32, K)>,
    v: PhantomData<fn() -> V>,
}

impl<K: Clone + Eq, V> TrieCursor<K, V> {
    pub(crate) fn new(root: &TrieNode<K, V>, mod_count: usize) -> Self {
        let mut path = Path::new();
        if let Some(first) = root.slots.first() {
            path.push(0);
            Self::descend_leftmost(first, &mut path);
        }
        TrieCursor {
            path,
            expected: mod_count,
            last: None,
            v: PhantomData,
        }
    }

    fn descend_leftmost(mut slot: &Slot<K, V>, path: &mut Path) {
        while let Slot::Node(child) = slot {
            path.push(0);
            slot = &child.slots[0];
        }
    }

    fn resolve<'b>(root: &'b TrieNode<K, V>, path: &Path) -> Option<&'b Datum<K, V>> {
        let mut node = root;
        for &i in path.iter() {
            match node.slots.get(i)? {
                Slot::Entry(d) => return Some(d),
                Slot::Node(child) => node = child,
            }
        }
        None
    }

    /// Move the path to the entry following the one it points at.
    fn advance(root: &TrieNode<K, V>, path: &mut Path) {
        let mut nodes: SmallVec<[&TrieNode<K, V>; MAX_DEPTH]> = SmallVec::new();
        let mut node = root;
        nodes.push(node);
        for &i in path.iter().take(path.len().saturating_sub(1)) {
            match &node.slots[i] {
                Slot::Node(child) => {
                    node = child;
                    nodes.push(node);
                }
                Slot::Entry(_) => break,
            }
        }
        debug_assert_eq!(nodes.len(), path.len());

        while let (Some(last), Some(node)) = (path.pop(), nodes.pop()) {
            let next = last + 1;
            if let Some(slot) = node.slots.get(next) {
                path.push(next);
                Self::descend_leftmost(slot, path);
                return;
            }
        }
    }

    /// Point the path at the entry for `k`.
    fn reset(&mut self, root: &TrieNode<K, V>, h: u32, k: &K) {
        self.path.clear();
        let mut node = root;
        let mut shift = 0;
        loop {
            if shift > MAX_SHIFT {
                let found = node.slots.iter().position(|slot| match slot {
                    Slot::Entry(d) => d.k == *k,
                    Slot::Node(_) => false,
                });
                debug_assert!(found.is_some());
                if let Some(i) = found {
                    self.path.push(i);
                }
                return;
            }

            let i = slot_index(node.bitmap, bit_for(h, shift));
            self.path.push(i);
            match node.slots.get(i) {
                Some(Slot::Node(child)) => {
                    node = child;
                    shift += BITS;
                }
                Some(Slot::Entry(d)) => {
                    debug_assert!(d.k == *k);
                    return;
                }
                None => {
                    debug_assert!(false, "cursor reset to an absent key");
                    self.path.clear();
                    return;
                }
            }
        }
    }

    pub(crate) fn has_next(&self) -> bool {
        !self.path.is_empty()
    }

    pub(crate) fn next<'b>(
        &mut self,
        root: &'b TrieNode<K, V>,
        mod_count: usize,
    ) -> Result<&'b Datum<K, V>, CollectionError> {
        check_mod_count(self.expected, mod_count)?;
        let d = Self::resolve(root, &self.path).ok_or(CollectionError::NoSuchElement)?;
        self.last = Some((d.h, d.k.clone()));
        Self::advance(root, &mut self.path);
        Ok(d)
    }

    /// The hash and key of the entry most recently returned by `next`.
    pub(crate) fn last(&self, mod_count: usize) -> Result<&(u32, K), CollectionError> {
        check_mod_count(self.expected, mod_count)?;
        self.last.as_ref().ok_or(CollectionError::IllegalState)
    }

    /// Take the last returned key so the caller can remove it. The second
    /// half of the result is the entry the cursor must land on afterwards.
    pub(crate) fn begin_remove(
        &mut self,
        root: &TrieNode<K, V>,
        mod_count: usize,
    ) -> Result<(K, Option<(u32, K)>), CollectionError> {
        check_mod_count(self.expected, mod_count)?;
        let (_, k) = self.last.take().ok_or(CollectionError::IllegalState)?;
        let next = Self::resolve(root, &self.path).map(|d| (d.h, d.k.clone()));
        Ok((k, next))
    }

    pub(crate) fn finish_remove(
        &mut self,
        root: &TrieNode<K, V>,
        next: Option<(u32, K)>,
        mod_count: usize,
    ) {
        match next {
            Some((h, k)) => self.reset(root, h, &k),
            None => self.path.clear(),
        }
        self.expected = mod_count;
    }
}
