//! Bitmap indexed trie nodes.
//!
//! A node holds a 32 bit presence mask and a dense array of slots, one per set
//! bit, ordered by bit position. Each slot is either an entry or a nested
//! node one level deeper. Below the last bitmap level, nodes degrade into
//! collision nodes: an unindexed list of entries that share every hash bit.
//!
//! All mutation happens on nodes the caller already owns (see `owner::edit`).
//! Persistent updates are made by a single-use owner, so only the path that
//! was changed is copied and every other subtree is shared.

use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::owner::{adopt, edit, Owned, Owner};
use crate::utils::slot_index;

/// Hash bits consumed per level.
pub(crate) const BITS: u32 = 5;
/// Highest shift that still indexes a bitmap. Nodes deeper than this are
/// collision nodes.
pub(crate) const MAX_SHIFT: u32 = 30;
/// Bitmap levels plus the collision level.
pub(crate) const MAX_DEPTH: usize = 8;

const MASK: u32 = (1 << BITS) - 1;

#[inline]
pub(crate) fn bit_for(hash: u32, shift: u32) -> u32 {
    1 << ((hash >> shift) & MASK)
}

/// A stored K/V with the hash of K.
#[derive(Clone, Debug)]
pub(crate) struct Datum<K, V> {
    pub(crate) h: u32,
    pub(crate) k: K,
    pub(crate) v: V,
}

impl<K, V> Datum<K, V> {
    pub(crate) fn new(h: u32, k: K, v: V) -> Self {
        Datum { h, k, v }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Slot<K, V> {
    Entry(Datum<K, V>),
    Node(Arc<TrieNode<K, V>>),
}

#[derive(Clone, Debug)]
pub(crate) struct TrieNode<K, V> {
    pub(crate) bitmap: u32,
    pub(crate) slots: Vec<Slot<K, V>>,
    owner: Option<Owner>,
}

impl<K: Clone, V: Clone> Owned for TrieNode<K, V> {
    fn owner(&self) -> Option<Owner> {
        self.owner
    }

    fn set_owner(&mut self, owner: Option<Owner>) {
        self.owner = owner
    }
}

impl<K, V> TrieNode<K, V> {
    pub(crate) fn empty() -> Self {
        TrieNode {
            bitmap: 0,
            slots: Vec::new(),
            owner: None,
        }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The entry this node would collapse to, if it holds nothing else.
    #[inline]
    fn single_entry(&self) -> bool {
        self.slots.len() == 1 && matches!(self.slots[0], Slot::Entry(_))
    }

    /// Find the datum for `k`, descending from a node that sits at `shift`.
    pub(crate) fn get<Q>(&self, h: u32, k: &Q, shift: u32) -> Option<&Datum<K, V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let mut node = self;
        let mut shift = shift;
        loop {
            if shift > MAX_SHIFT {
                return node.slots.iter().find_map(|slot| match slot {
                    Slot::Entry(d) if k.eq(d.k.borrow()) => Some(d),
                    _ => None,
                });
            }

            let bit = bit_for(h, shift);
            if node.bitmap & bit == 0 {
                return None;
            }

            match &node.slots[slot_index(node.bitmap, bit)] {
                Slot::Entry(d) => {
                    return if d.h == h && k.eq(d.k.borrow()) {
                        Some(d)
                    } else {
                        None
                    };
                }
                Slot::Node(child) => {
                    node = child;
                    shift += BITS;
                }
            }
        }
    }

    /// Number of entries reachable from this node.
    pub(crate) fn count(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| match slot {
                Slot::Entry(_) => 1,
                Slot::Node(child) => child.count(),
            })
            .sum()
    }
}

impl<K: Eq + Clone, V: Clone> TrieNode<K, V> {
    /// Build the subtree holding two entries whose hashes agree on every
    /// segment above `shift`.
    fn join(a: Datum<K, V>, b: Datum<K, V>, shift: u32, owner: Owner) -> Self {
        if shift > MAX_SHIFT {
            tracing::trace!(hash = a.h, "collision node created");
            return TrieNode {
                bitmap: 0,
                slots: vec![Slot::Entry(a), Slot::Entry(b)],
                owner: Some(owner),
            };
        }

        let abit = bit_for(a.h, shift);
        let bbit = bit_for(b.h, shift);
        if abit == bbit {
            // Same segment again, so go one level deeper.
            let child = Self::join(a, b, shift + BITS, owner);
            TrieNode {
                bitmap: abit,
                slots: vec![Slot::Node(adopt(child, owner))],
                owner: Some(owner),
            }
        } else {
            let slots = if abit < bbit {
                vec![Slot::Entry(a), Slot::Entry(b)]
            } else {
                vec![Slot::Entry(b), Slot::Entry(a)]
            };
            TrieNode {
                bitmap: abit | bbit,
                slots,
                owner: Some(owner),
            }
        }
    }

    /// Insert or replace `datum`. Returns the replaced value, if any.
    ///
    /// The node must already be owned by `owner`.
    pub(crate) fn put(&mut self, datum: Datum<K, V>, shift: u32, owner: Owner) -> Option<V> {
        debug_assert!(self.owner == Some(owner));

        if shift > MAX_SHIFT {
            for slot in self.slots.iter_mut() {
                if let Slot::Entry(d) = slot {
                    if d.k == datum.k {
                        return Some(std::mem::replace(&mut d.v, datum.v));
                    }
                }
            }
            self.slots.push(Slot::Entry(datum));
            return None;
        }

        let bit = bit_for(datum.h, shift);
        let idx = slot_index(self.bitmap, bit);

        if self.bitmap & bit == 0 {
            self.bitmap |= bit;
            self.slots.insert(idx, Slot::Entry(datum));
            return None;
        }

        let diverges = match &self.slots[idx] {
            Slot::Entry(d) => d.h != datum.h || d.k != datum.k,
            Slot::Node(_) => false,
        };

        if diverges {
            // Two keys share this segment. Push both down.
            let existing = match self.slots.remove(idx) {
                Slot::Entry(d) => d,
                Slot::Node(_) => unreachable!(),
            };
            let child = Self::join(existing, datum, shift + BITS, owner);
            self.slots.insert(idx, Slot::Node(adopt(child, owner)));
            return None;
        }

        match &mut self.slots[idx] {
            Slot::Node(child) => edit(child, owner).put(datum, shift + BITS, owner),
            Slot::Entry(d) => Some(std::mem::replace(&mut d.v, datum.v)),
        }
    }

    /// Mutable access to the datum for `k`, taking ownership of every node on
    /// the way down.
    pub(crate) fn get_mut<Q>(&mut self, h: u32, k: &Q, shift: u32, owner: Owner) -> Option<&mut Datum<K, V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        debug_assert!(self.owner == Some(owner));

        if shift > MAX_SHIFT {
            return self.slots.iter_mut().find_map(|slot| match slot {
                Slot::Entry(d) if k.eq(d.k.borrow()) => Some(d),
                _ => None,
            });
        }

        let bit = bit_for(h, shift);
        if self.bitmap & bit == 0 {
            return None;
        }
        match &mut self.slots[slot_index(self.bitmap, bit)] {
            Slot::Entry(d) if d.h == h && k.eq(d.k.borrow()) => Some(d),
            Slot::Entry(_) => None,
            Slot::Node(child) => edit(child, owner).get_mut(h, k, shift + BITS, owner),
        }
    }

    /// Remove the entry for `k`, returning it.
    ///
    /// Child nodes left with a single entry are elided into this node, so
    /// chains of singleton branches never accumulate. The node itself is never
    /// elided here; that is the job of its parent (or not at all for a root).
    pub(crate) fn remove<Q>(&mut self, h: u32, k: &Q, shift: u32, owner: Owner) -> Option<Datum<K, V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        debug_assert!(self.owner == Some(owner));

        if shift > MAX_SHIFT {
            let pos = self.slots.iter().position(|slot| match slot {
                Slot::Entry(d) => k.eq(d.k.borrow()),
                Slot::Node(_) => false,
            })?;
            return match self.slots.remove(pos) {
                Slot::Entry(d) => Some(d),
                Slot::Node(_) => unreachable!(),
            };
        }

        let bit = bit_for(h, shift);
        if self.bitmap & bit == 0 {
            return None;
        }
        let idx = slot_index(self.bitmap, bit);

        if let Slot::Entry(d) = &self.slots[idx] {
            if d.h != h || !k.eq(d.k.borrow()) {
                return None;
            }
            self.bitmap ^= bit;
            return match self.slots.remove(idx) {
                Slot::Entry(d) => Some(d),
                Slot::Node(_) => unreachable!(),
            };
        }

        let (removed, promoted) = match &mut self.slots[idx] {
            Slot::Entry(_) => unreachable!(),
            Slot::Node(child) => {
                let child = edit(child, owner);
                let removed = child.remove(h, k, shift + BITS, owner)?;
                if child.single_entry() {
                    (removed, child.slots.pop())
                } else if child.is_empty() {
                    self.bitmap ^= bit;
                    self.slots.remove(idx);
                    return Some(removed);
                } else {
                    return Some(removed);
                }
            }
        };

        // Node elision: the child collapsed to a single entry.
        if let Some(promoted) = promoted {
            self.slots[idx] = promoted;
        }
        Some(removed)
    }
}

impl<K: Hash + Eq + Debug, V> TrieNode<K, V> {
    /// Check the structural invariants of the subtree and return the number
    /// of entries in it.
    #[allow(unused)]
    pub(crate) fn verify(&self, shift: u32, is_root: bool) -> usize {
        if shift > MAX_SHIFT {
            assert_eq!(self.bitmap, 0);
            assert!(self.slots.len() >= 2, "collision node below two entries");
            let h = match &self.slots[0] {
                Slot::Entry(d) => d.h,
                Slot::Node(_) => panic!("node inside a collision node"),
            };
            for slot in self.slots.iter() {
                match slot {
                    Slot::Entry(d) => {
                        assert_eq!(d.h, h);
                        assert_eq!(crate::utils::hash_key(&d.k), d.h);
                    }
                    Slot::Node(_) => panic!("node inside a collision node"),
                }
            }
            return self.slots.len();
        }

        assert_eq!(self.bitmap.count_ones() as usize, self.slots.len());
        if !is_root {
            assert!(!self.is_empty(), "empty inner node");
            assert!(!self.single_entry(), "inner node with a single entry");
        }

        let mut bits = self.bitmap;
        let mut total = 0;
        for slot in self.slots.iter() {
            let bit = bits & bits.wrapping_neg();
            bits ^= bit;
            match slot {
                Slot::Entry(d) => {
                    assert_eq!(crate::utils::hash_key(&d.k), d.h);
                    assert_eq!(bit_for(d.h, shift), bit, "entry in the wrong slot {:?}", d.k);
                    total += 1;
                }
                Slot::Node(child) => {
                    total += child.verify(shift + BITS, false);
                }
            }
        }
        total
    }
}
