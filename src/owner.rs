//! The ownership protocol shared by every builder.
//!
//! Each node of a trie may carry the token of the builder that created it.
//! A builder edits a node in place only when the node carries that builder's
//! current token. Any other node is shallow copied, stamped with the token and
//! spliced into the parent that is already being edited, so ownership spreads
//! from the root downward one path at a time.
//!
//! `build()` rotates the builder's token. Nodes stamped with the old token are
//! now shared with the built collection, and the next edit through the same
//! builder copies them again.
//!
//! Tokens are compared by identity. They come from a process wide counter and
//! are never reused, so a token can never be confused with a dead builder's.
//! Node access also goes through `Arc::make_mut`, which only hands out a
//! mutable reference when no other handle can observe the node.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// The identity of a builder, valid until its next `build()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Owner(u64);

impl Owner {
    pub(crate) fn new() -> Self {
        Owner(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A node that records which builder may mutate it in place.
pub(crate) trait Owned: Clone {
    fn owner(&self) -> Option<Owner>;

    fn set_owner(&mut self, owner: Option<Owner>);

    #[inline]
    fn is_owned_by(&self, owner: Owner) -> bool {
        self.owner() == Some(owner)
    }
}

/// Grant mutable access to the node behind `slot` on behalf of `owner`,
/// copying it first if it belongs to anyone else.
#[inline]
pub(crate) fn edit<N: Owned>(slot: &mut Arc<N>, owner: Owner) -> &mut N {
    if !slot.is_owned_by(owner) {
        let mut copy = N::clone(slot);
        copy.set_owner(Some(owner));
        *slot = Arc::new(copy);
    }
    Arc::make_mut(slot)
}

/// Wrap a freshly built node so that `owner` may keep editing it.
#[inline]
pub(crate) fn adopt<N: Owned>(mut node: N, owner: Owner) -> Arc<N> {
    node.set_owner(Some(owner));
    Arc::new(node)
}
