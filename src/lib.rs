//! Persistrie - Persistent collections with structural sharing
//!
//! Every collection in this crate is immutable. An "update" returns a new
//! collection and leaves the original untouched, while sharing all the
//! unchanged structure between the two. Holding on to old versions is cheap,
//! and handing one to another thread needs no locking at all.
//!
//! The collections are:
//!
//! * `PersistentHashMap` and `PersistentHashSet` - a hash array mapped trie
//! * `PersistentOrderedMap` and `PersistentOrderedSet` - the same trie, with
//!   entries linked in insertion order
//! * `PersistentList` - a 32-way vector trie with a tail buffer
//!
//! When you need to apply many updates in a row, ask the collection for a
//! builder. A builder mutates the nodes it has already copied in place, then
//! freezes its content with `build`. The frozen collection is never affected by
//! later edits to the builder.
//!
//! Builders can be walked with cursors that may remove (or for lists, insert
//! and replace) elements as they go. A cursor detects when the builder was
//! modified behind its back and reports a `ConcurrentModification` error
//! instead of returning stale data.
//!
//! # Features
//!
//! * `foldhash` - hash keys with foldhash (default)
//! * `ahash` - hash keys with the cpu accelerated ahash crate
//!
//! With neither enabled the standard library hasher is used. In every case the
//! hasher is fixed, so iteration order is reproducible from run to run.

#![warn(unused_extern_crates)]
#![warn(missing_docs)]
#![allow(clippy::needless_lifetimes)]
#![allow(clippy::new_without_default)]

pub mod error;
pub mod traits;
pub mod variant;

// The node level machinery.
pub mod internals;
mod owner;
mod utils;

pub mod list;
pub mod map;
pub mod ordered;
pub mod set;

pub use error::CollectionError;
pub use list::{ListBuilder, PersistentList};
pub use map::{HashMapBuilder, PersistentHashMap};
pub use ordered::{OrderedMapBuilder, OrderedSetBuilder, PersistentOrderedMap, PersistentOrderedSet};
pub use set::{HashSetBuilder, PersistentHashSet};
pub use traits::{CollectionBuilder, PersistentCollection};
pub use variant::{AnyMap, AnySet, MapKind, SetKind};
