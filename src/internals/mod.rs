//! This module contains the node level machinery that the persistent collections
//! are built from. You probably want `map`, `set`, `list` or `ordered` instead.
//!
//! The nodes here carry an ownership token. A node may only be mutated in place
//! by the builder whose token it holds; every other edit must copy it first. Get
//! that wrong and a frozen collection will change underneath its readers.

pub mod trie;
pub mod vector;
