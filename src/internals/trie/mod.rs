//! The hash array mapped trie behind the hash and ordered maps and sets.

pub(crate) mod cursor;
pub mod iter;
pub(crate) mod node;
