//! The 32 way vector trie behind the list.

pub mod iter;
pub(crate) mod node;
