//! The positional trie behind the list.
//!
//! Elements live in leaves of exactly 32, except for the last 1 to 32 which
//! live in a separate tail leaf so appends rarely touch the tree at all.
//! Branches are packed to the left: every branch except those on the
//! rightmost path is full. `shift` is the number of index bits consumed above
//! the leaves, and is kept minimal, so a tree of 32 or fewer elements is a
//! single leaf with `shift == 0`.

use std::mem;
use std::sync::Arc;

use crate::owner::{adopt, edit, Owned, Owner};

pub(crate) const BITS: u32 = 5;
pub(crate) const WIDTH: usize = 1 << BITS;
const MASK: usize = WIDTH - 1;

#[derive(Clone, Debug)]
pub(crate) enum Body<T> {
    Leaf(Vec<T>),
    Branch(Vec<Arc<VNode<T>>>),
}

#[derive(Clone, Debug)]
pub(crate) struct VNode<T> {
    pub(crate) body: Body<T>,
    owner: Option<Owner>,
}

impl<T: Clone> Owned for VNode<T> {
    fn owner(&self) -> Option<Owner> {
        self.owner
    }

    fn set_owner(&mut self, owner: Option<Owner>) {
        self.owner = owner
    }
}

impl<T> VNode<T> {
    fn leaf(items: Vec<T>) -> Self {
        VNode {
            body: Body::Leaf(items),
            owner: None,
        }
    }

    fn branch(children: Vec<Arc<VNode<T>>>) -> Self {
        VNode {
            body: Body::Branch(children),
            owner: None,
        }
    }

    pub(crate) fn elements(&self) -> &[T] {
        match &self.body {
            Body::Leaf(items) => items,
            Body::Branch(_) => &[],
        }
    }

    fn children(&self) -> &[Arc<VNode<T>>] {
        match &self.body {
            Body::Leaf(_) => &[],
            Body::Branch(children) => children,
        }
    }

    fn elements_mut(&mut self) -> &mut Vec<T> {
        match &mut self.body {
            Body::Leaf(items) => items,
            Body::Branch(_) => unreachable!("element access on a branch"),
        }
    }

    fn children_mut(&mut self) -> &mut Vec<Arc<VNode<T>>> {
        match &mut self.body {
            Body::Leaf(_) => unreachable!("child access on a leaf"),
            Body::Branch(children) => children,
        }
    }
}

/// Root, tail and shape of one list. Cloning shares every node.
#[derive(Debug)]
pub(crate) struct Vector<T> {
    root: Arc<VNode<T>>,
    tail: Arc<VNode<T>>,
    size: usize,
    shift: u32,
}

impl<T> Clone for Vector<T> {
    fn clone(&self) -> Self {
        Vector {
            root: self.root.clone(),
            tail: self.tail.clone(),
            size: self.size,
            shift: self.shift,
        }
    }
}

impl<T> Vector<T> {
    pub(crate) fn new() -> Self {
        Vector {
            root: Arc::new(VNode::leaf(Vec::new())),
            tail: Arc::new(VNode::leaf(Vec::new())),
            size: 0,
            shift: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.size
    }

    /// Number of elements held in the tree, excluding the tail.
    #[inline]
    fn tree_len(&self) -> usize {
        if self.size == 0 {
            0
        } else {
            (self.size - 1) & !MASK
        }
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        self.size == other.size
            && Arc::ptr_eq(&self.root, &other.root)
            && Arc::ptr_eq(&self.tail, &other.tail)
    }

    fn tree_leaf(&self, index: usize) -> &Arc<VNode<T>> {
        let mut node = &self.root;
        let mut shift = self.shift;
        while shift > 0 {
            node = &node.children()[(index >> shift) & MASK];
            shift -= BITS;
        }
        node
    }

    /// The leaf holding `index` and the index of its first element.
    ///
    /// `index` must be below `len()`.
    pub(crate) fn leaf_for(&self, index: usize) -> (&[T], usize) {
        debug_assert!(index < self.size);
        let tree_len = self.tree_len();
        if index >= tree_len {
            (self.tail.elements(), tree_len)
        } else {
            (self.tree_leaf(index).elements(), index & !MASK)
        }
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        if index >= self.size {
            return None;
        }
        let (leaf, start) = self.leaf_for(index);
        leaf.get(index - start)
    }

    /// Clone out the elements in `from..to`, a leaf at a time.
    pub(crate) fn copy_range(&self, from: usize, to: usize) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = Vec::with_capacity(to.saturating_sub(from));
        let mut i = from;
        while i < to {
            let (leaf, start) = self.leaf_for(i);
            let end = (to - start).min(leaf.len());
            out.extend_from_slice(&leaf[i - start..end]);
            i = start + end;
        }
        out
    }
}

impl<T: Clone> Vector<T> {
    /// Replace the element at `index`, which must be below `len()`.
    pub(crate) fn set(&mut self, index: usize, value: T, owner: Owner) -> T {
        debug_assert!(index < self.size);
        let tree_len = self.tree_len();
        if index >= tree_len {
            let items = edit(&mut self.tail, owner).elements_mut();
            return mem::replace(&mut items[index - tree_len], value);
        }

        let mut node = edit(&mut self.root, owner);
        let mut shift = self.shift;
        while shift > 0 {
            node = edit(&mut node.children_mut()[(index >> shift) & MASK], owner);
            shift -= BITS;
        }
        mem::replace(&mut node.elements_mut()[index & MASK], value)
    }

    pub(crate) fn push(&mut self, value: T, owner: Owner) {
        if self.tail.elements().len() < WIDTH {
            edit(&mut self.tail, owner).elements_mut().push(value);
        } else {
            let mut items = Vec::with_capacity(WIDTH);
            items.push(value);
            let full = mem::replace(&mut self.tail, adopt(VNode::leaf(items), owner));
            self.push_leaf(full, owner);
        }
        self.size += 1;
    }

    /// Append a leaf at a time: the tail is filled in place, and only a full
    /// tail walks down the tree.
    pub(crate) fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I, owner: Owner) {
        let mut iter = iter.into_iter().peekable();
        while iter.peek().is_some() {
            if self.tail.elements().len() == WIDTH {
                let empty = adopt(VNode::leaf(Vec::with_capacity(WIDTH)), owner);
                let full = mem::replace(&mut self.tail, empty);
                self.push_leaf(full, owner);
            }
            let items = edit(&mut self.tail, owner).elements_mut();
            let before = items.len();
            items.extend(iter.by_ref().take(WIDTH - before));
            let added = items.len() - before;
            self.size += added;
        }
    }

    // Called with the old size, while the full tail is not yet counted out.
    fn push_leaf(&mut self, leaf: Arc<VNode<T>>, owner: Owner) {
        let tree_len = self.tree_len();
        if tree_len == 0 {
            self.root = leaf;
            self.shift = 0;
        } else if tree_len == 1 << (self.shift + BITS) {
            let old = self.root.clone();
            let path = Self::new_path(self.shift, leaf, owner);
            self.root = adopt(VNode::branch(vec![old, path]), owner);
            self.shift += BITS;
            tracing::trace!(shift = self.shift, "vector trie root grown");
        } else {
            Self::push_into(edit(&mut self.root, owner), self.shift, tree_len, leaf, owner);
        }
    }

    fn new_path(shift: u32, leaf: Arc<VNode<T>>, owner: Owner) -> Arc<VNode<T>> {
        if shift == 0 {
            leaf
        } else {
            let child = Self::new_path(shift - BITS, leaf, owner);
            adopt(VNode::branch(vec![child]), owner)
        }
    }

    fn push_into(node: &mut VNode<T>, shift: u32, index: usize, leaf: Arc<VNode<T>>, owner: Owner) {
        let sub = (index >> shift) & MASK;
        let children = node.children_mut();
        if shift == BITS {
            debug_assert_eq!(sub, children.len());
            children.push(leaf);
        } else if sub < children.len() {
            Self::push_into(edit(&mut children[sub], owner), shift - BITS, index, leaf, owner);
        } else {
            children.push(Self::new_path(shift - BITS, leaf, owner));
        }
    }

    pub(crate) fn pop(&mut self, owner: Owner) -> Option<T> {
        if self.size == 0 {
            return None;
        }
        let value = edit(&mut self.tail, owner).elements_mut().pop();
        self.size -= 1;
        if self.size > 0 && self.tail.elements().is_empty() {
            if let Some(leaf) = self.pop_leaf(owner) {
                self.tail = leaf;
            }
        }
        value
    }

    /// Detach the last leaf of the tree, shrinking the root if it is left
    /// with a single child.
    fn pop_leaf(&mut self, owner: Owner) -> Option<Arc<VNode<T>>> {
        if self.shift == 0 {
            return Some(mem::replace(&mut self.root, Arc::new(VNode::leaf(Vec::new()))));
        }
        let leaf = Self::pop_from(edit(&mut self.root, owner), self.shift, owner);
        self.shrink_root();
        leaf
    }

    fn pop_from(node: &mut VNode<T>, shift: u32, owner: Owner) -> Option<Arc<VNode<T>>> {
        let children = node.children_mut();
        if shift == BITS {
            return children.pop();
        }
        let child = edit(children.last_mut()?, owner);
        let leaf = Self::pop_from(child, shift - BITS, owner);
        if child.children().is_empty() {
            children.pop();
        }
        leaf
    }

    fn shrink_root(&mut self) {
        while self.shift > 0 && self.root.children().len() == 1 {
            let child = self.root.children()[0].clone();
            self.root = child;
            self.shift -= BITS;
            tracing::trace!(shift = self.shift, "vector trie root shrunk");
        }
    }

    /// Shorten to `len` elements. The kept prefix of the tree stays shared
    /// with any other holder of it.
    pub(crate) fn truncate(&mut self, len: usize, owner: Owner) {
        if len >= self.size {
            return;
        }
        if len == 0 {
            *self = Vector::new();
            return;
        }

        let tree_len = self.tree_len();
        let new_tree_len = (len - 1) & !MASK;
        if new_tree_len == tree_len {
            edit(&mut self.tail, owner)
                .elements_mut()
                .truncate(len - tree_len);
            self.size = len;
            return;
        }

        // The leaf starting at the new tree length becomes the tail.
        let mut tail = self.tree_leaf(new_tree_len).clone();
        edit(&mut tail, owner)
            .elements_mut()
            .truncate(len - new_tree_len);
        self.tail = tail;

        if new_tree_len == 0 {
            self.root = Arc::new(VNode::leaf(Vec::new()));
            self.shift = 0;
        } else {
            Self::trim(edit(&mut self.root, owner), self.shift, new_tree_len, owner);
            self.shrink_root();
        }
        self.size = len;
    }

    // Keep the first `keep_len` elements below `node`, a positive multiple
    // of the leaf width.
    fn trim(node: &mut VNode<T>, shift: u32, keep_len: usize, owner: Owner) {
        let keep = ((keep_len - 1) >> shift) + 1;
        let children = node.children_mut();
        children.truncate(keep);
        if shift > BITS {
            let rest = keep_len - ((keep - 1) << shift);
            if let Some(last) = children.last_mut() {
                Self::trim(edit(last, owner), shift - BITS, rest, owner);
            }
        }
    }

    /// Cut at the first element of the leaf holding `index` and hand back
    /// everything from there on. Only the rightmost path of the remaining
    /// tree is copied.
    fn split_at_leaf(&mut self, index: usize, owner: Owner) -> (usize, Vec<T>) {
        let start = index & !MASK;
        let right = self.copy_range(start, self.size);
        self.truncate(start, owner);
        tracing::trace!(index, start, moved = right.len(), "vector trie split");
        (start, right)
    }

    /// Insert at `index`, which must be at most `len()`.
    pub(crate) fn insert(&mut self, index: usize, value: T, owner: Owner) {
        debug_assert!(index <= self.size);
        if index == self.size {
            self.push(value, owner);
            return;
        }
        let (start, mut right) = self.split_at_leaf(index, owner);
        right.insert(index - start, value);
        self.extend(right, owner);
    }

    pub(crate) fn insert_all(&mut self, index: usize, values: Vec<T>, owner: Owner) {
        debug_assert!(index <= self.size);
        if index == self.size {
            self.extend(values, owner);
            return;
        }
        let (start, right) = self.split_at_leaf(index, owner);
        let at = index - start;
        let mut right = right.into_iter();
        self.extend(right.by_ref().take(at), owner);
        self.extend(values, owner);
        self.extend(right, owner);
    }

    /// Remove the element at `index`, which must be below `len()`.
    pub(crate) fn remove(&mut self, index: usize, owner: Owner) -> Option<T> {
        debug_assert!(index < self.size);
        if index + 1 == self.size {
            return self.pop(owner);
        }
        let (start, mut right) = self.split_at_leaf(index, owner);
        let removed = right.remove(index - start);
        self.extend(right, owner);
        Some(removed)
    }

    /// Drop every element matching `f`, returning how many were dropped.
    /// Elements before the first match are left untouched.
    pub(crate) fn remove_if<F>(&mut self, owner: Owner, mut f: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let first = (0..self.size).find(|&i| self.get(i).map_or(false, &mut f));
        let first = match first {
            Some(first) => first,
            None => return 0,
        };
        // The first match is already known; `f` is not asked about it again.
        let rest = self.copy_range(first + 1, self.size);
        let before = self.size;
        self.truncate(first, owner);
        self.extend(rest.into_iter().filter(|v| !f(v)), owner);
        before - self.size
    }
}

impl<T> Vector<T> {
    /// Check the shape invariants, panicking on the first violation.
    #[allow(unused)]
    pub(crate) fn verify(&self) {
        let tree_len = self.tree_len();
        assert_eq!(tree_len % WIDTH, 0);
        assert_eq!(self.tail.elements().len(), self.size - tree_len);
        if self.size > 0 {
            assert!(!self.tail.elements().is_empty(), "empty tail");
        }

        if tree_len == 0 {
            assert_eq!(self.shift, 0);
            assert!(self.root.elements().is_empty());
            assert!(self.root.children().is_empty());
            return;
        }
        assert!(tree_len <= 1 << (self.shift + BITS), "root too short");
        if self.shift > 0 {
            assert!(tree_len > 1 << self.shift, "root shift not minimal");
        }
        assert_eq!(Self::verify_node(&self.root, self.shift), tree_len);
    }

    fn verify_node(node: &VNode<T>, shift: u32) -> usize {
        match &node.body {
            Body::Leaf(items) => {
                assert_eq!(shift, 0, "leaf above the bottom level");
                assert_eq!(items.len(), WIDTH, "partial leaf in the tree");
                WIDTH
            }
            Body::Branch(children) => {
                assert!(shift > 0, "branch at the bottom level");
                assert!(!children.is_empty() && children.len() <= WIDTH);
                let last = children.len() - 1;
                children
                    .iter()
                    .enumerate()
                    .map(|(i, child)| {
                        let n = Self::verify_node(child, shift - BITS);
                        if i < last {
                            assert_eq!(n, 1 << shift, "branch not packed to the left");
                        }
                        n
                    })
                    .sum()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(n: usize) -> Vector<usize> {
        let owner = Owner::new();
        let mut v = Vector::new();
        v.extend(0..n, owner);
        v
    }

    fn contents(v: &Vector<usize>) -> Vec<usize> {
        v.copy_range(0, v.len())
    }

    #[test]
    fn test_vector_push_get() {
        for n in [0, 1, 31, 32, 33, 64, 65, 1024, 1056, 1057, 100_000] {
            let v = build(n);
            v.verify();
            assert_eq!(v.len(), n);
            for i in 0..n {
                assert_eq!(v.get(i), Some(&i));
            }
            assert_eq!(v.get(n), None);
        }
    }

    #[test]
    fn test_vector_extend_from_partial_tail() {
        for start in [0, 1, 31, 32, 33, 1040] {
            for more in [0, 1, 31, 32, 33, 2000] {
                let owner = Owner::new();
                let mut v = Vector::new();
                for i in 0..start {
                    v.push(i, owner);
                }
                let frozen = v.clone();
                v.extend(start..start + more, Owner::new());
                v.verify();
                assert_eq!(contents(&v), (0..start + more).collect::<Vec<_>>());
                frozen.verify();
                assert_eq!(contents(&frozen), (0..start).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_vector_pop_to_empty() {
        let owner = Owner::new();
        let mut v = build(1100);
        for i in (0..1100).rev() {
            assert_eq!(v.pop(owner), Some(i));
            if i % 7 == 0 || i < 70 {
                v.verify();
            }
        }
        assert_eq!(v.pop(owner), None);
        v.verify();
    }

    #[test]
    fn test_vector_set_is_persistent() {
        let mut v = build(2000);
        let frozen = v.clone();
        let owner = Owner::new();
        for i in (0..2000).step_by(13) {
            assert_eq!(v.set(i, i + 1, owner), i);
        }
        for i in 0..2000 {
            assert_eq!(frozen.get(i), Some(&i));
            let expect = if i % 13 == 0 { i + 1 } else { i };
            assert_eq!(v.get(i), Some(&expect));
        }
    }

    #[test]
    fn test_vector_truncate() {
        for len in [0, 1, 31, 32, 33, 64, 100, 1024, 1025, 1056, 1999] {
            let mut v = build(2000);
            let frozen = v.clone();
            v.truncate(len, Owner::new());
            v.verify();
            assert_eq!(contents(&v), (0..len).collect::<Vec<_>>());
            frozen.verify();
            assert_eq!(frozen.len(), 2000);

            // Growing again after a truncate must keep the shape valid.
            v.extend(len..3000, Owner::new());
            v.verify();
            assert_eq!(contents(&v), (0..3000).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_vector_insert_remove_middle() {
        for n in [1, 32, 33, 100, 1100] {
            for index in [0, n / 2, 32.min(n), n] {
                let owner = Owner::new();
                let mut v = build(n);
                let mut model: Vec<usize> = (0..n).collect();
                v.insert(index, 9999, owner);
                model.insert(index, 9999);
                v.verify();
                assert_eq!(contents(&v), model);

                assert_eq!(v.remove(index, owner), Some(9999));
                model.remove(index);
                v.verify();
                assert_eq!(contents(&v), model);
            }
        }
    }

    #[test]
    fn test_vector_insert_all() {
        let owner = Owner::new();
        let mut v = build(100);
        v.insert_all(40, vec![1000, 1001, 1002], owner);
        v.verify();
        let mut model: Vec<usize> = (0..100).collect();
        model.splice(40..40, [1000, 1001, 1002]);
        assert_eq!(contents(&v), model);
    }

    #[test]
    fn test_vector_remove_if() {
        let owner = Owner::new();
        let mut v = build(1000);
        assert_eq!(v.remove_if(owner, |x| *x >= 5000), 0);
        assert_eq!(v.remove_if(owner, |x| x % 3 == 1), 333);
        v.verify();
        assert_eq!(
            contents(&v),
            (0..1000).filter(|x| x % 3 != 1).collect::<Vec<_>>()
        );
    }
}
