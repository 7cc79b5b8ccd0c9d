//! Cursors and views over a `ListBuilder`.
//!
//! Neither type borrows the builder. Each call takes the builder explicitly
//! and first checks that it has not been structurally modified since the
//! cursor or view last saw it. Edits made through the cursor or view update
//! what it expects, so they can be interleaved freely with reads.

use super::builder::ListBuilder;
use super::Iter;
use crate::error::{check_index, check_mod_count, check_position, CollectionError};

/// A bidirectional list iterator over a `ListBuilder`.
///
/// The cursor sits between two elements. `next` and `previous` step over an
/// element and remember it, so that `set` and `remove` can act on it.
#[derive(Debug, Clone)]
pub struct ListCursor<T> {
    index: usize,
    len: usize,
    last: Option<usize>,
    expected: usize,
    marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Clone> ListCursor<T> {
    pub(crate) fn new(index: usize, len: usize, mod_count: usize) -> Self {
        ListCursor {
            index,
            len,
            last: None,
            expected: mod_count,
            marker: std::marker::PhantomData,
        }
    }

    /// True if `next` has an element to return.
    pub fn has_next(&self) -> bool {
        self.index < self.len
    }

    /// True if `previous` has an element to return.
    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    /// The index of the element `next` would return.
    pub fn next_index(&self) -> usize {
        self.index
    }

    /// The index of the element `previous` would return, if any.
    pub fn previous_index(&self) -> Option<usize> {
        self.index.checked_sub(1)
    }

    /// Step forward over an element and return it.
    pub fn next<'b>(&mut self, builder: &'b ListBuilder<T>) -> Result<&'b T, CollectionError> {
        check_mod_count(self.expected, builder.mod_count())?;
        if self.index >= self.len {
            return Err(CollectionError::NoSuchElement);
        }
        let x = builder.get(self.index).ok_or(CollectionError::NoSuchElement)?;
        self.last = Some(self.index);
        self.index += 1;
        Ok(x)
    }

    /// Step back over an element and return it.
    pub fn previous<'b>(&mut self, builder: &'b ListBuilder<T>) -> Result<&'b T, CollectionError> {
        check_mod_count(self.expected, builder.mod_count())?;
        if self.index == 0 {
            return Err(CollectionError::NoSuchElement);
        }
        let x = builder
            .get(self.index - 1)
            .ok_or(CollectionError::NoSuchElement)?;
        self.index -= 1;
        self.last = Some(self.index);
        Ok(x)
    }

    /// Replace the element last returned by `next` or `previous`.
    pub fn set(&mut self, builder: &mut ListBuilder<T>, x: T) -> Result<T, CollectionError> {
        check_mod_count(self.expected, builder.mod_count())?;
        let last = self.last.ok_or(CollectionError::IllegalState)?;
        builder.set(last, x)
    }

    /// Insert `x` at the cursor. The cursor ends up after it, so `next` is
    /// unaffected and `previous` would return `x`.
    pub fn add(&mut self, builder: &mut ListBuilder<T>, x: T) -> Result<(), CollectionError> {
        check_mod_count(self.expected, builder.mod_count())?;
        builder.insert(self.index, x)?;
        self.index += 1;
        self.len += 1;
        self.last = None;
        self.expected = builder.mod_count();
        Ok(())
    }

    /// Remove the element last returned by `next` or `previous`.
    pub fn remove(&mut self, builder: &mut ListBuilder<T>) -> Result<T, CollectionError> {
        check_mod_count(self.expected, builder.mod_count())?;
        let last = self.last.take().ok_or(CollectionError::IllegalState)?;
        let x = builder.remove_at(last)?;
        if last < self.index {
            self.index = last;
        }
        self.len -= 1;
        self.expected = builder.mod_count();
        Ok(x)
    }
}

/// A window onto `from..from + len` of a `ListBuilder`.
#[derive(Debug, Clone)]
pub struct SubList<T> {
    from: usize,
    len: usize,
    expected: usize,
    marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Clone> SubList<T> {
    pub(crate) fn new(from: usize, len: usize, mod_count: usize) -> Self {
        SubList {
            from,
            len,
            expected: mod_count,
            marker: std::marker::PhantomData,
        }
    }

    /// The number of elements in the view.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the view is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The element at `index` of the view.
    pub fn get<'b>(&self, builder: &'b ListBuilder<T>, index: usize) -> Result<&'b T, CollectionError> {
        check_mod_count(self.expected, builder.mod_count())?;
        check_index(index, self.len)?;
        builder
            .get(self.from + index)
            .ok_or(CollectionError::IndexOutOfBounds {
                index,
                size: self.len,
            })
    }

    /// Replace the element at `index` of the view.
    pub fn set(&self, builder: &mut ListBuilder<T>, index: usize, x: T) -> Result<T, CollectionError> {
        check_mod_count(self.expected, builder.mod_count())?;
        check_index(index, self.len)?;
        builder.set(self.from + index, x)
    }

    /// Insert `x` before `index` of the view.
    pub fn insert(&mut self, builder: &mut ListBuilder<T>, index: usize, x: T) -> Result<(), CollectionError> {
        check_mod_count(self.expected, builder.mod_count())?;
        check_position(index, self.len)?;
        builder.insert(self.from + index, x)?;
        self.len += 1;
        self.expected = builder.mod_count();
        Ok(())
    }

    /// Append `x` to the end of the view.
    pub fn push(&mut self, builder: &mut ListBuilder<T>, x: T) -> Result<(), CollectionError> {
        let end = self.len;
        self.insert(builder, end, x)
    }

    /// Remove and return the element at `index` of the view.
    pub fn remove_at(&mut self, builder: &mut ListBuilder<T>, index: usize) -> Result<T, CollectionError> {
        check_mod_count(self.expected, builder.mod_count())?;
        check_index(index, self.len)?;
        let x = builder.remove_at(self.from + index)?;
        self.len -= 1;
        self.expected = builder.mod_count();
        Ok(x)
    }

    /// Iterate over the elements of the view.
    pub fn iter<'b>(&self, builder: &'b ListBuilder<T>) -> Result<Iter<'b, T>, CollectionError> {
        check_mod_count(self.expected, builder.mod_count())?;
        Ok(Iter::new(&builder.vector, self.from, self.from + self.len))
    }
}
