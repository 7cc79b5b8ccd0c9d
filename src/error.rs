//! Errors reported by the collections, their cursors and views.

use std::fmt;

/// A failure of a collection operation. All of these are reported at the
/// call site and never retried internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// The index was outside of the valid range for the operation.
    IndexOutOfBounds {
        /// The index that was requested.
        index: usize,
        /// The size of the collection at the time of the request.
        size: usize,
    },
    /// A cursor was advanced past its last (or first) element.
    NoSuchElement,
    /// A cursor mutation was requested before the cursor returned an element,
    /// or after that element was already removed.
    IllegalState,
    /// The builder was structurally modified after the cursor or view was
    /// created, outside of that cursor or view.
    ConcurrentModification {
        /// The modification count the cursor or view expected.
        expected: usize,
        /// The modification count the builder actually has.
        actual: usize,
    },
    /// The requested collection implementation does not exist.
    UnsupportedConfiguration(String),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::IndexOutOfBounds { index, size } => {
                write!(f, "index {} out of bounds for size {}", index, size)
            }
            CollectionError::NoSuchElement => write!(f, "no element remains"),
            CollectionError::IllegalState => {
                write!(f, "no element has been returned to act upon")
            }
            CollectionError::ConcurrentModification { expected, actual } => write!(
                f,
                "concurrent modification: expected mod count {}, found {}",
                expected, actual
            ),
            CollectionError::UnsupportedConfiguration(name) => {
                write!(f, "unknown collection implementation: {}", name)
            }
        }
    }
}

impl std::error::Error for CollectionError {}

#[inline]
pub(crate) fn check_index(index: usize, size: usize) -> Result<(), CollectionError> {
    if index < size {
        Ok(())
    } else {
        Err(CollectionError::IndexOutOfBounds { index, size })
    }
}

#[inline]
pub(crate) fn check_position(index: usize, size: usize) -> Result<(), CollectionError> {
    if index <= size {
        Ok(())
    } else {
        Err(CollectionError::IndexOutOfBounds { index, size })
    }
}

#[inline]
pub(crate) fn check_mod_count(expected: usize, actual: usize) -> Result<(), CollectionError> {
    if expected == actual {
        Ok(())
    } else {
        tracing::debug!(expected, actual, "concurrent modification detected");
        Err(CollectionError::ConcurrentModification { expected, actual })
    }
}
