//! The seams shared by every collection family and its builder.

/// A persistent collection. Values of this type never change once built; every
/// update returns a new collection sharing structure with the old one.
pub trait PersistentCollection: Sized {
    /// The mutable front end that edits this collection in place.
    type Builder: CollectionBuilder<Collection = Self>;

    /// The number of elements or entries.
    fn len(&self) -> usize;

    /// True if there is nothing in the collection.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start a builder from this collection in O(1). Nothing is copied until
    /// the builder first edits a node.
    fn builder(&self) -> Self::Builder;

    /// True if both handles are the same version of the same structure. A
    /// no-op update returns a handle for which this holds.
    fn ptr_eq(&self, other: &Self) -> bool;
}

/// A builder over a persistent collection.
pub trait CollectionBuilder {
    /// What `build` produces.
    type Collection: PersistentCollection<Builder = Self>;

    /// The number of elements or entries.
    fn len(&self) -> usize;

    /// True if there is nothing in the builder.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The count of structural modifications made through this builder.
    /// Cursors and views compare against it to detect changes made behind
    /// their back.
    fn mod_count(&self) -> usize;

    /// Freeze the current content as a collection in O(1). The builder stays
    /// usable; later edits copy the nodes they touch instead of disturbing the
    /// collection returned here.
    fn build(&mut self) -> Self::Collection;
}
