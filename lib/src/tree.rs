use crate::{DataIndex, Payload};

// Read operations shared by every query on the tree. Handles are byte offsets
// into the node arena, NIL when there is no such node. Sentinels are never
// returned by these lookups.
pub trait TreeReadOperations {
    fn lookup_index<V: Payload>(&self, value: &V) -> DataIndex;
    fn lookup_min_index<V: Payload>(&self) -> DataIndex;
    fn lookup_max_index<V: Payload>(&self) -> DataIndex;
    fn get_root_index(&self) -> DataIndex;
    fn get_next_lower_index<V: Payload>(&self, index: DataIndex) -> DataIndex;
    fn get_next_higher_index<V: Payload>(&self, index: DataIndex) -> DataIndex;
}

/// Ascending iterator over (handle, value) pairs.
pub struct TreeValueIterator<'a, T: TreeReadOperations, V: Payload> {
    pub(crate) tree: &'a T,
    pub(crate) index: DataIndex,
    pub(crate) phantom: std::marker::PhantomData<&'a V>,
}
