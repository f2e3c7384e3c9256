use bytemuck::{Pod, Zeroable};

use crate::{get_helper, get_mut_helper, DataIndex, Get, Payload, RBNode, NIL};

// FreeList is a linked list threaded through the arena blocks that used to
// hold tree nodes. Spliced out nodes and replaced sentinels are pushed here
// and handed back out before the arena grows.
pub struct FreeList<'a, V: Payload> {
    /// Index in data of the head of the free list.
    head_index: DataIndex,
    /// Mutable data array of bytes in which the free list lives.
    data: &'a mut [u8],

    /// Placeholder for holding the node type, which fixes the block size.
    phantom: std::marker::PhantomData<&'a V>,
}

/// Overlay written at the start of a free block.
#[derive(Default, Copy, Clone, Zeroable, Pod)]
#[repr(C)]
pub struct FreeListNode {
    /// Next in the linked list.
    next_index: DataIndex,
}
impl Get for FreeListNode {}

impl<'a, V: Payload> FreeList<'a, V> {
    /// Create a new free list. Assumes that the data within data is already a well
    /// formed FreeList.
    pub fn new(data: &'a mut [u8], head_index: DataIndex) -> Self {
        FreeList {
            head_index,
            data,
            phantom: std::marker::PhantomData,
        }
    }

    /// Gets the index of head.
    pub fn get_head(&self) -> DataIndex {
        self.head_index
    }

    /// Free a node block to the free list
    pub fn add(&mut self, index: DataIndex) {
        debug_assert_ne!(index, NIL);
        *get_mut_helper::<RBNode<V>>(self.data, index) = RBNode::<V>::zeroed();
        let node: &mut FreeListNode = get_mut_helper::<FreeListNode>(self.data, index);
        node.next_index = self.head_index;
        self.head_index = index;
    }

    /// Take the block at the head, NIL when the list is empty.
    pub fn remove(&mut self) -> DataIndex {
        if self.head_index == NIL {
            return NIL;
        }

        let free_node_index: DataIndex = self.head_index;
        let head: &mut FreeListNode = get_mut_helper::<FreeListNode>(self.data, free_node_index);

        self.head_index = head.next_index;

        // Do not need to zero the rest of the block because it was zeroed
        // when adding to the free list.
        head.next_index = 0;

        free_node_index
    }

    /// Number of blocks waiting for reuse. Walks the list.
    pub fn len(&self) -> usize {
        count_free_blocks(self.data, self.head_index)
    }

    pub fn is_empty(&self) -> bool {
        self.head_index == NIL
    }
}

/// Walk a free list without taking it over.
pub fn count_free_blocks(data: &[u8], head_index: DataIndex) -> usize {
    let mut count: usize = 0;
    let mut current_index: DataIndex = head_index;
    while current_index != NIL {
        count += 1;
        current_index = get_helper::<FreeListNode>(data, current_index).next_index;
    }
    count
}
