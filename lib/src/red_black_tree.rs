use std::cmp::Ordering;
use std::mem::{align_of, size_of};

use crate::{
    count_free_blocks, get_helper, get_mut_helper, require, trace, Color, DataIndex, Direction,
    FixupAction, FreeList, Payload, RBNode, TreeConfig, TreeError, TreeReadOperations,
    TreeResult, TreeValueIterator, NIL, RBTREE_OVERHEAD_BYTES,
};

// Overview of all the structs and traits in this file. Skips some internal helpers.
//
// Public
//  struct RedBlackTree<V: Payload>
//    fn new() -> Self
//    fn with_config(config: TreeConfig<V>) -> Self
//    GetRedBlackTreeReadOnlyData
//    GetRedBlackTreeData
//    value queries: len, contains, min, max, predecessor, successor, iter
//    insert / delete / resume live in insert.rs, delete.rs and step.rs
//
//  trait GetRedBlackTreeReadOnlyData
//    fn data(&self) -> &[u8];
//    fn root_index(&self) -> DataIndex;
//    RedBlackTreeReadOperationsHelpers
//    TreeReadOperations
//    RedBlackTreeTestHelpers
//  trait GetRedBlackTreeData
//    fn data_mut(&mut self) -> &mut [u8];
//    fn set_root_index(&mut self, root_index: DataIndex);
//    RedBlackTreeWriteOperationsHelpers
//
// Internal
//  trait RedBlackTreeReadOperationsHelpers
//    fn get_value<V: Payload>(&self, index: DataIndex) -> &V;
//    fn is_sentinel<V: Payload>(&self, index: DataIndex) -> bool;
//    fn get_right_index<V: Payload>(&self, index: DataIndex) -> DataIndex;
//    fn get_left_index<V: Payload>(&self, index: DataIndex) -> DataIndex;
//    fn get_color<V: Payload>(&self, index: DataIndex) -> Color;
//    fn get_parent_index<V: Payload>(&self, index: DataIndex) -> DataIndex;
//    fn is_root(&self, index: DataIndex) -> bool;
//    fn is_left_child<V: Payload>(&self, index: DataIndex) -> bool;
//    fn is_right_child<V: Payload>(&self, index: DataIndex) -> bool;
//    fn get_node<V: Payload>(&self, index: DataIndex) -> &RBNode<V>;
//    fn get_sibling_index<V: Payload>(&self, index: DataIndex, parent_index: DataIndex)
//  trait RedBlackTreeWriteOperationsHelpers
//    fn set_color<V: Payload>(&mut self, index: DataIndex, color: Color);
//    fn set_parent_index<V: Payload>(&mut self, index: DataIndex, parent_index: DataIndex);
//    fn set_left_index<V: Payload>(&mut self, index: DataIndex, left_index: DataIndex);
//    fn set_right_index<V: Payload>(&mut self, index: DataIndex, right_index: DataIndex);
//    fn set_value<V: Payload>(&mut self, index: DataIndex, value: V);
//    fn assign_left<V: Payload>(&mut self, parent_index: DataIndex, child_index: DataIndex);
//    fn assign_right<V: Payload>(&mut self, parent_index: DataIndex, child_index: DataIndex);
//    fn transfer_parent<V: Payload>(&mut self, old_index: DataIndex, new_index: DataIndex);
//    fn rotate_left<V: Payload>(&mut self, pivot_index: DataIndex);
//    fn rotate_right<V: Payload>(&mut self, pivot_index: DataIndex);
//    fn rotate<V: Payload>(&mut self, direction: Direction, pivot_index: DataIndex);
//  trait RedBlackTreeTestHelpers
//    fn node_iter<V: Payload>(&self) -> RedBlackTreeNodeIterator<T, V>;
//    fn debug_print<V: Payload>(&self);
//    fn depth<V: Payload>(&self, index: DataIndex) -> i32;
//    fn verify_rb_tree<V: Payload>(&self);
//    fn num_black_nodes_through_root<V: Payload>(&self, index: DataIndex) -> i32;

/// A Red-Black tree which supports lookup O(log n), insert O(log n) and
/// delete O(log n), with every leaf position held by an explicit black
/// sentinel node.
///
/// Rebalancing is expressed as a sequence of [`FixupAction`]s. With explain
/// mode on, the tree stops before each one and waits for
/// [`RedBlackTree::resume`].
pub struct RedBlackTree<V: Payload> {
    /// The address within data that the root node starts. This is a sentinel
    /// when the tree is empty, never NIL.
    pub(crate) root_index: DataIndex,
    /// Owned arena for all the nodes of this tree. Words rather than bytes so
    /// every block starts 8 byte aligned.
    words: Vec<u64>,
    /// First byte past the last block handed out by the arena.
    next_unused_index: DataIndex,
    /// Head of the list of released blocks.
    free_list_head_index: DataIndex,

    /// Number of value-bearing nodes.
    pub(crate) len: usize,
    pub(crate) config: TreeConfig<V>,
    /// Fixup step waiting for `resume`.
    pub(crate) pending: Option<FixupAction>,
}

// Specific to red black trees and not all data structures. Implementing this
// gets a lot of other stuff for free.
pub trait GetRedBlackTreeReadOnlyData {
    fn data(&self) -> &[u8];
    fn root_index(&self) -> DataIndex;
}

impl<V: Payload> GetRedBlackTreeReadOnlyData for RedBlackTree<V> {
    fn data(&self) -> &[u8] {
        bytemuck::cast_slice(&self.words)
    }
    fn root_index(&self) -> DataIndex {
        self.root_index
    }
}

pub trait GetRedBlackTreeData {
    fn data_mut(&mut self) -> &mut [u8];
    fn set_root_index(&mut self, root_index: DataIndex);
}
impl<V: Payload> GetRedBlackTreeData for RedBlackTree<V> {
    fn data_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.words)
    }
    fn set_root_index(&mut self, root_index: DataIndex) {
        self.root_index = root_index;
    }
}

pub(crate) trait RedBlackTreeReadOperationsHelpers {
    fn get_value<V: Payload>(&self, index: DataIndex) -> &V;
    fn is_sentinel<V: Payload>(&self, index: DataIndex) -> bool;
    fn get_right_index<V: Payload>(&self, index: DataIndex) -> DataIndex;
    fn get_left_index<V: Payload>(&self, index: DataIndex) -> DataIndex;
    fn get_color<V: Payload>(&self, index: DataIndex) -> Color;
    fn get_parent_index<V: Payload>(&self, index: DataIndex) -> DataIndex;
    fn is_root(&self, index: DataIndex) -> bool;
    fn is_left_child<V: Payload>(&self, index: DataIndex) -> bool;
    fn is_right_child<V: Payload>(&self, index: DataIndex) -> bool;
    fn get_node<V: Payload>(&self, index: DataIndex) -> &RBNode<V>;
    fn get_sibling_index<V: Payload>(&self, index: DataIndex, parent_index: DataIndex)
        -> DataIndex;
}

impl<T> RedBlackTreeReadOperationsHelpers for T
where
    T: GetRedBlackTreeReadOnlyData,
{
    fn get_value<V: Payload>(&self, index: DataIndex) -> &V {
        debug_assert_ne!(index, NIL);
        let node: &RBNode<V> = get_helper::<RBNode<V>>(self.data(), index);
        debug_assert!(!node.is_sentinel());
        &node.value
    }
    fn is_sentinel<V: Payload>(&self, index: DataIndex) -> bool {
        if index == NIL {
            return true;
        }
        let node: &RBNode<V> = get_helper::<RBNode<V>>(self.data(), index);
        node.is_sentinel()
    }
    fn get_color<V: Payload>(&self, index: DataIndex) -> Color {
        if index == NIL {
            return Color::Black;
        }
        let node: &RBNode<V> = get_helper::<RBNode<V>>(self.data(), index);
        node.color
    }
    fn get_right_index<V: Payload>(&self, index: DataIndex) -> DataIndex {
        if index == NIL {
            return NIL;
        }
        let node: &RBNode<V> = get_helper::<RBNode<V>>(self.data(), index);
        node.right
    }
    fn get_left_index<V: Payload>(&self, index: DataIndex) -> DataIndex {
        if index == NIL {
            return NIL;
        }
        let node: &RBNode<V> = get_helper::<RBNode<V>>(self.data(), index);
        node.left
    }
    fn get_parent_index<V: Payload>(&self, index: DataIndex) -> DataIndex {
        if index == NIL {
            return NIL;
        }
        let node: &RBNode<V> = get_helper::<RBNode<V>>(self.data(), index);
        node.parent
    }

    fn is_root(&self, index: DataIndex) -> bool {
        index == self.root_index()
    }
    fn is_left_child<V: Payload>(&self, index: DataIndex) -> bool {
        if self.is_root(index) {
            return false;
        }
        let parent_index: DataIndex = self.get_parent_index::<V>(index);
        self.get_left_index::<V>(parent_index) == index
    }
    fn is_right_child<V: Payload>(&self, index: DataIndex) -> bool {
        if self.is_root(index) {
            return false;
        }
        let parent_index: DataIndex = self.get_parent_index::<V>(index);
        self.get_right_index::<V>(parent_index) == index
    }
    fn get_node<V: Payload>(&self, index: DataIndex) -> &RBNode<V> {
        debug_assert_ne!(index, NIL);
        get_helper::<RBNode<V>>(self.data(), index)
    }

    fn get_sibling_index<V: Payload>(
        &self,
        index: DataIndex,
        parent_index: DataIndex,
    ) -> DataIndex {
        debug_assert_ne!(parent_index, NIL);
        let parent_left_child_index: DataIndex = self.get_left_index::<V>(parent_index);
        if parent_left_child_index == index {
            self.get_right_index::<V>(parent_index)
        } else {
            parent_left_child_index
        }
    }
}

pub(crate) trait RedBlackTreeWriteOperationsHelpers {
    fn set_color<V: Payload>(&mut self, index: DataIndex, color: Color);
    fn set_parent_index<V: Payload>(&mut self, index: DataIndex, parent_index: DataIndex);
    fn set_left_index<V: Payload>(&mut self, index: DataIndex, left_index: DataIndex);
    fn set_right_index<V: Payload>(&mut self, index: DataIndex, right_index: DataIndex);
    fn set_value<V: Payload>(&mut self, index: DataIndex, value: V);
    fn assign_left<V: Payload>(&mut self, parent_index: DataIndex, child_index: DataIndex);
    fn assign_right<V: Payload>(&mut self, parent_index: DataIndex, child_index: DataIndex);
    fn transfer_parent<V: Payload>(&mut self, old_index: DataIndex, new_index: DataIndex);
    fn rotate_left<V: Payload>(&mut self, pivot_index: DataIndex);
    fn rotate_right<V: Payload>(&mut self, pivot_index: DataIndex);
    fn rotate<V: Payload>(&mut self, direction: Direction, pivot_index: DataIndex);
}
impl<T> RedBlackTreeWriteOperationsHelpers for T
where
    T: GetRedBlackTreeData + RedBlackTreeReadOperationsHelpers + GetRedBlackTreeReadOnlyData,
{
    fn set_color<V: Payload>(&mut self, index: DataIndex, color: Color) {
        if index == NIL {
            return;
        }
        let node: &mut RBNode<V> = get_mut_helper::<RBNode<V>>(self.data_mut(), index);
        // Sentinels are black, always.
        debug_assert!(!(node.is_sentinel() && color == Color::Red));
        node.color = color;
    }
    fn set_parent_index<V: Payload>(&mut self, index: DataIndex, parent_index: DataIndex) {
        if index == NIL {
            return;
        }
        let node: &mut RBNode<V> = get_mut_helper::<RBNode<V>>(self.data_mut(), index);
        node.parent = parent_index;
    }
    fn set_left_index<V: Payload>(&mut self, index: DataIndex, left_index: DataIndex) {
        if index == NIL {
            return;
        }
        let node: &mut RBNode<V> = get_mut_helper::<RBNode<V>>(self.data_mut(), index);
        node.left = left_index;
    }
    fn set_right_index<V: Payload>(&mut self, index: DataIndex, right_index: DataIndex) {
        if index == NIL {
            return;
        }
        let node: &mut RBNode<V> = get_mut_helper::<RBNode<V>>(self.data_mut(), index);
        node.right = right_index;
    }
    fn set_value<V: Payload>(&mut self, index: DataIndex, value: V) {
        debug_assert_ne!(index, NIL);
        let node: &mut RBNode<V> = get_mut_helper::<RBNode<V>>(self.data_mut(), index);
        debug_assert!(!node.is_sentinel());
        node.value = value;
    }

    // The child must not be attached anywhere else, its old parent keeps
    // pointing at it otherwise.
    fn assign_left<V: Payload>(&mut self, parent_index: DataIndex, child_index: DataIndex) {
        self.set_left_index::<V>(parent_index, child_index);
        self.set_parent_index::<V>(child_index, parent_index);
    }
    fn assign_right<V: Payload>(&mut self, parent_index: DataIndex, child_index: DataIndex) {
        self.set_right_index::<V>(parent_index, child_index);
        self.set_parent_index::<V>(child_index, parent_index);
    }

    // Put new in the slot old occupies under its parent, or at the root.
    fn transfer_parent<V: Payload>(&mut self, old_index: DataIndex, new_index: DataIndex) {
        if self.is_root(old_index) {
            self.set_root_index(new_index);
            self.set_parent_index::<V>(new_index, NIL);
            return;
        }
        let parent_index: DataIndex = self.get_parent_index::<V>(old_index);
        if self.is_left_child::<V>(old_index) {
            self.assign_left::<V>(parent_index, new_index);
        } else {
            self.assign_right::<V>(parent_index, new_index);
        }
    }

    fn rotate_left<V: Payload>(&mut self, pivot_index: DataIndex) {
        // Left rotate of P around its parent G
        //
        //         GG                     GG
        //         |                      |
        //         G                      P
        //       /   \                  /   \
        //      U     P     --->      G      X
        //          /   \           /   \
        //        Y      X        U       Y
        debug_assert!(!self.is_sentinel::<V>(pivot_index));
        debug_assert!(self.is_right_child::<V>(pivot_index));

        let p_index: DataIndex = pivot_index;
        let g_index: DataIndex = self.get_parent_index::<V>(p_index);
        let y_index: DataIndex = self.get_left_index::<V>(p_index);

        // GG
        self.transfer_parent::<V>(g_index, p_index);
        // Y
        self.assign_right::<V>(g_index, y_index);
        // G
        self.assign_left::<V>(p_index, g_index);

        // U and X
        // Unchanged, just included for completeness
    }

    fn rotate_right<V: Payload>(&mut self, pivot_index: DataIndex) {
        // Right rotate of P around its parent G
        //
        //         GG                     GG
        //         |                      |
        //         G                      P
        //       /   \                  /   \
        //      P     U     --->      X       G
        //    /  \                          /   \
        //  X     Y                       Y       U
        debug_assert!(!self.is_sentinel::<V>(pivot_index));
        debug_assert!(self.is_left_child::<V>(pivot_index));

        let p_index: DataIndex = pivot_index;
        let g_index: DataIndex = self.get_parent_index::<V>(p_index);
        let y_index: DataIndex = self.get_right_index::<V>(p_index);

        // GG
        self.transfer_parent::<V>(g_index, p_index);
        // Y
        self.assign_left::<V>(g_index, y_index);
        // G
        self.assign_right::<V>(p_index, g_index);
    }

    fn rotate<V: Payload>(&mut self, direction: Direction, pivot_index: DataIndex) {
        match direction {
            Direction::Left => self.rotate_left::<V>(pivot_index),
            Direction::Right => self.rotate_right::<V>(pivot_index),
        }
    }
}

impl<T> TreeReadOperations for T
where
    T: GetRedBlackTreeReadOnlyData,
{
    /// Lookup the index of a given value. NIL when absent.
    fn lookup_index<V: Payload>(&self, value: &V) -> DataIndex {
        let mut current_index: DataIndex = self.root_index();
        while !self.is_sentinel::<V>(current_index) {
            match value.cmp(self.get_value::<V>(current_index)) {
                Ordering::Less => current_index = self.get_left_index::<V>(current_index),
                Ordering::Greater => current_index = self.get_right_index::<V>(current_index),
                Ordering::Equal => return current_index,
            }
        }
        NIL
    }

    fn lookup_min_index<V: Payload>(&self) -> DataIndex {
        let mut current_index: DataIndex = self.root_index();
        if self.is_sentinel::<V>(current_index) {
            return NIL;
        }
        loop {
            let left_index: DataIndex = self.get_left_index::<V>(current_index);
            if self.is_sentinel::<V>(left_index) {
                return current_index;
            }
            current_index = left_index;
        }
    }

    fn lookup_max_index<V: Payload>(&self) -> DataIndex {
        let mut current_index: DataIndex = self.root_index();
        if self.is_sentinel::<V>(current_index) {
            return NIL;
        }
        loop {
            let right_index: DataIndex = self.get_right_index::<V>(current_index);
            if self.is_sentinel::<V>(right_index) {
                return current_index;
            }
            current_index = right_index;
        }
    }

    /// Get the current root index.
    fn get_root_index(&self) -> DataIndex {
        self.root_index()
    }

    /// In-order predecessor. Max of the left subtree when there is one,
    /// otherwise the first ancestor we are to the right of.
    fn get_next_lower_index<V: Payload>(&self, index: DataIndex) -> DataIndex {
        if self.is_sentinel::<V>(index) {
            return NIL;
        }
        // Predecessor is below us.
        let left_index: DataIndex = self.get_left_index::<V>(index);
        if !self.is_sentinel::<V>(left_index) {
            let mut current_index: DataIndex = left_index;
            while !self.is_sentinel::<V>(self.get_right_index::<V>(current_index)) {
                current_index = self.get_right_index::<V>(current_index);
            }
            return current_index;
        }

        // Predecessor is above, keep going up while we are the left child
        let mut current_index: DataIndex = index;
        while self.is_left_child::<V>(current_index) {
            current_index = self.get_parent_index::<V>(current_index);
        }
        self.get_parent_index::<V>(current_index)
    }

    /// In-order successor, mirror of get_next_lower_index.
    fn get_next_higher_index<V: Payload>(&self, index: DataIndex) -> DataIndex {
        if self.is_sentinel::<V>(index) {
            return NIL;
        }
        let right_index: DataIndex = self.get_right_index::<V>(index);
        if !self.is_sentinel::<V>(right_index) {
            let mut current_index: DataIndex = right_index;
            while !self.is_sentinel::<V>(self.get_left_index::<V>(current_index)) {
                current_index = self.get_left_index::<V>(current_index);
            }
            return current_index;
        }

        let mut current_index: DataIndex = index;
        while self.is_right_child::<V>(current_index) {
            current_index = self.get_parent_index::<V>(current_index);
        }
        self.get_parent_index::<V>(current_index)
    }
}

impl<'a, T: TreeReadOperations + GetRedBlackTreeReadOnlyData, V: Payload> Iterator
    for TreeValueIterator<'a, T, V>
{
    type Item = (DataIndex, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let index: DataIndex = self.index;
        if index == NIL {
            return None;
        }
        self.index = self.tree.get_next_higher_index::<V>(index);
        Some((index, self.tree.get_value::<V>(index)))
    }
}

impl<V: Payload> Default for RedBlackTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Payload> RedBlackTree<V> {
    /// Creates an empty tree accepting any value, rebalancing synchronously.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig<V>) -> Self {
        assert!(
            align_of::<RBNode<V>>() <= align_of::<u64>(),
            "payload alignment above 8 bytes is not supported"
        );
        // Pod needs every byte of a block to belong to a field.
        assert!(
            size_of::<RBNode<V>>() == RBTREE_OVERHEAD_BYTES + size_of::<V>(),
            "payload leaves padding in the node"
        );
        let mut tree: RedBlackTree<V> = RedBlackTree {
            root_index: NIL,
            words: Vec::new(),
            next_unused_index: 0,
            free_list_head_index: NIL,
            len: 0,
            config,
            pending: None,
        };
        tree.root_index = tree.allocate_node(RBNode::new_sentinel(NIL));
        tree
    }

    pub fn config(&self) -> &TreeConfig<V> {
        &self.config
    }

    /// Number of values in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, value: &V) -> bool {
        self.lookup_index::<V>(value) != NIL
    }

    pub fn min(&self) -> Option<V> {
        self.value_at(self.lookup_min_index::<V>())
    }

    pub fn max(&self) -> Option<V> {
        self.value_at(self.lookup_max_index::<V>())
    }

    /// Largest value strictly below `value`, which must be in the tree.
    pub fn predecessor(&self, value: &V) -> TreeResult<Option<V>> {
        let index: DataIndex = self.lookup_index::<V>(value);
        require(index != NIL, TreeError::NotFound, "Predecessor of missing value")?;
        Ok(self.value_at(self.get_next_lower_index::<V>(index)))
    }

    /// Smallest value strictly above `value`, which must be in the tree.
    pub fn successor(&self, value: &V) -> TreeResult<Option<V>> {
        let index: DataIndex = self.lookup_index::<V>(value);
        require(index != NIL, TreeError::NotFound, "Successor of missing value")?;
        Ok(self.value_at(self.get_next_higher_index::<V>(index)))
    }

    /// Sorted iterator starting from the min.
    pub fn iter(&self) -> TreeValueIterator<'_, Self, V> {
        TreeValueIterator {
            tree: self,
            index: self.lookup_min_index::<V>(),
            phantom: std::marker::PhantomData,
        }
    }

    pub(crate) fn value_at(&self, index: DataIndex) -> Option<V> {
        if self.is_sentinel::<V>(index) {
            None
        } else {
            Some(*self.get_value::<V>(index))
        }
    }

    fn block_size() -> DataIndex {
        size_of::<RBNode<V>>() as DataIndex
    }

    /// Fails when handing out `count` more blocks could run the arena past
    /// what a DataIndex can address. Checked before any mutation.
    pub(crate) fn reserve_blocks(&self, count: u32) -> TreeResult {
        let needed: u64 =
            self.next_unused_index as u64 + count as u64 * Self::block_size() as u64;
        require(
            needed < NIL as u64,
            TreeError::CapacityExceeded,
            "Arena cannot address more nodes",
        )
    }

    /// Place a node in a free block, growing the arena when the free list is
    /// empty.
    pub(crate) fn allocate_node(&mut self, node: RBNode<V>) -> DataIndex {
        let (reused_index, head_index): (DataIndex, DataIndex) = {
            let head_index: DataIndex = self.free_list_head_index;
            let mut free_list: FreeList<V> = FreeList::new(self.data_mut(), head_index);
            let index: DataIndex = free_list.remove();
            (index, free_list.get_head())
        };
        self.free_list_head_index = head_index;

        let index: DataIndex = if reused_index != NIL {
            trace!("TREE reuse block {reused_index}");
            reused_index
        } else {
            let index: DataIndex = self.next_unused_index;
            self.next_unused_index += Self::block_size();
            let needed_words: usize = (self.next_unused_index as usize + 7) / 8;
            if self.words.len() < needed_words {
                self.words.resize(needed_words, 0);
            }
            index
        };
        *get_mut_helper::<RBNode<V>>(self.data_mut(), index) = node;
        index
    }

    pub(crate) fn allocate_sentinel(&mut self, parent_index: DataIndex) -> DataIndex {
        self.allocate_node(RBNode::new_sentinel(parent_index))
    }

    /// Return a detached block to the free list.
    pub(crate) fn release_node(&mut self, index: DataIndex) {
        let head_index: DataIndex = self.free_list_head_index;
        let mut free_list: FreeList<V> = FreeList::new(self.data_mut(), head_index);
        free_list.add(index);
        self.free_list_head_index = free_list.get_head();
    }

    /// Blocks parked on the free list.
    pub fn free_blocks(&self) -> usize {
        count_free_blocks(self.data(), self.free_list_head_index)
    }

    /// Bytes of arena handed out so far, live and free.
    pub fn arena_bytes(&self) -> usize {
        self.next_unused_index as usize
    }

    fn is_block_start(&self, index: DataIndex) -> bool {
        index != NIL
            && (index as usize) < self.arena_bytes()
            && index % Self::block_size() == 0
    }

    /// Handle names a block linked into the tree. Climbs to the root,
    /// checking every link from the parent side, since a freed block keeps
    /// whatever parent field zeroing left behind.
    pub(crate) fn is_live_block(&self, index: DataIndex) -> bool {
        let max_depth: usize = self.arena_bytes() / Self::block_size() as usize;
        let mut current_index: DataIndex = index;
        for _ in 0..=max_depth {
            if !self.is_block_start(current_index) {
                return false;
            }
            if current_index == self.root_index {
                return true;
            }
            let parent_index: DataIndex = self.get_parent_index::<V>(current_index);
            if !self.is_block_start(parent_index)
                || (self.get_left_index::<V>(parent_index) != current_index
                    && self.get_right_index::<V>(parent_index) != current_index)
            {
                return false;
            }
            current_index = parent_index;
        }
        false
    }
}

#[cfg(any(test, feature = "fuzz"))]
pub trait RedBlackTreeTestHelpers<T: GetRedBlackTreeReadOnlyData> {
    fn node_iter<V: Payload>(&self) -> RedBlackTreeNodeIterator<'_, T, V>;
    fn depth<V: Payload>(&self, index: DataIndex) -> i32;
    fn debug_print<V: Payload>(&self);
    fn verify_rb_tree<V: Payload>(&self);
    fn verify_subtree<V: Payload>(
        &self,
        index: DataIndex,
        lower: Option<&V>,
        upper: Option<&V>,
    ) -> i32;
    fn num_black_nodes_through_root<V: Payload>(&self, index: DataIndex) -> i32;
}

#[cfg(any(test, feature = "fuzz"))]
impl<T> RedBlackTreeTestHelpers<T> for T
where
    T: GetRedBlackTreeReadOnlyData,
{
    /// Sorted iterator over the real nodes, starting from the min.
    fn node_iter<V: Payload>(&self) -> RedBlackTreeNodeIterator<'_, T, V> {
        RedBlackTreeNodeIterator {
            tree: self,
            index: self.lookup_min_index::<V>(),
            phantom: std::marker::PhantomData,
        }
    }

    // Only used in printing, so can be slow
    fn depth<V: Payload>(&self, index: DataIndex) -> i32 {
        let mut depth = -1;
        let mut current_index: DataIndex = index;
        while current_index != NIL {
            current_index = self.get_parent_index::<V>(current_index);
            depth += 1;
        }
        depth
    }

    fn debug_print<V: Payload>(&self) {
        trace!("====== RedBlackTree ======");

        for (index, node) in self.node_iter::<V>() {
            let mut row_str: String = String::new();

            row_str += &"  ".repeat(self.depth::<V>(index) as usize);

            row_str += if node.parent == NIL {
                "- "
            } else if self.is_left_child::<V>(index) {
                "└ "
            } else {
                "┌ "
            };

            row_str += &format!("{}:{index}:{node}", node.color);
            trace!("{}", row_str);
        }

        trace!("==========================");
    }

    fn verify_rb_tree<V: Payload>(&self) {
        let root_index: DataIndex = self.root_index();
        assert_ne!(root_index, NIL, "root slot must hold a node or sentinel");
        assert_eq!(self.get_parent_index::<V>(root_index), NIL);
        assert_eq!(self.get_color::<V>(root_index), Color::Black);
        self.verify_subtree::<V>(root_index, None, None);
    }

    /// Checks links, order and colors below index and returns its black
    /// height, sentinels counting as one.
    fn verify_subtree<V: Payload>(
        &self,
        index: DataIndex,
        lower: Option<&V>,
        upper: Option<&V>,
    ) -> i32 {
        let node: &RBNode<V> = self.get_node::<V>(index);
        if node.is_sentinel() {
            assert_eq!(node.color, Color::Black);
            assert_eq!(node.left, NIL);
            assert_eq!(node.right, NIL);
            return 1;
        }

        if let Some(lower) = lower {
            assert!(lower < &node.value, "{} not above {}", node.value, lower);
        }
        if let Some(upper) = upper {
            assert!(&node.value < upper, "{} not below {}", node.value, upper);
        }

        assert_eq!(self.get_parent_index::<V>(node.left), index);
        assert_eq!(self.get_parent_index::<V>(node.right), index);

        // Verify that all red nodes only have black children
        if node.color == Color::Red {
            assert_eq!(self.get_color::<V>(node.left), Color::Black);
            assert_eq!(self.get_color::<V>(node.right), Color::Black);
        }

        let left_height: i32 = self.verify_subtree::<V>(node.left, lower, Some(&node.value));
        let right_height: i32 = self.verify_subtree::<V>(node.right, Some(&node.value), upper);
        assert_eq!(left_height, right_height, "black height differs under {}", node.value);

        left_height + if node.color == Color::Black { 1 } else { 0 }
    }

    fn num_black_nodes_through_root<V: Payload>(&self, index: DataIndex) -> i32 {
        let mut num_black_nodes: i32 = 0;
        let mut current_index: DataIndex = index;

        while current_index != NIL {
            if self.get_color::<V>(current_index) == Color::Black {
                num_black_nodes += 1;
            }
            current_index = self.get_parent_index::<V>(current_index);
        }
        num_black_nodes
    }
}

// Iterator that gives the RBNode information is only needed for testing.
// External users should use RedBlackTree::iter or the snapshot views.
#[cfg(any(test, feature = "fuzz"))]
pub struct RedBlackTreeNodeIterator<'a, T: GetRedBlackTreeReadOnlyData, V: Payload> {
    tree: &'a T,
    index: DataIndex,

    phantom: std::marker::PhantomData<&'a V>,
}

#[cfg(any(test, feature = "fuzz"))]
impl<'a, T: GetRedBlackTreeReadOnlyData, V: Payload> Iterator
    for RedBlackTreeNodeIterator<'a, T, V>
{
    type Item = (DataIndex, &'a RBNode<V>);

    fn next(&mut self) -> Option<Self::Item> {
        let index: DataIndex = self.index;
        if index == NIL {
            return None;
        }
        self.index = self.tree.get_next_higher_index::<V>(index);
        Some((index, get_helper::<RBNode<V>>(self.tree.data(), index)))
    }
}

// No IterMut because changing keys could break red-black properties.
