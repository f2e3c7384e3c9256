use std::cmp::Ordering;

use crate::{
    require, trace, DataIndex, Direction, FixupAction, Midpoint, Payload, RBNode, RedBlackTree,
    RedBlackTreeReadOperationsHelpers, RedBlackTreeWriteOperationsHelpers, TreeError,
    TreeReadOperations, TreeResult, NIL,
};

impl<V: Payload> RedBlackTree<V> {
    /// Insert a value. The new node replaces the sentinel where the search
    /// ends and starts red with two sentinel children, and rebalancing
    /// follows as a chain of red alert steps.
    pub fn insert(&mut self, value: V) -> TreeResult {
        self.require_idle()?;
        self.config.domain.check(&value)?;
        let sentinel_index: DataIndex = self.find_insert_slot(&value)?;
        // The new node and its right sentinel.
        self.reserve_blocks(2)?;

        let index: DataIndex = self.replace_sentinel(sentinel_index, value);
        self.len += 1;
        trace!("TREE insert {value} at {index}");

        let action: FixupAction = self.classify_double_red(index);
        self.schedule(action);
        Ok(())
    }

    /// Value that `insert_at` would place at the empty slot `slot_index`:
    /// halfway between the in-order neighbors of the slot, the domain bounds
    /// standing in for missing neighbors.
    pub fn insertion_value_for(&self, slot_index: DataIndex) -> TreeResult<V>
    where
        V: Midpoint,
    {
        require(
            self.is_live_sentinel(slot_index),
            TreeError::NotASentinel,
            "Insert position must be an empty slot",
        )?;
        let lower_bound: V = self.config.domain.lower().unwrap_or(V::LOWEST);
        let upper_bound: V = self.config.domain.upper().unwrap_or(V::HIGHEST);

        let (low, high): (V, V) = if self.is_root(slot_index) {
            (lower_bound, upper_bound)
        } else {
            let parent_index: DataIndex = self.get_parent_index::<V>(slot_index);
            let parent_value: V = *self.get_value::<V>(parent_index);
            if self.is_left_child::<V>(slot_index) {
                let lower: Option<V> = self.value_at(self.get_next_lower_index::<V>(parent_index));
                (lower.unwrap_or(lower_bound), parent_value)
            } else {
                let upper: Option<V> =
                    self.value_at(self.get_next_higher_index::<V>(parent_index));
                (parent_value, upper.unwrap_or(upper_bound))
            }
        };

        let value: V = V::halfway(&low, &high);
        require(
            value != low,
            TreeError::NoRoomForInsert,
            "No value between the neighbors of this slot",
        )?;
        Ok(value)
    }

    /// Insert at a chosen empty slot, returning the value that was placed.
    pub fn insert_at(&mut self, slot_index: DataIndex) -> TreeResult<V>
    where
        V: Midpoint,
    {
        self.require_idle()?;
        let value: V = self.insertion_value_for(slot_index)?;
        self.insert(value)?;
        Ok(value)
    }

    /// Sentinel where a search for value ends. Fails on an equal value.
    fn find_insert_slot(&self, value: &V) -> TreeResult<DataIndex> {
        let mut current_index: DataIndex = self.root_index;
        while !self.is_sentinel::<V>(current_index) {
            let ordering: Ordering = value.cmp(self.get_value::<V>(current_index));
            require(
                ordering != Ordering::Equal,
                TreeError::Duplicate,
                "Value already in tree",
            )?;
            current_index = if ordering == Ordering::Less {
                self.get_left_index::<V>(current_index)
            } else {
                self.get_right_index::<V>(current_index)
            };
        }
        Ok(current_index)
    }

    /// Handle names a sentinel block currently linked into the tree.
    pub(crate) fn is_live_sentinel(&self, index: DataIndex) -> bool {
        self.is_live_block(index) && self.is_sentinel::<V>(index)
    }

    // The replaced sentinel moves down to become the left child, mirroring
    // splice_leaf on delete.
    fn replace_sentinel(&mut self, sentinel_index: DataIndex, value: V) -> DataIndex {
        let index: DataIndex = self.allocate_node(RBNode::new_red(value));
        let right_index: DataIndex = self.allocate_sentinel(index);

        self.transfer_parent::<V>(sentinel_index, index);
        self.assign_left::<V>(index, sentinel_index);
        self.assign_right::<V>(index, right_index);
        index
    }

    /// First step for a red node that may sit under a red parent.
    pub(crate) fn classify_double_red(&self, index: DataIndex) -> FixupAction {
        if self.is_root(index) {
            return FixupAction::BlackenRoot { node: index };
        }
        let parent_index: DataIndex = self.get_parent_index::<V>(index);
        if !self.get_color::<V>(parent_index).is_red() {
            return FixupAction::Settled { node: index };
        }

        // A red parent is never the root, so there is a grandparent.
        let grandparent_index: DataIndex = self.get_parent_index::<V>(parent_index);
        assert_ne!(grandparent_index, NIL, "red parent without a grandparent");
        let uncle_index: DataIndex = self.get_sibling_index::<V>(parent_index, grandparent_index);

        if self.get_color::<V>(uncle_index).is_red() {
            return FixupAction::RecolorAndMoveUp {
                node: index,
                parent: parent_index,
                uncle: uncle_index,
                grandparent: grandparent_index,
            };
        }

        let parent_is_left: bool = self.is_left_child::<V>(parent_index);
        let node_is_left: bool = self.is_left_child::<V>(index);
        if parent_is_left != node_is_left {
            FixupAction::RotateRedPairOutside {
                node: index,
                parent: parent_index,
                direction: Direction::lifting(node_is_left),
            }
        } else {
            FixupAction::RotateAndSwapColors {
                node: index,
                parent: parent_index,
                grandparent: grandparent_index,
                direction: Direction::lifting(parent_is_left),
            }
        }
    }

    pub(crate) fn blacken_root(&mut self, index: DataIndex) {
        self.set_color::<V>(index, crate::Color::Black);
    }

    pub(crate) fn recolor_and_move_up(
        &mut self,
        parent_index: DataIndex,
        uncle_index: DataIndex,
        grandparent_index: DataIndex,
    ) -> FixupAction {
        self.set_color::<V>(parent_index, crate::Color::Black);
        self.set_color::<V>(uncle_index, crate::Color::Black);
        self.set_color::<V>(grandparent_index, crate::Color::Red);
        self.classify_double_red(grandparent_index)
    }

    pub(crate) fn rotate_red_pair_outside(
        &mut self,
        index: DataIndex,
        parent_index: DataIndex,
        direction: Direction,
    ) -> FixupAction {
        // Before                 After
        //       G                      G
        //     /                      /
        //   P(r)         --->      N(r)
        //      \                  /
        //       N(r)            P(r)
        self.rotate::<V>(direction, index);
        // The old parent is now the outside child.
        self.classify_double_red(parent_index)
    }

    pub(crate) fn rotate_and_swap_colors(
        &mut self,
        parent_index: DataIndex,
        grandparent_index: DataIndex,
        direction: Direction,
    ) {
        // Before                 After
        //         G(b)                 P(b)
        //        /                   /    \
        //      P(r)      --->      N(r)    G(r)
        //     /
        //   N(r)
        self.rotate::<V>(direction, parent_index);
        self.set_color::<V>(parent_index, crate::Color::Black);
        self.set_color::<V>(grandparent_index, crate::Color::Red);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::red_black_tree::test::init_simple_tree;
    use crate::{RedBlackTreeTestHelpers, Subtree, TreeConfig};

    fn classic(values: &[u32]) -> RedBlackTree<u32> {
        let mut tree: RedBlackTree<u32> = RedBlackTree::with_config(TreeConfig::classic());
        for value in values {
            tree.insert(*value).unwrap();
        }
        tree
    }

    /// Titles of every step the last value's insert goes through.
    fn insert_titles(values: &[u32], value: u32) -> Vec<String> {
        let mut tree: RedBlackTree<u32> = classic(values);
        tree.set_explain(true);
        tree.insert(value).unwrap();
        let mut titles: Vec<String> = Vec::new();
        while let Some(action) = tree.pending().copied() {
            titles.push(action.title());
            tree.resume().unwrap();
        }
        tree.verify_rb_tree::<u32>();
        titles
    }

    #[test]
    fn test_insert_first_value() {
        assert_eq!(insert_titles(&[], 500), vec!["Turn Root Black"]);
    }

    #[test]
    fn test_insert_under_black_parent() {
        assert_eq!(
            insert_titles(&[500], 750),
            vec!["No Additional Action Required"]
        );
    }

    #[test]
    fn test_insert_outside_red_pair() {
        assert_eq!(
            insert_titles(&[500, 750], 875),
            vec!["Red Alert - Left Rotate and Swap Colors"]
        );
        assert_eq!(
            insert_titles(&[500, 250], 125),
            vec!["Red Alert - Right Rotate and Swap Colors"]
        );

        let tree: RedBlackTree<u32> = classic(&[500, 750, 875]);
        assert_eq!(
            tree.snapshot(),
            Subtree::black(750, Subtree::red_leaf(500), Subtree::red_leaf(875))
        );
    }

    #[test]
    fn test_insert_inside_red_pair() {
        assert_eq!(
            insert_titles(&[500, 750], 625),
            vec![
                "Red Alert - Right Rotate Red Pair to Outside",
                "Red Alert - Left Rotate and Swap Colors",
            ]
        );
        assert_eq!(
            insert_titles(&[500, 250], 375),
            vec![
                "Red Alert - Left Rotate Red Pair to Outside",
                "Red Alert - Right Rotate and Swap Colors",
            ]
        );

        let tree: RedBlackTree<u32> = classic(&[500, 750, 625]);
        assert_eq!(
            tree.snapshot(),
            Subtree::black(625, Subtree::red_leaf(500), Subtree::red_leaf(750))
        );
    }

    #[test]
    fn test_insert_red_uncle() {
        assert_eq!(
            insert_titles(&[500, 250, 750], 625),
            vec!["Red Alert - Recolor and Move Up", "Turn Root Black"]
        );

        let tree: RedBlackTree<u32> = classic(&[500, 250, 750, 625]);
        assert_eq!(
            tree.snapshot(),
            Subtree::black(
                500,
                Subtree::black_leaf(250),
                Subtree::black(750, Subtree::red_leaf(625), Subtree::Sentinel)
            )
        );
    }

    #[test]
    fn test_insert_ascending() {
        let tree: RedBlackTree<u64> = init_simple_tree();
        let expected: Subtree<u64> = Subtree::black(
            4_000,
            Subtree::black(2_000, Subtree::black_leaf(1_000), Subtree::black_leaf(3_000)),
            Subtree::black(
                6_000,
                Subtree::black_leaf(5_000),
                Subtree::red(
                    8_000,
                    Subtree::black_leaf(7_000),
                    Subtree::black(
                        10_000,
                        Subtree::red_leaf(9_000),
                        Subtree::red_leaf(11_000),
                    ),
                ),
            ),
        );
        assert_eq!(tree.snapshot(), expected);
        tree.verify_rb_tree::<u64>();
    }

    #[test]
    fn test_insert_rejections_leave_tree_unchanged() {
        let mut tree: RedBlackTree<u32> = classic(&[500, 250, 750]);
        let before: Subtree<u32> = tree.snapshot();
        let arena_bytes: usize = tree.arena_bytes();

        assert_eq!(tree.insert(250), Err(TreeError::Duplicate));
        assert_eq!(tree.insert(0), Err(TreeError::OutOfRange));
        assert_eq!(tree.insert(1000), Err(TreeError::OutOfRange));
        assert_eq!(tree.insert(5000), Err(TreeError::OutOfRange));

        assert_eq!(tree.snapshot(), before);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.arena_bytes(), arena_bytes);
    }

    #[test]
    fn test_insertion_value_for_slots() {
        let mut tree: RedBlackTree<u32> = classic(&[]);
        let root_slot: DataIndex = tree.get_root_index();
        assert_eq!(tree.insertion_value_for(root_slot), Ok(500));
        assert_eq!(tree.insert_at(root_slot), Ok(500));

        let root_index: DataIndex = tree.get_root_index();
        let left_slot: DataIndex = tree.get_left_index::<u32>(root_index);
        let right_slot: DataIndex = tree.get_right_index::<u32>(root_index);
        assert_eq!(tree.insertion_value_for(left_slot), Ok(250));
        assert_eq!(tree.insertion_value_for(right_slot), Ok(750));
        assert_eq!(tree.insert_at(left_slot), Ok(250));

        let index: DataIndex = tree.lookup_index::<u32>(&250);
        let inner_slot: DataIndex = tree.get_right_index::<u32>(index);
        let outer_slot: DataIndex = tree.get_left_index::<u32>(index);
        assert_eq!(tree.insertion_value_for(inner_slot), Ok(375));
        assert_eq!(tree.insertion_value_for(outer_slot), Ok(125));
        tree.verify_rb_tree::<u32>();
    }

    #[test]
    fn test_insertion_value_for_rejects_nodes() {
        let tree: RedBlackTree<u32> = classic(&[500]);
        let root_index: DataIndex = tree.get_root_index();
        assert_eq!(
            tree.insertion_value_for(root_index),
            Err(TreeError::NotASentinel)
        );
        assert_eq!(tree.insertion_value_for(NIL), Err(TreeError::NotASentinel));
        assert_eq!(
            tree.insertion_value_for(root_index + 1),
            Err(TreeError::NotASentinel)
        );
        assert_eq!(
            tree.insertion_value_for(1 << 20),
            Err(TreeError::NotASentinel)
        );
    }

    #[test]
    fn test_insertion_value_for_no_room() {
        let mut tree: RedBlackTree<u32> =
            RedBlackTree::with_config(TreeConfig::default().with_domain(crate::KeyDomain::open(0, 2)));
        tree.insert(1).unwrap();
        let root_index: DataIndex = tree.get_root_index();
        let left_slot: DataIndex = tree.get_left_index::<u32>(root_index);
        assert_eq!(
            tree.insertion_value_for(left_slot),
            Err(TreeError::NoRoomForInsert)
        );
        assert_eq!(tree.insert_at(left_slot), Err(TreeError::NoRoomForInsert));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_insert_at_unbounded_signed() {
        let mut tree: RedBlackTree<i32> = RedBlackTree::new();
        let root_slot: DataIndex = tree.get_root_index();
        assert_eq!(tree.insert_at(root_slot), Ok(-1));
        tree.verify_rb_tree::<i32>();
    }
}
