use crate::{
    require, trace, Color, DataIndex, Direction, FixupAction, Payload, RedBlackTree,
    RedBlackTreeReadOperationsHelpers, RedBlackTreeWriteOperationsHelpers, TreeError,
    TreeReadOperations, TreeResult, NIL,
};

impl<V: Payload> RedBlackTree<V> {
    /// Delete a value. The first step depends on the children of its node:
    /// two children borrow the in-order predecessor, one child is promoted,
    /// a red leaf simply goes. A black leaf is removed right away and the
    /// first step is the lack of black left at its position.
    pub fn delete(&mut self, value: &V) -> TreeResult {
        self.require_idle()?;
        self.config.domain.check(value)?;
        let index: DataIndex = self.lookup_index::<V>(value);
        require(index != NIL, TreeError::NotFound, "Value not in tree")?;

        trace!("TREE delete {value} at {index}");

        let action: FixupAction = self.begin_removal(index);
        self.schedule(action);
        Ok(())
    }

    fn begin_removal(&mut self, index: DataIndex) -> FixupAction {
        let left_index: DataIndex = self.get_left_index::<V>(index);
        let right_index: DataIndex = self.get_right_index::<V>(index);
        let has_left: bool = !self.is_sentinel::<V>(left_index);
        let has_right: bool = !self.is_sentinel::<V>(right_index);

        if has_left && has_right {
            return FixupAction::ReplaceWithPredecessor {
                node: index,
                predecessor: self.get_next_lower_index::<V>(index),
            };
        }
        if has_left || has_right {
            return FixupAction::PromoteRedChild {
                node: index,
                child: if has_left { left_index } else { right_index },
            };
        }
        if self.get_color::<V>(index).is_red() {
            return FixupAction::RemoveRedLeaf { node: index };
        }

        let sentinel_index: DataIndex = self.splice_leaf(index);
        self.classify_lack_of_black(sentinel_index)
    }

    /// Unlink a node with at most one real child. Returns the lack of black
    /// step when a black leaf went.
    pub(crate) fn splice_out(&mut self, index: DataIndex) -> Option<FixupAction> {
        let left_index: DataIndex = self.get_left_index::<V>(index);
        let right_index: DataIndex = self.get_right_index::<V>(index);
        debug_assert!(self.is_sentinel::<V>(left_index) || self.is_sentinel::<V>(right_index));

        if !self.is_sentinel::<V>(left_index) || !self.is_sentinel::<V>(right_index) {
            // The only child of a node is red, and it takes over the black.
            let (child_index, other_index): (DataIndex, DataIndex) =
                if self.is_sentinel::<V>(right_index) {
                    (left_index, right_index)
                } else {
                    (right_index, left_index)
                };
            self.set_color::<V>(child_index, Color::Black);
            self.transfer_parent::<V>(index, child_index);
            self.release_node(other_index);
            self.release_node(index);
            self.len -= 1;
            return None;
        }

        let was_red: bool = self.get_color::<V>(index).is_red();
        let sentinel_index: DataIndex = self.splice_leaf(index);
        if was_red {
            None
        } else {
            Some(self.classify_lack_of_black(sentinel_index))
        }
    }

    /// Replace a leaf by its left sentinel. Returns that sentinel.
    fn splice_leaf(&mut self, index: DataIndex) -> DataIndex {
        let sentinel_index: DataIndex = self.get_left_index::<V>(index);
        let right_index: DataIndex = self.get_right_index::<V>(index);
        self.transfer_parent::<V>(index, sentinel_index);
        self.release_node(right_index);
        self.release_node(index);
        self.len -= 1;
        sentinel_index
    }

    /// Copy the predecessor value into the node and splice the predecessor
    /// out, leaving no moment where the value appears twice.
    pub(crate) fn replace_with_predecessor(
        &mut self,
        index: DataIndex,
        predecessor_index: DataIndex,
    ) -> Option<FixupAction> {
        let value: V = *self.get_value::<V>(predecessor_index);
        self.set_value::<V>(index, value);
        self.splice_out(predecessor_index)
    }

    /// First step for a subtree one black short of its sibling.
    pub(crate) fn classify_lack_of_black(&self, index: DataIndex) -> FixupAction {
        if self.is_root(index) {
            return FixupAction::Settled { node: index };
        }
        let parent_index: DataIndex = self.get_parent_index::<V>(index);
        let sibling_is_left: bool = !self.is_left_child::<V>(index);
        let sibling_index: DataIndex = self.get_sibling_index::<V>(index, parent_index);
        // The sibling side carries at least one more black than ours.
        assert!(
            !self.is_sentinel::<V>(sibling_index),
            "lack of black next to an empty sibling"
        );

        let direction: Direction = Direction::lifting(sibling_is_left);
        if self.get_color::<V>(sibling_index).is_red() {
            return FixupAction::RotateForBlackSibling {
                node: index,
                sibling: sibling_index,
                parent: parent_index,
                sibling_is_left,
                direction,
            };
        }

        let (outside_index, inside_index): (DataIndex, DataIndex) = if sibling_is_left {
            (
                self.get_left_index::<V>(sibling_index),
                self.get_right_index::<V>(sibling_index),
            )
        } else {
            (
                self.get_right_index::<V>(sibling_index),
                self.get_left_index::<V>(sibling_index),
            )
        };

        if self.get_color::<V>(outside_index).is_red() {
            return FixupAction::RotateOutsideRed {
                node: index,
                sibling: sibling_index,
                parent: parent_index,
                direction,
            };
        }
        if self.get_color::<V>(inside_index).is_red() {
            return FixupAction::RotateInsideRed {
                node: index,
                sibling: sibling_index,
                inside_child: inside_index,
                sibling_is_left,
                direction: Direction::lifting(!sibling_is_left),
            };
        }
        if self.get_color::<V>(parent_index).is_red() {
            return FixupAction::SwapParentSiblingColors {
                node: index,
                sibling: sibling_index,
                parent: parent_index,
            };
        }
        FixupAction::ColorSiblingRedAndMoveUp {
            node: index,
            sibling: sibling_index,
            parent: parent_index,
        }
    }

    pub(crate) fn rotate_for_black_sibling(
        &mut self,
        index: DataIndex,
        sibling_index: DataIndex,
        parent_index: DataIndex,
        direction: Direction,
    ) -> FixupAction {
        // Before                    After
        //        P(b)                     S(b)
        //      /    \                   /
        //    N(b)    S(r)    --->     P(r)
        //           /               /    \
        //          C              N(b)    C
        self.rotate::<V>(direction, sibling_index);
        self.set_color::<V>(sibling_index, Color::Black);
        self.set_color::<V>(parent_index, Color::Red);
        // Same node, now with C as its black sibling.
        self.classify_lack_of_black(index)
    }

    pub(crate) fn rotate_outside_red(
        &mut self,
        sibling_index: DataIndex,
        parent_index: DataIndex,
        direction: Direction,
    ) {
        let parent_color: Color = self.get_color::<V>(parent_index);
        self.rotate::<V>(direction, sibling_index);
        self.set_color::<V>(sibling_index, parent_color);
        let left_index: DataIndex = self.get_left_index::<V>(sibling_index);
        let right_index: DataIndex = self.get_right_index::<V>(sibling_index);
        self.set_color::<V>(left_index, Color::Black);
        self.set_color::<V>(right_index, Color::Black);
    }

    pub(crate) fn rotate_inside_red(
        &mut self,
        index: DataIndex,
        sibling_index: DataIndex,
        inside_index: DataIndex,
        direction: Direction,
    ) -> FixupAction {
        self.rotate::<V>(direction, inside_index);
        self.set_color::<V>(sibling_index, Color::Red);
        self.set_color::<V>(inside_index, Color::Black);
        // The old sibling is now the red outside child of the new one.
        self.classify_lack_of_black(index)
    }

    pub(crate) fn swap_parent_sibling_colors(
        &mut self,
        sibling_index: DataIndex,
        parent_index: DataIndex,
    ) {
        self.set_color::<V>(sibling_index, Color::Red);
        self.set_color::<V>(parent_index, Color::Black);
    }

    pub(crate) fn color_sibling_red_and_move_up(
        &mut self,
        sibling_index: DataIndex,
        parent_index: DataIndex,
    ) -> FixupAction {
        self.set_color::<V>(sibling_index, Color::Red);
        self.classify_lack_of_black(parent_index)
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

    /// Titles of every step deleting `value` goes through.
    fn delete_titles(values: &[u32], value: u32) -> Vec<String> {
        let mut tree: RedBlackTree<u32> = classic(values);
        tree.set_explain(true);
        tree.delete(&value).unwrap();
        let mut titles: Vec<String> = Vec::new();
        while let Some(action) = tree.pending().copied() {
            titles.push(action.title());
            tree.resume().unwrap();
        }
        tree.verify_rb_tree::<u32>();
        assert!(!tree.contains(&value));
        titles
    }

    #[test]
    fn test_delete_only_value() {
        assert_eq!(
            delete_titles(&[500], 500),
            vec!["No Additional Action Required"]
        );
        let mut tree: RedBlackTree<u32> = classic(&[500]);
        tree.delete(&500).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.snapshot(), Subtree::Sentinel);
        tree.verify_rb_tree::<u32>();
    }

    #[test]
    fn test_delete_structural_steps() {
        assert_eq!(
            delete_titles(&[500, 750], 750),
            vec!["Simply Remove the Red Node"]
        );
        assert_eq!(
            delete_titles(&[500, 750], 500),
            vec!["Replace Parent with Red Child Turned Black"]
        );
        assert_eq!(
            delete_titles(&[500, 250, 750], 500),
            vec!["Replace Value with In-Order Predecessor to Get One Child"]
        );

        let mut tree: RedBlackTree<u32> = classic(&[500, 750]);
        tree.delete(&500).unwrap();
        assert_eq!(tree.snapshot(), Subtree::black_leaf(750));

        let mut tree: RedBlackTree<u32> = classic(&[500, 250, 750]);
        tree.delete(&500).unwrap();
        assert_eq!(
            tree.snapshot(),
            Subtree::black(250, Subtree::Sentinel, Subtree::red_leaf(750))
        );
    }

    #[test]
    fn test_delete_red_sibling() {
        assert_eq!(
            delete_titles(&[500, 250, 750, 125, 375, 62], 750)[0],
            "Lack of Black - Right Rotate and Swap Colors to Get Black Sibling"
        );
        assert_eq!(
            delete_titles(&[500, 250, 750, 625, 875, 562], 250)[0],
            "Lack of Black - Left Rotate and Swap Colors to Get Black Sibling"
        );
    }

    #[test]
    fn test_delete_outside_red_nephew() {
        assert_eq!(
            delete_titles(&[500, 250, 750, 875], 250),
            vec!["Lack of Black - Left Rotate and Color New Children Black"]
        );
        assert_eq!(
            delete_titles(&[500, 250, 750, 125], 750),
            vec!["Lack of Black - Right Rotate and Color New Children Black"]
        );
    }

    #[test]
    fn test_delete_inside_red_nephew() {
        assert_eq!(
            delete_titles(&[500, 250, 750, 625], 250),
            vec![
                "Lack of Black - Right Rotate and Swap Colors to Get Outside Red",
                "Lack of Black - Left Rotate and Color New Children Black",
            ]
        );
        assert_eq!(
            delete_titles(&[500, 250, 750, 375], 750)[0],
            "Lack of Black - Left Rotate and Swap Colors to Get Outside Red"
        );
    }

    #[test]
    fn test_delete_swap_parent_sibling() {
        let mut tree: RedBlackTree<u32> = classic(&[500, 250, 750, 625, 875, 937]);
        tree.delete(&937).unwrap();
        tree.set_explain(true);
        tree.delete(&875).unwrap();
        assert_eq!(
            tree.pending().map(|action| action.title()),
            Some("Lack of Black - Swap Colors of Parent and Sibling".to_string())
        );
        assert_eq!(tree.resume(), Ok(None));
        tree.verify_rb_tree::<u32>();
    }

    #[test]
    fn test_delete_color_sibling_red() {
        let mut tree: RedBlackTree<u32> = classic(&[500, 250, 750, 875]);
        tree.delete(&875).unwrap();
        tree.set_explain(true);
        tree.delete(&750).unwrap();

        let first: FixupAction = *tree.pending().unwrap();
        assert_eq!(first.title(), "Lack of Black - Color Sibling Red and Move Up");
        let second: Option<FixupAction> = tree.resume().unwrap();
        assert_eq!(
            second.map(|action| action.title()),
            Some("No Additional Action Required".to_string())
        );
        assert_eq!(tree.resume(), Ok(None));
        assert_eq!(
            tree.snapshot(),
            Subtree::black(500, Subtree::red_leaf(250), Subtree::Sentinel)
        );
    }

    #[test]
    fn test_len_follows_unlinking_while_paused() {
        // A pending structural step still holds the value.
        for (values, value) in [
            (vec![500, 250, 750], 750),
            (vec![500, 750], 500),
            (vec![500, 250, 750], 500),
            (vec![500, 250, 750, 625], 250),
            (vec![500, 250, 750, 125, 375, 62], 750),
        ] {
            let mut tree: RedBlackTree<u32> = classic(&values);
            tree.set_explain(true);
            tree.delete(&value).unwrap();
            loop {
                assert_eq!(tree.len(), tree.snapshot().node_count());
                assert_eq!(tree.len(), tree.in_order().len());
                if !tree.is_paused() {
                    break;
                }
                tree.resume().unwrap();
            }
            assert_eq!(tree.len(), values.len() - 1);
        }

        let mut tree: RedBlackTree<u32> = classic(&[500, 250, 750]);
        tree.set_explain(true);
        tree.delete(&750).unwrap();
        assert_eq!(tree.len(), 3);
        assert!(tree.contains(&750));
        tree.resume().unwrap();
        assert_eq!(tree.len(), 2);
        assert!(!tree.contains(&750));
    }

    #[test]
    fn test_delete_missing_value_is_noop() {
        let mut tree: RedBlackTree<u32> = classic(&[500, 250, 750]);
        let before: Subtree<u32> = tree.snapshot();
        assert_eq!(tree.delete(&600), Err(TreeError::NotFound));
        assert_eq!(tree.delete(&600), Err(TreeError::NotFound));
        assert_eq!(tree.delete(&2000), Err(TreeError::OutOfRange));
        assert_eq!(tree.snapshot(), before);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_insert_then_delete_round_trip() {
        let mut tree: RedBlackTree<u32> = classic(&[500, 250, 750, 125]);
        let before: Subtree<u32> = tree.snapshot();
        tree.insert(375).unwrap();
        tree.delete(&375).unwrap();
        assert_eq!(tree.snapshot(), before);
    }

    #[test]
    fn test_delete_everything() {
        let mut tree: RedBlackTree<u64> = init_simple_tree();
        for i in [6u64, 1, 11, 4, 8, 2, 10, 3, 9, 5, 7] {
            tree.delete(&(i * 1_000)).unwrap();
            tree.verify_rb_tree::<u64>();
        }
        assert!(tree.is_empty());
        assert_eq!(tree.snapshot(), Subtree::Sentinel);
        // Only the root sentinel is still live.
        assert_eq!(
            tree.arena_bytes() / std::mem::size_of::<crate::RBNode<u64>>(),
            tree.free_blocks() + 1
        );
    }
}
