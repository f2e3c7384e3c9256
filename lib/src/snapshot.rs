use std::collections::VecDeque;

use crate::{
    Color, DataIndex, Payload, RedBlackTree, RedBlackTreeReadOperationsHelpers,
    TreeReadOperations, NIL,
};

/// A real node as seen from outside the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeView<V> {
    pub index: DataIndex,
    pub value: V,
    pub color: Color,
    /// NIL for the root.
    pub parent: DataIndex,
}

/// One position of a level order enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<V> {
    Node(NodeView<V>),
    /// An empty position, a valid target for `insert_at`.
    Sentinel {
        index: DataIndex,
        parent: DataIndex,
        is_left: bool,
    },
    /// Below a sentinel, nothing can be here.
    Placeholder,
}

impl<V> Slot<V> {
    pub fn is_node(&self) -> bool {
        matches!(self, Slot::Node(_))
    }
    pub fn node(&self) -> Option<&NodeView<V>> {
        match self {
            Slot::Node(view) => Some(view),
            _ => None,
        }
    }
}

/// Owned copy of the tree shape. Compares structurally, so two trees with
/// the same values in different shapes or colors are different.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subtree<V> {
    Sentinel,
    Node {
        value: V,
        color: Color,
        left: Box<Subtree<V>>,
        right: Box<Subtree<V>>,
    },
}

impl<V: Payload> Subtree<V> {
    pub fn node(value: V, color: Color, left: Subtree<V>, right: Subtree<V>) -> Self {
        Subtree::Node {
            value,
            color,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
    pub fn black(value: V, left: Subtree<V>, right: Subtree<V>) -> Self {
        Self::node(value, Color::Black, left, right)
    }
    pub fn red(value: V, left: Subtree<V>, right: Subtree<V>) -> Self {
        Self::node(value, Color::Red, left, right)
    }
    pub fn black_leaf(value: V) -> Self {
        Self::black(value, Subtree::Sentinel, Subtree::Sentinel)
    }
    pub fn red_leaf(value: V) -> Self {
        Self::red(value, Subtree::Sentinel, Subtree::Sentinel)
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Subtree::Sentinel)
    }

    pub fn value(&self) -> Option<V> {
        match self {
            Subtree::Sentinel => None,
            Subtree::Node { value, .. } => Some(*value),
        }
    }

    /// None for a sentinel, which is black but has no color of its own.
    pub fn color(&self) -> Option<Color> {
        match self {
            Subtree::Sentinel => None,
            Subtree::Node { color, .. } => Some(*color),
        }
    }

    pub fn left(&self) -> Option<&Subtree<V>> {
        match self {
            Subtree::Sentinel => None,
            Subtree::Node { left, .. } => Some(left),
        }
    }

    pub fn right(&self) -> Option<&Subtree<V>> {
        match self {
            Subtree::Sentinel => None,
            Subtree::Node { right, .. } => Some(right),
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            Subtree::Sentinel => 0,
            Subtree::Node { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    pub fn values_in_order(&self) -> Vec<V> {
        let mut values: Vec<V> = Vec::with_capacity(self.node_count());
        self.collect_values(&mut values);
        values
    }

    fn collect_values(&self, values: &mut Vec<V>) {
        if let Subtree::Node {
            value, left, right, ..
        } = self
        {
            left.collect_values(values);
            values.push(*value);
            right.collect_values(values);
        }
    }

    /// Blacks on every path down to a sentinel, sentinel included. None when
    /// paths disagree.
    pub fn black_height(&self) -> Option<usize> {
        match self {
            Subtree::Sentinel => Some(1),
            Subtree::Node {
                color, left, right, ..
            } => {
                let left_height: usize = left.black_height()?;
                let right_height: usize = right.black_height()?;
                if left_height != right_height {
                    return None;
                }
                Some(left_height + usize::from(*color == Color::Black))
            }
        }
    }

    /// Some red node has a red child.
    pub fn has_double_red(&self) -> bool {
        match self {
            Subtree::Sentinel => false,
            Subtree::Node {
                color, left, right, ..
            } => {
                let red_child: bool = left.color() == Some(Color::Red)
                    || right.color() == Some(Color::Red);
                (*color == Color::Red && red_child)
                    || left.has_double_red()
                    || right.has_double_red()
            }
        }
    }

    /// All red-black invariants hold with this as the root.
    pub fn is_valid_red_black(&self) -> bool {
        let ordered: bool = self.values_in_order().windows(2).all(|pair| pair[0] < pair[1]);
        ordered
            && self.color() != Some(Color::Red)
            && !self.has_double_red()
            && self.black_height().is_some()
    }
}

impl<V: Payload> RedBlackTree<V> {
    /// Owned copy of the current shape, paused or not.
    pub fn snapshot(&self) -> Subtree<V> {
        self.subtree_at(self.root_index)
    }

    fn subtree_at(&self, index: DataIndex) -> Subtree<V> {
        if self.is_sentinel::<V>(index) {
            return Subtree::Sentinel;
        }
        Subtree::node(
            *self.get_value::<V>(index),
            self.get_color::<V>(index),
            self.subtree_at(self.get_left_index::<V>(index)),
            self.subtree_at(self.get_right_index::<V>(index)),
        )
    }

    /// None unless the handle names a real node currently in the tree.
    pub fn view(&self, index: DataIndex) -> Option<NodeView<V>> {
        if !self.is_live_block(index) || self.is_sentinel::<V>(index) {
            return None;
        }
        Some(NodeView {
            index,
            value: *self.get_value::<V>(index),
            color: self.get_color::<V>(index),
            parent: self.get_parent_index::<V>(index),
        })
    }

    /// Real nodes in ascending order.
    pub fn in_order(&self) -> Vec<NodeView<V>> {
        let mut views: Vec<NodeView<V>> = Vec::with_capacity(self.len);
        let mut current_index: DataIndex = self.lookup_min_index::<V>();
        while current_index != NIL {
            if let Some(view) = self.view(current_index) {
                views.push(view);
            }
            current_index = self.get_next_higher_index::<V>(current_index);
        }
        views
    }

    /// Breadth first rows of the tree. Exactly `max_levels` rows, row `i`
    /// holding `2^i` slots. Positions under a sentinel are placeholders, and
    /// anything deeper than `max_levels` is cut off.
    pub fn level_order(&self, max_levels: usize) -> Vec<Vec<Slot<V>>> {
        let mut rows: Vec<Vec<Slot<V>>> = Vec::with_capacity(max_levels);
        let mut queue: VecDeque<(DataIndex, bool)> = VecDeque::new();
        queue.push_back((self.root_index, false));

        for level in 0..max_levels {
            let width: usize = 1 << level;
            let mut row: Vec<Slot<V>> = Vec::with_capacity(width);
            for _ in 0..width {
                let (index, is_left): (DataIndex, bool) = queue.pop_front().unwrap_or((NIL, false));
                if index == NIL {
                    row.push(Slot::Placeholder);
                    queue.push_back((NIL, true));
                    queue.push_back((NIL, false));
                } else if self.is_sentinel::<V>(index) {
                    row.push(Slot::Sentinel {
                        index,
                        parent: self.get_parent_index::<V>(index),
                        is_left,
                    });
                    queue.push_back((NIL, true));
                    queue.push_back((NIL, false));
                } else if let Some(view) = self.view(index) {
                    row.push(Slot::Node(view));
                    queue.push_back((self.get_left_index::<V>(index), true));
                    queue.push_back((self.get_right_index::<V>(index), false));
                }
            }
            rows.push(row);
        }
        rows
    }
}
