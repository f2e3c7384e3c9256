use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;
use std::{cmp::Ordering, fmt::Debug, fmt::Display, mem::size_of};

use crate::{DataIndex, Get, PodBool};

/// Handle for "no node": the parent of the root and the children of a
/// sentinel.
pub const NIL: DataIndex = DataIndex::MAX;

/// Bytes of every node spent on links, color and the sentinel flag.
pub const RBTREE_OVERHEAD_BYTES: usize = 16;

/// Values stored in the tree. Nodes live in an 8 byte aligned arena, so the
/// value alignment must not exceed 8.
pub trait Payload: Zeroable + Pod + PartialOrd + Ord + PartialEq + Eq + Display + Debug {}
impl<T: Zeroable + Pod + PartialOrd + Ord + PartialEq + Eq + Display + Debug> Payload for T {}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub enum Color {
    #[default]
    Black = 0,
    Red = 1,
}
unsafe impl Zeroable for Color {}

impl Color {
    pub fn is_red(&self) -> bool {
        *self == Color::Red
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Black => write!(f, "B"),
            Color::Red => write!(f, "R"),
        }
    }
}

#[derive(Debug, Default, Copy, Clone, Zeroable)]
#[repr(C)]
/// Node in a RedBlack tree. The first 16 bytes are used for maintaining the
/// RedBlack and BST properties, the rest is the payload.
///
/// Leaf positions hold sentinel nodes: black, `sentinel` set, both children
/// NIL and a zeroed value. Parent is a non-owning back-reference.
pub struct RBNode<V> {
    pub(crate) left: DataIndex,
    pub(crate) right: DataIndex,
    pub(crate) parent: DataIndex,
    pub(crate) color: Color,
    pub(crate) sentinel: PodBool,

    pub(crate) _unused_padding: u16,
    pub(crate) value: V,
}
// Sound only for payloads that leave no padding, which with_config asserts.
unsafe impl<V: Payload> Pod for RBNode<V> {}
impl<V: Payload> Get for RBNode<V> {}

const_assert_eq!(size_of::<RBNode<u32>>(), RBTREE_OVERHEAD_BYTES + 4);
const_assert_eq!(size_of::<RBNode<u64>>(), RBTREE_OVERHEAD_BYTES + 8);
const_assert_eq!(size_of::<RBNode<i32>>(), RBTREE_OVERHEAD_BYTES + 4);
const_assert_eq!(size_of::<RBNode<i64>>(), RBTREE_OVERHEAD_BYTES + 8);

impl<V: Payload> RBNode<V> {
    /// A freshly inserted node, red and not yet linked.
    pub(crate) fn new_red(value: V) -> Self {
        RBNode {
            left: NIL,
            right: NIL,
            parent: NIL,
            color: Color::Red,
            sentinel: PodBool::from_bool(false),
            _unused_padding: 0,
            value,
        }
    }

    pub(crate) fn new_sentinel(parent: DataIndex) -> Self {
        RBNode {
            left: NIL,
            right: NIL,
            parent,
            color: Color::Black,
            sentinel: PodBool::from_bool(true),
            _unused_padding: 0,
            value: V::zeroed(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.sentinel.is_true()
    }
    pub fn get_color(&self) -> Color {
        self.color
    }
    pub fn get_value(&self) -> &V {
        &self.value
    }
}

impl<V: Payload> Ord for RBNode<V> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.value).cmp(&(other.value))
    }
}

impl<V: Payload> PartialOrd for RBNode<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V: Payload> PartialEq for RBNode<V> {
    fn eq(&self, other: &Self) -> bool {
        (self.value) == (other.value)
    }
}

impl<V: Payload> Eq for RBNode<V> {}

impl<V: Payload> Display for RBNode<V> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        if self.is_sentinel() {
            write!(fmt, "nil")
        } else {
            write!(fmt, "{}", self.value)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_color_default() {
        assert_eq!(Color::default(), Color::Black);
        assert_eq!(Color::zeroed(), Color::Black);
    }

    #[test]
    fn test_sentinel_node() {
        let sentinel: RBNode<u32> = RBNode::new_sentinel(48);
        assert!(sentinel.is_sentinel());
        assert_eq!(sentinel.get_color(), Color::Black);
        assert_eq!(sentinel.parent, 48);
        assert_eq!(sentinel.left, NIL);
        assert_eq!(format!("{sentinel}"), "nil");

        let node: RBNode<u32> = RBNode::new_red(500);
        assert!(!node.is_sentinel());
        assert!(node.get_color().is_red());
        assert_eq!(format!("{node}"), "500");
    }

    #[test]
    fn test_node_equality() {
        let a: RBNode<u64> = RBNode::new_red(7);
        let mut b: RBNode<u64> = RBNode::new_red(7);
        b.color = Color::Black;
        assert_eq!(a, b);
        assert!(RBNode::<u64>::new_red(3) < a);
    }
}
