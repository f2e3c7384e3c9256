//! Rebalancing as discrete steps.
//!
//! Insert and delete never rebalance inline. They decide the first
//! [`FixupAction`] and hand it to the controller. In explain mode the action
//! is parked as the pending step and the call returns; `resume` performs it,
//! decides the next one and parks that. Otherwise the controller drains the
//! chain immediately, so one logical operation is one atomic transition.

use std::fmt::{self, Display};

use crate::{require, trace, DataIndex, Payload, RedBlackTree, TreeError, TreeResult};

/// Direction of a rotation. Rotating left lifts a right child over its
/// parent, rotating right lifts a left child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Rotation that lifts a child on the given side.
    pub fn lifting(child_is_left: bool) -> Self {
        if child_is_left {
            Direction::Right
        } else {
            Direction::Left
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
        }
    }
}

/// One atomic rebalancing step together with the nodes it acts on.
///
/// `node` is always the node under suspicion: the red node that may have a
/// red parent for the insert cases, the root of the subtree short one black
/// for the lack-of-black cases (possibly a sentinel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixupAction {
    /// A red root. Recolor it black.
    BlackenRoot { node: DataIndex },
    /// Nothing is violated, the operation is complete.
    Settled { node: DataIndex },
    /// Double red with a red uncle. Parent and uncle turn black, grandparent
    /// turns red and becomes the next suspect.
    RecolorAndMoveUp {
        node: DataIndex,
        parent: DataIndex,
        uncle: DataIndex,
        grandparent: DataIndex,
    },
    /// Double red on the inside with a black uncle. Rotate node over its
    /// parent so the pair lines up on the outside.
    RotateRedPairOutside {
        node: DataIndex,
        parent: DataIndex,
        direction: Direction,
    },
    /// Double red on the outside with a black uncle. Rotate the parent over
    /// the grandparent and swap their colors. Terminates.
    RotateAndSwapColors {
        node: DataIndex,
        parent: DataIndex,
        grandparent: DataIndex,
        direction: Direction,
    },
    /// Deleting a red leaf. Terminates.
    RemoveRedLeaf { node: DataIndex },
    /// Deleting a black node with a single red child. The child takes its
    /// place and turns black. Terminates.
    PromoteRedChild { node: DataIndex, child: DataIndex },
    /// Deleting a node with two children. Its value is replaced by the
    /// in-order predecessor, which is then spliced out.
    ReplaceWithPredecessor {
        node: DataIndex,
        predecessor: DataIndex,
    },
    /// Lack of black with a red sibling. Rotate the sibling up and swap
    /// colors with the parent so the sibling becomes black.
    RotateForBlackSibling {
        node: DataIndex,
        sibling: DataIndex,
        parent: DataIndex,
        sibling_is_left: bool,
        direction: Direction,
    },
    /// Lack of black with a black sibling whose outside child is red. Rotate
    /// the sibling up, it inherits the parent color and its new children go
    /// black. Terminates.
    RotateOutsideRed {
        node: DataIndex,
        sibling: DataIndex,
        parent: DataIndex,
        direction: Direction,
    },
    /// Lack of black with a black sibling whose only red child is on the
    /// inside. Rotate that child up over the sibling and swap their colors.
    RotateInsideRed {
        node: DataIndex,
        sibling: DataIndex,
        inside_child: DataIndex,
        sibling_is_left: bool,
        direction: Direction,
    },
    /// Lack of black under a red parent with a black sibling and no red
    /// nephew. Swap parent and sibling colors. Terminates.
    SwapParentSiblingColors {
        node: DataIndex,
        sibling: DataIndex,
        parent: DataIndex,
    },
    /// Lack of black under a black parent with a black sibling and no red
    /// nephew. Sibling turns red and the parent carries the shortfall.
    ColorSiblingRedAndMoveUp {
        node: DataIndex,
        sibling: DataIndex,
        parent: DataIndex,
    },
}

impl FixupAction {
    /// Short explanation shown while this step is pending.
    pub fn title(&self) -> String {
        match self {
            FixupAction::BlackenRoot { .. } => "Turn Root Black".to_string(),
            FixupAction::Settled { .. } => "No Additional Action Required".to_string(),
            FixupAction::RecolorAndMoveUp { .. } => "Red Alert - Recolor and Move Up".to_string(),
            FixupAction::RotateRedPairOutside { direction, .. } => {
                format!("Red Alert - {direction} Rotate Red Pair to Outside")
            }
            FixupAction::RotateAndSwapColors { direction, .. } => {
                format!("Red Alert - {direction} Rotate and Swap Colors")
            }
            FixupAction::RemoveRedLeaf { .. } => "Simply Remove the Red Node".to_string(),
            FixupAction::PromoteRedChild { .. } => {
                "Replace Parent with Red Child Turned Black".to_string()
            }
            FixupAction::ReplaceWithPredecessor { .. } => {
                "Replace Value with In-Order Predecessor to Get One Child".to_string()
            }
            FixupAction::RotateForBlackSibling { direction, .. } => {
                format!("Lack of Black - {direction} Rotate and Swap Colors to Get Black Sibling")
            }
            FixupAction::RotateOutsideRed { direction, .. } => {
                format!("Lack of Black - {direction} Rotate and Color New Children Black")
            }
            FixupAction::RotateInsideRed { direction, .. } => {
                format!("Lack of Black - {direction} Rotate and Swap Colors to Get Outside Red")
            }
            FixupAction::SwapParentSiblingColors { .. } => {
                "Lack of Black - Swap Colors of Parent and Sibling".to_string()
            }
            FixupAction::ColorSiblingRedAndMoveUp { .. } => {
                "Lack of Black - Color Sibling Red and Move Up".to_string()
            }
        }
    }

    /// Node under suspicion.
    pub fn node(&self) -> DataIndex {
        match *self {
            FixupAction::BlackenRoot { node }
            | FixupAction::Settled { node }
            | FixupAction::RecolorAndMoveUp { node, .. }
            | FixupAction::RotateRedPairOutside { node, .. }
            | FixupAction::RotateAndSwapColors { node, .. }
            | FixupAction::RemoveRedLeaf { node }
            | FixupAction::PromoteRedChild { node, .. }
            | FixupAction::ReplaceWithPredecessor { node, .. }
            | FixupAction::RotateForBlackSibling { node, .. }
            | FixupAction::RotateOutsideRed { node, .. }
            | FixupAction::RotateInsideRed { node, .. }
            | FixupAction::SwapParentSiblingColors { node, .. }
            | FixupAction::ColorSiblingRedAndMoveUp { node, .. } => node,
        }
    }

    /// Every node this step reads or mutates, suspect first.
    pub fn operands(&self) -> Vec<DataIndex> {
        match *self {
            FixupAction::BlackenRoot { node }
            | FixupAction::Settled { node }
            | FixupAction::RemoveRedLeaf { node } => vec![node],
            FixupAction::RecolorAndMoveUp {
                node,
                parent,
                uncle,
                grandparent,
            } => vec![node, parent, uncle, grandparent],
            FixupAction::RotateRedPairOutside { node, parent, .. } => vec![node, parent],
            FixupAction::RotateAndSwapColors {
                node,
                parent,
                grandparent,
                ..
            } => vec![node, parent, grandparent],
            FixupAction::PromoteRedChild { node, child } => vec![node, child],
            FixupAction::ReplaceWithPredecessor { node, predecessor } => vec![node, predecessor],
            FixupAction::RotateForBlackSibling {
                node,
                sibling,
                parent,
                ..
            }
            | FixupAction::RotateOutsideRed {
                node,
                sibling,
                parent,
                ..
            }
            | FixupAction::SwapParentSiblingColors {
                node,
                sibling,
                parent,
            }
            | FixupAction::ColorSiblingRedAndMoveUp {
                node,
                sibling,
                parent,
            } => vec![node, sibling, parent],
            FixupAction::RotateInsideRed {
                node,
                sibling,
                inside_child,
                ..
            } => vec![node, sibling, inside_child],
        }
    }

    /// Rotation performed by this step, if any.
    pub fn direction(&self) -> Option<Direction> {
        match *self {
            FixupAction::RotateRedPairOutside { direction, .. }
            | FixupAction::RotateAndSwapColors { direction, .. }
            | FixupAction::RotateForBlackSibling { direction, .. }
            | FixupAction::RotateOutsideRed { direction, .. }
            | FixupAction::RotateInsideRed { direction, .. } => Some(direction),
            _ => None,
        }
    }

    /// Steps after which no further checking is needed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FixupAction::BlackenRoot { .. }
                | FixupAction::Settled { .. }
                | FixupAction::RotateAndSwapColors { .. }
                | FixupAction::RemoveRedLeaf { .. }
                | FixupAction::PromoteRedChild { .. }
                | FixupAction::RotateOutsideRed { .. }
                | FixupAction::SwapParentSiblingColors { .. }
        )
    }
}

impl Display for FixupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl<V: Payload> RedBlackTree<V> {
    /// Step waiting for `resume`, if an operation is paused.
    pub fn pending(&self) -> Option<&FixupAction> {
        self.pending.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_explaining(&self) -> bool {
        self.config.explain
    }

    /// Turn explain mode on or off. Takes effect at the next decided step,
    /// a step already pending stays pending.
    pub fn set_explain(&mut self, explain: bool) {
        self.config.explain = explain;
    }

    /// Perform the pending step and decide the next one. Returns the new
    /// pending step, `None` once the operation has settled.
    pub fn resume(&mut self) -> TreeResult<Option<FixupAction>> {
        let action: Option<FixupAction> = self.pending.take();
        require(
            action.is_some(),
            TreeError::NothingPending,
            "Resume without a paused operation",
        )?;
        if let Some(next) = action.and_then(|action| self.apply(action)) {
            self.schedule(next);
        }
        Ok(self.pending)
    }

    /// Run the paused operation to completion without further pauses.
    /// Returns the number of steps performed.
    pub fn finish(&mut self) -> usize {
        let mut steps: usize = 0;
        let mut next: Option<FixupAction> = self.pending.take();
        while let Some(action) = next {
            next = self.apply(action);
            steps += 1;
        }
        steps
    }

    pub(crate) fn require_idle(&self) -> TreeResult {
        require(
            self.pending.is_none(),
            TreeError::OperationPending,
            "Operation still paused mid-fixup",
        )
    }

    /// Park the action when explaining, otherwise run the whole chain now.
    pub(crate) fn schedule(&mut self, action: FixupAction) {
        trace!("STEP decided {action}");
        if self.config.explain {
            self.pending = Some(action);
            return;
        }
        let mut next: Option<FixupAction> = Some(action);
        while let Some(action) = next {
            next = self.apply(action);
        }
    }

    /// Perform exactly one step. Returns the next step when the action needs
    /// more checking.
    pub(crate) fn apply(&mut self, action: FixupAction) -> Option<FixupAction> {
        trace!("STEP apply {action} on {:?}", action.operands());
        match action {
            FixupAction::BlackenRoot { node } => {
                self.blacken_root(node);
                None
            }
            FixupAction::Settled { .. } => None,
            FixupAction::RecolorAndMoveUp {
                parent,
                uncle,
                grandparent,
                ..
            } => Some(self.recolor_and_move_up(parent, uncle, grandparent)),
            FixupAction::RotateRedPairOutside {
                node,
                parent,
                direction,
            } => Some(self.rotate_red_pair_outside(node, parent, direction)),
            FixupAction::RotateAndSwapColors {
                parent,
                grandparent,
                direction,
                ..
            } => {
                self.rotate_and_swap_colors(parent, grandparent, direction);
                None
            }
            FixupAction::RemoveRedLeaf { node } | FixupAction::PromoteRedChild { node, .. } => {
                self.splice_out(node)
            }
            FixupAction::ReplaceWithPredecessor { node, predecessor } => {
                self.replace_with_predecessor(node, predecessor)
            }
            FixupAction::RotateForBlackSibling {
                node,
                sibling,
                parent,
                direction,
                ..
            } => Some(self.rotate_for_black_sibling(node, sibling, parent, direction)),
            FixupAction::RotateOutsideRed {
                sibling,
                parent,
                direction,
                ..
            } => {
                self.rotate_outside_red(sibling, parent, direction);
                None
            }
            FixupAction::RotateInsideRed {
                node,
                sibling,
                inside_child,
                direction,
                ..
            } => Some(self.rotate_inside_red(node, sibling, inside_child, direction)),
            FixupAction::SwapParentSiblingColors { sibling, parent, .. } => {
                self.swap_parent_sibling_colors(sibling, parent);
                None
            }
            FixupAction::ColorSiblingRedAndMoveUp { sibling, parent, .. } => {
                Some(self.color_sibling_red_and_move_up(sibling, parent))
            }
        }
    }
}
