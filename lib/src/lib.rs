//! Red-black tree over a byte arena, with every rebalancing step exposed.
//!
//! Leaf positions are explicit black sentinel nodes. Insert and delete
//! decide a chain of [`FixupAction`]s; in explain mode the tree pauses before
//! each one until [`RedBlackTree::resume`] is called.

pub use config::*;
pub use domain::*;
pub use error::*;
pub use free_list::*;
pub use node::*;
pub use red_black_tree::*;
pub use snapshot::*;
pub use step::*;
pub use tree::*;
pub use utils::*;

pub mod config;
pub mod constants;
mod delete;
pub mod domain;
pub mod error;
pub mod free_list;
mod insert;
pub mod node;
pub mod red_black_tree;
pub mod snapshot;
pub mod step;
pub mod tree;
pub mod utils;
