//! B+ Merkle tree over backing-page addresses (spec §3, §4.4–§4.6): a
//! fan-out-`D` index tree whose leaves carry content hashes and whose root
//! address is fixed for the tree's lifetime.

mod node;
mod ops;
mod pool;
mod tree;
mod verify;

pub use node::NodeId;
pub use tree::Tree;
