//! Node-pool arena for the B+ Merkle tree (spec §4.4): nodes are allocated
//! in page-sized chunks and never individually freed.

use std::collections::VecDeque;

use crate::error::PagingError;

use super::node::{Node, NodeId};

/// Bookkeeping for one page-sized chunk of the arena.
#[derive(Debug)]
struct Chunk {
    base: usize,
    capacity: usize,
    used: usize,
}

/// Flat arena of [`Node`]s, grown one page-sized chunk at a time.
///
/// Nodes are never freed individually — the whole point of chunked growth
/// is that the pool only needs to track which *chunks* still have spare
/// slots, not which individual nodes are live (spec §4.4, "no per-node
/// deallocation"). A chunk drops off the free list once its last slot is
/// handed out, mirroring the reference's lazy unlink-on-exhaustion.
pub(crate) struct NodePool {
    nodes: Vec<Node>,
    chunks: Vec<Chunk>,
    free_chunks: VecDeque<usize>,
    fanout: usize,
    nodes_per_chunk: usize,
}

impl NodePool {
    /// `nodes_per_chunk` is a layout target (the reference packs 8 nodes
    /// per 4 KiB page at ~320 bytes each) rather than a correctness
    /// requirement — any positive chunk size yields the same tree shape.
    pub(crate) fn new(fanout: usize, nodes_per_chunk: usize) -> Self {
        Self {
            nodes: Vec::new(),
            chunks: Vec::new(),
            free_chunks: VecDeque::new(),
            fanout,
            nodes_per_chunk: nodes_per_chunk.max(1),
        }
    }

    fn alloc_chunk(&mut self) {
        let base = self.nodes.len();
        self.nodes.reserve(self.nodes_per_chunk);
        self.chunks.push(Chunk { base, capacity: self.nodes_per_chunk, used: 0 });
        self.free_chunks.push_back(self.chunks.len() - 1);
    }

    /// Allocate a blank leaf node, growing the arena with a fresh chunk if
    /// every existing chunk is full.
    pub(crate) fn alloc_leaf(&mut self) -> Result<NodeId, PagingError> {
        self.alloc(Node::empty_leaf(self.fanout))
    }

    /// Allocate a blank internal node whose children all start out pointing
    /// at `placeholder_child` (overwritten by the caller immediately).
    pub(crate) fn alloc_internal(&mut self, placeholder_child: NodeId) -> Result<NodeId, PagingError> {
        self.alloc(Node::empty_internal(self.fanout, placeholder_child))
    }

    fn alloc(&mut self, node: Node) -> Result<NodeId, PagingError> {
        loop {
            let Some(&chunk_idx) = self.free_chunks.front() else {
                self.alloc_chunk();
                continue;
            };
            let chunk = &mut self.chunks[chunk_idx];
            if chunk.used >= chunk.capacity {
                self.free_chunks.pop_front();
                continue;
            }
            let id = NodeId((chunk.base + chunk.used) as u32);
            chunk.used += 1;
            if chunk.used >= chunk.capacity {
                self.free_chunks.pop_front();
            }
            self.nodes.push(node);
            debug_assert_eq!(self.nodes.len() - 1, id.0 as usize);
            return Ok(id);
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> &Node { &self.nodes[id.0 as usize] }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node { &mut self.nodes[id.0 as usize] }
}
