//! Read-only verification descent (spec §4.6): recompute hashes down the
//! path to a key and compare the stored leaf value in constant time, so a
//! hostile backing store cannot learn anything from verify's timing.

use accel_bridge::PageHasher;
use subtle::ConstantTimeEq;

use crate::error::IntegrityFailure;

use super::node::NodeId;
use super::ops::find_child_index;
use super::pool::NodePool;

fn hash_matches<H: PageHasher>(pool: &NodePool, node_id: NodeId, hasher: &H) -> bool {
    let node = pool.get(node_id);
    let valid = node.valid_num;
    let recomputed = if node.is_leaf() {
        let values = node.leaf_values();
        let refs: Vec<&[u8]> = values[..valid].iter().map(|v| v.as_slice()).collect();
        hasher.hash(&refs)
    } else {
        let children = node.children()[..valid].to_vec();
        let child_hashes: Vec<[u8; 32]> = children.iter().map(|&c| pool.get(c).hash).collect();
        let refs: Vec<&[u8]> = child_hashes.iter().map(|h| h.as_slice()).collect();
        hasher.hash(&refs)
    };
    bool::from(recomputed[..].ct_eq(&node.hash[..]))
}

/// Walk the root-to-leaf path for `key`, recomputing and checking every
/// hash along the way, then compare the leaf's stored value against
/// `expected` without leaking which byte differed (spec §4.6).
pub(crate) fn verify<H: PageHasher>(
    pool: &NodePool,
    root_id: NodeId,
    hasher: &H,
    key: u64,
    expected: &[u8; 32],
) -> Result<(), IntegrityFailure> {
    if !hash_matches(pool, root_id, hasher) {
        return Err(IntegrityFailure::RootMismatch);
    }

    let mut cur = root_id;
    loop {
        let node = pool.get(cur);
        if node.is_leaf() {
            let pos = (0..node.valid_num).find(|&i| node.pivots[i] == key);
            let Some(pos) = pos else {
                return Err(IntegrityFailure::KeyAbsent);
            };
            let stored = &node.leaf_values()[pos];
            return if bool::from(stored[..].ct_eq(&expected[..])) {
                Ok(())
            } else {
                Err(IntegrityFailure::LeafMismatch)
            };
        }

        let idx = find_child_index(node, key);
        let child = node.children()[idx];
        if !hash_matches(pool, child, hasher) {
            return Err(IntegrityFailure::InternalMismatch);
        }
        cur = child;
    }
}
