//! Insert path for the B+ Merkle tree (spec §4.5): descend to a leaf,
//! insert or update, then fix up ancestors bottom-up — redistributing with
//! a sibling before splitting, and splitting the root in place so its
//! address never changes.

use accel_bridge::PageHasher;

use crate::error::PagingError;

use super::node::{Node, NodeId};
use super::pool::NodePool;

/// Recompute and store `node_id`'s hash from its current contents: the
/// concatenation of live values (leaf) or live children's hashes
/// (internal), per spec §4.4.
fn recompute_hash<H: PageHasher>(pool: &mut NodePool, node_id: NodeId, hasher: &H) {
    let node = pool.get(node_id);
    let valid = node.valid_num;
    let hash = if node.is_leaf() {
        let values = node.leaf_values();
        let refs: Vec<&[u8]> = values[..valid].iter().map(|v| v.as_slice()).collect();
        hasher.hash(&refs)
    } else {
        let children = node.children()[..valid].to_vec();
        let child_hashes: Vec<[u8; 32]> = children.iter().map(|&c| pool.get(c).hash).collect();
        let refs: Vec<&[u8]> = child_hashes.iter().map(|h| h.as_slice()).collect();
        hasher.hash(&refs)
    };
    pool.get_mut(node_id).hash = hash;
}

/// Index of the child whose subtree covers `key`: the largest `i` with
/// `pivots[i] <= key`.
pub(crate) fn find_child_index(node: &Node, key: u64) -> usize {
    let valid = node.valid_num;
    if valid == 0 {
        return 0;
    }
    let mut idx = 0;
    for i in 1..valid {
        if node.pivots[i] <= key {
            idx = i;
        } else {
            break;
        }
    }
    idx
}

/// Position in `[0, valid_num]` where `key` belongs among a leaf's ascending
/// pivots.
fn find_insert_pos(node: &Node, key: u64) -> usize {
    let valid = node.valid_num;
    (0..valid).find(|&i| node.pivots[i] >= key).unwrap_or(valid)
}

/// The path from the root down to the leaf that would hold `key`: each
/// entry is `(node, index within its parent's children)` — the root's own
/// index is unused.
fn descend(pool: &NodePool, root_id: NodeId, key: u64) -> Vec<(NodeId, usize)> {
    let mut path = vec![(root_id, 0usize)];
    loop {
        let (cur, _) = *path.last().unwrap();
        let node = pool.get(cur);
        if node.is_leaf() {
            break;
        }
        let idx = find_child_index(node, key);
        path.push((node.children()[idx], idx));
    }
    path
}

/// Move `from`'s last (largest) entry onto the front of `to`. Returns `to`'s
/// new minimum key, for the caller to publish into the shared parent's
/// pivot table.
fn move_last_to_front<H: PageHasher>(pool: &mut NodePool, from_id: NodeId, to_id: NodeId, hasher: &H) -> u64 {
    let n = pool.get(from_id).valid_num;
    let key = pool.get(from_id).pivots[n - 1];
    if pool.get(from_id).is_leaf() {
        let (_, value) = pool.get_mut(from_id).leaf_remove_at(n - 1);
        pool.get_mut(to_id).leaf_insert_at(0, key, value);
    } else {
        let child = pool.get_mut(from_id).child_remove_at(n - 1);
        pool.get_mut(to_id).child_insert_at(0, key, child);
    }
    recompute_hash(pool, from_id, hasher);
    recompute_hash(pool, to_id, hasher);
    key
}

/// Move `from`'s first (smallest) entry onto the end of `to`. Returns
/// `from`'s new minimum key, for the caller to publish into the shared
/// parent's pivot table.
fn move_first_to_last<H: PageHasher>(pool: &mut NodePool, from_id: NodeId, to_id: NodeId, hasher: &H) -> u64 {
    let key = pool.get(from_id).pivots[0];
    let to_n = pool.get(to_id).valid_num;
    if pool.get(from_id).is_leaf() {
        let (_, value) = pool.get_mut(from_id).leaf_remove_at(0);
        pool.get_mut(to_id).leaf_insert_at(to_n, key, value);
    } else {
        let child = pool.get_mut(from_id).child_remove_at(0);
        pool.get_mut(to_id).child_insert_at(to_n, key, child);
    }
    recompute_hash(pool, from_id, hasher);
    recompute_hash(pool, to_id, hasher);
    pool.get(from_id).pivots[0]
}

/// Split an overfull node (`valid_num == fanout + 1`) in half, moving the
/// upper half into a freshly allocated sibling. Returns the sibling and its
/// minimum key, for the caller to link into the parent.
fn split_node<H: PageHasher>(
    pool: &mut NodePool,
    node_id: NodeId,
    fanout: usize,
    hasher: &H,
) -> Result<(NodeId, u64), PagingError> {
    let total = pool.get(node_id).valid_num;
    let mid = total / 2;
    let is_leaf = pool.get(node_id).is_leaf();

    let new_id = if is_leaf {
        pool.alloc_leaf()?
    } else {
        let placeholder = pool.get(node_id).children()[0];
        pool.alloc_internal(placeholder)?
    };

    for i in 0..(total - mid) {
        if is_leaf {
            let (k, v) = pool.get_mut(node_id).leaf_remove_at(mid);
            pool.get_mut(new_id).leaf_insert_at(i, k, v);
        } else {
            let k = pool.get(node_id).pivots[mid];
            let child = pool.get_mut(node_id).child_remove_at(mid);
            pool.get_mut(new_id).child_insert_at(i, k, child);
        }
    }

    recompute_hash(pool, node_id, hasher);
    recompute_hash(pool, new_id, hasher);
    let sibling_min = pool.get(new_id).pivots[0];
    Ok((new_id, sibling_min))
}

/// Split the root in place: peel its upper half into a new sibling node,
/// copy its (now lower-half) remainder into a second new node, then
/// rewrite the root's own slot as a fresh two-child internal node. The
/// root's [`NodeId`] never changes (spec §4.5, §9).
fn split_root_in_place<H: PageHasher>(
    pool: &mut NodePool,
    root_id: NodeId,
    fanout: usize,
    hasher: &H,
) -> Result<(), PagingError> {
    let is_leaf = pool.get(root_id).is_leaf();
    let (sibling_id, sibling_min) = split_node(pool, root_id, fanout, hasher)?;

    let a_id = if is_leaf {
        pool.alloc_leaf()?
    } else {
        let placeholder = pool.get(root_id).children()[0];
        pool.alloc_internal(placeholder)?
    };

    let remaining = pool.get(root_id).valid_num;
    for i in 0..remaining {
        if is_leaf {
            let (k, v) = pool.get_mut(root_id).leaf_remove_at(0);
            pool.get_mut(a_id).leaf_insert_at(i, k, v);
        } else {
            let k = pool.get(root_id).pivots[0];
            let child = pool.get_mut(root_id).child_remove_at(0);
            pool.get_mut(a_id).child_insert_at(i, k, child);
        }
    }
    recompute_hash(pool, a_id, hasher);
    let a_min = pool.get(a_id).pivots[0];

    *pool.get_mut(root_id) = Node::empty_internal(fanout, a_id);
    pool.get_mut(root_id).child_insert_at(0, a_min, a_id);
    pool.get_mut(root_id).child_insert_at(1, sibling_min, sibling_id);
    recompute_hash(pool, root_id, hasher);
    Ok(())
}

/// Resolve overflow at `path[i]`, if any: redistribute one entry with a
/// sibling through `path[i - 1]` when one has room, otherwise split. The
/// root (`i == 0`) has no sibling to redistribute with, so it always
/// splits in place instead of propagating further (spec §4.5, "only the
/// root can take the in-place split branch").
fn resolve_overflow<H: PageHasher>(
    pool: &mut NodePool,
    path: &[(NodeId, usize)],
    i: usize,
    fanout: usize,
    hasher: &H,
) -> Result<Option<(NodeId, u64)>, PagingError> {
    let node_id = path[i].0;
    if pool.get(node_id).valid_num <= fanout {
        return Ok(None);
    }
    if i == 0 {
        split_root_in_place(pool, node_id, fanout, hasher)?;
        return Ok(None);
    }

    let parent_id = path[i - 1].0;
    let my_idx = path[i].1;
    let parent_valid = pool.get(parent_id).valid_num;

    if my_idx > 0 {
        let left_id = pool.get(parent_id).children()[my_idx - 1];
        if pool.get(left_id).valid_num < fanout {
            let new_min = move_first_to_last(pool, node_id, left_id, hasher);
            pool.get_mut(parent_id).pivots[my_idx] = new_min;
            recompute_hash(pool, parent_id, hasher);
            return Ok(None);
        }
    }
    if my_idx + 1 < parent_valid {
        let right_id = pool.get(parent_id).children()[my_idx + 1];
        if pool.get(right_id).valid_num < fanout {
            let new_min = move_last_to_front(pool, node_id, right_id, hasher);
            pool.get_mut(parent_id).pivots[my_idx + 1] = new_min;
            recompute_hash(pool, parent_id, hasher);
            return Ok(None);
        }
    }

    let (sibling_id, sibling_min) = split_node(pool, node_id, fanout, hasher)?;
    Ok(Some((sibling_id, sibling_min)))
}

/// Insert `(key, value)`, or overwrite `value` if `key` is already present
/// (spec §4.5: "update semantics").
pub(crate) fn insert<H: PageHasher>(
    pool: &mut NodePool,
    root_id: NodeId,
    fanout: usize,
    hasher: &H,
    key: u64,
    value: [u8; 32],
) -> Result<(), PagingError> {
    let path = descend(pool, root_id, key);
    let leaf_id = path.last().unwrap().0;

    let pos = find_insert_pos(pool.get(leaf_id), key);
    let exists = pos < pool.get(leaf_id).valid_num && pool.get(leaf_id).pivots[pos] == key;

    if exists {
        pool.get_mut(leaf_id).leaf_values_mut()[pos] = value;
        recompute_hash(pool, leaf_id, hasher);
        for &(ancestor, _) in path[..path.len() - 1].iter().rev() {
            recompute_hash(pool, ancestor, hasher);
        }
        return Ok(());
    }

    pool.get_mut(leaf_id).leaf_insert_at(pos, key, value);
    recompute_hash(pool, leaf_id, hasher);

    let mut pending = resolve_overflow(pool, &path, path.len() - 1, fanout, hasher)?;

    for i in (0..path.len() - 1).rev() {
        let node_id = path[i].0;
        let mut changed = false;

        if let Some((sib_id, sib_min)) = pending.take() {
            let child_idx = path[i + 1].1;
            pool.get_mut(node_id).child_insert_at(child_idx + 1, sib_min, sib_id);
            changed = true;
        }

        let child_idx = path[i + 1].1;
        let child_id = path[i + 1].0;
        let child_min = pool.get(child_id).pivots[0];
        if pool.get(node_id).pivots[child_idx] != child_min {
            pool.get_mut(node_id).pivots[child_idx] = child_min;
            changed = true;
        }

        if changed {
            recompute_hash(pool, node_id, hasher);
        }

        pending = resolve_overflow(pool, &path, i, fanout, hasher)?;
    }

    debug_assert!(pending.is_none(), "overflow must not escape the root");
    Ok(())
}
