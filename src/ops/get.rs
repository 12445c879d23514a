//! Lookup: follow the slot path until a leaf or an empty slot.

use archery::SharedPointerKind;

use crate::hash::{self, HashKey, HashWidth};
use crate::ops::descend_past_max;
use crate::table::{Pointer, Table};

/// Searches for `key` in the subtree rooted at `table`.
pub(crate) fn get_recursive<'a, K, V, W, P>(
    table: &'a Table<K, V, P>,
    hash: u64,
    key: &K,
    depth: usize,
) -> Option<&'a V>
where
    K: HashKey,
    W: HashWidth,
    P: SharedPointerKind,
{
    let slot = hash::slot::<W>(hash, depth);
    match table.get(slot)? {
        Pointer::Leaf(leaf) => leaf.get(hash, key),
        Pointer::Table(child) => {
            if depth == W::MAX_DEPTH {
                descend_past_max::<W>(table.hash_path(), depth, slot);
            }
            get_recursive::<K, V, W, P>(child, hash, key, depth + 1)
        }
    }
}
