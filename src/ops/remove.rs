//! Removal: path-copy delete with canonical collapse of one-leaf tables.

use archery::SharedPointerKind;

use crate::config::Config;
use crate::hash::{self, HashKey, HashWidth};
use crate::ops::descend_past_max;
use crate::table::{Pointer, Table};

/// Outcome of a recursive remove.
pub(crate) enum RemoveOutcome<K, V, P: SharedPointerKind> {
    /// Key absent; the trie is unchanged.
    NotFound,
    /// Key removed.
    Removed {
        /// Rebuilt table for the parent slot, or `None` when the subtree
        /// emptied out.
        table: Option<Table<K, V, P>>,
        /// The removed value.
        value: V,
    },
}

/// Removes `key` from the subtree rooted at `table` via path copy.
///
/// A rebuilt child table left holding a single flat leaf is collapsed into
/// this table's slot, keeping delete shapes canonical; the cascade continues
/// upward as each frame unwinds. Tables whose sole child is a collision leaf
/// stay where they are.
pub(crate) fn remove_recursive<K, V, W, P>(
    table: &Table<K, V, P>,
    hash: u64,
    key: &K,
    depth: usize,
    config: &Config,
) -> RemoveOutcome<K, V, P>
where
    K: HashKey + Clone,
    V: Clone,
    W: HashWidth,
    P: SharedPointerKind,
{
    let slot = hash::slot::<W>(hash, depth);
    let Some(child) = table.get(slot) else {
        return RemoveOutcome::NotFound;
    };
    match child {
        Pointer::Leaf(leaf) => match leaf.del(hash, key) {
            None => RemoveOutcome::NotFound,
            Some((Some(survivor), value)) => RemoveOutcome::Removed {
                table: Some(table.replace(slot, Pointer::leaf(survivor))),
                value,
            },
            Some((None, value)) => RemoveOutcome::Removed {
                table: table.remove(slot, config),
                value,
            },
        },
        Pointer::Table(nested) => {
            if depth == W::MAX_DEPTH {
                descend_past_max::<W>(table.hash_path(), depth, slot);
            }
            match remove_recursive::<K, V, W, P>(nested, hash, key, depth + 1, config) {
                RemoveOutcome::NotFound => RemoveOutcome::NotFound,
                RemoveOutcome::Removed { table: None, value } => RemoveOutcome::Removed {
                    table: table.remove(slot, config),
                    value,
                },
                RemoveOutcome::Removed {
                    table: Some(rebuilt),
                    value,
                } => {
                    let collapsed = rebuilt.single_flat_leaf().cloned();
                    let child = match collapsed {
                        Some(leaf) => Pointer::Leaf(leaf),
                        None => Pointer::table(rebuilt),
                    };
                    RemoveOutcome::Removed {
                        table: Some(table.replace(slot, child)),
                        value,
                    }
                }
            }
        }
    }
}
