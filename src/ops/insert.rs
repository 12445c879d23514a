//! Insertion: path-copy put, splitting leaves into sub-tables on hash
//! divergence.

use archery::{SharedPointer, SharedPointerKind};

use crate::config::Config;
use crate::hash::{self, HashKey, HashWidth};
use crate::leaf::Leaf;
use crate::ops::descend_past_max;
use crate::table::{Pointer, Table};

/// Outcome of a recursive insert.
pub(crate) struct InsertOutcome<K, V, P: SharedPointerKind> {
    /// Rebuilt table for the parent slot.
    pub(crate) table: Table<K, V, P>,
    /// `true` if a new key went in, `false` if an existing value was
    /// replaced.
    pub(crate) added: bool,
}

/// Inserts `key`/`value` into the subtree rooted at `table` via path copy.
pub(crate) fn insert_recursive<K, V, W, P>(
    table: &Table<K, V, P>,
    hash: u64,
    key: K,
    value: V,
    depth: usize,
    config: &Config,
) -> InsertOutcome<K, V, P>
where
    K: HashKey + Clone,
    V: Clone,
    W: HashWidth,
    P: SharedPointerKind,
{
    let slot = hash::slot::<W>(hash, depth);
    match table.get(slot) {
        // Empty slot: a fresh flat leaf goes in.
        None => InsertOutcome {
            table: table.insert(slot, Pointer::flat(hash, key, value), W::CAPACITY, config),
            added: true,
        },
        Some(Pointer::Leaf(existing)) => {
            if existing.hash() == hash
                && (depth == W::MAX_DEPTH || existing.get(hash, &key).is_some())
            {
                // Replace in place, or extend the collision leaf at the
                // deepest level.
                let (leaf, added) = existing.put(hash, key, value);
                InsertOutcome {
                    table: table.replace(slot, Pointer::leaf(leaf)),
                    added,
                }
            } else {
                // Distinct key above the deepest level: both leaves move
                // into a sub-table spanning their shared path prefix.
                let existing = SharedPointer::clone(existing);
                let sub = split_leaf::<K, V, W, P>(existing, hash, key, value, depth + 1, config);
                InsertOutcome {
                    table: table.replace(slot, Pointer::table(sub)),
                    added: true,
                }
            }
        }
        Some(Pointer::Table(child)) => {
            if depth == W::MAX_DEPTH {
                descend_past_max::<W>(table.hash_path(), depth, slot);
            }
            let outcome = insert_recursive::<K, V, W, P>(child, hash, key, value, depth + 1, config);
            InsertOutcome {
                table: table.replace(slot, Pointer::table(outcome.table)),
                added: outcome.added,
            }
        }
    }
}

/// Builds the sub-table chain holding an evicted leaf and a new pair.
///
/// Descends one level at a time. The first level where the two hashes pick
/// different slots gets a two-child table and ends the chain; levels where
/// they agree get a single-child table wrapping the next level. Reaching the
/// deepest level without a split means the full-width hashes are equal, and
/// the leaf's own `put` combines both into a collision leaf there.
fn split_leaf<K, V, W, P>(
    existing: SharedPointer<Leaf<K, V>, P>,
    hash: u64,
    key: K,
    value: V,
    depth: usize,
    config: &Config,
) -> Table<K, V, P>
where
    K: HashKey + Clone,
    V: Clone,
    W: HashWidth,
    P: SharedPointerKind,
{
    let path = hash::path_of::<W>(hash, depth);
    let slot_existing = hash::slot::<W>(existing.hash(), depth);
    let slot_new = hash::slot::<W>(hash, depth);

    if slot_existing != slot_new {
        Table::with_pair(
            path,
            slot_existing,
            Pointer::Leaf(existing),
            slot_new,
            Pointer::flat(hash, key, value),
            W::CAPACITY,
            config,
        )
    } else if depth == W::MAX_DEPTH {
        let (leaf, _) = existing.put(hash, key, value);
        Table::with_child(path, slot_new, Pointer::leaf(leaf), W::CAPACITY, config)
    } else {
        let child = split_leaf::<K, V, W, P>(existing, hash, key, value, depth + 1, config);
        Table::with_child(path, slot_new, Pointer::table(child), W::CAPACITY, config)
    }
}
