//! Leaf variants: flat (exactly one pair) and collision (two or more pairs
//! sharing one full-width hash).

/// Terminal trie node.
///
/// A flat leaf may sit at any depth. A collision leaf only ever sits at the
/// deepest level, because its entries agree on every slot index; the driver
/// enforces this by splitting shallower leaves into sub-tables instead.
pub(crate) enum Leaf<K, V> {
    /// One key-value pair, tagged with the key's folded hash.
    Flat {
        /// Folded hash of `key`.
        hash: u64,
        /// The key.
        key: K,
        /// The value.
        value: V,
    },
    /// Two or more pairs whose keys share the same folded hash.
    ///
    /// Invariant: `entries.len() >= 2`, no two entries have equal keys.
    Collision {
        /// The shared folded hash.
        hash: u64,
        /// The colliding pairs, unordered.
        entries: Vec<(K, V)>,
    },
}

impl<K, V> Leaf<K, V> {
    /// The folded hash every entry of this leaf shares.
    pub(crate) const fn hash(&self) -> u64 {
        match self {
            Self::Flat { hash, .. } | Self::Collision { hash, .. } => *hash,
        }
    }

    /// Number of pairs stored in this leaf.
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Flat { .. } => 1,
            Self::Collision { entries, .. } => entries.len(),
        }
    }
}

impl<K: Eq, V> Leaf<K, V> {
    /// Returns the value stored for `key`, if any.
    pub(crate) fn get(&self, hash: u64, key: &K) -> Option<&V> {
        match self {
            Self::Flat {
                hash: leaf_hash,
                key: stored,
                value,
            } => (*leaf_hash == hash && stored == key).then_some(value),
            Self::Collision {
                hash: leaf_hash,
                entries,
            } => {
                if *leaf_hash != hash {
                    return None;
                }
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
        }
    }
}

impl<K: Eq + Clone, V: Clone> Leaf<K, V> {
    /// Stores `key`/`value` in a new leaf.
    ///
    /// Replaces in place when `key` is already present (`added = false`).
    /// Otherwise the result is a collision leaf combining this leaf's entries
    /// with the new pair; the caller must only take that path when both hash
    /// to the same full-width value.
    pub(crate) fn put(&self, hash: u64, key: K, value: V) -> (Self, bool) {
        match self {
            Self::Flat {
                key: stored,
                value: stored_value,
                ..
            } => {
                if *stored == key {
                    (Self::Flat { hash, key, value }, false)
                } else {
                    debug_assert_eq!(self.hash(), hash);
                    (
                        Self::Collision {
                            hash,
                            entries: vec![(stored.clone(), stored_value.clone()), (key, value)],
                        },
                        true,
                    )
                }
            }
            Self::Collision { entries, .. } => {
                let mut combined = entries.clone();
                let added = match combined.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => {
                        entry.1 = value;
                        false
                    }
                    None => {
                        combined.push((key, value));
                        true
                    }
                };
                (
                    Self::Collision {
                        hash,
                        entries: combined,
                    },
                    added,
                )
            }
        }
    }

    /// Removes `key` from this leaf.
    ///
    /// Returns `None` when the key is absent. On success, the surviving leaf
    /// is `None` (flat leaf deleted: the slot empties), a flat leaf (collision
    /// of two reduced to one), or a smaller collision leaf.
    pub(crate) fn del(&self, hash: u64, key: &K) -> Option<(Option<Self>, V)> {
        match self {
            Self::Flat {
                hash: leaf_hash,
                key: stored,
                value,
            } => (*leaf_hash == hash && stored == key).then(|| (None, value.clone())),
            Self::Collision {
                hash: leaf_hash,
                entries,
            } => {
                if *leaf_hash != hash {
                    return None;
                }
                let at = entries.iter().position(|(k, _)| k == key)?;
                let removed = entries[at].1.clone();
                let survivor = if entries.len() == 2 {
                    let (k, v) = entries[1 - at].clone();
                    Self::Flat {
                        hash: *leaf_hash,
                        key: k,
                        value: v,
                    }
                } else {
                    let mut remaining = entries.clone();
                    remaining.remove(at);
                    Self::Collision {
                        hash: *leaf_hash,
                        entries: remaining,
                    }
                };
                Some((Some(survivor), removed))
            }
        }
    }
}
