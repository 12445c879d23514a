//! Persistent HAMT map handle.
//!
//! A [`HamtMap`] is a small value: an optional shared root table, an entry
//! count, and the grading [`Config`]. Writes never touch the receiver; they
//! return a fresh handle whose trie shares every unchanged subtree with the
//! original, so any number of earlier versions stay live and readable.

use std::fmt;
use std::marker::PhantomData;
use std::ops;

use archery::{ArcK, RcK, SharedPointer, SharedPointerKind};

use crate::config::{Config, TableMode};
use crate::error::TrieError;
use crate::hash::{self, HashKey, HashWidth, W60};
use crate::iter::Iter;
use crate::leaf::Leaf;
use crate::ops::get::get_recursive;
use crate::ops::insert::insert_recursive;
use crate::ops::remove::{RemoveOutcome, remove_recursive};
use crate::table::{Pointer, Table};

/// Persistent hash array mapped trie map.
///
/// `W` selects the hash width (default [`W60`]); `P` selects the sharing
/// backend (default `Rc`; see [`HamtMapSync`] for the `Arc` flavor).
pub struct HamtMap<K, V, W: HashWidth = W60, P: SharedPointerKind = RcK> {
    root: Option<SharedPointer<Table<K, V, P>, P>>,
    nentries: usize,
    config: Config,
    width: PhantomData<W>,
}

/// Thread-safe flavor of [`HamtMap`], backed by `Arc`.
///
/// Identical API; handles and their shared subtrees are `Send + Sync`
/// whenever `K` and `V` are.
pub type HamtMapSync<K, V, W = W60> = HamtMap<K, V, W, ArcK>;

// ---------------------------------------------------------------------------
// Construction & accessors — no key bounds
// ---------------------------------------------------------------------------

impl<K, V, W: HashWidth, P: SharedPointerKind> HamtMap<K, V, W, P> {
    /// Creates an empty map in the default hybrid mode.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(TableMode::Hybrid)
    }

    /// Creates an empty map in the given table mode with default thresholds.
    #[must_use]
    pub fn with_mode(mode: TableMode) -> Self {
        Self::with_config(Config::new(mode, W::CAPACITY))
    }

    /// Creates an empty map with an explicit grading configuration.
    #[must_use]
    pub const fn with_config(config: Config) -> Self {
        Self {
            root: None,
            nentries: 0,
            config,
            width: PhantomData,
        }
    }

    /// Returns the number of key-value pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nentries
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nentries == 0
    }

    /// The grading configuration this map was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns an iterator over `(&K, &V)` pairs, in no particular order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_deref())
    }

    #[cfg(test)]
    pub(crate) const fn root(&self) -> Option<&SharedPointer<Table<K, V, P>, P>> {
        self.root.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Read operations — K: HashKey
// ---------------------------------------------------------------------------

impl<K: HashKey, V, W: HashWidth, P: SharedPointerKind> HamtMap<K, V, W, P> {
    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let root = self.root.as_ref()?;
        get_recursive::<K, V, W, P>(root, W::hash_of(key), key, 0)
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }
}

// ---------------------------------------------------------------------------
// Write operations — K: HashKey + Clone, V: Clone
// ---------------------------------------------------------------------------

impl<K: HashKey + Clone, V: Clone, W: HashWidth, P: SharedPointerKind> HamtMap<K, V, W, P> {
    /// Stores `key`/`value`, returning the successor map.
    ///
    /// The flag is `true` when the key was new, `false` when an existing
    /// value was replaced. The receiver is unchanged either way.
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> (Self, bool) {
        let hash = W::hash_of(&key);
        match &self.root {
            Some(root) => {
                let outcome =
                    insert_recursive::<K, V, W, P>(root, hash, key, value, 0, &self.config);
                let next = Self {
                    root: Some(SharedPointer::new(outcome.table)),
                    nentries: self.nentries + usize::from(outcome.added),
                    config: self.config,
                    width: PhantomData,
                };
                (next, outcome.added)
            }
            None => {
                let slot = hash::slot::<W>(hash, 0);
                let root = Table::with_child(
                    0,
                    slot,
                    Pointer::flat(hash, key, value),
                    W::CAPACITY,
                    &self.config,
                );
                let next = Self {
                    root: Some(SharedPointer::new(root)),
                    nentries: 1,
                    config: self.config,
                    width: PhantomData,
                };
                (next, true)
            }
        }
    }

    /// Removes `key`, returning the successor map and the removed value.
    ///
    /// When the key is absent the value is `None` and the returned map is
    /// equivalent to the receiver.
    #[must_use]
    pub fn remove(&self, key: &K) -> (Self, Option<V>) {
        let Some(root) = &self.root else {
            return (self.clone(), None);
        };
        match remove_recursive::<K, V, W, P>(root, W::hash_of(key), key, 0, &self.config) {
            RemoveOutcome::NotFound => (self.clone(), None),
            RemoveOutcome::Removed { table, value } => {
                let next = Self {
                    root: table.map(SharedPointer::new),
                    nentries: self.nentries - 1,
                    config: self.config,
                    width: PhantomData,
                };
                (next, Some(value))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Structural audit
// ---------------------------------------------------------------------------

impl<K: HashKey, V, W: HashWidth, P: SharedPointerKind> HamtMap<K, V, W, P> {
    /// Walks the whole trie and checks every structural invariant: entry
    /// count, hash-path consistency, bitmap and populated-count agreement,
    /// collision-leaf placement, canonical delete shapes, and depth bounds.
    ///
    /// A well-formed map always passes; a failure means an engine bug or a
    /// key with an unstable hash.
    ///
    /// # Errors
    ///
    /// The first defect found, as a [`TrieError`].
    pub fn validate(&self) -> Result<(), TrieError> {
        let actual = match &self.root {
            Some(root) => audit_table::<K, V, W, P>(root, 0, 0, true)?,
            None => 0,
        };
        if actual == self.nentries {
            Ok(())
        } else {
            Err(TrieError::CountMismatch {
                recorded: self.nentries,
                actual,
            })
        }
    }
}

/// Audits one table and its subtree; returns the number of reachable pairs.
fn audit_table<K, V, W, P>(
    table: &Table<K, V, P>,
    depth: usize,
    expected_path: u64,
    is_root: bool,
) -> Result<usize, TrieError>
where
    K: HashKey,
    W: HashWidth,
    P: SharedPointerKind,
{
    if depth > W::MAX_DEPTH {
        return Err(TrieError::TableTooDeep {
            depth,
            max: W::MAX_DEPTH,
        });
    }
    if table.hash_path() != expected_path {
        return Err(TrieError::TablePathMismatch {
            depth,
            path: hash::path_display::<W>(table.hash_path(), depth),
            expected: hash::path_display::<W>(expected_path, depth),
        });
    }
    match table {
        Table::Compressed(t) => {
            let bits = t.bitmap.count_ones() as usize;
            if bits != t.children.len() {
                return Err(TrieError::BitmapMismatch {
                    depth,
                    bits,
                    children: t.children.len(),
                });
            }
        }
        Table::Full(t) => {
            let actual = t.children.iter().filter(|c| c.is_some()).count();
            if actual != t.populated {
                return Err(TrieError::PopulatedMismatch {
                    depth,
                    recorded: t.populated,
                    actual,
                });
            }
        }
    }
    if table.child_count() == 0 {
        return Err(TrieError::EmptyTable {
            depth,
            path: hash::path_display::<W>(expected_path, depth),
        });
    }

    let mut count = 0;
    for (slot, child) in table.slots() {
        match child {
            Pointer::Leaf(leaf) => {
                let leaf_hash = leaf.hash();
                if hash::path_of::<W>(leaf_hash, depth) != expected_path
                    || hash::slot::<W>(leaf_hash, depth) != slot
                {
                    return Err(TrieError::LeafPathMismatch {
                        depth,
                        path: hash::path_display::<W>(expected_path, depth),
                        slot,
                    });
                }
                match &**leaf {
                    Leaf::Flat { hash, key, .. } => {
                        if W::hash_of(key) != *hash {
                            return Err(TrieError::StaleLeafHash { depth });
                        }
                    }
                    Leaf::Collision { hash, entries } => {
                        if depth != W::MAX_DEPTH || entries.len() < 2 {
                            return Err(TrieError::MisplacedCollision {
                                len: entries.len(),
                                depth,
                                max: W::MAX_DEPTH,
                            });
                        }
                        for (key, _) in entries {
                            if W::hash_of(key) != *hash {
                                return Err(TrieError::StaleLeafHash { depth });
                            }
                        }
                    }
                }
                count += leaf.len();
            }
            Pointer::Table(sub) => {
                if depth == W::MAX_DEPTH {
                    return Err(TrieError::TableTooDeep {
                        depth: depth + 1,
                        max: W::MAX_DEPTH,
                    });
                }
                let sub_path = hash::build_path::<W>(expected_path, slot, depth);
                count += audit_table::<K, V, W, P>(sub, depth + 1, sub_path, false)?;
            }
        }
    }

    if !is_root && table.single_flat_leaf().is_some() {
        return Err(TrieError::UncollapsedTable {
            depth,
            path: hash::path_display::<W>(expected_path, depth),
        });
    }
    Ok(count)
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

// Handle copies are pointer bumps; no K/V bounds.
impl<K, V, W: HashWidth, P: SharedPointerKind> Clone for HamtMap<K, V, W, P> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            nentries: self.nentries,
            config: self.config,
            width: PhantomData,
        }
    }
}

impl<K, V, W: HashWidth, P: SharedPointerKind> Default for HamtMap<K, V, W, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, W: HashWidth, P: SharedPointerKind> fmt::Debug for HamtMap<K, V, W, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HamtMap")
            .field("len", &self.nentries)
            .field("bits", &W::BITS)
            .field("mode", &self.config.mode)
            .finish_non_exhaustive()
    }
}

impl<K: HashKey + Clone, V: Clone, W: HashWidth, P: SharedPointerKind> Extend<(K, V)>
    for HamtMap<K, V, W, P>
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            let (next, _) = self.insert(key, value);
            *self = next;
        }
    }
}

impl<K: HashKey + Clone, V: Clone, W: HashWidth, P: SharedPointerKind> FromIterator<(K, V)>
    for HamtMap<K, V, W, P>
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: HashKey, V, W: HashWidth, P: SharedPointerKind> ops::Index<&K> for HamtMap<K, V, W, P> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, K, V, W: HashWidth, P: SharedPointerKind> IntoIterator for &'a HamtMap<K, V, W, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}
