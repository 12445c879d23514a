//! Table variants: bitmap-compressed and dense full-capacity.
//!
//! Both variants are immutable; `insert`, `replace`, and `remove` build a
//! fresh table and share every untouched child with the original. Grading
//! between the variants is decided here, against the thresholds in
//! [`Config`].

use archery::{SharedPointer, SharedPointerKind};

use crate::config::{Config, TableMode};
use crate::leaf::Leaf;

/// A slot's occupant: a leaf or a sub-table, shared across trie versions.
pub(crate) enum Pointer<K, V, P: SharedPointerKind> {
    /// Terminal node.
    Leaf(SharedPointer<Leaf<K, V>, P>),
    /// Nested table.
    Table(SharedPointer<Table<K, V, P>, P>),
}

// Pointer clones are pointer bumps; no K/V bounds.
impl<K, V, P: SharedPointerKind> Clone for Pointer<K, V, P> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(leaf) => Self::Leaf(SharedPointer::clone(leaf)),
            Self::Table(table) => Self::Table(SharedPointer::clone(table)),
        }
    }
}

impl<K, V, P: SharedPointerKind> Pointer<K, V, P> {
    /// Wraps a freshly built leaf.
    pub(crate) fn leaf(leaf: Leaf<K, V>) -> Self {
        Self::Leaf(SharedPointer::new(leaf))
    }

    /// Wraps a single-pair leaf.
    pub(crate) fn flat(hash: u64, key: K, value: V) -> Self {
        Self::leaf(Leaf::Flat { hash, key, value })
    }

    /// Wraps a freshly built table.
    pub(crate) fn table(table: Table<K, V, P>) -> Self {
        Self::Table(SharedPointer::new(table))
    }
}

// ---------------------------------------------------------------------------
// Compressed table
// ---------------------------------------------------------------------------

/// Sparse table: occupancy bitmap plus a packed child array.
///
/// Invariant: `children.len() == bitmap.count_ones()`, packed in ascending
/// slot order. The child for slot `i` lives at `popcount(bitmap & (2^i - 1))`.
pub(crate) struct CompressedTable<K, V, P: SharedPointerKind> {
    pub(crate) hash_path: u64,
    pub(crate) bitmap: u64,
    pub(crate) children: Vec<Pointer<K, V, P>>,
}

impl<K, V, P: SharedPointerKind> CompressedTable<K, V, P> {
    /// Packed-array position of `slot`.
    const fn position(&self, slot: usize) -> usize {
        (self.bitmap & ((1 << slot) - 1)).count_ones() as usize
    }

    const fn occupied(&self, slot: usize) -> bool {
        self.bitmap & (1 << slot) != 0
    }

    fn get(&self, slot: usize) -> Option<&Pointer<K, V, P>> {
        self.occupied(slot)
            .then(|| &self.children[self.position(slot)])
    }

    fn insert(&self, slot: usize, child: Pointer<K, V, P>) -> Self {
        assert!(
            !self.occupied(slot),
            "insert into occupied slot {slot} of compressed table (path {:#x})",
            self.hash_path,
        );
        let at = self.position(slot);
        let mut children = Vec::with_capacity(self.children.len() + 1);
        children.extend(self.children[..at].iter().cloned());
        children.push(child);
        children.extend(self.children[at..].iter().cloned());
        Self {
            hash_path: self.hash_path,
            bitmap: self.bitmap | (1 << slot),
            children,
        }
    }

    fn replace(&self, slot: usize, child: Pointer<K, V, P>) -> Self {
        assert!(
            self.occupied(slot),
            "replace in empty slot {slot} of compressed table (path {:#x})",
            self.hash_path,
        );
        let at = self.position(slot);
        let mut children = self.children.clone();
        children[at] = child;
        Self {
            hash_path: self.hash_path,
            bitmap: self.bitmap,
            children,
        }
    }

    /// Removes the child at `slot`; `None` when it was the last one.
    fn remove(&self, slot: usize) -> Option<Self> {
        assert!(
            self.occupied(slot),
            "remove from empty slot {slot} of compressed table (path {:#x})",
            self.hash_path,
        );
        let bitmap = self.bitmap & !(1 << slot);
        if bitmap == 0 {
            return None;
        }
        let at = self.position(slot);
        let mut children = Vec::with_capacity(self.children.len() - 1);
        children.extend(self.children[..at].iter().cloned());
        children.extend(self.children[at + 1..].iter().cloned());
        Some(Self {
            hash_path: self.hash_path,
            bitmap,
            children,
        })
    }

    /// Rewrites this table as a dense one of `capacity` slots.
    fn to_full(&self, capacity: usize) -> FullTable<K, V, P> {
        let mut children: Vec<Option<Pointer<K, V, P>>> = Vec::with_capacity(capacity);
        children.resize_with(capacity, || None);
        for (slot, child) in self.slots() {
            children[slot] = Some(child.clone());
        }
        FullTable {
            hash_path: self.hash_path,
            populated: self.children.len(),
            children,
        }
    }

    fn slots(&self) -> impl Iterator<Item = (usize, &Pointer<K, V, P>)> {
        (0..u64::BITS as usize)
            .filter(|slot| self.occupied(*slot))
            .zip(self.children.iter())
    }
}

// ---------------------------------------------------------------------------
// Full table
// ---------------------------------------------------------------------------

/// Dense table: one optional child per slot plus a populated count.
///
/// Invariant: `populated` equals the number of `Some` slots.
pub(crate) struct FullTable<K, V, P: SharedPointerKind> {
    pub(crate) hash_path: u64,
    pub(crate) populated: usize,
    pub(crate) children: Vec<Option<Pointer<K, V, P>>>,
}

impl<K, V, P: SharedPointerKind> FullTable<K, V, P> {
    fn empty(hash_path: u64, capacity: usize) -> Self {
        let mut children = Vec::with_capacity(capacity);
        children.resize_with(capacity, || None);
        Self {
            hash_path,
            populated: 0,
            children,
        }
    }

    fn get(&self, slot: usize) -> Option<&Pointer<K, V, P>> {
        self.children[slot].as_ref()
    }

    fn insert(&self, slot: usize, child: Pointer<K, V, P>) -> Self {
        assert!(
            self.children[slot].is_none(),
            "insert into occupied slot {slot} of full table (path {:#x})",
            self.hash_path,
        );
        let mut children = self.children.clone();
        children[slot] = Some(child);
        Self {
            hash_path: self.hash_path,
            populated: self.populated + 1,
            children,
        }
    }

    fn replace(&self, slot: usize, child: Pointer<K, V, P>) -> Self {
        assert!(
            self.children[slot].is_some(),
            "replace in empty slot {slot} of full table (path {:#x})",
            self.hash_path,
        );
        let mut children = self.children.clone();
        children[slot] = Some(child);
        Self {
            hash_path: self.hash_path,
            populated: self.populated,
            children,
        }
    }

    /// Removes the child at `slot`; `None` when it was the last one.
    fn remove(&self, slot: usize) -> Option<Self> {
        assert!(
            self.children[slot].is_some(),
            "remove from empty slot {slot} of full table (path {:#x})",
            self.hash_path,
        );
        if self.populated == 1 {
            return None;
        }
        let mut children = self.children.clone();
        children[slot] = None;
        Some(Self {
            hash_path: self.hash_path,
            populated: self.populated - 1,
            children,
        })
    }

    /// Rewrites this table in the sparse representation.
    fn to_compressed(&self) -> CompressedTable<K, V, P> {
        let mut bitmap = 0_u64;
        let mut children = Vec::with_capacity(self.populated);
        for (slot, child) in self.slots() {
            bitmap |= 1 << slot;
            children.push(child.clone());
        }
        CompressedTable {
            hash_path: self.hash_path,
            bitmap,
            children,
        }
    }

    fn slots(&self) -> impl Iterator<Item = (usize, &Pointer<K, V, P>)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(slot, child)| child.as_ref().map(|c| (slot, c)))
    }
}

// ---------------------------------------------------------------------------
// Unified table
// ---------------------------------------------------------------------------

/// A trie table in either representation.
pub(crate) enum Table<K, V, P: SharedPointerKind> {
    /// Bitmap-compressed sparse table.
    Compressed(CompressedTable<K, V, P>),
    /// Dense full-capacity table.
    Full(FullTable<K, V, P>),
}

impl<K, V, P: SharedPointerKind> Table<K, V, P> {
    /// Builds a table holding a single child, in the representation the mode
    /// calls for.
    pub(crate) fn with_child(
        hash_path: u64,
        slot: usize,
        child: Pointer<K, V, P>,
        capacity: usize,
        config: &Config,
    ) -> Self {
        match config.mode {
            TableMode::FullOnly => Self::Full(FullTable::empty(hash_path, capacity).insert(slot, child)),
            TableMode::CompressedOnly | TableMode::Hybrid => Self::Compressed(CompressedTable {
                hash_path,
                bitmap: 1 << slot,
                children: vec![child],
            }),
        }
    }

    /// Builds a table holding two children at distinct slots.
    pub(crate) fn with_pair(
        hash_path: u64,
        slot_a: usize,
        child_a: Pointer<K, V, P>,
        slot_b: usize,
        child_b: Pointer<K, V, P>,
        capacity: usize,
        config: &Config,
    ) -> Self {
        debug_assert_ne!(slot_a, slot_b);
        Self::with_child(hash_path, slot_a, child_a, capacity, config).insert(
            slot_b,
            child_b,
            capacity,
            config,
        )
    }

    /// The hash-path prefix routing to this table's position.
    pub(crate) const fn hash_path(&self) -> u64 {
        match self {
            Self::Compressed(t) => t.hash_path,
            Self::Full(t) => t.hash_path,
        }
    }

    /// Number of occupied slots.
    pub(crate) fn child_count(&self) -> usize {
        match self {
            Self::Compressed(t) => t.children.len(),
            Self::Full(t) => t.populated,
        }
    }

    /// The child at `slot`, if any.
    pub(crate) fn get(&self, slot: usize) -> Option<&Pointer<K, V, P>> {
        match self {
            Self::Compressed(t) => t.get(slot),
            Self::Full(t) => t.get(slot),
        }
    }

    /// Occupied slots in ascending order.
    pub(crate) fn slots(&self) -> Vec<(usize, &Pointer<K, V, P>)> {
        match self {
            Self::Compressed(t) => t.slots().collect(),
            Self::Full(t) => t.slots().collect(),
        }
    }

    /// New table with `child` placed in the currently empty `slot`.
    ///
    /// In hybrid mode a compressed table that reaches the upgrade threshold
    /// comes back in the dense representation.
    pub(crate) fn insert(
        &self,
        slot: usize,
        child: Pointer<K, V, P>,
        capacity: usize,
        config: &Config,
    ) -> Self {
        match self {
            Self::Compressed(t) => {
                let grown = t.insert(slot, child);
                if config.mode == TableMode::Hybrid && grown.children.len() >= config.upgrade_threshold
                {
                    Self::Full(grown.to_full(capacity))
                } else {
                    Self::Compressed(grown)
                }
            }
            Self::Full(t) => Self::Full(t.insert(slot, child)),
        }
    }

    /// New table with the occupant of `slot` swapped for `child`.
    pub(crate) fn replace(&self, slot: usize, child: Pointer<K, V, P>) -> Self {
        match self {
            Self::Compressed(t) => Self::Compressed(t.replace(slot, child)),
            Self::Full(t) => Self::Full(t.replace(slot, child)),
        }
    }

    /// New table with `slot` emptied, or `None` when the last child goes.
    ///
    /// In hybrid mode a full table that shrinks below the downgrade threshold
    /// comes back in the sparse representation.
    pub(crate) fn remove(&self, slot: usize, config: &Config) -> Option<Self> {
        match self {
            Self::Compressed(t) => t.remove(slot).map(Self::Compressed),
            Self::Full(t) => {
                let shrunk = t.remove(slot)?;
                if config.mode == TableMode::Hybrid && shrunk.populated < config.downgrade_threshold {
                    Some(Self::Compressed(shrunk.to_compressed()))
                } else {
                    Some(Self::Full(shrunk))
                }
            }
        }
    }

    /// The sole child, when it is a flat leaf.
    ///
    /// Delete uses this to collapse one-leaf tables into the parent slot.
    /// Collision leaves never collapse; they are pinned to the deepest level.
    pub(crate) fn single_flat_leaf(&self) -> Option<&SharedPointer<Leaf<K, V>, P>> {
        if self.child_count() != 1 {
            return None;
        }
        let (_, child) = match self {
            Self::Compressed(t) => t.slots().next()?,
            Self::Full(t) => t.slots().next()?,
        };
        match child {
            Pointer::Leaf(leaf) if matches!(**leaf, Leaf::Flat { .. }) => Some(leaf),
            Pointer::Leaf(_) | Pointer::Table(_) => None,
        }
    }
}
