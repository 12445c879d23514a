//! Structural-audit error type.

use thiserror::Error;

/// A structural defect found by [`validate`](crate::HamtMap::validate).
///
/// Public operations never return these: a well-formed trie stays well-formed
/// under every operation. A `TrieError` therefore indicates either a bug in
/// the engine or a key whose hash is not stable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrieError {
    /// The handle's entry count disagrees with an exhaustive traversal.
    #[error("entry count mismatch: handle records {recorded}, traversal found {actual}")]
    CountMismatch {
        /// Count stored in the handle.
        recorded: usize,
        /// Count obtained by traversal.
        actual: usize,
    },

    /// A table's stored hash path disagrees with its position.
    #[error("table at depth {depth} stores hash path {path} instead of {expected}")]
    TablePathMismatch {
        /// Depth of the offending table.
        depth: usize,
        /// Rendered stored path.
        path: String,
        /// Rendered expected path.
        expected: String,
    },

    /// A leaf's hash does not route to the table holding it.
    #[error("leaf under path {path} at depth {depth} hashes elsewhere (slot {slot})")]
    LeafPathMismatch {
        /// Depth of the containing table.
        depth: usize,
        /// Rendered path of the containing table.
        path: String,
        /// Slot the leaf occupies.
        slot: usize,
    },

    /// A flat leaf's stored hash disagrees with its key's hash.
    #[error("flat leaf at depth {depth} stores a hash its key does not produce")]
    StaleLeafHash {
        /// Depth of the containing table.
        depth: usize,
    },

    /// A compressed table's bitmap population and child array disagree.
    #[error("compressed table at depth {depth} has {bits} bitmap bits but {children} children")]
    BitmapMismatch {
        /// Depth of the offending table.
        depth: usize,
        /// Bits set in the bitmap.
        bits: usize,
        /// Length of the child array.
        children: usize,
    },

    /// A full table's populated counter and occupied slots disagree.
    #[error("full table at depth {depth} records {recorded} children but holds {actual}")]
    PopulatedMismatch {
        /// Depth of the offending table.
        depth: usize,
        /// Recorded populated count.
        recorded: usize,
        /// Occupied slots found.
        actual: usize,
    },

    /// A table holds no children; empty tables must be elided entirely.
    #[error("empty table at depth {depth} (path {path})")]
    EmptyTable {
        /// Depth of the offending table.
        depth: usize,
        /// Rendered path of the table.
        path: String,
    },

    /// A collision leaf sits above the deepest level, or its entries do not
    /// all share one full-width hash.
    #[error("collision leaf of {len} entries at depth {depth}, deepest level is {max}")]
    MisplacedCollision {
        /// Number of entries in the leaf.
        len: usize,
        /// Depth at which the leaf was found.
        depth: usize,
        /// Deepest level of this trie geometry.
        max: usize,
    },

    /// A non-root table's only child is a flat leaf; delete must collapse
    /// such tables into their parent slot.
    #[error("table at depth {depth} (path {path}) holds a single flat leaf")]
    UncollapsedTable {
        /// Depth of the offending table.
        depth: usize,
        /// Rendered path of the table.
        path: String,
    },

    /// A table was found below the deepest level.
    #[error("table nested at depth {depth}, beyond deepest level {max}")]
    TableTooDeep {
        /// Depth at which the table was found.
        depth: usize,
        /// Deepest level of this trie geometry.
        max: usize,
    },
}
