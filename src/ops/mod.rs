//! Trie driver: recursive descent with path-copy rebuild on unwind.
//!
//! Each operation walks the root-to-leaf spine along the key's slot path;
//! the call stack is the captured path (bounded by the deepest level), and
//! every frame rebuilds its table with one slot changed as the recursion
//! returns.

pub(crate) mod get;
pub(crate) mod insert;
pub(crate) mod remove;

use crate::hash::{self, HashWidth};

/// Fatal descent: a table child was found below the deepest level.
///
/// Tables at the deepest level hold leaves only; anything else means the
/// engine corrupted a node that should be immutable.
pub(crate) fn descend_past_max<W: HashWidth>(path: u64, depth: usize, slot: usize) -> ! {
    panic!(
        "corrupt trie: table child at depth {} exceeds deepest level {} \
         (slot {slot:02}, path {}, kind table)",
        depth + 1,
        W::MAX_DEPTH,
        hash::path_display::<W>(hash::build_path::<W>(path, slot, depth), depth + 1),
    );
}
