//! Persistent hash map based on a HAMT.
//!
//! A HAMT (hash array mapped trie) routes each key by consuming its hash in
//! B-bit slices, one table per level. This implementation is persistent:
//! every insert or remove copies only the root-to-leaf spine it touched and
//! shares every other subtree with the predecessor map, which stays valid
//! and unchanged.
//!
//! # Key properties
//!
//! - **Path-copy persistence**: writes return a new handle; old handles
//!   keep reading their own version forever
//! - **Adaptive tables**: sparse bitmap-compressed tables upgrade to dense
//!   full-capacity tables as they fill and downgrade as they drain, with a
//!   hysteresis gap between the thresholds
//! - **Two hash widths**: 30-bit (32-way, 6 levels) and 60-bit (64-way,
//!   10 levels) tries from one implementation
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`
//!
//! # References
//!
//! - Bagwell, 2001 — "Ideal Hash Trees"
//! - Bagwell, 2000 — "Fast And Space Efficient Trie Searches"

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod hash;
pub mod iter;

mod leaf;
mod map;
mod ops;
mod table;

#[cfg(test)]
mod tests;

pub use config::{Config, TableMode};
pub use error::TrieError;
pub use hash::{HashKey, HashWidth, W30, W60};
pub use map::{HamtMap, HamtMapSync};
