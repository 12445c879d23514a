//! Table-grading configuration carried by every map handle.

/// Which table representations the trie may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableMode {
    /// Bitmap-compressed tables only; never upgrade.
    CompressedOnly,
    /// Dense full-capacity tables only; never downgrade.
    FullOnly,
    /// Start compressed, upgrade and downgrade on the configured thresholds.
    #[default]
    Hybrid,
}

/// Grading policy: table mode plus the hybrid-mode thresholds.
///
/// A `Config` is fixed at map construction and carried by the handle; it is
/// never read from process-global state. The thresholds only matter in
/// [`TableMode::Hybrid`] and keep a hysteresis gap so a single operation can
/// never upgrade and downgrade the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Table representation policy.
    pub mode: TableMode,
    /// A compressed table reaching this many children upgrades to full.
    /// In `(0, capacity]`; default ⌈2·capacity/3⌉.
    pub upgrade_threshold: usize,
    /// A full table dropping strictly below this many children downgrades
    /// to compressed. In `[0, upgrade_threshold)`; default ⌊capacity/4⌋.
    pub downgrade_threshold: usize,
}

impl Config {
    /// Default thresholds for a table of `capacity` slots under `mode`.
    #[must_use]
    pub const fn new(mode: TableMode, capacity: usize) -> Self {
        Self {
            mode,
            upgrade_threshold: (2 * capacity).div_ceil(3),
            downgrade_threshold: capacity / 4,
        }
    }
}
