use archery::SharedPointerKind;

use crate::hash::HashWidth;
use crate::table::{Pointer, Table};
use crate::{Config, HamtMap, HashKey, TableMode, W30};

/// A key whose folded hash is its own value; slot indices are controlled
/// directly.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SlotKey(u64);

impl HashKey for SlotKey {
    fn hash30(&self) -> u32 {
        (self.0 & ((1 << 30) - 1)) as u32
    }

    fn hash60(&self) -> u64 {
        self.0 & ((1 << 60) - 1)
    }
}

fn root_is_full<K, V, W: HashWidth, P: SharedPointerKind>(map: &HamtMap<K, V, W, P>) -> bool {
    matches!(&**map.root().unwrap(), Table::Full(_))
}

/// In hybrid mode the root upgrades exactly when it reaches the upgrade
/// threshold (43 of 64).
#[test]
fn hybrid_upgrades_at_threshold() {
    let mut map: HamtMap<SlotKey, u64> = HamtMap::new();
    for i in 0_u64..42 {
        map = map.insert(SlotKey(i), i).0;
    }
    assert!(!root_is_full(&map));

    map = map.insert(SlotKey(42), 42).0;
    assert!(root_is_full(&map));
    assert_eq!(map.len(), 43);
    map.validate().unwrap();
}

/// In hybrid mode a full table downgrades only when it drops strictly below
/// the downgrade threshold (16 of 64).
#[test]
fn hybrid_downgrades_below_threshold() {
    let mut map: HamtMap<SlotKey, u64> = HamtMap::new();
    for i in 0_u64..43 {
        map = map.insert(SlotKey(i), i).0;
    }
    assert!(root_is_full(&map));

    for i in 0_u64..27 {
        map = map.remove(&SlotKey(i)).0;
    }
    assert_eq!(map.len(), 16);
    assert!(root_is_full(&map));

    map = map.remove(&SlotKey(27)).0;
    assert_eq!(map.len(), 15);
    assert!(!root_is_full(&map));
    for i in 28_u64..43 {
        assert_eq!(map.get(&SlotKey(i)), Some(&i));
    }
    map.validate().unwrap();
}

/// The hysteresis gap keeps a table from flipping back on the next insert.
#[test]
fn no_oscillation_at_the_boundary() {
    let mut map: HamtMap<SlotKey, u64> = HamtMap::new();
    for i in 0_u64..43 {
        map = map.insert(SlotKey(i), i).0;
    }
    for i in 0_u64..28 {
        map = map.remove(&SlotKey(i)).0;
    }
    assert!(!root_is_full(&map));

    map = map.insert(SlotKey(0), 0).0;
    assert!(!root_is_full(&map));
    map.validate().unwrap();
}

/// The 30-bit geometry uses thresholds 22 and 8 (of 32).
#[test]
fn w30_thresholds() {
    let mut map: HamtMap<SlotKey, u64, W30> = HamtMap::new();
    for i in 0_u64..21 {
        map = map.insert(SlotKey(i), i).0;
    }
    assert!(!root_is_full(&map));
    map = map.insert(SlotKey(21), 21).0;
    assert!(root_is_full(&map));

    for i in 0_u64..14 {
        map = map.remove(&SlotKey(i)).0;
    }
    assert_eq!(map.len(), 8);
    assert!(root_is_full(&map));
    map = map.remove(&SlotKey(14)).0;
    assert!(!root_is_full(&map));
    map.validate().unwrap();
}

/// Compressed-only mode never upgrades, even at full occupancy.
#[test]
fn compressed_only_never_upgrades() {
    let mut map: HamtMap<SlotKey, u64> = HamtMap::with_mode(TableMode::CompressedOnly);
    for i in 0_u64..64 {
        map = map.insert(SlotKey(i), i).0;
    }
    assert!(!root_is_full(&map));
    assert_eq!(map.len(), 64);
    for i in 0_u64..64 {
        assert_eq!(map.get(&SlotKey(i)), Some(&i));
    }
    map.validate().unwrap();
}

/// Full-only mode builds dense tables from the first insert, including
/// sub-tables, and never downgrades.
#[test]
fn full_only_stays_full() {
    let map: HamtMap<SlotKey, u64> = HamtMap::with_mode(TableMode::FullOnly);
    let (map, _) = map.insert(SlotKey(5), 1_u64);
    assert!(root_is_full(&map));

    // Same depth-0 slot, split at depth 1: the sub-table must be dense too.
    let (map, _) = map.insert(SlotKey(5 | (1 << 6)), 2_u64);
    let root = map.root().unwrap();
    let Some(Pointer::Table(sub)) = root.get(5) else {
        panic!("slot 5 should hold a sub-table");
    };
    assert!(matches!(&**sub, Table::Full(_)));

    let (map, _) = map.remove(&SlotKey(5));
    assert!(root_is_full(&map));
    map.validate().unwrap();
}

/// Custom thresholds are honored.
#[test]
fn custom_thresholds() {
    let mut config = Config::new(TableMode::Hybrid, 64);
    config.upgrade_threshold = 4;
    config.downgrade_threshold = 2;

    let mut map: HamtMap<SlotKey, u64> = HamtMap::with_config(config);
    for i in 0_u64..3 {
        map = map.insert(SlotKey(i), i).0;
    }
    assert!(!root_is_full(&map));
    map = map.insert(SlotKey(3), 3).0;
    assert!(root_is_full(&map));

    map = map.remove(&SlotKey(0)).0;
    map = map.remove(&SlotKey(1)).0;
    assert!(root_is_full(&map));
    map = map.remove(&SlotKey(2)).0;
    assert!(!root_is_full(&map));
    map.validate().unwrap();
}

/// The three modes agree on every lookup and on the entry count for the
/// same input sequence; only the internal representations differ.
#[test]
fn modes_agree_on_content() {
    let modes = [
        TableMode::CompressedOnly,
        TableMode::FullOnly,
        TableMode::Hybrid,
    ];
    let mut maps: Vec<HamtMap<String, u64>> =
        modes.iter().map(|m| HamtMap::with_mode(*m)).collect();

    for i in 0_u64..200 {
        for map in &mut maps {
            *map = map.insert(format!("key-{i}"), i).0;
        }
    }
    for i in (0_u64..200).step_by(3) {
        for map in &mut maps {
            *map = map.remove(&format!("key-{i}")).0;
        }
    }

    for map in &maps {
        assert_eq!(map.len(), maps[0].len());
        map.validate().unwrap();
    }
    for i in 0_u64..200 {
        let key = format!("key-{i}");
        let expected = maps[0].get(&key);
        for map in &maps[1..] {
            assert_eq!(map.get(&key), expected, "mode disagreement on {key}");
        }
    }
}
