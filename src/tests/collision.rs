use archery::SharedPointerKind;

use crate::hash::HashWidth;
use crate::leaf::Leaf;
use crate::table::{Pointer, Table};
use crate::{HamtMap, HashKey, W30};

/// A key type with a controllable folded hash for forcing collisions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CollidingKey {
    id: u32,
    forced_hash: u64,
}

impl CollidingKey {
    const fn new(id: u32, hash: u64) -> Self {
        Self {
            id,
            forced_hash: hash,
        }
    }
}

impl HashKey for CollidingKey {
    fn hash30(&self) -> u32 {
        (self.forced_hash & ((1 << 30) - 1)) as u32
    }

    fn hash60(&self) -> u64 {
        self.forced_hash & ((1 << 60) - 1)
    }
}

/// Depth of the first collision leaf in the trie, if any.
fn collision_depth<K, V, W: HashWidth, P: SharedPointerKind>(
    map: &HamtMap<K, V, W, P>,
) -> Option<usize> {
    fn walk<K, V, P: SharedPointerKind>(table: &Table<K, V, P>, depth: usize) -> Option<usize> {
        for (_, child) in table.slots() {
            match child {
                Pointer::Leaf(leaf) => {
                    if matches!(&**leaf, Leaf::Collision { .. }) {
                        return Some(depth);
                    }
                }
                Pointer::Table(sub) => {
                    if let Some(found) = walk(sub, depth + 1) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }
    walk(map.root()?, 0)
}

/// Two keys with the same full-width hash end up in a collision leaf at the
/// deepest level.
#[test]
fn two_colliding_keys() {
    let k1 = CollidingKey::new(1, 0xDEAD_BEEF);
    let k2 = CollidingKey::new(2, 0xDEAD_BEEF);

    let map: HamtMap<CollidingKey, &str> = HamtMap::new();
    let (map, _) = map.insert(k1.clone(), "first");
    let (map, added) = map.insert(k2.clone(), "second");

    assert!(added);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&k1), Some(&"first"));
    assert_eq!(map.get(&k2), Some(&"second"));
    assert_eq!(collision_depth(&map), Some(9));
    map.validate().unwrap();
}

/// Three keys with the same hash share one collision leaf.
#[test]
fn three_colliding_keys() {
    let keys: Vec<CollidingKey> = (0..3).map(|i| CollidingKey::new(i, 0xCAFE)).collect();

    let mut map: HamtMap<CollidingKey, usize> = HamtMap::new();
    for (i, k) in keys.iter().enumerate() {
        map = map.insert(k.clone(), i).0;
    }

    assert_eq!(map.len(), 3);
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(map.get(k), Some(&i));
    }
    map.validate().unwrap();
}

/// Removing from a three-entry collision leaf keeps the other two colliding.
#[test]
fn remove_from_collision() {
    let k1 = CollidingKey::new(1, 0xAAAA);
    let k2 = CollidingKey::new(2, 0xAAAA);
    let k3 = CollidingKey::new(3, 0xAAAA);

    let mut map: HamtMap<CollidingKey, i32> = HamtMap::new();
    map = map.insert(k1.clone(), 10).0;
    map = map.insert(k2.clone(), 20).0;
    map = map.insert(k3.clone(), 30).0;

    let (map, removed) = map.remove(&k2);
    assert_eq!(removed, Some(20));
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&k1), Some(&10));
    assert_eq!(map.get(&k2), None);
    assert_eq!(map.get(&k3), Some(&30));
    assert_eq!(collision_depth(&map), Some(9));
    map.validate().unwrap();
}

/// A collision leaf of two reduces to a flat leaf, and the single-leaf chain
/// above it collapses back into the root slot.
#[test]
fn collision_to_flat_collapses() {
    let k1 = CollidingKey::new(1, 0xBEEF);
    let k2 = CollidingKey::new(2, 0xBEEF);

    let map: HamtMap<CollidingKey, &str> = HamtMap::new();
    let (map, _) = map.insert(k1.clone(), "one");
    let (map, _) = map.insert(k2.clone(), "two");
    assert_eq!(collision_depth(&map), Some(9));

    let (map, removed) = map.remove(&k1);
    assert_eq!(removed, Some("one"));
    assert_eq!(collision_depth(&map), None);
    assert_eq!(map.get(&k2), Some(&"two"));
    map.validate().unwrap();
}

/// Overwriting inside a collision leaf replaces, never duplicates.
#[test]
fn overwrite_in_collision() {
    let k1 = CollidingKey::new(1, 0xBBBB);
    let k2 = CollidingKey::new(2, 0xBBBB);

    let map: HamtMap<CollidingKey, &str> = HamtMap::new();
    let (map, _) = map.insert(k1.clone(), "old");
    let (map, _) = map.insert(k2.clone(), "val2");
    let (map, added) = map.insert(k1.clone(), "new");

    assert!(!added);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&k1), Some(&"new"));
    map.validate().unwrap();
}

/// Removing every colliding key returns to the empty map.
#[test]
fn collision_remove_all() {
    let k1 = CollidingKey::new(1, 0xCCCC);
    let k2 = CollidingKey::new(2, 0xCCCC);

    let map: HamtMap<CollidingKey, i32> = HamtMap::new();
    let (map, _) = map.insert(k1.clone(), 1);
    let (map, _) = map.insert(k2.clone(), 2);

    let (map, _) = map.remove(&k1);
    let (map, _) = map.remove(&k2);
    assert!(map.is_empty());
    map.validate().unwrap();
}

/// Mixed: some keys collide, some do not.
#[test]
fn mixed_collisions_and_normal() {
    let collide_a = CollidingKey::new(1, 0xDDDD);
    let collide_b = CollidingKey::new(2, 0xDDDD);
    let normal = CollidingKey::new(3, 0xEEEE);

    let mut map: HamtMap<CollidingKey, &str> = HamtMap::new();
    map = map.insert(collide_a.clone(), "a").0;
    map = map.insert(collide_b.clone(), "b").0;
    map = map.insert(normal.clone(), "c").0;

    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&collide_a), Some(&"a"));
    assert_eq!(map.get(&collide_b), Some(&"b"));
    assert_eq!(map.get(&normal), Some(&"c"));
    map.validate().unwrap();
}

/// The 30-bit geometry pins collision leaves to depth 5.
#[test]
fn w30_collision_depth() {
    let k1 = CollidingKey::new(1, 0x1234_5678);
    let k2 = CollidingKey::new(2, 0x1234_5678);

    let map: HamtMap<CollidingKey, i32, W30> = HamtMap::new();
    let (map, _) = map.insert(k1.clone(), 1);
    let (map, _) = map.insert(k2.clone(), 2);

    assert_eq!(collision_depth(&map), Some(5));
    assert_eq!(map.get(&k1), Some(&1));
    assert_eq!(map.get(&k2), Some(&2));
    map.validate().unwrap();
}
