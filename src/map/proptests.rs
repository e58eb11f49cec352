//! Property-based tests for the concurrent hash map
//!
//! The model tracks live values, which keys still hold a slot, and the
//! capacity, so `size` and growth are checked as well as lookups.

use super::{ConcurrentHashMap, MapConfig};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
enum Op {
    Set(u8, u16),
    Get(u8),
    Delete(u8),
    Grow(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..32, any::<u16>()).prop_map(|(k, v)| Op::Set(k, v)),
        3 => (0u8..32).prop_map(Op::Get),
        2 => (0u8..32).prop_map(Op::Delete),
        1 => (0usize..128).prop_map(Op::Grow),
    ]
}

struct Model {
    capacity: usize,
    live: HashMap<u8, u16>,
    allocated: HashSet<u8>,
}

impl Model {
    fn rehash(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.allocated = self.live.keys().copied().collect();
    }

    fn set(&mut self, key: u8, value: u16) {
        self.live.insert(key, value);
        if self.allocated.insert(key) && self.allocated.len() as f64 > self.capacity as f64 * 0.5 {
            self.rehash(self.capacity * 2);
        }
    }
}

proptest! {
    #[test]
    fn matches_hashmap_model(
        initial_capacity in 1usize..16,
        ops in prop::collection::vec(op(), 0..200),
    ) {
        let map = ConcurrentHashMap::with_capacity(initial_capacity);
        let mut model = Model {
            capacity: initial_capacity,
            live: HashMap::new(),
            allocated: HashSet::new(),
        };

        for op in ops {
            match op {
                Op::Set(key, value) => {
                    prop_assert!(map.set(key, value).is_ok());
                    model.set(key, value);
                }
                Op::Get(key) => {
                    prop_assert_eq!(map.get(&key), model.live.get(&key).copied());
                }
                Op::Delete(key) => {
                    prop_assert_eq!(map.delete(&key), model.live.remove(&key).is_some());
                }
                Op::Grow(new_capacity) => {
                    prop_assert!(map.grow(new_capacity).is_ok());
                    if new_capacity > model.capacity {
                        model.rehash(new_capacity);
                    }
                }
            }
            prop_assert_eq!(map.capacity(), model.capacity);
            prop_assert_eq!(map.size(), model.allocated.len());
        }

        for (key, value) in &model.live {
            prop_assert_eq!(map.get(key), Some(*value));
        }
    }

    #[test]
    fn for_each_visits_exactly_the_live_entries(
        keys in prop::collection::vec(0u16..512, 0..100),
        deletes in prop::collection::vec(0u16..512, 0..50),
    ) {
        let config = MapConfig::new().with_initial_capacity(8).with_load_factor(0.75);
        let map = ConcurrentHashMap::with_config(config).unwrap();
        let mut live = HashMap::new();

        for key in keys {
            map.set(key, u32::from(key) * 7).unwrap();
            live.insert(key, u32::from(key) * 7);
        }
        for key in deletes {
            map.delete(&key);
            live.remove(&key);
        }

        let mut seen = HashMap::new();
        map.for_each(|key, value| {
            seen.insert(*key, *value);
        });
        prop_assert_eq!(seen, live);
    }
}
