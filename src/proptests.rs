use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{BTreeSet, HashMap};

// Small domains so that pushes, deletes and reads collide often.
#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 4)]
    Push(
        #[proptest(strategy = "0u8..16")] u8,
        #[proptest(strategy = "0u16..64")] u16,
    ),
    Delete(#[proptest(strategy = "0u8..16")] u8),
    Get(#[proptest(strategy = "0u8..16")] u8),
    Has(
        #[proptest(strategy = "0u8..16")] u8,
        #[proptest(strategy = "0u16..64")] u16,
    ),
}

/// Reference model: plain sets plus the global first-seen order of values.
#[derive(Default)]
struct Model {
    map: HashMap<u8, BTreeSet<u16>>,
    first_seen: Vec<u16>,
}

impl Model {
    fn push(&mut self, key: u8, value: u16) -> bool {
        if !self.first_seen.contains(&value) {
            self.first_seen.push(value);
        }
        self.map.entry(key).or_default().insert(value)
    }

    fn get(&self, key: u8) -> Result<Vec<u16>> {
        let set = self.map.get(&key).ok_or(Error::KeyNotFound)?;
        Ok(self
            .first_seen
            .iter()
            .copied()
            .filter(|v| set.contains(v))
            .collect())
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in prop::collection::vec(any::<Op>(), 0..=500)) {
        let mut m: RoarMultimap<u8, u16> = RoarMultimap::new();
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::Push(k, v) => {
                    prop_assert_eq!(m.push(k, v), model.push(k, v));
                }
                Op::Delete(k) => {
                    m.delete(&k);
                    model.map.remove(&k);
                }
                Op::Get(k) => {
                    prop_assert_eq!(m.get(&k), model.get(k));
                }
                Op::Has(k, v) => {
                    let expected = model.map.get(&k).is_some_and(|s| s.contains(&v));
                    prop_assert_eq!(m.has_value(&k, &v), expected);
                }
            }

            prop_assert_eq!(m.count(), model.map.len());
        }

        m.validate();
        for k in 0u8..16 {
            prop_assert_eq!(m.get(&k), model.get(k));
        }
        let mut keys = m.keys();
        keys.sort_unstable();
        let mut expected_keys: Vec<u8> = model.map.keys().copied().collect();
        expected_keys.sort_unstable();
        prop_assert_eq!(keys, expected_keys);

        // Deleted keys never release their values.
        let mut values = m.values();
        values.sort_unstable();
        let mut expected_values = model.first_seen.clone();
        expected_values.sort_unstable();
        prop_assert_eq!(values, expected_values);
    }

    #[test]
    fn prop_push_idempotent(key in ".{0,8}", value in any::<i64>(), n in 1usize..8) {
        let mut once: RoarMultimap<String, i64> = RoarMultimap::new();
        once.push(key.clone(), value);

        let mut many: RoarMultimap<String, i64> = RoarMultimap::new();
        for _ in 0..n {
            many.push(key.clone(), value);
        }

        prop_assert_eq!(many.get(key.as_str()), once.get(key.as_str()));
        prop_assert_eq!(many.get(key.as_str()), Ok(vec![value]));
    }

    #[test]
    fn prop_keys_isolated(
        pairs in prop::collection::vec((0u8..8, 0u16..32), 0..100),
        probe_key in 0u8..8,
        probe_value in 0u16..32,
    ) {
        let mut m: RoarMultimap<u8, u16> = RoarMultimap::new();
        for &(k, v) in &pairs {
            m.push(k, v);
        }

        let pushed = pairs.contains(&(probe_key, probe_value));
        prop_assert_eq!(m.has_value(&probe_key, &probe_value), pushed);
    }
}

#[test]
fn exhaustive_delete_order_small_set() {
    let keys = ["a", "b", "c", "d"];
    let mut base: RoarMultimap<&str, u32> = RoarMultimap::new();
    for (i, k) in keys.into_iter().enumerate() {
        base.push(k, i as u32);
        base.push(k, 100);
    }

    // Every order of deletion leaves the other keys intact.
    let mut order = keys.to_vec();
    for _ in 0..24 {
        let mut m = base.clone();
        for (deleted, k) in order.iter().enumerate() {
            m.delete(k);
            assert_eq!(m.count(), keys.len() - deleted - 1);
            assert_eq!(m.get(k), Err(Error::KeyNotFound));
            for other in &order[deleted + 1..] {
                assert!(m.has_value(other, &100u32));
            }
            m.validate();
        }
        assert!(m.is_empty());
        assert_eq!(m.values().len(), keys.len() + 1);

        next_permutation(&mut order);
    }
}

fn next_permutation<T: Ord>(items: &mut [T]) -> bool {
    let Some(i) = items.windows(2).rposition(|w| w[0] < w[1]) else {
        items.reverse();
        return false;
    };
    let j = items
        .iter()
        .rposition(|x| *x > items[i])
        .unwrap_or(i + 1);
    items.swap(i, j);
    items[i + 1..].reverse();
    true
}

#[test]
fn randomized_insert_delete_get() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(2);
    let mut m: RoarMultimap<u32, u32> = RoarMultimap::new();
    let mut model = Model::default();

    for _ in 0..20_000 {
        let key = rng.gen_range(0..100u32);
        let value = rng.gen_range(0..1000u16);
        match rng.gen_range(0..3) {
            0 => {
                assert_eq!(m.push(key, value as u32), model.push(key as u8, value));
            }
            1 => {
                let expected = model
                    .get(key as u8)
                    .map(|vs| vs.into_iter().map(u32::from).collect::<Vec<_>>());
                assert_eq!(m.get(&key), expected);
            }
            _ => {
                m.delete(&key);
                model.map.remove(&(key as u8));
            }
        }
    }

    assert_eq!(m.count(), model.map.len());
    m.validate();
}
