pub mod items;
pub mod monsters;

use bracket_random::prelude::RandomNumberGenerator;

/// Step function keyed by floor: the value of the highest threshold <= floor,
/// zero below the first threshold. Tables are listed in ascending floor order.
pub type CapTable = &'static [(i32, i32)];

pub const MAX_ITEMS_BY_FLOOR: CapTable = &[(1, 1), (3, 2), (6, 3), (8, 4), (10, 5)];

pub const MAX_MONSTERS_BY_FLOOR: CapTable = &[(1, 1), (2, 2), (4, 4), (8, 6), (10, 7)];

pub fn max_value_for_floor(table: CapTable, floor: i32) -> i32 {
    let mut current = 0;
    for &(floor_minimum, value) in table {
        if floor_minimum > floor {
            break;
        }
        current = value;
    }
    current
}

/// Floor-tiered weighted spawn table. Tiers whose key is <= the current
/// floor are merged in ascending order; a later tier's weight for an
/// archetype overwrites the earlier one, and weight 0 removes it from the
/// draw without removing it from the merge.
pub struct SpawnTable<T: 'static> {
    pub tiers: &'static [(i32, &'static [(&'static T, i32)])],
}

impl<T> SpawnTable<T> {
    /// Effective (archetype, weight) pairs at the given floor, in
    /// first-appearance order.
    pub fn effective_weights(&self, floor: i32) -> Vec<(&'static T, i32)> {
        let mut merged: Vec<(&'static T, i32)> = Vec::new();
        for &(tier_floor, entries) in self.tiers {
            if tier_floor > floor {
                break;
            }
            for &(archetype, weight) in entries {
                match merged
                    .iter_mut()
                    .find(|(seen, _)| std::ptr::eq(*seen, archetype))
                {
                    Some(slot) => slot.1 = weight,
                    None => merged.push((archetype, weight)),
                }
            }
        }
        merged
    }

    /// Draw `count` archetypes with replacement. Entries with effective
    /// weight 0 are never drawn.
    pub fn sample(
        &self,
        rng: &mut RandomNumberGenerator,
        floor: i32,
        count: i32,
    ) -> Vec<&'static T> {
        let weights = self.effective_weights(floor);
        let total: i32 = weights.iter().map(|(_, weight)| *weight).sum();
        if total <= 0 {
            return Vec::new();
        }

        let mut chosen = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            let mut roll = rng.range(0, total);
            for &(archetype, weight) in &weights {
                if roll < weight {
                    chosen.push(archetype);
                    break;
                }
                roll -= weight;
            }
        }
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_follow_the_literal_thresholds() {
        assert_eq!(max_value_for_floor(MAX_MONSTERS_BY_FLOOR, 1), 1);
        assert_eq!(max_value_for_floor(MAX_MONSTERS_BY_FLOOR, 3), 4);
        assert_eq!(max_value_for_floor(MAX_MONSTERS_BY_FLOOR, 8), 6);
        assert_eq!(max_value_for_floor(MAX_ITEMS_BY_FLOOR, 1), 1);
        assert_eq!(max_value_for_floor(MAX_ITEMS_BY_FLOOR, 10), 5);
    }

    #[test]
    fn caps_are_non_decreasing() {
        for table in [MAX_MONSTERS_BY_FLOOR, MAX_ITEMS_BY_FLOOR] {
            let mut previous = 0;
            for floor in 0..=FINAL_TEST_FLOOR {
                let value = max_value_for_floor(table, floor);
                assert!(value >= previous, "cap regressed at floor {floor}");
                previous = value;
            }
        }
    }

    const FINAL_TEST_FLOOR: i32 = 12;

    #[test]
    fn later_tiers_overwrite_earlier_weights() {
        static A: u8 = 0;
        static B: u8 = 1;
        static TIER_1: &[(&u8, i32)] = &[(&A, 10), (&B, 5)];
        static TIER_3: &[(&u8, i32)] = &[(&A, 0)];
        static TIERS: &[(i32, &[(&u8, i32)])] = &[(1, TIER_1), (3, TIER_3)];
        let table = SpawnTable { tiers: TIERS };

        let early = table.effective_weights(2);
        assert_eq!(early, vec![(&A, 10), (&B, 5)]);
        let late = table.effective_weights(3);
        assert_eq!(late, vec![(&A, 0), (&B, 5)]);
    }

    #[test]
    fn zero_weight_entries_are_never_drawn() {
        static A: u8 = 0;
        static B: u8 = 1;
        static TIER: &[(&u8, i32)] = &[(&A, 0), (&B, 7)];
        static TIERS: &[(i32, &[(&u8, i32)])] = &[(1, TIER)];
        let table = SpawnTable { tiers: TIERS };
        let mut rng = RandomNumberGenerator::seeded(42);
        for pick in table.sample(&mut rng, 1, 200) {
            assert!(std::ptr::eq(pick, &B));
        }
    }

    #[test]
    fn sampling_an_all_zero_table_yields_nothing() {
        static A: u8 = 0;
        static TIER: &[(&u8, i32)] = &[(&A, 0)];
        static TIERS: &[(i32, &[(&u8, i32)])] = &[(1, TIER)];
        let table = SpawnTable { tiers: TIERS };
        let mut rng = RandomNumberGenerator::seeded(42);
        assert!(table.sample(&mut rng, 1, 10).is_empty());
    }
}
