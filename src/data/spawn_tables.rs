//! Floor-gated spawn tables.
//!
//! A tier becomes active once the dungeon reaches its minimum floor and stays
//! active below it. When several active tiers name the same kind, the deepest
//! tier's weight wins.

use bracket_random::prelude::RandomNumberGenerator;

use crate::data::{items::ItemKind, monsters::MonsterKind};
use crate::map::FloorId;

/// `(minimum floor, value)` steps for the per-room item cap.
pub const MAX_ITEMS_BY_FLOOR: &[(u32, u32)] = &[(1, 1), (4, 2)];

/// `(minimum floor, value)` steps for the per-room monster cap.
pub const MAX_MONSTERS_BY_FLOOR: &[(u32, u32)] = &[(1, 2), (4, 3), (6, 5)];

/// Value of the deepest step whose minimum floor has been reached.
pub fn max_value_for_floor(steps: &[(u32, u32)], floor: FloorId) -> u32 {
    let mut current = 0;
    for &(min_floor, value) in steps {
        if min_floor > floor.0 {
            break;
        }
        current = value;
    }
    current
}

#[derive(Clone, Debug)]
pub struct SpawnTable<K> {
    tiers: Vec<(u32, Vec<(K, u32)>)>,
}

impl<K: Copy + PartialEq> SpawnTable<K> {
    pub fn new(mut tiers: Vec<(u32, Vec<(K, u32)>)>) -> Self {
        tiers.sort_by_key(|(min_floor, _)| *min_floor);
        Self { tiers }
    }

    /// Active kinds and their weights, in first-unlocked order.
    pub fn weights_for(&self, floor: FloorId) -> Vec<(K, u32)> {
        let mut weights: Vec<(K, u32)> = Vec::new();
        for (min_floor, entries) in &self.tiers {
            if *min_floor > floor.0 {
                break;
            }
            for &(kind, weight) in entries {
                match weights.iter_mut().find(|(known, _)| *known == kind) {
                    Some(existing) => existing.1 = weight,
                    None => weights.push((kind, weight)),
                }
            }
        }
        weights
    }

    /// Draws `count` kinds with replacement.
    pub fn roll(&self, rng: &mut RandomNumberGenerator, count: u32, floor: FloorId) -> Vec<K> {
        let weights = self.weights_for(floor);
        let total: u32 = weights.iter().map(|(_, weight)| weight).sum();
        if total == 0 {
            return Vec::new();
        }

        let mut picks = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let mut roll = rng.range(0, total);
            for &(kind, weight) in &weights {
                if roll < weight {
                    picks.push(kind);
                    break;
                }
                roll -= weight;
            }
        }
        picks
    }
}

pub fn item_table() -> SpawnTable<ItemKind> {
    SpawnTable::new(vec![
        (0, vec![(ItemKind::HealthPotion, 35)]),
        (2, vec![(ItemKind::ConfusionScroll, 10)]),
        (4, vec![(ItemKind::LightningScroll, 25), (ItemKind::Sword, 5)]),
        (6, vec![(ItemKind::FireballScroll, 25), (ItemKind::ChainMail, 15)]),
    ])
}

pub fn monster_table() -> SpawnTable<MonsterKind> {
    SpawnTable::new(vec![
        (0, vec![(MonsterKind::Orc, 80)]),
        (3, vec![(MonsterKind::Troll, 15)]),
        (5, vec![(MonsterKind::Troll, 30)]),
        (7, vec![(MonsterKind::Troll, 60)]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_step_up_with_depth() {
        let caps: Vec<u32> = (1..=7)
            .map(|floor| max_value_for_floor(MAX_MONSTERS_BY_FLOOR, FloorId(floor)))
            .collect();
        assert_eq!(caps, vec![2, 2, 2, 3, 3, 5, 5]);
        assert_eq!(max_value_for_floor(MAX_ITEMS_BY_FLOOR, FloorId(3)), 1);
        assert_eq!(max_value_for_floor(MAX_ITEMS_BY_FLOOR, FloorId(9)), 2);
        assert_eq!(max_value_for_floor(MAX_ITEMS_BY_FLOOR, FloorId(0)), 0);
    }

    #[test]
    fn entries_unlock_and_stay_unlocked() {
        let table = monster_table();
        assert_eq!(table.weights_for(FloorId(1)), vec![(MonsterKind::Orc, 80)]);
        assert_eq!(
            table.weights_for(FloorId(3)),
            vec![(MonsterKind::Orc, 80), (MonsterKind::Troll, 15)]
        );
        assert_eq!(
            table.weights_for(FloorId(12)),
            vec![(MonsterKind::Orc, 80), (MonsterKind::Troll, 60)]
        );

        let items = item_table();
        for floor in 6..10 {
            assert_eq!(items.weights_for(FloorId(floor)).len(), 6);
        }
    }

    #[test]
    fn locked_kinds_are_never_rolled() {
        let mut rng = RandomNumberGenerator::seeded(3);
        let picks = item_table().roll(&mut rng, 200, FloorId(1));
        assert_eq!(picks.len(), 200);
        assert!(picks.iter().all(|kind| *kind == ItemKind::HealthPotion));
    }

    #[test]
    fn unsorted_tiers_behave_like_sorted_ones() {
        let table = SpawnTable::new(vec![(5, vec![('b', 1)]), (0, vec![('a', 1)])]);
        assert_eq!(table.weights_for(FloorId(2)), vec![('a', 1)]);
        assert_eq!(table.weights_for(FloorId(5)), vec![('a', 1), ('b', 1)]);
    }

    #[test]
    fn zero_weights_roll_nothing() {
        let mut rng = RandomNumberGenerator::seeded(1);
        let table = SpawnTable::new(vec![(0, vec![('x', 0)])]);
        assert!(table.roll(&mut rng, 5, FloorId(1)).is_empty());
    }
}
