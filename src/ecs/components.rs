use bracket_color::prelude::RGB;
use bracket_geometry::prelude::Point;
use serde::{Deserialize, Serialize};
use specs::prelude::{Component, Entity, NullStorage, VecStorage};

/// Which container currently owns an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    OnFloor(Point),
    HeldBy(Entity),
}

impl Location {
    pub fn floor_point(&self) -> Option<Point> {
        match self {
            Location::OnFloor(point) => Some(*point),
            Location::HeldBy(_) => None,
        }
    }
}

impl Component for Location {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RenderOrder {
    Corpse,
    Item,
    Actor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Renderable {
    pub glyph: char,
    pub color: RGB,
    pub order: RenderOrder,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Named {
    pub name: String,
}

impl Component for Named {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct BlocksTile;

impl Component for BlocksTile {
    type Storage = NullStorage<Self>;
}

#[derive(Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Default)]
pub struct ItemTag;

impl Component for ItemTag {
    type Storage = NullStorage<Self>;
}

/// Hit points and base stats. `hp` is only written through
/// [`EcsWorld::set_hp`](super::EcsWorld::set_hp), which owns the death
/// transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub max_hp: i32,
    hp: i32,
    pub base_power: i32,
    pub base_defense: i32,
}

impl CombatStats {
    pub fn new(hp: i32, base_power: i32, base_defense: i32) -> Self {
        Self {
            max_hp: hp,
            hp,
            base_power,
            base_defense,
        }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn missing_hp(&self) -> i32 {
        self.max_hp - self.hp
    }

    pub(crate) fn write_hp(&mut self, value: i32) -> i32 {
        self.hp = value.clamp(0, self.max_hp.max(0));
        self.hp
    }

    pub(crate) fn with_hp(mut self, value: i32) -> Self {
        self.write_hp(value);
        self
    }
}

impl Component for CombatStats {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    pub capacity: usize,
    pub items: Vec<Entity>,
}

impl Inventory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }
}

impl Component for Inventory {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    Weapon,
    Armor,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Equipment {
    pub weapon: Option<Entity>,
    pub armor: Option<Entity>,
}

impl Equipment {
    pub fn slot(&self, slot: EquipSlot) -> Option<Entity> {
        match slot {
            EquipSlot::Weapon => self.weapon,
            EquipSlot::Armor => self.armor,
        }
    }

    pub fn set_slot(&mut self, slot: EquipSlot, item: Option<Entity>) {
        match slot {
            EquipSlot::Weapon => self.weapon = item,
            EquipSlot::Armor => self.armor = item,
        }
    }

    pub fn slot_of(&self, item: Entity) -> Option<EquipSlot> {
        if self.weapon == Some(item) {
            Some(EquipSlot::Weapon)
        } else if self.armor == Some(item) {
            Some(EquipSlot::Armor)
        } else {
            None
        }
    }

    pub fn equipped(&self) -> impl Iterator<Item = Entity> + '_ {
        self.weapon.iter().chain(self.armor.iter()).copied()
    }
}

impl Component for Equipment {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equippable {
    pub slot: EquipSlot,
    pub power_bonus: i32,
    pub defense_bonus: i32,
}

impl Component for Equippable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consumable {
    Healing { amount: i32 },
    Confusion { turns: i32 },
    Fireball { damage: i32, radius: i32 },
    Lightning { damage: i32, max_range: i32 },
}

impl Component for Consumable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelUpChoice {
    /// +20 max HP, healed by the same amount.
    Constitution,
    /// +1 attack.
    Strength,
    /// +1 defense.
    Agility,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub current_level: i32,
    pub current_xp: i32,
    pub level_up_base: i32,
    pub level_up_factor: i32,
    /// Awarded to the player when this actor dies.
    pub xp_given: i32,
}

impl Default for Level {
    fn default() -> Self {
        Self {
            current_level: 1,
            current_xp: 0,
            level_up_base: 0,
            level_up_factor: 150,
            xp_given: 0,
        }
    }
}

impl Level {
    pub fn experience_to_next_level(&self) -> i32 {
        self.level_up_base + self.current_level * self.level_up_factor
    }

    pub fn requires_level_up(&self) -> bool {
        self.current_xp >= self.experience_to_next_level()
    }

    /// Returns true when the gain crossed the threshold.
    pub fn add_xp(&mut self, xp: i32) -> bool {
        if xp <= 0 || self.level_up_base == 0 {
            return false;
        }
        self.current_xp += xp;
        self.requires_level_up()
    }

    pub(crate) fn increase_level(&mut self) {
        self.current_xp -= self.experience_to_next_level();
        self.current_level += 1;
    }
}

impl Component for Level {
    type Storage = VecStorage<Self>;
}

/// Behaviour of a living actor. Removing the component is what death means.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ai {
    /// Alive but never acts on its own (the player).
    Idle,
    /// Chases the player, remembering the last computed route.
    Hostile { path: Vec<Point> },
    Confused {
        turns_remaining: i32,
        previous: Box<Ai>,
    },
}

impl Ai {
    pub fn hostile() -> Self {
        Ai::Hostile { path: Vec::new() }
    }
}

impl Component for Ai {
    type Storage = VecStorage<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use specs::{Builder, World, WorldExt};

    #[test]
    fn hp_writes_are_clamped() {
        let mut stats = CombatStats::new(10, 3, 0);
        assert_eq!(stats.write_hp(-4), 0);
        assert_eq!(stats.write_hp(99), 10);
        assert_eq!(stats.write_hp(6), 6);
        assert_eq!(stats.missing_hp(), 4);
    }

    #[test]
    fn xp_threshold_grows_with_level() {
        let mut level = Level {
            level_up_base: 200,
            ..Level::default()
        };
        let mut previous = level.experience_to_next_level();
        assert_eq!(previous, 350);
        for _ in 0..5 {
            level.current_xp = level.experience_to_next_level();
            level.increase_level();
            let next = level.experience_to_next_level();
            assert!(next >= previous);
            previous = next;
        }
        assert_eq!(level.current_level, 6);
    }

    #[test]
    fn crossing_the_threshold_flags_a_level_up() {
        let mut level = Level {
            level_up_base: 200,
            ..Level::default()
        };
        assert!(!level.add_xp(100));
        assert!(level.add_xp(250));
        assert!(level.requires_level_up());
        level.increase_level();
        assert_eq!(level.current_level, 2);
        assert_eq!(level.current_xp, 0);
        assert!(!level.requires_level_up());
    }

    #[test]
    fn monsters_without_a_base_never_level() {
        let mut level = Level {
            xp_given: 35,
            ..Level::default()
        };
        assert!(!level.add_xp(1_000));
        assert_eq!(level.current_xp, 0);
    }

    #[test]
    fn equipment_tracks_slots() {
        let mut world = World::new();
        let sword = world.create_entity().build();
        let mail = world.create_entity().build();
        let mut equipment = Equipment::default();
        equipment.set_slot(EquipSlot::Weapon, Some(sword));
        equipment.set_slot(EquipSlot::Armor, Some(mail));
        assert_eq!(equipment.slot_of(sword), Some(EquipSlot::Weapon));
        assert_eq!(equipment.equipped().count(), 2);
        equipment.set_slot(EquipSlot::Weapon, None);
        assert_eq!(equipment.slot_of(sword), None);
    }
}
