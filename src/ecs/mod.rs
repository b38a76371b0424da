pub mod components;
pub mod resources;

use bracket_color::prelude::RGB;
use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::{Builder, Entity, Join, World as SpecsWorld, WorldExt};
use specs::shred::{Fetch, FetchMut};

use crate::{
    data::{items::ItemTemplate, monsters::ActorTemplate},
    error::ActionFailure,
};

use self::{
    components::{
        Ai, BlocksTile, CombatStats, Consumable, Equipment, Equippable, Inventory, ItemTag,
        Level, Location, Named, PlayerTag, RenderOrder, Renderable,
    },
    resources::{MessageLog, palette},
};

/// What the renderer needs to draw one entity.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderEntry {
    pub entity: Entity,
    pub point: Point,
    pub glyph: char,
    pub color: RGB,
    pub order: RenderOrder,
    pub name: String,
}

/// The entity registry: every actor and item of the current floor, plus the
/// player and whatever the player carries.
pub struct EcsWorld {
    pub(crate) specs_world: SpecsWorld,
    pub(crate) player: Entity,
}

impl EcsWorld {
    pub fn new(player: &ActorTemplate, spawn: Point, seed: u64, message_history: usize) -> Self {
        let mut specs_world = Self::empty_world(seed, message_history);
        let player = Self::build_actor(&mut specs_world, player, spawn)
            .with(PlayerTag)
            .build();
        Self {
            specs_world,
            player,
        }
    }

    pub(crate) fn empty_world(seed: u64, message_history: usize) -> SpecsWorld {
        let mut world = SpecsWorld::new();
        Self::register_components(&mut world);
        world.insert(RandomNumberGenerator::seeded(seed));
        world.insert(MessageLog::with_capacity(message_history));
        world
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Location>();
        world.register::<Renderable>();
        world.register::<Named>();
        world.register::<BlocksTile>();
        world.register::<PlayerTag>();
        world.register::<ItemTag>();
        world.register::<CombatStats>();
        world.register::<Inventory>();
        world.register::<Equipment>();
        world.register::<Equippable>();
        world.register::<Consumable>();
        world.register::<Level>();
        world.register::<Ai>();
    }

    fn build_actor<'a>(
        world: &'a mut SpecsWorld,
        template: &ActorTemplate,
        point: Point,
    ) -> specs::EntityBuilder<'a> {
        world
            .create_entity()
            .with(Location::OnFloor(point))
            .with(Renderable {
                glyph: template.glyph,
                color: template.color,
                order: RenderOrder::Actor,
            })
            .with(Named {
                name: template.name.to_string(),
            })
            .with(BlocksTile)
            .with(CombatStats::new(template.hp, template.power, template.defense))
            .with(Inventory::with_capacity(template.inventory_capacity))
            .with(Equipment::default())
            .with(Level {
                level_up_base: template.level_up_base,
                xp_given: template.xp_given,
                ..Level::default()
            })
            .with(template.ai.clone())
    }

    pub fn spawn_actor(&mut self, template: &ActorTemplate, point: Point) -> Entity {
        Self::build_actor(&mut self.specs_world, template, point).build()
    }

    fn build_item(&mut self, template: &ItemTemplate, location: Location) -> Entity {
        let mut builder = self
            .specs_world
            .create_entity()
            .with(location)
            .with(Renderable {
                glyph: template.glyph,
                color: template.color,
                order: RenderOrder::Item,
            })
            .with(Named {
                name: template.name.to_string(),
            })
            .with(ItemTag);
        if let Some(effect) = template.consumable {
            builder = builder.with(effect);
        }
        if let Some(equippable) = template.equippable {
            builder = builder.with(equippable);
        }
        builder.build()
    }

    pub fn spawn_item(&mut self, template: &ItemTemplate, point: Point) -> Entity {
        self.build_item(template, Location::OnFloor(point))
    }

    /// Creates an item directly inside `holder`'s inventory.
    pub fn spawn_item_in_inventory(
        &mut self,
        holder: Entity,
        template: &ItemTemplate,
    ) -> Result<Entity, ActionFailure> {
        let full = self
            .specs_world
            .read_component::<Inventory>()
            .get(holder)
            .map(Inventory::is_full)
            .ok_or(ActionFailure::CannotAct)?;
        if full {
            return Err(ActionFailure::InventoryFull);
        }
        let item = self.build_item(template, Location::HeldBy(holder));
        if let Some(inventory) = self
            .specs_world
            .write_component::<Inventory>()
            .get_mut(holder)
        {
            inventory.items.push(item);
        }
        Ok(item)
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn is_player(&self, entity: Entity) -> bool {
        entity == self.player
    }

    pub fn exists(&self, entity: Entity) -> bool {
        self.specs_world.is_alive(entity)
    }

    pub fn location(&self, entity: Entity) -> Option<Location> {
        self.specs_world
            .read_component::<Location>()
            .get(entity)
            .copied()
    }

    /// Map coordinate of an entity lying on the floor.
    pub fn position(&self, entity: Entity) -> Option<Point> {
        self.location(entity).and_then(|location| location.floor_point())
    }

    pub fn player_point(&self) -> Option<Point> {
        self.position(self.player)
    }

    pub fn set_position(&mut self, entity: Entity, point: Point) {
        let mut locations = self.specs_world.write_component::<Location>();
        let _ = locations.insert(entity, Location::OnFloor(point));
    }

    pub fn name(&self, entity: Entity) -> String {
        self.specs_world
            .read_component::<Named>()
            .get(entity)
            .map(|named| named.name.clone())
            .unwrap_or_else(|| "something".to_string())
    }

    pub fn renderable(&self, entity: Entity) -> Option<Renderable> {
        self.specs_world
            .read_component::<Renderable>()
            .get(entity)
            .cloned()
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.specs_world.read_component::<Ai>().contains(entity)
    }

    pub fn blocks_movement(&self, entity: Entity) -> bool {
        self.specs_world.read_component::<BlocksTile>().contains(entity)
    }

    /// Entities on the floor at `point`, in registry order.
    pub fn entities_at(&self, point: Point) -> Vec<Entity> {
        let entities = self.specs_world.entities();
        let locations = self.specs_world.read_component::<Location>();
        (&entities, &locations)
            .join()
            .filter(|(_, location)| **location == Location::OnFloor(point))
            .map(|(entity, _)| entity)
            .collect()
    }

    pub fn blocking_entity_at(&self, point: Point) -> Option<Entity> {
        let entities = self.specs_world.entities();
        let locations = self.specs_world.read_component::<Location>();
        let blockers = self.specs_world.read_component::<BlocksTile>();
        (&entities, &locations, &blockers)
            .join()
            .find(|(_, location, _)| **location == Location::OnFloor(point))
            .map(|(entity, _, _)| entity)
    }

    /// The living actor standing at `point`, if any.
    pub fn actor_at(&self, point: Point) -> Option<Entity> {
        let entities = self.specs_world.entities();
        let locations = self.specs_world.read_component::<Location>();
        let stats = self.specs_world.read_component::<CombatStats>();
        let ais = self.specs_world.read_component::<Ai>();
        (&entities, &locations, &stats, &ais)
            .join()
            .find(|(_, location, _, _)| **location == Location::OnFloor(point))
            .map(|(entity, _, _, _)| entity)
    }

    pub fn items_at(&self, point: Point) -> Vec<Entity> {
        let entities = self.specs_world.entities();
        let locations = self.specs_world.read_component::<Location>();
        let items = self.specs_world.read_component::<ItemTag>();
        (&entities, &locations, &items)
            .join()
            .filter(|(_, location, _)| **location == Location::OnFloor(point))
            .map(|(entity, _, _)| entity)
            .collect()
    }

    /// Every living actor on the floor with its position, player included.
    pub fn living_actors(&self) -> Vec<(Entity, Point)> {
        let entities = self.specs_world.entities();
        let locations = self.specs_world.read_component::<Location>();
        let stats = self.specs_world.read_component::<CombatStats>();
        let ais = self.specs_world.read_component::<Ai>();
        (&entities, &locations, &stats, &ais)
            .join()
            .filter_map(|(entity, location, _, _)| location.floor_point().map(|p| (entity, p)))
            .collect()
    }

    /// Positions of everything that blocks movement.
    pub fn blocker_points(&self) -> Vec<Point> {
        let locations = self.specs_world.read_component::<Location>();
        let blockers = self.specs_world.read_component::<BlocksTile>();
        (&locations, &blockers)
            .join()
            .filter_map(|(location, _)| location.floor_point())
            .collect()
    }

    pub fn stats(&self, entity: Entity) -> Option<CombatStats> {
        self.specs_world
            .read_component::<CombatStats>()
            .get(entity)
            .cloned()
    }

    fn equipment_bonus(&self, entity: Entity) -> (i32, i32) {
        let equipment = self.specs_world.read_component::<Equipment>();
        let equippables = self.specs_world.read_component::<Equippable>();
        equipment
            .get(entity)
            .map(|gear| {
                gear.equipped()
                    .filter_map(|item| equippables.get(item))
                    .fold((0, 0), |(power, defense), bonus| {
                        (power + bonus.power_bonus, defense + bonus.defense_bonus)
                    })
            })
            .unwrap_or((0, 0))
    }

    pub fn effective_power(&self, entity: Entity) -> i32 {
        let base = self.stats(entity).map_or(0, |stats| stats.base_power);
        base + self.equipment_bonus(entity).0
    }

    pub fn effective_defense(&self, entity: Entity) -> i32 {
        let base = self.stats(entity).map_or(0, |stats| stats.base_defense);
        base + self.equipment_bonus(entity).1
    }

    /// Writes hit points, clamped to `[0, max_hp]`. Reaching zero while the
    /// entity still has an AI kills it on the spot. Returns the stored value.
    pub fn set_hp(&mut self, entity: Entity, value: i32) -> Option<i32> {
        let hp = self
            .specs_world
            .write_component::<CombatStats>()
            .get_mut(entity)?
            .write_hp(value);
        if hp == 0 && self.is_alive(entity) {
            self.die(entity);
        }
        Some(hp)
    }

    pub fn take_damage(&mut self, entity: Entity, amount: i32) {
        if let Some(stats) = self.stats(entity) {
            self.set_hp(entity, stats.hp() - amount);
        }
    }

    /// Heals up to `amount`, returning how much was actually recovered.
    pub fn heal(&mut self, entity: Entity, amount: i32) -> i32 {
        let Some(stats) = self.stats(entity) else {
            return 0;
        };
        let before = stats.hp();
        let after = self.set_hp(entity, before + amount).unwrap_or(before);
        after - before
    }

    fn die(&mut self, entity: Entity) {
        let name = self.name(entity);
        if self.is_player(entity) {
            self.message("You died!", palette::PLAYER_DIE);
        } else {
            self.message(format!("{name} is dead!"), palette::ENEMY_DIE);
        }

        self.specs_world.write_component::<Ai>().remove(entity);
        self.specs_world.write_component::<BlocksTile>().remove(entity);
        {
            let mut renderables = self.specs_world.write_component::<Renderable>();
            if let Some(render) = renderables.get_mut(entity) {
                render.glyph = '%';
                render.color = RGB::from_u8(191, 0, 0);
                render.order = RenderOrder::Corpse;
            }
        }
        {
            let mut names = self.specs_world.write_component::<Named>();
            if let Some(named) = names.get_mut(entity) {
                named.name = format!("remains of {name}");
            }
        }

        if !self.is_player(entity) {
            let xp = self.level(entity).map_or(0, |level| level.xp_given);
            self.award_xp(self.player, xp);
        }
    }

    fn award_xp(&mut self, entity: Entity, xp: i32) {
        let (gained, level_up, next_level) = {
            let mut levels = self.specs_world.write_component::<Level>();
            let Some(level) = levels.get_mut(entity) else {
                return;
            };
            let before = level.current_xp;
            let level_up = level.add_xp(xp);
            (level.current_xp - before, level_up, level.current_level + 1)
        };
        if gained > 0 {
            self.message(
                format!("You gain {gained} experience points."),
                palette::WHITE,
            );
        }
        if level_up {
            self.message(format!("You advance to level {next_level}!"), palette::WHITE);
        }
    }

    pub fn level(&self, entity: Entity) -> Option<Level> {
        self.specs_world.read_component::<Level>().get(entity).cloned()
    }

    pub(crate) fn level_mut<R>(&mut self, entity: Entity, f: impl FnOnce(&mut Level) -> R) -> Option<R> {
        self.specs_world.write_component::<Level>().get_mut(entity).map(f)
    }

    pub(crate) fn stats_mut<R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut CombatStats) -> R,
    ) -> Option<R> {
        self.specs_world
            .write_component::<CombatStats>()
            .get_mut(entity)
            .map(f)
    }

    pub fn ai(&self, entity: Entity) -> Option<Ai> {
        self.specs_world.read_component::<Ai>().get(entity).cloned()
    }

    /// Replaces the behaviour of a living actor; corpses stay dead.
    pub fn set_ai(&mut self, entity: Entity, ai: Ai) {
        let mut ais = self.specs_world.write_component::<Ai>();
        if ais.contains(entity) {
            let _ = ais.insert(entity, ai);
        }
    }

    pub fn consumable(&self, item: Entity) -> Option<Consumable> {
        self.specs_world
            .read_component::<Consumable>()
            .get(item)
            .copied()
    }

    pub fn equippable(&self, item: Entity) -> Option<Equippable> {
        self.specs_world
            .read_component::<Equippable>()
            .get(item)
            .copied()
    }

    pub fn inventory(&self, entity: Entity) -> Option<Inventory> {
        self.specs_world
            .read_component::<Inventory>()
            .get(entity)
            .cloned()
    }

    pub fn inventory_items(&self, entity: Entity) -> Vec<Entity> {
        self.inventory(entity)
            .map(|inventory| inventory.items)
            .unwrap_or_default()
    }

    pub fn holds(&self, holder: Entity, item: Entity) -> bool {
        self.location(item) == Some(Location::HeldBy(holder))
    }

    pub fn equipment(&self, entity: Entity) -> Option<Equipment> {
        self.specs_world
            .read_component::<Equipment>()
            .get(entity)
            .cloned()
    }

    pub(crate) fn set_equipment(&mut self, entity: Entity, equipment: Equipment) {
        let _ = self
            .specs_world
            .write_component::<Equipment>()
            .insert(entity, equipment);
    }

    /// Moves an item from the floor into `holder`'s inventory. Callers check
    /// capacity first.
    pub(crate) fn transfer_to_inventory(&mut self, holder: Entity, item: Entity) {
        {
            let mut inventories = self.specs_world.write_component::<Inventory>();
            let Some(inventory) = inventories.get_mut(holder) else {
                return;
            };
            inventory.items.push(item);
        }
        let _ = self
            .specs_world
            .write_component::<Location>()
            .insert(item, Location::HeldBy(holder));
    }

    /// Moves a held item back onto the floor at `point`.
    pub(crate) fn transfer_to_floor(&mut self, holder: Entity, item: Entity, point: Point) {
        self.detach_from_holder(holder, item);
        let _ = self
            .specs_world
            .write_component::<Location>()
            .insert(item, Location::OnFloor(point));
    }

    fn detach_from_holder(&mut self, holder: Entity, item: Entity) {
        {
            let mut equipment = self.specs_world.write_component::<Equipment>();
            if let Some(gear) = equipment.get_mut(holder) {
                if let Some(slot) = gear.slot_of(item) {
                    gear.set_slot(slot, None);
                }
            }
        }
        let mut inventories = self.specs_world.write_component::<Inventory>();
        if let Some(inventory) = inventories.get_mut(holder) {
            inventory.items.retain(|held| *held != item);
        }
    }

    /// Removes a used-up item from its holder and from the registry.
    pub(crate) fn consume_item(&mut self, holder: Entity, item: Entity) {
        self.detach_from_holder(holder, item);
        let _ = self.specs_world.delete_entity(item);
    }

    /// Drops everything that belongs to the current floor. The player and the
    /// items it carries survive.
    pub(crate) fn clear_floor(&mut self) {
        let doomed: Vec<Entity> = {
            let entities = self.specs_world.entities();
            let locations = self.specs_world.read_component::<Location>();
            (&entities, &locations)
                .join()
                .filter(|(entity, location)| {
                    *entity != self.player && **location != Location::HeldBy(self.player)
                })
                .map(|(entity, _)| entity)
                .collect()
        };
        let _ = self.specs_world.delete_entities(&doomed);
        self.specs_world.maintain();
    }

    pub fn render_entries(&self) -> Vec<RenderEntry> {
        let entities = self.specs_world.entities();
        let locations = self.specs_world.read_component::<Location>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let names = self.specs_world.read_component::<Named>();
        let mut entries: Vec<RenderEntry> = (&entities, &locations, &renderables)
            .join()
            .filter_map(|(entity, location, render)| {
                let point = location.floor_point()?;
                Some(RenderEntry {
                    entity,
                    point,
                    glyph: render.glyph,
                    color: render.color,
                    order: render.order,
                    name: names
                        .get(entity)
                        .map(|named| named.name.clone())
                        .unwrap_or_default(),
                })
            })
            .collect();
        entries.sort_by_key(|entry| entry.order);
        entries
    }

    pub fn message<S: Into<String>>(&mut self, text: S, color: (u8, u8, u8)) {
        self.specs_world
            .write_resource::<MessageLog>()
            .push(text, color);
    }

    pub fn log(&self) -> Fetch<'_, MessageLog> {
        self.specs_world.read_resource::<MessageLog>()
    }

    pub(crate) fn rng(&self) -> FetchMut<'_, RandomNumberGenerator> {
        self.specs_world.write_resource::<RandomNumberGenerator>()
    }
}
