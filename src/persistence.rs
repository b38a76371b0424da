//! Whole-session snapshots.
//!
//! `specs` handles are process-local, so every entity is re-keyed to its
//! position in [`Snapshot::entities`] and references between entities
//! (holder, inventory, equipment) are stored as those indices.

use std::collections::HashMap;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use specs::prelude::{Builder, Entity, Join, WorldExt};

use crate::{
    config::GameConfig,
    ecs::{
        EcsWorld,
        components::{
            Ai, BlocksTile, CombatStats, Consumable, Equipment, Equippable, Inventory, ItemTag,
            Level, Location, Named, PlayerTag, Renderable,
        },
        resources::{Message, MessageLog},
    },
    error::GameError,
    map::{FloorId, GameMap},
    session::{GameState, Session},
};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LocationSnapshot {
    OnFloor(Point),
    HeldBy(u32),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub capacity: usize,
    pub items: Vec<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSnapshot {
    pub weapon: Option<u32>,
    pub armor: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub location: LocationSnapshot,
    pub name: Option<String>,
    pub renderable: Option<Renderable>,
    #[serde(default)]
    pub blocks_tile: bool,
    #[serde(default)]
    pub item: bool,
    pub stats: Option<CombatStats>,
    pub inventory: Option<InventorySnapshot>,
    pub equipment: Option<EquipmentSnapshot>,
    pub equippable: Option<Equippable>,
    pub consumable: Option<Consumable>,
    pub level: Option<Level>,
    pub ai: Option<Ai>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub seed: u64,
    pub turn: u64,
    pub floor: FloorId,
    pub state: GameState,
    pub map: GameMap,
    pub entities: Vec<EntitySnapshot>,
    pub player: u32,
    pub messages: Vec<Message>,
    /// Generator state at save time, so later floors and rolls match.
    pub rng: RandomNumberGenerator,
}

impl Snapshot {
    pub fn capture(session: &Session) -> Self {
        let world = &session.ecs.specs_world;
        let entities = world.entities();
        let locations = world.read_component::<Location>();

        let order: Vec<(Entity, Location)> = (&entities, &locations)
            .join()
            .map(|(entity, location)| (entity, *location))
            .collect();
        let index: HashMap<Entity, u32> = order
            .iter()
            .enumerate()
            .map(|(idx, (entity, _))| (*entity, idx as u32))
            .collect();
        let key = |entity: Entity| index.get(&entity).copied();

        let names = world.read_component::<Named>();
        let renderables = world.read_component::<Renderable>();
        let blockers = world.read_component::<BlocksTile>();
        let items = world.read_component::<ItemTag>();
        let stats = world.read_component::<CombatStats>();
        let inventories = world.read_component::<Inventory>();
        let equipment = world.read_component::<Equipment>();
        let equippables = world.read_component::<Equippable>();
        let consumables = world.read_component::<Consumable>();
        let levels = world.read_component::<Level>();
        let ais = world.read_component::<Ai>();

        let snapshots = order
            .iter()
            .map(|(entity, location)| {
                let entity = *entity;
                EntitySnapshot {
                    location: match location {
                        Location::OnFloor(point) => LocationSnapshot::OnFloor(*point),
                        Location::HeldBy(holder) => {
                            LocationSnapshot::HeldBy(key(*holder).unwrap_or(u32::MAX))
                        }
                    },
                    name: names.get(entity).map(|named| named.name.clone()),
                    renderable: renderables.get(entity).cloned(),
                    blocks_tile: blockers.contains(entity),
                    item: items.contains(entity),
                    stats: stats.get(entity).cloned(),
                    inventory: inventories.get(entity).map(|inventory| InventorySnapshot {
                        capacity: inventory.capacity,
                        items: inventory.items.iter().filter_map(|item| key(*item)).collect(),
                    }),
                    equipment: equipment.get(entity).map(|gear| EquipmentSnapshot {
                        weapon: gear.weapon.and_then(key),
                        armor: gear.armor.and_then(key),
                    }),
                    equippable: equippables.get(entity).copied(),
                    consumable: consumables.get(entity).copied(),
                    level: levels.get(entity).cloned(),
                    ai: ais.get(entity).cloned(),
                }
            })
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            seed: session.seed,
            turn: session.turn,
            floor: session.floor,
            state: session.state,
            map: session.map.clone(),
            entities: snapshots,
            player: key(session.ecs.player).unwrap_or(u32::MAX),
            messages: session.ecs.log().messages().to_vec(),
            rng: RandomNumberGenerator::clone(&session.ecs.rng()),
        }
    }

    /// Rebuilds a live session, resuming the saved random stream.
    pub fn restore(self, mut config: GameConfig) -> Result<Session, GameError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(GameError::SnapshotVersion {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        config.map_width = self.map.width;
        config.map_height = self.map.height;
        config.seed = Some(self.seed);

        let mut world = EcsWorld::empty_world(self.seed, config.message_history);
        let handles: Vec<Entity> = self
            .entities
            .iter()
            .map(|_| world.create_entity().build())
            .collect();
        let resolve = |idx: u32| {
            handles
                .get(idx as usize)
                .copied()
                .ok_or(GameError::UnknownEntity(idx))
        };
        let player = resolve(self.player)?;

        for (entity, snapshot) in handles.iter().copied().zip(self.entities) {
            let location = match snapshot.location {
                LocationSnapshot::OnFloor(point) => Location::OnFloor(point),
                LocationSnapshot::HeldBy(holder) => Location::HeldBy(resolve(holder)?),
            };
            let _ = world.write_component::<Location>().insert(entity, location);
            if let Some(name) = snapshot.name {
                let _ = world.write_component::<Named>().insert(entity, Named { name });
            }
            if let Some(renderable) = snapshot.renderable {
                let _ = world.write_component::<Renderable>().insert(entity, renderable);
            }
            if snapshot.blocks_tile {
                let _ = world.write_component::<BlocksTile>().insert(entity, BlocksTile);
            }
            if snapshot.item {
                let _ = world.write_component::<ItemTag>().insert(entity, ItemTag);
            }
            if let Some(stats) = snapshot.stats {
                let hp = stats.hp();
                let _ = world
                    .write_component::<CombatStats>()
                    .insert(entity, stats.with_hp(hp));
            }
            if let Some(inventory) = snapshot.inventory {
                let items = inventory
                    .items
                    .into_iter()
                    .map(&resolve)
                    .collect::<Result<Vec<_>, _>>()?;
                let _ = world.write_component::<Inventory>().insert(
                    entity,
                    Inventory {
                        capacity: inventory.capacity,
                        items,
                    },
                );
            }
            if let Some(gear) = snapshot.equipment {
                let equipment = Equipment {
                    weapon: gear.weapon.map(&resolve).transpose()?,
                    armor: gear.armor.map(&resolve).transpose()?,
                };
                let _ = world.write_component::<Equipment>().insert(entity, equipment);
            }
            if let Some(equippable) = snapshot.equippable {
                let _ = world.write_component::<Equippable>().insert(entity, equippable);
            }
            if let Some(consumable) = snapshot.consumable {
                let _ = world.write_component::<Consumable>().insert(entity, consumable);
            }
            if let Some(level) = snapshot.level {
                let _ = world.write_component::<Level>().insert(entity, level);
            }
            if let Some(ai) = snapshot.ai {
                let _ = world.write_component::<Ai>().insert(entity, ai);
            }
        }

        if !world.read_component::<CombatStats>().contains(player) {
            return Err(GameError::missing(player, "CombatStats"));
        }
        let _ = world.write_component::<PlayerTag>().insert(player, PlayerTag);
        world.insert(self.rng);
        world.insert(MessageLog::from_messages(
            self.messages,
            config.message_history,
        ));

        let ecs = EcsWorld {
            specs_world: world,
            player,
        };
        Ok(Session::from_parts(
            config, self.map, ecs, self.floor, self.state, self.seed, self.turn,
        ))
    }
}
