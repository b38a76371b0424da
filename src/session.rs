//! The per-input turn sequence and the read-only views a frontend needs.

use std::path::Path;

use bracket_geometry::prelude::Point;
use serde::{Deserialize, Serialize};
use specs::Entity;

use crate::{
    actions::{self, Command, capitalize},
    ai,
    config::GameConfig,
    data::{self, monsters::ActorTemplate},
    ecs::{
        EcsWorld, RenderEntry,
        components::{EquipSlot, LevelUpChoice},
        resources::{Message, palette},
    },
    error::{ActionFailure, GameError},
    map::{
        FloorId, GameMap, Tile, TileVisibility,
        fov::{ShadowcastFov, VisibilityProvider},
        generator::{DungeonGenerator, Layout},
    },
    persistence::Snapshot,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Playing,
    /// Waiting on [`Session::choose_level_up`].
    LevelUp,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The command succeeded and the world took its turn.
    Completed,
    /// Nothing happened; the failure text is already in the log.
    Rejected(ActionFailure),
    /// The session is not accepting that kind of input right now.
    Ignored,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TileView {
    pub point: Point,
    pub tile: Tile,
    pub visibility: TileVisibility,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InventoryEntry {
    pub slot: usize,
    pub item: Entity,
    pub name: String,
    pub equipped: Option<EquipSlot>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExperienceSummary {
    pub level: i32,
    pub current_xp: i32,
    pub xp_to_next_level: i32,
}

pub struct Session {
    pub(crate) config: GameConfig,
    pub(crate) map: GameMap,
    pub(crate) ecs: EcsWorld,
    pub(crate) floor: FloorId,
    pub(crate) state: GameState,
    pub(crate) seed: u64,
    pub(crate) turn: u64,
    pub(crate) layout: Option<Layout>,
    fov: Box<dyn VisibilityProvider>,
}

impl Session {
    /// Starts a new game on floor 1 with the default starting gear.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(clock_seed);
        let ecs = EcsWorld::new(
            &ActorTemplate::player(),
            Point::zero(),
            seed,
            config.message_history,
        );
        let mut session = Self::from_parts(
            config,
            GameMap::new(0, 0),
            ecs,
            FloorId::FIRST,
            GameState::Playing,
            seed,
            0,
        );

        let generator = DungeonGenerator::from_config(&session.config);
        let (map, layout) = generator.generate(&mut session.ecs, session.floor);
        session.map = map;
        session.layout = Some(layout);
        session.equip_starting_gear();
        session.refresh_visibility();
        session
            .ecs
            .message(data::WELCOME_MESSAGE, palette::WELCOME_TEXT);

        tracing::info!(seed, "new game");
        Ok(session)
    }

    /// A bare player on a hand-built map. The log starts empty.
    pub fn sandbox(map: GameMap, player_point: Point, seed: u64) -> Self {
        let config = GameConfig {
            map_width: map.width,
            map_height: map.height,
            seed: Some(seed),
            ..GameConfig::default()
        };
        let ecs = EcsWorld::new(
            &ActorTemplate::player(),
            player_point,
            seed,
            config.message_history,
        );
        let mut session = Self::from_parts(
            config,
            map,
            ecs,
            FloorId::FIRST,
            GameState::Playing,
            seed,
            0,
        );
        session.refresh_visibility();
        session
    }

    pub(crate) fn from_parts(
        config: GameConfig,
        map: GameMap,
        ecs: EcsWorld,
        floor: FloorId,
        state: GameState,
        seed: u64,
        turn: u64,
    ) -> Self {
        Self {
            config,
            map,
            ecs,
            floor,
            state,
            seed,
            turn,
            layout: None,
            fov: Box::new(ShadowcastFov),
        }
    }

    pub fn with_visibility_provider(mut self, provider: Box<dyn VisibilityProvider>) -> Self {
        self.fov = provider;
        self.refresh_visibility();
        self
    }

    fn equip_starting_gear(&mut self) {
        let player = self.ecs.player();
        let mut gear = self.ecs.equipment(player).unwrap_or_default();
        for kind in data::starting_gear() {
            let template = kind.template();
            let Ok(item) = self.ecs.spawn_item_in_inventory(player, &template) else {
                continue;
            };
            if let Some(equippable) = template.equippable {
                gear.set_slot(equippable.slot, Some(item));
            }
        }
        self.ecs.set_equipment(player, gear);
    }

    /// Runs one player command and, if it succeeded, everything that follows
    /// from it. Fatal errors are logged, trigger an autosave attempt and are
    /// then returned.
    pub fn handle_command(&mut self, command: Command) -> Result<TurnOutcome, GameError> {
        if self.state != GameState::Playing {
            return Ok(TurnOutcome::Ignored);
        }
        match self.run_turn(command) {
            Ok(outcome) => Ok(outcome),
            Err(error) => Err(self.fail(error)),
        }
    }

    fn run_turn(&mut self, command: Command) -> Result<TurnOutcome, GameError> {
        let player = self.ecs.player();
        if self.ecs.stats(player).is_none() {
            return Err(GameError::missing(player, "CombatStats"));
        }

        if let Err(failure) = actions::execute(self, player, &command) {
            tracing::debug!(?command, %failure, "player action rejected");
            self.ecs.message(failure.to_string(), palette::IMPOSSIBLE);
            return Ok(TurnOutcome::Rejected(failure));
        }
        tracing::debug!(?command, turn = self.turn, "player action");

        self.turn += 1;
        ai::take_enemy_turns(self);
        self.refresh_visibility();
        self.update_state()?;
        Ok(TurnOutcome::Completed)
    }

    fn update_state(&mut self) -> Result<(), GameError> {
        let player = self.ecs.player();
        let stats = self
            .ecs
            .stats(player)
            .ok_or_else(|| GameError::missing(player, "CombatStats"))?;
        let level = self
            .ecs
            .level(player)
            .ok_or_else(|| GameError::missing(player, "Level"))?;

        self.state = if stats.hp() == 0 || !self.ecs.is_alive(player) {
            GameState::GameOver
        } else if level.requires_level_up() {
            GameState::LevelUp
        } else {
            GameState::Playing
        };
        Ok(())
    }

    fn fail(&mut self, error: GameError) -> GameError {
        tracing::error!(%error, turn = self.turn, "turn aborted");
        self.ecs
            .message(format!("Fatal error: {error}"), palette::ERROR);
        if let Some(path) = self.config.autosave_path.clone() {
            match self.save_to(&path) {
                Ok(()) => tracing::info!(path = %path.display(), "autosaved after fatal error"),
                Err(save_error) => tracing::error!(%save_error, "autosave failed"),
            }
        }
        error
    }

    /// Resolves a pending level-up.
    pub fn choose_level_up(&mut self, choice: LevelUpChoice) -> Result<TurnOutcome, GameError> {
        if self.state != GameState::LevelUp {
            return Ok(TurnOutcome::Ignored);
        }
        let player = self.ecs.player();
        match choice {
            LevelUpChoice::Constitution => {
                self.ecs.stats_mut(player, |stats| stats.max_hp += 20);
                let hp = self.ecs.stats(player).map_or(0, |stats| stats.hp());
                self.ecs.set_hp(player, hp + 20);
                self.ecs.message("Your health improves!", palette::WHITE);
            }
            LevelUpChoice::Strength => {
                self.ecs.stats_mut(player, |stats| stats.base_power += 1);
                self.ecs.message("You feel stronger!", palette::WHITE);
            }
            LevelUpChoice::Agility => {
                self.ecs.stats_mut(player, |stats| stats.base_defense += 1);
                self.ecs
                    .message("Your movements are getting swifter!", palette::WHITE);
            }
        }
        let result = self
            .ecs
            .level_mut(player, |level| level.increase_level())
            .ok_or_else(|| GameError::missing(player, "Level"))
            .and_then(|_| {
                tracing::debug!(?choice, "level up");
                self.update_state()
            });
        match result {
            Ok(()) => Ok(TurnOutcome::Completed),
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Replaces the current floor with a freshly generated deeper one.
    pub(crate) fn descend(&mut self) {
        self.floor = self.floor.next();
        let generator = DungeonGenerator::from_config(&self.config);
        let (map, layout) = generator.generate(&mut self.ecs, self.floor);
        self.map = map;
        self.layout = Some(layout);
        self.refresh_visibility();
        tracing::info!(floor = self.floor.0, "descended");
    }

    /// Recomputes the player's field of view and folds it into the map.
    pub fn refresh_visibility(&mut self) {
        let Some(origin) = self.ecs.player_point() else {
            return;
        };
        let mask = self.fov.compute(&self.map, origin, self.config.fov_radius);
        self.map.apply_visibility(&mask);
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), GameError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), turn = self.turn, "session saved");
        Ok(())
    }

    pub fn load_from<P: AsRef<Path>>(path: P, config: GameConfig) -> Result<Self, GameError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let session = Self::from_json(&text, config)?;
        tracing::info!(path = %path.display(), turn = session.turn, "session restored");
        Ok(session)
    }

    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(&Snapshot::capture(self))?)
    }

    pub fn from_json(text: &str, config: GameConfig) -> Result<Self, GameError> {
        let snapshot: Snapshot = serde_json::from_str(text)?;
        snapshot.restore(config)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn floor(&self) -> FloorId {
        self.floor
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut GameMap {
        &mut self.map
    }

    pub fn ecs(&self) -> &EcsWorld {
        &self.ecs
    }

    pub fn ecs_mut(&mut self) -> &mut EcsWorld {
        &mut self.ecs
    }

    /// Rooms of the current floor, when it was generated rather than built by hand.
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn player(&self) -> Entity {
        self.ecs.player()
    }

    pub fn tile_views(&self) -> Vec<TileView> {
        self.map
            .tiles()
            .map(|(point, tile)| TileView {
                point,
                tile: *tile,
                visibility: self.map.visibility_at(point),
            })
            .collect()
    }

    /// Entities on currently visible tiles, corpses first and actors last.
    pub fn render_entries(&self) -> Vec<RenderEntry> {
        self.ecs
            .render_entries()
            .into_iter()
            .filter(|entry| self.map.is_visible(entry.point))
            .collect()
    }

    /// `(hp, max_hp)` of the player.
    pub fn player_hp(&self) -> Option<(i32, i32)> {
        self.ecs
            .stats(self.ecs.player())
            .map(|stats| (stats.hp(), stats.max_hp))
    }

    /// What the look cursor reports for `point`.
    pub fn names_at(&self, point: Point) -> String {
        if !self.map.is_visible(point) {
            return String::new();
        }
        let names: Vec<String> = self
            .ecs
            .entities_at(point)
            .into_iter()
            .map(|entity| self.ecs.name(entity))
            .collect();
        capitalize(&names.join(", "))
    }

    pub fn messages(&self) -> Vec<Message> {
        self.ecs.log().messages().to_vec()
    }

    pub fn inventory(&self) -> Vec<InventoryEntry> {
        let player = self.ecs.player();
        let gear = self.ecs.equipment(player).unwrap_or_default();
        self.ecs
            .inventory_items(player)
            .into_iter()
            .enumerate()
            .map(|(slot, item)| InventoryEntry {
                slot,
                item,
                name: self.ecs.name(item),
                equipped: gear.slot_of(item),
            })
            .collect()
    }

    pub fn inventory_item(&self, slot: usize) -> Option<Entity> {
        self.ecs.inventory_items(self.ecs.player()).get(slot).copied()
    }

    pub fn experience(&self) -> Option<ExperienceSummary> {
        self.ecs
            .level(self.ecs.player())
            .map(|level| ExperienceSummary {
                level: level.current_level,
                current_xp: level.current_xp,
                xp_to_next_level: level.experience_to_next_level(),
            })
    }
}

fn clock_seed() -> u64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default()
        .unsigned_abs()
}
