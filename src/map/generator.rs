//! Rooms-and-corridors floor generation.

use bracket_geometry::prelude::{LineAlg, Point, Rect, line2d};
use bracket_random::prelude::RandomNumberGenerator;

use super::{FloorId, GameMap, Tile};
use crate::{
    config::GameConfig,
    data::{
        items::ItemKind,
        monsters::MonsterKind,
        spawn_tables::{self, MAX_ITEMS_BY_FLOOR, MAX_MONSTERS_BY_FLOOR},
    },
    ecs::EcsWorld,
};

/// Geometry chosen for one floor, before anything is spawned into it.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub rooms: Vec<Rect>,
    pub tunnels: Vec<Vec<Point>>,
    pub spawn: Point,
    pub stairs: Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnKind {
    Monster(MonsterKind),
    Item(ItemKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedSpawn {
    pub kind: SpawnKind,
    pub point: Point,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DungeonGenerator {
    pub width: i32,
    pub height: i32,
    pub max_rooms: u32,
    pub room_min_size: i32,
    pub room_max_size: i32,
}

impl DungeonGenerator {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            width: config.map_width,
            height: config.map_height,
            max_rooms: config.max_rooms,
            room_min_size: config.room_min_size,
            room_max_size: config.room_max_size,
        }
    }

    /// Samples rooms and the tunnels joining consecutive ones.
    pub fn layout(&self, rng: &mut RandomNumberGenerator) -> Layout {
        let mut rooms: Vec<Rect> = Vec::new();
        let mut tunnels = Vec::new();

        for _ in 0..self.max_rooms {
            let room_w = rng.range(self.room_min_size, self.room_max_size + 1);
            let room_h = rng.range(self.room_min_size, self.room_max_size + 1);
            if room_w >= self.width || room_h >= self.height {
                continue;
            }
            let room_x = rng.range(0, self.width - room_w);
            let room_y = rng.range(0, self.height - room_h);
            let candidate = Rect::with_size(room_x, room_y, room_w, room_h);

            if rooms.iter().any(|room| room.intersect(&candidate)) {
                continue;
            }

            if let Some(previous) = rooms.last() {
                tunnels.push(tunnel_between(rng, previous.center(), candidate.center()));
            }
            rooms.push(candidate);
        }

        if rooms.is_empty() {
            rooms.push(self.fallback_room());
        }

        let spawn = rooms[0].center();
        let stairs = rooms[rooms.len() - 1].center();
        Layout {
            rooms,
            tunnels,
            spawn,
            stairs,
        }
    }

    fn fallback_room(&self) -> Rect {
        let room_w = self.room_min_size.min(self.width - 1).max(2);
        let room_h = self.room_min_size.min(self.height - 1).max(2);
        Rect::with_size(
            (self.width - room_w) / 2,
            (self.height - room_h) / 2,
            room_w,
            room_h,
        )
    }

    pub fn carve(&self, layout: &Layout) -> GameMap {
        let mut map = GameMap::new(self.width, self.height);
        for room in &layout.rooms {
            map.carve_room(room);
        }
        for tunnel in &layout.tunnels {
            for point in tunnel {
                map.set_tile(*point, Tile::floor());
            }
        }
        map.place_downstairs(layout.stairs);
        map
    }

    /// Rolls what goes where. The first room is the player's and stays empty.
    pub fn plan_population(
        &self,
        rng: &mut RandomNumberGenerator,
        layout: &Layout,
        floor: FloorId,
    ) -> Vec<PlannedSpawn> {
        let max_monsters = spawn_tables::max_value_for_floor(MAX_MONSTERS_BY_FLOOR, floor);
        let max_items = spawn_tables::max_value_for_floor(MAX_ITEMS_BY_FLOOR, floor);
        let monster_table = spawn_tables::monster_table();
        let item_table = spawn_tables::item_table();

        let mut occupied = vec![layout.spawn];
        let mut planned = Vec::new();
        for room in layout.rooms.iter().skip(1) {
            let monster_count = rng.range(0, max_monsters as i32 + 1) as u32;
            let item_count = rng.range(0, max_items as i32 + 1) as u32;

            let kinds = monster_table
                .roll(rng, monster_count, floor)
                .into_iter()
                .map(SpawnKind::Monster)
                .chain(
                    item_table
                        .roll(rng, item_count, floor)
                        .into_iter()
                        .map(SpawnKind::Item),
                )
                .collect::<Vec<_>>();

            for kind in kinds {
                if let Some(point) = free_interior_point(rng, room, &occupied) {
                    occupied.push(point);
                    planned.push(PlannedSpawn { kind, point });
                }
            }
        }
        planned
    }

    /// Builds a fresh floor: clears the previous floor's entities, moves the
    /// player to the first room and spawns the rolled population.
    pub fn generate(&self, ecs: &mut EcsWorld, floor: FloorId) -> (GameMap, Layout) {
        let (layout, planned) = {
            let mut rng = ecs.rng();
            let layout = self.layout(&mut rng);
            let planned = self.plan_population(&mut rng, &layout, floor);
            (layout, planned)
        };
        let map = self.carve(&layout);

        ecs.clear_floor();
        ecs.set_position(ecs.player(), layout.spawn);
        for spawn in &planned {
            match spawn.kind {
                SpawnKind::Monster(kind) => {
                    ecs.spawn_actor(&kind.template(), spawn.point);
                }
                SpawnKind::Item(kind) => {
                    ecs.spawn_item(&kind.template(), spawn.point);
                }
            }
        }

        tracing::debug!(
            floor = floor.0,
            rooms = layout.rooms.len(),
            spawned = planned.len(),
            "generated floor"
        );
        (map, layout)
    }
}

/// L-shaped corridor; the coin decides which leg comes first.
fn tunnel_between(rng: &mut RandomNumberGenerator, start: Point, end: Point) -> Vec<Point> {
    let corner = if rng.range(0, 2) == 0 {
        Point::new(end.x, start.y)
    } else {
        Point::new(start.x, end.y)
    };
    let mut points = vec![start];
    points.extend(line2d(LineAlg::Bresenham, start, corner));
    points.push(corner);
    points.extend(line2d(LineAlg::Bresenham, corner, end));
    points.push(end);
    points.dedup();
    points
}

fn free_interior_point(
    rng: &mut RandomNumberGenerator,
    room: &Rect,
    occupied: &[Point],
) -> Option<Point> {
    let area = ((room.width() - 1) * (room.height() - 1)).max(1);
    for _ in 0..area {
        let point = Point::new(
            rng.range(room.x1 + 1, room.x2),
            rng.range(room.y1 + 1, room.y2),
        );
        if !occupied.contains(&point) {
            return Some(point);
        }
    }
    None
}
