pub mod fov;
pub mod generator;

use bracket_color::prelude::{RGB, WHITE};
use bracket_geometry::prelude::{Point, Rect};
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, DistanceAlg};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Dungeon depth, counted from 1 at the entrance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FloorId(pub u32);

impl FloorId {
    pub const FIRST: FloorId = FloorId(1);

    pub const fn next(self) -> Self {
        FloorId(self.0 + 1)
    }
}

impl Default for FloorId {
    fn default() -> Self {
        Self::FIRST
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
    DownStairs,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileGraphic {
    pub glyph: char,
    pub fg: RGB,
    pub bg: RGB,
}

impl TileGraphic {
    fn new(glyph: char, fg: RGB, bg: RGB) -> Self {
        Self { glyph, fg, bg }
    }
}

/// `dark` is drawn for remembered tiles, `light` for tiles in view.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub walkable: bool,
    pub transparent: bool,
    pub dark: TileGraphic,
    pub light: TileGraphic,
}

impl Default for Tile {
    fn default() -> Self {
        Tile::wall()
    }
}

impl Tile {
    pub fn wall() -> Self {
        Self {
            kind: TileKind::Wall,
            walkable: false,
            transparent: false,
            dark: TileGraphic::new(' ', RGB::named(WHITE), RGB::from_u8(0, 0, 100)),
            light: TileGraphic::new(' ', RGB::named(WHITE), RGB::from_u8(130, 110, 50)),
        }
    }

    pub fn floor() -> Self {
        Self {
            kind: TileKind::Floor,
            walkable: true,
            transparent: true,
            dark: TileGraphic::new(' ', RGB::named(WHITE), RGB::from_u8(50, 50, 150)),
            light: TileGraphic::new(' ', RGB::named(WHITE), RGB::from_u8(200, 180, 50)),
        }
    }

    pub fn down_stairs() -> Self {
        Self {
            kind: TileKind::DownStairs,
            walkable: true,
            transparent: true,
            dark: TileGraphic::new('>', RGB::from_u8(0, 0, 100), RGB::from_u8(50, 50, 150)),
            light: TileGraphic::new('>', RGB::named(WHITE), RGB::from_u8(200, 180, 50)),
        }
    }
}

/// How a tile should be presented given the player's sight and memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TileVisibility {
    Visible,
    Explored,
    Shroud,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameMap {
    pub width: i32,
    pub height: i32,
    tiles: Vec<Tile>,
    visible: Vec<bool>,
    explored: Vec<bool>,
    downstairs: Option<Point>,
}

impl GameMap {
    /// A solid block of wall, ready to be carved.
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            tiles: vec![Tile::wall(); size],
            visible: vec![false; size],
            explored: vec![false; size],
            downstairs: None,
        }
    }

    /// A single room filling the map, ringed by one tile of wall.
    pub fn open_room(width: i32, height: i32) -> Self {
        let mut map = Self::new(width, height);
        map.carve_room(&Rect::with_size(0, 0, width - 1, height - 1));
        map
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn index_of(&self, point: Point) -> Option<usize> {
        if self.in_bounds(point) {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn tile_at(&self, point: Point) -> Option<&Tile> {
        self.index_of(point).map(|idx| &self.tiles[idx])
    }

    pub fn set_tile(&mut self, point: Point, tile: Tile) {
        if let Some(idx) = self.index_of(point) {
            self.tiles[idx] = tile;
        }
    }

    /// Turns the interior of `room` into floor; its outline stays wall.
    pub fn carve_room(&mut self, room: &Rect) {
        for y in room.y1 + 1..room.y2 {
            for x in room.x1 + 1..room.x2 {
                self.set_tile(Point::new(x, y), Tile::floor());
            }
        }
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.tile_at(point).is_some_and(|tile| tile.walkable)
    }

    pub fn is_visible(&self, point: Point) -> bool {
        self.index_of(point).is_some_and(|idx| self.visible[idx])
    }

    pub fn is_explored(&self, point: Point) -> bool {
        self.index_of(point).is_some_and(|idx| self.explored[idx])
    }

    pub fn visibility_at(&self, point: Point) -> TileVisibility {
        if self.is_visible(point) {
            TileVisibility::Visible
        } else if self.is_explored(point) {
            TileVisibility::Explored
        } else {
            TileVisibility::Shroud
        }
    }

    /// Replaces the visible mask and folds it into the explored mask.
    /// Cells missing from a short mask count as not visible.
    pub fn apply_visibility(&mut self, mask: &[bool]) {
        for (idx, visible) in self.visible.iter_mut().enumerate() {
            *visible = mask.get(idx).copied().unwrap_or(false);
        }
        for (explored, visible) in self.explored.iter_mut().zip(&self.visible) {
            *explored |= *visible;
        }
    }

    pub fn place_downstairs(&mut self, point: Point) {
        if let Some(previous) = self.downstairs.take() {
            self.set_tile(previous, Tile::floor());
        }
        self.set_tile(point, Tile::down_stairs());
        self.downstairs = Some(point);
    }

    pub fn downstairs(&self) -> Option<Point> {
        self.downstairs
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Point::new(x, y)))
    }

    pub fn tiles(&self) -> impl Iterator<Item = (Point, &Tile)> + '_ {
        self.points().zip(self.tiles.iter())
    }

    pub fn walkable_points(&self) -> Vec<Point> {
        self.points().filter(|point| self.is_walkable(*point)).collect()
    }

    pub(crate) fn masks_len(&self) -> (usize, usize, usize) {
        (self.tiles.len(), self.visible.len(), self.explored.len())
    }
}

impl BaseMap for GameMap {
    fn is_opaque(&self, idx: usize) -> bool {
        self.tiles.get(idx).is_none_or(|tile| !tile.transparent)
    }

    // Sight only; routing goes through `ai::pathfinding::CostMap`.
    fn get_available_exits(&self, _idx: usize) -> SmallVec<[(usize, f32); 10]> {
        SmallVec::new()
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let p1 = self.index_to_point2d(idx1);
        let p2 = self.index_to_point2d(idx2);
        DistanceAlg::Pythagoras.distance2d(p1, p2)
    }
}

impl Algorithm2D for GameMap {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        GameMap::in_bounds(self, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_bounds_matches_dimensions() {
        let map = GameMap::new(7, 4);
        for y in -2..6 {
            for x in -2..9 {
                let expected = (0..7).contains(&x) && (0..4).contains(&y);
                assert_eq!(map.in_bounds(Point::new(x, y)), expected, "({x},{y})");
            }
        }
    }

    #[test]
    fn open_room_keeps_a_wall_border() {
        let map = GameMap::open_room(6, 5);
        assert!(!map.is_walkable(Point::new(0, 0)));
        assert!(!map.is_walkable(Point::new(5, 2)));
        assert!(!map.is_walkable(Point::new(2, 4)));
        assert!(map.is_walkable(Point::new(1, 1)));
        assert!(map.is_walkable(Point::new(4, 3)));
        assert_eq!(map.walkable_points().len(), 4 * 3);
    }

    #[test]
    fn explored_accumulates_and_never_resets() {
        let mut map = GameMap::open_room(4, 4);
        let mut first = vec![false; 16];
        first[5] = true;
        map.apply_visibility(&first);
        assert!(map.is_visible(Point::new(1, 1)));

        map.apply_visibility(&[false; 16]);
        assert!(!map.is_visible(Point::new(1, 1)));
        assert!(map.is_explored(Point::new(1, 1)));
        assert_eq!(map.visibility_at(Point::new(1, 1)), TileVisibility::Explored);
        assert_eq!(map.visibility_at(Point::new(2, 2)), TileVisibility::Shroud);
    }

    #[test]
    fn short_mask_does_not_shrink_masks() {
        let mut map = GameMap::open_room(5, 5);
        map.apply_visibility(&[true; 3]);
        assert_eq!(map.masks_len(), (25, 25, 25));
        assert!(!map.is_visible(Point::new(4, 4)));
    }

    #[test]
    fn moving_the_stairs_leaves_a_single_stair_tile() {
        let mut map = GameMap::open_room(6, 6);
        map.place_downstairs(Point::new(1, 1));
        map.place_downstairs(Point::new(3, 3));
        let stairs = map
            .tiles()
            .filter(|(_, tile)| tile.kind == TileKind::DownStairs)
            .count();
        assert_eq!(stairs, 1);
        assert_eq!(map.downstairs(), Some(Point::new(3, 3)));
    }
}
