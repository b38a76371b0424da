//! Cost-weighted routing over the grid.
//!
//! Walls drop out of the graph entirely. Tiles under a blocking entity stay
//! passable but expensive, so monsters flow around each other instead of
//! queueing behind a single doorway occupant.

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, a_star_search};
use smallvec::SmallVec;

use crate::map::GameMap;

pub const BLOCKER_PENALTY: i32 = 10;
const CARDINAL_STEP: i32 = 2;
const DIAGONAL_STEP: i32 = 3;

const DIRECTIONS: [(i32, i32, i32); 8] = [
    (-1, 0, CARDINAL_STEP),
    (1, 0, CARDINAL_STEP),
    (0, -1, CARDINAL_STEP),
    (0, 1, CARDINAL_STEP),
    (-1, -1, DIAGONAL_STEP),
    (1, -1, DIAGONAL_STEP),
    (-1, 1, DIAGONAL_STEP),
    (1, 1, DIAGONAL_STEP),
];

/// Per-tile entry cost; `0` means impassable.
pub struct CostMap<'a> {
    map: &'a GameMap,
    costs: Vec<i32>,
}

impl<'a> CostMap<'a> {
    pub fn new(map: &'a GameMap, blockers: &[Point]) -> Self {
        let mut costs: Vec<i32> = map
            .points()
            .map(|point| i32::from(map.is_walkable(point)))
            .collect();
        for blocker in blockers {
            if let Some(idx) = map.index_of(*blocker) {
                if costs[idx] > 0 {
                    costs[idx] += BLOCKER_PENALTY;
                }
            }
        }
        Self { map, costs }
    }

    pub fn cost_at(&self, point: Point) -> i32 {
        self.map.index_of(point).map_or(0, |idx| self.costs[idx])
    }
}

impl<'a> BaseMap for CostMap<'a> {
    fn is_opaque(&self, idx: usize) -> bool {
        self.costs.get(idx).is_none_or(|cost| *cost == 0)
    }

    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let point = self.index_to_point2d(idx);
        for (dx, dy, step) in DIRECTIONS {
            let dest = Point::new(point.x + dx, point.y + dy);
            let cost = self.cost_at(dest);
            if cost > 0 {
                exits.push((self.point2d_to_index(dest), (cost * step) as f32));
            }
        }
        exits
    }

    // Octile distance in step units; never overestimates since every tile
    // costs at least 1.
    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let p1 = self.index_to_point2d(idx1);
        let p2 = self.index_to_point2d(idx2);
        let dx = (p1.x - p2.x).abs();
        let dy = (p1.y - p2.y).abs();
        (CARDINAL_STEP * dx.max(dy) + (DIAGONAL_STEP - CARDINAL_STEP) * dx.min(dy)) as f32
    }
}

impl<'a> Algorithm2D for CostMap<'a> {
    fn dimensions(&self) -> Point {
        Point::new(self.map.width, self.map.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        self.map.in_bounds(point)
    }
}

/// Shortest route from `start` to `goal`, excluding `start`. Empty when the
/// two coincide or no route exists.
pub fn path_to(map: &GameMap, blockers: &[Point], start: Point, goal: Point) -> Vec<Point> {
    if start == goal || !map.in_bounds(start) || !map.is_walkable(goal) {
        return Vec::new();
    }
    let costs = CostMap::new(map, blockers);
    let path = a_star_search(
        costs.point2d_to_index(start),
        costs.point2d_to_index(goal),
        &costs,
    );
    if !path.success {
        return Vec::new();
    }
    path.steps
        .into_iter()
        .map(|idx| costs.index_to_point2d(idx))
        .filter(|point| *point != start)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Tile;

    #[test]
    fn path_to_self_is_empty() {
        let map = GameMap::open_room(10, 10);
        assert!(path_to(&map, &[], Point::new(4, 4), Point::new(4, 4)).is_empty());
    }

    #[test]
    fn walled_off_goal_is_unreachable() {
        let mut map = GameMap::open_room(12, 8);
        for y in 0..8 {
            map.set_tile(Point::new(6, y), Tile::wall());
        }
        assert!(map.is_walkable(Point::new(9, 4)));
        assert!(path_to(&map, &[], Point::new(2, 4), Point::new(9, 4)).is_empty());
    }

    #[test]
    fn straight_corridor_path_skips_the_start() {
        let map = GameMap::open_room(10, 3);
        let path = path_to(&map, &[], Point::new(1, 1), Point::new(5, 1));
        assert_eq!(
            path,
            vec![
                Point::new(2, 1),
                Point::new(3, 1),
                Point::new(4, 1),
                Point::new(5, 1)
            ]
        );
    }

    #[test]
    fn diagonal_steps_are_taken_when_shorter() {
        let map = GameMap::open_room(10, 10);
        let path = path_to(&map, &[], Point::new(1, 1), Point::new(4, 4));
        assert_eq!(path.len(), 3);
        assert_eq!(path.last(), Some(&Point::new(4, 4)));
    }

    #[test]
    fn blockers_are_expensive_not_walls() {
        let map = GameMap::open_room(12, 5);
        let costs = CostMap::new(&map, &[Point::new(5, 2)]);
        assert_eq!(costs.cost_at(Point::new(5, 2)), 1 + BLOCKER_PENALTY);
        assert_eq!(costs.cost_at(Point::new(0, 0)), 0);

        // Open room: the route bends around the occupied tile.
        let path = path_to(&map, &[Point::new(5, 2)], Point::new(2, 2), Point::new(8, 2));
        assert!(!path.is_empty());
        assert!(!path.contains(&Point::new(5, 2)));

        // One-tile corridor: no way around, so the route goes through.
        let corridor = GameMap::open_room(12, 3);
        let path = path_to(
            &corridor,
            &[Point::new(5, 1)],
            Point::new(2, 1),
            Point::new(8, 1),
        );
        assert!(path.contains(&Point::new(5, 1)));
    }

    #[test]
    fn wall_goal_yields_nothing() {
        let map = GameMap::open_room(6, 6);
        assert!(path_to(&map, &[], Point::new(2, 2), Point::new(0, 0)).is_empty());
    }
}
