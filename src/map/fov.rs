use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::field_of_view;

use super::GameMap;

/// Computes which cells can be seen from `origin`.
///
/// The returned mask is indexed `y * width + x`, the same layout the grid
/// uses, and is expected to be exactly `width * height` long.
pub trait VisibilityProvider {
    fn compute(&self, map: &GameMap, origin: Point, radius: i32) -> Vec<bool>;
}

/// Symmetric shadowcasting from `bracket-pathfinding`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShadowcastFov;

impl VisibilityProvider for ShadowcastFov {
    fn compute(&self, map: &GameMap, origin: Point, radius: i32) -> Vec<bool> {
        let mut mask = vec![false; (map.width * map.height) as usize];
        for point in field_of_view(origin, radius, map) {
            if map.in_bounds(point) {
                mask[(point.y * map.width + point.x) as usize] = true;
            }
        }
        mask
    }
}
