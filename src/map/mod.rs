pub mod procgen;
pub mod tiles;

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap};

use self::tiles::{Palette, Tile, TileKind, tile};

pub const DEFAULT_MAP_WIDTH: i32 = 80;
pub const DEFAULT_MAP_HEIGHT: i32 = 43;

/// Floor at which the tile palette switches to the late-game look.
pub const LATE_PALETTE_FLOOR: i32 = 6;
/// The terminal floor: carries the goal tile and the Monolith instead of stairs.
pub const FINAL_FLOOR: i32 = 10;

/// One dungeon floor: the tile grid plus the parallel visibility bitmaps.
///
/// `explored` only ever flips false -> true for the lifetime of the floor;
/// `visible` is recomputed from the player's viewshed every turn.
#[derive(Clone, Debug, PartialEq)]
pub struct GameMap {
    pub width: i32,
    pub height: i32,
    pub palette: Palette,
    pub tiles: Vec<TileKind>,
    pub visible: Vec<bool>,
    pub explored: Vec<bool>,
    pub downstairs: Point,
    pub goal: Option<Point>,
}

impl GameMap {
    pub fn new(width: i32, height: i32, floor: i32) -> Self {
        let palette = if floor < LATE_PALETTE_FLOOR {
            Palette::Early
        } else {
            Palette::Late
        };
        let size = (width * height) as usize;
        Self {
            width,
            height,
            palette,
            tiles: vec![TileKind::Wall; size],
            visible: vec![false; size],
            explored: vec![false; size],
            downstairs: Point::new(0, 0),
            goal: None,
        }
    }

    pub fn idx(&self, point: Point) -> usize {
        (point.y * self.width + point.x) as usize
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn kind_at(&self, point: Point) -> Option<TileKind> {
        if self.in_bounds(point) {
            Some(self.tiles[self.idx(point)])
        } else {
            None
        }
    }

    pub fn tile_at(&self, point: Point) -> Option<&'static Tile> {
        self.kind_at(point).map(|kind| tile(kind, self.palette))
    }

    pub fn set_tile(&mut self, point: Point, kind: TileKind) {
        if self.in_bounds(point) {
            let idx = self.idx(point);
            self.tiles[idx] = kind;
        }
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.tile_at(point).is_some_and(|tile| tile.walkable)
    }

    pub fn is_transparent(&self, point: Point) -> bool {
        self.tile_at(point).is_some_and(|tile| tile.transparent)
    }

    pub fn is_visible(&self, point: Point) -> bool {
        self.in_bounds(point) && self.visible[self.idx(point)]
    }

    /// Replace the visible set with the given viewshed and fold it into
    /// `explored`.
    pub fn update_visibility(&mut self, viewshed: &[Point]) {
        self.visible.fill(false);
        for &point in viewshed {
            if self.in_bounds(point) {
                let idx = self.idx(point);
                self.visible[idx] = true;
                self.explored[idx] = true;
            }
        }
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

impl BaseMap for GameMap {
    fn is_opaque(&self, idx: usize) -> bool {
        let point = self.index_to_point2d(idx);
        !self.is_transparent(point)
    }
}

/// Per-run generation settings; floors are generated on demand as the
/// player descends and never revisited.
#[derive(Clone, Debug)]
pub struct GameWorld {
    pub map_width: i32,
    pub map_height: i32,
    pub max_rooms: i32,
    pub room_min_size: i32,
    pub room_max_size: i32,
    pub current_floor: i32,
}

impl Default for GameWorld {
    fn default() -> Self {
        Self {
            map_width: DEFAULT_MAP_WIDTH,
            map_height: DEFAULT_MAP_HEIGHT,
            max_rooms: 30,
            room_min_size: 6,
            room_max_size: 10,
            current_floor: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explored_is_monotonic() {
        let mut map = GameMap::new(10, 10, 1);
        map.update_visibility(&[Point::new(2, 2), Point::new(3, 2)]);
        assert!(map.is_visible(Point::new(2, 2)));
        map.update_visibility(&[Point::new(5, 5)]);
        assert!(!map.is_visible(Point::new(2, 2)));
        assert!(map.explored[map.idx(Point::new(2, 2))]);
        assert!(map.explored[map.idx(Point::new(5, 5))]);
    }

    #[test]
    fn palette_switches_on_late_floors() {
        assert_eq!(GameMap::new(5, 5, 1).palette, Palette::Early);
        assert_eq!(
            GameMap::new(5, 5, LATE_PALETTE_FLOOR).palette,
            Palette::Late
        );
    }

    #[test]
    fn out_of_bounds_is_not_walkable() {
        let map = GameMap::new(5, 5, 1);
        assert!(!map.is_walkable(Point::new(-1, 0)));
        assert!(!map.is_walkable(Point::new(5, 0)));
    }
}
