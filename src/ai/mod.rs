use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, DistanceAlg, a_star_search};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::data::items::StatKind;
use crate::data::monsters::AiKind;
use crate::map::GameMap;

pub const CARDINAL_COST: f32 = 2.0;
pub const DIAGONAL_COST: f32 = 3.0;
/// Soft penalty for cells held by a blocking entity. Low values make
/// enemies queue up behind each other in corridors; high values make them
/// take long detours to surround the player.
pub const BLOCKER_PENALTY: f32 = 10.0;

/// One actor's behavior, re-evaluated once per scheduled turn.
///
/// Wrapper variants own the state they displaced and restore it when
/// their counter runs out; the application-site stacking guard keeps the
/// nesting depth at one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AiState {
    /// Driven by external input, never by the scheduler.
    Player,
    Hostile {
        #[serde(skip)]
        path: Vec<Point>,
    },
    Ranged {
        range: i32,
        #[serde(skip)]
        path: Vec<Point>,
    },
    Confused {
        previous: Box<AiState>,
        turns_remaining: i32,
    },
    TimeStopped {
        previous: Box<AiState>,
        turns_remaining: i32,
    },
    StatModifier {
        kind: StatKind,
        amount: i32,
        previous: Box<AiState>,
        turns_remaining: i32,
    },
}

impl AiState {
    pub fn for_kind(kind: AiKind) -> Self {
        match kind {
            AiKind::Hostile => AiState::Hostile { path: Vec::new() },
            AiKind::Ranged { range } => AiState::Ranged {
                range,
                path: Vec::new(),
            },
        }
    }

    /// Guard queried before applying a new stat modifier: only one may be
    /// active at a time, regardless of kind.
    pub fn is_stat_modifier(&self) -> bool {
        matches!(self, AiState::StatModifier { .. })
    }
}

/// Per-turn traversal cost grid. Walls carry cost 0 (impassable); walkable
/// cells cost 1, bumped to 1 + BLOCKER_PENALTY where a blocking entity
/// stands, so crowds are expensive but not impassable.
pub struct CostField {
    width: i32,
    height: i32,
    cost: Vec<f32>,
}

impl CostField {
    pub fn new<I>(map: &GameMap, blockers: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        let mut cost: Vec<f32> = map
            .tiles
            .iter()
            .enumerate()
            .map(|(idx, _)| {
                if map.is_walkable(map.index_to_point2d(idx)) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();

        for point in blockers {
            if map.in_bounds(point) {
                let idx = map.idx(point);
                if cost[idx] > 0.0 {
                    cost[idx] += BLOCKER_PENALTY;
                }
            }
        }

        Self {
            width: map.width,
            height: map.height,
            cost,
        }
    }

    fn passable(&self, point: Point) -> bool {
        self.in_bounds(point) && self.cost[(point.y * self.width + point.x) as usize] > 0.0
    }
}

impl Algorithm2D for CostField {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }
}

impl BaseMap for CostField {
    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let origin = self.index_to_point2d(idx);
        let steps = [
            (Point::new(0, -1), CARDINAL_COST),
            (Point::new(0, 1), CARDINAL_COST),
            (Point::new(-1, 0), CARDINAL_COST),
            (Point::new(1, 0), CARDINAL_COST),
            (Point::new(-1, -1), DIAGONAL_COST),
            (Point::new(1, -1), DIAGONAL_COST),
            (Point::new(-1, 1), DIAGONAL_COST),
            (Point::new(1, 1), DIAGONAL_COST),
        ];
        for (delta, step_cost) in steps {
            let dest = origin + delta;
            if self.passable(dest) {
                let dest_idx = self.point2d_to_index(dest);
                exits.push((dest_idx, step_cost * self.cost[dest_idx]));
            }
        }
        exits
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let p1 = self.index_to_point2d(idx1);
        let p2 = self.index_to_point2d(idx2);
        // Scaled to the cardinal step cost so the heuristic never
        // overestimates.
        DistanceAlg::Pythagoras.distance2d(p1, p2) * CARDINAL_COST
    }
}

/// Lowest-total-cost path from `from` to `to`, excluding the starting
/// cell. Empty when the destination is unreachable.
pub fn find_path<I>(map: &GameMap, blockers: I, from: Point, to: Point) -> Vec<Point>
where
    I: IntoIterator<Item = Point>,
{
    let field = CostField::new(map, blockers);
    if !field.in_bounds(from) || !field.in_bounds(to) {
        return Vec::new();
    }

    let start = field.point2d_to_index(from);
    let end = field.point2d_to_index(to);
    let result = a_star_search(start, end, &field);
    if !result.success {
        return Vec::new();
    }

    result
        .steps
        .into_iter()
        .skip_while(|&idx| idx == start)
        .map(|idx| field.index_to_point2d(idx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::tiles::TileKind;

    /// Open floor rectangle with a 1-tile wall border.
    fn open_map(width: i32, height: i32) -> GameMap {
        let mut map = GameMap::new(width, height, 1);
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                map.set_tile(Point::new(x, y), TileKind::Floor);
            }
        }
        map
    }

    #[test]
    fn straight_corridor_path_has_corridor_length() {
        let mut map = GameMap::new(12, 5, 1);
        for x in 1..=9 {
            map.set_tile(Point::new(x, 2), TileKind::Floor);
        }
        let path = find_path(&map, [], Point::new(1, 2), Point::new(9, 2));
        assert_eq!(path.len(), 8);
        assert_eq!(path.last(), Some(&Point::new(9, 2)));
        assert!(!path.contains(&Point::new(1, 2)));
    }

    #[test]
    fn unreachable_destination_yields_empty_path() {
        // Two isolated floor cells in an otherwise solid map.
        let mut map = GameMap::new(8, 8, 1);
        map.set_tile(Point::new(1, 1), TileKind::Floor);
        map.set_tile(Point::new(6, 6), TileKind::Floor);
        let path = find_path(&map, [], Point::new(1, 1), Point::new(6, 6));
        assert!(path.is_empty());
    }

    #[test]
    fn diagonals_are_used_but_cost_more() {
        let map = open_map(10, 10);
        let path = find_path(&map, [], Point::new(1, 1), Point::new(4, 4));
        // Pure diagonal run: three steps, no zig-zag.
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn blocking_entities_are_soft_obstacles() {
        let mut map = GameMap::new(12, 5, 1);
        for x in 1..=9 {
            map.set_tile(Point::new(x, 2), TileKind::Floor);
        }
        // A blocker mid-corridor with no way around: the path still routes
        // through it, at higher cost.
        let path = find_path(
            &map,
            [Point::new(5, 2)],
            Point::new(1, 2),
            Point::new(9, 2),
        );
        assert_eq!(path.len(), 8);
        assert!(path.contains(&Point::new(5, 2)));
    }

    #[test]
    fn crowded_cells_are_detoured_when_a_detour_exists() {
        let map = open_map(12, 7);
        let blocked = Point::new(3, 3);
        let path = find_path(&map, [blocked], Point::new(1, 3), Point::new(9, 3));
        assert!(!path.is_empty());
        assert!(!path.contains(&blocked));
    }

    #[test]
    fn stat_modifier_guard_matches_only_modifiers() {
        let modifier = AiState::StatModifier {
            kind: StatKind::Power,
            amount: 3,
            previous: Box::new(AiState::Player),
            turns_remaining: 10,
        };
        assert!(modifier.is_stat_modifier());
        assert!(!AiState::Player.is_stat_modifier());
        assert!(!AiState::Hostile { path: Vec::new() }.is_stat_modifier());
    }
}
