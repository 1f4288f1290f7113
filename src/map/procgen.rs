use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;

use super::{FINAL_FLOOR, GameMap, GameWorld, tiles::TileKind};
use crate::data::{
    self, MAX_ITEMS_BY_FLOOR, MAX_MONSTERS_BY_FLOOR,
    items::{ITEM_TABLE, ItemArchetype},
    monsters::{ENEMY_TABLE, MONOLITH, MonsterArchetype},
};

/// An entity the generator decided to place; materialized into the ECS by
/// the caller.
#[derive(Copy, Clone, Debug)]
pub enum Spawn {
    Monster(&'static MonsterArchetype, Point),
    Item(&'static ItemArchetype, Point),
}

impl Spawn {
    pub fn point(&self) -> Point {
        match *self {
            Spawn::Monster(_, point) | Spawn::Item(_, point) => point,
        }
    }
}

/// Everything one floor descent produces: the carved map, where the player
/// lands, the accepted rooms, and the entity spawn list.
pub struct FloorPlan {
    pub map: GameMap,
    pub player_spawn: Point,
    pub rooms: Vec<Rect>,
    pub spawns: Vec<Spawn>,
}

/// Generate a new dungeon floor.
///
/// Attempts up to `max_rooms` placements; candidates intersecting an
/// accepted room are skipped without retry, so the final room count may
/// be lower. Panics if not a single room could be placed, which only
/// happens with degenerate parameters.
pub fn generate_dungeon(world: &GameWorld, rng: &mut RandomNumberGenerator) -> FloorPlan {
    let floor = world.current_floor;
    let mut map = GameMap::new(world.map_width, world.map_height, floor);
    let mut rooms: Vec<Rect> = Vec::new();
    let mut spawns: Vec<Spawn> = Vec::new();
    let mut occupied: Vec<Point> = Vec::new();
    let mut player_spawn = Point::new(0, 0);

    for _ in 0..world.max_rooms {
        let room_width = rng.range(world.room_min_size, world.room_max_size + 1);
        let room_height = rng.range(world.room_min_size, world.room_max_size + 1);
        let x = rng.range(0, map.width - room_width);
        let y = rng.range(0, map.height - room_height);
        let candidate = Rect::with_size(x, y, room_width, room_height);

        if rooms.iter().any(|room| room.intersect(&candidate)) {
            continue;
        }

        carve_room(&mut map, &candidate);

        if let Some(previous) = rooms.last() {
            for point in tunnel_between(rng, previous.center(), candidate.center()) {
                map.set_tile(point, TileKind::Floor);
            }
        } else {
            player_spawn = candidate.center();
            occupied.push(player_spawn);
        }

        place_entities(&candidate, floor, rng, &mut occupied, &mut spawns);
        rooms.push(candidate);
    }

    assert!(
        !rooms.is_empty(),
        "floor {floor} generated zero rooms; generation parameters are degenerate"
    );

    let last_center = rooms.last().map(Rect::center).unwrap_or(player_spawn);
    map.downstairs = last_center;
    if floor == FINAL_FLOOR {
        map.set_tile(last_center, TileKind::Goal);
        map.goal = Some(last_center);
        let boss_at = Point::new(
            last_center.x + rng.range(0, 2),
            last_center.y + rng.range(0, 2),
        );
        spawns.push(Spawn::Monster(&MONOLITH, boss_at));
    } else {
        map.set_tile(last_center, TileKind::DownStairs);
    }

    FloorPlan {
        map,
        player_spawn,
        rooms,
        spawns,
    }
}

/// Carve the interior of a room, leaving its 1-tile border as wall.
fn carve_room(map: &mut GameMap, room: &Rect) {
    for y in room.y1 + 1..room.y2 {
        for x in room.x1 + 1..room.x2 {
            map.set_tile(Point::new(x, y), TileKind::Floor);
        }
    }
}

/// L-shaped tunnel between two points: a coin flip picks the elbow, then
/// both straight segments are rasterized inclusive of their endpoints.
fn tunnel_between(rng: &mut RandomNumberGenerator, start: Point, end: Point) -> Vec<Point> {
    let corner = if rng.range(0, 2) == 0 {
        Point::new(end.x, start.y)
    } else {
        Point::new(start.x, end.y)
    };

    let mut points = straight_segment(start, corner);
    points.extend(straight_segment(corner, end));
    points
}

fn straight_segment(start: Point, end: Point) -> Vec<Point> {
    let mut points = vec![start];
    let mut cursor = start;
    while cursor.x != end.x {
        cursor.x += if end.x > cursor.x { 1 } else { -1 };
        points.push(cursor);
    }
    while cursor.y != end.y {
        cursor.y += if end.y > cursor.y { 1 } else { -1 };
        points.push(cursor);
    }
    points
}

/// Scatter weighted monster and item draws into one room's interior. A
/// draw landing on an already occupied cell is dropped silently, so the
/// actual spawn count can come in under the draw count.
fn place_entities(
    room: &Rect,
    floor: i32,
    rng: &mut RandomNumberGenerator,
    occupied: &mut Vec<Point>,
    spawns: &mut Vec<Spawn>,
) {
    let monster_count = rng.range(0, data::max_value_for_floor(MAX_MONSTERS_BY_FLOOR, floor) + 1);
    let item_count = rng.range(0, data::max_value_for_floor(MAX_ITEMS_BY_FLOOR, floor) + 1);

    for archetype in ENEMY_TABLE.sample(rng, floor, monster_count) {
        let point = random_interior_point(room, rng);
        if occupied.contains(&point) {
            continue;
        }
        occupied.push(point);
        spawns.push(Spawn::Monster(archetype, point));
    }

    for archetype in ITEM_TABLE.sample(rng, floor, item_count) {
        let point = random_interior_point(room, rng);
        if occupied.contains(&point) {
            continue;
        }
        occupied.push(point);
        spawns.push(Spawn::Item(archetype, point));
    }
}

fn random_interior_point(room: &Rect, rng: &mut RandomNumberGenerator) -> Point {
    Point::new(
        rng.range(room.x1 + 1, room.x2),
        rng.range(room.y1 + 1, room.y2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_world(floor: i32) -> GameWorld {
        GameWorld {
            current_floor: floor,
            ..GameWorld::default()
        }
    }

    #[test]
    fn straight_segments_include_both_endpoints() {
        let segment = straight_segment(Point::new(2, 5), Point::new(6, 5));
        assert_eq!(segment.len(), 5);
        assert_eq!(segment.first(), Some(&Point::new(2, 5)));
        assert_eq!(segment.last(), Some(&Point::new(6, 5)));
    }

    #[test]
    fn tunnels_are_l_shaped_and_connect_the_endpoints() {
        let mut rng = RandomNumberGenerator::seeded(1);
        let start = Point::new(3, 3);
        let end = Point::new(10, 8);
        let tunnel = tunnel_between(&mut rng, start, end);
        assert_eq!(tunnel.first(), Some(&start));
        assert_eq!(tunnel.last(), Some(&end));
        // Every step is a single cardinal move or a repeat at the elbow.
        for pair in tunnel.windows(2) {
            let dx = (pair[1].x - pair[0].x).abs();
            let dy = (pair[1].y - pair[0].y).abs();
            assert!(dx + dy <= 1, "tunnel jumped from {:?} to {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn rooms_keep_a_wall_border() {
        let mut rng = RandomNumberGenerator::seeded(99);
        let plan = generate_dungeon(&test_world(1), &mut rng);
        for x in 0..plan.map.width {
            assert!(!plan.map.is_walkable(Point::new(x, 0)));
            assert!(!plan.map.is_walkable(Point::new(x, plan.map.height - 1)));
        }
        for y in 0..plan.map.height {
            assert!(!plan.map.is_walkable(Point::new(0, y)));
            assert!(!plan.map.is_walkable(Point::new(plan.map.width - 1, y)));
        }
    }

    #[test]
    fn spawns_land_strictly_inside_rooms_without_overlap() {
        let mut rng = RandomNumberGenerator::seeded(5);
        let plan = generate_dungeon(&test_world(3), &mut rng);
        let mut seen = Vec::new();
        for spawn in &plan.spawns {
            let point = spawn.point();
            assert!(
                plan.rooms.iter().any(|room| {
                    point.x > room.x1 && point.x < room.x2 && point.y > room.y1 && point.y < room.y2
                }),
                "{point:?} outside every room interior"
            );
            assert_ne!(point, plan.player_spawn);
            assert!(!seen.contains(&point), "two entities share {point:?}");
            seen.push(point);
        }
    }

    #[test]
    fn same_seed_generates_the_same_floor() {
        let world = test_world(4);
        let plan_a = generate_dungeon(&world, &mut RandomNumberGenerator::seeded(1234));
        let plan_b = generate_dungeon(&world, &mut RandomNumberGenerator::seeded(1234));
        assert_eq!(plan_a.map, plan_b.map);
        assert_eq!(plan_a.player_spawn, plan_b.player_spawn);
        assert_eq!(plan_a.rooms.len(), plan_b.rooms.len());
        assert_eq!(plan_a.spawns.len(), plan_b.spawns.len());
    }

    #[test]
    fn final_floor_carries_the_goal_and_the_monolith() {
        let mut rng = RandomNumberGenerator::seeded(77);
        let plan = generate_dungeon(&test_world(FINAL_FLOOR), &mut rng);
        let goal = plan.map.goal.expect("final floor must have a goal tile");
        assert_eq!(plan.map.kind_at(goal), Some(TileKind::Goal));
        assert!(plan.spawns.iter().any(|spawn| matches!(
            spawn,
            Spawn::Monster(archetype, _) if std::ptr::eq(*archetype, &MONOLITH)
        )));
    }
}
