//! Whole-floor generation properties, checked across seeds and depths.

use std::collections::VecDeque;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;

use ivelan_depths::data::monsters::{ENEMY_TABLE, MONOLITH};
use ivelan_depths::map::procgen::{Spawn, generate_dungeon};
use ivelan_depths::map::tiles::{Palette, TileKind};
use ivelan_depths::map::{FINAL_FLOOR, GameMap, GameWorld, LATE_PALETTE_FLOOR};

fn world_at(floor: i32) -> GameWorld {
    GameWorld {
        current_floor: floor,
        ..GameWorld::default()
    }
}

/// Eight-way flood fill over walkable tiles, matching actor movement.
fn reachable_from(map: &GameMap, start: Point) -> Vec<bool> {
    let mut seen = vec![false; (map.width * map.height) as usize];
    let mut queue = VecDeque::new();
    seen[map.idx(start)] = true;
    queue.push_back(start);
    while let Some(point) = queue.pop_front() {
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let next = Point::new(point.x + dx, point.y + dy);
                if map.is_walkable(next) && !seen[map.idx(next)] {
                    seen[map.idx(next)] = true;
                    queue.push_back(next);
                }
            }
        }
    }
    seen
}

#[test]
fn every_walkable_tile_is_reachable_from_the_spawn() {
    for seed in [1u64, 42, 1337, 9001] {
        let mut rng = RandomNumberGenerator::seeded(seed);
        let plan = generate_dungeon(&world_at(1), &mut rng);
        assert!(plan.map.is_walkable(plan.player_spawn));

        let seen = reachable_from(&plan.map, plan.player_spawn);
        for y in 0..plan.map.height {
            for x in 0..plan.map.width {
                let point = Point::new(x, y);
                if plan.map.is_walkable(point) {
                    assert!(
                        seen[plan.map.idx(point)],
                        "seed {seed}: walkable tile {point:?} unreachable from spawn"
                    );
                }
            }
        }
        assert!(seen[plan.map.idx(plan.map.downstairs)]);
    }
}

#[test]
fn each_floor_has_exactly_one_exit() {
    for floor in 1..FINAL_FLOOR {
        let mut rng = RandomNumberGenerator::seeded(floor as u64 + 7);
        let plan = generate_dungeon(&world_at(floor), &mut rng);
        let stairs = plan
            .map
            .tiles
            .iter()
            .filter(|&&kind| kind == TileKind::DownStairs)
            .count();
        assert_eq!(stairs, 1, "floor {floor}");
        assert!(plan.map.is_walkable(plan.map.downstairs));
        assert_eq!(plan.map.goal, None);
    }

    let mut rng = RandomNumberGenerator::seeded(17);
    let plan = generate_dungeon(&world_at(FINAL_FLOOR), &mut rng);
    let stairs = plan
        .map
        .tiles
        .iter()
        .filter(|&&kind| kind == TileKind::DownStairs)
        .count();
    assert_eq!(stairs, 0);
    let goals = plan
        .map
        .tiles
        .iter()
        .filter(|&&kind| kind == TileKind::Goal)
        .count();
    assert_eq!(goals, 1);
}

#[test]
fn spawned_monsters_come_from_the_floor_table() {
    for floor in 1..=FINAL_FLOOR {
        let mut rng = RandomNumberGenerator::seeded(floor as u64 * 31);
        let plan = generate_dungeon(&world_at(floor), &mut rng);
        let weights = ENEMY_TABLE.effective_weights(floor);
        for spawn in &plan.spawns {
            let Spawn::Monster(archetype, point) = spawn else {
                continue;
            };
            if std::ptr::eq(*archetype, &MONOLITH) {
                assert_eq!(floor, FINAL_FLOOR, "the Monolith belongs to the last floor");
                continue;
            }
            assert!(plan.map.is_walkable(*point));
            let weight = weights
                .iter()
                .find(|(candidate, _)| std::ptr::eq(*candidate, *archetype))
                .map(|(_, weight)| *weight)
                .unwrap_or(0);
            assert!(
                weight > 0,
                "floor {floor}: {} spawned with weight {weight}",
                archetype.name
            );
        }
    }
}

#[test]
fn late_floors_switch_the_palette() {
    for floor in 1..=FINAL_FLOOR {
        let mut rng = RandomNumberGenerator::seeded(floor as u64);
        let plan = generate_dungeon(&world_at(floor), &mut rng);
        let expected = if floor < LATE_PALETTE_FLOOR {
            Palette::Early
        } else {
            Palette::Late
        };
        assert_eq!(plan.map.palette, expected, "floor {floor}");
    }
}

#[test]
fn a_full_descent_is_deterministic_per_seed() {
    let run = |seed: u64| {
        let mut rng = RandomNumberGenerator::seeded(seed);
        let mut fingerprints = Vec::new();
        for floor in 1..=FINAL_FLOOR {
            let plan = generate_dungeon(&world_at(floor), &mut rng);
            fingerprints.push((
                plan.player_spawn,
                plan.map.downstairs,
                plan.rooms.len(),
                plan.spawns.len(),
            ));
        }
        fingerprints
    };
    assert_eq!(run(0xDEC0DE), run(0xDEC0DE));
    assert_ne!(run(1), run(2));
}
