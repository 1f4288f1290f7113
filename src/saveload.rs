//! Snapshot persistence. Entities are saved by archetype name plus their
//! mutable state and rebuilt from the static tables on load, so save files
//! stay readable and survive stat rebalances.

use std::fs;
use std::path::Path;

use bracket_geometry::prelude::Point;
use serde::{Deserialize, Serialize};
use specs::prelude::{Join, WorldExt};
use thiserror::Error;

use crate::ai::AiState;
use crate::data::{items, monsters};
use crate::ecs::EcsWorld;
use crate::ecs::components::{
    Ai, Equipment, Fighter, Inventory, ItemTag, Level, MonsterTag, Name, Position,
};
use crate::ecs::resources::MessageLog;
use crate::map::{GameMap, GameWorld, tiles::Palette, tiles::TileKind};

pub const SAVE_PATH: &str = "savegame.json";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save file is not valid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save file references unknown archetype '{0}'")]
    UnknownArchetype(String),
}

#[derive(Serialize, Deserialize)]
struct WorldSnapshot {
    map_width: i32,
    map_height: i32,
    max_rooms: i32,
    room_min_size: i32,
    room_max_size: i32,
    current_floor: i32,
}

#[derive(Serialize, Deserialize)]
struct MapSnapshot {
    width: i32,
    height: i32,
    palette: Palette,
    tiles: Vec<TileKind>,
    explored: Vec<bool>,
    downstairs: (i32, i32),
    goal: Option<(i32, i32)>,
}

#[derive(Serialize, Deserialize)]
struct FighterSnapshot {
    hp: i32,
    max_hp: i32,
    base_power: i32,
    base_defense: i32,
}

#[derive(Serialize, Deserialize)]
struct PlayerSnapshot {
    point: (i32, i32),
    fighter: FighterSnapshot,
    level: i32,
    xp: i32,
    ai: AiState,
    /// Carried item archetype names, in slot order.
    inventory: Vec<String>,
    weapon_slot: Option<usize>,
    armor_slot: Option<usize>,
}

#[derive(Serialize, Deserialize)]
struct MonsterSnapshot {
    name: String,
    point: (i32, i32),
    hp: i32,
    ai: AiState,
}

#[derive(Serialize, Deserialize)]
struct GroundItemSnapshot {
    name: String,
    point: (i32, i32),
}

#[derive(Serialize, Deserialize)]
struct LogSnapshot {
    text: String,
    color: (u8, u8, u8),
}

#[derive(Serialize, Deserialize)]
pub struct SaveGame {
    saved_at: String,
    world: WorldSnapshot,
    map: MapSnapshot,
    player: PlayerSnapshot,
    monsters: Vec<MonsterSnapshot>,
    ground_items: Vec<GroundItemSnapshot>,
    log: Vec<LogSnapshot>,
}

fn pair(point: Point) -> (i32, i32) {
    (point.x, point.y)
}

pub fn save_game<P: AsRef<Path>>(
    ecs: &EcsWorld,
    world_cfg: &GameWorld,
    path: P,
) -> Result<(), SaveError> {
    let snapshot = snapshot(ecs, world_cfg);
    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_game<P: AsRef<Path>>(path: P) -> Result<(EcsWorld, GameWorld), SaveError> {
    let json = fs::read_to_string(path)?;
    let snapshot: SaveGame = serde_json::from_str(&json)?;
    restore(snapshot)
}

fn snapshot(ecs: &EcsWorld, world_cfg: &GameWorld) -> SaveGame {
    let specs = ecs.specs();
    let player = ecs.player_entity();
    let map = specs.read_resource::<GameMap>();

    let names = specs.read_component::<Name>();
    let positions = specs.read_component::<Position>();
    let fighters = specs.read_component::<Fighter>();
    let ais = specs.read_component::<Ai>();
    let monster_tags = specs.read_component::<MonsterTag>();
    let item_tags = specs.read_component::<ItemTag>();
    let inventories = specs.read_component::<Inventory>();
    let equipment = specs.read_component::<Equipment>();
    let levels = specs.read_component::<Level>();
    let entities = specs.entities();

    let carried: Vec<specs::Entity> = inventories
        .get(player)
        .map(|inventory| inventory.items.clone())
        .unwrap_or_default();
    let inventory_names = carried
        .iter()
        .map(|&item| {
            names
                .get(item)
                .map_or_else(String::new, |name| name.name.clone())
        })
        .collect();
    let slots = equipment.get(player).copied().unwrap_or_default();
    let slot_index =
        |held: Option<specs::Entity>| held.and_then(|e| carried.iter().position(|&c| c == e));

    let player_fighter = fighters.get(player).copied().unwrap_or(Fighter::new(1, 0, 0));
    let player_level = levels.get(player).copied().unwrap_or(Level::new(200));
    let player_snapshot = PlayerSnapshot {
        point: positions.get(player).map_or((0, 0), |pos| pair(pos.point)),
        fighter: FighterSnapshot {
            hp: player_fighter.hp,
            max_hp: player_fighter.max_hp,
            base_power: player_fighter.base_power,
            base_defense: player_fighter.base_defense,
        },
        level: player_level.level,
        xp: player_level.xp,
        ai: ais
            .get(player)
            .map_or(AiState::Player, |ai| ai.state.clone()),
        inventory: inventory_names,
        weapon_slot: slot_index(slots.weapon),
        armor_slot: slot_index(slots.armor),
    };

    let monster_snapshots = (&entities, &positions, &fighters, &names, &ais, &monster_tags)
        .join()
        .map(|(_, pos, fighter, name, ai, _)| MonsterSnapshot {
            name: name.name.clone(),
            point: pair(pos.point),
            hp: fighter.hp,
            ai: ai.state.clone(),
        })
        .collect();

    let ground_items = (&entities, &positions, &names, &item_tags)
        .join()
        .map(|(_, pos, name, _)| GroundItemSnapshot {
            name: name.name.clone(),
            point: pair(pos.point),
        })
        .collect();

    let log = specs
        .read_resource::<MessageLog>()
        .entries
        .iter()
        .map(|entry| LogSnapshot {
            text: entry.text.clone(),
            // Round, don't truncate: 32/255 scaled back up lands at 31.9999.
            color: (
                (entry.color.r * 255.0).round() as u8,
                (entry.color.g * 255.0).round() as u8,
                (entry.color.b * 255.0).round() as u8,
            ),
        })
        .collect();

    SaveGame {
        saved_at: chrono::Local::now().to_rfc3339(),
        world: WorldSnapshot {
            map_width: world_cfg.map_width,
            map_height: world_cfg.map_height,
            max_rooms: world_cfg.max_rooms,
            room_min_size: world_cfg.room_min_size,
            room_max_size: world_cfg.room_max_size,
            current_floor: world_cfg.current_floor,
        },
        map: MapSnapshot {
            width: map.width,
            height: map.height,
            palette: map.palette,
            tiles: map.tiles.clone(),
            explored: map.explored.clone(),
            downstairs: pair(map.downstairs),
            goal: map.goal.map(pair),
        },
        player: player_snapshot,
        monsters: monster_snapshots,
        ground_items,
        log,
    }
}

fn restore(snapshot: SaveGame) -> Result<(EcsWorld, GameWorld), SaveError> {
    let world_cfg = GameWorld {
        map_width: snapshot.world.map_width,
        map_height: snapshot.world.map_height,
        max_rooms: snapshot.world.max_rooms,
        room_min_size: snapshot.world.room_min_size,
        room_max_size: snapshot.world.room_max_size,
        current_floor: snapshot.world.current_floor,
    };

    // The RNG stream is not part of the snapshot; resume on a fresh seed.
    let seed = chrono::Local::now().timestamp_millis() as u64;
    let mut ecs = EcsWorld::new(seed);

    let mut map = GameMap::new(snapshot.map.width, snapshot.map.height, 1);
    map.palette = snapshot.map.palette;
    map.tiles = snapshot.map.tiles;
    map.explored = snapshot.map.explored;
    map.downstairs = Point::new(snapshot.map.downstairs.0, snapshot.map.downstairs.1);
    map.goal = snapshot.map.goal.map(|(x, y)| Point::new(x, y));
    ecs.specs_mut().insert(map);

    for entry in snapshot.log {
        ecs.log(entry.text, entry.color);
    }

    for item in snapshot.ground_items {
        let archetype = items::item_by_name(&item.name)
            .ok_or_else(|| SaveError::UnknownArchetype(item.name.clone()))?;
        ecs.spawn_item(archetype, Point::new(item.point.0, item.point.1));
    }

    for monster in snapshot.monsters {
        let archetype = monsters::monster_by_name(&monster.name)
            .ok_or_else(|| SaveError::UnknownArchetype(monster.name.clone()))?;
        let entity = ecs.spawn_monster(archetype, Point::new(monster.point.0, monster.point.1));
        let specs = ecs.specs_mut();
        {
            let mut fighters = specs.write_component::<Fighter>();
            if let Some(fighter) = fighters.get_mut(entity) {
                fighter.hp = monster.hp;
            }
        }
        let mut ais = specs.write_component::<Ai>();
        if let Some(ai) = ais.get_mut(entity) {
            ai.state = monster.ai.clone();
        }
    }

    restore_player(&mut ecs, snapshot.player)?;
    ecs.refresh_fov();
    Ok((ecs, world_cfg))
}

fn restore_player(ecs: &mut EcsWorld, snapshot: PlayerSnapshot) -> Result<(), SaveError> {
    let mut carried = Vec::with_capacity(snapshot.inventory.len());
    for name in &snapshot.inventory {
        let archetype =
            items::item_by_name(name).ok_or_else(|| SaveError::UnknownArchetype(name.clone()))?;
        carried.push(ecs.spawn_carried_item(archetype));
    }

    let player = ecs.player_entity();
    let specs = ecs.specs_mut();
    {
        let mut positions = specs.write_component::<Position>();
        if let Some(pos) = positions.get_mut(player) {
            pos.point = Point::new(snapshot.point.0, snapshot.point.1);
        }
    }
    {
        let mut fighters = specs.write_component::<Fighter>();
        if let Some(fighter) = fighters.get_mut(player) {
            fighter.hp = snapshot.fighter.hp;
            fighter.max_hp = snapshot.fighter.max_hp;
            fighter.base_power = snapshot.fighter.base_power;
            fighter.base_defense = snapshot.fighter.base_defense;
        }
    }
    {
        let mut levels = specs.write_component::<Level>();
        if let Some(level) = levels.get_mut(player) {
            level.level = snapshot.level;
            level.xp = snapshot.xp;
        }
    }
    {
        let mut ais = specs.write_component::<Ai>();
        if let Some(ai) = ais.get_mut(player) {
            ai.state = snapshot.ai.clone();
        }
    }
    {
        let mut equipment = specs.write_component::<Equipment>();
        if let Some(slots) = equipment.get_mut(player) {
            slots.weapon = snapshot.weapon_slot.and_then(|i| carried.get(i).copied());
            slots.armor = snapshot.armor_slot.and_then(|i| carried.get(i).copied());
        }
    }
    {
        let mut inventories = specs.write_component::<Inventory>();
        if let Some(inventory) = inventories.get_mut(player) {
            inventory.items = carried;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{PlayerAction, systems};
    use bracket_geometry::prelude::Point;

    #[test]
    fn save_and_load_round_trips_the_run() {
        let mut ecs = EcsWorld::new(1701);
        let mut world_cfg = GameWorld::default();
        ecs.new_game(&mut world_cfg);
        let _ = ecs.player_act(PlayerAction::Wait);
        ecs.end_turn();

        let spawn = ecs.player_point();
        let hp_before = ecs.player_fighter().unwrap().hp;
        let inventory_before: Vec<String> = ecs
            .player_inventory()
            .into_iter()
            .map(|entry| entry.name)
            .collect();

        let dir = std::env::temp_dir().join("ivelan-depths-save-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.json");
        save_game(&ecs, &world_cfg, &path).unwrap();

        let (loaded, loaded_cfg) = load_game(&path).unwrap();
        assert_eq!(loaded_cfg.current_floor, 1);
        assert_eq!(loaded.player_point(), spawn);
        assert_eq!(loaded.player_fighter().unwrap().hp, hp_before);
        let inventory_after: Vec<String> = loaded
            .player_inventory()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(inventory_after, inventory_before);

        // Equipment slots survive by index: dagger and leather armor are
        // still worn, so derived stats match.
        assert_eq!(
            loaded.player_derived_stats(),
            ecs.player_derived_stats()
        );

        // Monster census survives.
        let count = |world: &EcsWorld| {
            let specs = world.specs();
            let entities = specs.entities();
            let monsters = specs.read_component::<MonsterTag>();
            (&entities, &monsters).join().count()
        };
        assert_eq!(count(&loaded), count(&ecs));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn log_colors_survive_a_round_trip() {
        use bracket_terminal::prelude::RGB;

        let mut ecs = EcsWorld::new(5);
        let mut world_cfg = GameWorld::default();
        ecs.new_game(&mut world_cfg);
        ecs.log("a violet omen", (159, 63, 255));

        let dir = std::env::temp_dir().join("ivelan-depths-save-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("log-colors.json");
        save_game(&ecs, &world_cfg, &path).unwrap();

        let (loaded, _) = load_game(&path).unwrap();
        let tail = loaded.log_tail(1);
        assert_eq!(tail[0].text, "a violet omen");
        assert_eq!(tail[0].color, RGB::from_u8(159, 63, 255));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn loading_restores_visibility_from_the_player_viewshed() {
        let mut ecs = EcsWorld::new(99);
        let mut world_cfg = GameWorld::default();
        ecs.new_game(&mut world_cfg);

        let dir = std::env::temp_dir().join("ivelan-depths-save-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fov.json");
        save_game(&ecs, &world_cfg, &path).unwrap();

        let (mut loaded, _) = load_game(&path).unwrap();
        let player = loaded.player_entity();
        systems::update_player_fov(loaded.specs_mut(), player);
        let spawn = loaded.player_point();
        assert!(loaded.map().is_visible(spawn));
        assert_ne!(loaded.player_point(), Point::new(0, 0));

        std::fs::remove_file(&path).unwrap();
    }
}
