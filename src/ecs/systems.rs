use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{DistanceAlg, field_of_view};
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::{Entity, Join, World, WorldExt};

use super::components::{
    Ai, BlocksTile, Equipment, Equippable, Fighter, Level, MonsterTag, Name, PlayerTag, Position,
    Viewshed, XpValue,
};
use super::resources::{MessageLog, log_color};
use crate::ai::{AiState, find_path};
use crate::data::items::StatKind;
use crate::map::GameMap;

const CONFUSION_DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

pub fn position_of(world: &World, entity: Entity) -> Option<Point> {
    world
        .read_component::<Position>()
        .get(entity)
        .map(|pos| pos.point)
}

/// Cells held by blocking entities, fed to the pathfinder as soft
/// obstacles.
pub fn collect_blockers(world: &World) -> Vec<Point> {
    let entities = world.entities();
    let positions = world.read_component::<Position>();
    let blockers = world.read_component::<BlocksTile>();
    (&entities, &positions, &blockers)
        .join()
        .map(|(_, pos, _)| pos.point)
        .collect()
}

pub fn blocking_actor_at(world: &World, point: Point, exclude: Entity) -> Option<Entity> {
    let entities = world.entities();
    let positions = world.read_component::<Position>();
    let blockers = world.read_component::<BlocksTile>();
    let fighters = world.read_component::<Fighter>();
    (&entities, &positions, &blockers, &fighters)
        .join()
        .find(|(entity, pos, _, _)| *entity != exclude && pos.point == point)
        .map(|(entity, _, _, _)| entity)
}

fn equipment_bonus(world: &World, entity: Entity) -> (i32, i32) {
    let equipment = world.read_component::<Equipment>();
    let equippables = world.read_component::<Equippable>();
    let mut power = 0;
    let mut defense = 0;
    if let Some(slots) = equipment.get(entity) {
        for item in [slots.weapon, slots.armor].into_iter().flatten() {
            if let Some(gear) = equippables.get(item) {
                power += gear.power_bonus;
                defense += gear.defense_bonus;
            }
        }
    }
    (power, defense)
}

/// Base power plus equipped weapon/armor bonuses.
pub fn power_of(world: &World, entity: Entity) -> i32 {
    let base = world
        .read_component::<Fighter>()
        .get(entity)
        .map_or(0, |fighter| fighter.base_power);
    base + equipment_bonus(world, entity).0
}

pub fn defense_of(world: &World, entity: Entity) -> i32 {
    let base = world
        .read_component::<Fighter>()
        .get(entity)
        .map_or(0, |fighter| fighter.base_defense);
    base + equipment_bonus(world, entity).1
}

pub fn name_of(world: &World, entity: Entity) -> String {
    world
        .read_component::<Name>()
        .get(entity)
        .map_or_else(|| "something".to_string(), |name| name.name.clone())
}

/// Relocate the entity by one step. Fails silently (returns false) when
/// the destination is non-walkable or held by a blocking entity; the soft
/// pathfinding penalty never overrides execution-time collision.
pub fn try_move(world: &mut World, entity: Entity, delta: Point) -> bool {
    let Some(origin) = position_of(world, entity) else {
        return false;
    };
    let dest = origin + delta;
    {
        let map = world.read_resource::<GameMap>();
        if !map.is_walkable(dest) {
            return false;
        }
    }
    if blocking_actor_at(world, dest, entity).is_some() {
        return false;
    }

    {
        let mut positions = world.write_component::<Position>();
        if let Some(pos) = positions.get_mut(entity) {
            pos.point = dest;
        }
    }
    {
        let mut viewsheds = world.write_component::<Viewshed>();
        if let Some(viewshed) = viewsheds.get_mut(entity) {
            viewshed.dirty = true;
        }
    }
    true
}

/// Attack when a blocking actor holds the destination, otherwise move.
pub fn bump(world: &mut World, entity: Entity, delta: Point) {
    let Some(origin) = position_of(world, entity) else {
        return;
    };
    let dest = origin + delta;
    if let Some(target) = blocking_actor_at(world, dest, entity) {
        attack(world, entity, target, "attacks");
    } else {
        try_move(world, entity, delta);
    }
}

pub fn attack(world: &mut World, attacker: Entity, defender: Entity, verb: &str) {
    let damage = power_of(world, attacker) - defense_of(world, defender);
    let attacker_name = name_of(world, attacker);
    let defender_name = name_of(world, defender);
    let attacker_is_player = world.read_component::<PlayerTag>().get(attacker).is_some();
    let color = if attacker_is_player {
        log_color::PLAYER_ATTACK
    } else {
        log_color::ENEMY_ATTACK
    };

    let mut log = world.write_resource::<MessageLog>();
    if damage > 0 {
        log.push(
            format!("{attacker_name} {verb} {defender_name} for {damage} hit points."),
            color,
        );
        drop(log);
        take_damage(world, defender, damage);
    } else {
        log.push(
            format!("{attacker_name} {verb} {defender_name} but does no damage."),
            color,
        );
    }
}

/// Direct hp loss, bypassing defense.
pub fn take_damage(world: &mut World, target: Entity, damage: i32) {
    let mut fighters = world.write_component::<Fighter>();
    if let Some(fighter) = fighters.get_mut(target) {
        fighter.hp -= damage;
    }
}

/// Restore hp up to the maximum; returns the amount actually recovered.
pub fn heal(world: &mut World, target: Entity, amount: i32) -> i32 {
    let mut fighters = world.write_component::<Fighter>();
    if let Some(fighter) = fighters.get_mut(target) {
        let before = fighter.hp;
        fighter.hp = (fighter.hp + amount).min(fighter.max_hp);
        fighter.hp - before
    } else {
        0
    }
}

/// Run one scheduled turn for every living actor except the player's own
/// input-driven action. Actors act strictly one after another in entity
/// order, each seeing the previous actor's mutations; the player is
/// included only so that transient status wrappers tick down.
pub fn enemy_turns(world: &mut World, player: Entity) {
    let actors: Vec<Entity> = {
        let entities = world.entities();
        let ais = world.read_component::<Ai>();
        (&entities, &ais).join().map(|(entity, _)| entity).collect()
    };

    for entity in actors {
        if !world.entities().is_alive(entity) {
            continue;
        }
        let dead = world
            .read_component::<Fighter>()
            .get(entity)
            .is_some_and(|fighter| fighter.hp <= 0);
        if dead {
            continue;
        }
        ai_take_turn(world, entity, player);
    }
}

/// Evaluate one actor's AI state for this turn.
pub fn ai_take_turn(world: &mut World, entity: Entity, player: Entity) {
    let state = {
        let mut ais = world.write_component::<Ai>();
        let Some(ai) = ais.get_mut(entity) else {
            return;
        };
        std::mem::replace(&mut ai.state, AiState::Player)
    };

    let next = match state {
        AiState::Player => AiState::Player,
        AiState::Hostile { path } => hostile_turn(world, entity, player, path, None),
        AiState::Ranged { range, path } => {
            match hostile_turn(world, entity, player, path, Some(range)) {
                AiState::Hostile { path } => AiState::Ranged { range, path },
                other => other,
            }
        }
        AiState::Confused {
            previous,
            turns_remaining,
        } => confused_turn(world, entity, previous, turns_remaining),
        AiState::TimeStopped {
            previous,
            turns_remaining,
        } => {
            let turns_remaining = turns_remaining - 1;
            if turns_remaining <= 0 {
                let name = name_of(world, entity);
                world.write_resource::<MessageLog>().push(
                    format!("The {name} is no longer frozen in time."),
                    log_color::STATUS_EFFECT,
                );
                *previous
            } else {
                AiState::TimeStopped {
                    previous,
                    turns_remaining,
                }
            }
        }
        AiState::StatModifier {
            kind,
            amount,
            previous,
            turns_remaining,
        } => {
            let turns_remaining = turns_remaining - 1;
            if turns_remaining <= 0 {
                {
                    let mut fighters = world.write_component::<Fighter>();
                    if let Some(fighter) = fighters.get_mut(entity) {
                        match kind {
                            StatKind::Power => fighter.base_power -= amount,
                            StatKind::Defense => fighter.base_defense -= amount,
                        }
                    }
                }
                let stat = match kind {
                    StatKind::Power => "power",
                    StatKind::Defense => "defense",
                };
                world.write_resource::<MessageLog>().push(
                    format!("Your {stat} returns to normal."),
                    log_color::STATUS_EFFECT,
                );
                *previous
            } else {
                AiState::StatModifier {
                    kind,
                    amount,
                    previous,
                    turns_remaining,
                }
            }
        }
    };

    let mut ais = world.write_component::<Ai>();
    if let Some(ai) = ais.get_mut(entity) {
        ai.state = next;
    }
}

/// Hostile pursuit: melee (or ranged fire) when close enough and inside
/// the player's FOV, otherwise chase along a cached cost-field path.
/// Returns the updated state as `Hostile`; the ranged caller rewraps it.
fn hostile_turn(
    world: &mut World,
    entity: Entity,
    player: Entity,
    mut path: Vec<Point>,
    ranged: Option<i32>,
) -> AiState {
    let Some(my_point) = position_of(world, entity) else {
        return AiState::Hostile { path };
    };
    let Some(player_point) = position_of(world, player) else {
        return AiState::Hostile { path };
    };

    let visible = world.read_resource::<GameMap>().is_visible(my_point);
    if visible {
        let distance = DistanceAlg::Chebyshev.distance2d(my_point, player_point) as i32;
        match ranged {
            Some(range) if distance <= range => {
                attack(world, entity, player, "shoots");
                return AiState::Hostile { path };
            }
            None if distance <= 1 => {
                attack(world, entity, player, "attacks");
                return AiState::Hostile { path };
            }
            _ => {
                let blockers = collect_blockers(world);
                let map = world.read_resource::<GameMap>();
                path = find_path(&map, blockers, my_point, player_point);
            }
        }
    }

    if !path.is_empty() {
        let dest = path.remove(0);
        try_move(world, entity, dest - my_point);
    }
    // No path and out of sight: idle, the turn is still consumed.
    AiState::Hostile { path }
}

/// Stumble one random step per turn, attacking whatever blocks the way.
fn confused_turn(
    world: &mut World,
    entity: Entity,
    previous: Box<AiState>,
    turns_remaining: i32,
) -> AiState {
    let direction = {
        let mut rng = world.write_resource::<RandomNumberGenerator>();
        let idx = rng.range(0, CONFUSION_DIRECTIONS.len() as i32) as usize;
        let (dx, dy) = CONFUSION_DIRECTIONS[idx];
        Point::new(dx, dy)
    };
    bump(world, entity, direction);

    let turns_remaining = turns_remaining - 1;
    if turns_remaining <= 0 {
        let name = name_of(world, entity);
        world.write_resource::<MessageLog>().push(
            format!("The {name} is no longer confused."),
            log_color::STATUS_EFFECT,
        );
        *previous
    } else {
        AiState::Confused {
            previous,
            turns_remaining,
        }
    }
}

/// Remove dead monsters, credit their experience to the player, and
/// announce the player's own death.
pub fn reap_dead(world: &mut World, player: Entity) {
    let dead: Vec<(Entity, String, i32)> = {
        let entities = world.entities();
        let fighters = world.read_component::<Fighter>();
        let names = world.read_component::<Name>();
        let monsters = world.read_component::<MonsterTag>();
        let xp_values = world.read_component::<XpValue>();
        (&entities, &fighters, &monsters)
            .join()
            .filter(|(_, fighter, _)| fighter.hp <= 0)
            .map(|(entity, _, _)| {
                let name = names
                    .get(entity)
                    .map_or_else(|| "something".to_string(), |n| n.name.clone());
                let xp = xp_values.get(entity).map_or(0, |xp| xp.0);
                (entity, name, xp)
            })
            .collect()
    };

    let mut earned = 0;
    for (entity, name, xp) in dead {
        world
            .write_resource::<MessageLog>()
            .push(format!("The {name} is dead!"), log_color::ENEMY_DIE);
        earned += xp;
        let _ = world.delete_entity(entity);
    }

    if earned > 0 {
        {
            let mut levels = world.write_component::<Level>();
            if let Some(level) = levels.get_mut(player) {
                level.xp += earned;
            }
        }
        world.write_resource::<MessageLog>().push(
            format!("You gain {earned} experience points."),
            log_color::NEUTRAL,
        );
    }

    let player_dead = world
        .read_component::<Fighter>()
        .get(player)
        .is_some_and(|fighter| fighter.hp <= 0);
    if player_dead {
        world
            .write_resource::<MessageLog>()
            .push("You died!", log_color::PLAYER_DIE);
    }

    world.maintain();
}

/// Recompute the player's viewshed when dirty and fold it into the map's
/// visible/explored bitmaps.
pub fn update_player_fov(world: &mut World, player: Entity) {
    let recomputed = {
        let positions = world.read_component::<Position>();
        let mut viewsheds = world.write_component::<Viewshed>();
        let map = world.read_resource::<GameMap>();
        match (positions.get(player), viewsheds.get_mut(player)) {
            (Some(pos), Some(viewshed)) if viewshed.dirty => {
                viewshed.visible = field_of_view(pos.point, viewshed.radius, &*map)
                    .into_iter()
                    .filter(|point| map.in_bounds(*point))
                    .collect();
                viewshed.dirty = false;
                Some(viewshed.visible.clone())
            }
            _ => None,
        }
    };

    if let Some(visible) = recomputed {
        let mut map = world.write_resource::<GameMap>();
        map.update_visibility(&visible);
    }
}
