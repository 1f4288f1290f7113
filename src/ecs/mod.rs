pub mod components;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::DistanceAlg;
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::{Builder, Entity, Join, World as SpecsWorld, WorldExt};

use crate::{
    ai::AiState,
    data::items::{
        ConsumableEffect, DAGGER, EquipSlot, ItemArchetype, ItemKind, LEATHER_ARMOR, StatKind,
        Targeting,
    },
    data::monsters::MonsterArchetype,
    error::Impossible,
    map::{GameMap, GameWorld, procgen},
};

use self::{
    components::{
        Ai, BlocksTile, Consumable, Equipment, Equippable, Fighter, Inventory, ItemTag, Level,
        MonsterTag, Name, PlayerTag, Position, RenderOrder, Renderable, Viewshed, XpValue,
    },
    resources::{LogEntry, MessageLog, log_color},
};

pub const PLAYER_VIEW_RADIUS: i32 = 8;
/// One slot per use key (1-9), so everything carried is reachable from the
/// keyboard and visible on the quickbar.
pub const INVENTORY_CAPACITY: usize = 9;
pub const LEVEL_UP_BASE: i32 = 200;

/// One player command, fully resolved by the input layer (targeted
/// consumables arrive with their target already chosen).
#[derive(Copy, Clone, Debug)]
pub enum PlayerAction {
    Move { delta: Point },
    Wait,
    Pickup,
    UseItem { slot: usize, target: Option<Point> },
    DropItem { slot: usize },
    Descend,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Acted,
    /// The player stood on the stairs; the caller generates the next floor.
    Descended,
    /// The player reached the goal tile on the final floor.
    Victory,
}

#[derive(Copy, Clone, Debug)]
pub enum LevelUpChoice {
    Vitality,
    Strength,
    Defense,
}

/// One quickbar row for the HUD.
#[derive(Clone, Debug)]
pub struct InventoryEntry {
    pub name: String,
    pub equipped: bool,
}

/// Facade over the specs world. All game mutation goes through here; the
/// main loop never touches storages directly.
pub struct EcsWorld {
    specs_world: SpecsWorld,
    player: Entity,
}

impl EcsWorld {
    pub fn new(seed: u64) -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(RandomNumberGenerator::seeded(seed));
        specs_world.insert(MessageLog::default());

        let player = specs_world
            .create_entity()
            .with(Position {
                point: Point::new(0, 0),
            })
            .with(Renderable {
                glyph: b'@' as u16,
                color: bracket_terminal::prelude::RGB::from_u8(255, 255, 255),
                order: RenderOrder::Actor,
            })
            .with(Name {
                name: "Player".to_string(),
            })
            .with(Fighter::new(30, 1, 2))
            .with(Ai {
                state: AiState::Player,
            })
            .with(Viewshed {
                radius: PLAYER_VIEW_RADIUS,
                dirty: true,
                visible: Vec::new(),
            })
            .with(Inventory::new(INVENTORY_CAPACITY))
            .with(Equipment::default())
            .with(Level::new(LEVEL_UP_BASE))
            .with(BlocksTile)
            .with(PlayerTag)
            .build();

        Self {
            specs_world,
            player,
        }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<Renderable>();
        world.register::<Name>();
        world.register::<PlayerTag>();
        world.register::<MonsterTag>();
        world.register::<BlocksTile>();
        world.register::<ItemTag>();
        world.register::<Fighter>();
        world.register::<Ai>();
        world.register::<Viewshed>();
        world.register::<Consumable>();
        world.register::<Equippable>();
        world.register::<Inventory>();
        world.register::<Equipment>();
        world.register::<Level>();
        world.register::<XpValue>();
    }

    /// Generate floor 1, hand out the starting gear, and greet the player.
    pub fn new_game(&mut self, world_cfg: &mut GameWorld) {
        world_cfg.current_floor = 1;
        let plan = self.generate_floor(world_cfg);
        self.apply_floor_plan(plan);

        let dagger = self.spawn_carried_item(&DAGGER);
        let armor = self.spawn_carried_item(&LEATHER_ARMOR);
        {
            let mut inventories = self.specs_world.write_component::<Inventory>();
            if let Some(inventory) = inventories.get_mut(self.player) {
                inventory.items.push(dagger);
                inventory.items.push(armor);
            }
        }
        {
            let mut equipment = self.specs_world.write_component::<Equipment>();
            if let Some(slots) = equipment.get_mut(self.player) {
                slots.weapon = Some(dagger);
                slots.armor = Some(armor);
            }
        }

        self.log(
            "Hello and welcome, adventurer, to yet another dungeon!",
            log_color::WELCOME,
        );
        systems::update_player_fov(&mut self.specs_world, self.player);
    }

    /// Advance to the next floor: everything left behind is discarded, the
    /// player's inventory and stats carry over.
    pub fn descend(&mut self, world_cfg: &mut GameWorld) {
        world_cfg.current_floor += 1;
        let plan = self.generate_floor(world_cfg);

        let doomed: Vec<Entity> = {
            let entities = self.specs_world.entities();
            let positions = self.specs_world.read_component::<Position>();
            (&entities, &positions)
                .join()
                .filter(|(entity, _)| *entity != self.player)
                .map(|(entity, _)| entity)
                .collect()
        };
        let _ = self.specs_world.delete_entities(&doomed);
        self.specs_world.maintain();

        self.apply_floor_plan(plan);
        self.log("You descend the staircase.", log_color::DESCEND);
        systems::update_player_fov(&mut self.specs_world, self.player);
    }

    fn generate_floor(&mut self, world_cfg: &GameWorld) -> procgen::FloorPlan {
        let mut rng = self.specs_world.write_resource::<RandomNumberGenerator>();
        procgen::generate_dungeon(world_cfg, &mut rng)
    }

    fn apply_floor_plan(&mut self, plan: procgen::FloorPlan) {
        self.set_player_point(plan.player_spawn);
        self.specs_world.insert(plan.map);
        for spawn in plan.spawns {
            match spawn {
                procgen::Spawn::Monster(archetype, point) => {
                    self.spawn_monster(archetype, point);
                }
                procgen::Spawn::Item(archetype, point) => {
                    self.spawn_item(archetype, point);
                }
            }
        }
    }

    pub fn spawn_monster(&mut self, archetype: &MonsterArchetype, point: Point) -> Entity {
        self.specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: archetype.glyph as u16,
                color: bracket_terminal::prelude::RGB::from_u8(
                    archetype.color.0,
                    archetype.color.1,
                    archetype.color.2,
                ),
                order: RenderOrder::Actor,
            })
            .with(Name {
                name: archetype.name.to_string(),
            })
            .with(Fighter::new(archetype.hp, archetype.defense, archetype.power))
            .with(Ai {
                state: AiState::for_kind(archetype.ai),
            })
            .with(XpValue(archetype.xp_given))
            .with(BlocksTile)
            .with(MonsterTag)
            .build()
    }

    pub fn spawn_item(&mut self, archetype: &ItemArchetype, point: Point) -> Entity {
        let entity = self.spawn_carried_item(archetype);
        let mut positions = self.specs_world.write_component::<Position>();
        let _ = positions.insert(entity, Position { point });
        entity
    }

    /// An item entity without a position, living only in an inventory.
    pub fn spawn_carried_item(&mut self, archetype: &ItemArchetype) -> Entity {
        let builder = self
            .specs_world
            .create_entity()
            .with(Renderable {
                glyph: archetype.glyph as u16,
                color: bracket_terminal::prelude::RGB::from_u8(
                    archetype.color.0,
                    archetype.color.1,
                    archetype.color.2,
                ),
                order: RenderOrder::Item,
            })
            .with(Name {
                name: archetype.name.to_string(),
            })
            .with(ItemTag);

        match archetype.kind {
            ItemKind::Consumable(effect) => builder.with(Consumable { effect }).build(),
            ItemKind::Equippable {
                slot,
                power_bonus,
                defense_bonus,
            } => builder
                .with(Equippable {
                    slot,
                    power_bonus,
                    defense_bonus,
                })
                .build(),
        }
    }

    /// Apply one player command. On `Err` the turn is not consumed and the
    /// caller reports the reason; on `Ok` the caller runs `end_turn`.
    pub fn player_act(&mut self, action: PlayerAction) -> Result<ActionOutcome, Impossible> {
        match action {
            PlayerAction::Move { delta } => self.player_move(delta),
            PlayerAction::Wait => Ok(ActionOutcome::Acted),
            PlayerAction::Pickup => self.player_pickup(),
            PlayerAction::UseItem { slot, target } => self.player_use_item(slot, target),
            PlayerAction::DropItem { slot } => self.player_drop_item(slot),
            PlayerAction::Descend => self.player_descend(),
        }
    }

    /// Run everyone else's turn and settle the consequences. Deaths caused
    /// by the player's own action are reaped first so their messages land
    /// before the enemies move.
    pub fn end_turn(&mut self) {
        systems::reap_dead(&mut self.specs_world, self.player);
        systems::enemy_turns(&mut self.specs_world, self.player);
        systems::reap_dead(&mut self.specs_world, self.player);
        systems::update_player_fov(&mut self.specs_world, self.player);
    }

    fn player_move(&mut self, delta: Point) -> Result<ActionOutcome, Impossible> {
        let dest = self.player_point() + delta;
        if let Some(target) =
            systems::blocking_actor_at(&self.specs_world, dest, self.player)
        {
            systems::attack(&mut self.specs_world, self.player, target, "attacks");
            return Ok(ActionOutcome::Acted);
        }
        if !self
            .specs_world
            .read_resource::<GameMap>()
            .is_walkable(dest)
        {
            return Err(Impossible::new("That way is blocked."));
        }
        systems::try_move(&mut self.specs_world, self.player, delta);
        Ok(ActionOutcome::Acted)
    }

    fn player_pickup(&mut self) -> Result<ActionOutcome, Impossible> {
        let here = self.player_point();
        let item = {
            let entities = self.specs_world.entities();
            let positions = self.specs_world.read_component::<Position>();
            let items = self.specs_world.read_component::<ItemTag>();
            (&entities, &positions, &items)
                .join()
                .find(|(_, pos, _)| pos.point == here)
                .map(|(entity, _, _)| entity)
        };
        let Some(item) = item else {
            return Err(Impossible::new("There is nothing here to pick up."));
        };

        {
            let mut inventories = self.specs_world.write_component::<Inventory>();
            let inventory = inventories
                .get_mut(self.player)
                .ok_or_else(|| Impossible::new("You cannot carry anything."))?;
            if inventory.items.len() >= inventory.capacity {
                return Err(Impossible::new("Your inventory is full."));
            }
            inventory.items.push(item);
        }
        {
            let mut positions = self.specs_world.write_component::<Position>();
            positions.remove(item);
        }

        let name = systems::name_of(&self.specs_world, item);
        self.log(format!("You picked up the {name}!"), log_color::NEUTRAL);
        Ok(ActionOutcome::Acted)
    }

    fn item_in_slot(&self, slot: usize) -> Result<Entity, Impossible> {
        let inventories = self.specs_world.read_component::<Inventory>();
        inventories
            .get(self.player)
            .and_then(|inventory| inventory.items.get(slot).copied())
            .ok_or_else(|| Impossible::new("Invalid entry."))
    }

    fn player_use_item(
        &mut self,
        slot: usize,
        target: Option<Point>,
    ) -> Result<ActionOutcome, Impossible> {
        let item = self.item_in_slot(slot)?;

        let equippable = self
            .specs_world
            .read_component::<Equippable>()
            .get(item)
            .copied();
        if let Some(gear) = equippable {
            self.toggle_equip(item, gear.slot);
            return Ok(ActionOutcome::Acted);
        }

        let effect = self
            .specs_world
            .read_component::<Consumable>()
            .get(item)
            .map(|consumable| consumable.effect)
            .ok_or_else(|| Impossible::new("You cannot use that."))?;

        let name = systems::name_of(&self.specs_world, item);
        self.activate_consumable(&name, effect, target)?;

        if !effect.is_reusable() {
            let mut inventories = self.specs_world.write_component::<Inventory>();
            if let Some(inventory) = inventories.get_mut(self.player) {
                inventory.items.retain(|&carried| carried != item);
            }
            drop(inventories);
            let _ = self.specs_world.delete_entity(item);
        }
        Ok(ActionOutcome::Acted)
    }

    fn player_drop_item(&mut self, slot: usize) -> Result<ActionOutcome, Impossible> {
        let item = self.item_in_slot(slot)?;

        let equipped_slot = {
            let equipment = self.specs_world.read_component::<Equipment>();
            equipment.get(self.player).and_then(|slots| {
                if slots.weapon == Some(item) {
                    Some(EquipSlot::Weapon)
                } else if slots.armor == Some(item) {
                    Some(EquipSlot::Armor)
                } else {
                    None
                }
            })
        };
        if let Some(slot) = equipped_slot {
            self.toggle_equip(item, slot);
        }

        {
            let mut inventories = self.specs_world.write_component::<Inventory>();
            if let Some(inventory) = inventories.get_mut(self.player) {
                inventory.items.retain(|&carried| carried != item);
            }
        }
        let here = self.player_point();
        {
            let mut positions = self.specs_world.write_component::<Position>();
            let _ = positions.insert(item, Position { point: here });
        }

        let name = systems::name_of(&self.specs_world, item);
        self.log(format!("You dropped the {name}."), log_color::NEUTRAL);
        Ok(ActionOutcome::Acted)
    }

    fn player_descend(&mut self) -> Result<ActionOutcome, Impossible> {
        let here = self.player_point();
        let (on_goal, on_stairs) = {
            let map = self.specs_world.read_resource::<GameMap>();
            (map.goal == Some(here), map.downstairs == here)
        };
        if on_goal {
            self.log(
                "You touch the Monolith's empty pedestal. The dungeon falls silent. You win!",
                log_color::WELCOME,
            );
            return Ok(ActionOutcome::Victory);
        }
        if on_stairs {
            return Ok(ActionOutcome::Descended);
        }
        Err(Impossible::new("There are no stairs here."))
    }

    fn toggle_equip(&mut self, item: Entity, slot: EquipSlot) {
        let (unequipped, replaced) = {
            let mut equipment = self.specs_world.write_component::<Equipment>();
            let Some(slots) = equipment.get_mut(self.player) else {
                return;
            };
            let current = match slot {
                EquipSlot::Weapon => &mut slots.weapon,
                EquipSlot::Armor => &mut slots.armor,
            };
            if *current == Some(item) {
                *current = None;
                (true, None)
            } else {
                let replaced = current.take();
                *current = Some(item);
                (false, replaced)
            }
        };

        if let Some(old) = replaced {
            let old_name = systems::name_of(&self.specs_world, old);
            self.log(format!("You remove the {old_name}."), log_color::NEUTRAL);
        }
        let name = systems::name_of(&self.specs_world, item);
        if unequipped {
            self.log(format!("You remove the {name}."), log_color::NEUTRAL);
        } else {
            self.log(format!("You equip the {name}."), log_color::NEUTRAL);
        }
    }

    fn activate_consumable(
        &mut self,
        name: &str,
        effect: ConsumableEffect,
        target: Option<Point>,
    ) -> Result<(), Impossible> {
        match effect {
            ConsumableEffect::Healing { amount } => {
                let recovered = systems::heal(&mut self.specs_world, self.player, amount);
                if recovered <= 0 {
                    return Err(Impossible::new("Your health is already full."));
                }
                self.log(
                    format!("You consume the {name}, and recover {recovered} HP!"),
                    log_color::HEALTH_RECOVERED,
                );
            }
            ConsumableEffect::TrickHealing { amount } => {
                systems::take_damage(&mut self.specs_world, self.player, amount);
                self.log(
                    format!("That {name} tasted foul... you take {amount} damage!"),
                    log_color::TRICK,
                );
            }
            ConsumableEffect::Lightning { damage, max_range } => {
                self.lightning_strike(damage, max_range)?;
            }
            ConsumableEffect::Confusion { turns } => {
                let victim = self.require_enemy_target(target)?;
                let victim_name = systems::name_of(&self.specs_world, victim);
                self.wrap_ai(victim, |previous| AiState::Confused {
                    previous,
                    turns_remaining: turns,
                });
                self.log(
                    format!(
                        "The eyes of the {victim_name} look vacant, as it starts to stumble around!"
                    ),
                    log_color::STATUS_EFFECT,
                );
            }
            ConsumableEffect::Fireball { damage, radius }
            | ConsumableEffect::ExplosiveStaff { damage, radius } => {
                let center = self.require_visible_target(target)?;
                self.explosion(center, damage, radius, false)?;
            }
            ConsumableEffect::EndStaff { damage, radius } => {
                let center = self.require_visible_target(target)?;
                self.explosion(center, damage, radius, true)?;
            }
            ConsumableEffect::TimeStop { turns, radius } => {
                let center = self.require_visible_target(target)?;
                self.time_stop(center, turns, radius)?;
            }
            ConsumableEffect::Missile { damage } | ConsumableEffect::Staff { damage } => {
                let victim = self.require_enemy_target(target)?;
                let victim_name = systems::name_of(&self.specs_world, victim);
                self.log(
                    format!("The {victim_name} is struck by the {name}, taking {damage} damage!"),
                    log_color::PLAYER_ATTACK,
                );
                systems::take_damage(&mut self.specs_world, victim, damage);
            }
            ConsumableEffect::StatBoost {
                kind,
                amount,
                turns,
            } => {
                self.stat_boost(kind, amount, turns)?;
            }
        }
        Ok(())
    }

    fn require_visible_target(&self, target: Option<Point>) -> Result<Point, Impossible> {
        let point = target.ok_or_else(|| Impossible::new("No target selected."))?;
        if !self.specs_world.read_resource::<GameMap>().is_visible(point) {
            return Err(Impossible::new(
                "You cannot target an area that you cannot see.",
            ));
        }
        Ok(point)
    }

    fn require_enemy_target(&self, target: Option<Point>) -> Result<Entity, Impossible> {
        let point = self.require_visible_target(target)?;
        if point == self.player_point() {
            return Err(Impossible::new("You cannot target yourself!"));
        }
        systems::blocking_actor_at(&self.specs_world, point, self.player)
            .ok_or_else(|| Impossible::new("You must select an enemy to target."))
    }

    /// Auto-targeting bolt: hits the closest visible enemy in range.
    fn lightning_strike(&mut self, damage: i32, max_range: i32) -> Result<(), Impossible> {
        let origin = self.player_point();
        let victim = {
            let entities = self.specs_world.entities();
            let positions = self.specs_world.read_component::<Position>();
            let monsters = self.specs_world.read_component::<MonsterTag>();
            let map = self.specs_world.read_resource::<GameMap>();
            (&entities, &positions, &monsters)
                .join()
                .filter(|(_, pos, _)| map.is_visible(pos.point))
                .map(|(entity, pos, _)| {
                    (entity, DistanceAlg::Pythagoras.distance2d(origin, pos.point))
                })
                .filter(|(_, distance)| *distance < (max_range + 1) as f32)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(entity, _)| entity)
        };

        let Some(victim) = victim else {
            return Err(Impossible::new("No enemy is close enough to strike."));
        };
        let victim_name = systems::name_of(&self.specs_world, victim);
        self.log(
            format!(
                "A lightning bolt strikes the {victim_name} with a loud thunder, for {damage} damage!"
            ),
            log_color::PLAYER_ATTACK,
        );
        systems::take_damage(&mut self.specs_world, victim, damage);
        Ok(())
    }

    /// Area blast at `center`. The player is not exempt. `daze` additionally
    /// stuns surviving monsters for a turn.
    fn explosion(
        &mut self,
        center: Point,
        damage: i32,
        radius: i32,
        daze: bool,
    ) -> Result<(), Impossible> {
        let victims: Vec<Entity> = {
            let entities = self.specs_world.entities();
            let positions = self.specs_world.read_component::<Position>();
            let fighters = self.specs_world.read_component::<Fighter>();
            (&entities, &positions, &fighters)
                .join()
                .filter(|(_, pos, _)| {
                    DistanceAlg::Pythagoras.distance2d(center, pos.point) <= radius as f32
                })
                .map(|(entity, _, _)| entity)
                .collect()
        };
        if victims.is_empty() {
            return Err(Impossible::new("There are no targets in the radius."));
        }

        for victim in victims {
            let victim_name = systems::name_of(&self.specs_world, victim);
            self.log(
                format!(
                    "The {victim_name} is engulfed in a fiery explosion, taking {damage} damage!"
                ),
                log_color::PLAYER_ATTACK,
            );
            systems::take_damage(&mut self.specs_world, victim, damage);
            if daze && victim != self.player {
                self.wrap_ai(victim, |previous| AiState::Confused {
                    previous,
                    turns_remaining: 1,
                });
            }
        }
        Ok(())
    }

    fn time_stop(&mut self, center: Point, turns: i32, radius: i32) -> Result<(), Impossible> {
        let victims: Vec<Entity> = {
            let entities = self.specs_world.entities();
            let positions = self.specs_world.read_component::<Position>();
            let monsters = self.specs_world.read_component::<MonsterTag>();
            (&entities, &positions, &monsters)
                .join()
                .filter(|(_, pos, _)| {
                    DistanceAlg::Pythagoras.distance2d(center, pos.point) <= radius as f32
                })
                .map(|(entity, _, _)| entity)
                .collect()
        };
        if victims.is_empty() {
            return Err(Impossible::new("There are no targets in the radius."));
        }

        for victim in victims {
            let victim_name = systems::name_of(&self.specs_world, victim);
            self.wrap_ai(victim, |previous| AiState::TimeStopped {
                previous,
                turns_remaining: turns,
            });
            self.log(
                format!("The {victim_name} is frozen in time!"),
                log_color::STATUS_EFFECT,
            );
        }
        Ok(())
    }

    /// Temporary stat potion. Only one modifier may be active at a time;
    /// drinking a second one fails without consuming the turn or the potion.
    fn stat_boost(&mut self, kind: StatKind, amount: i32, turns: i32) -> Result<(), Impossible> {
        {
            let ais = self.specs_world.read_component::<Ai>();
            if ais
                .get(self.player)
                .is_some_and(|ai| ai.state.is_stat_modifier())
            {
                return Err(Impossible::new(
                    "You must wait for your current status effect to wear off!",
                ));
            }
        }
        {
            let mut fighters = self.specs_world.write_component::<Fighter>();
            if let Some(fighter) = fighters.get_mut(self.player) {
                match kind {
                    StatKind::Power => fighter.base_power += amount,
                    StatKind::Defense => fighter.base_defense += amount,
                }
            }
        }
        self.wrap_ai(self.player, |previous| AiState::StatModifier {
            kind,
            amount,
            previous,
            turns_remaining: turns,
        });

        let stat = match kind {
            StatKind::Power => "power",
            StatKind::Defense => "defense",
        };
        if amount >= 0 {
            self.log(
                format!("You feel invigorated! Your {stat} is increased by {amount}."),
                log_color::STATUS_EFFECT,
            );
        } else {
            self.log(
                format!(
                    "Something was wrong with that potion... your {stat} is reduced by {}.",
                    -amount
                ),
                log_color::TRICK,
            );
        }
        Ok(())
    }

    fn wrap_ai<F>(&mut self, entity: Entity, wrap: F)
    where
        F: FnOnce(Box<AiState>) -> AiState,
    {
        let mut ais = self.specs_world.write_component::<Ai>();
        if let Some(ai) = ais.get_mut(entity) {
            let previous = std::mem::replace(&mut ai.state, AiState::Player);
            ai.state = wrap(Box::new(previous));
        }
    }

    /// Force a viewshed recompute, e.g. after restoring a save.
    pub fn refresh_fov(&mut self) {
        {
            let mut viewsheds = self.specs_world.write_component::<Viewshed>();
            if let Some(viewshed) = viewsheds.get_mut(self.player) {
                viewshed.dirty = true;
            }
        }
        systems::update_player_fov(&mut self.specs_world, self.player);
    }

    pub fn report_impossible(&mut self, err: &Impossible) {
        self.log(err.to_string(), log_color::IMPOSSIBLE);
    }

    pub fn log<S: Into<String>>(&mut self, text: S, color: (u8, u8, u8)) {
        self.specs_world
            .write_resource::<MessageLog>()
            .push(text, color);
    }

    pub fn log_tail(&self, count: usize) -> Vec<LogEntry> {
        self.specs_world
            .read_resource::<MessageLog>()
            .tail(count)
            .to_vec()
    }

    pub fn player_entity(&self) -> Entity {
        self.player
    }

    pub fn player_point(&self) -> Point {
        systems::position_of(&self.specs_world, self.player).unwrap_or(Point::new(0, 0))
    }

    fn set_player_point(&mut self, point: Point) {
        {
            let mut positions = self.specs_world.write_component::<Position>();
            if let Some(pos) = positions.get_mut(self.player) {
                pos.point = point;
            }
        }
        let mut viewsheds = self.specs_world.write_component::<Viewshed>();
        if let Some(viewshed) = viewsheds.get_mut(self.player) {
            viewshed.dirty = true;
        }
    }

    pub fn player_fighter(&self) -> Option<Fighter> {
        self.specs_world
            .read_component::<Fighter>()
            .get(self.player)
            .copied()
    }

    /// (power, defense) with equipment bonuses folded in, for the HUD.
    pub fn player_derived_stats(&self) -> (i32, i32) {
        (
            systems::power_of(&self.specs_world, self.player),
            systems::defense_of(&self.specs_world, self.player),
        )
    }

    pub fn player_level(&self) -> Option<Level> {
        self.specs_world
            .read_component::<Level>()
            .get(self.player)
            .copied()
    }

    pub fn player_requires_level_up(&self) -> bool {
        self.player_level()
            .is_some_and(|level| level.requires_level_up())
    }

    pub fn apply_level_up(&mut self, choice: LevelUpChoice) {
        let new_level = {
            let mut levels = self.specs_world.write_component::<Level>();
            let Some(level) = levels.get_mut(self.player) else {
                return;
            };
            level.xp -= level.xp_to_next_level();
            level.level += 1;
            level.level
        };
        {
            let mut fighters = self.specs_world.write_component::<Fighter>();
            if let Some(fighter) = fighters.get_mut(self.player) {
                match choice {
                    LevelUpChoice::Vitality => {
                        fighter.max_hp += 20;
                        fighter.hp += 20;
                    }
                    LevelUpChoice::Strength => fighter.base_power += 1,
                    LevelUpChoice::Defense => fighter.base_defense += 1,
                }
            }
        }
        let line = match choice {
            LevelUpChoice::Vitality => "Your health improves!",
            LevelUpChoice::Strength => "You feel stronger!",
            LevelUpChoice::Defense => "Your movements are getting swifter!",
        };
        self.log(line, log_color::STATUS_EFFECT);
        self.log(
            format!("You advance to level {new_level}!"),
            log_color::WELCOME,
        );
    }

    pub fn is_player_dead(&self) -> bool {
        self.player_fighter()
            .is_none_or(|fighter| fighter.hp <= 0)
    }

    pub fn player_inventory(&self) -> Vec<InventoryEntry> {
        let inventories = self.specs_world.read_component::<Inventory>();
        let names = self.specs_world.read_component::<Name>();
        let equipment = self.specs_world.read_component::<Equipment>();
        let slots = equipment.get(self.player).copied().unwrap_or_default();
        inventories
            .get(self.player)
            .map(|inventory| {
                inventory
                    .items
                    .iter()
                    .map(|&item| InventoryEntry {
                        name: names
                            .get(item)
                            .map_or_else(|| "???".to_string(), |name| name.name.clone()),
                        equipped: slots.weapon == Some(item) || slots.armor == Some(item),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// What the input layer must collect before using the item in `slot`.
    /// `None` when the slot is empty.
    pub fn item_targeting(&self, slot: usize) -> Option<Targeting> {
        let item = self.item_in_slot(slot).ok()?;
        if self
            .specs_world
            .read_component::<Equippable>()
            .get(item)
            .is_some()
        {
            return Some(Targeting::None);
        }
        self.specs_world
            .read_component::<Consumable>()
            .get(item)
            .map(|consumable| consumable.effect.targeting())
    }

    pub fn map(&self) -> specs::shred::Fetch<'_, GameMap> {
        self.specs_world.read_resource::<GameMap>()
    }

    /// Visit every positioned renderable in draw order, items under actors.
    pub fn each_renderable<F>(&self, mut f: F)
    where
        F: FnMut(Point, &Renderable),
    {
        let positions = self.specs_world.read_component::<Position>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let mut drawable: Vec<(Point, &Renderable)> = (&positions, &renderables)
            .join()
            .map(|(pos, renderable)| (pos.point, renderable))
            .collect();
        drawable.sort_by_key(|(_, renderable)| renderable.order);
        for (point, renderable) in drawable {
            f(point, renderable);
        }
    }

    pub(crate) fn specs(&self) -> &SpecsWorld {
        &self.specs_world
    }

    pub(crate) fn specs_mut(&mut self) -> &mut SpecsWorld {
        &mut self.specs_world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::items::HEALTH_POTION;
    use crate::data::monsters::{GOBLIN_ARCHER, ORC};
    use crate::map::tiles::TileKind;

    fn arena() -> (EcsWorld, GameWorld) {
        let mut ecs = EcsWorld::new(42);
        let world_cfg = GameWorld::default();
        let mut map = GameMap::new(20, 20, 1);
        for y in 1..19 {
            for x in 1..19 {
                map.set_tile(Point::new(x, y), TileKind::Floor);
            }
        }
        map.downstairs = Point::new(15, 15);
        map.set_tile(Point::new(15, 15), TileKind::DownStairs);
        ecs.specs_world.insert(map);
        ecs.set_player_point(Point::new(5, 5));
        systems::update_player_fov(&mut ecs.specs_world, ecs.player);
        (ecs, world_cfg)
    }

    #[test]
    fn walking_into_a_wall_is_impossible_and_free() {
        let (mut ecs, _) = arena();
        ecs.set_player_point(Point::new(1, 1));
        systems::update_player_fov(&mut ecs.specs_world, ecs.player);
        let result = ecs.player_act(PlayerAction::Move {
            delta: Point::new(-1, 0),
        });
        assert!(result.is_err());
        assert_eq!(ecs.player_point(), Point::new(1, 1));
    }

    #[test]
    fn bumping_a_monster_attacks_instead_of_moving() {
        let (mut ecs, _) = arena();
        let orc = ecs.spawn_monster(&ORC, Point::new(6, 5));
        let before = ecs
            .specs_world
            .read_component::<Fighter>()
            .get(orc)
            .unwrap()
            .hp;
        ecs.player_act(PlayerAction::Move {
            delta: Point::new(1, 0),
        })
        .unwrap();
        assert_eq!(ecs.player_point(), Point::new(5, 5));
        let after = ecs
            .specs_world
            .read_component::<Fighter>()
            .get(orc)
            .unwrap()
            .hp;
        // Bare-handed player power 2 against orc defense 0.
        assert_eq!(before - after, 2);
    }

    #[test]
    fn pickup_requires_an_item_underfoot() {
        let (mut ecs, _) = arena();
        assert!(ecs.player_act(PlayerAction::Pickup).is_err());

        ecs.spawn_item(&HEALTH_POTION, Point::new(5, 5));
        ecs.player_act(PlayerAction::Pickup).unwrap();
        let names: Vec<String> = ecs
            .player_inventory()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert!(names.contains(&"Health Potion".to_string()));
    }

    #[test]
    fn pickup_refuses_once_every_quickbar_slot_is_full() {
        let (mut ecs, _) = arena();
        let potions: Vec<Entity> = (0..INVENTORY_CAPACITY)
            .map(|_| ecs.spawn_carried_item(&HEALTH_POTION))
            .collect();
        {
            let mut inventories = ecs.specs_world.write_component::<Inventory>();
            inventories.get_mut(ecs.player).unwrap().items.extend(potions);
        }

        ecs.spawn_item(&HEALTH_POTION, Point::new(5, 5));
        assert!(ecs.player_act(PlayerAction::Pickup).is_err());
        assert_eq!(ecs.player_inventory().len(), INVENTORY_CAPACITY);
    }

    #[test]
    fn healing_at_full_health_fails_and_keeps_the_potion() {
        let (mut ecs, _) = arena();
        let potion = ecs.spawn_carried_item(&HEALTH_POTION);
        {
            let mut inventories = ecs.specs_world.write_component::<Inventory>();
            inventories.get_mut(ecs.player).unwrap().items.push(potion);
        }
        let slot = ecs.player_inventory().len() - 1;
        let result = ecs.player_act(PlayerAction::UseItem { slot, target: None });
        assert!(result.is_err());
        assert_eq!(ecs.player_inventory().len(), slot + 1);

        {
            let mut fighters = ecs.specs_world.write_component::<Fighter>();
            fighters.get_mut(ecs.player).unwrap().hp = 10;
        }
        ecs.player_act(PlayerAction::UseItem { slot, target: None })
            .unwrap();
        assert_eq!(ecs.player_fighter().unwrap().hp, 14);
        assert_eq!(ecs.player_inventory().len(), slot);
    }

    #[test]
    fn second_stat_potion_is_rejected_while_one_is_active() {
        let (mut ecs, _) = arena();
        ecs.stat_boost(StatKind::Power, 3, 10).unwrap();
        assert_eq!(ecs.player_fighter().unwrap().base_power, 5);
        let second = ecs.stat_boost(StatKind::Defense, 3, 10);
        assert!(second.is_err());
        assert_eq!(ecs.player_fighter().unwrap().base_defense, 1);
    }

    #[test]
    fn stat_modifier_expires_and_reverts_the_stat() {
        let (mut ecs, _) = arena();
        ecs.stat_boost(StatKind::Power, 3, 2).unwrap();
        ecs.end_turn();
        assert_eq!(ecs.player_fighter().unwrap().base_power, 5);
        ecs.end_turn();
        assert_eq!(ecs.player_fighter().unwrap().base_power, 2);
        assert!(
            !ecs.specs_world
                .read_component::<Ai>()
                .get(ecs.player)
                .unwrap()
                .state
                .is_stat_modifier()
        );
    }

    #[test]
    fn hostile_monsters_close_in_and_attack_when_adjacent() {
        let (mut ecs, _) = arena();
        let orc = ecs.spawn_monster(&ORC, Point::new(9, 5));

        // Four tiles out in an open room: three pursuit steps, then a swing.
        let mut last = 4;
        for _ in 0..3 {
            ecs.end_turn();
            let here = systems::position_of(&ecs.specs_world, orc).unwrap();
            let dist = DistanceAlg::Chebyshev.distance2d(here, ecs.player_point()) as i32;
            assert!(dist < last, "orc failed to close in (still at {here:?})");
            last = dist;
        }
        assert_eq!(last, 1);

        let hp_before = ecs.player_fighter().unwrap().hp;
        ecs.end_turn();
        // Orc power 3 against player defense 1.
        assert_eq!(hp_before - ecs.player_fighter().unwrap().hp, 2);
        assert_eq!(
            systems::position_of(&ecs.specs_world, orc),
            Some(Point::new(6, 5))
        );
    }

    #[test]
    fn ranged_monsters_shoot_from_a_distance_without_moving() {
        let (mut ecs, _) = arena();
        let archer = ecs.spawn_monster(&GOBLIN_ARCHER, Point::new(9, 5));
        let hp_before = ecs.player_fighter().unwrap().hp;
        ecs.end_turn();
        assert_eq!(
            systems::position_of(&ecs.specs_world, archer),
            Some(Point::new(9, 5))
        );
        assert_eq!(hp_before - ecs.player_fighter().unwrap().hp, 2);
    }

    #[test]
    fn time_stopped_monsters_stand_still_until_the_effect_expires() {
        let (mut ecs, _) = arena();
        let orc = ecs.spawn_monster(&ORC, Point::new(6, 5));
        ecs.wrap_ai(orc, |previous| AiState::TimeStopped {
            previous,
            turns_remaining: 2,
        });

        // Adjacent but frozen: no step, no swing, for exactly two turns.
        for _ in 0..2 {
            ecs.end_turn();
            assert_eq!(
                systems::position_of(&ecs.specs_world, orc),
                Some(Point::new(6, 5))
            );
        }
        assert_eq!(ecs.player_fighter().unwrap().hp, 30);
        {
            let ais = ecs.specs_world.read_component::<Ai>();
            assert!(matches!(
                ais.get(orc).unwrap().state,
                AiState::Hostile { .. }
            ));
        }

        ecs.end_turn();
        assert_eq!(ecs.player_fighter().unwrap().hp, 28);
    }

    #[test]
    fn confusion_wears_off_after_exactly_its_turn_count() {
        let (mut ecs, _) = arena();
        let orc = ecs.spawn_monster(&ORC, Point::new(15, 15));
        ecs.wrap_ai(orc, |previous| AiState::Confused {
            previous,
            turns_remaining: 3,
        });

        for _ in 0..2 {
            ecs.end_turn();
            let ais = ecs.specs_world.read_component::<Ai>();
            assert!(matches!(
                ais.get(orc).unwrap().state,
                AiState::Confused { .. }
            ));
        }
        ecs.end_turn();
        let ais = ecs.specs_world.read_component::<Ai>();
        assert!(matches!(
            ais.get(orc).unwrap().state,
            AiState::Hostile { .. }
        ));
    }

    #[test]
    fn descend_requires_standing_on_the_stairs() {
        let (mut ecs, _) = arena();
        assert!(ecs.player_act(PlayerAction::Descend).is_err());
        ecs.set_player_point(Point::new(15, 15));
        assert_eq!(
            ecs.player_act(PlayerAction::Descend).unwrap(),
            ActionOutcome::Descended
        );
    }

    #[test]
    fn descending_discards_the_old_floor_but_keeps_the_inventory() {
        let mut ecs = EcsWorld::new(7);
        let mut world_cfg = GameWorld::default();
        ecs.new_game(&mut world_cfg);
        let carried_before = ecs.player_inventory().len();
        assert_eq!(carried_before, 2);

        ecs.descend(&mut world_cfg);
        assert_eq!(world_cfg.current_floor, 2);
        assert_eq!(ecs.player_inventory().len(), carried_before);

        // Nothing from floor 1 lingers: every positioned entity except the
        // player belongs to the new plan, and the player stands on floor 2's
        // spawn point inside a carved room.
        assert!(ecs.map().is_walkable(ecs.player_point()));
    }

    #[test]
    fn killing_a_monster_awards_its_experience() {
        let (mut ecs, _) = arena();
        let orc = ecs.spawn_monster(&ORC, Point::new(6, 5));
        {
            let mut fighters = ecs.specs_world.write_component::<Fighter>();
            fighters.get_mut(orc).unwrap().hp = 1;
        }
        ecs.player_act(PlayerAction::Move {
            delta: Point::new(1, 0),
        })
        .unwrap();
        ecs.end_turn();
        assert!(!ecs.specs_world.entities().is_alive(orc));
        assert_eq!(ecs.player_level().unwrap().xp, ORC.xp_given);
    }
}
