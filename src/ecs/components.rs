use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::RGB;
use specs::prelude::{Component, NullStorage, VecStorage};

use crate::ai::AiState;
use crate::data::items::{ConsumableEffect, EquipSlot};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Position {
    pub point: Point,
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

/// Draw priority: higher orders are drawn on top.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RenderOrder {
    Item,
    Actor,
}

#[derive(Clone, Debug)]
pub struct Renderable {
    pub glyph: u16,
    pub color: RGB,
    pub order: RenderOrder,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Name {
    pub name: String,
}

impl Component for Name {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Default)]
pub struct MonsterTag;

impl Component for MonsterTag {
    type Storage = NullStorage<Self>;
}

/// Occupies its cell for movement and soft-penalizes it for pathfinding.
#[derive(Default)]
pub struct BlocksTile;

impl Component for BlocksTile {
    type Storage = NullStorage<Self>;
}

/// Combat stats. `base_*` exclude equipment; derived values are computed
/// against the wearer's `Equipment` at attack time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fighter {
    pub hp: i32,
    pub max_hp: i32,
    pub base_power: i32,
    pub base_defense: i32,
}

impl Fighter {
    pub fn new(hp: i32, base_defense: i32, base_power: i32) -> Self {
        Self {
            hp,
            max_hp: hp,
            base_power,
            base_defense,
        }
    }
}

impl Component for Fighter {
    type Storage = VecStorage<Self>;
}

/// The actor's current behavior variant; exactly one per actor.
#[derive(Clone, Debug)]
pub struct Ai {
    pub state: AiState,
}

impl Component for Ai {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct Viewshed {
    pub radius: i32,
    pub dirty: bool,
    pub visible: Vec<Point>,
}

impl Component for Viewshed {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct ItemTag;

impl Component for ItemTag {
    type Storage = NullStorage<Self>;
}

#[derive(Copy, Clone, Debug)]
pub struct Consumable {
    pub effect: ConsumableEffect,
}

impl Component for Consumable {
    type Storage = VecStorage<Self>;
}

#[derive(Copy, Clone, Debug)]
pub struct Equippable {
    pub slot: EquipSlot,
    pub power_bonus: i32,
    pub defense_bonus: i32,
}

impl Component for Equippable {
    type Storage = VecStorage<Self>;
}

/// Bounded list of carried item entities; order is the slot order shown in
/// the quickbar.
#[derive(Clone, Debug)]
pub struct Inventory {
    pub capacity: usize,
    pub items: Vec<specs::Entity>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }
}

impl Component for Inventory {
    type Storage = VecStorage<Self>;
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Equipment {
    pub weapon: Option<specs::Entity>,
    pub armor: Option<specs::Entity>,
}

impl Component for Equipment {
    type Storage = VecStorage<Self>;
}

/// Experience progression for the player.
#[derive(Copy, Clone, Debug)]
pub struct Level {
    pub level: i32,
    pub xp: i32,
    pub level_up_base: i32,
    pub level_up_factor: i32,
}

impl Level {
    pub fn new(level_up_base: i32) -> Self {
        Self {
            level: 1,
            xp: 0,
            level_up_base,
            level_up_factor: 150,
        }
    }

    pub fn xp_to_next_level(&self) -> i32 {
        self.level_up_base + (self.level - 1) * self.level_up_factor
    }

    pub fn requires_level_up(&self) -> bool {
        self.xp >= self.xp_to_next_level()
    }
}

impl Component for Level {
    type Storage = VecStorage<Self>;
}

/// Experience granted to the player when this actor dies.
#[derive(Copy, Clone, Debug)]
pub struct XpValue(pub i32);

impl Component for XpValue {
    type Storage = VecStorage<Self>;
}
