use super::SpawnTable;

/// Which base stat a potion modifies for its duration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StatKind {
    Power,
    Defense,
}

/// What the input layer must supply before a consumable can activate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Targeting {
    None,
    Single,
    Area { radius: i32 },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ConsumableEffect {
    Healing { amount: i32 },
    /// Mislabeled potion that hurts instead. Always consumed.
    TrickHealing { amount: i32 },
    /// Strikes the nearest visible actor in range, no aiming.
    Lightning { damage: i32, max_range: i32 },
    Confusion { turns: i32 },
    Fireball { damage: i32, radius: i32 },
    TimeStop { turns: i32, radius: i32 },
    /// Single-use targeted damage (beam rune, old bow).
    Missile { damage: i32 },
    StatBoost { kind: StatKind, amount: i32, turns: i32 },
    /// Reusable targeted damage.
    Staff { damage: i32 },
    /// Reusable area damage.
    ExplosiveStaff { damage: i32, radius: i32 },
    /// Reusable area damage that also dazes victims for one turn.
    EndStaff { damage: i32, radius: i32 },
}

impl ConsumableEffect {
    pub fn targeting(&self) -> Targeting {
        match *self {
            ConsumableEffect::Confusion { .. }
            | ConsumableEffect::Missile { .. }
            | ConsumableEffect::Staff { .. } => Targeting::Single,
            ConsumableEffect::Fireball { radius, .. }
            | ConsumableEffect::TimeStop { radius, .. }
            | ConsumableEffect::ExplosiveStaff { radius, .. }
            | ConsumableEffect::EndStaff { radius, .. } => Targeting::Area { radius },
            _ => Targeting::None,
        }
    }

    /// Staffs survive activation; everything else is destroyed on use.
    pub fn is_reusable(&self) -> bool {
        matches!(
            self,
            ConsumableEffect::Staff { .. }
                | ConsumableEffect::ExplosiveStaff { .. }
                | ConsumableEffect::EndStaff { .. }
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EquipSlot {
    Weapon,
    Armor,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ItemKind {
    Consumable(ConsumableEffect),
    Equippable {
        slot: EquipSlot,
        power_bonus: i32,
        defense_bonus: i32,
    },
}

#[derive(Debug)]
pub struct ItemArchetype {
    pub name: &'static str,
    pub glyph: char,
    pub color: (u8, u8, u8),
    pub kind: ItemKind,
}

const fn consumable(
    name: &'static str,
    glyph: char,
    color: (u8, u8, u8),
    effect: ConsumableEffect,
) -> ItemArchetype {
    ItemArchetype {
        name,
        glyph,
        color,
        kind: ItemKind::Consumable(effect),
    }
}

const fn weapon(name: &'static str, color: (u8, u8, u8), power_bonus: i32) -> ItemArchetype {
    ItemArchetype {
        name,
        glyph: '/',
        color,
        kind: ItemKind::Equippable {
            slot: EquipSlot::Weapon,
            power_bonus,
            defense_bonus: 0,
        },
    }
}

const fn armor(name: &'static str, color: (u8, u8, u8), defense_bonus: i32) -> ItemArchetype {
    ItemArchetype {
        name,
        glyph: '[',
        color,
        kind: ItemKind::Equippable {
            slot: EquipSlot::Armor,
            power_bonus: 0,
            defense_bonus,
        },
    }
}

pub static HEALTH_POTION: ItemArchetype = consumable(
    "Health Potion",
    '!',
    (0, 160, 255),
    ConsumableEffect::Healing { amount: 4 },
);
pub static SUPER_HEALTH_POTION: ItemArchetype = consumable(
    "Super Potion",
    '+',
    (0, 160, 255),
    ConsumableEffect::Healing { amount: 10 },
);
pub static TRICK_HEALTH_POTION: ItemArchetype = consumable(
    "Bubbling Health Potion",
    '!',
    (0, 160, 255),
    ConsumableEffect::TrickHealing { amount: 3 },
);
pub static FIREBALL_SCROLL: ItemArchetype = consumable(
    "Fireball Scroll",
    '~',
    (255, 55, 0),
    ConsumableEffect::Fireball {
        damage: 12,
        radius: 3,
    },
);
pub static LIGHTNING_SCROLL: ItemArchetype = consumable(
    "Lightning Scroll",
    '~',
    (225, 200, 0),
    ConsumableEffect::Lightning {
        damage: 20,
        max_range: 5,
    },
);
pub static CONFUSION_SCROLL: ItemArchetype = consumable(
    "Confusion Scroll",
    '~',
    (190, 150, 255),
    ConsumableEffect::Confusion { turns: 10 },
);
pub static TIME_STOP_SCROLL: ItemArchetype = consumable(
    "Time Scroll",
    '~',
    (170, 0, 200),
    ConsumableEffect::TimeStop {
        turns: 10,
        radius: 3,
    },
);
pub static DEFENSE_POTION: ItemArchetype = consumable(
    "Defense Potion",
    '!',
    (0, 150, 15),
    ConsumableEffect::StatBoost {
        kind: StatKind::Defense,
        amount: 3,
        turns: 10,
    },
);
pub static TRICK_DEFENSE_POTION: ItemArchetype = consumable(
    "Murky Defense Potion",
    '!',
    (0, 150, 15),
    ConsumableEffect::StatBoost {
        kind: StatKind::Defense,
        amount: -2,
        turns: 10,
    },
);
pub static POWER_POTION: ItemArchetype = consumable(
    "Power Potion",
    '!',
    (210, 80, 200),
    ConsumableEffect::StatBoost {
        kind: StatKind::Power,
        amount: 3,
        turns: 10,
    },
);
pub static TRICK_POWER_POTION: ItemArchetype = consumable(
    "Old Power Potion",
    '!',
    (210, 80, 200),
    ConsumableEffect::StatBoost {
        kind: StatKind::Power,
        amount: -3,
        turns: 10,
    },
);
pub static BEAM_RUNE: ItemArchetype = consumable(
    "Beam Rune",
    '`',
    (140, 140, 140),
    ConsumableEffect::Missile { damage: 25 },
);
pub static OLD_BOW: ItemArchetype = consumable(
    "Old Bow and One(??) Arrow",
    '/',
    (100, 60, 53),
    ConsumableEffect::Missile { damage: 10 },
);
pub static LESSER_STAFF: ItemArchetype = consumable(
    "Lesser Staff",
    '/',
    (140, 120, 60),
    ConsumableEffect::Staff { damage: 12 },
);
pub static EXPLOSIVE_STAFF: ItemArchetype = consumable(
    "Explosive Staff",
    '/',
    (160, 140, 80),
    ConsumableEffect::ExplosiveStaff {
        damage: 15,
        radius: 3,
    },
);
pub static END_STAFF: ItemArchetype = consumable(
    "Ivelan's Staff of Corruption",
    '/',
    (180, 160, 100),
    ConsumableEffect::EndStaff {
        damage: 25,
        radius: 3,
    },
);

pub static DAGGER: ItemArchetype = weapon("Dagger", (79, 79, 79), 2);
pub static SWORD: ItemArchetype = weapon("Iron Sword", (79, 79, 79), 4);
pub static DIAMOND_SWORD: ItemArchetype = weapon("Diamond Sword", (0, 200, 180), 6);
pub static ADAMANTINE_SWORD: ItemArchetype = weapon("Adamantine Sword", (0, 80, 80), 8);
pub static BEAM_SWORD: ItemArchetype = weapon("Beam Sword", (150, 100, 0), 12);

pub static LEATHER_ARMOR: ItemArchetype = armor("Leather Armor", (150, 90, 0), 1);
pub static CHAIN_MAIL: ItemArchetype = armor("Chain Mail", (175, 175, 175), 3);
pub static KNIGHT_ARMOR: ItemArchetype = armor("Knight Armor", (200, 200, 200), 4);
pub static ADAMANTINE_ARMOR: ItemArchetype = armor("Adamantine Armor", (150, 100, 0), 6);
pub static RUNIC_ARMOR: ItemArchetype = armor("Runic Armor", (255, 170, 0), 8);

pub static ALL_ITEMS: &[&ItemArchetype] = &[
    &HEALTH_POTION,
    &SUPER_HEALTH_POTION,
    &TRICK_HEALTH_POTION,
    &FIREBALL_SCROLL,
    &LIGHTNING_SCROLL,
    &CONFUSION_SCROLL,
    &TIME_STOP_SCROLL,
    &DEFENSE_POTION,
    &TRICK_DEFENSE_POTION,
    &POWER_POTION,
    &TRICK_POWER_POTION,
    &BEAM_RUNE,
    &OLD_BOW,
    &LESSER_STAFF,
    &EXPLOSIVE_STAFF,
    &END_STAFF,
    &DAGGER,
    &SWORD,
    &DIAMOND_SWORD,
    &ADAMANTINE_SWORD,
    &BEAM_SWORD,
    &LEATHER_ARMOR,
    &CHAIN_MAIL,
    &KNIGHT_ARMOR,
    &ADAMANTINE_ARMOR,
    &RUNIC_ARMOR,
];

pub fn item_by_name(name: &str) -> Option<&'static ItemArchetype> {
    ALL_ITEMS.iter().copied().find(|item| item.name == name)
}

// Tiers list only the weights that change at that floor; earlier values
// carry forward until overwritten.
pub static ITEM_TABLE: SpawnTable<ItemArchetype> = SpawnTable {
    tiers: &[
        (
            1,
            &[
                (&HEALTH_POTION, 30),
                (&SUPER_HEALTH_POTION, 10),
                (&CONFUSION_SCROLL, 15),
                (&SWORD, 10),
                (&CHAIN_MAIL, 1),
            ],
        ),
        (
            2,
            &[
                (&SWORD, 15),
                (&CHAIN_MAIL, 10),
                (&SUPER_HEALTH_POTION, 15),
                (&CONFUSION_SCROLL, 20),
                (&LIGHTNING_SCROLL, 10),
                (&POWER_POTION, 10),
                (&DEFENSE_POTION, 10),
                (&OLD_BOW, 10),
            ],
        ),
        (
            3,
            &[
                (&SWORD, 25),
                (&DIAMOND_SWORD, 1),
                (&KNIGHT_ARMOR, 1),
                (&CHAIN_MAIL, 20),
                (&HEALTH_POTION, 35),
                (&SUPER_HEALTH_POTION, 20),
                (&CONFUSION_SCROLL, 25),
                (&LIGHTNING_SCROLL, 15),
                (&POWER_POTION, 15),
                (&DEFENSE_POTION, 15),
                (&OLD_BOW, 15),
                (&TRICK_POWER_POTION, 10),
                (&TRICK_DEFENSE_POTION, 10),
                (&TRICK_HEALTH_POTION, 10),
            ],
        ),
        (
            4,
            &[
                (&DIAMOND_SWORD, 15),
                (&KNIGHT_ARMOR, 15),
                (&SUPER_HEALTH_POTION, 25),
                (&CONFUSION_SCROLL, 30),
                (&LIGHTNING_SCROLL, 20),
                (&POWER_POTION, 20),
                (&DEFENSE_POTION, 20),
                (&TRICK_POWER_POTION, 15),
                (&TRICK_DEFENSE_POTION, 15),
                (&TRICK_HEALTH_POTION, 15),
                (&BEAM_RUNE, 5),
                (&LESSER_STAFF, 5),
                (&ADAMANTINE_ARMOR, 1),
                (&ADAMANTINE_SWORD, 1),
                (&FIREBALL_SCROLL, 15),
                (&TIME_STOP_SCROLL, 5),
            ],
        ),
        (
            5,
            &[
                (&SWORD, 10),
                (&DIAMOND_SWORD, 20),
                (&KNIGHT_ARMOR, 20),
                (&CHAIN_MAIL, 10),
                (&HEALTH_POTION, 30),
                (&SUPER_HEALTH_POTION, 30),
                (&LIGHTNING_SCROLL, 25),
                (&POWER_POTION, 25),
                (&DEFENSE_POTION, 25),
                (&OLD_BOW, 25),
                (&BEAM_RUNE, 10),
                (&LESSER_STAFF, 10),
                (&ADAMANTINE_ARMOR, 10),
                (&ADAMANTINE_SWORD, 10),
                (&FIREBALL_SCROLL, 20),
                (&TIME_STOP_SCROLL, 15),
            ],
        ),
        (
            6,
            &[
                (&SWORD, 1),
                (&DIAMOND_SWORD, 15),
                (&KNIGHT_ARMOR, 15),
                (&CHAIN_MAIL, 1),
                (&CONFUSION_SCROLL, 20),
                (&LIGHTNING_SCROLL, 30),
                (&POWER_POTION, 30),
                (&DEFENSE_POTION, 30),
                (&OLD_BOW, 15),
                (&BEAM_RUNE, 15),
                (&ADAMANTINE_ARMOR, 25),
                (&ADAMANTINE_SWORD, 25),
                (&FIREBALL_SCROLL, 25),
                (&RUNIC_ARMOR, 5),
                (&BEAM_SWORD, 5),
                (&TIME_STOP_SCROLL, 25),
                (&EXPLOSIVE_STAFF, 10),
            ],
        ),
        (
            7,
            &[
                (&SWORD, 0),
                (&CHAIN_MAIL, 0),
                (&HEALTH_POTION, 25),
                (&SUPER_HEALTH_POTION, 35),
                (&ADAMANTINE_SWORD, 20),
                (&FIREBALL_SCROLL, 20),
                (&RUNIC_ARMOR, 20),
                (&BEAM_SWORD, 20),
                (&EXPLOSIVE_STAFF, 20),
            ],
        ),
        (
            8,
            &[
                (&DIAMOND_SWORD, 5),
                (&KNIGHT_ARMOR, 5),
                (&HEALTH_POTION, 20),
                (&SUPER_HEALTH_POTION, 40),
                (&BEAM_RUNE, 20),
                (&LESSER_STAFF, 20),
                (&RUNIC_ARMOR, 30),
                (&BEAM_SWORD, 30),
                (&EXPLOSIVE_STAFF, 25),
                (&END_STAFF, 1),
            ],
        ),
        (
            9,
            &[
                (&DIAMOND_SWORD, 0),
                (&KNIGHT_ARMOR, 0),
                (&HEALTH_POTION, 30),
                (&SUPER_HEALTH_POTION, 30),
                (&OLD_BOW, 10),
                (&RUNIC_ARMOR, 35),
                (&BEAM_SWORD, 35),
                (&EXPLOSIVE_STAFF, 30),
            ],
        ),
        (
            10,
            &[
                (&HEALTH_POTION, 15),
                (&SUPER_HEALTH_POTION, 40),
                (&CONFUSION_SCROLL, 15),
                (&LIGHTNING_SCROLL, 20),
                (&LESSER_STAFF, 10),
                (&ADAMANTINE_ARMOR, 0),
                (&ADAMANTINE_SWORD, 0),
                (&FIREBALL_SCROLL, 10),
                (&END_STAFF, 35),
            ],
        ),
    ],
};
