use super::SpawnTable;

/// AI behavior assigned at spawn time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AiKind {
    Hostile,
    Ranged { range: i32 },
}

/// Spawn template for a hostile actor. Many instances may be spawned from
/// one archetype; all mutable state lives on the spawned entity.
#[derive(Debug)]
pub struct MonsterArchetype {
    pub name: &'static str,
    pub glyph: char,
    pub color: (u8, u8, u8),
    pub hp: i32,
    pub defense: i32,
    pub power: i32,
    pub xp_given: i32,
    pub ai: AiKind,
}

const fn melee(
    name: &'static str,
    glyph: char,
    color: (u8, u8, u8),
    hp: i32,
    defense: i32,
    power: i32,
    xp_given: i32,
) -> MonsterArchetype {
    MonsterArchetype {
        name,
        glyph,
        color,
        hp,
        defense,
        power,
        xp_given,
        ai: AiKind::Hostile,
    }
}

const fn ranged(
    name: &'static str,
    glyph: char,
    color: (u8, u8, u8),
    hp: i32,
    defense: i32,
    power: i32,
    xp_given: i32,
) -> MonsterArchetype {
    MonsterArchetype {
        name,
        glyph,
        color,
        hp,
        defense,
        power,
        xp_given,
        ai: AiKind::Ranged { range: 4 },
    }
}

pub static GOBLIN: MonsterArchetype = melee("Goblin", 'g', (63, 127, 63), 10, 1, 3, 75);
pub static ORC: MonsterArchetype = melee("Orc", 'o', (63, 127, 63), 10, 0, 3, 35);
pub static JACKAL: MonsterArchetype = melee("Jackal", 'j', (185, 155, 50), 13, 0, 4, 75);
pub static GOBLIN_ARCHER: MonsterArchetype =
    ranged("Goblin Archer", 'a', (63, 127, 63), 5, 0, 3, 75);
pub static TROLL: MonsterArchetype = melee("Troll", 'T', (63, 127, 63), 16, 1, 5, 100);
pub static DRONE: MonsterArchetype =
    melee("Eldritch Steel Drone", 'd', (255, 153, 153), 18, 2, 6, 125);
pub static GUARDIAN: MonsterArchetype =
    melee("Eldritch Guardian", 'G', (110, 190, 200), 20, 2, 9, 195);
pub static WARDEN: MonsterArchetype =
    melee("Possessed Warden", 'W', (255, 255, 135), 25, 5, 10, 210);
pub static CORRUPTED_WIZARD: MonsterArchetype =
    ranged("Wizard, follower of Ivelan", 'w', (255, 0, 230), 35, 5, 11, 270);
pub static ENCHANTED_STATUE: MonsterArchetype =
    melee("Enchanted Statue", 's', (255, 255, 255), 40, 8, 17, 330);
pub static AGENT_OF_IVELAN: MonsterArchetype = ranged(
    "Demonic Agent of Ivelan",
    'A',
    (255, 255, 255),
    45,
    7,
    16,
    500,
);
/// Final-floor boss, spawned next to the goal tile rather than drawn from
/// the table.
pub static MONOLITH: MonsterArchetype = melee(
    "Monolith, Incomprehensible Evil",
    'M',
    (255, 255, 255),
    70,
    12,
    25,
    1000,
);

pub static ALL_MONSTERS: &[&MonsterArchetype] = &[
    &GOBLIN,
    &ORC,
    &JACKAL,
    &GOBLIN_ARCHER,
    &TROLL,
    &DRONE,
    &GUARDIAN,
    &WARDEN,
    &CORRUPTED_WIZARD,
    &ENCHANTED_STATUE,
    &AGENT_OF_IVELAN,
    &MONOLITH,
];

pub fn monster_by_name(name: &str) -> Option<&'static MonsterArchetype> {
    ALL_MONSTERS.iter().copied().find(|m| m.name == name)
}

pub static ENEMY_TABLE: SpawnTable<MonsterArchetype> = SpawnTable {
    tiers: &[
        (
            1,
            &[
                (&GOBLIN, 15),
                (&ORC, 35),
                (&JACKAL, 20),
                (&GOBLIN_ARCHER, 10),
            ],
        ),
        (2, &[(&DRONE, 10)]),
        (
            3,
            &[
                (&GOBLIN, 20),
                (&GOBLIN_ARCHER, 15),
                (&DRONE, 20),
                (&GUARDIAN, 15),
                (&TROLL, 15),
                (&WARDEN, 1),
            ],
        ),
        (4, &[(&DRONE, 25), (&GUARDIAN, 20)]),
        (5, &[(&WARDEN, 10)]),
        (
            6,
            &[
                (&GOBLIN, 15),
                (&ORC, 20),
                (&JACKAL, 15),
                (&GUARDIAN, 25),
                (&TROLL, 25),
                (&WARDEN, 15),
                (&CORRUPTED_WIZARD, 10),
            ],
        ),
        (
            7,
            &[
                (&GOBLIN, 10),
                (&ORC, 10),
                (&JACKAL, 10),
                (&GOBLIN_ARCHER, 10),
                (&CORRUPTED_WIZARD, 15),
                (&ENCHANTED_STATUE, 10),
            ],
        ),
        (
            8,
            &[
                (&GOBLIN, 5),
                (&ORC, 5),
                (&JACKAL, 5),
                (&GOBLIN_ARCHER, 5),
                (&DRONE, 30),
                (&GUARDIAN, 30),
                (&TROLL, 35),
                (&WARDEN, 20),
                (&CORRUPTED_WIZARD, 20),
            ],
        ),
        (
            9,
            &[
                (&GOBLIN, 0),
                (&ORC, 0),
                (&JACKAL, 0),
                (&GOBLIN_ARCHER, 0),
                (&WARDEN, 25),
                (&CORRUPTED_WIZARD, 25),
                (&AGENT_OF_IVELAN, 5),
            ],
        ),
        (
            10,
            &[
                (&DRONE, 35),
                (&GUARDIAN, 35),
                (&ENCHANTED_STATUE, 15),
                (&WARDEN, 20),
            ],
        ),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_random::prelude::RandomNumberGenerator;

    #[test]
    fn early_vermin_are_phased_out_by_floor_nine() {
        let mut rng = RandomNumberGenerator::seeded(7);
        for pick in ENEMY_TABLE.sample(&mut rng, 9, 500) {
            assert!(
                !std::ptr::eq(pick, &GOBLIN)
                    && !std::ptr::eq(pick, &ORC)
                    && !std::ptr::eq(pick, &JACKAL)
                    && !std::ptr::eq(pick, &GOBLIN_ARCHER),
                "{} drawn with zero weight",
                pick.name
            );
        }
    }

    #[test]
    fn floor_one_only_draws_tier_one_enemies() {
        let mut rng = RandomNumberGenerator::seeded(11);
        for pick in ENEMY_TABLE.sample(&mut rng, 1, 200) {
            assert!(
                ["Goblin", "Orc", "Jackal", "Goblin Archer"].contains(&pick.name),
                "{} drawn on floor 1",
                pick.name
            );
        }
    }

    #[test]
    fn archetypes_resolve_by_name() {
        assert!(std::ptr::eq(monster_by_name("Troll").unwrap(), &TROLL));
        assert!(monster_by_name("Beholder").is_none());
    }
}
