use serde::{Deserialize, Serialize};

/// How a tile is drawn: glyph plus foreground/background color.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Appearance {
    pub glyph: u16,
    pub fg: (u8, u8, u8),
    pub bg: (u8, u8, u8),
}

const fn appearance(glyph: char, fg: (u8, u8, u8), bg: (u8, u8, u8)) -> Appearance {
    Appearance {
        glyph: glyph as u16,
        fg,
        bg,
    }
}

/// Stateless terrain descriptor shared by every grid cell of the same kind.
/// `dark` is drawn for explored-but-unseen tiles, `light` for tiles in FOV.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub walkable: bool,
    pub transparent: bool,
    pub dark: Appearance,
    pub light: Appearance,
}

/// Unexplored, unseen cells.
pub const SHROUD: Appearance = appearance(' ', (255, 255, 255), (0, 0, 0));

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
    DownStairs,
    Goal,
}

/// Wall palette switches on deep floors. Cosmetic only.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Palette {
    Early,
    Late,
}

const WALL: Tile = Tile {
    walkable: false,
    transparent: false,
    dark: appearance('#', (60, 30, 10), (40, 17, 10)),
    light: appearance('#', (120, 70, 0), (90, 50, 0)),
};

const FLOOR: Tile = Tile {
    walkable: true,
    transparent: true,
    dark: appearance('.', (70, 70, 70), (15, 5, 0)),
    light: appearance('.', (230, 100, 25), (50, 20, 0)),
};

const DOWN_STAIRS: Tile = Tile {
    walkable: true,
    transparent: true,
    dark: appearance('>', (70, 70, 70), (50, 20, 0)),
    light: appearance('>', (250, 170, 0), (150, 100, 0)),
};

const LATE_WALL: Tile = Tile {
    walkable: false,
    transparent: false,
    dark: appearance('0', (15, 15, 15), (30, 30, 30)),
    light: appearance('0', (30, 30, 30), (100, 100, 100)),
};

const LATE_FLOOR: Tile = Tile {
    walkable: true,
    transparent: true,
    dark: appearance('"', (60, 0, 0), (15, 15, 15)),
    light: appearance('"', (100, 0, 0), (45, 45, 45)),
};

const LATE_STAIRS: Tile = Tile {
    walkable: true,
    transparent: true,
    dark: appearance('>', (60, 0, 0), (15, 15, 15)),
    light: appearance('>', (130, 0, 0), (100, 100, 100)),
};

const GOAL: Tile = Tile {
    walkable: true,
    transparent: true,
    dark: appearance('^', (140, 140, 0), (60, 60, 60)),
    light: appearance('^', (250, 240, 0), (150, 150, 150)),
};

pub fn tile(kind: TileKind, palette: Palette) -> &'static Tile {
    match (kind, palette) {
        (TileKind::Wall, Palette::Early) => &WALL,
        (TileKind::Wall, Palette::Late) => &LATE_WALL,
        (TileKind::Floor, Palette::Early) => &FLOOR,
        (TileKind::Floor, Palette::Late) => &LATE_FLOOR,
        (TileKind::DownStairs, Palette::Early) => &DOWN_STAIRS,
        (TileKind::DownStairs, Palette::Late) => &LATE_STAIRS,
        (TileKind::Goal, _) => &GOAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_block_and_floors_do_not() {
        for palette in [Palette::Early, Palette::Late] {
            assert!(!tile(TileKind::Wall, palette).walkable);
            assert!(!tile(TileKind::Wall, palette).transparent);
            assert!(tile(TileKind::Floor, palette).walkable);
            assert!(tile(TileKind::DownStairs, palette).walkable);
            assert!(tile(TileKind::Goal, palette).walkable);
        }
    }
}
