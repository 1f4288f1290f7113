use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use crate::ecs::EcsWorld;
use crate::map::{GameMap, tiles::SHROUD};

pub const SCREEN_WIDTH: i32 = 80;
pub const SCREEN_HEIGHT: i32 = 50;
/// First row below the map, where the HUD begins.
pub const HUD_TOP: i32 = 43;
const HP_BAR_WIDTH: i32 = 20;
const LOG_X: i32 = 24;
const LOG_LINES: usize = 6;
const QUICKBAR_SLOTS: usize = 9;

fn rgb(color: (u8, u8, u8)) -> RGB {
    RGB::from_u8(color.0, color.1, color.2)
}

/// Three-state map draw: in-FOV tiles use their lit appearance, explored
/// ones the dark appearance, everything else the shroud.
pub fn draw_map(ctx: &mut BTerm, map: &GameMap) {
    for y in 0..map.height {
        for x in 0..map.width {
            let point = Point::new(x, y);
            let Some(tile) = map.tile_at(point) else {
                continue;
            };
            let idx = map.idx(point);
            let appearance = if map.visible[idx] {
                tile.light
            } else if map.explored[idx] {
                tile.dark
            } else {
                SHROUD
            };
            ctx.set(
                x,
                y,
                rgb(appearance.fg),
                rgb(appearance.bg),
                appearance.glyph,
            );
        }
    }
}

/// Entities are only drawn inside the player's FOV, items under actors.
pub fn draw_entities(ctx: &mut BTerm, ecs: &EcsWorld) {
    let map = ecs.map();
    ecs.each_renderable(|point, renderable| {
        if map.is_visible(point) {
            let bg = map
                .tile_at(point)
                .map_or(SHROUD.bg, |tile| tile.light.bg);
            ctx.set(point.x, point.y, renderable.color, rgb(bg), renderable.glyph);
        }
    });
}

pub fn draw_hud(ctx: &mut BTerm, ecs: &EcsWorld, floor: i32) {
    ctx.draw_box(
        0,
        HUD_TOP,
        SCREEN_WIDTH - 1,
        SCREEN_HEIGHT - HUD_TOP - 1,
        RGB::named(GRAY),
        RGB::named(BLACK),
    );

    if let Some(fighter) = ecs.player_fighter() {
        let filled = if fighter.max_hp > 0 {
            (fighter.hp.max(0) * HP_BAR_WIDTH) / fighter.max_hp
        } else {
            0
        };
        for x in 0..HP_BAR_WIDTH {
            let bg = if x < filled {
                RGB::from_u8(0, 96, 0)
            } else {
                RGB::from_u8(64, 16, 16)
            };
            ctx.set(2 + x, HUD_TOP + 1, RGB::named(WHITE), bg, b' ' as u16);
        }
        ctx.print_color(
            2,
            HUD_TOP + 1,
            RGB::named(WHITE),
            RGB::from_u8(0, 96, 0),
            format!("HP: {}/{}", fighter.hp.max(0), fighter.max_hp),
        );
    }

    let (power, defense) = ecs.player_derived_stats();
    ctx.print_color(
        2,
        HUD_TOP + 2,
        RGB::named(WHITE),
        RGB::named(BLACK),
        format!("Pow {power}  Def {defense}"),
    );
    ctx.print_color(
        2,
        HUD_TOP + 3,
        rgb(crate::ecs::resources::log_color::DESCEND),
        RGB::named(BLACK),
        format!("Dungeon floor: {floor}"),
    );
    if let Some(level) = ecs.player_level() {
        ctx.print_color(
            2,
            HUD_TOP + 4,
            RGB::named(WHITE),
            RGB::named(BLACK),
            format!(
                "Level {}  XP {}/{}",
                level.level,
                level.xp,
                level.xp_to_next_level()
            ),
        );
    }

    draw_quickbar(ctx, ecs);
    draw_log(ctx, ecs);
}

/// First nine inventory slots, matching the 1-9 use keys, in a panel over
/// the top-right of the map. Equipped gear is marked with an asterisk.
fn draw_quickbar(ctx: &mut BTerm, ecs: &EcsWorld) {
    let entries = ecs.player_inventory();
    let x = SCREEN_WIDTH - 26;
    for (idx, entry) in entries.iter().take(QUICKBAR_SLOTS).enumerate() {
        let marker = if entry.equipped { "*" } else { " " };
        ctx.print_color(
            x,
            1 + idx as i32,
            RGB::named(LIGHT_GRAY),
            RGB::named(BLACK),
            format!("{}{}{}", idx + 1, marker, entry.name),
        );
    }
}

fn draw_log(ctx: &mut BTerm, ecs: &EcsWorld) {
    for (row, entry) in ecs.log_tail(LOG_LINES).iter().enumerate() {
        ctx.print_color(
            LOG_X,
            HUD_TOP + 1 + row as i32,
            entry.color,
            RGB::named(BLACK),
            &entry.text,
        );
    }
}

/// Targeting overlay: paints the blast radius and the cursor cell.
pub fn draw_targeting(ctx: &mut BTerm, map: &GameMap, cursor: Point, radius: i32) {
    if radius > 0 {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let point = Point::new(cursor.x + dx, cursor.y + dy);
                if !map.in_bounds(point) || point.y >= HUD_TOP {
                    continue;
                }
                let dist = ((dx * dx + dy * dy) as f32).sqrt();
                if dist <= radius as f32 {
                    ctx.set_bg(point.x, point.y, RGB::from_u8(96, 32, 0));
                }
            }
        }
    }
    if map.in_bounds(cursor) {
        ctx.set_bg(cursor.x, cursor.y, RGB::from_u8(160, 160, 0));
    }
    ctx.print_color(
        1,
        0,
        RGB::named(YELLOW),
        RGB::named(BLACK),
        "Select a target. Enter to confirm, Escape to cancel.",
    );
}

pub fn draw_level_up_menu(ctx: &mut BTerm, ecs: &EcsWorld) {
    let x = 20;
    let y = 15;
    ctx.draw_box(x, y, 38, 8, RGB::named(YELLOW), RGB::named(BLACK));
    ctx.print_color(
        x + 2,
        y + 1,
        RGB::named(YELLOW),
        RGB::named(BLACK),
        "Level up! Choose an attribute:",
    );
    let fighter = ecs.player_fighter();
    let (hp, max_hp) = fighter.map_or((0, 0), |f| (f.hp, f.max_hp));
    let (power, defense) = ecs.player_derived_stats();
    ctx.print(x + 2, y + 3, format!("a) Vitality  (+20 HP, from {hp}/{max_hp})"));
    ctx.print(x + 2, y + 4, format!("b) Strength  (+1 power, from {power})"));
    ctx.print(x + 2, y + 5, format!("c) Defense   (+1 defense, from {defense})"));
}

pub fn draw_game_over(ctx: &mut BTerm) {
    ctx.print_color_centered(
        20,
        RGB::from_u8(255, 48, 48),
        RGB::named(BLACK),
        "You have died. Press N for a new game.",
    );
}

pub fn draw_victory(ctx: &mut BTerm) {
    ctx.print_color_centered(
        20,
        RGB::from_u8(250, 240, 0),
        RGB::named(BLACK),
        "The Monolith is destroyed. Ivelan's depths are quiet at last.",
    );
    ctx.print_color_centered(
        22,
        RGB::named(WHITE),
        RGB::named(BLACK),
        "Press N to play again.",
    );
}
