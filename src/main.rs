use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use ivelan_depths::data::items::Targeting;
use ivelan_depths::ecs::{ActionOutcome, EcsWorld, LevelUpChoice, PlayerAction};
use ivelan_depths::map::GameWorld;
use ivelan_depths::render;
use ivelan_depths::saveload::{self, SAVE_PATH};

#[derive(Copy, Clone, Debug)]
enum RunState {
    AwaitingInput,
    /// Picking a cell for a targeted consumable. `radius` is zero for
    /// single-target effects.
    Targeting {
        slot: usize,
        radius: i32,
        cursor: Point,
    },
    LevelUp,
    GameOver,
    Victory,
}

struct IvelanState {
    ecs: EcsWorld,
    world_cfg: GameWorld,
    run_state: RunState,
}

impl IvelanState {
    fn new() -> Self {
        let seed = chrono::Local::now().timestamp_millis() as u64;
        let mut ecs = EcsWorld::new(seed);
        let mut world_cfg = GameWorld::default();
        ecs.new_game(&mut world_cfg);
        Self {
            ecs,
            world_cfg,
            run_state: RunState::AwaitingInput,
        }
    }
}

impl GameState for IvelanState {
    fn tick(&mut self, ctx: &mut BTerm) {
        self.handle_input(ctx);

        ctx.cls();
        {
            let map = self.ecs.map();
            render::draw_map(ctx, &map);
        }
        render::draw_entities(ctx, &self.ecs);
        render::draw_hud(ctx, &self.ecs, self.world_cfg.current_floor);

        match self.run_state {
            RunState::Targeting { radius, cursor, .. } => {
                let map = self.ecs.map();
                render::draw_targeting(ctx, &map, cursor, radius);
            }
            RunState::LevelUp => render::draw_level_up_menu(ctx, &self.ecs),
            RunState::GameOver => render::draw_game_over(ctx),
            RunState::Victory => render::draw_victory(ctx),
            RunState::AwaitingInput => {}
        }
    }
}

fn key_to_delta(key: VirtualKeyCode) -> Option<Point> {
    match key {
        VirtualKeyCode::Left | VirtualKeyCode::H => Some(Point::new(-1, 0)),
        VirtualKeyCode::Right | VirtualKeyCode::L => Some(Point::new(1, 0)),
        VirtualKeyCode::Up | VirtualKeyCode::K => Some(Point::new(0, -1)),
        VirtualKeyCode::Down | VirtualKeyCode::J => Some(Point::new(0, 1)),
        VirtualKeyCode::Y => Some(Point::new(-1, -1)),
        VirtualKeyCode::U => Some(Point::new(1, -1)),
        VirtualKeyCode::B => Some(Point::new(-1, 1)),
        VirtualKeyCode::N => Some(Point::new(1, 1)),
        _ => None,
    }
}

fn key_to_slot(key: VirtualKeyCode) -> Option<usize> {
    match key {
        VirtualKeyCode::Key1 => Some(0),
        VirtualKeyCode::Key2 => Some(1),
        VirtualKeyCode::Key3 => Some(2),
        VirtualKeyCode::Key4 => Some(3),
        VirtualKeyCode::Key5 => Some(4),
        VirtualKeyCode::Key6 => Some(5),
        VirtualKeyCode::Key7 => Some(6),
        VirtualKeyCode::Key8 => Some(7),
        VirtualKeyCode::Key9 => Some(8),
        _ => None,
    }
}

impl IvelanState {
    fn handle_input(&mut self, ctx: &mut BTerm) {
        let Some(key) = ctx.key else {
            return;
        };
        match self.run_state {
            RunState::AwaitingInput => self.awaiting_input(ctx, key),
            RunState::Targeting {
                slot,
                radius,
                cursor,
            } => self.targeting_input(key, slot, radius, cursor),
            RunState::LevelUp => self.level_up_input(key),
            RunState::GameOver | RunState::Victory => match key {
                VirtualKeyCode::N => *self = IvelanState::new(),
                VirtualKeyCode::Escape => ctx.quitting = true,
                _ => {}
            },
        }
    }

    fn awaiting_input(&mut self, ctx: &mut BTerm, key: VirtualKeyCode) {
        if let Some(delta) = key_to_delta(key) {
            self.run_player_action(PlayerAction::Move { delta });
            return;
        }
        if let Some(slot) = key_to_slot(key) {
            if ctx.shift {
                self.run_player_action(PlayerAction::DropItem { slot });
            } else {
                self.begin_use(slot);
            }
            return;
        }
        match key {
            VirtualKeyCode::Period => {
                if ctx.shift {
                    self.run_player_action(PlayerAction::Descend);
                } else {
                    self.run_player_action(PlayerAction::Wait);
                }
            }
            VirtualKeyCode::G => self.run_player_action(PlayerAction::Pickup),
            VirtualKeyCode::F5 => self.save(),
            VirtualKeyCode::F9 => self.load(),
            VirtualKeyCode::Escape => ctx.quitting = true,
            _ => {}
        }
    }

    /// Immediate-use items fire straight away; targeted ones open the
    /// cursor overlay first.
    fn begin_use(&mut self, slot: usize) {
        match self.ecs.item_targeting(slot) {
            Some(Targeting::None) => {
                self.run_player_action(PlayerAction::UseItem { slot, target: None });
            }
            Some(Targeting::Single) => {
                self.run_state = RunState::Targeting {
                    slot,
                    radius: 0,
                    cursor: self.ecs.player_point(),
                };
            }
            Some(Targeting::Area { radius }) => {
                self.run_state = RunState::Targeting {
                    slot,
                    radius,
                    cursor: self.ecs.player_point(),
                };
            }
            None => self.ecs.log(
                "There is no item in that slot.",
                ivelan_depths::ecs::resources::log_color::IMPOSSIBLE,
            ),
        }
    }

    fn targeting_input(&mut self, key: VirtualKeyCode, slot: usize, radius: i32, cursor: Point) {
        if let Some(delta) = key_to_delta(key) {
            let next = cursor + delta;
            let map = self.ecs.map();
            if map.in_bounds(next) {
                drop(map);
                self.run_state = RunState::Targeting {
                    slot,
                    radius,
                    cursor: next,
                };
            }
            return;
        }
        match key {
            VirtualKeyCode::Return => {
                self.run_state = RunState::AwaitingInput;
                self.run_player_action(PlayerAction::UseItem {
                    slot,
                    target: Some(cursor),
                });
            }
            VirtualKeyCode::Escape => self.run_state = RunState::AwaitingInput,
            _ => {}
        }
    }

    fn level_up_input(&mut self, key: VirtualKeyCode) {
        let choice = match key {
            VirtualKeyCode::A => LevelUpChoice::Vitality,
            VirtualKeyCode::B => LevelUpChoice::Strength,
            VirtualKeyCode::C => LevelUpChoice::Defense,
            _ => return,
        };
        self.ecs.apply_level_up(choice);
        self.run_state = if self.ecs.player_requires_level_up() {
            RunState::LevelUp
        } else {
            RunState::AwaitingInput
        };
    }

    /// A failed action costs nothing; a successful one hands the turn to
    /// everyone else.
    fn run_player_action(&mut self, action: PlayerAction) {
        match self.ecs.player_act(action) {
            Ok(ActionOutcome::Acted) => self.end_turn(),
            Ok(ActionOutcome::Descended) => {
                self.ecs.descend(&mut self.world_cfg);
            }
            Ok(ActionOutcome::Victory) => self.run_state = RunState::Victory,
            Err(impossible) => self.ecs.report_impossible(&impossible),
        }
    }

    fn end_turn(&mut self) {
        self.ecs.end_turn();
        if self.ecs.is_player_dead() {
            self.run_state = RunState::GameOver;
        } else if self.ecs.player_requires_level_up() {
            self.run_state = RunState::LevelUp;
        }
    }

    fn save(&mut self) {
        match saveload::save_game(&self.ecs, &self.world_cfg, SAVE_PATH) {
            Ok(()) => self.ecs.log(
                "Game saved.",
                ivelan_depths::ecs::resources::log_color::NEUTRAL,
            ),
            Err(err) => self.ecs.log(
                format!("Save failed: {err}"),
                ivelan_depths::ecs::resources::log_color::IMPOSSIBLE,
            ),
        }
    }

    fn load(&mut self) {
        match saveload::load_game(SAVE_PATH) {
            Ok((ecs, world_cfg)) => {
                self.ecs = ecs;
                self.world_cfg = world_cfg;
                self.run_state = RunState::AwaitingInput;
                self.ecs.log(
                    "Game loaded.",
                    ivelan_depths::ecs::resources::log_color::NEUTRAL,
                );
            }
            Err(err) => self.ecs.log(
                format!("Load failed: {err}"),
                ivelan_depths::ecs::resources::log_color::IMPOSSIBLE,
            ),
        }
    }
}

fn main() -> BError {
    let context = BTermBuilder::simple80x50()
        .with_title("Ivelan Depths")
        .build()?;
    main_loop(context, IvelanState::new())
}
