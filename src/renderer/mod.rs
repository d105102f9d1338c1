//! Scene rendering as backend-neutral draw commands
//!
//! [`scene`] is a pure function of the game state. The browser build runs
//! the commands on a Canvas2D context (see `canvas`); tests inspect them.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod sprites;

use glam::Vec2;

use crate::consts::*;
use crate::highscores::HighScores;
use crate::services::LeaderboardEntry;
use crate::sim::transition::TransitionPhase;
use crate::sim::{Character, GamePhase, GameState, ObstacleKind, PauseReason, Theme};
use sprites::Pose;

/// RGBA color, components 0-1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const GOLD: Color = Color::rgb(1.0, 0.82, 0.25);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba()` string
    pub fn to_css(&self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "rgba({},{},{},{:.3})",
            c(self.r),
            c(self.g),
            c(self.b),
            self.a.clamp(0.0, 1.0)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        pos: Vec2,
        size: Vec2,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Color,
    },
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        color: Color,
        align: Align,
    },
    /// Children drawn translated to `origin` and rotated by `rotation`
    Group {
        origin: Vec2,
        rotation: f32,
        commands: Vec<DrawCommand>,
    },
}

impl DrawCommand {
    pub fn rect(pos: Vec2, size: Vec2, color: Color) -> Self {
        DrawCommand::Rect { pos, size, color }
    }

    pub fn text(pos: Vec2, text: impl Into<String>, size: f32, color: Color, align: Align) -> Self {
        DrawCommand::Text {
            pos,
            text: text.into(),
            size,
            color,
            align,
        }
    }
}

/// Per-theme colors
pub struct ThemePalette {
    pub sky: Color,
    pub ground: Color,
    pub ground_edge: Color,
    pub obstacle: Color,
    pub platform: Color,
}

pub fn theme_palette(theme: Theme) -> ThemePalette {
    match theme {
        Theme::Meadow => ThemePalette {
            sky: Color::rgb(0.55, 0.8, 0.95),
            ground: Color::rgb(0.35, 0.65, 0.25),
            ground_edge: Color::rgb(0.25, 0.5, 0.18),
            obstacle: Color::rgb(0.45, 0.3, 0.2),
            platform: Color::rgb(0.6, 0.45, 0.3),
        },
        Theme::Desert => ThemePalette {
            sky: Color::rgb(0.98, 0.85, 0.6),
            ground: Color::rgb(0.9, 0.75, 0.45),
            ground_edge: Color::rgb(0.78, 0.6, 0.35),
            obstacle: Color::rgb(0.3, 0.55, 0.3),
            platform: Color::rgb(0.7, 0.5, 0.3),
        },
        Theme::Forest => ThemePalette {
            sky: Color::rgb(0.45, 0.65, 0.55),
            ground: Color::rgb(0.2, 0.4, 0.2),
            ground_edge: Color::rgb(0.15, 0.3, 0.15),
            obstacle: Color::rgb(0.35, 0.25, 0.15),
            platform: Color::rgb(0.45, 0.35, 0.2),
        },
        Theme::Tundra => ThemePalette {
            sky: Color::rgb(0.8, 0.88, 0.95),
            ground: Color::rgb(0.93, 0.95, 0.98),
            ground_edge: Color::rgb(0.75, 0.82, 0.9),
            obstacle: Color::rgb(0.5, 0.7, 0.85),
            platform: Color::rgb(0.6, 0.75, 0.85),
        },
        Theme::Volcano => ThemePalette {
            sky: Color::rgb(0.35, 0.15, 0.12),
            ground: Color::rgb(0.25, 0.2, 0.2),
            ground_edge: Color::rgb(0.9, 0.35, 0.1),
            obstacle: Color::rgb(0.15, 0.12, 0.12),
            platform: Color::rgb(0.45, 0.25, 0.2),
        },
        Theme::Night => ThemePalette {
            sky: Color::rgb(0.06, 0.07, 0.18),
            ground: Color::rgb(0.15, 0.18, 0.3),
            ground_edge: Color::rgb(0.3, 0.35, 0.55),
            obstacle: Color::rgb(0.4, 0.4, 0.55),
            platform: Color::rgb(0.35, 0.38, 0.6),
        },
    }
}

fn overlay(alpha: f32) -> DrawCommand {
    DrawCommand::rect(
        Vec2::ZERO,
        Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
        Color::BLACK.with_alpha(alpha),
    )
}

fn center_text(y: f32, text: impl Into<String>, size: f32, color: Color) -> DrawCommand {
    DrawCommand::text(Vec2::new(FIELD_WIDTH / 2.0, y), text, size, color, Align::Center)
}

/// Build the draw list for the current frame
pub fn scene(state: &GameState) -> Vec<DrawCommand> {
    let mut out = Vec::with_capacity(64);
    match state.phase {
        GamePhase::StartScreen => start_screen(state, &mut out),
        GamePhase::Countdown => {
            world(state, &mut out);
            hud(state, &mut out);
            if let Some(c) = &state.countdown {
                out.push(center_text(
                    FIELD_HEIGHT / 2.0,
                    c.display().to_string(),
                    72.0,
                    Color::WHITE,
                ));
            }
        }
        GamePhase::Playing => {
            world(state, &mut out);
            hud(state, &mut out);
        }
        GamePhase::Paused => {
            world(state, &mut out);
            hud(state, &mut out);
            out.push(overlay(0.5));
            match state.pause_reason {
                Some(PauseReason::LifeLost) => {
                    out.push(center_text(150.0, "Ouch!", 40.0, Color::WHITE));
                    out.push(center_text(
                        200.0,
                        format!("{} lives left", state.lives),
                        22.0,
                        Color::WHITE,
                    ));
                    if let Some(c) = &state.countdown {
                        out.push(center_text(270.0, c.display().to_string(), 56.0, Color::GOLD));
                    }
                }
                _ => pause_breakdown(state, &mut out),
            }
        }
        GamePhase::LevelTransition => cave_transition(state, &mut out),
        GamePhase::GameOver => {
            world(state, &mut out);
            out.push(overlay(0.65));
            out.push(center_text(130.0, "Game Over", 48.0, Color::WHITE));
            out.push(center_text(
                185.0,
                format!("{} scored {}", state.player_name, state.total_score()),
                24.0,
                Color::GOLD,
            ));
            out.push(center_text(
                220.0,
                format!(
                    "Level {} - {} obstacles cleared",
                    state.level.current_level, state.score.obstacles_cleared
                ),
                18.0,
                Color::WHITE,
            ));
            out.push(center_text(400.0, "Press Enter", 18.0, Color::WHITE));
        }
    }
    out
}

fn start_screen(state: &GameState, out: &mut Vec<DrawCommand>) {
    let palette = theme_palette(Theme::Meadow);
    out.push(DrawCommand::rect(Vec2::ZERO, Vec2::new(FIELD_WIDTH, FIELD_HEIGHT), palette.sky));
    out.push(center_text(80.0, "Cave Runner", 48.0, Color::WHITE));

    let spacing = 120.0;
    let first_x = FIELD_WIDTH / 2.0 - spacing * (Character::ALL.len() as f32 - 1.0) / 2.0;
    for (i, c) in Character::ALL.iter().enumerate() {
        let x = first_x + spacing * i as f32;
        if *c == state.character {
            out.push(DrawCommand::rect(
                Vec2::new(x - 36.0, 164.0),
                Vec2::new(72.0, 92.0),
                Color::GOLD.with_alpha(0.5),
            ));
        }
        out.push(DrawCommand::Group {
            origin: Vec2::new(x, 200.0),
            rotation: 0.0,
            commands: sprites::character(*c, Pose::Run { stride: 0 }),
        });
        out.push(DrawCommand::text(
            Vec2::new(x, 245.0),
            c.as_str(),
            14.0,
            Color::WHITE,
            Align::Center,
        ));
    }

    let name = if state.player_name.is_empty() {
        "Type your name".to_string()
    } else {
        state.player_name.clone()
    };
    out.push(center_text(310.0, name, 24.0, Color::WHITE));
    out.push(center_text(360.0, "Press Enter to start", 18.0, Color::WHITE));
    if state.level.highest_level_reached > 1 {
        out.push(center_text(
            400.0,
            format!("Best level: {}", state.level.highest_level_reached),
            16.0,
            Color::WHITE,
        ));
    }
}

/// Background, terrain, obstacles, hearts and the player
fn world(state: &GameState, out: &mut Vec<DrawCommand>) {
    let palette = theme_palette(state.theme());
    out.push(DrawCommand::rect(Vec2::ZERO, Vec2::new(FIELD_WIDTH, FIELD_HEIGHT), palette.sky));
    out.push(DrawCommand::rect(
        Vec2::new(0.0, GROUND_Y),
        Vec2::new(FIELD_WIDTH, FIELD_HEIGHT - GROUND_Y),
        palette.ground,
    ));
    out.push(DrawCommand::rect(
        Vec2::new(0.0, GROUND_Y),
        Vec2::new(FIELD_WIDTH, 4.0),
        palette.ground_edge,
    ));

    for o in &state.obstacles {
        match o.kind {
            ObstacleKind::Terrain { goes_up: true } => {
                out.push(DrawCommand::rect(
                    o.pos,
                    Vec2::new(o.size.x, FIELD_HEIGHT - o.pos.y),
                    palette.ground,
                ));
                out.push(DrawCommand::rect(o.pos, Vec2::new(o.size.x, 4.0), palette.ground_edge));
            }
            ObstacleKind::Terrain { goes_up: false } => {
                out.push(DrawCommand::rect(o.pos, o.size, palette.sky));
                out.push(DrawCommand::rect(
                    Vec2::new(o.pos.x, o.pos.y + o.size.y),
                    Vec2::new(o.size.x, 4.0),
                    palette.ground_edge,
                ));
            }
            ObstacleKind::Floating => {
                out.push(DrawCommand::rect(o.pos, o.size, palette.platform));
            }
            ObstacleKind::Ground { level } => {
                out.push(DrawCommand::rect(o.pos, o.size, palette.obstacle));
                // One notch per height unit
                for i in 1..level {
                    out.push(DrawCommand::rect(
                        Vec2::new(o.pos.x, o.pos.y + OBSTACLE_HEIGHT_UNIT * i as f32),
                        Vec2::new(o.size.x, 2.0),
                        palette.ground_edge,
                    ));
                }
            }
        }
    }

    for c in state.collectables.iter().filter(|c| !c.collected) {
        out.push(DrawCommand::Group {
            origin: c.current_pos() + Vec2::splat(c.size / 2.0),
            rotation: 0.0,
            commands: sprites::heart(c.size),
        });
    }

    let player = &state.player;
    let distance = state.clock.play_time() as f32 * state.difficulty.speed;
    let pose = if state.pause_reason == Some(PauseReason::LifeLost) {
        Pose::Hurt
    } else {
        Pose::for_player(player, distance)
    };
    out.push(DrawCommand::Group {
        origin: player.pos + Vec2::splat(player.size / 2.0),
        rotation: player.rotation,
        commands: sprites::character(state.character, pose),
    });
}

fn hud(state: &GameState, out: &mut Vec<DrawCommand>) {
    let total = state.total_score();
    out.push(DrawCommand::text(
        Vec2::new(16.0, 28.0),
        format!("Score {} / {}", total, state.level.cumulative_required()),
        18.0,
        Color::WHITE,
        Align::Left,
    ));
    out.push(DrawCommand::text(
        Vec2::new(FIELD_WIDTH - 16.0, 28.0),
        format!("Level {} ({})", state.level.current_level, state.theme().as_str()),
        18.0,
        Color::WHITE,
        Align::Right,
    ));

    // Level progress bar
    let progress = state.level.progress(total);
    let bar = Vec2::new(16.0, 38.0);
    out.push(DrawCommand::rect(bar, Vec2::new(200.0, 8.0), Color::BLACK.with_alpha(0.4)));
    out.push(DrawCommand::rect(bar, Vec2::new(200.0 * progress, 8.0), Color::GOLD));

    for i in 0..state.lives {
        out.push(DrawCommand::Group {
            origin: Vec2::new(28.0 + i as f32 * 26.0, 66.0),
            rotation: 0.0,
            commands: sprites::heart(18.0),
        });
    }

    if state.score.combo.count > 1 {
        out.push(DrawCommand::text(
            Vec2::new(FIELD_WIDTH / 2.0, 28.0),
            format!("Combo x{}", state.score.combo.count),
            20.0,
            Color::GOLD,
            Align::Center,
        ));
    }
}

fn pause_breakdown(state: &GameState, out: &mut Vec<DrawCommand>) {
    let s = &state.score;
    out.push(center_text(120.0, "Paused", 40.0, Color::WHITE));
    let rows = [
        format!("Time points: {}", s.time_points.floor() as u64),
        format!("Obstacle points: {}", s.obstacle_points),
        format!("Bonus points: {}", s.bonus_points),
        format!("Total: {}", s.total()),
    ];
    for (i, row) in rows.into_iter().enumerate() {
        out.push(center_text(170.0 + i as f32 * 28.0, row, 20.0, Color::WHITE));
    }
    out.push(center_text(320.0, "Press P to resume", 18.0, Color::WHITE));
}

fn cave_transition(state: &GameState, out: &mut Vec<DrawCommand>) {
    let t = &state.transition;
    let palette = theme_palette(Theme::for_level(t.stats.completed_level));
    out.push(DrawCommand::rect(Vec2::ZERO, Vec2::new(FIELD_WIDTH, FIELD_HEIGHT), palette.sky));

    // Mountain with the cave mouth
    let mouth = crate::sim::transition::CAVE_MOUTH_X;
    out.push(DrawCommand::Polygon {
        points: vec![
            Vec2::new(mouth - 260.0, GROUND_Y),
            Vec2::new(mouth, 60.0),
            Vec2::new(FIELD_WIDTH + 200.0, GROUND_Y),
        ],
        color: Color::rgb(0.4, 0.36, 0.33),
    });
    out.push(DrawCommand::rect(
        Vec2::new(mouth - 30.0, GROUND_Y - 80.0),
        Vec2::new(70.0, 80.0),
        Color::rgb(0.08, 0.06, 0.05),
    ));
    out.push(DrawCommand::rect(
        Vec2::new(0.0, GROUND_Y),
        Vec2::new(FIELD_WIDTH, FIELD_HEIGHT - GROUND_Y),
        palette.ground,
    ));

    if let Some(x) = t.runner_x() {
        out.push(DrawCommand::Group {
            origin: Vec2::new(x + PLAYER_SIZE / 2.0, GROUND_Y - PLAYER_SIZE / 2.0),
            rotation: 0.0,
            commands: sprites::character(
                state.character,
                Pose::Run {
                    stride: ((t.clock * 8.0) as u32 % 4) as u8,
                },
            ),
        });
    }

    let dark = t.darkness();
    if dark > 0.0 {
        out.push(overlay(dark));
    }

    if matches!(t.phase, TransitionPhase::CaveInterior | TransitionPhase::Anticipation) {
        for e in &t.embers {
            out.push(DrawCommand::Circle {
                center: e.pos,
                radius: 2.0,
                color: Color::rgb(1.0, 0.6, 0.2).with_alpha(e.life),
            });
        }
        for x in [FIELD_WIDTH * 0.2, FIELD_WIDTH * 0.8] {
            out.push(DrawCommand::Circle {
                center: Vec2::new(x, 150.0),
                radius: 8.0 + 4.0 * t.torch_flicker,
                color: Color::rgb(1.0, 0.7, 0.25).with_alpha(0.6 + 0.4 * t.torch_flicker),
            });
        }
        for (i, (label, value)) in t.stats.rows().iter().enumerate().take(t.revealed) {
            out.push(center_text(
                120.0 + i as f32 * 34.0,
                format!("{}: {}", label, value),
                20.0,
                Color::WHITE,
            ));
        }
    }

    if let Some(n) = t.countdown() {
        out.push(center_text(340.0, n.to_string(), 64.0, Color::GOLD));
    }

    let flash = t.flash();
    if flash > 0.0 {
        out.push(DrawCommand::rect(
            Vec2::ZERO,
            Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
            Color::WHITE.with_alpha(flash),
        ));
    }

    if t.phase == TransitionPhase::LevelIntro {
        let next = t.stats.completed_level + 1;
        out.push(center_text(
            150.0,
            format!("Level {}: {}", next, Theme::for_level(next).as_str()),
            36.0,
            Color::WHITE,
        ));
    }
}

/// High score panel: global entries when available, otherwise the local table
pub fn scores_panel(
    local: &HighScores,
    global: Option<&[LeaderboardEntry]>,
    origin: Vec2,
) -> Vec<DrawCommand> {
    let mut out = Vec::new();
    let (title, rows): (&str, Vec<String>) = match global {
        Some(entries) => (
            "Global",
            entries
                .iter()
                .map(|e| format!("{}  {}  L{}", e.name, e.score, e.level))
                .collect(),
        ),
        None => (
            "High Scores",
            local
                .entries
                .iter()
                .map(|e| format!("{}  {}  {}", e.name, e.score, e.date))
                .collect(),
        ),
    };
    out.push(DrawCommand::text(origin, title, 18.0, Color::GOLD, Align::Center));
    for (i, row) in rows.into_iter().enumerate() {
        out.push(DrawCommand::text(
            origin + Vec2::new(0.0, 24.0 * (i + 1) as f32),
            format!("{}. {}", i + 1, row),
            14.0,
            Color::WHITE,
            Align::Center,
        ));
    }
    out
}
