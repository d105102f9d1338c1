//! Cave Runner - A 2D endless runner with themed levels
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, scoring, state machines)
//! - `renderer`: Draw-command generation and the Canvas2D backend
//! - `platform`: Key-value storage abstraction (LocalStorage on web)
//! - `services`: Optional leaderboard, telemetry and analytics backends
//! - `tuning`: Data-driven game balance

pub mod app;
pub mod error;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod services;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use app::App;
pub use error::{ServiceError, StorageError};
pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Logical play field size (pixels)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 450.0;
    /// Base running surface (player bottom rests here)
    pub const GROUND_Y: f32 = 330.0;

    /// Player defaults
    pub const PLAYER_X: f32 = 100.0;
    pub const PLAYER_SIZE: f32 = 40.0;
    /// Hitbox inset on every side for obstacle collisions
    pub const PLAYER_HITBOX_INSET: f32 = 4.0;

    /// Gravity (pixels/s², positive is down)
    pub const GRAVITY: f32 = 2880.0;
    /// One ground jump plus two air jumps
    pub const MAX_JUMPS: u8 = 3;
    /// Initial upward speed per jump level 1..=4 (pixels/s)
    pub const JUMP_POWER: [f32; 4] = [780.0, 900.0, 1020.0, 1140.0];
    /// Jump power boost per game level above 1, capped
    pub const JUMP_LEVEL_BOOST: f32 = 0.01;
    pub const JUMP_LEVEL_BOOST_CAP: f32 = 0.10;
    /// Air jumps use a fraction of the ground jump power
    pub const AIR_JUMP_FACTOR: f32 = 0.75;
    /// |vy| below this counts as a jump at the apex
    pub const PEAK_THRESHOLD: f32 = 120.0;
    /// Extra air-jump power when peak-timed
    pub const PEAK_BOOST: f32 = 1.2;
    /// Somersault angular speed on ground jump, plus per extra jump (rad/s)
    pub const BASE_SPIN: f32 = std::f32::consts::TAU * 1.5;
    pub const SPIN_PER_AIR_JUMP: f32 = std::f32::consts::TAU;
    /// Somersault animation frames per turn
    pub const SPIN_FRAMES: u8 = 5;

    /// Difficulty curve
    pub const BASE_SPEED: f32 = 300.0;
    pub const MAX_SPEED_MULTIPLIER: f32 = 2.0;
    pub const MAX_DIFFICULTY_TIME: f32 = 180.0;
    pub const SPEED_RAMP: f32 = 0.6;
    pub const LEVEL_SPEED_BONUS: f32 = 0.01;
    pub const BASE_SPAWN_INTERVAL_MS: f32 = 1600.0;
    pub const MIN_SPAWN_INTERVAL_MS: f32 = 650.0;
    pub const MULTI_LEVEL_RATE: f32 = 0.8;
    pub const MULTI_LEVEL_CAP: f32 = 0.6;
    pub const LEVEL_COMPLEXITY_BONUS: f32 = 0.02;
    pub const FLOATING_RATE: f32 = 0.25;
    pub const TERRAIN_START_PROGRESS: f32 = 0.15;
    pub const TERRAIN_RATE: f32 = 0.3;
    pub const TERRAIN_CAP: f32 = 0.2;

    /// Obstacle geometry
    pub const OBSTACLE_HEIGHT_UNIT: f32 = 35.0;
    pub const OBSTACLE_BASE_WIDTH: f32 = 30.0;
    pub const OBSTACLE_WIDTH_PER_LEVEL: f32 = 8.0;
    pub const MAX_OBSTACLE_LEVEL: u8 = 4;
    pub const PLATFORM_THICKNESS: f32 = 16.0;
    pub const PLATFORM_MIN_WIDTH: f32 = 80.0;
    pub const PLATFORM_MAX_WIDTH: f32 = 160.0;
    /// Gap between platform underside and the ground, above player height
    pub const PLATFORM_MIN_GAP: f32 = 20.0;
    pub const PLATFORM_MAX_GAP: f32 = 90.0;
    pub const TERRAIN_MIN_WIDTH: f32 = 200.0;
    pub const TERRAIN_MAX_WIDTH: f32 = 400.0;
    pub const MIN_ELEVATION: f32 = 50.0;
    pub const MAX_ELEVATION: f32 = 90.0;

    /// Collectables
    pub const HEART_SIZE: f32 = 24.0;
    pub const HEART_CHANCE: f64 = 0.08;
    pub const HEART_MIN_LIFT: f32 = 60.0;
    pub const HEART_MAX_LIFT: f32 = 140.0;
    pub const HEART_BOB_AMPLITUDE: f32 = 5.0;
    pub const HEART_BOB_SPEED: f32 = 3.0;

    /// Lives
    pub const START_LIVES: u8 = 3;
    pub const MAX_LIVES: u8 = 5;
    /// Obstacles within this window around the player are cleared on a hit
    pub const HIT_CLEAR_BEHIND: f32 = 100.0;
    pub const HIT_CLEAR_AHEAD: f32 = 300.0;

    /// Scoring
    pub const TIME_POINTS_PER_SECOND: f64 = 10.0;
    pub const OBSTACLE_BASE_POINTS: u64 = 50;
    pub const CLOSE_CALL_PX: f32 = 15.0;
    pub const CLOSE_CALL_BONUS: u64 = 25;
    pub const COMBO_BONUS: u64 = 10;
    pub const HEART_BONUS_POINTS: u64 = 100;
    pub const MILESTONE_INTERVAL: u64 = 1000;
    pub const MILESTONE_BONUS: u64 = 50;

    /// Levels
    pub const POINTS_PER_LEVEL: u64 = 1500;

    /// Countdown length (seconds) for start and life-loss resume
    pub const COUNTDOWN_SECS: f32 = 3.0;

    /// Largest dt accepted per tick (seconds)
    pub const MAX_DT: f32 = 0.1;
}

/// Axis-aligned rectangle in play-field pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    #[inline]
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Shrink by `amount` on every side
    #[inline]
    pub fn inset(&self, amount: f32) -> Self {
        Self {
            min: self.min + Vec2::splat(amount),
            max: self.max - Vec2::splat(amount),
        }
    }

    /// Strict overlap (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Horizontal span overlap only
    #[inline]
    pub fn overlaps_x(&self, min_x: f32, max_x: f32) -> bool {
        self.min.x < max_x && self.max.x > min_x
    }
}
