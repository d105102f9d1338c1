//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Delta-time steps clamped to `MAX_DT`
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod level;
pub mod obstacle;
pub mod player;
pub mod scoring;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod transition;

pub use difficulty::Difficulty;
pub use level::{LevelManager, Theme};
pub use obstacle::{Collectable, Obstacle, ObstacleKind};
pub use player::{ClearType, JumpState, Player};
pub use scoring::{Combo, ScoreState};
pub use spawner::Spawner;
pub use state::{
    Character, Countdown, GameEvent, GamePhase, GameState, PauseReason, RunSummary, SessionClock,
};
pub use tick::{TickInput, start_countdown, tick};
pub use transition::{LevelTransition, TransitionPhase, TransitionStats};
