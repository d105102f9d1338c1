//! Level progression and theme selection
//!
//! Completion uses the cumulative framing: level L is done once the run's
//! total score reaches `sum(i * POINTS_PER_LEVEL for i in 1..=L)`.

use serde::{Deserialize, Serialize};

use crate::consts::POINTS_PER_LEVEL;

/// Visual theme of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Meadow,
    Desert,
    Forest,
    Tundra,
    Volcano,
    Night,
}

/// Cyclic theme order, level 1 first
pub const THEME_ORDER: [Theme; 6] = [
    Theme::Meadow,
    Theme::Desert,
    Theme::Forest,
    Theme::Tundra,
    Theme::Volcano,
    Theme::Night,
];

impl Theme {
    pub fn for_level(level: u32) -> Self {
        THEME_ORDER[(level.max(1) as usize - 1) % THEME_ORDER.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Meadow => "meadow",
            Theme::Desert => "desert",
            Theme::Forest => "forest",
            Theme::Tundra => "tundra",
            Theme::Volcano => "volcano",
            Theme::Night => "night",
        }
    }
}

/// Points needed within level `level`
#[inline]
pub fn points_required(level: u32) -> u64 {
    level as u64 * POINTS_PER_LEVEL
}

/// Total score needed to finish `level`
#[inline]
pub fn cumulative_required(level: u32) -> u64 {
    let l = level as u64;
    POINTS_PER_LEVEL * l * (l + 1) / 2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelManager {
    pub current_level: u32,
    /// Total score when the current level began
    pub level_start_score: u64,
    /// Play time (seconds) when the current level began
    pub level_start_time: f64,
    pub highest_level_reached: u32,
}

impl LevelManager {
    pub fn new(highest_level_reached: u32) -> Self {
        Self {
            current_level: 1,
            level_start_score: 0,
            level_start_time: 0.0,
            highest_level_reached: highest_level_reached.max(1),
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::for_level(self.current_level)
    }

    pub fn cumulative_required(&self) -> u64 {
        cumulative_required(self.current_level)
    }

    pub fn is_level_complete(&self, score: u64) -> bool {
        score >= self.cumulative_required()
    }

    /// Fraction (0-1) of the current level's band already scored
    pub fn progress(&self, score: u64) -> f32 {
        let floor = cumulative_required(self.current_level - 1);
        let band = points_required(self.current_level);
        (score.saturating_sub(floor) as f64 / band as f64).clamp(0.0, 1.0) as f32
    }

    /// Move to the next level. Returns true when this is a new personal best.
    pub fn advance_level(&mut self, score: u64, play_time: f64) -> bool {
        self.current_level += 1;
        self.level_start_score = score;
        self.level_start_time = play_time;
        if self.current_level > self.highest_level_reached {
            self.highest_level_reached = self.current_level;
            log::info!("New highest level: {}", self.current_level);
            true
        } else {
            false
        }
    }

    /// Seconds spent in the current level so far
    pub fn level_time(&self, play_time: f64) -> f64 {
        (play_time - self.level_start_time).max(0.0)
    }
}
