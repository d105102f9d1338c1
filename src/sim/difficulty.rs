//! Difficulty curve
//!
//! Pure function of elapsed level time and level number.

use serde::{Deserialize, Serialize};

use crate::tuning::DifficultyTuning;

/// Parameters the spawner and scroll use for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Scroll speed (pixels/s)
    pub speed: f32,
    pub speed_multiplier: f32,
    pub spawn_interval_ms: f32,
    pub multi_level_chance: f32,
    pub floating_chance: f32,
    pub terrain_chance: f32,
    /// Time-based progress toward the curve maximum (0-1)
    pub progress: f32,
}

/// Escalation carried into every level above the first
#[inline]
pub fn level_bonus(level: u32, tuning: &DifficultyTuning) -> f32 {
    1.0 + tuning.level_speed_bonus * level.saturating_sub(1) as f32
}

impl Difficulty {
    /// Evaluate the curve at `elapsed` seconds into `level`
    pub fn at(elapsed: f32, level: u32, tuning: &DifficultyTuning) -> Self {
        let progress = (elapsed / tuning.max_time).clamp(0.0, 1.0);
        let eased = progress.powf(1.5);

        let speed_multiplier = ((1.0 + eased * tuning.speed_ramp) * level_bonus(level, tuning))
            .min(tuning.max_multiplier);

        let spawn_interval_ms =
            (tuning.base_spawn_interval_ms / speed_multiplier).max(tuning.min_spawn_interval_ms);

        let complexity = tuning.level_complexity_bonus * level.saturating_sub(1) as f32;
        let multi_level_chance = ((speed_multiplier - 1.0) * tuning.multi_level_rate + complexity)
            .clamp(0.0, tuning.multi_level_cap);

        let floating_chance = progress * tuning.floating_rate;

        let terrain_chance = if progress <= tuning.terrain_start_progress {
            0.0
        } else {
            ((progress - tuning.terrain_start_progress) * tuning.terrain_rate)
                .min(tuning.terrain_cap)
        };

        Self {
            speed: tuning.base_speed * speed_multiplier,
            speed_multiplier,
            spawn_interval_ms,
            multi_level_chance,
            floating_chance,
            terrain_chance,
            progress,
        }
    }

    /// Values at the start of a new game
    pub fn new_game(tuning: &DifficultyTuning) -> Self {
        Self::at(0.0, 1, tuning)
    }

    /// Soft reset at a new level: time progress and terrain go back to zero,
    /// the per-level escalation stays.
    pub fn level_start(level: u32, tuning: &DifficultyTuning) -> Self {
        Self::at(0.0, level, tuning)
    }

    #[inline]
    pub fn spawn_interval_secs(&self) -> f32 {
        self.spawn_interval_ms / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::BASE_SPEED;

    #[test]
    fn test_new_game_is_base_speed() {
        let d = Difficulty::new_game(&DifficultyTuning::default());
        assert_eq!(d.speed, BASE_SPEED);
        assert_eq!(d.terrain_chance, 0.0);
        assert_eq!(d.floating_chance, 0.0);
    }

    #[test]
    fn test_speed_capped() {
        let t = DifficultyTuning::default();
        let d = Difficulty::at(10_000.0, 500, &t);
        assert!(d.speed <= t.base_speed * t.max_multiplier + 0.001);
        assert!(d.spawn_interval_ms >= t.min_spawn_interval_ms);
    }

    #[test]
    fn test_terrain_waits_for_threshold() {
        let t = DifficultyTuning::default();
        let before = Difficulty::at(t.max_time * 0.1, 1, &t);
        let after = Difficulty::at(t.max_time * 0.5, 1, &t);
        assert_eq!(before.terrain_chance, 0.0);
        assert!(after.terrain_chance > 0.0);
        assert!(after.terrain_chance <= t.terrain_cap);
    }

    #[test]
    fn test_level_start_keeps_escalation() {
        let t = DifficultyTuning::default();
        let l1 = Difficulty::level_start(1, &t);
        let l4 = Difficulty::level_start(4, &t);
        assert!(l4.speed > l1.speed);
        assert!(l4.multi_level_chance > l1.multi_level_chance);
        assert_eq!(l4.terrain_chance, 0.0);
        assert_eq!(l4.progress, 0.0);
    }

    #[test]
    fn test_spawns_densify_with_speed() {
        let t = DifficultyTuning::default();
        let early = Difficulty::at(0.0, 1, &t);
        let late = Difficulty::at(t.max_time, 1, &t);
        assert!(late.spawn_interval_ms < early.spawn_interval_ms);
    }
}
