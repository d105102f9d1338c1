//! Data-driven game balance
//!
//! Defaults come from [`crate::consts`]. A JSON document may override any
//! subset of fields; missing fields keep their defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Player physics and jump state machine knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity: f32,
    pub max_jumps: u8,
    pub jump_power: [f32; 4],
    pub jump_level_boost: f32,
    pub jump_level_boost_cap: f32,
    pub air_jump_factor: f32,
    pub peak_threshold: f32,
    pub peak_boost: f32,
    pub base_spin: f32,
    pub spin_per_air_jump: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            max_jumps: MAX_JUMPS,
            jump_power: JUMP_POWER,
            jump_level_boost: JUMP_LEVEL_BOOST,
            jump_level_boost_cap: JUMP_LEVEL_BOOST_CAP,
            air_jump_factor: AIR_JUMP_FACTOR,
            peak_threshold: PEAK_THRESHOLD,
            peak_boost: PEAK_BOOST,
            base_spin: BASE_SPIN,
            spin_per_air_jump: SPIN_PER_AIR_JUMP,
        }
    }
}

/// Difficulty curve parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    pub base_speed: f32,
    pub max_multiplier: f32,
    pub max_time: f32,
    pub speed_ramp: f32,
    pub level_speed_bonus: f32,
    pub base_spawn_interval_ms: f32,
    pub min_spawn_interval_ms: f32,
    pub multi_level_rate: f32,
    pub multi_level_cap: f32,
    pub level_complexity_bonus: f32,
    pub floating_rate: f32,
    pub terrain_start_progress: f32,
    pub terrain_rate: f32,
    pub terrain_cap: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            base_speed: BASE_SPEED,
            max_multiplier: MAX_SPEED_MULTIPLIER,
            max_time: MAX_DIFFICULTY_TIME,
            speed_ramp: SPEED_RAMP,
            level_speed_bonus: LEVEL_SPEED_BONUS,
            base_spawn_interval_ms: BASE_SPAWN_INTERVAL_MS,
            min_spawn_interval_ms: MIN_SPAWN_INTERVAL_MS,
            multi_level_rate: MULTI_LEVEL_RATE,
            multi_level_cap: MULTI_LEVEL_CAP,
            level_complexity_bonus: LEVEL_COMPLEXITY_BONUS,
            floating_rate: FLOATING_RATE,
            terrain_start_progress: TERRAIN_START_PROGRESS,
            terrain_rate: TERRAIN_RATE,
            terrain_cap: TERRAIN_CAP,
        }
    }
}

/// Clear-scoring weights
///
/// Multipliers must satisfy `aerial >= platform >= ground` and
/// `peak_multiplier >= 1`; [`Tuning::sanitized`] enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    pub time_points_per_second: f64,
    pub obstacle_base_points: u64,
    pub ground_multiplier: f32,
    pub platform_multiplier: f32,
    pub aerial_multiplier: f32,
    pub peak_multiplier: f32,
    /// Added to the multiplier for every jump beyond the first
    pub extra_jump_bonus: f32,
    pub close_call_px: f32,
    pub close_call_bonus: u64,
    pub combo_bonus: u64,
    pub heart_bonus_points: u64,
    pub milestone_interval: u64,
    pub milestone_bonus: u64,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            time_points_per_second: TIME_POINTS_PER_SECOND,
            obstacle_base_points: OBSTACLE_BASE_POINTS,
            ground_multiplier: 1.0,
            platform_multiplier: 1.25,
            aerial_multiplier: 1.5,
            peak_multiplier: 1.5,
            extra_jump_bonus: 0.1,
            close_call_px: CLOSE_CALL_PX,
            close_call_bonus: CLOSE_CALL_BONUS,
            combo_bonus: COMBO_BONUS,
            heart_bonus_points: HEART_BONUS_POINTS,
            milestone_interval: MILESTONE_INTERVAL,
            milestone_bonus: MILESTONE_BONUS,
        }
    }
}

/// Complete balance table handed to the simulation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub difficulty: DifficultyTuning,
    pub scoring: ScoringTuning,
}

impl Tuning {
    /// Parse overrides from JSON and sanitize the result
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Clamp values that would break simulation invariants
    pub fn sanitized(mut self) -> Self {
        let p = &mut self.physics;
        p.max_jumps = p.max_jumps.max(1);
        p.gravity = p.gravity.max(1.0);
        for power in &mut p.jump_power {
            *power = power.max(1.0);
        }
        p.peak_boost = p.peak_boost.max(1.0);
        p.peak_threshold = p.peak_threshold.max(0.0);

        let d = &mut self.difficulty;
        d.base_speed = d.base_speed.max(1.0);
        d.max_multiplier = d.max_multiplier.max(1.0);
        d.max_time = d.max_time.max(1.0);
        d.min_spawn_interval_ms = d.min_spawn_interval_ms.max(50.0);
        d.base_spawn_interval_ms = d.base_spawn_interval_ms.max(d.min_spawn_interval_ms);

        let s = &mut self.scoring;
        s.ground_multiplier = s.ground_multiplier.max(0.0);
        s.platform_multiplier = s.platform_multiplier.max(s.ground_multiplier);
        s.aerial_multiplier = s.aerial_multiplier.max(s.platform_multiplier);
        s.peak_multiplier = s.peak_multiplier.max(1.0);
        s.extra_jump_bonus = s.extra_jump_bonus.max(0.0);
        s.milestone_interval = s.milestone_interval.max(1);

        self
    }
}
