//! Score bookkeeping: time points, clears, combos, bonuses and milestones

use serde::{Deserialize, Serialize};

use super::player::ClearType;
use crate::tuning::ScoringTuning;

/// Consecutive airborne clears
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combo {
    pub count: u32,
    pub active: bool,
    pub max_combo: u32,
}

impl Combo {
    /// Count an airborne clear, returns the new count
    pub fn extend(&mut self) -> u32 {
        self.count += 1;
        self.active = true;
        self.max_combo = self.max_combo.max(self.count);
        self.count
    }

    /// Drop the combo; returns the count that was broken (0 if none)
    pub fn reset(&mut self) -> u32 {
        let broken = if self.active { self.count } else { 0 };
        self.count = 0;
        self.active = false;
        broken
    }
}

/// Per-level counters, reset at every new level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTally {
    pub obstacles_cleared: u32,
    pub close_calls: u32,
    pub hearts: u32,
    pub max_combo: u32,
}

/// Result of scoring one clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearAward {
    pub points: u64,
    pub bonus: u64,
    pub combo: u32,
    pub close_call: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreState {
    pub time_points: f64,
    pub obstacle_points: u64,
    pub bonus_points: u64,
    pub obstacles_cleared: u32,
    pub combo: Combo,
    /// Best combo across the whole run
    pub best_combo: u32,
    pub level: LevelTally,
    /// Next total at which a milestone fires
    pub next_milestone: u64,
}

impl ScoreState {
    pub fn new(tuning: &ScoringTuning) -> Self {
        Self {
            time_points: 0.0,
            obstacle_points: 0,
            bonus_points: 0,
            obstacles_cleared: 0,
            combo: Combo::default(),
            best_combo: 0,
            level: LevelTally::default(),
            next_milestone: tuning.milestone_interval,
        }
    }

    /// Derived total score
    pub fn total(&self) -> u64 {
        self.time_points.floor() as u64 + self.obstacle_points + self.bonus_points
    }

    /// Time points accrue continuously with play time
    pub fn add_time(&mut self, dt: f32, tuning: &ScoringTuning) {
        self.time_points += dt as f64 * tuning.time_points_per_second;
    }

    /// Credit a clear; airborne clears extend the combo
    #[allow(clippy::too_many_arguments)]
    pub fn record_clear(
        &mut self,
        level: u8,
        clear: ClearType,
        jumps_used: u8,
        at_peak: bool,
        airborne: bool,
        close_call: bool,
        tuning: &ScoringTuning,
    ) -> ClearAward {
        let points = clear_points(level, clear, jumps_used, at_peak, tuning);
        self.obstacle_points += points;
        self.obstacles_cleared += 1;
        self.level.obstacles_cleared += 1;

        let mut bonus = 0;
        if close_call {
            bonus += tuning.close_call_bonus;
            self.level.close_calls += 1;
        }

        let combo = if airborne {
            let count = self.combo.extend();
            self.best_combo = self.best_combo.max(count);
            self.level.max_combo = self.level.max_combo.max(count);
            if count >= 2 {
                bonus += tuning.combo_bonus * count as u64;
            }
            count
        } else {
            0
        };
        self.bonus_points += bonus;

        ClearAward {
            points,
            bonus,
            combo,
            close_call,
        }
    }

    /// Heart picked up while lives are full
    pub fn add_heart_bonus(&mut self, tuning: &ScoringTuning) {
        self.bonus_points += tuning.heart_bonus_points;
    }

    /// Award milestone bonuses crossed since the last check
    pub fn check_milestones(&mut self, tuning: &ScoringTuning) -> Vec<u64> {
        let mut crossed = Vec::new();
        while self.total() >= self.next_milestone {
            crossed.push(self.next_milestone);
            self.bonus_points += tuning.milestone_bonus;
            self.next_milestone += tuning.milestone_interval;
        }
        crossed
    }

    /// Totals persist across levels; per-level tracking starts over
    pub fn reset_for_level(&mut self) {
        self.combo.reset();
        self.combo.max_combo = 0;
        self.level = LevelTally::default();
    }
}

/// Points for clearing an obstacle.
///
/// Monotonic in each argument with the others fixed: higher level, aerial
/// over platform over ground, more jumps, and peak timing never score less.
pub fn clear_points(
    level: u8,
    clear: ClearType,
    jumps_used: u8,
    at_peak: bool,
    tuning: &ScoringTuning,
) -> u64 {
    let clear_mult = match clear {
        ClearType::Ground => tuning.ground_multiplier,
        ClearType::Platform => tuning.platform_multiplier,
        ClearType::Aerial => tuning.aerial_multiplier,
    };
    let jump_mult = clear_mult + tuning.extra_jump_bonus * jumps_used.saturating_sub(1) as f32;
    let peak_mult = if at_peak { tuning.peak_multiplier } else { 1.0 };
    let base = tuning.obstacle_base_points as f32 * level.max(1) as f32;
    (base * jump_mult * peak_mult).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::OBSTACLE_BASE_POINTS;

    #[test]
    fn test_ground_baseline() {
        let t = ScoringTuning::default();
        assert_eq!(
            clear_points(1, ClearType::Ground, 0, false, &t),
            OBSTACLE_BASE_POINTS
        );
    }

    #[test]
    fn test_peak_third_jump_level_four_beats_baseline() {
        let t = ScoringTuning::default();
        let baseline = clear_points(1, ClearType::Ground, 0, false, &t);
        let best = clear_points(4, ClearType::Aerial, 3, true, &t);
        assert!(best > baseline);
    }

    #[test]
    fn test_combo_extends_only_airborne() {
        let t = ScoringTuning::default();
        let mut s = ScoreState::new(&t);
        let a = s.record_clear(1, ClearType::Ground, 1, false, true, false, &t);
        assert_eq!(a.combo, 1);
        assert_eq!(a.bonus, 0);
        let b = s.record_clear(1, ClearType::Aerial, 2, false, true, false, &t);
        assert_eq!(b.combo, 2);
        assert_eq!(b.bonus, t.combo_bonus * 2);
        let c = s.record_clear(1, ClearType::Ground, 0, false, false, false, &t);
        assert_eq!(c.combo, 0);
        assert_eq!(s.combo.count, 2);
        assert_eq!(s.best_combo, 2);
    }

    #[test]
    fn test_combo_reset() {
        let mut c = Combo::default();
        assert_eq!(c.reset(), 0);
        c.extend();
        c.extend();
        assert_eq!(c.reset(), 2);
        assert_eq!(c.count, 0);
        assert!(!c.active);
        assert_eq!(c.max_combo, 2);
    }

    #[test]
    fn test_total_includes_components() {
        let t = ScoringTuning::default();
        let mut s = ScoreState::new(&t);
        s.add_time(2.5, &t);
        s.record_clear(2, ClearType::Ground, 1, false, false, true, &t);
        s.add_heart_bonus(&t);
        let expected = 25 + 100 + t.close_call_bonus + t.heart_bonus_points;
        assert_eq!(s.total(), expected);
    }

    #[test]
    fn test_milestones_fire_once() {
        let t = ScoringTuning::default();
        let mut s = ScoreState::new(&t);
        s.obstacle_points = t.milestone_interval * 2 + 10;
        let crossed = s.check_milestones(&t);
        assert_eq!(crossed, vec![t.milestone_interval, t.milestone_interval * 2]);
        assert!(s.check_milestones(&t).is_empty());
    }

    #[test]
    fn test_level_reset_keeps_totals() {
        let t = ScoringTuning::default();
        let mut s = ScoreState::new(&t);
        s.record_clear(3, ClearType::Aerial, 2, true, true, false, &t);
        let total = s.total();
        s.reset_for_level();
        assert_eq!(s.total(), total);
        assert_eq!(s.level, LevelTally::default());
        assert_eq!(s.combo.count, 0);
        assert_eq!(s.obstacles_cleared, 1);
    }
}
