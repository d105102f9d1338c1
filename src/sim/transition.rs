//! Cave transition played between levels
//!
//! A linear, purely time-based sequence of phases. Each tick advances at most
//! one phase; leftover time past a phase boundary is dropped so the next
//! phase always starts from zero.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{FIELD_WIDTH, GROUND_Y, PLAYER_X};

/// Stat rows carved into the cave wall during [`TransitionPhase::CaveInterior`]
pub const STAT_ROWS: usize = 7;
/// First stat row appears after this delay, then one per interval
pub const REVEAL_START: f32 = 0.4;
pub const REVEAL_INTERVAL: f32 = 0.5;
/// White flash at the start of [`TransitionPhase::CaveExit`]
pub const EXIT_FLASH_SECS: f32 = 0.3;
/// Cave mouth x position on the approach mountain
pub const CAVE_MOUTH_X: f32 = FIELD_WIDTH * 0.75;

const MAX_EMBERS: usize = 48;
const EMBERS_PER_SEC: f32 = 12.0;
const TORCH_X: [f32; 2] = [FIELD_WIDTH * 0.2, FIELD_WIDTH * 0.8];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionPhase {
    MountainApproach,
    CaveEntry,
    CaveInterior,
    Anticipation,
    CaveExit,
    LevelIntro,
}

impl TransitionPhase {
    pub const ALL: [TransitionPhase; 6] = [
        TransitionPhase::MountainApproach,
        TransitionPhase::CaveEntry,
        TransitionPhase::CaveInterior,
        TransitionPhase::Anticipation,
        TransitionPhase::CaveExit,
        TransitionPhase::LevelIntro,
    ];

    /// Wall-clock duration in seconds
    pub fn duration(&self) -> f32 {
        match self {
            TransitionPhase::MountainApproach => 2.0,
            TransitionPhase::CaveEntry => 1.5,
            TransitionPhase::CaveInterior => 4.0,
            TransitionPhase::Anticipation => 3.0,
            TransitionPhase::CaveExit => 1.0,
            TransitionPhase::LevelIntro => 2.0,
        }
    }

    pub fn next(&self) -> Option<TransitionPhase> {
        match self {
            TransitionPhase::MountainApproach => Some(TransitionPhase::CaveEntry),
            TransitionPhase::CaveEntry => Some(TransitionPhase::CaveInterior),
            TransitionPhase::CaveInterior => Some(TransitionPhase::Anticipation),
            TransitionPhase::Anticipation => Some(TransitionPhase::CaveExit),
            TransitionPhase::CaveExit => Some(TransitionPhase::LevelIntro),
            TransitionPhase::LevelIntro => None,
        }
    }

    /// Total length of the sequence
    pub fn total_duration() -> f32 {
        Self::ALL.iter().map(|p| p.duration()).sum()
    }
}

/// Numbers shown on the cave wall, captured when the level completes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionStats {
    pub completed_level: u32,
    pub total_score: u64,
    pub level_score: u64,
    pub level_time: f64,
    pub obstacles_cleared: u32,
    pub max_combo: u32,
    pub close_calls: u32,
    pub hearts: u32,
}

impl TransitionStats {
    pub fn rows(&self) -> [(&'static str, String); STAT_ROWS] {
        let secs = self.level_time.max(0.0) as u64;
        [
            ("Level", format!("{} complete", self.completed_level)),
            ("Score", self.total_score.to_string()),
            ("Level points", self.level_score.to_string()),
            ("Time", format!("{}:{:02}", secs / 60, secs % 60)),
            (
                "Cleared",
                format!("{} (best combo {})", self.obstacles_cleared, self.max_combo),
            ),
            ("Close calls", self.close_calls.to_string()),
            ("Hearts", self.hearts.to_string()),
        ]
    }
}

/// A spark drifting up from a torch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ember {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1 at spawn, 0 when gone
    pub life: f32,
}

/// Result of a single transition update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionUpdate {
    /// Machine not running; nothing happened
    Inactive,
    Running,
    PhaseChanged(TransitionPhase),
    /// Last phase finished; the owner must set up the next level
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelTransition {
    pub active: bool,
    pub phase: TransitionPhase,
    /// Seconds since the transition started
    pub clock: f32,
    /// `clock` value when the current phase began
    pub phase_started_at: f32,
    /// Stat rows revealed so far (0..=STAT_ROWS)
    pub revealed: usize,
    pub stats: TransitionStats,
    /// Torch flame intensity (0-1)
    pub torch_flicker: f32,
    pub embers: Vec<Ember>,
    ember_accumulator: f32,
}

impl Default for LevelTransition {
    fn default() -> Self {
        Self::inactive()
    }
}

impl LevelTransition {
    pub fn inactive() -> Self {
        Self {
            active: false,
            phase: TransitionPhase::MountainApproach,
            clock: 0.0,
            phase_started_at: 0.0,
            revealed: 0,
            stats: TransitionStats::default(),
            torch_flicker: 1.0,
            embers: Vec::new(),
            ember_accumulator: 0.0,
        }
    }

    pub fn start(stats: TransitionStats) -> Self {
        log::info!("Cave transition after level {}", stats.completed_level);
        Self {
            active: true,
            stats,
            ..Self::inactive()
        }
    }

    /// Seconds since the current phase began
    #[inline]
    pub fn phase_elapsed(&self) -> f32 {
        self.clock - self.phase_started_at
    }

    /// Progress through the current phase (0-1)
    pub fn phase_progress(&self) -> f32 {
        (self.phase_elapsed() / self.phase.duration()).clamp(0.0, 1.0)
    }

    pub fn update<R: Rng>(&mut self, dt: f32, rng: &mut R) -> TransitionUpdate {
        if !self.active {
            return TransitionUpdate::Inactive;
        }
        self.clock += dt;
        self.update_torches(dt, rng);

        if self.phase == TransitionPhase::CaveInterior {
            while self.revealed < STAT_ROWS
                && self.phase_elapsed() >= REVEAL_START + self.revealed as f32 * REVEAL_INTERVAL
            {
                self.revealed += 1;
            }
        }

        if self.phase_elapsed() < self.phase.duration() {
            return TransitionUpdate::Running;
        }

        match self.phase.next() {
            Some(next) => {
                if self.phase == TransitionPhase::CaveInterior {
                    self.revealed = STAT_ROWS;
                }
                self.phase = next;
                self.phase_started_at = self.clock;
                log::debug!("transition phase -> {:?}", next);
                TransitionUpdate::PhaseChanged(next)
            }
            None => {
                self.active = false;
                self.embers.clear();
                TransitionUpdate::Completed
            }
        }
    }

    fn update_torches<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        let t = self.clock;
        self.torch_flicker = 0.8 + 0.2 * (t * 12.0).sin() * (t * 7.3).cos();

        let lit = matches!(
            self.phase,
            TransitionPhase::CaveInterior | TransitionPhase::Anticipation
        );
        if lit {
            self.ember_accumulator += dt * EMBERS_PER_SEC;
            while self.ember_accumulator >= 1.0 && self.embers.len() < MAX_EMBERS {
                self.ember_accumulator -= 1.0;
                let torch = TORCH_X[rng.random_range(0..TORCH_X.len())];
                self.embers.push(Ember {
                    pos: Vec2::new(torch + rng.random_range(-6.0..6.0), GROUND_Y - 120.0),
                    vel: Vec2::new(rng.random_range(-15.0..15.0), rng.random_range(-60.0..-30.0)),
                    life: 1.0,
                });
            }
            self.ember_accumulator = self.ember_accumulator.min(1.0);
        }

        for ember in &mut self.embers {
            ember.pos += ember.vel * dt;
            ember.life -= dt * 0.8;
        }
        self.embers.retain(|e| e.life > 0.0);
    }

    /// Runner x position, None while hidden inside the cave
    pub fn runner_x(&self) -> Option<f32> {
        let p = self.phase_progress();
        match self.phase {
            TransitionPhase::MountainApproach => Some(PLAYER_X + (CAVE_MOUTH_X - PLAYER_X) * p),
            TransitionPhase::CaveEntry if p < 0.5 => Some(CAVE_MOUTH_X + 60.0 * p * 2.0),
            TransitionPhase::LevelIntro => Some(-40.0 + (PLAYER_X + 40.0) * p),
            _ => None,
        }
    }

    /// Screen darkening (0 = none, 1 = black)
    pub fn darkness(&self) -> f32 {
        let p = self.phase_progress();
        match self.phase {
            TransitionPhase::MountainApproach | TransitionPhase::LevelIntro => 0.0,
            TransitionPhase::CaveEntry => p,
            TransitionPhase::CaveInterior | TransitionPhase::Anticipation => 1.0,
            TransitionPhase::CaveExit => 1.0 - p,
        }
    }

    /// 3-2-1 during [`TransitionPhase::Anticipation`]
    pub fn countdown(&self) -> Option<u8> {
        if self.phase != TransitionPhase::Anticipation {
            return None;
        }
        let step = self.phase_elapsed().max(0.0).floor() as u8;
        Some(3u8.saturating_sub(step).max(1))
    }

    /// Flash intensity at the cave exit
    pub fn flash(&self) -> f32 {
        if self.phase != TransitionPhase::CaveExit {
            return 0.0;
        }
        (1.0 - self.phase_elapsed() / EXIT_FLASH_SECS).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    fn stats() -> TransitionStats {
        TransitionStats {
            completed_level: 1,
            total_score: 1500,
            level_score: 1500,
            level_time: 95.0,
            obstacles_cleared: 12,
            max_combo: 3,
            close_calls: 2,
            hearts: 1,
        }
    }

    #[test]
    fn test_phases_run_in_order() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut t = LevelTransition::start(stats());
        let mut seen = vec![t.phase];
        let mut completed = false;
        for _ in 0..2000 {
            match t.update(DT, &mut rng) {
                TransitionUpdate::PhaseChanged(p) => seen.push(p),
                TransitionUpdate::Completed => {
                    completed = true;
                    break;
                }
                _ => {}
            }
        }
        assert!(completed);
        assert_eq!(seen, TransitionPhase::ALL.to_vec());
        assert!(!t.active);
    }

    #[test]
    fn test_one_phase_per_tick() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut t = LevelTransition::start(stats());
        // A huge dt must still only advance a single phase
        let r = t.update(100.0, &mut rng);
        assert_eq!(r, TransitionUpdate::PhaseChanged(TransitionPhase::CaveEntry));
        assert_eq!(t.phase_elapsed(), 0.0);
    }

    #[test]
    fn test_update_when_inactive_is_noop() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut t = LevelTransition::inactive();
        assert_eq!(t.update(1.0, &mut rng), TransitionUpdate::Inactive);
        assert_eq!(t.clock, 0.0);
    }

    #[test]
    fn test_stat_reveal_sequence() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut t = LevelTransition::start(stats());
        t.phase = TransitionPhase::CaveInterior;
        t.update(REVEAL_START - 0.05, &mut rng);
        assert_eq!(t.revealed, 0);
        t.update(0.1, &mut rng);
        assert_eq!(t.revealed, 1);
        t.update(REVEAL_INTERVAL, &mut rng);
        assert_eq!(t.revealed, 2);
        t.update(10.0, &mut rng);
        assert_eq!(t.revealed, STAT_ROWS);
    }

    #[test]
    fn test_anticipation_countdown() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut t = LevelTransition::start(stats());
        t.phase = TransitionPhase::Anticipation;
        assert_eq!(t.countdown(), Some(3));
        t.update(1.1, &mut rng);
        assert_eq!(t.countdown(), Some(2));
        t.update(1.0, &mut rng);
        assert_eq!(t.countdown(), Some(1));
        t.update(1.0, &mut rng);
        assert_eq!(t.phase, TransitionPhase::CaveExit);
        assert_eq!(t.countdown(), None);
        assert_eq!(t.flash(), 1.0);
    }

    #[test]
    fn test_darkness_profile() {
        let mut t = LevelTransition::start(stats());
        assert_eq!(t.darkness(), 0.0);
        t.phase = TransitionPhase::CaveInterior;
        assert_eq!(t.darkness(), 1.0);
        t.phase = TransitionPhase::LevelIntro;
        assert_eq!(t.darkness(), 0.0);
    }

    #[test]
    fn test_runner_leaves_and_returns() {
        let mut t = LevelTransition::start(stats());
        assert_eq!(t.runner_x(), Some(PLAYER_X));
        t.phase = TransitionPhase::CaveInterior;
        assert_eq!(t.runner_x(), None);
        t.phase = TransitionPhase::LevelIntro;
        t.clock = TransitionPhase::LevelIntro.duration();
        assert_eq!(t.runner_x(), Some(PLAYER_X));
    }

    #[test]
    fn test_stat_rows_formatting() {
        let rows = stats().rows();
        assert_eq!(rows[3].1, "1:35");
        assert_eq!(rows[0].1, "1 complete");
        assert_eq!(rows[5], ("Close calls", "2".to_string()));
        assert_eq!(rows[6], ("Hearts", "1".to_string()));
    }

    #[test]
    fn test_all_rows_revealed_inside_cave() {
        let last = REVEAL_START + (STAT_ROWS - 1) as f32 * REVEAL_INTERVAL;
        assert!(last < TransitionPhase::CaveInterior.duration());
    }
}
