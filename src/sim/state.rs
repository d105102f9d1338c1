//! Game state and core simulation types
//!
//! `GameState` is the single owned simulation context: every subsystem reads
//! and writes it through `&mut` borrows handed down by `tick`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::level::{LevelManager, Theme};
use super::obstacle::{Collectable, Obstacle};
use super::player::{ClearType, Player};
use super::scoring::ScoreState;
use super::spawner::Spawner;
use super::transition::LevelTransition;
use crate::consts::*;
use crate::tuning::Tuning;

/// Top-level game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Character and name selection
    StartScreen,
    /// 3-2-1 before play begins
    Countdown,
    /// Active gameplay
    Playing,
    /// Simulation frozen (see `GameState::pause_reason`)
    Paused,
    /// Cave sequence between levels
    LevelTransition,
    /// Run ended
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseReason {
    /// Toggled by the player; resumes on the next toggle
    User,
    /// Lost a life; resumes after a countdown
    LifeLost,
}

/// Playable characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Character {
    #[default]
    Fox,
    Knight,
    Robot,
    Ninja,
    Astronaut,
}

impl Character {
    pub const ALL: [Character; 5] = [
        Character::Fox,
        Character::Knight,
        Character::Robot,
        Character::Ninja,
        Character::Astronaut,
    ];

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0)
    }

    /// Wraps around, so any stored index maps to a character
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn next(&self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn prev(&self) -> Self {
        Self::from_index(self.index() + Self::ALL.len() - 1)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Character::Fox => "fox",
            Character::Knight => "knight",
            Character::Robot => "robot",
            Character::Ninja => "ninja",
            Character::Astronaut => "astronaut",
        }
    }
}

/// Timed 3-2-1 countdown advanced by the simulation tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    /// Seconds left
    pub remaining: f32,
}

impl Countdown {
    pub fn new(secs: f32) -> Self {
        Self { remaining: secs }
    }

    /// Advance; true once the countdown has run out
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }

    /// Number to display (3, 2, 1)
    pub fn display(&self) -> u8 {
        self.remaining.ceil().max(1.0) as u8
    }
}

/// Wall clock fed by tick deltas, with pause spans tracked separately
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionClock {
    /// Total seconds seen by the simulation
    pub now: f64,
    run_started_at: f64,
    paused_total: f64,
    pause_started_at: Option<f64>,
}

impl SessionClock {
    pub fn advance(&mut self, dt: f32) {
        self.now += dt as f64;
    }

    /// Play time starts counting from here
    pub fn start_run(&mut self) {
        self.run_started_at = self.now;
        self.paused_total = 0.0;
        self.pause_started_at = None;
    }

    pub fn begin_pause(&mut self) {
        if self.pause_started_at.is_none() {
            self.pause_started_at = Some(self.now);
        }
    }

    pub fn end_pause(&mut self) {
        if let Some(started) = self.pause_started_at.take() {
            self.paused_total += self.now - started;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started_at.is_some()
    }

    /// Accumulated pause time, including a pause still in progress
    pub fn paused_total(&self) -> f64 {
        let open = self.pause_started_at.map_or(0.0, |s| self.now - s);
        self.paused_total + open
    }

    /// Run time minus every pause
    pub fn play_time(&self) -> f64 {
        (self.now - self.run_started_at - self.paused_total()).max(0.0)
    }
}

/// End-of-run numbers handed to high scores, leaderboard and analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub name: String,
    pub character: Character,
    pub score: u64,
    pub level: u32,
    /// Play time in seconds
    pub time: f64,
    pub obstacles_cleared: u32,
    pub max_combo: u32,
}

/// Things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CharacterSelected {
        character: Character,
    },
    GameStarted {
        character: Character,
        name: String,
    },
    ObstacleCleared {
        id: u32,
        level: u8,
        clear: ClearType,
        points: u64,
        bonus: u64,
        combo: u32,
        close_call: bool,
    },
    ObstacleHit {
        lives_left: u8,
    },
    HeartCollected {
        extra_life: bool,
        lives: u8,
    },
    Landed {
        combo_broken: u32,
    },
    Milestone {
        score: u64,
    },
    LevelComplete {
        level: u32,
        score: u64,
        time: f64,
    },
    LevelStarted {
        level: u32,
        theme: Theme,
        new_best: bool,
    },
    Paused {
        reason: PauseReason,
    },
    Resumed,
    GameOver {
        summary: RunSummary,
    },
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub pause_reason: Option<PauseReason>,
    /// Pending countdown (start or life-loss resume)
    pub countdown: Option<Countdown>,
    pub character: Character,
    pub player_name: String,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub collectables: Vec<Collectable>,
    pub spawner: Spawner,
    pub difficulty: Difficulty,
    pub score: ScoreState,
    pub lives: u8,
    pub level: LevelManager,
    pub transition: LevelTransition,
    pub clock: SessionClock,
    /// Events since the host last drained them
    pub events: Vec<GameEvent>,
}

/// Longest accepted player name
pub const MAX_NAME_LEN: usize = 16;

impl GameState {
    /// Fresh state on the start screen
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::StartScreen,
            pause_reason: None,
            countdown: None,
            character: Character::default(),
            player_name: String::new(),
            player: Player::new(),
            obstacles: Vec::new(),
            collectables: Vec::new(),
            spawner: Spawner::new(),
            difficulty: Difficulty::new_game(&tuning.difficulty),
            score: ScoreState::new(&tuning.scoring),
            lives: START_LIVES,
            level: LevelManager::new(1),
            transition: LevelTransition::inactive(),
            clock: SessionClock::default(),
            events: Vec::new(),
            tuning,
        }
    }

    /// Reset everything belonging to a run. Preferences (character, name,
    /// best level) and the clock survive; any pending countdown is dropped.
    pub fn new_game(&mut self) {
        let best = self.level.highest_level_reached;
        self.player = Player::new();
        self.obstacles.clear();
        self.collectables.clear();
        self.spawner = Spawner::new();
        self.difficulty = Difficulty::new_game(&self.tuning.difficulty);
        self.score = ScoreState::new(&self.tuning.scoring);
        self.lives = START_LIVES;
        self.level = LevelManager::new(best);
        self.transition = LevelTransition::inactive();
        self.countdown = None;
        self.pause_reason = None;
        self.clock.start_run();
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.player_name = name.trim().chars().take(MAX_NAME_LEN).collect();
    }

    #[inline]
    pub fn total_score(&self) -> u64 {
        self.score.total()
    }

    /// Seconds of play in the current level (pauses excluded)
    pub fn level_time(&self) -> f64 {
        self.level.level_time(self.clock.play_time())
    }

    pub fn theme(&self) -> Theme {
        self.level.theme()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            name: self.player_name.clone(),
            character: self.character,
            score: self.total_score(),
            level: self.level.current_level,
            time: self.clock.play_time(),
            obstacles_cleared: self.score.obstacles_cleared,
            max_combo: self.score.best_combo,
        }
    }

    #[inline]
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
