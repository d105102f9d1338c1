//! Composition root
//!
//! Owns the simulation plus every optional collaborator. Each frame ticks the
//! sim, then drains its events into persistence and the services. Nothing
//! here can fail the frame: collaborator errors are logged and dropped.

use crate::highscores::{self, HighScores};
use crate::platform::KeyValueStore;
use crate::services::analytics::{self, AnalyticsEvent, HitSampler};
use crate::services::telemetry::{HeartbeatTimer, new_session_id};
use crate::services::{LeaderboardEntry, ScoreSubmission, Services};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, PauseReason, RunSummary, TickInput, tick};
use crate::tuning::Tuning;

/// Report the first obstacle hit and every 5th after it
pub const HIT_SAMPLE_EVERY: u32 = 5;

/// Leaderboard rows requested at startup
pub const LEADERBOARD_LIMIT: usize = 10;

pub struct App {
    pub state: GameState,
    pub settings: Settings,
    pub high_scores: HighScores,
    pub services: Services,
    store: Box<dyn KeyValueStore>,
    session_id: Option<String>,
    heartbeat: HeartbeatTimer,
    hit_sampler: HitSampler,
    /// Local table rank of the last finished run
    pub last_rank: Option<usize>,
}

impl App {
    /// Restore preferences and high scores from `store`, then wire services
    pub fn new(
        seed: u64,
        tuning: Tuning,
        store: Box<dyn KeyValueStore>,
        services: Services,
    ) -> Self {
        let settings = Settings::load_or_default(store.as_ref());
        let high_scores = HighScores::load_or_default(store.as_ref());

        let mut state = GameState::new(seed, tuning);
        state.character = settings.character();
        state.set_player_name(&settings.last_player_name);
        state.level.highest_level_reached = settings.highest_level;

        let mut services = services;
        if let Some(lb) = services.leaderboard.as_mut() {
            if let Err(e) = lb.request_top_scores(LEADERBOARD_LIMIT) {
                log::warn!("Leaderboard unavailable: {}", e);
            }
        }

        Self {
            state,
            settings,
            high_scores,
            services,
            store,
            session_id: None,
            heartbeat: HeartbeatTimer::default(),
            hit_sampler: HitSampler::new(HIT_SAMPLE_EVERY),
            last_rank: None,
        }
    }

    /// Tick the simulation and dispatch what happened
    pub fn frame(&mut self, input: &TickInput, dt: f32) {
        tick(&mut self.state, input, dt);
        for event in self.state.drain_events() {
            self.handle_event(event);
        }
        if self.heartbeat.tick(dt as f64) {
            self.send_heartbeat();
        }
    }

    pub fn session_active(&self) -> bool {
        self.session_id.is_some()
    }

    /// Global top list when the leaderboard has data, otherwise `None` and
    /// callers show the local table
    pub fn global_scores(&self) -> Option<Vec<LeaderboardEntry>> {
        let entries = self.services.leaderboard.as_ref()?.cached_top_scores();
        (!entries.is_empty()).then_some(entries)
    }

    pub fn active_players(&self) -> Option<u32> {
        self.services.telemetry.as_ref()?.active_players()
    }

    pub fn set_canvas_scale(&mut self, scale: f32) {
        self.settings.canvas_scale = scale;
        self.settings = self.settings.clone().sanitized();
        self.save_settings();
    }

    /// End the telemetry session (page unload, native exit)
    pub fn shutdown(&mut self) {
        self.end_session();
    }

    fn handle_event(&mut self, event: GameEvent) {
        log::debug!("event: {:?}", event);
        match event {
            GameEvent::CharacterSelected { character } => {
                self.settings.last_character_index = character.index();
                self.save_settings();
                self.services.track(
                    AnalyticsEvent::new(analytics::CHARACTER_SELECTED)
                        .param("character", character.as_str()),
                );
            }
            GameEvent::GameStarted { character, name } => {
                self.settings.last_player_name = name;
                self.settings.last_character_index = character.index();
                self.save_settings();
                self.hit_sampler.reset();
                self.last_rank = None;
                self.start_session();
                self.services.track(
                    AnalyticsEvent::new(analytics::GAME_START)
                        .param("character", character.as_str())
                        .param("level", self.state.level.current_level),
                );
            }
            GameEvent::ObstacleHit { lives_left } => {
                if self.hit_sampler.sample() {
                    self.services.track(
                        AnalyticsEvent::new(analytics::OBSTACLE_HIT)
                            .param("lives_left", lives_left)
                            .param("level", self.state.level.current_level)
                            .param("score", self.state.total_score()),
                    );
                }
            }
            GameEvent::HeartCollected { extra_life, lives } => {
                self.services.track(
                    AnalyticsEvent::new(analytics::COLLECTIBLE_PICKUP)
                        .param("type", "heart")
                        .param("extra_life", extra_life)
                        .param("lives", lives),
                );
            }
            GameEvent::LevelComplete { level, score, time } => {
                self.services.track(
                    AnalyticsEvent::new(analytics::LEVEL_COMPLETE)
                        .param("level", level)
                        .param("score", score)
                        .param("time", time),
                );
            }
            GameEvent::LevelStarted { level, new_best, .. } => {
                if new_best && level > self.settings.highest_level {
                    self.settings.highest_level = level;
                    self.save_settings();
                }
            }
            GameEvent::Paused { reason } => {
                let reason = match reason {
                    PauseReason::User => "user",
                    PauseReason::LifeLost => "life_lost",
                };
                self.services.track(
                    AnalyticsEvent::new(analytics::GAME_PAUSED)
                        .param("reason", reason)
                        .param("score", self.state.total_score()),
                );
            }
            GameEvent::GameOver { summary } => self.finish_run(&summary),
            GameEvent::ObstacleCleared { .. }
            | GameEvent::Landed { .. }
            | GameEvent::Milestone { .. }
            | GameEvent::Resumed => {}
        }
    }

    fn finish_run(&mut self, summary: &RunSummary) {
        let previous_best = self.high_scores.top_score();
        self.last_rank = self
            .high_scores
            .add_score(&summary.name, summary.score, &highscores::today());
        if self.last_rank.is_some() {
            if let Err(e) = self.high_scores.save(self.store.as_mut()) {
                log::warn!("Failed to save high scores: {}", e);
            }
        }
        if self.last_rank == Some(1) {
            let mut event = AnalyticsEvent::new(analytics::HIGH_SCORE_ACHIEVED)
                .param("score", summary.score)
                .param("level", summary.level);
            if let Some(prev) = previous_best {
                event = event.param("previous", prev);
            }
            self.services.track(event);
        }

        if summary.level > self.settings.highest_level {
            self.settings.highest_level = summary.level;
            self.save_settings();
        }

        if let Some(lb) = self.services.leaderboard.as_mut() {
            let submission = ScoreSubmission::from(summary);
            match lb.submit_score(&submission) {
                Ok(true) => log::info!("Submitted score {}", summary.score),
                Ok(false) => log::warn!("Leaderboard rejected score {}", summary.score),
                Err(e) => log::warn!("Score submission failed: {}", e),
            }
        }

        self.services.track(
            AnalyticsEvent::new(analytics::GAME_OVER)
                .param("score", summary.score)
                .param("level", summary.level)
                .param("time", summary.time)
                .param("obstacles_cleared", summary.obstacles_cleared)
                .param("max_combo", summary.max_combo)
                .param("character", summary.character.as_str()),
        );
        self.end_session();
    }

    fn start_session(&mut self) {
        self.end_session();
        let id = new_session_id();
        if let Some(t) = self.services.telemetry.as_mut() {
            if let Err(e) = t.start_session(&id) {
                log::warn!("Telemetry start failed: {}", e);
            }
        }
        self.heartbeat.reset();
        self.session_id = Some(id);
    }

    fn send_heartbeat(&mut self) {
        let (Some(id), Some(t)) = (self.session_id.as_ref(), self.services.telemetry.as_mut())
        else {
            return;
        };
        if let Err(e) = t.heartbeat(id) {
            log::warn!("Heartbeat failed: {}", e);
        }
    }

    fn end_session(&mut self) {
        let Some(id) = self.session_id.take() else {
            return;
        };
        if let Some(t) = self.services.telemetry.as_mut() {
            if let Err(e) = t.end_session(&id) {
                log::warn!("Telemetry end failed: {}", e);
            }
        }
    }

    fn save_settings(&mut self) {
        if let Err(e) = self.settings.save(self.store.as_mut()) {
            log::warn!("Failed to save settings: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use crate::error::ServiceError;
    use crate::services::{LeaderboardService, LocalLeaderboard};
    use crate::sim::{Character, GamePhase, spawner::ground_obstacle};
    use std::cell::Cell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    fn app() -> App {
        App::new(
            1,
            Tuning::default(),
            Box::new(MemoryStore::new()),
            Services::local(),
        )
    }

    fn start(app: &mut App) {
        app.frame(
            &TickInput {
                player_name: Some("Ada".into()),
                confirm: true,
                ..Default::default()
            },
            DT,
        );
        for _ in 0..200 {
            app.frame(&TickInput::default(), DT);
        }
        assert_eq!(app.state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_game_start_opens_session_and_saves_name() {
        let mut app = app();
        start(&mut app);
        assert!(app.session_active());
        assert_eq!(app.settings.last_player_name, "Ada");
    }

    #[test]
    fn test_game_over_records_score_and_ends_session() {
        let mut app = app();
        start(&mut app);
        app.state.score.obstacle_points = 700;
        app.state.lives = 1;
        app.state.spawner.time_until_spawn = 1000.0;
        let x = app.state.player.left() + 5.0;
        app.state.obstacles.push(ground_obstacle(500, x, 1));
        app.frame(&TickInput::default(), DT);

        assert_eq!(app.state.phase, GamePhase::GameOver);
        assert!(!app.session_active());
        assert_eq!(app.last_rank, Some(1));
        assert!(app.high_scores.top_score().unwrap() >= 700);
        let global = app.global_scores().unwrap();
        assert_eq!(global[0].name, "Ada");
    }

    /// Local table that counts explicit refresh requests
    struct CountingLeaderboard {
        inner: LocalLeaderboard,
        refreshes: Rc<Cell<u32>>,
    }

    impl LeaderboardService for CountingLeaderboard {
        fn submit_score(&mut self, submission: &ScoreSubmission) -> Result<bool, ServiceError> {
            self.inner.submit_score(submission)
        }

        fn request_top_scores(&mut self, limit: usize) -> Result<(), ServiceError> {
            self.refreshes.set(self.refreshes.get() + 1);
            self.inner.request_top_scores(limit)
        }

        fn cached_top_scores(&self) -> Vec<LeaderboardEntry> {
            self.inner.cached_top_scores()
        }
    }

    #[test]
    fn test_submitted_score_listed_without_extra_refresh() {
        let refreshes = Rc::new(Cell::new(0));
        let services = Services::none().with_leaderboard(Box::new(CountingLeaderboard {
            inner: LocalLeaderboard::new(5),
            refreshes: refreshes.clone(),
        }));
        let mut app = App::new(1, Tuning::default(), Box::new(MemoryStore::new()), services);
        assert_eq!(refreshes.get(), 1);

        start(&mut app);
        app.state.score.obstacle_points = 400;
        app.state.lives = 1;
        app.state.spawner.time_until_spawn = 1000.0;
        let x = app.state.player.left() + 5.0;
        app.state.obstacles.push(ground_obstacle(500, x, 1));
        app.frame(&TickInput::default(), DT);

        assert_eq!(app.state.phase, GamePhase::GameOver);
        assert_eq!(refreshes.get(), 1);
        let global = app.global_scores().unwrap();
        assert_eq!(global[0].name, "Ada");
        assert!(global[0].score >= 400);
    }

    #[test]
    fn test_preferences_restored_from_store() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            last_character_index: Character::Knight.index(),
            last_player_name: "Bo".into(),
            highest_level: 3,
            canvas_scale: 1.0,
        };
        settings.save(&mut store).unwrap();
        let app = App::new(1, Tuning::default(), Box::new(store), Services::none());
        assert_eq!(app.state.character, Character::Knight);
        assert_eq!(app.state.player_name, "Bo");
        assert_eq!(app.state.level.highest_level_reached, 3);
        assert!(app.global_scores().is_none());
    }
}
