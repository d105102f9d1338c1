//! Analytics events
//!
//! Fire-and-forget: sinks may drop events and the game never waits on them.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ServiceError;

pub const GAME_START: &str = "game_start";
pub const CHARACTER_SELECTED: &str = "character_selected";
pub const GAME_OVER: &str = "game_over";
pub const LEVEL_COMPLETE: &str = "level_complete";
pub const HIGH_SCORE_ACHIEVED: &str = "high_score_achieved";
pub const OBSTACLE_HIT: &str = "obstacle_hit";
pub const COLLECTIBLE_PICKUP: &str = "collectible_pickup";
pub const GAME_PAUSED: &str = "game_paused";

/// Named event with a flat parameter map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub name: &'static str,
    pub params: Map<String, Value>,
}

impl AnalyticsEvent {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            params: Map::new(),
        }
    }

    /// Builder-style parameter
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}

pub trait AnalyticsSink {
    fn track(&mut self, event: &AnalyticsEvent) -> Result<(), ServiceError>;
}

/// Writes events to the log
#[derive(Debug, Default)]
pub struct LogAnalytics;

impl AnalyticsSink for LogAnalytics {
    fn track(&mut self, event: &AnalyticsEvent) -> Result<(), ServiceError> {
        let params = serde_json::to_string(&event.params)?;
        log::info!("analytics: {} {}", event.name, params);
        Ok(())
    }
}

/// Obstacle hits are reported on the first hit and then every Nth
#[derive(Debug, Clone)]
pub struct HitSampler {
    every: u32,
    seen: u32,
}

impl HitSampler {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            seen: 0,
        }
    }

    /// Count a hit; true when it should be reported
    pub fn sample(&mut self) -> bool {
        let report = self.seen % self.every == 0;
        self.seen += 1;
        report
    }

    pub fn reset(&mut self) {
        self.seen = 0;
    }
}
