//! Optional external services
//!
//! Each service is resolved once when the [`Services`] bundle is built. A
//! missing service is `None` and every call site simply skips it.

pub mod analytics;
#[cfg(target_arch = "wasm32")]
pub mod http;
pub mod leaderboard;
pub mod telemetry;

pub use analytics::{AnalyticsEvent, AnalyticsSink, HitSampler, LogAnalytics};
pub use leaderboard::{LeaderboardEntry, LeaderboardService, LocalLeaderboard, ScoreSubmission};
pub use telemetry::{HeartbeatTimer, LogTelemetry, SessionTelemetry};

/// Entries kept by the in-process leaderboard
pub const LOCAL_LEADERBOARD_SIZE: usize = 10;

#[derive(Default)]
pub struct Services {
    pub leaderboard: Option<Box<dyn LeaderboardService>>,
    pub telemetry: Option<Box<dyn SessionTelemetry>>,
    pub analytics: Option<Box<dyn AnalyticsSink>>,
}

impl Services {
    /// No services at all
    pub fn none() -> Self {
        Self::default()
    }

    /// Offline set: in-process leaderboard, log-only telemetry and analytics
    pub fn local() -> Self {
        Self {
            leaderboard: Some(Box::new(LocalLeaderboard::new(LOCAL_LEADERBOARD_SIZE))),
            telemetry: Some(Box::new(LogTelemetry)),
            analytics: Some(Box::new(LogAnalytics)),
        }
    }

    pub fn with_leaderboard(mut self, service: Box<dyn LeaderboardService>) -> Self {
        self.leaderboard = Some(service);
        self
    }

    pub fn with_telemetry(mut self, service: Box<dyn SessionTelemetry>) -> Self {
        self.telemetry = Some(service);
        self
    }

    pub fn with_analytics(mut self, sink: Box<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(sink);
        self
    }

    /// Send an analytics event if a sink is configured
    pub fn track(&mut self, event: AnalyticsEvent) {
        if let Some(sink) = self.analytics.as_mut() {
            if let Err(e) = sink.track(&event) {
                log::warn!("Analytics event {} dropped: {}", event.name, e);
            }
        }
    }
}
