//! Session telemetry: start, heartbeat and end hooks keyed by a session id

use crate::error::ServiceError;

/// Seconds of wall time between heartbeats
pub const HEARTBEAT_INTERVAL_SECS: f64 = 30.0;

pub trait SessionTelemetry {
    fn start_session(&mut self, session_id: &str) -> Result<(), ServiceError>;
    fn heartbeat(&mut self, session_id: &str) -> Result<(), ServiceError>;
    fn end_session(&mut self, session_id: &str) -> Result<(), ServiceError>;

    /// Live player count, if the backend has reported one
    fn active_players(&self) -> Option<u32> {
        None
    }
}

/// Writes session hooks to the log
#[derive(Debug, Default)]
pub struct LogTelemetry;

impl SessionTelemetry for LogTelemetry {
    fn start_session(&mut self, session_id: &str) -> Result<(), ServiceError> {
        log::info!("session {} started", session_id);
        Ok(())
    }

    fn heartbeat(&mut self, session_id: &str) -> Result<(), ServiceError> {
        log::debug!("session {} heartbeat", session_id);
        Ok(())
    }

    fn end_session(&mut self, session_id: &str) -> Result<(), ServiceError> {
        log::info!("session {} ended", session_id);
        Ok(())
    }
}

/// Opaque random session id
pub fn new_session_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}

/// Fires once per interval of accumulated wall time
#[derive(Debug, Clone)]
pub struct HeartbeatTimer {
    interval: f64,
    elapsed: f64,
}

impl HeartbeatTimer {
    pub fn new(interval: f64) -> Self {
        Self {
            interval: interval.max(f64::EPSILON),
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` seconds; true when a heartbeat is due
    pub fn tick(&mut self, dt: f64) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed %= self.interval;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

impl Default for HeartbeatTimer {
    fn default() -> Self {
        Self::new(HEARTBEAT_INTERVAL_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_every_interval() {
        let mut t = HeartbeatTimer::default();
        let beats = (0..(60 * 65)).filter(|_| t.tick(1.0 / 60.0)).count();
        assert_eq!(beats, 2);
    }

    #[test]
    fn test_session_ids_are_hex() {
        let id = new_session_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
