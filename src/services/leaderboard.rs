//! Global leaderboard seam
//!
//! Remote calls are fire-and-forget. Results land in a cache that the
//! render path reads whenever it likes; an empty cache is a normal state.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::sim::RunSummary;

/// What a finished run submits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub name: String,
    pub score: u64,
    pub level: u32,
    /// Seconds of play
    pub time: f64,
    pub obstacles_cleared: u32,
    pub character_type: String,
}

impl From<&RunSummary> for ScoreSubmission {
    fn from(s: &RunSummary) -> Self {
        Self {
            name: s.name.clone(),
            score: s.score,
            level: s.level,
            time: s.time,
            obstacles_cleared: s.obstacles_cleared,
            character_type: s.character.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
    pub level: u32,
    pub time: f64,
    pub obstacles_cleared: u32,
    #[serde(default)]
    pub date: String,
}

/// Leaderboard order: score desc, level desc, obstacles cleared desc, time asc
pub fn compare_entries(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(b.level.cmp(&a.level))
        .then(b.obstacles_cleared.cmp(&a.obstacles_cleared))
        .then(a.time.partial_cmp(&b.time).unwrap_or(Ordering::Equal))
}

pub trait LeaderboardService {
    /// Send a score. `Ok(true)` when the backend accepted (or queued) it.
    ///
    /// An accepted score shows up in `cached_top_scores` without another
    /// `request_top_scores`; remote backends refresh once the submit lands.
    fn submit_score(&mut self, submission: &ScoreSubmission) -> Result<bool, ServiceError>;

    /// Ask for a fresh top list; it shows up in `cached_top_scores` later
    fn request_top_scores(&mut self, limit: usize) -> Result<(), ServiceError>;

    /// Last known top list, best first
    fn cached_top_scores(&self) -> Vec<LeaderboardEntry>;
}

/// In-process leaderboard, used natively and as the offline fallback
#[derive(Debug, Clone)]
pub struct LocalLeaderboard {
    entries: Vec<LeaderboardEntry>,
    capacity: usize,
    limit: usize,
    today: String,
}

impl LocalLeaderboard {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
            limit: capacity.max(1),
            today: crate::highscores::today(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LeaderboardService for LocalLeaderboard {
    fn submit_score(&mut self, submission: &ScoreSubmission) -> Result<bool, ServiceError> {
        if submission.name.trim().is_empty() {
            return Ok(false);
        }
        self.entries.push(LeaderboardEntry {
            name: submission.name.clone(),
            score: submission.score,
            level: submission.level,
            time: submission.time,
            obstacles_cleared: submission.obstacles_cleared,
            date: self.today.clone(),
        });
        // Stable sort keeps earlier submissions ahead on full ties
        self.entries.sort_by(compare_entries);
        self.entries.truncate(self.capacity);
        Ok(true)
    }

    fn request_top_scores(&mut self, limit: usize) -> Result<(), ServiceError> {
        self.limit = limit;
        Ok(())
    }

    fn cached_top_scores(&self) -> Vec<LeaderboardEntry> {
        self.entries.iter().take(self.limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(name: &str, score: u64, level: u32, cleared: u32, time: f64) -> ScoreSubmission {
        ScoreSubmission {
            name: name.into(),
            score,
            level,
            time,
            obstacles_cleared: cleared,
            character_type: "fox".into(),
        }
    }

    #[test]
    fn test_ordering_tiebreaks() {
        let mut lb = LocalLeaderboard::new(10);
        lb.submit_score(&submission("slow", 1000, 2, 10, 90.0)).unwrap();
        lb.submit_score(&submission("fast", 1000, 2, 10, 60.0)).unwrap();
        lb.submit_score(&submission("more", 1000, 2, 12, 99.0)).unwrap();
        lb.submit_score(&submission("deeper", 1000, 3, 1, 99.0)).unwrap();
        lb.submit_score(&submission("top", 2000, 1, 0, 10.0)).unwrap();
        let names: Vec<String> = lb.cached_top_scores().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["top", "deeper", "more", "fast", "slow"]);
    }

    #[test]
    fn test_limit_and_capacity() {
        let mut lb = LocalLeaderboard::new(3);
        for i in 0..5 {
            lb.submit_score(&submission("p", i * 100, 1, 0, 1.0)).unwrap();
        }
        assert_eq!(lb.len(), 3);
        lb.request_top_scores(2).unwrap();
        let top = lb.cached_top_scores();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].score, 400);
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut lb = LocalLeaderboard::new(3);
        assert!(!lb.submit_score(&submission("  ", 10, 1, 0, 1.0)).unwrap());
        assert!(lb.is_empty());
    }
}
