//! Best race times board
//!
//! Keeps the fastest finished races in memory, fastest first.

use serde::{Deserialize, Serialize};

/// Default number of race times to keep
pub const MAX_BEST_TIMES: usize = 5;

/// Fastest race totals, ascending
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestTimes {
    capacity: usize,
    times: Vec<f64>,
    /// Position of the most recently added time, if it made the board
    last_index: Option<usize>,
}

impl Default for BestTimes {
    fn default() -> Self {
        Self::new(MAX_BEST_TIMES)
    }
}

impl BestTimes {
    /// Create an empty board
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            times: Vec::with_capacity(capacity),
            last_index: None,
        }
    }

    /// Check if a race time would make the board
    pub fn qualifies(&self, time_ms: f64) -> bool {
        if !(time_ms.is_finite() && time_ms > 0.0) || self.capacity == 0 {
            return false;
        }
        if self.times.len() < self.capacity {
            return true;
        }
        self.times.last().map(|&t| time_ms < t).unwrap_or(true)
    }

    /// Rank a time would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, time_ms: f64) -> Option<usize> {
        if !self.qualifies(time_ms) {
            return None;
        }
        let rank = self.times.iter().position(|&t| time_ms < t);
        Some(rank.unwrap_or(self.times.len()) + 1)
    }

    /// Record a finished race
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify
    pub fn add_race_time(&mut self, time_ms: f64) -> Option<usize> {
        let Some(rank) = self.potential_rank(time_ms) else {
            self.last_index = None;
            return None;
        };

        self.times.insert(rank - 1, time_ms);
        self.times.truncate(self.capacity);
        self.last_index = Some(rank - 1);
        log::info!("New best time #{}: {}", rank, format_seconds(time_ms));
        Some(rank)
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Fastest race so far
    pub fn best(&self) -> Option<f64> {
        self.times.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn reset(&mut self) {
        self.times.clear();
        self.last_index = None;
    }
}

/// Format milliseconds as seconds with two decimals ("12.34s")
pub fn format_seconds(time_ms: f64) -> String {
    format!("{:.2}s", time_ms / 1000.0)
}
