//! Sliding-window rate records and the admission rule applied to them.

use hookforge_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Request timestamps (epoch milliseconds) recorded for one client identity.
///
/// Timestamps are kept in non-decreasing order so the earliest entry is
/// always at the front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateRecord {
    timestamps: Vec<i64>,
}

impl RateRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a record from persisted timestamps.
    #[must_use]
    pub fn from_timestamps(mut timestamps: Vec<i64>) -> Self {
        timestamps.sort_unstable();
        Self { timestamps }
    }

    /// Returns the stored timestamps in ascending order.
    #[must_use]
    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    /// Returns the number of stored timestamps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Returns whether no timestamps are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Returns the earliest stored timestamp.
    #[must_use]
    pub fn earliest(&self) -> Option<i64> {
        self.timestamps.first().copied()
    }

    /// Drops every timestamp at or before `now_ms - window_ms`.
    pub fn prune(&mut self, now_ms: i64, window_ms: i64) {
        let cutoff = now_ms.saturating_sub(window_ms);
        self.timestamps.retain(|timestamp| *timestamp > cutoff);
    }

    /// Records one attempt at `now_ms`.
    pub fn record(&mut self, now_ms: i64) {
        // Instances with skewed clocks can hand us an older `now`.
        let index = self
            .timestamps
            .partition_point(|timestamp| *timestamp <= now_ms);
        self.timestamps.insert(index, now_ms);
    }
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Caller may proceed; the attempt has been recorded.
    Allowed {
        /// Further attempts still admissible inside the current window.
        remaining: u32,
    },
    /// Caller must not proceed until `reset_at_ms`.
    Rejected {
        /// Epoch milliseconds at which the earliest attempt leaves the window.
        reset_at_ms: i64,
    },
}

impl RateDecision {
    /// Returns whether the decision admits the request.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Fixed capacity over a fixed sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    max_requests: u32,
    window_ms: i64,
}

impl RateWindow {
    /// Creates a validated window.
    pub fn new(max_requests: u32, window_ms: i64) -> AppResult<Self> {
        if max_requests == 0 {
            return Err(AppError::Validation(
                "rate limit max_requests must be greater than zero".to_owned(),
            ));
        }

        if window_ms <= 0 {
            return Err(AppError::Validation(
                "rate limit window must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            max_requests,
            window_ms,
        })
    }

    /// Maximum attempts admitted per window.
    #[must_use]
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Window length in milliseconds.
    #[must_use]
    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Prunes `record` and, when capacity remains, records `now_ms`.
    ///
    /// The record is pruned on both outcomes so stored state stays bounded by
    /// `max_requests` entries.
    pub fn evaluate(&self, record: &mut RateRecord, now_ms: i64) -> RateDecision {
        record.prune(now_ms, self.window_ms);

        let capacity = usize::try_from(self.max_requests).unwrap_or(usize::MAX);
        if record.len() >= capacity {
            let earliest = record.earliest().unwrap_or(now_ms);
            return RateDecision::Rejected {
                reset_at_ms: earliest.saturating_add(self.window_ms),
            };
        }

        record.record(now_ms);
        let used = u32::try_from(record.len()).unwrap_or(u32::MAX);

        RateDecision::Allowed {
            remaining: self.max_requests.saturating_sub(used),
        }
    }
}
