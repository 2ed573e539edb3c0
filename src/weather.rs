//! Forecast data as seen by the decision engine.
//!
//! The weather collaborator replaces the [`ForecastSnapshot`] wholesale on
//! every successful refresh.  The engine only ever reads it, and decides
//! per tick whether it is still fresh enough to trust.

use serde::{Deserialize, Serialize};

/// Predicted precipitation for the next two forecast buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    /// Rain (mm) expected within the next 3 hours.
    pub rain_3h_mm: f32,
    /// Rain (mm) expected within the next 6 hours (both buckets combined).
    pub rain_6h_mm: f32,
    /// Monotonic timestamp (ms) at which the snapshot was fetched.
    pub fetched_at_ms: u64,
}

impl ForecastSnapshot {
    /// Age of the snapshot at `now_ms`.  A snapshot stamped in the future
    /// (clock reset) counts as age zero.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.fetched_at_ms)
    }

    /// `true` while the snapshot is no older than one refresh interval.
    pub fn is_fresh(&self, now_ms: u64, refresh_interval_ms: u32) -> bool {
        self.age_ms(now_ms) <= u64::from(refresh_interval_ms)
    }
}

/// What the decision engine knows about upcoming rain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForecastView {
    /// A fresh snapshot is available.
    Known { rain_3h_mm: f32, rain_6h_mm: f32 },
    /// No snapshot, a stale one, or the controller is offline.
    Unknown,
}

impl ForecastView {
    /// Resolve the latest snapshot into a view.
    ///
    /// Offline forces `Unknown`: the snapshot can no longer be refreshed,
    /// so the engine falls back to local sensing only.
    pub fn resolve(
        latest: Option<ForecastSnapshot>,
        online: bool,
        now_ms: u64,
        refresh_interval_ms: u32,
    ) -> Self {
        match latest {
            Some(s) if online && s.is_fresh(now_ms, refresh_interval_ms) => Self::Known {
                rain_3h_mm: s.rain_3h_mm,
                rain_6h_mm: s.rain_6h_mm,
            },
            _ => Self::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known { .. })
    }
}
