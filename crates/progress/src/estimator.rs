//! Reading pace and remaining-time estimation.

use crate::config::EngineConfig;
use lectio_core::{BookId, MetadataProvider, ProgressSnapshot, Testament, TimestampMs};
use serde::Serialize;

/// Remaining-time estimate for one scope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Eta {
    /// Pace used, verses per minute
    pub vpm: f64,
    /// Verses not yet validated
    pub verses_left: u64,
    /// Minutes to finish at `vpm`; infinite when the pace is 0
    pub minutes: f64,
}

impl Eta {
    /// Estimate from a remaining verse count and a pace.
    pub fn new(verses_left: u64, vpm: f64) -> Self {
        Self {
            vpm,
            verses_left,
            minutes: minutes_left(verses_left, vpm),
        }
    }

    /// Whether a finite estimate exists.
    pub fn is_estimable(&self) -> bool {
        self.minutes.is_finite()
    }
}

/// Estimates for the whole canon and each testament.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EtaReport {
    /// Whole canon
    pub global: Eta,
    /// Old Testament
    pub old_testament: Eta,
    /// New Testament
    pub new_testament: Eta,
}

/// Minutes needed for `verses_left` at `vpm`. Infinite for a non-positive pace.
pub fn minutes_left(verses_left: u64, vpm: f64) -> f64 {
    if vpm > 0.0 {
        verses_left as f64 / vpm
    } else {
        f64::INFINITY
    }
}

/// Verses per minute, or `None` when no time was logged.
pub fn ratio(verses: u64, secs: u64) -> Option<f64> {
    if secs == 0 {
        return None;
    }
    Some(verses as f64 / (secs as f64 / 60.0))
}

/// Per-book smoothed pace and per-scope raw pace.
#[derive(Debug, Clone, Copy)]
pub struct PaceEstimator {
    alpha: f64,
    default_vpm: f64,
}

impl PaceEstimator {
    /// Create an estimator with EMA weight `alpha` and a scope pace floor.
    pub fn new(alpha: f64, default_vpm: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            default_vpm,
        }
    }

    /// Estimator using the engine settings.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.smoothing_alpha, config.default_vpm)
    }

    /// Blend a new sample into the previous smoothed value.
    ///
    /// The first sample is taken as-is.
    pub fn smooth(&self, prev: f64, sample: f64) -> f64 {
        if prev == 0.0 {
            sample
        } else {
            self.alpha * sample + (1.0 - self.alpha) * prev
        }
    }

    /// Raw pace for one book.
    ///
    /// With `now`, the uncredited time of an active session in that book is
    /// included.
    pub fn book_sample(
        &self,
        snapshot: &ProgressSnapshot,
        book_id: &BookId,
        now: Option<TimestampMs>,
    ) -> Option<f64> {
        let book = snapshot.book(book_id)?;
        let live = match (now, snapshot.active.as_ref()) {
            (Some(now), Some(s)) if &s.reference.book_id == book_id => s.live_secs(now),
            _ => 0,
        };
        ratio(book.verses_read() as u64, book.time_sec + live)
    }

    /// Take a fresh sample for `book_id` and store the smoothed result.
    ///
    /// A book without credited time keeps its previous pace.
    pub fn refresh_book(
        &self,
        snapshot: &mut ProgressSnapshot,
        book_id: &BookId,
        now: TimestampMs,
    ) -> f64 {
        let prev = snapshot.vpm(book_id);
        let Some(sample) = self.book_sample(snapshot, book_id, Some(now)) else {
            return prev;
        };
        let vpm = self.smooth(prev, sample);
        snapshot.vpm_by_book.insert(book_id.clone(), vpm);
        vpm
    }

    /// Pace to display for a book: stored smoothed value, else the live ratio.
    pub fn display_vpm(&self, snapshot: &ProgressSnapshot, book_id: &BookId, now: TimestampMs) -> f64 {
        let stored = snapshot.vpm(book_id);
        if stored > 0.0 {
            return stored;
        }
        self.book_sample(snapshot, book_id, Some(now)).unwrap_or(0.0)
    }

    /// Unsmoothed pace over every stored book in `scope` (`None` = all).
    ///
    /// Falls back to the configured floor when no time has been logged.
    pub fn scope_vpm<M: MetadataProvider + ?Sized>(
        &self,
        snapshot: &ProgressSnapshot,
        metadata: &M,
        scope: Option<Testament>,
    ) -> f64 {
        let (verses, secs) = snapshot
            .books
            .iter()
            .filter(|(id, _)| scope.is_none() || metadata.testament(id) == scope)
            .fold((0u64, 0u64), |(v, t), (_, book)| {
                (v + book.verses_read() as u64, t + book.time_sec)
            });
        ratio(verses, secs).unwrap_or(self.default_vpm)
    }
}

impl Default for PaceEstimator {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
