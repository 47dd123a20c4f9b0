//! The single active reading session.

use crate::id::BibleRef;
use crate::time::{elapsed_secs, TimestampMs};
use serde::{Deserialize, Serialize};

/// The chapter currently open, and since when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    /// Chapter being read
    #[serde(rename = "ref")]
    pub reference: BibleRef,

    /// When the session was opened
    pub started_at_ms: TimestampMs,

    /// Highest verse scrolled into view, clamped to `total_verses`
    pub max_verse_seen: u32,

    /// Verse count of the chapter when the session was opened
    pub total_verses: u32,
}

impl ActiveSession {
    /// Open a session on `reference` at `now`.
    pub fn open(reference: BibleRef, total_verses: u32, now: TimestampMs) -> Self {
        Self {
            reference,
            started_at_ms: now,
            max_verse_seen: 0,
            total_verses,
        }
    }

    /// Seconds not yet credited, as of `now`.
    pub fn live_secs(&self, now: TimestampMs) -> u64 {
        elapsed_secs(self.started_at_ms, now)
    }

    /// Raise the high-water mark, clamped to the chapter length.
    pub fn observe_verse(&mut self, verse: u32) {
        self.max_verse_seen = self.max_verse_seen.max(verse.min(self.total_verses));
    }
}
