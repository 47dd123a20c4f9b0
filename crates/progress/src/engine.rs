//! The reading engine - single owner of the progress snapshot.
//!
//! All mutations are synchronous and take `&mut self`, so the borrow checker
//! enforces one writer. Hosts that share the engine across tasks wrap it in
//! [`SharedEngine`]. Persistence is explicit: mutate freely, then call
//! [`ReadingEngine::persist`] at natural checkpoints.

use crate::aggregator::{self, BookProgress, ProgressReport};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::estimator::{EtaReport, PaceEstimator};
use crate::session;
use crate::validation::{self, NextOutcome, ValidationContext};
use lectio_core::{
    BibleRef, BookId, BookState, ChapterState, MetadataProvider, ProgressSnapshot, StreakState,
    TimestampMs,
};
use lectio_storage::KeyValueStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Engine shared between tasks; lock for every call.
pub type SharedEngine<M, S> = Arc<tokio::sync::Mutex<ReadingEngine<M, S>>>;

/// Time of the active chapter and book, including the uncredited live delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveTimes {
    /// Chapter being read, if any
    pub active: Option<BibleRef>,
    /// Seconds since the session was opened
    pub session_sec: u64,
    /// Credited chapter time plus `session_sec`
    pub chapter_sec: u64,
    /// Credited book time plus `session_sec`
    pub book_sec: u64,
}

/// Reading-progress engine.
pub struct ReadingEngine<M: MetadataProvider, S: KeyValueStore> {
    metadata: M,
    store: S,
    config: EngineConfig,
    estimator: PaceEstimator,
    snapshot: ProgressSnapshot,
}

impl<M: MetadataProvider, S: KeyValueStore> ReadingEngine<M, S> {
    /// Create an engine with a fresh, empty snapshot.
    ///
    /// Call [`load`](Self::load) to pick up previously persisted progress.
    pub fn new(metadata: M, store: S) -> Self {
        let config = EngineConfig::default();
        Self {
            estimator: PaceEstimator::from_config(&config),
            metadata,
            store,
            config,
            snapshot: ProgressSnapshot::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.estimator = PaceEstimator::from_config(&config);
        self.config = config;
        self
    }

    /// Wrap the engine for shared use.
    pub fn into_shared(self) -> SharedEngine<M, S> {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    /// Metadata the engine reads book structure from.
    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // === Persistence ===

    /// Replace in-memory state with the persisted snapshot.
    ///
    /// Never fails: missing data, unreadable storage, malformed JSON and
    /// version mismatches all leave a fresh snapshot.
    pub async fn load(&mut self) {
        self.snapshot = match self.store.get_item(&self.config.storage_key).await {
            Ok(Some(raw)) => decode(&raw),
            Ok(None) => {
                debug!("No stored progress under {}", self.config.storage_key);
                ProgressSnapshot::default()
            }
            Err(e) => {
                warn!("Failed to read stored progress, starting fresh: {}", e);
                ProgressSnapshot::default()
            }
        };
    }

    /// Write the snapshot to storage.
    pub async fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.snapshot)?;
        self.store.set_item(&self.config.storage_key, &json).await?;
        debug!("Persisted progress ({} bytes)", json.len());
        Ok(())
    }

    /// Reset and erase the stored snapshot.
    pub async fn purge(&mut self) -> Result<()> {
        self.reset();
        self.store.remove_item(&self.config.storage_key).await?;
        info!("Erased stored progress");
        Ok(())
    }

    /// Start over with an empty snapshot. Not persisted until `persist`.
    pub fn reset(&mut self) {
        self.snapshot = ProgressSnapshot::default();
        info!("Progress reset");
    }

    // === Session ===

    /// Open `reference`, crediting and closing any previous session.
    pub fn switch_to(&mut self, reference: BibleRef, total_verses: u32, now: TimestampMs) {
        session::switch_to(&mut self.snapshot, reference, total_verses, now);
    }

    /// Close the active session, crediting its time. No-op without one.
    pub fn pause(&mut self, now: TimestampMs) {
        session::pause(&mut self.snapshot, now);
    }

    /// Record the furthest verse scrolled into view. No-op without a session.
    pub fn scroll_verse(&mut self, verse: u32) {
        session::scroll_verse(&mut self.snapshot, verse);
    }

    // === Validation ===

    /// Validate seen verses; advance on completion, else resume.
    pub fn press_next(&mut self, now: TimestampMs) -> NextOutcome {
        let ctx = ValidationContext {
            metadata: &self.metadata,
            estimator: &self.estimator,
            day_boundary: self.config.day_boundary,
        };
        validation::press_next(&mut self.snapshot, &ctx, now)
    }

    /// Force a chapter complete without advancing.
    pub fn complete_chapter(&mut self, reference: &BibleRef, total_verses: u32, now: TimestampMs) -> u32 {
        validation::complete_chapter(
            &mut self.snapshot,
            reference,
            total_verses,
            self.config.day_boundary,
            now,
        )
    }

    // === Reads ===

    /// Times of the active chapter and book, live.
    pub fn live_times(&self, now: TimestampMs) -> LiveTimes {
        let Some(active) = self.snapshot.active.as_ref() else {
            return LiveTimes::default();
        };
        let session_sec = active.live_secs(now);
        let reference = &active.reference;
        let chapter = self.snapshot.chapter(reference).map_or(0, |c| c.time_sec);
        let book = self.snapshot.book(&reference.book_id).map_or(0, |b| b.time_sec);

        LiveTimes {
            active: Some(reference.clone()),
            session_sec,
            chapter_sec: chapter + session_sec,
            book_sec: book + session_sec,
        }
    }

    /// Live time for any book.
    pub fn book_live_secs(&self, book_id: &BookId, now: TimestampMs) -> u64 {
        aggregator::book_live_secs(&self.snapshot, book_id, now)
    }

    /// Read/total verses globally and per testament.
    pub fn progress(&self) -> ProgressReport {
        aggregator::progress(&self.snapshot, &self.metadata)
    }

    /// Books started but not finished.
    pub fn in_progress(&self, now: TimestampMs) -> Vec<BookProgress> {
        aggregator::in_progress(&self.snapshot, &self.metadata, &self.estimator, now)
    }

    /// Remaining-time estimates.
    pub fn eta(&self) -> EtaReport {
        aggregator::eta(&self.snapshot, &self.metadata, &self.estimator)
    }

    /// Current streak.
    pub fn streak(&self) -> StreakState {
        self.snapshot.streak.clone()
    }

    /// Deep copy of the full state.
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot.clone()
    }

    /// Active chapter, if any.
    pub fn active(&self) -> Option<&BibleRef> {
        self.snapshot.active.as_ref().map(|s| &s.reference)
    }

    /// Copy of one chapter's state.
    pub fn chapter_state(&self, reference: &BibleRef) -> Option<ChapterState> {
        self.snapshot.chapter(reference).cloned()
    }

    /// Copy of one book's state.
    pub fn book_state(&self, book_id: &BookId) -> Option<BookState> {
        self.snapshot.book(book_id).cloned()
    }
}

fn decode(raw: &str) -> ProgressSnapshot {
    match serde_json::from_str::<ProgressSnapshot>(raw) {
        Ok(snapshot) if snapshot.is_current_version() => {
            debug!("Loaded progress for {} book(s)", snapshot.books.len());
            snapshot
        }
        Ok(snapshot) => {
            warn!("Stored progress has version {}, starting fresh", snapshot.version);
            ProgressSnapshot::default()
        }
        Err(e) => {
            warn!("Stored progress is unreadable, starting fresh: {}", e);
            ProgressSnapshot::default()
        }
    }
}
