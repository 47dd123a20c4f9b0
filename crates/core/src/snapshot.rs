//! The persisted root of all reading progress.

use crate::chapter::{BookState, ChapterState};
use crate::id::{BibleRef, BookId};
use crate::session::ActiveSession;
use crate::streak::StreakState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version written by this crate.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Entire durable progress state. Everything else is derived on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// Schema version
    pub version: u32,

    /// Per-book state, keyed by book id
    pub books: BTreeMap<BookId, BookState>,

    /// Daily streak
    pub streak: StreakState,

    /// Open session, if any
    pub active: Option<ActiveSession>,

    /// Smoothed verses-per-minute per book
    pub vpm_by_book: BTreeMap<BookId, f64>,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            books: BTreeMap::new(),
            streak: StreakState::default(),
            active: None,
            vpm_by_book: BTreeMap::new(),
        }
    }
}

impl ProgressSnapshot {
    /// Whether this snapshot was written with the current schema.
    pub fn is_current_version(&self) -> bool {
        self.version == SNAPSHOT_VERSION
    }

    /// Book state, if the book has ever been touched.
    pub fn book(&self, book_id: &BookId) -> Option<&BookState> {
        self.books.get(book_id)
    }

    /// Book state for writing, created on first touch.
    pub fn book_mut(&mut self, book_id: &BookId) -> &mut BookState {
        self.books.entry(book_id.clone()).or_default()
    }

    /// Chapter state, if the chapter has ever been touched.
    pub fn chapter(&self, reference: &BibleRef) -> Option<&ChapterState> {
        self.book(&reference.book_id)?.chapter(reference.chapter)
    }

    /// Stored smoothed pace for a book, 0 when never measured.
    pub fn vpm(&self, book_id: &BookId) -> f64 {
        self.vpm_by_book.get(book_id).copied().unwrap_or(0.0)
    }
}
