//! UI-facing adapter keyed by raw book id and chapter number.
//!
//! Pure read/translate layer over [`ReadingEngine`]: it resolves verse counts
//! from metadata, joins display labels and derives UI affordances. It keeps
//! no state of its own.

use crate::aggregator::Tally;
use crate::engine::ReadingEngine;
use crate::validation::NextOutcome;
use lectio_core::{BibleRef, BookId, MetadataProvider, Testament, TimestampMs};
use lectio_storage::KeyValueStore;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// What a book's call-to-action button should say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingAction {
    /// No progress yet
    Commencer,
    /// Book holds the active session
    Continuer,
    /// Book has progress but is not being read right now
    Reprendre,
}

impl ReadingAction {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingAction::Commencer => "commencer",
            ReadingAction::Continuer => "continuer",
            ReadingAction::Reprendre => "reprendre",
        }
    }
}

/// Encouragement shown next to a completion percentage (0-100).
pub fn encouragement(percent: u32) -> &'static str {
    match percent {
        0 => "Commencez votre lecture !",
        1..=24 => "Beau début, continuez !",
        25..=49 => "Un quart du chemin est parcouru !",
        50..=74 => "Déjà la moitié, bravo !",
        75..=99 => "Plus que quelques pas !",
        _ => "Lecture terminée, félicitations !",
    }
}

/// Display label for a testament.
pub fn testament_label(testament: Testament) -> &'static str {
    match testament {
        Testament::Old => "Ancien Testament",
        Testament::New => "Nouveau Testament",
    }
}

/// Whole-number percentage (0-100) of a fraction.
fn to_percent(fraction: f64) -> u32 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Testament progress joined with its label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestamentOverview {
    /// Testament
    pub testament: Testament,
    /// Display label
    pub label: &'static str,
    /// Verse counts
    pub tally: Tally,
    /// Rounded percentage, 0-100
    pub percent: u32,
    /// Encouragement for `percent`
    pub message: &'static str,
}

/// An in-progress book ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledBook {
    /// Book id
    pub book_id: BookId,
    /// Display name, the id when none was supplied
    pub name: String,
    /// Rounded percentage, 0-100
    pub percent: u32,
    /// Finished chapters
    pub chapters_done: u32,
    /// Chapters in the book
    pub total_chapters: u32,
    /// Live reading time
    pub time_sec: u64,
    /// Minutes left, `None` when not yet estimable
    pub eta_min: Option<f64>,
    /// Call to action
    pub action: ReadingAction,
}

/// Typed adapter over the engine for UI call patterns.
pub struct ProgressFacade<M: MetadataProvider, S: KeyValueStore> {
    engine: ReadingEngine<M, S>,
}

impl<M: MetadataProvider, S: KeyValueStore> ProgressFacade<M, S> {
    /// Wrap an engine.
    pub fn new(engine: ReadingEngine<M, S>) -> Self {
        Self { engine }
    }

    /// Underlying engine.
    pub fn engine(&self) -> &ReadingEngine<M, S> {
        &self.engine
    }

    /// Underlying engine, for writes not covered here.
    pub fn engine_mut(&mut self) -> &mut ReadingEngine<M, S> {
        &mut self.engine
    }

    /// Unwrap the engine.
    pub fn into_inner(self) -> ReadingEngine<M, S> {
        self.engine
    }

    /// Verse count of a chapter the canon knows, `None` otherwise.
    fn verse_count(&self, book_id: &BookId, chapter: u32) -> Option<u32> {
        let metadata = self.engine.metadata();
        if chapter == 0 || chapter > metadata.total_chapters(book_id) {
            return None;
        }
        match metadata.total_verses(book_id, chapter) {
            0 => None,
            total => Some(total),
        }
    }

    // === Writes, translated ===

    /// Open a chapter, looking its verse count up in metadata.
    ///
    /// Returns `false` and leaves everything untouched when the canon does
    /// not know the chapter.
    pub fn open_chapter(&mut self, book_id: &str, chapter: u32, now: TimestampMs) -> bool {
        let book_id = BookId::new(book_id);
        let Some(total) = self.verse_count(&book_id, chapter) else {
            warn!("Unknown chapter {} {}, not opening it", book_id, chapter);
            return false;
        };
        self.engine.switch_to(BibleRef::new(book_id, chapter), total, now);
        true
    }

    /// A verse scrolled into view.
    pub fn verse_visible(&mut self, verse: u32) {
        self.engine.scroll_verse(verse);
    }

    /// The user pressed "next".
    pub fn next(&mut self, now: TimestampMs) -> NextOutcome {
        self.engine.press_next(now)
    }

    /// The reading screen lost focus.
    pub fn leave(&mut self, now: TimestampMs) {
        self.engine.pause(now);
    }

    /// Mark a chapter as read. Unknown chapters are ignored.
    pub fn mark_chapter_read(&mut self, book_id: &str, chapter: u32, now: TimestampMs) -> u32 {
        let book_id = BookId::new(book_id);
        let Some(total) = self.verse_count(&book_id, chapter) else {
            warn!("Unknown chapter {} {}, not marking it read", book_id, chapter);
            return 0;
        };
        self.engine
            .complete_chapter(&BibleRef::new(book_id, chapter), total, now)
    }

    // === Reads, translated ===

    /// Rounded whole-canon percentage.
    pub fn global_percent(&self) -> u32 {
        to_percent(self.engine.progress().global.percent)
    }

    /// Rounded percentage for one testament.
    pub fn testament_percent(&self, testament: Testament) -> u32 {
        to_percent(self.engine.progress().testament(testament).percent)
    }

    /// Both testaments with labels and messages, Old first.
    pub fn testament_overviews(&self) -> Vec<TestamentOverview> {
        let report = self.engine.progress();
        [Testament::Old, Testament::New]
            .into_iter()
            .map(|testament| {
                let tally = *report.testament(testament);
                let percent = to_percent(tally.percent);
                TestamentOverview {
                    testament,
                    label: testament_label(testament),
                    tally,
                    percent,
                    message: encouragement(percent),
                }
            })
            .collect()
    }

    /// Call to action for a book.
    pub fn reading_action(&self, book_id: &str) -> ReadingAction {
        if self.engine.active().is_some_and(|r| r.book_id.as_str() == book_id) {
            return ReadingAction::Continuer;
        }
        let started = self
            .engine
            .book_state(&BookId::new(book_id))
            .is_some_and(|b| b.time_sec > 0 || b.chapters.values().any(|c| !c.read.is_empty()));
        if started {
            ReadingAction::Reprendre
        } else {
            ReadingAction::Commencer
        }
    }

    /// In-progress books with display names from `names`.
    pub fn active_books(&self, names: &HashMap<BookId, String>, now: TimestampMs) -> Vec<LabeledBook> {
        self.engine
            .in_progress(now)
            .into_iter()
            .map(|book| LabeledBook {
                name: names
                    .get(&book.book_id)
                    .cloned()
                    .unwrap_or_else(|| book.book_id.to_string()),
                percent: to_percent(book.tally.percent),
                chapters_done: book.chapters_done,
                total_chapters: book.total_chapters,
                time_sec: book.time_sec,
                eta_min: book.eta_min.is_finite().then_some(book.eta_min),
                action: self.reading_action(book.book_id.as_str()),
                book_id: book.book_id,
            })
            .collect()
    }
}
