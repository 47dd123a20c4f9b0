//! Progress aggregation.
//!
//! Walks the metadata canon against stored chapter state. Totals always come
//! from metadata, so a canon change is reflected on the next read.

use crate::estimator::{minutes_left, Eta, EtaReport, PaceEstimator};
use lectio_core::{BookId, BookState, MetadataProvider, ProgressSnapshot, Testament, TimestampMs};
use serde::Serialize;

/// Read and total verse counts for one scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Tally {
    /// Validated verses
    pub read: u64,
    /// Verses in scope
    pub total: u64,
    /// `read / total`, 0 for an empty scope
    pub percent: f64,
}

impl Tally {
    fn add(&mut self, read: u64, total: u64) {
        self.read += read;
        self.total += total;
    }

    fn finish(mut self) -> Self {
        self.percent = if self.total == 0 {
            0.0
        } else {
            self.read as f64 / self.total as f64
        };
        self
    }

    /// Verses not yet validated.
    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.read)
    }
}

/// Progress for the whole canon and each testament.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    /// Whole canon
    pub global: Tally,
    /// Old Testament
    pub old_testament: Tally,
    /// New Testament
    pub new_testament: Tally,
}

impl ProgressReport {
    /// Tally for one testament.
    pub fn testament(&self, testament: Testament) -> &Tally {
        match testament {
            Testament::Old => &self.old_testament,
            Testament::New => &self.new_testament,
        }
    }
}

/// Progress of one book that has been started but not finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookProgress {
    /// Book id
    pub book_id: BookId,
    /// Testament, when metadata knows the book
    pub testament: Option<Testament>,
    /// Credited time plus the live delta of an active session in this book
    pub time_sec: u64,
    /// Verse counts
    pub tally: Tally,
    /// Chapters with every verse validated
    pub chapters_done: u32,
    /// Chapters in the book
    pub total_chapters: u32,
    /// Pace used for the estimate
    pub vpm: f64,
    /// Minutes left at `vpm`; infinite when the pace is 0
    pub eta_min: f64,
}

/// Count read/total verses and finished chapters of a book against metadata.
pub fn book_tally<M: MetadataProvider + ?Sized>(
    metadata: &M,
    book_id: &BookId,
    state: Option<&BookState>,
) -> (Tally, u32) {
    let mut tally = Tally::default();
    let mut done = 0;
    for chapter in 1..=metadata.total_chapters(book_id) {
        let total = metadata.total_verses(book_id, chapter);
        let read = state
            .and_then(|b| b.chapter(chapter))
            .map_or(0, |c| c.read_within(total));
        tally.add(read as u64, total as u64);
        if total > 0 && read >= total {
            done += 1;
        }
    }
    (tally.finish(), done)
}

/// Read/total counts globally and per testament.
pub fn progress<M: MetadataProvider + ?Sized>(
    snapshot: &ProgressSnapshot,
    metadata: &M,
) -> ProgressReport {
    let mut report = ProgressReport::default();
    for book_id in metadata.list_books() {
        let (tally, _) = book_tally(metadata, &book_id, snapshot.book(&book_id));
        report.global.add(tally.read, tally.total);
        match metadata.testament(&book_id) {
            Some(Testament::Old) => report.old_testament.add(tally.read, tally.total),
            Some(Testament::New) => report.new_testament.add(tally.read, tally.total),
            None => {}
        }
    }
    ProgressReport {
        global: report.global.finish(),
        old_testament: report.old_testament.finish(),
        new_testament: report.new_testament.finish(),
    }
}

/// Credited seconds for a book, plus the live delta if it holds the session.
pub fn book_live_secs(snapshot: &ProgressSnapshot, book_id: &BookId, now: TimestampMs) -> u64 {
    let credited = snapshot.book(book_id).map_or(0, |b| b.time_sec);
    let live = snapshot
        .active
        .as_ref()
        .filter(|s| &s.reference.book_id == book_id)
        .map_or(0, |s| s.live_secs(now));
    credited + live
}

/// Books strictly between 0% and 100%, in canonical order.
pub fn in_progress<M: MetadataProvider + ?Sized>(
    snapshot: &ProgressSnapshot,
    metadata: &M,
    estimator: &PaceEstimator,
    now: TimestampMs,
) -> Vec<BookProgress> {
    metadata
        .list_books()
        .into_iter()
        .filter_map(|book_id| {
            let state = snapshot.book(&book_id)?;
            let (tally, chapters_done) = book_tally(metadata, &book_id, Some(state));
            if !(tally.percent > 0.0 && tally.percent < 1.0) {
                return None;
            }
            let vpm = estimator.display_vpm(snapshot, &book_id, now);
            Some(BookProgress {
                testament: metadata.testament(&book_id),
                time_sec: book_live_secs(snapshot, &book_id, now),
                total_chapters: metadata.total_chapters(&book_id),
                eta_min: minutes_left(tally.remaining(), vpm),
                tally,
                chapters_done,
                vpm,
                book_id,
            })
        })
        .collect()
}

/// Remaining-time estimates using unsmoothed scope pace.
pub fn eta<M: MetadataProvider + ?Sized>(
    snapshot: &ProgressSnapshot,
    metadata: &M,
    estimator: &PaceEstimator,
) -> EtaReport {
    let report = progress(snapshot, metadata);
    let scope = |tally: &Tally, testament: Option<Testament>| {
        Eta::new(tally.remaining(), estimator.scope_vpm(snapshot, metadata, testament))
    };
    EtaReport {
        global: scope(&report.global, None),
        old_testament: scope(&report.old_testament, Some(Testament::Old)),
        new_testament: scope(&report.new_testament, Some(Testament::New)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectio_core::{ActiveSession, BibleRef, BookInfo, CanonMetadata};

    fn canon() -> CanonMetadata {
        CanonMetadata::new(vec![
            BookInfo::new("GEN", Testament::Old, vec![5, 5, 5]),
            BookInfo::new("EXO", Testament::Old, vec![10]),
            BookInfo::new("MAT", Testament::New, vec![4, 6]),
        ])
        .unwrap()
    }

    fn read(snap: &mut ProgressSnapshot, book: &str, chapter: u32, total: u32, through: u32) {
        snap.book_mut(&book.into())
            .touch_chapter(chapter, total)
            .mark_read_through(through);
    }

    #[test]
    fn test_empty_progress() {
        let report = progress(&ProgressSnapshot::default(), &canon());
        assert_eq!(report.global.read, 0);
        assert_eq!(report.global.total, 35);
        assert_eq!(report.old_testament.total, 25);
        assert_eq!(report.new_testament.total, 10);
        assert_eq!(report.global.percent, 0.0);
    }

    #[test]
    fn test_empty_canon_percent_is_zero() {
        let meta = CanonMetadata::default();
        let report = progress(&ProgressSnapshot::default(), &meta);
        assert_eq!(report.global, Tally::default());
    }

    #[test]
    fn test_progress_per_testament() {
        let mut snap = ProgressSnapshot::default();
        read(&mut snap, "GEN", 1, 5, 5);
        read(&mut snap, "MAT", 2, 6, 3);

        let report = progress(&snap, &canon());
        assert_eq!(report.old_testament.read, 5);
        assert_eq!(report.old_testament.percent, 0.2);
        assert_eq!(report.new_testament.read, 3);
        assert_eq!(report.new_testament.percent, 0.3);
        assert_eq!(report.global.read, 8);
        assert_eq!(report.testament(Testament::New).read, 3);
    }

    #[test]
    fn test_stale_verses_beyond_metadata_are_not_counted() {
        // Stored chapter thinks it has 8 verses; metadata now says 5.
        let mut snap = ProgressSnapshot::default();
        read(&mut snap, "GEN", 1, 8, 8);

        let report = progress(&snap, &canon());
        assert_eq!(report.old_testament.read, 5);
        assert_eq!(snap.chapter(&BibleRef::new("GEN", 1)).unwrap().read.len(), 8);
    }

    #[test]
    fn test_in_progress_excludes_untouched_and_finished() {
        let mut snap = ProgressSnapshot::default();
        read(&mut snap, "GEN", 1, 5, 5);
        read(&mut snap, "EXO", 1, 10, 10);
        snap.book_mut(&"MAT".into()).touch_chapter(1, 4);

        let books = in_progress(&snap, &canon(), &PaceEstimator::default(), 0);
        assert_eq!(books.len(), 1);
        let gen = &books[0];
        assert_eq!(gen.book_id, BookId::new("GEN"));
        assert_eq!(gen.chapters_done, 1);
        assert_eq!(gen.total_chapters, 3);
        assert_eq!(gen.tally.remaining(), 10);
        assert!(gen.eta_min.is_infinite());
    }

    #[test]
    fn test_in_progress_uses_live_time() {
        let mut snap = ProgressSnapshot::default();
        read(&mut snap, "GEN", 1, 5, 5);
        snap.book_mut(&"GEN".into()).time_sec = 30;
        snap.active = Some(ActiveSession::open(BibleRef::new("GEN", 2), 5, 0));

        let books = in_progress(&snap, &canon(), &PaceEstimator::default(), 30_000);
        let gen = &books[0];
        assert_eq!(gen.time_sec, 60);
        assert_eq!(gen.vpm, 5.0);
        assert_eq!(gen.eta_min, 2.0);
    }

    #[test]
    fn test_in_progress_prefers_stored_pace() {
        let mut snap = ProgressSnapshot::default();
        read(&mut snap, "GEN", 1, 5, 5);
        snap.book_mut(&"GEN".into()).time_sec = 60;
        snap.vpm_by_book.insert("GEN".into(), 2.0);

        let books = in_progress(&snap, &canon(), &PaceEstimator::default(), 0);
        assert_eq!(books[0].vpm, 2.0);
        assert_eq!(books[0].eta_min, 5.0);
    }

    #[test]
    fn test_eta_defaults_to_floor_pace() {
        let report = eta(&ProgressSnapshot::default(), &canon(), &PaceEstimator::default());
        assert_eq!(report.global.vpm, 1.0);
        assert_eq!(report.global.minutes, 35.0);
        assert_eq!(report.new_testament.minutes, 10.0);
    }

    #[test]
    fn test_eta_infinite_when_time_but_no_verses() {
        let mut snap = ProgressSnapshot::default();
        snap.book_mut(&"MAT".into()).time_sec = 120;

        let report = eta(&snap, &canon(), &PaceEstimator::default());
        assert!(report.new_testament.minutes.is_infinite());
        assert!(report.global.minutes.is_infinite());
        assert_eq!(report.old_testament.minutes, 25.0);
    }
}
