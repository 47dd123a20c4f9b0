//! Session management.
//!
//! Owns the single active session inside a [`ProgressSnapshot`]. Time is
//! credited only here, and only from two timestamps: the session start and
//! the instant it is paused. Nothing ticks in the background, so a host that
//! is suspended for hours still credits the true wall-clock span on resume.

use lectio_core::{ActiveSession, BibleRef, ProgressSnapshot, TimestampMs};
use tracing::debug;

/// Close the active session, if any, crediting its elapsed time.
///
/// Returns the seconds credited, or `None` when no session was open.
pub fn pause(snapshot: &mut ProgressSnapshot, now: TimestampMs) -> Option<u64> {
    let session = snapshot.active.take()?;
    let elapsed = session.live_secs(now);
    let reference = &session.reference;

    let book = snapshot.book_mut(&reference.book_id);
    book.time_sec += elapsed;
    book.touch_chapter(reference.chapter, session.total_verses).time_sec += elapsed;

    debug!("Paused {} after {}s", reference, elapsed);
    Some(elapsed)
}

/// Make `reference` the active chapter, closing any previous session first.
pub fn switch_to(
    snapshot: &mut ProgressSnapshot,
    reference: BibleRef,
    total_verses: u32,
    now: TimestampMs,
) {
    pause(snapshot, now);

    snapshot
        .book_mut(&reference.book_id)
        .touch_chapter(reference.chapter, total_verses);

    debug!("Opened session on {} ({} verses)", reference, total_verses);
    snapshot.active = Some(ActiveSession::open(reference, total_verses, now));
}

/// Raise the active session's high-water mark. No-op without a session.
pub fn scroll_verse(snapshot: &mut ProgressSnapshot, verse: u32) {
    if let Some(session) = snapshot.active.as_mut() {
        session.observe_verse(verse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gen(ch: u32) -> BibleRef {
        BibleRef::new("GEN", ch)
    }

    fn credited(snapshot: &ProgressSnapshot, r: &BibleRef) -> u64 {
        snapshot.chapter(r).map_or(0, |c| c.time_sec)
    }

    #[test]
    fn test_pause_without_session_is_noop() {
        let mut snap = ProgressSnapshot::default();
        assert_eq!(pause(&mut snap, 10_000), None);
        assert!(snap.books.is_empty());
    }

    #[test]
    fn test_switch_credits_previous_session() {
        let mut snap = ProgressSnapshot::default();
        switch_to(&mut snap, gen(1), 31, 0);
        switch_to(&mut snap, gen(2), 25, 90_500);

        assert_eq!(credited(&snap, &gen(1)), 90);
        assert_eq!(credited(&snap, &gen(2)), 0);
        assert_eq!(snap.book(&"GEN".into()).unwrap().time_sec, 90);

        let active = snap.active.as_ref().unwrap();
        assert_eq!(active.reference, gen(2));
        assert_eq!(active.started_at_ms, 90_500);
        assert_eq!(active.max_verse_seen, 0);
    }

    #[test]
    fn test_time_conservation_across_switches() {
        let mut snap = ProgressSnapshot::default();
        let stops = [
            (gen(1), 0),
            (gen(2), 30_000),
            (BibleRef::new("EXO", 1), 95_000),
            (gen(1), 200_000),
            (gen(2), 260_000),
        ];
        for (r, at) in stops.iter().cloned() {
            switch_to(&mut snap, r, 10, at);
        }
        pause(&mut snap, 400_000);

        let total: u64 = snap
            .books
            .values()
            .flat_map(|b| b.chapters.values())
            .map(|c| c.time_sec)
            .sum();
        let books: u64 = snap.books.values().map(|b| b.time_sec).sum();
        assert_eq!(total, 400);
        assert_eq!(books, 400);
        assert_eq!(credited(&snap, &gen(1)), 30 + 60);
        assert_eq!(credited(&snap, &gen(2)), 65 + 140);
        assert!(snap.active.is_none());
    }

    #[test]
    fn test_switch_to_same_chapter_restarts_clock() {
        let mut snap = ProgressSnapshot::default();
        switch_to(&mut snap, gen(1), 31, 0);
        scroll_verse(&mut snap, 10);
        switch_to(&mut snap, gen(1), 31, 5_000);

        assert_eq!(credited(&snap, &gen(1)), 5);
        let active = snap.active.as_ref().unwrap();
        assert_eq!(active.started_at_ms, 5_000);
        assert_eq!(active.max_verse_seen, 0);
    }

    #[test]
    fn test_switch_refreshes_total_verses() {
        let mut snap = ProgressSnapshot::default();
        switch_to(&mut snap, gen(1), 31, 0);
        switch_to(&mut snap, gen(1), 30, 0);
        assert_eq!(snap.chapter(&gen(1)).unwrap().total_verses, 30);
    }

    #[test]
    fn test_scroll_without_session_is_noop() {
        let mut snap = ProgressSnapshot::default();
        scroll_verse(&mut snap, 4);
        assert!(snap.active.is_none());
    }

    #[test]
    fn test_scroll_does_not_mark_read() {
        let mut snap = ProgressSnapshot::default();
        switch_to(&mut snap, gen(1), 5, 0);
        scroll_verse(&mut snap, 50);

        assert_eq!(snap.active.as_ref().unwrap().max_verse_seen, 5);
        assert!(snap.chapter(&gen(1)).unwrap().read.is_empty());
    }

    #[test]
    fn test_backwards_clock_credits_nothing() {
        let mut snap = ProgressSnapshot::default();
        switch_to(&mut snap, gen(1), 5, 10_000);
        assert_eq!(pause(&mut snap, 2_000), Some(0));
        assert_eq!(credited(&snap, &gen(1)), 0);
    }
}
