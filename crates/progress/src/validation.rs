//! Verse validation.
//!
//! The only place verses become read. Pressing "next" walks a small state
//! machine:
//!
//! ```text
//! Active → Validating → Completed → Advance (next chapter, next book, or end)
//!                     → Incomplete → Resume (same chapter)
//! ```

use crate::estimator::PaceEstimator;
use crate::session::{pause, switch_to};
use crate::streak::bump_streak;
use lectio_core::{
    ActiveSession, BibleRef, DayBoundary, MetadataProvider, ProgressSnapshot, TimestampMs,
};
use serde::Serialize;
use tracing::{info, warn};

/// Result of a "next" press, for UI feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextOutcome {
    /// Whether the chapter is now fully read
    pub chapter_completed: bool,
    /// Verses validated by this call
    pub validated_count: u32,
}

/// Collaborators a validation step needs besides the snapshot.
pub struct ValidationContext<'a, M: MetadataProvider + ?Sized> {
    /// Book structure
    pub metadata: &'a M,
    /// Pace smoothing
    pub estimator: &'a PaceEstimator,
    /// Calendar day cut for the streak
    pub day_boundary: DayBoundary,
}

/// Where a "next" press currently stands.
#[derive(Debug)]
enum Step {
    Active(ActiveSession),
    Validating { session: ActiveSession },
    Completed { reference: BibleRef, validated: u32 },
    Incomplete { session: ActiveSession, validated: u32 },
    Done(NextOutcome),
}

/// Validate everything seen in the active session and move on.
///
/// No-op when no session is open.
pub fn press_next<M: MetadataProvider + ?Sized>(
    snapshot: &mut ProgressSnapshot,
    ctx: &ValidationContext<'_, M>,
    now: TimestampMs,
) -> NextOutcome {
    let Some(session) = snapshot.active.clone() else {
        return NextOutcome::default();
    };

    let mut step = Step::Active(session);
    loop {
        step = match step {
            Step::Active(session) => credit(snapshot, session, now),
            Step::Validating { session } => validate(snapshot, ctx.metadata, session),
            Step::Completed { reference, validated } => {
                advance(snapshot, ctx, reference, validated, now)
            }
            Step::Incomplete { session, validated } => resume(snapshot, session, validated, now),
            Step::Done(outcome) => return outcome,
        };
    }
}

/// Active → Validating: credit time up to `now`.
fn credit(snapshot: &mut ProgressSnapshot, session: ActiveSession, now: TimestampMs) -> Step {
    pause(snapshot, now);
    Step::Validating { session }
}

/// Validating → Completed | Incomplete: commit the high-water mark.
///
/// The verse count comes from metadata when it knows the chapter, so a
/// session restored after a canon change does not write back a stale total.
fn validate<M: MetadataProvider + ?Sized>(
    snapshot: &mut ProgressSnapshot,
    metadata: &M,
    mut session: ActiveSession,
) -> Step {
    match metadata.total_verses(&session.reference.book_id, session.reference.chapter) {
        0 => {}
        total => session.total_verses = total,
    }

    let reference = &session.reference;
    let chapter = snapshot
        .book_mut(&reference.book_id)
        .touch_chapter(reference.chapter, session.total_verses);
    let validated = chapter.mark_read_through(session.max_verse_seen.min(session.total_verses));

    if validated > 0 {
        info!("Validated {} verse(s) in {}", validated, reference);
    }

    if chapter.is_complete() {
        Step::Completed {
            reference: session.reference,
            validated,
        }
    } else {
        Step::Incomplete { session, validated }
    }
}

/// Completed → Done: streak, pace, then open the following chapter if any.
fn advance<M: MetadataProvider + ?Sized>(
    snapshot: &mut ProgressSnapshot,
    ctx: &ValidationContext<'_, M>,
    reference: BibleRef,
    validated: u32,
    now: TimestampMs,
) -> Step {
    info!("Completed {}", reference);
    record_completion_day(snapshot, ctx.day_boundary, now);
    ctx.estimator.refresh_book(snapshot, &reference.book_id, now);

    match next_chapter(ctx.metadata, &reference) {
        Some(next) => {
            info!("Advancing from {} to {}", reference, next);
            let total = ctx.metadata.total_verses(&next.book_id, next.chapter);
            switch_to(snapshot, next, total, now);
        }
        None => info!("Reached the end of the canon at {}", reference),
    }

    Step::Done(NextOutcome {
        chapter_completed: true,
        validated_count: validated,
    })
}

/// Incomplete → Done: reopen the same chapter so reading continues.
fn resume(
    snapshot: &mut ProgressSnapshot,
    session: ActiveSession,
    validated: u32,
    now: TimestampMs,
) -> Step {
    switch_to(snapshot, session.reference, session.total_verses, now);
    Step::Done(NextOutcome {
        chapter_completed: false,
        validated_count: validated,
    })
}

/// Mark a whole chapter read without advancing.
///
/// Pauses the active session first when it is on that chapter. Returns the
/// number of newly validated verses.
pub fn complete_chapter(
    snapshot: &mut ProgressSnapshot,
    reference: &BibleRef,
    total_verses: u32,
    day_boundary: DayBoundary,
    now: TimestampMs,
) -> u32 {
    if total_verses == 0 {
        warn!("{} has no verses, not marking it read", reference);
        return 0;
    }

    if snapshot.active.as_ref().map(|s| &s.reference) == Some(reference) {
        pause(snapshot, now);
    }

    let validated = snapshot
        .book_mut(&reference.book_id)
        .touch_chapter(reference.chapter, total_verses)
        .mark_read_through(total_verses);

    info!("Marked {} as read ({} new verse(s))", reference, validated);
    record_completion_day(snapshot, day_boundary, now);
    validated
}

fn record_completion_day(snapshot: &mut ProgressSnapshot, boundary: DayBoundary, now: TimestampMs) {
    match boundary.day_of(now) {
        Some(today) => {
            if bump_streak(&mut snapshot.streak, today) {
                info!("Streak is now {} day(s)", snapshot.streak.current);
            }
        }
        None => warn!("Timestamp {} is out of range, streak not updated", now),
    }
}

/// Chapter following `reference` in canonical order.
///
/// Same book `chapter + 1`, else chapter 1 of the next book that has
/// chapters, else `None` at the end of the canon.
pub fn next_chapter<M: MetadataProvider + ?Sized>(
    metadata: &M,
    reference: &BibleRef,
) -> Option<BibleRef> {
    if reference.chapter < metadata.total_chapters(&reference.book_id) {
        return Some(BibleRef::new(reference.book_id.clone(), reference.chapter + 1));
    }

    metadata
        .list_books()
        .into_iter()
        .skip_while(|id| id != &reference.book_id)
        .skip(1)
        .find(|id| metadata.total_chapters(id) > 0)
        .map(|id| BibleRef::new(id, 1))
}
