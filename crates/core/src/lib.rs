//! Lectio core data models.
//!
//! This crate defines the durable reading-progress state, the reference
//! types that address a chapter, and the metadata contract the engine reads
//! book structure through.

#![warn(missing_docs)]

// Identities
mod id;

// Durable state
mod chapter;
mod streak;
mod session;
mod snapshot;

// Collaborators
mod metadata;
mod time;

// Re-exports
pub use id::{BibleRef, BookId};

pub use chapter::{BookState, ChapterState};
pub use streak::StreakState;
pub use session::ActiveSession;
pub use snapshot::{ProgressSnapshot, SNAPSHOT_VERSION};

pub use metadata::{BookInfo, CanonMetadata, MetadataError, MetadataProvider, Testament};
pub use time::{elapsed_secs, DayBoundary, TimestampMs};
