//! Reading Progress Tracking (Layer 3)
//!
//! Turns reading-session signals into durable progress: credited time,
//! validated verses, percentages, pace, remaining-time estimates and the
//! daily streak.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod session;
pub mod validation;
pub mod streak;
pub mod estimator;
pub mod aggregator;
pub mod engine;
pub mod facade;

pub use config::EngineConfig;
pub use error::{ProgressError, Result};
pub use validation::{next_chapter, NextOutcome};
pub use estimator::{Eta, EtaReport, PaceEstimator};
pub use aggregator::{BookProgress, ProgressReport, Tally};
pub use engine::{LiveTimes, ReadingEngine, SharedEngine};
pub use facade::{encouragement, LabeledBook, ProgressFacade, ReadingAction, TestamentOverview};
