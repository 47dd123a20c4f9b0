//! Daily reading streak state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Consecutive-day reading streak.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    /// Length of the current run of days
    pub current: u32,

    /// Longest run ever reached
    pub best: u32,

    /// Last calendar day on which a chapter was completed
    #[serde(rename = "lastReadDayISO")]
    pub last_read_day: Option<NaiveDate>,
}
