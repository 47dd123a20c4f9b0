//! Per-chapter and per-book reading state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Durable reading state of a single chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterState {
    /// Verse count as last reported by metadata
    pub total_verses: u32,

    /// Validated verse numbers (1-based)
    #[serde(with = "verse_set")]
    pub read: BTreeSet<u32>,

    /// Credited reading time in seconds
    pub time_sec: u64,
}

impl ChapterState {
    /// Create empty state for a chapter with `total_verses` verses.
    pub fn new(total_verses: u32) -> Self {
        Self {
            total_verses,
            ..Default::default()
        }
    }

    /// Number of read verses that fall within `1..=total`.
    ///
    /// Verses above `total` are kept but never counted.
    pub fn read_within(&self, total: u32) -> u32 {
        if total == 0 {
            return 0;
        }
        self.read.range(1..=total).count() as u32
    }

    /// Number of read verses within the stored verse count.
    pub fn read_count(&self) -> u32 {
        self.read_within(self.total_verses)
    }

    /// Whether every verse of the chapter has been validated.
    ///
    /// A chapter with no known verses is never complete.
    pub fn is_complete(&self) -> bool {
        self.total_verses > 0 && self.read_count() >= self.total_verses
    }

    /// Whether a verse has been validated.
    pub fn is_read(&self, verse: u32) -> bool {
        self.read.contains(&verse)
    }

    /// Mark verses `1..=through` as read. Returns how many were new.
    pub fn mark_read_through(&mut self, through: u32) -> u32 {
        let mut added = 0;
        for verse in 1..=through {
            if self.read.insert(verse) {
                added += 1;
            }
        }
        added
    }
}

/// Durable reading state of a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookState {
    /// Credited reading time across all chapters, in seconds
    pub time_sec: u64,

    /// Chapter states keyed by chapter number
    pub chapters: BTreeMap<u32, ChapterState>,
}

impl BookState {
    /// Get a chapter, if it has ever been touched.
    pub fn chapter(&self, chapter: u32) -> Option<&ChapterState> {
        self.chapters.get(&chapter)
    }

    /// Get a chapter for writing, creating it when absent.
    ///
    /// The stored verse count is always refreshed to `total_verses`.
    pub fn touch_chapter(&mut self, chapter: u32, total_verses: u32) -> &mut ChapterState {
        let state = self
            .chapters
            .entry(chapter)
            .or_insert_with(|| ChapterState::new(total_verses));
        state.total_verses = total_verses;
        state
    }

    /// Total validated verses, counting each chapter against its own verse count.
    pub fn verses_read(&self) -> u32 {
        self.chapters.values().map(ChapterState::read_count).sum()
    }
}

/// Serde adapter for the sparse verse set.
///
/// Written as `{ "<verse>": true }`. Reading also accepts a plain array of
/// verse numbers; entries mapped to `false` or with non-numeric keys are dropped.
mod verse_set {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::{BTreeMap, BTreeSet};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Map(BTreeMap<String, bool>),
        List(Vec<u32>),
    }

    pub fn serialize<S: Serializer>(set: &BTreeSet<u32>, serializer: S) -> Result<S::Ok, S::Error> {
        let map: BTreeMap<u32, bool> = set.iter().map(|v| (*v, true)).collect();
        map.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<u32>, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Map(map) => map
                .into_iter()
                .filter(|(_, read)| *read)
                .filter_map(|(k, _)| k.parse().ok())
                .collect(),
            Repr::List(list) => list.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_read_through_counts_only_new_verses() {
        let mut ch = ChapterState::new(5);
        assert_eq!(ch.mark_read_through(3), 3);
        assert_eq!(ch.mark_read_through(5), 2);
        assert_eq!(ch.mark_read_through(4), 0);
        assert!(ch.is_complete());
    }

    #[test]
    fn test_chapter_without_verses_is_never_complete() {
        let mut ch = ChapterState::new(0);
        assert_eq!(ch.mark_read_through(0), 0);
        assert!(!ch.is_complete());
    }

    #[test]
    fn test_zero_through_is_noop() {
        let mut ch = ChapterState::new(5);
        assert_eq!(ch.mark_read_through(0), 0);
        assert!(ch.read.is_empty());
    }

    #[test]
    fn test_stale_verses_above_total_are_inert() {
        let mut ch = ChapterState::new(10);
        ch.mark_read_through(10);
        ch.total_verses = 8;

        // Not pruned, but not counted either.
        assert!(ch.is_read(10));
        assert_eq!(ch.read.len(), 10);
        assert_eq!(ch.read_count(), 8);
        assert!(ch.is_complete());
    }

    #[test]
    fn test_touch_chapter_refreshes_total() {
        let mut book = BookState::default();
        book.touch_chapter(1, 5).mark_read_through(2);
        let ch = book.touch_chapter(1, 7);
        assert_eq!(ch.total_verses, 7);
        assert_eq!(ch.read_count(), 2);
    }

    #[test]
    fn test_read_set_wire_format() {
        let mut ch = ChapterState::new(3);
        ch.mark_read_through(2);
        ch.time_sec = 42;

        let json = serde_json::to_value(&ch).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "totalVerses": 3,
                "read": {"1": true, "2": true},
                "timeSec": 42
            })
        );
    }

    #[test]
    fn test_read_set_accepts_list_and_drops_false() {
        let from_list: ChapterState =
            serde_json::from_str(r#"{"totalVerses":3,"read":[1,3],"timeSec":0}"#).unwrap();
        assert_eq!(from_list.read, BTreeSet::from([1, 3]));

        let from_map: ChapterState = serde_json::from_str(
            r#"{"totalVerses":3,"read":{"1":true,"2":false,"x":true},"timeSec":0}"#,
        )
        .unwrap();
        assert_eq!(from_map.read, BTreeSet::from([1]));
    }
}
