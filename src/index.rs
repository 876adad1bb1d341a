//! Candidate index over the streaming catalog.
//!
//! Holds exactly one representative per (normalized artist list, normalized
//! title) key: the most popular one. Entries are kept in descending popularity
//! order (stable), so for any set of matching entries the lowest position is
//! the best candidate.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::models::SecondaryRecord;
use crate::normalize::{normalize, normalize_artist_list};

/// Title-only index: normalized title → entry positions, ascending
pub type TitleOnlyIndex = FxHashMap<String, Vec<usize>>;

/// Catalog row with precomputed normalized keys
#[derive(Clone, Debug)]
pub struct IndexedCandidate {
    pub record: SecondaryRecord,
    pub artists_norm: String,
    pub track_name_norm: String,
    pub album_name_norm: String,
}

impl IndexedCandidate {
    fn new(record: SecondaryRecord) -> Self {
        Self {
            artists_norm: normalize_artist_list(record.artists.as_deref()),
            track_name_norm: normalize(record.track_name.as_deref()),
            album_name_norm: normalize(record.album_name.as_deref()),
            record,
        }
    }

    /// The candidate credits the given normalized artist (substring test)
    pub fn credits(&self, artist_norm: &str) -> bool {
        self.artists_norm.contains(artist_norm)
    }
}

/// Read-only lookup structure shared by all matching workers
#[derive(Debug, Default)]
pub struct CandidateIndex {
    entries: Vec<IndexedCandidate>,
    by_title: TitleOnlyIndex,
    verbatim_duplicates: usize,
}

impl CandidateIndex {
    /// Build the index from raw catalog rows.
    ///
    /// 1. Drop verbatim duplicate rows (first occurrence wins) so repeated
    ///    rows cannot bias the popularity ranking.
    /// 2. Stable-sort by popularity, highest first; missing popularity last.
    /// 3. Keep the first entry per (artists_norm, track_name_norm) key.
    pub fn build(records: Vec<SecondaryRecord>) -> Self {
        let total = records.len();
        let mut seen_rows = FxHashSet::default();
        let unique: Vec<SecondaryRecord> = records
            .into_iter()
            .filter(|r| seen_rows.insert(r.row_key()))
            .collect();
        let verbatim_duplicates = total - unique.len();

        let mut candidates: Vec<IndexedCandidate> =
            unique.into_iter().map(IndexedCandidate::new).collect();
        candidates.sort_by(|a, b| b.record.popularity.cmp(&a.record.popularity));

        let mut seen_keys: FxHashSet<(String, String)> = FxHashSet::default();
        let entries: Vec<IndexedCandidate> = candidates
            .into_iter()
            .filter(|c| seen_keys.insert((c.artists_norm.clone(), c.track_name_norm.clone())))
            .collect();

        let mut by_title = TitleOnlyIndex::default();
        for (pos, entry) in entries.iter().enumerate() {
            by_title
                .entry(entry.track_name_norm.clone())
                .or_default()
                .push(pos);
        }

        log::debug!(
            "Candidate index: {} rows, {} verbatim duplicates, {} entries, {} distinct titles",
            total,
            verbatim_duplicates,
            entries.len(),
            by_title.len()
        );

        Self {
            entries,
            by_title,
            verbatim_duplicates,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<&IndexedCandidate> {
        self.entries.get(pos)
    }

    /// All entries in ranking order
    pub fn entries(&self) -> &[IndexedCandidate] {
        &self.entries
    }

    /// Number of verbatim duplicate rows removed while building
    pub fn verbatim_duplicates(&self) -> usize {
        self.verbatim_duplicates
    }

    /// Positions of entries whose normalized title equals `title_norm`, best first
    pub fn with_title(&self, title_norm: &str) -> &[usize] {
        self.by_title
            .get(title_norm)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
