//! Merge & filter stage.
//!
//! Joins ledger rows with their matched catalog attributes, fills gaps
//! (numbers → 0, text → ""), truncates long text and keeps only rows that
//! received a genuine catalog match.

use crate::config::PipelineConfig;
use crate::index::CandidateIndex;
use crate::models::{
    MatchQuality, MatchResult, MergedRecord, NormalizedPrimary, PrimaryRecord, SecondaryRecord,
};

/// Rows surviving the completeness filter plus the counts behind the ratio
#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub records: Vec<MergedRecord>,
    pub total: usize,
    pub retained: usize,
}

impl MergeOutcome {
    /// Retained share of merged rows (0.0 to 1.0)
    pub fn retention_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.retained as f64 / self.total as f64
        }
    }
}

/// Truncate to at most `max_chars` characters (never splits a code point)
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_pos, _)) => text[..byte_pos].to_string(),
        None => text.to_string(),
    }
}

/// Finite numbers only; NaN and infinities count as malformed
fn float_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Combine one ledger row with its candidate (if any) into a gap-free record.
pub fn merge_record(
    primary: &PrimaryRecord,
    candidate: Option<&SecondaryRecord>,
    quality: MatchQuality,
    max_text_len: usize,
) -> MergedRecord {
    let text = |v: Option<&str>| truncate_text(v.unwrap_or(""), max_text_len);
    let empty = SecondaryRecord::default();
    let s = candidate.unwrap_or(&empty);

    MergedRecord {
        year: primary.year.unwrap_or(0),
        title: text(primary.title.as_deref()),
        category: text(primary.category.as_deref()),
        nominee: text(primary.nominee.as_deref()),
        artist: text(Some(primary.artist_or_default())),
        winner: primary.winner,

        artists: text(s.artists.as_deref()),
        album_name: text(s.album_name.as_deref()),
        track_name: text(s.track_name.as_deref()),
        popularity: s.popularity.unwrap_or(0),
        duration_ms: s.duration_ms.unwrap_or(0),
        explicit: s.explicit,
        danceability: float_or_zero(s.danceability),
        energy: float_or_zero(s.energy),
        key: s.key.unwrap_or(0),
        loudness: float_or_zero(s.loudness),
        mode: s.mode.unwrap_or(0),
        speechiness: float_or_zero(s.speechiness),
        acousticness: float_or_zero(s.acousticness),
        instrumentalness: float_or_zero(s.instrumentalness),
        liveness: float_or_zero(s.liveness),
        valence: float_or_zero(s.valence),
        tempo: float_or_zero(s.tempo),
        time_signature: s.time_signature.unwrap_or(0),
        track_genre: text(s.track_genre.as_deref()),

        match_quality: if candidate.is_some() {
            quality
        } else {
            MatchQuality::None
        },
    }
}

/// Merge matched song-level rows (in order) followed by the bypassed rows,
/// then apply the completeness filter.
///
/// `matches[i]` belongs to `song_level[i]`.
pub fn merge_and_filter(
    song_level: &[NormalizedPrimary],
    matches: &[MatchResult],
    other: &[NormalizedPrimary],
    index: &CandidateIndex,
    config: &PipelineConfig,
) -> MergeOutcome {
    debug_assert_eq!(song_level.len(), matches.len());

    let matched = song_level.iter().zip(matches).map(|(p, m)| {
        let candidate = m.candidate.and_then(|pos| index.get(pos)).map(|c| &c.record);
        merge_record(&p.record, candidate, m.quality, config.max_text_len)
    });
    let bypassed = other
        .iter()
        .map(|p| merge_record(&p.record, None, MatchQuality::None, config.max_text_len));

    let merged: Vec<MergedRecord> = matched.chain(bypassed).collect();
    let total = merged.len();
    let records: Vec<MergedRecord> = merged.into_iter().filter(MergedRecord::is_complete).collect();
    let outcome = MergeOutcome {
        retained: records.len(),
        records,
        total,
    };

    log::info!(
        "Completeness filter: retained {}/{} rows ({:.1}%)",
        outcome.retained,
        outcome.total,
        100.0 * outcome.retention_ratio()
    );
    outcome
}
