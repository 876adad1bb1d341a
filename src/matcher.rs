//! Record matcher: links awards ledger rows to catalog entries.
//!
//! Two phases per record, first hit wins:
//! - Phase 1 (exact): artist contained in the candidate's artist list, title equal
//! - Phase 2 (partial): artist contained, candidate title contains the ledger
//!   title cut at its first parenthesis
//!
//! Within a phase the most popular candidate wins. `match_one` is pure, so
//! `match_all` fans it out over rayon and collects in input order.

use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::index::CandidateIndex;
use crate::models::{MatchQuality, MatchResult, NormalizedPrimary, PrimaryRecord};
use crate::normalize::{normalize, title_stem};
use crate::progress::ProgressMode;

/// Precompute the normalized keys of a ledger row
pub fn normalize_primary(record: PrimaryRecord) -> NormalizedPrimary {
    NormalizedPrimary {
        category_norm: normalize(record.category.as_deref()),
        nominee_norm: normalize(record.nominee.as_deref()),
        artist_norm: normalize(Some(record.artist_or_default())),
        record,
    }
}

/// Split ledger rows into (song-level, other), each in input order.
/// Only song-level rows go through matching.
pub fn partition_song_level(
    records: Vec<NormalizedPrimary>,
    config: &PipelineConfig,
) -> (Vec<NormalizedPrimary>, Vec<NormalizedPrimary>) {
    records
        .into_iter()
        .partition(|r| config.is_song_level(&r.category_norm))
}

/// Find the best candidate for one ledger row.
/// Absence of a match is a normal outcome, not an error.
pub fn match_one(primary: &NormalizedPrimary, index: &CandidateIndex) -> MatchResult {
    let artist = primary.artist_norm.as_str();
    let title = primary.nominee_norm.as_str();
    let entries = index.entries();

    // An empty title would equal every untitled catalog row
    if title.is_empty() || index.is_empty() {
        return MatchResult::unmatched();
    }

    // Phase 1: exact title. Positions are in ranking order, so the first hit is the best.
    if let Some(&pos) = index
        .with_title(title)
        .iter()
        .find(|&&pos| entries[pos].credits(artist))
    {
        return MatchResult {
            candidate: Some(pos),
            quality: MatchQuality::Exact,
        };
    }

    // Phase 2: literal substring on the parenthesis-free stem, so
    // "(Remastered 2011)" style suffixes on either side do not block a match
    let stem = title_stem(title);
    match entries
        .iter()
        .position(|c| c.credits(artist) && c.track_name_norm.contains(stem))
    {
        Some(pos) => MatchResult {
            candidate: Some(pos),
            quality: MatchQuality::Partial,
        },
        None => MatchResult::unmatched(),
    }
}

/// Match every record in parallel. Output order equals input order regardless
/// of the thread count, so runs are reproducible.
pub fn match_all(
    records: &[NormalizedPrimary],
    index: &CandidateIndex,
    progress: ProgressMode,
) -> Vec<MatchResult> {
    let total = records.len() as u64;
    let pb = progress.bar(total, "Matching song-level awards");

    let results: Vec<MatchResult> = records
        .par_iter()
        .map(|r| {
            let result = match_one(r, index);
            log::debug!(
                "{} match for '{}' by '{}'",
                result.quality,
                r.nominee_norm,
                r.artist_norm
            );
            pb.inc(1);
            progress.log_progress("match", pb.position(), total, 1_000);
            result
        })
        .collect();

    pb.finish_with_message(format!("Matched {} song-level awards", results.len()));
    results
}
