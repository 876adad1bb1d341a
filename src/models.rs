//! Core data models for award/catalog enrichment.
//!
//! This module contains all struct definitions and enums used throughout
//! the enrichment pipeline: the raw rows of both datasets, match results,
//! merged rows and the final enriched output.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// Awards Models
// ============================================================================

/// Raw awards ledger entry (primary dataset)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrimaryRecord {
    pub year: Option<i64>,
    pub title: Option<String>, // Ceremony title, e.g. "62nd Annual GRAMMY Awards"
    pub category: Option<String>,
    pub nominee: Option<String>, // The nominated work
    pub artist: Option<String>,
    pub winner: Option<bool>,
}

/// Default artist for ledger rows that credit nobody
pub const UNKNOWN_ARTIST: &str = "Unknown";

impl PrimaryRecord {
    /// Rows that name neither a work nor an artist cannot be linked to anything.
    pub fn is_admissible(&self) -> bool {
        !(is_blank(&self.nominee) && is_blank(&self.artist))
    }

    /// Artist credit with the ledger default applied
    pub fn artist_or_default(&self) -> &str {
        self.artist.as_deref().unwrap_or(UNKNOWN_ARTIST)
    }
}

/// Primary record with precomputed normalized keys.
/// The `*_norm` fields are matching scaffolding and never reach the output.
#[derive(Clone, Debug)]
pub struct NormalizedPrimary {
    pub record: PrimaryRecord,
    pub category_norm: String,
    pub nominee_norm: String,
    pub artist_norm: String,
}

// ============================================================================
// Catalog Models
// ============================================================================

/// Streaming catalog entry (secondary dataset).
///
/// Numeric fields tolerate malformed input: anything that does not parse
/// becomes `None` and is zero-filled at merge time. Integer columns also
/// accept float text ("85.0"), as written by exporters that widen columns
/// holding gaps.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SecondaryRecord {
    #[serde(default)]
    pub track_id: Option<String>, // Catalog-local identifier, dropped at merge
    #[serde(default)]
    pub artists: Option<String>, // Comma/semicolon-joined contributor list
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub track_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    pub popularity: Option<i64>, // 0-100
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    pub duration_ms: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_tristate")]
    pub explicit: Option<bool>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub danceability: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub energy: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    pub key: Option<i64>, // Pitch class
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub loudness: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    pub mode: Option<i64>, // 0=minor, 1=major
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub speechiness: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub acousticness: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub instrumentalness: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub liveness: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub valence: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub tempo: Option<f64>, // BPM
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    pub time_signature: Option<i64>,
    #[serde(default)]
    pub track_genre: Option<String>,
}

impl SecondaryRecord {
    /// Key for verbatim duplicate detection.
    /// Floats compare by bit pattern so the key is hashable.
    pub fn row_key(&self) -> RowKey {
        let text = |v: &Option<String>| v.clone();
        let float = |v: Option<f64>| v.map(f64::to_bits);
        RowKey {
            text: [
                text(&self.track_id),
                text(&self.artists),
                text(&self.album_name),
                text(&self.track_name),
                text(&self.track_genre),
            ],
            ints: [
                self.popularity,
                self.duration_ms,
                self.key,
                self.mode,
                self.time_signature,
            ],
            floats: [
                float(self.danceability),
                float(self.energy),
                float(self.loudness),
                float(self.speechiness),
                float(self.acousticness),
                float(self.instrumentalness),
                float(self.liveness),
                float(self.valence),
                float(self.tempo),
            ],
            explicit: self.explicit,
        }
    }
}

/// Hashable image of every column of a catalog row
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RowKey {
    text: [Option<String>; 5],
    ints: [Option<i64>; 5],
    floats: [Option<u64>; 9],
    explicit: Option<bool>,
}

/// Tri-state boolean from catalog text: "true"/"false" (any case) or "1"/"0".
/// Anything else is treated as missing rather than guessed.
pub fn parse_tristate(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Integer from text, accepting float notation and truncating toward zero.
/// Non-finite or unparseable text is missing.
pub fn parse_lenient_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}

fn deserialize_lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_lenient_int))
}

fn deserialize_tristate<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_tristate))
}

// ============================================================================
// Match Models
// ============================================================================

/// Why a link was or wasn't made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchQuality {
    /// Artist contained, title equal
    Exact,
    /// Artist contained, title stem contained
    Partial,
    /// No candidate, or record bypassed matching
    None,
}

impl fmt::Display for MatchQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchQuality::Exact => "exact",
            MatchQuality::Partial => "partial",
            MatchQuality::None => "none",
        };
        f.write_str(s)
    }
}

/// Association of one primary record with at most one index entry.
/// `candidate` is a position in the candidate index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub candidate: Option<usize>,
    pub quality: MatchQuality,
}

impl MatchResult {
    pub fn unmatched() -> Self {
        Self {
            candidate: None,
            quality: MatchQuality::None,
        }
    }
}

// ============================================================================
// Output Models
// ============================================================================

/// Primary fields plus matched catalog attributes, gaps filled.
///
/// Numeric gaps are 0, text gaps are "". Scaffolding (normalized keys,
/// dataset-local identifiers) is not carried.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedRecord {
    // Awards
    pub year: i64,
    pub title: String,
    pub category: String,
    pub nominee: String,
    pub artist: String,
    pub winner: Option<bool>,

    // Catalog
    pub artists: String,
    pub album_name: String,
    pub track_name: String,
    pub popularity: i64,
    pub duration_ms: i64,
    pub explicit: Option<bool>,
    pub danceability: f64,
    pub energy: f64,
    pub key: i64,
    pub loudness: f64,
    pub mode: i64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub time_signature: i64,
    pub track_genre: String,

    pub match_quality: MatchQuality,
}

impl MergedRecord {
    /// Only rows that received a genuine catalog match pass.
    pub fn is_complete(&self) -> bool {
        self.popularity > 0
            && self.duration_ms > 0
            && !self.track_genre.is_empty()
            && !self.artists.is_empty()
            && !self.track_name.is_empty()
    }
}

/// Final enriched row handed to the sink.
/// Field order is the output column order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub year: i64,
    pub title: String,
    pub category: String,
    pub nominee: String,
    pub artist: String,
    pub winner: Option<bool>,

    pub artists: String,
    pub album_name: String,
    pub track_name: String,
    pub popularity: i64,
    pub duration_ms: i64,
    pub danceability: f64,
    pub energy: f64,
    pub key: i64,
    pub loudness: f64,
    pub mode: i64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub time_signature: i64,
    pub track_genre: String,

    pub explicit_label: &'static str,
    pub duration_minutes: f64,
    pub decade: i64,
    pub popularity_category: &'static str,
    pub energy_level: &'static str,
    pub danceability_level: &'static str,
    pub duration_category: &'static str,
    pub valence_mood: &'static str,
    pub acousticness_type: &'static str,
    pub tempo_category: &'static str,

    #[serde(skip)]
    pub match_quality: MatchQuality,
}

// ============================================================================
// Statistics (Instrumentation)
// ============================================================================

/// Per-phase pipeline statistics.
/// Per-record anomalies (no match, missing fields) only show up here.
#[derive(Default, Debug, Clone, Serialize)]
pub struct PipelineStats {
    // Loading
    pub primary_rows: usize,
    pub secondary_rows: usize,

    // Primary admission
    pub inadmissible: usize,
    pub below_min_year: usize,
    pub song_level: usize,
    pub other_level: usize,

    // Candidate index
    pub verbatim_duplicates: usize,
    pub index_entries: usize,

    // Matching
    pub exact_matches: usize,
    pub partial_matches: usize,
    pub unmatched: usize,

    // Merge & filter
    pub merged_rows: usize,
    pub retained_rows: usize,

    // Timing
    pub elapsed_seconds: f64,
}

impl PipelineStats {
    /// Share of merged rows that survived the completeness filter, as a percentage
    pub fn retention_rate(&self) -> f64 {
        if self.merged_rows == 0 {
            0.0
        } else {
            100.0 * self.retained_rows as f64 / self.merged_rows as f64
        }
    }

    /// Share of song-level rows that found a candidate, as a percentage
    pub fn match_rate(&self) -> f64 {
        if self.song_level == 0 {
            0.0
        } else {
            100.0 * (self.exact_matches + self.partial_matches) as f64 / self.song_level as f64
        }
    }

    /// Log stats in JSON format
    pub fn log_phase(&self, phase: &str) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            log::info!("[STATS:{}]\n{}", phase, json);
        }
    }

    /// Write stats to a JSON file
    pub fn write_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}
