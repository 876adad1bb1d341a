//! Explicit pipeline configuration.
//!
//! Everything the engine needs is passed in through `PipelineConfig`; file
//! locations stay with the binary that owns the inputs and the sink.

use crate::progress::ProgressMode;

/// Category keywords that mark a song-level award
pub const DEFAULT_SONG_KEYWORDS: [&str; 6] = [
    "song",
    "performance",
    "recording",
    "music",
    "composition",
    "track",
];

/// Oldest ceremony year kept by default (first ceremony)
pub const DEFAULT_MIN_YEAR: i64 = 1958;

/// Free-text fields longer than this are truncated (in characters)
pub const DEFAULT_MAX_TEXT_LEN: usize = 255;

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Ledger rows older than this are dropped before matching
    pub min_year: i64,
    /// Lower-case substrings of the normalized category that select song-level awards
    pub song_keywords: Vec<String>,
    pub max_text_len: usize,
    /// Bars or log lines for long phases
    pub progress: ProgressMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_year: DEFAULT_MIN_YEAR,
            song_keywords: DEFAULT_SONG_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            max_text_len: DEFAULT_MAX_TEXT_LEN,
            progress: ProgressMode::default(),
        }
    }
}

impl PipelineConfig {
    /// Whether a normalized category names a song-level award
    pub fn is_song_level(&self, category_norm: &str) -> bool {
        self.song_keywords
            .iter()
            .any(|k| category_norm.contains(k.as_str()))
    }
}
