//! Output adapter: the enriched dataset as one CSV artifact.
//!
//! Header row first, one row per record, no index column. The file is
//! written beside the destination and renamed into place, so a failed run
//! never leaves a partial artifact at the output path.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::models::EnrichedRecord;

/// Output column order; matches the field order of `EnrichedRecord`
pub const OUTPUT_COLUMNS: [&str; 34] = [
    "year",
    "title",
    "category",
    "nominee",
    "artist",
    "winner",
    "artists",
    "album_name",
    "track_name",
    "popularity",
    "duration_ms",
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "time_signature",
    "track_genre",
    "explicit_label",
    "duration_minutes",
    "decade",
    "popularity_category",
    "energy_level",
    "danceability_level",
    "duration_category",
    "valence_mood",
    "acousticness_type",
    "tempo_category",
];

/// Serialize records as CSV into any writer.
pub fn write_enriched_to<W: Write>(writer: W, records: &[EnrichedRecord]) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(OUTPUT_COLUMNS)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the artifact to `path`, replacing any existing file.
pub fn write_enriched(path: &Path, records: &[EnrichedRecord]) -> Result<()> {
    let output_err = |reason: String| PipelineError::Output {
        path: path.display().to_string(),
        reason,
    };

    let partial = partial_path(path);
    let file = fs::File::create(&partial).map_err(|e| output_err(e.to_string()))?;
    if let Err(e) = write_enriched_to(file, records) {
        let _ = fs::remove_file(&partial);
        return Err(output_err(e.to_string()));
    }
    fs::rename(&partial, path).map_err(|e| output_err(e.to_string()))?;

    log::info!("Wrote {} enriched rows to {}", records.len(), path.display());
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
