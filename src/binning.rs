//! Feature binning: ordinal labels from continuous catalog attributes.
//!
//! Each table lists (inclusive lower bound, label) in ascending order. A value
//! takes the label of the last bound it reaches; values below the first bound
//! take the first label and values past the top fall into the last bucket.

use crate::models::{EnrichedRecord, MergedRecord};

/// Bucket table: (inclusive lower bound, label), ascending
pub type Bins = [(f64, &'static str)];

pub const POPULARITY_BINS: &Bins = &[
    (0.0, "Low"),
    (40.0, "Moderate"),
    (60.0, "Popular"),
    (80.0, "Very Popular"),
];

pub const ENERGY_BINS: &Bins = &[
    (0.0, "Low Energy"),
    (0.4, "Medium Energy"),
    (0.7, "High Energy"),
];

pub const DANCEABILITY_BINS: &Bins = &[
    (0.0, "Low Danceability"),
    (0.5, "Danceable"),
    (0.7, "Very Danceable"),
];

/// Bounds in minutes
pub const DURATION_BINS: &Bins = &[
    (0.0, "Very Short"),
    (2.5, "Short"),
    (3.5, "Medium"),
    (5.0, "Long"),
];

pub const VALENCE_BINS: &Bins = &[
    (0.0, "Sad/Negative"),
    (0.4, "Neutral"),
    (0.6, "Happy/Positive"),
];

pub const ACOUSTICNESS_BINS: &Bins = &[
    (0.0, "Electronic"),
    (0.3, "Hybrid"),
    (0.7, "Acoustic"),
];

/// Bounds in BPM
pub const TEMPO_BINS: &Bins = &[
    (0.0, "Slow"),
    (90.0, "Moderate"),
    (120.0, "Fast"),
    (150.0, "Very Fast"),
];

/// Label for `value`. Total: every input, NaN included, gets exactly one label.
pub fn bucket(value: f64, bins: &Bins) -> &'static str {
    let mut label = bins.first().map(|(_, l)| *l).unwrap_or("");
    for &(lower, l) in bins {
        if value >= lower {
            label = l;
        } else {
            break;
        }
    }
    label
}

/// Milliseconds to minutes, rounded to 2 decimals
pub fn duration_minutes(duration_ms: i64) -> f64 {
    (duration_ms as f64 / 60_000.0 * 100.0).round() / 100.0
}

/// Start year of the decade (floor division)
pub fn decade(year: i64) -> i64 {
    year.div_euclid(10) * 10
}

/// Missing explicit flags read as not explicit
pub fn explicit_label(explicit: Option<bool>) -> &'static str {
    match explicit {
        Some(true) => "Explicit",
        Some(false) | None => "No Explicit",
    }
}

/// Derive all categorical features; the explicit flag is replaced by its label.
pub fn bin_record(r: MergedRecord) -> EnrichedRecord {
    let minutes = duration_minutes(r.duration_ms);
    EnrichedRecord {
        explicit_label: explicit_label(r.explicit),
        duration_minutes: minutes,
        decade: decade(r.year),
        popularity_category: bucket(r.popularity as f64, POPULARITY_BINS),
        energy_level: bucket(r.energy, ENERGY_BINS),
        danceability_level: bucket(r.danceability, DANCEABILITY_BINS),
        duration_category: bucket(minutes, DURATION_BINS),
        valence_mood: bucket(r.valence, VALENCE_BINS),
        acousticness_type: bucket(r.acousticness, ACOUSTICNESS_BINS),
        tempo_category: bucket(r.tempo, TEMPO_BINS),

        year: r.year,
        title: r.title,
        category: r.category,
        nominee: r.nominee,
        artist: r.artist,
        winner: r.winner,
        artists: r.artists,
        album_name: r.album_name,
        track_name: r.track_name,
        popularity: r.popularity,
        duration_ms: r.duration_ms,
        danceability: r.danceability,
        energy: r.energy,
        key: r.key,
        loudness: r.loudness,
        mode: r.mode,
        speechiness: r.speechiness,
        acousticness: r.acousticness,
        instrumentalness: r.instrumentalness,
        liveness: r.liveness,
        valence: r.valence,
        tempo: r.tempo,
        time_signature: r.time_signature,
        track_genre: r.track_genre,
        match_quality: r.match_quality,
    }
}

pub fn bin_all(records: Vec<MergedRecord>) -> Vec<EnrichedRecord> {
    records.into_iter().map(bin_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popularity_boundaries() {
        assert_eq!(bucket(0.0, POPULARITY_BINS), "Low");
        assert_eq!(bucket(39.0, POPULARITY_BINS), "Low");
        assert_eq!(bucket(40.0, POPULARITY_BINS), "Moderate");
        assert_eq!(bucket(60.0, POPULARITY_BINS), "Popular");
        assert_eq!(bucket(80.0, POPULARITY_BINS), "Very Popular");
        assert_eq!(bucket(100.0, POPULARITY_BINS), "Very Popular");
    }

    #[test]
    fn test_unit_interval_boundaries() {
        assert_eq!(bucket(0.39, ENERGY_BINS), "Low Energy");
        assert_eq!(bucket(0.4, ENERGY_BINS), "Medium Energy");
        assert_eq!(bucket(0.7, ENERGY_BINS), "High Energy");
        assert_eq!(bucket(1.0, ENERGY_BINS), "High Energy");

        assert_eq!(bucket(0.49, DANCEABILITY_BINS), "Low Danceability");
        assert_eq!(bucket(0.5, DANCEABILITY_BINS), "Danceable");
        assert_eq!(bucket(0.7, DANCEABILITY_BINS), "Very Danceable");

        assert_eq!(bucket(0.0, VALENCE_BINS), "Sad/Negative");
        assert_eq!(bucket(0.4, VALENCE_BINS), "Neutral");
        assert_eq!(bucket(0.6, VALENCE_BINS), "Happy/Positive");

        assert_eq!(bucket(0.29, ACOUSTICNESS_BINS), "Electronic");
        assert_eq!(bucket(0.3, ACOUSTICNESS_BINS), "Hybrid");
        assert_eq!(bucket(0.7, ACOUSTICNESS_BINS), "Acoustic");
    }

    #[test]
    fn test_tempo_and_duration_boundaries() {
        assert_eq!(bucket(89.9, TEMPO_BINS), "Slow");
        assert_eq!(bucket(90.0, TEMPO_BINS), "Moderate");
        assert_eq!(bucket(120.0, TEMPO_BINS), "Fast");
        assert_eq!(bucket(150.0, TEMPO_BINS), "Very Fast");
        assert_eq!(bucket(300.0, TEMPO_BINS), "Very Fast");

        assert_eq!(bucket(2.49, DURATION_BINS), "Very Short");
        assert_eq!(bucket(2.5, DURATION_BINS), "Short");
        assert_eq!(bucket(3.5, DURATION_BINS), "Medium");
        assert_eq!(bucket(5.0, DURATION_BINS), "Long");
        assert_eq!(bucket(42.0, DURATION_BINS), "Long");
    }

    #[test]
    fn test_out_of_range_values_take_nearest_open_bucket() {
        assert_eq!(bucket(-5.0, POPULARITY_BINS), "Low");
        assert_eq!(bucket(250.0, POPULARITY_BINS), "Very Popular");
        assert_eq!(bucket(1.3, ENERGY_BINS), "High Energy");
        assert_eq!(bucket(450.0, TEMPO_BINS), "Very Fast");
        assert_eq!(bucket(f64::NAN, TEMPO_BINS), "Slow");
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(duration_minutes(354_320), 5.91);
        assert_eq!(duration_minutes(150_000), 2.5);
        assert_eq!(duration_minutes(0), 0.0);
        // 149_999 ms rounds up to 2.5 and lands in "Short"
        assert_eq!(bucket(duration_minutes(149_999), DURATION_BINS), "Short");
    }

    #[test]
    fn test_decade() {
        assert_eq!(decade(1975), 1970);
        assert_eq!(decade(1958), 1950);
        assert_eq!(decade(2000), 2000);
        assert_eq!(decade(2019), 2010);
    }

    #[test]
    fn test_explicit_label() {
        assert_eq!(explicit_label(Some(true)), "Explicit");
        assert_eq!(explicit_label(Some(false)), "No Explicit");
        assert_eq!(explicit_label(None), "No Explicit");
    }
}
