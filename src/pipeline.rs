//! Pipeline entry points.
//!
//! `enrich` is the in-memory batch transform: admission → candidate index →
//! matching → merge & filter → binning. `run` loads both datasets from their
//! locations first. Neither writes anything; handing the result to the sink
//! is the caller's decision.

use std::path::PathBuf;
use std::time::Instant;

use crate::binning::bin_all;
use crate::config::PipelineConfig;
use crate::error::{Dataset, PipelineError, Result};
use crate::index::CandidateIndex;
use crate::matcher::{match_all, normalize_primary, partition_song_level};
use crate::merge::merge_and_filter;
use crate::models::{
    EnrichedRecord, MatchQuality, NormalizedPrimary, PipelineStats, PrimaryRecord, SecondaryRecord,
};
use crate::source::{read_primary, read_secondary};

/// Where the two datasets live
#[derive(Clone, Debug)]
pub struct Sources {
    pub primary_db: PathBuf,
    pub primary_table: String,
    pub secondary_csv: PathBuf,
}

/// Finished dataset plus the statistics of the run that produced it
#[derive(Debug)]
pub struct EnrichmentOutput {
    pub records: Vec<EnrichedRecord>,
    pub stats: PipelineStats,
}

/// Load both datasets and enrich. Any load failure aborts before matching.
pub fn run(sources: &Sources, config: &PipelineConfig) -> Result<EnrichmentOutput> {
    log::info!(
        "Loading awards from {:?} (table '{}')",
        sources.primary_db,
        sources.primary_table
    );
    let primary = read_primary(&sources.primary_db, &sources.primary_table, config.progress)?;

    log::info!("Loading catalog from {:?}", sources.secondary_csv);
    let secondary = read_secondary(&sources.secondary_csv, config.progress)?;

    enrich(primary, secondary, config)
}

/// Link the awards ledger to the catalog and derive categorical features.
pub fn enrich(
    primary: Vec<PrimaryRecord>,
    secondary: Vec<SecondaryRecord>,
    config: &PipelineConfig,
) -> Result<EnrichmentOutput> {
    let start = Instant::now();
    let mut stats = PipelineStats {
        primary_rows: primary.len(),
        secondary_rows: secondary.len(),
        ..Default::default()
    };

    for (dataset, rows) in [
        (Dataset::Primary, primary.len()),
        (Dataset::Secondary, secondary.len()),
    ] {
        if rows == 0 {
            return Err(PipelineError::EmptyInput {
                dataset,
                primary_rows: stats.primary_rows,
                secondary_rows: stats.secondary_rows,
            });
        }
    }

    let admitted = admit(primary, config, &mut stats);
    let (song_level, other) = partition_song_level(admitted, config);
    stats.song_level = song_level.len();
    stats.other_level = other.len();
    log::info!(
        "Song-level awards: {}, other categories: {}",
        stats.song_level,
        stats.other_level
    );

    let index = CandidateIndex::build(secondary);
    stats.verbatim_duplicates = index.verbatim_duplicates();
    stats.index_entries = index.len();
    log::info!(
        "Candidate index: {} entries ({} verbatim duplicates removed)",
        stats.index_entries,
        stats.verbatim_duplicates
    );

    let matches = match_all(&song_level, &index, config.progress);
    for m in &matches {
        match m.quality {
            MatchQuality::Exact => stats.exact_matches += 1,
            MatchQuality::Partial => stats.partial_matches += 1,
            MatchQuality::None => stats.unmatched += 1,
        }
    }
    log::info!(
        "Matches: {} exact, {} partial, {} none ({:.1}% matched)",
        stats.exact_matches,
        stats.partial_matches,
        stats.unmatched,
        stats.match_rate()
    );

    let outcome = merge_and_filter(&song_level, &matches, &other, &index, config);
    stats.merged_rows = outcome.total;
    stats.retained_rows = outcome.retained;

    let records = bin_all(outcome.records);
    stats.elapsed_seconds = start.elapsed().as_secs_f64();
    Ok(EnrichmentOutput { records, stats })
}

/// Drop rows that name nothing or predate `min_year`, then normalize the rest.
fn admit(
    primary: Vec<PrimaryRecord>,
    config: &PipelineConfig,
    stats: &mut PipelineStats,
) -> Vec<NormalizedPrimary> {
    let mut admitted = Vec::with_capacity(primary.len());
    for record in primary {
        if !record.is_admissible() {
            stats.inadmissible += 1;
        } else if record.year.map_or(true, |y| y < config.min_year) {
            stats.below_min_year += 1;
        } else {
            admitted.push(normalize_primary(record));
        }
    }
    log::debug!(
        "Admitted {} awards ({} inadmissible, {} before {})",
        admitted.len(),
        stats.inadmissible,
        stats.below_min_year,
        config.min_year
    );
    admitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressMode;

    fn award(year: i64, category: &str, nominee: &str, artist: &str) -> PrimaryRecord {
        PrimaryRecord {
            year: Some(year),
            title: Some(format!("{} GRAMMY Awards", year)),
            category: Some(category.to_string()),
            nominee: Some(nominee.to_string()),
            artist: Some(artist.to_string()),
            winner: Some(false),
        }
    }

    fn track(artists: &str, title: &str, popularity: i64) -> SecondaryRecord {
        SecondaryRecord {
            track_id: Some(format!("id-{}", title)),
            artists: Some(artists.to_string()),
            album_name: Some("A Night at the Opera".to_string()),
            track_name: Some(title.to_string()),
            popularity: Some(popularity),
            duration_ms: Some(354_320),
            explicit: Some(false),
            danceability: Some(0.392),
            energy: Some(0.402),
            valence: Some(0.228),
            acousticness: Some(0.288),
            tempo: Some(143.883),
            track_genre: Some("rock".to_string()),
            ..Default::default()
        }
    }

    fn bohemian() -> PrimaryRecord {
        award(1975, "Song of the Year", "Bohemian Rhapsody", "Queen")
    }

    #[test]
    fn test_scenario_exact_match() {
        let out = enrich(
            vec![bohemian()],
            vec![track("Queen", "Bohemian Rhapsody", 85)],
            &PipelineConfig::default(),
        )
        .unwrap();

        assert_eq!(out.records.len(), 1);
        let r = &out.records[0];
        assert_eq!(r.match_quality, MatchQuality::Exact);
        assert_eq!(r.popularity_category, "Very Popular");
        assert_eq!(r.decade, 1970);
        assert_eq!(r.explicit_label, "No Explicit");
        assert_eq!(out.stats.exact_matches, 1);
        assert_eq!(out.stats.retained_rows, 1);
    }

    #[test]
    fn test_float_form_catalog_integers_keep_the_match() {
        let csv = "artists,track_name,popularity,duration_ms,track_genre\n\
                   Queen,Bohemian Rhapsody,85.0,354320.0,rock\n";
        let secondary =
            crate::source::read_secondary_from(csv.as_bytes(), "memory", ProgressMode::LogOnly)
                .unwrap();
        let out = enrich(vec![bohemian()], secondary, &PipelineConfig::default()).unwrap();

        assert_eq!(out.stats.exact_matches, 1);
        assert_eq!(out.stats.retained_rows, 1);
        assert_eq!(out.records[0].popularity, 85);
        assert_eq!(out.records[0].duration_ms, 354_320);
    }

    #[test]
    fn test_empty_nominee_is_not_linked_to_untitled_rows() {
        let untitled = SecondaryRecord {
            artists: Some("Queen".to_string()),
            popularity: Some(90),
            duration_ms: Some(200_000),
            track_genre: Some("rock".to_string()),
            ..Default::default()
        };
        let out = enrich(
            vec![award(1980, "Best Rock Performance", "", "Queen")],
            vec![untitled],
            &PipelineConfig::default(),
        )
        .unwrap();

        assert_eq!(out.stats.exact_matches, 0);
        assert_eq!(out.stats.unmatched, 1);
        assert!(out.records.is_empty());
    }

    #[test]
    fn test_scenario_partial_match() {
        let out = enrich(
            vec![bohemian()],
            vec![track("Queen", "Bohemian Rhapsody (Remastered 2011)", 85)],
            &PipelineConfig::default(),
        )
        .unwrap();

        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].match_quality, MatchQuality::Partial);
        assert_eq!(out.records[0].track_name, "Bohemian Rhapsody (Remastered 2011)");
        assert_eq!(out.stats.partial_matches, 1);
    }

    #[test]
    fn test_scenario_album_category_bypasses_and_is_filtered() {
        let out = enrich(
            vec![award(1975, "Album of the Year", "Bohemian Rhapsody", "Queen")],
            vec![track("Queen", "Bohemian Rhapsody", 85)],
            &PipelineConfig::default(),
        )
        .unwrap();

        assert!(out.records.is_empty());
        assert_eq!(out.stats.other_level, 1);
        assert_eq!(out.stats.song_level, 0);
        assert_eq!(out.stats.merged_rows, 1);
        assert_eq!(out.stats.retained_rows, 0);
        assert_eq!(out.stats.exact_matches + out.stats.partial_matches, 0);
    }

    #[test]
    fn test_admission_filters() {
        let mut nameless = award(1990, "Song of the Year", "", "");
        nameless.artist = None;
        let out = enrich(
            vec![
                nameless,
                award(1957, "Song of the Year", "Volare", "Domenico Modugno"),
                bohemian(),
            ],
            vec![track("Queen", "Bohemian Rhapsody", 85)],
            &PipelineConfig::default(),
        )
        .unwrap();

        assert_eq!(out.stats.inadmissible, 1);
        assert_eq!(out.stats.below_min_year, 1);
        assert_eq!(out.stats.song_level, 1);
        assert_eq!(out.records.len(), 1);
    }

    #[test]
    fn test_surviving_records_are_complete() {
        let mut no_genre = track("Adele", "Hello", 90);
        no_genre.track_genre = None;
        let out = enrich(
            vec![
                bohemian(),
                award(2016, "Song of the Year", "Hello", "Adele"),
                award(2016, "Record of the Year", "Uptown Funk", "Mark Ronson"),
            ],
            vec![track("Queen", "Bohemian Rhapsody", 85), no_genre],
            &PipelineConfig::default(),
        )
        .unwrap();

        assert_eq!(out.stats.merged_rows, 3);
        assert_eq!(out.records.len(), 1);
        for r in &out.records {
            assert!(r.popularity > 0 && r.duration_ms > 0);
            assert!(!r.track_genre.is_empty() && !r.artists.is_empty() && !r.track_name.is_empty());
        }
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let primary: Vec<PrimaryRecord> = (0..120)
            .map(|i| match i % 3 {
                0 => bohemian(),
                1 => award(1981, "Best Rock Performance", "Under Pressure", "David Bowie"),
                _ => award(1977, "Song of the Year", "Somebody to Love", "Queen"),
            })
            .collect();
        let secondary = vec![
            track("Queen", "Bohemian Rhapsody", 85),
            track("Queen;David Bowie", "Under Pressure - Remastered", 80),
            track("Queen;David Bowie", "Under Pressure", 80),
            track("Queen", "Somebody To Love (Live)", 60),
        ];
        let config = PipelineConfig::default();

        let first = enrich(primary.clone(), secondary.clone(), &config).unwrap();
        let second = enrich(primary, secondary, &config).unwrap();
        assert_eq!(first.records, second.records);
        assert_eq!(first.records.len(), 120);
        assert_eq!(first.records[1].track_name, "Under Pressure");
    }

    #[test]
    fn test_empty_secondary_is_fatal() {
        let err = enrich(vec![bohemian()], vec![], &PipelineConfig::default()).unwrap_err();
        match err {
            PipelineError::EmptyInput {
                dataset,
                primary_rows,
                secondary_rows,
            } => {
                assert_eq!(dataset, Dataset::Secondary);
                assert_eq!(primary_rows, 1);
                assert_eq!(secondary_rows, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_primary_is_fatal() {
        let err = enrich(
            vec![],
            vec![track("Queen", "Bohemian Rhapsody", 85)],
            &PipelineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::EmptyInput {
                dataset: Dataset::Primary,
                ..
            }
        ));
    }

    #[test]
    fn test_run_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("grammy.sqlite3");
        let conn = rusqlite::Connection::open(&db).unwrap();
        conn.execute_batch(
            "CREATE TABLE grammy_awards (id INTEGER PRIMARY KEY, year INT, title TEXT,
                category TEXT, nominee TEXT, artist TEXT, winner TINYINT(1));
             INSERT INTO grammy_awards (year, title, category, nominee, artist, winner)
             VALUES (1976, '18th Annual GRAMMY Awards', 'Song Of The Year', 'Bohemian Rhapsody', 'Queen', 1);",
        )
        .unwrap();
        drop(conn);

        let csv_path = dir.path().join("spotify_dataset.csv");
        std::fs::write(
            &csv_path,
            "track_id,artists,album_name,track_name,popularity,duration_ms,explicit,energy,tempo,track_genre\n\
             x1,Queen,A Night at the Opera,Bohemian Rhapsody (Remastered 2011),85,354320,False,0.402,143.883,rock\n",
        )
        .unwrap();

        let sources = Sources {
            primary_db: db,
            primary_table: "grammy_awards".to_string(),
            secondary_csv: csv_path,
        };
        let out = run(&sources, &PipelineConfig::default()).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].match_quality, MatchQuality::Partial);
        assert_eq!(out.records[0].winner, Some(true));
        assert_eq!(out.records[0].tempo_category, "Fast");
    }

    #[test]
    fn test_run_missing_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("grammy.sqlite3");
        rusqlite::Connection::open(&db)
            .unwrap()
            .execute_batch("CREATE TABLE grammy_awards (year INT, category TEXT, nominee TEXT);")
            .unwrap();

        let sources = Sources {
            primary_db: db,
            primary_table: "grammy_awards".to_string(),
            secondary_csv: dir.path().join("missing.csv"),
        };
        let err = run(&sources, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingInput {
                dataset: Dataset::Secondary,
                ..
            }
        ));
    }
}
