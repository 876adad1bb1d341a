//! Input adapters.
//!
//! The awards ledger is read from a SQLite table (whatever column types the
//! importer inferred), the catalog from a CSV file. Both adapters coerce
//! leniently: a value that does not fit its field becomes missing.

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Dataset, PipelineError, Result};
use crate::models::{parse_lenient_int, parse_tristate, PrimaryRecord, SecondaryRecord};
use crate::progress::ProgressMode;

/// Ledger columns without which no row can be interpreted
const REQUIRED_PRIMARY_COLUMNS: [&str; 3] = ["year", "category", "nominee"];

// ============================================================================
// Primary (SQLite)
// ============================================================================

/// Read every row of `table` from the SQLite database at `path`.
/// The database is opened read-only; a missing file is `MissingInput`.
pub fn read_primary(path: &Path, table: &str, progress: ProgressMode) -> Result<Vec<PrimaryRecord>> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| PipelineError::missing(Dataset::Primary, path.display(), e))?;
    read_primary_from(&conn, table, progress)
}

/// Read every row of `table` through an open connection.
pub fn read_primary_from(
    conn: &Connection,
    table: &str,
    progress: ProgressMode,
) -> Result<Vec<PrimaryRecord>> {
    let missing = |reason: String| PipelineError::missing(Dataset::Primary, table, reason);

    if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(missing(format!("invalid table name '{}'", table)));
    }

    let spinner = progress.spinner("Reading awards ledger");
    let sql = format!("SELECT * FROM \"{}\"", table);
    let mut stmt = conn.prepare(&sql).map_err(|e| missing(e.to_string()))?;

    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_lowercase()).collect();
    let position = |name: &str| columns.iter().position(|c| c == name);
    if let Some(absent) = REQUIRED_PRIMARY_COLUMNS.iter().find(|c| position(**c).is_none()) {
        return Err(missing(format!("required column '{}' not found", absent)));
    }
    let year = position("year");
    let title = position("title");
    let category = position("category");
    let nominee = position("nominee");
    let artist = position("artist");
    let winner = position("winner");

    let mut rows = stmt.query([]).map_err(|e| missing(e.to_string()))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next().map_err(|e| missing(e.to_string()))? {
        let get = |idx: Option<usize>| -> Value {
            idx.and_then(|i| row.get::<_, Value>(i).ok())
                .unwrap_or(Value::Null)
        };
        records.push(PrimaryRecord {
            year: value_to_i64(get(year)),
            title: value_to_text(get(title)),
            category: value_to_text(get(category)),
            nominee: value_to_text(get(nominee)),
            artist: value_to_text(get(artist)),
            winner: value_to_bool(get(winner)),
        });
    }

    spinner.finish_with_message(format!("Read {} award rows", records.len()));
    log::info!("Loaded {} rows from awards table '{}'", records.len(), table);
    Ok(records)
}

fn value_to_i64(value: Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(i),
        Value::Real(f) if f.is_finite() => Some(f.trunc() as i64),
        Value::Text(s) => parse_lenient_int(&s),
        _ => None,
    }
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Blob(b) => String::from_utf8(b).ok(),
        Value::Null => None,
    }
}

fn value_to_bool(value: Value) -> Option<bool> {
    match value {
        Value::Integer(0) => Some(false),
        Value::Integer(1) => Some(true),
        Value::Text(s) => parse_tristate(&s),
        _ => None,
    }
}

// ============================================================================
// Secondary (CSV)
// ============================================================================

/// Read the catalog CSV at `path`. A missing or unopenable file is `MissingInput`.
pub fn read_secondary(path: &Path, progress: ProgressMode) -> Result<Vec<SecondaryRecord>> {
    let file =
        File::open(path).map_err(|e| PipelineError::missing(Dataset::Secondary, path.display(), e))?;
    read_secondary_from(file, &path.display().to_string(), progress)
}

/// Read catalog rows from any CSV source with a header row.
///
/// Columns are matched by header name; unknown columns (such as a leading
/// positional index) are ignored. Rows the CSV layer cannot decode are
/// skipped with a warning; I/O failures abort.
pub fn read_secondary_from<R: Read>(
    reader: R,
    location: &str,
    progress: ProgressMode,
) -> Result<Vec<SecondaryRecord>> {
    let spinner = progress.spinner("Reading streaming catalog");
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.deserialize::<SecondaryRecord>() {
        match result {
            Ok(record) => records.push(record),
            Err(e) if e.is_io_error() => {
                return Err(PipelineError::missing(Dataset::Secondary, location, e));
            }
            Err(e) => {
                skipped += 1;
                log::warn!("Skipping undecodable catalog row: {}", e);
            }
        }
    }

    spinner.finish_with_message(format!("Read {} catalog rows", records.len()));
    log::info!(
        "Loaded {} catalog rows from {} ({} skipped)",
        records.len(),
        location,
        skipped
    );
    Ok(records)
}
