use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use grammy_enrich::config::{PipelineConfig, DEFAULT_MAX_TEXT_LEN, DEFAULT_MIN_YEAR};
use grammy_enrich::pipeline::{run, Sources};
use grammy_enrich::progress::{format_duration, ProgressMode};
use grammy_enrich::safety::validate_output_path;
use grammy_enrich::sink::write_enriched;

#[derive(Parser)]
#[command(name = "grammy-enrich")]
#[command(about = "Link an awards ledger to a streaming catalog and bin track features")]
struct Args {
    /// SQLite database holding the awards ledger
    primary_db: PathBuf,

    /// Streaming catalog CSV
    secondary_csv: PathBuf,

    /// Enriched CSV to write (name must contain "enriched")
    output: PathBuf,

    /// Awards table name
    #[arg(long, default_value = "grammy_awards")]
    table: String,

    #[arg(long, default_value_t = DEFAULT_MIN_YEAR)]
    min_year: i64,

    #[arg(long, default_value_t = DEFAULT_MAX_TEXT_LEN)]
    max_text_len: usize,

    #[arg(long, default_value = "0")]
    workers: usize,

    /// Write run statistics as JSON
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Hide progress bars and log progress lines instead
    #[arg(long)]
    log_only: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.workers)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    validate_output_path(
        &args.output,
        "enriched",
        &[args.primary_db.as_path(), args.secondary_csv.as_path()],
    )?;

    let start = Instant::now();
    let config = PipelineConfig {
        min_year: args.min_year,
        max_text_len: args.max_text_len,
        progress: ProgressMode::from_log_only(args.log_only),
        ..Default::default()
    };
    let sources = Sources {
        primary_db: args.primary_db,
        primary_table: args.table,
        secondary_csv: args.secondary_csv,
    };

    let output = run(&sources, &config).context("Enrichment failed")?;
    write_enriched(&args.output, &output.records).context("Failed to write enriched dataset")?;

    output.stats.log_phase("final");
    if let Some(path) = &args.stats {
        output
            .stats
            .write_to_file(path)
            .with_context(|| format!("Failed to write stats to {:?}", path))?;
    }

    println!("\n{:=<60}", "");
    println!("Enrichment complete!");
    println!("  Award rows: {}", output.stats.primary_rows);
    println!(
        "  Matched: {} exact, {} partial ({:.1}%)",
        output.stats.exact_matches,
        output.stats.partial_matches,
        output.stats.match_rate()
    );
    println!(
        "  Retained: {}/{} ({:.1}%)",
        output.stats.retained_rows,
        output.stats.merged_rows,
        output.stats.retention_rate()
    );
    println!("  Output: {:?}", args.output);
    println!("  Elapsed: {}", format_duration(start.elapsed()));
    println!("{:=<60}", "");

    Ok(())
}
