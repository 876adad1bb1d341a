//! Progress reporting for the long pipeline phases.
//!
//! `ProgressMode` travels with `PipelineConfig` into every phase that draws
//! something. Interactive runs get indicatif bars; `LogOnly` hides them and
//! reports milestones through `log` instead, which suits piped output and
//! `tail -f` on a log file.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})";
const SPINNER_TEMPLATE: &str = "{msg} {spinner} [{elapsed_precise}]";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressMode {
    /// Draw bars and spinners on stderr
    #[default]
    Bars,
    /// No drawing; periodic `log::info!` lines
    LogOnly,
}

impl ProgressMode {
    pub fn from_log_only(log_only: bool) -> Self {
        if log_only {
            ProgressMode::LogOnly
        } else {
            ProgressMode::Bars
        }
    }

    /// Bar over `len` items
    pub fn bar(self, len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        match self {
            ProgressMode::Bars => pb.set_style(
                ProgressStyle::default_bar()
                    .template(BAR_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            ),
            ProgressMode::LogOnly => pb.set_draw_target(ProgressDrawTarget::hidden()),
        }
        pb.set_message(msg.to_string());
        pb
    }

    /// Spinner for phases of unknown length (reading inputs)
    pub fn spinner(self, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        match self {
            ProgressMode::Bars => {
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template(SPINNER_TEMPLATE)
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb.enable_steady_tick(Duration::from_millis(100));
            }
            ProgressMode::LogOnly => pb.set_draw_target(ProgressDrawTarget::hidden()),
        }
        pb.set_message(msg.to_string());
        pb
    }

    /// Log `current/total` every `interval` items and at the end.
    /// Silent when bars are drawn.
    pub fn log_progress(self, phase: &str, current: u64, total: u64, interval: u64) {
        if self == ProgressMode::LogOnly && is_milestone(current, total, interval) {
            let pct = 100.0 * current as f64 / total as f64;
            log::info!("[{}] {}/{} ({:.1}%)", phase, current, total, pct);
        }
    }
}

fn is_milestone(current: u64, total: u64, interval: u64) -> bool {
    total > 0 && interval > 0 && (current % interval == 0 || current == total)
}

/// Seconds below a minute, minutes above
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
