//! Renders scheduler events on stdout; abandonment diagnostics go to stderr
//! as soon as they happen.

use aerials_core::scheduler::{BatchEvent, ProgressStats};
use std::sync::mpsc::Receiver;

const MIB: f64 = 1_048_576.0;

/// Consumes events until every sender (the batch) is gone.
pub fn print_events(rx: Receiver<BatchEvent>) {
    for event in rx {
        match event {
            BatchEvent::Started { label, .. } => println!("Downloading {}", label),
            BatchEvent::Progress(stats) => println!("  {}  {}", stats.label, format_progress(&stats)),
            BatchEvent::Finished(report) => match report.diagnostic() {
                Some(line) => eprintln!("{}", line),
                None => println!("{}: {}", report.label, report.outcome),
            },
        }
    }
}

pub fn format_progress(stats: &ProgressStats) -> String {
    let done_mib = stats.bytes_done as f64 / MIB;
    let rate_mib = stats.bytes_per_sec() / MIB;
    let eta = stats
        .eta_secs()
        .map(|s| format!("{:.0}s", s))
        .unwrap_or_else(|| "?".to_string());
    match stats.fraction() {
        Some(f) => format!(
            "{:.1} / {:.1} MiB ({:.1}%)  {:.2} MiB/s  ETA {}",
            done_mib,
            stats.total_bytes as f64 / MIB,
            f * 100.0,
            rate_mib,
            eta
        ),
        None => format!("{:.1} MiB  {:.2} MiB/s", done_mib, rate_mib),
    }
}
