//! End-of-session summary output

use serde::Serialize;

use formcheck_core::SessionStats;
use formcheck_runtime::{SessionOutcome, SessionReport, TerminationReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct SummaryJson<'a> {
    reason: &'static str,
    frames_advanced: u64,
    frames_compared: u64,
    stats: Option<&'a SessionStats>,
}

fn reason_name(reason: TerminationReason) -> &'static str {
    match reason {
        TerminationReason::Quit => "quit",
        TerminationReason::EndOfStream => "end_of_stream",
        TerminationReason::Aborted => "aborted",
    }
}

pub fn render(report: &SessionReport, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => serde_json::to_string_pretty(&SummaryJson {
            reason: reason_name(report.reason),
            frames_advanced: report.frames_advanced,
            frames_compared: report.frames_compared,
            stats: report.outcome.stats(),
        }),
    }
}

fn render_text(report: &SessionReport) -> String {
    let mut out = String::from("Final Statistics:\n");
    match &report.outcome {
        SessionOutcome::Completed(stats) => {
            out.push_str(&format!("Average Similarity: {:.3}\n", stats.mean));
            out.push_str(&format!("Best Match: {:.3}\n", stats.max));
            out.push_str(&format!("Worst Match: {:.3}\n", stats.min));
            out.push_str(&format!("Total Frames Processed: {}\n", stats.count));
        }
        SessionOutcome::Empty => {
            out.push_str(&format!(
                "No frame had a pose on both videos; nothing to score ({} frames read)\n",
                report.frames_advanced
            ));
        }
        SessionOutcome::Aborted(err) => {
            out.push_str(&format!(
                "Session aborted after {} frames: {}\n",
                report.frames_advanced, err
            ));
        }
    }
    if report.reason == TerminationReason::Quit {
        out.push_str("Session stopped early\n");
    }
    out
}
