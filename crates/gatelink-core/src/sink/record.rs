use crate::config::RecordLayout;
use crate::outcome::ResolutionOutcome;

/// Formats one output record, terminated by a blank line.
///
/// `Full`: title, source URL, outcome. `Compact`: title, outcome.
/// A missing title is an empty first line.
pub fn format_record(
    layout: RecordLayout,
    title: &str,
    url: &str,
    outcome: &ResolutionOutcome,
) -> String {
    match layout {
        RecordLayout::Full => format!("{}\n{}\n{}\n\n", title, url, outcome),
        RecordLayout::Compact => format!("{}\n{}\n\n", title, outcome),
    }
}

pub fn format_ledger_line(url: &str, outcome: &ResolutionOutcome) -> String {
    format!("{} -> {}\n", url, outcome)
}
