//! Result sink and failure ledger.
//!
//! Both are append-only text files shared by every worker. Each record is
//! formatted up front and written with a single `write_all` while holding the
//! file's lock, so records from concurrent workers never interleave.

use anyhow::Result;
use std::path::Path;

use crate::config::RecordLayout;
use crate::input::WorkItem;
use crate::outcome::ResolutionOutcome;

mod append;
mod record;

pub use append::AppendFile;
pub use record::{format_ledger_line, format_record};

/// Output file receiving one record per completed work item.
#[derive(Debug)]
pub struct ResultSink {
    file: AppendFile,
    layout: RecordLayout,
}

impl ResultSink {
    pub fn new(path: impl AsRef<Path>, layout: RecordLayout) -> Self {
        Self {
            file: AppendFile::new(path),
            layout,
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    /// Empties the file (creating it if needed). Called once at run start.
    pub fn truncate(&self) -> Result<()> {
        self.file.truncate()
    }

    /// Appends the record for `item`. The file is opened and closed per record.
    pub fn append(&self, item: &WorkItem, outcome: &ResolutionOutcome) -> Result<()> {
        let record = format_record(self.layout, item.title_or_empty(), &item.url, outcome);
        self.file.append(&record)
    }
}

/// Ledger of failed items, one `<url> -> <reason>` line each.
#[derive(Debug)]
pub struct FailureLedger {
    file: AppendFile,
}

impl FailureLedger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file: AppendFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn truncate(&self) -> Result<()> {
        self.file.truncate()
    }

    /// Appends a line for `outcome` if it is a failure. Returns whether a line was written.
    pub fn record(&self, url: &str, outcome: &ResolutionOutcome) -> Result<bool> {
        if !outcome.is_failure() {
            return Ok(false);
        }
        self.file.append(&format_ledger_line(url, outcome))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn item(index: usize, title: Option<&str>, url: &str) -> WorkItem {
        WorkItem::new(index, title.map(str::to_string), url.to_string())
    }

    #[test]
    fn compact_record_matches_expected_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let sink = ResultSink::new(&path, RecordLayout::Compact);
        sink.truncate().unwrap();
        sink.append(
            &item(1, Some("🌐 Example"), "https://linkvertise.com/abc123/xyz"),
            &ResolutionOutcome::Success("https://final.example.com/page".into()),
        )
        .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "🌐 Example\nhttps://final.example.com/page\n\n");
    }

    #[test]
    fn full_record_includes_source_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let sink = ResultSink::new(&path, RecordLayout::Full);
        sink.append(
            &item(1, None, "https://linkvertise.com/abc123/xyz"),
            &ResolutionOutcome::Skipped("semaphore timeout".into()),
        )
        .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "\nhttps://linkvertise.com/abc123/xyz\nSkipped (semaphore timeout)\n\n"
        );
    }

    #[test]
    fn truncate_clears_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "stale\n").unwrap();
        let sink = ResultSink::new(&path, RecordLayout::Compact);
        sink.truncate().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn ledger_skips_non_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.txt");
        let ledger = FailureLedger::new(&path);
        assert!(!ledger
            .record("https://a", &ResolutionOutcome::Success("https://b".into()))
            .unwrap());
        assert!(!ledger
            .record("https://a", &ResolutionOutcome::Skipped("semaphore timeout".into()))
            .unwrap());
        assert!(ledger
            .record(
                "https://a",
                &ResolutionOutcome::BypassFailed {
                    reason: "HTTP 500".into(),
                    attempts: 2
                }
            )
            .unwrap());
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "https://a -> Bypass failed after 2 attempts: HTTP 500\n");
    }

    #[test]
    fn multi_line_service_error_stays_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let failed = dir.path().join("failed.txt");
        let sink = ResultSink::new(&out, RecordLayout::Full);
        let ledger = FailureLedger::new(&failed);
        let url = "https://linkvertise.com/abc123/xyz";
        let err = crate::error::ResolveError::Protocol(
            "Link not found.\nPlease check the URL".to_string(),
        );
        let outcome = ResolutionOutcome::BypassFailed {
            reason: err.to_string(),
            attempts: 1,
        };

        sink.append(&item(1, Some("T"), url), &outcome).unwrap();
        ledger.record(url, &outcome).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert_eq!(
            text,
            format!("T\n{url}\nBypass failed after 1 attempt: error: Link not found. Please check the URL\n\n")
        );
        let ledger_text = std::fs::read_to_string(&failed).unwrap();
        assert_eq!(ledger_text.lines().count(), 1);
        assert!(ledger_text.starts_with(&format!("{url} -> Bypass failed after 1 attempt: ")));
    }

    #[test]
    fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let sink = Arc::new(ResultSink::new(&path, RecordLayout::Full));
        let threads = 8;
        let per_thread = 50;
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for i in 0..per_thread {
                        let url = format!("https://linkvertise.com/owner{t}/post{i}");
                        let title = format!("🌐 T{t}-{i}");
                        sink.append(
                            &item(i + 1, Some(&title), &url),
                            &ResolutionOutcome::Success(format!("https://dest/{t}/{i}")),
                        )
                        .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        let records: Vec<&str> = text.split_terminator("\n\n").collect();
        assert_eq!(records.len(), threads * per_thread);
        for record in records {
            let lines: Vec<&str> = record.lines().collect();
            assert_eq!(lines.len(), 3, "torn record: {record:?}");
            let tag = lines[0].trim_start_matches("🌐 T");
            let (t, i) = tag.split_once('-').unwrap();
            assert_eq!(lines[1], format!("https://linkvertise.com/owner{t}/post{i}"));
            assert_eq!(lines[2], format!("https://dest/{t}/{i}"));
        }
    }
}
