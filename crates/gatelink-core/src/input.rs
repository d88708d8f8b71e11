//! Input list parsing.
//!
//! A line starting with [`TITLE_MARKER`] sets the title for the next URL line;
//! lines starting with `http://` or `https://` become work items paired with
//! the most recent title, which is then cleared. Everything else is ignored.

use anyhow::{Context, Result};
use std::path::Path;

pub const TITLE_MARKER: &str = "🌐";

/// One link to resolve. Consumed exactly once by one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// 1-based position in the input.
    pub index: usize,
    pub title: Option<String>,
    pub url: String,
}

impl WorkItem {
    pub fn new(index: usize, title: Option<String>, url: impl Into<String>) -> Self {
        Self {
            index,
            title,
            url: url.into(),
        }
    }

    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

pub fn parse_input(text: &str) -> Vec<WorkItem> {
    let mut items = Vec::new();
    let mut title: Option<String> = None;
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if line.starts_with(TITLE_MARKER) {
            title = Some(line.to_string());
        } else if line.starts_with("http://") || line.starts_with("https://") {
            items.push(WorkItem::new(items.len() + 1, title.take(), line));
        }
    }
    items
}

pub fn read_input(path: &Path) -> Result<Vec<WorkItem>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read input file: {}", path.display()))?;
    Ok(parse_input(&text))
}
