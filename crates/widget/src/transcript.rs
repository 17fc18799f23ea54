use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// One line of the conversation
///
/// Entries are immutable once created; the transcript only ever appends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    text: String,
    is_bot: bool,
    timestamp: Option<DateTime<Utc>>,
}

impl TranscriptEntry {
    /// Message typed by the visitor, stamped now
    pub fn user(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_bot: false, timestamp: Some(Utc::now()) }
    }

    /// Reply from the bot, stamped now
    pub fn bot(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_bot: true, timestamp: Some(Utc::now()) }
    }

    /// Entry without a timestamp
    pub fn unstamped(text: impl Into<String>, is_bot: bool) -> Self {
        Self { text: text.into(), is_bot, timestamp: None }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_bot(&self) -> bool {
        self.is_bot
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }
}

/// Ordered conversation history
///
/// Insertion order is display order. Unbounded by default; with a limit the
/// oldest entries are evicted first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    entries: VecDeque<TranscriptEntry>,
    max_entries: Option<usize>,
    evicted: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript that keeps at most `max_entries` entries (`None` = unbounded)
    pub fn with_limit(max_entries: Option<usize>) -> Self {
        Self { entries: VecDeque::new(), max_entries: max_entries.filter(|&n| n > 0), evicted: 0 }
    }

    /// Append to the end
    pub fn push(&mut self, entry: TranscriptEntry) {
        if let Some(max) = self.max_entries
            && self.entries.len() >= max
        {
            self.entries.pop_front();
            self.evicted += 1;
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries appended over the transcript's lifetime, evicted ones included
    pub fn total_appended(&self) -> usize {
        self.entries.len() + self.evicted
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.back()
    }

    pub fn get(&self, index: usize) -> Option<&TranscriptEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &VecDeque<TranscriptEntry> {
        &self.entries
    }
}
