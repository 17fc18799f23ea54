use crate::transcript::{Transcript, TranscriptEntry};

use std::fmt;
use uuid::Uuid;

/// Identity of one mounted widget session
///
/// Outstanding requests carry the id of the session that issued them so a
/// reply for a disposed session can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Conversation state owned by a single widget instance
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    is_open: bool,
    transcript: Transcript,
    is_busy: bool,
    draft: String,
}

impl Session {
    /// Closed, idle, empty session
    pub fn new() -> Self {
        Self::with_transcript_limit(None)
    }

    pub fn with_transcript_limit(max_entries: Option<usize>) -> Self {
        Self {
            id: SessionId::new(),
            is_open: false,
            transcript: Transcript::with_limit(max_entries),
            is_busy: false,
            draft: String::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Flip the open flag and return the new value
    pub fn toggle(&mut self) -> bool {
        self.is_open = !self.is_open;
        self.is_open
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn append_entry(&mut self, entry: TranscriptEntry) {
        self.transcript.push(entry);
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.is_busy = busy;
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub(crate) fn take_draft(&mut self) -> String {
        std::mem::take(&mut self.draft)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_state() {
        let session = Session::new();
        assert!(!session.is_open());
        assert!(!session.is_busy());
        assert!(session.transcript().is_empty());
        assert_eq!(session.draft(), "");
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(Session::new().id(), Session::new().id());
    }

    #[test]
    fn test_open_close_toggle_leave_transcript() {
        let mut session = Session::new();
        session.append_entry(TranscriptEntry::user("Hi"));

        session.open();
        assert!(session.is_open());
        session.close();
        assert!(!session.is_open());
        assert!(session.toggle());
        assert!(!session.toggle());

        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_draft_take() {
        let mut session = Session::new();
        session.set_draft("Halo");
        assert_eq!(session.take_draft(), "Halo");
        assert_eq!(session.draft(), "");
    }

    #[test]
    fn test_busy_flag() {
        let mut session = Session::new();
        session.set_busy(true);
        assert!(session.is_busy());
        session.set_busy(false);
        assert!(!session.is_busy());
    }
}
