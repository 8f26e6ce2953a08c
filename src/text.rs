//! Draft text and committed, position-frozen stamps.

use serde::{Deserialize, Serialize};

use crate::drag::Position;

/// A frozen, positioned text artifact created from the draft at commit
/// time. Its position is a snapshot and is never re-linked to the live
/// drag session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampedText {
    pub text: String,
    pub position: Position,
}

/// Holds the in-progress draft and the committed stamps.
///
/// Stamps form an append-only ordered sequence rendered in insertion
/// order. Commit is unconditional: an empty draft still stamps.
#[derive(Debug, Clone, Default)]
pub struct TextCommitBuffer {
    draft: String,
    stamps: Vec<StampedText>,
}

impl TextCommitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the live (uncommitted) draft text.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Snapshot the draft at the given position into the stamp list and
    /// clear the draft.
    pub fn commit(&mut self, position: Position) -> &StampedText {
        self.stamps.push(StampedText {
            text: std::mem::take(&mut self.draft),
            position,
        });
        self.stamps.last().expect("stamp just pushed")
    }

    pub fn stamps(&self) -> &[StampedText] {
        &self.stamps
    }

    /// Drop the draft and all stamps. Used when an export settles.
    pub fn clear(&mut self) {
        self.draft.clear();
        self.stamps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_snapshots_draft_and_position() {
        let mut buf = TextCommitBuffer::new();
        buf.set_draft("Hello");
        let stamp = buf.commit(Position::new(105.0, 105.0)).clone();
        assert_eq!(stamp.text, "Hello");
        assert_eq!(stamp.position, Position::new(105.0, 105.0));
        assert_eq!(buf.draft(), "");
    }

    #[test]
    fn stamps_append_in_order() {
        let mut buf = TextCommitBuffer::new();
        buf.set_draft("first");
        buf.commit(Position::new(1.0, 1.0));
        buf.set_draft("second");
        buf.commit(Position::new(2.0, 2.0));
        let texts: Vec<&str> = buf.stamps().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[test]
    fn empty_draft_still_stamps() {
        let mut buf = TextCommitBuffer::new();
        buf.commit(Position::new(0.0, 0.0));
        assert_eq!(buf.stamps().len(), 1);
        assert_eq!(buf.stamps()[0].text, "");
    }

    #[test]
    fn stamp_position_is_a_snapshot() {
        let mut buf = TextCommitBuffer::new();
        buf.set_draft("pinned");
        let at_commit = Position::new(30.0, 40.0);
        buf.commit(at_commit);
        // The caller's position value moving on has no effect on the stamp.
        let moved = at_commit.translated(100.0, 100.0);
        assert_ne!(buf.stamps()[0].position, moved);
        assert_eq!(buf.stamps()[0].position, at_commit);
    }
}
