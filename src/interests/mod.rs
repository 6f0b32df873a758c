//! Edit-session interest tracking.
//!
//! During one add/edit session the user freely adds and deletes interests;
//! only the deltas are sent to the server. The tracker remembers which
//! deleted interests already exist server-side so a delete-then-readd
//! round-trips to no change at all.

use crate::changes::fields;

/// How an interest entered the session, and whether it has been deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestState {
    /// Existed on the server when the session started.
    Original,
    /// An `Original` the user deleted; the server must be told.
    DeletedOriginal,
    /// Added by the user during this session.
    Added,
    /// An `Added` the user deleted; the server never knew about it.
    DeletedAdded,
}

/// One interest within an edit session.
#[derive(Debug, Clone)]
pub struct InterestRecord {
    pub text: String,
    pub state: InterestState,
}

impl InterestRecord {
    fn new(text: &str, state: InterestState) -> Self {
        Self {
            text: text.to_string(),
            state,
        }
    }

    /// Flag the interest as deleted, keeping track of whether it originally
    /// came from the server.
    fn set_deleted(&mut self) {
        self.state = match self.state {
            InterestState::Original => InterestState::DeletedOriginal,
            InterestState::Added => InterestState::DeletedAdded,
            other => other,
        };
    }
}

/// Tracks the interests in effect for one edit session and the deletions of
/// server-known interests that must be communicated on save.
#[derive(Debug, Default)]
pub struct InterestDiffTracker {
    /// The session's effective interests, in add order.
    current: Vec<InterestRecord>,
    /// Deleted records kept aside so a re-add restores them, and so
    /// server-side deletes can be encoded.
    removed: Vec<InterestRecord>,
}

impl InterestDiffTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the tracker with the interests the person already has when
    /// the edit session starts. Called once per session.
    pub fn initialize(&mut self, owner_interests: &[String]) {
        self.current = owner_interests
            .iter()
            .map(|text| InterestRecord::new(text, InterestState::Original))
            .collect();
        self.removed.clear();
    }

    /// The session's effective interest texts.
    pub fn current_interests(&self) -> Vec<&str> {
        self.current.iter().map(|r| r.text.as_str()).collect()
    }

    /// Add an interest. Returns `false` if an interest equal
    /// case-insensitively to `text` is already in effect, so the caller can
    /// surface a duplicate-interest message. A previously deleted interest
    /// is restored rather than re-created, keeping the server delta empty.
    pub fn add(&mut self, text: &str) -> bool {
        if find_record(&self.current, text).is_some() {
            return false;
        }

        if let Some(index) = find_record(&self.removed, text) {
            let mut record = self.removed.remove(index);
            record.state = match record.state {
                InterestState::DeletedOriginal => InterestState::Original,
                _ => InterestState::Added,
            };
            self.current.push(record);
        } else {
            self.current.push(InterestRecord::new(text, InterestState::Added));
        }

        true
    }

    /// Delete an interest from the session. No-op if absent. Deletes of
    /// server-known interests are remembered so `encode` can report them.
    pub fn delete(&mut self, text: &str) {
        let Some(index) = find_record(&self.current, text) else {
            return;
        };

        let mut record = self.current.remove(index);
        record.set_deleted();

        // Only deletions the server knows about need to be tracked further;
        // an added-then-deleted interest never reaches the server.
        if record.state == InterestState::DeletedOriginal {
            self.removed.push(record);
        }
    }

    /// Encode the session's deltas as a change-list fragment: one
    /// `AddInterest=` token per added interest (in add order), then one
    /// `DeleteInterest=` token per deleted original (in delete order).
    /// Empty string when nothing changed.
    pub fn encode(&self) -> String {
        let mut tokens: Vec<String> = self
            .current
            .iter()
            .filter(|record| record.state == InterestState::Added)
            .map(|record| format!("{}={}", fields::ADD_INTEREST, record.text))
            .collect();

        tokens.extend(
            self.removed
                .iter()
                .map(|record| format!("{}={}", fields::DELETE_INTEREST, record.text)),
        );

        tokens.join("@")
    }
}

/// Case-insensitive linear scan; first match wins.
fn find_record(records: &[InterestRecord], text: &str) -> Option<usize> {
    records
        .iter()
        .position(|record| record.text.eq_ignore_ascii_case(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_with(interests: &[&str]) -> InterestDiffTracker {
        let mut tracker = InterestDiffTracker::new();
        let owned: Vec<String> = interests.iter().map(|s| s.to_string()).collect();
        tracker.initialize(&owned);
        tracker
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let mut tracker = InterestDiffTracker::new();
        assert!(tracker.add("Chess"));
        assert!(!tracker.add("Chess"));
        assert_eq!(tracker.current_interests(), vec!["Chess"]);
    }

    #[test]
    fn test_add_rejects_duplicate_case_insensitively() {
        let mut tracker = InterestDiffTracker::new();
        assert!(tracker.add("Cycling"));
        assert!(!tracker.add("cycling"));
    }

    #[test]
    fn test_delete_original_is_encoded() {
        let mut tracker = tracker_with(&["Programming", "Baseball"]);
        tracker.delete("Programming");

        let fragment = tracker.encode();
        assert!(fragment.contains("DeleteInterest=Programming"));
        assert!(!fragment.contains("AddInterest=Programming"));
    }

    #[test]
    fn test_delete_then_readd_restores_original() {
        let mut tracker = tracker_with(&["Chess"]);
        tracker.delete("Chess");
        assert!(tracker.add("Chess"));

        assert_eq!(tracker.encode(), "");
        assert_eq!(tracker.current_interests(), vec!["Chess"]);
    }

    #[test]
    fn test_add_then_delete_reaches_nothing() {
        let mut tracker = tracker_with(&[]);
        assert!(tracker.add("Skiing"));
        tracker.delete("Skiing");

        assert_eq!(tracker.encode(), "");
    }

    #[test]
    fn test_readd_of_deleted_added_comes_back_as_added() {
        let mut tracker = tracker_with(&["Chess"]);
        assert!(tracker.add("Skiing"));
        tracker.delete("Skiing");
        // Deleted-added entries are dropped entirely, so the re-add is new.
        assert!(tracker.add("Skiing"));

        assert_eq!(tracker.encode(), "AddInterest=Skiing");
    }

    #[test]
    fn test_delete_absent_interest_is_noop() {
        let mut tracker = tracker_with(&["Chess"]);
        tracker.delete("Golf");

        assert_eq!(tracker.encode(), "");
        assert_eq!(tracker.current_interests(), vec!["Chess"]);
    }

    #[test]
    fn test_delete_matches_case_insensitively() {
        let mut tracker = tracker_with(&["Baseball"]);
        tracker.delete("baseball");

        assert_eq!(tracker.encode(), "DeleteInterest=Baseball");
    }

    #[test]
    fn test_encode_orders_adds_before_deletes() {
        let mut tracker = tracker_with(&["Programming", "Baseball"]);
        tracker.delete("Baseball");
        assert!(tracker.add("Cycling"));

        assert_eq!(tracker.encode(), "AddInterest=Cycling@DeleteInterest=Baseball");
    }

    #[test]
    fn test_empty_tracker_encodes_empty_string() {
        assert_eq!(InterestDiffTracker::new().encode(), "");
        assert_eq!(tracker_with(&["Chess"]).encode(), "");
    }

    #[test]
    fn test_initialize_resets_prior_session() {
        let mut tracker = tracker_with(&["Chess"]);
        tracker.delete("Chess");
        tracker.initialize(&["Golf".to_string()]);

        assert_eq!(tracker.encode(), "");
        assert_eq!(tracker.current_interests(), vec!["Golf"]);
    }
}
