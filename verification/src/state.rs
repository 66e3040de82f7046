//! Verification attempt state tracking.

use serde::{Deserialize, Serialize};

use crate::error::VerificationError;

/// Phase of one verification attempt. Phases only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptState {
    /// Payload received, not yet validated.
    Received,
    /// Checks are running.
    CollectingEvidence,
    /// The collection deadline or a cancellation cut some checks short.
    PartiallyCollected,
    /// Verdict computed.
    Scored,
    /// Attempt finished.
    Done,
}

impl AttemptState {
    fn can_advance_to(self, next: AttemptState) -> bool {
        use AttemptState::*;
        matches!(
            (self, next),
            (Received, CollectingEvidence)
                | (CollectingEvidence, PartiallyCollected)
                | (CollectingEvidence, Scored)
                | (PartiallyCollected, Scored)
                | (Scored, Done)
        )
    }
}

/// Records the path an attempt took through [`AttemptState`].
#[derive(Clone, Debug)]
pub struct AttemptTracker {
    current: AttemptState,
    partial: bool,
}

impl AttemptTracker {
    pub fn new() -> Self {
        Self {
            current: AttemptState::Received,
            partial: false,
        }
    }

    pub fn current(&self) -> AttemptState {
        self.current
    }

    /// Whether the attempt passed through `PartiallyCollected`.
    pub fn was_partial(&self) -> bool {
        self.partial
    }

    pub fn advance(&mut self, next: AttemptState) -> Result<(), VerificationError> {
        if !self.current.can_advance_to(next) {
            return Err(VerificationError::IllegalTransition {
                from: self.current,
                to: next,
            });
        }
        if next == AttemptState::PartiallyCollected {
            self.partial = true;
        }
        self.current = next;
        Ok(())
    }
}

impl Default for AttemptTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_path_with_partial_collection() {
        let mut t = AttemptTracker::new();
        t.advance(AttemptState::CollectingEvidence).unwrap();
        t.advance(AttemptState::PartiallyCollected).unwrap();
        t.advance(AttemptState::Scored).unwrap();
        t.advance(AttemptState::Done).unwrap();
        assert!(t.was_partial());
        assert_eq!(t.current(), AttemptState::Done);
    }

    #[test]
    fn states_are_never_reentered_or_skipped() {
        let mut t = AttemptTracker::new();
        assert!(t.advance(AttemptState::Scored).is_err());
        t.advance(AttemptState::CollectingEvidence).unwrap();
        assert!(t.advance(AttemptState::CollectingEvidence).is_err());
        t.advance(AttemptState::Scored).unwrap();
        t.advance(AttemptState::Done).unwrap();
        assert!(matches!(
            t.advance(AttemptState::Received),
            Err(VerificationError::IllegalTransition { .. })
        ));
        assert!(!t.was_partial());
    }
}
