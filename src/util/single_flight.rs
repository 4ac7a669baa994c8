use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Lifecycle of one submission session.
///
/// Modeled as an explicit state rather than a busy flag so that the
/// only legal transitions are Idle -> Submitting -> Terminal, and a new
/// session can only begin from Idle or Terminal. A Terminal session is
/// immediately recycled: its gate entry is dropped, so a settled owner
/// reads as Idle again and the map never grows with owners that have
/// no submission in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Terminal,
}

/// Per-owner single-flight gate over listing submissions.
///
/// At most one submission per owner may be in the Submitting state at a
/// time; a second attempt while one is in flight is rejected, not queued.
#[derive(Debug, Default, Clone)]
pub struct SubmissionGate {
    states: Arc<Mutex<HashMap<String, SubmissionState>>>,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for an owner. Owners with no submission in flight
    /// are Idle.
    pub fn state(&self, owner_id: &str) -> SubmissionState {
        self.states
            .lock()
            .expect("submission gate lock poisoned")
            .get(owner_id)
            .copied()
            .unwrap_or(SubmissionState::Idle)
    }

    /// Transition an owner into Submitting.
    ///
    /// Returns a permit whose drop settles the session and releases the
    /// owner, or `None` when a submission is already in flight for this
    /// owner.
    pub fn begin(&self, owner_id: &str) -> Option<SubmissionPermit> {
        let mut states = self.states.lock().expect("submission gate lock poisoned");
        match states.get(owner_id).copied().unwrap_or(SubmissionState::Idle) {
            SubmissionState::Submitting => {
                warn!(owner_id = %owner_id, "Rejecting concurrent submission");
                None
            }
            SubmissionState::Idle | SubmissionState::Terminal => {
                states.insert(owner_id.to_string(), SubmissionState::Submitting);
                debug!(owner_id = %owner_id, "Submission started");
                Some(SubmissionPermit {
                    gate: self.clone(),
                    owner_id: owner_id.to_string(),
                })
            }
        }
    }
}

/// RAII handle for an in-flight submission.
pub struct SubmissionPermit {
    gate: SubmissionGate,
    owner_id: String,
}

impl Drop for SubmissionPermit {
    fn drop(&mut self) {
        let mut states = self
            .gate
            .states
            .lock()
            .expect("submission gate lock poisoned");
        states.remove(&self.owner_id);
        debug!(owner_id = %self.owner_id, "Submission settled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_owner_is_idle() {
        let gate = SubmissionGate::new();
        assert_eq!(gate.state("alice"), SubmissionState::Idle);
    }

    #[test]
    fn test_begin_moves_to_submitting() {
        let gate = SubmissionGate::new();
        let permit = gate.begin("alice");
        assert!(permit.is_some());
        assert_eq!(gate.state("alice"), SubmissionState::Submitting);
    }

    #[test]
    fn test_second_begin_rejected_while_submitting() {
        let gate = SubmissionGate::new();
        let _permit = gate.begin("alice").unwrap();
        assert!(gate.begin("alice").is_none());
    }

    #[test]
    fn test_other_owner_not_blocked() {
        let gate = SubmissionGate::new();
        let _permit = gate.begin("alice").unwrap();
        assert!(gate.begin("bob").is_some());
    }

    #[test]
    fn test_drop_settles_session_and_allows_resubmission() {
        let gate = SubmissionGate::new();
        drop(gate.begin("alice").unwrap());
        assert_eq!(gate.state("alice"), SubmissionState::Idle);
        assert!(gate.begin("alice").is_some());
    }

    #[test]
    fn test_settled_owners_are_not_retained() {
        let gate = SubmissionGate::new();
        drop(gate.begin("alice").unwrap());
        drop(gate.begin("bob").unwrap());
        assert!(gate
            .states
            .lock()
            .expect("submission gate lock poisoned")
            .is_empty());
    }
}
