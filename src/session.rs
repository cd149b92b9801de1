//! Voting session module for tracking per-user conversation state.

use std::collections::HashMap;
use std::sync::Mutex;

use log::debug;
use serde::{Deserialize, Serialize};

/// Stage of the voting conversation for a single user
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotingStage {
    #[default]
    Idle,
    AwaitingPhone,
    AwaitingScreenshot,
    Completed,
}

/// Errors produced by session state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// `accept_phone` was called outside the `AwaitingPhone` stage
    NotAwaitingPhone(VotingStage),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::NotAwaitingPhone(stage) => {
                write!(f, "Phone number accepted outside AwaitingPhone stage: {stage:?}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Per-user conversation state.
///
/// Invariant: `pending_campaign_tag` is `Some` only while the stage is
/// `AwaitingPhone`; every transition out of that stage clears it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VotingSession {
    stage: VotingStage,
    pending_campaign_tag: Option<String>,
}

impl VotingSession {
    pub fn stage(&self) -> VotingStage {
        self.stage
    }

    /// Enter the voting flow, storing the campaign tag the user arrived
    /// with. Valid from any stage: a user who already completed a flow may
    /// re-invoke the entry command and go around again.
    pub fn begin(&mut self, tag: Option<String>) {
        self.stage = VotingStage::AwaitingPhone;
        self.pending_campaign_tag = tag;
    }

    /// Record that a valid phone number arrived, returning the campaign tag
    /// the flow was started with (if any). Only valid in `AwaitingPhone`.
    pub fn accept_phone(&mut self) -> Result<Option<String>, SessionError> {
        if self.stage != VotingStage::AwaitingPhone {
            return Err(SessionError::NotAwaitingPhone(self.stage));
        }
        self.stage = VotingStage::AwaitingScreenshot;
        Ok(self.pending_campaign_tag.take())
    }

    /// Record a confirmation screenshot. Lenient: outside
    /// `AwaitingScreenshot` this is a no-op, and the return value tells the
    /// caller whether the session actually advanced.
    pub fn accept_screenshot(&mut self) -> bool {
        if self.stage == VotingStage::AwaitingScreenshot {
            self.stage = VotingStage::Completed;
            true
        } else {
            false
        }
    }

    /// Force the session back to `Idle`. Used on unrecoverable errors.
    pub fn reset(&mut self) {
        self.stage = VotingStage::Idle;
        self.pending_campaign_tag = None;
    }
}

/// Explicit store mapping a user identifier to its [`VotingSession`].
///
/// Sessions are created lazily on first access; an absent session is
/// equivalent to `Idle`. Mutation happens inside `with_session`, a short
/// critical section with no awaits, which gives the at-most-one-writer
/// semantics the router needs per user.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, VotingSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the (get-or-created) session for `user_id`.
    pub fn with_session<T>(&self, user_id: i64, f: impl FnOnce(&mut VotingSession) -> T) -> T {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let session = sessions.entry(user_id).or_insert_with(|| {
            debug!("Creating voting session for user {user_id}");
            VotingSession::default()
        });
        f(session)
    }

    /// Current stage for a user without mutating anything.
    pub fn stage_of(&self, user_id: i64) -> VotingStage {
        let sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.get(&user_id).map(|s| s.stage()).unwrap_or_default()
    }
}
