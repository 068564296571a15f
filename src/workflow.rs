//! Sales-lead workflow: an explicit finite state machine over the lead
//! status column. One transition table drives both the apply path and the
//! valid-next-states query.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Pending,
    Waiting,
    Interested,
    NotInterested,
    CallbackScheduled,
    Cancelled,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 6] = [
        LeadStatus::Pending,
        LeadStatus::Waiting,
        LeadStatus::Interested,
        LeadStatus::NotInterested,
        LeadStatus::CallbackScheduled,
        LeadStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::Pending => "pending",
            LeadStatus::Waiting => "waiting",
            LeadStatus::Interested => "interested",
            LeadStatus::NotInterested => "not_interested",
            LeadStatus::CallbackScheduled => "callback_scheduled",
            LeadStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        LeadStatus::ALL.into_iter().find(|v| v.as_str() == s)
    }

    /// Terminal states are absorbing: nothing transitions out of them.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LeadStatus::Interested | LeadStatus::NotInterested | LeadStatus::Cancelled
        )
    }

    /// The transition table. `pending` is forward-only: no state, including
    /// `pending` itself, re-enters it.
    pub fn allowed_next(self) -> &'static [LeadStatus] {
        match self {
            LeadStatus::Pending => &[
                LeadStatus::Waiting,
                LeadStatus::Interested,
                LeadStatus::NotInterested,
                LeadStatus::CallbackScheduled,
                LeadStatus::Cancelled,
            ],
            LeadStatus::Waiting => &[
                LeadStatus::Interested,
                LeadStatus::NotInterested,
                LeadStatus::CallbackScheduled,
                LeadStatus::Cancelled,
            ],
            LeadStatus::CallbackScheduled => &[
                LeadStatus::Interested,
                LeadStatus::NotInterested,
                LeadStatus::Cancelled,
            ],
            LeadStatus::Interested | LeadStatus::NotInterested | LeadStatus::Cancelled => &[],
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure transition check shared by the apply and query paths.
pub fn validate_transition(current: LeadStatus, target: LeadStatus) -> Result<(), AppError> {
    if current.is_terminal() {
        return Err(AppError::TransitionLocked {
            current: current.as_str().into(),
        });
    }
    if !current.allowed_next().contains(&target) {
        return Err(AppError::IllegalTransition {
            from: current.as_str().into(),
            to: target.as_str().into(),
            allowed: current.allowed_next().iter().map(|s| s.as_str()).collect(),
        });
    }
    Ok(())
}

/// States reachable from `current`; empty for terminal states. Consistent
/// with `validate_transition` by construction (same table).
pub fn valid_next_states(current: LeadStatus) -> &'static [LeadStatus] {
    current.allowed_next()
}
