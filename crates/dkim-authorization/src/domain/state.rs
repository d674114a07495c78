//! # Dispatch State Machine
//!
//! ```text
//! Idle → MessageBuilt → Signed → Submitted → Mined
//!   │                               ↑    └──→ Failed
//!   └──────── (kill switch) ────────┘
//! ```
//!
//! `Mined` and `Failed` are terminal. Errors before `Submitted` end the
//! dispatch without entering `Failed`; `Failed` is reserved for a
//! transaction that was sent but never confirmed.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchState {
    Idle,
    MessageBuilt,
    Signed,
    Submitted,
    Mined,
    Failed,
}

impl DispatchState {
    /// Whether `self → next` is a legal edge.
    pub fn can_transition_to(&self, next: DispatchState) -> bool {
        use DispatchState::*;
        matches!(
            (self, next),
            (Idle, MessageBuilt)
                | (Idle, Submitted)
                | (MessageBuilt, Signed)
                | (Signed, Submitted)
                | (Submitted, Mined)
                | (Submitted, Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DispatchState::Mined | DispatchState::Failed)
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchState::Idle => "idle",
            DispatchState::MessageBuilt => "message-built",
            DispatchState::Signed => "signed",
            DispatchState::Submitted => "submitted",
            DispatchState::Mined => "mined",
            DispatchState::Failed => "failed",
        };
        f.write_str(name)
    }
}
