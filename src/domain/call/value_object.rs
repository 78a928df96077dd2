//! Call value objects

use serde::{Deserialize, Serialize};

use super::action::{Action, ActionSet};

/// Call direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallDirection {
    /// Placed from this device
    Outgoing,
    /// Offered to this device by the provider
    Incoming,
}

/// Call session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// No device session exists yet
    Unset,
    /// Token requested, waiting for the device to report ready
    SettingUp,
    /// Device ready, no call
    Idle,
    /// Outgoing call requested
    Dialing,
    /// Remote party is being alerted
    RingingOut,
    /// Incoming call is being offered
    RingingIn,
    /// Media established
    OnCall,
}

impl SessionState {
    /// Check if state transition is valid
    pub fn can_transition_to(&self, new_state: &SessionState) -> bool {
        use SessionState::*;

        match (self, new_state) {
            // From Unset
            (Unset, SettingUp) => true,

            // From SettingUp
            (SettingUp, Idle) => true,
            (SettingUp, Unset) => true,

            // From Idle
            (Idle, Dialing) => true,
            (Idle, RingingIn) => true,

            // From Dialing
            (Dialing, RingingOut) => true,
            (Dialing, OnCall) => true,
            (Dialing, Idle) => true,

            // From RingingOut
            (RingingOut, OnCall) => true,
            (RingingOut, Idle) => true,

            // From RingingIn
            (RingingIn, OnCall) => true,
            (RingingIn, Idle) => true,

            // From OnCall
            (OnCall, Idle) => true,

            // All other transitions are invalid
            _ => false,
        }
    }

    /// A call exists (ringing, dialing or connected)
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionState::Dialing
                | SessionState::RingingOut
                | SessionState::RingingIn
                | SessionState::OnCall
        )
    }

    /// Device session exists and setup has completed
    pub fn has_device(&self) -> bool {
        !matches!(self, SessionState::Unset | SessionState::SettingUp)
    }

    /// Actions valid in this state
    pub fn actions(&self) -> ActionSet {
        use SessionState::*;

        match self {
            Unset | Idle => ActionSet::only(Action::Call),
            SettingUp => ActionSet::empty(),
            Dialing | RingingOut | OnCall => ActionSet::only(Action::Hangup),
            RingingIn => ActionSet::from_iter([Action::Accept, Action::Reject, Action::Ignore]),
        }
    }
}
