//! User-facing call-control actions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One call-control gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    Call,
    Hangup,
    Accept,
    Reject,
    Ignore,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Call,
        Action::Hangup,
        Action::Accept,
        Action::Reject,
        Action::Ignore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Call => "Call",
            Action::Hangup => "Hangup",
            Action::Accept => "Accept",
            Action::Reject => "Reject",
            Action::Ignore => "Ignore",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of actions currently valid to offer the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSet(BTreeSet<Action>);

impl ActionSet {
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn only(action: Action) -> Self {
        Self(BTreeSet::from([action]))
    }

    pub fn contains(&self, action: Action) -> bool {
        self.0.contains(&action)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|a| a.as_str()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
