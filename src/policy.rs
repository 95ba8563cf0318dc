//! Workspace policy: which workspaces may be focused right now.
//!
//! [`allowed`] is a pure function of a timer snapshot, the restricted set and
//! a candidate workspace number.  [`PolicyState`] remembers where to send the
//! user back to when a switch is denied.

use crate::event::TimerSnapshot;
use std::collections::BTreeSet;

/// Decide whether focusing workspace `candidate` is allowed.
///
/// Restrictions only apply during a running (unpaused) focus interval.
pub fn allowed(snapshot: &TimerSnapshot, restricted: &BTreeSet<i32>, candidate: i32) -> bool {
    if !snapshot.is_focusing() {
        return true;
    }
    !restricted.contains(&candidate)
}

/// The immutable set of workspaces restricted during a focus interval.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspacePolicy {
    restricted: BTreeSet<i32>,
}

impl WorkspacePolicy {
    pub fn new(restricted: impl IntoIterator<Item = i32>) -> Self {
        Self {
            restricted: restricted.into_iter().collect(),
        }
    }

    /// See [`allowed`].
    pub fn allows(&self, snapshot: &TimerSnapshot, candidate: i32) -> bool {
        allowed(snapshot, &self.restricted, candidate)
    }

    pub fn restricted(&self) -> &BTreeSet<i32> {
        &self.restricted
    }
}

/// Name of the last workspace the user was allowed to be on.
///
/// Only the workspace handler writes it, and only after an allowed focus
/// event, so it never names a denied workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyState {
    last_allowed: String,
}

impl PolicyState {
    /// Seed with the workspace focused when the daemon starts.
    pub fn new(focused: impl Into<String>) -> Self {
        Self {
            last_allowed: focused.into(),
        }
    }

    /// Redirect target for the next denial.
    pub fn last_allowed(&self) -> &str {
        &self.last_allowed
    }

    /// Record an allowed focus.
    pub fn allow(&mut self, name: impl Into<String>) {
        self.last_allowed = name.into();
    }
}
