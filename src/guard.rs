//! Enforces the workspace policy on every focus change.
//!
//! [`WorkspaceGuard`] owns the [`PolicyState`] and reacts to
//! [`WorkspaceFocusEvent`]s by re-querying the timer, evaluating the
//! [`WorkspacePolicy`], and sending the user back to the last allowed
//! workspace when the switch is denied.

use crate::event::WorkspaceFocusEvent;
use crate::policy::{PolicyState, WorkspacePolicy};
use crate::traits::{Severity, TimerService, WarningSurface, WindowManager};
use log::{debug, error, warn};

/// What the guard decided for one focus event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The policy allows the workspace.
    Allowed,
    /// The timer could not be queried; the switch was let through.
    AllowedFailOpen,
    /// The switch was denied and the user sent back to `redirect_to`.
    Denied { redirect_to: String },
}

/// Orchestrates policy evaluation and window-manager redirects.
///
/// Generic over every collaborator so it can run against i3 and GNOME
/// Pomodoro, or against recording test doubles.
///
/// # Typical usage
///
/// ```ignore
/// let mut guard = WorkspaceGuard::start(timer, wm, policy)?;
/// guard.handle(&WorkspaceFocusEvent::new(3, "3:chat"));
/// ```
pub struct WorkspaceGuard<T, W, S> {
    timer: T,
    wm: W,
    surface: Option<S>,
    policy: WorkspacePolicy,
    state: PolicyState,
}

impl<T, W, S> WorkspaceGuard<T, W, S>
where
    T: TimerService,
    W: WindowManager,
    S: WarningSurface,
{
    /// Create a guard seeded with the workspace the window manager currently
    /// has focused.
    pub fn start(timer: T, wm: W, policy: WorkspacePolicy) -> Result<Self, W::Error> {
        let focused = wm.focused_workspace_name()?;
        debug!("seeding last allowed workspace with {:?}", focused);
        Ok(Self {
            timer,
            wm,
            surface: None,
            policy,
            state: PolicyState::new(focused),
        })
    }

    /// Show denials (and fail-open errors) on `surface`.
    pub fn with_warnings(mut self, surface: S) -> Self {
        self.surface = Some(surface);
        self
    }

    /// The workspace a denial would currently redirect to.
    pub fn last_allowed(&self) -> &str {
        self.state.last_allowed()
    }

    /// Process one focus event.
    pub fn handle(&mut self, event: &WorkspaceFocusEvent) -> Verdict {
        let allowed = match self.timer.snapshot() {
            Ok(snapshot) => self.policy.allows(&snapshot, event.num),
            Err(e) => {
                warn!("timer unavailable, allowing workspace {}: {}", event.name, e);
                self.notify(
                    Severity::Error,
                    &format!("Could not query the pomodoro timer: {}", e),
                );
                self.state.allow(event.name.clone());
                return Verdict::AllowedFailOpen;
            }
        };

        if allowed {
            debug!("workspace {} ({}) allowed", event.name, event.num);
            self.state.allow(event.name.clone());
            return Verdict::Allowed;
        }

        let redirect_to = self.state.last_allowed().to_string();
        warn!(
            "workspace {} is restricted during a pomodoro, returning to {}",
            event.name, redirect_to
        );
        if let Err(e) = self.wm.activate(&redirect_to) {
            error!("failed to activate workspace {}: {}", redirect_to, e);
        }
        self.notify(
            Severity::Warning,
            &format!("Workspace {} is not allowed during a pomodoro", event.name),
        );
        Verdict::Denied { redirect_to }
    }

    fn notify(&self, severity: Severity, message: &str) {
        if let Some(surface) = &self.surface {
            if let Err(e) = surface.show(severity, message) {
                error!("failed to show warning: {}", e);
            }
        }
    }
}
