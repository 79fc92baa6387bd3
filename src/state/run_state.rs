/// Run state definitions for tracking harvest progress
///
/// `Idle -> Resolving -> AwaitingPageCountDecision (optional) -> Dispatching
/// -> AwaitingCompletion -> Done`, with `Resolving -> Aborted` on an
/// unrecovered sitemap failure.
use std::fmt;

/// Represents the current phase of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunState {
    // ===== Active States =====
    /// Run has not started
    #[default]
    Idle,

    /// Sitemap tree is being resolved
    Resolving,

    /// The site exceeds the default cap and the page count is being negotiated
    AwaitingPageCountDecision,

    /// Fetch tasks are being handed to the worker pool
    Dispatching,

    /// All tasks are dispatched; waiting for them to finish
    AwaitingCompletion,

    // ===== Terminal States =====
    /// Every dispatched task finished
    Done,

    /// Sitemap resolution failed and the run was abandoned
    Aborted,
}

impl RunState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Returns true if the run is in progress
    pub fn is_active(&self) -> bool {
        !self.is_terminal() && *self != Self::Idle
    }

    /// Returns true if moving from this state to `next` is allowed
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Resolving)
                | (Self::Resolving, Self::AwaitingPageCountDecision)
                | (Self::Resolving, Self::Dispatching)
                | (Self::Resolving, Self::Aborted)
                | (Self::AwaitingPageCountDecision, Self::Dispatching)
                | (Self::Dispatching, Self::AwaitingCompletion)
                | (Self::AwaitingCompletion, Self::Done)
        )
    }

    /// Short name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::AwaitingPageCountDecision => "awaiting_page_count_decision",
            Self::Dispatching => "dispatching",
            Self::AwaitingCompletion => "awaiting_completion",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
