//! Per-task bookkeeping: the lifecycle state machine and the queue entry.
//!
//! # State Machine
//!
//! ```text
//! Queued -> Running -> Settled
//! ```
//!
//! `Queued -> Running` fires exactly once, triggered by the predecessor
//! settling (or immediately when there is no predecessor). `Settled` covers
//! both success and failure — the distinction lives in the outcome delivered
//! to the submission, not in the queue. There are no retry or cancellation
//! transitions.

use std::fmt;

use futures::future::BoxFuture;

/// Lifecycle state of one queued task.
///
/// # Examples
///
/// ```
/// use synq::TaskState;
///
/// assert!(TaskState::Queued.can_transition_to(&TaskState::Running));
/// assert!(TaskState::Running.can_transition_to(&TaskState::Settled));
/// assert!(!TaskState::Settled.can_transition_to(&TaskState::Queued));
/// assert!(TaskState::Settled.is_terminal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Admitted, waiting for its predecessors to settle.
    Queued,
    /// Operation invoked, not yet settled.
    Running,
    /// Ran to completion, success or failure (terminal).
    Settled,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Running => write!(f, "running"),
            Self::Settled => write!(f, "settled"),
        }
    }
}

impl TaskState {
    /// Returns `true` if this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled)
    }

    /// Returns `true` if transitioning from this state to `next` is valid.
    ///
    /// The lifecycle is linear; self-transitions and skipping `Running` are
    /// both rejected.
    pub fn can_transition_to(&self, next: &Self) -> bool {
        match self {
            Self::Queued => matches!(next, Self::Running),
            Self::Running => matches!(next, Self::Settled),
            Self::Settled => false,
        }
    }
}

/// Type-erased unit of work: invokes the operation and forwards its outcome
/// to the submission as its final act.
pub(crate) type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// One entry in a key's queue.
///
/// The job is `take`n by the runner when the task starts; the entry itself
/// stays at the front of the queue until the task settles, so queue depth
/// always counts the running task.
pub(crate) struct QueuedTask {
    pub(crate) job: Option<Job>,
    pub(crate) state: TaskState,
}

impl QueuedTask {
    pub(crate) fn new(job: Job) -> Self {
        Self {
            job: Some(job),
            state: TaskState::Queued,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_only_advances_to_running() {
        assert!(TaskState::Queued.can_transition_to(&TaskState::Running));
        assert!(!TaskState::Queued.can_transition_to(&TaskState::Queued));
        assert!(!TaskState::Queued.can_transition_to(&TaskState::Settled));
    }

    #[test]
    fn running_only_advances_to_settled() {
        assert!(TaskState::Running.can_transition_to(&TaskState::Settled));
        assert!(!TaskState::Running.can_transition_to(&TaskState::Running));
        assert!(!TaskState::Running.can_transition_to(&TaskState::Queued));
    }

    #[test]
    fn settled_rejects_all_transitions() {
        assert!(!TaskState::Settled.can_transition_to(&TaskState::Queued));
        assert!(!TaskState::Settled.can_transition_to(&TaskState::Running));
        assert!(!TaskState::Settled.can_transition_to(&TaskState::Settled));
    }

    #[test]
    fn only_settled_is_terminal() {
        assert!(!TaskState::Queued.is_terminal());
        assert!(!TaskState::Running.is_terminal());
        assert!(TaskState::Settled.is_terminal());
    }

    #[test]
    fn display_matches_lowercase_names() {
        assert_eq!(TaskState::Queued.to_string(), "queued");
        assert_eq!(TaskState::Running.to_string(), "running");
        assert_eq!(TaskState::Settled.to_string(), "settled");
    }
}
