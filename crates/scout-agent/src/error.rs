//! Error types of the agent entry points.

use thiserror::Error;

use crate::orchestrator::Phase;

/// Result type for [`AgentService`](crate::AgentService) calls.
pub type AskResult<T> = std::result::Result<T, AskError>;

/// Error surfaced to callers of `ask`.
///
/// Internal causes are logged and never exposed.
#[derive(Debug, Error)]
pub enum AskError {
    /// The request failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Anything else went wrong while answering.
    #[error("the request could not be completed")]
    Internal,
}

/// Rejected state machine transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The run already produced its final answer.
    #[error("orchestration already finished")]
    Finished,
    /// The event does not apply to the current phase.
    #[error("event {event} is not valid in phase {phase:?}")]
    UnexpectedEvent {
        /// Phase the state was in.
        phase: Phase,
        /// Name of the rejected event.
        event: &'static str,
    },
}
