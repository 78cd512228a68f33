//! Accepted and final answers.

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityName;

/// Answer accepted from one capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Capability that produced the answer.
    pub capability: CapabilityName,
    /// Answer text.
    pub text: String,
    /// `false` when the retry bound forced acceptance of a failing answer.
    pub verified: bool,
}

/// Evaluator feedback recorded for a rejected attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Capability whose answer was rejected.
    pub capability: CapabilityName,
    /// Evaluator reply.
    pub message: String,
}

/// Terminal result of one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalAnswer {
    /// Answer text. Never empty.
    pub text: String,
    /// Capabilities whose accepted answers were aggregated, in execution order.
    pub contributors: Vec<CapabilityName>,
    /// Contributors accepted without passing evaluation.
    pub unverified: Vec<CapabilityName>,
    /// Short-circuit capability that answered directly, if any.
    pub short_circuit: Option<CapabilityName>,
    /// Feedback from every rejected attempt, oldest first.
    pub feedback: Vec<Feedback>,
    /// `true` when the request deadline cut the run short.
    pub timed_out: bool,
}
