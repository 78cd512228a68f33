//! Pure orchestration state machine.
//!
//! [`OrchestrationState::transition`] maps `(state, event)` to the next state
//! without performing any I/O. The driver in [`Orchestrator`] performs the
//! external calls and feeds their results back as [`Event`]s.
//!
//! Phases follow the routed queue:
//!
//! ```text
//! Routing -> Responding(c) -> Done                      (short-circuit)
//! Routing -> Executing(c) -> Evaluating(c) -> Retrying(c) -> Evaluating(c)
//!                                         \-> Executing(next) | Aggregating -> Done
//! ```
//!
//! [`Orchestrator`]: super::Orchestrator

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, IntoStaticStr};

use crate::aggregator::INSUFFICIENT_INFORMATION;
use crate::answer::{Answer, Feedback, FinalAnswer};
use crate::capability::CapabilityName;
use crate::error::TransitionError;
use crate::evaluator::Verdict;

/// Phase of one orchestration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
pub enum Phase {
    /// Waiting for the router.
    Routing,
    /// Running a short-circuit capability whose output is final.
    Responding(CapabilityName),
    /// Running a capability for the first time.
    Executing(CapabilityName),
    /// Judging the candidate answer of a capability.
    Evaluating(CapabilityName),
    /// Re-running a capability whose answer failed evaluation.
    Retrying(CapabilityName),
    /// Combining accepted answers.
    Aggregating,
    /// Terminal.
    Done,
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
pub enum Event {
    /// The router selected capabilities, in order.
    Routed(Vec<CapabilityName>),
    /// A capability produced an answer.
    Executed {
        /// Capability that ran.
        capability: CapabilityName,
        /// Raw answer.
        answer: String,
    },
    /// The evaluator judged the current candidate.
    Evaluated {
        /// Capability whose candidate was judged.
        capability: CapabilityName,
        /// Evaluation outcome.
        verdict: Verdict,
    },
    /// The aggregator produced the final text.
    Aggregated(String),
    /// The request deadline passed.
    DeadlineExceeded,
}

/// Mutable record of one query's orchestration.
///
/// Invariants kept by [`transition`](Self::transition):
///
/// - a capability appears in [`answers`](Self::answers) only once its
///   candidate passed evaluation or exhausted the retry bound;
/// - pending feedback is set only between a failing evaluation and the
///   next execution;
/// - the queue is fixed once routed.
#[derive(Debug, Clone)]
pub struct OrchestrationState {
    query: String,
    max_retries: u32,
    phase: Phase,
    queue: Vec<CapabilityName>,
    answers: Vec<Answer>,
    attempts: HashMap<CapabilityName, u32>,
    last_executed: Option<CapabilityName>,
    candidate: Option<String>,
    pending_feedback: Option<String>,
    feedback: Vec<Feedback>,
    timed_out: bool,
    final_answer: Option<FinalAnswer>,
}

impl OrchestrationState {
    /// Creates the initial state for `query`.
    pub fn new(query: impl Into<String>, max_retries: u32) -> Self {
        Self {
            query: query.into(),
            max_retries,
            phase: Phase::Routing,
            queue: Vec::new(),
            answers: Vec::new(),
            attempts: HashMap::new(),
            last_executed: None,
            candidate: None,
            pending_feedback: None,
            feedback: Vec::new(),
            timed_out: false,
            final_answer: None,
        }
    }

    /// Returns the original query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` once the final answer is available.
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Returns the capabilities queued for execution.
    pub fn queue(&self) -> &[CapabilityName] {
        &self.queue
    }

    /// Returns the accepted answers in acceptance order.
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Returns how many times `capability` has been executed.
    pub fn attempts(&self, capability: CapabilityName) -> u32 {
        self.attempts.get(&capability).copied().unwrap_or(0)
    }

    /// Returns the most recently executed capability.
    pub fn last_executed(&self) -> Option<CapabilityName> {
        self.last_executed
    }

    /// Returns the answer awaiting evaluation.
    pub fn candidate(&self) -> Option<&str> {
        self.candidate.as_deref()
    }

    /// Returns the feedback of the last failing evaluation, if a retry is due.
    pub fn pending_feedback(&self) -> Option<&str> {
        self.pending_feedback.as_deref()
    }

    /// Returns the final answer once [`Phase::Done`] is reached.
    pub fn final_answer(&self) -> Option<&FinalAnswer> {
        self.final_answer.as_ref()
    }

    /// Consumes the state, returning the final answer if the run finished.
    pub fn into_final_answer(self) -> Option<FinalAnswer> {
        self.final_answer
    }

    /// Applies `event`, returning the next state.
    pub fn transition(mut self, event: Event) -> Result<Self, TransitionError> {
        let event_name: &'static str = (&event).into();

        match (self.phase, event) {
            (Phase::Done, _) => return Err(TransitionError::Finished),
            (_, Event::DeadlineExceeded) => self.on_deadline(),
            (Phase::Routing, Event::Routed(names)) => self.on_routed(names),
            (Phase::Responding(c), Event::Executed { capability, answer }) if capability == c => {
                self.finish_short_circuit(c, answer);
            }
            (
                Phase::Executing(c) | Phase::Retrying(c),
                Event::Executed { capability, answer },
            ) if capability == c => self.on_executed(c, answer),
            (Phase::Evaluating(c), Event::Evaluated { capability, verdict }) if capability == c => {
                self.on_evaluated(c, verdict);
            }
            (Phase::Aggregating, Event::Aggregated(text)) => self.finish_aggregated(text),
            (phase, _) => {
                return Err(TransitionError::UnexpectedEvent {
                    phase,
                    event: event_name,
                });
            }
        }

        Ok(self)
    }

    fn on_routed(&mut self, names: Vec<CapabilityName>) {
        let mut unique = Vec::with_capacity(names.len());
        for name in names {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }

        if unique.contains(&CapabilityName::OutOfScope) {
            self.phase = Phase::Responding(CapabilityName::OutOfScope);
            return;
        }
        if unique.first() == Some(&CapabilityName::SmallTalk) {
            self.phase = Phase::Responding(CapabilityName::SmallTalk);
            return;
        }

        self.queue = unique.into_iter().filter(|n| !n.is_short_circuit()).collect();
        self.advance();
    }

    fn on_executed(&mut self, capability: CapabilityName, answer: String) {
        *self.attempts.entry(capability).or_default() += 1;
        self.last_executed = Some(capability);
        self.pending_feedback = None;
        self.candidate = Some(answer);
        self.phase = Phase::Evaluating(capability);
    }

    fn on_evaluated(&mut self, capability: CapabilityName, verdict: Verdict) {
        let candidate = self.candidate.take().unwrap_or_default();

        match verdict {
            Verdict::Pass => self.accept(capability, candidate, true),
            Verdict::Fail { feedback } => {
                self.feedback.push(Feedback {
                    capability,
                    message: feedback.clone(),
                });

                // Attempts count executions, so the first run is not a retry.
                if self.attempts(capability) <= self.max_retries {
                    self.pending_feedback = Some(feedback);
                    self.phase = Phase::Retrying(capability);
                    return;
                }

                self.accept(capability, candidate, false);
            }
        }

        self.advance();
    }

    fn on_deadline(&mut self) {
        self.timed_out = true;
        if self.phase == Phase::Aggregating {
            return;
        }

        self.candidate = None;
        self.pending_feedback = None;
        self.phase = Phase::Aggregating;
    }

    fn accept(&mut self, capability: CapabilityName, text: String, verified: bool) {
        let answer = Answer {
            capability,
            text,
            verified,
        };

        match self.answers.iter_mut().find(|a| a.capability == capability) {
            Some(existing) => *existing = answer,
            None => self.answers.push(answer),
        }
    }

    fn advance(&mut self) {
        let next = self
            .queue
            .iter()
            .copied()
            .find(|name| !self.answers.iter().any(|a| a.capability == *name));

        self.phase = match next {
            Some(name) => Phase::Executing(name),
            None => Phase::Aggregating,
        };
    }

    fn finish_short_circuit(&mut self, capability: CapabilityName, answer: String) {
        self.final_answer = Some(FinalAnswer {
            text: non_empty(answer),
            contributors: Vec::new(),
            unverified: Vec::new(),
            short_circuit: Some(capability),
            feedback: Vec::new(),
            timed_out: self.timed_out,
        });
        self.phase = Phase::Done;
    }

    fn finish_aggregated(&mut self, text: String) {
        self.final_answer = Some(FinalAnswer {
            text: non_empty(text),
            contributors: self.answers.iter().map(|a| a.capability).collect(),
            unverified: self
                .answers
                .iter()
                .filter(|a| !a.verified)
                .map(|a| a.capability)
                .collect(),
            short_circuit: None,
            feedback: self.feedback.clone(),
            timed_out: self.timed_out,
        });
        self.phase = Phase::Done;
    }
}

fn non_empty(text: String) -> String {
    if text.trim().is_empty() {
        INSUFFICIENT_INFORMATION.to_owned()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::capability::CapabilityName::{DocumentSearch, OutOfScope, PolicySearch, SmallTalk, WebSearch};

    fn executed(capability: CapabilityName, answer: &str) -> Event {
        Event::Executed {
            capability,
            answer: answer.to_owned(),
        }
    }

    fn pass(capability: CapabilityName) -> Event {
        Event::Evaluated {
            capability,
            verdict: Verdict::Pass,
        }
    }

    fn fail(capability: CapabilityName) -> Event {
        Event::Evaluated {
            capability,
            verdict: Verdict::Fail {
                feedback: "FAIL: incomplete".into(),
            },
        }
    }

    fn run(state: OrchestrationState, events: Vec<Event>) -> OrchestrationState {
        events
            .into_iter()
            .fold(state, |state, event| state.transition(event).unwrap())
    }

    #[test]
    fn small_talk_short_circuits() {
        let state = run(
            OrchestrationState::new("Hello, how are you?", 1),
            vec![Event::Routed(vec![SmallTalk]), executed(SmallTalk, "Hi there!")],
        );

        assert!(state.is_done());
        assert!(state.answers().is_empty());
        let answer = state.into_final_answer().unwrap();
        assert_eq!(answer.text, "Hi there!");
        assert_eq!(answer.short_circuit, Some(SmallTalk));
        assert!(answer.contributors.is_empty());
    }

    #[test]
    fn out_of_scope_wins_anywhere_in_route() {
        let state = OrchestrationState::new("q", 1)
            .transition(Event::Routed(vec![PolicySearch, OutOfScope]))
            .unwrap();

        assert_eq!(state.phase(), Phase::Responding(OutOfScope));
    }

    #[test]
    fn trailing_small_talk_is_dropped_from_queue() {
        let state = OrchestrationState::new("q", 1)
            .transition(Event::Routed(vec![PolicySearch, SmallTalk, PolicySearch]))
            .unwrap();

        assert_eq!(state.queue(), [PolicySearch]);
        assert_eq!(state.phase(), Phase::Executing(PolicySearch));
    }

    #[test]
    fn single_capability_pass_reaches_aggregation() {
        let state = run(
            OrchestrationState::new("leave policy?", 1),
            vec![
                Event::Routed(vec![PolicySearch]),
                executed(PolicySearch, "20 days."),
                pass(PolicySearch),
            ],
        );

        assert_eq!(state.phase(), Phase::Aggregating);
        assert_eq!(state.answers().len(), 1);
        assert!(state.answers()[0].verified);
        assert_eq!(state.pending_feedback(), None);
    }

    #[test]
    fn capabilities_execute_in_routed_order() {
        let state = run(
            OrchestrationState::new("q", 1),
            vec![
                Event::Routed(vec![WebSearch, PolicySearch]),
                executed(WebSearch, "web"),
                pass(WebSearch),
            ],
        );

        assert_eq!(state.phase(), Phase::Executing(PolicySearch));
    }

    #[test]
    fn failing_answer_is_retried_then_accepted_unverified() {
        let state = run(
            OrchestrationState::new("q", 1),
            vec![
                Event::Routed(vec![DocumentSearch]),
                executed(DocumentSearch, "first"),
                fail(DocumentSearch),
            ],
        );
        assert_eq!(state.phase(), Phase::Retrying(DocumentSearch));
        assert_eq!(state.pending_feedback(), Some("FAIL: incomplete"));
        assert!(state.answers().is_empty());

        let state = run(
            state,
            vec![executed(DocumentSearch, "second"), fail(DocumentSearch)],
        );
        assert_eq!(state.phase(), Phase::Aggregating);
        assert_eq!(state.attempts(DocumentSearch), 2);
        assert_eq!(state.pending_feedback(), None);
        assert_eq!(
            state.answers(),
            [Answer {
                capability: DocumentSearch,
                text: "second".into(),
                verified: false,
            }]
        );
    }

    #[test]
    fn zero_retries_accepts_first_failure() {
        let state = run(
            OrchestrationState::new("q", 0),
            vec![
                Event::Routed(vec![WebSearch]),
                executed(WebSearch, "only"),
                fail(WebSearch),
            ],
        );

        assert_eq!(state.phase(), Phase::Aggregating);
        assert_eq!(state.attempts(WebSearch), 1);
    }

    #[test]
    fn pending_feedback_clears_before_next_execution() {
        let state = run(
            OrchestrationState::new("q", 1),
            vec![
                Event::Routed(vec![WebSearch]),
                executed(WebSearch, "a"),
                fail(WebSearch),
                executed(WebSearch, "b"),
            ],
        );

        assert_eq!(state.phase(), Phase::Evaluating(WebSearch));
        assert_eq!(state.pending_feedback(), None);
        assert_eq!(state.candidate(), Some("b"));
    }

    #[test]
    fn aggregation_produces_final_answer() {
        let state = run(
            OrchestrationState::new("q", 0),
            vec![
                Event::Routed(vec![PolicySearch, WebSearch]),
                executed(PolicySearch, "policy"),
                pass(PolicySearch),
                executed(WebSearch, "web"),
                fail(WebSearch),
                Event::Aggregated("combined".into()),
            ],
        );

        let answer = state.into_final_answer().unwrap();
        assert_eq!(answer.text, "combined");
        assert_eq!(answer.contributors, [PolicySearch, WebSearch]);
        assert_eq!(answer.unverified, [WebSearch]);
        assert_eq!(answer.feedback.len(), 1);
        assert!(!answer.timed_out);
    }

    #[test]
    fn empty_aggregation_text_becomes_sentinel() {
        let state = run(
            OrchestrationState::new("q", 1),
            vec![Event::Routed(vec![]), Event::Aggregated("  ".into())],
        );

        assert_eq!(state.into_final_answer().unwrap().text, INSUFFICIENT_INFORMATION);
    }

    #[test]
    fn deadline_jumps_to_aggregation_keeping_accepted_answers() {
        let state = run(
            OrchestrationState::new("q", 1),
            vec![
                Event::Routed(vec![PolicySearch, WebSearch]),
                executed(PolicySearch, "policy"),
                pass(PolicySearch),
                executed(WebSearch, "web"),
                Event::DeadlineExceeded,
            ],
        );

        assert_eq!(state.phase(), Phase::Aggregating);
        assert_eq!(state.candidate(), None);
        assert_eq!(state.answers().len(), 1);

        let state = run(
            state,
            vec![Event::DeadlineExceeded, Event::Aggregated("policy".into())],
        );
        assert!(state.into_final_answer().unwrap().timed_out);
    }

    #[test]
    fn mismatched_capability_is_rejected() {
        let state = run(
            OrchestrationState::new("q", 1),
            vec![Event::Routed(vec![PolicySearch])],
        );

        let error = state.transition(executed(WebSearch, "x")).unwrap_err();
        assert_eq!(
            error,
            TransitionError::UnexpectedEvent {
                phase: Phase::Executing(PolicySearch),
                event: "Executed",
            }
        );
    }

    #[test]
    fn done_is_terminal() {
        let state = run(
            OrchestrationState::new("q", 1),
            vec![Event::Routed(vec![OutOfScope]), executed(OutOfScope, "no")],
        );

        assert_eq!(
            state.transition(Event::DeadlineExceeded).unwrap_err(),
            TransitionError::Finished
        );
    }
}
