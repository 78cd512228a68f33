//! Orchestration driver.
//!
//! [`Orchestrator`] owns the injected collaborators and drives one
//! [`OrchestrationState`] per query: it runs the external call for the
//! current phase, turns the result into an [`Event`] and applies it. Steps of
//! a single query are strictly sequential; separate queries share only the
//! read-only capability table and services.

mod state;

use std::future::Future;

pub use state::{Event, OrchestrationState, Phase};
use tokio::time::{Instant, timeout, timeout_at};

use crate::aggregator::Aggregator;
use crate::answer::FinalAnswer;
use crate::capability::CapabilityTable;
use crate::config::AgentConfig;
use crate::error::TransitionError;
use crate::evaluator::Evaluator;
use crate::router::Router;

/// Tracing target for orchestration.
pub const TRACING_TARGET: &str = "scout_agent::orchestrator";

/// Drives the route, execute, evaluate and aggregate loop.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    router: Router,
    evaluator: Evaluator,
    aggregator: Aggregator,
    capabilities: CapabilityTable,
    config: AgentConfig,
}

impl Orchestrator {
    /// Creates a new orchestrator.
    pub fn new(
        router: Router,
        evaluator: Evaluator,
        aggregator: Aggregator,
        capabilities: CapabilityTable,
        config: AgentConfig,
    ) -> Self {
        Self {
            router,
            evaluator,
            aggregator,
            capabilities,
            config,
        }
    }

    /// Returns the capability table.
    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Answers `query`.
    ///
    /// Terminates after at most one routing call, `1 + max_retries`
    /// executions and evaluations per routed capability, and one
    /// aggregation. Once the request deadline passes the in-flight call is
    /// dropped and whatever was already accepted is aggregated.
    pub async fn run(&self, query: &str) -> Result<FinalAnswer, TransitionError> {
        let deadline = Instant::now() + self.config.request_timeout();
        let mut state = OrchestrationState::new(query, self.config.max_retries);

        loop {
            let phase = state.phase();
            tracing::debug!(
                target: TRACING_TARGET,
                phase = phase.as_ref(),
                "Entering phase"
            );

            let event = match phase {
                Phase::Done => break,
                Phase::Routing => {
                    step(deadline, self.router.route(query), Event::Routed).await
                }
                Phase::Responding(capability)
                | Phase::Executing(capability)
                | Phase::Retrying(capability) => {
                    if let Some(feedback) = state.pending_feedback() {
                        tracing::info!(
                            target: TRACING_TARGET,
                            capability = %capability,
                            attempt = state.attempts(capability) + 1,
                            feedback,
                            "Retrying capability"
                        );
                    }
                    step(
                        deadline,
                        self.capabilities.invoke(capability, query),
                        |answer| Event::Executed { capability, answer },
                    )
                    .await
                }
                Phase::Evaluating(capability) => {
                    let candidate = state.candidate().unwrap_or_default();
                    step(
                        deadline,
                        self.evaluator.evaluate(query, candidate),
                        |verdict| Event::Evaluated {
                            capability,
                            verdict,
                        },
                    )
                    .await
                }
                Phase::Aggregating => Event::Aggregated(self.aggregate(&state, query).await),
            };

            if matches!(event, Event::DeadlineExceeded) {
                tracing::warn!(
                    target: TRACING_TARGET,
                    phase = phase.as_ref(),
                    accepted = state.answers().len(),
                    "Request deadline exceeded, aggregating accepted answers"
                );
            }

            state = state.transition(event)?;
        }

        let final_answer = state
            .into_final_answer()
            .ok_or(TransitionError::UnexpectedEvent {
                phase: Phase::Done,
                event: "Finished",
            })?;

        tracing::info!(
            target: TRACING_TARGET,
            contributors = ?final_answer.contributors,
            unverified = ?final_answer.unverified,
            short_circuit = ?final_answer.short_circuit,
            timed_out = final_answer.timed_out,
            "Query answered"
        );

        Ok(final_answer)
    }

    async fn aggregate(&self, state: &OrchestrationState, query: &str) -> String {
        let answers = state.answers();
        let budget = self.config.aggregation_timeout();

        match timeout(budget, self.aggregator.aggregate(query, answers)).await {
            Ok(text) => text,
            Err(_) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    budget_secs = budget.as_secs(),
                    "Aggregation timed out, joining answers"
                );
                Aggregator::fallback(answers)
            }
        }
    }
}

/// Awaits `call` until `deadline`, mapping the output into an event.
async fn step<F, T>(deadline: Instant, call: F, into_event: impl FnOnce(T) -> Event) -> Event
where
    F: Future<Output = T>,
{
    match timeout_at(deadline, call).await {
        Ok(output) => into_event(output),
        Err(_) => Event::DeadlineExceeded,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use scout_core::generation::GenerationService;
    use scout_core::mock::{ScriptedGenerator, StaticRetriever, StaticSearch};
    use scout_core::retrieval::{Passage, RetrievalService};
    use scout_core::search::SearchService;

    use super::*;
    use crate::aggregator::INSUFFICIENT_INFORMATION;
    use crate::capability::{
        CapabilityName, OUT_OF_SCOPE, OutOfScopeCapability, RetrievalCapability,
        SmallTalkCapability, WebSearchCapability,
    };

    struct Fixture {
        router: ScriptedGenerator,
        evaluator: ScriptedGenerator,
        aggregator: ScriptedGenerator,
        policy: ScriptedGenerator,
        small_talk: ScriptedGenerator,
        retriever: StaticRetriever,
        search: StaticSearch,
    }

    impl Fixture {
        fn new(route: &str) -> Self {
            Self {
                router: ScriptedGenerator::new([route]),
                evaluator: ScriptedGenerator::repeating("PASS"),
                aggregator: ScriptedGenerator::repeating("Synthesized answer."),
                policy: ScriptedGenerator::repeating("New joiners get 18 days of leave."),
                small_talk: ScriptedGenerator::repeating("Hi! I'm doing well."),
                retriever: StaticRetriever::new(vec![Passage::new(
                    "Employees in their first year accrue 18 days of leave.",
                    "leave-policy.md",
                )]),
                search: StaticSearch::new("Industry average is 20 days."),
            }
        }

        fn orchestrator(&self, config: AgentConfig) -> Orchestrator {
            let capabilities = CapabilityTable::builder()
                .register(RetrievalCapability::policy(
                    RetrievalService::new(self.retriever.clone()),
                    GenerationService::new(self.policy.clone()),
                    config.top_k,
                ))
                .register(WebSearchCapability::new(SearchService::new(
                    self.search.clone(),
                )))
                .register(SmallTalkCapability::new(GenerationService::new(
                    self.small_talk.clone(),
                )))
                .register(OutOfScopeCapability::new())
                .with_default(config.default_capability)
                .build()
                .unwrap();

            Orchestrator::new(
                Router::new(GenerationService::new(self.router.clone()), &capabilities),
                Evaluator::new(GenerationService::new(self.evaluator.clone())),
                Aggregator::new(GenerationService::new(self.aggregator.clone())),
                capabilities,
                config,
            )
        }

        async fn ask(&self, query: &str) -> FinalAnswer {
            self.orchestrator(AgentConfig::default())
                .run(query)
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn greeting_short_circuits_evaluation_and_aggregation() {
        let fixture = Fixture::new("casual");

        let answer = fixture.ask("Hello, how are you?").await;

        assert_eq!(answer.text, "Hi! I'm doing well.");
        assert_eq!(answer.short_circuit, Some(CapabilityName::SmallTalk));
        assert!(answer.contributors.is_empty());
        assert_eq!(fixture.evaluator.calls(), 0);
        assert_eq!(fixture.aggregator.calls(), 0);
    }

    #[tokio::test]
    async fn out_of_scope_returns_refusal() {
        let fixture = Fixture::new("HRPolicyRAG, unrelevant");

        let answer = fixture.ask("Which stocks should I buy?").await;

        assert_eq!(answer.text, OUT_OF_SCOPE);
        assert_eq!(fixture.retriever.calls(), 0);
        assert_eq!(fixture.evaluator.calls(), 0);
    }

    #[tokio::test]
    async fn single_policy_answer_passes_through() {
        let fixture = Fixture::new("HRPolicyRAG");

        let answer = fixture.ask("What is the leave policy for new joiners?").await;

        assert_eq!(answer.text, "New joiners get 18 days of leave.");
        assert_eq!(answer.contributors, [CapabilityName::PolicySearch]);
        assert!(answer.unverified.is_empty());
        assert_eq!(fixture.retriever.calls(), 1);
        assert_eq!(fixture.evaluator.calls(), 1);
        assert_eq!(fixture.aggregator.calls(), 0);
    }

    #[tokio::test]
    async fn two_capabilities_are_synthesized() {
        let fixture = Fixture::new("HRPolicyRAG, WebSearch");

        let answer = fixture
            .ask("How does our leave policy compare with the industry?")
            .await;

        assert_eq!(answer.text, "Synthesized answer.");
        assert_eq!(
            answer.contributors,
            [CapabilityName::PolicySearch, CapabilityName::WebSearch]
        );
        assert_eq!(fixture.evaluator.calls(), 2);
        assert_eq!(fixture.aggregator.calls(), 1);

        let prompt = &fixture.aggregator.prompts()[0];
        assert!(prompt.contains("[HRPolicyRAG]: New joiners get 18 days of leave."));
        assert!(prompt.contains("[WebSearch]: Industry average is 20 days."));
    }

    #[tokio::test]
    async fn repeated_failures_stop_at_retry_bound() {
        let mut fixture = Fixture::new("WebSearch");
        fixture.evaluator = ScriptedGenerator::repeating("FAIL: too vague");

        let answer = fixture.ask("Hiring benchmarks?").await;

        assert_eq!(answer.text, "Industry average is 20 days.");
        assert_eq!(answer.unverified, [CapabilityName::WebSearch]);
        assert_eq!(answer.feedback.len(), 2);
        assert_eq!(fixture.search.calls(), 2);
        assert_eq!(fixture.evaluator.calls(), 2);
    }

    #[tokio::test]
    async fn retry_bound_is_configurable() {
        let mut fixture = Fixture::new("WebSearch");
        fixture.evaluator = ScriptedGenerator::repeating("FAIL");
        let config = AgentConfig {
            max_retries: 3,
            ..Default::default()
        };

        fixture.orchestrator(config).run("q").await.unwrap();

        assert_eq!(fixture.search.calls(), 4);
    }

    #[tokio::test]
    async fn retry_that_passes_is_verified() {
        let mut fixture = Fixture::new("WebSearch");
        fixture.evaluator = ScriptedGenerator::new(["FAIL: missing numbers", "PASS"]);

        let answer = fixture.ask("q").await;

        assert!(answer.unverified.is_empty());
        assert_eq!(answer.feedback[0].message, "FAIL: missing numbers");
        assert_eq!(fixture.search.calls(), 2);
    }

    #[tokio::test]
    async fn evaluator_outage_fails_open() {
        let mut fixture = Fixture::new("WebSearch");
        fixture.evaluator = ScriptedGenerator::failing();

        let answer = fixture.ask("q").await;

        assert!(answer.unverified.is_empty());
        assert_eq!(fixture.search.calls(), 1);
    }

    #[tokio::test]
    async fn unusable_route_falls_back_to_default() {
        let fixture = Fixture::new("AggregateTool, StockPicker");

        let answer = fixture.ask("q").await;

        assert_eq!(answer.contributors, [CapabilityName::WebSearch]);
        assert_eq!(fixture.search.calls(), 1);
    }

    #[tokio::test]
    async fn router_outage_falls_back_to_default() {
        let mut fixture = Fixture::new("unused");
        fixture.router = ScriptedGenerator::failing();

        let answer = fixture.ask("q").await;

        assert_eq!(answer.contributors, [CapabilityName::WebSearch]);
    }

    #[tokio::test]
    async fn empty_index_still_answers() {
        let mut fixture = Fixture::new("HRPolicyRAG");
        fixture.retriever = StaticRetriever::empty();

        let answer = fixture.ask("Parental leave?").await;

        assert_eq!(answer.text, "Information not available in HR records.");
        assert_eq!(fixture.policy.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_aggregates_accepted_answers() {
        let mut fixture = Fixture::new("WebSearch, HRPolicyRAG");
        fixture.policy = ScriptedGenerator::repeating("late").with_delay(Duration::from_secs(300));
        let config = AgentConfig {
            request_timeout_secs: 5,
            ..Default::default()
        };

        let answer = fixture.orchestrator(config).run("q").await.unwrap();

        assert!(answer.timed_out);
        assert_eq!(answer.text, "Industry average is 20 days.");
        assert_eq!(answer.contributors, [CapabilityName::WebSearch]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_aggregation_falls_back_to_joined_answers() {
        let mut fixture = Fixture::new("HRPolicyRAG, WebSearch");
        fixture.aggregator = ScriptedGenerator::repeating("late").with_delay(Duration::from_secs(300));

        let answer = fixture.ask("q").await;

        assert_eq!(
            answer.text,
            "New joiners get 18 days of leave.\n\nIndustry average is 20 days."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_during_routing_yields_sentinel() {
        let mut fixture = Fixture::new("HRPolicyRAG");
        fixture.router =
            ScriptedGenerator::new(["HRPolicyRAG"]).with_delay(Duration::from_secs(300));
        let config = AgentConfig {
            request_timeout_secs: 5,
            ..Default::default()
        };

        let answer = fixture.orchestrator(config).run("q").await.unwrap();

        assert!(answer.timed_out);
        assert_eq!(answer.text, INSUFFICIENT_INFORMATION);
        assert!(answer.contributors.is_empty());
        assert_eq!(answer.short_circuit, None);
        assert_eq!(fixture.retriever.calls(), 0);
        assert_eq!(fixture.aggregator.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_during_small_talk_yields_sentinel() {
        let mut fixture = Fixture::new("casual");
        fixture.small_talk =
            ScriptedGenerator::repeating("late").with_delay(Duration::from_secs(300));
        let config = AgentConfig {
            request_timeout_secs: 5,
            ..Default::default()
        };

        let answer = fixture.orchestrator(config).run("Hello!").await.unwrap();

        assert!(answer.timed_out);
        assert_eq!(answer.text, INSUFFICIENT_INFORMATION);
        assert!(answer.contributors.is_empty());
        assert_eq!(answer.short_circuit, None);
        assert_eq!(fixture.evaluator.calls(), 0);
        assert_eq!(fixture.aggregator.calls(), 0);
    }
}
