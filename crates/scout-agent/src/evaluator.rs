//! Answer evaluator.
//!
//! The evaluator is fail-open: when the judging call errors the answer is
//! treated as passing. Switching to fail-closed turns an evaluator outage
//! into a rejected answer for every capability, bounded only by
//! [`AgentConfig::max_retries`](crate::AgentConfig::max_retries).

use scout_core::generation::GenerationService;
use serde::{Deserialize, Serialize};

/// Tracing target for evaluation decisions.
pub const TRACING_TARGET: &str = "scout_agent::evaluator";

const PROMPT: &str = "\
Evaluate whether the answer correctly and concisely addresses the question.
Return only 'PASS' if it does. Otherwise return 'FAIL: ' followed by a short reason.";

/// Outcome of evaluating a capability answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// The answer is acceptable.
    Pass,
    /// The answer was rejected; `feedback` holds the judge's raw reply.
    Fail {
        /// Raw evaluator output.
        feedback: String,
    },
}

impl Verdict {
    /// Returns `true` for [`Verdict::Pass`].
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Parses a raw judge reply.
    ///
    /// A case-insensitive `FAIL` prefix (after trimming) fails; anything
    /// else, including an empty reply, passes.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let is_fail = trimmed
            .get(..4)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("FAIL"));

        if is_fail {
            Self::Fail {
                feedback: trimmed.to_owned(),
            }
        } else {
            Self::Pass
        }
    }
}

/// Judges whether a capability answer is acceptable for a query.
#[derive(Debug, Clone)]
pub struct Evaluator {
    generator: GenerationService,
}

impl Evaluator {
    /// Creates a new evaluator.
    pub fn new(generator: GenerationService) -> Self {
        Self { generator }
    }

    /// Evaluates `answer` against `query`.
    pub async fn evaluate(&self, query: &str, answer: &str) -> Verdict {
        let prompt = format!("{PROMPT}\n\nQuestion: {query}\nAnswer: {answer}\n\nEvaluation:");

        let verdict = match self.generator.generate(&prompt).await {
            Ok(raw) => Verdict::parse(&raw),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Evaluation failed, accepting answer"
                );
                Verdict::Pass
            }
        };

        tracing::debug!(
            target: TRACING_TARGET,
            pass = verdict.is_pass(),
            "Answer evaluated"
        );
        verdict
    }
}

#[cfg(test)]
mod tests {
    use scout_core::mock::ScriptedGenerator;

    use super::*;

    #[test]
    fn parse_detects_fail_prefix_case_insensitively() {
        assert_eq!(
            Verdict::parse("  fail: does not mention carry-over"),
            Verdict::Fail {
                feedback: "fail: does not mention carry-over".into()
            }
        );
        assert!(!Verdict::parse("FAILED").is_pass());
    }

    #[test]
    fn parse_passes_everything_else() {
        assert!(Verdict::parse("PASS").is_pass());
        assert!(Verdict::parse("The answer is fine").is_pass());
        assert!(Verdict::parse("").is_pass());
        assert!(Verdict::parse("Not a FAIL").is_pass());
    }

    #[tokio::test]
    async fn evaluator_outage_fails_open() {
        let evaluator = Evaluator::new(GenerationService::new(ScriptedGenerator::failing()));
        assert_eq!(evaluator.evaluate("q", "a").await, Verdict::Pass);
    }

    #[tokio::test]
    async fn prompt_binds_question_and_answer() {
        let generator = ScriptedGenerator::new(["FAIL: too vague"]);
        let evaluator = Evaluator::new(GenerationService::new(generator.clone()));

        let verdict = evaluator.evaluate("Leave policy?", "It depends.").await;

        assert!(!verdict.is_pass());
        let prompt = &generator.prompts()[0];
        assert!(prompt.contains("Question: Leave policy?\nAnswer: It depends."));
    }
}
