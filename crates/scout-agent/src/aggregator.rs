//! Answer aggregator.

use scout_core::generation::GenerationService;

use crate::answer::Answer;

/// Tracing target for aggregation.
pub const TRACING_TARGET: &str = "scout_agent::aggregator";

/// Answer returned when there is nothing to aggregate.
pub const INSUFFICIENT_INFORMATION: &str =
    "I don't have enough information to answer this question.";

const PROMPT: &str = "\
You are a research assistant. Synthesize a clear and concise answer using the provided sources.
Do not include source metadata in the final output. Do not hallucinate or assume missing information.";

/// Combines accepted capability answers into one final answer.
#[derive(Debug, Clone)]
pub struct Aggregator {
    generator: GenerationService,
}

impl Aggregator {
    /// Creates a new aggregator.
    pub fn new(generator: GenerationService) -> Self {
        Self { generator }
    }

    /// Aggregates `answers` for `query`.
    ///
    /// No answers yield [`INSUFFICIENT_INFORMATION`] and a single answer is
    /// passed through; neither calls the model. When synthesis fails the
    /// answers are joined verbatim.
    pub async fn aggregate(&self, query: &str, answers: &[Answer]) -> String {
        match answers {
            [] => {
                tracing::debug!(target: TRACING_TARGET, "Nothing to aggregate");
                return INSUFFICIENT_INFORMATION.to_owned();
            }
            [single] => return non_empty(&single.text),
            _ => {}
        }

        let prompt = format!(
            "{PROMPT}\n\nQuestion: {query}\n\nSources:\n{}\n\nFinal Answer:",
            render_sources(answers)
        );

        match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    answers = answers.len(),
                    "Answers synthesized"
                );
                text.trim().to_owned()
            }
            Ok(_) => Self::fallback(answers),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    answers = answers.len(),
                    "Synthesis failed, joining answers"
                );
                Self::fallback(answers)
            }
        }
    }

    /// Joins answers without a model call.
    pub fn fallback(answers: &[Answer]) -> String {
        let joined = answers
            .iter()
            .map(|a| a.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        non_empty(&joined)
    }
}

/// Renders answers as `[name]: answer` blocks in insertion order.
fn render_sources(answers: &[Answer]) -> String {
    answers
        .iter()
        .map(|a| format!("[{}]: {}", a.capability, a.text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn non_empty(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        INSUFFICIENT_INFORMATION.to_owned()
    } else {
        text.to_owned()
    }
}
