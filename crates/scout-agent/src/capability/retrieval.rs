//! Retrieval-backed capabilities.

use scout_core::generation::GenerationService;
use scout_core::retrieval::{RetrievalService, join_context};

use super::{CANNOT_ANSWER, Capability, CapabilityName, TRACING_TARGET};

const POLICY_PREAMBLE: &str = "\
You are an expert in HR policies. Use ONLY the context below to answer the question.
If the answer is not found in the context, say 'Information not available in HR records.'";

const POLICY_NOT_FOUND: &str = "Information not available in HR records.";

const DOCUMENT_PREAMBLE: &str = "\
You are a helpful assistant answering questions about internal documents.
Answer the question using ONLY the context below.
If the context does not contain the answer, say 'I cannot answer this based on the provided information.'
Keep the answer concise and do not mention the context itself.";

/// Capability answering from a document index.
///
/// Fetches the top-k passages for the query, binds them as context and asks
/// the generation model to answer strictly from that context.
#[derive(Debug, Clone)]
pub struct RetrievalCapability {
    name: CapabilityName,
    retriever: RetrievalService,
    generator: GenerationService,
    top_k: usize,
    preamble: &'static str,
    not_found: &'static str,
}

impl RetrievalCapability {
    /// Creates the HR policy capability.
    pub fn policy(retriever: RetrievalService, generator: GenerationService, top_k: usize) -> Self {
        Self {
            name: CapabilityName::PolicySearch,
            retriever,
            generator,
            top_k,
            preamble: POLICY_PREAMBLE,
            not_found: POLICY_NOT_FOUND,
        }
    }

    /// Creates the internal document capability.
    pub fn documents(
        retriever: RetrievalService,
        generator: GenerationService,
        top_k: usize,
    ) -> Self {
        Self {
            name: CapabilityName::DocumentSearch,
            retriever,
            generator,
            top_k,
            preamble: DOCUMENT_PREAMBLE,
            not_found: CANNOT_ANSWER,
        }
    }

    /// Returns the answer used when nothing relevant was found.
    pub fn not_found(&self) -> &str {
        self.not_found
    }

    fn prompt(&self, context: &str, query: &str) -> String {
        format!(
            "{}\n\nContext:\n{}\n\nQuestion: {}\nAnswer:",
            self.preamble, context, query
        )
    }
}

#[async_trait::async_trait]
impl Capability for RetrievalCapability {
    fn name(&self) -> CapabilityName {
        self.name
    }

    async fn invoke(&self, query: &str) -> String {
        let passages = match self.retriever.search(query, self.top_k).await {
            Ok(passages) => passages,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    capability = %self.name,
                    error = %error,
                    "Retrieval failed, answering with sentinel"
                );
                return self.not_found.to_owned();
            }
        };

        let context = join_context(&passages);
        if context.is_empty() {
            tracing::debug!(
                target: TRACING_TARGET,
                capability = %self.name,
                "No relevant passages found"
            );
            return self.not_found.to_owned();
        }

        let sources: Vec<&str> = passages.iter().map(|p| p.source.as_str()).collect();
        tracing::debug!(
            target: TRACING_TARGET,
            capability = %self.name,
            passages = passages.len(),
            sources = ?sources,
            "Passages retrieved"
        );

        match self.generator.generate(&self.prompt(&context, query)).await {
            Ok(answer) if !answer.trim().is_empty() => answer.trim().to_owned(),
            Ok(_) => self.not_found.to_owned(),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    capability = %self.name,
                    error = %error,
                    "Grounded generation failed, answering with sentinel"
                );
                self.not_found.to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scout_core::mock::{ScriptedGenerator, StaticRetriever};
    use scout_core::retrieval::Passage;

    use super::*;

    fn passages() -> Vec<Passage> {
        vec![
            Passage::new("New joiners accrue 1.5 days of leave per month.", "leave.md"),
            Passage::new("Leave requests go through the HR portal.", "portal.md"),
            Passage::new("Carry-over is capped at 10 days.", "leave.md"),
            Passage::new("Unrelated passage.", "misc.md"),
        ]
    }

    #[tokio::test]
    async fn binds_top_k_context_and_query() {
        let generator = ScriptedGenerator::new(["1.5 days per month."]);
        let retriever = StaticRetriever::new(passages());
        let capability = RetrievalCapability::policy(
            RetrievalService::new(retriever.clone()),
            GenerationService::new(generator.clone()),
            3,
        );

        let answer = capability.invoke("What is the leave policy for new joiners?").await;

        assert_eq!(answer, "1.5 days per month.");
        assert_eq!(retriever.calls(), 1);

        let prompt = &generator.prompts()[0];
        assert!(prompt.contains("Carry-over is capped at 10 days."));
        assert!(!prompt.contains("Unrelated passage."));
        assert!(prompt.ends_with("Question: What is the leave policy for new joiners?\nAnswer:"));
    }

    #[tokio::test]
    async fn empty_index_skips_generation() {
        let generator = ScriptedGenerator::repeating("should not be used");
        let capability = RetrievalCapability::policy(
            RetrievalService::new(StaticRetriever::empty()),
            GenerationService::new(generator.clone()),
            3,
        );

        let answer = capability.invoke("leave?").await;

        assert_eq!(answer, POLICY_NOT_FOUND);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn collaborator_failures_become_sentinels() {
        let capability = RetrievalCapability::documents(
            RetrievalService::new(StaticRetriever::failing()),
            GenerationService::new(ScriptedGenerator::failing()),
            3,
        );
        assert_eq!(capability.invoke("q").await, CANNOT_ANSWER);

        let capability = RetrievalCapability::documents(
            RetrievalService::new(StaticRetriever::new(passages())),
            GenerationService::new(ScriptedGenerator::failing()),
            3,
        );
        assert_eq!(capability.invoke("q").await, CANNOT_ANSWER);
    }
}
