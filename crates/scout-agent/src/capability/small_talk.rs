//! Degenerate capabilities that never touch an index.

use scout_core::generation::GenerationService;

use super::{Capability, CapabilityName, TRACING_TARGET};

const GREETING_PREAMBLE: &str = "\
You are a polite and conversational assistant for an internal research tool.
If the user greets you or asks how you are, respond warmly but briefly.
If the user asks what you can do, explain that you answer questions about \
HR policies, internal documents and external industry information.";

/// Reply used when the greeting model is unavailable.
pub const GREETING_FALLBACK: &str = "Hello! I can help with HR policy questions, \
internal documents and external industry research. What would you like to know?";

/// Fixed refusal for out-of-scope topics.
pub const OUT_OF_SCOPE: &str = "I'm sorry, but I'm designed to help with internal company \
research and HR-related questions. I cannot assist with that topic.";

/// Capability answering greetings and small talk.
#[derive(Debug, Clone)]
pub struct SmallTalkCapability {
    generator: GenerationService,
}

impl SmallTalkCapability {
    /// Creates a new small talk capability.
    pub fn new(generator: GenerationService) -> Self {
        Self { generator }
    }
}

#[async_trait::async_trait]
impl Capability for SmallTalkCapability {
    fn name(&self) -> CapabilityName {
        CapabilityName::SmallTalk
    }

    async fn invoke(&self, query: &str) -> String {
        let prompt = format!("{GREETING_PREAMBLE}\n\nUser: {query}\nResponse:");
        match self.generator.generate(&prompt).await {
            Ok(reply) if !reply.trim().is_empty() => reply.trim().to_owned(),
            Ok(_) => GREETING_FALLBACK.to_owned(),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Greeting generation failed, using canned reply"
                );
                GREETING_FALLBACK.to_owned()
            }
        }
    }
}

/// Capability refusing topics outside the agent's remit.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutOfScopeCapability;

impl OutOfScopeCapability {
    /// Creates a new out-of-scope capability.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Capability for OutOfScopeCapability {
    fn name(&self) -> CapabilityName {
        CapabilityName::OutOfScope
    }

    async fn invoke(&self, _query: &str) -> String {
        OUT_OF_SCOPE.to_owned()
    }
}
