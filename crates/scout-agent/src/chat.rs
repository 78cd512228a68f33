//! Conversational retrieval chat.
//!
//! A simpler variant of the agent without routing: each message is rewritten
//! into a standalone query using the session history, answered from the
//! document index and appended to the session.

use std::sync::Arc;

use scout_core::generation::GenerationService;
use scout_core::history::{ConversationStore, Role, SessionId, Turn, format_transcript};
use scout_core::retrieval::{Passage, RetrievalService, join_context};
use scout_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::capability::CANNOT_ANSWER;
use crate::config::AgentConfig;

/// Tracing target for chat sessions.
pub const TRACING_TARGET: &str = "scout_agent::chat";

const CONTEXTUALIZE_PROMPT: &str = "\
Given a chat history and the latest user question which might reference context \
in the chat history, formulate a standalone question which can be understood \
without the chat history. Do NOT answer the question, just reformulate it if \
needed and otherwise return it as is.";

const ANSWER_PROMPT: &str = "\
Based on the following context and conversation history, provide a relevant and \
contextual response. If the answer cannot be derived from the context, only use \
the conversation history or say \"I cannot answer this based on the provided information.\"";

/// Reply to one chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Assistant answer.
    pub answer: String,
    /// Distinct source labels of the passages used, in relevance order.
    pub sources: Vec<String>,
    /// Standalone query used for retrieval.
    pub contextualized_query: String,
}

/// Session-based conversational retrieval.
#[derive(Clone)]
pub struct ChatService {
    generator: GenerationService,
    retriever: RetrievalService,
    store: Arc<dyn ConversationStore>,
    config: AgentConfig,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("generator", &self.generator)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChatService {
    /// Creates a new chat service.
    pub fn new<S>(
        generator: GenerationService,
        retriever: RetrievalService,
        store: S,
        config: AgentConfig,
    ) -> Self
    where
        S: ConversationStore + 'static,
    {
        Self {
            generator,
            retriever,
            store: Arc::new(store),
            config,
        }
    }

    /// Returns a fresh session identifier.
    pub fn create_session(&self) -> SessionId {
        SessionId::new()
    }

    /// Returns up to `max` recent turns of a session, oldest first.
    pub async fn history(&self, session_id: SessionId, max: usize) -> Result<Vec<Turn>> {
        self.store.read(session_id, max).await
    }

    /// Drops the history of a session.
    pub async fn clear_session(&self, session_id: SessionId) -> Result<()> {
        tracing::debug!(target: TRACING_TARGET, session_id = %session_id, "Clearing session");
        self.store.clear(session_id).await
    }

    /// Answers `message` within a session and records both turns.
    ///
    /// Generation and retrieval failures degrade to a sentinel answer; only
    /// conversation store failures and blank messages are returned as errors.
    pub async fn chat(&self, session_id: SessionId, message: &str) -> Result<ChatReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::invalid_input().with_message("message cannot be blank"));
        }

        let history = self.store.read(session_id, self.config.history_limit).await?;
        let transcript = format_transcript(&history);

        let contextualized_query = self.contextualize(message, &transcript).await;
        let passages = self.retrieve(&contextualized_query).await;
        let answer = self
            .generate(&contextualized_query, &passages, &transcript)
            .await;

        self.store.append(session_id, Role::User, message).await?;
        self.store.append(session_id, Role::Assistant, &answer).await?;

        tracing::info!(
            target: TRACING_TARGET,
            session_id = %session_id,
            history_turns = history.len(),
            passages = passages.len(),
            "Chat message answered"
        );

        Ok(ChatReply {
            answer,
            sources: distinct_sources(&passages),
            contextualized_query,
        })
    }

    async fn contextualize(&self, message: &str, transcript: &str) -> String {
        if transcript.is_empty() {
            return message.to_owned();
        }

        let prompt =
            format!("{CONTEXTUALIZE_PROMPT}\n\nChat history:\n{transcript}\n\nQuestion:\n{message}");

        match self.generator.generate(&prompt).await {
            Ok(query) if !query.trim().is_empty() => query.trim().to_owned(),
            Ok(_) => message.to_owned(),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Contextualization failed, using original message"
                );
                message.to_owned()
            }
        }
    }

    async fn retrieve(&self, query: &str) -> Vec<Passage> {
        self.retriever
            .search(query, self.config.top_k)
            .await
            .unwrap_or_else(|error| {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Retrieval failed, answering without context"
                );
                Vec::new()
            })
    }

    async fn generate(&self, query: &str, passages: &[Passage], transcript: &str) -> String {
        let context = join_context(passages);
        let prompt = format!(
            "{ANSWER_PROMPT}\n\nContext from documents:\n{context}\n\n\
             Previous conversation:\n{transcript}\n\nHuman: {query}\nAssistant:"
        );

        match self.generator.generate(&prompt).await {
            Ok(answer) if !answer.trim().is_empty() => answer.trim().to_owned(),
            Ok(_) => CANNOT_ANSWER.to_owned(),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Chat generation failed, answering with sentinel"
                );
                CANNOT_ANSWER.to_owned()
            }
        }
    }
}

fn distinct_sources(passages: &[Passage]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for passage in passages {
        if !sources.contains(&passage.source) {
            sources.push(passage.source.clone());
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use scout_core::history::InMemoryConversationStore;
    use scout_core::mock::{ScriptedGenerator, StaticRetriever};

    use super::*;

    fn service(generator: &ScriptedGenerator, retriever: StaticRetriever) -> ChatService {
        ChatService::new(
            GenerationService::new(generator.clone()),
            RetrievalService::new(retriever),
            InMemoryConversationStore::new(),
            AgentConfig::default(),
        )
    }

    fn passages() -> Vec<Passage> {
        vec![
            Passage::new("The VPN guide is on the wiki.", "it-handbook.md"),
            Passage::new("Use the corporate VPN client.", "it-handbook.md"),
            Passage::new("Tickets go to the IT desk.", "support.md"),
        ]
    }

    #[tokio::test]
    async fn first_message_skips_contextualization() {
        let generator = ScriptedGenerator::new(["It is on the wiki."]);
        let chat = service(&generator, StaticRetriever::new(passages()));
        let session = chat.create_session();

        let reply = chat.chat(session, "Where is the VPN guide?").await.unwrap();

        assert_eq!(reply.answer, "It is on the wiki.");
        assert_eq!(reply.contextualized_query, "Where is the VPN guide?");
        assert_eq!(reply.sources, ["it-handbook.md", "support.md"]);
        assert_eq!(generator.calls(), 1);

        let history = chat.history(session, 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role(), Role::User);
        assert_eq!(history[1].content(), "It is on the wiki.");
    }

    #[tokio::test]
    async fn follow_up_is_contextualized_with_history() {
        let generator = ScriptedGenerator::new([
            "It is on the wiki.",
            "Who maintains the VPN guide?",
            "The IT desk.",
        ]);
        let chat = service(&generator, StaticRetriever::new(passages()));
        let session = chat.create_session();

        chat.chat(session, "Where is the VPN guide?").await.unwrap();
        let reply = chat.chat(session, "Who maintains it?").await.unwrap();

        assert_eq!(reply.contextualized_query, "Who maintains the VPN guide?");
        assert_eq!(reply.answer, "The IT desk.");

        let prompts = generator.prompts();
        assert!(prompts[1].contains("Human: Where is the VPN guide?\n\nAssistant: It is on the wiki."));
        assert!(prompts[2].contains("Human: Who maintains the VPN guide?\nAssistant:"));
    }

    #[tokio::test]
    async fn failures_degrade_to_original_query_and_sentinel() {
        let generator = ScriptedGenerator::new(["First answer."]).then_fail().then_fail();
        let chat = service(&generator, StaticRetriever::failing());
        let session = chat.create_session();

        chat.chat(session, "hello").await.unwrap();
        let reply = chat.chat(session, "and then?").await.unwrap();

        assert_eq!(reply.contextualized_query, "and then?");
        assert_eq!(reply.answer, CANNOT_ANSWER);
        assert!(reply.sources.is_empty());
    }

    #[tokio::test]
    async fn sessions_are_isolated_and_clearable() {
        let generator = ScriptedGenerator::repeating("ok");
        let chat = service(&generator, StaticRetriever::empty());
        let first = chat.create_session();
        let second = chat.create_session();

        chat.chat(first, "one").await.unwrap();
        chat.chat(second, "two").await.unwrap();
        chat.clear_session(first).await.unwrap();

        assert!(chat.history(first, 10).await.unwrap().is_empty());
        assert_eq!(chat.history(second, 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let chat = service(&ScriptedGenerator::repeating("ok"), StaticRetriever::empty());
        assert!(chat.chat(chat.create_session(), "  ").await.is_err());
    }
}
