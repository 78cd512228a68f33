//! Completion provider backed by rig.

use std::sync::Arc;

use rig::completion::{AssistantContent, CompletionError, CompletionModel as RigCompletionModel};
use rig::message::Message;
use rig::one_or_many::OneOrMany;
use rig::prelude::CompletionClient;
use rig::providers::{anthropic, cohere, gemini, openai, perplexity};
use scout_core::generation::GenerationProvider;

use super::model::CompletionModel;
use crate::Error;

/// Completion provider that wraps different rig completion model implementations.
///
/// This is a cheaply cloneable wrapper around an `Arc<CompletionService>`.
#[derive(Clone)]
pub struct CompletionProvider(Arc<CompletionService>);

enum CompletionService {
    OpenAi {
        model: openai::CompletionModel,
        model_name: String,
    },
    Anthropic {
        model: anthropic::completion::CompletionModel,
        model_name: String,
    },
    Cohere {
        model: cohere::CompletionModel,
        model_name: String,
    },
    Gemini {
        model: gemini::completion::CompletionModel,
        model_name: String,
    },
    Perplexity {
        model: perplexity::CompletionModel,
        model_name: String,
    },
}

impl CompletionProvider {
    /// Connects to the provider that serves `model`.
    pub fn new(model: &CompletionModel, api_key: &str) -> crate::Result<Self> {
        let provider = model.provider();
        let client_err = |e: &dyn std::fmt::Display| Error::provider(provider, e);
        let model_name = model.as_str().to_owned();

        let inner = match model {
            CompletionModel::OpenAi(m) => {
                let client = openai::Client::new(api_key)
                    .map_err(|e| client_err(&e))?
                    .completions_api();
                CompletionService::OpenAi {
                    model: client.completion_model(m.as_ref()),
                    model_name,
                }
            }
            CompletionModel::Anthropic(m) => {
                let client = anthropic::Client::new(api_key).map_err(|e| client_err(&e))?;
                CompletionService::Anthropic {
                    model: client.completion_model(m.as_ref()),
                    model_name,
                }
            }
            CompletionModel::Cohere(m) => {
                let client = cohere::Client::new(api_key).map_err(|e| client_err(&e))?;
                CompletionService::Cohere {
                    model: client.completion_model(m.as_ref()),
                    model_name,
                }
            }
            CompletionModel::Gemini(m) => {
                let client = gemini::Client::new(api_key).map_err(|e| client_err(&e))?;
                CompletionService::Gemini {
                    model: client.completion_model(m.as_ref()),
                    model_name,
                }
            }
            CompletionModel::Perplexity(m) => {
                let client = perplexity::Client::new(api_key).map_err(|e| client_err(&e))?;
                CompletionService::Perplexity {
                    model: client.completion_model(m.as_ref()),
                    model_name,
                }
            }
        };

        tracing::debug!(
            target: crate::TRACING_TARGET,
            provider,
            model = model.as_str(),
            "Connected completion provider"
        );

        Ok(Self(Arc::new(inner)))
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        match self.0.as_ref() {
            CompletionService::OpenAi { model_name, .. }
            | CompletionService::Anthropic { model_name, .. }
            | CompletionService::Cohere { model_name, .. }
            | CompletionService::Gemini { model_name, .. }
            | CompletionService::Perplexity { model_name, .. } => model_name,
        }
    }

    /// Returns the provider name.
    pub fn provider_name(&self) -> &'static str {
        match self.0.as_ref() {
            CompletionService::OpenAi { .. } => "openai",
            CompletionService::Anthropic { .. } => "anthropic",
            CompletionService::Cohere { .. } => "cohere",
            CompletionService::Gemini { .. } => "gemini",
            CompletionService::Perplexity { .. } => "perplexity",
        }
    }

    /// Sends a completion request with the given prompt and chat history.
    pub async fn complete(
        &self,
        prompt: &str,
        chat_history: Vec<Message>,
    ) -> scout_core::Result<String> {
        let map_err = |e: CompletionError| {
            scout_core::Error::from(Error::provider(self.model_name(), e.to_string()))
        };

        match self.0.as_ref() {
            CompletionService::OpenAi { model, .. } => model
                .completion_request(prompt)
                .messages(chat_history)
                .send()
                .await
                .map(|r| extract_text_content(&r.choice))
                .map_err(map_err),
            CompletionService::Anthropic { model, .. } => model
                .completion_request(prompt)
                .messages(chat_history)
                .send()
                .await
                .map(|r| extract_text_content(&r.choice))
                .map_err(map_err),
            CompletionService::Cohere { model, .. } => model
                .completion_request(prompt)
                .messages(chat_history)
                .send()
                .await
                .map(|r| extract_text_content(&r.choice))
                .map_err(map_err),
            CompletionService::Gemini { model, .. } => model
                .completion_request(prompt)
                .messages(chat_history)
                .send()
                .await
                .map(|r| extract_text_content(&r.choice))
                .map_err(map_err),
            CompletionService::Perplexity { model, .. } => model
                .completion_request(prompt)
                .messages(chat_history)
                .send()
                .await
                .map(|r| extract_text_content(&r.choice))
                .map_err(map_err),
        }
    }
}

#[async_trait::async_trait]
impl GenerationProvider for CompletionProvider {
    async fn generate(&self, prompt: &str) -> scout_core::Result<String> {
        self.complete(prompt, Vec::new()).await
    }

    fn label(&self) -> &str {
        self.model_name()
    }
}

/// Extracts text content from assistant content choices.
fn extract_text_content(choice: &OneOrMany<AssistantContent>) -> String {
    choice
        .iter()
        .filter_map(|content| match content {
            AssistantContent::Text(text) => Some(text.text()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

impl std::fmt::Debug for CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionProvider")
            .field("provider", &self.provider_name())
            .field("model", &self.model_name())
            .finish()
    }
}
