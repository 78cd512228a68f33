//! Completion models and providers.

mod model;
mod provider;

pub use model::{
    AnthropicModel, CohereCompletionModel, CompletionModel, GeminiCompletionModel,
    OpenAiCompletionModel, PerplexityModel,
};
pub use provider::CompletionProvider;
