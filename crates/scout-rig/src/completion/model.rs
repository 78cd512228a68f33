//! Type-safe completion model references.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::Error;

/// Reference to a completion/chat model.
///
/// The string form is `provider/model`, for example `openai/gpt-4o-mini`,
/// and is also used for (de)serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CompletionModel {
    /// OpenAI completion models.
    OpenAi(OpenAiCompletionModel),
    /// Anthropic models.
    Anthropic(AnthropicModel),
    /// Cohere completion models.
    Cohere(CohereCompletionModel),
    /// Google Gemini completion models.
    Gemini(GeminiCompletionModel),
    /// Perplexity models.
    Perplexity(PerplexityModel),
}

/// OpenAI completion models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(AsRefStr, Display, EnumString)]
pub enum OpenAiCompletionModel {
    /// GPT-4o (multimodal flagship)
    #[strum(serialize = "gpt-4o")]
    Gpt4o,
    /// GPT-4o mini (fast, affordable)
    #[strum(serialize = "gpt-4o-mini")]
    Gpt4oMini,
    /// GPT-4.1
    #[strum(serialize = "gpt-4.1")]
    Gpt41,
    /// GPT-4.1 mini
    #[strum(serialize = "gpt-4.1-mini")]
    Gpt41Mini,
}

/// Anthropic models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(AsRefStr, Display, EnumString)]
pub enum AnthropicModel {
    /// Claude Sonnet 4 (balanced)
    #[strum(serialize = "claude-sonnet-4-20250514")]
    ClaudeSonnet4,
    /// Claude Haiku 3.5 (fast)
    #[strum(serialize = "claude-3-5-haiku-20241022")]
    ClaudeHaiku35,
}

/// Cohere completion models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(AsRefStr, Display, EnumString)]
pub enum CohereCompletionModel {
    /// Command R+ (most capable)
    #[strum(serialize = "command-r-plus")]
    CommandRPlus,
    /// Command R (balanced)
    #[strum(serialize = "command-r")]
    CommandR,
}

/// Google Gemini completion models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(AsRefStr, Display, EnumString)]
pub enum GeminiCompletionModel {
    /// Gemini 2.0 Flash (fast)
    #[strum(serialize = "gemini-2.0-flash")]
    Gemini20Flash,
    /// Gemini 1.5 Pro (long context)
    #[strum(serialize = "gemini-1.5-pro")]
    Gemini15Pro,
}

/// Perplexity models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(AsRefStr, Display, EnumString)]
pub enum PerplexityModel {
    /// Sonar (online, search-augmented)
    #[strum(serialize = "sonar")]
    Sonar,
    /// Sonar Pro (online, more capable)
    #[strum(serialize = "sonar-pro")]
    SonarPro,
}

impl CompletionModel {
    /// Returns the model identifier string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::OpenAi(m) => m.as_ref(),
            Self::Anthropic(m) => m.as_ref(),
            Self::Cohere(m) => m.as_ref(),
            Self::Gemini(m) => m.as_ref(),
            Self::Perplexity(m) => m.as_ref(),
        }
    }

    /// Returns the provider name.
    pub fn provider(&self) -> &'static str {
        match self {
            Self::OpenAi(_) => "openai",
            Self::Anthropic(_) => "anthropic",
            Self::Cohere(_) => "cohere",
            Self::Gemini(_) => "gemini",
            Self::Perplexity(_) => "perplexity",
        }
    }
}

impl Default for CompletionModel {
    fn default() -> Self {
        Self::OpenAi(OpenAiCompletionModel::Gpt4oMini)
    }
}

impl fmt::Display for CompletionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider(), self.as_str())
    }
}

impl FromStr for CompletionModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model) = s
            .split_once('/')
            .ok_or_else(|| Error::config(format!("expected provider/model, got {s:?}")))?;

        let unknown = |_| Error::config(format!("unknown {provider} model {model:?}"));
        match provider {
            "openai" => model.parse().map(Self::OpenAi).map_err(unknown),
            "anthropic" => model.parse().map(Self::Anthropic).map_err(unknown),
            "cohere" => model.parse().map(Self::Cohere).map_err(unknown),
            "gemini" => model.parse().map(Self::Gemini).map_err(unknown),
            "perplexity" => model.parse().map(Self::Perplexity).map_err(unknown),
            _ => Err(Error::config(format!("unknown provider {provider:?}"))),
        }
    }
}

impl TryFrom<String> for CompletionModel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CompletionModel> for String {
    fn from(model: CompletionModel) -> Self {
        model.to_string()
    }
}
