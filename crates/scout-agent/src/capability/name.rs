//! Closed set of capability identifiers.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Identifier of a capability known to the router.
///
/// The string form is the name the router prompt advertises to the model.
/// Parsing is case-insensitive and also accepts kebab-case aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum CapabilityName {
    /// Retrieval over the HR policy corpus.
    #[strum(to_string = "HRPolicyRAG", serialize = "policy-search")]
    #[serde(rename = "HRPolicyRAG", alias = "policy-search")]
    PolicySearch,
    /// Retrieval over the general internal document corpus.
    #[strum(to_string = "DocumentRAG", serialize = "document-search")]
    #[serde(rename = "DocumentRAG", alias = "document-search")]
    DocumentSearch,
    /// External web search.
    #[strum(to_string = "WebSearch", serialize = "web-search")]
    #[serde(rename = "WebSearch", alias = "web-search")]
    WebSearch,
    /// Greetings and small talk.
    #[strum(to_string = "casual", serialize = "small-talk")]
    #[serde(rename = "casual", alias = "small-talk")]
    SmallTalk,
    /// Topics the agent refuses to handle.
    #[strum(to_string = "unrelevant", serialize = "out-of-scope")]
    #[serde(rename = "unrelevant", alias = "out-of-scope")]
    OutOfScope,
}

impl CapabilityName {
    /// Returns `true` for capabilities whose output is final.
    ///
    /// Short-circuit capabilities skip evaluation and aggregation.
    pub fn is_short_circuit(self) -> bool {
        matches!(self, Self::SmallTalk | Self::OutOfScope)
    }

    /// Returns the routing hint advertised to the router model.
    pub fn routing_hint(self) -> &'static str {
        match self {
            Self::PolicySearch => {
                "questions about HR policies such as leave rules, benefits, holidays, \
                 working hours or employee guidelines"
            }
            Self::DocumentSearch => {
                "questions answered by internal documents, reports, meeting notes \
                 or project material"
            }
            Self::WebSearch => {
                "external questions such as industry benchmarks, regulations, \
                 market trends or public standards related to work and software companies"
            }
            Self::SmallTalk => {
                "greetings, small talk or questions about what the assistant can do"
            }
            Self::OutOfScope => {
                "topics unrelated to internal research such as stock tips, politics, \
                 movies, games or weather"
            }
        }
    }
}
