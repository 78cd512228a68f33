//! Query router.
//!
//! One classification call per query; the raw reply goes through a strict
//! allow-list parser and never fails the query.

use std::str::FromStr;

use scout_core::generation::GenerationService;

use crate::capability::{CapabilityName, CapabilityTable};

/// Tracing target for routing decisions.
pub const TRACING_TARGET: &str = "scout_agent::router";

const PREAMBLE: &str = "\
You are a tool router for an internal research agent.
Your job is to read the user query and decide which tools are most relevant to answer it.";

const INSTRUCTIONS: &str = "\
Instructions:
1. Return only a comma-separated list of tool names from the available tools.
2. Do not explain. Just return the list.
3. Never invent a tool name.";

/// Few-shot examples, shown only when every name they use is registered.
const EXAMPLES: &[(&str, &[CapabilityName])] = &[
    ("Hello, how are you?", &[CapabilityName::SmallTalk]),
    ("Leave policy for new joiners", &[CapabilityName::PolicySearch]),
    ("Summarize the Q1 planning notes", &[CapabilityName::DocumentSearch]),
    ("Compare our hiring trend with the industry", &[CapabilityName::WebSearch]),
    ("How to invest in mutual funds?", &[CapabilityName::OutOfScope]),
    (
        "How does our notice period compare with industry norms?",
        &[CapabilityName::PolicySearch, CapabilityName::WebSearch],
    ),
];

/// Classifies queries into an ordered list of registered capabilities.
#[derive(Debug, Clone)]
pub struct Router {
    generator: GenerationService,
    allowed: Vec<(CapabilityName, String)>,
    default: CapabilityName,
}

impl Router {
    /// Creates a router allowed to select exactly the capabilities in `table`.
    pub fn new(generator: GenerationService, table: &CapabilityTable) -> Self {
        let allowed = table
            .names()
            .into_iter()
            .filter_map(|name| {
                let capability = table.get(name)?;
                Some((name, capability.description().to_owned()))
            })
            .collect();

        Self {
            generator,
            allowed,
            default: table.default_capability(),
        }
    }

    /// Returns the capabilities the router may select.
    pub fn allowed(&self) -> Vec<CapabilityName> {
        self.allowed.iter().map(|(name, _)| *name).collect()
    }

    /// Returns the capability selected when routing yields nothing usable.
    pub fn default_capability(&self) -> CapabilityName {
        self.default
    }

    /// Selects capabilities for `query`.
    ///
    /// The result is non-empty, deduplicated and ordered by first mention.
    /// Classification errors and unusable replies degrade to the default.
    #[tracing::instrument(skip_all, target = TRACING_TARGET)]
    pub async fn route(&self, query: &str) -> Vec<CapabilityName> {
        let raw = match self.generator.generate(&self.prompt(query)).await {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    default = %self.default,
                    "Classification failed, routing to default"
                );
                return vec![self.default];
            }
        };

        let selection = parse_selection(&raw, &self.allowed());
        if selection.is_empty() {
            tracing::warn!(
                target: TRACING_TARGET,
                raw = %raw.trim(),
                default = %self.default,
                "No known capability in classification, routing to default"
            );
            return vec![self.default];
        }

        tracing::debug!(
            target: TRACING_TARGET,
            selection = ?selection,
            "Query routed"
        );
        selection
    }

    fn prompt(&self, query: &str) -> String {
        let tools = self
            .allowed
            .iter()
            .map(|(name, description)| format!("- {name}: use this for {description}."))
            .collect::<Vec<_>>()
            .join("\n");

        let allowed = self.allowed();
        let examples = EXAMPLES
            .iter()
            .filter(|(_, names)| names.iter().all(|n| allowed.contains(n)))
            .map(|(question, names)| {
                let answer = names
                    .iter()
                    .map(|n| n.as_ref())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Q: '{question}' -> Answer: {answer}")
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{PREAMBLE}\n\nAvailable tools:\n{tools}\n\n{INSTRUCTIONS}\n\
             4. If unsure, default to: {default}.\n\n\
             Examples:\n{examples}\n\n\
             Question: {query}\nAnswer:",
            default = self.default,
        )
    }
}

/// Parses a raw classification into allowed capability names.
///
/// Splits on commas, trims whitespace and stray quoting, drops empty and
/// unknown tokens and keeps only the first occurrence of each name. The
/// result may be empty.
pub fn parse_selection(raw: &str, allowed: &[CapabilityName]) -> Vec<CapabilityName> {
    let mut selection = Vec::new();

    for token in raw.split(',') {
        let token = token.trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '[' | ']' | '.')
        });
        if token.is_empty() {
            continue;
        }

        let Ok(name) = CapabilityName::from_str(token) else {
            tracing::trace!(target: TRACING_TARGET, token, "Dropping unknown token");
            continue;
        };

        if allowed.contains(&name) && !selection.contains(&name) {
            selection.push(name);
        }
    }

    selection
}
