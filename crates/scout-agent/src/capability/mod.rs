//! Capabilities and the closed capability table.
//!
//! A capability turns a query into a text answer. Capabilities never fail:
//! adapters translate "nothing found" and collaborator errors into a textual
//! sentinel so that the evaluator always receives a well-formed answer.
//!
//! - [`RetrievalCapability`]: top-k passages, then grounded generation
//! - [`WebSearchCapability`]: delegates to an external search provider
//! - [`SmallTalkCapability`]: short conversational reply
//! - [`OutOfScopeCapability`]: fixed refusal

mod name;
mod retrieval;
mod small_talk;
mod web_search;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use name::CapabilityName;
pub use retrieval::RetrievalCapability;
use scout_core::{Error, Result};
pub use small_talk::{GREETING_FALLBACK, OUT_OF_SCOPE, OutOfScopeCapability, SmallTalkCapability};
use strum::IntoEnumIterator;
pub use web_search::{NO_WEB_RESULTS, WebSearchCapability};

/// Tracing target for capability invocations.
pub const TRACING_TARGET: &str = "scout_agent::capability";

/// Answer returned when a capability cannot produce one.
pub const CANNOT_ANSWER: &str = "I cannot answer this based on the provided information.";

/// A named unit of work turning a query into a text answer.
#[async_trait::async_trait]
pub trait Capability: Send + Sync {
    /// Returns the identifier this capability is registered under.
    fn name(&self) -> CapabilityName;

    /// Returns the routing hint shown to the router model.
    fn description(&self) -> &str {
        self.name().routing_hint()
    }

    /// Produces an answer for `query`.
    ///
    /// Implementations return a sentinel instead of failing.
    async fn invoke(&self, query: &str) -> String;
}

/// Closed, immutable table of capability implementations.
///
/// Built once at startup and shared by every query. The router only ever
/// selects names registered here.
#[derive(Clone)]
pub struct CapabilityTable {
    entries: Arc<HashMap<CapabilityName, Arc<dyn Capability>>>,
    default: CapabilityName,
}

impl fmt::Debug for CapabilityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityTable")
            .field("capabilities", &self.names())
            .field("default", &self.default)
            .finish()
    }
}

impl CapabilityTable {
    /// Returns a builder for a capability table.
    pub fn builder() -> CapabilityTableBuilder {
        CapabilityTableBuilder::default()
    }

    /// Returns the registered names in catalogue order.
    pub fn names(&self) -> Vec<CapabilityName> {
        CapabilityName::iter()
            .filter(|name| self.entries.contains_key(name))
            .collect()
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: CapabilityName) -> bool {
        self.entries.contains_key(&name)
    }

    /// Returns the capability registered under `name`.
    pub fn get(&self, name: CapabilityName) -> Option<&Arc<dyn Capability>> {
        self.entries.get(&name)
    }

    /// Returns the capability used when routing yields nothing usable.
    pub fn default_capability(&self) -> CapabilityName {
        self.default
    }

    /// Invokes the capability registered under `name`.
    ///
    /// Unregistered names answer with [`CANNOT_ANSWER`].
    pub async fn invoke(&self, name: CapabilityName, query: &str) -> String {
        let Some(capability) = self.entries.get(&name) else {
            tracing::warn!(
                target: TRACING_TARGET,
                capability = %name,
                "Capability is not registered"
            );
            return CANNOT_ANSWER.to_owned();
        };

        let answer = capability.invoke(query).await;
        tracing::debug!(
            target: TRACING_TARGET,
            capability = %name,
            answer_len = answer.len(),
            "Capability invoked"
        );
        answer
    }
}

/// Builder for [`CapabilityTable`].
#[derive(Default)]
pub struct CapabilityTableBuilder {
    entries: HashMap<CapabilityName, Arc<dyn Capability>>,
    default: Option<CapabilityName>,
}

impl CapabilityTableBuilder {
    /// Registers a capability, replacing any previous one with the same name.
    pub fn register<C>(self, capability: C) -> Self
    where
        C: Capability + 'static,
    {
        self.register_arc(Arc::new(capability))
    }

    /// Registers an already shared capability.
    pub fn register_arc(mut self, capability: Arc<dyn Capability>) -> Self {
        self.entries.insert(capability.name(), capability);
        self
    }

    /// Sets the fallback capability. Defaults to [`CapabilityName::WebSearch`].
    pub fn with_default(mut self, name: CapabilityName) -> Self {
        self.default = Some(name);
        self
    }

    /// Builds the table.
    ///
    /// Fails when no capability is registered or the default is missing.
    pub fn build(self) -> Result<CapabilityTable> {
        if self.entries.is_empty() {
            return Err(Error::configuration().with_message("no capabilities registered"));
        }

        let default = self.default.unwrap_or(CapabilityName::WebSearch);
        if !self.entries.contains_key(&default) {
            return Err(Error::configuration().with_message(format!(
                "default capability {default} is not registered"
            )));
        }

        Ok(CapabilityTable {
            entries: Arc::new(self.entries),
            default,
        })
    }
}

#[cfg(test)]
mod tests {
    use scout_core::ErrorKind;

    use super::*;

    #[test]
    fn build_requires_registered_default() {
        let error = CapabilityTable::builder()
            .register(OutOfScopeCapability::new())
            .build()
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn build_rejects_empty_table() {
        assert!(CapabilityTable::builder().build().is_err());
    }

    #[test]
    fn names_follow_catalogue_order() {
        let table = CapabilityTable::builder()
            .register(OutOfScopeCapability::new())
            .with_default(CapabilityName::OutOfScope)
            .build()
            .unwrap();

        assert_eq!(table.names(), [CapabilityName::OutOfScope]);
        assert!(table.contains(CapabilityName::OutOfScope));
        assert!(!table.contains(CapabilityName::WebSearch));
    }

    #[tokio::test]
    async fn unregistered_capability_answers_with_sentinel() {
        let table = CapabilityTable::builder()
            .register(OutOfScopeCapability::new())
            .with_default(CapabilityName::OutOfScope)
            .build()
            .unwrap();

        let answer = table.invoke(CapabilityName::PolicySearch, "leave?").await;
        assert_eq!(answer, CANNOT_ANSWER);
    }
}
