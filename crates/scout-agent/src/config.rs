//! Configuration for the research agent.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use scout_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::capability::CapabilityName;

/// Tuning knobs of the orchestration loop and the chat variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(default)]
pub struct AgentConfig {
    /// Re-executions allowed per capability after a failing evaluation.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SCOUT_MAX_RETRIES", default_value = "1")
    )]
    pub max_retries: u32,

    /// Passages fetched by retrieval-backed capabilities.
    #[cfg_attr(feature = "config", arg(long, env = "SCOUT_TOP_K", default_value = "3"))]
    pub top_k: usize,

    /// Upper bound for one `ask` call, in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SCOUT_REQUEST_TIMEOUT_SECS", default_value = "60")
    )]
    pub request_timeout_secs: u64,

    /// Grace budget for the aggregation step, in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SCOUT_AGGREGATION_TIMEOUT_SECS", default_value = "20")
    )]
    pub aggregation_timeout_secs: u64,

    /// Capability used when routing yields nothing usable.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SCOUT_DEFAULT_CAPABILITY", default_value = "WebSearch")
    )]
    pub default_capability: CapabilityName,

    /// Prior turns considered by the chat variant.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SCOUT_HISTORY_LIMIT", default_value = "5")
    )]
    pub history_limit: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            top_k: 3,
            request_timeout_secs: 60,
            aggregation_timeout_secs: 20,
            default_capability: CapabilityName::WebSearch,
            history_limit: 5,
        }
    }
}

impl AgentConfig {
    /// Returns the request deadline as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the aggregation grace budget as a duration.
    pub fn aggregation_timeout(&self) -> Duration {
        Duration::from_secs(self.aggregation_timeout_secs)
    }

    /// Checks that the values describe a usable agent.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::configuration().with_message("top_k must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(
                Error::configuration().with_message("request_timeout_secs must be positive")
            );
        }
        if self.aggregation_timeout_secs == 0 {
            return Err(
                Error::configuration().with_message("aggregation_timeout_secs must be positive")
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AgentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.default_capability, CapabilityName::WebSearch);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn rejects_zero_top_k() {
        let config = AgentConfig {
            top_k: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: AgentConfig = serde_json::from_str(r#"{"max_retries": 2}"#).unwrap();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.top_k, 3);
    }
}
