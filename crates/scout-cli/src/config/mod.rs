//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── command: Command      # ask | chat
//! ├── agent: AgentConfig    # retries, top-k, timeouts, default capability
//! ├── rig: RigConfig        # completion/embedding models, keys, corpora
//! └── search: SearchConfig  # SerpAPI key and request options
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! scout --policy-corpus ./hr_policies ask "How many sick days do I get?"
//!
//! # Or via environment variables
//! SCOUT_COMPLETION_API_KEY=sk-... SERPAPI_API_KEY=... scout chat
//! ```

mod provider;
mod search;

use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
pub use provider::{Services, create_services};
use scout_agent::AgentConfig;
use scout_rig::RigConfig;
pub use search::SearchConfig;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "scout")]
#[command(about = "Tool-routing research agent over internal documents and the web")]
#[command(version)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,

    /// Log output format.
    #[arg(long, env = "SCOUT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// Orchestration loop configuration.
    #[clap(flatten)]
    pub agent: AgentConfig,

    /// Model provider and corpus configuration.
    #[clap(flatten)]
    pub rig: RigConfig,

    /// Web search configuration.
    #[clap(flatten)]
    pub search: SearchConfig,
}

/// Available commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Answers a single question and exits.
    Ask {
        /// Question text.
        question: String,
    },
    /// Starts an interactive session over the configured corpus.
    Chat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable output.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Logs go to stderr so that answers on stdout stay clean.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        match self.log_format {
            LogFormat::Pretty => registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init(),
            LogFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init(),
        }
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.agent
            .validate()
            .context("invalid agent configuration")?;
        self.rig
            .validate()
            .context("invalid model configuration")?;
        self.search.to_client_config()?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            max_retries = self.agent.max_retries,
            top_k = self.agent.top_k,
            request_timeout_secs = self.agent.request_timeout_secs,
            default_capability = %self.agent.default_capability,
            "Agent configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            completion_model = %self.rig.completion_model,
            embedding_model = %self.rig.embedding_model,
            policy_corpus = ?self.rig.policy_corpus,
            document_corpus = ?self.rig.document_corpus,
            web_search_engine = %self.search.serpapi_engine,
            "Provider configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
