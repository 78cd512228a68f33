//! Service construction from CLI configuration.

use std::path::Path;

use anyhow::Context;
use scout_agent::aggregator::Aggregator;
use scout_agent::capability::{
    CapabilityTable, OutOfScopeCapability, RetrievalCapability, SmallTalkCapability,
    WebSearchCapability,
};
use scout_agent::evaluator::Evaluator;
use scout_agent::orchestrator::Orchestrator;
use scout_agent::router::Router;
use scout_agent::{AgentService, ChatService};
use scout_core::generation::GenerationService;
use scout_core::history::InMemoryConversationStore;
use scout_core::retrieval::RetrievalService;
use scout_reqwest::SerpApiClient;
use scout_rig::corpus::load_corpus;
use scout_rig::index::{IndexRetriever, build_index};

use super::Cli;
use crate::TRACING_TARGET_CONFIG;

/// Services answering questions.
pub struct Services {
    /// One-shot research agent.
    pub agent: AgentService,
    /// Conversational retrieval, available when a corpus is configured.
    pub chat: Option<ChatService>,
}

/// Creates the agent and chat services from CLI configuration.
///
/// # Errors
///
/// Returns an error if a provider cannot be created or a corpus cannot be
/// loaded and indexed.
pub async fn create_services(cli: &Cli) -> anyhow::Result<Services> {
    let generator = GenerationService::new(
        cli.rig
            .completion_provider()
            .context("failed to create completion provider")?,
    );

    let search = SerpApiClient::new(cli.search.to_client_config()?)
        .context("failed to create web search client")?
        .into_service();

    let policy = match &cli.rig.policy_corpus {
        Some(path) => Some(index_corpus(cli, path).await?),
        None => None,
    };
    let documents = match &cli.rig.document_corpus {
        Some(path) => Some(index_corpus(cli, path).await?),
        None => None,
    };

    let top_k = cli.agent.top_k;
    let mut builder = CapabilityTable::builder()
        .register(WebSearchCapability::new(search))
        .register(SmallTalkCapability::new(generator.clone()))
        .register(OutOfScopeCapability::new())
        .with_default(cli.agent.default_capability);
    if let Some(retriever) = &policy {
        builder = builder.register(RetrievalCapability::policy(
            retriever.clone(),
            generator.clone(),
            top_k,
        ));
    }
    if let Some(retriever) = &documents {
        builder = builder.register(RetrievalCapability::documents(
            retriever.clone(),
            generator.clone(),
            top_k,
        ));
    }
    let capabilities = builder.build().context("invalid capability table")?;

    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        capabilities = ?capabilities.names(),
        default = %capabilities.default_capability(),
        "Registered capabilities"
    );

    let orchestrator = Orchestrator::new(
        Router::new(generator.clone(), &capabilities),
        Evaluator::new(generator.clone()),
        Aggregator::new(generator.clone()),
        capabilities,
        cli.agent.clone(),
    );

    let chat = documents.or(policy).map(|retriever| {
        ChatService::new(
            generator,
            retriever,
            InMemoryConversationStore::new(),
            cli.agent.clone(),
        )
    });

    Ok(Services {
        agent: AgentService::new(orchestrator),
        chat,
    })
}

/// Loads, chunks and embeds one corpus.
async fn index_corpus(cli: &Cli, path: &Path) -> anyhow::Result<RetrievalService> {
    let documents = load_corpus(path)
        .await
        .with_context(|| format!("failed to load corpus {}", path.display()))?;

    let chunks = cli.rig.splitter()?.split_documents(&documents)?;

    let embedder = cli
        .rig
        .embedding_model
        .connect(cli.rig.embedding_api_key())
        .context("failed to create embedding model")?;

    let index = build_index(embedder, chunks)
        .await
        .with_context(|| format!("failed to index corpus {}", path.display()))?;

    Ok(RetrievalService::new(IndexRetriever::new(index)))
}
