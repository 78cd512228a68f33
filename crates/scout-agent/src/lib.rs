#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod aggregator;
mod answer;
pub mod capability;
pub mod chat;
mod config;
mod error;
pub mod evaluator;
pub mod orchestrator;
pub mod router;
mod service;

pub use answer::{Answer, Feedback, FinalAnswer};
pub use chat::{ChatReply, ChatService};
pub use config::AgentConfig;
pub use error::{AskError, AskResult, TransitionError};
pub use service::{AgentService, AskRequest, AskResponse};

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "scout_agent";
