//! Text generation collaborator.
//!
//! - [`GenerationProvider`]: core trait for "generate text given prompt"
//! - [`GenerationService`]: cloneable wrapper adding structured logging
//!
//! For a rig-backed multi-provider implementation see the `scout-rig` crate.

mod service;

pub use service::GenerationService;

pub use crate::{Error, Result};

/// Tracing target for generation operations.
pub const TRACING_TARGET: &str = "scout_core::generation";

/// Core trait for single-turn text generation.
///
/// Implementations may fail with transient errors; callers decide how to
/// degrade.
#[async_trait::async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generates a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Returns a short label for logs (for example the model name).
    fn label(&self) -> &str {
        "generation"
    }
}
