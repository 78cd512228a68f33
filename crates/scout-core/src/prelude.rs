//! Commonly used items from scout-core.

pub use crate::generation::{GenerationProvider, GenerationService};
pub use crate::history::{ConversationStore, InMemoryConversationStore, Role, SessionId, Turn};
pub use crate::retrieval::{Passage, RetrievalProvider, RetrievalService};
pub use crate::search::{SearchProvider, SearchService};
pub use crate::{Error, ErrorKind, Result};
