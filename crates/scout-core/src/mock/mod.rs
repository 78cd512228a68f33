//! Scripted collaborators for testing.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! scout-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! Every mock is cheap to clone; clones share call counters and recorded
//! prompts so a test can keep a handle after moving the mock into a service.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::generation::GenerationProvider;
use crate::retrieval::{Passage, RetrievalProvider};
use crate::search::SearchProvider;
use crate::{Error, Result};

/// A scripted reply: either text or a simulated provider outage.
type Reply = Option<String>;

#[derive(Debug, Default)]
struct Script {
    queue: VecDeque<Reply>,
    fallback: Reply,
    prompts: Vec<String>,
}

/// Generation provider replaying a fixed script.
///
/// Replies are consumed in order; once the queue is empty the fallback reply
/// is returned for every further call. By default the fallback is an error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGenerator {
    script: Arc<Mutex<Script>>,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    /// Creates a generator returning `replies` in order, then failing.
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = replies.into_iter().map(|r| Some(r.into())).collect();
        Self {
            script: Arc::new(Mutex::new(Script {
                queue,
                ..Default::default()
            })),
            delay: None,
        }
    }

    /// Creates a generator returning `reply` for every call.
    pub fn repeating(reply: impl Into<String>) -> Self {
        Self::new(Vec::<String>::new()).then_repeat(reply)
    }

    /// Creates a generator failing every call.
    pub fn failing() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// Queues a simulated failure after the already queued replies.
    pub fn then_fail(self) -> Self {
        self.lock().queue.push_back(None);
        self
    }

    /// Queues another reply.
    pub fn then_reply(self, reply: impl Into<String>) -> Self {
        self.lock().queue.push_back(Some(reply.into()));
        self
    }

    /// Returns `reply` once the queue is exhausted.
    pub fn then_repeat(self, reply: impl Into<String>) -> Self {
        self.lock().fallback = Some(reply.into());
        self
    }

    /// Sleeps for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns how many times the generator was called.
    pub fn calls(&self) -> usize {
        self.lock().prompts.len()
    }

    /// Returns every prompt received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl GenerationProvider for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let reply = {
            let mut script = self.lock();
            script.prompts.push(prompt.to_owned());
            match script.queue.pop_front() {
                Some(reply) => reply,
                None => script.fallback.clone(),
            }
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        reply.ok_or_else(|| {
            Error::service_unavailable().with_message("scripted generation failure")
        })
    }

    fn label(&self) -> &str {
        "scripted"
    }
}

/// Retrieval provider returning a fixed passage list.
#[derive(Debug, Clone, Default)]
pub struct StaticRetriever {
    passages: Arc<Vec<Passage>>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl StaticRetriever {
    /// Creates a retriever returning `passages` for every query.
    pub fn new(passages: Vec<Passage>) -> Self {
        Self {
            passages: Arc::new(passages),
            ..Default::default()
        }
    }

    /// Creates a retriever with an empty index.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a retriever whose backend is unreachable.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Returns how many searches were issued.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RetrievalProvider for StaticRetriever {
    async fn search(&self, _query: &str, k: usize) -> Result<Vec<Passage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::network_error().with_message("index unreachable"));
        }
        Ok(self.passages.iter().take(k).cloned().collect())
    }
}

/// Web search provider returning a fixed result.
#[derive(Debug, Clone, Default)]
pub struct StaticSearch {
    result: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl StaticSearch {
    /// Creates a search provider answering every query with `result`.
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            result: Some(result.into()),
            calls: Arc::default(),
        }
    }

    /// Creates a search provider failing every query.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Returns how many searches were issued.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, _query: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .clone()
            .ok_or_else(|| Error::timeout().with_message("search provider timed out"))
    }
}
