#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

//! # Scout Core
//!
//! The agent crates never talk to a language model, a vector index or a
//! search engine directly. They go through the narrow traits defined here:
//!
//! - [`generation::GenerationProvider`]: `generate(prompt) -> text`
//! - [`retrieval::RetrievalProvider`]: `search(query, k) -> passages`
//! - [`search::SearchProvider`]: `search(query) -> text`
//! - [`history::ConversationStore`]: append-only per-session turns

mod error;

pub mod generation;
pub mod history;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
pub mod prelude;
pub mod retrieval;
pub mod search;

pub use error::{BoxedError, Error, ErrorKind, Result};
