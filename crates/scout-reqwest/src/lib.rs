#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod client;
mod config;
mod error;
mod response;

pub use crate::client::{SerpApiClient, TRACING_TARGET};
pub use crate::config::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT, SerpApiConfig, SerpApiConfigBuilder,
    SerpApiConfigBuilderError,
};
pub use crate::error::{Error, Result};
pub use crate::response::{AnswerBox, OrganicResult, SearchResponse};
