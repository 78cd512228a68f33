#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod completion;
mod config;
pub mod corpus;
pub mod embedding;
mod error;
pub mod index;

pub use config::RigConfig;
pub use error::{Error, Result};

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "scout_rig";
