//! repo-docs: per-file repository documentation driven by a call graph
//!
//! Every source file is documented by a language model that sees the file
//! itself plus the definitions it transitively calls in other files. A
//! cache maps each source file to its artifact so that later runs can update
//! documentation from git changes instead of starting over.

pub mod cache;
pub mod changes;
pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod generate;
pub mod graph;
pub mod pipeline;
pub mod render;
pub mod utils;

pub use error::{DocsError, Result};
