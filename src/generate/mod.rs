//! Documentation generators.
//!
//! A generator turns one [`PromptRequest`] into documentation text. It holds
//! no conversation state, so any request can be sent in any order.

use crate::domain::{Config, GeneratorKind};
use anyhow::Result;
use std::time::Duration;

pub mod ollama;
pub mod prompt;

pub use ollama::OllamaGenerator;
pub use prompt::{documentation_request, update_request, PromptMode, PromptRequest};

pub trait Generator {
    fn name(&self) -> &'static str;
    fn complete(&self, request: &PromptRequest) -> Result<String>;
}

/// Deterministic placeholder documentation, no model involved.
pub struct OfflineGenerator;

impl Generator for OfflineGenerator {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn complete(&self, request: &PromptRequest) -> Result<String> {
        let dependencies = request.user_prompt.matches("\nFunction/Class ").count();
        let body = match request.mode {
            PromptMode::Create => format!(
                "Documentation generated offline.\n\nReferenced definitions from other files: {dependencies}\n"
            ),
            PromptMode::Update => "Documentation updated offline from the latest diff.\n".to_string(),
        };
        Ok(format!("# {}\n\n{}", request.file_name, body))
    }
}

pub fn build_generator(config: &Config) -> Result<Box<dyn Generator + Send + Sync>> {
    match config.generator {
        GeneratorKind::Offline => Ok(Box::new(OfflineGenerator)),
        GeneratorKind::Ollama => Ok(Box::new(OllamaGenerator::new(
            &config.endpoint,
            &config.model,
            Duration::from_secs(config.request_timeout_secs),
        )?)),
    }
}
