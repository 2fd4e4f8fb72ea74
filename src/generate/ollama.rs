//! Ollama chat API client.

use super::{Generator, PromptRequest};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

pub struct OllamaGenerator {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: format!("{}/api/chat", endpoint.trim_end_matches('/')),
            model: model.to_string(),
        })
    }
}

impl Generator for OllamaGenerator {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn complete(&self, request: &PromptRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: &request.system_prompt },
                ChatMessage { role: "user", content: &request.user_prompt },
            ],
            stream: false,
        };

        tracing::debug!("Waiting for {} ({}) on {}", self.model, self.url, request.file_name);
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .with_context(|| format!("Request to {} failed", self.url))?
            .error_for_status()
            .with_context(|| format!("{} returned an error status", self.url))?;

        let parsed: ChatResponse =
            response.json().context("Unexpected response body from Ollama chat API")?;
        if parsed.message.content.trim().is_empty() {
            anyhow::bail!("Model {} returned empty documentation", self.model);
        }
        Ok(parsed.message.content)
    }
}
