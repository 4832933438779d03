//! Feedback collaborator: "send dossier + mission prompt, receive analyst text or an error".
//!
//! The production client calls an OpenAI-compatible chat.completions endpoint with the
//! mission prompt as the system message and the dossier as the user message.
//! Calls are instrumented and log model names, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum FeedbackError {
  #[error("feedback service is not configured (OPENAI_API_KEY missing)")]
  Unavailable,
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("OpenAI HTTP {status}: {message}")]
  Http { status: reqwest::StatusCode, message: String },
  #[error("model returned no text")]
  EmptyResponse,
}

/// Anything that can turn a dossier into analyst feedback.
#[async_trait]
pub trait FeedbackClient: Send + Sync {
  async fn get_feedback(&self, text: &str, prompt: &str) -> Result<String, FeedbackError>;
}

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// Plain-text chat completion.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_plain(&self, system: &str, user: &str, temperature: f32) -> Result<String, FeedbackError> {
    let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "mission-possible-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(FeedbackError::Http { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    Ok(first_choice_text(body))
  }
}

#[async_trait]
impl FeedbackClient for OpenAI {
  #[instrument(level = "info", skip(self, text, prompt), fields(text_len = text.len(), prompt_len = prompt.len()))]
  async fn get_feedback(&self, text: &str, prompt: &str) -> Result<String, FeedbackError> {
    let start = Instant::now();
    let out = self.chat_plain(prompt, text, 0.7).await?;
    info!(elapsed = ?start.elapsed(), feedback_len = out.len(), "Analyst report received");
    if out.is_empty() {
      return Err(FeedbackError::EmptyResponse);
    }
    Ok(out)
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

fn first_choice_text(body: ChatCompletionResponse) -> String {
  body.choices
    .into_iter()
    .next()
    .and_then(|c| c.message.content)
    .unwrap_or_default()
    .trim()
    .to_string()
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
