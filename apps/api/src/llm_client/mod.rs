/// LLM Client — the single point of entry for all vendor completion calls in TechScope.
///
/// No other module may talk to Anthropic, OpenAI or Google directly; handlers go
/// through the `CompletionProvider` trait carried in `AppState`.
///
/// One attempt per call: no retry, no backoff. A non-2xx reply is returned as
/// `LlmError::Api` with the vendor's status and message.
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

pub mod prompts;
pub mod wire;

use wire::{
    vendor_error_message, AnthropicRequest, AnthropicResponse, ChatMessage, GeminiContent,
    GeminiGenerationConfig, GeminiPart, GeminiRequest, GeminiResponse, OpenAiRequest,
    OpenAiResponse,
};

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const OPENAI_BASE_URL: &str = "https://api.openai.com";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub const CLAUDE_MODEL: &str = "claude-sonnet-4-5";
pub const OPENAI_MODEL: &str = "gpt-4o";
pub const GEMINI_MODEL: &str = "gemini-1.5-pro";

/// An LLM vendor. Not to be confused with the technology vendors a
/// quadrant analysis is about.
///
/// Serializes as `claude` / `openai` / `gemini`; request bodies may also use
/// the aliases accepted by `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Provider {
    Claude,
    #[serde(rename = "openai")]
    OpenAi,
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Claude, Provider::OpenAi, Provider::Gemini];

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Claude => "Claude",
            Provider::OpenAi => "OpenAI",
            Provider::Gemini => "Gemini",
        }
    }

    pub fn api_key_env(self) -> &'static str {
        match self {
            Provider::Claude => "CLAUDE_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn model(self) -> &'static str {
        match self {
            Provider::Claude => CLAUDE_MODEL,
            Provider::OpenAi => OPENAI_MODEL,
            Provider::Gemini => GEMINI_MODEL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude" | "anthropic" => Ok(Provider::Claude),
            "openai" | "gpt" | "gpt-4o" => Ok(Provider::OpenAi),
            "gemini" | "google" => Ok(Provider::Gemini),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

impl TryFrom<String> for Provider {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider} API key not configured")]
    NotConfigured { provider: Provider },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error (status {status}): {message}")]
    Api {
        provider: Provider,
        status: u16,
        message: String,
    },

    #[error("{provider} returned empty content")]
    EmptyContent { provider: Provider },
}

/// A single text-completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// The raw reply of one vendor call. Owned by the handler that asked for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub provider: Provider,
    pub model: String,
    pub raw_text: String,
    pub usage: Usage,
}

/// The seam handlers depend on. `LlmClient` is the production backend; tests
/// inject canned replies.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        provider: Provider,
        request: &CompletionRequest,
    ) -> Result<Completion, LlmError>;

    /// Whether a key for `provider` is available. Never exposes the key.
    fn is_configured(&self, provider: Provider) -> bool;
}

/// reqwest-backed client for the three vendor REST APIs.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    claude_api_key: Option<String>,
    openai_api_key: Option<String>,
    gemini_api_key: Option<String>,
    anthropic_base_url: String,
    openai_base_url: String,
    gemini_base_url: String,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.llm_timeout_secs))
                .build()?,
            claude_api_key: config.claude_api_key.clone(),
            openai_api_key: config.openai_api_key.clone(),
            gemini_api_key: config.gemini_api_key.clone(),
            anthropic_base_url: base_url(&config.anthropic_base_url, ANTHROPIC_BASE_URL),
            openai_base_url: base_url(&config.openai_base_url, OPENAI_BASE_URL),
            gemini_base_url: base_url(&config.gemini_base_url, GEMINI_BASE_URL),
        })
    }

    fn api_key(&self, provider: Provider) -> Result<&str, LlmError> {
        let key = match provider {
            Provider::Claude => &self.claude_api_key,
            Provider::OpenAi => &self.openai_api_key,
            Provider::Gemini => &self.gemini_api_key,
        };
        key.as_deref()
            .ok_or(LlmError::NotConfigured { provider })
    }

    async fn call_claude(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let provider = Provider::Claude;
        let api_key = self.api_key(provider)?;
        let body = AnthropicRequest {
            model: CLAUDE_MODEL,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system.as_deref(),
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.anthropic_base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;
        let response = check_status(provider, response).await?;
        let parsed: AnthropicResponse = response.json().await?;

        Ok(Completion {
            provider,
            model: CLAUDE_MODEL.to_string(),
            raw_text: parsed.text().ok_or(LlmError::EmptyContent { provider })?,
            usage: Usage {
                input_tokens: parsed.usage.input_tokens,
                output_tokens: parsed.usage.output_tokens,
            },
        })
    }

    async fn call_openai(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let provider = Provider::OpenAi;
        let api_key = self.api_key(provider)?;

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });
        let body = OpenAiRequest {
            model: OPENAI_MODEL,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.openai_base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let response = check_status(provider, response).await?;
        let parsed: OpenAiResponse = response.json().await?;

        let usage = parsed
            .usage
            .as_ref()
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(Completion {
            provider,
            model: OPENAI_MODEL.to_string(),
            raw_text: parsed.text().ok_or(LlmError::EmptyContent { provider })?,
            usage,
        })
    }

    async fn call_gemini(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let provider = Provider::Gemini;
        let api_key = self.api_key(provider)?;
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart {
                    text: &request.prompt,
                }],
            }],
            system_instruction: request.system.as_deref().map(|text| GeminiContent {
                role: None,
                parts: vec![GeminiPart { text }],
            }),
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.gemini_base_url, GEMINI_MODEL
            ))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;
        let response = check_status(provider, response).await?;
        let parsed: GeminiResponse = response.json().await?;

        let usage = parsed
            .usage_metadata
            .as_ref()
            .map(|u| Usage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(Completion {
            provider,
            model: GEMINI_MODEL.to_string(),
            raw_text: parsed.text().ok_or(LlmError::EmptyContent { provider })?,
            usage,
        })
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(
        &self,
        provider: Provider,
        request: &CompletionRequest,
    ) -> Result<Completion, LlmError> {
        let completion = match provider {
            Provider::Claude => self.call_claude(request).await?,
            Provider::OpenAi => self.call_openai(request).await?,
            Provider::Gemini => self.call_gemini(request).await?,
        };

        debug!(
            "{} call succeeded: input_tokens={}, output_tokens={}",
            provider, completion.usage.input_tokens, completion.usage.output_tokens
        );

        Ok(completion)
    }

    fn is_configured(&self, provider: Provider) -> bool {
        self.api_key(provider).is_ok()
    }
}

/// Turns a non-2xx reply into `LlmError::Api`, keeping the vendor's message.
async fn check_status(
    provider: Provider,
    response: reqwest::Response,
) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LlmError::Api {
        provider,
        status: status.as_u16(),
        message: vendor_error_message(body),
    })
}

fn base_url(configured: &Option<String>, default: &str) -> String {
    configured
        .as_deref()
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}
